//! Text cleanup and slug helpers.

use url::Url;

/// Collapse all whitespace (including non-breaking spaces) to single spaces
/// and trim the ends.
pub fn clean_text(text: &str) -> String {
    text.split(|c: char| c.is_whitespace() || c == '\u{a0}')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Like [`clean_text`], but `None` when nothing is left.
pub fn non_empty(text: &str) -> Option<String> {
    let cleaned = clean_text(text);
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Derive a record slug from the last non-empty path segment of a URL.
///
/// Query strings, fragments and trailing slashes are ignored, so
/// `https://site/best_consultancies/acme/` and
/// `https://site/best_consultancies/acme?ref=x` both give `acme`.
/// Relative references (`/best_consultants/jane-doe`) are accepted too.
pub fn extract_slug(url: &str) -> Option<String> {
    let parsed = Url::parse(url).or_else(|_| {
        Url::parse("http://relative.invalid/").and_then(|base| base.join(url))
    });

    let segment = match parsed {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last().map(str::to_string)),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .and_then(|path| path.split('/').filter(|s| !s.is_empty()).last())
            .map(str::to_string),
    }?;

    let slug = slugify(&segment);
    (!slug.is_empty()).then_some(slug)
}

/// Reduce text to a lowercase, URL-safe slug (`[a-z0-9_-]`).
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() || c == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Turn `acme-consultants` into `Acme Consultants`.
pub fn title_from_slug(slug: &str) -> String {
    slug.split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split free text into list entries on commas, semicolons and newlines.
pub fn split_list(text: &str) -> Vec<String> {
    text.split([',', ';', '\n'])
        .map(|item| clean_text(item.trim_start_matches(['•', '-', '*', '·'])))
        .filter(|item| !item.is_empty())
        .collect()
}
