//! Heading-delimited section extraction and shared field helpers.
//!
//! The directory pages carry no stable classes or ids for their content
//! blocks; the sub-heading text is the only reliable delimiter. Each
//! `h2`/`h3`/`h4` opens a section that runs until the next heading of the
//! same or a higher level. A section's own text and bullet items end at its
//! first sub-heading; its links include those of nested sub-sections.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use crate::html::{Document, Node};
use crate::records::ContactInfo;
use crate::utils::{clean_text, extract_slug, non_empty, split_list};

const SECTION_HEADINGS: &str = "h2, h3, h4";

lazy_static! {
    // Email pattern - RFC 5322 simplified
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"(?i)\b[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}\b"
    ).unwrap();

    // Phone pattern - international prefix optional, at least 8 digits overall
    static ref PHONE_REGEX: Regex = Regex::new(
        r"\+?\(?\d[\d\s().-]{6,}\d"
    ).unwrap();
}

/// A link inside a section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Link {
    pub text: String,
    pub href: String,
}

/// Content that follows one heading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    /// Free text outside of lists, one line per block
    pub text: String,
    pub list_items: Vec<String>,
    pub links: Vec<Link>,
}

impl Section {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.list_items.is_empty() && self.links.is_empty()
    }
}

/// Sections keyed by lowercased heading text, in document order.
pub type Sections = IndexMap<String, Section>;

/// Collect every heading-introduced section of the page.
///
/// When a heading text repeats, the first occurrence wins.
pub fn extract_sections(doc: &Document) -> Sections {
    let mut sections = Sections::new();

    for heading in doc.select(SECTION_HEADINGS) {
        let key = heading.text().to_lowercase();
        if key.is_empty() || sections.contains_key(&key) {
            continue;
        }
        sections.insert(key, collect_section(heading));
    }

    sections
}

fn collect_section(heading: Node<'_>) -> Section {
    let level = heading.heading_level().unwrap_or(6);

    // Headings wrapped in their own container: walk the container's siblings
    let mut siblings: Vec<Node<'_>> = heading.next_siblings().collect();
    if siblings.is_empty() {
        if let Some(parent) = heading.parent() {
            siblings = parent.next_siblings().collect();
        }
    }

    let mut text = Vec::new();
    let mut section = Section::default();
    // Text and lists stop at the first sub-heading; links run to the end
    let mut in_subsection = false;

    for node in siblings {
        match node.heading_level() {
            Some(next) if next <= level => break,
            Some(_) => {
                in_subsection = true;
                continue;
            }
            None => {}
        }

        if !in_subsection {
            if !matches!(node.tag_name(), "ul" | "ol") {
                let block = node.text_without_lists();
                if !block.is_empty() {
                    text.push(block);
                }
            }

            let items = if node.tag_name() == "li" {
                vec![node]
            } else {
                node.find("li")
            };
            section.list_items.extend(
                items
                    .into_iter()
                    .map(|li| li.text())
                    .filter(|item| !item.is_empty()),
            );
        }

        let anchors = if node.tag_name() == "a" {
            vec![node]
        } else {
            node.find("a[href]")
        };
        section.links.extend(anchors.into_iter().filter_map(to_link));
    }

    section.text = text.join("\n");
    section
}

fn to_link(node: Node<'_>) -> Option<Link> {
    let href = node.attr("href")?.trim();
    if href.is_empty() {
        return None;
    }
    Some(Link {
        text: node.text(),
        href: href.to_string(),
    })
}

/// First section whose heading contains one of `keywords`.
///
/// Keywords are tried in order; for each, sections are tried in document
/// order. Matching is case-insensitive substring.
pub fn find_section<'s>(sections: &'s Sections, keywords: &[&str]) -> Option<&'s Section> {
    keyword_matches(sections, keywords).into_iter().next()
}

fn keyword_matches<'s>(sections: &'s Sections, keywords: &[&str]) -> Vec<&'s Section> {
    let mut matches = Vec::new();
    for keyword in keywords {
        let keyword = keyword.to_lowercase();
        matches.extend(
            sections
                .iter()
                .filter(|(heading, _)| heading.contains(&keyword))
                .map(|(_, section)| section),
        );
    }
    matches
}

/// Free text of the first matching section that has any, one line per
/// block.
pub fn section_text(sections: &Sections, keywords: &[&str]) -> Option<String> {
    keyword_matches(sections, keywords)
        .into_iter()
        .find_map(|section| non_empty_lines(&section.text))
}

fn non_empty_lines(text: &str) -> Option<String> {
    let lines: Vec<String> = text.lines().filter_map(non_empty).collect();
    (!lines.is_empty()).then(|| lines.join("\n"))
}

/// List for the first matching section with content.
///
/// Bullet items win; otherwise the free text is split on commas and
/// newlines.
pub fn section_list(sections: &Sections, keywords: &[&str]) -> Option<Vec<String>> {
    keyword_matches(sections, keywords)
        .into_iter()
        .find_map(|section| {
            let list = if section.list_items.is_empty() {
                split_list(&section.text)
            } else {
                section.list_items.clone()
            };
            (!list.is_empty()).then_some(list)
        })
}

/// Slugs of every link whose target contains `marker`, deduplicated in
/// first-seen order. Links to the listing page itself are skipped.
pub fn linked_slugs<'l>(links: impl IntoIterator<Item = &'l Link>, marker: &str) -> Vec<String> {
    let listing = marker.trim_matches('/');
    let mut slugs: Vec<String> = Vec::new();

    for link in links {
        if !link.href.contains(marker) {
            continue;
        }
        // `/best_consultants/` alone is the listing, not a record
        let after = link.href.split(marker).nth(1).unwrap_or("");
        if after.trim_matches('/').is_empty() {
            continue;
        }
        if let Some(slug) = extract_slug(&link.href) {
            if slug != listing && !slugs.contains(&slug) {
                slugs.push(slug);
            }
        }
    }

    slugs
}

/// Every link in the main content area (whole page if there is none).
pub fn content_links(doc: &Document) -> Vec<Link> {
    let anchors = match doc.select_first(".entry-content") {
        Some(content) => content.find("a[href]"),
        None => doc.select("a[href]"),
    };
    anchors.into_iter().filter_map(to_link).collect()
}

/// Main content text: `.entry-content`, else `article`, else `main`.
pub fn content_text(doc: &Document) -> Option<String> {
    doc.text_of(".entry-content")
        .or_else(|| doc.text_of("article"))
        .or_else(|| doc.text_of("main"))
}

/// The representative image: first `img` under an uploads path that is not
/// an icon. Lazy-load attributes are considered when `src` is a placeholder.
pub fn extract_image(doc: &Document) -> Option<String> {
    let scoped = doc
        .select_first(".entry-content")
        .map(|content| content.find("img"))
        .unwrap_or_default();

    scoped
        .into_iter()
        .chain(doc.select("img"))
        .find_map(|img| image_source(img).filter(|src| is_content_image(src)))
}

fn image_source(img: Node<'_>) -> Option<String> {
    ["src", "data-src", "data-lazy-src"]
        .iter()
        .filter_map(|name| img.attr(name))
        .map(str::trim)
        .find(|src| !src.is_empty() && !src.starts_with("data:"))
        .map(str::to_string)
}

fn is_content_image(src: &str) -> bool {
    let lower = src.to_lowercase();
    lower.contains("uploads") && !lower.contains("icon")
}

/// Contact details from the contact section plus `mailto:`/`tel:` links.
///
/// `website` is the first outbound link that does not point back at the
/// source site. Returns `None` when nothing was found.
pub fn extract_contact(doc: &Document, sections: &Sections, source_url: &str) -> Option<ContactInfo> {
    let contact_section = find_section(sections, &["contact", "get in touch"]);
    let contact_text = contact_section.map(|s| s.text.as_str()).unwrap_or("");
    let mut links: Vec<Link> = contact_section.map(|s| s.links.clone()).unwrap_or_default();
    links.extend(content_links(doc));

    let email = links
        .iter()
        .find_map(|link| link.href.strip_prefix("mailto:"))
        .map(|addr| addr.split('?').next().unwrap_or(addr).trim().to_string())
        .filter(|addr| !addr.is_empty())
        .or_else(|| EMAIL_REGEX.find(contact_text).map(|m| m.as_str().to_string()));

    let phone = links
        .iter()
        .find_map(|link| link.href.strip_prefix("tel:"))
        .and_then(non_empty)
        .or_else(|| {
            PHONE_REGEX
                .find(contact_text)
                .map(|m| clean_text(m.as_str()))
        });

    let source_host = Url::parse(source_url)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string));
    let website = links
        .iter()
        .filter_map(|link| Url::parse(&link.href).ok())
        .find(|url| {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some()
                && url.host_str().map(str::to_string) != source_host
                && !is_social_host(url.host_str().unwrap_or(""))
        })
        .map(|url| url.to_string());

    let address = section_text(sections, &["address", "location"]);

    let contact = ContactInfo {
        email,
        phone,
        website,
        address,
    };
    (!contact.is_empty()).then_some(contact)
}

fn is_social_host(host: &str) -> bool {
    ["linkedin.com", "twitter.com", "x.com", "facebook.com", "instagram.com", "youtube.com"]
        .iter()
        .any(|social| host == *social || host.ends_with(&format!(".{}", social)))
}
