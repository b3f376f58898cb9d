use url::Url;

use crate::error::ParseResult;
use crate::html::Document;
use crate::records::{EditorialPage, ScrapedRecord};
use crate::utils::slugify;

use super::PageContent;

pub fn parse_editorial_page(url: &str, doc: &Document) -> ParseResult<ScrapedRecord> {
    let page = PageContent::extract(url, doc)?;
    Ok(editorial_page_from_page(&page).into())
}

pub fn editorial_page_from_page(page: &PageContent) -> EditorialPage {
    let segments = path_segments(&page.source_url);
    let parent_slug = (segments.len() > 1)
        .then(|| slugify(&segments[segments.len() - 2]))
        .filter(|slug| !slug.is_empty());

    EditorialPage {
        slug: page.slug.clone(),
        source_url: page.source_url.clone(),
        title: Some(page.title()),
        content: page.content.clone(),
        path: (!segments.is_empty()).then(|| format!("/{}/", segments.join("/"))),
        parent_slug,
        image: page.image.clone(),
        ..Default::default()
    }
}

fn path_segments(url: &str) -> Vec<String> {
    Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed.path_segments().map(|segments| {
                segments
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
        })
        .unwrap_or_default()
}
