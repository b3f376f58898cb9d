use crate::error::ParseResult;
use crate::html::Document;
use crate::records::{Consultant, ContentType, ScrapedRecord};

use super::PageContent;

const POSITION: &[&str] = &["position", "job title", "role"];
const BIOGRAPHY: &[&str] = &["biography", "bio", "about", "profile"];
const EXPERTISE: &[&str] = &["expertise", "specialisms", "areas of"];
const LANGUAGES: &[&str] = &["languages"];

pub fn parse_consultant(url: &str, doc: &Document) -> ParseResult<ScrapedRecord> {
    let page = PageContent::extract(url, doc)?;
    Ok(consultant_from_page(&page).into())
}

pub fn consultant_from_page(page: &PageContent) -> Consultant {
    Consultant {
        slug: page.slug.clone(),
        source_url: page.source_url.clone(),
        name: Some(page.title()),
        position: page.text(POSITION),
        consultancy: page
            .linked(ContentType::Consultancy)
            .and_then(|slugs| slugs.into_iter().next()),
        biography: page.text(BIOGRAPHY),
        expertise: page.list(EXPERTISE),
        languages: page.list(LANGUAGES),
        contact: page.contact.clone(),
        photo: page.image.clone(),
        ..Default::default()
    }
}
