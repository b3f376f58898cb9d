use crate::error::ParseResult;
use crate::html::Document;
use crate::records::{ContentType, ScrapedRecord, SpecialistCategory};

use super::PageContent;

const DESCRIPTION: &[&str] = &["description", "about", "overview"];

pub fn parse_specialist_category(url: &str, doc: &Document) -> ParseResult<ScrapedRecord> {
    let page = PageContent::extract(url, doc)?;
    Ok(specialist_category_from_page(&page).into())
}

pub fn specialist_category_from_page(page: &PageContent) -> SpecialistCategory {
    SpecialistCategory {
        slug: page.slug.clone(),
        source_url: page.source_url.clone(),
        name: Some(page.title()),
        description: page.text(DESCRIPTION).or_else(|| page.intro.clone()),
        consultancies: page.linked(ContentType::Consultancy),
        law_firms: page.linked(ContentType::LawFirm),
        image: page.image.clone(),
        ..Default::default()
    }
}
