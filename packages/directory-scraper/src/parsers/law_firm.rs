use crate::error::ParseResult;
use crate::html::Document;
use crate::records::{LawFirm, ScrapedRecord};

use super::PageContent;

const DESCRIPTION: &[&str] = &["firm description", "description", "about", "overview"];
const PRACTICE_AREAS: &[&str] = &["practice areas", "areas of practice", "expertise", "specialisms"];
const KEY_LAWYERS: &[&str] = &["key lawyers", "lawyers", "partners", "team"];
const OFFICES: &[&str] = &["offices", "locations"];

pub fn parse_law_firm(url: &str, doc: &Document) -> ParseResult<ScrapedRecord> {
    let page = PageContent::extract(url, doc)?;
    Ok(law_firm_from_page(&page).into())
}

pub fn law_firm_from_page(page: &PageContent) -> LawFirm {
    LawFirm {
        slug: page.slug.clone(),
        source_url: page.source_url.clone(),
        name: Some(page.display_name()),
        description: page.text(DESCRIPTION),
        practice_areas: page.list(PRACTICE_AREAS),
        key_lawyers: page.list(KEY_LAWYERS),
        offices: page.list(OFFICES),
        contact: page.contact.clone(),
        website: page.website(),
        logo: page.image.clone(),
        ..Default::default()
    }
}
