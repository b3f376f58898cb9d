use crate::error::ParseResult;
use crate::html::Document;
use crate::records::{DigitalTool, ScrapedRecord};

use super::PageContent;

const DESCRIPTION: &[&str] = &["description", "about", "overview"];
const FEATURES: &[&str] = &["features", "capabilities", "functionality"];
const PRICING: &[&str] = &["pricing", "price", "cost"];
const USE_CASES: &[&str] = &["use cases", "applications", "ideal for"];

pub fn parse_digital_tool(url: &str, doc: &Document) -> ParseResult<ScrapedRecord> {
    let page = PageContent::extract(url, doc)?;
    Ok(digital_tool_from_page(&page).into())
}

pub fn digital_tool_from_page(page: &PageContent) -> DigitalTool {
    DigitalTool {
        slug: page.slug.clone(),
        source_url: page.source_url.clone(),
        name: Some(page.display_name()),
        description: page.text(DESCRIPTION).or_else(|| page.intro.clone()),
        features: page.list(FEATURES),
        pricing: page.text(PRICING),
        use_cases: page.list(USE_CASES),
        website: page.website(),
        logo: page.image.clone(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sections_stay_none() {
        let doc = Document::parse("<html><body><h1>Votewatch</h1></body></html>");

        let ScrapedRecord::DigitalTool(tool) =
            parse_digital_tool("https://www.bestinbrussels.eu/digital_tools/votewatch/", &doc).unwrap()
        else {
            panic!("expected a digital tool");
        };

        assert_eq!(
            tool,
            DigitalTool {
                slug: "votewatch".into(),
                source_url: "https://www.bestinbrussels.eu/digital_tools/votewatch/".into(),
                name: Some("Votewatch".into()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_use_cases_split_from_text() {
        let doc = Document::parse(
            "<h1>Tool</h1><h3>Use cases</h3><p>Stakeholder mapping</p><p>Vote tracking</p>\
             <h3>Features</h3><ol><li>Export</li></ol>",
        );

        let ScrapedRecord::DigitalTool(tool) =
            parse_digital_tool("https://www.bestinbrussels.eu/digital_tools/tool/", &doc).unwrap()
        else {
            panic!("expected a digital tool");
        };

        assert_eq!(
            tool.use_cases,
            Some(vec!["Stakeholder mapping".into(), "Vote tracking".into()])
        );
        assert_eq!(tool.features, Some(vec!["Export".into()]));
    }
}
