use crate::error::ParseResult;
use crate::html::Document;
use crate::records::{IntelligenceSystem, ScrapedRecord};

use super::PageContent;

const DESCRIPTION: &[&str] = &["description", "about", "overview"];
const FEATURES: &[&str] = &["features", "capabilities", "functionality"];
const PRICING: &[&str] = &["pricing", "price", "cost"];
const TARGET_USERS: &[&str] = &["target users", "who is it for", "users", "audience"];
const PROVIDER: &[&str] = &["provider", "developed by", "vendor", "company"];

pub fn parse_intelligence_system(url: &str, doc: &Document) -> ParseResult<ScrapedRecord> {
    let page = PageContent::extract(url, doc)?;
    Ok(intelligence_system_from_page(&page).into())
}

pub fn intelligence_system_from_page(page: &PageContent) -> IntelligenceSystem {
    IntelligenceSystem {
        slug: page.slug.clone(),
        source_url: page.source_url.clone(),
        name: Some(page.display_name()),
        description: page.text(DESCRIPTION).or_else(|| page.intro.clone()),
        features: page.list(FEATURES),
        pricing: page.text(PRICING),
        target_users: page.list(TARGET_USERS),
        provider: page.text(PROVIDER),
        website: page.website(),
        logo: page.image.clone(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_intelligence_system() {
        let doc = Document::parse(
            r#"<html><body><h1>PolicyRadar</h1><div class="entry-content">
                 <p>Monitoring for EU legislative files.</p>
                 <h3>Key Features</h3><ul><li>Alerts</li><li>Dossier tracking</li></ul>
                 <h3>Pricing</h3><p>From EUR 200 per month</p>
                 <h3>Target Users</h3><p>Public affairs teams, NGOs</p>
                 <h3>Provider</h3><p>Radar Labs</p>
               </div></body></html>"#,
        );

        let ScrapedRecord::IntelligenceSystem(system) = parse_intelligence_system(
            "https://www.bestinbrussels.eu/intelligence_systems/policyradar/",
            &doc,
        )
        .unwrap() else {
            panic!("expected an intelligence system");
        };

        assert_eq!(system.name.as_deref(), Some("PolicyRadar"));
        assert_eq!(
            system.description.as_deref(),
            Some("Monitoring for EU legislative files.")
        );
        assert_eq!(
            system.features,
            Some(vec!["Alerts".into(), "Dossier tracking".into()])
        );
        assert_eq!(system.pricing.as_deref(), Some("From EUR 200 per month"));
        assert_eq!(
            system.target_users,
            Some(vec!["Public affairs teams".into(), "NGOs".into()])
        );
        assert_eq!(system.provider.as_deref(), Some("Radar Labs"));
    }
}
