use crate::error::ParseResult;
use crate::html::Document;
use crate::records::{Consultancy, ContentType, ScrapedRecord};

use super::PageContent;

const DESCRIPTION: &[&str] = &["firm description", "description", "about", "overview"];
const SPECIALISMS: &[&str] = &["specialisms", "specialities", "specialties", "areas of expertise"];
const SERVICES: &[&str] = &["services", "what we do"];
const CLIENTS: &[&str] = &["clients", "customers"];
const ACHIEVEMENTS: &[&str] = &["achievements", "awards", "track record", "success"];

pub fn parse_consultancy(url: &str, doc: &Document) -> ParseResult<ScrapedRecord> {
    let page = PageContent::extract(url, doc)?;
    Ok(consultancy_from_page(&page).into())
}

pub fn consultancy_from_page(page: &PageContent) -> Consultancy {
    Consultancy {
        slug: page.slug.clone(),
        source_url: page.source_url.clone(),
        name: Some(page.display_name()),
        description: page.text(DESCRIPTION),
        specialisms: page.list(SPECIALISMS),
        services: page.list(SERVICES),
        clients: page.list(CLIENTS),
        achievements: page.text(ACHIEVEMENTS),
        contact: page.contact.clone(),
        website: page.website(),
        linked_consultants: page.linked(ContentType::Consultant),
        logo: page.image.clone(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::Section;

    const URL: &str = "https://www.bestinbrussels.eu/best_consultancies/acme-consultants/";

    #[test]
    fn test_about_heading_and_firm_description() {
        let doc = Document::parse(
            "<html><body>\
               <h2>About Acme Consultants</h2>\
               <h3>Firm Description</h3>\
               <p>We are a leading consultancy.</p>\
             </body></html>",
        );

        let record = parse_consultancy(URL, &doc).unwrap();

        assert_eq!(
            record,
            ScrapedRecord::Consultancy(Consultancy {
                slug: "acme-consultants".into(),
                source_url: URL.into(),
                name: Some("Acme Consultants".into()),
                description: Some("We are a leading consultancy.".into()),
                ..Default::default()
            })
        );
    }

    #[test]
    fn test_list_items_take_priority_over_text() {
        let mut page = PageContent::new(URL).unwrap();
        page.sections.insert(
            "specialisms".into(),
            Section {
                text: String::new(),
                list_items: vec!["Energy".into(), "Trade".into()],
                links: Vec::new(),
            },
        );

        let consultancy = consultancy_from_page(&page);

        assert_eq!(
            consultancy.specialisms,
            Some(vec!["Energy".to_string(), "Trade".to_string()])
        );
    }

    #[test]
    fn test_linked_consultants_and_logo() {
        let doc = Document::parse(
            r#"<html><body><h1>Acme</h1><div class="entry-content">
                 <img src="/wp-content/uploads/acme-logo.png">
                 <h3>Our team</h3>
                 <p><a href="/best_consultants/jane-doe/">Jane</a>
                    <a href="/best_consultants/john-roe/">John</a></p>
                 <h3>Key achievements</h3><p>Shaped the 2030 climate package.</p>
               </div></body></html>"#,
        );

        let ScrapedRecord::Consultancy(consultancy) = parse_consultancy(URL, &doc).unwrap() else {
            panic!("expected a consultancy");
        };

        assert_eq!(consultancy.name.as_deref(), Some("Acme"));
        assert_eq!(
            consultancy.linked_consultants,
            Some(vec!["jane-doe".to_string(), "john-roe".to_string()])
        );
        assert_eq!(consultancy.logo.as_deref(), Some("/wp-content/uploads/acme-logo.png"));
        assert_eq!(
            consultancy.achievements.as_deref(),
            Some("Shaped the 2030 climate package.")
        );
        assert_eq!(consultancy.description, None);
    }
}
