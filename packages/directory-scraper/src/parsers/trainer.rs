use crate::error::ParseResult;
use crate::html::Document;
use crate::records::{ScrapedRecord, Trainer};

use super::PageContent;

const DESCRIPTION: &[&str] = &["description", "about", "overview"];
const COURSES: &[&str] = &["courses", "training programmes", "programs", "trainings"];
const TOPICS: &[&str] = &["topics", "subjects"];
const FORMATS: &[&str] = &["formats", "format", "delivery"];

pub fn parse_trainer(url: &str, doc: &Document) -> ParseResult<ScrapedRecord> {
    let page = PageContent::extract(url, doc)?;
    Ok(trainer_from_page(&page).into())
}

pub fn trainer_from_page(page: &PageContent) -> Trainer {
    Trainer {
        slug: page.slug.clone(),
        source_url: page.source_url.clone(),
        name: Some(page.display_name()),
        description: page.text(DESCRIPTION).or_else(|| page.intro.clone()),
        courses: page.list(COURSES),
        topics: page.list(TOPICS),
        formats: page.list(FORMATS),
        contact: page.contact.clone(),
        website: page.website(),
        logo: page.image.clone(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trainer() {
        let doc = Document::parse(
            r#"<html><body><h1>EU Training Co</h1><div class="entry-content">
                 <h2>About EU Training Co</h2><p>Hands-on courses on EU decision making.</p>
                 <h3>Courses</h3><ul><li>Lobbying 101</li><li>Trilogues explained</li></ul>
                 <h3>Formats</h3><p>In person, Online</p>
                 <h3>Contact</h3><p>training@eutc.eu</p>
               </div></body></html>"#,
        );

        let ScrapedRecord::Trainer(trainer) =
            parse_trainer("https://www.bestinbrussels.eu/trainers/eu-training-co/", &doc).unwrap()
        else {
            panic!("expected a trainer");
        };

        assert_eq!(trainer.name.as_deref(), Some("EU Training Co"));
        assert_eq!(
            trainer.description.as_deref(),
            Some("Hands-on courses on EU decision making.")
        );
        assert_eq!(
            trainer.courses,
            Some(vec!["Lobbying 101".into(), "Trilogues explained".into()])
        );
        assert_eq!(trainer.formats, Some(vec!["In person".into(), "Online".into()]));
        assert_eq!(trainer.topics, None);
        assert_eq!(
            trainer.contact.and_then(|c| c.email).as_deref(),
            Some("training@eutc.eu")
        );
    }
}
