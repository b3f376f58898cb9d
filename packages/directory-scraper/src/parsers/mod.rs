//! Field parsers, one per content type.
//!
//! Every parser goes through the same two steps: [`PageContent::extract`]
//! pulls the type-independent pieces out of the page once (sections,
//! image, links, contact block, article metadata), then a `*_from_page`
//! function maps them to the typed record. Missing sections give `None`,
//! never an empty placeholder; the only hard failure is a URL without a
//! slug.

mod article;
mod consultancy;
mod consultant;
mod digital_tool;
mod editorial_page;
mod intelligence_system;
mod law_firm;
mod specialist_category;
mod trainer;

pub use article::{article_from_page, parse_article};
pub use consultancy::{consultancy_from_page, parse_consultancy};
pub use consultant::{consultant_from_page, parse_consultant};
pub use digital_tool::{digital_tool_from_page, parse_digital_tool};
pub use editorial_page::{editorial_page_from_page, parse_editorial_page};
pub use intelligence_system::{intelligence_system_from_page, parse_intelligence_system};
pub use law_firm::{law_firm_from_page, parse_law_firm};
pub use specialist_category::{parse_specialist_category, specialist_category_from_page};
pub use trainer::{parse_trainer, trainer_from_page};

use crate::error::{ParseError, ParseResult};
use crate::html::Document;
use crate::records::{ContactInfo, ContentType, ScrapedRecord};
use crate::sections::{
    content_links, content_text, extract_contact, extract_image, extract_sections, linked_slugs,
    section_list, section_text, Link, Sections,
};
use crate::utils::{extract_slug, non_empty, title_from_slug};

/// Signature shared by every parser.
pub type ParseFn = fn(&str, &Document) -> ParseResult<ScrapedRecord>;

/// The parser for a content type.
pub fn parser_for(content_type: ContentType) -> ParseFn {
    match content_type {
        ContentType::Consultancy => parse_consultancy,
        ContentType::Consultant => parse_consultant,
        ContentType::LawFirm => parse_law_firm,
        ContentType::IntelligenceSystem => parse_intelligence_system,
        ContentType::DigitalTool => parse_digital_tool,
        ContentType::Trainer => parse_trainer,
        ContentType::SpecialistCategory => parse_specialist_category,
        ContentType::Article => parse_article,
        ContentType::EditorialPage => parse_editorial_page,
    }
}

/// Post metadata, present on articles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMeta {
    pub description: Option<String>,
    pub author: Option<String>,
    pub published_at: Option<String>,
    pub tags: Vec<String>,
    pub og_image: Option<String>,
}

/// Everything the typed parsers read from a page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageContent {
    pub slug: String,
    pub source_url: String,
    pub h1: Option<String>,
    /// `X` from a leading `<h2>About X</h2>`
    pub about_name: Option<String>,
    pub sections: Sections,
    /// First paragraph of the main content
    pub intro: Option<String>,
    pub content: Option<String>,
    pub image: Option<String>,
    pub links: Vec<Link>,
    pub contact: Option<ContactInfo>,
    pub meta: PageMeta,
}

impl PageContent {
    /// An empty page for `url`; only the slug and source URL are set.
    pub fn new(url: &str) -> ParseResult<Self> {
        let slug = extract_slug(url).ok_or_else(|| ParseError::MissingSlug {
            url: url.to_string(),
        })?;
        Ok(Self {
            slug,
            source_url: url.to_string(),
            ..Default::default()
        })
    }

    pub fn extract(url: &str, doc: &Document) -> ParseResult<Self> {
        let mut page = Self::new(url)?;
        let sections = extract_sections(doc);

        page.h1 = doc.text_of("h1");
        page.about_name = doc
            .select("h2")
            .into_iter()
            .find_map(|h2| about_name(&h2.text()));
        page.intro = doc
            .select(".entry-content p")
            .into_iter()
            .chain(doc.select("p"))
            .find_map(|p| non_empty(&p.text()));
        page.content = content_text(doc);
        page.image = extract_image(doc);
        page.links = content_links(doc);
        page.contact = extract_contact(doc, &sections, url);
        page.meta = extract_meta(doc);
        page.sections = sections;

        Ok(page)
    }

    /// Organisation or person name: the "About X" heading, then `h1`, then
    /// the slug.
    pub fn display_name(&self) -> String {
        self.about_name
            .clone()
            .or_else(|| self.h1.clone())
            .unwrap_or_else(|| title_from_slug(&self.slug))
    }

    /// Page title: `h1`, then the slug.
    pub fn title(&self) -> String {
        self.h1
            .clone()
            .unwrap_or_else(|| title_from_slug(&self.slug))
    }

    pub fn text(&self, keywords: &[&str]) -> Option<String> {
        section_text(&self.sections, keywords)
    }

    pub fn list(&self, keywords: &[&str]) -> Option<Vec<String>> {
        section_list(&self.sections, keywords)
    }

    /// Slugs linked from the page for the given content type.
    pub fn linked(&self, target: ContentType) -> Option<Vec<String>> {
        let marker = target.path_marker()?;
        let slugs = linked_slugs(&self.links, marker);
        (!slugs.is_empty()).then_some(slugs)
    }

    pub fn website(&self) -> Option<String> {
        self.contact.as_ref().and_then(|c| c.website.clone())
    }
}

fn about_name(heading: &str) -> Option<String> {
    let prefix = heading.get(..6)?;
    if !prefix.eq_ignore_ascii_case("about ") {
        return None;
    }
    non_empty(&heading[6..])
}

fn extract_meta(doc: &Document) -> PageMeta {
    let meta_content = |selector: &str| {
        doc.select_first(selector)
            .and_then(|node| node.attr("content"))
            .and_then(non_empty)
    };

    let mut tags: Vec<String> = Vec::new();
    for tag in doc.select("a[rel~=tag]") {
        let text = tag.text();
        if !text.is_empty() && !tags.contains(&text) {
            tags.push(text);
        }
    }

    PageMeta {
        description: meta_content(r#"meta[name="description"]"#)
            .or_else(|| meta_content(r#"meta[property="og:description"]"#)),
        author: doc
            .text_of(".author-name")
            .or_else(|| doc.text_of(r#"[rel="author"]"#))
            .or_else(|| doc.text_of(".author"))
            .or_else(|| meta_content(r#"meta[name="author"]"#)),
        published_at: doc
            .select_first("time[datetime]")
            .and_then(|time| time.attr("datetime"))
            .and_then(non_empty)
            .or_else(|| meta_content(r#"meta[property="article:published_time"]"#)),
        tags,
        og_image: meta_content(r#"meta[property="og:image"]"#),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_requires_slug() {
        let err = PageContent::new("https://www.bestinbrussels.eu/").unwrap_err();
        assert!(matches!(err, ParseError::MissingSlug { .. }));
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut page = PageContent::new("https://example.com/best_consultancies/acme-group/").unwrap();
        assert_eq!(page.display_name(), "Acme Group");

        page.h1 = Some("ACME".into());
        assert_eq!(page.display_name(), "ACME");

        page.about_name = Some("Acme Group SA".into());
        assert_eq!(page.display_name(), "Acme Group SA");
    }

    #[test]
    fn test_about_name() {
        assert_eq!(about_name("About Acme"), Some("Acme".to_string()));
        assert_eq!(about_name("ABOUT  Acme "), Some("Acme".to_string()));
        assert_eq!(about_name("About"), None);
        assert_eq!(about_name("Aboutique"), None);
    }

    #[test]
    fn test_extract_meta() {
        let doc = Document::parse(
            r#"<html><head>
                 <meta name="description" content=" Short summary. ">
                 <meta property="og:image" content="https://site/wp-content/uploads/a.jpg">
               </head><body>
                 <span class="author"><a href="/author/jo">Jo Bloggs</a></span>
                 <time datetime="2024-03-01T09:00:00+00:00">1 March</time>
                 <a rel="tag" href="/tag/energy">Energy</a>
                 <a rel="category tag" href="/tag/trade">Trade</a>
                 <a rel="tag" href="/tag/energy">Energy</a>
               </body></html>"#,
        );
        let meta = extract_meta(&doc);

        assert_eq!(meta.description.as_deref(), Some("Short summary."));
        assert_eq!(meta.author.as_deref(), Some("Jo Bloggs"));
        assert_eq!(meta.published_at.as_deref(), Some("2024-03-01T09:00:00+00:00"));
        assert_eq!(meta.tags, vec!["Energy", "Trade"]);
        assert_eq!(
            meta.og_image.as_deref(),
            Some("https://site/wp-content/uploads/a.jpg")
        );
    }

    #[test]
    fn test_every_content_type_has_a_parser() {
        let doc = Document::parse("<h1>Title</h1><p>Body text.</p>");
        for content_type in ContentType::ALL {
            let record = parser_for(content_type)("https://example.com/section/some-page/", &doc).unwrap();
            assert_eq!(record.content_type(), content_type);
            assert_eq!(record.slug(), "some-page");
        }
    }
}
