//! Content types and the records scraped for each of them.
//!
//! Parsers produce typed records. Everything after parsing (image swap,
//! `original<Field>` stamping, rewriting, persistence) works on a
//! [`RecordDocument`], the record's JSON object form, driven by the
//! per-type [`RewriteField`] tables below.

use std::fmt;

use indexmap::IndexMap;
use serde::ser::Error as _;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ParseResult;

// =============================================================================
// Content types
// =============================================================================

/// The kinds of page the directory publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Consultancy,
    Consultant,
    LawFirm,
    IntelligenceSystem,
    DigitalTool,
    Trainer,
    SpecialistCategory,
    Article,
    EditorialPage,
}

impl ContentType {
    /// Every content type, in crawl order.
    pub const ALL: [ContentType; 9] = [
        ContentType::Consultancy,
        ContentType::Consultant,
        ContentType::LawFirm,
        ContentType::IntelligenceSystem,
        ContentType::DigitalTool,
        ContentType::Trainer,
        ContentType::SpecialistCategory,
        ContentType::Article,
        ContentType::EditorialPage,
    ];

    /// Human-readable name used in logs and prompts.
    pub fn label(self) -> &'static str {
        match self {
            ContentType::Consultancy => "consultancy",
            ContentType::Consultant => "consultant",
            ContentType::LawFirm => "law firm",
            ContentType::IntelligenceSystem => "intelligence system",
            ContentType::DigitalTool => "digital tool",
            ContentType::Trainer => "trainer",
            ContentType::SpecialistCategory => "specialist category",
            ContentType::Article => "article",
            ContentType::EditorialPage => "editorial page",
        }
    }

    /// Document-store collection the records are upserted into.
    pub fn collection(self) -> &'static str {
        match self {
            ContentType::Consultancy => "consultancies",
            ContentType::Consultant => "consultants",
            ContentType::LawFirm => "lawfirms",
            ContentType::IntelligenceSystem => "intelligencesystems",
            ContentType::DigitalTool => "digitaltools",
            ContentType::Trainer => "trainers",
            ContentType::SpecialistCategory => "specialistcategories",
            ContentType::Article => "articles",
            ContentType::EditorialPage => "editorialpages",
        }
    }

    /// Directory under the public image root.
    pub fn image_bucket(self) -> &'static str {
        match self {
            ContentType::Consultancy => "consultancies",
            ContentType::Consultant => "consultants",
            ContentType::LawFirm => "law-firms",
            ContentType::IntelligenceSystem => "intelligence-systems",
            ContentType::DigitalTool => "digital-tools",
            ContentType::Trainer => "trainers",
            ContentType::SpecialistCategory => "specialist-categories",
            ContentType::Article => "articles",
            ContentType::EditorialPage => "pages",
        }
    }

    /// Record field holding the representative image.
    pub fn image_field(self) -> &'static str {
        match self {
            ContentType::Consultant => "photo",
            ContentType::SpecialistCategory | ContentType::EditorialPage => "image",
            ContentType::Article => "featuredImage",
            _ => "logo",
        }
    }

    /// Text fields sent to the rewrite service, with their audit-copy keys.
    pub fn rewrite_fields(self) -> &'static [RewriteField] {
        match self {
            ContentType::Consultancy => CONSULTANCY_REWRITES,
            ContentType::Consultant => CONSULTANT_REWRITES,
            ContentType::Article => ARTICLE_REWRITES,
            ContentType::EditorialPage => EDITORIAL_REWRITES,
            _ => DESCRIPTION_REWRITES,
        }
    }

    /// Sitemap-style index listing every page of this type.
    pub fn index_path(self) -> Option<&'static str> {
        match self {
            ContentType::Consultancy => Some("/best_consultancies-sitemap.xml"),
            ContentType::Consultant => Some("/best_consultants-sitemap.xml"),
            ContentType::LawFirm => Some("/best_law_firms-sitemap.xml"),
            ContentType::IntelligenceSystem => Some("/intelligence_systems-sitemap.xml"),
            ContentType::DigitalTool => Some("/digital_tools-sitemap.xml"),
            ContentType::Trainer => Some("/trainers-sitemap.xml"),
            ContentType::SpecialistCategory => Some("/specialist_categories-sitemap.xml"),
            ContentType::Article => Some("/post-sitemap.xml"),
            ContentType::EditorialPage => None,
        }
    }

    /// Path fragment identifying links to pages of this type.
    pub fn path_marker(self) -> Option<&'static str> {
        match self {
            ContentType::Consultancy => Some("/best_consultancies/"),
            ContentType::Consultant => Some("/best_consultants/"),
            ContentType::LawFirm => Some("/best_law_firms/"),
            ContentType::IntelligenceSystem => Some("/intelligence_systems/"),
            ContentType::DigitalTool => Some("/digital_tools/"),
            ContentType::Trainer => Some("/trainers/"),
            ContentType::SpecialistCategory => Some("/specialist_categories/"),
            ContentType::Article | ContentType::EditorialPage => None,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Rewrite tables
// =============================================================================

/// A rewritable text field and the key its pre-rewrite value is kept under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewriteField {
    pub field: &'static str,
    pub original: &'static str,
}

impl RewriteField {
    pub const fn new(field: &'static str, original: &'static str) -> Self {
        Self { field, original }
    }
}

const CONSULTANCY_REWRITES: &[RewriteField] = &[
    RewriteField::new("description", "originalDescription"),
    RewriteField::new("achievements", "originalAchievements"),
];

const CONSULTANT_REWRITES: &[RewriteField] =
    &[RewriteField::new("biography", "originalBiography")];

const DESCRIPTION_REWRITES: &[RewriteField] =
    &[RewriteField::new("description", "originalDescription")];

const ARTICLE_REWRITES: &[RewriteField] = &[
    RewriteField::new("excerpt", "originalExcerpt"),
    RewriteField::new("content", "originalContent"),
];

const EDITORIAL_REWRITES: &[RewriteField] = &[RewriteField::new("content", "originalContent")];

// =============================================================================
// Records
// =============================================================================

/// Contact block shared by organisation records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl ContactInfo {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.phone.is_none() && self.website.is_none() && self.address.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consultancy {
    pub slug: String,
    pub source_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialisms: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clients: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub achievements: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<ContactInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Consultant slugs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_consultants: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_achievements: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consultant {
    pub slug: String,
    pub source_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    /// Consultancy slug
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consultancy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biography: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expertise: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<ContactInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_biography: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LawFirm {
    pub slug: String,
    pub source_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub practice_areas: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_lawyers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offices: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<ContactInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntelligenceSystem {
    pub slug: String,
    pub source_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_users: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigitalTool {
    pub slug: String,
    pub source_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_cases: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trainer {
    pub slug: String,
    pub source_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub courses: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formats: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<ContactInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialistCategory {
    pub slug: String,
    pub source_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Consultancy slugs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consultancies: Option<Vec<String>>,
    /// Law firm slugs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub law_firms: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub slug: String,
    pub source_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_content: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorialPage {
    pub slug: String,
    pub source_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Site path, e.g. `/eu-affairs-guide/lobbying/`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_content: Option<String>,
}

/// One scraped record of any content type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScrapedRecord {
    Consultancy(Consultancy),
    Consultant(Consultant),
    LawFirm(LawFirm),
    IntelligenceSystem(IntelligenceSystem),
    DigitalTool(DigitalTool),
    Trainer(Trainer),
    SpecialistCategory(SpecialistCategory),
    Article(Article),
    EditorialPage(EditorialPage),
}

impl ScrapedRecord {
    pub fn content_type(&self) -> ContentType {
        match self {
            ScrapedRecord::Consultancy(_) => ContentType::Consultancy,
            ScrapedRecord::Consultant(_) => ContentType::Consultant,
            ScrapedRecord::LawFirm(_) => ContentType::LawFirm,
            ScrapedRecord::IntelligenceSystem(_) => ContentType::IntelligenceSystem,
            ScrapedRecord::DigitalTool(_) => ContentType::DigitalTool,
            ScrapedRecord::Trainer(_) => ContentType::Trainer,
            ScrapedRecord::SpecialistCategory(_) => ContentType::SpecialistCategory,
            ScrapedRecord::Article(_) => ContentType::Article,
            ScrapedRecord::EditorialPage(_) => ContentType::EditorialPage,
        }
    }

    pub fn slug(&self) -> &str {
        match self {
            ScrapedRecord::Consultancy(r) => &r.slug,
            ScrapedRecord::Consultant(r) => &r.slug,
            ScrapedRecord::LawFirm(r) => &r.slug,
            ScrapedRecord::IntelligenceSystem(r) => &r.slug,
            ScrapedRecord::DigitalTool(r) => &r.slug,
            ScrapedRecord::Trainer(r) => &r.slug,
            ScrapedRecord::SpecialistCategory(r) => &r.slug,
            ScrapedRecord::Article(r) => &r.slug,
            ScrapedRecord::EditorialPage(r) => &r.slug,
        }
    }

    /// JSON object form used by the rest of the pipeline.
    pub fn to_document(&self) -> ParseResult<RecordDocument> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(RecordDocument(map)),
            _ => Err(serde_json::Error::custom("record did not serialize to an object").into()),
        }
    }
}

macro_rules! impl_from_record {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for ScrapedRecord {
                fn from(record: $variant) -> Self {
                    ScrapedRecord::$variant(record)
                }
            }
        )*
    };
}

impl_from_record!(
    Consultancy,
    Consultant,
    LawFirm,
    IntelligenceSystem,
    DigitalTool,
    Trainer,
    SpecialistCategory,
    Article,
    EditorialPage,
);

// =============================================================================
// Record documents
// =============================================================================

/// A record as a flat JSON object, ready for the document store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordDocument(Map<String, Value>);

impl RecordDocument {
    pub fn slug(&self) -> Option<&str> {
        self.text("slug")
    }

    /// String value of `field`, if it is a non-empty string.
    pub fn text(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .and_then(Value::as_str)
            .filter(|text| !text.trim().is_empty())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    /// Copy each present rewritable field to its `original<Field>` key.
    pub fn stamp_originals(&mut self, fields: &[RewriteField]) {
        for rewrite in fields {
            if let Some(text) = self.text(rewrite.field).map(str::to_string) {
                self.set(rewrite.original, text);
            }
        }
    }

    /// The rewritable fields that currently hold text, in table order.
    pub fn rewrite_input(&self, fields: &[RewriteField]) -> IndexMap<String, String> {
        fields
            .iter()
            .filter_map(|rewrite| {
                self.text(rewrite.field)
                    .map(|text| (rewrite.field.to_string(), text.to_string()))
            })
            .collect()
    }

    /// Write rewritten values back. Only fields named in `fields` are touched.
    pub fn apply_rewrites(&mut self, fields: &[RewriteField], rewritten: &IndexMap<String, String>) {
        for rewrite in fields {
            if let Some(text) = rewritten.get(rewrite.field).filter(|t| !t.trim().is_empty()) {
                self.set(rewrite.field, text.clone());
            }
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for RecordDocument {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
