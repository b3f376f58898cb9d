//! Thin query interface over parsed HTML.
//!
//! Parsers only see [`Document`] and [`Node`]: `select`, `find`, `text`,
//! `attr`. Invalid selectors match nothing instead of failing.

use scraper::{ElementRef, Html, Node as DomNode, Selector};
use tracing::debug;

use crate::utils::clean_text;

/// Tags whose boundaries separate words when flattening text.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption", "footer",
    "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "ol", "p", "section",
    "table", "td", "th", "tr", "ul",
];

const LIST_TAGS: &[&str] = &["ul", "ol", "li"];

/// Tags whose text never counts as content.
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template"];

fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            debug!(selector = selector, error = ?e, "Ignoring invalid selector");
            None
        }
    }
}

/// A parsed HTML page.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parse a full HTML document. html5ever recovers from any input, so this
    /// never fails.
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// All elements matching `selector`, in document order.
    pub fn select(&self, selector: &str) -> Vec<Node<'_>> {
        match parse_selector(selector) {
            Some(selector) => self.html.select(&selector).map(Node::new).collect(),
            None => Vec::new(),
        }
    }

    /// First element matching `selector`.
    pub fn select_first(&self, selector: &str) -> Option<Node<'_>> {
        let selector = parse_selector(selector)?;
        self.html.select(&selector).next().map(Node::new)
    }

    /// Cleaned text of the first element matching `selector`, if non-empty.
    pub fn text_of(&self, selector: &str) -> Option<String> {
        self.select_first(selector)
            .map(|node| node.text())
            .filter(|text| !text.is_empty())
    }

    /// The `<html>` element.
    pub fn root(&self) -> Node<'_> {
        Node::new(self.html.root_element())
    }
}

/// An element inside a [`Document`].
#[derive(Clone, Copy)]
pub struct Node<'a> {
    element: ElementRef<'a>,
}

impl<'a> Node<'a> {
    fn new(element: ElementRef<'a>) -> Self {
        Self { element }
    }

    /// Lowercase tag name.
    pub fn tag_name(&self) -> &'a str {
        self.element.value().name()
    }

    /// Attribute value, if present.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Descendants matching `selector` (the node itself is not considered).
    pub fn find(&self, selector: &str) -> Vec<Node<'a>> {
        match parse_selector(selector) {
            Some(selector) => self.element.select(&selector).map(Node::new).collect(),
            None => Vec::new(),
        }
    }

    /// First descendant matching `selector`.
    pub fn find_first(&self, selector: &str) -> Option<Node<'a>> {
        let selector = parse_selector(selector)?;
        self.element.select(&selector).next().map(Node::new)
    }

    /// Cleaned text content, with block boundaries turned into spaces.
    pub fn text(&self) -> String {
        self.collect_text(false)
    }

    /// Cleaned text content, leaving out anything inside `ul`/`ol`/`li`.
    pub fn text_without_lists(&self) -> String {
        if LIST_TAGS.contains(&self.tag_name()) {
            return String::new();
        }
        self.collect_text(true)
    }

    /// `h1`..`h6` level, if this is a heading.
    pub fn heading_level(&self) -> Option<u8> {
        match self.tag_name() {
            "h1" => Some(1),
            "h2" => Some(2),
            "h3" => Some(3),
            "h4" => Some(4),
            "h5" => Some(5),
            "h6" => Some(6),
            _ => None,
        }
    }

    /// Following sibling elements, in document order.
    pub fn next_siblings(&self) -> impl Iterator<Item = Node<'a>> {
        self.element.next_siblings().filter_map(ElementRef::wrap).map(Node::new)
    }

    /// Parent element, if any.
    pub fn parent(&self) -> Option<Node<'a>> {
        self.element.parent().and_then(ElementRef::wrap).map(Node::new)
    }

    fn collect_text(&self, skip_lists: bool) -> String {
        let mut raw = String::new();
        push_text(self.element, skip_lists, &mut raw);
        clean_text(&raw)
    }
}

/// Append the text under `element`, padding both edges of block elements
/// so words on either side of a `</p>` or `<li>` stay apart.
fn push_text(element: ElementRef<'_>, skip_lists: bool, raw: &mut String) {
    for child in element.children() {
        match child.value() {
            DomNode::Text(text) => raw.push_str(text),
            DomNode::Element(tag) => {
                let name = tag.name();
                if HIDDEN_TAGS.contains(&name) || (skip_lists && LIST_TAGS.contains(&name)) {
                    continue;
                }
                let block = BLOCK_TAGS.contains(&name);
                if block {
                    raw.push(' ');
                }
                if let Some(child) = ElementRef::wrap(child) {
                    push_text(child, skip_lists, raw);
                }
                if block {
                    raw.push(' ');
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_and_text() {
        let doc = Document::parse(
            "<html><body><h1> Acme <em>Consultants</em> </h1><p>One</p><p>Two</p></body></html>",
        );

        assert_eq!(doc.text_of("h1"), Some("Acme Consultants".to_string()));
        assert_eq!(doc.select("p").len(), 2);
        assert_eq!(doc.root().find_first("body").unwrap().text(), "Acme Consultants One Two");
    }

    #[test]
    fn test_invalid_selector_matches_nothing() {
        let doc = Document::parse("<p>x</p>");
        assert!(doc.select("p[").is_empty());
        assert!(doc.select_first(":::").is_none());
    }

    #[test]
    fn test_attr_and_find() {
        let doc = Document::parse(
            r#"<div class="entry-content"><a href="/a">A</a><span><a href="/b">B</a></span></div>"#,
        );
        let content = doc.select_first(".entry-content").unwrap();
        let hrefs: Vec<_> = content.find("a[href]").iter().filter_map(|a| a.attr("href")).collect();

        assert_eq!(hrefs, vec!["/a", "/b"]);
        assert_eq!(content.tag_name(), "div");
    }

    #[test]
    fn test_text_without_lists() {
        let doc = Document::parse("<div id='x'>Intro<ul><li>One</li><li>Two</li></ul>Outro</div>");
        let div = doc.select_first("#x").unwrap();

        assert_eq!(div.text(), "Intro One Two Outro");
        assert_eq!(div.text_without_lists(), "Intro Outro");
    }

    #[test]
    fn test_closing_block_tags_separate_words() {
        let doc = Document::parse(
            "<div id='x'><p>Lobbying is changing.</p>Here is why.<ul><li>One</li></ul>Done</div>",
        );
        let div = doc.select_first("#x").unwrap();

        assert_eq!(div.text(), "Lobbying is changing. Here is why. One Done");
        assert_eq!(div.text_without_lists(), "Lobbying is changing. Here is why. Done");
    }

    #[test]
    fn test_script_bodies_are_dropped() {
        let doc = Document::parse("<div id='x'>Hello<script>var a = {b: 1};</script></div>");
        assert_eq!(doc.select_first("#x").unwrap().text(), "Hello");
    }

    #[test]
    fn test_heading_level_and_siblings() {
        let doc = Document::parse("<body><h2>A</h2><p>x</p><h3>B</h3></body>");
        let h2 = doc.select_first("h2").unwrap();

        assert_eq!(h2.heading_level(), Some(2));
        let tags: Vec<_> = h2.next_siblings().map(|n| n.tag_name()).collect();
        assert_eq!(tags, vec!["p", "h3"]);
        assert_eq!(h2.parent().unwrap().tag_name(), "body");
    }
}
