use crate::error::ParseResult;
use crate::html::Document;
use crate::records::{Article, ScrapedRecord};

use super::PageContent;

pub fn parse_article(url: &str, doc: &Document) -> ParseResult<ScrapedRecord> {
    let page = PageContent::extract(url, doc)?;
    Ok(article_from_page(&page).into())
}

pub fn article_from_page(page: &PageContent) -> Article {
    Article {
        slug: page.slug.clone(),
        source_url: page.source_url.clone(),
        title: Some(page.title()),
        excerpt: page.meta.description.clone().or_else(|| page.intro.clone()),
        content: page.content.clone(),
        author: page.meta.author.clone(),
        published_at: page.meta.published_at.clone(),
        tags: (!page.meta.tags.is_empty()).then(|| page.meta.tags.clone()),
        featured_image: page.image.clone().or_else(|| page.meta.og_image.clone()),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_article() {
        let doc = Document::parse(
            r#"<html><head>
                 <meta property="og:image" content="https://www.bestinbrussels.eu/wp-content/uploads/cover.jpg">
               </head><body>
                 <h1>Five trends in EU lobbying</h1>
                 <span class="author">Jo Bloggs</span>
                 <time datetime="2024-05-02">2 May 2024</time>
                 <div class="entry-content">
                   <p>Lobbying is changing fast.</p>
                   <p>Here is why.</p>
                 </div>
                 <a rel="tag" href="/tag/lobbying">Lobbying</a>
               </body></html>"#,
        );

        let ScrapedRecord::Article(article) = parse_article(
            "https://www.bestinbrussels.eu/five-trends-in-eu-lobbying/",
            &doc,
        )
        .unwrap() else {
            panic!("expected an article");
        };

        assert_eq!(article.slug, "five-trends-in-eu-lobbying");
        assert_eq!(article.title.as_deref(), Some("Five trends in EU lobbying"));
        assert_eq!(article.excerpt.as_deref(), Some("Lobbying is changing fast."));
        assert_eq!(
            article.content.as_deref(),
            Some("Lobbying is changing fast. Here is why.")
        );
        assert_eq!(article.author.as_deref(), Some("Jo Bloggs"));
        assert_eq!(article.published_at.as_deref(), Some("2024-05-02"));
        assert_eq!(article.tags, Some(vec!["Lobbying".into()]));
        assert_eq!(
            article.featured_image.as_deref(),
            Some("https://www.bestinbrussels.eu/wp-content/uploads/cover.jpg")
        );
    }

    #[test]
    fn test_text_after_closing_paragraph_keeps_its_space() {
        let doc = Document::parse(
            r#"<h1>Trends</h1><div class="entry-content"><p>Lobbying is changing.</p>Here is why.</div>"#,
        );

        let ScrapedRecord::Article(article) =
            parse_article("https://www.bestinbrussels.eu/trends/", &doc).unwrap()
        else {
            panic!("expected an article");
        };

        assert_eq!(
            article.content.as_deref(),
            Some("Lobbying is changing. Here is why.")
        );
    }
}
