//! HTML parser for extracting wiki links
//!
//! Only anchors with the configured link class that sit beneath the element
//! with the configured content id count as links. Navigation, sidebars and
//! other page chrome are ignored.

use scraper::{Html, Selector};

/// Compiled query for the wiki links of an article body
#[derive(Debug, Clone)]
pub struct ContentQuery {
    selector: Selector,
}

impl ContentQuery {
    /// Compiles `#<content_id> a.<link_class>[href]`
    ///
    /// Returns a description of the problem when either name does not form a
    /// valid CSS selector.
    pub fn new(content_id: &str, link_class: &str) -> Result<Self, String> {
        let query = format!("#{} a.{}[href]", content_id, link_class);
        let selector = Selector::parse(&query)
            .map_err(|e| format!("invalid content query '{}': {:?}", query, e))?;
        Ok(Self { selector })
    }

    /// Raw `href` values of every matching anchor, in document order
    pub fn extract(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        document
            .select(&self.selector)
            .filter_map(|element| element.value().attr("href"))
            .map(str::to_string)
            .collect()
    }
}

/// Extracts the wiki links of a page body
///
/// Invalid content ids or link classes yield no links.
///
/// # Example
///
/// ```
/// use wikirank::crawler::extract_wiki_links;
///
/// let html = r#"<div id="wikitext">
///     <a class="twikilink" href="/pmwiki/pmwiki.php/Main/Foo">Foo</a>
///     <a class="urllink" href="https://elsewhere.org">out</a>
/// </div>"#;
/// assert_eq!(
///     extract_wiki_links(html, "wikitext", "twikilink"),
///     vec!["/pmwiki/pmwiki.php/Main/Foo".to_string()]
/// );
/// ```
pub fn extract_wiki_links(html: &str, content_id: &str, link_class: &str) -> Vec<String> {
    match ContentQuery::new(content_id, link_class) {
        Ok(query) => query.extract(html),
        Err(e) => {
            tracing::debug!("{}", e);
            Vec::new()
        }
    }
}
