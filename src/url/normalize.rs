use crate::config::SiteConfig;

/// Converts between fetchable wiki addresses and canonical page names
///
/// A page name is the part of an address that follows one of the site's
/// prefixes, e.g. `Main/HomePage` for
/// `http://tvtropes.org/pmwiki/pmwiki.php/Main/HomePage`.
#[derive(Debug, Clone)]
pub struct LinkNormalizer {
    /// Prefixes tried in order; the first one is used by `expand`
    prefixes: Vec<String>,
    query_marker: String,
}

impl LinkNormalizer {
    /// Creates a normalizer from an ordered prefix list and a query marker
    ///
    /// `prefixes` must not be empty; the configuration validator enforces this.
    pub fn new(prefixes: Vec<String>, query_marker: impl Into<String>) -> Self {
        Self {
            prefixes,
            query_marker: query_marker.into(),
        }
    }

    /// Builds a normalizer from the `[site]` configuration section
    pub fn from_config(site: &SiteConfig) -> Self {
        Self::new(site.prefixes.clone(), site.query_marker.clone())
    }

    /// The canonical (absolute) prefix
    pub fn canonical_prefix(&self) -> &str {
        self.prefixes.first().map(String::as_str).unwrap_or_default()
    }

    /// Reduces a raw link to a page name
    ///
    /// Returns `None` when the link is absolute but points outside the wiki,
    /// or when nothing usable is left after stripping. Links that are neither
    /// absolute nor prefixed are kept as they are.
    ///
    /// # Examples
    ///
    /// ```
    /// use wikirank::url::LinkNormalizer;
    ///
    /// let normalizer = LinkNormalizer::new(
    ///     vec![
    ///         "http://tvtropes.org/pmwiki/pmwiki.php/".to_string(),
    ///         "/pmwiki/pmwiki.php/".to_string(),
    ///     ],
    ///     "?from",
    /// );
    ///
    /// assert_eq!(
    ///     normalizer.normalize("/pmwiki/pmwiki.php/Main/Foo?from=Main.Bar").as_deref(),
    ///     Some("Main/Foo")
    /// );
    /// assert_eq!(normalizer.normalize("https://elsewhere.org/page"), None);
    /// ```
    pub fn normalize(&self, raw: &str) -> Option<String> {
        let stripped = match self
            .prefixes
            .iter()
            .find_map(|prefix| raw.strip_prefix(prefix.as_str()))
        {
            Some(rest) => rest,
            None if raw.starts_with("http") => return None,
            None => raw,
        };

        let name = match stripped.find(&self.query_marker) {
            Some(end) => &stripped[..end],
            None => stripped,
        };

        // Names become whitespace-delimited edge log tokens
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return None;
        }

        Some(name.to_string())
    }

    /// Turns a page name back into a fetchable address
    pub fn expand(&self, name: &str) -> String {
        format!("{}{}", self.canonical_prefix(), name)
    }
}

impl Default for LinkNormalizer {
    fn default() -> Self {
        Self::from_config(&SiteConfig::default())
    }
}
