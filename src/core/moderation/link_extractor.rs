// Link extraction - pulls link-like tokens out of free text.
//
// The pattern list is fixed: generic http(s) URLs, Telegram deep links,
// @handles, and the common URL shorteners. Matching is case-insensitive.

use regex::Regex;

/// Ordered pattern list. Extraction reports matches pattern-by-pattern,
/// so a token matched by two patterns shows up twice; the classifier
/// counts it that way on purpose.
const LINK_PATTERNS: [&str; 10] = [
    r"https?://[^\s]+",      // http:// or https:// links
    r"t\.me/[^\s]+",         // t.me links
    r"telegram\.me/[^\s]+",  // telegram.me links
    r"@[a-zA-Z0-9_]+",       // @username
    r"bit\.ly/[^\s]+",       // bit.ly links
    r"tinyurl\.com/[^\s]+",  // tinyurl links
    r"goo\.gl/[^\s]+",       // goo.gl links
    r"is\.gd/[^\s]+",        // is.gd links
    r"v\.gd/[^\s]+",         // v.gd links
    r"ow\.ly/[^\s]+",        // ow.ly links
];

/// Compiled link patterns. Build one of these at startup and reuse it;
/// compilation is not free.
pub struct LinkExtractor {
    patterns: Vec<Regex>,
}

impl LinkExtractor {
    pub fn new() -> Self {
        let patterns = LINK_PATTERNS
            .iter()
            .map(|p| Regex::new(&format!("(?i){p}")).expect("valid link pattern"))
            .collect();
        Self { patterns }
    }

    /// Extract all link-like tokens from `text`, in pattern order then
    /// position order. Total over all inputs; empty text yields nothing.
    pub fn extract_links<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut links = Vec::new();
        for pattern in &self.patterns {
            for m in pattern.find_iter(text) {
                links.push(m.as_str());
            }
        }
        links
    }
}

impl Default for LinkExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Lower-cased host component of a URL, or `None` when the token has no
/// scheme (t.me/..., @handles). Schemeless tokens still count toward the
/// link volume but are never checked against the allow-set.
pub fn domain_of(url: &str) -> Option<String> {
    let (_, rest) = url.split_once("://")?;
    let host = rest
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    if host.is_empty() {
        None
    } else {
        Some(host.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_plain_urls() {
        let ex = LinkExtractor::new();
        let links = ex.extract_links("go to https://example.com/page now");
        assert_eq!(links, vec!["https://example.com/page"]);
    }

    #[test]
    fn extracts_shorteners_and_handles() {
        let ex = LinkExtractor::new();
        let links = ex.extract_links("see bit.ly/abc or ask @someone");
        assert!(links.contains(&"bit.ly/abc"));
        assert!(links.contains(&"@someone"));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let ex = LinkExtractor::new();
        let links = ex.extract_links("HTTPS://EXAMPLE.COM and T.ME/chan");
        assert_eq!(links.len(), 2);
    }

    #[test]
    fn pattern_order_comes_before_position_order() {
        let ex = LinkExtractor::new();
        // The @handle appears first in the text but its pattern is listed
        // after the http pattern, so the URL is reported first.
        let links = ex.extract_links("@first then http://second.com");
        assert_eq!(links, vec!["http://second.com", "@first"]);
    }

    #[test]
    fn overlapping_patterns_keep_duplicates() {
        let ex = LinkExtractor::new();
        // Matches both the https pattern and the t.me pattern.
        let links = ex.extract_links("https://t.me/channel");
        assert_eq!(links.len(), 2);
    }

    #[test]
    fn empty_text_yields_nothing() {
        let ex = LinkExtractor::new();
        assert!(ex.extract_links("").is_empty());
        assert!(ex.extract_links("no links here").is_empty());
    }

    #[test]
    fn domain_of_lowercases_host() {
        assert_eq!(domain_of("https://EXAMPLE.com/Path"), Some("example.com".to_string()));
        assert_eq!(domain_of("http://a.com?q=1"), Some("a.com".to_string()));
    }

    #[test]
    fn domain_of_schemeless_is_none() {
        assert_eq!(domain_of("t.me/channel"), None);
        assert_eq!(domain_of("@handle"), None);
    }
}
