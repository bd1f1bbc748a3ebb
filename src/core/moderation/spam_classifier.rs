// Content signal analysis - turns a message body into a Classification.
//
// Every check runs and contributes an additive confidence bucket:
//   link volume / disallowed domains   0.4 (one contribution, even if both fire)
//   repetition / excessive caps        0.3 (one contribution, even if both fire)
//   suspicious keywords                0.2
// A message is spam once confidence exceeds 0.3, so the link bucket alone
// is enough while the content bucket alone is not.

use super::link_extractor::{domain_of, LinkExtractor};
use super::moderation_models::{Classification, ModerationConfig};
use std::collections::HashMap;

const SPAM_THRESHOLD: f64 = 0.3;

const LINK_CONFIDENCE: f64 = 0.4;
const CONTENT_CONFIDENCE: f64 = 0.3;
const KEYWORD_CONFIDENCE: f64 = 0.2;

/// Words longer than this participate in the repetition check.
const MIN_REPEAT_WORD_LEN: usize = 3;
/// A word repeated more often than this is a spam signal.
const MAX_WORD_REPEATS: usize = 3;
/// Upper-case ratio above which a message counts as shouting.
const MAX_CAPS_RATIO: f64 = 0.7;

const SUSPICIOUS_KEYWORDS: [&str; 14] = [
    "earn money",
    "make money",
    "quick money",
    "investment",
    "bitcoin",
    "crypto",
    "forex",
    "trading",
    "casino",
    "lottery",
    "prize",
    "winner",
    "free iphone",
    "gift card",
];

/// Rule-based spam classifier. Holds the compiled link patterns; one
/// instance is shared across all message processing.
pub struct SpamClassifier {
    extractor: LinkExtractor,
}

impl SpamClassifier {
    pub fn new() -> Self {
        Self {
            extractor: LinkExtractor::new(),
        }
    }

    /// Link-volume and disallowed-domain checks for one field.
    ///
    /// Returns the list of violation reasons; an empty list means the
    /// field's links (if any) are all within policy. This is what the
    /// decision engine keys enforcement on.
    pub fn link_signals(&self, text: &str, config: &ModerationConfig) -> Vec<String> {
        let links = self.extractor.extract_links(text);
        let mut reasons = Vec::new();

        if links.len() > config.max_links_per_message {
            reasons.push(format!(
                "Too many links ({} > {})",
                links.len(),
                config.max_links_per_message
            ));
        }

        // Deduplicated, first-seen order.
        let mut offending: Vec<String> = Vec::new();
        for link in &links {
            if let Some(domain) = domain_of(link) {
                if !config.allowed_domains.contains(&domain) && !offending.contains(&domain) {
                    offending.push(domain);
                }
            }
        }
        if !offending.is_empty() {
            reasons.push(format!("Suspicious domains: {}", offending.join(", ")));
        }

        reasons
    }

    /// Repetition and capitalization checks.
    fn content_signals(&self, text: &str) -> Vec<String> {
        let mut reasons = Vec::new();

        let lowered = text.to_lowercase();
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut order: Vec<&str> = Vec::new();
        for word in lowered.split_whitespace() {
            if word.chars().count() > MIN_REPEAT_WORD_LEN {
                let count = counts.entry(word).or_insert(0);
                if *count == 0 {
                    order.push(word);
                }
                *count += 1;
            }
        }
        let repeated: Vec<&str> = order
            .into_iter()
            .filter(|w| counts[w] > MAX_WORD_REPEATS)
            .collect();
        if !repeated.is_empty() {
            reasons.push(format!("Repetitive words: {}", repeated.join(", ")));
        }

        let total = text.chars().count();
        if total > 0 {
            let upper = text.chars().filter(|c| c.is_uppercase()).count();
            if upper as f64 / total as f64 > MAX_CAPS_RATIO {
                reasons.push("Excessive capitalization".to_string());
            }
        }

        reasons
    }

    /// Case-insensitive substring matches against the keyword list,
    /// in list order.
    fn keyword_signals(&self, text: &str) -> Vec<&'static str> {
        let lowered = text.to_lowercase();
        SUSPICIOUS_KEYWORDS
            .iter()
            .copied()
            .filter(|kw| lowered.contains(kw))
            .collect()
    }

    /// Complete spam analysis of one message body. Total over all string
    /// inputs; never fails.
    pub fn analyze(&self, text: &str, config: &ModerationConfig) -> Classification {
        if text.is_empty() {
            return Classification::clean();
        }

        let mut reasons = Vec::new();
        let mut confidence = 0.0;

        let link_reasons = self.link_signals(text, config);
        if !link_reasons.is_empty() {
            reasons.extend(link_reasons);
            confidence += LINK_CONFIDENCE;
        }

        let content_reasons = self.content_signals(text);
        if !content_reasons.is_empty() {
            reasons.extend(content_reasons);
            confidence += CONTENT_CONFIDENCE;
        }

        let keywords = self.keyword_signals(text);
        if !keywords.is_empty() {
            reasons.push(format!("Suspicious keywords: {}", keywords.join(", ")));
            confidence += KEYWORD_CONFIDENCE;
        }

        Classification {
            is_spam: confidence > SPAM_THRESHOLD,
            reasons,
            confidence,
        }
    }
}

impl Default for SpamClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ModerationConfig {
        ModerationConfig::default()
    }

    #[test]
    fn empty_text_is_clean() {
        let classifier = SpamClassifier::new();
        let result = classifier.analyze("", &config());
        assert!(!result.is_spam);
        assert_eq!(result.confidence, 0.0);
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn plain_text_is_clean() {
        let classifier = SpamClassifier::new();
        let result = classifier.analyze("hello there, how are you?", &config());
        assert!(!result.is_spam);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn two_links_with_zero_allowance_trip_both_link_reasons() {
        let classifier = SpamClassifier::new();
        let result = classifier.analyze("http://a.com http://b.com", &config());
        assert!(result.is_spam);
        assert!(result.reasons.iter().any(|r| r.contains("Too many links")));
        assert!(result
            .reasons
            .iter()
            .any(|r| r.contains("a.com") && r.contains("b.com")));
        // Volume and domain share one 0.4 bucket.
        assert!((result.confidence - 0.4).abs() < 1e-9);
    }

    #[test]
    fn allowed_domains_within_limit_contribute_nothing() {
        let classifier = SpamClassifier::new();
        let mut cfg = config();
        cfg.max_links_per_message = 2;
        cfg.allowed_domains.insert("example.com".to_string());
        let result = classifier.analyze("docs at https://example.com/help", &cfg);
        assert!(!result.is_spam);
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn disallowed_domain_flags_even_under_volume_limit() {
        let classifier = SpamClassifier::new();
        let mut cfg = config();
        cfg.max_links_per_message = 5;
        let result = classifier.analyze("see https://scam.example", &cfg);
        assert!(result.is_spam);
        assert_eq!(result.reasons, vec!["Suspicious domains: scam.example".to_string()]);
    }

    #[test]
    fn offending_domains_dedupe_in_first_seen_order() {
        let classifier = SpamClassifier::new();
        let mut cfg = config();
        cfg.max_links_per_message = 10;
        let result = classifier.analyze("http://b.com http://a.com http://b.com", &cfg);
        assert!(result
            .reasons
            .iter()
            .any(|r| r.contains("b.com, a.com")));
    }

    #[test]
    fn repetition_alone_stays_below_threshold() {
        let classifier = SpamClassifier::new();
        let result = classifier.analyze("promo promo promo promo promo", &config());
        assert!(!result.is_spam);
        assert!((result.confidence - 0.3).abs() < 1e-9);
        assert!(result.reasons.iter().any(|r| r.contains("promo")));
    }

    #[test]
    fn short_words_are_skipped_by_repetition_check() {
        let classifier = SpamClassifier::new();
        let result = classifier.analyze("buy buy buy buy buy buy", &config());
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn shouting_is_a_content_signal() {
        let classifier = SpamClassifier::new();
        let result = classifier.analyze("BUYNOWBUYNOWBUYNOW", &config());
        assert!(result
            .reasons
            .contains(&"Excessive capitalization".to_string()));
        assert!((result.confidence - 0.3).abs() < 1e-9);
    }

    #[test]
    fn caps_and_repetition_share_one_bucket() {
        let classifier = SpamClassifier::new();
        let result = classifier.analyze("SPAM SPAM SPAM SPAM SPAM", &config());
        assert!((result.confidence - 0.3).abs() < 1e-9);
        assert_eq!(result.reasons.len(), 2);
    }

    #[test]
    fn keywords_push_content_signals_over_the_threshold() {
        let classifier = SpamClassifier::new();
        let result = classifier.analyze("WIN A FREE IPHONE TODAYYY", &config());
        // caps (0.3) + keyword (0.2)
        assert!(result.is_spam);
        assert!((result.confidence - 0.5).abs() < 1e-9);
        assert!(result
            .reasons
            .iter()
            .any(|r| r.contains("free iphone")));
    }

    #[test]
    fn keyword_match_is_case_insensitive_substring() {
        let classifier = SpamClassifier::new();
        let result = classifier.analyze("Great BITCOIN opportunity", &config());
        assert!(result.reasons.iter().any(|r| r.contains("bitcoin")));
        assert!((result.confidence - 0.2).abs() < 1e-9);
        assert!(!result.is_spam);
    }

    #[test]
    fn all_buckets_stack_additively() {
        let classifier = SpamClassifier::new();
        let result = classifier.analyze(
            "CASINO CASINO CASINO CASINO WIN http://scam.example",
            &config(),
        );
        // link 0.4 + content 0.3 + keyword 0.2
        assert!(result.is_spam);
        assert!((result.confidence - 0.9).abs() < 1e-9);
    }
}
