// Environment-driven configuration.
//
// Everything the core needs is collected once here and passed around as
// an immutable value; no module reads the environment after startup.

use crate::core::moderation::ModerationConfig;
use anyhow::bail;
use std::collections::HashSet;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub moderation: ModerationConfig,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        // Not an error if missing; plain env vars work too.
        dotenv::dotenv().ok();

        let telegram_bot_token = env_str("TELEGRAM_BOT_TOKEN").unwrap_or_default();
        if telegram_bot_token.trim().is_empty() {
            bail!("TELEGRAM_BOT_TOKEN environment variable is required");
        }

        let defaults = ModerationConfig::default();
        let moderation = ModerationConfig {
            enabled: env_bool("ENABLE_SPAM_DETECTION").unwrap_or(defaults.enabled),
            allowed_domains: env_str("ALLOWED_DOMAINS")
                .map(|csv| parse_domains(&csv))
                .unwrap_or(defaults.allowed_domains),
            max_links_per_message: env_parse("MAX_LINKS_PER_MESSAGE")
                .unwrap_or(defaults.max_links_per_message),
            warnings_before_ban: env_parse("WARNINGS_BEFORE_BAN")
                .unwrap_or(defaults.warnings_before_ban),
            warning_system_enabled: env_bool("ENABLE_WARNING_SYSTEM")
                .unwrap_or(defaults.warning_system_enabled),
            block_forwarded: env_bool("BLOCK_FORWARDED_MESSAGES")
                .unwrap_or(defaults.block_forwarded),
            notice_delete_delay: env_parse("NOTICE_DELETE_DELAY_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.notice_delete_delay),
            templates: defaults.templates,
        };

        Ok(Self {
            telegram_bot_token,
            moderation,
        })
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_bool(key: &str) -> Option<bool> {
    env_str(key).map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_str(key).and_then(|v| v.trim().parse().ok())
}

fn parse_domains(csv: &str) -> HashSet<String> {
    csv.split(',')
        .map(|d| d.trim().to_lowercase())
        .filter(|d| !d.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_domains_lowercases_and_trims() {
        let domains = parse_domains("Example.com, docs.rs ,,");
        assert!(domains.contains("example.com"));
        assert!(domains.contains("docs.rs"));
        assert_eq!(domains.len(), 2);
    }
}
