//! Semantic validation of a loaded [`Config`](crate::model::Config).

use regex::Regex;

use crate::error::{ConfigError, ConfigResult};
use crate::model::Config;

/// Validate a fully-parsed configuration document.
///
/// Checks that cannot be expressed by serde's shape alone: a client backend
/// must be selected, at least one site must be configured and enabled, and
/// every regex rule must actually compile.
pub fn validate(config: &Config) -> ConfigResult<()> {
    if config.pt.pt_client.is_none() {
        return Err(ConfigError::Fatal {
            reason: "pt.pt_client must be set to select a torrent client backend".to_string(),
        });
    }

    if config.sites.is_empty() {
        return Err(ConfigError::Fatal {
            reason: "at least one site must be configured".to_string(),
        });
    }

    if !config.sites.iter().any(|site| site.enabled) {
        return Err(ConfigError::Fatal {
            reason: "at least one configured site must be enabled".to_string(),
        });
    }

    for (index, site) in config.sites.iter().enumerate() {
        validate_site(index, site)?;
    }

    for (index, pattern) in config.rss_rule.note.iter().enumerate() {
        compile_rule(pattern)
            .map_err(|reason| ConfigError::Invalid {
                field: format!("rss_rule.note[{index}]"),
                reason,
            })?;
    }

    Ok(())
}

fn validate_site(index: usize, site: &super::model::SiteConfig) -> ConfigResult<()> {
    if site.name.trim().is_empty() {
        return Err(ConfigError::Invalid {
            field: format!("sites[{index}].name"),
            reason: "must not be empty".to_string(),
        });
    }

    if site.rss_url.trim().is_empty() {
        return Err(ConfigError::Invalid {
            field: format!("sites[{index}].rss_url"),
            reason: "must not be empty".to_string(),
        });
    }

    if let (Some(min), Some(max)) = (site.min_size, site.max_size) {
        if min > max {
            return Err(ConfigError::Invalid {
                field: format!("sites[{index}]"),
                reason: format!("min_size ({min}) exceeds max_size ({max})"),
            });
        }
    }

    for (rule_index, pattern) in site.include_rules.iter().enumerate() {
        compile_rule(pattern).map_err(|reason| ConfigError::Invalid {
            field: format!("sites[{index}].include_rules[{rule_index}]"),
            reason,
        })?;
    }
    for (rule_index, pattern) in site.exclude_rules.iter().enumerate() {
        compile_rule(pattern).map_err(|reason| ConfigError::Invalid {
            field: format!("sites[{index}].exclude_rules[{rule_index}]"),
            reason,
        })?;
    }

    Ok(())
}

fn compile_rule(pattern: &str) -> Result<Regex, String> {
    Regex::new(pattern).map_err(|source| source.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClientBackend, PtSettings, RssRuleConfig, SiteConfig};

    fn sample_site() -> SiteConfig {
        SiteConfig {
            name: "example".to_string(),
            rss_url: "https://example.invalid/rss".to_string(),
            include_rules: vec![],
            exclude_rules: vec![],
            min_size: None,
            max_size: None,
            enabled: true,
        }
    }

    fn sample_config() -> Config {
        Config {
            pt: PtSettings {
                pt_client: Some(ClientBackend::Qbittorrent),
                pt_seeding_time: 3.0,
                pt_monitor_only: true,
                pt_tag: "PT_TAG".to_string(),
            },
            sites: vec![sample_site()],
            rss_rule: RssRuleConfig::default(),
            subtitle: None,
        }
    }

    #[test]
    fn accepts_a_minimal_valid_config() {
        assert!(validate(&sample_config()).is_ok());
    }

    #[test]
    fn rejects_missing_client() {
        let mut config = sample_config();
        config.pt.pt_client = None;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn rejects_no_enabled_sites() {
        let mut config = sample_config();
        config.sites[0].enabled = false;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn rejects_inverted_size_bounds() {
        let mut config = sample_config();
        config.sites[0].min_size = Some(200);
        config.sites[0].max_size = Some(100);
        assert!(validate(&config).is_err());
    }

    #[test]
    fn rejects_invalid_regex() {
        let mut config = sample_config();
        config.sites[0].include_rules.push("(unterminated".to_string());
        assert!(validate(&config).is_err());
    }
}
