use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::RepoId;
use crate::reconciler::{ReconcileOptions, DEFAULT_PER_PAGE};
use crate::scheduler::MAX_INTERVAL;

/// Optional YAML configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seconds between two passes
    pub interval: u64,
    pub repos: Vec<RepoId>,
    pub self_only: bool,
    pub per_page: u8,
    pub dry_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval: 30,
            repos: Vec::new(),
            self_only: true,
            per_page: DEFAULT_PER_PAGE,
            dry_run: false,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            info!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        info!(path = %path.display(), "Loaded configuration");

        Ok(config)
    }
}

/// Values given on the command line or through the environment; they win over the file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub token: Option<String>,
    pub interval: Option<u64>,
    pub repos: Vec<String>,
    pub self_only: Option<bool>,
    pub per_page: Option<u8>,
    pub dry_run: bool,
}

/// Validated settings the agent runs with
#[derive(Debug, Clone)]
pub struct Settings {
    pub token: String,
    pub interval: Duration,
    pub repos: Vec<RepoId>,
    pub options: ReconcileOptions,
}

impl Settings {
    pub fn resolve(config: Config, overrides: Overrides) -> Result<Self> {
        let token = overrides
            .token
            .filter(|t| !t.trim().is_empty())
            .context("GitHub token cannot be empty")?;

        let repos = if overrides.repos.is_empty() {
            config.repos
        } else {
            parse_repos(&overrides.repos)?
        };
        if repos.is_empty() {
            anyhow::bail!("repos cannot be empty");
        }

        let interval = overrides.interval.unwrap_or(config.interval);
        if interval == 0 {
            anyhow::bail!("interval must be at least one second");
        }
        if interval > MAX_INTERVAL.as_secs() {
            anyhow::bail!(
                "interval must be at most {} seconds, got {}",
                MAX_INTERVAL.as_secs(),
                interval
            );
        }

        let per_page = overrides.per_page.unwrap_or(config.per_page);
        if !(1..=100).contains(&per_page) {
            anyhow::bail!("per-page must be between 1 and 100, got {}", per_page);
        }

        Ok(Self {
            token,
            interval: Duration::from_secs(interval),
            repos,
            options: ReconcileOptions {
                self_only: overrides.self_only.unwrap_or(config.self_only),
                per_page,
                dry_run: overrides.dry_run || config.dry_run,
            },
        })
    }
}

/// Parse `owner/repo` entries, ignoring blanks left by stray commas
pub fn parse_repos(raw: &[String]) -> Result<Vec<RepoId>> {
    raw.iter()
        .map(|r| r.trim())
        .filter(|r| !r.is_empty())
        .map(|r| r.parse::<RepoId>())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn overrides(token: &str, repos: &[&str]) -> Overrides {
        Overrides {
            token: Some(token.to_string()),
            repos: repos.iter().map(|r| r.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.interval, 30);
        assert!(config.self_only);
        assert_eq!(config.per_page, 30);
        assert!(!config.dry_run);
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
interval: 120
repos:
  - acme/widgets
  - acme/gadgets
self_only: false
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.interval, 120);
        assert_eq!(config.repos[1], RepoId::new("acme", "gadgets"));
        assert!(!config.self_only);
        assert_eq!(config.per_page, 30);
    }

    #[test]
    fn test_parse_yaml_rejects_bad_repo() {
        let yaml = "repos:\n  - not-a-repo\n";
        assert!(serde_yaml::from_str::<Config>(yaml).is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path().join("branchbot.yml")).unwrap();
        assert_eq!(config.interval, 30);
        assert!(config.repos.is_empty());
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "repos: [acme/widgets]\nper_page: 50\ndry_run: true").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.repos, vec![RepoId::new("acme", "widgets")]);
        assert_eq!(config.per_page, 50);
        assert!(config.dry_run);
    }

    #[test]
    fn test_resolve_defaults() {
        let settings =
            Settings::resolve(Config::default(), overrides("secret", &["acme/widgets"])).unwrap();

        assert_eq!(settings.token, "secret");
        assert_eq!(settings.interval, Duration::from_secs(30));
        assert_eq!(settings.repos, vec![RepoId::new("acme", "widgets")]);
        assert_eq!(settings.options, ReconcileOptions::default());
    }

    #[test]
    fn test_overrides_win_over_file() {
        let config = Config {
            interval: 300,
            repos: vec![RepoId::new("acme", "old")],
            self_only: true,
            ..Default::default()
        };
        let overrides = Overrides {
            interval: Some(60),
            self_only: Some(false),
            ..overrides("secret", &["acme/widgets", " acme/gadgets", ""])
        };

        let settings = Settings::resolve(config, overrides).unwrap();

        assert_eq!(settings.interval, Duration::from_secs(60));
        assert_eq!(
            settings.repos,
            vec![RepoId::new("acme", "widgets"), RepoId::new("acme", "gadgets")]
        );
        assert!(!settings.options.self_only);
    }

    #[test]
    fn test_interval_of_one_day_is_accepted() {
        let overrides = Overrides {
            interval: Some(MAX_INTERVAL.as_secs()),
            ..overrides("secret", &["acme/widgets"])
        };
        let settings = Settings::resolve(Config::default(), overrides).unwrap();
        assert_eq!(settings.interval, MAX_INTERVAL);
    }

    #[test]
    fn test_file_repos_used_without_override() {
        let config = Config {
            repos: vec![RepoId::new("acme", "widgets")],
            ..Default::default()
        };
        let settings = Settings::resolve(config, overrides("secret", &[])).unwrap();
        assert_eq!(settings.repos.len(), 1);
    }

    #[test]
    fn test_resolve_rejects_invalid() {
        assert!(Settings::resolve(Config::default(), overrides("", &["acme/widgets"])).is_err());
        assert!(Settings::resolve(
            Config::default(),
            Overrides {
                token: None,
                ..overrides("", &["acme/widgets"])
            }
        )
        .is_err());
        assert!(Settings::resolve(Config::default(), overrides("secret", &[])).is_err());
        assert!(Settings::resolve(Config::default(), overrides("secret", &["acme"])).is_err());

        let zero_interval = Overrides {
            interval: Some(0),
            ..overrides("secret", &["acme/widgets"])
        };
        assert!(Settings::resolve(Config::default(), zero_interval).is_err());

        let huge_interval = Overrides {
            interval: Some(u64::MAX),
            ..overrides("secret", &["acme/widgets"])
        };
        assert!(Settings::resolve(Config::default(), huge_interval).is_err());

        let day_and_a_second = Overrides {
            interval: Some(MAX_INTERVAL.as_secs() + 1),
            ..overrides("secret", &["acme/widgets"])
        };
        assert!(Settings::resolve(Config::default(), day_and_a_second).is_err());

        let huge_page = Overrides {
            per_page: Some(101),
            ..overrides("secret", &["acme/widgets"])
        };
        assert!(Settings::resolve(Config::default(), huge_page).is_err());
    }
}
