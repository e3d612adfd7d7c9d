use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    pub destination: DestinationConfig,
    #[serde(default)]
    pub migrate: MigrateConfig,
}

// ---------------------------------------------------------------------------
// Source forge
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Full URL to the source API root (e.g. `https://gitlab.com/api/v4`).
    #[serde(default = "default_source_api_url")]
    pub api_url: String,
    /// Name of the environment variable that holds the source access token.
    ///
    /// The token needs read access to every group and project being migrated.
    #[serde(default = "default_source_token_env")]
    pub token_env: String,
}

fn default_source_api_url() -> String {
    "https://gitlab.com/api/v4".to_string()
}

fn default_source_token_env() -> String {
    "GITLAB_TOKEN".to_string()
}

// ---------------------------------------------------------------------------
// Destination forge
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct DestinationConfig {
    /// Full URL to the destination API root.
    #[serde(default = "default_dest_api_url")]
    pub api_url: String,
    /// Organization the migrated repositories are created under.
    pub org: String,
    /// Host used to build SSH push URLs (`git@<host>:<org>/<name>.git`).
    #[serde(default = "default_dest_ssh_host")]
    pub ssh_host: String,
    /// Name of the environment variable that holds the destination token.
    ///
    /// The token needs repository-creation rights on the organization.
    #[serde(default = "default_dest_token_env")]
    pub token_env: String,
}

fn default_dest_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_dest_ssh_host() -> String {
    "github.com".to_string()
}

fn default_dest_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}

// ---------------------------------------------------------------------------
// Migration behaviour
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct MigrateConfig {
    /// Directory local mirror clones are made under.  Created if missing;
    /// clones are removed after each push.
    #[serde(default = "default_work_dir")]
    pub work_dir: String,
    /// Maximum length of a derived repository name.  Longer names are cut,
    /// mid-token cuts accepted.
    #[serde(default = "default_name_max_len")]
    pub name_max_len: usize,
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            name_max_len: default_name_max_len(),
        }
    }
}

fn default_work_dir() -> String {
    "/tmp/forgemigrate".to_string()
}

fn default_name_max_len() -> usize {
    100
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

/// Load and validate a [`Config`] from a YAML file at `path`.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    let config: Config = serde_yaml::from_str(&contents)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Basic sanity checks that cannot be expressed purely with serde.
fn validate_config(config: &Config) -> Result<()> {
    anyhow::ensure!(
        !config.destination.org.is_empty(),
        "destination.org must not be empty"
    );
    anyhow::ensure!(
        config.migrate.name_max_len >= 1,
        "migrate.name_max_len must be at least 1"
    );
    anyhow::ensure!(
        !config.migrate.work_dir.is_empty(),
        "migrate.work_dir must not be empty"
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_fills_defaults() {
        let yaml = r#"
source: {}
destination:
  org: acme
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        validate_config(&config).unwrap();

        assert_eq!(config.source.api_url, "https://gitlab.com/api/v4");
        assert_eq!(config.source.token_env, "GITLAB_TOKEN");
        assert_eq!(config.destination.api_url, "https://api.github.com");
        assert_eq!(config.destination.ssh_host, "github.com");
        assert_eq!(config.destination.token_env, "GITHUB_TOKEN");
        assert_eq!(config.migrate.name_max_len, 100);
    }

    #[test]
    fn full_config_overrides_defaults() {
        let yaml = r#"
source:
  api_url: https://gitlab.corp.example.com/api/v4
  token_env: CORP_GITLAB_TOKEN
destination:
  api_url: https://ghe.corp.example.com/api/v3
  org: platform
  ssh_host: ghe.corp.example.com
  token_env: CORP_GITHUB_TOKEN
migrate:
  work_dir: /var/tmp/migration
  name_max_len: 60
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        validate_config(&config).unwrap();

        assert_eq!(config.destination.org, "platform");
        assert_eq!(config.destination.ssh_host, "ghe.corp.example.com");
        assert_eq!(config.migrate.work_dir, "/var/tmp/migration");
        assert_eq!(config.migrate.name_max_len, 60);
    }

    #[test]
    fn empty_org_is_rejected() {
        let yaml = r#"
source: {}
destination:
  org: ""
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn zero_name_cap_is_rejected() {
        let yaml = r#"
source: {}
destination:
  org: acme
migrate:
  name_max_len: 0
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(validate_config(&config).is_err());
    }
}
