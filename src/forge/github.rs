//! GitHub destination implementation.
//!
//! Maps organization repository creation to the [`DestForge`] trait.  Name
//! validation is entirely destination-side; a rejected name surfaces as an
//! error carrying the API's message.

use anyhow::{Context, Result};
use serde_json::json;
use tracing::{debug, warn};

use crate::config::Config;

use super::DestForge;

// ---------------------------------------------------------------------------
// Destination struct
// ---------------------------------------------------------------------------

pub struct GitHubDest {
    api_url: String,
    org: String,
    ssh_host: String,
    token_env: String,
}

impl GitHubDest {
    pub fn new(config: &Config) -> Self {
        Self {
            api_url: config.destination.api_url.clone(),
            org: config.destination.org.clone(),
            ssh_host: config.destination.ssh_host.clone(),
            token_env: config.destination.token_env.clone(),
        }
    }

    fn token(&self) -> String {
        let token = std::env::var(&self.token_env).unwrap_or_default();
        if token.is_empty() {
            warn!(
                env_var = %self.token_env,
                "destination token env var is empty — repository creation will fail"
            );
        }
        token
    }
}

// ---------------------------------------------------------------------------
// Trait implementation
// ---------------------------------------------------------------------------

#[async_trait::async_trait]
impl DestForge for GitHubDest {
    async fn create_repo(
        &self,
        http_client: &reqwest::Client,
        name: &str,
        description: &str,
    ) -> Result<()> {
        let url = format!("{}/orgs/{}/repos", self.api_url, self.org);

        let resp = http_client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.token()))
            .header("Accept", "application/vnd.github.v3+json")
            .json(&json!({
                "name": name,
                "description": description,
                "private": true,
            }))
            .send()
            .await
            .context("destination API request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!(
                "repository creation returned {status} for {name}: {}",
                super::extract_error_message(&body)
            );
        }

        debug!(%name, "destination repository created");
        Ok(())
    }

    fn ssh_url(&self, name: &str) -> String {
        format!("git@{}:{}/{name}.git", self.ssh_host, self.org)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
