//! GitLab source implementation.
//!
//! Maps GitLab group/project API responses to the [`SourceForge`] trait.
//! Every listing endpoint is paginated with `per_page`/`page` and read to
//! exhaustion, so callers always see the complete listing.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::Config;

use super::{Group, Project, SourceForge};

/// GitLab caps `per_page` at 100; one request per hundred entries.
const PER_PAGE: u32 = 100;

// ---------------------------------------------------------------------------
// Source struct
// ---------------------------------------------------------------------------

pub struct GitLabSource {
    api_url: String,
    token_env: String,
}

impl GitLabSource {
    pub fn new(config: &Config) -> Self {
        Self {
            api_url: config.source.api_url.clone(),
            token_env: config.source.token_env.clone(),
        }
    }

    fn token(&self) -> String {
        let token = std::env::var(&self.token_env).unwrap_or_default();
        if token.is_empty() {
            warn!(
                env_var = %self.token_env,
                "source token env var is empty — API requests will be unauthenticated"
            );
        }
        token
    }

    /// Fetch every page of a listing endpoint and concatenate the results.
    ///
    /// GitLab signals the end of a listing with a short (or empty) page.
    async fn fetch_all_pages<T: DeserializeOwned>(
        &self,
        http_client: &reqwest::Client,
        path: &str,
        extra_params: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        let token = self.token();
        let mut results: Vec<T> = Vec::new();
        let mut page: u32 = 1;

        loop {
            let page_str = page.to_string();
            let per_page_str = PER_PAGE.to_string();
            let mut params: Vec<(&str, &str)> = vec![
                ("per_page", per_page_str.as_str()),
                ("page", page_str.as_str()),
            ];
            params.extend_from_slice(extra_params);

            let url = reqwest::Url::parse_with_params(
                &format!("{}{path}", self.api_url),
                &params,
            )?;

            let resp = http_client
                .get(url)
                .header("PRIVATE-TOKEN", &token)
                .header("Accept", "application/json")
                .send()
                .await
                .context("source API request failed")?;

            if !resp.status().is_success() {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                anyhow::bail!(
                    "source API returned {status} for {path} (page {page}): {}",
                    super::extract_error_message(&body)
                );
            }

            let batch: Vec<T> = resp
                .json()
                .await
                .with_context(|| format!("failed to parse source API response for {path}"))?;

            let batch_len = batch.len();
            results.extend(batch);

            debug!(path, page, batch_len, "fetched source listing page");

            if batch_len < PER_PAGE as usize {
                break;
            }
            page += 1;
        }

        Ok(results)
    }
}

// ---------------------------------------------------------------------------
// Trait implementation
// ---------------------------------------------------------------------------

#[async_trait::async_trait]
impl SourceForge for GitLabSource {
    async fn list_top_level_groups(&self, http_client: &reqwest::Client) -> Result<Vec<Group>> {
        self.fetch_all_pages(http_client, "/groups", &[("top_level_only", "true")])
            .await
    }

    async fn get_group(&self, http_client: &reqwest::Client, group_id: u64) -> Result<Group> {
        let url = format!("{}/groups/{group_id}", self.api_url);

        let resp = http_client
            .get(&url)
            .header("PRIVATE-TOKEN", self.token())
            .header("Accept", "application/json")
            .send()
            .await
            .context("source API request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!(
                "source API returned {status} for group {group_id}: {}",
                super::extract_error_message(&body)
            );
        }

        resp.json()
            .await
            .with_context(|| format!("failed to parse source API response for group {group_id}"))
    }

    async fn list_projects(
        &self,
        http_client: &reqwest::Client,
        group_id: u64,
    ) -> Result<Vec<Project>> {
        self.fetch_all_pages(http_client, &format!("/groups/{group_id}/projects"), &[])
            .await
    }

    async fn list_subgroups(
        &self,
        http_client: &reqwest::Client,
        group_id: u64,
    ) -> Result<Vec<Group>> {
        self.fetch_all_pages(http_client, &format!("/groups/{group_id}/subgroups"), &[])
            .await
    }
}
