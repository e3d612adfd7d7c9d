//! Forge API abstraction layer.
//!
//! Provides the [`SourceForge`] and [`DestForge`] traits that encapsulate all
//! forge-specific API interaction.  The tree walker and migration driver
//! dispatch through these traits so that no forge-specific URL construction or
//! response parsing leaks outside this module — and so that both can be tested
//! against in-memory fakes.

pub mod github;
pub mod gitlab;
#[cfg(test)]
pub mod test_support;

use anyhow::Result;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Source-side data model
// ---------------------------------------------------------------------------

/// A group on the source forge.  Groups nest arbitrarily deep.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Group {
    pub id: u64,
    /// Display name, used (sanitized) as one segment of the flat name.
    pub name: String,
}

/// A project (repository) on the source forge.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
    /// Optional free-form description; the destination may reject characters
    /// the source allows.
    #[serde(default)]
    pub description: Option<String>,
    /// SSH URL used for the mirror clone.
    pub ssh_url_to_repo: String,
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Read-side API of the hierarchical source forge.
///
/// Every listing call must exhaust pagination — "all", never a capped first
/// page.
#[async_trait::async_trait]
pub trait SourceForge: Send + Sync {
    /// List every top-level group visible to the token.
    async fn list_top_level_groups(&self, http_client: &reqwest::Client) -> Result<Vec<Group>>;

    /// Fetch a single group by id.
    async fn get_group(&self, http_client: &reqwest::Client, group_id: u64) -> Result<Group>;

    /// List every project directly owned by a group (not those of subgroups).
    async fn list_projects(
        &self,
        http_client: &reqwest::Client,
        group_id: u64,
    ) -> Result<Vec<Project>>;

    /// List a group's direct subgroups.
    async fn list_subgroups(
        &self,
        http_client: &reqwest::Client,
        group_id: u64,
    ) -> Result<Vec<Group>>;
}

/// Write-side API of the flat destination forge.
#[async_trait::async_trait]
pub trait DestForge: Send + Sync {
    /// Create a private repository under the configured organization.
    async fn create_repo(
        &self,
        http_client: &reqwest::Client,
        name: &str,
        description: &str,
    ) -> Result<()>;

    /// SSH push URL for a repository name under the configured organization.
    fn ssh_url(&self, name: &str) -> String;
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Pull a human-readable error message out of a forge API error body.
///
/// Both forges return JSON error bodies, but under different keys
/// (`message` on the destination, `message` or `error` on the source).
/// Falls back to the raw body when no known key is present.
pub fn extract_error_message(body: &str) -> String {
    let parsed: Result<serde_json::Value, _> = serde_json::from_str(body);
    if let Ok(value) = parsed {
        for key in ["message", "error"] {
            if let Some(msg) = value.get(key) {
                if let Some(s) = msg.as_str() {
                    return s.to_string();
                }
                // Validation errors can nest structures here; compact JSON is
                // still more readable than the whole body.
                return msg.to_string();
            }
        }
    }
    body.trim().to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
