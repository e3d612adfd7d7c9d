//! In-memory fake forges for walker and driver tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::Result;

use super::{DestForge, Group, Project, SourceForge};

// ---------------------------------------------------------------------------
// Fake source
// ---------------------------------------------------------------------------

/// Builder-style fake [`SourceForge`] backed by in-memory maps, with
/// per-group failure injection.
#[derive(Default)]
pub struct FakeSource {
    groups: HashMap<u64, Group>,
    projects: HashMap<u64, Vec<Project>>,
    subgroups: HashMap<u64, Vec<u64>>,
    top_level: Vec<u64>,
    failing_groups: HashSet<u64>,
    failing_project_listings: HashSet<u64>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group(mut self, id: u64, name: &str) -> Self {
        self.groups.insert(
            id,
            Group {
                id,
                name: name.to_string(),
            },
        );
        self
    }

    pub fn top_level(mut self, id: u64) -> Self {
        self.top_level.push(id);
        self
    }

    pub fn subgroup(mut self, parent: u64, child: u64) -> Self {
        self.subgroups.entry(parent).or_default().push(child);
        self
    }

    pub fn project(mut self, group_id: u64, id: u64, name: &str) -> Self {
        self.projects.entry(group_id).or_default().push(Project {
            id,
            name: name.to_string(),
            description: None,
            ssh_url_to_repo: format!("git@source.example.com:{group_id}/{id}.git"),
        });
        self
    }

    pub fn project_with_description(
        mut self,
        group_id: u64,
        id: u64,
        name: &str,
        description: &str,
    ) -> Self {
        self.projects.entry(group_id).or_default().push(Project {
            id,
            name: name.to_string(),
            description: Some(description.to_string()),
            ssh_url_to_repo: format!("git@source.example.com:{group_id}/{id}.git"),
        });
        self
    }

    /// Make every `get_group` call for `id` fail.
    pub fn fail_group(mut self, id: u64) -> Self {
        self.failing_groups.insert(id);
        self
    }

    /// Make the project listing for `group_id` fail.
    pub fn fail_projects(mut self, group_id: u64) -> Self {
        self.failing_project_listings.insert(group_id);
        self
    }
}

#[async_trait::async_trait]
impl SourceForge for FakeSource {
    async fn list_top_level_groups(&self, _http_client: &reqwest::Client) -> Result<Vec<Group>> {
        self.top_level
            .iter()
            .map(|id| {
                self.groups
                    .get(id)
                    .cloned()
                    .ok_or_else(|| anyhow::anyhow!("unknown top-level group {id}"))
            })
            .collect()
    }

    async fn get_group(&self, _http_client: &reqwest::Client, group_id: u64) -> Result<Group> {
        if self.failing_groups.contains(&group_id) {
            anyhow::bail!("injected failure fetching group {group_id}");
        }
        self.groups
            .get(&group_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("group {group_id} not found"))
    }

    async fn list_projects(
        &self,
        _http_client: &reqwest::Client,
        group_id: u64,
    ) -> Result<Vec<Project>> {
        if self.failing_project_listings.contains(&group_id) {
            anyhow::bail!("injected failure listing projects of group {group_id}");
        }
        Ok(self.projects.get(&group_id).cloned().unwrap_or_default())
    }

    async fn list_subgroups(
        &self,
        _http_client: &reqwest::Client,
        group_id: u64,
    ) -> Result<Vec<Group>> {
        let ids = self.subgroups.get(&group_id).cloned().unwrap_or_default();
        // Subgroup listings return stubs even when the detailed group fetch
        // is set to fail, mirroring a listing that outlives a permission
        // change on the group itself.
        Ok(ids
            .into_iter()
            .map(|id| {
                self.groups.get(&id).cloned().unwrap_or(Group {
                    id,
                    name: format!("group-{id}"),
                })
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Fake destination
// ---------------------------------------------------------------------------

/// Fake [`DestForge`] that records every creation attempt.
#[derive(Default)]
pub struct FakeDest {
    /// `(name, description)` of every `create_repo` call, in order.
    pub calls: Mutex<Vec<(String, String)>>,
    /// Reject any attempt that carries a non-empty description.
    pub reject_descriptions: bool,
    /// Names for which creation always fails.
    pub failing_names: HashSet<String>,
}

impl FakeDest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reject_descriptions(mut self) -> Self {
        self.reject_descriptions = true;
        self
    }

    pub fn fail_name(mut self, name: &str) -> Self {
        self.failing_names.insert(name.to_string());
        self
    }

    pub fn created(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(n, _)| n.clone()).collect()
    }
}

#[async_trait::async_trait]
impl DestForge for FakeDest {
    async fn create_repo(
        &self,
        _http_client: &reqwest::Client,
        name: &str,
        description: &str,
    ) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((name.to_string(), description.to_string()));

        if self.failing_names.contains(name) {
            anyhow::bail!("injected creation failure for {name}");
        }
        if self.reject_descriptions && !description.is_empty() {
            anyhow::bail!("description contains characters the destination rejects");
        }
        Ok(())
    }

    fn ssh_url(&self, name: &str) -> String {
        format!("git@dest.example.com:org/{name}.git")
    }
}
