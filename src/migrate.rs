//! Migration driver.
//!
//! Walks every top-level source group, derives the flat destination name for
//! each discovered project, creates the destination repository, and mirrors
//! the history across.  Projects are processed strictly one at a time; a
//! failure on one project is recorded in the run report and the batch moves
//! on.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::forge::{DestForge, SourceForge};
use crate::naming::{compose_repo_name, truncate_name};
use crate::walker;

// ---------------------------------------------------------------------------
// Run report
// ---------------------------------------------------------------------------

/// Terminal state of one project's migration attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Repository created and all refs mirrored.
    Migrated,
    /// Creation failed twice (once with the description, once without);
    /// transfer was never attempted.
    CreateFailed { error: String },
    /// Repository was created but the mirror transfer failed; the destination
    /// may be empty or partially pushed.
    TransferFailed { error: String },
}

impl Outcome {
    /// The failure reason, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Outcome::Migrated => None,
            Outcome::CreateFailed { error } | Outcome::TransferFailed { error } => Some(error),
        }
    }
}

/// One line of the run report.
#[derive(Debug, Clone)]
pub struct ProjectReport {
    /// Display name of the source project.
    pub project: String,
    /// Derived flat destination name.
    pub repo_name: String,
    pub outcome: Outcome,
}

/// Per-project outcomes for a whole run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub entries: Vec<ProjectReport>,
}

impl RunReport {
    pub fn migrated_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome == Outcome::Migrated)
            .count()
    }

    pub fn skipped(&self) -> impl Iterator<Item = &ProjectReport> {
        self.entries.iter().filter(|e| e.outcome != Outcome::Migrated)
    }
}

// ---------------------------------------------------------------------------
// Transfer seam
// ---------------------------------------------------------------------------

/// Moves one repository's full history from a source URL to a destination
/// URL.  A trait so the driver can be tested without a `git` binary or
/// network access.
#[async_trait::async_trait]
pub trait Transfer: Send + Sync {
    async fn mirror(&self, source_url: &str, dest_url: &str, repo_name: &str) -> Result<()>;
}

/// Shells out to `git` for a mirror clone into the work directory, a mirror
/// push to the destination, and cleanup of the local clone.
pub struct GitMirrorTransfer {
    work_dir: PathBuf,
}

impl GitMirrorTransfer {
    pub fn new(work_dir: PathBuf) -> Self {
        Self { work_dir }
    }
}

#[async_trait::async_trait]
impl Transfer for GitMirrorTransfer {
    async fn mirror(&self, source_url: &str, dest_url: &str, repo_name: &str) -> Result<()> {
        let local = self.work_dir.join(format!("{repo_name}.git"));

        crate::git::clone_mirror(source_url, &local).await?;

        let push_result = async {
            crate::git::set_remote(&local, "destination", dest_url).await?;
            crate::git::push_mirror(&local, "destination").await
        }
        .await;

        // The clone exists at this point; remove it whether or not the push
        // succeeded.  A cleanup failure leaves the directory behind but does
        // not change the project's outcome.
        if let Err(err) = crate::git::remove_local_clone(&local).await {
            warn!(path = %local.display(), error = %err, "failed to remove local clone");
        }

        push_result
    }
}

// ---------------------------------------------------------------------------
// Creation with description fallback
// ---------------------------------------------------------------------------

/// Create the destination repository, retrying exactly once with an empty
/// description on failure.
///
/// The source allows characters in descriptions that the destination
/// rejects; clearing the description is the only lever.  When the
/// description is already empty the retry would be an identical request, so
/// it is skipped.
async fn create_with_retry(
    dest: &dyn DestForge,
    http_client: &reqwest::Client,
    name: &str,
    description: &str,
) -> Result<()> {
    match dest.create_repo(http_client, name, description).await {
        Ok(()) => Ok(()),
        Err(err) if !description.is_empty() => {
            warn!(
                repo = %name,
                error = %err,
                "repository creation failed; retrying with empty description"
            );
            dest.create_repo(http_client, name, "")
                .await
                .context("repository creation failed on retry without description")
        }
        Err(err) => Err(err),
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Migrate every project under every top-level source group.
///
/// Only a failure to enumerate the top-level groups themselves aborts the
/// run; every per-project failure is recorded in the returned [`RunReport`]
/// and the batch continues.
pub async fn run(
    source: &dyn SourceForge,
    dest: &dyn DestForge,
    transfer: &dyn Transfer,
    http_client: &reqwest::Client,
    name_max_len: usize,
) -> Result<RunReport> {
    let groups = source
        .list_top_level_groups(http_client)
        .await
        .context("failed to list top-level source groups")?;

    let mut report = RunReport::default();

    for group in groups {
        info!(group = %group.name, group_id = group.id, "discovering repositories");

        let discovered = walker::collect_projects(source, http_client, group.id).await;
        info!(
            group = %group.name,
            count = discovered.len(),
            "found repositories under group"
        );

        for item in discovered {
            let ancestor_labels: Vec<&str> =
                item.ancestors.iter().map(|g| g.name.as_str()).collect();
            let repo_name = truncate_name(
                &compose_repo_name(&ancestor_labels, &item.project.name),
                name_max_len,
            );
            let description = item.project.description.clone().unwrap_or_default();

            info!(project = %item.project.name, repo = %repo_name, "migrating repository");

            if let Err(err) =
                create_with_retry(dest, http_client, &repo_name, &description).await
            {
                warn!(repo = %repo_name, error = %err, "skipping project: creation failed");
                report.entries.push(ProjectReport {
                    project: item.project.name.clone(),
                    repo_name,
                    outcome: Outcome::CreateFailed {
                        error: format!("{err:#}"),
                    },
                });
                continue;
            }

            let dest_url = dest.ssh_url(&repo_name);
            let outcome = match transfer
                .mirror(&item.project.ssh_url_to_repo, &dest_url, &repo_name)
                .await
            {
                Ok(()) => {
                    info!(project = %item.project.name, repo = %repo_name, "repository migrated");
                    Outcome::Migrated
                }
                Err(err) => {
                    warn!(repo = %repo_name, error = %err, "skipping project: transfer failed");
                    Outcome::TransferFailed {
                        error: format!("{err:#}"),
                    }
                }
            };

            report.entries.push(ProjectReport {
                project: item.project.name.clone(),
                repo_name,
                outcome,
            });
        }
    }

    Ok(report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
