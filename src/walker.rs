//! Group-tree traversal.
//!
//! Walks a source group and all of its descendant subgroups, producing every
//! project paired with the ordered chain of ancestor groups that leads to it.
//! The chain is what the flat destination name is derived from.
//!
//! Chains are passed by value: each stack entry carries its own snapshot of
//! the ancestor path, so there is no shared traversal state to backtrack and
//! no way for one branch to corrupt another's view.

use tracing::warn;

use crate::forge::{Group, Project, SourceForge};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A project found during traversal, with the ancestor groups from the
/// top-level group down to its immediate parent (inclusive).
#[derive(Debug, Clone)]
pub struct DiscoveredProject {
    pub project: Project,
    pub ancestors: Vec<Group>,
}

// ---------------------------------------------------------------------------
// Traversal
// ---------------------------------------------------------------------------

/// Collect every project reachable from `root_group_id`, at any depth.
///
/// Fault isolation: a group whose fetch fails is logged and its subtree
/// abandoned; projects already collected and sibling subtrees are unaffected.
/// A failed project or subgroup listing is likewise logged and treated as
/// empty, so the rest of that group's content is still visited.  Nothing is
/// retried.
pub async fn collect_projects(
    source: &dyn SourceForge,
    http_client: &reqwest::Client,
    root_group_id: u64,
) -> Vec<DiscoveredProject> {
    let mut discovered = Vec::new();
    let mut stack: Vec<(u64, Vec<Group>)> = vec![(root_group_id, Vec::new())];

    while let Some((group_id, ancestors)) = stack.pop() {
        let group = match source.get_group(http_client, group_id).await {
            Ok(group) => group,
            Err(err) => {
                warn!(group_id, error = %err, "failed to fetch group; skipping its subtree");
                continue;
            }
        };

        let mut chain = ancestors;
        chain.push(group);

        match source.list_projects(http_client, group_id).await {
            Ok(projects) => {
                for project in projects {
                    discovered.push(DiscoveredProject {
                        project,
                        ancestors: chain.clone(),
                    });
                }
            }
            Err(err) => {
                warn!(group_id, error = %err, "failed to list group projects");
            }
        }

        match source.list_subgroups(http_client, group_id).await {
            Ok(subgroups) => {
                // Reverse so the LIFO stack visits subgroups in listing order.
                for subgroup in subgroups.into_iter().rev() {
                    stack.push((subgroup.id, chain.clone()));
                }
            }
            Err(err) => {
                warn!(group_id, error = %err, "failed to list subgroups");
            }
        }
    }

    discovered
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
