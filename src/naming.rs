//! Destination repository name derivation.
//!
//! The source forge organises repositories in nested groups; the destination
//! is a flat organization namespace.  Each destination name is built by
//! kebab-casing every ancestor group label plus the project label and joining
//! them with hyphens, then cutting the result down to the configured maximum
//! length.

// ---------------------------------------------------------------------------
// Sanitizer
// ---------------------------------------------------------------------------

/// Convert arbitrary text to kebab case.
///
/// Every maximal run of non-alphanumeric characters collapses to a single
/// hyphen, leading/trailing hyphens are stripped, and the result is
/// lowercased.  Output matches `[a-z0-9]+(-[a-z0-9]+)*`, or is empty when the
/// input contains no ASCII alphanumerics at all.
pub fn kebab_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_hyphen = false;

    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    out
}

// ---------------------------------------------------------------------------
// Composer
// ---------------------------------------------------------------------------

/// Build the flat destination name from the ancestor group labels and the
/// project's own label, ancestors first.
///
/// Each label is sanitized independently; labels that sanitize to nothing are
/// dropped so they never produce doubled hyphens.
pub fn compose_repo_name(ancestor_labels: &[&str], project_label: &str) -> String {
    ancestor_labels
        .iter()
        .copied()
        .chain(std::iter::once(project_label))
        .map(kebab_case)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Cut `name` down to at most `max_len` characters.
///
/// The cut is a plain character cut, not word-aware; a truncated name may end
/// mid-token.
pub fn truncate_name(name: &str, max_len: usize) -> String {
    name.chars().take(max_len).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
