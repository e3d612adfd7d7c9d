//! Git command wrappers using [`tokio::process::Command`].
//!
//! Every function shells out to the system `git` binary.  All repository
//! paths are absolute; nothing here reads or changes the process working
//! directory.  `GIT_TERMINAL_PROMPT=0` is set on every remote operation so a
//! missing credential fails fast instead of hanging on a prompt.

use std::path::Path;
use std::process::Stdio;

use anyhow::{bail, Context, Result};
use tokio::process::Command;
use tracing::{debug, instrument};

// ---------------------------------------------------------------------------
// Clone
// ---------------------------------------------------------------------------

/// Run `git clone --mirror <url> <dest>`.
///
/// A mirror clone copies every ref (branches, tags, notes) and full history,
/// as opposed to a single-branch or shallow clone.
#[instrument(fields(%url, dest = %dest.display()))]
pub async fn clone_mirror(url: &str, dest: &Path) -> Result<()> {
    let mut cmd = Command::new("git");
    cmd.arg("clone").arg("--mirror").arg(url).arg(dest);

    cmd.env("GIT_TERMINAL_PROMPT", "0");
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    debug!("spawning git clone --mirror");

    let output = cmd
        .output()
        .await
        .context("failed to spawn git clone --mirror")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "git clone --mirror failed (status {}): {}",
            output.status,
            stderr.trim(),
        );
    }

    debug!("git clone --mirror succeeded");
    Ok(())
}

// ---------------------------------------------------------------------------
// Remote configuration
// ---------------------------------------------------------------------------

/// Set (or update) a named remote on a local repository.
///
/// Runs `git remote add <name> <url>` or, if the remote already exists
/// (e.g. a leftover clone from an earlier failed run), `git remote set-url`.
#[instrument(fields(repo = %repo_path.display(), %name, %url))]
pub async fn set_remote(repo_path: &Path, name: &str, url: &str) -> Result<()> {
    let add_output = Command::new("git")
        .arg("-C")
        .arg(repo_path)
        .arg("remote")
        .arg("add")
        .arg(name)
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .context("failed to spawn git remote add")?;

    if add_output.status.success() {
        debug!("remote added");
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&add_output.stderr);
    if stderr.contains("already exists") {
        debug!("remote already exists; updating URL");

        let set_output = Command::new("git")
            .arg("-C")
            .arg(repo_path)
            .arg("remote")
            .arg("set-url")
            .arg(name)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .context("failed to spawn git remote set-url")?;

        if !set_output.status.success() {
            let set_stderr = String::from_utf8_lossy(&set_output.stderr);
            bail!(
                "git remote set-url failed (status {}): {}",
                set_output.status,
                set_stderr.trim(),
            );
        }

        debug!("remote URL updated");
        return Ok(());
    }

    bail!(
        "git remote add failed (status {}): {}",
        add_output.status,
        stderr.trim(),
    );
}

// ---------------------------------------------------------------------------
// Push
// ---------------------------------------------------------------------------

/// Run `git push --mirror <remote>` inside a local repository.
///
/// A mirror push replicates the local ref state exactly, including deleting
/// destination refs that only exist because of previous partial state.
#[instrument(fields(repo = %repo_path.display(), %remote))]
pub async fn push_mirror(repo_path: &Path, remote: &str) -> Result<()> {
    let mut cmd = Command::new("git");
    cmd.arg("-C")
        .arg(repo_path)
        .arg("push")
        .arg("--mirror")
        .arg(remote);

    cmd.env("GIT_TERMINAL_PROMPT", "0");
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    debug!("spawning git push --mirror");

    let output = cmd
        .output()
        .await
        .context("failed to spawn git push --mirror")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "git push --mirror failed (status {}): {}",
            output.status,
            stderr.trim(),
        );
    }

    debug!("git push --mirror succeeded");
    Ok(())
}

// ---------------------------------------------------------------------------
// Cleanup
// ---------------------------------------------------------------------------

/// Recursively remove a local clone directory.
///
/// If the path does not exist this is a no-op.
#[instrument(fields(path = %path.display()))]
pub async fn remove_local_clone(path: &Path) -> Result<()> {
    if !path.exists() {
        debug!("path does not exist; nothing to remove");
        return Ok(());
    }

    tokio::fs::remove_dir_all(path)
        .await
        .with_context(|| format!("failed to remove clone directory: {}", path.display()))?;

    debug!("clone directory removed");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
