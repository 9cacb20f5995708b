// ABOUTME: Git CLI invocations for the clone/branch/commit/push pipeline

use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

use super::credential::Credential;
use super::errors::{classify_clone_error, classify_push_error, BridgeError};

/// Committer identity applied per commit via `git -c`, never written to
/// process-global configuration, so concurrent workflow runs in the same
/// process cannot contaminate each other.
#[derive(Debug, Clone)]
pub struct CommitIdentity {
    pub name: String,
    pub email: String,
}

impl CommitIdentity {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Result<Self, BridgeError> {
        let name = name.into();
        let email = email.into();
        if name.trim().is_empty() {
            return Err(BridgeError::Configuration(
                "committer name must not be empty".to_string(),
            ));
        }
        if email.trim().is_empty() {
            return Err(BridgeError::Configuration(
                "committer email must not be empty".to_string(),
            ));
        }
        Ok(Self { name, email })
    }

    /// GitHub noreply identity for an owner, the default used by the
    /// update workflow.
    pub fn noreply(owner: &str) -> Result<Self, BridgeError> {
        Self::new(owner, format!("{owner}@users.noreply.github.com"))
    }
}

/// Handle to a cloned working tree. Owned exclusively by the workflow that
/// created it; destroyed by [`remove_clone`].
#[derive(Debug)]
pub struct RepositoryHandle {
    pub owner: String,
    pub repo: String,
    pub path: PathBuf,
}

struct GitOutput {
    success: bool,
    stdout: String,
    stderr: String,
}

/// Run git with prompts disabled so a missing or rejected credential fails
/// fast instead of hanging on interactive input.
fn run_git(args: &[&str], cwd: Option<&Path>) -> std::io::Result<GitOutput> {
    debug!(?args, "running git");

    let mut cmd = Command::new("git");
    cmd.args(args)
        .env("GIT_TERMINAL_PROMPT", "0")
        .env("GIT_ASKPASS", "echo");
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let output = cmd.output()?;
    Ok(GitOutput {
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Verify the git client is present before the workflow starts issuing
/// commands that would each fail with a confusing spawn error.
pub fn ensure_git_available() -> Result<(), BridgeError> {
    match run_git(&["--version"], None) {
        Ok(out) if out.success => Ok(()),
        Ok(out) => Err(BridgeError::Configuration(format!(
            "git is unusable: {}",
            out.stderr.trim()
        ))),
        Err(e) => Err(BridgeError::Configuration(format!(
            "git executable not found: {e}"
        ))),
    }
}

/// Clone `url` into `dest`, replacing any pre-existing directory there.
///
/// On failure the destination is removed again so no partial checkout is
/// left behind, and the returned error carries `display_url`, never the
/// authenticated URL. `credential` is used only to scrub git's stderr.
pub fn clone_repo(
    url: &str,
    display_url: &str,
    dest: &Path,
    credential: &Credential,
) -> Result<PathBuf, BridgeError> {
    if dest.exists() {
        std::fs::remove_dir_all(dest).map_err(|e| BridgeError::Clone {
            url: display_url.to_string(),
            message: format!("could not clear destination {}: {e}", dest.display()),
        })?;
    }
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|e| BridgeError::Clone {
            url: display_url.to_string(),
            message: format!("could not create parent directory: {e}"),
        })?;
    }

    info!("cloning {} into {}", display_url, dest.display());

    let dest_str = dest.to_string_lossy();
    let out = run_git(&["clone", url, dest_str.as_ref()], None).map_err(|e| {
        BridgeError::Clone {
            url: display_url.to_string(),
            message: e.to_string(),
        }
    })?;

    if !out.success {
        let stderr = credential.scrub(&out.stderr);
        // No partial checkout may survive a failed clone
        if dest.exists() {
            let _ = std::fs::remove_dir_all(dest);
        }
        return Err(classify_clone_error(&stderr, display_url));
    }

    info!("clone complete: {}", dest.display());
    Ok(dest.to_path_buf())
}

/// Point `origin` at the authenticated URL so later pushes in this session
/// do not prompt. Safe to call repeatedly with the same arguments.
pub fn set_remote(path: &Path, url: &str, credential: &Credential) -> Result<(), BridgeError> {
    let out = run_git(&["remote", "set-url", "origin", url], Some(path))
        .map_err(|e| BridgeError::Configuration(e.to_string()))?;
    if !out.success {
        return Err(BridgeError::Configuration(format!(
            "could not rewrite origin remote: {}",
            credential.scrub(&out.stderr).trim()
        )));
    }
    debug!("origin remote rewritten for authenticated pushes");
    Ok(())
}

/// Create and switch to `branch` from the current HEAD.
pub fn create_branch(path: &Path, branch: &str) -> Result<(), BridgeError> {
    let out = run_git(&["checkout", "-b", branch], Some(path))
        .map_err(|e| BridgeError::Branch(e.to_string()))?;
    if !out.success {
        return Err(BridgeError::Branch(out.stderr.trim().to_string()));
    }
    info!("created branch {}", branch);
    Ok(())
}

/// Stage `paths` (or all changes when `None`) and commit with the given
/// identity.
///
/// Returns `false` when there was nothing to commit, an expected outcome
/// for idempotent re-runs, not an error. `CommitError` is reserved for
/// genuine tool failures.
pub fn commit_changes(
    path: &Path,
    identity: &CommitIdentity,
    message: &str,
    paths: Option<&[String]>,
) -> Result<bool, BridgeError> {
    if message.trim().is_empty() {
        return Err(BridgeError::Commit(
            "commit message must not be empty".to_string(),
        ));
    }

    let add_out = match paths {
        Some(list) => {
            let mut args = vec!["add", "--"];
            args.extend(list.iter().map(String::as_str));
            run_git(&args, Some(path))
        }
        None => run_git(&["add", "-A"], Some(path)),
    }
    .map_err(|e| BridgeError::Commit(e.to_string()))?;

    if !add_out.success {
        return Err(BridgeError::Commit(add_out.stderr.trim().to_string()));
    }

    let name_cfg = format!("user.name={}", identity.name);
    let email_cfg = format!("user.email={}", identity.email);
    let out = run_git(
        &[
            "-c",
            &name_cfg,
            "-c",
            &email_cfg,
            "commit",
            "--no-gpg-sign",
            "-m",
            message,
        ],
        Some(path),
    )
    .map_err(|e| BridgeError::Commit(e.to_string()))?;

    if out.success {
        info!("created commit: {}", message);
        return Ok(true);
    }

    // Git reports an empty diff as a non-zero exit; distinguish it here
    let combined = format!("{}{}", out.stdout, out.stderr);
    if combined.contains("nothing to commit")
        || combined.contains("no changes added to commit")
        || combined.contains("nothing added to commit")
    {
        debug!("nothing to commit");
        return Ok(false);
    }

    Err(BridgeError::Commit(out.stderr.trim().to_string()))
}

/// Push `branch` to `origin`, optionally establishing upstream tracking.
///
/// `credential` scrubs git's stderr; the classified error surfaces the
/// remote's rejection reason when git reported one.
pub fn push_branch(
    path: &Path,
    branch: &str,
    set_upstream: bool,
    credential: &Credential,
) -> Result<(), BridgeError> {
    let out = if set_upstream {
        run_git(&["push", "--set-upstream", "origin", branch], Some(path))
    } else {
        run_git(&["push", "origin", branch], Some(path))
    }
    .map_err(|e| BridgeError::Push(e.to_string()))?;

    if !out.success {
        return Err(classify_push_error(&credential.scrub(&out.stderr)));
    }

    info!("pushed branch {}", branch);
    Ok(())
}

/// Delete the working tree. Missing paths are a no-op, so cleanup can run
/// unconditionally on every workflow exit path.
pub fn remove_clone(path: &Path) -> Result<(), BridgeError> {
    if !path.exists() {
        return Ok(());
    }
    std::fs::remove_dir_all(path)
        .map_err(|e| BridgeError::Cleanup(format!("{}: {e}", path.display())))?;
    info!("removed clone at {}", path.display());
    Ok(())
}
