// ABOUTME: Ordered clone→branch→commit→push→PR pipeline with guaranteed cleanup

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::credential::Credential;
use super::errors::{redact_userinfo, BridgeError};
use super::github::{GithubClient, PullRequest};
use super::repo::{self, CommitIdentity, RepositoryHandle};
use super::target::{ParsedTarget, RepoTarget};

/// One end-to-end update run against a single repository.
///
/// The pipeline is strictly sequential: clone, rewrite the origin remote,
/// create the head branch, run the caller-supplied update step, commit,
/// push, attempt a pull request, clean up. The first failure from clone
/// through push aborts the run; a failed pull-request creation does not,
/// because the pushed branch is already durable on the remote. Cleanup
/// (working-tree removal, credential drop) runs on every exit path.
pub struct UpdateWorkflow {
    target: RepoTarget,
    identity: CommitIdentity,
    branch: String,
    base: String,
    commit_message: String,
    pr_title: String,
    pr_body: String,
    dest: Option<PathBuf>,
    stage_paths: Option<Vec<String>>,
    remote_override: Option<String>,
    api_base: Option<String>,
    keep_clone: bool,
}

/// What a completed run produced. Present even when pull-request creation
/// failed; callers inspect [`UpdateOutcome::pr_failure`] to decide
/// whether that matters to them.
#[derive(Debug, Serialize)]
pub struct UpdateOutcome {
    pub branch: String,
    pub commit_created: bool,
    pub pull_request: Option<PullRequest>,
    pub pr_failure: Option<PrFailure>,
    /// Set when the working tree was deliberately kept.
    pub clone_path: Option<PathBuf>,
}

/// A recorded, non-fatal pull-request failure.
#[derive(Debug, Serialize)]
pub struct PrFailure {
    pub status: Option<u16>,
    pub message: String,
}

impl UpdateWorkflow {
    pub fn new(target: RepoTarget, identity: CommitIdentity) -> Self {
        let commit_message = format!(
            "Automated update at {}",
            chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
        );
        Self {
            target,
            identity,
            branch: "auto/update".to_string(),
            base: "main".to_string(),
            pr_title: commit_message.clone(),
            commit_message,
            pr_body: "Automated pull request opened by repobridge.".to_string(),
            dest: None,
            stage_paths: None,
            remote_override: None,
            api_base: None,
            keep_clone: false,
        }
    }

    /// Head branch to create and push.
    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    /// Base branch the pull request targets.
    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    pub fn commit_message(mut self, message: impl Into<String>) -> Self {
        self.commit_message = message.into();
        self
    }

    pub fn pr_title(mut self, title: impl Into<String>) -> Self {
        self.pr_title = title.into();
        self
    }

    pub fn pr_body(mut self, body: impl Into<String>) -> Self {
        self.pr_body = body.into();
        self
    }

    /// Clone destination; defaults to `<tmp>/repobridge/<repo>`.
    pub fn dest(mut self, dest: impl Into<PathBuf>) -> Self {
        self.dest = Some(dest.into());
        self
    }

    /// Stage only these paths instead of all changes.
    pub fn stage_paths(mut self, paths: Vec<String>) -> Self {
        self.stage_paths = Some(paths);
        self
    }

    /// Override the git remote URL (mirrors, fixtures). Owner and repo
    /// from the target continue to address the API.
    pub fn remote_override(mut self, url: impl Into<String>) -> Self {
        self.remote_override = Some(url.into());
        self
    }

    /// Override `https://api.github.com` (GitHub Enterprise).
    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = Some(base.into());
        self
    }

    /// Keep the working tree after the run instead of removing it.
    pub fn keep_clone(mut self, keep: bool) -> Self {
        self.keep_clone = keep;
        self
    }

    /// Execute the pipeline. `mutate` is the caller-supplied update step,
    /// run inside the fresh clone between branch creation and commit.
    ///
    /// The credential is consumed and dropped (zeroizing the token) before
    /// this returns, and the working tree is removed on every exit path
    /// unless `keep_clone` was set. A cleanup failure is reported, but an
    /// error from an earlier step always takes priority over it.
    pub async fn run<F>(self, credential: Credential, mutate: F) -> Result<UpdateOutcome>
    where
        F: FnOnce(&Path) -> Result<()>,
    {
        repo::ensure_git_available()?;
        let parsed = self.target.components()?;
        let dest = self.dest.clone().unwrap_or_else(|| {
            std::env::temp_dir().join("repobridge").join(&parsed.repo)
        });

        let result = self.run_pipeline(&credential, &parsed, &dest, mutate).await;

        // Cleanup runs regardless of how the pipeline ended.
        let cleanup = if self.keep_clone {
            Ok(())
        } else {
            repo::remove_clone(&dest)
        };
        info!(stage = "cleaned", "workflow cleanup finished");

        // Zeroizes the token; nothing below this point may touch it.
        drop(credential);

        match (result, cleanup) {
            (Ok(outcome), Ok(())) => Ok(outcome),
            (Ok(_), Err(cleanup_err)) => Err(cleanup_err.into()),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(cleanup_err)) => {
                warn!("cleanup failed after earlier error: {cleanup_err}");
                Err(err)
            }
        }
    }

    async fn run_pipeline<F>(
        &self,
        credential: &Credential,
        parsed: &ParsedTarget,
        dest: &Path,
        mutate: F,
    ) -> Result<UpdateOutcome>
    where
        F: FnOnce(&Path) -> Result<()>,
    {
        let (auth_url, display_url) = match &self.remote_override {
            Some(url) => (url.clone(), credential.scrub(url)),
            None => (
                self.target.authenticated_url(credential)?,
                redact_userinfo(&self.target.display_url()),
            ),
        };

        let path = repo::clone_repo(&auth_url, &display_url, dest, credential)?;
        let handle = RepositoryHandle {
            owner: parsed.owner.clone(),
            repo: parsed.repo.clone(),
            path,
        };
        info!(stage = "cloned", path = %handle.path.display(), "clone ready");

        repo::set_remote(&handle.path, &auth_url, credential)?;

        repo::create_branch(&handle.path, &self.branch)?;
        info!(stage = "branched", branch = %self.branch, "head branch created");

        mutate(&handle.path).context("update step failed")?;

        let commit_created = repo::commit_changes(
            &handle.path,
            &self.identity,
            &self.commit_message,
            self.stage_paths.as_deref(),
        )?;
        info!(
            stage = "committed",
            created = commit_created,
            "commit step finished"
        );

        repo::push_branch(&handle.path, &self.branch, true, credential)?;
        info!(stage = "pushed", branch = %self.branch, "branch pushed to origin");

        let client = match &self.api_base {
            Some(base) => GithubClient::with_base_url(base.as_str())?,
            None => GithubClient::new()?,
        };
        let (pull_request, pr_failure) = match client
            .create_pull_request(
                credential,
                &handle.owner,
                &handle.repo,
                &self.branch,
                &self.base,
                &self.pr_title,
                &self.pr_body,
            )
            .await
        {
            Ok(pr) => {
                info!(stage = "pr_attempted", url = %pr.url, "pull request created");
                (Some(pr), None)
            }
            // Non-fatal: the pushed branch is already durable; record the
            // failure so the caller can open the PR manually.
            Err(BridgeError::PullRequest { status, message }) => {
                warn!(
                    stage = "pr_attempted",
                    ?status,
                    "pull request creation failed: {message}"
                );
                (None, Some(PrFailure { status, message }))
            }
            Err(other) => {
                warn!(stage = "pr_attempted", "pull request step failed: {other}");
                (
                    None,
                    Some(PrFailure {
                        status: None,
                        message: other.to_string(),
                    }),
                )
            }
        };

        Ok(UpdateOutcome {
            branch: self.branch.clone(),
            commit_created,
            pull_request,
            pr_failure,
            clone_path: self.keep_clone.then(|| handle.path.clone()),
        })
    }
}
