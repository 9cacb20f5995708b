// ABOUTME: End-to-end tests for the update workflow against local remotes
// Tests verify pipeline ordering, cleanup guarantees, and PR handling

use anyhow::Result;
use serde_json::json;
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use repobridge::bridge::{
    BridgeError, CommitIdentity, Credential, RepoTarget, UpdateWorkflow,
};

use super::fixtures::TestRemote;

fn workflow_for(remote: &TestRemote, api_base: String) -> UpdateWorkflow {
    UpdateWorkflow::new(
        RepoTarget::from_input("octo-org/widgets").unwrap(),
        CommitIdentity::noreply("octo-org").unwrap(),
    )
    .remote_override(remote.url())
    .api_base(api_base)
}

/// Full pipeline: clone, mutate, commit, push, PR, cleanup
#[tokio::test]
async fn update_workflow_end_to_end() -> Result<()> {
    let remote = TestRemote::new()?;
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/repos/octo-org/widgets/pulls"))
        .and(header("Authorization", "token ghp_e2e_token_value"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "html_url": "https://github.com/octo-org/widgets/pull/7",
            "number": 7
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dest_root = TempDir::new()?;
    let dest = dest_root.path().join("clone");

    let outcome = workflow_for(&remote, server.uri())
        .branch("auto/e2e")
        .commit_message("update")
        .pr_title("Automated update")
        .pr_body("Opened by the update workflow.")
        .dest(&dest)
        .run(Credential::new("ghp_e2e_token_value")?, |path| {
            fs::write(path.join("generated.txt"), "fresh content\n")?;
            Ok(())
        })
        .await?;

    assert!(outcome.commit_created);
    let pr = outcome.pull_request.expect("pull request should be recorded");
    assert_eq!(pr.url, "https://github.com/octo-org/widgets/pull/7");
    assert_eq!(pr.number, 7);
    assert!(outcome.pr_failure.is_none());

    assert!(remote.has_branch("auto/e2e")?, "branch must reach the remote");
    assert!(!dest.exists(), "clone must be removed after the run");
    Ok(())
}

/// A failed PR creation is recorded, not fatal: the pushed branch survives
#[tokio::test]
async fn pull_request_failure_is_non_fatal() -> Result<()> {
    let remote = TestRemote::new()?;
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/repos/octo-org/widgets/pulls"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "Validation Failed"
        })))
        .mount(&server)
        .await;

    let dest_root = TempDir::new()?;
    let dest = dest_root.path().join("clone");

    // No mutation: the commit step is a documented no-op and the branch
    // still gets pushed, mirroring an idempotent re-run.
    let outcome = workflow_for(&remote, server.uri())
        .branch("auto/rerun")
        .dest(&dest)
        .run(Credential::new("ghp_rerun_token")?, |_| Ok(()))
        .await?;

    assert!(!outcome.commit_created, "empty diff must be a no-op");
    assert!(outcome.pull_request.is_none());
    let failure = outcome.pr_failure.expect("failure should be recorded");
    assert_eq!(failure.status, Some(422));
    assert_eq!(failure.message, "Validation Failed");

    assert!(remote.has_branch("auto/rerun")?);
    assert!(!dest.exists());
    Ok(())
}

/// Cleanup still runs when a mid-pipeline step fails
#[tokio::test]
async fn failed_push_still_cleans_up() -> Result<()> {
    let remote = TestRemote::new()?;
    // Remote branch is ahead, so the workflow's push is non-fast-forward
    remote.seed_branch("auto/conflict", "remote_only.txt")?;

    let server = MockServer::start().await;
    let dest_root = TempDir::new()?;
    let dest = dest_root.path().join("clone");

    let err = workflow_for(&remote, server.uri())
        .branch("auto/conflict")
        .dest(&dest)
        .run(Credential::new("ghp_conflict_token")?, |path| {
            fs::write(path.join("local_only.txt"), "local\n")?;
            Ok(())
        })
        .await
        .unwrap_err();

    assert!(
        matches!(err.downcast_ref::<BridgeError>(), Some(BridgeError::Push(_))),
        "expected a push rejection, got: {err:?}"
    );
    assert!(!dest.exists(), "clone must be removed even after a failure");
    Ok(())
}

/// The raw token must never appear in error output, even when the remote
/// URL itself carries it
#[tokio::test]
async fn errors_never_contain_the_raw_token() -> Result<()> {
    let token = "ghp_leakcheck_token_value";
    let dest_root = TempDir::new()?;
    let dest = dest_root.path().join("clone");
    // A missing remote whose path embeds the token, so git's stderr and the
    // recorded URL would both leak it without scrubbing
    let poisoned_remote = dest_root
        .path()
        .join(format!("missing-{token}"))
        .display()
        .to_string();

    let err = UpdateWorkflow::new(
        RepoTarget::from_input("octo-org/widgets")?,
        CommitIdentity::noreply("octo-org")?,
    )
    .remote_override(poisoned_remote)
    .dest(&dest)
    .run(Credential::new(token)?, |_| Ok(()))
    .await
    .unwrap_err();

    let rendered = format!("{err:?}");
    assert!(
        !rendered.contains(token),
        "token leaked into error text: {rendered}"
    );
    assert!(!dest.exists());
    Ok(())
}

/// keep_clone retains the working tree and reports its path
#[tokio::test]
async fn keep_clone_retains_working_tree() -> Result<()> {
    let remote = TestRemote::new()?;
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/repos/octo-org/widgets/pulls"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "html_url": "https://github.com/octo-org/widgets/pull/8",
            "number": 8
        })))
        .mount(&server)
        .await;

    let dest_root = TempDir::new()?;
    let dest = dest_root.path().join("clone");

    let outcome = workflow_for(&remote, server.uri())
        .branch("auto/kept")
        .dest(&dest)
        .keep_clone(true)
        .run(Credential::new("ghp_keep_token")?, |path| {
            fs::write(path.join("kept.txt"), "kept\n")?;
            Ok(())
        })
        .await?;

    let kept = outcome.clone_path.expect("kept path should be reported");
    assert!(kept.exists());
    assert!(kept.join("kept.txt").exists());
    Ok(())
}

/// A failing update step aborts before commit and push
#[tokio::test]
async fn failing_update_step_aborts_before_push() -> Result<()> {
    let remote = TestRemote::new()?;
    let server = MockServer::start().await;
    let dest_root = TempDir::new()?;
    let dest = dest_root.path().join("clone");

    let err = workflow_for(&remote, server.uri())
        .branch("auto/broken-step")
        .dest(&dest)
        .run(Credential::new("ghp_broken_token")?, |_| {
            anyhow::bail!("simulated processing failure")
        })
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("update step failed"));
    assert!(
        !remote.has_branch("auto/broken-step")?,
        "nothing may be pushed after a failed update step"
    );
    assert!(!dest.exists());
    Ok(())
}
