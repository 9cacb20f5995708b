// ABOUTME: `repobridge update`: run the full clone→commit→push→PR workflow

use anyhow::Result;

use super::util::{credential_from_env, resolve_target};
use super::{OutputFormat, UpdateArgs};
use crate::bridge::{CommitIdentity, UpdateWorkflow};
use crate::process;

pub async fn execute(args: UpdateArgs, format: OutputFormat) -> Result<()> {
    let target = resolve_target(args.repo.as_deref())?;
    let parsed = target.components()?;
    let credential = credential_from_env()?;

    let identity = match (&args.committer_name, &args.committer_email) {
        (None, None) => CommitIdentity::noreply(&parsed.owner)?,
        (name, email) => CommitIdentity::new(
            name.clone().unwrap_or_else(|| parsed.owner.clone()),
            email
                .clone()
                .unwrap_or_else(|| format!("{}@users.noreply.github.com", parsed.owner)),
        )?,
    };

    let mut workflow = UpdateWorkflow::new(target, identity)
        .branch(args.branch.clone())
        .base(args.base.clone())
        .keep_clone(args.keep_clone);
    if let Some(message) = &args.message {
        workflow = workflow.commit_message(message.clone());
        // The PR title tracks the commit message unless set separately
        if args.title.is_none() {
            workflow = workflow.pr_title(message.clone());
        }
    }
    if let Some(title) = &args.title {
        workflow = workflow.pr_title(title.clone());
    }
    if let Some(body) = &args.body {
        workflow = workflow.pr_body(body.clone());
    }
    if let Some(dest) = &args.dest {
        workflow = workflow.dest(dest.clone());
    }
    if let Some(remote_url) = &args.remote_url {
        workflow = workflow.remote_override(remote_url.clone());
    }
    if let Some(api_base) = &args.api_base {
        workflow = workflow.api_base(api_base.clone());
    }

    let skip_process = args.skip_process;
    let outcome = workflow
        .run(credential, move |path| {
            if skip_process {
                return Ok(());
            }
            process::run(path).map(|_| ())
        })
        .await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        OutputFormat::Text => {
            println!("branch: {}", outcome.branch);
            println!("commit created: {}", outcome.commit_created);
            match (&outcome.pull_request, &outcome.pr_failure) {
                (Some(pr), _) => println!("pull request: {} (#{})", pr.url, pr.number),
                (None, Some(failure)) => println!(
                    "pull request failed: {} (the branch is pushed; open one manually)",
                    failure.message
                ),
                (None, None) => {}
            }
            if let Some(path) = &outcome.clone_path {
                println!("clone kept at: {}", path.display());
            }
        }
    }

    Ok(())
}
