// ABOUTME: `repobridge push-file`: create or update one file via the Contents API

use anyhow::{bail, Context, Result};

use super::util::{credential_from_env, resolve_target};
use super::{OutputFormat, PushFileArgs};
use crate::bridge::GithubClient;

pub async fn execute(args: PushFileArgs, format: OutputFormat) -> Result<()> {
    let target = resolve_target(args.repo.as_deref())?;
    let parsed = target.components()?;
    let credential = credential_from_env()?;

    let content: Vec<u8> = match (&args.content, &args.content_file) {
        (Some(inline), None) => inline.clone().into_bytes(),
        (None, Some(path)) => std::fs::read(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        _ => bail!("specify exactly one of --content or --content-file"),
    };

    let client = match &args.api_base {
        Some(base) => GithubClient::with_base_url(base.clone())?,
        None => GithubClient::new()?,
    };

    let existing = client
        .get_file_sha(
            &credential,
            &parsed.owner,
            &parsed.repo,
            &args.path,
            args.branch.as_deref(),
        )
        .await?;

    let sha = match (existing, args.force) {
        (Some(_), false) => bail!(
            "{} already exists on {}; pass --force to update it",
            args.path,
            args.branch.as_deref().unwrap_or("the default branch")
        ),
        (existing, _) => existing,
    };

    let result = client
        .put_file(
            &credential,
            &parsed.owner,
            &parsed.repo,
            &args.path,
            &content,
            &args.message,
            args.branch.as_deref(),
            sha.as_deref(),
        )
        .await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => {
            let path = result
                .content
                .as_ref()
                .map_or(args.path.as_str(), |c| c.path.as_str());
            println!("committed {} ({})", path, result.commit.sha);
        }
    }

    Ok(())
}
