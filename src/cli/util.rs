// ABOUTME: Shared helpers for CLI commands: env fallbacks for target and token

use anyhow::{Context, Result};

use crate::bridge::{Credential, RepoTarget};

/// Resolve the repository target from the flag or, failing that, from the
/// GITHUB_OWNER / GITHUB_REPO environment variables. The environment is
/// read here, at the CLI boundary, never inside the bridge layer.
pub fn resolve_target(arg: Option<&str>) -> Result<RepoTarget> {
    if let Some(input) = arg {
        return Ok(RepoTarget::from_input(input)?);
    }

    let owner =
        std::env::var("GITHUB_OWNER").context("--repo not given and GITHUB_OWNER is unset")?;
    let repo =
        std::env::var("GITHUB_REPO").context("--repo not given and GITHUB_REPO is unset")?;
    Ok(RepoTarget::from_input(&format!("{owner}/{repo}"))?)
}

/// Read the access token from GITHUB_TOKEN. The token never appears on the
/// command line, so it cannot leak into process listings or shell history.
pub fn credential_from_env() -> Result<Credential> {
    let token = std::env::var("GITHUB_TOKEN")
        .context("GITHUB_TOKEN is not set; export a personal access token")?;
    Ok(Credential::new(token)?)
}
