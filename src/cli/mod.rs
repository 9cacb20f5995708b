// ABOUTME: CLI argument parsing and command routing for repobridge
//
// Provides command-line interface for:
// - Running the full clone → update → push → pull request workflow (update)
// - Creating or updating a single file via the Contents API (push-file)
// - Running the data transform step against a local checkout (process)

pub mod process;
pub mod push_file;
pub mod update;
pub mod util;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Clone, update, push, and open pull requests against a GitHub repository
#[derive(Parser)]
#[command(name = "repobridge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

/// Output format for commands
#[derive(Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the full clone → update → commit → push → pull request workflow
    Update(UpdateArgs),

    /// Create or update a single file via the Contents API
    PushFile(PushFileArgs),

    /// Run the data transform step against a local checkout
    Process(ProcessArgs),
}

/// Arguments for the update command
#[derive(clap::Args)]
pub struct UpdateArgs {
    /// Repository as owner/name shorthand or a full https:// URL
    /// (falls back to $GITHUB_OWNER/$GITHUB_REPO)
    #[arg(long)]
    pub repo: Option<String>,

    /// Head branch to create and push
    #[arg(long, default_value = "auto/update")]
    pub branch: String,

    /// Base branch the pull request targets
    #[arg(long, default_value = "main")]
    pub base: String,

    /// Commit message (default: timestamped)
    #[arg(long)]
    pub message: Option<String>,

    /// Pull request title (default: the commit message)
    #[arg(long)]
    pub title: Option<String>,

    /// Pull request body
    #[arg(long)]
    pub body: Option<String>,

    /// Clone destination (default: <tmp>/repobridge/<repo>)
    #[arg(long)]
    pub dest: Option<PathBuf>,

    /// Committer name (default: the repository owner)
    #[arg(long)]
    pub committer_name: Option<String>,

    /// Committer email (default: <owner>@users.noreply.github.com)
    #[arg(long)]
    pub committer_email: Option<String>,

    /// Override the git remote URL (mirrors)
    #[arg(long)]
    pub remote_url: Option<String>,

    /// Override the API base URL (GitHub Enterprise)
    #[arg(long)]
    pub api_base: Option<String>,

    /// Keep the local clone instead of removing it
    #[arg(long)]
    pub keep_clone: bool,

    /// Skip the built-in data transform step and commit whatever already
    /// differs (which may be nothing)
    #[arg(long)]
    pub skip_process: bool,
}

/// Arguments for the push-file command
#[derive(clap::Args)]
pub struct PushFileArgs {
    /// Repository as owner/name shorthand or a full https:// URL
    /// (falls back to $GITHUB_OWNER/$GITHUB_REPO)
    #[arg(long)]
    pub repo: Option<String>,

    /// Target path inside the repository (e.g. notes/from-runtime.txt)
    #[arg(long)]
    pub path: String,

    /// Commit message
    #[arg(long)]
    pub message: String,

    /// Inline content (mutually exclusive with --content-file)
    #[arg(long, conflicts_with = "content_file")]
    pub content: Option<String>,

    /// Local file to read content from
    #[arg(long)]
    pub content_file: Option<PathBuf>,

    /// Target branch (repository default branch when omitted)
    #[arg(long)]
    pub branch: Option<String>,

    /// Update the file if it already exists
    #[arg(long)]
    pub force: bool,

    /// Override the API base URL (GitHub Enterprise)
    #[arg(long)]
    pub api_base: Option<String>,
}

/// Arguments for the process command
#[derive(clap::Args)]
pub struct ProcessArgs {
    /// Root directory containing data/input.txt
    #[arg(long, default_value = ".")]
    pub root: PathBuf,
}
