// ABOUTME: Repository bridge: git transport, GitHub API, and the update workflow

pub mod credential;
pub mod errors;
pub mod github;
pub mod repo;
pub mod target;
pub mod workflow;

pub use credential::Credential;
pub use errors::BridgeError;
pub use github::{GithubClient, PullRequest};
pub use repo::CommitIdentity;
pub use target::RepoTarget;
pub use workflow::{PrFailure, UpdateOutcome, UpdateWorkflow};
