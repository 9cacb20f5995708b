// ABOUTME: GitHub REST API client for pull-request creation and file upserts

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::credential::Credential;
use super::errors::BridgeError;

const DEFAULT_API_BASE: &str = "https://api.github.com";
const ACCEPT_HEADER: &str = "application/vnd.github.v3+json";

/// Thin client over the two GitHub endpoints this tool needs.
///
/// The token is supplied per call and travels in the `Authorization`
/// header only, never as a query parameter or URL component.
#[derive(Debug, Clone)]
pub struct GithubClient {
    client: Client,
    base_url: String,
}

/// Parsed result of a successful pull-request creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    #[serde(rename = "html_url")]
    pub url: String,
    pub number: u64,
}

/// Parsed result of a Contents API upsert.
#[derive(Debug, Serialize, Deserialize)]
pub struct FileCommit {
    pub content: Option<FileContent>,
    pub commit: CommitInfo,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FileContent {
    pub path: String,
    pub sha: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommitInfo {
    pub sha: String,
}

#[derive(Serialize)]
struct CreatePullRequestBody<'a> {
    title: &'a str,
    head: &'a str,
    base: &'a str,
    body: &'a str,
}

#[derive(Serialize)]
struct PutFileBody<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

#[derive(Deserialize)]
struct ExistingFile {
    sha: String,
}

impl GithubClient {
    pub fn new() -> Result<Self, BridgeError> {
        Self::with_base_url(DEFAULT_API_BASE)
    }

    /// Client against a non-default API base (GitHub Enterprise, tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, BridgeError> {
        let client = Client::builder()
            .user_agent(concat!("repobridge/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| {
                BridgeError::Configuration(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// `POST /repos/{owner}/{repo}/pulls` with `{title, head, base, body}`.
    ///
    /// HTTP 201 parses into a [`PullRequest`]; anything else becomes a
    /// `PullRequest` error carrying the status code and a sanitized message
    /// extracted from the response body.
    pub async fn create_pull_request(
        &self,
        credential: &Credential,
        owner: &str,
        repo: &str,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<PullRequest, BridgeError> {
        let url = format!("{}/repos/{owner}/{repo}/pulls", self.base_url);
        debug!(%owner, %repo, %head, %base, "creating pull request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("token {}", credential.expose()))
            .header("Accept", ACCEPT_HEADER)
            .json(&CreatePullRequestBody {
                title,
                head,
                base,
                body,
            })
            .send()
            .await
            .map_err(|e| BridgeError::PullRequest {
                status: None,
                message: credential.scrub(&e.to_string()),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::CREATED {
            let pr: PullRequest =
                response
                    .json()
                    .await
                    .map_err(|e| BridgeError::PullRequest {
                        status: Some(status.as_u16()),
                        message: format!("unparseable response body: {e}"),
                    })?;
            debug!(url = %pr.url, number = pr.number, "pull request created");
            return Ok(pr);
        }

        let body_text = response.text().await.unwrap_or_default();
        Err(BridgeError::PullRequest {
            status: Some(status.as_u16()),
            message: sanitize_api_body(credential, &body_text),
        })
    }

    /// `GET /repos/{owner}/{repo}/contents/{path}`. `Some(sha)` when the
    /// file exists on the given ref, `None` on 404.
    pub async fn get_file_sha(
        &self,
        credential: &Credential,
        owner: &str,
        repo: &str,
        path: &str,
        branch: Option<&str>,
    ) -> Result<Option<String>, BridgeError> {
        let url = format!("{}/repos/{owner}/{repo}/contents/{path}", self.base_url);

        let mut request = self
            .client
            .get(&url)
            .header("Authorization", format!("token {}", credential.expose()))
            .header("Accept", ACCEPT_HEADER);
        if let Some(branch) = branch {
            request = request.query(&[("ref", branch)]);
        }

        let response = request.send().await.map_err(|e| BridgeError::Contents {
            status: None,
            message: credential.scrub(&e.to_string()),
        })?;

        match response.status().as_u16() {
            200 => {
                let existing: ExistingFile =
                    response.json().await.map_err(|e| BridgeError::Contents {
                        status: Some(200),
                        message: format!("unparseable response body: {e}"),
                    })?;
                Ok(Some(existing.sha))
            }
            404 => Ok(None),
            status => {
                let body_text = response.text().await.unwrap_or_default();
                Err(BridgeError::Contents {
                    status: Some(status),
                    message: sanitize_api_body(credential, &body_text),
                })
            }
        }
    }

    /// `PUT /repos/{owner}/{repo}/contents/{path}`. Creates the file, or
    /// updates it when `sha` names the existing blob.
    pub async fn put_file(
        &self,
        credential: &Credential,
        owner: &str,
        repo: &str,
        path: &str,
        content: &[u8],
        message: &str,
        branch: Option<&str>,
        sha: Option<&str>,
    ) -> Result<FileCommit, BridgeError> {
        let url = format!("{}/repos/{owner}/{repo}/contents/{path}", self.base_url);
        debug!(%path, updating = sha.is_some(), "upserting file via contents API");

        let response = self
            .client
            .put(&url)
            .header("Authorization", format!("token {}", credential.expose()))
            .header("Accept", ACCEPT_HEADER)
            .json(&PutFileBody {
                message,
                content: BASE64.encode(content),
                branch,
                sha,
            })
            .send()
            .await
            .map_err(|e| BridgeError::Contents {
                status: None,
                message: credential.scrub(&e.to_string()),
            })?;

        let status = response.status().as_u16();
        if status == 200 || status == 201 {
            return response.json().await.map_err(|e| BridgeError::Contents {
                status: Some(status),
                message: format!("unparseable response body: {e}"),
            });
        }

        let body_text = response.text().await.unwrap_or_default();
        Err(BridgeError::Contents {
            status: Some(status),
            message: sanitize_api_body(credential, &body_text),
        })
    }
}

/// Extract a human-readable message from an API error body and scrub any
/// credential material out of it. Falls back to the truncated raw body
/// when the JSON has no `message` field.
fn sanitize_api_body(credential: &Credential, body: &str) -> String {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message)
        .unwrap_or_else(|| truncate(body, 200));
    credential.scrub(&message)
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}…")
    }
}
