//! Repository listing across the supported git hosting platforms, using
//! each user's stored integration token.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use db::models::integration::{Integration, Platform};
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

const APP_USER_AGENT: &str = "Brainmint";
const PAGE_SIZE: u32 = 100;

#[derive(Debug, thiserror::Error)]
pub enum GitHostingError {
    #[error("integration not found or no token stored")]
    NotConnected,
    #[error("{platform} request failed with status {status}")]
    UpstreamStatus {
        platform: Platform,
        status: reqwest::StatusCode,
    },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Platform-neutral repository row returned to the client.
#[derive(Debug, Clone, Serialize)]
pub struct RepoSummary {
    pub name: String,
    pub url: String,
    pub description: String,
    pub stars: i64,
    pub language: String,
    pub updated_at: String,
    pub is_private: bool,
}

#[derive(Debug, Deserialize)]
struct GithubRepo {
    full_name: String,
    html_url: String,
    description: Option<String>,
    #[serde(default)]
    stargazers_count: i64,
    language: Option<String>,
    updated_at: String,
    #[serde(default)]
    private: bool,
}

#[derive(Debug, Deserialize)]
struct GitlabProject {
    path_with_namespace: String,
    web_url: String,
    description: Option<String>,
    #[serde(default)]
    star_count: i64,
    last_activity_at: String,
    visibility: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BitbucketPage {
    #[serde(default)]
    values: Vec<BitbucketRepo>,
}

#[derive(Debug, Deserialize)]
struct BitbucketRepo {
    full_name: String,
    links: BitbucketLinks,
    description: Option<String>,
    language: Option<String>,
    updated_on: String,
    #[serde(default)]
    is_private: bool,
}

#[derive(Debug, Deserialize)]
struct BitbucketLinks {
    html: BitbucketLink,
}

#[derive(Debug, Deserialize)]
struct BitbucketLink {
    href: String,
}

/// Upstream timestamps are ISO 8601; only the date part is shown.
fn date_prefix(timestamp: &str) -> String {
    timestamp.chars().take(10).collect()
}

/// List the user's repositories on one platform. A single upstream call,
/// no pagination beyond the first page.
pub async fn list_repos(
    pool: &SqlitePool,
    http: &reqwest::Client,
    user_id: Uuid,
    platform: Platform,
) -> Result<Vec<RepoSummary>, GitHostingError> {
    let integration = Integration::find_for_platform(pool, user_id, platform)
        .await?
        .filter(|i| !i.access_token.is_empty())
        .ok_or(GitHostingError::NotConnected)?;

    match platform {
        Platform::Github => list_github(http, &integration.access_token).await,
        Platform::Gitlab => list_gitlab(http, &integration.access_token).await,
        Platform::Bitbucket => list_bitbucket(http, &integration.access_token).await,
    }
}

async fn check_status(
    platform: Platform,
    response: reqwest::Response,
) -> Result<reqwest::Response, GitHostingError> {
    let status = response.status();
    if !status.is_success() {
        tracing::warn!(%platform, %status, "repository listing rejected upstream");
        return Err(GitHostingError::UpstreamStatus { platform, status });
    }
    Ok(response)
}

async fn list_github(
    http: &reqwest::Client,
    token: &str,
) -> Result<Vec<RepoSummary>, GitHostingError> {
    let url = format!("https://api.github.com/user/repos?per_page={PAGE_SIZE}&sort=updated");
    let response = http
        .get(url)
        .header(ACCEPT, "application/vnd.github+json")
        .header(USER_AGENT, APP_USER_AGENT)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .send()
        .await?;
    let repos: Vec<GithubRepo> = check_status(Platform::Github, response)
        .await?
        .json()
        .await?;

    Ok(repos
        .into_iter()
        .map(|repo| RepoSummary {
            name: repo.full_name,
            url: repo.html_url,
            description: repo.description.unwrap_or_default(),
            stars: repo.stargazers_count,
            language: repo.language.unwrap_or_default(),
            updated_at: date_prefix(&repo.updated_at),
            is_private: repo.private,
        })
        .collect())
}

async fn list_gitlab(
    http: &reqwest::Client,
    token: &str,
) -> Result<Vec<RepoSummary>, GitHostingError> {
    let url = format!(
        "https://gitlab.com/api/v4/projects?membership=true&per_page={PAGE_SIZE}&order_by=updated_at"
    );
    let response = http
        .get(url)
        .header(USER_AGENT, APP_USER_AGENT)
        .header("PRIVATE-TOKEN", token)
        .send()
        .await?;
    let projects: Vec<GitlabProject> = check_status(Platform::Gitlab, response)
        .await?
        .json()
        .await?;

    Ok(projects
        .into_iter()
        .map(|proj| RepoSummary {
            name: proj.path_with_namespace,
            url: proj.web_url,
            description: proj.description.unwrap_or_default(),
            stars: proj.star_count,
            language: String::new(),
            updated_at: date_prefix(&proj.last_activity_at),
            is_private: proj.visibility.as_deref() != Some("public"),
        })
        .collect())
}

async fn list_bitbucket(
    http: &reqwest::Client,
    token: &str,
) -> Result<Vec<RepoSummary>, GitHostingError> {
    // Bitbucket app passwords authenticate as `username:app_password`
    // behind HTTP basic auth.
    let encoded = BASE64.encode(token.as_bytes());
    let url = format!("https://api.bitbucket.org/2.0/repositories?role=member&pagelen={PAGE_SIZE}");
    let response = http
        .get(url)
        .header(USER_AGENT, APP_USER_AGENT)
        .header(AUTHORIZATION, format!("Basic {encoded}"))
        .send()
        .await?;
    let page: BitbucketPage = check_status(Platform::Bitbucket, response)
        .await?
        .json()
        .await?;

    Ok(page
        .values
        .into_iter()
        .map(|repo| RepoSummary {
            name: repo.full_name,
            url: repo.links.html.href,
            description: repo.description.unwrap_or_default(),
            stars: 0,
            language: repo.language.unwrap_or_default(),
            updated_at: date_prefix(&repo.updated_on),
            is_private: repo.is_private,
        })
        .collect())
}
