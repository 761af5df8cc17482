//! HTTP client for the G-Click task endpoints.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashSet;

use super::auth::{Session, TokenPolicy, TokenProvider};
use super::error::FetchError;
use super::types::{Listing, Task, TaskCategory, User};
use super::TaskSource;
use crate::config::{Config, Credentials};

/// Page size requested from `/tarefas`.
pub const PAGE_SIZE: u32 = 100;

/// Client for the owners and tasks listings.
pub struct GClickClient {
    client: Client,
    base_url: String,
    session: Session,
}

impl GClickClient {
    /// Build a client from the run configuration.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.http_timeout).build()?;
        Ok(Self::with_client(
            client,
            config.api_url.as_str(),
            config.credentials.clone(),
            config.token_policy,
        ))
    }

    /// Build a client around an existing `reqwest::Client`.
    pub fn with_client(
        client: Client,
        base_url: &str,
        credentials: Credentials,
        policy: TokenPolicy,
    ) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        let provider = TokenProvider::new(client.clone(), &base_url, credentials);
        Self {
            client,
            base_url,
            session: Session::new(provider, policy),
        }
    }

    /// Authorized GET returning the decoded JSON body.
    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, FetchError> {
        let token = self.session.token().await?;
        let url = format!("{}{}", self.base_url, path);

        let request = self
            .client
            .get(&url)
            .query(query)
            .header(AUTHORIZATION, token.bearer_header())
            .build()
            .map_err(|source| FetchError::Request {
                url: url.clone(),
                source,
            })?;
        let url = request.url().to_string();

        tracing::debug!("GET {}", url);

        let resp = self
            .client
            .execute(request)
            .await
            .map_err(|source| FetchError::Request {
                url: url.clone(),
                source,
            })?;

        let status = resp.status();
        let text = resp.text().await.map_err(|source| FetchError::Request {
            url: url.clone(),
            source,
        })?;

        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status,
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|source| FetchError::Decode { url, source })
    }

    /// List the users who own tasks, deduplicated by id.
    ///
    /// The first name seen for an id wins and listing order is preserved.
    pub async fn list_owners(&self) -> Result<Vec<User>, FetchError> {
        let body = self.get_json("/tarefas/responsaveis", &[]).await?;

        let entries = match Listing::classify(body) {
            Listing::Page { content, .. } => content,
            Listing::Bare(items) => items,
            Listing::Unexpected(shape) => {
                tracing::warn!("Unexpected owners response ({}), treating as empty", shape);
                return Ok(Vec::new());
            }
        };

        let mut seen = HashSet::new();
        let mut owners = Vec::new();
        for entry in &entries {
            match User::from_entry(entry) {
                Some(user) => {
                    if seen.insert(user.id) {
                        owners.push(user);
                    }
                }
                None => tracing::debug!("Skipping owner entry without id/name: {}", entry),
            }
        }

        Ok(owners)
    }

    /// List every task of `category` assigned to `owner_id`, following pages
    /// until the server reports the last one or returns an empty page.
    pub async fn list_tasks(
        &self,
        owner_id: i64,
        category: TaskCategory,
    ) -> Result<Vec<Task>, FetchError> {
        let mut tasks = Vec::new();
        let mut page: u32 = 0;

        loop {
            let query = [
                ("categoria", category.query_value().to_string()),
                ("responsaveisIds", owner_id.to_string()),
                ("page", page.to_string()),
                ("size", PAGE_SIZE.to_string()),
            ];
            let body = self.get_json("/tarefas", &query).await?;

            let (content, last) = match Listing::classify(body) {
                Listing::Page { content, last } => (content, last),
                Listing::Bare(_) => {
                    tracing::warn!(
                        "Tasks page {} for user {} ({}) is a bare list, stopping",
                        page,
                        owner_id,
                        category
                    );
                    break;
                }
                Listing::Unexpected(shape) => {
                    tracing::warn!(
                        "Unexpected tasks response for user {} ({}) on page {}: {}, stopping",
                        owner_id,
                        category,
                        page,
                        shape
                    );
                    break;
                }
            };

            let received = content.len();
            for item in content {
                if !item.is_object() {
                    tracing::debug!("Skipping non-object task entry: {}", item);
                    continue;
                }
                match serde_json::from_value::<Task>(item) {
                    Ok(task) => tasks.push(task),
                    Err(e) => tracing::warn!("Skipping malformed task: {}", e),
                }
            }

            if last || received == 0 {
                break;
            }
            page += 1;
        }

        Ok(tasks)
    }
}

#[async_trait]
impl TaskSource for GClickClient {
    async fn list_owners(&self) -> Result<Vec<User>, FetchError> {
        GClickClient::list_owners(self).await
    }

    async fn list_tasks(
        &self,
        owner_id: i64,
        category: TaskCategory,
    ) -> Result<Vec<Task>, FetchError> {
        GClickClient::list_tasks(self, owner_id, category).await
    }
}
