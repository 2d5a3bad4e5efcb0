//! Authenticated session with the metadata repository
//!
//! The session is established once, in [`RepositoryClient::connect`],
//! and reused for the life of the process. Every call is wrapped with
//! exponential backoff on transient transport failures, bounded by a
//! total elapsed-time ceiling; application errors (any HTTP status
//! error, malformed bodies) propagate immediately without retry.

use adit_common::{AditError, RepositoryConfig, Result};
use reqwest::{Client, Method, Request, RequestBuilder, Response};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::model::CatalogRecord;

/// Header carrying the authenticated session token
const SESSION_HEADER: &str = "X-ArchivesSpace-Session";

/// Relations resolved inline when fetching a full catalog record
const RESOLVE_RELATIONS: [&str; 6] = [
    "ancestors",
    "digital_object",
    "linked_agents",
    "repository",
    "subjects",
    "top_container",
];

/// Upper bound for a single backoff delay
const MAX_BACKOFF: Duration = Duration::from_secs(64);

/// Session handle for the metadata repository
pub struct RepositoryClient {
    http: Client,
    base_url: String,
    repository_id: String,
    session: String,
    basic_auth: Option<(String, String)>,
    retry_ceiling: Duration,
}

impl RepositoryClient {
    /// Establish and authenticate a repository session.
    ///
    /// Authentication failure is fatal: no operation can proceed
    /// without a session token.
    pub async fn connect(config: &RepositoryConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let basic_auth = match (&config.basic_auth_username, &config.basic_auth_password) {
            (Some(username), Some(password)) => Some((username.clone(), password.clone())),
            _ => None,
        };

        let base_url = config.base_url.trim_end_matches('/').to_string();
        debug!(url = %base_url, "establishing repository session");

        let mut login = http
            .post(format!("{}/users/{}/login", base_url, config.username))
            .query(&[("password", config.password.as_str())]);
        if let Some((username, password)) = &basic_auth {
            login = login.basic_auth(username, Some(password));
        }

        let response = login
            .send()
            .await
            .map_err(|err| AditError::auth(err.to_string()))?;
        if !response.status().is_success() {
            return Err(AditError::auth(format!(
                "login returned {}",
                response.status()
            )));
        }
        let body: Value = response
            .json()
            .await
            .map_err(|err| AditError::auth(err.to_string()))?;
        let session = body
            .get("session")
            .and_then(Value::as_str)
            .ok_or_else(|| AditError::auth("login response carried no session token".to_string()))?
            .to_string();

        debug!(url = %base_url, "repository session established");
        Ok(Self {
            http,
            base_url,
            repository_id: config.repository_id.clone(),
            session,
            basic_auth,
            retry_ceiling: Duration::from_secs(config.retry_ceiling_secs),
        })
    }

    pub fn repository_id(&self) -> &str {
        &self.repository_id
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self
            .http
            .request(method, self.url(path))
            .header(SESSION_HEADER, &self.session);
        if let Some((username, password)) = &self.basic_auth {
            builder = builder.basic_auth(username, Some(password));
        }
        builder
    }

    /// Execute a request, retrying transient transport failures with
    /// exponential backoff until the elapsed-time ceiling is reached,
    /// after which the underlying error propagates unmodified.
    async fn execute(&self, request: Request) -> Result<Response> {
        let started = Instant::now();
        let mut delay = Duration::from_secs(1);

        loop {
            let attempt = request
                .try_clone()
                .ok_or_else(|| AditError::repository("request body cannot be replayed"))?;
            match self.http.execute(attempt).await {
                Ok(response) => return Ok(response),
                Err(err) if is_transient(&err) && started.elapsed() + delay < self.retry_ceiling => {
                    warn!(error = %err, retry_in = ?delay, "transient repository failure, backing off");
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(MAX_BACKOFF);
                },
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// GET a JSON document. Non-2xx statuses are errors.
    pub async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let request = self.request(Method::GET, path).query(query).build()?;
        let response = self.execute(request).await?;
        Ok(response.error_for_status()?.json().await?)
    }

    /// POST a JSON document. Non-2xx statuses are errors.
    pub async fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
        let request = self.request(Method::POST, path).json(body).build()?;
        let response = self.execute(request).await?;
        Ok(response.error_for_status()?.json().await?)
    }

    /// POST a JSON document and return the body regardless of status,
    /// for callers that branch on the repository's error shape.
    pub async fn post_for_outcome(&self, path: &str, body: &Value) -> Result<Value> {
        let request = self.request(Method::POST, path).json(body).build()?;
        let response = self.execute(request).await?;
        Ok(response.json().await?)
    }

    /// Count resources whose sole public identifier equals `identifier`.
    pub async fn count_resource_matches(&self, identifier: &str) -> Result<usize> {
        let path = format!("/repositories/{}/find_by_id/resources", self.repository_id);
        let body = self
            .get_json(&path, &[("identifier[]", format!("[\"{identifier}\"]"))])
            .await?;
        Ok(match_refs(&body, "resources").len())
    }

    /// Count archival objects whose component id equals `component_id`.
    pub async fn count_archival_object_matches(&self, component_id: &str) -> Result<usize> {
        Ok(self.find_archival_object_refs(component_id).await?.len())
    }

    async fn find_archival_object_refs(&self, component_id: &str) -> Result<Vec<String>> {
        let path = format!(
            "/repositories/{}/find_by_id/archival_objects",
            self.repository_id
        );
        let body = self
            .get_json(&path, &[("component_id[]", component_id.to_string())])
            .await?;
        Ok(match_refs(&body, "archival_objects"))
    }

    /// Resolve a component id to its full catalog record.
    ///
    /// Zero matches and multiple matches are both errors. The record is
    /// fetched fresh on every call with ancestors, digital object,
    /// linked agents, repository, subjects, and top container resolved.
    pub async fn find_archival_object(&self, component_id: &str) -> Result<CatalogRecord> {
        let refs = self.find_archival_object_refs(component_id).await?;
        let reference = match refs.as_slice() {
            [] => return Err(AditError::RecordNotFound(component_id.to_string())),
            [reference] => reference.clone(),
            _ => return Err(AditError::MultipleMatches(component_id.to_string())),
        };

        let resolve: Vec<(&str, String)> = RESOLVE_RELATIONS
            .iter()
            .map(|relation| ("resolve[]", (*relation).to_string()))
            .collect();
        let record = self.get_json(&reference, &resolve).await?;
        debug!(%component_id, %reference, "catalog record resolved");
        Ok(serde_json::from_value(record)?)
    }

    /// Post an updated catalog record back to its own URI.
    pub async fn update_record(&self, record: &CatalogRecord) -> Result<Value> {
        self.post_json(&record.uri, &serde_json::to_value(record)?)
            .await
    }
}

fn match_refs(body: &Value, key: &str) -> Vec<String> {
    body.get(key)
        .and_then(Value::as_array)
        .map(|matches| {
            matches
                .iter()
                .filter_map(|candidate| {
                    candidate
                        .get("ref")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Transport-level failures worth retrying: connection establishment,
/// timeouts, and mid-transfer errors that carry no HTTP status. Status
/// errors, decode errors, and builder errors are never transient.
fn is_transient(err: &reqwest::Error) -> bool {
    if err.status().is_some() || err.is_decode() || err.is_builder() {
        return false;
    }
    err.is_connect() || err.is_timeout() || err.is_request() || err.is_body()
}
