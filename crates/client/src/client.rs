//! HTTP core of the vRA client

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::TokenStore;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::models::Page;

/// API version pinned on every IaaS call
pub const IAAS_API_VERSION: &str = "2021-07-15";

/// Page size used when walking list endpoints
const PAGE_SIZE: usize = 100;

/// Authenticated handle to one vRA instance
///
/// Cheap to clone; all clones share the HTTP connection pool and the bearer
/// token.
#[derive(Clone)]
pub struct VraClient {
    inner: Arc<Inner>,
}

struct Inner {
    http: reqwest::Client,
    base_url: String,
    auth: TokenStore,
    poll_interval: Duration,
}

impl std::fmt::Debug for VraClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VraClient")
            .field("base_url", &self.inner.base_url)
            .finish()
    }
}

impl VraClient {
    /// Build a client without contacting the server
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.api_timeout)
            .danger_accept_invalid_certs(config.insecure)
            .user_agent(concat!("terraform-provider-vra/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url: config.url.trim_end_matches('/').to_string(),
                auth: TokenStore::new(&config),
                poll_interval: config.poll_interval,
            }),
        })
    }

    /// Build a client and authenticate once so bad credentials fail early
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let client = Self::new(config)?;
        client.inner.auth.bearer(&client.inner.http).await?;
        Ok(client)
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn poll_interval(&self) -> Duration {
        self.inner.poll_interval
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<String> {
        let url = format!("{}{}", self.inner.base_url, path);
        let mut retried = false;

        loop {
            let token = self.inner.auth.bearer(&self.inner.http).await?;
            let mut builder = self
                .inner
                .http
                .request(method.clone(), &url)
                .bearer_auth(&token)
                .query(query);
            if path.starts_with("/iaas/") {
                builder = builder.query(&[("apiVersion", IAAS_API_VERSION)]);
            }
            if let Some(body) = body {
                builder = builder.json(body);
            }

            debug!("{} {}", method, path);
            let response = builder.send().await?;
            let status = response.status();

            if status == StatusCode::UNAUTHORIZED && !retried && self.inner.auth.can_refresh() {
                warn!("vRA rejected the bearer token, logging in again");
                self.inner.auth.refresh(&self.inner.http).await?;
                retried = true;
                continue;
            }

            let text = response.text().await?;
            if status.is_success() {
                return Ok(text);
            }
            if status == StatusCode::NOT_FOUND {
                return Err(Error::NotFound {
                    path: path.to_string(),
                });
            }
            return Err(Error::Api {
                status: status.as_u16(),
                message: api_message(status, &text),
            });
        }
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let text = self.execute(Method::GET, path, query, None).await?;
        decode(&text)
    }

    pub(crate) async fn post<B, T>(&self, path: &str, query: &[(&str, &str)], body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        let text = self.execute(Method::POST, path, query, Some(&body)).await?;
        decode(&text)
    }

    /// POST without a request body, used for actions
    pub(crate) async fn post_action<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let text = self.execute(Method::POST, path, query, None).await?;
        decode(&text)
    }

    pub(crate) async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        let text = self.execute(Method::PATCH, path, &[], Some(&body)).await?;
        decode(&text)
    }

    pub(crate) async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        let text = self.execute(Method::PUT, path, &[], Some(&body)).await?;
        decode(&text)
    }

    /// DELETE, returning the response body when the server sent one
    pub(crate) async fn delete(&self, path: &str, query: &[(&str, &str)]) -> Result<Option<Value>> {
        let text = self.execute(Method::DELETE, path, query, None).await?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&text)?))
    }

    /// Walk a paged list endpoint with `$top`/`$skip`
    pub(crate) async fn list_all<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        let mut items: Vec<T> = Vec::new();
        let top = PAGE_SIZE.to_string();

        loop {
            let skip = items.len().to_string();
            let mut query = vec![("$top", top.as_str()), ("$skip", skip.as_str())];
            query.extend_from_slice(params);

            let page: Page<T> = self.get(path, &query).await?;
            let fetched = page.content.len();
            items.extend(page.content);

            if fetched == 0 || items.len() as i64 >= page.total_elements {
                break;
            }
        }
        Ok(items)
    }
}

fn decode<T: DeserializeOwned>(text: &str) -> Result<T> {
    if text.trim().is_empty() {
        return Ok(serde_json::from_str("null")?);
    }
    Ok(serde_json::from_str(text)?)
}

/// Pull the human readable message out of a vRA error body
fn api_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["message", "serverMessage", "error"] {
            if let Some(msg) = value.get(key).and_then(Value::as_str) {
                if !msg.is_empty() {
                    return msg.to_string();
                }
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        trimmed.chars().take(512).collect()
    }
}

/// Last path segment of a self link such as `/iaas/api/machines/{id}`
pub fn id_from_link(link: &str) -> Option<&str> {
    link.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_message_prefers_json_message() {
        let body = r#"{"message":"Project name already exists","statusCode":400}"#;
        assert_eq!(
            api_message(StatusCode::BAD_REQUEST, body),
            "Project name already exists"
        );
    }

    #[test]
    fn test_api_message_falls_back() {
        assert_eq!(api_message(StatusCode::BAD_GATEWAY, ""), "Bad Gateway");
        assert_eq!(api_message(StatusCode::BAD_GATEWAY, "upstream down"), "upstream down");
    }

    #[test]
    fn test_id_from_link() {
        assert_eq!(id_from_link("/iaas/api/machines/abc-123"), Some("abc-123"));
        assert_eq!(id_from_link("/iaas/api/machines/abc-123/"), Some("abc-123"));
        assert_eq!(id_from_link(""), None);
    }
}
