use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use api_types::ErrorBody;
use engine::FailureStatus;
use reqwest::{Method, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::ApiError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const API_PREFIX: &str = "api/v1/";

type UnauthenticatedHook = Arc<dyn Fn() + Send + Sync>;
type Query<'a> = &'a [(String, String)];

/// Authenticated JSON client for the dashboard API. Cheap to clone.
#[derive(Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

struct Inner {
    http: reqwest::Client,
    api_root: Url,
    token: RwLock<Option<String>>,
    on_unauthenticated: Option<UnauthenticatedHook>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("api_root", &self.inner.api_root.as_str())
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Return a builder for `Client`.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    pub fn api_root(&self) -> &Url {
        &self.inner.api_root
    }

    /// Replace the bearer token used from the next request on.
    pub async fn set_token(&self, token: Option<String>) {
        *self.inner.token.write().await = token.filter(|t| !t.trim().is_empty());
    }

    pub async fn has_token(&self) -> bool {
        self.inner.token.read().await.is_some()
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.inner
            .api_root
            .join(path.trim_start_matches('/'))
            .map_err(|err| ApiError::Config(format!("invalid path {path}: {err}")))
    }

    async fn send<B>(
        &self,
        method: Method,
        path: &str,
        query: Query<'_>,
        body: Option<&B>,
    ) -> Result<Vec<u8>, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(path)?;
        debug!(%method, %url, "api request");

        let mut req = self.inner.http.request(method, url);
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        let token = self.inner.token.read().await.clone();
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        if status.is_success() {
            return Ok(bytes.to_vec());
        }
        Err(self.failure(status, &bytes))
    }

    fn failure(&self, status: StatusCode, body: &[u8]) -> ApiError {
        let message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });
        warn!(status = status.as_u16(), %message, "api request failed");

        if status == StatusCode::UNAUTHORIZED
            && let Some(hook) = &self.inner.on_unauthenticated
        {
            hook();
        }
        ApiError::RequestFailed {
            status: FailureStatus::Http(status.as_u16()),
            message,
        }
    }

    fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
        // Some action endpoints answer 204 or an empty 200.
        let bytes = if bytes.iter().all(u8::is_ascii_whitespace) {
            b"{}".as_slice()
        } else {
            bytes
        };
        serde_json::from_slice(bytes).map_err(|err| ApiError::Decode(err.to_string()))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: Query<'_>) -> Result<T, ApiError> {
        let bytes = self.send::<()>(Method::GET, path, query, None).await?;
        Self::decode(&bytes)
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let bytes = self.send(Method::POST, path, &[], Some(body)).await?;
        Self::decode(&bytes)
    }

    /// POST without a request body.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let bytes = self.send::<()>(Method::POST, path, &[], None).await?;
        Self::decode(&bytes)
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let bytes = self.send(Method::PUT, path, &[], Some(body)).await?;
        Self::decode(&bytes)
    }

    /// DELETE; whatever the server answers on success is ignored.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.delete_with_query(path, &[]).await
    }

    /// DELETE with a query string, for the bulk endpoints taking `ids[n]`.
    pub async fn delete_with_query(&self, path: &str, query: Query<'_>) -> Result<(), ApiError> {
        self.send::<()>(Method::DELETE, path, query, None).await?;
        Ok(())
    }
}

#[derive(Default)]
pub struct ClientBuilder {
    base_url: String,
    token: Option<String>,
    timeout: Option<Duration>,
    on_unauthenticated: Option<UnauthenticatedHook>,
}

impl ClientBuilder {
    /// Server root, e.g. `https://api.example.com`; `/api/v1/` is appended.
    pub fn base_url(mut self, base_url: &str) -> ClientBuilder {
        self.base_url = base_url.to_string();
        self
    }

    pub fn token(mut self, token: Option<String>) -> ClientBuilder {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> ClientBuilder {
        self.timeout = Some(timeout);
        self
    }

    /// Called on every 401 answer, before the error is returned.
    pub fn on_unauthenticated(mut self, hook: impl Fn() + Send + Sync + 'static) -> ClientBuilder {
        self.on_unauthenticated = Some(Arc::new(hook));
        self
    }

    pub fn build(self) -> Result<Client, ApiError> {
        let base = self.base_url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(ApiError::Config("base_url is empty".to_string()));
        }
        let api_root = Url::parse(&format!("{base}/{API_PREFIX}"))
            .map_err(|err| ApiError::Config(format!("invalid base_url {base}: {err}")))?;
        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ApiError::Config(err.to_string()))?;
        tracing::info!(api_root = %api_root, timeout_secs = timeout.as_secs(), "api client ready");

        Ok(Client {
            inner: Arc::new(Inner {
                http,
                api_root,
                token: RwLock::new(self.token),
                on_unauthenticated: self.on_unauthenticated,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_root_gets_prefix_once() {
        let client = Client::builder()
            .base_url("https://api.jumla.test/")
            .build()
            .unwrap();
        assert_eq!(client.api_root().as_str(), "https://api.jumla.test/api/v1/");
        assert_eq!(
            client.url("/dashboard/admin/loans").unwrap().as_str(),
            "https://api.jumla.test/api/v1/dashboard/admin/loans"
        );
    }

    #[test]
    fn empty_base_url_is_rejected() {
        assert!(matches!(
            Client::builder().base_url("  ").build(),
            Err(ApiError::Config(_))
        ));
    }

    #[test]
    fn failure_prefers_server_message() {
        let client = Client::builder().base_url("http://localhost").build().unwrap();
        let err = client.failure(StatusCode::UNPROCESSABLE_ENTITY, br#"{"message":"Invalid amount"}"#);
        assert_eq!(err.to_string(), "Invalid amount");

        let err = client.failure(StatusCode::BAD_GATEWAY, b"<html>");
        assert_eq!(err.to_string(), "Bad Gateway");
        assert_eq!(err.status(), Some(FailureStatus::Http(502)));
    }
}
