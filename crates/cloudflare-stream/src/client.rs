use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::form_urlencoded;

use crate::error::{Result, StreamError};
use crate::settings::CloudflareSettings;
use crate::types::ApiResponse;

pub const DEFAULT_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

/// Executes a single authenticated API request and returns the raw response body.
///
/// `uri` is the path (and query) relative to the API base, as produced by [build_uri].
/// Implementations must map non-success statuses to an error.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn execute(&self, method: Method, uri: &str, body: Option<Vec<u8>>) -> Result<Bytes>;
}

/// HTTP executor for the Cloudflare API
pub struct HttpExecutor {
    http_client: Client,
    api_token: String,
    base_url: String,
}

impl HttpExecutor {
    pub fn new(api_token: String, base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        Ok(Self {
            http_client: builder.build()?,
            api_token,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl RequestExecutor for HttpExecutor {
    async fn execute(&self, method: Method, uri: &str, body: Option<Vec<u8>>) -> Result<Bytes> {
        let url = format!("{}{}", self.base_url, uri);
        debug!("{} {}", method, url);

        let mut request = self
            .http_client
            .request(method, &url)
            .bearer_auth(&self.api_token);
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(StreamError::from_response(status.as_u16(), &body));
        }
        Ok(body)
    }
}

/// Append `params` to `path` as a url-encoded query string.
pub fn build_uri<I, K, V>(path: &str, params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut query = form_urlencoded::Serializer::new(String::new());
    for (k, v) in params {
        query.append_pair(k.as_ref(), v.as_ref());
    }
    let query = query.finish();
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{query}")
    }
}

/// Client for the Cloudflare Stream API
///
/// Cheap to clone, all clones share the same executor.
#[derive(Clone)]
pub struct CloudflareClient {
    executor: Arc<dyn RequestExecutor>,
    cancel: Option<CancellationToken>,
}

impl CloudflareClient {
    /// Create a client which talks to the Cloudflare API over HTTP
    pub fn new(settings: &CloudflareSettings) -> Result<Self> {
        let executor = HttpExecutor::new(
            settings.api_token.clone(),
            &settings.base_url,
            settings.timeout_secs.map(Duration::from_secs),
        )?;
        Ok(Self::with_executor(Arc::new(executor)))
    }

    pub fn with_executor(executor: Arc<dyn RequestExecutor>) -> Self {
        Self {
            executor,
            cancel: None,
        }
    }

    /// Race every request made by the returned client against `token`.
    ///
    /// Requests still in flight when the token fires return [StreamError::Cancelled].
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub(crate) async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Bytes> {
        match &self.cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(StreamError::Cancelled),
                r = self.executor.execute(method, uri, body) => r,
            },
            None => self.executor.execute(method, uri, body).await,
        }
    }

    /// Send a request and unwrap the `result` of the response envelope
    pub(crate) async fn fetch<T: DeserializeOwned>(
        &self,
        method: Method,
        uri: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Option<T>> {
        let rsp = self.send(method, uri, body).await?;
        serde_json::from_slice::<ApiResponse<T>>(&rsp)?.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeExecutor, PendingExecutor};

    #[test]
    fn test_build_uri_without_params() {
        let uri = build_uri("/accounts/a/stream/live_inputs", Vec::<(&str, &str)>::new());
        assert_eq!(uri, "/accounts/a/stream/live_inputs");
    }

    #[test]
    fn test_build_uri_encodes_params() {
        let uri = build_uri("/x", [("include_counts", "true"), ("q", "a b&c")]);
        assert_eq!(uri, "/x?include_counts=true&q=a+b%26c");
    }

    #[tokio::test]
    async fn test_fetch_unwraps_result() {
        let fake =
            FakeExecutor::new(r#"{"success":true,"errors":[],"messages":[],"result":{"a":1}}"#);
        let client = CloudflareClient::with_executor(fake.clone());
        let value: Option<serde_json::Value> = client.fetch(Method::GET, "/x", None).await.unwrap();
        assert_eq!(value, Some(serde_json::json!({"a": 1})));
        assert_eq!(fake.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_request() {
        let token = CancellationToken::new();
        let client = CloudflareClient::with_executor(Arc::new(PendingExecutor))
            .with_cancellation(token.clone());
        token.cancel();
        let r = client.send(Method::GET, "/x", None).await;
        assert!(matches!(r, Err(StreamError::Cancelled)));
    }

    #[tokio::test]
    async fn test_cancel_while_in_flight() {
        let token = CancellationToken::new();
        let client = CloudflareClient::with_executor(Arc::new(PendingExecutor))
            .with_cancellation(token.clone());
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });
        let r = client.send(Method::GET, "/x", None).await;
        assert!(matches!(r, Err(StreamError::Cancelled)));
    }
}
