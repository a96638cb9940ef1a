use std::sync::Arc;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::{ClassifiedError, ClientInitError, ErrorBody, RawApiError};
use crate::pipeline::ErrorPipeline;
use crate::session::AuthStore;

/// HTTP client for the console's REST API.
///
/// Attaches the session's bearer token to every request and routes every
/// failure through the [`ErrorPipeline`] before returning it.
pub struct ApiClient {
    pub(crate) client: reqwest::Client,
    pub(crate) base_url: String,
    pub(crate) auth: Arc<AuthStore>,
    pub(crate) pipeline: Arc<ErrorPipeline>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("client", &self.client)
            .field("base_url", &self.base_url)
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// # Errors
    /// Returns an error if the base URL is not http(s) or the HTTP client
    /// cannot be built (TLS backend failure).
    pub fn new(
        config: &ClientConfig,
        auth: Arc<AuthStore>,
        pipeline: Arc<ErrorPipeline>,
    ) -> Result<Self, ClientInitError> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_owned();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientInitError::BaseUrl(config.base_url.clone()));
        }
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, base_url, auth, pipeline })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub const fn auth(&self) -> &Arc<AuthStore> {
        &self.auth
    }

    #[must_use]
    pub const fn pipeline(&self) -> &Arc<ErrorPipeline> {
        &self.pipeline
    }

    /// Sends one request and decodes the JSON response.
    ///
    /// Offline clients fail without touching the network.
    ///
    /// # Errors
    /// Returns the classified failure after the pipeline has notified the user.
    pub async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ClassifiedError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        if !self.pipeline.is_online() {
            return Err(self.pipeline.handle(&RawApiError::fetch("client is offline")));
        }
        match self.execute(method, path, body).await {
            Ok(value) => Ok(value),
            Err(raw) => Err(self.pipeline.handle(&raw)),
        }
    }

    async fn execute<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, RawApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%method, %url, "api request");

        let mut request = self.client.request(method, &url);
        if let Some(token) = self.auth.token() {
            request = request.header("Authorization", format!("Bearer {token}"));
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            let data = serde_json::from_str::<ErrorBody>(&text).ok();
            return Err(RawApiError::http(status.as_u16(), data));
        }

        serde_json::from_str(&text).map_err(|e| {
            RawApiError::parsing(format!("{e} (body: {})", truncate(&text, 200)))
        })
    }
}

fn transport_error(err: reqwest::Error) -> RawApiError {
    if err.is_timeout() { RawApiError::timeout() } else { RawApiError::fetch(err.to_string()) }
}

/// Truncates a string to the given maximum length at a char boundary.
#[must_use]
pub fn truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        s
    } else {
        let mut end = max_len;
        while end > 0 && !s.is_char_boundary(end) {
            end = end.saturating_sub(1);
        }
        s.get(..end).unwrap_or("")
    }
}
