//! # HTTP Transport
//!
//! Thin reqwest wrapper shared by the typed API clients.
//!
//! ## Responsibilities
//! - Base-URL joining and JSON (de)serialization
//! - Bearer authentication when a token is supplied
//! - Decoding structured error bodies into [`ClientError::Api`]
//!
//! Transport failures become [`ClientError::Network`]; nothing is retried.

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ApiErrorBody, ClientError, ClientResult};

/// Shared HTTP transport.
#[derive(Debug, Clone)]
pub struct Http {
    client: reqwest::Client,
    base_url: Url,
}

impl Http {
    /// Builds the transport from the client configuration.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ClientError::InvalidConfig(format!("failed to build HTTP client: {}", e)))?;

        Ok(Http {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Joins a path onto the configured base URL.
    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        // Url::join treats the base as a directory only with a trailing slash
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        base.join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::InvalidConfig(format!("bad endpoint path {}: {}", path, e)))
    }

    fn request(&self, method: Method, url: Url, token: Option<&str>) -> RequestBuilder {
        let mut builder = self.client.request(method, url);
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<T> {
        let response = builder.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        // Decode the structured body; a body that fails to parse still
        // surfaces as an Api error carrying the status
        let body = response.json::<ApiErrorBody>().await.unwrap_or_default();
        debug!(status = %status, message = %body.message, "API request rejected");
        Err(ClientError::api(status.as_u16(), body))
    }

    /// GET with optional query parameters.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
        query: &[(&str, String)],
    ) -> ClientResult<T> {
        let url = self.endpoint(path)?;
        let builder = self.request(Method::GET, url, token).query(query);
        self.execute(builder).await
    }

    /// POST with a JSON body.
    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> ClientResult<T> {
        let url = self.endpoint(path)?;
        let builder = self.request(Method::POST, url, token).json(body);
        self.execute(builder).await
    }

    /// PUT with a JSON body.
    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> ClientResult<T> {
        let url = self.endpoint(path)?;
        let builder = self.request(Method::PUT, url, token).json(body);
        self.execute(builder).await
    }

    /// DELETE; the response body is discarded.
    pub async fn delete(&self, path: &str, token: Option<&str>) -> ClientResult<()> {
        let url = self.endpoint(path)?;
        let response = self.request(Method::DELETE, url, token).send().await?;
        let status = response.status();

        if status.is_success() || status == StatusCode::NO_CONTENT {
            return Ok(());
        }

        let body = response.json::<ApiErrorBody>().await.unwrap_or_default();
        Err(ClientError::api(status.as_u16(), body))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn http(base: &str) -> Http {
        let config = ClientConfig::new(base).unwrap();
        Http::new(&config).unwrap()
    }

    #[test]
    fn test_endpoint_joining() {
        let http = http("https://pos.example.com/api");
        assert_eq!(
            http.endpoint("auth/login").unwrap().as_str(),
            "https://pos.example.com/api/auth/login"
        );
        // Leading slash must not escape the base path
        assert_eq!(
            http.endpoint("/products").unwrap().as_str(),
            "https://pos.example.com/api/products"
        );
    }

    #[test]
    fn test_endpoint_joining_with_trailing_slash_base() {
        let http = http("https://pos.example.com/api/");
        assert_eq!(
            http.endpoint("products").unwrap().as_str(),
            "https://pos.example.com/api/products"
        );
    }
}
