//! HTTP client for oracle requests

use crate::config::OutgoingSettings;
use anyhow::Result;
use reqwest::{Client, Response};
use std::time::Duration;

/// User agent sent with every request
const USER_AGENT: &str = concat!("domain-discovery/", env!("CARGO_PKG_VERSION"));

/// Raw HTTP response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub text: String,
}

impl HttpResponse {
    /// Parse response as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.text)?)
    }

    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client wrapper configured from outgoing settings
///
/// The request timeout configured here is the only timeout applied to
/// oracle calls.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self> {
        Self::with_settings(&OutgoingSettings::default())
    }

    /// Create a new HTTP client with custom settings
    pub fn with_settings(settings: &OutgoingSettings) -> Result<Self> {
        let timeout = Duration::from_secs_f64(settings.request_timeout);
        let mut builder = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(settings.pool_maxsize)
            .user_agent(USER_AGENT)
            .gzip(true)
            .brotli(true);

        // SSL verification
        if !settings.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }

        // Proxy settings
        if let Some(ref proxy_url) = settings.proxies.all {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        } else {
            if let Some(ref http) = settings.proxies.http {
                builder = builder.proxy(reqwest::Proxy::http(http)?);
            }
            if let Some(ref https) = settings.proxies.https {
                builder = builder.proxy(reqwest::Proxy::https(https)?);
            }
        }

        Ok(Self {
            client: builder.build()?,
            timeout,
        })
    }

    /// Configured request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// POST a JSON body, optionally with a bearer token
    pub async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        bearer: Option<&str>,
    ) -> Result<HttpResponse> {
        let mut request = self
            .client
            .post(url)
            .header("Accept", "application/json")
            .json(body);

        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        Self::parse_response(response).await
    }

    async fn parse_response(response: Response) -> Result<HttpResponse> {
        let status = response.status().as_u16();
        let text = response.text().await?;
        Ok(HttpResponse { status, text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_creation() {
        let client = HttpClient::new();
        assert!(client.is_ok());
    }

    #[test]
    fn test_client_uses_configured_timeout() {
        let settings = OutgoingSettings {
            request_timeout: 1.5,
            ..Default::default()
        };
        let client = HttpClient::with_settings(&settings).unwrap();
        assert_eq!(client.timeout(), Duration::from_millis(1500));
    }

    #[test]
    fn test_response_status() {
        let ok = HttpResponse {
            status: 200,
            text: "[\"a\"]".to_string(),
        };
        assert!(ok.is_success());
        assert_eq!(ok.json::<Vec<String>>().unwrap(), vec!["a"]);

        let limited = HttpResponse {
            status: 429,
            text: String::new(),
        };
        assert!(!limited.is_success());
    }
}
