//! Oracle backend implementations

use super::prompts::{extract_json_array, Prompts};
use super::{OracleError, OracleRecord};
use crate::config::OracleSettings;
use crate::network::{HttpClient, HttpResponse};
use async_trait::async_trait;
use serde_json::json;
use tracing::debug;
use url::Url;

/// Trait for oracle backends
///
/// Backends report every failure; turning failures into fallback
/// values is the job of [`super::Oracle`].
#[async_trait]
pub trait OracleBackend: Send + Sync {
    /// Backend name
    fn name(&self) -> &str;

    /// Suggest additional search terms for a query
    async fn enrich_terms(&self, query: &str, corpus: &[String])
        -> Result<Vec<String>, OracleError>;

    /// Pick the record ids most relevant to a query, best first
    async fn rank_records(
        &self,
        query: &str,
        records: &[OracleRecord],
    ) -> Result<Vec<String>, OracleError>;
}

/// Get a backend by name
pub fn get_backend(
    name: &str,
    settings: &OracleSettings,
    client: &HttpClient,
) -> Result<Box<dyn OracleBackend>, OracleError> {
    let name = name.to_lowercase();
    if !matches!(name.as_str(), "none" | "disabled" | "") {
        Url::parse(&settings.endpoint).map_err(|e| {
            OracleError::Unconfigured(format!("invalid endpoint {}: {}", settings.endpoint, e))
        })?;
    }

    match name.as_str() {
        "none" | "disabled" | "" => Ok(Box::new(DisabledOracle)),
        "http" | "json" => Ok(Box::new(HttpOracle::new(
            client.clone(),
            &settings.endpoint,
            settings.api_key.clone(),
        ))),
        "openai" | "chat" => Ok(Box::new(ChatOracle::new(client.clone(), settings)?)),
        other => Err(OracleError::Unconfigured(format!(
            "unknown oracle backend: {}",
            other
        ))),
    }
}

/// List available backends
pub fn list_backends() -> Vec<&'static str> {
    vec!["none", "http", "openai"]
}

fn check_status(response: &HttpResponse) -> Result<(), OracleError> {
    if response.is_success() {
        Ok(())
    } else {
        debug!("Oracle error body: {}", response.text);
        Err(OracleError::Status(response.status))
    }
}

fn parse_string_array(text: &str) -> Result<Vec<String>, OracleError> {
    serde_json::from_str::<Vec<String>>(text)
        .map_err(|e| OracleError::MalformedResponse(e.to_string()))
}

/// Backend that never answers
pub struct DisabledOracle;

#[async_trait]
impl OracleBackend for DisabledOracle {
    fn name(&self) -> &str {
        "none"
    }

    async fn enrich_terms(
        &self,
        _query: &str,
        _corpus: &[String],
    ) -> Result<Vec<String>, OracleError> {
        Err(OracleError::Disabled)
    }

    async fn rank_records(
        &self,
        _query: &str,
        _records: &[OracleRecord],
    ) -> Result<Vec<String>, OracleError> {
        Err(OracleError::Disabled)
    }
}

/// Plain JSON oracle service
///
/// `POST {endpoint}/enrich` with `{query, corpus}` answers a JSON array
/// of terms; `POST {endpoint}/match` with `{query, records}` answers a
/// JSON array of record ids.
pub struct HttpOracle {
    client: HttpClient,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpOracle {
    pub fn new(client: HttpClient, endpoint: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    async fn post(&self, route: &str, body: serde_json::Value) -> Result<Vec<String>, OracleError> {
        let url = format!("{}/{}", self.endpoint, route);
        let response = self
            .client
            .post_json(&url, &body, self.api_key.as_deref())
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        check_status(&response)?;
        parse_string_array(&response.text)
    }
}

#[async_trait]
impl OracleBackend for HttpOracle {
    fn name(&self) -> &str {
        "http"
    }

    async fn enrich_terms(
        &self,
        query: &str,
        corpus: &[String],
    ) -> Result<Vec<String>, OracleError> {
        self.post("enrich", json!({ "query": query, "corpus": corpus }))
            .await
    }

    async fn rank_records(
        &self,
        query: &str,
        records: &[OracleRecord],
    ) -> Result<Vec<String>, OracleError> {
        self.post("match", json!({ "query": query, "records": records }))
            .await
    }
}

/// OpenAI-compatible chat-completions oracle
pub struct ChatOracle {
    client: HttpClient,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    prompts: Prompts,
}

impl ChatOracle {
    pub fn new(client: HttpClient, settings: &OracleSettings) -> Result<Self, OracleError> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| OracleError::Unconfigured("missing oracle api key".to_string()))?;

        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
            api_key,
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            prompts: Prompts::new()?,
        })
    }

    async fn complete(&self, system: &str, user: &str) -> Result<Vec<String>, OracleError> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });

        let response = self
            .client
            .post_json(&self.endpoint, &body, Some(&self.api_key))
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        check_status(&response)?;

        let value: serde_json::Value = response
            .json()
            .map_err(|e| OracleError::MalformedResponse(e.to_string()))?;

        let content = value
            .get("choices")
            .and_then(|choices| choices.as_array())
            .and_then(|choices| choices.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .ok_or_else(|| OracleError::MalformedResponse("missing message content".into()))?;

        let array = extract_json_array(content)
            .ok_or_else(|| OracleError::MalformedResponse("no JSON array in reply".into()))?;
        parse_string_array(array)
    }
}

#[async_trait]
impl OracleBackend for ChatOracle {
    fn name(&self) -> &str {
        "openai"
    }

    async fn enrich_terms(
        &self,
        query: &str,
        corpus: &[String],
    ) -> Result<Vec<String>, OracleError> {
        let user = self.prompts.enrich_user(query, corpus)?;
        self.complete(self.prompts.enrich_system(), &user).await
    }

    async fn rank_records(
        &self,
        query: &str,
        records: &[OracleRecord],
    ) -> Result<Vec<String>, OracleError> {
        let user = self.prompts.match_user(query, records)?;
        self.complete(self.prompts.match_system(), &user).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_backends() {
        let backends = list_backends();
        assert!(backends.contains(&"none"));
        assert!(backends.contains(&"http"));
        assert!(backends.contains(&"openai"));
    }

    #[test]
    fn test_get_backend() {
        let client = HttpClient::new().unwrap();
        let settings = OracleSettings::default();

        assert_eq!(get_backend("none", &settings, &client).unwrap().name(), "none");
        assert_eq!(get_backend("HTTP", &settings, &client).unwrap().name(), "http");
        assert!(get_backend("unknown", &settings, &client).is_err());
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let client = HttpClient::new().unwrap();
        let settings = OracleSettings {
            endpoint: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            get_backend("http", &settings, &client),
            Err(OracleError::Unconfigured(_))
        ));
        assert!(get_backend("none", &settings, &client).is_ok());
    }

    #[test]
    fn test_chat_backend_requires_key() {
        let client = HttpClient::new().unwrap();
        let mut settings = OracleSettings::default();
        assert!(matches!(
            get_backend("openai", &settings, &client),
            Err(OracleError::Unconfigured(_))
        ));

        settings.api_key = Some("sk-test".to_string());
        assert_eq!(
            get_backend("openai", &settings, &client).unwrap().name(),
            "openai"
        );
    }

    #[test]
    fn test_parse_string_array() {
        assert_eq!(parse_string_array(r#"["a","b"]"#).unwrap(), vec!["a", "b"]);
        assert!(parse_string_array(r#"{"terms":["a"]}"#).is_err());
        assert!(parse_string_array(r#"["a", 1]"#).is_err());
    }

    #[test]
    fn test_disabled_backend() {
        let result = tokio_test::block_on(DisabledOracle.enrich_terms("photo", &[]));
        assert!(matches!(result, Err(OracleError::Disabled)));
    }
}
