use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use url::Url;

use crate::client_logger::ClientLogger;
use crate::error::{Error, Result};
use crate::observability::{CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS};
use crate::types::{ChatRequest, ChatResponse, HistoryRecord, Locale};

/// Where the backend listens when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/";
/// Environment variable consulted for the backend URL.
pub const API_URL_ENV: &str = "RAGCHAT_API_URL";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for the question-answering backend.
///
/// One instance is built per session and shared by the controller; it holds
/// the base URL that the rest of the crate never sees.
#[derive(Clone)]
pub struct RagClient {
    client: ReqwestClient,
    base_url: Url,
    timeout: Duration,
    history_limit: Option<u32>,
    logger: Option<Arc<dyn ClientLogger>>,
}

impl fmt::Debug for RagClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RagClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("history_limit", &self.history_limit)
            .finish_non_exhaustive()
    }
}

impl RagClient {
    /// Create a new client.
    ///
    /// The base URL can be provided directly or read from the
    /// RAGCHAT_API_URL environment variable; otherwise the backend's default
    /// local address is used.
    pub fn new(base_url: Option<String>) -> Result<Self> {
        Self::with_options(base_url, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(base_url: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        let base_url = base_url
            .or_else(|| env::var(API_URL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let base_url = parse_base_url(&base_url)?;

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            client,
            base_url,
            timeout,
            history_limit: None,
            logger: None,
        })
    }

    /// Ask the backend for at most `limit` history records.
    pub fn with_history_limit(mut self, limit: Option<u32>) -> Self {
        self.history_limit = limit;
        self
    }

    /// Install a logger that sees every successful exchange.
    pub fn with_logger(mut self, logger: Arc<dyn ClientLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// The base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The transport timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    fn history_url(&self) -> Result<Url> {
        let mut url = self.base_url.join("history")?;
        if let Some(limit) = self.history_limit {
            url.query_pairs_mut()
                .append_pair("limit", &limit.to_string());
        }
        Ok(url)
    }

    fn map_request_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::timeout(
                format!("Request timed out: {}", e),
                Some(self.timeout.as_secs_f64()),
            )
        } else if e.is_connect() {
            Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
        } else {
            Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
        }
    }

    /// Process a non-2xx response into an API error.
    ///
    /// The backend reports failures as `{"detail": ...}`; anything else is
    /// kept verbatim.
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();
        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {}", e),
                    Some(Box::new(e)),
                );
            }
        };
        Error::api(status_code, extract_detail(&error_body))
    }

    async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T> {
        CLIENT_REQUESTS.click();
        let start = Instant::now();
        let result = self.execute_inner(request).await;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
        if result.is_err() {
            CLIENT_REQUEST_ERRORS.click();
        }
        result
    }

    async fn execute_inner<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T> {
        let response = request
            .headers(self.default_headers())
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        let body = response.bytes().await.map_err(|e| self.map_request_error(e))?;
        serde_json::from_slice::<T>(&body).map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }

    /// Fetch the history list, preserving server order.
    pub async fn fetch_history(&self) -> Result<Vec<HistoryRecord>> {
        let url = self.history_url()?;
        tracing::debug!(%url, "fetching history");
        let records: Vec<HistoryRecord> = self.execute(self.client.get(url)).await?;
        if let Some(logger) = &self.logger {
            logger.log_history(&records);
        }
        Ok(records)
    }

    /// Submit one question and return the complete answer.
    pub async fn send_chat(&self, message: &str, locale: Locale) -> Result<ChatResponse> {
        let url = self.base_url.join("chat")?;
        let request = ChatRequest::new(message, locale);
        tracing::debug!(%url, %locale, "sending chat");
        let response: ChatResponse = self.execute(self.client.post(url).json(&request)).await?;
        if let Some(logger) = &self.logger {
            logger.log_chat(&request, &response);
        }
        Ok(response)
    }
}

/// Parse a base URL, forcing a trailing slash so relative joins append.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&with_slash)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::url(
            format!("unsupported scheme {other:?} in base URL {trimmed:?}"),
            None,
        )),
    }
}

fn extract_detail(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) => match map.get("detail") {
            Some(serde_json::Value::String(detail)) => detail.clone(),
            Some(other) => other.to_string(),
            None => body.to_string(),
        },
        _ => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = RagClient::new(Some("http://example.com:8000".to_string())).unwrap();
        assert_eq!(client.base_url().as_str(), "http://example.com:8000/");
        assert_eq!(client.timeout(), DEFAULT_TIMEOUT);

        let client = RagClient::with_options(
            Some("https://qa.example.com/api/".to_string()),
            Some(Duration::from_secs(5)),
        )
        .unwrap();
        assert_eq!(client.base_url().as_str(), "https://qa.example.com/api/");
        assert_eq!(client.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn base_url_keeps_path_prefix() {
        let url = parse_base_url("http://host/api").unwrap();
        assert_eq!(url.join("chat").unwrap().as_str(), "http://host/api/chat");
        assert_eq!(
            url.join("history").unwrap().as_str(),
            "http://host/api/history"
        );
    }

    #[test]
    fn base_url_rejects_garbage() {
        assert!(parse_base_url("not a url").is_err());
        assert!(parse_base_url("ftp://host/").is_err());
    }

    #[test]
    fn history_url_with_and_without_limit() {
        let client = RagClient::new(Some("http://host:8000".to_string())).unwrap();
        assert_eq!(
            client.history_url().unwrap().as_str(),
            "http://host:8000/history"
        );
        let client = client.with_history_limit(Some(20));
        assert_eq!(
            client.history_url().unwrap().as_str(),
            "http://host:8000/history?limit=20"
        );
    }

    #[test]
    fn detail_extraction() {
        assert_eq!(extract_detail(r#"{"detail": "boom"}"#), "boom");
        assert_eq!(
            extract_detail(r#"{"detail": [{"msg": "field required"}]}"#),
            r#"[{"msg":"field required"}]"#
        );
        assert_eq!(extract_detail("Internal Server Error"), "Internal Server Error");
        assert_eq!(extract_detail(r#"{"error": "x"}"#), r#"{"error": "x"}"#);
    }
}
