//! HTTP implementation of [`UsageProvider`] against the assistant backend.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, ORIGIN};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::auth::AuthContext;
use crate::dates::DATE_FORMAT;
use crate::error::{ProviderError, UsageError};

use super::{MaybeEnveloped, RawDailyUsage, RawMonthlyUsage, UsageProvider};

const DAILY_PATH: &str = "/api/usage/daily";
const MONTHLY_PATH: &str = "/api/usage/monthly";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Error payloads carry a human-readable message when the backend has one.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Talks to the assistant usage endpoints with a bearer token.
///
/// Plain `http://` is rejected unless the host is loopback, so tokens are
/// never sent in the clear to a remote host.
#[derive(Debug)]
pub struct HttpUsageProvider {
    base_url: String,
    origin: Option<String>,
    parent_origin: Option<String>,
    http: Client,
}

impl HttpUsageProvider {
    pub fn new(base_url: &str) -> Result<Self, ProviderError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        if !base_url.starts_with("https://") && !allows_plain_http(&base_url) {
            return Err(ProviderError::Endpoint(format!(
                "'{}' must use https (plain http is allowed for localhost only)",
                base_url
            )));
        }

        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(HttpUsageProvider {
            base_url,
            origin: None,
            parent_origin: None,
            http,
        })
    }

    /// Send an `Origin` header with every request. Some deployments gate
    /// usage endpoints on the embedding site.
    pub fn with_origin(mut self, origin: &str) -> Self {
        self.origin = Some(origin.to_string());
        self
    }

    /// Send an `X-Parent-Origin` header identifying the outer page when the
    /// widget runs inside an iframe.
    pub fn with_parent_origin(mut self, parent_origin: &str) -> Self {
        self.parent_origin = Some(parent_origin.to_string());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_enveloped<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        auth: &AuthContext,
    ) -> Result<T, ProviderError> {
        let url = format!("{}{}", self.base_url, path);

        let mut request = self
            .http
            .get(&url)
            .query(query)
            .header(AUTHORIZATION, format!("Bearer {}", auth.token()))
            .header(CONTENT_TYPE, "application/json");

        if let Some(origin) = &self.origin {
            request = request.header(ORIGIN, origin.as_str());
        }
        if let Some(parent) = &self.parent_origin {
            request = request.header("X-Parent-Origin", parent.as_str());
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: api_message(&body),
            });
        }

        let decoded: MaybeEnveloped<T> = serde_json::from_str(&body)?;
        Ok(decoded.into_inner())
    }
}

#[async_trait]
impl UsageProvider for HttpUsageProvider {
    async fn fetch_daily(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        auth: &AuthContext,
        user: Option<&str>,
    ) -> Result<RawDailyUsage, UsageError> {
        let mut query = vec![
            ("start_date", start.format(DATE_FORMAT).to_string()),
            ("end_date", end.format(DATE_FORMAT).to_string()),
        ];
        if let Some(user) = user {
            query.push(("user_id", user.to_string()));
        }

        let usage = self.get_enveloped(DAILY_PATH, &query, auth).await?;
        Ok(usage)
    }

    async fn fetch_monthly(
        &self,
        month: &str,
        auth: &AuthContext,
        user: Option<&str>,
    ) -> Result<RawMonthlyUsage, UsageError> {
        let mut query = vec![("month", month.to_string())];
        if let Some(user) = user {
            query.push(("user_id", user.to_string()));
        }

        let usage = self.get_enveloped(MONTHLY_PATH, &query, auth).await?;
        Ok(usage)
    }
}

fn allows_plain_http(url: &str) -> bool {
    let Some(rest) = url.strip_prefix("http://") else {
        return false;
    };
    let authority = rest.split('/').next().unwrap_or("");
    for host in ["localhost", "127.0.0.1", "[::1]"] {
        match authority.strip_prefix(host) {
            Some("") => return true,
            Some(port) if port.starts_with(':') => return true,
            _ => {}
        }
    }
    false
}

/// Best-effort error message out of a failed response body.
fn api_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(message) = parsed.message {
            if !message.trim().is_empty() {
                return message;
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "request failed".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_https_endpoints() {
        assert!(HttpUsageProvider::new("https://assistant.example.com").is_ok());
        assert!(HttpUsageProvider::new("https://assistant.example.com/").is_ok());
    }

    #[test]
    fn accepts_loopback_http_endpoints() {
        assert!(HttpUsageProvider::new("http://localhost:8000").is_ok());
        assert!(HttpUsageProvider::new("http://localhost").is_ok());
        assert!(HttpUsageProvider::new("http://127.0.0.1:9000").is_ok());
        assert!(HttpUsageProvider::new("http://[::1]:8000").is_ok());
    }

    #[test]
    fn rejects_remote_http_endpoints() {
        let err = HttpUsageProvider::new("http://assistant.example.com").unwrap_err();
        assert!(matches!(err, ProviderError::Endpoint(_)));

        // A host that merely starts with "localhost" is still remote.
        assert!(HttpUsageProvider::new("http://localhost.example.com").is_err());
        assert!(HttpUsageProvider::new("ftp://localhost").is_err());
    }

    #[test]
    fn trims_trailing_slash_from_base_url() {
        let provider = HttpUsageProvider::new("https://assistant.example.com/").unwrap();
        assert_eq!(provider.base_url(), "https://assistant.example.com");
    }

    #[test]
    fn origin_builders_store_headers() {
        let provider = HttpUsageProvider::new("https://assistant.example.com")
            .unwrap()
            .with_origin("https://site.example.com")
            .with_parent_origin("https://parent.example.com");
        assert_eq!(provider.origin.as_deref(), Some("https://site.example.com"));
        assert_eq!(
            provider.parent_origin.as_deref(),
            Some("https://parent.example.com")
        );
    }

    #[test]
    fn api_message_prefers_structured_message() {
        assert_eq!(
            api_message(r#"{"message": "token expired"}"#),
            "token expired"
        );
    }

    #[test]
    fn api_message_falls_back_to_raw_body() {
        assert_eq!(api_message("upstream unavailable"), "upstream unavailable");
        assert_eq!(api_message(r#"{"message": ""}"#), r#"{"message": ""}"#);
    }

    #[test]
    fn api_message_handles_empty_body() {
        assert_eq!(api_message(""), "request failed");
        assert_eq!(api_message("   "), "request failed");
    }
}
