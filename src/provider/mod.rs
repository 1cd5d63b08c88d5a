//! Data sources for usage analytics.
//!
//! A [`UsageProvider`] hands back the raw wire shapes; the client layer is
//! responsible for validating and normalizing them. [`HttpUsageProvider`] is
//! the production implementation against the assistant backend.

pub mod http;

pub use http::HttpUsageProvider;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::auth::AuthContext;
use crate::error::UsageError;

/// One day as the backend reports it. Everything is optional: rows with no
/// date are dropped during normalization and missing counts become zero.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDailyRow {
    pub date: Option<String>,
    pub conversations: Option<u64>,
    pub messages: Option<u64>,
    pub unique_users: Option<u64>,
}

/// Totals the backend computed itself. Advisory only: the client recomputes
/// totals from the rows instead of trusting these.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSummary {
    pub total_conversations: Option<u64>,
    pub total_messages: Option<u64>,
    pub total_days: Option<u64>,
}

/// Daily-usage payload before normalization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDailyUsage {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default)]
    pub daily_usage: Vec<RawDailyRow>,
    pub summary: Option<RawSummary>,
}

/// Monthly-usage payload before normalization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMonthlyUsage {
    pub month: Option<String>,
    pub total_conversations: Option<u64>,
    pub total_messages: Option<u64>,
    pub unique_users: Option<u64>,
}

/// The backend wraps responses in `{"data": ...}` but older deployments
/// return the payload bare. `Enveloped` is listed first so the `data` field
/// wins when a payload could parse either way.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MaybeEnveloped<T> {
    Enveloped { data: T },
    Bare(T),
}

impl<T> MaybeEnveloped<T> {
    pub fn into_inner(self) -> T {
        match self {
            MaybeEnveloped::Enveloped { data } => data,
            MaybeEnveloped::Bare(inner) => inner,
        }
    }
}

/// Source of raw usage data, keyed by date range or month.
#[async_trait]
pub trait UsageProvider: Send + Sync {
    /// Fetch per-day usage for an inclusive date range.
    async fn fetch_daily(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        auth: &AuthContext,
        user: Option<&str>,
    ) -> Result<RawDailyUsage, UsageError>;

    /// Fetch aggregate usage for one `YYYY-MM` month.
    async fn fetch_monthly(
        &self,
        month: &str,
        auth: &AuthContext,
        user: Option<&str>,
    ) -> Result<RawMonthlyUsage, UsageError>;
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// What a [`FixtureProvider`] was asked for, in call order.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        Daily {
            start: NaiveDate,
            end: NaiveDate,
            user: Option<String>,
        },
        Monthly {
            month: String,
            user: Option<String>,
        },
    }

    /// Canned responses for tests. Records every call so tests can assert
    /// what was requested, or that nothing was.
    pub struct FixtureProvider {
        pub daily: RawDailyUsage,
        pub monthly: HashMap<String, RawMonthlyUsage>,
        pub calls: Mutex<Vec<Call>>,
    }

    impl FixtureProvider {
        pub fn new(daily: RawDailyUsage) -> Self {
            FixtureProvider {
                daily,
                monthly: HashMap::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn with_month(mut self, month: &str, usage: RawMonthlyUsage) -> Self {
            self.monthly.insert(month.to_string(), usage);
            self
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl UsageProvider for FixtureProvider {
        async fn fetch_daily(
            &self,
            start: NaiveDate,
            end: NaiveDate,
            _auth: &AuthContext,
            user: Option<&str>,
        ) -> Result<RawDailyUsage, UsageError> {
            self.calls.lock().unwrap().push(Call::Daily {
                start,
                end,
                user: user.map(str::to_string),
            });
            Ok(self.daily.clone())
        }

        async fn fetch_monthly(
            &self,
            month: &str,
            _auth: &AuthContext,
            user: Option<&str>,
        ) -> Result<RawMonthlyUsage, UsageError> {
            self.calls.lock().unwrap().push(Call::Monthly {
                month: month.to_string(),
                user: user.map(str::to_string),
            });
            Ok(self
                .monthly
                .get(month)
                .cloned()
                .unwrap_or_default())
        }
    }

    /// Shorthand for building fixture rows.
    pub fn row(date: &str, conversations: u64, messages: u64) -> RawDailyRow {
        RawDailyRow {
            date: Some(date.to_string()),
            conversations: Some(conversations),
            messages: Some(messages),
            unique_users: Some(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_bare_daily_payload() {
        let json = r#"{
            "start_date": "2025-09-01",
            "end_date": "2025-09-07",
            "daily_usage": [
                {"date": "2025-09-01", "conversations": 10, "messages": 40, "unique_users": 5}
            ],
            "summary": {"total_conversations": 10, "total_messages": 40, "total_days": 7}
        }"#;

        let decoded: MaybeEnveloped<RawDailyUsage> = serde_json::from_str(json).unwrap();
        let usage = decoded.into_inner();
        assert_eq!(usage.start_date.as_deref(), Some("2025-09-01"));
        assert_eq!(usage.daily_usage.len(), 1);
        assert_eq!(usage.daily_usage[0].conversations, Some(10));
    }

    #[test]
    fn decodes_enveloped_daily_payload() {
        let json = r#"{
            "data": {
                "start_date": "2025-09-01",
                "end_date": "2025-09-07",
                "daily_usage": [
                    {"date": "2025-09-01", "conversations": 10, "messages": 40}
                ]
            }
        }"#;

        let decoded: MaybeEnveloped<RawDailyUsage> = serde_json::from_str(json).unwrap();
        let usage = decoded.into_inner();
        assert_eq!(usage.daily_usage.len(), 1);
        assert_eq!(usage.daily_usage[0].unique_users, None);
    }

    #[test]
    fn envelope_wins_over_bare_interpretation() {
        // A monthly payload whose fields are all optional would also parse
        // bare; the data field must take precedence.
        let json = r#"{"data": {"month": "2025-09", "total_conversations": 150}}"#;
        let decoded: MaybeEnveloped<RawMonthlyUsage> = serde_json::from_str(json).unwrap();
        let usage = decoded.into_inner();
        assert_eq!(usage.month.as_deref(), Some("2025-09"));
        assert_eq!(usage.total_conversations, Some(150));
    }

    #[test]
    fn tolerates_null_and_missing_fields() {
        let json = r#"{
            "daily_usage": [
                {"date": null, "conversations": null},
                {"messages": 12}
            ]
        }"#;

        let usage: RawDailyUsage = serde_json::from_str(json).unwrap();
        assert_eq!(usage.daily_usage.len(), 2);
        assert_eq!(usage.daily_usage[0].date, None);
        assert_eq!(usage.daily_usage[1].messages, Some(12));
        assert!(usage.summary.is_none());
    }

    #[test]
    fn missing_daily_usage_array_defaults_to_empty() {
        let usage: RawDailyUsage = serde_json::from_str("{}").unwrap();
        assert!(usage.daily_usage.is_empty());
    }

    #[test]
    fn decodes_monthly_payload() {
        let json = r#"{
            "month": "2025-09",
            "total_conversations": 150,
            "total_messages": 600,
            "unique_users": 42
        }"#;

        let usage: RawMonthlyUsage = serde_json::from_str(json).unwrap();
        assert_eq!(usage.month.as_deref(), Some("2025-09"));
        assert_eq!(usage.total_conversations, Some(150));
        assert_eq!(usage.total_messages, Some(600));
        assert_eq!(usage.unique_users, Some(42));
    }
}
