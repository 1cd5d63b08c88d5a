//! Validated, normalized access to usage data.
//!
//! [`UsageClient`] owns a [`UsageProvider`], checks every request before it
//! goes out, and turns raw payloads into the normalized model types. All
//! input validation happens here, eagerly: a bad date or an oversized range
//! never reaches the provider.

use chrono::{Duration, Local, NaiveDate};

use crate::analyzer::UsageAnalyzer;
use crate::auth::AuthContext;
use crate::dates::{format_month, monday_of_week, month_key, parse_date, parse_month, round2};
use crate::error::{UsageError, ValidationError};
use crate::models::usage::{
    DailyUsageRecord, MonthlyUsage, TrendAverages, UsageTrend, UsageWindow, WindowSummary,
};
use crate::provider::{RawDailyRow, RawDailyUsage, RawMonthlyUsage, UsageProvider};

/// Longest inclusive date span a single query may cover.
pub const MAX_RANGE_DAYS: i64 = 90;

/// Days of history behind the default trend and report views.
pub const TREND_WINDOW_DAYS: u32 = 30;

/// Span of the trailing moving average.
pub const MOVING_AVERAGE_DAYS: usize = 7;

pub struct UsageClient<P> {
    provider: P,
}

impl<P: UsageProvider> UsageClient<P> {
    pub fn new(provider: P) -> Self {
        UsageClient { provider }
    }

    /// Attach credentials and an optional user filter, producing the
    /// high-level analyzer.
    pub fn into_analyzer(self, auth: AuthContext, user: Option<String>) -> UsageAnalyzer<P> {
        UsageAnalyzer::new(self, auth, user)
    }

    /// Daily usage between two `YYYY-MM-DD` dates, inclusive.
    pub async fn daily_usage(
        &self,
        start: &str,
        end: &str,
        auth: &AuthContext,
        user: Option<&str>,
    ) -> Result<UsageWindow, UsageError> {
        let start = parse_date(start)?;
        let end = parse_date(end)?;
        self.window(start, end, auth, user).await
    }

    /// Daily usage for an already-parsed range.
    pub async fn window(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        auth: &AuthContext,
        user: Option<&str>,
    ) -> Result<UsageWindow, UsageError> {
        validate_range(start, end)?;
        let raw = self.provider.fetch_daily(start, end, auth, user).await?;
        Ok(build_window(start, end, raw))
    }

    /// Aggregate usage for one `YYYY-MM` month.
    pub async fn monthly_usage(
        &self,
        month: &str,
        auth: &AuthContext,
        user: Option<&str>,
    ) -> Result<MonthlyUsage, UsageError> {
        let (year, month_number) = parse_month(month)?;
        let key = format_month(year, month_number);
        let raw = self.provider.fetch_monthly(&key, auth, user).await?;
        Ok(normalize_monthly(raw, key))
    }

    /// Today's record; zeros when the service has nothing for today yet.
    pub async fn today_usage(
        &self,
        auth: &AuthContext,
        user: Option<&str>,
    ) -> Result<DailyUsageRecord, UsageError> {
        let today = today();
        let window = self.window(today, today, auth, user).await?;
        Ok(window
            .records
            .into_iter()
            .next()
            .unwrap_or_else(|| DailyUsageRecord::zero(today)))
    }

    /// Monday of the current week through today.
    pub async fn this_week_usage(
        &self,
        auth: &AuthContext,
        user: Option<&str>,
    ) -> Result<UsageWindow, UsageError> {
        let today = today();
        self.window(monday_of_week(today), today, auth, user).await
    }

    /// The current calendar month.
    pub async fn this_month_usage(
        &self,
        auth: &AuthContext,
        user: Option<&str>,
    ) -> Result<MonthlyUsage, UsageError> {
        self.monthly_usage(&month_key(today()), auth, user).await
    }

    /// Trend over the default window.
    pub async fn usage_trend(
        &self,
        auth: &AuthContext,
        user: Option<&str>,
    ) -> Result<UsageTrend, UsageError> {
        self.usage_trend_for(TREND_WINDOW_DAYS, auth, user).await
    }

    /// Trend over the `days` leading up to today. Subject to the same range
    /// cap as any other query.
    pub async fn usage_trend_for(
        &self,
        days: u32,
        auth: &AuthContext,
        user: Option<&str>,
    ) -> Result<UsageTrend, UsageError> {
        let end = today();
        let start = end - Duration::days(days as i64);
        let window = self.window(start, end, auth, user).await?;
        Ok(build_trend(window))
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn validate_range(start: NaiveDate, end: NaiveDate) -> Result<(), ValidationError> {
    if start > end {
        return Err(ValidationError::StartAfterEnd { start, end });
    }
    let days = (end - start).num_days() + 1;
    if days > MAX_RANGE_DAYS {
        return Err(ValidationError::RangeTooLarge {
            days,
            max: MAX_RANGE_DAYS,
        });
    }
    Ok(())
}

/// Normalize raw rows into a sorted window. Rows without a parseable date
/// are dropped and the summary is recomputed from what remains.
fn build_window(start: NaiveDate, end: NaiveDate, raw: RawDailyUsage) -> UsageWindow {
    let mut records: Vec<DailyUsageRecord> = raw
        .daily_usage
        .into_iter()
        .filter_map(normalize_row)
        .collect();
    records.sort_by_key(|record| record.date);

    let summary = WindowSummary {
        total_conversations: records.iter().map(|r| r.conversations).sum(),
        total_messages: records.iter().map(|r| r.messages).sum(),
        total_days: ((end - start).num_days() + 1) as u32,
    };

    UsageWindow {
        start,
        end,
        records,
        summary,
    }
}

fn normalize_row(row: RawDailyRow) -> Option<DailyUsageRecord> {
    let date = parse_date(row.date.as_deref()?).ok()?;
    Some(DailyUsageRecord {
        date,
        conversations: row.conversations.unwrap_or(0),
        messages: row.messages.unwrap_or(0),
        unique_users: row.unique_users.unwrap_or(0),
    })
}

fn normalize_monthly(raw: RawMonthlyUsage, requested: String) -> MonthlyUsage {
    MonthlyUsage {
        month: raw.month.unwrap_or(requested),
        total_conversations: raw.total_conversations.unwrap_or(0),
        total_messages: raw.total_messages.unwrap_or(0),
        unique_users: raw.unique_users.unwrap_or(0),
    }
}

fn build_trend(window: UsageWindow) -> UsageTrend {
    let conversation_series: Vec<u64> = window.records.iter().map(|r| r.conversations).collect();
    let message_series: Vec<u64> = window.records.iter().map(|r| r.messages).collect();
    let averages = TrendAverages {
        last_7_days_conversations: moving_average(&conversation_series),
        last_7_days_messages: moving_average(&message_series),
    };
    UsageTrend {
        window,
        conversation_series,
        message_series,
        averages,
    }
}

/// Trailing average over the last [`MOVING_AVERAGE_DAYS`] entries, divided
/// by the full span even when fewer entries exist.
fn moving_average(series: &[u64]) -> f64 {
    let tail = &series[series.len().saturating_sub(MOVING_AVERAGE_DAYS)..];
    let sum: u64 = tail.iter().sum();
    round2(sum as f64 / MOVING_AVERAGE_DAYS as f64)
}
