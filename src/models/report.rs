//! Derived analytics: the shapes the analyzer produces.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::usage::{DailyUsageRecord, MonthlyUsage, TrendAverages};

/// Inclusive span of days a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Today's activity plus the per-conversation message ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodaySummary {
    pub date: NaiveDate,
    pub conversations: u64,
    pub messages: u64,
    pub unique_users: u64,
    /// `messages / conversations` rounded to 2 decimals; 0 when there are
    /// no conversations.
    pub avg_messages_per_conversation: f64,
}

/// Month-to-date totals with averages over the days elapsed so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthSummary {
    pub month: String,
    pub total_conversations: u64,
    pub total_messages: u64,
    pub unique_users: u64,
    pub avg_messages_per_conversation: f64,
    /// Divided by the current day-of-month, not by days in the month.
    pub daily_average_conversations: f64,
    pub daily_average_messages: f64,
}

/// Direction of a month-over-month change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Growth {
    Increase,
    Decrease,
    Stable,
}

impl Growth {
    pub fn from_change(change_percent: f64) -> Self {
        if change_percent > 0.0 {
            Growth::Increase
        } else if change_percent < 0.0 {
            Growth::Decrease
        } else {
            Growth::Stable
        }
    }
}

impl fmt::Display for Growth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Growth::Increase => "increase",
            Growth::Decrease => "decrease",
            Growth::Stable => "stable",
        };
        write!(f, "{}", label)
    }
}

/// Current calendar month measured against the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub current: MonthlyUsage,
    pub previous: MonthlyUsage,
    pub conversations_change_percent: f64,
    pub messages_change_percent: f64,
    pub conversation_growth: Growth,
    pub message_growth: Growth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyTotals {
    pub conversations: u64,
    pub messages: u64,
    /// Days the week window spans, counting days the service omitted.
    pub days: u32,
}

/// Averages over active days only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeeklyAverages {
    pub daily_conversations: f64,
    pub daily_messages: f64,
}

/// Monday-through-today breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyReport {
    pub week: DateRange,
    pub totals: WeeklyTotals,
    pub averages: WeeklyAverages,
    /// The record with the highest combined activity; `None` when every
    /// record is zero.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub most_active_day: Option<DailyUsageRecord>,
    pub active_days_count: u32,
    pub daily_breakdown: Vec<DailyUsageRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentActual {
    pub conversations: u64,
    pub messages: u64,
    pub days_elapsed: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyAverage {
    pub conversations: f64,
    pub messages: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectedMonthEnd {
    pub conversations: f64,
    pub messages: f64,
    pub remaining_days: u32,
    /// Always the moving-average span, regardless of how much data backed it.
    pub projection_basis_days: u32,
}

/// Extrapolated month-end totals from recent daily averages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub current_actual: CurrentActual,
    pub recent_daily_average: DailyAverage,
    pub projected_month_end: ProjectedMonthEnd,
}

/// Mean activity for one weekday across its sample days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayPattern {
    pub weekday: String,
    pub avg_conversations: f64,
    pub avg_messages: f64,
    pub sample_days: u32,
}

/// Weekend and weekday sides of the conversation averages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeekendSplit {
    pub weekend_avg_conversations: f64,
    pub weekday_avg_conversations: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternInsights {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub most_active_weekday: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub least_active_weekday: Option<String>,
    pub weekend_vs_weekday: WeekendSplit,
}

/// Weekday activity patterns over an analysis window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternReport {
    /// Sunday-first order; weekdays without samples are omitted.
    pub weekday_patterns: Vec<WeekdayPattern>,
    pub insights: PatternInsights,
    pub analysis_period: DateRange,
}

/// A single day holding the maximum of some metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeakDay {
    pub date: NaiveDate,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_conversations: u64,
    pub total_messages: u64,
    pub total_days: u32,
    pub avg_conversations_per_day: f64,
    pub avg_messages_per_day: f64,
}

/// Per-record count series across the report window, in chronological
/// order, for charting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub conversations: Vec<u64>,
    pub messages: Vec<u64>,
}

/// The combined usage report: window totals, today, month-over-month and
/// peak days in one value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageReport {
    pub period: DateRange,
    pub summary: ReportSummary,
    pub today: TodaySummary,
    pub month_comparison: ComparisonResult,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub peak_conversations_day: Option<PeakDay>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub peak_messages_day: Option<PeakDay>,
    pub recent_averages: TrendAverages,
    pub series: TrendSeries,
}
