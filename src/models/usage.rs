use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One calendar day of assistant activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyUsageRecord {
    pub date: NaiveDate,
    pub conversations: u64,
    pub messages: u64,
    pub unique_users: u64,
}

impl DailyUsageRecord {
    /// A zero-activity record for `date`.
    pub fn zero(date: NaiveDate) -> Self {
        Self {
            date,
            conversations: 0,
            messages: 0,
            unique_users: 0,
        }
    }

    /// Combined score used when ranking days against each other.
    pub fn activity(&self) -> u64 {
        self.conversations + self.messages
    }

    /// True when the day saw any conversations or messages.
    pub fn is_active(&self) -> bool {
        self.conversations > 0 || self.messages > 0
    }
}

/// Totals for a usage window. `total_days` is the span of the window in
/// days; it can exceed `records.len()` when the service omits zero-activity
/// days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSummary {
    pub total_conversations: u64,
    pub total_messages: u64,
    pub total_days: u32,
}

/// A contiguous span of days with per-day activity.
///
/// Totals are recomputed from the records when the window is built, so
/// `summary.total_conversations` always equals the sum over `records`, and
/// likewise for messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub records: Vec<DailyUsageRecord>,
    pub summary: WindowSummary,
}

/// Pre-aggregated usage for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyUsage {
    /// `YYYY-MM` month key.
    pub month: String,
    pub total_conversations: u64,
    pub total_messages: u64,
    pub unique_users: u64,
}

/// Fixed-size moving averages over the most recent records of a window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendAverages {
    pub last_7_days_conversations: f64,
    pub last_7_days_messages: f64,
}

/// A trailing usage window with per-day series and moving averages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageTrend {
    pub window: UsageWindow,
    /// Conversations per record, in the window's chronological order.
    pub conversation_series: Vec<u64>,
    /// Messages per record, in the window's chronological order.
    pub message_series: Vec<u64>,
    pub averages: TrendAverages,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn zero_record_has_no_activity() {
        let record = DailyUsageRecord::zero(d("2025-09-01"));
        assert_eq!(record.activity(), 0);
        assert!(!record.is_active());
    }

    #[test]
    fn activity_sums_conversations_and_messages() {
        let record = DailyUsageRecord {
            date: d("2025-09-05"),
            conversations: 20,
            messages: 80,
            unique_users: 3,
        };
        assert_eq!(record.activity(), 100);
        assert!(record.is_active());
    }

    #[test]
    fn messages_alone_make_a_day_active() {
        let record = DailyUsageRecord {
            date: d("2025-09-02"),
            conversations: 0,
            messages: 4,
            unique_users: 1,
        };
        assert!(record.is_active());
    }

    #[test]
    fn daily_record_serializes_dates_as_plain_strings() {
        let record = DailyUsageRecord {
            date: d("2025-09-01"),
            conversations: 10,
            messages: 40,
            unique_users: 2,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["date"], "2025-09-01");
        assert_eq!(json["conversations"], 10);
    }

    #[test]
    fn monthly_usage_round_trips_through_json() {
        let monthly = MonthlyUsage {
            month: "2025-09".to_string(),
            total_conversations: 150,
            total_messages: 600,
            unique_users: 12,
        };
        let json = serde_json::to_string(&monthly).unwrap();
        let back: MonthlyUsage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, monthly);
    }
}
