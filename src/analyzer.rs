//! Analytics derived from usage data.
//!
//! [`UsageAnalyzer`] binds a [`UsageClient`] to an auth context and optional
//! user filter, then answers the higher-level questions: how does this month
//! compare to last, which weekday is busiest, where will the month land.
//! Every method issues fresh fetches; nothing is memoized between calls. The
//! arithmetic lives in pure functions that take explicit dates, so the async
//! methods only decide what "today" is and what to fetch.

use chrono::{Datelike, Local, NaiveDate};

use crate::auth::AuthContext;
use crate::client::{UsageClient, MOVING_AVERAGE_DAYS, TREND_WINDOW_DAYS};
use crate::dates::{
    days_in_month, format_month, month_key, previous_month, round2, weekday_index, WEEKDAY_NAMES,
};
use crate::error::UsageError;
use crate::models::report::{
    ComparisonResult, CurrentActual, DailyAverage, DateRange, Growth, MonthSummary,
    PatternInsights, PatternReport, PeakDay, ProjectedMonthEnd, Projection, ReportSummary,
    TodaySummary, TrendSeries, UsageReport, WeekdayPattern, WeekendSplit, WeeklyAverages,
    WeeklyReport, WeeklyTotals,
};
use crate::models::usage::{DailyUsageRecord, MonthlyUsage, TrendAverages, UsageTrend, UsageWindow};
use crate::provider::UsageProvider;
use crate::render;

pub struct UsageAnalyzer<P> {
    client: UsageClient<P>,
    auth: AuthContext,
    user: Option<String>,
}

impl<P: UsageProvider> UsageAnalyzer<P> {
    pub fn new(client: UsageClient<P>, auth: AuthContext, user: Option<String>) -> Self {
        UsageAnalyzer { client, auth, user }
    }

    /// The user filter every query is scoped to, if any.
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Today's counts with the messages-per-conversation ratio.
    pub async fn today_summary(&self) -> Result<TodaySummary, UsageError> {
        let record = self.client.today_usage(&self.auth, self.user()).await?;
        Ok(summarize_today(record))
    }

    /// Month-to-date totals with daily averages over the days elapsed so far.
    pub async fn month_summary(&self) -> Result<MonthSummary, UsageError> {
        let usage = self.client.this_month_usage(&self.auth, self.user()).await?;
        Ok(summarize_month(usage, today().day()))
    }

    /// Current calendar month against the previous one.
    pub async fn usage_comparison(&self) -> Result<ComparisonResult, UsageError> {
        let today = today();
        let current_key = month_key(today);
        let (year, month) = previous_month(today.year(), today.month());
        let previous_key = format_month(year, month);

        let current = self
            .client
            .monthly_usage(&current_key, &self.auth, self.user())
            .await?;
        let previous = self
            .client
            .monthly_usage(&previous_key, &self.auth, self.user())
            .await?;
        Ok(compare_months(current, previous))
    }

    /// Monday through today, with the most active day and per-active-day
    /// averages.
    pub async fn weekly_report(&self) -> Result<WeeklyReport, UsageError> {
        let window = self.client.this_week_usage(&self.auth, self.user()).await?;
        Ok(analyze_week(window))
    }

    /// Month-end totals extrapolated from the trailing weekly average.
    pub async fn usage_projection(&self) -> Result<Projection, UsageError> {
        let month = self.client.this_month_usage(&self.auth, self.user()).await?;
        let trend = self.client.usage_trend(&self.auth, self.user()).await?;
        Ok(project_month_end(month, trend.averages, today()))
    }

    /// Weekday activity patterns over the trailing trend window.
    pub async fn usage_patterns(&self) -> Result<PatternReport, UsageError> {
        let trend = self.client.usage_trend(&self.auth, self.user()).await?;
        Ok(detect_patterns(trend.window))
    }

    /// The raw trailing-30-day trend the report and patterns build on.
    pub async fn usage_trend(&self) -> Result<UsageTrend, UsageError> {
        self.client.usage_trend(&self.auth, self.user()).await
    }

    /// The combined report: trailing-`window_days` trend, today, month
    /// comparison and peak days.
    pub async fn generate_report(&self, window_days: u32) -> Result<UsageReport, UsageError> {
        let trend = self
            .client
            .usage_trend_for(window_days, &self.auth, self.user())
            .await?;
        let comparison = self.usage_comparison().await?;
        let today = self.today_summary().await?;
        Ok(assemble_report(trend, today, comparison))
    }

    /// Plain-text rendition of the default report. No ANSI color; the CLI
    /// re-renders the same data when color is wanted.
    pub async fn text_report(&self) -> Result<String, UsageError> {
        let report = self.generate_report(TREND_WINDOW_DAYS).await?;
        let patterns = self.usage_patterns().await?;
        Ok(render::render_text_report(&report, &patterns, false))
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn summarize_today(record: DailyUsageRecord) -> TodaySummary {
    let avg_messages_per_conversation = if record.conversations > 0 {
        round2(record.messages as f64 / record.conversations as f64)
    } else {
        0.0
    };
    TodaySummary {
        date: record.date,
        conversations: record.conversations,
        messages: record.messages,
        unique_users: record.unique_users,
        avg_messages_per_conversation,
    }
}

/// Daily averages divide by the day-of-month number, not by days in the
/// month. `day_of_month` is clamped to at least 1.
fn summarize_month(usage: MonthlyUsage, day_of_month: u32) -> MonthSummary {
    let elapsed = day_of_month.max(1);
    let avg_messages_per_conversation = if usage.total_conversations > 0 {
        round2(usage.total_messages as f64 / usage.total_conversations as f64)
    } else {
        0.0
    };
    MonthSummary {
        month: usage.month,
        total_conversations: usage.total_conversations,
        total_messages: usage.total_messages,
        unique_users: usage.unique_users,
        avg_messages_per_conversation,
        daily_average_conversations: round2(usage.total_conversations as f64 / elapsed as f64),
        daily_average_messages: round2(usage.total_messages as f64 / elapsed as f64),
    }
}

/// Percent change from `previous` to `current`. A zero previous value never
/// divides: the change is 100 when anything appeared, 0 when nothing did.
fn change_percent(current: u64, previous: u64) -> f64 {
    if previous == 0 {
        if current > 0 {
            100.0
        } else {
            0.0
        }
    } else {
        round2((current as f64 - previous as f64) / previous as f64 * 100.0)
    }
}

fn compare_months(current: MonthlyUsage, previous: MonthlyUsage) -> ComparisonResult {
    let conversations_change_percent =
        change_percent(current.total_conversations, previous.total_conversations);
    let messages_change_percent =
        change_percent(current.total_messages, previous.total_messages);
    ComparisonResult {
        conversation_growth: Growth::from_change(conversations_change_percent),
        message_growth: Growth::from_change(messages_change_percent),
        current,
        previous,
        conversations_change_percent,
        messages_change_percent,
    }
}

fn analyze_week(window: UsageWindow) -> WeeklyReport {
    let UsageWindow {
        start,
        end,
        records,
        summary,
    } = window;

    let active_days_count = records.iter().filter(|r| r.is_active()).count() as u32;

    // Strict comparison from zero: ties keep the earliest day and an
    // all-zero week has no most active day.
    let mut most_active_day: Option<&DailyUsageRecord> = None;
    let mut max_activity = 0;
    for record in &records {
        if record.activity() > max_activity {
            max_activity = record.activity();
            most_active_day = Some(record);
        }
    }
    let most_active_day = most_active_day.cloned();

    let averages = if active_days_count > 0 {
        WeeklyAverages {
            daily_conversations: round2(
                summary.total_conversations as f64 / active_days_count as f64,
            ),
            daily_messages: round2(summary.total_messages as f64 / active_days_count as f64),
        }
    } else {
        WeeklyAverages {
            daily_conversations: 0.0,
            daily_messages: 0.0,
        }
    };

    WeeklyReport {
        week: DateRange { start, end },
        totals: WeeklyTotals {
            conversations: summary.total_conversations,
            messages: summary.total_messages,
            // The window span, counting days the service omitted.
            days: summary.total_days,
        },
        averages,
        most_active_day,
        active_days_count,
        daily_breakdown: records,
    }
}

fn project_month_end(
    month: MonthlyUsage,
    averages: TrendAverages,
    today: NaiveDate,
) -> Projection {
    let days_elapsed = today.day();
    let remaining_days = days_in_month(today) - today.day();

    let projected_month_end = ProjectedMonthEnd {
        conversations: round2(
            month.total_conversations as f64
                + averages.last_7_days_conversations * remaining_days as f64,
        ),
        messages: round2(
            month.total_messages as f64 + averages.last_7_days_messages * remaining_days as f64,
        ),
        remaining_days,
        projection_basis_days: MOVING_AVERAGE_DAYS as u32,
    };

    Projection {
        current_actual: CurrentActual {
            conversations: month.total_conversations,
            messages: month.total_messages,
            days_elapsed,
        },
        recent_daily_average: DailyAverage {
            conversations: averages.last_7_days_conversations,
            messages: averages.last_7_days_messages,
        },
        projected_month_end,
    }
}

fn detect_patterns(window: UsageWindow) -> PatternReport {
    let mut conversation_sums = [0u64; 7];
    let mut message_sums = [0u64; 7];
    let mut samples = [0u32; 7];
    for record in &window.records {
        let idx = weekday_index(record.date);
        conversation_sums[idx] += record.conversations;
        message_sums[idx] += record.messages;
        samples[idx] += 1;
    }

    // Sunday-first order; weekdays with no samples are left out.
    let weekday_patterns: Vec<WeekdayPattern> = (0..7)
        .filter(|&idx| samples[idx] > 0)
        .map(|idx| WeekdayPattern {
            weekday: WEEKDAY_NAMES[idx].to_string(),
            avg_conversations: round2(conversation_sums[idx] as f64 / samples[idx] as f64),
            avg_messages: round2(message_sums[idx] as f64 / samples[idx] as f64),
            sample_days: samples[idx],
        })
        .collect();

    // Strict comparisons so ties resolve to the lowest weekday index.
    let mut most_active: Option<&WeekdayPattern> = None;
    let mut least_active: Option<&WeekdayPattern> = None;
    for pattern in &weekday_patterns {
        let score = pattern.avg_conversations + pattern.avg_messages;
        if most_active.map_or(true, |m| score > m.avg_conversations + m.avg_messages) {
            most_active = Some(pattern);
        }
        if least_active.map_or(true, |l| score < l.avg_conversations + l.avg_messages) {
            least_active = Some(pattern);
        }
    }

    let conversation_avg = |idx: usize| -> f64 {
        if samples[idx] > 0 {
            conversation_sums[idx] as f64 / samples[idx] as f64
        } else {
            0.0
        }
    };
    let weekend_vs_weekday = WeekendSplit {
        weekend_avg_conversations: round2((conversation_avg(0) + conversation_avg(6)) / 2.0),
        weekday_avg_conversations: round2((1..=5).map(conversation_avg).sum::<f64>() / 5.0),
    };

    let insights = PatternInsights {
        most_active_weekday: most_active.map(|p| p.weekday.clone()),
        least_active_weekday: least_active.map(|p| p.weekday.clone()),
        weekend_vs_weekday,
    };

    PatternReport {
        weekday_patterns,
        insights,
        analysis_period: DateRange {
            start: window.start,
            end: window.end,
        },
    }
}

/// First occurrence of the maximum; `None` only for an empty slice.
fn peak_day<F>(records: &[DailyUsageRecord], metric: F) -> Option<PeakDay>
where
    F: Fn(&DailyUsageRecord) -> u64,
{
    let mut best: Option<PeakDay> = None;
    for record in records {
        let count = metric(record);
        if best.as_ref().map_or(true, |b| count > b.count) {
            best = Some(PeakDay {
                date: record.date,
                count,
            });
        }
    }
    best
}

fn assemble_report(
    trend: UsageTrend,
    today: TodaySummary,
    comparison: ComparisonResult,
) -> UsageReport {
    let UsageTrend {
        window,
        conversation_series,
        message_series,
        averages,
    } = trend;

    let summary = ReportSummary {
        total_conversations: window.summary.total_conversations,
        total_messages: window.summary.total_messages,
        total_days: window.summary.total_days,
        avg_conversations_per_day: per_day(
            window.summary.total_conversations,
            window.summary.total_days,
        ),
        avg_messages_per_day: per_day(window.summary.total_messages, window.summary.total_days),
    };

    UsageReport {
        period: DateRange {
            start: window.start,
            end: window.end,
        },
        summary,
        today,
        month_comparison: comparison,
        peak_conversations_day: peak_day(&window.records, |r| r.conversations),
        peak_messages_day: peak_day(&window.records, |r| r.messages),
        recent_averages: averages,
        series: TrendSeries {
            conversations: conversation_series,
            messages: message_series,
        },
    }
}

fn per_day(total: u64, days: u32) -> f64 {
    if days > 0 {
        round2(total as f64 / days as f64)
    } else {
        0.0
    }
}
