//! Plain-text and colored rendering of analyzer output.
//!
//! Every renderer takes the finished data and a `use_color` flag; nothing in
//! here computes analytics. With color off the output carries no ANSI codes
//! at all.

use colored::{control, ColoredString, Colorize};

use crate::models::report::{
    ComparisonResult, Growth, MonthSummary, PatternReport, Projection, TodaySummary, UsageReport,
    WeeklyReport,
};
use crate::models::usage::UsageTrend;

const BAR_WIDTH: usize = 20;
const RECENT_DAYS: usize = 10;

pub fn render_today(summary: &TodaySummary, use_color: bool) -> String {
    control::set_override(use_color);

    let mut lines: Vec<String> = Vec::new();
    lines.push(format!(" Today ({})", summary.date).bold().to_string());
    push_stat(&mut lines, "Conversations", format!("{}", summary.conversations));
    push_stat(&mut lines, "Messages", format!("{}", summary.messages));
    push_stat(&mut lines, "Unique Users", format!("{}", summary.unique_users));
    push_stat(
        &mut lines,
        "Msg/Conv",
        format!("{}", summary.avg_messages_per_conversation),
    );
    lines.join("\n")
}

pub fn render_month(summary: &MonthSummary, use_color: bool) -> String {
    control::set_override(use_color);

    let mut lines: Vec<String> = Vec::new();
    lines.push(format!(" Month {}", summary.month).bold().to_string());
    push_stat(
        &mut lines,
        "Conversations",
        format!("{}", summary.total_conversations),
    );
    push_stat(&mut lines, "Messages", format!("{}", summary.total_messages));
    push_stat(&mut lines, "Unique Users", format!("{}", summary.unique_users));
    push_stat(
        &mut lines,
        "Msg/Conv",
        format!("{}", summary.avg_messages_per_conversation),
    );
    push_stat(
        &mut lines,
        "Daily Avg",
        format!(
            "{} conv, {} msg",
            summary.daily_average_conversations, summary.daily_average_messages
        ),
    );
    lines.join("\n")
}

pub fn render_comparison(result: &ComparisonResult, use_color: bool) -> String {
    control::set_override(use_color);

    let mut lines: Vec<String> = Vec::new();
    lines.push(
        format!(" {} vs {}", result.current.month, result.previous.month)
            .bold()
            .to_string(),
    );
    push_stat(
        &mut lines,
        "Conversations",
        format!(
            "{} (prev {})",
            result.current.total_conversations, result.previous.total_conversations
        ),
    );
    push_change(
        &mut lines,
        result.conversations_change_percent,
        result.conversation_growth,
    );
    push_stat(
        &mut lines,
        "Messages",
        format!(
            "{} (prev {})",
            result.current.total_messages, result.previous.total_messages
        ),
    );
    push_change(
        &mut lines,
        result.messages_change_percent,
        result.message_growth,
    );
    lines.join("\n")
}

pub fn render_weekly(report: &WeeklyReport, use_color: bool) -> String {
    control::set_override(use_color);

    let mut lines: Vec<String> = Vec::new();
    lines.push(
        format!(" Week {} to {}", report.week.start, report.week.end)
            .bold()
            .to_string(),
    );

    let max_activity = report
        .daily_breakdown
        .iter()
        .map(|r| r.activity())
        .max()
        .unwrap_or(0);
    for record in &report.daily_breakdown {
        let bar = activity_bar(record.activity(), max_activity, BAR_WIDTH);
        lines.push(format!(
            "    {} {:>5} conv {:>6} msg  {}",
            record.date.format("%a %b %d"),
            record.conversations,
            record.messages,
            bar.magenta()
        ));
    }

    lines.push(String::new());
    push_stat(
        &mut lines,
        "Totals",
        format!(
            "{} conv, {} msg",
            report.totals.conversations, report.totals.messages
        ),
    );
    push_stat(
        &mut lines,
        "Active Days",
        format!("{} of {}", report.active_days_count, report.totals.days),
    );
    push_stat(
        &mut lines,
        "Daily Avg",
        format!(
            "{} conv, {} msg",
            report.averages.daily_conversations, report.averages.daily_messages
        ),
    );
    if let Some(most) = &report.most_active_day {
        push_stat(
            &mut lines,
            "Most Active",
            format!("{} ({} activity)", most.date.format("%a %b %d"), most.activity()),
        );
    }
    lines.join("\n")
}

pub fn render_projection(projection: &Projection, use_color: bool) -> String {
    control::set_override(use_color);

    let actual = &projection.current_actual;
    let average = &projection.recent_daily_average;
    let projected = &projection.projected_month_end;

    let mut lines: Vec<String> = Vec::new();
    lines.push(" Month-End Projection".bold().to_string());
    push_stat(
        &mut lines,
        "So Far",
        format!(
            "{} conv, {} msg ({} days)",
            actual.conversations, actual.messages, actual.days_elapsed
        ),
    );
    push_stat(
        &mut lines,
        "Daily Avg",
        format!(
            "{} conv, {} msg (last {} days)",
            average.conversations, average.messages, projected.projection_basis_days
        ),
    );
    push_stat(
        &mut lines,
        "Remaining",
        format!("{} days", projected.remaining_days),
    );
    push_stat(
        &mut lines,
        "Projected",
        format!("{} conv, {} msg", projected.conversations, projected.messages),
    );
    lines.join("\n")
}

pub fn render_patterns(report: &PatternReport, use_color: bool) -> String {
    control::set_override(use_color);

    let mut lines: Vec<String> = Vec::new();
    lines.push(
        format!(
            " Weekday Patterns ({} to {})",
            report.analysis_period.start, report.analysis_period.end
        )
        .bold()
        .to_string(),
    );

    for pattern in &report.weekday_patterns {
        lines.push(format!(
            "    {:<10} {:>7} conv {:>8} msg  ({} days)",
            pattern.weekday, pattern.avg_conversations, pattern.avg_messages, pattern.sample_days
        ));
    }

    let insights = &report.insights;
    if insights.most_active_weekday.is_some() || insights.least_active_weekday.is_some() {
        lines.push(String::new());
    }
    if let Some(most) = &insights.most_active_weekday {
        push_stat(&mut lines, "Most Active", most.clone());
    }
    if let Some(least) = &insights.least_active_weekday {
        push_stat(&mut lines, "Least Active", least.clone());
    }
    push_stat(
        &mut lines,
        "Weekend Avg",
        format!("{} conv/day", insights.weekend_vs_weekday.weekend_avg_conversations),
    );
    push_stat(
        &mut lines,
        "Weekday Avg",
        format!("{} conv/day", insights.weekend_vs_weekday.weekday_avg_conversations),
    );
    lines.join("\n")
}

pub fn render_trend(trend: &UsageTrend, use_color: bool) -> String {
    control::set_override(use_color);

    let window = &trend.window;
    let mut lines: Vec<String> = Vec::new();
    lines.push(
        format!(
            " Trend {} to {} ({} days)",
            window.start, window.end, window.summary.total_days
        )
        .bold()
        .to_string(),
    );
    push_stat(
        &mut lines,
        "Days Recorded",
        format!("{}", window.records.len()),
    );
    push_stat(
        &mut lines,
        "Conversations",
        format!("{}", window.summary.total_conversations),
    );
    push_stat(
        &mut lines,
        "Messages",
        format!("{}", window.summary.total_messages),
    );
    push_stat(
        &mut lines,
        "7-Day Avg",
        format!(
            "{} conv/day, {} msg/day",
            trend.averages.last_7_days_conversations, trend.averages.last_7_days_messages
        ),
    );

    let recent = &window.records[window.records.len().saturating_sub(RECENT_DAYS)..];
    if !recent.is_empty() {
        lines.push(String::new());
        lines.push(format!("  {}:", "Recent Days".cyan()));
        for record in recent {
            lines.push(format!(
                "    {:<8} {:>5} conv {:>6} msg",
                record.date.format("%b %d"),
                record.conversations,
                record.messages
            ));
        }
    }
    lines.join("\n")
}

/// The full report as one multi-line block: header, window stats, today,
/// month-over-month, weekday insights when present and peak days.
pub fn render_text_report(
    report: &UsageReport,
    patterns: &PatternReport,
    use_color: bool,
) -> String {
    control::set_override(use_color);

    let mut lines: Vec<String> = Vec::new();
    lines.push(" Usage Report".bold().to_string());
    push_stat(
        &mut lines,
        "Period",
        format!(
            "{} to {} ({} days)",
            report.period.start, report.period.end, report.summary.total_days
        ),
    );
    push_stat(
        &mut lines,
        "Conversations",
        format!("{}", report.summary.total_conversations),
    );
    push_stat(
        &mut lines,
        "Messages",
        format!("{}", report.summary.total_messages),
    );
    push_stat(
        &mut lines,
        "Avg/Day",
        format!(
            "{} conv, {} msg",
            report.summary.avg_conversations_per_day, report.summary.avg_messages_per_day
        ),
    );

    lines.push(String::new());
    lines.push(" Today".bold().to_string());
    push_stat(
        &mut lines,
        "Conversations",
        format!("{}", report.today.conversations),
    );
    push_stat(&mut lines, "Messages", format!("{}", report.today.messages));
    push_stat(
        &mut lines,
        "Msg/Conv",
        format!("{}", report.today.avg_messages_per_conversation),
    );

    let comparison = &report.month_comparison;
    lines.push(String::new());
    lines.push(
        format!(
            " {} vs {}",
            comparison.current.month, comparison.previous.month
        )
        .bold()
        .to_string(),
    );
    push_stat(
        &mut lines,
        "Conversations",
        format_change(
            comparison.conversations_change_percent,
            comparison.conversation_growth,
        ),
    );
    push_stat(
        &mut lines,
        "Messages",
        format_change(comparison.messages_change_percent, comparison.message_growth),
    );

    if let Some(most) = &patterns.insights.most_active_weekday {
        lines.push(String::new());
        lines.push(" Patterns".bold().to_string());
        push_stat(&mut lines, "Most Active", most.clone());
        if let Some(least) = &patterns.insights.least_active_weekday {
            push_stat(&mut lines, "Least Active", least.clone());
        }
        push_stat(
            &mut lines,
            "Weekend/Weekday",
            format!(
                "{} vs {} conv/day",
                patterns.insights.weekend_vs_weekday.weekend_avg_conversations,
                patterns.insights.weekend_vs_weekday.weekday_avg_conversations
            ),
        );
    }

    if report.peak_conversations_day.is_some() || report.peak_messages_day.is_some() {
        lines.push(String::new());
        lines.push(" Peaks".bold().to_string());
        if let Some(peak) = &report.peak_conversations_day {
            push_stat(
                &mut lines,
                "Conversations",
                format!("{} ({})", peak.date, peak.count),
            );
        }
        if let Some(peak) = &report.peak_messages_day {
            push_stat(
                &mut lines,
                "Messages",
                format!("{} ({})", peak.date, peak.count),
            );
        }
    }

    lines.push(String::new());
    lines.push(" Recent Averages".bold().to_string());
    push_stat(
        &mut lines,
        "Conversations",
        format!("{}/day (7-day)", report.recent_averages.last_7_days_conversations),
    );
    push_stat(
        &mut lines,
        "Messages",
        format!("{}/day (7-day)", report.recent_averages.last_7_days_messages),
    );

    lines.join("\n")
}

// Pad the label before coloring so ANSI codes never break alignment.
fn push_stat(lines: &mut Vec<String>, label: &str, value: String) {
    let padded = format!("{:<16}", label);
    lines.push(format!("  {} {}", padded.cyan(), value));
}

fn push_change(lines: &mut Vec<String>, percent: f64, growth: Growth) {
    push_stat(lines, "Change", format_change(percent, growth));
}

fn format_change(percent: f64, growth: Growth) -> String {
    let arrow = growth_arrow(growth);
    let text = format!("{} {}% ({})", arrow, percent.abs(), growth);
    color_growth(growth, &text).to_string()
}

fn growth_arrow(growth: Growth) -> &'static str {
    match growth {
        Growth::Increase => "↑",
        Growth::Decrease => "↓",
        Growth::Stable => "→",
    }
}

fn color_growth(growth: Growth, text: &str) -> ColoredString {
    match growth {
        Growth::Increase => text.green(),
        Growth::Decrease => text.red(),
        Growth::Stable => text.dimmed(),
    }
}

/// Proportional block bar; all spaces when the scale maximum is zero.
fn activity_bar(value: u64, max: u64, width: usize) -> String {
    if max == 0 {
        return " ".repeat(width);
    }
    let filled = ((value as f64 / max as f64) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}
