use anyhow::{bail, Context, Result};
use serde::Serialize;

use chatmeter::auth::{resolve_token, TOKEN_ENV_VAR};
use chatmeter::client::{UsageClient, MAX_RANGE_DAYS};
use chatmeter::config::AppConfig;
use chatmeter::error::UsageError;
use chatmeter::provider::HttpUsageProvider;
use chatmeter::render;

use crate::cli::output::{OutputFormat, OutputOptions};

pub const DEFAULT_REPORT_DAYS: u32 = 30;

/// Which analytics view to fetch and print.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum View {
    Today,
    Week,
    Month,
    Trend,
    Compare,
    Projection,
    Patterns,
    Report,
}

pub async fn run(
    view: View,
    days: u32,
    user_flag: Option<String>,
    token_flag: Option<String>,
    api_url_flag: Option<String>,
    opts: &OutputOptions,
) -> Result<()> {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            if opts.verbose {
                eprintln!("Failed to load config, using defaults: {}", e);
            }
            AppConfig::default()
        }
    };

    let api_url = api_url_flag.unwrap_or_else(|| config.service.api_url.clone());

    let auth = match resolve_token(token_flag.as_deref(), config.service.token.as_deref()) {
        Some(auth) => auth,
        None => bail!(
            "No API token. Pass --token, set {}, or add service.token to {}",
            TOKEN_ENV_VAR,
            AppConfig::config_path().display()
        ),
    };

    let user = user_flag.or_else(|| config.defaults.user.clone());

    let mut provider = HttpUsageProvider::new(&api_url)
        .with_context(|| format!("Cannot use endpoint '{}'", api_url))?;
    if let Some(origin) = &config.service.origin {
        provider = provider.with_origin(origin);
    }
    if let Some(parent) = &config.service.parent_origin {
        provider = provider.with_parent_origin(parent);
    }

    if opts.verbose {
        eprintln!(
            "Querying {} for {}",
            api_url,
            user.as_deref().unwrap_or("all users")
        );
    }

    let analyzer = UsageClient::new(provider).into_analyzer(auth, user);

    match view {
        View::Today => {
            let summary = analyzer.today_summary().await?;
            emit(opts, &summary, |s| render::render_today(s, opts.use_color))
        }
        View::Week => {
            let report = analyzer.weekly_report().await?;
            emit(opts, &report, |r| render::render_weekly(r, opts.use_color))
        }
        View::Month => {
            let summary = analyzer.month_summary().await?;
            emit(opts, &summary, |s| render::render_month(s, opts.use_color))
        }
        View::Trend => {
            let trend = analyzer.usage_trend().await?;
            emit(opts, &trend, |t| render::render_trend(t, opts.use_color))
        }
        View::Compare => {
            let result = analyzer.usage_comparison().await?;
            emit(opts, &result, |r| {
                render::render_comparison(r, opts.use_color)
            })
        }
        View::Projection => {
            let projection = analyzer.usage_projection().await?;
            emit(opts, &projection, |p| {
                render::render_projection(p, opts.use_color)
            })
        }
        View::Patterns => {
            let report = analyzer.usage_patterns().await?;
            emit(opts, &report, |r| render::render_patterns(r, opts.use_color))
        }
        View::Report => {
            let report = analyzer.generate_report(days).await.map_err(report_error)?;
            match opts.format {
                OutputFormat::Json => {
                    println!("{}", opts.to_json(&report)?);
                    Ok(())
                }
                OutputFormat::Text => {
                    // The text report folds weekday insights in.
                    let patterns = analyzer.usage_patterns().await?;
                    println!(
                        "{}",
                        render::render_text_report(&report, &patterns, opts.use_color)
                    );
                    Ok(())
                }
            }
        }
    }
}

fn emit<T, F>(opts: &OutputOptions, value: &T, render: F) -> Result<()>
where
    T: Serialize,
    F: Fn(&T) -> String,
{
    match opts.format {
        OutputFormat::Json => println!("{}", opts.to_json(value)?),
        OutputFormat::Text => println!("{}", render(value)),
    }
    Ok(())
}

/// `--days` is the one report input the user types freely; point at it when
/// validation rejects the window.
fn report_error(err: UsageError) -> anyhow::Error {
    if err.is_validation() {
        anyhow::anyhow!("{} (--days can be at most {})", err, MAX_RANGE_DAYS - 1)
    } else {
        anyhow::Error::new(err)
    }
}
