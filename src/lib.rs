//! Usage analytics for an embedded assistant chat service.
//!
//! `chatmeter` talks to the service's usage endpoints and turns raw daily
//! and monthly counts into analytics: weekly breakdowns, month-over-month
//! comparisons, month-end projections and weekday activity patterns.
//!
//! ```rust,no_run
//! use chatmeter::{AuthContext, HttpUsageProvider, UsageClient};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = HttpUsageProvider::new("https://assistant.example.com")?;
//! let analyzer = UsageClient::new(provider)
//!     .into_analyzer(AuthContext::new("api-token"), None);
//!
//! let report = analyzer.generate_report(30).await?;
//! println!("{} conversations", report.summary.total_conversations);
//! # Ok(())
//! # }
//! ```
//!
//! Data sources are abstracted behind [`provider::UsageProvider`], so the
//! analytics can run against anything that yields daily and monthly counts.

pub mod analyzer;
pub mod auth;
pub mod client;
pub mod config;
mod dates;
pub mod error;
pub mod models;
pub mod provider;
pub mod render;

pub use analyzer::UsageAnalyzer;
pub use auth::AuthContext;
pub use client::UsageClient;
pub use error::{ProviderError, UsageError, ValidationError};
pub use models::report::UsageReport;
pub use models::usage::{DailyUsageRecord, MonthlyUsage, UsageWindow};
pub use provider::{HttpUsageProvider, UsageProvider};
