//! Print the dashboard report for a SQLite revenue database as JSON.
//!
//! Usage: `event_report [YYYY-MM-DD] [--title NAME] [--threshold PERCENT]`
//!
//! The database path comes from `EVENTCAST_DB_PATH`; pipeline settings from
//! the `EVENTCAST_*` variables read by `PipelineConfig::from_env`.

use eventcast::config::{PipelineConfig, Session};
use eventcast::pipeline::{run, DashboardReport};
use eventcast::query::EventQueryResult;
use eventcast::source::{CachedSource, SqliteSource};
use eventcast::{EventError, Result};
use serde::Serialize;
use std::process::ExitCode;

const DEFAULT_DB_PATH: &str = "data/eventcast.db";

#[derive(Serialize)]
#[serde(untagged)]
enum QueryOutput {
    Answer(EventQueryResult),
    Rejected { error: String },
}

#[derive(Serialize)]
struct Output<'a> {
    dashboard: &'a DashboardReport,
    query: Option<QueryOutput>,
}

struct Args {
    candidate: Option<String>,
    title: Option<String>,
    threshold_percent: Option<u32>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        candidate: None,
        title: None,
        threshold_percent: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--title" => {
                args.title = Some(iter.next().ok_or_else(|| {
                    EventError::InvalidParameter("--title needs a value".to_string())
                })?);
            }
            "--threshold" => {
                let raw = iter.next().ok_or_else(|| {
                    EventError::InvalidParameter("--threshold needs a value".to_string())
                })?;
                args.threshold_percent = Some(raw.parse().map_err(|_| {
                    EventError::InvalidParameter(format!("threshold percent '{}'", raw))
                })?);
            }
            _ if args.candidate.is_none() && !arg.starts_with("--") => args.candidate = Some(arg),
            other => {
                return Err(EventError::InvalidParameter(format!(
                    "unexpected argument '{}'",
                    other
                )))
            }
        }
    }
    Ok(args)
}

fn report() -> Result<()> {
    let args = parse_args()?;

    let mut session = Session::new(PipelineConfig::from_env())?;
    if let Some(title) = args.title {
        session.select_title(Some(title));
    }
    if let Some(percent) = args.threshold_percent {
        session.set_threshold_percent(percent)?;
    }

    let db_path =
        std::env::var("EVENTCAST_DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());
    log::info!("Configuration:");
    log::info!("   database: {}", db_path);
    log::info!("   threshold: {}%", session.threshold_percent());
    log::info!(
        "   horizon: {} days",
        session.config().forecast_horizon_days
    );

    let source = CachedSource::new(SqliteSource::open(&db_path)?);
    let dashboard = run(&source, session.config())?;

    let query = args
        .candidate
        .as_deref()
        .map(|raw| match dashboard.content.query(Some(raw)) {
            Ok(result) => QueryOutput::Answer(result),
            Err(err) => QueryOutput::Rejected {
                error: err.to_string(),
            },
        });

    let output = Output {
        dashboard: &dashboard,
        query,
    };
    let text = serde_json::to_string_pretty(&output)
        .map_err(|e| EventError::ComputationError(format!("encode report: {}", e)))?;
    println!("{}", text);
    Ok(())
}

fn main() -> ExitCode {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    match report() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
