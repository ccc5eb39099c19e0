use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LogFormat, LoggingSettings};

const DAYS_TO_KEEP: usize = 7;

/// Initialize tracing into a daily rolling file under `log_dir`.
///
/// The terminal belongs to the popup, so nothing is written to stdout.
/// `RUST_LOG` wins over `settings.level`. Keep the returned guard alive for
/// the lifetime of the process or buffered lines are lost.
///
/// # Errors
/// Returns error if the log directory cannot be created or a subscriber is
/// already installed.
pub fn init(
    settings: &LoggingSettings,
    log_dir: &Path,
) -> Result<WorkerGuard, Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    std::fs::create_dir_all(log_dir)?;
    let file_appender = tracing_appender::rolling::Builder::new()
        .rotation(tracing_appender::rolling::Rotation::DAILY)
        .max_log_files(DAYS_TO_KEEP)
        .filename_prefix("offstage")
        .filename_suffix("log")
        .build(log_dir)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let registry = tracing_subscriber::registry().with(env_filter);

    match settings.format {
        LogFormat::Json => {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_level(true)
                        .with_writer(non_blocking)
                        .with_ansi(false),
                )
                .try_init()?;
        }
        LogFormat::Pretty => {
            registry
                .with(
                    fmt::layer()
                        .pretty()
                        .with_target(true)
                        .with_level(true)
                        .with_thread_names(true)
                        .with_writer(non_blocking)
                        .with_ansi(false),
                )
                .try_init()?;
        }
    }

    Ok(guard)
}
