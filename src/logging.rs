//! Tracing setup
//!
//! File output always goes through a non-blocking rolling appender. Text mode
//! also echoes to stdout; JSON mode writes the file only, for log shippers.
//! `RUST_LOG` replaces the configured level entirely when set.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::AppConfig;

/// Map the `rotation` setting to an appender policy. Unknown values never rotate.
pub fn rotation_policy(rotation: &str) -> Rotation {
    match rotation.trim().to_ascii_lowercase().as_str() {
        "minutely" => Rotation::MINUTELY,
        "hourly" => Rotation::HOURLY,
        "daily" => Rotation::DAILY,
        _ => Rotation::NEVER,
    }
}

/// Filter directives for a configured level. sqlx logs every statement at
/// info, so it is held at warn unless `RUST_LOG` says otherwise.
pub fn filter_directives(log_level: &str) -> String {
    format!("{},sqlx=warn", log_level.trim())
}

/// Install the global subscriber. Keep the guard alive for the process
/// lifetime or buffered lines are lost on exit.
pub fn init_logging(config: &AppConfig) -> WorkerGuard {
    let appender = RollingFileAppender::new(
        rotation_policy(&config.rotation),
        &config.log_dir,
        &config.log_file,
    );
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(&config.log_level)));
    let registry = tracing_subscriber::registry().with(filter);

    if config.use_json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(writer)
                    .with_ansi(false),
            )
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(writer).with_ansi(false))
            .with(fmt::layer().with_target(false))
            .init();
    }

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_policy() {
        assert_eq!(rotation_policy("daily"), Rotation::DAILY);
        assert_eq!(rotation_policy(" Hourly "), Rotation::HOURLY);
        assert_eq!(rotation_policy("minutely"), Rotation::MINUTELY);
        assert_eq!(rotation_policy("weekly"), Rotation::NEVER);
    }

    #[test]
    fn test_filter_directives_parse() {
        let directives = filter_directives("debug");
        assert_eq!(directives, "debug,sqlx=warn");
        assert!(EnvFilter::try_new(&directives).is_ok());
    }
}
