//! Structured logging for the `streetprint` binary.
//!
//! Installs a global `tracing` subscriber writing to stderr, so reports on
//! stdout stay machine-readable, and bridges the `log` facade.

use std::{env, str::FromStr, sync::OnceLock};

use thiserror::Error;
use tracing::warn;
use tracing_log::LogTracer;
use tracing_subscriber::{EnvFilter, Layer, fmt::format::FmtSpan, layer::SubscriberExt};

/// Environment variable selecting the diagnostic format.
pub const LOG_FORMAT_ENV: &str = "STREETPRINT_LOG_FORMAT";

static INITIALISED: OnceLock<()> = OnceLock::new();

/// Rendering of diagnostic events.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LogFormat {
    /// Compact text for terminals.
    #[default]
    Human,
    /// One JSON object per event, including the active spans.
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            other => Err(LoggingError::UnsupportedFormat {
                provided: other.to_owned(),
            }),
        }
    }
}

/// Errors raised while initialising structured logging.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The format variable was not valid UTF-8.
    #[error("environment variable `{name}` contained invalid UTF-8: {source}")]
    InvalidUnicode {
        /// Name of the offending variable.
        name: &'static str,
        /// Underlying lookup failure.
        #[source]
        source: env::VarError,
    },
    /// The format variable named an unknown format.
    #[error("unsupported log format `{provided}`; expected `human` or `json`")]
    UnsupportedFormat {
        /// Value supplied by the user.
        provided: String,
    },
}

/// Installs the global subscriber once.
///
/// The level follows `RUST_LOG` and defaults to `info`; the format follows
/// [`LOG_FORMAT_ENV`]. If another subscriber already owns the global slot it
/// is kept and a warning is sent to it.
///
/// # Errors
/// Returns [`LoggingError`] when [`LOG_FORMAT_ENV`] is not valid UTF-8 or
/// names an unsupported format.
pub fn init_logging() -> Result<(), LoggingError> {
    if INITIALISED.get().is_some() {
        return Ok(());
    }
    let format = match env::var(LOG_FORMAT_ENV) {
        Ok(raw) => raw.parse()?,
        Err(env::VarError::NotPresent) => LogFormat::default(),
        Err(source @ env::VarError::NotUnicode(_)) => {
            return Err(LoggingError::InvalidUnicode {
                name: LOG_FORMAT_ENV,
                source,
            });
        }
    };
    INITIALISED.get_or_init(|| install_subscriber(format));
    Ok(())
}

fn install_subscriber(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);
    let layer = match format {
        LogFormat::Human => fmt_layer.boxed(),
        LogFormat::Json => fmt_layer
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(layer);
    if let Err(error) = tracing::subscriber::set_global_default(subscriber) {
        warn!(%error, "structured logging already configured elsewhere");
        return;
    }
    if let Err(error) = LogTracer::init() {
        warn!(%error, "`log` records are already routed elsewhere");
    }
}
