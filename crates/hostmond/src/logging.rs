//! Tracing subscriber setup.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use tracing::{Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// Output encoding of log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// Human-readable text for local and development environments, JSON lines
    /// everywhere else.
    pub fn for_environment(environment: &str) -> Self {
        match environment.to_ascii_lowercase().as_str() {
            "local" | "development" => LogFormat::Text,
            _ => LogFormat::Json,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stdout,
    File(PathBuf),
}

impl LogTarget {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("stdout") {
            LogTarget::Stdout
        } else {
            LogTarget::File(PathBuf::from(raw))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: Level,
    pub format: LogFormat,
    pub target: LogTarget,
}

/// Parses a `LOG_LEVEL` value. Returns `None` for unknown names.
pub fn parse_level(raw: &str) -> Option<Level> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Opens `path` for appending, creating it if needed.
pub fn open_log_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Builds the subscriber described by `settings`.
///
/// `RUST_LOG` directives are honored; the configured level applies to the
/// daemon and the core library on top of them.
pub fn build_subscriber(
    settings: &LogSettings,
) -> anyhow::Result<Box<dyn Subscriber + Send + Sync>> {
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("hostmond={}", settings.level).parse()?)
        .add_directive(format!("hostmon_core={}", settings.level).parse()?);

    let (writer, ansi) = match &settings.target {
        LogTarget::Stdout => (BoxMakeWriter::new(io::stdout), true),
        LogTarget::File(path) => {
            let file = open_log_file(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(ansi && settings.format == LogFormat::Text)
        .with_writer(writer);

    Ok(match settings.format {
        LogFormat::Text => Box::new(builder.finish()),
        LogFormat::Json => Box::new(builder.json().finish()),
    })
}

/// Installs the subscriber as the process-wide default.
pub fn init(settings: &LogSettings) -> anyhow::Result<()> {
    let subscriber = build_subscriber(settings)?;
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install log subscriber")
}
