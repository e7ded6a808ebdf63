//! Command line and environment configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;
use clap::builder::BoolishValueParser;
use tracing::Level;

use hostmon_core::config::{Endpoint, MonitorConfig, SamplerToggles};

use crate::logging::{LogFormat, LogSettings, LogTarget, parse_level};

/// Dotenv file read from the working directory at startup.
pub const ENV_FILE: &str = ".env";

/// Result of loading a dotenv file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvFile {
    Loaded(PathBuf),
    Missing,
}

/// Loads `KEY=value` pairs from `path` into the process environment.
///
/// Variables already set in the environment keep their values. A missing
/// file is not an error. Must run before any other thread starts.
pub fn load_env_file(path: &Path) -> anyhow::Result<EnvFile> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(EnvFile::Loaded(path.to_path_buf())),
        Err(e) if e.not_found() => Ok(EnvFile::Missing),
        Err(e) => Err(e).with_context(|| format!("failed to load {}", path.display())),
    }
}

/// The only backend the daemon can push to.
pub const VICTORIAMETRICS: &str = "victoriametrics";

/// Host metrics collector daemon.
#[derive(Debug, Parser)]
#[command(
    name = "hostmond",
    about = "Host metrics collector daemon",
    version = hostmon_core::VERSION
)]
pub struct Args {
    /// Deployment environment. `local` and `development` log human-readable
    /// text, anything else logs JSON lines.
    #[arg(long, env = "ENV", default_value = "local")]
    pub environment: String,

    /// Time between collection cycles (e.g. "5s", "1m").
    #[arg(
        long,
        env = "COLLECTION_INTERVAL",
        default_value = "5s",
        value_parser = humantime::parse_duration
    )]
    pub collection_interval: Duration,

    /// Deadline for one cycle: health check, collection and push.
    #[arg(
        long,
        env = "COLLECTION_TIMEOUT",
        default_value = "30s",
        value_parser = humantime::parse_duration
    )]
    pub cycle_timeout: Duration,

    /// Time-series backend. Only "victoriametrics" is supported.
    #[arg(long, env = "DATABASE_TYPE", default_value = VICTORIAMETRICS)]
    pub database_type: String,

    /// Host of the time-series store, optionally with a scheme.
    #[arg(long, env = "DATABASE_URL", default_value = "localhost")]
    pub database_url: String,

    #[arg(long, env = "DATABASE_PORT", default_value_t = 8428)]
    pub database_port: u16,

    #[arg(
        long,
        env = "MONITORING_ENABLE_CPU_MONITORING",
        default_value_t = true,
        action = clap::ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub enable_cpu: bool,

    #[arg(
        long,
        env = "MONITORING_ENABLE_MEMORY_MONITORING",
        default_value_t = true,
        action = clap::ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub enable_memory: bool,

    #[arg(
        long,
        env = "MONITORING_ENABLE_TEMPERATURE_MONITORING",
        default_value_t = true,
        action = clap::ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub enable_temperature: bool,

    #[arg(
        long,
        env = "MONITORING_ENABLE_LOAD_MONITORING",
        default_value_t = true,
        action = clap::ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub enable_load: bool,

    /// Log level: debug, info, warn or error.
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log destination: "stdout" or a file path (appended to).
    #[arg(long, env = "LOG_FILE", default_value = "stdout")]
    pub log_file: String,

    /// Path to /proc filesystem (for testing/mocking).
    #[arg(long, default_value = "/proc")]
    pub proc_path: PathBuf,

    /// Path to /sys filesystem (for testing/mocking).
    #[arg(long, default_value = "/sys")]
    pub sys_path: PathBuf,

    /// Increase logging verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    pub fn samplers(&self) -> SamplerToggles {
        SamplerToggles {
            temperature: self.enable_temperature,
            memory: self.enable_memory,
            cpu: self.enable_cpu,
            load: self.enable_load,
        }
    }

    /// Builds and validates the core configuration.
    pub fn monitor_config(&self) -> anyhow::Result<MonitorConfig> {
        if !self.database_type.eq_ignore_ascii_case(VICTORIAMETRICS) {
            bail!(
                "unsupported database type {:?}, only {VICTORIAMETRICS} is supported",
                self.database_type
            );
        }

        let endpoint = Endpoint::from_parts(&self.database_url, self.database_port)?;
        let mut config = MonitorConfig::new(endpoint);
        config.samplers = self.samplers();
        config.proc_path = self.proc_path.clone();
        config.sys_path = self.sys_path.clone();
        config.collection_interval = self.collection_interval;
        config.cycle_timeout = self.cycle_timeout;
        config.validate().context("invalid configuration")?;
        Ok(config)
    }

    /// Level requested by `--log-level`, `-v` and `-q`.
    ///
    /// An unknown `--log-level` falls back to info; the raw value is returned
    /// alongside so it can be reported once logging is up.
    pub fn log_level(&self) -> (Level, Option<&str>) {
        let (base, unknown) = match parse_level(&self.log_level) {
            Some(level) => (level, None),
            None => (Level::INFO, Some(self.log_level.as_str())),
        };

        let level = if self.quiet {
            Level::ERROR
        } else {
            match self.verbose {
                0 => base,
                1 => Level::DEBUG,
                _ => Level::TRACE,
            }
        };
        (level, unknown)
    }

    pub fn log_settings(&self) -> LogSettings {
        LogSettings {
            level: self.log_level().0,
            format: LogFormat::for_environment(&self.environment),
            target: LogTarget::parse(&self.log_file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["hostmond"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_explicit_flags() {
        let args = parse(&[
            "--environment",
            "production",
            "--collection-interval",
            "1m",
            "--cycle-timeout",
            "10s",
            "--database-url",
            "https://vm.internal",
            "--database-port",
            "9428",
            "--enable-temperature",
            "false",
            "--enable-load",
            "0",
            "--log-level",
            "warn",
            "--log-file",
            "/var/log/hostmond.log",
        ]);

        assert_eq!(args.environment, "production");
        assert_eq!(args.collection_interval, Duration::from_secs(60));
        assert_eq!(args.cycle_timeout, Duration::from_secs(10));

        let toggles = args.samplers();
        assert!(!toggles.temperature);
        assert!(!toggles.load);

        let config = args.monitor_config().unwrap();
        assert_eq!(config.endpoint.as_str(), "https://vm.internal:9428");
        assert_eq!(config.collection_interval, Duration::from_secs(60));

        let settings = args.log_settings();
        assert_eq!(settings.level, Level::WARN);
        assert_eq!(settings.format, LogFormat::Json);
        assert_eq!(
            settings.target,
            LogTarget::File(PathBuf::from("/var/log/hostmond.log"))
        );
    }

    #[test]
    fn test_rejects_unsupported_database() {
        let args = parse(&["--database-type", "influxdb"]);
        let err = args.monitor_config().unwrap_err();
        assert!(err.to_string().contains("influxdb"));

        let args = parse(&["--database-type", "VictoriaMetrics"]);
        assert!(args.monitor_config().is_ok());
    }

    #[test]
    fn test_rejects_bad_durations() {
        let argv = ["hostmond", "--collection-interval", "soon"];
        assert!(Args::try_parse_from(argv).is_err());

        let args = parse(&["--collection-interval", "0s"]);
        assert!(args.monitor_config().is_err());

        let args = parse(&["--cycle-timeout", "500ms"]);
        assert!(args.monitor_config().is_err());
    }

    #[test]
    fn test_env_file_fills_unset_variables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(
            &path,
            "# deployment settings\nDATABASE_PORT=9999\nPATH=/nonexistent\n",
        )
        .unwrap();
        let port_was_set = std::env::var_os("DATABASE_PORT").is_some();
        let path_before = std::env::var_os("PATH");

        assert_eq!(load_env_file(&path).unwrap(), EnvFile::Loaded(path.clone()));

        // The process environment wins over the file.
        assert_eq!(std::env::var_os("PATH"), path_before);

        let args = parse(&[]);
        let expected: u16 = std::env::var("DATABASE_PORT").unwrap().parse().unwrap();
        assert_eq!(args.database_port, expected);
        if !port_was_set {
            assert_eq!(args.database_port, 9999);
        }
    }

    #[test]
    fn test_missing_env_file() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = load_env_file(&dir.path().join(".env")).unwrap();
        assert_eq!(outcome, EnvFile::Missing);
    }

    #[test]
    fn test_malformed_env_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "NOT A VALID LINE\n").unwrap();
        assert!(load_env_file(&path).is_err());
    }

    #[test]
    fn test_log_level_overrides() {
        let args = parse(&["--log-level", "warning"]);
        assert_eq!(args.log_level(), (Level::WARN, None));

        let args = parse(&["--log-level", "error", "-v"]);
        assert_eq!(args.log_level().0, Level::DEBUG);

        let args = parse(&["-vv"]);
        assert_eq!(args.log_level().0, Level::TRACE);

        let args = parse(&["--log-level", "debug", "-q"]);
        assert_eq!(args.log_level().0, Level::ERROR);

        let args = parse(&["--log-level", "loud"]);
        assert_eq!(args.log_level(), (Level::INFO, Some("loud")));
    }
}
