//! Runtime configuration handed to the core by the daemon.
//!
//! How these values are sourced (flags, environment) is the daemon's
//! business; the core only validates that they make sense together.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

use crate::collector::SamplerKind;
use crate::collector::procfs::DEFAULT_CPU_INTERVAL;

/// Error type for invalid configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid ingestion endpoint {url:?}: {reason}")]
    Endpoint { url: String, reason: String },

    #[error("collection interval must be greater than zero")]
    ZeroInterval,

    #[error("cycle timeout {timeout:?} is shorter than the cpu sampling interval {cpu_interval:?}")]
    TimeoutTooShort {
        timeout: Duration,
        cpu_interval: Duration,
    },
}

/// Which of the four standard samplers run each cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerToggles {
    pub temperature: bool,
    pub memory: bool,
    pub cpu: bool,
    pub load: bool,
}

impl SamplerToggles {
    pub fn all() -> Self {
        Self {
            temperature: true,
            memory: true,
            cpu: true,
            load: true,
        }
    }

    pub fn none() -> Self {
        Self {
            temperature: false,
            memory: false,
            cpu: false,
            load: false,
        }
    }

    pub fn is_enabled(&self, kind: SamplerKind) -> bool {
        match kind {
            SamplerKind::Temperature => self.temperature,
            SamplerKind::Memory => self.memory,
            SamplerKind::Cpu => self.cpu,
            SamplerKind::Load => self.load,
        }
    }

    pub fn enabled_kinds(&self) -> Vec<SamplerKind> {
        SamplerKind::ALL
            .into_iter()
            .filter(|kind| self.is_enabled(*kind))
            .collect()
    }
}

impl Default for SamplerToggles {
    fn default() -> Self {
        Self::all()
    }
}

/// Base URL of the ingestion endpoint, without a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base: String,
}

impl Endpoint {
    /// Parses a base URL. A missing scheme defaults to `http://`.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim().trim_end_matches('/');
        let invalid = |reason: &str| ConfigError::Endpoint {
            url: raw.to_string(),
            reason: reason.to_string(),
        };

        if trimmed.is_empty() {
            return Err(invalid("empty url"));
        }

        let candidate = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("http://{trimmed}")
        };

        let url = Url::parse(&candidate).map_err(|e| invalid(&e.to_string()))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(invalid("scheme must be http or https"));
        }
        if url.host_str().is_none() {
            return Err(invalid("missing host"));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("query and fragment are not allowed"));
        }

        Ok(Self { base: candidate })
    }

    /// Builds the base URL from a host (optionally with scheme) and a port.
    pub fn from_parts(url: &str, port: u16) -> Result<Self, ConfigError> {
        let host = url.trim().trim_end_matches('/');
        Self::parse(&format!("{host}:{port}"))
    }

    pub fn as_str(&self) -> &str {
        &self.base
    }

    /// Full URL of `path` (which must start with `/`) under this endpoint.
    pub fn join(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)
    }
}

/// Everything the core needs to run collection cycles.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub samplers: SamplerToggles,
    pub endpoint: Endpoint,
    /// Base path to proc filesystem (usually "/proc").
    pub proc_path: PathBuf,
    /// Base path to sysfs (usually "/sys").
    pub sys_path: PathBuf,
    pub cpu_interval: Duration,
    pub collection_interval: Duration,
    /// Deadline for one whole cycle: ping, collect and push.
    pub cycle_timeout: Duration,
    /// Per-request timeout of the HTTP client.
    pub request_timeout: Duration,
    /// Deadline for the connectivity check at startup.
    pub startup_ping_timeout: Duration,
}

impl MonitorConfig {
    pub const DEFAULT_COLLECTION_INTERVAL: Duration = Duration::from_secs(5);
    pub const DEFAULT_CYCLE_TIMEOUT: Duration = Duration::from_secs(30);
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
    pub const DEFAULT_STARTUP_PING_TIMEOUT: Duration = Duration::from_secs(5);

    /// Configuration with defaults for everything but the endpoint.
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            samplers: SamplerToggles::all(),
            endpoint,
            proc_path: PathBuf::from("/proc"),
            sys_path: PathBuf::from("/sys"),
            cpu_interval: DEFAULT_CPU_INTERVAL,
            collection_interval: Self::DEFAULT_COLLECTION_INTERVAL,
            cycle_timeout: Self::DEFAULT_CYCLE_TIMEOUT,
            request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
            startup_ping_timeout: Self::DEFAULT_STARTUP_PING_TIMEOUT,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.collection_interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        if self.samplers.cpu && self.cycle_timeout <= self.cpu_interval {
            return Err(ConfigError::TimeoutTooShort {
                timeout: self.cycle_timeout,
                cpu_interval: self.cpu_interval,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_defaults_scheme() {
        let endpoint = Endpoint::from_parts("localhost", 8428).unwrap();
        assert_eq!(endpoint.as_str(), "http://localhost:8428");
        assert_eq!(endpoint.join("/health"), "http://localhost:8428/health");
    }

    #[test]
    fn test_endpoint_keeps_scheme_and_strips_slash() {
        let endpoint = Endpoint::from_parts("https://vm.example.com/", 443).unwrap();
        assert_eq!(endpoint.as_str(), "https://vm.example.com:443");

        let endpoint = Endpoint::parse("http://10.0.0.5:8428/").unwrap();
        assert_eq!(endpoint.to_string(), "http://10.0.0.5:8428");
    }

    #[test]
    fn test_endpoint_rejects_garbage() {
        assert!(Endpoint::parse("").is_err());
        assert!(Endpoint::parse("ftp://host").is_err());
        assert!(Endpoint::parse("http://host:8428/?x=1").is_err());
        assert!(Endpoint::parse("http://exa mple:1").is_err());
    }

    #[test]
    fn test_toggles() {
        let toggles = SamplerToggles {
            memory: false,
            ..SamplerToggles::all()
        };
        assert!(!toggles.is_enabled(SamplerKind::Memory));
        assert_eq!(
            toggles.enabled_kinds(),
            vec![SamplerKind::Temperature, SamplerKind::Cpu, SamplerKind::Load]
        );
        assert!(SamplerToggles::none().enabled_kinds().is_empty());
    }

    #[test]
    fn test_validate() {
        let endpoint = Endpoint::parse("localhost:8428").unwrap();
        let config = MonitorConfig::new(endpoint.clone());
        assert!(config.validate().is_ok());

        let mut zero = MonitorConfig::new(endpoint.clone());
        zero.collection_interval = Duration::ZERO;
        assert!(matches!(zero.validate(), Err(ConfigError::ZeroInterval)));

        let mut short = MonitorConfig::new(endpoint.clone());
        short.cycle_timeout = Duration::from_millis(500);
        assert!(matches!(
            short.validate(),
            Err(ConfigError::TimeoutTooShort { .. })
        ));

        // Without the cpu sampler a short timeout is fine.
        short.samplers.cpu = false;
        assert!(short.validate().is_ok());
    }
}
