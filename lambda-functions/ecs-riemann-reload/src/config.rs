use bon::Builder;
use std::fmt;
use tracing::level_filters::LevelFilter;

pub const CLUSTER_NAME_VAR: &str = "ecs_cluster_name";
pub const SERVICE_NAME_VAR: &str = "riemann_consumer_ecs_service_name";
pub const LOG_LEVEL_VAR: &str = "LOG_LEVEL";

pub const DEFAULT_CLUSTER_NAME: &str = "telemetry";
pub const DEFAULT_SERVICE_NAME: &str = "riemann-consumer";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterName(String);

impl ClusterName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ClusterName {
    fn default() -> Self {
        Self(DEFAULT_CLUSTER_NAME.to_string())
    }
}

impl From<&str> for ClusterName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ClusterName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for ClusterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceName(String);

impl ServiceName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ServiceName {
    fn default() -> Self {
        Self(DEFAULT_SERVICE_NAME.to_string())
    }
}

impl From<&str> for ServiceName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ServiceName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Process log verbosity.
///
/// Accepts the level names operators already put in `LOG_LEVEL` for the
/// Python logging family (`WARNING`, `CRITICAL`, numeric levels) alongside
/// the `tracing` spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "TRACE" => Some(Self::Trace),
            "DEBUG" | "10" => Some(Self::Debug),
            "INFO" | "20" => Some(Self::Info),
            "WARN" | "WARNING" | "30" => Some(Self::Warn),
            "ERROR" | "CRITICAL" | "FATAL" | "40" | "50" => Some(Self::Error),
            _ => None,
        }
    }

    /// Resolves the level from `LOG_LEVEL`, falling back to `INFO`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(LOG_LEVEL_VAR)
            .as_deref()
            .and_then(Self::parse)
            .unwrap_or_default()
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trace => write!(f, "TRACE"),
            Self::Debug => write!(f, "DEBUG"),
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

/// Resolved settings for one redeployment.
#[derive(Builder, Debug, Clone, PartialEq, Eq)]
#[builder(on(ClusterName, into), on(ServiceName, into))]
pub struct Config {
    #[builder(default = ClusterName::default())]
    pub cluster_name: ClusterName,

    #[builder(default = ServiceName::default())]
    pub service_name: ServiceName,

    #[builder(default = LogLevel::default())]
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves every setting through `lookup`. Unset and empty variables
    /// fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            cluster_name: lookup(CLUSTER_NAME_VAR)
                .map(ClusterName::from)
                .unwrap_or_default(),
            service_name: lookup(SERVICE_NAME_VAR)
                .map(ServiceName::from)
                .unwrap_or_default(),
            log_level: LogLevel::from_lookup(lookup),
        }
    }
}
