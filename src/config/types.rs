//! Configuration types and CLI options.
//!
//! This module defines the command-line options parsed by `clap` and the
//! validated library configuration they are converted into.

use std::fmt;
use std::str::FromStr;

use clap::builder::BoolishValueParser;
use clap::{Parser, ValueEnum};
use url::Url;

use crate::config::constants::{
    DEFAULT_CLIENTS, DEFAULT_NUMBER, DEFAULT_QPS, DEFAULT_USER_AGENT, REQUEST_TIMEOUT_SECS,
};
use crate::error_handling::ConfigError;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: `<timestamp> <LEVEL> <message>` lines (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Timestamped plain text lines (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// HTTP method used for every generated request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum HttpMethod {
    /// Plain GET (default)
    Get,
    /// Sends an empty body
    Post,
}

impl From<HttpMethod> for reqwest::Method {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }
}

/// Upstream HTTP proxy, given on the command line as `host:port`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProxyAddress {
    /// Proxy host name or IP address
    pub host: String,
    /// Proxy TCP port
    pub port: u16,
}

impl ProxyAddress {
    /// Proxy URL in the form `reqwest::Proxy` expects.
    pub fn to_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl fmt::Display for ProxyAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for ProxyAddress {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidProxy(s.to_string());
        let (host, port) = s.trim().rsplit_once(':').ok_or_else(invalid)?;
        if host.is_empty() || host.contains('/') || host.chars().any(char::is_whitespace) {
            return Err(invalid());
        }
        let port: u16 = port.parse().map_err(|_| invalid())?;
        if port == 0 {
            return Err(invalid());
        }
        Ok(ProxyAddress {
            host: host.to_string(),
            port,
        })
    }
}

/// Command-line options.
///
/// Every flag accepts the `--flag=value` form as well as `--flag value`.
///
/// # Examples
///
/// ```bash
/// # 10 requests per second from a single client, forever
/// http_loadgen --url=http://localhost:8080/health
///
/// # 2 clients sharing 5 qps, stop after 10 requests, HTTP/1.1
/// http_loadgen --client=2 --qps=5 --number=10 --http2-prior-knowledge=false --url=http://localhost:8080/
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "http_loadgen",
    version,
    about = "Sends a rate-limited stream of HTTP requests to a URL and reports successes and failures per second."
)]
pub struct Opt {
    /// Number of concurrent clients
    #[arg(long, default_value_t = DEFAULT_CLIENTS)]
    pub client: usize,

    /// Target aggregate requests per second
    #[arg(long, default_value_t = DEFAULT_QPS)]
    pub qps: u32,

    /// Total number of requests to issue before stopping (0 runs until interrupted)
    #[arg(long, default_value_t = DEFAULT_NUMBER)]
    pub number: u64,

    /// Upstream HTTP proxy (host:port)
    #[arg(long)]
    pub proxy: Option<String>,

    /// Use HTTP/2 without protocol negotiation
    #[arg(
        long,
        default_value = "true",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new(),
        action = clap::ArgAction::Set
    )]
    pub http2_prior_knowledge: bool,

    /// Target URL
    #[arg(long)]
    pub url: Option<String>,

    /// HTTP method: get|post
    #[arg(long, value_enum, default_value_t = HttpMethod::Get)]
    pub method: HttpMethod,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = REQUEST_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// HTTP User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

/// Library configuration (no CLI dependencies).
///
/// This is the immutable snapshot a run is built from. It can be constructed
/// programmatically with [`Config::new`] or converted from parsed [`Opt`].
///
/// # Examples
///
/// ```no_run
/// use http_loadgen::Config;
///
/// let mut config = Config::new("http://localhost:8080/".parse().unwrap());
/// config.clients = 4;
/// config.qps = 100;
/// config.number = 1_000;
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of concurrent workers
    pub clients: usize,

    /// Target aggregate requests per second
    pub qps: u32,

    /// Total request budget (0 = unbounded)
    pub number: u64,

    /// Upstream HTTP proxy
    pub proxy: Option<ProxyAddress>,

    /// Force HTTP/2 without negotiation
    pub http2_prior_knowledge: bool,

    /// Target URL
    pub url: Url,

    /// HTTP method
    pub method: HttpMethod,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,

    /// HTTP User-Agent header value
    pub user_agent: String,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,
}

impl Config {
    /// Creates a configuration for `url` with every other field at its default.
    pub fn new(url: Url) -> Self {
        Self {
            clients: DEFAULT_CLIENTS,
            qps: DEFAULT_QPS,
            number: DEFAULT_NUMBER,
            proxy: None,
            http2_prior_knowledge: true,
            url,
            method: HttpMethod::Get,
            timeout_seconds: REQUEST_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }

    /// Checks the numeric invariants that the type system does not enforce.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.clients == 0 {
            return Err(ConfigError::InvalidClients);
        }
        if self.qps == 0 {
            return Err(ConfigError::InvalidQps);
        }
        if self.timeout_seconds == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(())
    }

    /// The request budget, or `None` when the run is unbounded.
    pub fn budget(&self) -> Option<u64> {
        (self.number > 0).then_some(self.number)
    }
}

impl TryFrom<Opt> for Config {
    type Error = ConfigError;

    fn try_from(opt: Opt) -> Result<Self, Self::Error> {
        let raw_url = opt
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or(ConfigError::MissingUrl)?;
        let url = parse_target_url(raw_url)?;

        let proxy = opt
            .proxy
            .as_deref()
            .map(ProxyAddress::from_str)
            .transpose()?;

        let config = Config {
            clients: opt.client,
            qps: opt.qps,
            number: opt.number,
            proxy,
            http2_prior_knowledge: opt.http2_prior_knowledge,
            url,
            method: opt.method,
            timeout_seconds: opt.timeout_seconds,
            user_agent: opt.user_agent,
            log_level: opt.log_level,
            log_format: opt.log_format,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Parses the target URL, accepting only http and https.
pub fn parse_target_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };
    let parsed = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(parsed),
        "http" | "https" => Err(invalid("missing host".to_string())),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}
