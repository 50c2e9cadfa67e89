//!
//! src/config.rs
//!
//! Reads the environment (and an optional .env file) into the
//! configuration structs used by the loader, server and logger
//!

use std::time;

use crate::errors::CleanerError;
use crate::fetch::Source;

/// Defaults for Source and Server
pub const DEFAULT_SOURCE: &str = "data/short_songs.json";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8001;

/// Constants for HTTP Config
pub const HTTP_POOL_MAX_IDLE: usize = 16;
pub const HTTP_POOL_IDLE_TIMEOUT: u64 = 90000;
pub const HTTP_MAX_REDIRECTS: u8 = 4;

pub const DEFAULT_FILTER: &str =
    "info,song_cleaner=debug,reqwest=warn,tower_http=info";

/// Returns the value of a variable, treating blank values as unset
fn non_blank<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => None,
    }
}

///
/// Where the raw song data comes from
///
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub source: Source,
}

fn build_source<F>(lookup: &F) -> Result<SourceConfig, CleanerError>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = non_blank(lookup, "SOURCE_DATA_URL")
        .unwrap_or_else(|| DEFAULT_SOURCE.to_string());

    let source = Source::parse(&raw)
        .map_err(|e| CleanerError::Config(
            format!("SOURCE_DATA_URL invalid {e}")
        ))?;

    Ok( SourceConfig { source } )
}

///
/// Address the api binds to
///
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn build_server<F>(lookup: &F) -> Result<ServerConfig, CleanerError>
where
    F: Fn(&str) -> Option<String>,
{
    let host = non_blank(lookup, "SERVER_HOST")
        .unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = match non_blank(lookup, "SERVER_PORT") {
        Some(p) => p.parse::<u16>()
            .map_err(|e| CleanerError::Config(
                format!("SERVER_PORT invalid {e}")
            ))?,
        None => DEFAULT_PORT,
    };

    Ok( ServerConfig { host, port } )
}

///
/// Configuration for the http client used on network sources.
/// Request timeouts are left at the transport defaults.
///
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout: time::Duration,
    pub max_redirects: u8,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            pool_max_idle_per_host: HTTP_POOL_MAX_IDLE,
            pool_idle_timeout: time::Duration::from_millis(HTTP_POOL_IDLE_TIMEOUT),
            max_redirects: HTTP_MAX_REDIRECTS,
            user_agent: format!("song-cleaner/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

///
/// Configuration for Logger
///

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json
}

impl LogFormat {
    pub fn parse(s: &str) -> Option<LogFormat> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Some(LogFormat::Pretty),
            "json"   => Some(LogFormat::Json),
            _ => None
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub filter_directives: String,
    pub format: LogFormat,
    pub with_ansi: bool,
    pub include_file_line: bool,
    pub include_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter_directives: DEFAULT_FILTER.to_string(),
            format: LogFormat::Pretty,
            with_ansi: true,
            include_file_line: true,
            include_target: true,
        }
    }
}

fn build_logging<F>(lookup: &F) -> Result<LoggingConfig, CleanerError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut logging = LoggingConfig::default();

    if let Some(format) = non_blank(lookup, "LOG_FORMAT") {
        logging.format = LogFormat::parse(&format)
            .ok_or_else(|| CleanerError::Config(
                format!("LOG_FORMAT must be json or pretty, got {format}")
            ))?;
    }
    if logging.format == LogFormat::Json {
        logging.with_ansi = false;
    }
    if let Some(filter) = non_blank(lookup, "RUST_LOG") {
        logging.filter_directives = filter;
    }

    Ok( logging )
}

///
/// AppConfig which holds everything main hands to the loader, server and logger
///
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub server: ServerConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig
}

///
/// Builds the configuration from an arbitrary variable lookup.
///
pub fn load_from<F>(lookup: F) -> Result<AppConfig, CleanerError>
where
    F: Fn(&str) -> Option<String>,
{
    let source  = build_source(&lookup)?;
    let server  = build_server(&lookup)?;
    let http    = HttpConfig::default();
    let logging = build_logging(&lookup)?;

    Ok( AppConfig { source, server, http, logging } )
}

///
/// Return all environment variables to caller at program start.
///
pub fn load_config() -> Result<AppConfig, CleanerError> {
    dotenvy::dotenv().ok();
    load_from(|key| std::env::var(key).ok())
}
