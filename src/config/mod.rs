//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

use std::{
    net::{IpAddr, SocketAddr},
    path::PathBuf,
    str::FromStr,
    time::Duration,
};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::application::pagination::MAX_RESULT_WINDOW;
use crate::infra::search::IndexNames;

pub use cli::{CliArgs, Command, ServeArgs, ServeOverrides};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "marquee";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_SEARCH_URL: &str = "http://127.0.0.1:9200";
const DEFAULT_SEARCH_TIMEOUT_SECS: u64 = 10;
const DEFAULT_ROLE_QUERY_LIMIT: u32 = 1000;
const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
const DEFAULT_CACHE_TTL_SECS: u64 = 60;
const DEFAULT_CACHE_MAX_BODY_BYTES: usize = 1024 * 1024;
const DEFAULT_CACHE_MEMORY_CAPACITY: usize = 1024;

/// Fully validated runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub search: SearchSettings,
    pub cache: CacheSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchBackend {
    Elastic,
    /// In-process store, optionally seeded from a JSON file.
    Memory,
}

#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub backend: SearchBackend,
    pub url: Url,
    pub request_timeout: Duration,
    pub role_query_limit: u32,
    pub indices: IndexNames,
    pub seed_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    Redis,
    Memory,
    None,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub backend: CacheBackend,
    pub redis_url: String,
    pub ttl_seconds: u64,
    pub max_body_bytes: usize,
    pub memory_capacity: usize,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("MARQUEE").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    search: RawSearchSettings,
    cache: RawCacheSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(backend) = overrides.search_backend.as_ref() {
            self.search.backend = Some(backend.clone());
        }
        if let Some(url) = overrides.search_url.as_ref() {
            self.search.url = Some(url.clone());
        }
        if let Some(backend) = overrides.cache_backend.as_ref() {
            self.cache.backend = Some(backend.clone());
        }
        if let Some(url) = overrides.cache_redis_url.as_ref() {
            self.cache.redis_url = Some(url.clone());
        }
        if let Some(ttl) = overrides.cache_ttl_seconds {
            self.cache.ttl_seconds = Some(ttl);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            search,
            cache,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            search: build_search_settings(search)?,
            cache: build_cache_settings(cache)?,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

    Ok(ServerSettings { addr })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_search_settings(search: RawSearchSettings) -> Result<SearchSettings, LoadError> {
    let backend = match non_empty(search.backend).as_deref() {
        None | Some("elastic") => SearchBackend::Elastic,
        Some("memory") => SearchBackend::Memory,
        Some(other) => {
            return Err(LoadError::invalid(
                "search.backend",
                format!("unknown backend `{other}`, expected `elastic` or `memory`"),
            ));
        }
    };

    let raw_url = non_empty(search.url).unwrap_or_else(|| DEFAULT_SEARCH_URL.to_string());
    let url = Url::parse(&raw_url)
        .map_err(|err| LoadError::invalid("search.url", format!("`{raw_url}`: {err}")))?;
    if url.cannot_be_a_base() {
        return Err(LoadError::invalid(
            "search.url",
            format!("`{raw_url}` is not an http(s) base URL"),
        ));
    }

    let timeout_secs = search
        .request_timeout_seconds
        .unwrap_or(DEFAULT_SEARCH_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(LoadError::invalid(
            "search.request_timeout_seconds",
            "must be greater than zero",
        ));
    }

    let role_query_limit = search.role_query_limit.unwrap_or(DEFAULT_ROLE_QUERY_LIMIT);
    if role_query_limit == 0 || u64::from(role_query_limit) > MAX_RESULT_WINDOW {
        return Err(LoadError::invalid(
            "search.role_query_limit",
            format!("must be between 1 and {MAX_RESULT_WINDOW}"),
        ));
    }

    let defaults = IndexNames::default();
    let indices = IndexNames {
        films: index_name(search.films_index, defaults.films, "search.films_index")?,
        genres: index_name(search.genres_index, defaults.genres, "search.genres_index")?,
        persons: index_name(search.persons_index, defaults.persons, "search.persons_index")?,
    };

    let seed_path = search
        .seed_path
        .filter(|path| !path.as_os_str().is_empty());

    Ok(SearchSettings {
        backend,
        url,
        request_timeout: Duration::from_secs(timeout_secs),
        role_query_limit,
        indices,
        seed_path,
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let redis_url_blank = cache.redis_url_was_blank();
    let backend = match non_empty(cache.backend).as_deref() {
        None | Some("redis") => CacheBackend::Redis,
        Some("memory") => CacheBackend::Memory,
        Some("none") => CacheBackend::None,
        Some(other) => {
            return Err(LoadError::invalid(
                "cache.backend",
                format!("unknown backend `{other}`, expected `redis`, `memory` or `none`"),
            ));
        }
    };

    let redis_url = match non_empty(cache.redis_url) {
        Some(url) => url,
        None if redis_url_blank && backend == CacheBackend::Redis => {
            return Err(LoadError::invalid(
                "cache.redis_url",
                "must not be empty when the redis backend is selected",
            ));
        }
        None => DEFAULT_REDIS_URL.to_string(),
    };

    let ttl_seconds = cache.ttl_seconds.unwrap_or(DEFAULT_CACHE_TTL_SECS);
    if ttl_seconds == 0 {
        return Err(LoadError::invalid(
            "cache.ttl_seconds",
            "must be greater than zero",
        ));
    }

    let max_body_bytes = cache.max_body_bytes.unwrap_or(DEFAULT_CACHE_MAX_BODY_BYTES);
    if max_body_bytes == 0 {
        return Err(LoadError::invalid(
            "cache.max_body_bytes",
            "must be greater than zero",
        ));
    }

    let memory_capacity = cache
        .memory_capacity
        .unwrap_or(DEFAULT_CACHE_MEMORY_CAPACITY);
    if memory_capacity == 0 {
        return Err(LoadError::invalid(
            "cache.memory_capacity",
            "must be greater than zero",
        ));
    }

    Ok(CacheSettings {
        backend,
        redis_url,
        ttl_seconds,
        max_body_bytes,
        memory_capacity,
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSearchSettings {
    backend: Option<String>,
    url: Option<String>,
    request_timeout_seconds: Option<u64>,
    role_query_limit: Option<u32>,
    films_index: Option<String>,
    genres_index: Option<String>,
    persons_index: Option<String>,
    seed_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    backend: Option<String>,
    redis_url: Option<String>,
    ttl_seconds: Option<u64>,
    max_body_bytes: Option<usize>,
    memory_capacity: Option<usize>,
}

impl RawCacheSettings {
    fn redis_url_was_blank(&self) -> bool {
        self.redis_url
            .as_deref()
            .is_some_and(|url| url.trim().is_empty())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn index_name(
    value: Option<String>,
    default: String,
    key: &'static str,
) -> Result<String, LoadError> {
    match value {
        None => Ok(default),
        Some(name) if name.trim().is_empty() => {
            Err(LoadError::invalid(key, "index name must not be empty"))
        }
        Some(name) => Ok(name.trim().to_string()),
    }
}

/// `host` is an IPv4 or IPv6 literal; IPv6 may be bracketed.
fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let literal = host
        .trim()
        .strip_prefix('[')
        .and_then(|inner| inner.strip_suffix(']'))
        .unwrap_or(host.trim());
    literal
        .parse::<IpAddr>()
        .map(|ip| SocketAddr::new(ip, port))
        .map_err(|err| format!("invalid host `{host}`: {err}"))
}
