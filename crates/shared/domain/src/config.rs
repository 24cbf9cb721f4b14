use crate::constants::{
    DEFAULT_ARCHIVE_NAME, DEFAULT_BASE_NAME, DEFAULT_EXCLUDED_COLUMNS, DEFAULT_MAX_DOCUMENTS,
};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level application configuration.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfigInner {
    pub server: ServerConfig,
    pub batch: BatchConfig,
    pub logging: LoggingConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into handlers.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(flatten, default)]
    inner: Arc<ApiConfigInner>,
}

impl Deref for ApiConfig {
    type Target = ApiConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ApiConfig {
    fn deref_mut(&mut self) -> &mut ApiConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub ssl: Option<SslConfig>,
    /// Largest accepted request body (template + sheet + multipart overhead).
    pub body_limit_bytes: usize,
}

/// TLS certificate/key paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Which XML parts of a `.docx` receive substitutions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplaceScope {
    /// Main document body, including every table cell.
    #[default]
    Body,
    /// Body plus headers, footers, footnotes and endnotes.
    All,
}

/// Batch generation limits and naming policy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Hard cap on generated documents per request; extra sheet rows are ignored.
    pub max_documents: usize,
    pub base_name: String,
    /// Column-name substrings (case-insensitive) kept out of output file names.
    pub excluded_columns: Vec<String>,
    pub archive_name: String,
    pub scope: ReplaceScope,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogRotation {
    Minutely,
    Hourly,
    #[default]
    Daily,
    Never,
}

/// Logging setup; `RUST_LOG` still wins over `level`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Extra filter directives, e.g. `docfill_batch=debug,hyper=warn`.
    pub directives: Option<String>,
    pub console: bool,
    /// Directory for rolling log files; console only when unset.
    pub dir: Option<PathBuf>,
    pub json: bool,
    pub rotation: LogRotation,
    pub max_files: usize,
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 4583,
            ssl: None,
            body_limit_bytes: 25 * 1024 * 1024,
        }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("cert.pem"), key: PathBuf::from("key.pem") }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_documents: DEFAULT_MAX_DOCUMENTS,
            base_name: DEFAULT_BASE_NAME.to_owned(),
            excluded_columns: DEFAULT_EXCLUDED_COLUMNS.iter().map(|s| (*s).to_owned()).collect(),
            archive_name: DEFAULT_ARCHIVE_NAME.to_owned(),
            scope: ReplaceScope::Body,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            directives: None,
            console: true,
            dir: None,
            json: false,
            rotation: LogRotation::Daily,
            max_files: 10,
        }
    }
}
