//! Configuration for data locations and the intraday quote API.
//!
//! Values are passed explicitly to the loaders and the downloader; nothing
//! is stored in process-wide state.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "FINDATA_DATA_DIR";

/// Environment variable overriding the intraday data directory.
pub const INTRADAY_DIR_ENV: &str = "FINDATA_INTRADAY_DIR";

/// Default location of the Alpha Vantage API key file.
pub const DEFAULT_API_KEY_PATH: &str = "~/alphavantage_api_key.txt";

/// Default Alpha Vantage query endpoint.
pub const ALPHA_VANTAGE_URL: &str = "https://www.alphavantage.co/query";

/// Where the data files are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataConfig {
    /// Directory holding price, fundamental and macro data files (default: "data/")
    pub data_dir: PathBuf,
    /// Directory holding intraday share-price files (default: "data/intraday/")
    pub intraday_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig::new("data")
    }
}

impl DataConfig {
    /// Uses `data_dir` and its `intraday` subdirectory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let intraday_dir = data_dir.join("intraday");
        DataConfig {
            data_dir,
            intraday_dir,
        }
    }

    /// Builds the configuration from `FINDATA_DATA_DIR` and
    /// `FINDATA_INTRADAY_DIR`, falling back to the defaults.
    pub fn from_env() -> Self {
        DataConfig::from_vars(|name| env::var_os(name))
    }

    /// Builds the configuration from variables returned by `lookup`.
    ///
    /// An intraday directory given explicitly replaces the
    /// `<data_dir>/intraday` default.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let mut config = lookup(DATA_DIR_ENV)
            .map(DataConfig::new)
            .unwrap_or_default();
        if let Some(intraday_dir) = lookup(INTRADAY_DIR_ENV) {
            config.intraday_dir = PathBuf::from(intraday_dir);
        }
        config
    }
}

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The API key file could not be read.
    #[error("cannot read API key file {}: {source}", path.display())]
    ApiKeyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The API key file has an empty first line.
    #[error("API key file {} is empty", path.display())]
    EmptyApiKey { path: PathBuf },
}

/// Configuration for the Alpha Vantage intraday downloader.
#[derive(Debug, Clone, PartialEq)]
pub struct AlphaVantageConfig {
    pub api_key: String,
    /// Query endpoint (default: Alpha Vantage production URL)
    pub base_url: String,
    /// Request timeout in seconds (default: 30)
    pub timeout_seconds: u64,
    /// Pause between tickers (default: 13s, free accounts allow 5 calls per minute)
    pub request_delay: Duration,
    /// Whether to pause between tickers at all (default: true)
    pub sleep_between_requests: bool,
}

impl AlphaVantageConfig {
    /// Creates a configuration with default settings for the given key.
    pub fn new(api_key: impl Into<String>) -> Self {
        AlphaVantageConfig {
            api_key: api_key.into(),
            base_url: ALPHA_VANTAGE_URL.to_string(),
            timeout_seconds: 30,
            request_delay: Duration::from_secs(13),
            sleep_between_requests: true,
        }
    }

    /// Reads the API key from the first line of a text file.
    ///
    /// A leading `~` in the path is expanded to the home directory.
    pub fn from_key_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = expand_home(path.as_ref());
        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::ApiKeyFile {
            path: path.clone(),
            source,
        })?;

        let key = contents.lines().next().unwrap_or_default().trim();
        if key.is_empty() {
            return Err(ConfigError::EmptyApiKey { path });
        }
        Ok(AlphaVantageConfig::new(key))
    }
}

/// Expands a leading `~` using `HOME`. Other paths are returned unchanged.
fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(rest),
        None => path.to_path_buf(),
    }
}
