use crate::config::AlphaVantageConfig;
use crate::intraday::{intraday_path, Interval};
use reqwest::{Client, StatusCode};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Alpha Vantage intraday share-price downloader.
///
/// Downloads CSV data and saves it unchanged in the intraday data directory,
/// where [`crate::intraday::load_shareprices_intraday`] picks it up.
#[derive(Debug)]
pub struct AlphaVantageDownloader {
    client: Client,
    config: AlphaVantageConfig,
}

/// Outcome of a batch download.
#[derive(Debug, Default)]
pub struct DownloadResult {
    /// Tickers that were saved, with the file written
    pub successful: Vec<(String, PathBuf)>,
    /// Tickers that failed, with the reason
    pub failed: Vec<(String, DownloadError)>,
}

impl AlphaVantageDownloader {
    /// Creates a new downloader.
    ///
    /// # Returns
    /// Returns `Ok(AlphaVantageDownloader)` if successful, or an error if HTTP client creation fails.
    pub fn new(config: AlphaVantageConfig) -> Result<Self, DownloadError> {
        let timeout = Duration::from_secs(config.timeout_seconds);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DownloadError::ClientCreation(e.to_string()))?;

        Ok(AlphaVantageDownloader { client, config })
    }

    /// Query parameters for the full adjusted intraday history in CSV.
    pub fn intraday_query(&self, ticker: &str, interval: Interval) -> Vec<(&'static str, String)> {
        vec![
            ("function", "TIME_SERIES_INTRADAY".to_string()),
            ("symbol", ticker.to_string()),
            ("interval", interval.to_string()),
            ("adjusted", "true".to_string()),
            ("outputsize", "full".to_string()),
            ("datatype", "csv".to_string()),
            ("apikey", self.config.api_key.clone()),
        ]
    }

    /// Fetches the intraday CSV for one ticker.
    ///
    /// # Errors
    /// `NetworkError` if the request fails, `ApiError` for a non-200 status.
    pub async fn fetch_intraday(
        &self,
        ticker: &str,
        interval: Interval,
    ) -> Result<String, DownloadError> {
        let response = self
            .client
            .get(&self.config.base_url)
            .query(&self.intraday_query(ticker, interval))
            .send()
            .await
            .map_err(|e| DownloadError::NetworkError(e.to_string()))?;

        // Only a 200 carries CSV data; other 2xx codes have no usable body.
        let status = response.status();
        if status != StatusCode::OK {
            return Err(DownloadError::ApiError {
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| DownloadError::NetworkError(e.to_string()))
    }

    /// Downloads intraday prices for every ticker into `dir`.
    ///
    /// Failures are logged and recorded per ticker; the batch always runs to
    /// the end. When configured, sleeps `request_delay` between tickers (but
    /// not after the last) to stay within the API rate limit.
    pub async fn download_shareprices_intraday<T>(
        &self,
        tickers: &[T],
        interval: Interval,
        dir: &Path,
    ) -> DownloadResult
    where
        T: AsRef<str>,
    {
        let mut result = DownloadResult::default();

        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            warn!(dir = %dir.display(), error = %e, "cannot create intraday directory");
        }

        for (index, ticker) in tickers.iter().enumerate() {
            let ticker = ticker.as_ref();
            info!(ticker, %interval, "downloading intraday share-prices");

            match self.download_one(ticker, interval, dir).await {
                Ok(path) => result.successful.push((ticker.to_string(), path)),
                Err(e) => {
                    warn!(ticker, error = %e, "intraday download failed");
                    result.failed.push((ticker.to_string(), e));
                }
            }

            if self.config.sleep_between_requests && index + 1 < tickers.len() {
                tokio::time::sleep(self.config.request_delay).await;
            }
        }

        result
    }

    async fn download_one(
        &self,
        ticker: &str,
        interval: Interval,
        dir: &Path,
    ) -> Result<PathBuf, DownloadError> {
        let body = self.fetch_intraday(ticker, interval).await?;
        let path = intraday_path(dir, ticker, interval);
        tokio::fs::write(&path, body)
            .await
            .map_err(|e| DownloadError::Io(format!("{}: {}", path.display(), e)))?;
        Ok(path)
    }

    /// Returns a reference to the HTTP client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &AlphaVantageConfig {
        &self.config
    }
}

/// Errors that can occur during intraday downloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DownloadError {
    /// HTTP client creation failed
    #[error("Client creation error: {0}")]
    ClientCreation(String),
    /// Network error occurred
    #[error("Network error: {0}")]
    NetworkError(String),
    /// API returned a non-success status code
    #[error("API error: HTTP {status}")]
    ApiError { status: u16 },
    /// Saving the downloaded data failed
    #[error("I/O error: {0}")]
    Io(String),
}
