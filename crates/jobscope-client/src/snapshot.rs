use jobscope_core::config::HttpConfig;
use jobscope_core::error::AppError;
use jobscope_core::snapshot::{content_hash, needs_refresh, RefreshReport};
use reqwest::{Client, StatusCode};
use std::path::Path;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use url::Url;

/// First bytes of every SQLite 3 database file.
const SQLITE_HEADER: &[u8] = b"SQLite format 3\0";

/// Returns true if `bytes` look like an SQLite database.
///
/// File hosts answer some requests with an HTML interstitial instead of the
/// file, with status 200.
pub fn is_sqlite(bytes: &[u8]) -> bool {
    bytes.starts_with(SQLITE_HEADER)
}

/// HTTP client for the published job-advertisement snapshot.
///
/// # Examples
///
/// ```no_run
/// use jobscope_client::SnapshotClient;
/// use jobscope_core::HttpConfig;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let url = "https://example.org/job_analysis.db";
/// let client = SnapshotClient::new(url, &HttpConfig::default())?;
/// let report = client.refresh(Path::new("job_analysis.db"), false).await?;
/// println!("{:?}: {} bytes", report.outcome, report.bytes);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SnapshotClient {
    client: Client,
    url: Url,
    config: HttpConfig,
}

impl SnapshotClient {
    /// Creates a client for the snapshot at `url_str`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidUrl` if the URL is malformed.
    /// Returns `AppError::ClientError` if the HTTP client cannot be built.
    pub fn new(url_str: &str, config: &HttpConfig) -> Result<Self, AppError> {
        let url = Url::parse(url_str).map_err(|_| AppError::InvalidUrl(url_str.to_string()))?;

        let client = Client::builder()
            .user_agent("Jobscope/0.1 (snapshot-fetch)")
            .timeout(config.timeout())
            .build()
            .map_err(|e| AppError::ClientError(e.to_string()))?;

        Ok(Self {
            client,
            url,
            config: config.clone(),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Downloads the snapshot bytes.
    ///
    /// # Errors
    ///
    /// Returns `AppError::EmptyResponse` for an empty body and
    /// `AppError::ClientError` when the body is not an SQLite database.
    pub async fn download(&self) -> Result<Vec<u8>, AppError> {
        let resp = self.request_with_retry().await?;
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| AppError::ClientError(e.to_string()))?;

        if bytes.is_empty() {
            return Err(AppError::EmptyResponse);
        }
        if !is_sqlite(&bytes) {
            return Err(AppError::ClientError(format!(
                "content from {} is not an SQLite database",
                self.url
            )));
        }

        debug!("Downloaded {} bytes from {}", bytes.len(), self.url);
        Ok(bytes.to_vec())
    }

    /// Downloads the snapshot and stores it at `path` if it changed.
    ///
    /// With `force` the file is rewritten even when the content is unchanged.
    pub async fn refresh(&self, path: &Path, force: bool) -> Result<RefreshReport, AppError> {
        let bytes = self.download().await?;
        store_snapshot(path, &bytes, force).await
    }

    /// Makes an HTTP GET request with automatic retry on transient failures.
    ///
    /// Retries network errors, timeouts, server errors (5xx) and rate
    /// limiting (429), backing off between attempts.
    async fn request_with_retry(&self) -> Result<reqwest::Response, AppError> {
        let max_retries = self.config.max_retries.max(1);
        let base_delay = self.config.retry_base_delay();
        let mut last_error = AppError::Generic("No attempts made".to_string());

        for attempt in 1..=max_retries {
            match self.client.get(self.url.clone()).send().await {
                Ok(resp) => {
                    let status = resp.status();

                    if status.is_success() {
                        return Ok(resp);
                    }

                    if status == StatusCode::TOO_MANY_REQUESTS {
                        last_error = AppError::RateLimitExceeded;
                        if attempt < max_retries {
                            sleep(rate_limit_delay(base_delay, attempt)).await;
                            continue;
                        }
                        return Err(last_error);
                    }

                    if status.is_server_error() {
                        last_error = AppError::ClientError(format!(
                            "Server error: HTTP {}",
                            status.as_u16()
                        ));
                        if attempt < max_retries {
                            warn!(
                                "Attempt {} failed with HTTP {}, retrying",
                                attempt,
                                status.as_u16()
                            );
                            sleep(retry_delay(base_delay, attempt)).await;
                            continue;
                        }
                        return Err(last_error);
                    }

                    // Client error (4xx except 429) - don't retry
                    return Err(AppError::ClientError(format!(
                        "HTTP {} from {}",
                        status.as_u16(),
                        self.url
                    )));
                }
                Err(e) => {
                    let transient = e.is_timeout() || e.is_connect();
                    last_error = if e.is_timeout() {
                        AppError::Timeout(self.config.timeout_secs)
                    } else if e.is_connect() {
                        AppError::NetworkError(format!("Connection failed: {}", e))
                    } else {
                        AppError::ClientError(e.to_string())
                    };

                    if attempt < max_retries && transient {
                        warn!("Attempt {} failed: {}, retrying", attempt, e);
                        sleep(retry_delay(base_delay, attempt)).await;
                        continue;
                    }
                    return Err(last_error);
                }
            }
        }

        Err(last_error)
    }
}

/// Linear backoff for server and network errors.
fn retry_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(attempt)
}

/// Exponential backoff for rate limiting, capped instead of overflowing.
fn rate_limit_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2_u32.saturating_pow(attempt))
}

/// Writes `bytes` to `path` unless the file already holds the same content.
///
/// The file is written to a sibling temporary path first and renamed into
/// place, so readers never see a partial snapshot.
pub async fn store_snapshot(
    path: &Path,
    bytes: &[u8],
    force: bool,
) -> Result<RefreshReport, AppError> {
    let hash = content_hash(bytes);

    let existing_hash = match tokio::fs::read(path).await {
        Ok(existing) => Some(content_hash(&existing)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => return Err(e.into()),
    };

    let decision = needs_refresh(existing_hash.as_deref(), &hash);
    debug!("Snapshot {}: {}", path.display(), decision.reason);

    if decision.outcome.needs_write() || force {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let partial = path.with_extension("part");
        tokio::fs::write(&partial, bytes).await?;
        tokio::fs::rename(&partial, path).await?;
        info!(
            "Wrote snapshot to {} ({} bytes)",
            path.display(),
            bytes.len()
        );
    }

    Ok(RefreshReport {
        outcome: decision.outcome,
        bytes: bytes.len(),
        hash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobscope_core::SnapshotOutcome;

    fn sqlite_bytes(payload: &[u8]) -> Vec<u8> {
        let mut bytes = SQLITE_HEADER.to_vec();
        bytes.extend_from_slice(payload);
        bytes
    }

    #[test]
    fn test_new_with_valid_url() {
        let url = "https://example.org/snapshot.db";
        let client = SnapshotClient::new(url, &HttpConfig::default());
        assert!(client.is_ok());
        assert_eq!(client.unwrap().url().as_str(), url);
    }

    #[test]
    fn test_new_with_invalid_url() {
        let result = SnapshotClient::new("not-a-valid-url", &HttpConfig::default());
        assert!(matches!(result, Err(AppError::InvalidUrl(_))));
    }

    #[test]
    fn test_is_sqlite() {
        assert!(is_sqlite(&sqlite_bytes(b"rest")));
        assert!(!is_sqlite(b"<!DOCTYPE html><html>"));
        assert!(!is_sqlite(b""));
    }

    #[test]
    fn test_retry_delays_grow() {
        let base = Duration::from_millis(500);
        assert_eq!(retry_delay(base, 3), Duration::from_millis(1500));
        assert_eq!(rate_limit_delay(base, 1), Duration::from_secs(1));
        assert_eq!(rate_limit_delay(base, 3), Duration::from_secs(4));
    }

    #[test]
    fn test_rate_limit_delay_saturates_for_many_attempts() {
        let base = Duration::from_millis(500);
        let capped = base.saturating_mul(u32::MAX);
        assert_eq!(rate_limit_delay(base, 32), capped);
        assert_eq!(rate_limit_delay(base, 40), capped);
        assert_eq!(rate_limit_delay(Duration::MAX, 2), Duration::MAX);
        assert_eq!(retry_delay(Duration::MAX, u32::MAX), Duration::MAX);
    }

    #[tokio::test]
    async fn test_store_snapshot_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("job_analysis.db");
        let v1 = sqlite_bytes(b"v1");
        let v2 = sqlite_bytes(b"v2");

        let first = store_snapshot(&path, &v1, false).await.unwrap();
        assert_eq!(first.outcome, SnapshotOutcome::Created);
        assert_eq!(std::fs::read(&path).unwrap(), v1);

        let same = store_snapshot(&path, &v1, false).await.unwrap();
        assert_eq!(same.outcome, SnapshotOutcome::Unchanged);
        assert_eq!(same.hash, first.hash);

        let changed = store_snapshot(&path, &v2, false).await.unwrap();
        assert_eq!(changed.outcome, SnapshotOutcome::Updated);
        assert_eq!(std::fs::read(&path).unwrap(), v2);
        assert!(!path.with_extension("part").exists());
    }

    #[tokio::test]
    async fn test_store_snapshot_force_rewrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job_analysis.db");
        let v1 = sqlite_bytes(b"v1");
        store_snapshot(&path, &v1, false).await.unwrap();

        let forced = store_snapshot(&path, &v1, true).await.unwrap();
        assert_eq!(forced.outcome, SnapshotOutcome::Unchanged);
        assert!(path.exists());
    }
}
