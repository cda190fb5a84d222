use thiserror::Error;

/// Application-wide error types.
///
/// This enum represents all errors that can surface while loading job
/// advertisement snapshots, reading configuration, or persisting the search
/// term list. The filter and aggregation functions themselves never fail;
/// they degrade to empty results instead.
///
/// # Error Conversion
///
/// Most errors automatically convert from their source types using the `#[from]` attribute:
/// - `sqlx::Error` → `AppError::DatabaseError`
/// - `serde_json::Error` → `AppError::SerializationError`
/// - `std::io::Error` → `AppError::IoError`
///
/// # Examples
///
/// ```no_run
/// use jobscope_core::error::AppError;
///
/// fn example() -> Result<(), AppError> {
///     Err(AppError::Generic("Something went wrong".to_string()))
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Database operation failed.
    ///
    /// Wraps errors from the SQLite snapshot reader and the PostgreSQL
    /// term-list mirror.
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    /// HTTP client request failed.
    #[error("API Client error: {0}")]
    ClientError(String),

    /// JSON serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Reading or writing a local file failed.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Configuration file is missing or malformed.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// GeoJSON boundary file could not be interpreted.
    #[error("Invalid GeoJSON: {0}")]
    InvalidGeoJson(String),

    /// The job advertisement table could not be loaded.
    ///
    /// This is the terminal "no data" condition. Callers report it once and
    /// stop; there is no retry at this level.
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// API response contained no data.
    #[error("Empty response from API")]
    EmptyResponse,

    /// Network or connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request timeout.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded. Please wait and try again.")]
    RateLimitExceeded,

    /// Generic application error for cases not covered by specific variants.
    ///
    /// Use this sparingly - prefer creating specific error variants
    /// for better error handling and debugging.
    #[error("Error: {0}")]
    Generic(String),
}

impl AppError {
    /// Returns a user-friendly error message suitable for CLI output.
    pub fn user_message(&self) -> String {
        match self {
            AppError::DatabaseError(e) => {
                let text = e.to_string();
                if text.contains("no such table") {
                    "The snapshot does not contain the job_analysis table.\n   Try: jobscope fetch --force".to_string()
                } else if text.contains("connection") {
                    "Cannot connect to database. Is PostgreSQL running?\n   Check your DATABASE_URL environment variable.".to_string()
                } else {
                    format!("Database error: {}", e)
                }
            }
            AppError::ClientError(msg) => {
                if msg.contains("timeout") || msg.contains("timed out") {
                    "Request timed out. The snapshot host may be slow or unreachable.\n   Try again later or check the snapshot URL.".to_string()
                } else if msg.contains("connect") {
                    format!("Cannot connect to snapshot host: {}\n   Check your internet connection and the snapshot URL.", msg)
                } else {
                    format!("API error: {}", msg)
                }
            }
            AppError::ConfigError(msg) => {
                format!(
                    "Configuration error: {}\n   Example: [source]\n   snapshot_path = \"/tmp/job_analysis.db\"",
                    msg
                )
            }
            AppError::DataUnavailable(reason) => {
                format!(
                    "Job advertisement data could not be loaded: {}\n   Try: jobscope fetch",
                    reason
                )
            }
            AppError::NetworkError(msg) => {
                format!("Network error: {}\n   Check your internet connection.", msg)
            }
            AppError::Timeout(secs) => {
                format!("Request timed out after {} seconds.\n   The server may be overloaded. Try again later.", secs)
            }
            AppError::RateLimitExceeded => {
                "Too many requests. Please wait a moment and try again.".to_string()
            }
            AppError::EmptyResponse => {
                "The snapshot host returned no data. It may be temporarily unavailable.".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Returns true if this error is retryable.
    ///
    /// # Examples
    ///
    /// ```
    /// use jobscope_core::error::AppError;
    ///
    /// let err = AppError::NetworkError("connection reset".to_string());
    /// assert!(err.is_retryable());
    ///
    /// let err = AppError::DataUnavailable("missing file".to_string());
    /// assert!(!err.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::NetworkError(_)
                | AppError::Timeout(_)
                | AppError::RateLimitExceeded
                | AppError::ClientError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::DataUnavailable("snapshot missing".to_string());
        assert_eq!(err.to_string(), "Data unavailable: snapshot missing");
    }

    #[test]
    fn test_generic_error() {
        let err = AppError::Generic("Something went wrong".to_string());
        assert_eq!(err.to_string(), "Error: Something went wrong");
    }

    #[test]
    fn test_empty_response_error() {
        let err = AppError::EmptyResponse;
        assert_eq!(err.to_string(), "Empty response from API");
    }

    #[test]
    fn test_user_message_data_unavailable() {
        let err = AppError::DataUnavailable("no such file".to_string());
        let msg = err.user_message();
        assert!(msg.contains("could not be loaded"));
        assert!(msg.contains("jobscope fetch"));
    }

    #[test]
    fn test_user_message_config() {
        let err = AppError::ConfigError("expected a table".to_string());
        assert!(err.user_message().contains("[source]"));
    }

    #[test]
    fn test_error_from_serde() {
        let json = "{ invalid json }";
        let result: Result<serde_json::Value, _> = serde_json::from_str(json);
        let serde_err = result.unwrap_err();
        let app_err: AppError = serde_err.into();
        assert!(matches!(app_err, AppError::SerializationError(_)));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::IoError(_)));
    }

    #[test]
    fn test_user_message_database_connection() {
        let err = AppError::DatabaseError(sqlx::Error::PoolTimedOut);
        let msg = err.user_message();
        assert!(msg.contains("Cannot connect to database") || msg.contains("Database error"));
    }

    #[test]
    fn test_is_retryable() {
        assert!(AppError::NetworkError("timeout".to_string()).is_retryable());
        assert!(AppError::Timeout(30).is_retryable());
        assert!(AppError::RateLimitExceeded.is_retryable());
        assert!(!AppError::InvalidGeoJson("bad".to_string()).is_retryable());
        assert!(!AppError::ConfigError("bad".to_string()).is_retryable());
    }

    #[test]
    fn test_timeout_error() {
        let err = AppError::Timeout(30);
        assert_eq!(err.to_string(), "Request timed out after 30 seconds");
    }
}
