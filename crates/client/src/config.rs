use std::time::Duration;

/// Default backend base URL, including the `/api` prefix.
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default number of detail fetches in flight per results page. Equal to
/// the results page size, so a full page fans out at once.
pub const DEFAULT_DETAIL_CONCURRENCY: usize = 10;

/// Client configuration loaded from environment variables.
///
/// All fields have defaults suitable for a backend running locally.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL without a trailing slash.
    pub api_url: String,
    /// Upper bound on every request, so no view stays loading forever.
    pub request_timeout: Duration,
    /// Maximum concurrent per-image detail fetches.
    pub detail_concurrency: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            detail_concurrency: DEFAULT_DETAIL_CONCURRENCY,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default                     |
    /// |--------------------------------|-----------------------------|
    /// | `SKYSCAN_API_URL`              | `http://localhost:5000/api` |
    /// | `SKYSCAN_REQUEST_TIMEOUT_SECS` | `30`                        |
    /// | `SKYSCAN_DETAIL_CONCURRENCY`   | `10`                        |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    /// Unparseable or zero numeric values fall back to the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("SKYSCAN_API_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let timeout_secs = lookup("SKYSCAN_REQUEST_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|&v| v > 0)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let detail_concurrency = lookup("SKYSCAN_DETAIL_CONCURRENCY")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|&v| v > 0)
            .unwrap_or(DEFAULT_DETAIL_CONCURRENCY);

        Self {
            api_url,
            request_timeout: Duration::from_secs(timeout_secs),
            detail_concurrency,
        }
    }
}
