use std::{env, ops::RangeInclusive, path::PathBuf, str::FromStr, time::Duration};

/// Accepted retention window, in days.
pub const RETENTION_DAYS_RANGE: RangeInclusive<i64> = 1..=3650;
/// Accepted page sizes; matches what `PageRequest` validates.
pub const PAGE_SIZE_RANGE: RangeInclusive<usize> = 1..=100;

/// Parses `raw`, falling back to `default` when it is missing, unparsable or
/// outside `range`.
fn parse_bounded<T>(raw: Option<String>, range: RangeInclusive<T>, default: T) -> T
where
    T: FromStr + PartialOrd,
{
    raw.and_then(|value| value.trim().parse().ok())
        .filter(|value| range.contains(value))
        .unwrap_or(default)
}

#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub results_retention_days: i64,
    pub results_cache_key: String,
    pub meeting_cache_key: String,
    pub results_page_size: usize,
    pub log_level: String,
    pub storage_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000/api".to_string()),
            request_timeout: Duration::from_secs(
                env::var("REQUEST_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            results_retention_days: parse_bounded(
                env::var("RESULTS_RETENTION_DAYS").ok(),
                RETENTION_DAYS_RANGE,
                30,
            ),
            results_cache_key: env::var("RESULTS_CACHE_KEY")
                .unwrap_or_else(|_| "quizResults".to_string()),
            meeting_cache_key: env::var("MEETING_CACHE_KEY")
                .unwrap_or_else(|_| "meetingRecords".to_string()),
            results_page_size: parse_bounded(
                env::var("RESULTS_PAGE_SIZE").ok(),
                PAGE_SIZE_RANGE,
                10,
            ),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            storage_path: env::var("STORAGE_PATH").ok().map(PathBuf::from),
        }
    }

    /// Base URL with any trailing slash removed, ready for path joining.
    pub fn api_base(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }

    pub fn test_config() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000/api/".to_string(),
            request_timeout: Duration::from_secs(5),
            results_retention_days: 30,
            results_cache_key: "quizResults".to_string(),
            meeting_cache_key: "meetingRecords".to_string(),
            results_page_size: 10,
            log_level: "debug".to_string(),
            storage_path: None,
        }
    }
}
