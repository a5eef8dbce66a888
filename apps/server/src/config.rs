//! Server configuration from `ADP_`-prefixed environment variables.

/// Default metrics lookback for scheduled syncs, in days.
const DEFAULT_DAYS_BACK: i64 = 30;

/// Scheduled sync interval: 4 hours.
const DEFAULT_SYNC_INTERVAL_SECS: u64 = 4 * 60 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub listen_addr: String,
    /// Path of the SQLite database file.
    pub db_path: String,
    /// Public base URL of the dashboard app, used for OAuth redirects.
    pub app_url: String,
    /// Secret signing both API bearer tokens and OAuth state tokens.
    pub auth_secret: String,
    /// Shared secret for the cron trigger route.
    pub cron_secret: Option<String>,
    /// Shared secret for the automation webhook route.
    pub webhook_secret: Option<String>,
    /// Seconds between scheduled full syncs.
    pub sync_interval_secs: u64,
    /// Companies synced concurrently during a full sweep.
    pub sync_concurrency: usize,
    /// Metrics lookback for scheduled syncs, in days.
    pub sync_days_back: i64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            listen_addr: env_or("ADP_LISTEN_ADDR", "0.0.0.0:8080"),
            db_path: env_or("ADP_DB_PATH", "adpulse.db"),
            app_url: env_or("ADP_APP_URL", "http://localhost:3000"),
            auth_secret: env_or("ADP_AUTH_SECRET", "insecure-dev-secret"),
            cron_secret: std::env::var("ADP_CRON_SECRET").ok().filter(|v| !v.is_empty()),
            webhook_secret: std::env::var("ADP_WEBHOOK_SECRET")
                .ok()
                .filter(|v| !v.is_empty()),
            sync_interval_secs: env_parse("ADP_SYNC_INTERVAL_SECS", DEFAULT_SYNC_INTERVAL_SECS),
            sync_concurrency: env_parse("ADP_SYNC_CONCURRENCY", 4),
            sync_days_back: env_parse("ADP_SYNC_DAYS_BACK", DEFAULT_DAYS_BACK),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
