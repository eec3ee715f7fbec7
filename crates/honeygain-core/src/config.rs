use std::time::Duration;

/// Paths of the scraper API, relative to the configured base URL.
pub mod endpoints {
    pub const ME: &str = "me";
    pub const DEVICES: &str = "devices";
    pub const STATS: &str = "stats";
    pub const STATS_TODAY: &str = "stats_today";
    pub const STATS_TODAY_JT: &str = "stats_today_jt";
    pub const NOTIFICATIONS: &str = "notifications";
    pub const BALANCES: &str = "balances";
}

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub base_url: String,
    pub scan_interval: Duration,
    pub request_timeout: Duration,
    /// Size of the history window the stats endpoint reports, used for naming.
    pub stats_window_days: u32,
}

impl ScraperConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            scan_interval: Duration::from_secs(600),
            request_timeout: Duration::from_secs(10),
            stats_window_days: 30,
        }
    }
}
