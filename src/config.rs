use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Krishi";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default HTTP bind port, overridable via `KRISHI_PORT`.
pub const DEFAULT_PORT: u16 = 5000;

/// Timeout for outbound weather/market API calls, in seconds.
pub const GATEWAY_TIMEOUT_SECS: u64 = 10;

/// Get the application data directory
/// ~/Krishi/ on all platforms (user-visible, holds the analysis log)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Krishi")
}

/// Path of the SQLite analysis log.
pub fn db_path() -> PathBuf {
    app_data_dir().join("krishi.db")
}

/// HTTP bind port from `KRISHI_PORT`, falling back to the default.
pub fn bind_port() -> u16 {
    std::env::var("KRISHI_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

/// OpenWeatherMap API key. The `demo_key` placeholder never authenticates,
/// so without a real key every forecast request serves the demo dataset.
pub fn openweather_api_key() -> String {
    std::env::var("OPENWEATHER_API_KEY").unwrap_or_else(|_| "demo_key".to_string())
}

/// Agmarknet (data.gov.in) API key for mandi prices.
pub fn agmarknet_api_key() -> String {
    std::env::var("AGMARKNET_API_KEY").unwrap_or_else(|_| "demo_key".to_string())
}

/// Default tracing filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "info,krishi=debug"
}
