use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api_base_url: String,
    pub session_file: String,
    pub request_timeout_secs: u64,
    pub tick_interval_ms: u64,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        // Determine environment (defaults to dev)
        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // Build configuration from config/*.toml + ENV overrides
        let config_builder = config::Config::builder()
            .add_source(
                config::File::with_name(&format!("config/{}", env)).required(false), // Allow missing config file, fallback to ENV
            )
            // Override with environment variables (prefix: APP_)
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        let settings = config_builder.build()?;

        let api_base_url = settings
            .get_string("api.base_url")
            .or_else(|_| env::var("BANANA_API_URL"))
            .unwrap_or_else(|_| "http://localhost:8000".to_string());

        let session_file = settings
            .get_string("client.session_file")
            .or_else(|_| env::var("BANANA_SESSION_FILE"))
            .unwrap_or_else(|_| ".banana-session.json".to_string());

        let request_timeout_secs = settings
            .get_string("client.request_timeout_secs")
            .ok()
            .or_else(|| env::var("BANANA_REQUEST_TIMEOUT_SECS").ok())
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(5);

        let tick_interval_ms = settings
            .get_string("client.tick_interval_ms")
            .ok()
            .or_else(|| env::var("BANANA_TICK_INTERVAL_MS").ok())
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(1000);

        Ok(Config {
            api_base_url,
            session_file,
            request_timeout_secs,
            tick_interval_ms,
        })
    }
}
