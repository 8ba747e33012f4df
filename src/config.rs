use serde::Deserialize;

/// Insecure fallback credentials used when nothing is configured.
/// A production deployment must override both via config file or
/// environment (PICOGATE__PICO__APP_ID / PICOGATE__PICO__APP_SECRET).
pub const FALLBACK_APP_ID: &str = "pico_app_id_unset";
pub const FALLBACK_APP_SECRET: &str = "pico_app_secret_unset";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub pico: PicoConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PicoConfig {
    pub app_id: String,
    pub app_secret: String,
    /// Payment verification endpoint of the Pico platform.
    pub verify_url: String,
    /// Outbound verification request timeout.
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Age past which dedup entries become eligible for eviction.
    pub ttl_hours: u64,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        // Load .env file if it exists (for environment variable overrides)
        dotenvy::dotenv().ok();

        // Defaults, then optional config.yml, then environment overrides
        let config = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080_i64)?
            .set_default("pico.app_id", FALLBACK_APP_ID)?
            .set_default("pico.app_secret", FALLBACK_APP_SECRET)?
            .set_default(
                "pico.verify_url",
                "https://platform.picovr.com/payment/v1/verify",
            )?
            .set_default("pico.request_timeout_ms", 8000_i64)?
            .set_default("cache.ttl_hours", 24_i64)?
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("PICOGATE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// True when either Pico credential is still a fallback default.
    pub fn uses_fallback_credentials(&self) -> bool {
        self.pico.app_id == FALLBACK_APP_ID || self.pico.app_secret == FALLBACK_APP_SECRET
    }
}
