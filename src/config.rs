use clap::Parser;
use once_cell::sync::Lazy;

/// Issued tokens are valid for one day.
pub const JWT_EXPIRY_SECONDS: i64 = 86400;

/// Course cards per catalog page.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

pub static APP_CONFIG: Lazy<Config> = Lazy::new(Config::parse);

#[derive(Debug, Parser, Clone)]
pub struct Config {
    #[clap(long, env, default_value_t = 8080)]
    pub port: u16,

    #[clap(long, env, default_value_t = true)]
    pub swagger_enabled: bool,

    #[clap(long, env)]
    pub log_level: String,

    #[clap(long, env)]
    pub database_url: String,

    #[clap(long, env)]
    pub jwt_secret: String,

    #[clap(long, env)]
    pub admin_email: String,

    #[clap(long, env, default_value = "*")]
    pub cors_allowed_origins: String,

    #[clap(long, env, default_value = "local")]
    pub app_env: String,

    #[clap(long, env, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: u64,

    #[clap(long, env, default_value_t = 60)]
    pub catalog_cache_ttl_secs: u64,

    #[clap(long, env, default_value_t = 10)]
    pub request_timeout_secs: u64,
}
