use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    /// Public base URL of this service, used to absolutize media paths
    /// found in question-bank cells.
    pub public_base_url: String,
    /// Path prefix that marks a cell value as already service-relative.
    pub static_prefix: String,
    /// Default directory (under the base URL) for bare image file names.
    pub media_dir: String,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            public_base_url: get_env("PUBLIC_BASE_URL")?,
            static_prefix: env::var("STATIC_PREFIX").unwrap_or_else(|_| "static/".to_string()),
            media_dir: env::var("MEDIA_DIR")
                .unwrap_or_else(|_| "static/mocktest_images".to_string()),
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
