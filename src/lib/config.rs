use anyhow::Context;
use dotenv::dotenv;
use std::env;

const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub server_port: String,
    pub database_url: String,
    pub log_level: String,
}

impl Config {
    /// Reads configuration from the environment, after loading `.env` if one exists.
    pub fn from_env() -> anyhow::Result<Config> {
        // a missing .env file is fine, the variables may come from the real environment
        dotenv().ok();

        let server_port = load_env("SERVER_PORT")?;
        let database_url = load_env("DATABASE_URL")?;
        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());

        Ok(Config {
            server_port,
            database_url,
            log_level,
        })
    }
}

fn load_env(key: &str) -> anyhow::Result<String> {
    env::var(key).with_context(|| format!("failed to load environment variable {}", key))
}
