use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
    pub uploads_dir: String,
    pub max_upload_mb: usize,
    pub public_rps: u32,
    pub admin_rps: u32,
    pub archive_after_days: i64,
    pub auto_archive_cron: Option<String>,
    pub final_docket_auto_approve: bool,
    pub cors_origins: Vec<String>,
    pub log_format: LogFormat,
    pub bootstrap_admin: Option<(String, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            jwt_secret: get_env("JWT_SECRET")?,
            session_ttl_hours: get_env_parse_or("SESSION_TTL_HOURS", 24)?,
            uploads_dir: env::var("UPLOADS_DIR").unwrap_or_else(|_| "./uploads".to_string()),
            max_upload_mb: get_env_parse_or("MAX_UPLOAD_MB", 10)?,
            public_rps: get_env_parse_or("PUBLIC_RPS", 20)?,
            admin_rps: get_env_parse_or("ADMIN_RPS", 50)?,
            archive_after_days: get_env_parse_or("ARCHIVE_AFTER_DAYS", 365)?,
            auto_archive_cron: env::var("AUTO_ARCHIVE_CRON")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            final_docket_auto_approve: get_env_parse_or("FINAL_DOCKET_AUTO_APPROVE", false)?,
            cors_origins: parse_list(&env::var("CORS_ORIGINS").unwrap_or_default()),
            log_format: match env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            bootstrap_admin: match (
                env::var("BOOTSTRAP_ADMIN_EMAIL"),
                env::var("BOOTSTRAP_ADMIN_PASSWORD"),
            ) {
                (Ok(email), Ok(password)) if !email.trim().is_empty() && !password.is_empty() => {
                    Some((email.trim().to_string(), password))
                }
                _ => None,
            },
        })
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        _ => Ok(default),
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_origins_are_trimmed_and_blank_entries_dropped() {
        let origins = parse_list(" https://admin.example.com, ,https://portal.example.com ");
        assert_eq!(
            origins,
            vec![
                "https://admin.example.com".to_string(),
                "https://portal.example.com".to_string()
            ]
        );
        assert!(parse_list("").is_empty());
    }
}
