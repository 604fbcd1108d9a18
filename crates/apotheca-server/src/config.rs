use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use apotheca_core::notifications::DEFAULT_CONCURRENCY;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
    "secret",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub upload_dir: PathBuf,
    pub public_url: String,
    pub notify_concurrency: usize,
    /// Empty means any origin.
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let jwt_secret = get("APOTHECA_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("APOTHECA_JWT_SECRET is unset or still a placeholder; set it in your .env file");
        }

        let port = or("APOTHECA_PORT", "3000")
            .parse()
            .context("APOTHECA_PORT must be a port number")?;
        let notify_concurrency = match get("APOTHECA_NOTIFY_CONCURRENCY") {
            Some(v) => v
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .context("APOTHECA_NOTIFY_CONCURRENCY must be a positive integer")?,
            None => DEFAULT_CONCURRENCY,
        };
        let cors_origins = or("APOTHECA_CORS_ORIGINS", "")
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            host: or("APOTHECA_HOST", "0.0.0.0"),
            port,
            db_path: or("APOTHECA_DB_PATH", "apotheca.db").into(),
            jwt_secret,
            upload_dir: or("APOTHECA_UPLOAD_DIR", "./uploads").into(),
            public_url: or("APOTHECA_PUBLIC_URL", "http://localhost:3000/uploads"),
            notify_concurrency,
            cors_origins,
        })
    }
}
