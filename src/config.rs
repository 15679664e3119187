use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use anyhow::{anyhow, bail, Context};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "development" | "dev" | "local" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(anyhow!("unknown environment {s}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BlobConfig {
    pub base_url: String,
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct PaypalConfig {
    pub api_base: String,
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub environment: Environment,
    pub data_dir: PathBuf,
    pub uploads_dir: PathBuf,
    /// Required in production, where the document and uploads live in the blob store.
    pub blob: Option<BlobConfig>,
    pub paypal: Option<PaypalConfig>,
    /// Without a key the canned generator is used.
    pub ai: Option<AiConfig>,
    pub session_minutes: i64,
    pub bcrypt_cost: u32,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let environment = try_load("APP_ENV", "development")?;

        let blob = match (var("BLOB_BASE_URL"), var("BLOB_READ_WRITE_TOKEN")) {
            (Some(base_url), Some(token)) => Some(BlobConfig { base_url, token }),
            _ => None,
        };
        if environment == Environment::Production && blob.is_none() {
            bail!("APP_ENV=production requires BLOB_BASE_URL and BLOB_READ_WRITE_TOKEN");
        }

        let paypal = match (var("PAYPAL_CLIENT_ID"), var("PAYPAL_CLIENT_SECRET")) {
            (Some(client_id), Some(client_secret)) => Some(PaypalConfig {
                api_base: try_load("PAYPAL_API_BASE", "https://api-m.sandbox.paypal.com")?,
                client_id,
                client_secret,
            }),
            _ => {
                warn!("PayPal credentials not set, order endpoints will fail upstream");
                None
            }
        };

        let ai = match var("AI_API_KEY") {
            Some(api_key) => Some(AiConfig {
                api_url: try_load("AI_API_URL", "https://api.openai.com/v1/chat/completions")?,
                api_key,
                model: try_load("AI_MODEL", "gpt-4o-mini")?,
            }),
            None => None,
        };

        Ok(Self {
            port: try_load("PORT", "8080")?,
            environment,
            data_dir: try_load("DATA_DIR", "data")?,
            uploads_dir: try_load("UPLOADS_DIR", "public/uploads")?,
            blob,
            paypal,
            ai,
            session_minutes: try_load("SESSION_MINUTES", "60")?,
            bcrypt_cost: try_load("BCRYPT_COST", "10")?,
            max_upload_bytes: try_load("MAX_UPLOAD_BYTES", "10485760")?,
        })
    }

    /// Development configuration rooted at the given directories, with no external providers.
    pub fn local(data_dir: impl Into<PathBuf>, uploads_dir: impl Into<PathBuf>) -> Self {
        Self {
            port: 8080,
            environment: Environment::Development,
            data_dir: data_dir.into(),
            uploads_dir: uploads_dir.into(),
            blob: None,
            paypal: None,
            ai: None,
            session_minutes: 60,
            bcrypt_cost: 10,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn try_load<T: FromStr>(key: &str, default: &str) -> anyhow::Result<T>
where
    T::Err: Display,
{
    let value = var(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    value
        .parse()
        .map_err(|e| anyhow!("{e}"))
        .with_context(|| format!("invalid {key} value: {value}"))
}
