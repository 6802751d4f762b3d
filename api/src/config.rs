use std::env;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is not a valid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub mongodb_uri: String,
    pub mongodb_database: String,
    /// Base URL of an OpenAI-compatible chat completion API
    pub ai_api_url: String,
    /// AI features are disabled when no key is configured
    pub ai_api_key: Option<String>,
    pub ai_model: String,
    /// Maximum AI calls per user per UTC day
    pub ai_daily_limit: u32,
    /// Run new posts through AI moderation before saving
    pub moderate_posts: bool,
    /// Microsoft Graph client credentials (directory search)
    pub graph_tenant_id: Option<String>,
    pub graph_client_id: Option<String>,
    pub graph_client_secret: Option<String>,
    /// HS256 shared secret, used when no public key is configured
    pub jwt_secret: Option<String>,
    /// RS256 public key (PEM)
    pub jwt_public_key_pem: Option<String>,
    pub jwt_issuer: Option<String>,
    pub jwt_audience: Option<String>,
    pub admin_role: String,
    pub cache_ttl_secs: u64,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            mongodb_uri: env::var("MONGODB_URI")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongodb_database: env::var("MONGODB_DATABASE").unwrap_or_else(|_| "ibbs".to_string()),
            ai_api_url: env::var("AI_API_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            ai_api_key: non_empty("AI_API_KEY"),
            ai_model: env::var("AI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            ai_daily_limit: parse_or("AI_DAILY_LIMIT", 50)?,
            moderate_posts: parse_or("MODERATE_POSTS", false)?,
            graph_tenant_id: non_empty("GRAPH_TENANT_ID"),
            graph_client_id: non_empty("GRAPH_CLIENT_ID"),
            graph_client_secret: non_empty("GRAPH_CLIENT_SECRET"),
            jwt_secret: non_empty("JWT_SECRET"),
            jwt_public_key_pem: non_empty("JWT_PUBLIC_KEY_PEM"),
            jwt_issuer: non_empty("JWT_ISSUER"),
            jwt_audience: non_empty("JWT_AUDIENCE"),
            admin_role: env::var("ADMIN_ROLE").unwrap_or_else(|_| "admin".to_string()),
            cache_ttl_secs: parse_or("CACHE_TTL_SECS", 300)?,
            port: parse_or("PORT", 8080)?,
        };

        if config.jwt_secret.is_none() && config.jwt_public_key_pem.is_none() {
            return Err(ConfigError::Missing("JWT_SECRET or JWT_PUBLIC_KEY_PEM"));
        }

        Ok(config)
    }

    /// Check if the AI completion API is configured
    pub fn ai_enabled(&self) -> bool {
        self.ai_api_key.is_some()
    }

    /// Check if Microsoft Graph credentials are configured
    pub fn directory_enabled(&self) -> bool {
        self.graph_tenant_id.is_some()
            && self.graph_client_id.is_some()
            && self.graph_client_secret.is_some()
    }
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}
