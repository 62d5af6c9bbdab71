//! Runtime configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! - `APP_ENV` - `development` (default) or `production`
//! - `DATABASE_URL` - `PostgreSQL` connection string (required for the postgres store)
//! - `STORE_BACKEND` - `postgres` (default) or `memory`
//! - `DATABASE_MAX_CONNECTIONS` - pool size (default: 5)
//! - `JWT_SECRET` - token signing secret (required in production)
//! - `JWT_EXPIRES_IN_HOURS` - token lifetime (default: 168)
//! - `BCRYPT_COST` - password hashing work factor (default: 12)
//! - `HOST` / `PORT` - bind address (default: 0.0.0.0:5000)
//! - `CLIENT_URL` - extra CORS origin for the storefront frontend
//! - `COOKIE_SECURE` - mark the auth cookie `Secure` (default: false)
//! - `PAYMENT_PROVIDER` - `simulated` (default) or `stripe`
//! - `STRIPE_SECRET_KEY` - required when `PAYMENT_PROVIDER=stripe`

use std::net::{IpAddr, SocketAddr};

use thiserror::Error;

const DEV_JWT_SECRET: &str = "dev-secret-key-change-me";

/// Origins always allowed by CORS (local frontend dev servers)
pub const DEFAULT_CORS_ORIGINS: [&str; 6] = [
    "http://localhost:3000",
    "http://localhost:5500",
    "http://localhost:8080",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:5500",
    "http://127.0.0.1:8080",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres { url: String, max_connections: u32 },
    Memory,
}

#[derive(Clone, PartialEq, Eq)]
pub enum PaymentProvider {
    Simulated,
    Stripe { secret_key: String },
}

impl std::fmt::Debug for PaymentProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Simulated => f.write_str("Simulated"),
            Self::Stripe { .. } => f.write_str("Stripe { secret_key: [REDACTED] }"),
        }
    }
}

/// Token and password settings shared with the request handlers
#[derive(Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
    pub bcrypt_cost: u32,
    pub cookie_secure: bool,
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("jwt_secret", &"[REDACTED]")
            .field("token_ttl", &self.token_ttl)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("cookie_secure", &self.cookie_secure)
            .finish()
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub production: bool,
    pub store: StoreBackend,
    pub host: IpAddr,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub auth: AuthSettings,
    pub payments: PaymentProvider,
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let production = env.or_default("APP_ENV", "development") == "production";

        let store = match env.or_default("STORE_BACKEND", "postgres").as_str() {
            "memory" => StoreBackend::Memory,
            "postgres" => StoreBackend::Postgres {
                url: env.required("DATABASE_URL")?,
                max_connections: env.parsed("DATABASE_MAX_CONNECTIONS", 5)?,
            },
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "STORE_BACKEND".to_string(),
                    format!("unknown backend '{other}'"),
                ))
            }
        };

        let jwt_secret = match env.optional("JWT_SECRET") {
            Some(secret) => secret,
            None if production => return Err(ConfigError::MissingEnvVar("JWT_SECRET".to_string())),
            None => {
                tracing::warn!("JWT_SECRET not set, using the development secret");
                DEV_JWT_SECRET.to_string()
            }
        };
        let ttl_hours: i64 = env.parsed("JWT_EXPIRES_IN_HOURS", 168)?;
        if ttl_hours <= 0 {
            return Err(ConfigError::InvalidEnvVar(
                "JWT_EXPIRES_IN_HOURS".to_string(),
                "must be positive".to_string(),
            ));
        }
        let bcrypt_cost: u32 = env.parsed("BCRYPT_COST", crate::auth::password::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::InvalidEnvVar(
                "BCRYPT_COST".to_string(),
                "must be between 4 and 31".to_string(),
            ));
        }

        let payments = match env.or_default("PAYMENT_PROVIDER", "simulated").as_str() {
            "simulated" => PaymentProvider::Simulated,
            "stripe" => PaymentProvider::Stripe {
                secret_key: env.required("STRIPE_SECRET_KEY")?,
            },
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "PAYMENT_PROVIDER".to_string(),
                    format!("unknown provider '{other}'"),
                ))
            }
        };

        let mut cors_origins: Vec<String> =
            DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect();
        if let Some(client) = env.optional("CLIENT_URL") {
            let client = client.trim_end_matches('/').to_string();
            if !cors_origins.contains(&client) {
                cors_origins.push(client);
            }
        }

        Ok(Self {
            production,
            store,
            host: env.parsed("HOST", IpAddr::from([0, 0, 0, 0]))?,
            port: env.parsed("PORT", 5000)?,
            cors_origins,
            auth: AuthSettings {
                jwt_secret,
                token_ttl: chrono::Duration::hours(ttl_hours),
                bcrypt_cost,
                cookie_secure: env.parsed("COOKIE_SECURE", false)?,
            },
            payments,
        })
    }

    /// Returns the socket address for binding the server.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Set and non-blank
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key)
            .map(|v| v.trim().to_lowercase())
            .unwrap_or_else(|| default.to_string())
    }

    fn parsed<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(key) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
            None => Ok(default),
        }
    }
}
