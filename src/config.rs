use dotenv::dotenv;
use once_cell::sync::Lazy;
use std::env;

use crate::constants::DEFAULT_TOKEN_EXPIRY_HOURS;

pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub log_level: String,
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub bcrypt_cost: u32,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("database_url", &"<redacted>")
            .field("log_level", &self.log_level)
            .field("jwt_secret", &"<redacted>")
            .field("jwt_expiry_hours", &self.jwt_expiry_hours)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

impl Config {
    fn from_env() -> Self {
        dotenv().ok();

        Self {
            port: env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| "secret".to_string()), // Use a secure secret in production
            jwt_expiry_hours: env::var("JWT_EXPIRY_HOURS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|hours| *hours > 0)
                .unwrap_or(DEFAULT_TOKEN_EXPIRY_HOURS),
            bcrypt_cost: parse_bcrypt_cost(env::var("BCRYPT_COST").ok()),
        }
    }
}

// bcrypt rejects costs outside 4..=31
fn parse_bcrypt_cost(raw: Option<String>) -> u32 {
    raw.and_then(|v| v.parse::<u32>().ok())
        .filter(|cost| (4..=31).contains(cost))
        .unwrap_or(bcrypt::DEFAULT_COST)
}

// Global static accessible everywhere
pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);

#[cfg(test)]
mod tests {
    use super::parse_bcrypt_cost;

    #[test]
    fn bcrypt_cost_out_of_range_falls_back_to_default() {
        assert_eq!(parse_bcrypt_cost(Some("40".into())), bcrypt::DEFAULT_COST);
        assert_eq!(parse_bcrypt_cost(Some("3".into())), bcrypt::DEFAULT_COST);
        assert_eq!(parse_bcrypt_cost(Some("abc".into())), bcrypt::DEFAULT_COST);
        assert_eq!(parse_bcrypt_cost(None), bcrypt::DEFAULT_COST);
    }

    #[test]
    fn bcrypt_cost_in_range_is_used() {
        assert_eq!(parse_bcrypt_cost(Some("4".into())), 4);
        assert_eq!(parse_bcrypt_cost(Some("31".into())), 31);
    }
}
