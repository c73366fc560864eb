use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "clinica-api";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_BIND: &str = "0.0.0.0:3000";
const DEFAULT_DB: &str = "clinica.db";
const DEFAULT_ACCESS_TTL_SECS: i64 = 15 * 60;
const DEFAULT_REFRESH_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Runtime configuration, read from the environment once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
    /// Secret for signing access tokens.
    pub token_secret: String,
    /// Secret for signing refresh tokens. Falls back to `token_secret`.
    pub refresh_secret: String,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
}

impl Config {
    /// Load configuration from `CLINICA_*` environment variables,
    /// falling back to development defaults.
    pub fn from_env() -> Self {
        let token_secret = match env::var("CLINICA_TOKEN_SECRET") {
            Ok(s) if !s.is_empty() => s,
            _ => {
                tracing::warn!("CLINICA_TOKEN_SECRET not set, using development secret");
                "dev-secret-do-not-use-in-production".to_string()
            }
        };
        let refresh_secret =
            env::var("CLINICA_REFRESH_SECRET").unwrap_or_else(|_| token_secret.clone());

        Self {
            bind_addr: env::var("CLINICA_BIND")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(|| DEFAULT_BIND.parse().unwrap()),
            database_path: env::var("CLINICA_DB")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DB)),
            token_secret,
            refresh_secret,
            access_ttl_secs: env::var("CLINICA_ACCESS_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_ACCESS_TTL_SECS),
            refresh_ttl_secs: env::var("CLINICA_REFRESH_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_REFRESH_TTL_SECS),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND.parse().unwrap(),
            database_path: PathBuf::from(DEFAULT_DB),
            token_secret: "dev-secret-do-not-use-in-production".to_string(),
            refresh_secret: "dev-secret-do-not-use-in-production".to_string(),
            access_ttl_secs: DEFAULT_ACCESS_TTL_SECS,
            refresh_ttl_secs: DEFAULT_REFRESH_TTL_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_ttls() {
        let config = Config::default();
        assert_eq!(config.access_ttl_secs, 900);
        assert_eq!(config.refresh_ttl_secs, 604_800);
        assert!(config.access_ttl_secs < config.refresh_ttl_secs);
    }

    #[test]
    fn default_refresh_secret_matches_token_secret() {
        let config = Config::default();
        assert_eq!(config.token_secret, config.refresh_secret);
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
