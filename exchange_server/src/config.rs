use std::env;

use exchange_engine::db::db_url;
use log::*;
use provider_tools::{CryptoPayConfig, TelegramConfig};
use xg_common::{helpers::parse_boolean_flag, Secret};

const DEFAULT_XG_HOST: &str = "127.0.0.1";
const DEFAULT_XG_PORT: u16 = 8370;
const DEFAULT_MAX_CONNECTIONS: u32 = 25;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    /// The shared secret that admin requests must present in the `X-Admin-Key` header. Admin routes are closed while
    /// this is empty.
    pub admin_secret_key: Secret<String>,
    /// If false, payment webhooks are accepted without checking their signature. **DANGER**
    pub webhook_signature_checks: bool,
    pub crypto_pay: CryptoPayConfig,
    pub telegram: TelegramConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_XG_HOST.to_string(),
            port: DEFAULT_XG_PORT,
            database_url: String::default(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            admin_secret_key: Secret::default(),
            webhook_signature_checks: true,
            crypto_pay: CryptoPayConfig::default(),
            telegram: TelegramConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env_or_default() -> Self {
        let host = env::var("XG_HOST").ok().unwrap_or_else(|| DEFAULT_XG_HOST.into());
        let port = env::var("XG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!("🪛️ {s} is not a valid port for XG_PORT. {e} Using the default, {DEFAULT_XG_PORT}.");
                    DEFAULT_XG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_XG_PORT);
        let database_url = db_url();
        let max_connections = env::var("XG_DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| {
                s.parse::<u32>()
                    .map_err(|e| warn!("🪛️ {s} is not a valid value for XG_DATABASE_MAX_CONNECTIONS. {e}"))
                    .ok()
            })
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);
        let admin_secret_key = Secret::new(env::var("XG_ADMIN_SECRET_KEY").unwrap_or_else(|_| {
            warn!("🪛️ XG_ADMIN_SECRET_KEY is not set. Admin routes will refuse every request.");
            String::default()
        }));
        let webhook_signature_checks = parse_boolean_flag(env::var("XG_WEBHOOK_SIGNATURE_CHECKS").ok(), true);
        if !webhook_signature_checks {
            warn!("🚨️ Webhook signature checks are DISABLED. Anyone can credit wallets. Never do this in production.");
        }
        let crypto_pay = CryptoPayConfig::new_from_env_or_default();
        let telegram = TelegramConfig::new_from_env_or_default();
        Self {
            host,
            port,
            database_url,
            max_connections,
            admin_secret_key,
            webhook_signature_checks,
            crypto_pay,
            telegram,
        }
    }
}
