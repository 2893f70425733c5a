use log::*;
use xg_common::Secret;

const DEFAULT_CRYPTO_PAY_API_URL: &str = "https://pay.crypt.bot/api";
const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

#[derive(Debug, Clone, Default)]
pub struct CryptoPayConfig {
    pub api_url: String,
    pub api_token: Secret<String>,
}

impl CryptoPayConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = std::env::var("XG_CRYPTO_PAY_API_URL").unwrap_or_else(|_| {
            info!("🪛️ XG_CRYPTO_PAY_API_URL not set, using {DEFAULT_CRYPTO_PAY_API_URL}");
            DEFAULT_CRYPTO_PAY_API_URL.to_string()
        });
        let api_token = Secret::new(std::env::var("XG_CRYPTO_PAY_API_TOKEN").unwrap_or_else(|_| {
            warn!("🪛️ XG_CRYPTO_PAY_API_TOKEN not set. Invoices cannot be created and webhooks cannot be verified.");
            String::default()
        }));
        Self { api_url, api_token }
    }

    pub fn is_configured(&self) -> bool {
        !self.api_token.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TelegramConfig {
    pub api_url: String,
    pub bot_token: Secret<String>,
}

impl TelegramConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = std::env::var("XG_TELEGRAM_API_URL").unwrap_or_else(|_| DEFAULT_TELEGRAM_API_URL.to_string());
        let bot_token = Secret::new(std::env::var("XG_TELEGRAM_BOT_TOKEN").unwrap_or_else(|_| {
            info!("🪛️ XG_TELEGRAM_BOT_TOKEN not set. Notifications will not be forwarded to Telegram.");
            String::default()
        }));
        Self { api_url, bot_token }
    }

    pub fn is_configured(&self) -> bool {
        !self.bot_token.is_empty()
    }
}
