use std::sync::Arc;

use log::*;
use reqwest::Client;
use serde_json::{json, Value};

use crate::{config::TelegramConfig, data_objects::ApiEnvelope, ProviderApiError};

/// Client for the Telegram Bot API. Only what the gateway needs to reach its users.
#[derive(Clone)]
pub struct TelegramApi {
    config: TelegramConfig,
    client: Arc<Client>,
}

impl TelegramApi {
    pub fn new(config: TelegramConfig) -> Result<Self, ProviderApiError> {
        if !config.is_configured() {
            return Err(ProviderApiError::NotConfigured("no Telegram bot token has been set".into()));
        }
        let client = Client::builder().build().map_err(|e| ProviderApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    fn url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.config.api_url.trim_end_matches('/'), self.config.bot_token.reveal())
    }

    /// Sends an HTML-formatted message to a chat. The caller is responsible for escaping user-supplied text.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), ProviderApiError> {
        let body = json!({ "chat_id": chat_id, "text": text, "parse_mode": "HTML" });
        // The url contains the bot token, so it never goes into the logs
        trace!("✉️ Sending message to chat {chat_id}");
        let response = self
            .client
            .post(self.url("sendMessage"))
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderApiError::RequestError(e.without_url().to_string()))?;
        let status = response.status();
        let envelope = response.json::<ApiEnvelope>().await.map_err(|e| {
            if status.is_success() {
                ProviderApiError::JsonError(e.without_url().to_string())
            } else {
                ProviderApiError::QueryError { status: status.as_u16(), message: e.without_url().to_string() }
            }
        })?;
        envelope.into_result::<Value>()?;
        debug!("✉️ Message delivered to chat {chat_id}");
        Ok(())
    }
}

/// Escapes the characters that Telegram's HTML parse mode treats as markup.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            c => escaped.push(c),
        }
    }
    escaped
}
