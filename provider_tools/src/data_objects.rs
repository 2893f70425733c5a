use serde::{de, de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::ProviderApiError;

/// The webhook update type sent when an invoice has been paid.
pub const INVOICE_PAID: &str = "invoice_paid";

/// The `{ok, result, error}` envelope that wraps every Crypto Pay and Telegram response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiEnvelope {
    pub ok: bool,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
    /// Telegram reports failures here instead of in `error`
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
}

impl ApiEnvelope {
    pub fn into_result<T: DeserializeOwned>(self) -> Result<T, ProviderApiError> {
        if !self.ok {
            let (code, name) = match self.error {
                Some(e) => {
                    let code = e["code"].as_i64().unwrap_or_default();
                    let name = e["name"].as_str().map(String::from).unwrap_or_else(|| e.to_string());
                    (code, name)
                },
                None => (self.error_code.unwrap_or_default(), self.description.unwrap_or_default()),
            };
            return Err(ProviderApiError::ApiError { code, name });
        }
        let result = self.result.ok_or(ProviderApiError::EmptyResponse)?;
        serde_json::from_value(result).map_err(|e| ProviderApiError::JsonError(e.to_string()))
    }
}

/// The parameters for a new invoice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInvoice {
    pub asset: String,
    /// The amount as a decimal string
    pub amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Returned verbatim in the webhook once the invoice is paid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}

impl NewInvoice {
    pub fn new<S: Into<String>>(asset: S, amount: S) -> Self {
        Self { asset: asset.into(), amount: amount.into(), ..Default::default() }
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_payload<S: Into<String>>(mut self, payload: S) -> Self {
        self.payload = Some(payload.into());
        self
    }
}

/// An invoice as returned by the API or delivered in a webhook.
///
/// Ids and amounts arrive as strings or as numbers depending on who sent them, and are kept as strings. Webhook
/// deliveries may omit `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CryptoPayInvoice {
    #[serde(deserialize_with = "string_or_number")]
    pub invoice_id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub asset: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub amount: String,
    #[serde(default)]
    pub pay_url: Option<String>,
    #[serde(default)]
    pub bot_invoice_url: Option<String>,
    #[serde(default)]
    pub payload: Option<String>,
    #[serde(default)]
    pub paid_at: Option<String>,
}

impl CryptoPayInvoice {
    /// The link the payer should follow. Newer API versions only send `bot_invoice_url`.
    pub fn payment_url(&self) -> Option<&str> {
        self.bot_invoice_url.as_deref().or(self.pay_url.as_deref())
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::invalid_type(de::Unexpected::Other(&other.to_string()), &"a string or a number")),
    }
}

/// A webhook delivery. The shape of `payload` depends on `update_type`, so it is left undecoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookUpdate {
    #[serde(default)]
    pub update_id: Option<i64>,
    pub update_type: String,
    #[serde(default)]
    pub request_date: Option<String>,
    #[serde(default)]
    pub payload: Value,
}

impl WebhookUpdate {
    pub fn is_invoice_paid(&self) -> bool {
        self.update_type == INVOICE_PAID
    }

    /// Decodes the payload as a paid invoice.
    pub fn invoice(&self) -> Result<CryptoPayInvoice, ProviderApiError> {
        serde_json::from_value(self.payload.clone()).map_err(|e| ProviderApiError::JsonError(e.to_string()))
    }
}
