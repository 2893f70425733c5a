use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    config::CryptoPayConfig,
    data_objects::{ApiEnvelope, CryptoPayInvoice, NewInvoice},
    ProviderApiError,
};

/// Client for the Crypto Pay API.
#[derive(Clone)]
pub struct CryptoPayApi {
    config: CryptoPayConfig,
    client: Arc<Client>,
}

impl CryptoPayApi {
    pub fn new(config: CryptoPayConfig) -> Result<Self, ProviderApiError> {
        if !config.is_configured() {
            return Err(ProviderApiError::NotConfigured("no Crypto Pay API token has been set".into()));
        }
        let mut headers = HeaderMap::with_capacity(2);
        let val = HeaderValue::from_str(config.api_token.reveal().as_str())
            .map_err(|e| ProviderApiError::Initialization(e.to_string()))?;
        headers.insert("Crypto-Pay-API-Token", val);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ProviderApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self, method: &str) -> String {
        format!("{}/{method}", self.config.api_url.trim_end_matches('/'))
    }

    pub async fn query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        api_method: &str,
        params: &[(&str, &str)],
        body: Option<B>,
    ) -> Result<T, ProviderApiError> {
        let url = self.url(api_method);
        trace!("💳️ Sending Crypto Pay request: {url}");
        let mut req = self.client.request(method, url);
        if !params.is_empty() {
            req = req.query(params);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| ProviderApiError::RequestError(e.to_string()))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| ProviderApiError::ResponseError(e.to_string()))?;
        // Failed calls still carry the envelope, which names the error
        match serde_json::from_str::<ApiEnvelope>(&text) {
            Ok(envelope) => envelope.into_result(),
            Err(_) if !status.is_success() => {
                Err(ProviderApiError::QueryError { status: status.as_u16(), message: text })
            },
            Err(e) => Err(ProviderApiError::JsonError(e.to_string())),
        }
    }

    /// Checks that the token is valid. Returns the app description.
    pub async fn get_me(&self) -> Result<serde_json::Value, ProviderApiError> {
        self.query::<serde_json::Value, ()>(Method::GET, "getMe", &[], None).await
    }

    pub async fn create_invoice(&self, invoice: &NewInvoice) -> Result<CryptoPayInvoice, ProviderApiError> {
        debug!("💳️ Creating invoice for {} {}", invoice.amount, invoice.asset);
        let result = self.query::<CryptoPayInvoice, _>(Method::POST, "createInvoice", &[], Some(invoice)).await?;
        info!("💳️ Created invoice #{} for {} {}", result.invoice_id, result.amount, invoice.asset);
        Ok(result)
    }

    pub async fn get_invoices(&self, invoice_ids: &[&str]) -> Result<Vec<CryptoPayInvoice>, ProviderApiError> {
        #[derive(Deserialize)]
        struct Invoices {
            items: Vec<CryptoPayInvoice>,
        }
        let ids = invoice_ids.join(",");
        let result = self.query::<Invoices, ()>(Method::GET, "getInvoices", &[("invoice_ids", &ids)], None).await?;
        debug!("💳️ Fetched {} invoice(s)", result.items.len());
        Ok(result.items)
    }
}
