use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("The client is not configured: {0}")]
    NotConfigured(String),
    #[error("Request failed: {0}")]
    RequestError(String),
    #[error("Invalid response: {0}")]
    ResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("The API returned an error. {code} {name}")]
    ApiError { code: i64, name: String },
    #[error("The API returned an empty result")]
    EmptyResponse,
}
