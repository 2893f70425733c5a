use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use exchange_engine::{
    traits::{DepositError, ExchangeRateError, UserManagementError},
    OrderFlowError,
};
use log::error;
use provider_tools::ProviderApiError;
use thiserror::Error;

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";
const UPSTREAM_ERROR_MESSAGE: &str = "The upstream service could not complete the request";

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read query string: {0}")]
    InvalidQueryString(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NoRecordFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("An upstream service call failed. {0}")]
    UpstreamError(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidQueryString(_) => StatusCode::BAD_REQUEST,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::UpstreamError(_) => StatusCode::BAD_GATEWAY,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client errors carry their message. Server-side and upstream failures are logged here and answered with a fixed
    /// message, so that no internal detail reaches the caller.
    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = match status {
            StatusCode::BAD_GATEWAY => {
                error!("💻️ {self}");
                UPSTREAM_ERROR_MESSAGE.to_string()
            },
            s if s.is_server_error() => {
                error!("💻️ {self}");
                INTERNAL_ERROR_MESSAGE.to_string()
            },
            _ => self.to_string(),
        };
        HttpResponse::build(status)
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": message }).to_string())
    }
}

impl From<OrderFlowError> for ServerError {
    fn from(e: OrderFlowError) -> Self {
        match e {
            OrderFlowError::DatabaseError(s) => Self::BackendError(format!("Database error: {s}")),
            OrderFlowError::InvalidAmount(_) |
            OrderFlowError::AmountOutOfRange(_) |
            OrderFlowError::InvalidCurrency(_) |
            OrderFlowError::InvalidStatus(_) |
            OrderFlowError::InvalidRate(_) => Self::ValidationError(e.to_string()),
            OrderFlowError::UserNotFound(_) |
            OrderFlowError::RateNotFound { .. } |
            OrderFlowError::OrderNotFound(_) => Self::NoRecordFound(e.to_string()),
            OrderFlowError::StatusTransitionForbidden { .. } => Self::Conflict(e.to_string()),
        }
    }
}

impl From<DepositError> for ServerError {
    fn from(e: DepositError) -> Self {
        match e {
            DepositError::DatabaseError(s) => Self::BackendError(format!("Database error: {s}")),
            DepositError::InvalidPayload(_) |
            DepositError::InvalidAmount(_) |
            DepositError::BalanceOutOfRange(_) |
            DepositError::InvalidCurrency(_) => Self::ValidationError(e.to_string()),
            DepositError::UserNotFound(_) | DepositError::WalletNotFound { .. } => Self::NoRecordFound(e.to_string()),
        }
    }
}

impl From<ExchangeRateError> for ServerError {
    fn from(e: ExchangeRateError) -> Self {
        match e {
            ExchangeRateError::DatabaseError(s) => Self::BackendError(format!("Database error: {s}")),
            ExchangeRateError::RateNotFound { .. } => Self::NoRecordFound(e.to_string()),
            ExchangeRateError::InvalidRate(_) => Self::ValidationError(e.to_string()),
        }
    }
}

impl From<UserManagementError> for ServerError {
    fn from(e: UserManagementError) -> Self {
        match e {
            UserManagementError::DatabaseError(s) => Self::BackendError(format!("Database error: {s}")),
            UserManagementError::UserNotFound(_) => Self::NoRecordFound(e.to_string()),
            UserManagementError::ReferralCodeExhausted => Self::BackendError(e.to_string()),
        }
    }
}

impl From<ProviderApiError> for ServerError {
    fn from(e: ProviderApiError) -> Self {
        Self::UpstreamError(e.to_string())
    }
}
