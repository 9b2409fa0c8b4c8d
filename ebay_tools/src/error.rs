use thiserror::Error;

#[derive(Debug, Error)]
pub enum EbayApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Authentication with eBay failed: {0}")]
    Auth(String),
    #[error("Label purchase declined. Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("eBay rejected the request as invalid: {0}")]
    Validation(String),
    #[error("Network error talking to eBay: {0}")]
    TransientNetwork(String),
    #[error("Could not deserialize JSON: {0}")]
    Json(String),
    #[error("eBay API call failed. Error {status}. {message}")]
    Vendor { status: u16, message: String },
}

impl EbayApiError {
    /// Only transport-level failures are safe to retry without operator
    /// involvement.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EbayApiError::TransientNetwork(_))
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, EbayApiError::Auth(_))
    }

    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_decode() {
            return EbayApiError::Json(e.to_string());
        }
        // send() errors without a response are transport failures
        EbayApiError::TransientNetwork(e.to_string())
    }
}
