use thiserror::Error;

/// Failures surfaced by the backend client and everything layered on it.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("unauthorized (session expired or invalid; log in again)")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("server error ({code}){}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Server { code: u16, message: Option<String> },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid response (status {0})")]
    InvalidResponse(u16),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("cancelled")]
    Cancelled,
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

pub(crate) const GENERIC_BAD_REQUEST: &str = "invalid request parameters";

impl ApiError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }

    /// Text suitable for a transient toast.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthorized => "Your session has expired, please log in again".to_string(),
            ApiError::NotFound => "The requested dream could not be found".to_string(),
            ApiError::BadRequest(message) => message.clone(),
            ApiError::Server { code, message } => message
                .clone()
                .unwrap_or_else(|| format!("Server error ({})", code)),
            ApiError::Transport(_) => "Network unavailable, please try again".to_string(),
            ApiError::InvalidResponse(_) => "The server returned an unexpected response".to_string(),
            ApiError::Decode(_) => "The server returned data this app cannot read".to_string(),
            ApiError::Cancelled => String::new(),
        }
    }
}
