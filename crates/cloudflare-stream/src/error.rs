use thiserror::Error;

use crate::types::ApiError;

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("required missing account id")]
    MissingAccountId,
    #[error("required live input id missing")]
    MissingLiveInputId,
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("cloudflare api error (status {status}): {}", ApiError::join(.errors))]
    Api { status: u16, errors: Vec<ApiError> },
    #[error("json error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("response envelope contained no result")]
    MissingResult,
    #[error("request cancelled")]
    Cancelled,
}

impl StreamError {
    /// Build an API error from a non-success response body.
    ///
    /// The body is usually a standard envelope, in which case its `errors` are kept. Anything
    /// else is carried as a single error holding the raw text.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let errors = match serde_json::from_slice::<crate::types::ApiErrorBody>(body) {
            Ok(b) if !b.errors.is_empty() => b.errors,
            _ => vec![ApiError {
                code: 0,
                message: Some(String::from_utf8_lossy(body).into_owned()),
            }],
        };
        Self::Api { status, errors }
    }

    /// True for the two precondition errors returned before any request is made.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::MissingAccountId | Self::MissingLiveInputId)
    }
}

pub type Result<T> = std::result::Result<T, StreamError>;
