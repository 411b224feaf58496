//! Request error types.

use hyper::header::{HeaderValue, ALLOW, CONTENT_RANGE};
use hyper::{Method, Response, StatusCode};

use crate::config::Messages;
use crate::http::response::{self, ServeBody};

/// Failure while answering a request, always rendered as the JSON envelope.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("invalid Range header: {0:?}")]
    BadRequest(String),

    #[error("file not found: {0}")]
    NotFound(String),

    #[error("range not satisfiable for a file of {file_size} bytes")]
    RangeNotSatisfiable { file_size: u64 },

    #[error("unsupported method: {0}")]
    UnsupportedMethod(Method),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServeError {
    /// Get the HTTP status code for this error.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::RangeNotSatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
            Self::UnsupportedMethod(_) => StatusCode::NOT_IMPLEMENTED,
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Localized `message` field of the envelope.
    pub fn message(&self, messages: &Messages) -> String {
        match self {
            Self::BadRequest(_) => messages.invalid_range.clone(),
            Self::NotFound(_) => messages.file_not_found.clone(),
            Self::RangeNotSatisfiable { .. } => messages.range_not_satisfiable.clone(),
            Self::UnsupportedMethod(method) => messages.unsupported_method(method.as_str()),
            Self::Io(_) => messages.unknown_error.clone(),
        }
    }

    /// `explain` field of the envelope, empty unless the cause is internal.
    pub fn explain(&self) -> String {
        match self {
            Self::Io(e) => e.to_string(),
            _ => String::new(),
        }
    }

    /// Render as an envelope response.
    pub fn into_response(self, messages: &Messages, is_head: bool) -> Response<ServeBody> {
        let mut response = response::build_error_response(
            self.status(),
            self.message(messages),
            self.explain(),
            is_head,
        );

        let headers = response.headers_mut();
        match &self {
            Self::RangeNotSatisfiable { file_size } => {
                if let Ok(value) = HeaderValue::from_str(&format!("bytes */{file_size}")) {
                    headers.insert(CONTENT_RANGE, value);
                }
            }
            Self::UnsupportedMethod(_) => {
                headers.insert(ALLOW, HeaderValue::from_static("GET, HEAD"));
            }
            _ => {}
        }

        response
    }
}
