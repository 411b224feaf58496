//! HTTP response building module
//!
//! Response body type plus builders for the probe, the JSON error envelope and
//! file responses.

use futures::TryStreamExt;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use hyper::body::{Bytes, Frame};
use hyper::header::{HeaderValue, ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use serde::Serialize;
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tokio_util::io::ReaderStream;

use super::range::ByteRange;

/// Body of every response: buffered JSON or a file stream
pub type ServeBody = UnsyncBoxBody<Bytes, std::io::Error>;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Error envelope returned instead of an HTML error page
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: u16,
    pub message: String,
    pub explain: String,
}

#[derive(Serialize)]
struct ProbeBody<'a> {
    message: &'a str,
}

/// Buffered body
pub fn full_body(data: impl Into<Bytes>) -> ServeBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Body for HEAD responses
pub fn empty_body() -> ServeBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Stream at most `length` bytes from the file's current position
pub fn file_body(file: File, length: u64) -> ServeBody {
    let stream = ReaderStream::new(file.take(length)).map_ok(Frame::data);
    StreamBody::new(stream).boxed_unsync()
}

/// Build JSON response; `is_head` keeps the headers and drops the body
pub fn json_response<T: Serialize>(status: StatusCode, body: &T, is_head: bool) -> Response<ServeBody> {
    let json = match serde_json::to_vec(body) {
        Ok(j) => j,
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            return fallback_response(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let content_length = json.len();
    let body = if is_head {
        empty_body()
    } else {
        full_body(json)
    };

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
        .header(CONTENT_LENGTH, content_length)
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error(status, &e);
            fallback_response(StatusCode::INTERNAL_SERVER_ERROR)
        })
}

/// Build the `GET /` liveness response
pub fn build_probe_response(message: &str, is_head: bool) -> Response<ServeBody> {
    json_response(StatusCode::OK, &ProbeBody { message }, is_head)
}

/// Build the JSON error envelope response
pub fn build_error_response(
    status: StatusCode,
    message: String,
    explain: String,
    is_head: bool,
) -> Response<ServeBody> {
    let envelope = ErrorEnvelope {
        error: ErrorDetail {
            code: status.as_u16(),
            message,
            explain,
        },
    };
    json_response(status, &envelope, is_head)
}

/// Build 200 or 206 file response
///
/// `range` is `Some` exactly when the client sent a `Range` header; the body
/// must already be positioned at `range.start` and limited to `content_length`.
pub fn build_file_response(
    body: ServeBody,
    content_type: &str,
    content_length: u64,
    range: Option<(ByteRange, u64)>,
) -> Response<ServeBody> {
    let status = if range.is_some() {
        StatusCode::PARTIAL_CONTENT
    } else {
        StatusCode::OK
    };

    let mut builder = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, content_length)
        .header(ACCEPT_RANGES, HeaderValue::from_static("bytes"));

    if let Some((range, file_size)) = range {
        builder = builder.header(CONTENT_RANGE, range.content_range(file_size));
    }

    builder.body(body).unwrap_or_else(|e| {
        log_build_error(status, &e);
        fallback_response(StatusCode::INTERNAL_SERVER_ERROR)
    })
}

/// Bare response used when a builder rejects its own headers
fn fallback_response(status: StatusCode) -> Response<ServeBody> {
    let mut response = Response::new(empty_body());
    *response.status_mut() = status;
    response
}

/// Log response build error
fn log_build_error(status: StatusCode, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_bytes(response: Response<ServeBody>) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_probe_response() {
        let response = build_probe_response("Debug server is running", false);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(response.headers()[CONTENT_LENGTH], "37");
        assert_eq!(
            body_bytes(response).await,
            r#"{"message":"Debug server is running"}"#
        );
    }

    #[tokio::test]
    async fn test_error_envelope() {
        let response = build_error_response(
            StatusCode::NOT_FOUND,
            "文件未找到".to_string(),
            String::new(),
            false,
        );
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let value: serde_json::Value =
            serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "error": { "code": 404, "message": "文件未找到", "explain": "" }
            })
        );
    }

    #[tokio::test]
    async fn test_head_keeps_length() {
        let response = build_probe_response("ok", true);
        assert_eq!(response.headers()[CONTENT_LENGTH], "16");
        assert!(body_bytes(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_partial_headers() {
        let range = ByteRange { start: 2, end: 5 };
        let response =
            build_file_response(full_body("2345"), "text/plain", 4, Some((range, 10)));
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(response.headers()[CONTENT_RANGE], "bytes 2-5/10");
        assert_eq!(response.headers()[ACCEPT_RANGES], "bytes");
        assert_eq!(response.headers()[CONTENT_LENGTH], "4");
    }

    #[tokio::test]
    async fn test_full_headers() {
        let response = build_file_response(full_body("abc"), "text/plain", 3, None);
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(CONTENT_RANGE).is_none());
        assert_eq!(body_bytes(response).await, "abc");
    }
}
