//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, the root probe,
//! and dispatch to file serving.

use crate::config::AppState;
use crate::error::ServeError;
use crate::handler::static_files;
use crate::http::{self, ServeBody};
use crate::logger;
use hyper::header::RANGE;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::sync::Arc;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
    /// Raw `Range` value; non-ASCII values are kept as empty so they fail parsing
    pub range_header: Option<&'a str>,
}

impl<'a> RequestContext<'a> {
    pub fn from_request<B>(req: &'a Request<B>) -> Self {
        Self {
            path: req.uri().path(),
            is_head: *req.method() == Method::HEAD,
            range_header: req
                .headers()
                .get(RANGE)
                .map(|v| v.to_str().unwrap_or_default()),
        }
    }
}

/// Main entry point for HTTP request handling
///
/// Generic over the request body, which is never read.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<ServeBody>, Infallible> {
    let is_head = *req.method() == Method::HEAD;

    // 1. Check HTTP method
    if let Err(err) = check_http_method(req.method()) {
        logger::log_warning(&err.to_string());
        return Ok(err.into_response(&state.messages, is_head));
    }

    // 2. Root probe
    let ctx = RequestContext::from_request(&req);
    if ctx.path == "/" {
        return Ok(http::build_probe_response(
            &state.messages.server_running,
            ctx.is_head,
        ));
    }

    // 3. Everything else is a file lookup
    let response = match static_files::serve_file(&ctx, &state).await {
        Ok(response) => response,
        Err(err) => {
            log_serve_error(&err, ctx.path);
            err.into_response(&state.messages, ctx.is_head)
        }
    };
    Ok(response)
}

/// Only GET and HEAD are served
fn check_http_method(method: &Method) -> Result<(), ServeError> {
    match *method {
        Method::GET | Method::HEAD => Ok(()),
        _ => Err(ServeError::UnsupportedMethod(method.clone())),
    }
}

fn log_serve_error(err: &ServeError, path: &str) {
    match err {
        // Missing files are routine for a debug server, the access log records them
        ServeError::NotFound(_) => {}
        ServeError::Io(_) => logger::log_error(&format!("{path}: {err}")),
        _ => logger::log_warning(&format!("{path}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Locale};
    use http_body_util::BodyExt;
    use hyper::header::{ACCEPT_RANGES, ALLOW, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE};
    use hyper::StatusCode;

    struct Fixture {
        _dir: tempfile::TempDir,
        state: Arc<AppState>,
    }

    fn fixture_with_locale(locale: Locale) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"0123456789").unwrap();
        std::fs::write(dir.path().join("empty.bin"), b"").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("inner.txt"), b"hidden").unwrap();

        let mut config = Config::defaults().unwrap();
        config.files.locale = locale;
        let state = Arc::new(AppState::new(config, dir.path().to_path_buf()));
        Fixture { _dir: dir, state }
    }

    fn fixture() -> Fixture {
        fixture_with_locale(Locale::En)
    }

    async fn send(
        state: &Arc<AppState>,
        method: Method,
        path: &str,
        range: Option<&str>,
    ) -> (StatusCode, hyper::HeaderMap, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(range) = range {
            builder = builder.header(RANGE, range);
        }
        let req = builder.body(()).unwrap();
        let response = handle_request(req, Arc::clone(state)).await.unwrap();
        let (parts, body) = response.into_parts();
        let bytes = body.collect().await.unwrap().to_bytes().to_vec();
        (parts.status, parts.headers, bytes)
    }

    fn envelope(body: &[u8]) -> serde_json::Value {
        serde_json::from_slice(body).unwrap()
    }

    #[tokio::test]
    async fn test_root_probe() {
        let fx = fixture();
        let (status, headers, body) = send(&fx.state, Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert_eq!(
            envelope(&body),
            serde_json::json!({ "message": "Debug server is running" })
        );
    }

    #[tokio::test]
    async fn test_full_file() {
        let fx = fixture();
        let (status, headers, body) = send(&fx.state, Method::GET, "/a.txt", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"0123456789");
        assert_eq!(headers[CONTENT_LENGTH], "10");
        assert_eq!(headers[CONTENT_TYPE], "text/plain");
        assert_eq!(headers[ACCEPT_RANGES], "bytes");
        assert!(headers.get(CONTENT_RANGE).is_none());
    }

    #[tokio::test]
    async fn test_closed_range() {
        let fx = fixture();
        let (status, headers, body) =
            send(&fx.state, Method::GET, "/a.txt", Some("bytes=2-5")).await;
        assert_eq!(status, StatusCode::PARTIAL_CONTENT);
        assert_eq!(body, b"2345");
        assert_eq!(headers[CONTENT_RANGE], "bytes 2-5/10");
        assert_eq!(headers[CONTENT_LENGTH], "4");
    }

    #[tokio::test]
    async fn test_open_range() {
        let fx = fixture();
        let (status, headers, body) =
            send(&fx.state, Method::GET, "/a.txt", Some("bytes=8-")).await;
        assert_eq!(status, StatusCode::PARTIAL_CONTENT);
        assert_eq!(body, b"89");
        assert_eq!(headers[CONTENT_RANGE], "bytes 8-9/10");
    }

    #[tokio::test]
    async fn test_end_clamped() {
        let fx = fixture();
        let (status, headers, body) =
            send(&fx.state, Method::GET, "/a.txt", Some("bytes=7-1000")).await;
        assert_eq!(status, StatusCode::PARTIAL_CONTENT);
        assert_eq!(body, b"789");
        assert_eq!(headers[CONTENT_RANGE], "bytes 7-9/10");
        assert_eq!(headers[CONTENT_LENGTH], "3");
    }

    #[tokio::test]
    async fn test_every_subrange_matches_source() {
        let fx = fixture();
        let source = b"0123456789";
        for start in 0..10u64 {
            for end in start..10u64 {
                let header = format!("bytes={start}-{end}");
                let (status, _, body) =
                    send(&fx.state, Method::GET, "/a.txt", Some(&header)).await;
                assert_eq!(status, StatusCode::PARTIAL_CONTENT, "{header}");
                let (s, e) = (usize::try_from(start).unwrap(), usize::try_from(end).unwrap());
                assert_eq!(body, &source[s..=e], "{header}");
            }
        }
    }

    #[tokio::test]
    async fn test_malformed_range() {
        let fx = fixture();
        let (status, headers, body) =
            send(&fx.state, Method::GET, "/a.txt", Some("bytes=abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(headers[CONTENT_TYPE], "application/json");
        let value = envelope(&body);
        assert_eq!(value["error"]["code"], 400);
        assert_eq!(value["error"]["message"], "Invalid Range header");
        assert_eq!(value["error"]["explain"], "");
    }

    #[tokio::test]
    async fn test_non_ascii_range_is_malformed() {
        let fx = fixture();
        let req = Request::builder()
            .uri("/a.txt")
            .header(RANGE, hyper::header::HeaderValue::from_bytes(b"bytes=\xff-").unwrap())
            .body(())
            .unwrap();
        let response = handle_request(req, Arc::clone(&fx.state)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unsatisfiable_range() {
        let fx = fixture();
        for header in ["bytes=20-", "bytes=10-12", "bytes=5-2"] {
            let (status, headers, body) =
                send(&fx.state, Method::GET, "/a.txt", Some(header)).await;
            assert_eq!(status, StatusCode::RANGE_NOT_SATISFIABLE, "{header}");
            assert_eq!(headers[CONTENT_RANGE], "bytes */10");
            assert_eq!(envelope(&body)["error"]["code"], 416);
        }
    }

    #[tokio::test]
    async fn test_missing_file() {
        let fx = fixture();
        let (status, _, body) = send(&fx.state, Method::GET, "/missing.txt", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let value = envelope(&body);
        assert_eq!(value["error"]["code"], 404);
        assert_eq!(value["error"]["message"], "File not found");
    }

    #[tokio::test]
    async fn test_missing_file_with_range() {
        // Existence is checked before the range
        let fx = fixture();
        let (status, _, _) =
            send(&fx.state, Method::GET, "/missing.txt", Some("bogus")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_base_name_only() {
        let fx = fixture();
        let (status, _, body) = send(&fx.state, Method::GET, "/some/dir/a.txt", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"0123456789");

        // Subdirectories are never entered
        let (status, _, _) = send(&fx.state, Method::GET, "/nested/inner.txt", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        // Directories themselves are not files
        let (status, _, _) = send(&fx.state, Method::GET, "/nested", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _, _) = send(&fx.state, Method::GET, "/../a.txt", None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _, _) = send(&fx.state, Method::GET, "/a.txt/..", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_query_string_ignored() {
        let fx = fixture();
        let (status, _, body) = send(&fx.state, Method::GET, "/a.txt?v=2", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"0123456789");
    }

    #[tokio::test]
    async fn test_empty_file() {
        let fx = fixture();
        let (status, headers, body) = send(&fx.state, Method::GET, "/empty.bin", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[CONTENT_LENGTH], "0");
        assert!(body.is_empty());

        let (status, headers, _) =
            send(&fx.state, Method::GET, "/empty.bin", Some("bytes=0-")).await;
        assert_eq!(status, StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(headers[CONTENT_RANGE], "bytes */0");
    }

    #[tokio::test]
    async fn test_head_request() {
        let fx = fixture();
        let (status, headers, body) = send(&fx.state, Method::HEAD, "/a.txt", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[CONTENT_LENGTH], "10");
        assert!(body.is_empty());

        let (status, headers, body) =
            send(&fx.state, Method::HEAD, "/a.txt", Some("bytes=1-2")).await;
        assert_eq!(status, StatusCode::PARTIAL_CONTENT);
        assert_eq!(headers[CONTENT_RANGE], "bytes 1-2/10");
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_method() {
        let fx = fixture();
        let (status, headers, body) = send(&fx.state, Method::POST, "/a.txt", None).await;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
        assert_eq!(headers[ALLOW], "GET, HEAD");
        let value = envelope(&body);
        assert_eq!(value["error"]["code"], 501);
        assert_eq!(value["error"]["message"], "Unsupported method ('POST')");
    }

    #[tokio::test]
    async fn test_chinese_locale() {
        let fx = fixture_with_locale(Locale::Zh);
        let (_, _, body) = send(&fx.state, Method::GET, "/", None).await;
        assert_eq!(envelope(&body)["message"], "调试服务器正在运行");

        let (_, _, body) = send(&fx.state, Method::GET, "/missing.txt", None).await;
        assert_eq!(envelope(&body)["error"]["message"], "文件未找到");
    }

    #[test]
    fn test_context_from_request() {
        let req = Request::builder()
            .method(Method::HEAD)
            .uri("/dir/clip.mp4?x=1")
            .header(RANGE, "bytes=0-")
            .body(())
            .unwrap();
        let ctx = RequestContext::from_request(&req);
        assert_eq!(ctx.path, "/dir/clip.mp4");
        assert!(ctx.is_head);
        assert_eq!(ctx.range_header, Some("bytes=0-"));
    }
}
