// Connection handling module
// Serves a single accepted TCP connection with hyper's HTTP/1 implementation

use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::{TokioIo, TokioTimer};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::access::CountingBody;
use crate::config::AppState;
use crate::handler;
use crate::http::ServeBody;
use crate::logger::{self, AccessLogEntry};

/// Accept a connection: log it and hand it to its own task.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address
/// * `state` - Shared application state
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
) {
    if state.access_log_enabled() {
        logger::log_connection_accepted(&peer_addr);
    }

    handle_connection(stream, peer_addr, Arc::clone(state));
}

/// Handle a single connection in a spawned task.
///
/// This function:
/// 1. Wraps the TCP stream in `TokioIo`
/// 2. Configures HTTP/1.1 keep-alive and the header read timeout, if any
/// 3. Serves the connection with the request handler
///
/// Nothing bounds how long a response body may take to stream, so a slow
/// reader holds its connection until the download completes.
fn handle_connection(stream: tokio::net::TcpStream, peer_addr: SocketAddr, state: Arc<AppState>) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);
        let performance = &state.config.performance;

        let mut builder = http1::Builder::new();
        builder.keep_alive(performance.keep_alive);
        if performance.header_read_timeout > 0 {
            builder
                .timer(TokioTimer::new())
                .header_read_timeout(Duration::from_secs(performance.header_read_timeout));
        }

        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| serve_request(req, Arc::clone(&service_state), peer_addr)),
        );

        if let Err(err) = conn.await {
            logger::log_connection_error(&err);
        }
    });
}

/// Run the handler; the access log line is written once the body is done
async fn serve_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<ServeBody>, Infallible> {
    let entry = state
        .access_log_enabled()
        .then(|| AccessLogEntry::from_request(&req, peer_addr));
    let started = Instant::now();

    let response = handler::handle_request(req, Arc::clone(&state)).await?;

    let Some(mut entry) = entry else {
        return Ok(response);
    };
    entry.status = response.status().as_u16();
    let format = state.config.logging.access_log_format.clone();

    Ok(response.map(|body| {
        CountingBody::new(body, move |sent| {
            entry.body_bytes = sent;
            entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
            logger::log_access(&entry, &format);
        })
        .boxed_unsync()
    }))
}
