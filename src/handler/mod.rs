//! Request handler module
//!
//! Entry point for HTTP request processing: body size checks, body
//! collection, dispatch through the [`Router`] and access logging.

pub mod router;

pub use router::Router;

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body as _, Bytes};
use hyper::header::HeaderMap;
use hyper::{Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::config::AppState;
use crate::http;
use crate::logger::{self, AccessLogEntry};

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: hyper::body::Body<Data = Bytes>,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    let (response, access_entry) = process(req, &state, peer_addr).await;

    if let Some(entry) = access_entry {
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(with_server_header(response, &state.config.http.server_name))
}

/// Produce the response and, when access logging is on, the completed log
/// entry for it. Every response gets an entry, rejected ones included.
async fn process<B>(
    req: Request<B>,
    state: &AppState,
    peer_addr: SocketAddr,
) -> (Response<Full<Bytes>>, Option<AccessLogEntry>)
where
    B: hyper::body::Body<Data = Bytes>,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    let started = Instant::now();
    let max_body_size = state.config.http.max_body_size;
    let access_entry = state
        .access_log()
        .then(|| access_log_entry(&req, peer_addr));

    let response = if exceeds_body_limit(req.headers(), max_body_size) {
        logger::log_error(&format!(
            "Request body too large for {} (max: {max_body_size} bytes)",
            req.uri().path()
        ));
        http::build_413_response()
    } else {
        let (parts, body) = req.into_parts();
        let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);

        match Limited::new(body, limit).collect().await {
            Ok(collected) => {
                let req = Request::from_parts(parts, collected.to_bytes());
                state.router.dispatch(&req).await
            }
            Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
                logger::log_error(&format!(
                    "Request body too large for {} (max: {max_body_size} bytes)",
                    parts.uri.path()
                ));
                http::build_413_response()
            }
            Err(e) => {
                logger::log_warning(&format!("Failed to read request body: {e}"));
                http::build_400_response()
            }
        }
    };

    let access_entry = access_entry.map(|entry| complete_entry(entry, &response, started));
    (response, access_entry)
}

/// Whether a declared Content-Length exceeds the limit
///
/// A missing or unparsable header is not rejected here; the streaming limit
/// still applies while the body is collected.
fn exceeds_body_limit(headers: &HeaderMap, max_body_size: u64) -> bool {
    let Some(content_length) = headers.get("content-length") else {
        return false;
    };
    match content_length.to_str().map(str::parse::<u64>) {
        Ok(Ok(size)) => size > max_body_size,
        Ok(Err(_)) => {
            logger::log_warning("Invalid Content-Length value, skipping size check");
            false
        }
        Err(_) => {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            false
        }
    }
}

fn with_server_header(mut response: Response<Full<Bytes>>, server_name: &str) -> Response<Full<Bytes>> {
    if let Ok(value) = server_name.parse() {
        response.headers_mut().insert("Server", value);
    }
    response
}

/// Capture the request side of an access log line before the body is consumed
fn access_log_entry<B>(req: &Request<B>, peer_addr: SocketAddr) -> AccessLogEntry {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = logger::format_version(req.version());
    entry.referer = header("referer");
    entry.user_agent = header("user-agent");
    entry
}

fn complete_entry(
    mut entry: AccessLogEntry,
    response: &Response<Full<Bytes>>,
    started: Instant,
) -> AccessLogEntry {
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}
