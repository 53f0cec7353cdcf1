//! HTTP response building module
//!
//! Provides builders for the status code responses the server emits, decoupled from specific business logic.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

/// Body used for 500 responses when storage errors are not exposed
pub const INTERNAL_ERROR_BODY: &str = "500 Internal Server Error";

/// Build 400 Bad Request response
pub fn build_400_response() -> Response<Full<Bytes>> {
    build_text_response(400, "400 Bad Request")
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    build_text_response(404, "404 Not Found")
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> Response<Full<Bytes>> {
    build_text_response(413, "413 Payload Too Large")
}

/// Build 500 Internal Server Error response carrying `message` as body
pub fn build_500_response(message: &str) -> Response<Full<Bytes>> {
    build_text_response(500, message)
}

/// Build 503 Service Unavailable response
pub fn build_503_response(message: &str) -> Response<Full<Bytes>> {
    build_text_response(503, message)
}

/// Build health check response
pub fn build_health_response(status: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(200)
        .header("Content-Type", "text/plain")
        .header("Cache-Control", "no-cache, no-store")
        .body(Full::new(Bytes::from(status.to_string())))
        .unwrap_or_else(|e| {
            log_build_error("health", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 302 redirect response
///
/// A target that is not a valid header value yields a 500 rather than a
/// redirect without `Location`.
pub fn build_redirect_response(target: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(302)
        .header("Location", target)
        .header("Content-Type", "text/plain")
        .body(Full::new(Bytes::from("Redirecting...")))
        .unwrap_or_else(|e| {
            log_build_error("302", &e);
            build_500_response(INTERNAL_ERROR_BODY)
        })
}

/// Build 200 HTML response from rendered bytes
pub fn build_html_response(content: Vec<u8>) -> Response<Full<Bytes>> {
    let content_length = content.len();

    Response::builder()
        .status(200)
        .header("Content-Type", "text/html; charset=utf-8")
        .header("Content-Length", content_length)
        .body(Full::new(Bytes::from(content)))
        .unwrap_or_else(|e| {
            log_build_error("HTML", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

fn build_text_response(status: u16, body: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain; charset=utf-8")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap_or_else(|e| {
            log_build_error(&status.to_string(), &e);
            Response::new(Full::new(Bytes::from(body.to_string())))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_sets_location() {
        let resp = build_redirect_response("/myAddress");
        assert_eq!(resp.status(), 302);
        assert_eq!(resp.headers()["Location"], "/myAddress");
    }

    #[test]
    fn test_invalid_redirect_target_is_500() {
        let resp = build_redirect_response("/saved\r\nSet-Cookie: x=1");
        assert_eq!(resp.status(), 500);
        assert!(resp.headers().get("Location").is_none());
    }

    #[test]
    fn test_html_response_headers() {
        let resp = build_html_response(b"<p>hi</p>".to_vec());
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["Content-Type"], "text/html; charset=utf-8");
        assert_eq!(resp.headers()["Content-Length"], "9");
    }

    #[test]
    fn test_error_statuses() {
        assert_eq!(build_400_response().status(), 400);
        assert_eq!(build_404_response().status(), 404);
        assert_eq!(build_413_response().status(), 413);
        assert_eq!(build_500_response("boom").status(), 500);
        assert_eq!(build_503_response("down").status(), 503);
    }
}
