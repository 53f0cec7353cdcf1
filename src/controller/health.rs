use async_trait::async_trait;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Request, Response};
use std::sync::Arc;

use super::Controller;
use crate::http;
use crate::logger;
use crate::storage::{Database, Row, SqlValue};

const READINESS_PROBE: &str = "SELECT 1 AS ok";

/// Liveness probe, always "ok" while the process serves requests
pub struct LivenessController;

#[async_trait]
impl Controller for LivenessController {
    async fn handle_request(&self, _req: &Request<Bytes>) -> Response<Full<Bytes>> {
        http::build_health_response("ok")
    }
}

/// Readiness probe, "ok" only when the database answers
pub struct ReadinessController {
    db: Arc<dyn Database>,
}

impl ReadinessController {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Controller for ReadinessController {
    async fn handle_request(&self, _req: &Request<Bytes>) -> Response<Full<Bytes>> {
        match self.db.query(READINESS_PROBE, &[]).await {
            Ok(rows) if probe_succeeded(&rows) => http::build_health_response("ok"),
            Ok(_) => {
                logger::log_warning("Readiness probe returned an unexpected result");
                http::build_503_response("database unavailable")
            }
            Err(e) => {
                logger::log_warning(&format!("Readiness probe failed: {e}"));
                http::build_503_response("database unavailable")
            }
        }
    }
}

fn probe_succeeded(rows: &[Row]) -> bool {
    rows.first().and_then(|row| row.get("ok")) == Some(&SqlValue::Integer(1))
}
