//! Request routing dispatch module
//!
//! Exact-match table from URL path to controller. No prefix, wildcard or
//! parameter matching, and the HTTP method is not part of the key.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Request, Response};
use std::collections::HashMap;
use std::sync::Arc;

use crate::controller::Controller;
use crate::http;

/// Path-to-controller table, filled at startup and read-only while serving
#[derive(Default)]
pub struct Router {
    routes: HashMap<String, Arc<dyn Controller>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `path` to `controller`, returning the controller it replaces
    pub fn register(
        &mut self,
        path: impl Into<String>,
        controller: Arc<dyn Controller>,
    ) -> Option<Arc<dyn Controller>> {
        self.routes.insert(path.into(), controller)
    }

    /// Whether `path` has a controller bound
    #[cfg(test)]
    pub fn contains(&self, path: &str) -> bool {
        self.routes.contains_key(path)
    }

    /// Hand the request to the controller bound to its exact path, or answer 404
    pub async fn dispatch(&self, req: &Request<Bytes>) -> Response<Full<Bytes>> {
        match self.routes.get(req.uri().path()) {
            Some(controller) => controller.handle_request(req).await,
            None => http::build_404_response(),
        }
    }
}
