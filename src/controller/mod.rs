//! Controller module
//!
//! One controller per route. Each receives the whole request with its body
//! already collected and produces the whole response.

mod health;
mod user;

use async_trait::async_trait;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Request, Response};
use std::sync::Arc;

use crate::config::Config;
use crate::handler::Router;
use crate::storage::Database;
use crate::view::View;

pub use health::{LivenessController, ReadinessController};
pub use user::{AddUserController, SavedUserController, UserController};

/// Handles one request
#[async_trait]
pub trait Controller: Send + Sync {
    async fn handle_request(&self, req: &Request<Bytes>) -> Response<Full<Bytes>>;
}

/// Wire every configured route to its controller
pub fn build_router(cfg: &Config, db: Arc<dyn Database>, view: Arc<dyn View>) -> Router {
    let expose_errors = cfg.http.expose_storage_errors;
    let mut router = Router::new();

    router.register(
        cfg.routes.create_path.as_str(),
        Arc::new(UserController::new(
            Arc::clone(&db),
            Arc::clone(&view),
            expose_errors,
        )),
    );
    router.register(
        cfg.routes.add_path.as_str(),
        Arc::new(AddUserController::new(
            Arc::clone(&db),
            cfg.routes.render_path.clone(),
            expose_errors,
        )),
    );
    router.register(
        cfg.routes.render_path.as_str(),
        Arc::new(SavedUserController::new(Arc::clone(&db), view, expose_errors)),
    );

    let health = &cfg.routes.health;
    if health.enabled {
        router.register(health.liveness_path.as_str(), Arc::new(LivenessController));
        router.register(
            health.readiness_path.as_str(),
            Arc::new(ReadinessController::new(db)),
        );
    }

    router
}
