use async_trait::async_trait;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Request, Response};
use minijinja::Value;
use std::sync::Arc;

use super::Controller;
use crate::http::{self, FormValues};
use crate::logger;
use crate::model::{Model, User};
use crate::storage::{Database, StorageError};
use crate::view::View;

const RENDER_ERROR_BODY: &str = "Error rendering HTML template";

/// Saves the submitted user and renders the confirmation page
pub struct UserController {
    db: Arc<dyn Database>,
    view: Arc<dyn View>,
    expose_errors: bool,
}

impl UserController {
    pub fn new(db: Arc<dyn Database>, view: Arc<dyn View>, expose_errors: bool) -> Self {
        Self {
            db,
            view,
            expose_errors,
        }
    }
}

#[async_trait]
impl Controller for UserController {
    async fn handle_request(&self, req: &Request<Bytes>) -> Response<Full<Bytes>> {
        let user = match save_submitted_user(self.db.as_ref(), req).await {
            Ok(user) => user,
            Err(e) => return storage_error_response(&e, self.expose_errors),
        };

        render_user(self.view.as_ref(), &user, req)
    }
}

/// Saves the submitted user and redirects to a fixed path
pub struct AddUserController {
    db: Arc<dyn Database>,
    redirect_to: String,
    expose_errors: bool,
}

impl AddUserController {
    pub fn new(db: Arc<dyn Database>, redirect_to: String, expose_errors: bool) -> Self {
        Self {
            db,
            redirect_to,
            expose_errors,
        }
    }
}

#[async_trait]
impl Controller for AddUserController {
    async fn handle_request(&self, req: &Request<Bytes>) -> Response<Full<Bytes>> {
        match save_submitted_user(self.db.as_ref(), req).await {
            Ok(_) => http::build_redirect_response(&self.redirect_to),
            Err(e) => storage_error_response(&e, self.expose_errors),
        }
    }
}

/// Renders the most recently saved user without writing anything.
/// Target of the add route's redirect.
pub struct SavedUserController {
    db: Arc<dyn Database>,
    view: Arc<dyn View>,
    expose_errors: bool,
}

impl SavedUserController {
    pub fn new(db: Arc<dyn Database>, view: Arc<dyn View>, expose_errors: bool) -> Self {
        Self {
            db,
            view,
            expose_errors,
        }
    }
}

#[async_trait]
impl Controller for SavedUserController {
    async fn handle_request(&self, req: &Request<Bytes>) -> Response<Full<Bytes>> {
        match User::latest(self.db.as_ref()).await {
            Ok(Some(user)) => render_user(self.view.as_ref(), &user, req),
            Ok(None) => http::build_404_response(),
            Err(e) => storage_error_response(&e, self.expose_errors),
        }
    }
}

fn render_user(view: &dyn View, user: &User, req: &Request<Bytes>) -> Response<Full<Bytes>> {
    let mut page = Vec::new();
    match view.render(&mut page, &Value::from_serialize(user)) {
        Ok(()) => http::build_html_response(page),
        Err(e) => {
            logger::log_error(&format!(
                "Failed to render page for {}: {e}",
                req.uri().path()
            ));
            http::build_500_response(RENDER_ERROR_BODY)
        }
    }
}

/// Build a user from the `username` and `email` form fields and save it.
/// Missing fields become empty strings.
async fn save_submitted_user(
    db: &dyn Database,
    req: &Request<Bytes>,
) -> Result<User, StorageError> {
    let form = FormValues::from_request(req);
    let mut user = User::new(form.value("username"), form.value("email"));
    user.save(db).await?;
    Ok(user)
}

fn storage_error_response(error: &StorageError, expose: bool) -> Response<Full<Bytes>> {
    logger::log_error(&format!("Storage error: {error}"));
    if expose {
        http::build_500_response(&error.to_string())
    } else {
        http::build_500_response(http::INTERNAL_ERROR_BODY)
    }
}
