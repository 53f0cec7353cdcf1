//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from the controllers.

pub mod form;
pub mod response;

// Re-export commonly used types
pub use form::FormValues;
pub use response::{
    build_400_response, build_404_response, build_413_response, build_500_response,
    build_503_response, build_health_response, build_html_response, build_redirect_response,
    INTERNAL_ERROR_BODY,
};
