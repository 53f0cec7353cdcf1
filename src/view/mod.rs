//! View module
//!
//! Renders data into the HTML page returned to the browser.

use minijinja::{Environment, UndefinedBehavior, Value};
use std::io;
use std::path::{Path, PathBuf};

/// Name the page template is registered under. The `.html` suffix turns on
/// HTML auto-escaping.
const TEMPLATE_NAME: &str = "index.html";

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to read template {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Template(#[from] minijinja::Error),

    #[error("failed to write rendered page: {0}")]
    Write(#[source] io::Error),
}

/// Writes a data value into a page and streams it to `sink`
pub trait View: Send + Sync {
    fn render(&self, sink: &mut dyn io::Write, data: &Value) -> Result<(), RenderError>;
}

/// Template-backed HTML view
pub struct HtmlView {
    env: Environment<'static>,
}

impl HtmlView {
    /// Load and parse the template file once
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RenderError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_source(source)
    }

    pub fn from_source(source: impl Into<String>) -> Result<Self, RenderError> {
        let mut env = Environment::new();
        // Referencing a field missing from the data is an error, not an empty string
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.add_template_owned(TEMPLATE_NAME, source.into())?;
        Ok(Self { env })
    }
}

impl View for HtmlView {
    fn render(&self, sink: &mut dyn io::Write, data: &Value) -> Result<(), RenderError> {
        let page = self.env.get_template(TEMPLATE_NAME)?.render(data)?;
        sink.write_all(page.as_bytes()).map_err(RenderError::Write)
    }
}
