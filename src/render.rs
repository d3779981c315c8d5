//! View rendering collaborator used to build message bodies.

use crate::error::RenderError;
use serde_json::{Map, Value};
use tracing::warn;

/// Renders a named view with a data context into message body text.
///
/// Implementations live outside the core; channels that tolerate a missing
/// template convert render failures into an empty body.
pub trait ViewRenderer: Send + Sync {
    fn render(&self, view: &str, data: &Map<String, Value>) -> Result<String, RenderError>;
}

/// A renderer that produces empty bodies, for wiring without templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRenderer;

impl ViewRenderer for NoopRenderer {
    fn render(&self, _view: &str, _data: &Map<String, Value>) -> Result<String, RenderError> {
        Ok(String::new())
    }
}

/// Renders a view, degrading render failures to an empty body.
pub(crate) fn render_or_empty(
    renderer: &dyn ViewRenderer,
    view: &str,
    data: &Map<String, Value>,
) -> String {
    match renderer.render(view, data) {
        Ok(body) => body,
        Err(e) => {
            warn!(view, error = %e, "view rendering failed, using empty body");
            String::new()
        }
    }
}
