//! Rendering of a [`ClientModule`] into source text
//!
//! Each target language gets a [`Renderer`]. Renderers build a language-specific
//! view of the module first and then feed it to an embedded tera template.

pub mod python;
pub mod sanitizers;

use crate::config::TargetLanguage;
use crate::error::Result;
use crate::generation::ClientModule;

pub use python::PythonRenderer;

/// Turns a generated module into source code for one language
pub trait Renderer {
    fn language(&self) -> TargetLanguage;

    /// Imports the rendered body depends on
    fn preamble(&self) -> &'static str;

    /// Render enums, declarations, services and the façade, without the preamble
    fn render(&self, module: &ClientModule) -> Result<String>;
}

/// Renderer for a target language
pub fn renderer_for(target: TargetLanguage) -> Box<dyn Renderer> {
    match target {
        TargetLanguage::Python => Box::new(PythonRenderer::new()),
    }
}
