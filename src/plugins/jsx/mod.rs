//! JSX plugin for React-style component trees

mod document;
pub mod parser;

pub use document::JsxDocument;

use crate::plugin::{Document, ParseError, Plugin};
use std::path::Path;

/// JSX plugin for `.jsx`, `.tsx` and `.js` files
pub struct JsxPlugin {
    version: String,
}

impl Default for JsxPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl JsxPlugin {
    pub fn new() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl Plugin for JsxPlugin {
    fn id(&self) -> &str {
        "jsx"
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn description(&self) -> &str {
        "JSX/TSX scanner"
    }

    fn extensions(&self) -> &[&str] {
        &["jsx", "tsx", "js"]
    }

    fn parse(&self, content: &str, path: &Path) -> Result<Box<dyn Document>, ParseError> {
        let doc = JsxDocument::parse(content, path)?;
        Ok(Box::new(doc))
    }
}
