//! Placeholder substitution.
//!
//! `{{key}}` is replaced by the string form of `context["key"]`. There are
//! no loops, conditionals or filters, and no escaping: the output is only
//! as safe as the values put into the context.

use crate::error::ServerResult;
use crate::transform::DataTransformer;
use log::debug;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

pub type Context = Map<String, Value>;

pub const DEFAULT_TEMPLATE_DIR: &str = "templates";

#[derive(Debug, Clone)]
pub struct TemplateEngine {
    template_dir: PathBuf,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE_DIR)
    }
}

impl TemplateEngine {
    pub fn new<P: AsRef<Path>>(template_dir: P) -> Self {
        Self {
            template_dir: template_dir.as_ref().to_path_buf(),
        }
    }

    pub fn template_dir(&self) -> &Path {
        &self.template_dir
    }

    /// Loads `template_dir/name` and substitutes `context` into it.
    pub fn render(&self, name: &str, context: &Context) -> ServerResult<String> {
        let path = self.template_dir.join(name);
        debug!("loading template {}", path.display());
        let template = fs::read_to_string(&path)?;
        Ok(interpolate(&template, context))
    }

    pub fn render_string(&self, template: &str, context: &Context) -> String {
        interpolate(template, context)
    }
}

// Keys are applied in insertion order; a value that itself contains a
// placeholder for a later key is substituted again.
fn interpolate(template: &str, context: &Context) -> String {
    let mut result = template.to_string();
    for (key, value) in context {
        let placeholder = format!("{{{{{}}}}}", key);
        if result.contains(&placeholder) {
            result = result.replace(&placeholder, &DataTransformer::stringify(value));
        }
    }
    result
}
