//! Template engine for client generation using Handlebars.
//!
//! Wraps Handlebars with the built-in TypeScript client templates
//! pre-registered. Output is source code, so HTML escaping is disabled.
//!
//! # Examples
//!
//! ```
//! use apiforge_codegen::template_engine::TemplateEngine;
//! use serde_json::json;
//!
//! let mut engine = TemplateEngine::new().unwrap();
//! engine.register_template_string("greeting", "// {{name}}").unwrap();
//! assert_eq!(engine.render("greeting", &json!({"name": "a < b"})).unwrap(), "// a < b");
//! ```

use apiforge_core::{Error, Result};
use handlebars::Handlebars;
use serde::Serialize;

const TEMPLATES: &[(&str, &str)] = &[
    ("runtime", include_str!("../templates/runtime.ts.hbs")),
    ("client", include_str!("../templates/client.ts.hbs")),
    ("segment", include_str!("../templates/segment.ts.hbs")),
];

const PARTIALS: &[(&str, &str)] = &[
    ("method", include_str!("../templates/partials/method.ts.hbs")),
    ("transport", include_str!("../templates/partials/transport.ts.hbs")),
];

/// Template engine for client generation.
///
/// # Thread Safety
///
/// This type is `Send` and `Sync`, so one engine can render from several
/// threads.
#[derive(Debug)]
pub struct TemplateEngine<'a> {
    handlebars: Handlebars<'a>,
}

impl<'a> TemplateEngine<'a> {
    /// Creates an engine with all built-in templates registered.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Template`] if a built-in template fails to compile.
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();

        // Strict mode: fail on missing variables
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::no_escape);

        for (name, source) in PARTIALS {
            handlebars
                .register_partial(name, *source)
                .map_err(|e| Error::Template {
                    message: format!("failed to register partial '{name}': {e}"),
                })?;
        }

        for (name, source) in TEMPLATES {
            handlebars
                .register_template_string(name, *source)
                .map_err(|e| Error::Template {
                    message: format!("failed to register template '{name}': {e}"),
                })?;
        }

        Ok(Self { handlebars })
    }

    /// Renders a registered template.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Template`] if the template is unknown or the context
    /// lacks a referenced field.
    pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String> {
        self.handlebars
            .render(template_name, context)
            .map_err(|e| Error::Template {
                message: format!("rendering '{template_name}' failed: {e}"),
            })
    }

    /// Registers an additional template.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Template`] if the template does not compile.
    pub fn register_template_string(&mut self, name: &str, template: &str) -> Result<()> {
        self.handlebars
            .register_template_string(name, template)
            .map_err(|e| Error::Template {
                message: format!("failed to register template '{name}': {e}"),
            })
    }

    /// Returns `true` if a template with this name is registered.
    #[must_use]
    pub fn has_template(&self, name: &str) -> bool {
        self.handlebars.has_template(name)
    }
}
