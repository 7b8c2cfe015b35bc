//! TouchOSC Compiler - JSON control-surface descriptions to TouchOSC layouts
//!
//! A description lists pages, controls and repeated groups as JSON; a directory
//! of Jinja-style templates turns it into the `index.xml` layout that TouchOSC
//! loads from a `.touchosc` archive.
//!
//! Template text fields may reference description values with placeholder
//! tokens (`{{data.path}}`, `{{args.path}}`) and loop markers (`@index`,
//! `@index_0`, `@column`, `@row`), expanded by the `placeholders` filter.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use touchosc_compiler::{render, Description};
//!
//! let description = Description::from_file(Path::new("demos/mixer.json")).unwrap();
//! let xml = render(&description, "layout.xml", Path::new("templates")).unwrap();
//! assert!(xml.contains("<layout"));
//! ```

pub mod description;
pub mod filters;
pub mod output;
pub mod placeholder;
pub mod settings;
pub mod template;

pub use description::{Description, DescriptionError};
pub use output::{write_output, OutputError, OutputOptions, OutputPaths};
pub use placeholder::{LoopContext, Namespace, PlaceholderError, PlaceholderPolicy};
pub use settings::{Settings, SettingsError};
pub use template::{TemplateComposer, TemplateError, DEFAULT_HEADER, DEFAULT_ROOT};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use minijinja::{context, AutoEscape, Environment, ErrorKind, Value};
use thiserror::Error;

use filters::PlaceholderFilter;
use template::{FileSystemSource, TemplateSource};

/// Errors that can occur during the render pipeline
#[derive(Debug, Error)]
pub enum RenderError {
    /// Root or header template missing, or unreadable
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// A placeholder failed to resolve under strict policy
    #[error(transparent)]
    Placeholder(#[from] PlaceholderError),

    /// Any other template engine failure (syntax errors, bad filter arguments, …)
    #[error("template error: {0:#}")]
    Engine(minijinja::Error),
}

impl From<minijinja::Error> for RenderError {
    fn from(err: minijinja::Error) -> Self {
        // Typed errors raised inside the engine travel as error sources
        if let Some(placeholder) = find_source::<PlaceholderError>(&err) {
            return RenderError::Placeholder(placeholder.clone());
        }
        if err.kind() == ErrorKind::TemplateNotFound {
            if let Some(TemplateError::NotFound { name, path }) = find_source::<TemplateError>(&err) {
                return RenderError::Template(TemplateError::NotFound {
                    name: name.clone(),
                    path: path.clone(),
                });
            }
        }
        RenderError::Engine(err)
    }
}

fn find_source<E: std::error::Error + 'static>(err: &minijinja::Error) -> Option<&E> {
    let mut source = std::error::Error::source(err);
    while let Some(current) = source {
        if let Some(found) = current.downcast_ref::<E>() {
            return Some(found);
        }
        source = current.source();
    }
    None
}

/// Configuration for the complete render pipeline
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Directory holding all templates
    pub templates_dir: PathBuf,
    /// Template rendering starts from
    pub root_template: String,
    /// Template prepended to every loaded template
    pub header_template: String,
    /// Handling of unresolved placeholders
    pub policy: PlaceholderPolicy,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            templates_dir: PathBuf::from("templates"),
            root_template: DEFAULT_ROOT.to_string(),
            header_template: DEFAULT_HEADER.to_string(),
            policy: PlaceholderPolicy::strict(),
        }
    }
}

impl RenderConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the template directory
    pub fn with_templates_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.templates_dir = dir.into();
        self
    }

    /// Set the root template name
    pub fn with_root_template(mut self, name: impl Into<String>) -> Self {
        self.root_template = name.into();
        self
    }

    /// Set the header template name
    pub fn with_header_template(mut self, name: impl Into<String>) -> Self {
        self.header_template = name.into();
        self
    }

    /// Set the placeholder policy
    pub fn with_policy(mut self, policy: PlaceholderPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Template composer over the configured directory
    pub fn composer(&self) -> TemplateComposer<FileSystemSource> {
        TemplateComposer::new(
            FileSystemSource::new(&self.templates_dir),
            self.header_template.clone(),
        )
    }
}

/// Render a description starting at `root_template` with strict placeholders
pub fn render(
    description: &Description,
    root_template: &str,
    templates_dir: &Path,
) -> Result<String, RenderError> {
    let config = RenderConfig::new()
        .with_templates_dir(templates_dir)
        .with_root_template(root_template);
    render_with_config(description, &config)
}

/// Render a description with custom configuration
pub fn render_with_config(
    description: &Description,
    config: &RenderConfig,
) -> Result<String, RenderError> {
    let composer = config.composer();
    let root_path = composer.inner().resolve_path(&config.root_template)?;
    if !root_path.is_file() {
        return Err(TemplateError::NotFound {
            name: config.root_template.clone(),
            path: root_path,
        }
        .into());
    }

    let env = build_environment(description, composer, config.policy);
    tracing::debug!(
        root = %root_path.display(),
        header = %config.header_template,
        "rendering description"
    );

    let template = env.get_template(&config.root_template)?;
    let xml = template.render(context! {
        component => Value::from_serialize(description.root()),
    })?;
    Ok(xml)
}

/// Build the per-render environment: loader, filters and globals
///
/// Everything the templates can see is fixed here; nothing is registered
/// after rendering starts.
pub fn build_environment<S>(
    description: &Description,
    composer: TemplateComposer<S>,
    policy: PlaceholderPolicy,
) -> Environment<'static>
where
    S: TemplateSource + 'static,
{
    let mut env = Environment::new();
    // Layouts are XML but values are inserted verbatim, as TouchOSC expects
    env.set_auto_escape_callback(|_| AutoEscape::None);

    let composer = Arc::new(composer);
    env.set_loader(move |name| match composer.load(name) {
        Ok(source) => Ok(Some(source)),
        Err(err) => Err(minijinja::Error::new(ErrorKind::TemplateNotFound, err.to_string()).with_source(err)),
    });

    filters::register(&mut env, PlaceholderFilter::new(description.data(), policy));

    let data = description.data();
    env.add_global("data", global_or_none(data));
    // Reusable components are only offered alongside a data tree
    let reusable = data.and(description.reusable_components());
    env.add_global("reusable_components", global_or_none(reusable));

    env
}

fn global_or_none(value: Option<&serde_json::Value>) -> Value {
    match value {
        Some(value) => Value::from_serialize(value),
        None => Value::from(()),
    }
}
