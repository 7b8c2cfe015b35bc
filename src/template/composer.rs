//! Header-prepending template loader

use super::source::{LoadedTemplate, TemplateError, TemplateSource};

/// Header template holding the shared macros
pub const DEFAULT_HEADER: &str = "_header.xml";

/// Root template every render starts from
pub const DEFAULT_ROOT: &str = "layout.xml";

/// Wraps a [`TemplateSource`] and prepends a header template to every load
///
/// The composer keeps no copies of its own. The engine caches what it loads for
/// the life of one render, and [`LoadedTemplate::freshness`] tells long-lived
/// callers when a composed source no longer matches the files on disk.
#[derive(Debug)]
pub struct TemplateComposer<S> {
    source: S,
    header: String,
}

impl<S: TemplateSource> TemplateComposer<S> {
    pub fn new(source: S, header: impl Into<String>) -> Self {
        Self {
            source,
            header: header.into(),
        }
    }

    /// Name of the prepended header template
    pub fn header(&self) -> &str {
        &self.header
    }

    /// The wrapped source
    pub fn inner(&self) -> &S {
        &self.source
    }

    /// Composed source text of `name`, read from disk
    pub fn load(&self, name: &str) -> Result<String, TemplateError> {
        let loaded = self.get_source(name)?;
        tracing::debug!(template = name, path = %loaded.filename.display(), "loaded template");
        Ok(loaded.source)
    }
}

impl<S: TemplateSource> TemplateSource for TemplateComposer<S> {
    fn get_source(&self, name: &str) -> Result<LoadedTemplate, TemplateError> {
        let header = self.source.get_source(&self.header)?;
        let main = self.source.get_source(name)?;

        Ok(LoadedTemplate {
            source: header.source + &main.source,
            filename: main.filename,
            freshness: header.freshness.and(main.freshness),
        })
    }

    fn list_templates(&self) -> Result<Vec<String>, TemplateError> {
        self.source.list_templates()
    }
}
