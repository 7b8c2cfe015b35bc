//! Template loading with an injected header fragment
//!
//! Templates live in a single directory. Every template handed to the
//! rendering engine is the concatenation of a fixed header template (holding
//! the shared macro definitions) and the requested template, so macros
//! defined once in the header are callable from every layout fragment.
//!
//! ```text
//! templates/
//!   _header.xml     macros, prepended to everything below
//!   layout.xml      root template
//!   component.xml   included per component
//! ```

mod composer;
mod source;

pub use composer::{TemplateComposer, DEFAULT_HEADER, DEFAULT_ROOT};
pub use source::{FileStamp, FileSystemSource, Freshness, LoadedTemplate, TemplateError, TemplateSource};
