//! Directory-backed template sources

use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use thiserror::Error;
use walkdir::WalkDir;

/// Errors that can occur while loading templates
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Template file does not exist
    #[error("template {name} not found at {}", path.display())]
    NotFound { name: String, path: PathBuf },

    /// Name escapes the template directory or is otherwise unusable
    #[error("invalid template name: {name}")]
    InvalidName { name: String },

    /// Error reading template file
    #[error("error reading template file {}: {source}", path.display())]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error walking the template directory
    #[error("error listing templates in {}: {message}", path.display())]
    ListError { path: PathBuf, message: String },
}

/// Snapshot of a file's metadata at load time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStamp {
    path: PathBuf,
    modified: Option<SystemTime>,
    len: u64,
}

impl FileStamp {
    /// Record the current state of `path`
    pub fn capture(path: &Path) -> std::io::Result<Self> {
        let metadata = std::fs::metadata(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            modified: metadata.modified().ok(),
            len: metadata.len(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The file still exists and looks the same as when stamped
    pub fn is_current(&self) -> bool {
        match Self::capture(&self.path) {
            Ok(now) => now == *self,
            Err(_) => false,
        }
    }
}

/// Up-to-date signal of a loaded template
///
/// A template built from several files is fresh only while all of them are.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Freshness {
    stamps: Vec<FileStamp>,
}

impl Freshness {
    pub fn from_stamp(stamp: FileStamp) -> Self {
        Self {
            stamps: vec![stamp],
        }
    }

    /// Combine two signals; the result is fresh only if both are
    pub fn and(mut self, other: Freshness) -> Self {
        self.stamps.extend(other.stamps);
        self
    }

    pub fn is_up_to_date(&self) -> bool {
        self.stamps.iter().all(FileStamp::is_current)
    }

    pub fn stamps(&self) -> &[FileStamp] {
        &self.stamps
    }
}

/// Template text together with where it came from
#[derive(Debug, Clone)]
pub struct LoadedTemplate {
    pub source: String,
    pub filename: PathBuf,
    pub freshness: Freshness,
}

/// Provider of template sources by name
pub trait TemplateSource: Send + Sync {
    /// Load the source of template `name`
    fn get_source(&self, name: &str) -> Result<LoadedTemplate, TemplateError>;

    /// Names of all templates this source can load, sorted
    fn list_templates(&self) -> Result<Vec<String>, TemplateError>;
}

/// Read-only template source scoped to one directory
#[derive(Debug, Clone)]
pub struct FileSystemSource {
    root: PathBuf,
}

impl FileSystemSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a `/`-separated template name to a path below the root
    pub fn resolve_path(&self, name: &str) -> Result<PathBuf, TemplateError> {
        let mut path = self.root.clone();
        for segment in name.split('/') {
            let mut components = Path::new(segment).components();
            match (components.next(), components.next()) {
                (Some(Component::Normal(part)), None) => path.push(part),
                _ => {
                    return Err(TemplateError::InvalidName {
                        name: name.to_string(),
                    })
                }
            }
        }
        Ok(path)
    }

    /// Whether template `name` exists as a file
    pub fn contains(&self, name: &str) -> bool {
        self.resolve_path(name).map(|p| p.is_file()).unwrap_or(false)
    }
}

impl TemplateSource for FileSystemSource {
    fn get_source(&self, name: &str) -> Result<LoadedTemplate, TemplateError> {
        let path = self.resolve_path(name)?;
        if !path.is_file() {
            return Err(TemplateError::NotFound {
                name: name.to_string(),
                path,
            });
        }

        // Stamp before reading so an edit during the read marks it stale
        let stamp = FileStamp::capture(&path).map_err(|source| TemplateError::FileReadError {
            path: path.clone(),
            source,
        })?;
        let source =
            std::fs::read_to_string(&path).map_err(|source| TemplateError::FileReadError {
                path: path.clone(),
                source,
            })?;

        Ok(LoadedTemplate {
            source,
            filename: path,
            freshness: Freshness::from_stamp(stamp),
        })
    }

    fn list_templates(&self) -> Result<Vec<String>, TemplateError> {
        let mut names = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(true) {
            let entry = entry.map_err(|e| TemplateError::ListError {
                path: self.root.clone(),
                message: e.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(&self.root) {
                let name = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}
