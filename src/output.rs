//! Writing rendered layouts to disk
//!
//! The rendered XML is always staged as `index.xml` in the output directory,
//! the only entry name TouchOSC reads. From there it is zipped into
//! `<name>.touchosc` and/or kept as a plain file.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// File name of the layout inside the archive and of the staged file
pub const LAYOUT_ENTRY: &str = "index.xml";

/// Default archive extension
pub const DEFAULT_EXTENSION: &str = "touchosc";

/// Errors that can occur while writing output files
#[derive(Debug, Error)]
pub enum OutputError {
    /// Both the archive and the raw XML were disabled
    #[error("nothing to write: both the archive and the raw XML output are disabled")]
    NothingToProduce,

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create archive {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}

impl OutputError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn archive(path: &Path, source: zip::result::ZipError) -> Self {
        Self::Archive {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Where and what to write
#[derive(Debug, Clone)]
pub struct OutputOptions {
    /// Archive base name, without extension
    pub name: String,
    pub output_dir: PathBuf,
    /// Archive extension, without the dot
    pub extension: String,
    /// Keep the staged `index.xml` next to the archive
    pub keep_xml: bool,
    /// Produce the zipped archive
    pub create_archive: bool,
}

impl OutputOptions {
    pub fn new(name: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            output_dir: output_dir.into(),
            extension: DEFAULT_EXTENSION.to_string(),
            keep_xml: false,
            create_archive: true,
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_keep_xml(mut self, keep: bool) -> Self {
        self.keep_xml = keep;
        self
    }

    pub fn with_archive(mut self, create: bool) -> Self {
        self.create_archive = create;
        self
    }

    pub fn xml_path(&self) -> PathBuf {
        self.output_dir.join(LAYOUT_ENTRY)
    }

    pub fn archive_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", self.name, self.extension))
    }
}

/// Files produced by [`write_output`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputPaths {
    pub archive: Option<PathBuf>,
    pub xml: Option<PathBuf>,
}

/// Stage `xml`, then archive and/or keep it according to `options`
pub fn write_output(xml: &str, options: &OutputOptions) -> Result<OutputPaths, OutputError> {
    if !options.create_archive && !options.keep_xml {
        return Err(OutputError::NothingToProduce);
    }

    fs::create_dir_all(&options.output_dir).map_err(|e| OutputError::io(&options.output_dir, e))?;

    let xml_path = options.xml_path();
    fs::write(&xml_path, xml).map_err(|e| OutputError::io(&xml_path, e))?;

    let archive_path = options.archive_path();
    let mut paths = OutputPaths::default();

    if options.create_archive {
        write_archive(&archive_path, xml)?;
        tracing::info!(path = %archive_path.display(), "wrote archive");
        paths.archive = Some(archive_path);
    } else if archive_path.is_file() {
        // A stale archive from an earlier run would no longer match the XML
        fs::remove_file(&archive_path).map_err(|e| OutputError::io(&archive_path, e))?;
        tracing::debug!(path = %archive_path.display(), "removed stale archive");
    }

    if options.keep_xml {
        tracing::info!(path = %xml_path.display(), "wrote layout XML");
        paths.xml = Some(xml_path);
    } else {
        fs::remove_file(&xml_path).map_err(|e| OutputError::io(&xml_path, e))?;
    }

    Ok(paths)
}

fn write_archive(path: &Path, xml: &str) -> Result<(), OutputError> {
    let file = File::create(path).map_err(|e| OutputError::io(path, e))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(LAYOUT_ENTRY, options)
        .map_err(|e| OutputError::archive(path, e))?;
    zip.write_all(xml.as_bytes())
        .map_err(|e| OutputError::io(path, e))?;
    zip.finish().map_err(|e| OutputError::archive(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::tempdir;

    const XML: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?><layout/>";

    fn read_archive(path: &Path) -> Vec<(String, String)> {
        let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut entries = Vec::new();
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).unwrap();
            let mut content = String::new();
            entry.read_to_string(&mut content).unwrap();
            entries.push((entry.name().to_string(), content));
        }
        entries
    }

    #[test]
    fn test_archive_only() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out").join("mixer");
        let options = OutputOptions::new("mixer", &out);

        let paths = write_output(XML, &options).unwrap();
        assert_eq!(paths.archive, Some(out.join("mixer.touchosc")));
        assert_eq!(paths.xml, None);
        assert!(!out.join(LAYOUT_ENTRY).exists());

        let entries = read_archive(&out.join("mixer.touchosc"));
        assert_eq!(entries, vec![(LAYOUT_ENTRY.to_string(), XML.to_string())]);
    }

    #[test]
    fn test_archive_and_xml() {
        let dir = tempdir().unwrap();
        let options = OutputOptions::new("mixer", dir.path()).with_keep_xml(true);

        let paths = write_output(XML, &options).unwrap();
        assert!(paths.archive.is_some());
        assert_eq!(paths.xml, Some(dir.path().join(LAYOUT_ENTRY)));
        assert_eq!(fs::read_to_string(dir.path().join(LAYOUT_ENTRY)).unwrap(), XML);
    }

    #[test]
    fn test_xml_only_removes_stale_archive() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("mixer.touchosc"), "old").unwrap();
        let options = OutputOptions::new("mixer", dir.path())
            .with_keep_xml(true)
            .with_archive(false);

        let paths = write_output(XML, &options).unwrap();
        assert_eq!(paths.archive, None);
        assert!(!dir.path().join("mixer.touchosc").exists());
        assert!(dir.path().join(LAYOUT_ENTRY).is_file());
    }

    #[test]
    fn test_nothing_to_produce() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("never");
        let options = OutputOptions::new("mixer", &out).with_archive(false);

        let result = write_output(XML, &options);
        assert!(matches!(result, Err(OutputError::NothingToProduce)));
        assert!(!out.exists());
    }

    #[test]
    fn test_custom_extension() {
        let dir = tempdir().unwrap();
        let options = OutputOptions::new("pad", dir.path()).with_extension("zip");
        let paths = write_output(XML, &options).unwrap();
        assert_eq!(paths.archive, Some(dir.path().join("pad.zip")));
    }

    #[test]
    fn test_unwritable_output_dir() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "").unwrap();
        let options = OutputOptions::new("mixer", blocker.join("sub"));

        let result = write_output(XML, &options);
        assert!(matches!(result, Err(OutputError::Io { .. })));
    }
}
