//! Archive container abstraction.
//!
//! Monthly archives are zip files on disk, but the archival logic only
//! depends on the narrow capability set below (open, list, read, replace,
//! commit), so another container format can be substituted without touching
//! the writer.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Failure raised by a container implementation.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    #[error("container I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("container is corrupt or not a supported format: {0}")]
    Format(String),

    #[error("no entry named {0:?}")]
    MissingEntry(String),
}

impl From<ZipError> for ContainerError {
    fn from(err: ZipError) -> Self {
        match err {
            ZipError::Io(io) => ContainerError::Io(io),
            other => ContainerError::Format(other.to_string()),
        }
    }
}

/// An entry-addressed archive container.
///
/// Entries are keyed by name. Mutations are buffered in memory and only
/// reach disk on `commit`, which replaces the backing file atomically.
pub trait ArchiveContainer: Sized {
    /// Open the container at `path`, creating an empty one in memory if no
    /// file exists yet.
    fn open(path: &Path) -> Result<Self, ContainerError>;

    /// Names of the entries currently in the container, sorted.
    fn entry_names(&self) -> Vec<String>;

    /// Full content of the named entry.
    fn read_entry(&self, name: &str) -> Result<Vec<u8>, ContainerError>;

    /// Insert an entry, replacing any existing entry with the same name.
    fn put_entry(&mut self, name: &str, content: Vec<u8>);

    /// Drop the named entry. Returns whether it was present.
    fn remove_entry(&mut self, name: &str) -> bool;

    /// Write the container back to disk durably.
    fn commit(self) -> Result<(), ContainerError>;
}

/// Zip-backed container. Existing entries are loaded up front; `commit`
/// rewrites the whole file, since zip does not support in-place entry
/// replacement.
pub struct ZipContainer {
    path: PathBuf,
    entries: BTreeMap<String, Vec<u8>>,
}

impl ArchiveContainer for ZipContainer {
    fn open(path: &Path) -> Result<Self, ContainerError> {
        let mut entries = BTreeMap::new();

        match File::open(path) {
            Ok(file) => {
                let mut archive = ZipArchive::new(file)?;
                for index in 0..archive.len() {
                    let mut entry = archive.by_index(index)?;
                    let mut content = Vec::with_capacity(entry.size() as usize);
                    entry.read_to_end(&mut content)?;
                    entries.insert(entry.name().to_string(), content);
                }
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    fn entry_names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    fn read_entry(&self, name: &str) -> Result<Vec<u8>, ContainerError> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| ContainerError::MissingEntry(name.to_string()))
    }

    fn put_entry(&mut self, name: &str, content: Vec<u8>) {
        self.entries.insert(name.to_string(), content);
    }

    fn remove_entry(&mut self, name: &str) -> bool {
        self.entries.remove(name).is_some()
    }

    fn commit(self) -> Result<(), ContainerError> {
        // Write a sibling temp file, then rename over the target so a crash
        // mid-write can never leave a truncated container behind.
        let tmp = self.path.with_extension("zip.tmp");
        let file = File::create(&tmp)?;
        let mut writer = ZipWriter::new(file);

        for (name, content) in &self.entries {
            let options =
                SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
            writer.start_file(name.as_str(), options)?;
            writer.write_all(content)?;
        }

        let file = writer.finish()?;
        file.sync_all()?;
        fs::rename(&tmp, &self.path)?;

        Ok(())
    }
}
