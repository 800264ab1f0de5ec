//! JSON stores of the catalog
//!
//! One directory per period under the catalog root, each holding its
//! issues, events and editions, plus the two creator registries at the
//! root. Every store is a JSON array read whole and written whole, and
//! only when its content actually changed.

use crate::creators::Registry;
use crate::{ChangeSet, Config, Edition, Error, Event, Issue, Record, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// What reading a store that does not exist yields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    /// An empty collection
    Empty,
    /// [`Error::MissingFile`]
    Fail,
}

/// A catalog directory
#[derive(Debug, Clone)]
pub struct Catalog {
    root: PathBuf,
    config: Config,
}

impl Catalog {
    /// Open the catalog rooted at `config.data_dir`
    pub fn from_config(config: Config) -> Result<Self> {
        let root = config.data_dir.clone();
        Self::open(root, config)
    }

    /// Open the catalog at `root`; the directory must already exist
    pub fn open(root: impl Into<PathBuf>, config: Config) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::CatalogNotFound(root));
        }
        Ok(Self { root, config })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Period ids: the visible subdirectories of the root, sorted
    pub fn periods(&self) -> Result<Vec<String>> {
        let mut periods = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) if !name.starts_with('.') => periods.push(name),
                Ok(_) => {}
                Err(name) => tracing::warn!(?name, "skipping non UTF-8 period directory"),
            }
        }
        periods.sort();
        Ok(periods)
    }

    /// Directory of an existing period
    ///
    /// Only names [`Catalog::periods`] would list are accepted, so `.` and
    /// `..` never resolve outside the root.
    pub fn period_dir(&self, period_id: &str) -> Result<PathBuf> {
        let dir = self.root.join(period_id);
        if period_id.is_empty()
            || period_id.starts_with('.')
            || period_id.contains(['/', '\\'])
            || !dir.is_dir()
        {
            return Err(Error::PeriodNotFound(period_id.to_string()));
        }
        Ok(dir)
    }

    pub fn issues_path(&self, period_id: &str) -> PathBuf {
        self.root.join(period_id).join(&self.config.files.issues)
    }

    pub fn events_path(&self, period_id: &str) -> PathBuf {
        self.root.join(period_id).join(&self.config.files.events)
    }

    pub fn editions_path(&self, period_id: &str) -> PathBuf {
        self.root.join(period_id).join(&self.config.files.editions)
    }

    pub fn registry_path(&self, registry: Registry) -> PathBuf {
        match registry {
            Registry::Writers => self.root.join(&self.config.files.writers),
            Registry::Pencillers => self.root.join(&self.config.files.pencillers),
        }
    }

    /// Issues of a period; a period without an issue file has no issues
    pub fn load_issues(&self, period_id: &str) -> Result<Vec<Issue>> {
        read_records(&self.issues_path(period_id), Missing::Empty)
    }

    pub fn load_events(&self, period_id: &str) -> Result<Vec<Event>> {
        read_records(&self.events_path(period_id), Missing::Fail)
    }

    pub fn load_editions(&self, period_id: &str) -> Result<Vec<Edition>> {
        read_records(&self.editions_path(period_id), Missing::Fail)
    }

    /// A creator registry; an absent registry is empty
    pub fn load_registry(&self, registry: Registry) -> Result<Vec<crate::Creator>> {
        read_records(&self.registry_path(registry), Missing::Empty)
    }

    /// Apply staged changes to the store at `path`
    ///
    /// The store is read, the complete new collection built in memory, and
    /// the file replaced only if that collection differs from what was
    /// read. Returns whether a write happened.
    pub fn apply<T>(&self, path: &Path, changes: &ChangeSet<T>, missing: Missing) -> Result<bool>
    where
        T: Record + Clone + PartialEq + Serialize + DeserializeOwned,
    {
        let current: Vec<T> = read_records(path, missing)?;
        let next = changes.apply(&current)?;
        self.commit(path, &current, &next)
    }

    /// Apply staged changes to a period's issue store
    pub fn apply_issues(&self, period_id: &str, changes: &ChangeSet<Issue>) -> Result<bool> {
        self.period_dir(period_id)?;
        self.apply(&self.issues_path(period_id), changes, Missing::Empty)
    }

    /// Replace `path` with `next` unless it equals `current`
    pub fn commit<T>(&self, path: &Path, current: &[T], next: &[T]) -> Result<bool>
    where
        T: PartialEq + Serialize,
    {
        if current == next {
            tracing::debug!(path = %path.display(), "unchanged, not written");
            return Ok(false);
        }
        let data = to_json(next, self.config.indent)?;
        write_atomic(path, &data)?;
        tracing::info!(path = %path.display(), records = next.len(), "store written");
        Ok(true)
    }
}

/// Read a JSON array of records, tolerating a leading byte order mark
pub fn read_records<T: DeserializeOwned>(path: &Path, missing: Missing) -> Result<Vec<T>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return match missing {
                Missing::Empty => Ok(Vec::new()),
                Missing::Fail => Err(Error::MissingFile(path.to_path_buf())),
            };
        }
        Err(e) => return Err(e.into()),
    };

    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str(content).map_err(|source| Error::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Pretty JSON with `indent` spaces and a trailing newline
fn to_json<T: Serialize>(records: &[T], indent: usize) -> Result<Vec<u8>> {
    let indent = " ".repeat(indent);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut data = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut data, formatter);
    records.serialize(&mut serializer)?;
    data.push(b'\n');
    Ok(data)
}

fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| Error::Other(format!("{} has no parent directory", path.display())))?;
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(data)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}
