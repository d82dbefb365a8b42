//! Persisted index of registered sites.

pub mod codec;

use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::SiteRecord;
use crate::infrastructure::fs::write_atomic;

pub use codec::CodecError;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Failed to read registry index {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write registry index {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A line that held `key=value` pairs but could not be turned into a record.
#[derive(Debug, Clone)]
pub struct SkippedLine {
    pub line_number: usize,
    pub reason: String,
}

/// In-memory working copy of the index for one command invocation.
#[derive(Debug, Default)]
pub struct Registry {
    pub records: Vec<SiteRecord>,
    pub skipped: Vec<SkippedLine>,
}

impl Registry {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SiteRecord> {
        self.records.get(index)
    }

    /// Position of the record whose primary name is `name`, skipping `except`.
    pub fn position_of_primary(&self, name: &str, except: Option<usize>) -> Option<usize> {
        self.records
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != except)
            .find(|(_, r)| r.domain.is_primary(name))
            .map(|(i, _)| i)
    }
}

pub struct RegistryStore {
    path: PathBuf,
}

impl RegistryStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record from the index. A missing index is an empty registry.
    pub fn load(&self) -> Result<Registry, RegistryError> {
        if !self.path.exists() {
            return Ok(Registry::default());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| RegistryError::ReadError {
            path: self.path.clone(),
            source: e,
        })?;

        let mut registry = Registry::default();
        for (i, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match codec::parse(line) {
                Ok(record) => registry.records.push(record),
                Err(CodecError::NoFields) => {
                    debug!(line = i + 1, "skipping index line without fields");
                }
                Err(e) => {
                    warn!(line = i + 1, error = %e, "skipping malformed index line");
                    registry.skipped.push(SkippedLine {
                        line_number: i + 1,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(registry)
    }

    /// Rewrite the whole index, one record per line.
    pub fn save(&self, records: &[SiteRecord]) -> Result<(), RegistryError> {
        self.ensure_dir()?;

        let mut content = String::new();
        for record in records {
            content.push_str(&codec::serialize(record));
            content.push('\n');
        }

        write_atomic(&self.path, content.as_bytes()).map_err(|e| RegistryError::WriteError {
            path: self.path.clone(),
            source: e,
        })?;
        debug!(path = %self.path.display(), records = records.len(), "registry saved");
        Ok(())
    }

    /// Add one record to the end of the index.
    pub fn append(&self, record: &SiteRecord) -> Result<(), RegistryError> {
        self.ensure_dir()?;

        let write_err = |e| RegistryError::WriteError {
            path: self.path.clone(),
            source: e,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(write_err)?;

        // A previous writer may have left the last line unterminated.
        let mut existing = String::new();
        file.read_to_string(&mut existing).map_err(write_err)?;
        let mut line = String::new();
        if !existing.is_empty() && !existing.ends_with('\n') {
            line.push('\n');
        }
        line.push_str(&codec::serialize(record));
        line.push('\n');

        file.write_all(line.as_bytes()).map_err(write_err)?;
        debug!(path = %self.path.display(), domain = %record.domain, "record appended");
        Ok(())
    }

    fn ensure_dir(&self) -> Result<(), RegistryError> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
            && !dir.exists()
        {
            fs::create_dir_all(dir).map_err(|e| RegistryError::WriteError {
                path: self.path.clone(),
                source: e,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SiteDomain, SiteStatus};
    use tempfile::TempDir;

    fn record(domain: &str, port: &str) -> SiteRecord {
        SiteRecord::new(
            SiteDomain::new(domain).unwrap(),
            port.parse().unwrap(),
            PathBuf::from(format!("/etc/nginx/sites-available/{}", domain)),
            42,
        )
    }

    fn store() -> (TempDir, RegistryStore) {
        let dir = TempDir::new().unwrap();
        let store = RegistryStore::new(dir.path().join("data").join("config_index"));
        (dir, store)
    }

    #[test]
    fn test_missing_index_is_empty() {
        let (_dir, store) = store();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load_preserve_order() {
        let (_dir, store) = store();
        let mut second = record("b.test", "3001");
        second.status = SiteStatus::Inactive;
        store.save(&[record("a.test", "3000"), second.clone()]).unwrap();

        let registry = store.load().unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.records[0].domain.primary(), "a.test");
        assert_eq!(registry.records[1], second);
    }

    #[test]
    fn test_append_after_unterminated_line() {
        let (_dir, store) = store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(
            store.path(),
            "domain=a.test,port=3000,path=/sites/a.test",
        )
        .unwrap();

        store.append(&record("b.test", "3001")).unwrap();

        let registry = store.load().unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.records[1].domain.primary(), "b.test");
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let (_dir, store) = store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(
            store.path(),
            "not a record\n\
             domain=a.test,port=3000,path=/sites/a.test\n\
             domain=b.test,port=nope,path=/sites/b.test\n",
        )
        .unwrap();

        let registry = store.load().unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.skipped.len(), 1);
        assert_eq!(registry.skipped[0].line_number, 3);
    }

    #[test]
    fn test_position_of_primary() {
        let registry = Registry {
            records: vec![record("a.test", "3000"), record("b.test", "3001")],
            skipped: Vec::new(),
        };
        assert_eq!(registry.position_of_primary("b.test", None), Some(1));
        assert_eq!(registry.position_of_primary("b.test", Some(1)), None);
        assert_eq!(registry.position_of_primary("c.test", None), None);
        assert_eq!(registry.position_of_primary("A.Test", None), Some(0));
    }
}
