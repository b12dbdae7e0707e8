use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use crc::{CRC_64_ECMA_182, Crc};
use thiserror::Error;

use crate::model::expression::ExpressionMatrix;

const CRC64: Crc<u64> = Crc::<u64>::new(&CRC_64_ECMA_182);
const STORE_SUFFIX: &str = "json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid dataset key: {0:?}")]
    InvalidKey(String),
    #[error("digest mismatch for {key}: expected {expected:016x}, found {found:016x}")]
    DigestMismatch { key: String, expected: u64, found: u64 },
}

/// Expression matrices keyed by dataset identifier, injected into the load
/// stage instead of any process-wide cache.
pub trait DatasetStore {
    fn get(&self, key: &str) -> Result<Option<ExpressionMatrix>, StoreError>;
    fn put(&mut self, key: &str, matrix: &ExpressionMatrix) -> Result<(), StoreError>;

    fn contains(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.get(key)?.is_some())
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, ExpressionMatrix>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DatasetStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<ExpressionMatrix>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, matrix: &ExpressionMatrix) -> Result<(), StoreError> {
        check_key(key)?;
        self.entries.insert(key.to_string(), matrix.clone());
        Ok(())
    }

    fn contains(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries.contains_key(key))
    }
}

/// One JSON file per dataset named `<key>.<crc64 of content>.json`.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn open(root: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entries_for(&self, key: &str) -> Result<Vec<(PathBuf, u64)>, StoreError> {
        let mut found = Vec::new();
        let prefix = format!("{key}.");
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(rest) = name.strip_prefix(&prefix) else {
                continue;
            };
            let Some(digest) = rest.strip_suffix(&format!(".{STORE_SUFFIX}")) else {
                continue;
            };
            if let Ok(d) = u64::from_str_radix(digest, 16)
                && digest.len() == 16
            {
                found.push((path.clone(), d));
            }
        }
        found.sort();
        Ok(found)
    }
}

impl DatasetStore for DirStore {
    fn get(&self, key: &str) -> Result<Option<ExpressionMatrix>, StoreError> {
        check_key(key)?;
        let Some((path, expected)) = self.entries_for(key)?.into_iter().next() else {
            return Ok(None);
        };
        let bytes = fs::read(&path)?;
        let found = CRC64.checksum(&bytes);
        if found != expected {
            return Err(StoreError::DigestMismatch {
                key: key.to_string(),
                expected,
                found,
            });
        }
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn put(&mut self, key: &str, matrix: &ExpressionMatrix) -> Result<(), StoreError> {
        check_key(key)?;
        let bytes = serde_json::to_vec(matrix)?;
        let digest = CRC64.checksum(&bytes);
        for (stale, _) in self.entries_for(key)? {
            fs::remove_file(stale)?;
        }
        let path = self
            .root
            .join(format!("{key}.{digest:016x}.{STORE_SUFFIX}"));
        fs::write(path, bytes)?;
        Ok(())
    }
}

fn check_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

/// Content-derived dataset identifier: `<label>-<crc64 over the files>`.
pub fn dataset_key(label: &str, files: &[&Path]) -> Result<String, StoreError> {
    let mut digest = CRC64.digest();
    let mut buf = [0u8; 64 * 1024];
    for path in files {
        let mut file = fs::File::open(path)?;
        loop {
            let n = file.read(&mut buf)?;
            if n == 0 {
                break;
            }
            digest.update(&buf[..n]);
        }
    }
    let sanitized: String = label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    Ok(format!("{}-{:016x}", sanitized, digest.finalize()))
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/store.rs"]
mod tests;
