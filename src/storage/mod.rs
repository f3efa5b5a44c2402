// src/storage/mod.rs
use crate::documents::models::{ConflictPolicy, DocumentKind, LegalDocument, NaturalKey};
use crate::utils::error::StorageError;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

// Distinguishes scratch files written by concurrent upserts in this process.
static SCRATCH_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Result of an upsert: the record id (its file stem) and whether it was newly created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub id: String,
    pub is_new_insert: bool,
}

/// What actually lands on disk: the record plus its key and a storage timestamp.
#[derive(Serialize)]
struct StoredRecord<'a, D: Serialize> {
    kind: DocumentKind,
    key: NaturalKey,
    stored_at: String,
    document: &'a D,
}

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Where the record with `key` of `kind` is stored: `<base>/<kind dir>/<number>_<year>.json`.
    pub fn record_path(&self, kind: DocumentKind, key: NaturalKey) -> PathBuf {
        self.base_dir.join(kind.dir_name()).join(format!("{}.json", record_id(key)))
    }

    /// Inserts `record` under its natural key.
    ///
    /// On conflict, fatwas and laws keep the stored record untouched, judgments replace
    /// it. Either way `is_new_insert` is false. A record without a natural key cannot be
    /// stored.
    ///
    /// Record files are never visible half-written, and of several concurrent upserts of
    /// the same key exactly one reports a new insert.
    pub fn upsert<D: LegalDocument>(&self, record: &D) -> Result<UpsertOutcome, StorageError> {
        let key = record
            .natural_key()
            .ok_or_else(|| StorageError::MissingKey(D::KIND.to_string()))?;

        let file_path = self.record_path(D::KIND, key);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).map_err(StorageError::IoError)?;
        }

        let stored = StoredRecord {
            kind: D::KIND,
            key,
            stored_at: chrono::Utc::now().to_rfc3339(),
            document: record,
        };
        let json = serde_json::to_string_pretty(&stored)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        let id = record_id(key);
        let is_new_insert = write_if_absent(&file_path, &json)?;
        if !is_new_insert && D::KIND.on_conflict() == ConflictPolicy::Replace {
            replace_file(&file_path, &json)?;
        }

        if is_new_insert {
            tracing::debug!("Stored {} {} at {}", D::KIND, key, file_path.display());
        } else {
            tracing::debug!("{} {} already stored at {}", D::KIND, key, file_path.display());
        }

        Ok(UpsertOutcome { id, is_new_insert })
    }
}

fn record_id(key: NaturalKey) -> String {
    format!("{}_{}", key.number, key.year)
}

/// Writes `contents` next to `path` under a unique scratch name.
fn write_scratch(path: &Path, contents: &str) -> Result<PathBuf, StorageError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let n = SCRATCH_COUNTER.fetch_add(1, Ordering::Relaxed);
    let scratch = path.with_file_name(format!(".{}.{}.{}.tmp", name, std::process::id(), n));

    fs::write(&scratch, contents).map_err(StorageError::IoError)?;
    Ok(scratch)
}

/// Creates `path` with `contents` only if it does not exist yet. Returns whether it was
/// written.
///
/// The content is complete before the name appears: the scratch file is hard-linked
/// into place, which fails if the name is already taken.
fn write_if_absent(path: &Path, contents: &str) -> Result<bool, StorageError> {
    let scratch = write_scratch(path, contents)?;
    let linked = fs::hard_link(&scratch, path);
    fs::remove_file(&scratch).map_err(StorageError::IoError)?;

    match linked {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(StorageError::IoError(e)),
    }
}

/// Swaps in new contents for `path` with a rename.
fn replace_file(path: &Path, contents: &str) -> Result<(), StorageError> {
    let scratch = write_scratch(path, contents)?;
    if let Err(e) = fs::rename(&scratch, path) {
        let _ = fs::remove_file(&scratch);
        return Err(StorageError::IoError(e));
    }
    Ok(())
}
