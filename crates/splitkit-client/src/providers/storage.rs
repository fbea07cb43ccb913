//! Visitor ID storage.
//!
//! [`FileVisitorStorage`] keeps the ID in a small JSON file with owner-only
//! permissions. [`MemoryVisitorStorage`] keeps it for the life of the process.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use splitkit_core::VisitorId;

use crate::errors::StorageError;
use crate::traits::VisitorStorage;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredVisitor {
    visitor_id: VisitorId,
}

/// Visitor ID stored in a JSON file.
#[derive(Clone, Debug)]
pub struct FileVisitorStorage {
    path: PathBuf,
}

impl FileVisitorStorage {
    /// Storage backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VisitorStorage for FileVisitorStorage {
    /// Returns `None` if the file doesn't exist or is invalid.
    fn visitor_id(&self) -> Option<VisitorId> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("failed to read visitor file: {e}");
                return None;
            }
        };

        match serde_json::from_str::<StoredVisitor>(&data) {
            Ok(stored) if !stored.visitor_id.is_empty() => Some(stored.visitor_id),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("failed to parse visitor file: {e}");
                None
            }
        }
    }

    /// Creates parent directories if needed. Sets file permissions to 0o600.
    fn set_visitor_id(&self, visitor_id: &VisitorId) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(&StoredVisitor {
            visitor_id: visitor_id.clone(),
        })?;
        std::fs::write(&self.path, json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(&self.path, perms);
        }

        Ok(())
    }
}

/// Visitor ID held in memory.
#[derive(Debug, Default)]
pub struct MemoryVisitorStorage {
    visitor_id: Mutex<Option<VisitorId>>,
}

impl MemoryVisitorStorage {
    /// Empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with a visitor ID.
    pub fn with_visitor_id(visitor_id: impl Into<VisitorId>) -> Self {
        Self {
            visitor_id: Mutex::new(Some(visitor_id.into())),
        }
    }
}

impl VisitorStorage for MemoryVisitorStorage {
    fn visitor_id(&self) -> Option<VisitorId> {
        self.visitor_id.lock().clone()
    }

    fn set_visitor_id(&self, visitor_id: &VisitorId) -> Result<(), StorageError> {
        *self.visitor_id.lock() = Some(visitor_id.clone());
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
