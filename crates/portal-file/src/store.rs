//! Key-value storage file holding the persisted identity token.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use portal_core::error::StorageError;
use portal_core::traits::{AUTH_TOKEN_KEY, TokenStore};
use portal_core::{Error, IdentityToken, Result};

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

/// Name of the storage file inside the data directory.
const STORAGE_FILE: &str = "storage.json";

/// Name of the lock file guarding read-modify-write cycles.
const LOCK_FILE: &str = "storage.lock";

type Entries = Map<String, Value>;

/// A [`TokenStore`] backed by a JSON file of string keys.
///
/// The file mirrors browser key-value storage: other keys written by other
/// tools are preserved, and the token lives under [`AUTH_TOKEN_KEY`]. Every
/// access holds an `fs2` lock on a sibling lock file, so processes sharing a
/// data directory see consistent writes.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    root: PathBuf,
}

impl FileTokenStore {
    /// Create a store rooted at `dir`. The directory and lock file are created
    /// on first write; reading a missing store touches nothing.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            root: dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the storage file.
    pub fn path(&self) -> PathBuf {
        self.root.join(STORAGE_FILE)
    }

    fn lock_path(&self) -> PathBuf {
        self.root.join(LOCK_FILE)
    }

    fn open_lock(&self) -> Result<File> {
        fs::create_dir_all(&self.root).map_err(StorageError::from)?;

        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())
            .map_err(StorageError::from)?;

        Ok(lock_file)
    }

    /// Run `f` over the entries under an exclusive lock, writing them back if
    /// it returns `true` as its first element.
    ///
    /// A storage file that is not a JSON object is treated as empty, so the
    /// next write replaces it.
    fn modify<T>(&self, f: impl FnOnce(&mut Entries) -> Result<(bool, T)>) -> Result<T> {
        let lock_file = self.open_lock()?;
        lock_file.lock_exclusive().map_err(StorageError::from)?;

        let entries = match self.read_entries() {
            Err(Error::Storage(StorageError::Corrupt { reason, .. })) => {
                warn!(%reason, "Storage file is corrupt, starting from empty storage");
                Ok(Entries::new())
            }
            other => other,
        };

        let result = entries.and_then(|mut entries| {
            let (dirty, value) = f(&mut entries)?;
            if dirty {
                self.write_entries(&entries)?;
            }
            Ok(value)
        });

        lock_file.unlock().map_err(StorageError::from)?;
        result
    }

    fn read_entries(&self) -> Result<Entries> {
        let path = self.path();
        if !path.exists() {
            return Ok(Entries::new());
        }

        let content = fs::read_to_string(&path).map_err(StorageError::from)?;
        if content.trim().is_empty() {
            return Ok(Entries::new());
        }

        let entries = serde_json::from_str(&content).map_err(|e| StorageError::Corrupt {
            key: STORAGE_FILE.to_string(),
            reason: e.to_string(),
        })?;
        Ok(entries)
    }

    fn write_entries(&self, entries: &Entries) -> Result<()> {
        let path = self.path();
        let content = serde_json::to_string_pretty(entries).map_err(|e| StorageError::Corrupt {
            key: STORAGE_FILE.to_string(),
            reason: e.to_string(),
        })?;

        let temp_path = path.with_extension("tmp");
        match fs::remove_file(&temp_path) {
            Err(e) if e.kind() != ErrorKind::NotFound => return Err(StorageError::from(e).into()),
            _ => {}
        }

        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut temp = options.open(&temp_path).map_err(StorageError::from)?;
        temp.write_all(content.as_bytes())
            .and_then(|()| temp.sync_all())
            .map_err(StorageError::from)?;
        drop(temp);

        fs::rename(&temp_path, &path).map_err(StorageError::from)?;
        Ok(())
    }

    fn decode(entries: &Entries) -> Result<Option<IdentityToken>> {
        match entries.get(AUTH_TOKEN_KEY) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => {
                let token = serde_json::from_value(value.clone()).map_err(|e| {
                    StorageError::Corrupt {
                        key: AUTH_TOKEN_KEY.to_string(),
                        reason: e.to_string(),
                    }
                })?;
                Ok(Some(token))
            }
        }
    }

    fn encode(token: &IdentityToken) -> Result<Value> {
        let value = serde_json::to_value(token).map_err(|e| StorageError::Corrupt {
            key: AUTH_TOKEN_KEY.to_string(),
            reason: e.to_string(),
        })?;
        Ok(value)
    }
}

impl TokenStore for FileTokenStore {
    #[instrument(skip(self), fields(path = %self.path().display()))]
    fn load(&self) -> Result<Option<IdentityToken>> {
        if !self.path().exists() {
            return Ok(None);
        }

        let lock_file = self.open_lock()?;
        lock_file.lock_shared().map_err(StorageError::from)?;

        let result = self.read_entries().and_then(|entries| Self::decode(&entries));

        lock_file.unlock().map_err(StorageError::from)?;
        result
    }

    #[instrument(skip(self, token), fields(path = %self.path().display()))]
    fn save(&self, token: &IdentityToken) -> Result<()> {
        let value = Self::encode(token)?;
        self.modify(|entries| {
            entries.insert(AUTH_TOKEN_KEY.to_string(), value);
            Ok((true, ()))
        })?;
        debug!("Token written");
        Ok(())
    }

    #[instrument(skip(self, token), fields(path = %self.path().display()))]
    fn save_if_newer(&self, token: &IdentityToken) -> Result<bool> {
        let value = Self::encode(token)?;
        let written = self.modify(|entries| {
            // An unreadable stored token never blocks a fresh one.
            let stored = Self::decode(entries).unwrap_or(None);
            if stored.is_some_and(|stored| stored == *token || stored.is_newer_than(token)) {
                return Ok((false, false));
            }
            entries.insert(AUTH_TOKEN_KEY.to_string(), value);
            Ok((true, true))
        })?;
        debug!(written, "Conditional token write");
        Ok(written)
    }

    #[instrument(skip(self), fields(path = %self.path().display()))]
    fn clear(&self) -> Result<()> {
        if !self.path().exists() {
            return Ok(());
        }
        self.modify(|entries| {
            let removed = entries.remove(AUTH_TOKEN_KEY).is_some();
            Ok((removed, ()))
        })
    }
}
