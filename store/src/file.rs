use std::collections::BTreeMap;
use std::fs::File;
use std::fs::OpenOptions;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use fs2::FileExt;
use tracing::warn;

use crate::KeyValueStore;

const FILENAME: &str = "local_storage.json";
const MAX_RETRIES: usize = 10;
const RETRY_MS: u64 = 100;

#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

/// Key/value storage persisted as one JSON object in `<home>/local_storage.json`.
///
/// Readers take a shared lock and writers an exclusive lock on a sidecar
/// `.lock` file, so several processes can share one home directory. Writes go
/// to a temp file that is renamed over the original.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    lock_path: PathBuf,
}

impl FileStorage {
    pub fn new(home: &Path) -> Self {
        let path = home.join(FILENAME);
        let lock_path = path.with_extension("json.lock");
        Self { path, lock_path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_lock_file(&self) -> std::io::Result<File> {
        if let Some(parent) = self.lock_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut opts = OpenOptions::new();
        opts.create(true).truncate(false).read(true).write(true);
        #[cfg(unix)]
        {
            opts.mode(0o600);
        }
        opts.open(&self.lock_path)
    }

    fn read_entries(&self) -> std::io::Result<BTreeMap<String, String>> {
        let mut file = match OpenOptions::new().read(true).open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e),
        };
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        match serde_json::from_str(&contents) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                // A corrupt file behaves like cleared storage; the next write replaces it.
                warn!("ignoring unreadable storage file {}: {e}", self.path.display());
                Ok(BTreeMap::new())
            }
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> std::io::Result<()> {
        let mut opts = OpenOptions::new();
        opts.create(true).write(true).truncate(true);
        #[cfg(unix)]
        {
            opts.mode(0o600);
        }
        let tmp_path = self.path.with_extension("json.tmp");
        let mut out = opts.open(&tmp_path)?;
        ensure_owner_only_permissions(&out)?;

        let body = serde_json::to_string_pretty(entries)
            .map_err(|e| std::io::Error::other(format!("serialize storage failed: {e}")))?;
        out.write_all(body.as_bytes())?;
        out.flush()?;
        drop(out);

        std::fs::rename(&tmp_path, &self.path)
    }

    fn update<F>(&self, mutate: F) -> std::io::Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> bool,
    {
        let lock = self.open_lock_file()?;
        lock_exclusive_with_retry(&lock)?;
        let mut entries = self.read_entries()?;
        let result = if mutate(&mut entries) {
            self.write_entries(&entries)
        } else {
            Ok(())
        };
        FileExt::unlock(&lock)?;
        result
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> std::io::Result<Option<String>> {
        let lock = self.open_lock_file()?;
        lock_shared_with_retry(&lock)?;
        let entries = self.read_entries();
        FileExt::unlock(&lock)?;
        Ok(entries?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> std::io::Result<()> {
        self.update(|entries| {
            let previous = entries.insert(key.to_string(), value.to_string());
            previous.as_deref() != Some(value)
        })
    }

    fn remove(&self, key: &str) -> std::io::Result<()> {
        self.update(|entries| entries.remove(key).is_some())
    }
}

#[cfg(unix)]
fn ensure_owner_only_permissions(file: &File) -> std::io::Result<()> {
    let meta = file.metadata()?;
    let mode = meta.permissions().mode() & 0o777;
    if mode != 0o600 {
        let mut p = meta.permissions();
        p.set_mode(0o600);
        file.set_permissions(p)?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_owner_only_permissions(_file: &File) -> std::io::Result<()> {
    Ok(())
}

fn lock_exclusive_with_retry(file: &File) -> std::io::Result<()> {
    for _ in 0..MAX_RETRIES {
        match FileExt::try_lock_exclusive(file) {
            Ok(_) => return Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(std::time::Duration::from_millis(RETRY_MS));
            }
            Err(e) => return Err(e),
        }
    }
    Err(std::io::Error::new(
        std::io::ErrorKind::WouldBlock,
        "local storage: lock timeout",
    ))
}

fn lock_shared_with_retry(file: &File) -> std::io::Result<()> {
    for _ in 0..MAX_RETRIES {
        match FileExt::try_lock_shared(file) {
            Ok(_) => return Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(std::time::Duration::from_millis(RETRY_MS));
            }
            Err(e) => return Err(e),
        }
    }
    Err(std::io::Error::new(
        std::io::ErrorKind::WouldBlock,
        "local storage: lock timeout",
    ))
}
