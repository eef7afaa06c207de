//! File-backed credential store
//!
//! Tokens are kept in `credentials.json` inside the FinTrack data directory
//! so a session survives restarts of the client:
//! ```json
//! { "access_token": "...", "refresh_token": "..." }
//! ```
//!
//! Every read-modify-write cycle holds an exclusive advisory lock on
//! `credentials.lock`, so two `ft` processes refreshing at the same time
//! cannot interleave their writes. Waiting for the lock is bounded; a
//! holder that never lets go surfaces as a storage error.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

use crate::domain::result::{Error, Result};
use crate::domain::CredentialPair;
use crate::ports::CredentialStore;

const CREDENTIALS_FILE: &str = "credentials.json";
const LOCK_FILE: &str = "credentials.lock";
const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);
const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
    lock_path: PathBuf,
    lock_timeout: Duration,
}

impl FileCredentialStore {
    /// Open (or prepare) the store inside `data_dir`
    pub fn new(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir).map_err(|e| {
            Error::storage(format!(
                "Failed to create data directory {}: {}",
                data_dir.display(),
                e
            ))
        })?;

        Ok(Self {
            path: data_dir.join(CREDENTIALS_FILE),
            lock_path: data_dir.join(LOCK_FILE),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        })
    }

    /// How long to wait for another process to release the lock
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Path of the credentials file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Take the exclusive lock; released when the returned file drops
    fn lock(&self) -> Result<File> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)
            .map_err(|e| Error::storage(format!("Failed to open lock file: {}", e)))?;

        let contended = fs2::lock_contended_error().raw_os_error();
        let deadline = Instant::now() + self.lock_timeout;
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => return Ok(file),
                Err(e) if e.raw_os_error() == contended => {
                    if Instant::now() >= deadline {
                        return Err(Error::storage(format!(
                            "Credentials still locked by another process after {:?}",
                            self.lock_timeout
                        )));
                    }
                    thread::sleep(LOCK_POLL_INTERVAL);
                }
                Err(e) => {
                    return Err(Error::storage(format!("Failed to lock credentials: {}", e)))
                }
            }
        }
    }

    /// Missing or unreadable content reads as no credentials
    fn read(&self) -> CredentialPair {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    fn write(&self, pair: &CredentialPair) -> Result<()> {
        if pair.is_empty() {
            return match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(Error::storage(format!("Failed to remove credentials: {}", e))),
            };
        }

        let content = serde_json::to_string_pretty(pair)?;
        let tmp_path = self.path.with_extension("json.tmp");
        // Leftover from an interrupted write; mode only applies on create
        let _ = fs::remove_file(&tmp_path);

        let mut options = OpenOptions::new();
        options.create(true).truncate(true).write(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options
            .open(&tmp_path)
            .map_err(|e| Error::storage(format!("Failed to write credentials: {}", e)))?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp_path, &self.path)
            .map_err(|e| Error::storage(format!("Failed to replace credentials: {}", e)))?;
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Result<CredentialPair> {
        let _lock = self.lock()?;
        Ok(self.read())
    }

    fn set(&self, access: &str, refresh: Option<&str>) -> Result<()> {
        let _lock = self.lock()?;
        let mut pair = self.read();
        pair.access_token = Some(access.to_string());
        if let Some(r) = refresh {
            pair.refresh_token = Some(r.to_string());
        }
        self.write(&pair)
    }

    fn clear(&self) -> Result<()> {
        let _lock = self.lock()?;
        self.write(&CredentialPair::default())
    }
}
