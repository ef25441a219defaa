//! Bearer-token persistence and the login collaborator.
//!
//! The token is the only state Glyco keeps between runs. It is written
//! atomically (temp file, fsync, rename) under an exclusive lock, and a
//! missing or unreadable file simply means "not logged in".

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Login credentials handed to an [`Authenticator`]
#[derive(Clone, Debug)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Exchanges credentials for a bearer token
pub trait Authenticator {
    /// Returns `Error::Auth` when the credentials are rejected
    fn login(&self, credentials: &Credentials) -> Result<String>;
}

/// On-disk token format
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StoredToken {
    pub token: String,
    pub saved_at: DateTime<Utc>,
}

/// Token file at a fixed path
#[derive(Clone, Debug)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Conventional location under a data directory
    pub fn in_data_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join("token.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored token, if any
    pub fn current_token(&self) -> Option<String> {
        self.load().map(|stored| stored.token)
    }

    /// Load the stored token with a shared lock
    ///
    /// Missing, unreadable or corrupt files all yield `None`.
    pub fn load(&self) -> Option<StoredToken> {
        if !self.path.exists() {
            tracing::debug!("No token file at {:?}", self.path);
            return None;
        }

        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open token file {:?}: {}", self.path, e);
                return None;
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!("Unable to lock token file {:?}: {}", self.path, e);
            return None;
        }

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        let _ = file.unlock();
        if let Err(e) = read {
            tracing::warn!("Failed to read token file {:?}: {}", self.path, e);
            return None;
        }

        match serde_json::from_str::<StoredToken>(&contents) {
            Ok(stored) if !stored.token.trim().is_empty() => Some(stored),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Failed to parse token file {:?}: {}", self.path, e);
                None
            }
        }
    }

    /// Atomically replace the stored token
    pub fn save(&self, token: &str) -> Result<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(Error::Auth("refusing to store an empty token".into()));
        }

        let parent = self.path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "token path missing parent")
        })?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let stored = StoredToken {
                token: token.to_string(),
                saved_at: Utc::now(),
            };
            writer.write_all(serde_json::to_string(&stored)?.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;
        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::info!("Saved bearer token to {:?}", self.path);
        Ok(())
    }

    /// Forget the stored token; true if one was removed
    pub fn clear(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&self.path)?;
        tracing::info!("Removed bearer token at {:?}", self.path);
        Ok(true)
    }
}

/// Log in through `auth` and persist the resulting token
pub fn login_and_store(
    auth: &dyn Authenticator,
    credentials: &Credentials,
    store: &TokenStore,
) -> Result<String> {
    let token = auth.login(credentials)?;
    store.save(&token)?;
    Ok(token)
}
