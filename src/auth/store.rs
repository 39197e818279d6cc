use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::service::Service;

/// Cached OAuth tokens, one JSON file per provider.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    dir: PathBuf,
}

impl CredentialStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<home>/.credentials`
    pub fn default_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".credentials")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // File name kept compatible with tokens cached by earlier releases.
    pub fn path_for(&self, service: Service) -> PathBuf {
        self.dir.join(format!("{}-go.json", service.credential_key()))
    }

    /// Returns the cached token, or `None` when there is none or it cannot be decoded.
    pub fn load<T: DeserializeOwned>(&self, service: Service) -> Result<Option<T>> {
        let path = self.path_for(service);

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No cached {} credentials at {}", service, path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&raw) {
            Ok(token) => Ok(Some(token)),
            Err(e) => {
                warn!("Ignoring unreadable credential file {}: {}", path.display(), e);
                Ok(None)
            }
        }
    }

    /// Writes the token, replacing any previous one. The directory is created
    /// owner-only if missing and the file is readable by the owner only.
    pub fn save<T: Serialize>(&self, service: Service, token: &T) -> Result<()> {
        self.ensure_dir()?;

        let path = self.path_for(service);
        let json = serde_json::to_string_pretty(token)?;

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&path)?;
        // mode() only applies on create; an older file may be wider
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
        }
        file.write_all(json.as_bytes())?;

        info!("Saved {} credentials to {}", service, path.display());
        Ok(())
    }

    /// Deletes the cached token. Returns whether a file was removed.
    pub fn remove(&self, service: Service) -> Result<bool> {
        let path = self.path_for(service);
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Removed cached {} credentials", service);
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn ensure_dir(&self) -> Result<()> {
        if self.dir.is_dir() {
            return Ok(());
        }

        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o700);
        }
        builder.create(&self.dir)?;
        Ok(())
    }
}
