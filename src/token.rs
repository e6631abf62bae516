use crate::error::Result;
use crate::types::Token;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Durable home of the pairing token
///
/// The token is resolved once at startup and then handed to every session
/// read-only, so there is no synchronization beyond the initial load.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
    token: Token,
}

impl TokenStore {
    /// Load the token stored at `path`, or generate and persist a new one
    ///
    /// An existing record is returned verbatim (surrounding whitespace trimmed)
    /// without checking its format.
    pub fn load_or_create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let token = if path.exists() {
            let token = fs::read_to_string(&path)?.trim().to_string();
            tracing::info!("Loaded pairing token from {}", path.display());
            token
        } else {
            let token = Uuid::new_v4().to_string();
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, &token)?;
            tracing::info!("Generated new pairing token, saved to {}", path.display());
            token
        };

        Ok(Self { path, token })
    }

    /// The process-wide pairing token
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Location of the persisted record
    pub fn path(&self) -> &Path {
        &self.path
    }
}
