//! Single-slot credential cache.
//!
//! The cache holds at most one `{url, username, password}` record in a JSON file under the
//! platform temporary directory. The password is base64-encoded, which only keeps it from
//! being read at a glance: anyone who can read the file can recover it. The file is created
//! with owner-only permissions on Unix.
//!
//! Cache failures never propagate. A missing, unreadable or corrupt file behaves as an empty
//! cache and failed writes are reported as `false`.

use std::{
    fmt,
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{Span, debug, error, info, info_span, warn};

/// URL used when neither the caller nor the cache provides one.
pub const DEFAULT_URL: &str = "http://localhost:8080";

/// File name of the cache inside the temporary directory.
const CREDENTIALS_FILE_NAME: &str = ".qbittorrent_credentials";

#[derive(Error, Debug)]
enum CacheError {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("malformed record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("password is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("password is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// A cached identity with its password decoded.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedCredentials {
    /// WebUI URL the credentials were saved for.
    pub url: String,
    /// WebUI username.
    pub username: String,
    /// WebUI password.
    pub password: String,
}

impl fmt::Debug for CachedCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedCredentials")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Effective connection parameters after layering explicit values over the cache.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedCredentials {
    /// WebUI URL. Always present, [`DEFAULT_URL`] as a last resort.
    pub url: String,
    /// Username, if supplied or cached.
    pub username: Option<String>,
    /// Password, if supplied or cached.
    pub password: Option<String>,
}

impl fmt::Debug for ResolvedCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedCredentials")
            .field("url", &self.url)
            .field("username", &self.username)
            .field(
                "password",
                &self.password.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Reads, writes and clears the credential cache file.
#[derive(Debug, Clone)]
pub struct CredentialsManager {
    path: PathBuf,
    span: Span,
}

impl Default for CredentialsManager {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialsManager {
    /// Uses `.qbittorrent_credentials` in the platform temporary directory.
    pub fn new() -> Self {
        Self::with_path(std::env::temp_dir().join(CREDENTIALS_FILE_NAME))
    }

    /// Uses the cache file at `path`.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let span = info_span!("qbt_credentials", path = %path.display());
        Self { path, span }
    }

    /// Replaces the span every operation is recorded under.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Location of the cache file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Saves the record, replacing whatever was cached before. Returns `false` on failure.
    pub fn save(&self, url: &str, username: &str, password: &str) -> bool {
        let _entered = self.span.enter();
        match self.write_record(url, username, password) {
            Ok(()) => {
                info!("Credentials saved to {}", self.path.display());
                true
            }
            Err(e) => {
                error!("Failed to save credentials: {e}");
                false
            }
        }
    }

    /// Loads the cached record.
    ///
    /// When `url` is given, a record saved for a different URL is treated as absent.
    pub fn load(&self, url: Option<&str>) -> Option<CachedCredentials> {
        let _entered = self.span.enter();
        if !self.path.exists() {
            debug!("Credentials file not found");
            return None;
        }

        let record = match self.read_record() {
            Ok(record) => record,
            Err(e) => {
                warn!("Failed to retrieve credentials: {e}");
                return None;
            }
        };

        match url.filter(|u| !u.is_empty()) {
            Some(url) if url != record.url => {
                debug!("No credentials found for URL: {url}");
                None
            }
            _ => Some(record),
        }
    }

    /// Deletes the cache file. Returns `false` if there was nothing to delete or deletion
    /// failed.
    pub fn clear(&self) -> bool {
        let _entered = self.span.enter();
        if !self.path.exists() {
            return false;
        }

        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Credentials cleared");
                true
            }
            Err(e) => {
                error!("Failed to clear credentials: {e}");
                false
            }
        }
    }

    /// Layers explicit values over the cache.
    ///
    /// Each explicit, non-empty value wins over the cached one. An explicit URL only picks up
    /// a record saved for that same URL, so cached credentials are never sent to a different
    /// server. Without an explicit URL, whatever record is cached is used. The URL falls back
    /// to [`DEFAULT_URL`]; username and password stay `None` when nobody provides them.
    pub fn resolve(
        &self,
        url: Option<&str>,
        username: Option<&str>,
        password: Option<&str>,
    ) -> ResolvedCredentials {
        let url = non_empty(url);
        let cached = self.load(url);

        let pick = |explicit: Option<&str>, cached: Option<&String>| {
            non_empty(explicit)
                .map(str::to_string)
                .or_else(|| cached.cloned())
        };

        ResolvedCredentials {
            url: pick(url, cached.as_ref().map(|c| &c.url))
                .unwrap_or_else(|| DEFAULT_URL.to_string()),
            username: pick(username, cached.as_ref().map(|c| &c.username)),
            password: pick(password, cached.as_ref().map(|c| &c.password)),
        }
    }

    fn write_record(&self, url: &str, username: &str, password: &str) -> Result<(), CacheError> {
        let record = CachedCredentials {
            url: url.to_string(),
            username: username.to_string(),
            password: STANDARD.encode(password.as_bytes()),
        };
        let contents = serde_json::to_vec(&record)?;

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path)?;
        file.write_all(&contents)?;
        file.flush()?;

        // mode() only applies to newly created files
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    fn read_record(&self) -> Result<CachedCredentials, CacheError> {
        let contents = fs::read(&self.path)?;
        let mut record: CachedCredentials = serde_json::from_slice(&contents)?;
        record.password = String::from_utf8(STANDARD.decode(record.password.as_bytes())?)?;
        Ok(record)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
