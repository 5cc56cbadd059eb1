//! Credential loading from a `key=value` properties file.
//!
//! The file format is the one the collection scripts share:
//!
//! ```text
//! # Quickwit basic-auth credentials
//! QW_USER=reporter
//! QW_PASS=s3cret
//! QW_URL==https://quickwit.example.net
//! ```
//!
//! `QW_URL` is optional. Some deployed files carry a stray `=` after the key
//! (`QW_URL==https://...`); leading `=` characters are stripped from the value.

use log::warn;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default location of the credentials file, relative to the working directory.
pub const DEFAULT_CREDENTIALS_FILE: &str = "qw-auth.properties";

const USER_KEY: &str = "QW_USER";
const PASS_KEY: &str = "QW_PASS";
const URL_KEY: &str = "QW_URL";

#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("credentials file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read credentials file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("missing required key {key} in {}", path.display())]
    MissingKey { key: &'static str, path: PathBuf },
}

/// Basic-auth credentials and optional base URL for the search API.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub base_url: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Credentials {
    /// Load credentials from a properties file on disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CredentialsError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                CredentialsError::NotFound(path.to_path_buf())
            } else {
                CredentialsError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        Self::parse(&content, path)
    }

    /// Parse credentials from properties text. `origin` is only used in error messages.
    pub fn parse(content: &str, origin: &Path) -> Result<Self, CredentialsError> {
        let mut props = parse_properties(content);

        let mut take = |key: &'static str| {
            props
                .remove(key)
                .ok_or_else(|| CredentialsError::MissingKey {
                    key,
                    path: origin.to_path_buf(),
                })
        };

        let username = take(USER_KEY)?;
        let password = take(PASS_KEY)?;
        let base_url = take(URL_KEY)
            .ok()
            .map(|url| url.trim_start_matches('=').trim().to_string())
            .filter(|url| !url.is_empty());

        Ok(Self {
            username,
            password,
            base_url,
        })
    }
}

/// Parse `key=value` lines into a map.
///
/// Blank lines and `#` comments are ignored, the line is split on the first
/// `=` and both halves are trimmed. Later duplicates win.
pub fn parse_properties(content: &str) -> HashMap<String, String> {
    let mut props = HashMap::new();

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match line.split_once('=') {
            Some((key, value)) => {
                props.insert(key.trim().to_string(), value.trim().to_string());
            }
            None => warn!("ignoring line {} without '=' in properties file", idx + 1),
        }
    }

    props
}
