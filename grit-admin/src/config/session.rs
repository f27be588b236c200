//! Session tokens persisted between runs
//!
//! Each token carries the lifetime the backend gives its cookies: one day for
//! the access token, seven for the refresh token. Expired tokens are dropped
//! when the file is read.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::api::{TokenPair, TokenStore};

pub const ACCESS_TOKEN_DAYS: i64 = 1;
pub const REFRESH_TOKEN_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StoredToken {
    value: String,
    expires: DateTime<Utc>,
}

impl StoredToken {
    fn issue(value: &str, now: DateTime<Utc>, days: i64) -> Self {
        Self {
            value: value.to_string(),
            expires: now + Duration::days(days),
        }
    }

    fn is_live(&self, now: DateTime<Utc>) -> bool {
        !self.value.is_empty() && self.expires > now
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct SessionRecord {
    #[serde(default)]
    expires_at: i64,
    path: String,
    same_site: String,
    secure: bool,
    access_token: Option<StoredToken>,
    refresh_token: StoredToken,
}

/// [`TokenStore`] backed by `session.toml`
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
    secure: bool,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>, secure: bool) -> Self {
        Self {
            path: path.into(),
            secure,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Option<SessionRecord>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => toml::from_str(&text)
                .map(Some)
                .with_context(|| format!("Invalid session file: {}", self.path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", self.path.display())),
        }
    }

    fn load_at(&self, now: DateTime<Utc>) -> Option<TokenPair> {
        let record = match self.read() {
            Ok(record) => record?,
            Err(e) => {
                warn!("{:#}", e);
                return None;
            }
        };

        if !record.refresh_token.is_live(now) {
            debug!("Stored session expired, discarding it");
            if let Err(e) = self.clear() {
                warn!("{:#}", e);
            }
            return None;
        }

        // An expired access token is sent as none; the first 401 refreshes.
        let access = record
            .access_token
            .filter(|t| t.is_live(now))
            .map(|t| t.value)
            .unwrap_or_default();
        Some(TokenPair {
            access_token: access,
            refresh_token: record.refresh_token.value,
            expires_at: record.expires_at,
        })
    }

    fn save_at(&self, tokens: &TokenPair, now: DateTime<Utc>) -> Result<()> {
        let record = SessionRecord {
            expires_at: tokens.expires_at,
            path: "/".to_string(),
            same_site: "lax".to_string(),
            secure: self.secure,
            access_token: Some(StoredToken::issue(&tokens.access_token, now, ACCESS_TOKEN_DAYS)),
            refresh_token: StoredToken::issue(&tokens.refresh_token, now, REFRESH_TOKEN_DAYS),
        };
        let text = toml::to_string_pretty(&record).context("Failed to encode session")?;
        super::write_file(&self.path, &text)
    }
}

impl TokenStore for SessionFile {
    fn load(&self) -> Option<TokenPair> {
        self.load_at(Utc::now())
    }

    fn save(&self, tokens: &TokenPair) -> Result<()> {
        self.save_at(tokens, Utc::now())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", self.path.display())),
        }
    }
}
