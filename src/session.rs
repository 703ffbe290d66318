//! The session holds the stored access token.
//!
//! The token is persisted at the configured credential path, together with the moment it stops
//! being usable (one day after sign-in). The session is created at start-up, shared by the HTTP
//! client and the router, and torn down on logout or when the server answers 401.

use crate::{utils, Result};
use anyhow::{bail, Context};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// How long a stored credential is kept after sign-in.
const CREDENTIAL_LIFETIME_HOURS: i64 = 24;

/// The stored-credential file format.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
struct StoredCredential {
    access_token: String,
    expires_at: DateTime<Utc>,
}

/// A cloneable handle to the credential store. All clones share the same state.
#[derive(Debug, Clone)]
pub struct Session {
    path: PathBuf,
    credential: Arc<Mutex<Option<StoredCredential>>>,
}

impl Session {
    /// Loads the session from `path`. A missing file means nobody is signed in. A file that
    /// cannot be parsed is treated the same way.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let credential = if path.is_file() {
            match utils::deserialize::<StoredCredential>(&path).await {
                Ok(c) => Some(c),
                Err(e) => {
                    warn!("Ignoring unreadable credential file: {e:#}");
                    None
                }
            }
        } else {
            None
        };
        Ok(Self {
            path,
            credential: Arc::new(Mutex::new(credential)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stores `access_token` with a one day expiry.
    pub async fn store(&self, access_token: &str) -> Result<()> {
        self.store_at(access_token, Utc::now()).await
    }

    pub(crate) async fn store_at(&self, access_token: &str, now: DateTime<Utc>) -> Result<()> {
        if access_token.trim().is_empty() {
            bail!("The server did not return an access token")
        }
        let credential = StoredCredential {
            access_token: access_token.to_string(),
            expires_at: now + chrono::Duration::hours(CREDENTIAL_LIFETIME_HOURS),
        };
        let json = serde_json::to_string_pretty(&credential)
            .context("Unable to serialize the credential")?;
        utils::write_secret(&self.path, json)
            .await
            .context("Unable to save the credential")?;
        *self.credential.lock().await = Some(credential);
        debug!("Stored credential at {}", self.path.display());
        Ok(())
    }

    /// The access token, if one is stored and its one day lifetime has not run out.
    pub async fn token(&self) -> Option<String> {
        self.token_at(Utc::now()).await
    }

    pub(crate) async fn token_at(&self, now: DateTime<Utc>) -> Option<String> {
        let guard = self.credential.lock().await;
        guard
            .as_ref()
            .filter(|c| c.expires_at > now)
            .map(|c| c.access_token.clone())
    }

    /// Decodes the stored token. Any decode failure is treated as "not signed in".
    pub async fn claims(&self) -> Option<Claims> {
        let token = self.token().await?;
        match Claims::decode(&token) {
            Ok(claims) => Some(claims),
            Err(e) => {
                debug!("Stored token could not be decoded: {e:#}");
                None
            }
        }
    }

    /// True when a usable, decodable credential is stored.
    pub async fn is_signed_in(&self) -> bool {
        self.claims().await.is_some()
    }

    /// Forgets the credential, both in memory and on disk.
    pub async fn clear(&self) -> Result<()> {
        *self.credential.lock().await = None;
        utils::remove(&self.path)
            .await
            .context("Unable to remove the stored credential")?;
        debug!("Cleared credential at {}", self.path.display());
        Ok(())
    }
}

/// The claims carried by the access token. The expiry is informational only, the server decides
/// whether the token is still valid.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(deserialize_with = "subject")]
    pub sub: u64,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// Decodes the payload segment of a JWT without verifying its signature.
    pub fn decode(token: &str) -> Result<Self> {
        let mut segments = token.split('.');
        let payload = match (segments.next(), segments.next(), segments.next()) {
            (Some(_), Some(payload), Some(_)) if segments.next().is_none() => payload,
            _ => bail!("The token does not have three segments"),
        };
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .context("The token payload is not base64url")?;
        serde_json::from_slice(&bytes).context("The token payload is not a valid claims object")
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.iat, 0).single()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }
}

/// Some servers send `sub` as a string.
fn subject<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Sub {
        Number(u64),
        Text(String),
    }
    match Sub::deserialize(deserializer)? {
        Sub::Number(n) => Ok(n),
        Sub::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Builds an unsigned token for `claims`. Used by the in-memory test server.
pub(crate) fn encode_token(claims: &Claims) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(serde_json::json!(claims).to_string());
    format!("{header}.{payload}.unsigned")
}
