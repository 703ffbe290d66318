//! Configuration file handling for lendbook.
//!
//! The configuration file is stored at `$LENDBOOK_HOME/config.json` and holds the URL of the
//! lending API, request settings and the location of the stored access token.

use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const APP_NAME: &str = "lendbook";
const CONFIG_VERSION: u8 = 1;
const SECRETS: &str = ".secrets";
const ACCESS_TOKEN_JSON: &str = "access_token.json";
const CONFIG_JSON: &str = "config.json";
const TIMEOUT_SECS: u64 = 15;
const CASHBOOK_PAGE_SIZE: usize = 15;

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$LENDBOOK_HOME` and from there it loads `$LENDBOOK_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    secrets: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    api_url: Url,
}

impl Config {
    /// Creates the home directory, its `.secrets` subdirectory and an initial `config.json`
    /// pointing at `api_url`.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of the home directory, e.g. `$HOME/lendbook`
    /// - `api_url` - Base URL of the lending REST API, e.g. `https://api.example.com/api`
    ///
    /// # Errors
    /// - Returns an error if the URL is not a valid http(s) URL or if any file operation fails.
    pub async fn create(dir: impl Into<PathBuf>, api_url: &str) -> Result<Self> {
        let api_url = normalize_api_url(api_url)?;

        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the lendbook home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let secrets = root.join(SECRETS);
        utils::make_dir(&secrets).await?;

        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile {
            api_url: api_url.to_string(),
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            secrets,
            config_path,
            config_file,
            api_url,
        })
    }

    /// This will
    /// - validate that the home directory and the config file exist
    /// - load and validate the config file
    /// - validate that the secrets directory exists
    pub async fn load(home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The lendbook home directory is missing, run 'lendbook init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;
        let api_url = normalize_api_url(&config_file.api_url)
            .with_context(|| format!("Invalid api_url in '{}'", config_path.display()))?;

        let config = Self {
            root: root.clone(),
            secrets: root.join(SECRETS),
            config_path,
            config_file,
            api_url,
        };
        if !config.secrets.is_dir() {
            bail!(
                "The secrets directory is missing '{}'",
                config.secrets.display()
            )
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn secrets(&self) -> &Path {
        &self.secrets
    }

    /// The base URL of the API, always ending with `/`.
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.config_file.timeout_secs)
    }

    pub fn cashbook_page_size(&self) -> usize {
        self.config_file.cashbook_page_size
    }

    /// Returns the stored `credential_path` if it is absolute, otherwise resolves it against the
    /// home directory.
    pub fn credential_path(&self) -> PathBuf {
        let p = self.config_file.credential_path();
        if p.is_absolute() {
            return p;
        }
        self.root.join(p)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "lendbook",
///   "config_version": 1,
///   "api_url": "https://api.example.com/api/",
///   "timeout_secs": 15,
///   "cashbook_page_size": 15,
///   "credential_path": ".secrets/access_token.json"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "lendbook"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Base URL of the lending REST API
    api_url: String,

    /// Upper bound for a single request
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,

    /// Rows per cashbook page
    #[serde(default = "default_cashbook_page_size")]
    cashbook_page_size: usize,

    /// Path to the stored access token (optional, relative to the home directory or absolute).
    /// Defaults to $LENDBOOK_HOME/.secrets/access_token.json
    #[serde(skip_serializing_if = "Option::is_none")]
    credential_path: Option<PathBuf>,
}

fn default_timeout_secs() -> u64 {
    TIMEOUT_SECS
}

fn default_cashbook_page_size() -> usize {
    CASHBOOK_PAGE_SIZE
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            api_url: String::new(),
            timeout_secs: TIMEOUT_SECS,
            cashbook_page_size: CASHBOOK_PAGE_SIZE,
            credential_path: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or holds invalid settings
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            config.timeout_secs > 0,
            "Invalid timeout_secs in config file: must be greater than zero"
        );
        anyhow::ensure!(
            config.cashbook_page_size > 0,
            "Invalid cashbook_page_size in config file: must be greater than zero"
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    /// Gets the credential path, defaulting to `.secrets/access_token.json`.
    pub fn credential_path(&self) -> PathBuf {
        self.credential_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(SECRETS).join(ACCESS_TOKEN_JSON))
    }
}

/// Parses `url` and makes sure it can be used as a base for relative endpoint paths.
///
/// `Url::join` replaces the last path segment unless the base ends with `/`, so a trailing slash
/// is added when missing.
fn normalize_api_url(url: &str) -> Result<Url> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        bail!("The API URL is empty")
    }
    let mut parsed =
        Url::parse(trimmed).with_context(|| format!("Unable to parse the API URL '{trimmed}'"))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        bail!(
            "The API URL must use http or https, got '{}'",
            parsed.scheme()
        )
    }
    if parsed.cannot_be_a_base() {
        bail!("The API URL '{trimmed}' cannot be used as a base URL")
    }
    if !parsed.path().ends_with('/') {
        let path = format!("{}/", parsed.path());
        parsed.set_path(&path);
    }
    parsed.set_query(None);
    parsed.set_fragment(None);
    Ok(parsed)
}
