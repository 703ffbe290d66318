use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the home directory, its `.secrets` subdirectory and an initial `config.json` pointing
/// at `api_url`.
///
/// # Arguments
/// - `home` - The directory that will be the root of the home directory, e.g. `$HOME/lendbook`
/// - `api_url` - The base URL of the lending REST API, e.g. `https://lending.example.com/api`
///
/// # Errors
/// - Returns an error if the URL is not usable or if any file operations fail.
pub async fn init(home: &Path, api_url: &str) -> Result<Out<()>> {
    let config = Config::create(home, api_url)
        .await
        .context("Unable to create the home directory and config")
        .pub_result(ErrorType::Config)?;
    Ok(format!(
        "Created {} for {}",
        config.config_path().display(),
        config.api_url()
    )
    .into())
}
