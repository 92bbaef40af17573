use std::path::Path;

use anyhow::{anyhow, Result};

use crate::config::proc_loader::file_to_config;
use crate::config::signer_config::ServiceConfig;

pub async fn run(config_path: &str) -> Result<ServiceConfig> {
    let path = Path::new(config_path);
    file_to_config(path)
        .await
        .map_err(|e| anyhow!("Invalid config format: {:#}", e))
}

/// Like [`run`] but a missing file is not an error.
pub async fn run_optional(config_path: &str) -> Result<Option<ServiceConfig>> {
    if !tokio::fs::try_exists(config_path).await.unwrap_or(false) {
        return Ok(None);
    }
    run(config_path).await.map(Some)
}
