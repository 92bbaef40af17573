//! Shared constants

pub const DEFAULT_CONFIG_PATH: &str = "token-signer.yaml";

pub const ENV_CONFIG: &str = "CONFIG";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
pub const ENV_SECRET_KEY: &str = "TOKEN_SIGNER_SECRET";
