use std::path::Path;

use anyhow::{anyhow, Context, Result};
use regex::{Captures, Regex};
use tracing::{debug, error};

use crate::config::proc_initiator::initiate_default_values;
use crate::config::proc_validator;
use crate::config::signer_config::ServiceConfig;

/// Load, default and validate config from a YAML file.
pub async fn file_to_config(path: &Path) -> Result<ServiceConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("cannot read config file '{}'", path.display()))?;

    let expanded = expand_env_vars(&content)?;
    parse_config(&expanded)
}

pub fn parse_config(content: &str) -> Result<ServiceConfig> {
    let service_config: ServiceConfig = serde_yaml::from_str(content)
        .inspect_err(|e| error!("parse config error: {}", e))?;

    let service_config = initiate_default_values(service_config);
    debug!("validation config ...");
    proc_validator::validate_service_config(&service_config).map_err(|errors| {
        anyhow!(
            "config is not valid, total errors:{}, \n{}",
            errors.len(),
            errors.join("\n")
        )
    })?;

    Ok(service_config)
}

/// Replace `${VAR}` and `${VAR:default}` with values from the environment.
pub fn expand_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}")?;
    Ok(re
        .replace_all(input, |caps: &Captures| {
            let var = &caps[1];
            let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            std::env::var(var).unwrap_or_else(|_| default.to_string())
        })
        .into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::LogFormat;
    use crate::config::signer_config::SecretSource;

    #[test]
    fn expands_default_when_variable_is_unset() {
        let out = expand_env_vars("salt: ${TOKEN_SIGNER_TEST_UNSET_SALT:fallback}").unwrap();
        assert_eq!(out, "salt: fallback");
    }

    #[test]
    fn unset_variable_without_default_becomes_empty() {
        let out = expand_env_vars("a${TOKEN_SIGNER_TEST_UNSET_OTHER}b").unwrap();
        assert_eq!(out, "ab");
    }

    #[test]
    fn parse_applies_logging_default() {
        let cfg = parse_config("signer:\n  secret_key: { value: s }\n").unwrap();
        let logging = cfg.settings.logging.unwrap();
        assert_eq!(logging.level, "info");
        assert!(matches!(cfg.signer.secret_key, SecretSource::Literal { .. }));
        assert!(matches!(logging.format, LogFormat::Json | LogFormat::Compact));
    }

    #[test]
    fn parse_rejects_invalid_config_with_all_errors() {
        let yaml = r#"
settings:
  logging: { level: loud }
signer:
  secret_key: { value: "" }
  digest: md5
"#;
        let err = parse_config(yaml).unwrap_err().to_string();
        assert!(err.contains("total errors:3"), "{}", err);
        assert!(err.contains("settings.logging.level"));
        assert!(err.contains("signer.digest"));
        assert!(err.contains("signer.secret_key"));
    }

    #[test]
    fn parse_rejects_malformed_yaml() {
        assert!(parse_config("signer: [unterminated").is_err());
    }

    #[tokio::test]
    async fn missing_file_is_reported() {
        let err = file_to_config(Path::new("/nonexistent/token-signer.yaml"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("cannot read config file"));
    }
}
