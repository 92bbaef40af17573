//! Configuration validation with aggregated errors.
//! Every issue is collected into a `Vec<String>` so a broken file is
//! reported in one pass.

use tracing::{error, info};

use crate::config::settings::SettingsConfig;
use crate::config::signer_config::{SecretSource, ServiceConfig, SignerConfig};
use crate::signing::algorithm::{DigestMethod, SigningAlgorithm};
use crate::signing::derivation::KeyDerivation;
use crate::signing::signer::validate_separator;

const MAX_AGE_LIMIT_SECS: u64 = 60 * 60 * 24 * 365 * 10;

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_signer(&cfg.signer, &mut errors);

    if errors.is_empty() {
        info!("config valid");
        Ok(())
    } else {
        error!("configuration validation errors ({}):", errors.len());
        for e in &errors {
            error!(" - {}", e);
        }
        Err(errors)
    }
}

/// SETTINGS VALIDATION
fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if let Some(logging) = &settings.logging {
        let valid = ["trace", "debug", "info", "warn", "error"];
        if !valid.contains(&logging.level.as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' invalid; allowed: {:?}",
                logging.level, valid
            ));
        }
    }
}

/// SIGNER VALIDATION
fn validate_signer(signer: &SignerConfig, errors: &mut Vec<String>) {
    match &signer.secret_key {
        SecretSource::Literal { value } if value.is_empty() => {
            errors.push("signer.secret_key.value must not be empty".to_string())
        }
        SecretSource::FromEnv { from_env } if from_env.trim().is_empty() => {
            errors.push("signer.secret_key.from_env must name a variable".to_string())
        }
        SecretSource::FromFile { path } if path.trim().is_empty() => {
            errors.push("signer.secret_key.path must not be empty".to_string())
        }
        _ => {}
    }

    if let Some(separator) = signer.separator {
        if let Err(e) = validate_separator(separator) {
            errors.push(format!("signer.separator: {}", e));
        }
    }

    if let Some(name) = &signer.key_derivation {
        if let Err(e) = name.parse::<KeyDerivation>() {
            errors.push(format!("signer.key_derivation: {}", e));
        }
    }

    let digest = match signer.digest.as_deref().map(str::parse::<DigestMethod>) {
        Some(Err(e)) => {
            errors.push(format!("signer.digest: {}", e));
            DigestMethod::default()
        }
        Some(Ok(digest)) => digest,
        None => DigestMethod::default(),
    };

    if let Some(name) = &signer.algorithm {
        match SigningAlgorithm::from_name(name, digest) {
            Ok(SigningAlgorithm::None) => {
                tracing::warn!("signer.algorithm is 'none'; tokens will not be protected")
            }
            Ok(_) => {}
            Err(e) => errors.push(format!("signer.algorithm: {}", e)),
        }
    }

    if let Some(max_age) = signer.max_age_seconds {
        if max_age > MAX_AGE_LIMIT_SECS {
            errors.push(format!(
                "signer.max_age_seconds ({}) is unreasonably large",
                max_age
            ));
        }
    }
}
