use crate::config::settings::LoggingConfig;
use crate::config::signer_config::ServiceConfig;

/// Fill in defaults and normalise names before validation.
pub fn initiate_default_values(mut config: ServiceConfig) -> ServiceConfig {
    let logging = config
        .settings
        .logging
        .get_or_insert_with(LoggingConfig::default);
    logging.level = logging.level.trim().to_lowercase();

    let signer = &mut config.signer;
    for name in [
        &mut signer.key_derivation,
        &mut signer.digest,
        &mut signer.algorithm,
    ]
    .into_iter()
    .flatten()
    {
        *name = name.trim().to_lowercase();
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_lowercased() {
        let cfg: ServiceConfig = serde_yaml::from_str(
            r#"
settings:
  logging: { level: " DEBUG " }
signer:
  secret_key: { value: s }
  digest: SHA256
  key_derivation: Django-Concat
"#,
        )
        .unwrap();
        let cfg = initiate_default_values(cfg);
        assert_eq!(cfg.settings.logging.unwrap().level, "debug");
        assert_eq!(cfg.signer.digest.as_deref(), Some("sha256"));
        assert_eq!(cfg.signer.key_derivation.as_deref(), Some("django-concat"));
        assert_eq!(cfg.signer.algorithm, None);
    }
}
