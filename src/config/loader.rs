//! Configuration loading from disk and environment.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("{name}={value:?} is not a boolean (use true/false, 1/0, yes/no, on/off)")]
    InvalidFlag { name: &'static str, value: String },
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, then apply environment
/// overrides and validate.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment variables onto `config`.
///
/// `lookup` resolves a variable name; tests pass a map instead of the
/// process environment.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(bucket) = lookup("S3_BUCKET") {
        config.rules.bucket = bucket;
    }
    if let Some(key) = lookup("S3_KEY") {
        config.rules.key = key;
    }
    if let Some(region) = lookup("AWS_REGION") {
        config.rules.region = Some(region);
    }
    if let Some(endpoint) = lookup("S3_ENDPOINT") {
        config.rules.endpoint = Some(endpoint);
    }
    if let Some(dir) = lookup("RULES_LOCAL_DIR") {
        config.rules.local_dir = Some(PathBuf::from(dir));
    }
    if let Some(addr) = lookup("GATEWAY_BIND_ADDRESS") {
        config.listener.bind_address = addr;
    }
    if let Some(flag) = read_flag(&lookup, "GATEWAY_FORWARD_BODY")? {
        config.forwarding.forward_body = flag;
    }
    if let Some(flag) = read_flag(&lookup, "GATEWAY_STRUCTURED_LOGGING")? {
        config.forwarding.structured_logging = flag;
    }
    if let Some(flag) = read_flag(&lookup, "GATEWAY_AUTHORIZER_ENABLED")? {
        config.authorizer.enabled = flag;
    }
    Ok(())
}

/// Read a boolean variable. Unset is `None`; an unrecognized value is an error.
fn read_flag<F>(lookup: &F, name: &'static str) -> Result<Option<bool>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(name) else {
        return Ok(None);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(ConfigError::InvalidFlag { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_env_overrides_file_values() {
        let mut config: GatewayConfig = toml::from_str(
            r#"
            [rules]
            bucket = "from-file"
            key = "file.json"
            "#,
        )
        .unwrap();

        let env: HashMap<&str, &str> = HashMap::from([
            ("S3_BUCKET", "from-env"),
            ("GATEWAY_FORWARD_BODY", "off"),
            ("GATEWAY_AUTHORIZER_ENABLED", "true"),
        ]);
        apply_env_overrides(&mut config, |name| env.get(name).map(|v| v.to_string())).unwrap();

        assert_eq!(config.rules.bucket, "from-env");
        assert_eq!(config.rules.key, "file.json");
        assert!(!config.forwarding.forward_body);
        assert!(config.authorizer.enabled);
    }

    #[test]
    fn test_unrecognized_flag_is_an_error() {
        let mut config = GatewayConfig::default();
        let err = apply_env_overrides(&mut config, |name| {
            (name == "GATEWAY_STRUCTURED_LOGGING").then(|| "maybe".to_string())
        })
        .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::InvalidFlag { name: "GATEWAY_STRUCTURED_LOGGING", ref value } if value == "maybe"
        ));
        assert!(err.to_string().starts_with(r#"GATEWAY_STRUCTURED_LOGGING="maybe" is not a boolean"#));
        assert!(config.forwarding.structured_logging);
    }

    #[test]
    fn test_validation_error_message_lists_all() {
        let err = ConfigError::Validation(vec![
            ValidationError::MissingBucket,
            ValidationError::MissingKey,
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: rules.bucket is required (set S3_BUCKET), rules.key is required (set S3_KEY)"
        );
    }
}
