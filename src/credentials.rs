use std::fs;

use crate::config::GeneratorConfig;
use crate::error::{NpcError, Result};

/// Resolves the API key: the configured environment variable first, then the
/// secrets file. Anything missing or blank is fatal.
pub fn load_api_key(config: &GeneratorConfig) -> Result<String> {
    if let Ok(key) = std::env::var(&config.api_key_env) {
        let key = key.trim();
        if !key.is_empty() {
            log::debug!("Using API key from ${}", config.api_key_env);
            return Ok(key.to_string());
        }
    }

    let contents = fs::read_to_string(&config.secrets_path).map_err(|e| {
        NpcError::Credential(format!(
            "${} is unset and {:?} is unreadable: {}",
            config.api_key_env, config.secrets_path, e
        ))
    })?;

    let key = contents.trim();
    if key.is_empty() {
        return Err(NpcError::Credential(format!(
            "{:?} is empty",
            config.secrets_path
        )));
    }

    log::debug!("Using API key from {:?}", config.secrets_path);
    Ok(key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(secrets: &std::path::Path) -> GeneratorConfig {
        GeneratorConfig {
            api_key_env: "NPC_FORGE_TEST_KEY_THAT_IS_NEVER_SET".into(),
            secrets_path: secrets.to_path_buf(),
            ..GeneratorConfig::default()
        }
    }

    #[test]
    fn reads_trimmed_secrets_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".secrets");
        fs::write(&path, "sk-abc123\n").unwrap();

        assert_eq!(load_api_key(&config_with(&path)).unwrap(), "sk-abc123");
    }

    #[test]
    fn missing_or_blank_secret_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".secrets");
        assert!(matches!(
            load_api_key(&config_with(&path)),
            Err(NpcError::Credential(_))
        ));

        fs::write(&path, "  \n").unwrap();
        assert!(matches!(
            load_api_key(&config_with(&path)),
            Err(NpcError::Credential(_))
        ));
    }
}
