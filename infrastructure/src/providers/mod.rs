//! Completion backend adapters.

pub mod gemini;

use crate::config::FileBackendConfig;
use finteam_application::CompletionError;
use gemini::{GeminiBackend, GeminiSettings};
use std::time::Duration;

/// Build the configured backend. Fails when no API key can be resolved.
pub fn backend_from_config(config: &FileBackendConfig) -> Result<GeminiBackend, CompletionError> {
    let api_key = config.resolve_api_key().ok_or_else(|| {
        CompletionError::PermissionDenied(format!(
            "no API key: set {} or backend.api_key",
            config.api_key_env
        ))
    })?;

    GeminiBackend::new(
        GeminiSettings::new(&config.model, api_key)
            .with_base_url(&config.base_url)
            .with_request_timeout(Duration::from_secs(config.request_timeout_seconds)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use finteam_application::CompletionBackend;

    #[test]
    fn test_missing_key_names_variable() {
        let config = FileBackendConfig {
            api_key_env: "FINTEAM_TEST_UNSET_KEY".to_string(),
            ..Default::default()
        };
        let err = backend_from_config(&config).err().unwrap();
        assert!(matches!(err, CompletionError::PermissionDenied(_)));
        assert!(err.to_string().contains("FINTEAM_TEST_UNSET_KEY"));
    }

    #[test]
    fn test_inline_key() {
        let config = FileBackendConfig {
            api_key: Some("inline".to_string()),
            model: "gemini-1.5-pro".to_string(),
            ..Default::default()
        };
        let backend = backend_from_config(&config).unwrap();
        assert_eq!(backend.model(), "gemini-1.5-pro");
    }
}
