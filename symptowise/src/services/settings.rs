//! Settings service
//!
//! Manages application settings persistence using JSON file storage.

use crate::config::*;
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;

/// Chat-completion assistant configuration. The API key is never stored
/// here; it is read from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_endpoint() -> String {
    DEFAULT_ASSISTANT_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_ASSISTANT_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_ASSISTANT_TIMEOUT_SECS
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_endpoint(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AssistantSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if !(self.endpoint.starts_with("https://") || self.endpoint.starts_with("http://")) {
            return Err(AppError::Settings(format!(
                "Assistant endpoint must be an http(s) URL: {}",
                self.endpoint
            )));
        }
        if self.model.trim().is_empty() {
            return Err(AppError::Settings("Assistant model must not be empty".to_string()));
        }
        if !(MIN_ASSISTANT_TIMEOUT_SECS..=MAX_ASSISTANT_TIMEOUT_SECS).contains(&self.timeout_secs) {
            return Err(AppError::Settings(format!(
                "Assistant timeout must be between {} and {} seconds",
                MIN_ASSISTANT_TIMEOUT_SECS, MAX_ASSISTANT_TIMEOUT_SECS
            )));
        }
        Ok(())
    }
}

/// Toast presentation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToastSettings {
    /// Default lifetime in milliseconds
    #[serde(default = "default_toast_duration")]
    pub default_duration_ms: u64,
}

fn default_toast_duration() -> u64 {
    DEFAULT_TOAST_DURATION_MS
}

impl Default for ToastSettings {
    fn default() -> Self {
        Self {
            default_duration_ms: default_toast_duration(),
        }
    }
}

impl ToastSettings {
    pub fn default_duration(&self) -> Duration {
        Duration::from_millis(self.default_duration_ms)
    }

    fn validate(&self) -> Result<()> {
        if !(MIN_TOAST_DURATION_MS..=MAX_TOAST_DURATION_MS).contains(&self.default_duration_ms) {
            return Err(AppError::Settings(format!(
                "Toast duration must be between {} and {} ms",
                MIN_TOAST_DURATION_MS, MAX_TOAST_DURATION_MS
            )));
        }
        Ok(())
    }
}

/// Application settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub assistant: AssistantSettings,
    #[serde(default)]
    pub toasts: ToastSettings,
}

impl AppSettings {
    /// Replace any section that fails validation with its defaults
    fn sanitize(&mut self) {
        if let Err(e) = self.assistant.validate() {
            tracing::warn!("Ignoring stored assistant settings: {}", e);
            self.assistant = AssistantSettings::default();
        }
        if let Err(e) = self.toasts.validate() {
            tracing::warn!("Ignoring stored toast settings: {}", e);
            self.toasts = ToastSettings::default();
        }
    }
}

/// Service for managing application settings
#[derive(Clone)]
pub struct SettingsService {
    settings_path: PathBuf,
}

impl SettingsService {
    pub fn new(app_data_dir: PathBuf) -> Self {
        Self {
            settings_path: app_data_dir.join("settings.json"),
        }
    }

    /// Load settings from disk or create default if not exists
    pub async fn load(&self) -> Result<AppSettings> {
        if !self.settings_path.exists() {
            tracing::info!("Settings file not found, creating default settings");
            let default = AppSettings::default();
            self.save(&default).await?;
            return Ok(default);
        }

        let content = fs::read_to_string(&self.settings_path).await?;
        let mut settings: AppSettings = serde_json::from_str(&content)
            .map_err(|e| AppError::Settings(format!("Failed to parse settings: {}", e)))?;
        // Hand-edited files bypass the update_* checks
        settings.sanitize();

        Ok(settings)
    }

    /// Save settings to disk
    pub async fn save(&self, settings: &AppSettings) -> Result<()> {
        let content = serde_json::to_string_pretty(settings)
            .map_err(|e| AppError::Settings(format!("Failed to serialize settings: {}", e)))?;

        if let Some(parent) = self.settings_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&self.settings_path, content).await?;
        tracing::info!("Settings saved to {:?}", self.settings_path);

        Ok(())
    }

    pub async fn get_assistant(&self) -> Result<AssistantSettings> {
        Ok(self.load().await?.assistant)
    }

    pub async fn update_assistant(&self, assistant: AssistantSettings) -> Result<()> {
        assistant.validate()?;
        let mut settings = self.load().await?;
        settings.assistant = assistant;
        self.save(&settings).await
    }

    pub async fn get_toasts(&self) -> Result<ToastSettings> {
        Ok(self.load().await?.toasts)
    }

    pub async fn update_toasts(&self, toasts: ToastSettings) -> Result<()> {
        toasts.validate()?;
        let mut settings = self.load().await?;
        settings.toasts = toasts;
        self.save(&settings).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_service() -> (SettingsService, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let service = SettingsService::new(temp_dir.path().to_path_buf());
        (service, temp_dir)
    }

    #[tokio::test]
    async fn test_default_settings_created_on_load() {
        let (service, temp) = create_test_service();

        let settings = service.load().await.unwrap();

        assert!(settings.assistant.enabled);
        assert_eq!(settings.assistant.model, DEFAULT_ASSISTANT_MODEL);
        assert_eq!(settings.assistant.timeout_secs, DEFAULT_ASSISTANT_TIMEOUT_SECS);
        assert_eq!(settings.toasts.default_duration_ms, 3000);
        assert!(temp.path().join("settings.json").exists());
    }

    #[tokio::test]
    async fn test_assistant_settings_persist() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().to_path_buf();

        {
            let service = SettingsService::new(dir.clone());
            let updated = AssistantSettings {
                enabled: false,
                endpoint: "http://localhost:8080/v1/chat/completions".to_string(),
                model: "local-model".to_string(),
                timeout_secs: 10,
            };
            service.update_assistant(updated).await.unwrap();
        }

        {
            let service = SettingsService::new(dir);
            let loaded = service.get_assistant().await.unwrap();
            assert!(!loaded.enabled);
            assert_eq!(loaded.model, "local-model");
            assert_eq!(loaded.timeout(), Duration::from_secs(10));
        }
    }

    #[tokio::test]
    async fn test_invalid_values_rejected() {
        let (service, _temp) = create_test_service();

        let bad_timeout = AssistantSettings {
            timeout_secs: 0,
            ..AssistantSettings::default()
        };
        assert!(matches!(
            service.update_assistant(bad_timeout).await,
            Err(AppError::Settings(_))
        ));

        let bad_endpoint = AssistantSettings {
            endpoint: "ftp://example.com".to_string(),
            ..AssistantSettings::default()
        };
        assert!(service.update_assistant(bad_endpoint).await.is_err());

        let bad_toast = ToastSettings {
            default_duration_ms: 10,
        };
        assert!(service.update_toasts(bad_toast).await.is_err());
        assert_eq!(service.get_toasts().await.unwrap(), ToastSettings::default());
    }

    #[tokio::test]
    async fn test_partial_file_fills_defaults() {
        let (service, temp) = create_test_service();
        std::fs::write(
            temp.path().join("settings.json"),
            r#"{"toasts": {"default_duration_ms": 5000}}"#,
        )
        .unwrap();

        let settings = service.load().await.unwrap();

        assert_eq!(settings.toasts.default_duration_ms, 5000);
        assert_eq!(settings.assistant, AssistantSettings::default());
    }

    #[tokio::test]
    async fn test_out_of_range_file_values_fall_back_to_defaults() {
        let (service, temp) = create_test_service();
        std::fs::write(
            temp.path().join("settings.json"),
            r#"{
                "assistant": {"model": "custom", "timeout_secs": 0},
                "toasts": {"default_duration_ms": 10}
            }"#,
        )
        .unwrap();

        let settings = service.load().await.unwrap();

        assert_eq!(settings.assistant, AssistantSettings::default());
        assert_eq!(settings.toasts, ToastSettings::default());

        // a valid section survives next to an invalid one
        std::fs::write(
            temp.path().join("settings.json"),
            r#"{
                "assistant": {"model": "custom"},
                "toasts": {"default_duration_ms": 10}
            }"#,
        )
        .unwrap();
        let settings = service.load().await.unwrap();
        assert_eq!(settings.assistant.model, "custom");
        assert_eq!(settings.toasts, ToastSettings::default());
    }

    #[tokio::test]
    async fn test_toast_update_preserves_assistant() {
        let (service, _temp) = create_test_service();
        let assistant = AssistantSettings {
            model: "gpt-4o-mini".to_string(),
            ..AssistantSettings::default()
        };
        service.update_assistant(assistant).await.unwrap();

        service
            .update_toasts(ToastSettings {
                default_duration_ms: 4000,
            })
            .await
            .unwrap();

        let settings = service.load().await.unwrap();
        assert_eq!(settings.assistant.model, "gpt-4o-mini");
        assert_eq!(settings.toasts.default_duration_ms, 4000);
    }
}
