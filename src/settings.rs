//! Settings storage: the collaborator trait and a JSON-file implementation.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::models::PlexSettings;

/// Loads and saves the Plex settings document.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsCollaborator: Send + Sync {
    async fn load_plex_settings(&self) -> Result<PlexSettings, SettingsError>;

    /// Returns false when the backend refused the document.
    async fn save_plex_settings(&self, settings: &PlexSettings) -> Result<bool, SettingsError>;
}

/// Settings persisted as one pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SettingsCollaborator for JsonSettingsStore {
    /// A missing file loads as empty settings.
    async fn load_plex_settings(&self) -> Result<PlexSettings, SettingsError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no settings file yet");
                return Ok(PlexSettings::default());
            }
            Err(source) => {
                return Err(SettingsError::ReadFailed {
                    source,
                    path: self.path.clone(),
                })
            }
        };
        if content.trim().is_empty() {
            return Ok(PlexSettings::default());
        }
        serde_json::from_str(&content).map_err(SettingsError::ParseFailed)
    }

    async fn save_plex_settings(&self, settings: &PlexSettings) -> Result<bool, SettingsError> {
        // Ensure parent dir exists
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(SettingsError::CreateDir)?;
        }

        let output = serde_json::to_string_pretty(settings).map_err(SettingsError::SerializeFailed)?;
        tokio::fs::write(&self.path, output)
            .await
            .map_err(|source| SettingsError::WriteFailed {
                source,
                path: self.path.clone(),
            })?;

        tracing::debug!(path = %self.path.display(), servers = settings.servers.len(), "settings written");
        Ok(true)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to read settings {}: {source}", path.display())]
    ReadFailed { source: std::io::Error, path: PathBuf },
    #[error("Failed to parse settings: {0}")]
    ParseFailed(#[source] serde_json::Error),
    #[error("Failed to serialize settings: {0}")]
    SerializeFailed(#[source] serde_json::Error),
    #[error("Failed to create directory: {0}")]
    CreateDir(#[source] std::io::Error),
    #[error("Failed to write settings {}: {source}", path.display())]
    WriteFailed { source: std::io::Error, path: PathBuf },
}
