use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Sound and push notification settings, loaded once at start-up.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationConfig {
    #[serde(default)]
    pub sound: SoundConfig,
    #[serde(default)]
    pub ntfy: PushConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SoundConfig {
    /// Legacy single sound, used for any outcome without its own file.
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub success_file_path: String,
    #[serde(default)]
    pub failure_file_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PushConfig {
    #[serde(default = "default_server")]
    pub server: String,
    #[serde(default = "default_topic")]
    pub topic: String,
    /// Per-request timeout in seconds; 0 disables it.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default)]
    pub auth_header: String,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            topic: default_topic(),
            timeout: default_timeout(),
            auth_header: String::new(),
        }
    }
}

fn default_server() -> String {
    "https://ntfy.sh".to_string()
}

fn default_topic() -> String {
    "goconvey-notifications".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl NotificationConfig {
    /// Reads the config at `path`.
    ///
    /// A missing file yields the defaults; an unreadable or malformed one is
    /// an error for the caller to act on.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "notification config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let config: Self = serde_json::from_slice(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if config.sound.uses_legacy_path() {
            info!(
                file = %config.sound.file_path,
                "using legacy sound config for both success and failure"
            );
        }
        info!(path = %path.display(), "loaded notification config");
        Ok(config)
    }

    pub fn generic_sound_path(&self) -> Option<&Path> {
        non_empty(&self.sound.file_path)
    }

    /// Success sound, falling back to the legacy file.
    pub fn success_sound_path(&self) -> Option<&Path> {
        non_empty(&self.sound.success_file_path).or_else(|| self.generic_sound_path())
    }

    /// Failure sound, falling back to the legacy file.
    pub fn failure_sound_path(&self) -> Option<&Path> {
        non_empty(&self.sound.failure_file_path).or_else(|| self.generic_sound_path())
    }
}

impl SoundConfig {
    fn uses_legacy_path(&self) -> bool {
        !self.file_path.is_empty()
            && self.success_file_path.is_empty()
            && self.failure_file_path.is_empty()
    }
}

fn non_empty(path: &str) -> Option<&Path> {
    if path.is_empty() {
        None
    } else {
        Some(Path::new(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = NotificationConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, NotificationConfig::default());
        assert_eq!(config.ntfy.server, "https://ntfy.sh");
        assert_eq!(config.ntfy.topic, "goconvey-notifications");
        assert_eq!(config.ntfy.timeout, 30);
        assert!(config.sound.file_path.is_empty());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"sound": {{"file_path": "/tmp/a.mp3"}}, "ntfy": {{"topic": "builds"}}}}"#
        )
        .unwrap();

        let config = NotificationConfig::load(file.path()).unwrap();
        assert_eq!(config.sound.file_path, "/tmp/a.mp3");
        assert_eq!(config.ntfy.topic, "builds");
        assert_eq!(config.ntfy.server, "https://ntfy.sh");
        assert_eq!(config.ntfy.timeout, 30);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let err = NotificationConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn unreadable_path_is_an_error_not_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let not_a_dir = dir.path().join("notify.json");
        std::fs::write(&not_a_dir, "{}").unwrap();
        let err = NotificationConfig::load(&not_a_dir.join("config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));

        let err = NotificationConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn specific_sound_paths_fall_back_to_legacy() {
        let mut config = NotificationConfig::default();
        assert_eq!(config.success_sound_path(), None);

        config.sound.file_path = "/tmp/generic.wav".into();
        assert_eq!(config.success_sound_path(), Some(Path::new("/tmp/generic.wav")));
        assert_eq!(config.failure_sound_path(), Some(Path::new("/tmp/generic.wav")));

        config.sound.failure_file_path = "/tmp/fail.ogg".into();
        assert_eq!(config.success_sound_path(), Some(Path::new("/tmp/generic.wav")));
        assert_eq!(config.failure_sound_path(), Some(Path::new("/tmp/fail.ogg")));
    }
}
