//! Predicates deciding whether each notification channel is usable.
//!
//! Nothing here is cached: every call goes back to the filesystem, so a sound
//! file that appears or disappears is picked up on the next request. A
//! half-configured channel is simply reported as not configured.

use std::path::Path;

use serde::Serialize;
use url::Url;

use crate::config::NotificationConfig;

const SOUND_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "m4a", "webm"];

pub fn is_valid_sound_file(path: &Path) -> bool {
    if path.as_os_str().is_empty() {
        return false;
    }
    match std::fs::metadata(path) {
        Ok(meta) if !meta.is_dir() => {}
        _ => return false,
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SOUND_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

pub fn is_valid_push_server(server: &str) -> bool {
    if server.is_empty() {
        return false;
    }
    let Ok(url) = Url::parse(server) else {
        return false;
    };
    matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|host| !host.is_empty())
}

pub fn is_valid_push_topic(topic: &str) -> bool {
    !topic.is_empty()
        && topic
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Informational view of which channels are usable; never carries paths or secrets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigStatus {
    pub sound_configured: bool,
    pub success_sound_configured: bool,
    pub failure_sound_configured: bool,
    pub push_configured: bool,
}

impl NotificationConfig {
    pub fn success_sound_enabled(&self) -> bool {
        self.success_sound_path().is_some_and(is_valid_sound_file)
    }

    pub fn failure_sound_enabled(&self) -> bool {
        self.failure_sound_path().is_some_and(is_valid_sound_file)
    }

    pub fn sound_enabled(&self) -> bool {
        self.success_sound_enabled() || self.failure_sound_enabled()
    }

    pub fn push_enabled(&self) -> bool {
        is_valid_push_server(&self.ntfy.server) && is_valid_push_topic(&self.ntfy.topic)
    }

    pub fn config_status(&self) -> ConfigStatus {
        ConfigStatus {
            sound_configured: self.sound_enabled(),
            success_sound_configured: self.success_sound_enabled(),
            failure_sound_configured: self.failure_sound_enabled(),
            push_configured: self.push_enabled(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(dir: &Path, name: &str) -> String {
        let path = dir.join(name);
        fs::write(&path, b"RIFF").unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn sound_file_requires_existing_audio_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(is_valid_sound_file(Path::new(&touch(dir.path(), "ok.mp3"))));
        assert!(is_valid_sound_file(Path::new(&touch(dir.path(), "LOUD.WAV"))));
        assert!(is_valid_sound_file(Path::new(&touch(dir.path(), "clip.webm"))));

        assert!(!is_valid_sound_file(Path::new("")));
        assert!(!is_valid_sound_file(&dir.path().join("missing.mp3")));
        assert!(!is_valid_sound_file(Path::new(&touch(dir.path(), "notes.txt"))));
        assert!(!is_valid_sound_file(Path::new(&touch(dir.path(), "noext"))));

        let audio_dir = dir.path().join("folder.mp3");
        fs::create_dir(&audio_dir).unwrap();
        assert!(!is_valid_sound_file(&audio_dir));
    }

    #[test]
    fn push_server_needs_http_scheme_and_host() {
        assert!(is_valid_push_server("https://ntfy.sh"));
        assert!(is_valid_push_server("http://localhost:8080"));

        assert!(!is_valid_push_server(""));
        assert!(!is_valid_push_server("ntfy.sh"));
        assert!(!is_valid_push_server("ftp://ntfy.sh"));
        assert!(!is_valid_push_server("file:///tmp/socket"));
        assert!(!is_valid_push_server("http://"));
    }

    #[test]
    fn push_topic_charset() {
        assert!(is_valid_push_topic("goconvey-notifications"));
        assert!(is_valid_push_topic("Build_42"));

        assert!(!is_valid_push_topic(""));
        assert!(!is_valid_push_topic("has space"));
        assert!(!is_valid_push_topic("slash/topic"));
        assert!(!is_valid_push_topic("émoji"));
    }

    #[test]
    fn legacy_sound_enables_both_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = NotificationConfig::default();
        config.sound.file_path = touch(dir.path(), "a.mp3");

        let status = config.config_status();
        assert!(status.sound_configured);
        assert!(status.success_sound_configured);
        assert!(status.failure_sound_configured);
    }

    #[test]
    fn broken_override_does_not_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = NotificationConfig::default();
        config.sound.file_path = touch(dir.path(), "a.mp3");
        config.sound.success_file_path = dir.path().join("gone.mp3").to_string_lossy().into();

        assert!(!config.success_sound_enabled());
        assert!(config.failure_sound_enabled());
        assert!(config.sound_enabled());
    }

    #[test]
    fn push_enabled_tracks_both_fields() {
        let mut config = NotificationConfig::default();
        assert!(config.push_enabled());

        config.ntfy.topic = "bad topic".into();
        assert!(!config.push_enabled());

        config.ntfy.topic = "ok".into();
        config.ntfy.server = "not a url".into();
        assert!(!config.push_enabled());
    }

    #[test]
    fn status_is_stable_and_camel_cased() {
        let config = NotificationConfig::default();
        let first = serde_json::to_value(config.config_status()).unwrap();
        let second = serde_json::to_value(config.config_status()).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first,
            serde_json::json!({
                "soundConfigured": false,
                "successSoundConfigured": false,
                "failureSoundConfigured": false,
                "pushConfigured": true,
            })
        );
    }
}
