//! Configuration management for the parlotte assistant
//!
//! All paths derive from a single assistant root directory. A partial TOML
//! file (`~/.config/parlotte/config.toml`) overlays the defaults; CLI flags
//! and environment variables take precedence over both.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::Result;

/// Default inactivity window before the session resets to Dormant
const DEFAULT_INACTIVITY_SECS: u64 = 60;

/// Assistant configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Assistant root directory (model, sounds, content file, marker)
    pub root: PathBuf,

    /// Path to the recognizer model directory
    pub model_dir: PathBuf,

    /// Directory of music tracks
    pub music_dir: PathBuf,

    /// Directory of ambient sounds
    pub sound_dir: PathBuf,

    /// Path to the content file (replies, quiz, feedback)
    pub content_path: PathBuf,

    /// Farewell jingle, started when the user says goodbye
    pub farewell_sound: PathBuf,

    /// Jingle played on a zero-score quiz when consent was given
    pub failure_sound: PathBuf,

    /// Zero-byte marker suppressing the first-run announcement
    pub marker_path: PathBuf,

    /// Wake word; must exist as a key in the content file
    pub wake_word: String,

    /// Synthesizer language tag (pico2wave `-l`)
    pub tts_lang: String,

    /// Media player command; the track path is appended
    pub player: Vec<String>,

    /// Inactivity window before an Active session resets
    pub inactivity_timeout: Duration,
}

impl Config {
    /// Load configuration: defaults under `root`, overlaid by the TOML file
    ///
    /// # Errors
    ///
    /// Returns error if no root directory can be determined
    pub fn load(root_override: Option<PathBuf>) -> Result<Self> {
        let file = load_config_file();

        let root = root_override
            .or_else(|| file.root.clone())
            .or_else(default_root)
            .ok_or_else(|| {
                crate::Error::Config("no assistant root directory; pass --root".to_string())
            })?;

        let mut config = Self::with_root(root);

        if let Some(wake_word) = file.wake_word {
            config.wake_word = wake_word.to_lowercase();
        }
        if let Some(lang) = file.tts_lang {
            config.tts_lang = lang;
        }
        if let Some(player) = file.player {
            if player.is_empty() {
                tracing::warn!("empty player command in config file, keeping default");
            } else {
                config.player = player;
            }
        }
        if let Some(secs) = file.inactivity_secs {
            config.inactivity_timeout = Duration::from_secs(secs);
        }
        if let Some(model_dir) = file.model_dir {
            config.model_dir = model_dir;
        }

        Ok(config)
    }

    /// Build a configuration with every path derived from `root`
    #[must_use]
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            model_dir: root.join("model"),
            music_dir: root.join("sounds").join("musics"),
            sound_dir: root.join("sounds").join("random"),
            content_path: root.join("data.json"),
            farewell_sound: root.join("sounds").join("au_revoir.mp3"),
            failure_sound: root.join("sounds").join("tes_mauvais.mp3"),
            marker_path: root.join(".initialized"),
            wake_word: "bonjour".to_string(),
            tts_lang: "fr-FR".to_string(),
            player: vec!["mpg123".to_string(), "-q".to_string()],
            inactivity_timeout: Duration::from_secs(DEFAULT_INACTIVITY_SECS),
            root,
        }
    }
}

/// Top-level TOML configuration file schema
///
/// All fields are optional — the file is a partial overlay on top of defaults.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    /// Assistant root directory
    #[serde(default)]
    root: Option<PathBuf>,

    /// Wake word
    #[serde(default)]
    wake_word: Option<String>,

    /// Synthesizer language tag
    #[serde(default)]
    tts_lang: Option<String>,

    /// Media player command and arguments
    #[serde(default)]
    player: Option<Vec<String>>,

    /// Inactivity window in seconds
    #[serde(default)]
    inactivity_secs: Option<u64>,

    /// Recognizer model directory override
    #[serde(default)]
    model_dir: Option<PathBuf>,
}

/// Load the TOML config file from the standard path
///
/// Returns `ConfigFile::default()` if the file doesn't exist or can't be parsed.
fn load_config_file() -> ConfigFile {
    let Some(path) = config_file_path() else {
        return ConfigFile::default();
    };

    if !path.exists() {
        return ConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                ConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            ConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/parlotte/config.toml`
fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("parlotte").join("config.toml"))
}

/// Default assistant root: `~/.local/share/parlotte` (platform equivalent)
fn default_root() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "parlotte").map(|d| d.data_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_derive_from_root() {
        let config = Config::with_root(PathBuf::from("/srv/assistant"));

        assert_eq!(config.content_path, PathBuf::from("/srv/assistant/data.json"));
        assert_eq!(config.marker_path, PathBuf::from("/srv/assistant/.initialized"));
        assert_eq!(
            config.music_dir,
            PathBuf::from("/srv/assistant/sounds/musics")
        );
        assert_eq!(config.wake_word, "bonjour");
        assert_eq!(config.player[0], "mpg123");
    }

    #[test]
    fn default_inactivity_window() {
        let config = Config::with_root(PathBuf::from("/tmp/x"));
        assert_eq!(config.inactivity_timeout, Duration::from_secs(60));
    }
}
