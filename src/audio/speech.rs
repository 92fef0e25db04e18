//! Speech synthesis
//!
//! Synthesis blocks the session task for its duration, which is fine:
//! speech is serialized with the session's own turn-taking. Failures are
//! reported to the caller and downgraded to warnings there.

use async_trait::async_trait;
use tokio::process::Command;

use crate::{Error, Result};

/// Text-to-speech engine
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Speak `text` to completion
    ///
    /// # Errors
    ///
    /// Returns error if synthesis or playback fails; never fatal to the
    /// session.
    async fn say(&self, text: &str) -> Result<()>;
}

/// Synthesizer shelling out to `pico2wave` and `aplay`
pub struct PicoSpeaker {
    lang: String,
}

impl PicoSpeaker {
    /// Create a speaker for the given pico2wave language tag (e.g. "fr-FR")
    #[must_use]
    pub fn new(lang: impl Into<String>) -> Self {
        for binary in ["pico2wave", "aplay"] {
            if which::which(binary).is_err() {
                tracing::warn!(binary, "TTS binary not found on PATH");
            }
        }

        Self { lang: lang.into() }
    }
}

#[async_trait]
impl Synthesizer for PicoSpeaker {
    async fn say(&self, text: &str) -> Result<()> {
        let dir = tempfile::tempdir()?;
        let wav = dir.path().join("tts.wav");

        let status = Command::new("pico2wave")
            .arg(format!("-l={}", self.lang))
            .arg("-w")
            .arg(&wav)
            .arg(text)
            .status()
            .await
            .map_err(|e| Error::Tts(format!("pico2wave: {e}")))?;
        if !status.success() {
            return Err(Error::Tts(format!("pico2wave exited with {status}")));
        }

        let status = Command::new("aplay")
            .arg("-q")
            .arg(&wav)
            .status()
            .await
            .map_err(|e| Error::Tts(format!("aplay: {e}")))?;
        if !status.success() {
            return Err(Error::Tts(format!("aplay exited with {status}")));
        }

        Ok(())
    }
}
