//! Speech recognition engines
//!
//! The assistant only needs one operation from a recognizer: feed PCM,
//! get back a finalized utterance at speech boundaries. The vosk backend
//! is feature-gated so the default build carries no native dependency.

#[cfg(feature = "vosk")]
use std::path::Path;

#[cfg(feature = "vosk")]
use crate::{Error, Result};

/// A streaming speech recognizer
pub trait Recognizer: Send {
    /// Feed one PCM chunk; returns the finalized text when the chunk
    /// completes an utterance (possibly blank for silence/noise), `None`
    /// while the utterance is still in progress.
    fn accept(&mut self, samples: &[i16]) -> Option<String>;

    /// Drop any partial recognition state
    fn reset(&mut self);
}

/// Offline recognition via libvosk
#[cfg(feature = "vosk")]
pub struct VoskRecognizer {
    rec: vosk::Recognizer,
}

#[cfg(feature = "vosk")]
impl VoskRecognizer {
    /// Load the model under `model_dir` and build a recognizer
    ///
    /// # Errors
    ///
    /// Returns error if the model directory is missing or rejected by vosk
    pub fn new(model_dir: &Path, sample_rate: u32) -> Result<Self> {
        if !model_dir.exists() {
            return Err(Error::Recognizer(format!(
                "model directory not found: {}",
                model_dir.display()
            )));
        }

        let model = vosk::Model::new(model_dir.to_string_lossy()).ok_or_else(|| {
            Error::Recognizer(format!("cannot load model: {}", model_dir.display()))
        })?;

        #[allow(clippy::cast_precision_loss)]
        let rec = vosk::Recognizer::new(&model, sample_rate as f32)
            .ok_or_else(|| Error::Recognizer("cannot create recognizer".to_string()))?;

        tracing::info!(model = %model_dir.display(), sample_rate, "vosk recognizer ready");
        Ok(Self { rec })
    }
}

#[cfg(feature = "vosk")]
impl Recognizer for VoskRecognizer {
    fn accept(&mut self, samples: &[i16]) -> Option<String> {
        match self.rec.accept_waveform(samples) {
            Ok(vosk::DecodingState::Finalized) => {
                let text = match self.rec.result() {
                    vosk::CompleteResult::Single(r) => r.text.to_string(),
                    vosk::CompleteResult::Multi(m) => m
                        .alternatives
                        .first()
                        .map(|a| a.text.to_string())
                        .unwrap_or_default(),
                };
                Some(text)
            }
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = ?e, "recognizer rejected waveform");
                None
            }
        }
    }

    fn reset(&mut self) {
        self.rec.reset();
    }
}
