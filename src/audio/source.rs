//! Utterance source: capture queue + recognizer → finalized utterances

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::Recognizer;
use crate::{Error, Result};

/// One finalized, non-empty, lowercased recognizer result
#[derive(Debug, Clone)]
pub struct Utterance {
    /// Lowercased utterance text
    pub text: String,

    /// Capture-side completion time
    pub at: Instant,
}

impl Utterance {
    /// Wrap finalized text, stamping the current instant
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            at: Instant::now(),
        }
    }
}

/// Outcome of one `next()` poll
///
/// A blank finalized result and an elapsed timeout are distinct: the first
/// means the recognizer closed an utterance on silence/noise (re-poll, not
/// a turn), the second feeds the caller's inactivity supervision.
#[derive(Debug)]
pub enum Heard {
    /// A finalized non-empty utterance
    Utterance(Utterance),

    /// Recognizer finalized blank text; poll again
    Silence,

    /// The timeout elapsed without a finalized utterance
    Timeout,
}

/// Blocking/pollable source of utterances, FIFO by capture time
///
/// No utterance is ever delivered twice.
#[async_trait]
pub trait UtteranceStream: Send {
    /// Wait for the next finalized recognizer result
    ///
    /// With a timeout, returns [`Heard::Timeout`] once the duration elapses
    /// without a completed utterance; without one, waits indefinitely.
    ///
    /// # Errors
    ///
    /// Returns error if the underlying capture stream is gone.
    async fn next(&mut self, timeout: Option<Duration>) -> Result<Heard>;
}

/// Microphone-backed utterance source
pub struct MicSource {
    chunks: mpsc::UnboundedReceiver<Vec<i16>>,
    recognizer: Box<dyn Recognizer>,
}

impl MicSource {
    /// Build a source over a capture queue and a recognizer engine
    #[must_use]
    pub fn new(chunks: mpsc::UnboundedReceiver<Vec<i16>>, recognizer: Box<dyn Recognizer>) -> Self {
        Self { chunks, recognizer }
    }
}

#[async_trait]
impl UtteranceStream for MicSource {
    async fn next(&mut self, timeout: Option<Duration>) -> Result<Heard> {
        let deadline = timeout.map(|t| tokio::time::Instant::now() + t);

        loop {
            let chunk = match deadline {
                Some(deadline) => {
                    match tokio::time::timeout_at(deadline, self.chunks.recv()).await {
                        Ok(Some(chunk)) => chunk,
                        Ok(None) => {
                            return Err(Error::Audio("capture stream closed".to_string()));
                        }
                        Err(_) => return Ok(Heard::Timeout),
                    }
                }
                None => self
                    .chunks
                    .recv()
                    .await
                    .ok_or_else(|| Error::Audio("capture stream closed".to_string()))?,
            };

            if let Some(text) = self.recognizer.accept(&chunk) {
                let text = text.trim().to_lowercase();
                if text.is_empty() {
                    return Ok(Heard::Silence);
                }
                tracing::debug!(%text, "utterance");
                return Ok(Heard::Utterance(Utterance::new(text)));
            }
        }
    }
}
