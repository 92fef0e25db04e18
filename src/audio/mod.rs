//! Audio I/O: microphone capture, speech recognition, speech synthesis
//!
//! Capture runs on the cpal driver thread and feeds a chunk queue; the
//! recognizer and synthesizer are external engines wrapped behind traits.

mod capture;
mod recognizer;
mod source;
mod speech;

pub use capture::{AudioCapture, CHUNK_SIZE, SAMPLE_RATE};
pub use recognizer::Recognizer;
#[cfg(feature = "vosk")]
pub use recognizer::VoskRecognizer;
pub use source::{Heard, MicSource, Utterance, UtteranceStream};
pub use speech::{PicoSpeaker, Synthesizer};
