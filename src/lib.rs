//! parlotte - voice-driven conversational assistant
//!
//! This library provides the core of the assistant:
//! - Audio capture and speech recognition/synthesis seams
//! - Media playback in external player subprocesses
//! - The dialogue session state machine (wake word, consent question,
//!   intent routing, quiz, inactivity reset)
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────┐
//! │  Microphone (cpal callback)  →  PCM chunk queue   │
//! └───────────────────────┬───────────────────────────┘
//!                         │
//! ┌───────────────────────▼───────────────────────────┐
//! │  Utterance Source (recognizer → finalized text)   │
//! └───────────────────────┬───────────────────────────┘
//!                         │
//! ┌───────────────────────▼───────────────────────────┐
//! │  Session State Machine                            │
//! │  Dormant │ ConsentPending │ Active │ Quiz         │
//! └──────┬────────────────────────────────┬───────────┘
//!        │                                │
//! ┌──────▼──────────┐            ┌────────▼──────────┐
//! │  Synthesizer    │            │  Playback slots   │
//! │  (pico2wave)    │            │  (player procs)   │
//! └─────────────────┘            └───────────────────┘
//! ```

pub mod audio;
pub mod config;
pub mod content;
pub mod error;
pub mod playback;
pub mod session;

pub use audio::{
    AudioCapture, Heard, MicSource, PicoSpeaker, Recognizer, Synthesizer, Utterance,
    UtteranceStream,
};
pub use config::Config;
pub use content::{ContentStore, QuizQuestion};
pub use error::{Error, Result};
pub use playback::{pick_random_track, PlaybackManager, Slot};
pub use session::{Flow, Intent, Phase, Session, SessionState};
