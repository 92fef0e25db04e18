//! Shared test helpers: scripted utterance source, recording synthesizer
//!
//! The fakes implement the crate's own seams so the state machine runs
//! end-to-end without audio hardware or external binaries.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use parlotte::audio::{Heard, Synthesizer, Utterance, UtteranceStream};
use parlotte::{Config, ContentStore, Error, Result};

/// One scripted capture event
pub enum Step {
    /// A finalized utterance
    Say(&'static str),
    /// Silence for the given duration (consumes poll timeouts)
    Quiet(Duration),
}

/// Utterance source that replays a fixed script, FIFO
pub struct ScriptedSource {
    steps: VecDeque<Step>,
}

impl ScriptedSource {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
        }
    }

    /// Script of plain utterances, no gaps
    pub fn of(utterances: &[&'static str]) -> Self {
        Self::new(utterances.iter().map(|&u| Step::Say(u)).collect())
    }
}

#[async_trait]
impl UtteranceStream for ScriptedSource {
    async fn next(&mut self, timeout: Option<Duration>) -> Result<Heard> {
        match self.steps.pop_front() {
            Some(Step::Say(text)) => Ok(Heard::Utterance(Utterance::new(text.to_lowercase()))),
            Some(Step::Quiet(gap)) => {
                let wait = timeout.map_or(gap, |t| t.min(gap));
                tokio::time::sleep(wait).await;
                if wait < gap {
                    // The gap outlives this poll; keep the remainder
                    self.steps.push_front(Step::Quiet(gap - wait));
                }
                Ok(Heard::Timeout)
            }
            // A test script must end the session explicitly (e.g. with
            // "armageddon"); running dry means the machine looped further
            // than the scenario intended.
            None => Err(Error::Audio("script exhausted".to_string())),
        }
    }
}

/// Synthesizer that records every spoken line
#[derive(Clone, Default)]
pub struct RecordingSpeaker {
    lines: Arc<Mutex<Vec<String>>>,
}

impl RecordingSpeaker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn spoke(&self, needle: &str) -> bool {
        self.lines().iter().any(|l| l.contains(needle))
    }

    pub fn count(&self, needle: &str) -> usize {
        self.lines().iter().filter(|l| l.contains(needle)).count()
    }
}

#[async_trait]
impl Synthesizer for RecordingSpeaker {
    async fn say(&self, text: &str) -> Result<()> {
        self.lines.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Synthesizer that always fails, for the non-fatal-TTS property
pub struct FailingSpeaker;

#[async_trait]
impl Synthesizer for FailingSpeaker {
    async fn say(&self, _text: &str) -> Result<()> {
        Err(Error::Tts("engine unavailable".to_string()))
    }
}

/// Config rooted in a temp dir, tuned for fast tests
///
/// The player exits instantly, so playback never outlives a test.
pub fn test_config(root: &Path) -> Config {
    let mut config = Config::with_root(root.to_path_buf());
    config.inactivity_timeout = Duration::from_millis(150);
    config.player = vec!["true".to_string()];
    config
}

/// Player that runs until killed: `tail -f <path>` on an existing file
pub fn follow_player() -> Vec<String> {
    vec!["tail".to_string(), "-f".to_string()]
}

/// Content store with a greeting, one keyword, and a quiz bank
pub fn test_content() -> ContentStore {
    ContentStore::from_value(
        json!({
            "bonjour": ["salut"],
            "météo": ["Il pleut."],
            "quiz": [
                {"question": "Capitale de la France ?", "answer": "Paris"},
                {"question": "Capitale de l'Italie ?", "answer": "Rome"},
                {"question": "Capitale de la Suisse ?", "answer": "Berne"}
            ],
            "resultats_quiz": {"0": "Retente ta chance.", "3": "Parfait !"}
        }),
        "bonjour",
    )
    .unwrap()
}

/// Create an empty file and return its path
pub fn touch(dir: &Path, name: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, b"").unwrap();
    path
}
