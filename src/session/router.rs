//! Intent routing: utterance text → first matching intent
//!
//! A pure function over the text, the content store, and the session
//! flags. Precedence is fixed: system commands first, then the paused
//! and music-priority gates, then media/quiz triggers, then keyword
//! replies in store order.

use crate::content::ContentStore;
use crate::session::state::{Phase, SessionState};

/// Unconditional process-termination keyword
pub const SHUTDOWN_WORD: &str = "armageddon";

/// Farewell phrasings (recognizers emit both spellings)
pub const FAREWELL_WORDS: [&str; 2] = ["au revoir", "aurevoir"];

const PAUSE_WORD: &str = "pause";
const RESUME_WORD: &str = "play";
const SILENCE_WORD: &str = "chut";
const MUSIC_WORDS: [&str; 2] = ["chanson", "musique"];
const SOUND_WORD: &str = "son";
const QUIZ_WORDS: [&str; 2] = ["questions réponses", "quiz"];

/// What an utterance asks the session to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent<'a> {
    /// Terminate the process
    Shutdown,
    /// Leave the session (reset or exit, depending on phase)
    Farewell,
    /// Stop reacting to media/content intents
    Pause,
    /// Resume after a pause
    Resume,
    /// Kill all playback
    Silence,
    /// Start a random music track
    PlayMusic,
    /// Start a random ambient sound
    PlaySound,
    /// Run the quiz
    Quiz,
    /// Speak a canned reply for a matched content key
    Reply(&'a str),
    /// Nothing matched; no side effect
    None,
}

/// Route one utterance, first match wins
#[must_use]
pub fn route<'a>(
    text: &str,
    content: &'a ContentStore,
    state: &SessionState,
    music_playing: bool,
) -> Intent<'a> {
    if text.contains(SHUTDOWN_WORD) {
        return Intent::Shutdown;
    }

    if is_farewell(text) {
        return Intent::Farewell;
    }

    // Context-sensitive commands, valid only once consent was answered
    if state.phase == Phase::Active && state.consent_answered {
        if text.contains(PAUSE_WORD) {
            return Intent::Pause;
        }
        if text.contains(RESUME_WORD) && !state.listening {
            return Intent::Resume;
        }
        if text.contains(SILENCE_WORD) {
            return Intent::Silence;
        }
    }

    // Paused: media and content intents are suppressed
    if !state.listening {
        return Intent::None;
    }

    // A live music track has playback priority over everything below
    if music_playing {
        return Intent::None;
    }

    if MUSIC_WORDS.iter().any(|w| text.contains(w)) {
        return Intent::PlayMusic;
    }
    if text.contains(SOUND_WORD) {
        return Intent::PlaySound;
    }

    if QUIZ_WORDS.iter().any(|w| text.contains(w)) {
        return Intent::Quiz;
    }

    // Keyword replies: literal substring, or an adjacent two-word bigram
    // equal to a key. The wake word is handled structurally, never here.
    let words: Vec<&str> = text.split_whitespace().collect();
    let bigrams: Vec<String> = words.windows(2).map(|w| w.join(" ")).collect();

    for key in content.keys() {
        if key == content.wake_word() {
            continue;
        }
        if text.contains(key) || bigrams.iter().any(|b| b == key) {
            return Intent::Reply(key);
        }
    }

    Intent::None
}

/// Whether the text contains any farewell phrasing
#[must_use]
pub fn is_farewell(text: &str) -> bool {
    FAREWELL_WORDS.iter().any(|w| text.contains(w))
}
