//! Session state: phase, consent flags, activity clock

use std::time::{Duration, Instant};

/// Coarse session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Asleep; only wake word, farewell, and shutdown are heard
    Dormant,
    /// Awake, waiting for the yes/no consent answer
    ConsentPending,
    /// Fully awake; full intent routing
    Active,
}

/// Mutable session state, owned exclusively by the session task
#[derive(Debug)]
pub struct SessionState {
    /// Current phase
    pub phase: Phase,

    /// The user's yes/no consent answer
    pub has_consent: bool,

    /// Whether the consent question was answered at all
    pub consent_answered: bool,

    /// Pause/play flag; `false` suppresses media and content intents
    /// but never system commands
    pub listening: bool,

    /// Last recognized utterance or playback-completion event
    pub last_activity: Instant,
}

impl SessionState {
    /// Fresh dormant state
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: Phase::Dormant,
            has_consent: false,
            consent_answered: false,
            listening: true,
            last_activity: Instant::now(),
        }
    }

    /// Record activity now
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Time since the last recorded activity
    #[must_use]
    pub fn idle_for(&self) -> Duration {
        self.last_activity.elapsed()
    }

    /// Full session amnesia: back to Dormant with cleared flags
    ///
    /// The on-disk init marker is not touched here; only shutdown removes it.
    pub fn reset(&mut self) {
        self.phase = Phase::Dormant;
        self.has_consent = false;
        self.consent_answered = false;
        self.listening = true;
        self.touch();
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
