//! The dialogue session state machine
//!
//! Turns the utterance stream into state transitions: Dormant →
//! ConsentPending → Active, with the Quiz sub-flow and the cross-cutting
//! Reset/Shutdown signals layered across all phases. The session task is
//! the sole mutator of session state and of the playback slots.

pub mod quiz;
pub mod router;
pub mod state;

pub use router::{route, Intent};
pub use state::{Phase, SessionState};

use std::path::Path;

use crate::audio::{Heard, Synthesizer, UtteranceStream};
use crate::config::Config;
use crate::content::ContentStore;
use crate::playback::{pick_random_track, PlaybackManager, Slot};
use crate::Result;

/// Upper bound on one poll, so reaping and the idle check run regularly
const POLL_INTERVAL: std::time::Duration = std::time::Duration::from_millis(500);

/// Non-local control transfer, returned up the call stack
///
/// Reset must unwind through the quiz and the Active loop in one step; a
/// typed result keeps that path explicit and testable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Proceed normally
    Continue,
    /// Stop playback, clear consent, return to Dormant
    Reset,
    /// Terminate the process after cleanup
    Shutdown,
}

/// Outcome of the Dormant wake loop
enum WakeOutcome {
    /// Wake word heard; proceed to the consent question
    Woken,
    /// Farewell heard; end the listen loop without Reset
    Farewell,
    /// Shutdown heard
    Shutdown,
}

/// One voice session: wake loop, consent question, active intent loop
pub struct Session {
    config: Config,
    content: ContentStore,
    state: SessionState,
    playback: PlaybackManager,
    source: Box<dyn UtteranceStream>,
    voice: Box<dyn Synthesizer>,
}

impl Session {
    /// Assemble a session over its collaborators
    #[must_use]
    pub fn new(
        config: Config,
        content: ContentStore,
        source: Box<dyn UtteranceStream>,
        voice: Box<dyn Synthesizer>,
    ) -> Self {
        let playback = PlaybackManager::new(config.player.clone());

        Self {
            config,
            content,
            state: SessionState::new(),
            playback,
            source,
            voice,
        }
    }

    /// Current session state (for inspection)
    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The playback slots (for inspection)
    pub fn playback_mut(&mut self) -> &mut PlaybackManager {
        &mut self.playback
    }

    /// Run the session until shutdown, a dormant farewell, or an interrupt
    ///
    /// # Errors
    ///
    /// Returns error only on an unrecoverable utterance-source failure.
    pub async fn run(&mut self) -> Result<()> {
        self.announce_first_run().await?;
        tracing::info!(wake_word = %self.config.wake_word, "assistant ready");

        let outcome = tokio::select! {
            res = self.drive() => Some(res),
            _ = tokio::signal::ctrl_c() => None,
        };

        match outcome {
            Some(res) => res,
            None => {
                tracing::info!("interrupt received");
                self.playback.stop_all().await;
                start_jingle(&mut self.playback, &self.config.farewell_sound).await;
                remove_marker(&self.config.marker_path);
                Ok(())
            }
        }
    }

    /// Outer loop: listen sessions separated by Reset recoveries
    async fn drive(&mut self) -> Result<()> {
        loop {
            match self.listen_session().await? {
                Flow::Reset => {
                    tracing::info!("session reset");
                    self.playback.stop_all().await;
                    self.state.reset();
                }
                Flow::Shutdown => {
                    self.playback.stop_all().await;
                    remove_marker(&self.config.marker_path);
                    tracing::info!("shutdown");
                    return Ok(());
                }
                Flow::Continue => {
                    tracing::info!("listen loop ended");
                    return Ok(());
                }
            }
        }
    }

    /// One pass through the machine: Dormant → ConsentPending → Active
    async fn listen_session(&mut self) -> Result<Flow> {
        match self.wake_loop().await? {
            WakeOutcome::Woken => {}
            WakeOutcome::Farewell => return Ok(Flow::Continue),
            WakeOutcome::Shutdown => return Ok(Flow::Shutdown),
        }

        match self.consent_loop().await? {
            Flow::Continue => {}
            other => return Ok(other),
        }

        self.state.phase = Phase::Active;
        self.state.touch();
        tracing::info!(has_consent = self.state.has_consent, "session active");

        self.active_loop().await
    }

    /// Speak the one-time initialization announcement
    async fn announce_first_run(&mut self) -> Result<()> {
        if self.config.marker_path.exists() {
            return Ok(());
        }

        self.speak("Assistant initialisé avec succès.").await;
        std::fs::write(&self.config.marker_path, b"")?;
        tracing::debug!(path = %self.config.marker_path.display(), "init marker created");
        Ok(())
    }

    /// Dormant: only shutdown, farewell, and the wake word are heard
    async fn wake_loop(&mut self) -> Result<WakeOutcome> {
        loop {
            let Heard::Utterance(utterance) = self.source.next(None).await? else {
                continue;
            };
            let text = utterance.text.as_str();
            tracing::debug!(%text, "dormant");

            if text.contains(router::SHUTDOWN_WORD) {
                self.speak("Arrêt du programme.").await;
                return Ok(WakeOutcome::Shutdown);
            }

            if router::is_farewell(text) {
                self.speak("À bientôt.").await;
                start_jingle(&mut self.playback, &self.config.farewell_sound).await;
                return Ok(WakeOutcome::Farewell);
            }

            if text.contains(&self.config.wake_word) {
                self.state.phase = Phase::ConsentPending;
                self.state.touch();
                let greeting = self.content.greeting();
                speak(self.voice.as_ref(), greeting).await;
                return Ok(WakeOutcome::Woken);
            }
        }
    }

    /// ConsentPending: prompt until a yes/no answer arrives
    async fn consent_loop(&mut self) -> Result<Flow> {
        loop {
            self.speak("As-tu ton baccalauréat ? Réponds par oui ou non.")
                .await;

            let utterance = loop {
                match self.source.next(None).await? {
                    Heard::Utterance(u) => break u,
                    Heard::Silence | Heard::Timeout => {}
                }
            };
            let text = utterance.text.as_str();
            tracing::debug!(%text, "consent answer");

            if text.contains("oui") {
                self.state.has_consent = true;
                self.state.consent_answered = true;
                self.speak("Très bien, commençons.").await;
                return Ok(Flow::Continue);
            }

            if text.contains("non") {
                self.state.has_consent = false;
                self.state.consent_answered = true;
                self.speak("Pas de souci, tu peux quand même jouer.").await;
                return Ok(Flow::Continue);
            }

            if text.contains(router::SHUTDOWN_WORD) {
                self.speak("Arrêt du programme.").await;
                return Ok(Flow::Shutdown);
            }

            if router::is_farewell(text) {
                self.speak("À bientôt.").await;
                start_jingle(&mut self.playback, &self.config.farewell_sound).await;
                return Ok(Flow::Reset);
            }

            self.speak("Je n'ai pas compris.").await;
        }
    }

    /// Active: full intent routing with inactivity supervision
    async fn active_loop(&mut self) -> Result<Flow> {
        loop {
            // Completed playback counts as activity
            if !self.playback.reap_finished().is_empty() {
                self.state.touch();
            }

            let remaining = self
                .config
                .inactivity_timeout
                .saturating_sub(self.state.idle_for());
            if remaining.is_zero() {
                if !self.playback.any_alive() {
                    tracing::info!("inactivity timeout");
                    return Ok(Flow::Reset);
                }
                // Audio still playing; keep polling
            }

            let wait = if remaining.is_zero() {
                POLL_INTERVAL
            } else {
                remaining.min(POLL_INTERVAL)
            };

            let utterance = match self.source.next(Some(wait)).await? {
                Heard::Utterance(u) => u,
                Heard::Silence | Heard::Timeout => continue,
            };
            let text = utterance.text.as_str();
            tracing::debug!(%text, "active");
            self.state.touch();

            let music_playing = self.playback.is_slot_alive(Slot::Music);
            match router::route(text, &self.content, &self.state, music_playing) {
                Intent::Shutdown => {
                    speak(self.voice.as_ref(), "Arrêt du programme.").await;
                    return Ok(Flow::Shutdown);
                }
                Intent::Farewell => {
                    start_jingle(&mut self.playback, &self.config.farewell_sound).await;
                    speak(self.voice.as_ref(), "À bientôt.").await;
                    return Ok(Flow::Reset);
                }
                Intent::Pause => {
                    self.state.listening = false;
                    speak(self.voice.as_ref(), "Mise en pause.").await;
                }
                Intent::Resume => {
                    self.state.listening = true;
                    speak(self.voice.as_ref(), "Reprise.").await;
                }
                Intent::Silence => {
                    self.playback.stop_all().await;
                }
                Intent::PlayMusic => {
                    match pick_random_track(&self.config.music_dir) {
                        Some(track) => {
                            if let Err(e) = self.playback.play(Slot::Music, &track).await {
                                tracing::warn!(error = %e, "music launch failed");
                            }
                        }
                        None => speak(self.voice.as_ref(), "Aucune musique trouvée.").await,
                    }
                }
                Intent::PlaySound => {
                    match pick_random_track(&self.config.sound_dir) {
                        Some(track) => {
                            if let Err(e) = self.playback.play(Slot::Sound, &track).await {
                                tracing::warn!(error = %e, "sound launch failed");
                            }
                        }
                        None => speak(self.voice.as_ref(), "Aucun son trouvé.").await,
                    }
                }
                Intent::Quiz => {
                    let flow = quiz::run_quiz(
                        self.source.as_mut(),
                        self.voice.as_ref(),
                        &mut self.playback,
                        &self.content,
                        &self.state,
                        &self.config,
                    )
                    .await?;
                    match flow {
                        Flow::Continue => self.state.touch(),
                        other => return Ok(other),
                    }
                }
                Intent::Reply(key) => {
                    if let Some(reply) = self.content.reply_for(key) {
                        speak(self.voice.as_ref(), reply).await;
                    }
                }
                Intent::None => {}
            }
        }
    }

    async fn speak(&self, text: &str) {
        speak(self.voice.as_ref(), text).await;
    }
}

/// Log and speak one line; synthesis failure is downgraded to a warning
pub(crate) async fn speak(voice: &dyn Synthesizer, text: &str) {
    tracing::info!(tts = %text);
    if let Err(e) = voice.say(text).await {
        tracing::warn!(error = %e, "speech synthesis failed");
    }
}

/// Start a jingle on the sound slot; launch failure is only a warning
pub(crate) async fn start_jingle(playback: &mut PlaybackManager, path: &Path) {
    if let Err(e) = playback.play(Slot::Sound, path).await {
        tracing::warn!(error = %e, path = %path.display(), "cannot start jingle");
    }
}

/// Remove the init marker; shutdown-only, never part of Reset
fn remove_marker(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "init marker removed"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(error = %e, "cannot remove init marker"),
    }
}
