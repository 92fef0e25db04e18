//! Quiz subroutine: three sampled questions, substring scoring
//!
//! Runs synchronously inside the Active phase. Farewell, shutdown, and
//! the per-turn inactivity timeout unwind through the same [`Flow`]
//! results as the parent machine.

use std::time::Instant;

use rand::seq::SliceRandom;

use super::router;
use super::{speak, start_jingle, Flow};
use crate::audio::{Heard, Synthesizer, UtteranceStream};
use crate::config::Config;
use crate::content::{ContentStore, MIN_QUIZ_QUESTIONS};
use crate::playback::PlaybackManager;
use crate::session::state::SessionState;
use crate::Result;

/// Number of questions per quiz run
const QUESTIONS_PER_RUN: usize = MIN_QUIZ_QUESTIONS;

/// Run one quiz: ask, score, speak feedback
///
/// Returns [`Flow::Continue`] after a completed run (the caller resumes
/// Active), [`Flow::Reset`] on farewell or per-turn inactivity, and
/// [`Flow::Shutdown`] on the shutdown keyword.
///
/// # Errors
///
/// Returns error only if the utterance source fails.
pub async fn run_quiz(
    source: &mut dyn UtteranceStream,
    voice: &dyn Synthesizer,
    playback: &mut PlaybackManager,
    content: &ContentStore,
    state: &SessionState,
    config: &Config,
) -> Result<Flow> {
    if !content.quiz_available() {
        speak(voice, "Désolé, il n'y a pas assez de questions dans le quiz.").await;
        return Ok(Flow::Continue);
    }

    let selected: Vec<_> = content
        .quiz()
        .choose_multiple(&mut rand::thread_rng(), QUESTIONS_PER_RUN)
        .collect();

    tracing::info!(questions = selected.len(), "quiz started");
    let mut score: u32 = 0;

    for (i, q) in selected.iter().enumerate() {
        speak(voice, &format!("Question {} : {}", i + 1, q.question)).await;

        let deadline = Instant::now() + config.inactivity_timeout;
        let answer = loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                tracing::info!("quiz turn timed out");
                return Ok(Flow::Reset);
            }

            match source.next(Some(remaining)).await? {
                Heard::Utterance(u) => break u,
                Heard::Silence => {}
                Heard::Timeout => {
                    tracing::info!("quiz turn timed out");
                    return Ok(Flow::Reset);
                }
            }
        };

        tracing::debug!(answer = %answer.text, "quiz answer");

        if router::is_farewell(&answer.text) {
            speak(voice, "À bientôt.").await;
            start_jingle(playback, &config.farewell_sound).await;
            return Ok(Flow::Reset);
        }

        if answer.text.contains(router::SHUTDOWN_WORD) {
            speak(voice, "Arrêt du programme.").await;
            return Ok(Flow::Shutdown);
        }

        if answer.text.contains(&q.answer.to_lowercase()) {
            score += 1;
            speak(voice, "Bonne réponse !").await;
        } else {
            speak(
                voice,
                &format!("Mauvaise réponse. La bonne réponse était {}.", q.answer),
            )
            .await;
        }
    }

    let feedback = content.feedback_for(score);
    let plural = if score > 1 { "s" } else { "" };
    speak(voice, &format!("Tu as obtenu {score} point{plural}. {feedback}")).await;

    if score == 0 && state.has_consent {
        start_jingle(playback, &config.failure_sound).await;
    }

    tracing::info!(score, "quiz finished");
    Ok(Flow::Continue)
}
