//! Content store: canned replies, quiz bank, and score feedback
//!
//! Loaded once at startup from a JSON file and read-only thereafter. The
//! file is a single object: keyword keys map to lists of reply strings,
//! `quiz` holds the question bank, and `resultats_quiz` maps stringified
//! scores to feedback lines.

use std::collections::HashMap;
use std::path::Path;

use indexmap::IndexMap;
use rand::seq::SliceRandom;
use serde::Deserialize;

use crate::{Error, Result};

/// Minimum bank size for the quiz to run
pub const MIN_QUIZ_QUESTIONS: usize = 3;

/// Feedback spoken when the score has no explicit mapping
pub const DEFAULT_FEEDBACK: &str = "Merci d'avoir joué !";

/// One quiz entry: the question to speak and the expected answer
#[derive(Debug, Clone, Deserialize)]
pub struct QuizQuestion {
    /// Question text, spoken verbatim
    pub question: String,

    /// Expected answer; scored by case-insensitive substring match
    pub answer: String,
}

/// Raw content file schema
#[derive(Debug, Deserialize)]
struct ContentFile {
    #[serde(default)]
    quiz: Vec<QuizQuestion>,

    #[serde(default)]
    resultats_quiz: HashMap<String, String>,

    /// Every remaining key is a keyword → reply-list entry
    #[serde(flatten)]
    replies: IndexMap<String, serde_json::Value>,
}

/// Immutable store of replies, quiz questions, and score feedback
#[derive(Debug)]
pub struct ContentStore {
    /// Keyword → replies, in file order (router precedence follows it)
    replies: IndexMap<String, Vec<String>>,
    quiz: Vec<QuizQuestion>,
    feedback: HashMap<u32, String>,
    wake_word: String,
}

impl ContentStore {
    /// Load the content file and validate the wake-word invariant
    ///
    /// # Errors
    ///
    /// Returns error if the file is unreadable, is not a JSON object, or
    /// does not contain the wake word as a reply key.
    pub fn load(path: &Path, wake_word: &str) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Content(format!("cannot read {}: {e}", path.display()))
        })?;
        let file: ContentFile = serde_json::from_str(&raw)?;
        Self::from_file(file, wake_word)
    }

    /// Build a store from already-parsed JSON (test entry point)
    ///
    /// # Errors
    ///
    /// Returns error if the value is not an object or the wake key is missing.
    pub fn from_value(value: serde_json::Value, wake_word: &str) -> Result<Self> {
        let file: ContentFile = serde_json::from_value(value)?;
        Self::from_file(file, wake_word)
    }

    fn from_file(file: ContentFile, wake_word: &str) -> Result<Self> {
        let mut replies = IndexMap::new();
        for (key, value) in file.replies {
            match serde_json::from_value::<Vec<String>>(value) {
                Ok(list) if !list.is_empty() => {
                    replies.insert(key.to_lowercase(), list);
                }
                Ok(_) => {
                    tracing::warn!(key, "empty reply list, skipping");
                }
                Err(e) => {
                    tracing::warn!(key, error = %e, "reply value is not a string list, skipping");
                }
            }
        }

        if !replies.contains_key(wake_word) {
            return Err(Error::Content(format!(
                "wake word \"{wake_word}\" has no reply entry in the content file"
            )));
        }

        let mut feedback = HashMap::new();
        for (key, text) in file.resultats_quiz {
            match key.parse::<u32>() {
                Ok(score) => {
                    feedback.insert(score, text);
                }
                Err(_) => {
                    tracing::warn!(key, "non-numeric quiz feedback key, skipping");
                }
            }
        }

        if file.quiz.len() < MIN_QUIZ_QUESTIONS {
            tracing::warn!(
                questions = file.quiz.len(),
                "quiz bank below {MIN_QUIZ_QUESTIONS} entries, quiz disabled"
            );
        }

        tracing::debug!(
            keys = replies.len(),
            quiz = file.quiz.len(),
            feedback = feedback.len(),
            "content store loaded"
        );

        Ok(Self {
            replies,
            quiz: file.quiz,
            feedback,
            wake_word: wake_word.to_lowercase(),
        })
    }

    /// The configured wake word
    #[must_use]
    pub fn wake_word(&self) -> &str {
        &self.wake_word
    }

    /// Keyword keys in file order, wake word included
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.replies.keys().map(String::as_str)
    }

    /// One reply for `key`, chosen uniformly at random
    #[must_use]
    pub fn reply_for(&self, key: &str) -> Option<&str> {
        self.replies
            .get(key)
            .and_then(|list| list.choose(&mut rand::thread_rng()))
            .map(String::as_str)
    }

    /// A random greeting (reply for the wake word)
    ///
    /// The wake entry is guaranteed non-empty by the load invariant.
    #[must_use]
    pub fn greeting(&self) -> &str {
        self.reply_for(&self.wake_word).unwrap_or("Bonjour.")
    }

    /// The quiz question bank
    #[must_use]
    pub fn quiz(&self) -> &[QuizQuestion] {
        &self.quiz
    }

    /// Whether the bank is large enough for a quiz run
    #[must_use]
    pub fn quiz_available(&self) -> bool {
        self.quiz.len() >= MIN_QUIZ_QUESTIONS
    }

    /// Feedback for an exact integer score, or the default line
    #[must_use]
    pub fn feedback_for(&self, score: u32) -> &str {
        self.feedback
            .get(&score)
            .map_or(DEFAULT_FEEDBACK, String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store(value: serde_json::Value) -> ContentStore {
        ContentStore::from_value(value, "bonjour").unwrap()
    }

    #[test]
    fn load_partitions_sections() {
        let s = store(json!({
            "bonjour": ["salut", "coucou"],
            "météo": ["il pleut"],
            "quiz": [
                {"question": "q1", "answer": "a1"},
                {"question": "q2", "answer": "a2"},
                {"question": "q3", "answer": "a3"}
            ],
            "resultats_quiz": {"0": "Retente ta chance.", "3": "Parfait !"}
        }));

        assert_eq!(s.keys().count(), 2);
        assert_eq!(s.quiz().len(), 3);
        assert!(s.quiz_available());
        assert_eq!(s.feedback_for(0), "Retente ta chance.");
        assert_eq!(s.reply_for("météo"), Some("il pleut"));
    }

    #[test]
    fn missing_wake_key_is_fatal() {
        let err = ContentStore::from_value(json!({"autre": ["x"]}), "bonjour");
        assert!(matches!(err, Err(Error::Content(_))));
    }

    #[test]
    fn malformed_reply_values_are_skipped() {
        let s = store(json!({
            "bonjour": ["salut"],
            "cassé": 42,
            "vide": []
        }));

        assert_eq!(s.keys().count(), 1);
        assert_eq!(s.reply_for("cassé"), None);
        assert_eq!(s.reply_for("vide"), None);
    }

    #[test]
    fn feedback_lookup_is_exact_with_default() {
        let s = store(json!({
            "bonjour": ["salut"],
            "resultats_quiz": {"0": "zéro", "1": "un"}
        }));

        assert_eq!(s.feedback_for(0), "zéro");
        assert_eq!(s.feedback_for(1), "un");
        assert_eq!(s.feedback_for(2), DEFAULT_FEEDBACK);
        assert_eq!(s.feedback_for(3), DEFAULT_FEEDBACK);
    }

    #[test]
    fn non_numeric_feedback_keys_are_skipped() {
        let s = store(json!({
            "bonjour": ["salut"],
            "resultats_quiz": {"zero": "nope", "1": "un"}
        }));

        assert_eq!(s.feedback_for(1), "un");
        assert_eq!(s.feedback_for(0), DEFAULT_FEEDBACK);
    }

    #[test]
    fn small_quiz_bank_disables_quiz() {
        let s = store(json!({
            "bonjour": ["salut"],
            "quiz": [{"question": "q", "answer": "a"}]
        }));

        assert!(!s.quiz_available());
    }

    #[test]
    fn keys_preserve_file_order() {
        let s = store(json!({
            "bonjour": ["salut"],
            "zèbre": ["z"],
            "abeille": ["a"]
        }));

        let keys: Vec<&str> = s.keys().collect();
        assert_eq!(keys, vec!["bonjour", "zèbre", "abeille"]);
    }
}
