//! Media playback in external player subprocesses
//!
//! Two independent slots (music, ambient sound) each hold at most one live
//! player process. The session thread is the only mutator; processes are
//! fire-and-forget and polled for exit each loop tick.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use rand::seq::SliceRandom;
use tokio::process::{Child, Command};

use crate::{Error, Result};

/// A playback channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Long-running music tracks
    Music,
    /// Short ambient sounds and jingles
    Sound,
}

impl Slot {
    /// Both slots, for iteration
    pub const ALL: [Self; 2] = [Self::Music, Self::Sound];
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Music => write!(f, "music"),
            Self::Sound => write!(f, "sound"),
        }
    }
}

/// Owns the player subprocesses, one per slot
pub struct PlaybackManager {
    /// Player command; the media path is appended as the last argument
    player: Vec<String>,
    handles: HashMap<Slot, Child>,
}

impl PlaybackManager {
    /// Create a manager using the given player command (program + args)
    #[must_use]
    pub fn new(mut player: Vec<String>) -> Self {
        if player.is_empty() {
            player = vec!["mpg123".to_string()];
        }
        if which::which(&player[0]).is_err() {
            tracing::warn!(player = %player[0], "player binary not found on PATH");
        }

        Self {
            player,
            handles: HashMap::new(),
        }
    }

    /// Start playing `path` on `slot`, replacing any live process there
    ///
    /// Slots are independent: music and sound may play simultaneously.
    ///
    /// # Errors
    ///
    /// Returns error if the player process cannot be spawned. Launch
    /// failure is reported to the caller and is never fatal to the session.
    pub async fn play(&mut self, slot: Slot, path: &Path) -> Result<()> {
        self.stop(slot).await;

        let child = Command::new(&self.player[0])
            .args(&self.player[1..])
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                Error::Playback(format!("cannot launch {}: {e}", self.player[0]))
            })?;

        tracing::debug!(%slot, path = %path.display(), pid = child.id(), "playback started");
        self.handles.insert(slot, child);
        Ok(())
    }

    /// Stop the slot's process if it is still alive
    ///
    /// Idempotent: stopping an empty or already-exited slot is a no-op.
    pub async fn stop(&mut self, slot: Slot) {
        if let Some(mut child) = self.handles.remove(&slot) {
            match child.try_wait() {
                Ok(Some(_)) => {}
                _ => {
                    if let Err(e) = child.kill().await {
                        tracing::debug!(%slot, error = %e, "kill on exited process");
                    } else {
                        tracing::debug!(%slot, "playback stopped");
                    }
                }
            }
        }
    }

    /// Stop every live slot
    pub async fn stop_all(&mut self) {
        for slot in Slot::ALL {
            self.stop(slot).await;
        }
    }

    /// Whether the slot currently holds a live process
    pub fn is_slot_alive(&mut self, slot: Slot) -> bool {
        match self.handles.get_mut(&slot) {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    /// Whether any slot is live
    pub fn any_alive(&mut self) -> bool {
        Slot::ALL.iter().any(|&slot| self.is_slot_alive(slot))
    }

    /// Detect processes that exited since the last check
    ///
    /// Clears the finished handles and returns their slots. Called each
    /// loop tick so the session learns about completed playback without
    /// blocking on the child.
    pub fn reap_finished(&mut self) -> Vec<Slot> {
        let mut finished = Vec::new();
        for slot in Slot::ALL {
            if let Some(child) = self.handles.get_mut(&slot) {
                if let Ok(Some(status)) = child.try_wait() {
                    tracing::debug!(%slot, %status, "playback finished");
                    self.handles.remove(&slot);
                    finished.push(slot);
                }
            }
        }
        finished
    }
}

/// Pick a random `*.mp3` track from `dir`
///
/// The directory is enumerated fresh on every request; an empty or missing
/// directory yields `None`.
#[must_use]
pub fn pick_random_track(dir: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    let tracks: Vec<PathBuf> = entries
        .filter_map(std::result::Result::ok)
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("mp3"))
        })
        .collect();

    tracks.choose(&mut rand::thread_rng()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// Player that runs until killed: `tail -f <path>` on an existing file
    fn follow_player() -> Vec<String> {
        vec!["tail".to_string(), "-f".to_string()]
    }

    /// Player that exits immediately regardless of arguments
    fn instant_player() -> Vec<String> {
        vec!["true".to_string()]
    }

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"").unwrap();
        path
    }

    #[tokio::test]
    async fn play_replaces_within_slot() {
        let dir = tempfile::tempdir().unwrap();
        let a = touch(dir.path(), "a.mp3");
        let b = touch(dir.path(), "b.mp3");

        let mut playback = PlaybackManager::new(follow_player());
        playback.play(Slot::Music, &a).await.unwrap();
        assert!(playback.is_slot_alive(Slot::Music));

        playback.play(Slot::Music, &b).await.unwrap();
        assert!(playback.is_slot_alive(Slot::Music));
        assert_eq!(playback.handles.len(), 1);

        playback.stop_all().await;
        assert!(!playback.any_alive());
    }

    #[tokio::test]
    async fn slots_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let a = touch(dir.path(), "a.mp3");
        let b = touch(dir.path(), "b.mp3");

        let mut playback = PlaybackManager::new(follow_player());
        playback.play(Slot::Music, &a).await.unwrap();
        playback.play(Slot::Sound, &b).await.unwrap();
        assert!(playback.is_slot_alive(Slot::Music));
        assert!(playback.is_slot_alive(Slot::Sound));

        playback.stop(Slot::Music).await;
        assert!(!playback.is_slot_alive(Slot::Music));
        assert!(playback.is_slot_alive(Slot::Sound));

        playback.stop_all().await;
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let mut playback = PlaybackManager::new(follow_player());

        playback.stop(Slot::Music).await;
        playback.stop(Slot::Music).await;
        assert!(!playback.any_alive());
    }

    #[tokio::test]
    async fn reap_reports_finished_slots_once() {
        let dir = tempfile::tempdir().unwrap();
        let a = touch(dir.path(), "a.mp3");

        let mut playback = PlaybackManager::new(instant_player());
        playback.play(Slot::Sound, &a).await.unwrap();

        // Give the process a moment to exit
        let mut finished = Vec::new();
        for _ in 0..50 {
            finished = playback.reap_finished();
            if !finished.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(finished, vec![Slot::Sound]);
        assert!(playback.reap_finished().is_empty());
        assert!(!playback.is_slot_alive(Slot::Sound));
    }

    #[tokio::test]
    async fn launch_failure_is_reported_not_fatal() {
        let mut playback =
            PlaybackManager::new(vec!["definitely-not-a-player-binary".to_string()]);

        let err = playback
            .play(Slot::Music, Path::new("x.mp3"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Playback(_)));
        assert!(!playback.is_slot_alive(Slot::Music));
    }

    #[test]
    fn random_track_filters_extension() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "notes.txt");
        let track = touch(dir.path(), "song.MP3");

        assert_eq!(pick_random_track(dir.path()), Some(track));
    }

    #[test]
    fn random_track_empty_or_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(pick_random_track(dir.path()), None);
        assert_eq!(pick_random_track(Path::new("/nonexistent/dir")), None);
    }
}
