pub mod game;

use crate::protocol::{GameSnapshot, ServerMessage};
use crate::types::*;
use crate::validator::{self, WordValidator};
use game::{GameError, GameState};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Notify, RwLock};

/// Default pause between showing a verdict and moving on
pub const DEFAULT_VERDICT_DISPLAY: Duration = Duration::from_millis(1500);

/// Shared application state.
///
/// The game lives behind a single write lock, so every transition (clock
/// ticks, verdicts, player commands) is applied one at a time and the
/// matching events are broadcast in the same order.
#[derive(Clone)]
pub struct AppState {
    pub game: Arc<RwLock<GameState>>,
    pub validator: Arc<WordValidator>,
    /// Broadcast channel for sending messages to all clients
    pub broadcast: broadcast::Sender<ServerMessage>,
    /// How long a verdict stays on screen before the turn resolves
    pub verdict_display: Duration,
    /// Signalled whenever a turn (re)starts so the clock restarts its period
    pub clock_reset: Arc<Notify>,
}

/// A word that has locked the turn and is waiting for its verdict
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    pub epoch: u64,
    pub word: String,
    pub player_id: PlayerId,
    pub last_accepted_word: Option<String>,
    pub used_words: HashSet<String>,
    /// Clock reading when the word was submitted; used for scoring
    pub time_remaining: u32,
}

impl AppState {
    pub fn new(validator: WordValidator, verdict_display: Duration) -> Self {
        let (tx, _rx) = broadcast::channel(100);
        Self {
            game: Arc::new(RwLock::new(GameState::new())),
            validator: Arc::new(validator),
            broadcast: tx,
            verdict_display,
            clock_reset: Arc::new(Notify::new()),
        }
    }

    /// Send a message to every connected client
    pub fn broadcast_to_all(&self, msg: ServerMessage) {
        // Ignore send errors (no receivers connected is fine)
        let _ = self.broadcast.send(msg);
    }

    pub async fn get_game(&self) -> GameState {
        self.game.read().await.clone()
    }

    pub async fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::from(&*self.game.read().await)
    }

    /// Events after a turn boundary: either the game is over or a new turn begins
    pub(crate) fn announce_progress(&self, game: &GameState) {
        self.broadcast_to_all(ServerMessage::Scores {
            players: game.players.to_vec(),
        });
        if game.status == GameStatus::Finished {
            self.broadcast_to_all(ServerMessage::Status {
                status: game.status,
                game_id: game.game_id.clone(),
            });
            self.broadcast_to_all(ServerMessage::GameOver {
                summary: game.summary(),
            });
        } else {
            self.clock_reset.notify_one();
            self.broadcast_to_all(ServerMessage::turn(game));
        }
    }

    fn announce_status(&self, game: &GameState) {
        self.broadcast_to_all(ServerMessage::Status {
            status: game.status,
            game_id: game.game_id.clone(),
        });
    }

    // ========== Setup ==========

    /// Apply a setup change and broadcast the new state
    pub async fn update_settings<F>(&self, change: F) -> Result<GameSnapshot, GameError>
    where
        F: FnOnce(&mut GameState) -> Result<(), GameError>,
    {
        let mut game = self.game.write().await;
        change(&mut *game)?;
        let snapshot = GameSnapshot::from(&*game);
        self.broadcast_to_all(ServerMessage::State {
            game: snapshot.clone(),
        });
        Ok(snapshot)
    }

    // ========== Lifecycle ==========

    pub async fn start_game(&self) -> Result<(), GameError> {
        let mut game = self.game.write().await;
        game.start()?;
        self.announce_status(&game);
        self.announce_progress(&game);
        Ok(())
    }

    pub async fn restart_game(&self) {
        let mut game = self.game.write().await;
        game.restart();
        self.announce_status(&game);
        self.announce_progress(&game);
    }

    pub async fn new_game(&self) {
        let mut game = self.game.write().await;
        game.new_game();
        self.announce_status(&game);
        self.broadcast_to_all(ServerMessage::State {
            game: GameSnapshot::from(&*game),
        });
    }

    pub async fn pause_game(&self) -> Result<(), GameError> {
        let mut game = self.game.write().await;
        game.pause()?;
        tracing::info!("Game paused");
        self.announce_status(&game);
        Ok(())
    }

    /// Resume play. A verdict that was on display when the game was paused
    /// gets its turn resolution rescheduled.
    pub async fn resume_game(&self) -> Result<(), GameError> {
        let mut game = self.game.write().await;
        game.resume()?;
        tracing::info!("Game resumed");
        self.announce_status(&game);
        self.clock_reset.notify_one();

        if game.turn_phase == game::TurnPhase::ShowingVerdict {
            let epoch = game.epoch;
            drop(game);
            self.schedule_conclusion(epoch).await;
        }
        Ok(())
    }

    // ========== Turn ==========

    pub async fn set_current_word(&self, text: &str) -> Result<(), GameError> {
        let mut game = self.game.write().await;
        game.set_current_word(text)?;
        self.broadcast_to_all(ServerMessage::CurrentWord {
            word: game.current_word.clone(),
        });
        Ok(())
    }

    pub async fn clear_validation(&self) {
        self.game.write().await.clear_validation();
        self.broadcast_to_all(ServerMessage::ValidationCleared);
    }

    /// Local-only feedback for a word the player is about to say
    pub async fn check_word(&self, word: &str) -> ServerMessage {
        let word = validator::first_token(word);
        let game = self.game.read().await;
        let result = validator::precheck(
            word,
            game.last_accepted_word.as_deref(),
            &game.used_words,
        );

        match result {
            Ok(()) => ServerMessage::Precheck {
                word: word.to_string(),
                ok: true,
                reason: None,
                message: None,
            },
            Err(reason) => ServerMessage::Precheck {
                word: word.to_string(),
                ok: false,
                message: Some(reason.message()),
                reason: Some(reason),
            },
        }
    }

    /// Lock the turn for the first token of `word` and capture everything
    /// the lookup needs. Fails with [`GameError::SubmissionPending`] if a word
    /// is already in flight for this turn.
    pub async fn begin_submission(&self, word: &str) -> Result<PendingSubmission, GameError> {
        let word = validator::first_token(word);
        if word.chars().count() > MAX_WORD_CHARS {
            return Err(GameError::WordTooLong {
                max: MAX_WORD_CHARS,
            });
        }

        let mut game = self.game.write().await;
        let epoch = game.begin_submission()?;

        let pending = PendingSubmission {
            epoch,
            word: word.to_string(),
            player_id: game.current_player().id.clone(),
            last_accepted_word: game.last_accepted_word.clone(),
            used_words: game.used_words.clone(),
            time_remaining: game.time_remaining,
        };

        tracing::info!(
            player = %pending.player_id,
            word = %pending.word,
            time_remaining = pending.time_remaining,
            "Word submitted"
        );
        self.broadcast_to_all(ServerMessage::Checking {
            player_id: pending.player_id.clone(),
            word: pending.word.clone(),
        });
        Ok(pending)
    }

    /// Validate a pending word, record the verdict and schedule the turn
    /// resolution. A verdict for a turn that has since ended (pause, timeout,
    /// restart) is dropped.
    pub async fn complete_submission(
        &self,
        pending: PendingSubmission,
    ) -> Result<WordEntry, GameError> {
        let verdict = self
            .validator
            .validate(
                &pending.word,
                pending.last_accepted_word.as_deref(),
                &pending.used_words,
            )
            .await;

        let entry = {
            let mut game = self.game.write().await;
            let entry = match game.submit_result(
                pending.epoch,
                &pending.word,
                &verdict,
                pending.time_remaining,
            ) {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::info!("Dropping verdict for {:?}: {}", pending.word, e);
                    return Err(e);
                }
            };

            self.broadcast_to_all(ServerMessage::Verdict {
                entry: entry.clone(),
                message: verdict.message.clone(),
            });
            self.broadcast_to_all(ServerMessage::Scores {
                players: game.players.to_vec(),
            });
            entry
        };

        self.schedule_conclusion(pending.epoch).await;
        Ok(entry)
    }

    /// Resolve the turn once the verdict has been on display long enough.
    /// With no display delay the turn resolves before this returns.
    pub async fn schedule_conclusion(&self, epoch: u64) {
        if self.verdict_display.is_zero() {
            let _ = self.conclude_turn(epoch).await;
            return;
        }

        let state = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(state.verdict_display).await;
            let _ = state.conclude_turn(epoch).await;
        });
    }

    pub async fn conclude_turn(&self, epoch: u64) -> Result<(), GameError> {
        let mut game = self.game.write().await;
        if let Err(e) = game.conclude_turn(epoch) {
            tracing::debug!("Turn conclusion skipped: {}", e);
            return Err(e);
        }
        self.announce_progress(&game);
        Ok(())
    }
}
