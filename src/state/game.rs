//! The word-chain game state machine.
//!
//! `GameState` owns every piece of mutable game data and changes only through
//! the transition methods below. Each transition either applies completely or
//! returns a [`GameError`] and leaves the state untouched.

use serde::Serialize;
use std::collections::HashSet;

use crate::scoring;
use crate::types::*;
use crate::validator;

/// Errors for transitions that are not allowed in the current state
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GameError {
    #[error("Cannot {action} while the game is {status:?}")]
    InvalidTransition {
        action: &'static str,
        status: GameStatus,
    },

    #[error("A word is already being checked")]
    SubmissionPending,

    #[error("No verdict is waiting to be resolved")]
    NoVerdictPending,

    #[error("Result belongs to an earlier turn (epoch {got}, current {current})")]
    StaleEpoch { got: u64, current: u64 },

    #[error("{action} is not available in {mode} mode")]
    WrongMode {
        action: &'static str,
        mode: &'static str,
    },

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    #[error("Word is longer than {max} characters")]
    WordTooLong { max: usize },
}

impl GameError {
    /// Stable code sent to clients
    pub fn code(&self) -> &'static str {
        match self {
            GameError::InvalidTransition { .. } => "INVALID_TRANSITION",
            GameError::SubmissionPending => "SUBMISSION_PENDING",
            GameError::NoVerdictPending => "NO_VERDICT_PENDING",
            GameError::StaleEpoch { .. } => "STALE_EPOCH",
            GameError::WrongMode { .. } => "WRONG_MODE",
            GameError::InvalidSetting(_) => "INVALID_SETTING",
            GameError::WordTooLong { .. } => "WORD_TOO_LONG",
        }
    }
}

/// Where the active player is within their turn
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    /// Waiting for a word; the clock is running
    Listening,
    /// A word is being checked against the dictionaries
    Validating,
    /// The verdict is on display; the turn resolves next
    ShowingVerdict,
}

#[derive(Debug, Clone, Serialize)]
pub struct GameState {
    pub game_id: Option<GameId>,
    /// Bumped on every turn boundary, pause, start and restart. Async results
    /// tagged with an older epoch are dropped.
    pub epoch: u64,
    pub status: GameStatus,
    pub players: [Player; 2],
    pub current_turn: usize,
    pub turn_in_round: usize,
    pub current_round: u32,
    pub settings: GameSettings,
    pub time_remaining: u32,
    pub last_accepted_word: Option<String>,
    pub current_word: String,
    pub validation_result: Option<ValidationDisplay>,
    pub word_history: Vec<WordEntry>,
    pub used_words: HashSet<String>,
    pub winner: Option<Winner>,
    pub turn_phase: TurnPhase,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

/// Higher cumulative score wins; equal scores tie
pub fn determine_winner(players: &[Player; 2]) -> Winner {
    let [p1, p2] = players;
    if p1.score > p2.score {
        Winner::Player(p1.id.clone())
    } else if p2.score > p1.score {
        Winner::Player(p2.id.clone())
    } else {
        Winner::Tie
    }
}

impl GameState {
    pub fn new() -> Self {
        let settings = GameSettings::default();
        Self {
            game_id: None,
            epoch: 0,
            status: GameStatus::Setup,
            players: [
                Player::new("player1", "Player 1"),
                Player::new("player2", "Player 2"),
            ],
            current_turn: 0,
            turn_in_round: 0,
            current_round: 1,
            time_remaining: settings.timer_duration,
            settings,
            last_accepted_word: None,
            current_word: String::new(),
            validation_result: None,
            word_history: Vec::new(),
            used_words: HashSet::new(),
            winner: None,
            turn_phase: TurnPhase::Listening,
        }
    }

    // ========== Guards ==========

    fn require_status(
        &self,
        action: &'static str,
        allowed: &[GameStatus],
    ) -> Result<(), GameError> {
        if allowed.contains(&self.status) {
            Ok(())
        } else {
            Err(GameError::InvalidTransition {
                action,
                status: self.status,
            })
        }
    }

    fn require_configurable(&self, action: &'static str) -> Result<(), GameError> {
        self.require_status(action, &[GameStatus::Setup, GameStatus::Finished])
    }

    fn require_epoch(&self, epoch: u64) -> Result<(), GameError> {
        if epoch == self.epoch {
            Ok(())
        } else {
            Err(GameError::StaleEpoch {
                got: epoch,
                current: self.epoch,
            })
        }
    }

    fn mode(&self) -> &'static str {
        if self.is_unlimited() {
            "unlimited"
        } else {
            "round"
        }
    }

    // ========== Setup ==========

    pub fn set_player_name(&mut self, index: usize, name: &str) -> Result<(), GameError> {
        self.require_configurable("rename players")?;

        let name = name.trim();
        if index > 1 {
            return Err(GameError::InvalidSetting(format!(
                "Player index must be 0 or 1, got {}",
                index
            )));
        }
        if name.is_empty() {
            return Err(GameError::InvalidSetting(
                "Player name cannot be empty".to_string(),
            ));
        }
        if name.chars().count() > MAX_NAME_CHARS {
            return Err(GameError::InvalidSetting(format!(
                "Player name too long (max {} characters)",
                MAX_NAME_CHARS
            )));
        }

        self.players[index].name = name.to_string();
        Ok(())
    }

    pub fn set_timer_duration(&mut self, seconds: u32) -> Result<(), GameError> {
        self.require_configurable("change the timer")?;
        if !TIMER_OPTIONS.contains(&seconds) {
            return Err(GameError::InvalidSetting(format!(
                "Timer must be one of {:?} seconds, got {}",
                TIMER_OPTIONS, seconds
            )));
        }

        self.settings.timer_duration = seconds;
        self.time_remaining = seconds;
        Ok(())
    }

    pub fn set_total_rounds(&mut self, rounds: u32) -> Result<(), GameError> {
        self.require_configurable("change the round count")?;
        if !ROUND_OPTIONS.contains(&rounds) {
            return Err(GameError::InvalidSetting(format!(
                "Rounds must be one of {:?}, got {}",
                ROUND_OPTIONS, rounds
            )));
        }

        self.settings.total_rounds = rounds;
        Ok(())
    }

    pub fn set_auto_listen(&mut self, enabled: bool) -> Result<(), GameError> {
        self.require_configurable("change auto-listen")?;
        self.settings.auto_listen = enabled;
        Ok(())
    }

    pub fn set_invalid_word_policy(&mut self, policy: InvalidWordPolicy) -> Result<(), GameError> {
        self.require_configurable("change the invalid word policy")?;
        self.settings.invalid_word_policy = policy;
        Ok(())
    }

    // ========== Lifecycle ==========

    /// Zero scores, history, used words and counters. Names and settings stay.
    fn reset_progress(&mut self) {
        for player in &mut self.players {
            player.score = 0;
        }
        self.current_turn = 0;
        self.turn_in_round = 0;
        self.current_round = 1;
        self.time_remaining = self.settings.timer_duration;
        self.used_words.clear();
        self.word_history.clear();
        self.winner = None;
        self.last_accepted_word = None;
        self.current_word.clear();
        self.validation_result = None;
        self.turn_phase = TurnPhase::Listening;
        self.epoch += 1;
    }

    pub fn start(&mut self) -> Result<(), GameError> {
        self.require_configurable("start the game")?;
        self.reset_progress();
        self.game_id = Some(ulid::Ulid::new().to_string());
        self.status = GameStatus::Playing;
        tracing::info!(game_id = ?self.game_id, "Game started");
        Ok(())
    }

    /// Start over with the same players and settings, from any status
    pub fn restart(&mut self) {
        self.reset_progress();
        self.game_id = Some(ulid::Ulid::new().to_string());
        self.status = GameStatus::Playing;
        tracing::info!(game_id = ?self.game_id, "Game restarted");
    }

    /// Back to setup with the same players and settings, from any status
    pub fn new_game(&mut self) {
        self.reset_progress();
        self.game_id = None;
        self.status = GameStatus::Setup;
        tracing::info!("Returned to setup");
    }

    /// Pausing drops any in-flight dictionary lookup; a verdict already on
    /// display stays pending until the game resumes.
    pub fn pause(&mut self) -> Result<(), GameError> {
        self.require_status("pause", &[GameStatus::Playing])?;
        self.status = GameStatus::Paused;
        if self.turn_phase == TurnPhase::Validating {
            self.turn_phase = TurnPhase::Listening;
        }
        self.epoch += 1;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), GameError> {
        self.require_status("resume", &[GameStatus::Paused])?;
        self.status = GameStatus::Playing;
        Ok(())
    }

    // ========== Clock ==========

    /// One second off the clock, floored at zero. Returns the time left.
    pub fn tick(&mut self) -> Result<u32, GameError> {
        self.require_status("tick the timer", &[GameStatus::Playing])?;
        self.time_remaining = self.time_remaining.saturating_sub(1);
        Ok(self.time_remaining)
    }

    /// The active player ran out of time.
    ///
    /// Sudden death: the other player wins. Round mode: no points change and
    /// the turn passes on.
    pub fn timer_expired(&mut self) -> Result<(), GameError> {
        self.require_status("expire the timer", &[GameStatus::Playing])?;
        tracing::info!(
            player = %self.current_player().id,
            round = self.current_round,
            "Turn timed out"
        );

        if self.is_unlimited() {
            self.finish(Winner::Player(self.other_player().id.clone()));
        } else {
            self.rotate_turn();
        }
        Ok(())
    }

    // ========== Turn ==========

    /// Live partial transcript; only the first spoken token is kept
    pub fn set_current_word(&mut self, text: &str) -> Result<(), GameError> {
        self.require_status("update the current word", &[GameStatus::Playing])?;
        let word = validator::first_token(text);
        if word.chars().count() > MAX_WORD_CHARS {
            return Err(GameError::WordTooLong {
                max: MAX_WORD_CHARS,
            });
        }
        self.current_word = word.to_string();
        Ok(())
    }

    pub fn clear_validation(&mut self) {
        self.validation_result = None;
    }

    /// Lock the turn for a dictionary lookup. Returns the epoch the eventual
    /// result must be tagged with.
    pub fn begin_submission(&mut self) -> Result<u64, GameError> {
        self.require_status("submit a word", &[GameStatus::Playing])?;
        if self.turn_phase != TurnPhase::Listening {
            return Err(GameError::SubmissionPending);
        }
        self.turn_phase = TurnPhase::Validating;
        Ok(self.epoch)
    }

    /// Record a verdict for the active player.
    ///
    /// `time_remaining_at_submission` must be captured when the word was
    /// submitted, not when the verdict arrives. Does not advance the turn;
    /// call [`GameState::conclude_turn`] (or one of the explicit transitions)
    /// once the verdict has been shown.
    pub fn submit_result(
        &mut self,
        epoch: u64,
        word: &str,
        verdict: &Verdict,
        time_remaining_at_submission: u32,
    ) -> Result<WordEntry, GameError> {
        self.require_status("record a verdict", &[GameStatus::Playing])?;
        self.require_epoch(epoch)?;
        if self.turn_phase == TurnPhase::ShowingVerdict {
            return Err(GameError::SubmissionPending);
        }

        let word = word.trim();
        let points = if verdict.is_valid {
            scoring::score(self.settings.timer_duration, time_remaining_at_submission)
        } else {
            0
        };

        let entry = WordEntry {
            word: word.to_string(),
            player_id: self.current_player().id.clone(),
            is_valid: verdict.is_valid,
            timestamp: chrono::Utc::now().to_rfc3339(),
            reason: verdict.reason.clone(),
            points,
        };
        self.word_history.push(entry.clone());

        if verdict.is_valid {
            self.used_words.insert(validator::normalize(word));
            self.players[self.current_turn].score += points;
            self.last_accepted_word = Some(word.to_string());
        }

        self.validation_result = Some(ValidationDisplay {
            is_valid: verdict.is_valid,
            reason: verdict.reason.clone(),
            message: verdict.message.clone(),
            points,
        });
        self.turn_phase = TurnPhase::ShowingVerdict;

        tracing::info!(
            player = %entry.player_id,
            word = %entry.word,
            valid = entry.is_valid,
            points,
            "Verdict recorded"
        );
        Ok(entry)
    }

    /// Resolve the turn after a verdict has been shown, applying the single
    /// policy for the current mode:
    ///
    /// - sudden death, invalid word: [`GameState::end_game`]
    /// - round mode, invalid word, forfeit policy: [`GameState::end_round`]
    /// - otherwise: [`GameState::advance_turn`]
    pub fn conclude_turn(&mut self, epoch: u64) -> Result<(), GameError> {
        self.require_status("conclude the turn", &[GameStatus::Playing])?;
        self.require_epoch(epoch)?;
        if self.turn_phase != TurnPhase::ShowingVerdict {
            return Err(GameError::NoVerdictPending);
        }

        let last_valid = self.word_history.last().is_some_and(|w| w.is_valid);
        match (last_valid, self.is_unlimited(), self.settings.invalid_word_policy) {
            (false, true, _) => self.end_game(),
            (false, false, InvalidWordPolicy::Forfeit) => self.end_round(),
            _ => self.advance_turn(),
        }
    }

    /// Pass the turn on regardless of the last verdict. Ends the game when
    /// the final round completes in round mode.
    pub fn advance_turn(&mut self) -> Result<(), GameError> {
        self.require_status("advance the turn", &[GameStatus::Playing])?;
        self.rotate_turn();
        Ok(())
    }

    /// Round mode: the active player forfeits; the opponent gets one point
    /// and the turn passes on.
    pub fn end_round(&mut self) -> Result<(), GameError> {
        self.require_status("end the round", &[GameStatus::Playing])?;
        if self.is_unlimited() {
            return Err(GameError::WrongMode {
                action: "Forfeiting a round",
                mode: self.mode(),
            });
        }

        let opponent = 1 - self.current_turn;
        self.players[opponent].score += 1;
        self.rotate_turn();
        Ok(())
    }

    /// Sudden death: the active player made a mistake, the other one wins.
    pub fn end_game(&mut self) -> Result<(), GameError> {
        self.require_status("end the game", &[GameStatus::Playing])?;
        if !self.is_unlimited() {
            return Err(GameError::WrongMode {
                action: "Ending the game on a mistake",
                mode: self.mode(),
            });
        }

        self.finish(Winner::Player(self.other_player().id.clone()));
        Ok(())
    }

    /// Next turn, or next round after the second player's turn. The accepted
    /// word chain carries over.
    fn rotate_turn(&mut self) {
        let round_complete = self.turn_in_round == 1;
        let next_round = if round_complete {
            self.current_round + 1
        } else {
            self.current_round
        };

        if !self.is_unlimited() && round_complete && next_round > self.settings.total_rounds {
            self.finish(determine_winner(&self.players));
            return;
        }

        let next_turn = if round_complete { 0 } else { 1 };
        self.current_round = next_round;
        self.current_turn = next_turn;
        self.turn_in_round = next_turn;
        self.time_remaining = self.settings.timer_duration;
        self.current_word.clear();
        self.validation_result = None;
        self.turn_phase = TurnPhase::Listening;
        self.epoch += 1;

        tracing::debug!(
            round = self.current_round,
            player = %self.current_player().id,
            "Turn advanced"
        );
    }

    fn finish(&mut self, winner: Winner) {
        tracing::info!(game_id = ?self.game_id, ?winner, "Game finished");
        self.status = GameStatus::Finished;
        self.winner = Some(winner);
        self.turn_phase = TurnPhase::Listening;
        self.epoch += 1;
    }

    // ========== Derived views ==========

    pub fn is_unlimited(&self) -> bool {
        self.settings.is_unlimited()
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.current_turn]
    }

    pub fn other_player(&self) -> &Player {
        &self.players[1 - self.current_turn]
    }

    /// 1 or 2
    pub fn turn_number_in_round(&self) -> usize {
        self.turn_in_round + 1
    }

    pub fn required_start_letter(&self) -> Option<char> {
        self.last_accepted_word
            .as_deref()
            .and_then(validator::required_start_letter)
    }

    pub fn timer_level(&self) -> TimerLevel {
        TimerLevel::for_remaining(self.time_remaining)
    }

    /// Share of the turn still left, 0-100
    pub fn timer_progress(&self) -> f64 {
        if self.settings.timer_duration == 0 {
            return 0.0;
        }
        f64::from(self.time_remaining) / f64::from(self.settings.timer_duration) * 100.0
    }

    pub fn valid_word_count(&self) -> usize {
        self.word_history.iter().filter(|w| w.is_valid).count()
    }

    pub fn is_tie(&self) -> bool {
        self.winner == Some(Winner::Tie)
    }

    pub fn summary(&self) -> GameSummary {
        GameSummary {
            game_id: self.game_id.clone(),
            winner: self.winner.clone(),
            is_tie: self.is_tie(),
            players: self.players.to_vec(),
            valid_word_count: self.valid_word_count(),
            unlimited: self.is_unlimited(),
            rounds_played: self.current_round,
        }
    }
}
