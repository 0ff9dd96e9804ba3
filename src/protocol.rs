use crate::state::game::GameState;
use crate::types::*;
use serde::{Deserialize, Serialize};

pub const PROTOCOL_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    // Setup (only before a game or after it finished)
    SetPlayerName {
        index: usize,
        name: String,
    },
    SetTimerDuration {
        seconds: u32,
    },
    SetTotalRounds {
        rounds: u32,
    },
    SetAutoListen {
        enabled: bool,
    },
    SetInvalidWordPolicy {
        policy: InvalidWordPolicy,
    },
    // Lifecycle
    StartGame,
    PauseGame,
    ResumeGame,
    /// Start over immediately with the same players and settings
    RestartGame,
    /// Back to setup with the same players and settings
    NewGame,
    // Turn
    /// Live partial transcript for display
    SetCurrentWord {
        text: String,
    },
    /// Local checks only, no dictionary lookup and no state change
    CheckWord {
        word: String,
    },
    SubmitWord {
        word: String,
    },
    ClearValidation,
    GetState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        protocol: String,
        game: GameSnapshot,
        server_now: String,
    },
    /// Full state snapshot
    State {
        game: GameSnapshot,
    },
    /// Broadcast when the game status changes
    Status {
        status: GameStatus,
        game_id: Option<GameId>,
    },
    /// Broadcast once per clock tick
    Tick {
        time_remaining: u32,
        level: TimerLevel,
    },
    /// Broadcast when a new turn begins
    Turn {
        player_id: PlayerId,
        player_name: String,
        round: u32,
        total_rounds: u32,
        turn_number_in_round: usize,
        required_letter: Option<char>,
        time_remaining: u32,
        auto_listen: bool,
    },
    /// Live partial transcript of the active player
    CurrentWord {
        word: String,
    },
    /// Broadcast while a submitted word is being looked up
    Checking {
        player_id: PlayerId,
        word: String,
    },
    Verdict {
        entry: WordEntry,
        message: String,
    },
    ValidationCleared,
    Scores {
        players: Vec<Player>,
    },
    /// Result of a local-only word check, sent to the requester
    Precheck {
        word: String,
        /// True when the word passed every local rule and would go to the dictionaries
        ok: bool,
        reason: Option<RejectReason>,
        message: Option<String>,
    },
    GameOver {
        summary: GameSummary,
    },
    /// Acknowledges a setup change or a transition with no broadcast of its own
    Ok,
    Error {
        code: String,
        msg: String,
    },
}

impl ServerMessage {
    pub fn error(code: &str, msg: impl Into<String>) -> Self {
        ServerMessage::Error {
            code: code.to_string(),
            msg: msg.into(),
        }
    }

    pub fn turn(game: &GameState) -> Self {
        let player = game.current_player();
        ServerMessage::Turn {
            player_id: player.id.clone(),
            player_name: player.name.clone(),
            round: game.current_round,
            total_rounds: game.settings.total_rounds,
            turn_number_in_round: game.turn_number_in_round(),
            required_letter: game.required_start_letter(),
            time_remaining: game.time_remaining,
            auto_listen: game.settings.auto_listen,
        }
    }
}

/// Game state plus the values clients would otherwise have to derive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub game_id: Option<GameId>,
    pub status: GameStatus,
    pub players: Vec<Player>,
    pub current_player_id: PlayerId,
    pub current_round: u32,
    pub turn_number_in_round: usize,
    pub settings: GameSettings,
    pub time_remaining: u32,
    pub timer_level: TimerLevel,
    pub timer_progress: f64,
    pub last_accepted_word: Option<String>,
    pub required_start_letter: Option<char>,
    pub current_word: String,
    pub validation_result: Option<ValidationDisplay>,
    pub word_history: Vec<WordEntry>,
    pub is_validating: bool,
    pub winner: Option<Winner>,
    pub valid_word_count: usize,
}

impl From<&GameState> for GameSnapshot {
    fn from(game: &GameState) -> Self {
        Self {
            game_id: game.game_id.clone(),
            status: game.status,
            players: game.players.to_vec(),
            current_player_id: game.current_player().id.clone(),
            current_round: game.current_round,
            turn_number_in_round: game.turn_number_in_round(),
            settings: game.settings.clone(),
            time_remaining: game.time_remaining,
            timer_level: game.timer_level(),
            timer_progress: game.timer_progress(),
            last_accepted_word: game.last_accepted_word.clone(),
            required_start_letter: game.required_start_letter(),
            current_word: game.current_word.clone(),
            validation_result: game.validation_result.clone(),
            word_history: game.word_history.clone(),
            is_validating: game.turn_phase != crate::state::game::TurnPhase::Listening,
            winner: game.winner.clone(),
            valid_word_count: game.valid_word_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_tags() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"t":"submit_word","word":"tiger"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::SubmitWord { word } if word == "tiger"));

        let msg: ClientMessage = serde_json::from_str(r#"{"t":"pause_game"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::PauseGame));

        let msg: ClientMessage =
            serde_json::from_str(r#"{"t":"set_invalid_word_policy","policy":"forfeit"}"#)
                .unwrap();
        assert!(matches!(
            msg,
            ClientMessage::SetInvalidWordPolicy {
                policy: InvalidWordPolicy::Forfeit
            }
        ));
    }

    #[test]
    fn test_snapshot_includes_derived_fields() {
        let mut game = GameState::new();
        game.start().unwrap();
        let epoch = game.begin_submission().unwrap();
        game.submit_result(epoch, "Tiger", &Verdict::valid(), 30)
            .unwrap();

        let json = serde_json::to_value(ServerMessage::State {
            game: GameSnapshot::from(&game),
        })
        .unwrap();

        assert_eq!(json["t"], "state");
        assert_eq!(json["game"]["status"], "PLAYING");
        assert_eq!(json["game"]["required_start_letter"], "r");
        assert_eq!(json["game"]["timer_level"], "normal");
        assert_eq!(json["game"]["is_validating"], true);
        assert_eq!(json["game"]["valid_word_count"], 1);
    }
}
