use serde::{Deserialize, Serialize};

/// Opaque ID types for type safety
pub type GameId = String;
pub type PlayerId = String;

/// Allowed turn lengths in seconds
pub const TIMER_OPTIONS: &[u32] = &[10, 15, 30, 60];
/// Allowed round counts (0 = unlimited / sudden death)
pub const ROUND_OPTIONS: &[u32] = &[0, 3, 5, 7, 10];

pub const DEFAULT_TIMER: u32 = 30;
pub const DEFAULT_ROUNDS: u32 = 5;

/// Timer level thresholds (seconds remaining)
pub const TIMER_WARNING: u32 = 10;
pub const TIMER_CRITICAL: u32 = 5;

pub const MAX_NAME_CHARS: usize = 24;
/// Longest word accepted from a client; longer text never reaches the dictionaries
pub const MAX_WORD_CHARS: usize = 45;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    Setup,
    Playing,
    Paused,
    Finished,
}

/// What happens in round mode when a player says an invalid word
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InvalidWordPolicy {
    /// Turn passes on; the only penalty is the missed points
    #[default]
    Continue,
    /// Opponent is credited a forfeit point before the turn passes on
    Forfeit,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub score: u32,
}

impl Player {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            score: 0,
        }
    }
}

/// Per-game settings chosen during setup; frozen while a game is running
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameSettings {
    pub timer_duration: u32,
    /// 0 = unlimited (sudden death)
    pub total_rounds: u32,
    pub auto_listen: bool,
    #[serde(default)]
    pub invalid_word_policy: InvalidWordPolicy,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            timer_duration: DEFAULT_TIMER,
            total_rounds: DEFAULT_ROUNDS,
            auto_listen: true,
            invalid_word_policy: InvalidWordPolicy::Continue,
        }
    }
}

impl GameSettings {
    pub fn is_unlimited(&self) -> bool {
        self.total_rounds == 0
    }
}

/// Why a word was rejected
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum RejectReason {
    EmptyWord,
    TooLong { max: usize },
    ContainsNumber,
    ChainRuleViolation { required: char },
    AlreadyUsed,
    ProperNoun,
    NotAWord,
}

impl RejectReason {
    /// Friendly message shown to the players
    pub fn message(&self) -> String {
        match self {
            RejectReason::EmptyWord => "Say a word!".to_string(),
            RejectReason::TooLong { max } => format!("Words can't be longer than {} letters!", max),
            RejectReason::ContainsNumber => "No numbers allowed!".to_string(),
            RejectReason::ChainRuleViolation { required } => {
                format!("Must start with \"{}\"!", required.to_uppercase())
            }
            RejectReason::AlreadyUsed => "Word already used!".to_string(),
            RejectReason::ProperNoun => "No names allowed!".to_string(),
            RejectReason::NotAWord => "Not a real word!".to_string(),
        }
    }
}

pub const VALID_WORD_MESSAGE: &str = "Great word!";

/// Word validator output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Verdict {
    pub is_valid: bool,
    pub reason: Option<RejectReason>,
    pub message: String,
    /// Dictionary providers that errored while checking this word
    #[serde(default)]
    pub lookup_failures: u32,
}

impl Verdict {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            reason: None,
            message: VALID_WORD_MESSAGE.to_string(),
            lookup_failures: 0,
        }
    }

    pub fn rejected(reason: RejectReason) -> Self {
        Self {
            is_valid: false,
            message: reason.message(),
            reason: Some(reason),
            lookup_failures: 0,
        }
    }
}

/// One spoken word in the game history; never mutated once recorded
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WordEntry {
    pub word: String,
    pub player_id: PlayerId,
    pub is_valid: bool,
    pub timestamp: String,
    pub reason: Option<RejectReason>,
    pub points: u32,
}

/// Verdict currently on display, with the points it earned
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationDisplay {
    pub is_valid: bool,
    pub reason: Option<RejectReason>,
    pub message: String,
    pub points: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    Player(PlayerId),
    Tie,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimerLevel {
    Normal,
    Warning,
    Critical,
    Expired,
}

impl TimerLevel {
    pub fn for_remaining(time_remaining: u32) -> Self {
        match time_remaining {
            0 => TimerLevel::Expired,
            t if t <= TIMER_CRITICAL => TimerLevel::Critical,
            t if t <= TIMER_WARNING => TimerLevel::Warning,
            _ => TimerLevel::Normal,
        }
    }
}

/// End-of-game summary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameSummary {
    pub game_id: Option<GameId>,
    pub winner: Option<Winner>,
    pub is_tie: bool,
    pub players: Vec<Player>,
    pub valid_word_count: usize,
    pub unlimited: bool,
    pub rounds_played: u32,
}
