use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use wordchain::dictionary::{DictionaryProvider, DictionaryResult, Lookup};
use wordchain::protocol::{ClientMessage, ServerMessage};
use wordchain::state::AppState;
use wordchain::types::{GameStatus, InvalidWordPolicy, RejectReason, Winner};
use wordchain::validator::WordValidator;
use wordchain::ws::handlers::handle_message;

struct WordList(Vec<&'static str>);

#[async_trait]
impl DictionaryProvider for WordList {
    async fn lookup(&self, word: &str) -> DictionaryResult<Lookup> {
        Ok(match self.0.iter().find(|w| **w == word) {
            Some(w) => Lookup::entry(*w),
            None => Lookup::not_found(),
        })
    }

    fn name(&self) -> &str {
        "word_list"
    }
}

fn new_state() -> Arc<AppState> {
    let validator = WordValidator::new(vec![Box::new(WordList(vec![
        "tiger", "rabbit", "tent", "train", "night", "tree", "eagle", "elephant",
    ]))]);
    Arc::new(AppState::new(validator, Duration::ZERO))
}

async fn send(state: &Arc<AppState>, msg: ClientMessage) -> Option<ServerMessage> {
    handle_message(msg, state).await
}

/// Submit through the socket handler and wait until the turn has resolved
async fn say(state: &Arc<AppState>, word: &str) {
    let mut rx = state.broadcast.subscribe();
    let response = send(
        state,
        ClientMessage::SubmitWord {
            word: word.to_string(),
        },
    )
    .await;
    assert!(response.is_none(), "Unexpected response: {:?}", response);

    let resolved = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match rx.recv().await.unwrap() {
                ServerMessage::Turn { .. } | ServerMessage::GameOver { .. } => break,
                _ => {}
            }
        }
    })
    .await;
    assert!(resolved.is_ok(), "Turn for {:?} never resolved", word);
}

fn expect_error(response: Option<ServerMessage>, expected: &str) {
    match response {
        Some(ServerMessage::Error { code, .. }) => assert_eq!(code, expected),
        other => panic!("Expected {} error, got {:?}", expected, other),
    }
}

/// End-to-end: three rounds, every word valid, scores tied
#[tokio::test]
async fn test_full_round_game() {
    let state = new_state();

    for (index, name) in ["Alice", "Bob"].into_iter().enumerate() {
        let response = send(
            &state,
            ClientMessage::SetPlayerName {
                index,
                name: name.to_string(),
            },
        )
        .await;
        assert!(matches!(response, Some(ServerMessage::Ok)));
    }
    let response = send(&state, ClientMessage::SetTotalRounds { rounds: 3 }).await;
    assert!(matches!(response, Some(ServerMessage::Ok)));

    assert!(send(&state, ClientMessage::StartGame).await.is_none());
    let game = state.get_game().await;
    assert_eq!(game.status, GameStatus::Playing);
    assert!(game.game_id.is_some());

    for word in ["tiger", "rabbit", "tent", "train", "night", "tree"] {
        say(&state, word).await;
    }

    let game = state.get_game().await;
    assert_eq!(game.status, GameStatus::Finished);
    assert_eq!(game.players[0].name, "Alice");
    assert_eq!(game.players[0].score, 300);
    assert_eq!(game.players[1].score, 300);
    assert_eq!(game.winner, Some(Winner::Tie));
    assert_eq!(game.word_history.len(), 6);

    let summary = game.summary();
    assert!(summary.is_tie);
    assert_eq!(summary.valid_word_count, 6);
    assert_eq!(summary.rounds_played, 3);
}

/// Round mode keeps going after a bad word under the default policy
#[tokio::test]
async fn test_round_mode_invalid_word_continues() {
    let state = new_state();
    send(&state, ClientMessage::StartGame).await;

    say(&state, "tiger").await;
    say(&state, "dog").await;

    let game = state.get_game().await;
    assert_eq!(game.status, GameStatus::Playing);
    assert_eq!(game.current_round, 2);
    assert_eq!(game.players[1].score, 0);
    assert_eq!(
        game.word_history[1].reason,
        Some(RejectReason::ChainRuleViolation { required: 'r' })
    );
    // Chain still hangs off the last accepted word
    assert_eq!(game.required_start_letter(), Some('r'));
}

#[tokio::test]
async fn test_round_mode_forfeit_policy() {
    let state = new_state();
    send(
        &state,
        ClientMessage::SetInvalidWordPolicy {
            policy: InvalidWordPolicy::Forfeit,
        },
    )
    .await;
    send(&state, ClientMessage::StartGame).await;

    say(&state, "xyzzy").await;

    let game = state.get_game().await;
    assert_eq!(game.players[0].score, 0);
    assert_eq!(game.players[1].score, 1);
    assert_eq!(game.current_turn, 1);
}

/// Sudden death: first invalid word ends the game
#[tokio::test]
async fn test_unlimited_first_mistake_loses() {
    let state = new_state();
    send(&state, ClientMessage::SetTotalRounds { rounds: 0 }).await;
    send(&state, ClientMessage::StartGame).await;

    say(&state, "tiger").await;
    say(&state, "rabbit").await;
    say(&state, "tiger").await;

    let game = state.get_game().await;
    assert_eq!(game.status, GameStatus::Finished);
    assert_eq!(game.winner, Some(Winner::Player("player2".to_string())));
    assert_eq!(
        game.word_history.last().unwrap().reason,
        Some(RejectReason::AlreadyUsed)
    );
}

#[tokio::test]
async fn test_restart_resets_progress_keeps_settings() {
    let state = new_state();
    send(&state, ClientMessage::SetTimerDuration { seconds: 15 }).await;
    send(&state, ClientMessage::StartGame).await;
    say(&state, "tiger").await;
    let first_id = state.get_game().await.game_id;

    assert!(send(&state, ClientMessage::RestartGame).await.is_none());

    let game = state.get_game().await;
    assert_eq!(game.status, GameStatus::Playing);
    assert_ne!(game.game_id, first_id);
    assert_eq!(game.settings.timer_duration, 15);
    assert_eq!(game.time_remaining, 15);
    assert_eq!(game.players[0].score, 0);
    assert!(game.word_history.is_empty());
    assert!(game.used_words.is_empty());
    assert_eq!(game.required_start_letter(), None);
}

#[tokio::test]
async fn test_new_game_returns_to_setup() {
    let state = new_state();
    send(&state, ClientMessage::StartGame).await;
    say(&state, "tiger").await;

    send(&state, ClientMessage::NewGame).await;

    let game = state.get_game().await;
    assert_eq!(game.status, GameStatus::Setup);
    assert!(game.game_id.is_none());
    assert!(game.word_history.is_empty());
}

#[tokio::test]
async fn test_pause_and_resume_preconditions() {
    let state = new_state();

    expect_error(send(&state, ClientMessage::PauseGame).await, "INVALID_TRANSITION");

    send(&state, ClientMessage::StartGame).await;
    assert!(send(&state, ClientMessage::PauseGame).await.is_none());
    // Pausing twice is rejected, not a toggle
    expect_error(send(&state, ClientMessage::PauseGame).await, "INVALID_TRANSITION");
    expect_error(
        send(
            &state,
            ClientMessage::SubmitWord {
                word: "tiger".to_string(),
            },
        )
        .await,
        "INVALID_TRANSITION",
    );

    assert!(send(&state, ClientMessage::ResumeGame).await.is_none());
    expect_error(send(&state, ClientMessage::ResumeGame).await, "INVALID_TRANSITION");
    assert_eq!(state.get_game().await.status, GameStatus::Playing);
}

#[tokio::test]
async fn test_settings_locked_during_play() {
    let state = new_state();

    expect_error(
        send(&state, ClientMessage::SetTimerDuration { seconds: 42 }).await,
        "INVALID_SETTING",
    );

    send(&state, ClientMessage::StartGame).await;
    expect_error(
        send(&state, ClientMessage::SetTotalRounds { rounds: 3 }).await,
        "INVALID_TRANSITION",
    );
    expect_error(send(&state, ClientMessage::StartGame).await, "INVALID_TRANSITION");
}

#[tokio::test]
async fn test_check_word_and_live_transcript() {
    let state = new_state();
    send(&state, ClientMessage::StartGame).await;
    say(&state, "tiger").await;

    match send(
        &state,
        ClientMessage::CheckWord {
            word: "eagle".to_string(),
        },
    )
    .await
    {
        Some(ServerMessage::Precheck { ok, reason, .. }) => {
            assert!(!ok);
            assert_eq!(reason, Some(RejectReason::ChainRuleViolation { required: 'r' }));
        }
        other => panic!("Expected Precheck, got {:?}", other),
    }

    send(
        &state,
        ClientMessage::SetCurrentWord {
            text: "rabbit hole".to_string(),
        },
    )
    .await;
    assert_eq!(state.get_game().await.current_word, "rabbit");

    match send(&state, ClientMessage::GetState).await {
        Some(ServerMessage::State { game }) => {
            assert_eq!(game.current_word, "rabbit");
            assert_eq!(game.last_accepted_word.as_deref(), Some("tiger"));
            assert_eq!(game.current_player_id, "player2");
        }
        other => panic!("Expected State, got {:?}", other),
    }
}

/// Only the first spoken token counts; trailing speech is ignored
#[tokio::test]
async fn test_multi_word_submission_keeps_first_token() {
    let state = new_state();
    send(&state, ClientMessage::StartGame).await;

    say(&state, "  tiger lily").await;
    say(&state, "rabbit um").await;

    let game = state.get_game().await;
    assert_eq!(game.word_history[0].word, "tiger");
    assert!(game.word_history[0].is_valid);
    assert_eq!(game.word_history[1].word, "rabbit");
    assert!(game.word_history[1].is_valid);
    assert!(game.used_words.contains("tiger"));
    assert!(!game.used_words.contains("tiger lily"));
    assert_eq!(game.last_accepted_word.as_deref(), Some("rabbit"));
    assert_eq!(game.required_start_letter(), Some('t'));
}

#[tokio::test]
async fn test_overlong_word_rejected_without_using_the_turn() {
    let state = new_state();
    send(&state, ClientMessage::StartGame).await;

    expect_error(
        send(
            &state,
            ClientMessage::SubmitWord {
                word: "t".repeat(200),
            },
        )
        .await,
        "WORD_TOO_LONG",
    );
    expect_error(
        send(
            &state,
            ClientMessage::SetCurrentWord {
                text: "t".repeat(200),
            },
        )
        .await,
        "WORD_TOO_LONG",
    );

    let game = state.get_game().await;
    assert!(game.word_history.is_empty());
    assert_eq!(game.current_turn, 0);

    say(&state, "tiger").await;
    assert_eq!(state.get_game().await.word_history.len(), 1);
}

#[tokio::test]
async fn test_stale_lookup_after_restart_is_dropped() {
    let state = new_state();
    send(&state, ClientMessage::StartGame).await;

    let pending = state.begin_submission("tiger").await.unwrap();
    expect_error(
        send(
            &state,
            ClientMessage::SubmitWord {
                word: "tent".to_string(),
            },
        )
        .await,
        "SUBMISSION_PENDING",
    );

    send(&state, ClientMessage::RestartGame).await;
    assert!(state.complete_submission(pending).await.is_err());

    let game = state.get_game().await;
    assert!(game.word_history.is_empty());
    assert_eq!(game.current_turn, 0);
}
