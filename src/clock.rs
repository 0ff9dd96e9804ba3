//! Turn clock: one tick per period into the game while a turn is running.

use crate::protocol::ServerMessage;
use crate::state::game::TurnPhase;
use crate::state::AppState;
use crate::types::GameStatus;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// What a single clock tick did to the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockOutcome {
    /// Nothing to count down (not playing, or a word is being checked)
    Idle,
    /// One second off the clock, time left
    Ticked(u32),
    /// The clock hit zero and the turn timed out
    Expired,
}

impl AppState {
    /// Apply one clock tick.
    ///
    /// The tick and a resulting timeout happen under the same write lock, so
    /// the timeout fires exactly once per turn no matter how ticks interleave
    /// with pauses or verdicts.
    pub async fn clock_tick(&self) -> ClockOutcome {
        let mut game = self.game.write().await;
        if game.status != GameStatus::Playing
            || game.turn_phase != TurnPhase::Listening
            || game.time_remaining == 0
        {
            return ClockOutcome::Idle;
        }

        let remaining = match game.tick() {
            Ok(remaining) => remaining,
            Err(e) => {
                tracing::warn!("Clock tick rejected: {}", e);
                return ClockOutcome::Idle;
            }
        };
        tracing::debug!(time_remaining = remaining, "Tick");
        self.broadcast_to_all(ServerMessage::Tick {
            time_remaining: remaining,
            level: game.timer_level(),
        });

        if remaining > 0 {
            return ClockOutcome::Ticked(remaining);
        }

        if let Err(e) = game.timer_expired() {
            tracing::warn!("Timer expiry rejected: {}", e);
            return ClockOutcome::Idle;
        }
        self.announce_progress(&game);
        ClockOutcome::Expired
    }
}

/// Spawn the background task driving [`AppState::clock_tick`] once per `period`.
///
/// The period restarts whenever a turn begins or the game resumes, so every
/// turn gets its first second in full.
pub fn spawn_turn_clock(state: AppState, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    state.clock_tick().await;
                }
                _ = state.clock_reset.notified() => {
                    ticker.reset();
                }
            }
        }
    })
}
