//! Points for a valid word, based on how long the player took.

/// Answers within this many seconds earn full points
pub const GRACE_SECONDS: u32 = 5;
pub const MAX_POINTS: u32 = 100;
pub const MIN_POINTS: u32 = 45;

/// Points for a valid word given the turn length and the time left on the
/// clock when the word was submitted.
///
/// Full points inside the grace window, then one point less per extra
/// second, never below [`MIN_POINTS`].
pub fn score(timer_duration: u32, time_remaining_at_submission: u32) -> u32 {
    let time_used = timer_duration.saturating_sub(time_remaining_at_submission);
    if time_used <= GRACE_SECONDS {
        return MAX_POINTS;
    }

    let seconds_over = time_used - GRACE_SECONDS;
    MAX_POINTS.saturating_sub(seconds_over).max(MIN_POINTS)
}
