use crate::models::progress::ProgressEntry;
use crate::models::user::UserLevel;

/// How many of the newest attempts feed the success rate.
pub const RECENT_ATTEMPT_WINDOW: usize = 10;

/// Rate at or above which a user moves up a level.
pub const PROMOTE_THRESHOLD: f64 = 0.8;

/// Rate below which a user moves down a level.
pub const DEMOTE_THRESHOLD: f64 = 0.5;

/// Fraction of correct answers over the newest `window` attempts.
/// `attempts` must already be ordered newest first. An empty history
/// rates 0.0.
pub fn success_rate(attempts: &[ProgressEntry], window: usize) -> f64 {
    let recent = &attempts[..attempts.len().min(window)];
    if recent.is_empty() {
        return 0.0;
    }
    let correct = recent.iter().filter(|attempt| attempt.is_correct).count();
    correct as f64 / recent.len() as f64
}

/// Level the user should hold given their current level and recent
/// success rate. Promotion and demotion both saturate.
pub fn next_level(current: UserLevel, rate: f64) -> UserLevel {
    if rate >= PROMOTE_THRESHOLD {
        current.promote()
    } else if rate < DEMOTE_THRESHOLD {
        current.demote()
    } else {
        current
    }
}
