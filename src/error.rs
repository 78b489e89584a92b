//! Game-specific error types.
//!
//! Systems should propagate errors through these types rather than panicking
//! where practical, enabling graceful degradation instead of hard crashes.

use std::fmt;

/// Top-level error enum for the gravwell session.
#[derive(Debug)]
pub enum GameError {
    /// Planet rejection sampling could not place a planet within the bounded
    /// retry budget, even after relaxing the radius range.  Recoverable: the
    /// generator skips the planet and continues with a smaller layout.
    PlanetPlacementExhausted {
        /// Planets already accepted when sampling stalled.
        placed: usize,
        /// Total retry attempts spent across all relaxation rounds.
        attempts: u32,
    },

    /// A level index outside the valid range was requested.  Not reachable
    /// through normal transitions; treated as a programming invariant
    /// violation, not a recoverable condition.
    InvalidLevelIndex {
        /// The index that was rejected.
        index: u32,
    },
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::PlanetPlacementExhausted { placed, attempts } => write!(
                f,
                "planet placement exhausted after {} attempts ({} planets placed)",
                attempts, placed
            ),
            GameError::InvalidLevelIndex { index } => {
                write!(f, "invalid level index {} (levels are 1-based)", index)
            }
        }
    }
}

impl std::error::Error for GameError {}

/// Convenience alias: a `Result` using `GameError` as the error type.
pub type GameResult<T> = Result<T, GameError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error if `index` is not a valid 1-based level index.
pub fn validate_level_index(index: u32) -> GameResult<()> {
    if index == 0 {
        Err(GameError::InvalidLevelIndex { index })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_zero_is_rejected() {
        assert!(validate_level_index(0).is_err());
        assert!(validate_level_index(1).is_ok());
        assert!(validate_level_index(42).is_ok());
    }

    #[test]
    fn errors_render_human_readable_messages() {
        let e = GameError::PlanetPlacementExhausted {
            placed: 3,
            attempts: 192,
        };
        assert!(e.to_string().contains("192 attempts"));
        let e = GameError::InvalidLevelIndex { index: 0 };
        assert!(e.to_string().contains("invalid level index 0"));
    }
}
