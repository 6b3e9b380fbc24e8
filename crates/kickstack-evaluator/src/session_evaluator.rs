//! Session evaluation: playing whole games with a [`Bot`] and summarizing how they went.
//!
//! Used by training to turn a weight vector into a fitness. Each game runs until the
//! board tops out, the bot finds no placement, or the piece limit is reached.

use kickstack_engine::GameSession;

use crate::turn_evaluator::Bot;

/// Outcome of a single game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionResult {
    pub pieces: usize,
    pub rows_cleared: usize,
}

/// Per-game means over a set of sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SessionSummary {
    pub mean_pieces: f64,
    pub mean_rows_cleared: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionEvaluator {
    piece_limit: usize,
}

impl SessionEvaluator {
    #[must_use]
    pub const fn new(piece_limit: usize) -> Self {
        Self { piece_limit }
    }

    #[must_use]
    pub const fn piece_limit(&self) -> usize {
        self.piece_limit
    }

    /// Plays a copy of `session` to the end with `bot`.
    ///
    /// The session passed in is left untouched, so the same starting state can be replayed
    /// by every candidate.
    #[must_use]
    pub fn play_session(&self, session: &GameSession, bot: &mut Bot<'_>) -> SessionResult {
        let mut session = session.clone();
        bot.reset();
        while session.state().is_playing()
            && session.stats().completed_pieces() < self.piece_limit
        {
            let Ok(action) = bot.next_action(session.board()) else {
                break;
            };
            session.apply(action);
        }
        SessionResult {
            pieces: session.stats().completed_pieces(),
            rows_cleared: session.stats().total_cleared_lines(),
        }
    }

    /// Plays every session and averages the results.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn play_sessions(&self, sessions: &[GameSession], bot: &mut Bot<'_>) -> SessionSummary {
        if sessions.is_empty() {
            return SessionSummary::default();
        }
        let (pieces, rows_cleared) = sessions
            .iter()
            .map(|session| self.play_session(session, bot))
            .fold((0, 0), |(pieces, rows), result| {
                (pieces + result.pieces, rows + result.rows_cleared)
            });
        let count = sessions.len() as f64;
        SessionSummary {
            mean_pieces: pieces as f64 / count,
            mean_rows_cleared: rows_cleared as f64 / count,
        }
    }
}

#[cfg(test)]
mod tests {
    use kickstack_engine::PieceSeed;

    use super::*;
    use crate::{
        board_feature::{BoardFeature, FEATURE_COUNT},
        placement_evaluator::WeightedPlacementEvaluator,
        turn_evaluator::TurnEvaluator,
    };

    fn trained_bot() -> Bot<'static> {
        Bot::new(TurnEvaluator::new(Box::new(
            WeightedPlacementEvaluator::default(),
        )))
    }

    #[test]
    fn test_piece_limit_stops_session() {
        let session = GameSession::new(10, 24, PieceSeed::from_u128(11)).unwrap();
        let result = SessionEvaluator::new(25).play_session(&session, &mut trained_bot());
        assert_eq!(result.pieces, 25);
        assert!(result.rows_cleared > 0);
        assert_eq!(session.stats().completed_pieces(), 0);
    }

    #[test]
    fn test_sessions_are_deterministic() {
        let session = GameSession::new(10, 24, PieceSeed::from_u128(42)).unwrap();
        let evaluator = SessionEvaluator::new(40);
        let mut bot = trained_bot();
        let first = evaluator.play_session(&session, &mut bot);
        let second = evaluator.play_session(&session, &mut bot);
        assert_eq!(first, second);
    }

    #[test]
    fn test_poor_weights_top_out_early() {
        // Rewarding height stacks pieces straight up.
        let mut weights = [0.0; FEATURE_COUNT];
        weights[BoardFeature::MaxHeight.index()] = 1.0;
        let mut bot = Bot::new(TurnEvaluator::new(Box::new(WeightedPlacementEvaluator::new(
            weights,
        ))));
        let session = GameSession::new(10, 24, PieceSeed::from_u128(1)).unwrap();
        let result = SessionEvaluator::new(1000).play_session(&session, &mut bot);
        assert!(result.pieces < 1000);
    }

    #[test]
    fn test_play_sessions_averages() {
        let sessions = [
            GameSession::new(10, 24, PieceSeed::from_u128(1)).unwrap(),
            GameSession::new(10, 24, PieceSeed::from_u128(2)).unwrap(),
        ];
        let evaluator = SessionEvaluator::new(10);
        let summary = evaluator.play_sessions(&sessions, &mut trained_bot());
        assert_eq!(summary.mean_pieces, 10.0);

        let empty = evaluator.play_sessions(&[], &mut trained_bot());
        assert_eq!(empty, SessionSummary::default());
    }
}
