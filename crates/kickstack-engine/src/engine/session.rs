use crate::{
    BoardSizeError,
    core::piece::{Piece, PieceKind},
};

use super::{
    board::Board,
    game_stats::GameStats,
    moves::{Action, Outcome},
    piece_buffer::{PieceBuffer, PieceSeed},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum SessionState {
    Playing,
    GameOver,
}

/// A single game: a board fed by a seeded 7-bag, with statistics.
///
/// Each piece is spawned at [`Board::spawn_position`]. After every lock the next piece
/// is spawned; if it collides the session is over.
///
/// # Example
///
/// ```
/// use kickstack_engine::{Action, GameSession, PieceSeed};
///
/// let mut session = GameSession::new(10, 24, PieceSeed::from_u128(1))?;
/// while session.state().is_playing() {
///     session.apply(Action::Drop);
/// }
/// assert!(session.stats().completed_pieces() > 0);
/// # Ok::<(), kickstack_engine::BoardSizeError>(())
/// ```
#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    buffer: PieceBuffer,
    stats: GameStats,
    state: SessionState,
}

impl GameSession {
    pub fn new(width: usize, height: usize, seed: PieceSeed) -> Result<Self, BoardSizeError> {
        let mut session = Self {
            board: Board::new(width, height)?,
            buffer: PieceBuffer::with_seed(seed),
            stats: GameStats::new(),
            state: SessionState::Playing,
        };
        session.spawn_next();
        Ok(session)
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn next_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.buffer.next_pieces()
    }

    /// Applies `action` to the board, spawning the next piece after a lock.
    ///
    /// Once the game is over every action reports [`Outcome::NoPiece`].
    pub fn apply(&mut self, action: Action) -> Outcome {
        if self.state.is_game_over() {
            return Outcome::NoPiece;
        }
        let outcome = self.board.apply(action);
        if outcome.is_place() {
            self.stats.complete_piece_drop(self.board.rows_cleared());
            self.spawn_next();
        }
        outcome
    }

    fn spawn_next(&mut self) {
        let piece = Piece::new(self.buffer.pop_next());
        let position = self.board.spawn_position(piece);
        if self.board.next_piece(piece, position).is_err() {
            self.state = SessionState::GameOver;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_piece_is_spawned() {
        let seed = PieceSeed::from_u128(5);
        let expected = PieceBuffer::with_seed(seed).pop_next();
        let session = GameSession::new(10, 24, seed).unwrap();
        let piece = session.board().piece().unwrap();
        assert_eq!(piece, Piece::new(expected));
        assert_eq!(
            session.board().position(),
            Some(session.board().spawn_position(piece))
        );
        assert!(session.state().is_playing());
    }

    #[test]
    fn test_stacking_in_place_tops_out() {
        let mut session = GameSession::new(10, 24, PieceSeed::from_u128(3)).unwrap();
        let mut drops = 0;
        while session.state().is_playing() {
            assert_eq!(session.apply(Action::Drop), Outcome::Place);
            drops += 1;
            assert!(drops < 100);
        }
        assert_eq!(session.stats().completed_pieces(), drops);
        assert!(session.board().piece().is_none());
        assert_eq!(session.apply(Action::Left), Outcome::NoPiece);
        assert_eq!(session.stats().completed_pieces(), drops);
    }

    #[test]
    fn test_stats_follow_board() {
        let mut session = GameSession::new(4, 8, PieceSeed::from_u128(11)).unwrap();
        for _ in 0..5 {
            if session.state().is_game_over() {
                break;
            }
            session.apply(Action::Drop);
        }
        assert_eq!(
            session.stats().total_cleared_lines(),
            session.board().total_rows_cleared()
        );
        assert_eq!(session.stats().completed_pieces(), session.board().score());
    }
}
