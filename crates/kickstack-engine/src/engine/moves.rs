use crate::core::{
    kick::RotationDirection,
    piece::{Piece, PieceKind, PiecePosition},
};

use super::board::Board;

/// A primitive action applied to the falling piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Action {
    #[display("left")]
    Left,
    #[display("right")]
    Right,
    #[display("down")]
    Down,
    #[display("drop")]
    Drop,
    #[display("clockwise")]
    Clockwise,
    #[display("counterclockwise")]
    Counterclockwise,
    #[display("nothing")]
    Nothing,
    #[display("hold")]
    Hold,
}

impl Action {
    pub const ALL: [Self; 8] = [
        Action::Left,
        Action::Right,
        Action::Down,
        Action::Drop,
        Action::Clockwise,
        Action::Counterclockwise,
        Action::Nothing,
        Action::Hold,
    ];
}

/// Result of applying an [`Action`].
///
/// These are expected signals, not errors: an `OutBounds` move leaves the board
/// exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, derive_more::IsVariant)]
pub enum Outcome {
    /// The action was applied and the piece is still in play.
    #[display("success")]
    Success,
    /// The action would collide; nothing changed.
    #[display("out of bounds")]
    OutBounds,
    /// No piece is in play, or a first hold stored the piece with nothing to swap in.
    #[display("no piece")]
    NoPiece,
    /// The piece was locked into the grid.
    #[display("place")]
    Place,
}

/// The falling piece together with its anchor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FallingPiece {
    pub piece: Piece,
    pub position: PiecePosition,
}

impl FallingPiece {
    #[must_use]
    pub const fn new(piece: Piece, position: PiecePosition) -> Self {
        Self { piece, position }
    }

    #[must_use]
    pub const fn shifted(self, dx: i32, dy: i32) -> Self {
        Self {
            piece: self.piece,
            position: self.position.offset(dx, dy),
        }
    }
}

/// State change requested by an action, committed by the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Transition {
    Stay(Outcome),
    Reposition(FallingPiece),
    Lock(FallingPiece),
    StoreHold(PieceKind),
    SwapHold {
        incoming: FallingPiece,
        outgoing: PieceKind,
    },
}

/// Works out what `action` does to `falling` on `board` without mutating anything.
pub(crate) fn resolve(board: &Board, falling: FallingPiece, action: Action) -> Transition {
    match action {
        Action::Left => shift(board, falling, -1),
        Action::Right => shift(board, falling, 1),
        Action::Down => down(board, falling),
        Action::Drop => hard_drop(board, falling),
        Action::Clockwise => rotate(board, falling, RotationDirection::Clockwise),
        Action::Counterclockwise => rotate(board, falling, RotationDirection::Counterclockwise),
        Action::Hold => hold(board, falling),
        Action::Nothing => Transition::Stay(Outcome::Success),
    }
}

fn fits(board: &Board, falling: FallingPiece) -> bool {
    !board.intersects_at(falling.piece, falling.position)
}

fn shift(board: &Board, falling: FallingPiece, dx: i32) -> Transition {
    let moved = falling.shifted(dx, 0);
    if fits(board, moved) {
        Transition::Reposition(moved)
    } else {
        Transition::Stay(Outcome::OutBounds)
    }
}

fn down(board: &Board, falling: FallingPiece) -> Transition {
    let moved = falling.shifted(0, -1);
    if fits(board, moved) {
        Transition::Reposition(moved)
    } else {
        Transition::Lock(falling)
    }
}

fn hard_drop(board: &Board, falling: FallingPiece) -> Transition {
    let distance = board.grid().drop_distance(falling.piece, falling.position);
    Transition::Lock(falling.shifted(0, -distance))
}

fn rotate(board: &Board, falling: FallingPiece, direction: RotationDirection) -> Transition {
    let rotated = falling.piece.rotated(direction);
    falling
        .piece
        .kicks(direction)
        .iter()
        .map(|&(dx, dy)| FallingPiece::new(rotated, falling.position.offset(dx, dy)))
        .find(|candidate| fits(board, *candidate))
        .map_or(Transition::Stay(Outcome::OutBounds), Transition::Reposition)
}

fn hold(board: &Board, falling: FallingPiece) -> Transition {
    if board.hold_used() {
        return Transition::Stay(Outcome::Success);
    }
    let Some(held) = board.held_piece() else {
        return Transition::StoreHold(falling.piece.kind());
    };
    let piece = Piece::new(held);
    let incoming = FallingPiece::new(piece, board.spawn_position(piece));
    if !fits(board, incoming) {
        return Transition::Stay(Outcome::OutBounds);
    }
    Transition::SwapHold {
        incoming,
        outgoing: falling.piece.kind(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(kind: PieceKind, x: i32, y: i32) -> Board {
        let mut board = Board::new(4, 4).unwrap();
        board
            .next_piece(Piece::new(kind), PiecePosition::new(x, y))
            .unwrap();
        board
    }

    #[test]
    fn test_resolve_does_not_mutate() {
        let board = board_with(PieceKind::O, 0, 2);
        let falling = board.falling_piece().unwrap();
        for action in Action::ALL {
            let before = board.clone();
            let _ = resolve(&board, falling, action);
            assert_eq!(board, before);
        }
    }

    #[test]
    fn test_shift_transitions() {
        let board = board_with(PieceKind::O, 0, 2);
        let falling = board.falling_piece().unwrap();
        assert_eq!(
            resolve(&board, falling, Action::Left),
            Transition::Stay(Outcome::OutBounds)
        );
        assert_eq!(
            resolve(&board, falling, Action::Right),
            Transition::Reposition(falling.shifted(1, 0))
        );
    }

    #[test]
    fn test_down_locks_on_floor() {
        let board = board_with(PieceKind::O, 0, 0);
        let falling = board.falling_piece().unwrap();
        assert_eq!(
            resolve(&board, falling, Action::Down),
            Transition::Lock(falling)
        );
    }

    #[test]
    fn test_drop_always_locks() {
        let board = board_with(PieceKind::O, 1, 2);
        let falling = board.falling_piece().unwrap();
        assert_eq!(
            resolve(&board, falling, Action::Drop),
            Transition::Lock(falling.shifted(0, -2))
        );
    }

    #[test]
    fn test_unobstructed_rotation_uses_zero_offset() {
        let mut board = Board::new(6, 6).unwrap();
        board
            .next_piece(Piece::new(PieceKind::T), PiecePosition::new(1, 1))
            .unwrap();
        let falling = board.falling_piece().unwrap();
        for (action, piece) in [
            (Action::Clockwise, falling.piece.clockwise()),
            (Action::Counterclockwise, falling.piece.counterclockwise()),
        ] {
            assert_eq!(
                resolve(&board, falling, action),
                Transition::Reposition(FallingPiece::new(piece, falling.position))
            );
        }
    }

    #[test]
    fn test_rotation_kicks_off_wall() {
        let mut board = Board::new(6, 6).unwrap();
        let piece = Piece::new(PieceKind::T).clockwise();
        // Vertical T hugging the left wall with its empty column outside the board.
        board.next_piece(piece, PiecePosition::new(-1, 1)).unwrap();
        let falling = board.falling_piece().unwrap();
        assert_eq!(
            resolve(&board, falling, Action::Clockwise),
            Transition::Reposition(FallingPiece::new(
                piece.clockwise(),
                PiecePosition::new(0, 1)
            ))
        );
    }
}
