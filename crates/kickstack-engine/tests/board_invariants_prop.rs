//! Invariants of the board state machine under random action sequences.
//!
//! - Probing a move on a copy and applying it for real give equal boards.
//! - A lock leaves nothing in play, resets hold and adds exactly one to the score.
//! - No row is ever left full after a lock.
//! - Column heights, row widths and the max height agree with the grid.

use kickstack_engine::{Action, Board, Outcome, Piece, PieceBuffer, PieceSeed};
use proptest::prelude::*;

fn assert_bookkeeping_consistent(board: &Board) {
    let grid = board.grid();
    for y in 0..board.height() {
        let filled = (0..board.width()).filter(|&x| grid.is_filled(x, y)).count();
        assert_eq!(board.row_width(y), filled, "row {y}");
    }
    for x in 0..board.width() {
        let height = (0..board.height())
            .rev()
            .find(|&y| grid.is_filled(x, y))
            .map_or(0, |y| y + 1);
        assert_eq!(board.column_height(x), height, "column {x}");
    }
    let max = (0..board.width())
        .map(|x| board.column_height(x))
        .max()
        .unwrap_or(0);
    assert_eq!(board.max_height(), max);
}

/// Spawns the next piece if nothing is in play. Returns `false` on top-out.
fn ensure_piece(board: &mut Board, buffer: &mut PieceBuffer) -> bool {
    if board.piece().is_some() {
        return true;
    }
    let piece = Piece::new(buffer.pop_next());
    board.next_piece(piece, board.spawn_position(piece)).is_ok()
}

proptest! {
    #[test]
    fn random_play_keeps_board_invariants(
        seed in any::<u128>(),
        width in 4usize..12,
        height in 4usize..16,
        actions in prop::collection::vec(0usize..Action::ALL.len(), 1..200),
    ) {
        let mut board = Board::new(width, height).unwrap();
        let mut buffer = PieceBuffer::with_seed(PieceSeed::from_u128(seed));

        for index in actions {
            if !ensure_piece(&mut board, &mut buffer) {
                break;
            }
            let action = Action::ALL[index];
            let before = board.clone();
            let probe = board.test_move(action);
            prop_assert_eq!(&board, &before);

            let outcome = board.apply(action);
            prop_assert_eq!(&board, &probe);
            prop_assert_eq!(board.last_action(), Some(action));
            prop_assert_eq!(board.last_outcome(), Some(outcome));

            if outcome == Outcome::Place {
                prop_assert!(board.piece().is_none());
                prop_assert!(!board.hold_used());
                prop_assert_eq!(board.score(), before.score() + 1);
                prop_assert_eq!(
                    board.total_rows_cleared(),
                    before.total_rows_cleared() + board.rows_cleared()
                );
                for y in 0..board.height() {
                    prop_assert!(board.row_width(y) < board.width());
                }
            } else {
                prop_assert!(board.piece().is_some());
                prop_assert_eq!(board.score(), before.score());
            }
            if outcome == Outcome::OutBounds {
                prop_assert_eq!(&board, &before);
            }
            assert_bookkeeping_consistent(&board);
        }
    }

    #[test]
    fn drop_lands_where_drop_height_predicts(
        seed in any::<u128>(),
        placements in 1usize..30,
    ) {
        let mut board = Board::new(10, 24).unwrap();
        let mut buffer = PieceBuffer::with_seed(PieceSeed::from_u128(seed));

        for _ in 0..placements {
            if !ensure_piece(&mut board, &mut buffer) {
                break;
            }
            let Some(falling) = board.falling_piece() else {
                break;
            };
            let landing = board.drop_height(falling.piece, falling.position.x()).unwrap();
            let dropped = board.test_move(Action::Drop);
            if landing <= falling.position.y() {
                let mut expected = board.clone();
                let target = falling.position.offset(0, landing - falling.position.y());
                prop_assert!(expected.next_piece(falling.piece, target).is_ok());
                prop_assert_eq!(expected.apply(Action::Down), Outcome::Place);
                prop_assert_eq!(&expected, &dropped);
            }
            board.apply(Action::Drop);
        }
    }
}
