//! Wall kick tables.
//!
//! A rotation first tries the rotated piece in place, then each offset of the table
//! in order. The first offset where the piece fits wins. Tables are indexed by the
//! rotation state being left and use the board's y-up coordinates.

use super::piece::{PieceKind, PieceRotation};

/// Direction of a rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RotationDirection {
    Clockwise,
    Counterclockwise,
}

type KickTable = [[(i32, i32); 5]; 4];

const NORMAL_CLOCKWISE: KickTable = [
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
];

const NORMAL_COUNTERCLOCKWISE: KickTable = [
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
];

const I_CLOCKWISE: KickTable = [
    [(0, 0), (-2, 0), (1, 0), (-2, -1), (1, 2)],
    [(0, 0), (-1, 0), (2, 0), (-1, 2), (2, -1)],
    [(0, 0), (2, 0), (-1, 0), (2, 1), (-1, -2)],
    [(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)],
];

const I_COUNTERCLOCKWISE: KickTable = [
    [(0, 0), (-1, 0), (2, 0), (-1, 2), (2, -1)],
    [(0, 0), (2, 0), (-1, 0), (2, 1), (-1, -2)],
    [(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)],
    [(0, 0), (-2, 0), (1, 0), (-2, -1), (1, 2)],
];

const O_KICKS: [(i32, i32); 1] = [(0, 0)];

/// Offsets to try when rotating a piece of `kind` out of `from` in `direction`.
pub(crate) fn kicks(
    kind: PieceKind,
    from: PieceRotation,
    direction: RotationDirection,
) -> &'static [(i32, i32)] {
    let table = match (kind, direction) {
        (PieceKind::O, _) => return &O_KICKS,
        (PieceKind::I, RotationDirection::Clockwise) => &I_CLOCKWISE,
        (PieceKind::I, RotationDirection::Counterclockwise) => &I_COUNTERCLOCKWISE,
        (_, RotationDirection::Clockwise) => &NORMAL_CLOCKWISE,
        (_, RotationDirection::Counterclockwise) => &NORMAL_COUNTERCLOCKWISE,
    };
    &table[from.index()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_table_starts_in_place() {
        for kind in PieceKind::ALL {
            for rotation in PieceRotation::ALL {
                for direction in [
                    RotationDirection::Clockwise,
                    RotationDirection::Counterclockwise,
                ] {
                    assert_eq!(kicks(kind, rotation, direction)[0], (0, 0));
                }
            }
        }
    }

    #[test]
    fn test_square_never_kicks() {
        for rotation in PieceRotation::ALL {
            assert_eq!(
                kicks(PieceKind::O, rotation, RotationDirection::Clockwise),
                &[(0, 0)]
            );
        }
    }

    #[test]
    fn test_i_piece_uses_its_own_table() {
        let i = kicks(
            PieceKind::I,
            PieceRotation::new(0),
            RotationDirection::Clockwise,
        );
        let t = kicks(
            PieceKind::T,
            PieceRotation::new(0),
            RotationDirection::Clockwise,
        );
        assert_eq!(i[1], (-2, 0));
        assert_eq!(t[1], (-1, 0));
        assert_eq!(i.len(), 5);
    }
}
