use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

use super::kick::{self, RotationDirection};

/// Cell offsets of a piece, relative to the bottom-left corner of its bounding box.
///
/// `x` grows rightward and `y` grows upward, matching the board's coordinate system.
/// The order of the four cells is preserved through rotation.
pub type PieceBody = [(i32, i32); 4];

/// Widest bounding box of any piece kind (the I-piece).
pub const MAX_PIECE_SIZE: usize = 4;

type PieceSkirt = [Option<i32>; MAX_PIECE_SIZE];

/// A piece kind in one of its four rotation states.
///
/// Pieces carry no position: the board pairs a piece with an anchor position when it
/// is in play. Every rotation state of every kind is computed once at compile time,
/// so rotating is a table lookup and two pieces compare equal exactly when their kind
/// and rotation match.
///
/// # Example
///
/// ```
/// use kickstack_engine::{Piece, PieceKind};
///
/// let piece = Piece::new(PieceKind::T);
/// assert_eq!(piece.body(), &[(0, 1), (1, 1), (2, 1), (1, 2)]);
///
/// let rotated = piece.clockwise();
/// assert_eq!(rotated.body(), &[(1, 2), (1, 1), (1, 0), (2, 1)]);
/// assert_eq!(rotated.counterclockwise(), piece);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    kind: PieceKind,
    rotation: PieceRotation,
}

impl Piece {
    /// Creates a piece in its spawn orientation.
    #[must_use]
    pub const fn new(kind: PieceKind) -> Self {
        Self {
            kind,
            rotation: PieceRotation(0),
        }
    }

    /// Creates a piece of `kind` already in `rotation`.
    #[must_use]
    pub const fn with_rotation(kind: PieceKind, rotation: PieceRotation) -> Self {
        Self { kind, rotation }
    }

    /// Kind of the piece.
    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    /// Current rotation state, `0` being the spawn orientation.
    #[must_use]
    pub const fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    /// Width of the piece's bounding box.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.kind.box_size()
    }

    /// Height of the piece's bounding box.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.kind.box_size()
    }

    /// Occupied cell offsets from the anchor in this rotation.
    #[must_use]
    pub fn body(&self) -> &'static PieceBody {
        &PIECE_BODIES[self.kind as usize][self.rotation.index()]
    }

    /// Lowest occupied row offset for each column of the bounding box.
    ///
    /// `None` marks a column that holds no block in this rotation.
    #[must_use]
    pub fn skirt(&self) -> &'static [Option<i32>] {
        &PIECE_SKIRTS[self.kind as usize][self.rotation.index()][..self.kind.box_columns()]
    }

    /// Same kind, rotated a quarter turn clockwise.
    #[must_use]
    pub const fn clockwise(&self) -> Self {
        Self {
            kind: self.kind,
            rotation: self.rotation.rotated_right(),
        }
    }

    /// Same kind, rotated a quarter turn counterclockwise.
    #[must_use]
    pub const fn counterclockwise(&self) -> Self {
        Self {
            kind: self.kind,
            rotation: self.rotation.rotated_left(),
        }
    }

    /// Same kind, rotated a quarter turn in `direction`.
    ///
    /// The result ignores the board; wall kicks are applied by the caller.
    #[must_use]
    pub const fn rotated(&self, direction: RotationDirection) -> Self {
        match direction {
            RotationDirection::Clockwise => self.clockwise(),
            RotationDirection::Counterclockwise => self.counterclockwise(),
        }
    }

    /// All four rotation states of this piece's kind, starting at the spawn orientation.
    #[must_use]
    pub const fn rotations(&self) -> [Self; 4] {
        let kind = self.kind;
        [
            Self::with_rotation(kind, PieceRotation(0)),
            Self::with_rotation(kind, PieceRotation(1)),
            Self::with_rotation(kind, PieceRotation(2)),
            Self::with_rotation(kind, PieceRotation(3)),
        ]
    }

    /// Offsets to try, in order, when rotating this piece in `direction`.
    #[must_use]
    pub fn kicks(&self, direction: RotationDirection) -> &'static [(i32, i32)] {
        kick::kicks(self.kind, self.rotation, direction)
    }
}

/// Anchor position of a piece on the board.
///
/// The anchor is the bottom-left corner of the piece's bounding box. It may lie outside
/// the board (e.g. a negative `x`) as long as every occupied cell is inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct PiecePosition {
    x: i32,
    y: i32,
}

impl PiecePosition {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn x(self) -> i32 {
        self.x
    }

    #[must_use]
    pub const fn y(self) -> i32 {
        self.y
    }

    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Rotation state of a piece.
///
/// - `0`: spawn orientation
/// - `1`: 90° clockwise
/// - `2`: 180°
/// - `3`: 270° clockwise (90° counterclockwise)
///
/// Rotation operations wrap around modulo 4.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceRotation(u8);

impl PieceRotation {
    pub const ALL: [Self; 4] = [Self(0), Self(1), Self(2), Self(3)];

    #[must_use]
    pub const fn new(steps: u8) -> Self {
        Self(steps % 4)
    }

    #[must_use]
    pub const fn rotated_right(self) -> Self {
        Self((self.0 + 1) % 4)
    }

    #[must_use]
    pub const fn rotated_left(self) -> Self {
        Self((self.0 + 3) % 4)
    }

    /// Number of clockwise quarter turns needed to reach `target`.
    #[must_use]
    pub const fn clockwise_steps_to(self, target: Self) -> u8 {
        (target.0 + 4 - self.0) % 4
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Enum representing the type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece (stick).
    I = 0,
    /// O-piece (square).
    O = 1,
    /// S-piece (right dog).
    S = 2,
    /// Z-piece (left dog).
    Z = 3,
    /// J-piece (left L).
    J = 4,
    /// L-piece (right L).
    L = 5,
    /// T-piece.
    T = 6,
}

impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        PieceKind::ALL[rng.random_range(0..PieceKind::LEN)]
    }
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
        PieceKind::T,
    ];

    const fn box_size(self) -> i32 {
        match self {
            PieceKind::I => 4,
            PieceKind::O => 2,
            _ => 3,
        }
    }

    const fn box_columns(self) -> usize {
        match self {
            PieceKind::I => 4,
            PieceKind::O => 2,
            _ => 3,
        }
    }

    const fn spawn_body(self) -> PieceBody {
        match self {
            PieceKind::I => [(0, 2), (1, 2), (2, 2), (3, 2)],
            PieceKind::O => [(0, 0), (0, 1), (1, 0), (1, 1)],
            PieceKind::S => [(0, 1), (1, 1), (1, 2), (2, 2)],
            PieceKind::Z => [(0, 2), (1, 2), (1, 1), (2, 1)],
            PieceKind::J => [(0, 1), (1, 1), (2, 1), (0, 2)],
            PieceKind::L => [(0, 1), (1, 1), (2, 1), (2, 2)],
            PieceKind::T => [(0, 1), (1, 1), (2, 1), (1, 2)],
        }
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use kickstack_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::T => 'T',
        }
    }

    /// Parses a piece kind from a single character.
    ///
    /// # Examples
    ///
    /// ```
    /// use kickstack_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('I'), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            'T' => Some(PieceKind::T),
            _ => None,
        }
    }
}

/// Rotates a body 90° clockwise inside a square bounding box of the given width.
const fn rotate_body(body: PieceBody, width: i32) -> PieceBody {
    let mut rotated = body;
    let mut i = 0;
    while i < body.len() {
        let (x, y) = body[i];
        rotated[i] = (y, width - x - 1);
        i += 1;
    }
    rotated
}

/// Generates all 4 rotation states of a body by rotating 90° clockwise.
const fn body_rotations(width: i32, spawn: PieceBody) -> [PieceBody; 4] {
    let mut rotations = [spawn; 4];
    let mut i = 1;
    while i < 4 {
        rotations[i] = rotate_body(rotations[i - 1], width);
        i += 1;
    }
    rotations
}

#[expect(clippy::cast_sign_loss)]
const fn body_skirt(body: &PieceBody) -> PieceSkirt {
    let mut skirt = [None; MAX_PIECE_SIZE];
    let mut i = 0;
    while i < body.len() {
        let (x, y) = body[i];
        let column = x as usize;
        skirt[column] = match skirt[column] {
            Some(lowest) if lowest <= y => Some(lowest),
            _ => Some(y),
        };
        i += 1;
    }
    skirt
}

static PIECE_BODIES: [[PieceBody; 4]; PieceKind::LEN] = {
    let mut table = [[[(0, 0); 4]; 4]; PieceKind::LEN];
    let mut k = 0;
    while k < PieceKind::LEN {
        let kind = PieceKind::ALL[k];
        table[k] = body_rotations(kind.box_size(), kind.spawn_body());
        k += 1;
    }
    table
};

static PIECE_SKIRTS: [[PieceSkirt; 4]; PieceKind::LEN] = {
    let mut table = [[[None; MAX_PIECE_SIZE]; 4]; PieceKind::LEN];
    let mut k = 0;
    while k < PieceKind::LEN {
        let mut r = 0;
        while r < 4 {
            table[k][r] = body_skirt(&PIECE_BODIES[k][r]);
            r += 1;
        }
        k += 1;
    }
    table
};

#[cfg(test)]
mod tests {
    use super::*;

    const EXPECTED_BODIES: [(PieceKind, [PieceBody; 4]); PieceKind::LEN] = [
        (
            PieceKind::T,
            [
                [(0, 1), (1, 1), (2, 1), (1, 2)],
                [(1, 2), (1, 1), (1, 0), (2, 1)],
                [(2, 1), (1, 1), (0, 1), (1, 0)],
                [(1, 0), (1, 1), (1, 2), (0, 1)],
            ],
        ),
        (
            PieceKind::O,
            [
                [(0, 0), (0, 1), (1, 0), (1, 1)],
                [(0, 1), (1, 1), (0, 0), (1, 0)],
                [(1, 1), (1, 0), (0, 1), (0, 0)],
                [(1, 0), (0, 0), (1, 1), (0, 1)],
            ],
        ),
        (
            PieceKind::I,
            [
                [(0, 2), (1, 2), (2, 2), (3, 2)],
                [(2, 3), (2, 2), (2, 1), (2, 0)],
                [(3, 1), (2, 1), (1, 1), (0, 1)],
                [(1, 0), (1, 1), (1, 2), (1, 3)],
            ],
        ),
        (
            PieceKind::Z,
            [
                [(0, 2), (1, 2), (1, 1), (2, 1)],
                [(2, 2), (2, 1), (1, 1), (1, 0)],
                [(2, 0), (1, 0), (1, 1), (0, 1)],
                [(0, 0), (0, 1), (1, 1), (1, 2)],
            ],
        ),
        (
            PieceKind::S,
            [
                [(0, 1), (1, 1), (1, 2), (2, 2)],
                [(1, 2), (1, 1), (2, 1), (2, 0)],
                [(2, 1), (1, 1), (1, 0), (0, 0)],
                [(1, 0), (1, 1), (0, 1), (0, 2)],
            ],
        ),
        (
            PieceKind::L,
            [
                [(0, 1), (1, 1), (2, 1), (2, 2)],
                [(1, 2), (1, 1), (1, 0), (2, 0)],
                [(2, 1), (1, 1), (0, 1), (0, 0)],
                [(1, 0), (1, 1), (1, 2), (0, 2)],
            ],
        ),
        (
            PieceKind::J,
            [
                [(0, 1), (1, 1), (2, 1), (0, 2)],
                [(1, 2), (1, 1), (1, 0), (2, 2)],
                [(2, 1), (1, 1), (0, 1), (2, 0)],
                [(1, 0), (1, 1), (1, 2), (0, 0)],
            ],
        ),
    ];

    #[test]
    fn test_clockwise_bodies() {
        for (kind, bodies) in EXPECTED_BODIES {
            let mut piece = Piece::new(kind);
            for i in 0..5 {
                assert_eq!(piece.body(), &bodies[i % 4], "{kind:?} after {i} turns");
                piece = piece.clockwise();
            }
        }
    }

    #[test]
    fn test_counterclockwise_bodies() {
        for (kind, bodies) in EXPECTED_BODIES {
            let mut piece = Piece::new(kind);
            for i in (1..=4).rev() {
                assert_eq!(piece.body(), &bodies[i % 4], "{kind:?} at step {i}");
                piece = piece.counterclockwise();
            }
        }
    }

    #[test]
    fn test_skirts() {
        const N: Option<i32> = None;
        let expected: [(PieceKind, [&[Option<i32>]; 4]); PieceKind::LEN] = [
            (
                PieceKind::T,
                [
                    &[Some(1), Some(1), Some(1)],
                    &[N, Some(0), Some(1)],
                    &[Some(1), Some(0), Some(1)],
                    &[Some(1), Some(0), N],
                ],
            ),
            (
                PieceKind::O,
                [
                    &[Some(0), Some(0)],
                    &[Some(0), Some(0)],
                    &[Some(0), Some(0)],
                    &[Some(0), Some(0)],
                ],
            ),
            (
                PieceKind::I,
                [
                    &[Some(2), Some(2), Some(2), Some(2)],
                    &[N, N, Some(0), N],
                    &[Some(1), Some(1), Some(1), Some(1)],
                    &[N, Some(0), N, N],
                ],
            ),
            (
                PieceKind::Z,
                [
                    &[Some(2), Some(1), Some(1)],
                    &[N, Some(0), Some(1)],
                    &[Some(1), Some(0), Some(0)],
                    &[Some(0), Some(1), N],
                ],
            ),
            (
                PieceKind::S,
                [
                    &[Some(1), Some(1), Some(2)],
                    &[N, Some(1), Some(0)],
                    &[Some(0), Some(0), Some(1)],
                    &[Some(1), Some(0), N],
                ],
            ),
            (
                PieceKind::L,
                [
                    &[Some(1), Some(1), Some(1)],
                    &[N, Some(0), Some(0)],
                    &[Some(0), Some(1), Some(1)],
                    &[Some(2), Some(0), N],
                ],
            ),
            (
                PieceKind::J,
                [
                    &[Some(1), Some(1), Some(1)],
                    &[N, Some(0), Some(2)],
                    &[Some(1), Some(1), Some(0)],
                    &[Some(0), Some(0), N],
                ],
            ),
        ];

        for (kind, skirts) in expected {
            for (piece, skirt) in Piece::new(kind).rotations().iter().zip(skirts) {
                assert_eq!(piece.skirt(), skirt, "{kind:?} rotation {:?}", piece.rotation());
            }
        }
    }

    #[test]
    fn test_rotation_ring_closes() {
        for kind in PieceKind::ALL {
            let spawn = Piece::new(kind);
            let full_turn = spawn.clockwise().clockwise().clockwise().clockwise();
            assert_eq!(full_turn, spawn);
            assert_eq!(spawn.counterclockwise(), spawn.clockwise().clockwise().clockwise());
            for (i, piece) in spawn.rotations().iter().enumerate() {
                assert_eq!(piece.rotation().index(), i);
                assert_eq!(piece.clockwise().rotation().index(), (i + 1) % 4);
                assert_eq!(piece.counterclockwise().rotation().index(), (i + 3) % 4);
            }
        }
    }

    #[test]
    fn test_equality_is_kind_and_rotation() {
        let first = Piece::new(PieceKind::T);
        let second = Piece::new(PieceKind::T)
            .clockwise()
            .clockwise()
            .clockwise()
            .clockwise();
        assert_eq!(first, second);
        assert_ne!(first, first.clockwise());
        assert_ne!(Piece::new(PieceKind::S), Piece::new(PieceKind::Z));
    }

    #[test]
    fn test_clockwise_steps_to() {
        let zero = PieceRotation::new(0);
        assert_eq!(zero.clockwise_steps_to(PieceRotation::new(1)), 1);
        assert_eq!(zero.clockwise_steps_to(PieceRotation::new(3)), 3);
        assert_eq!(PieceRotation::new(3).clockwise_steps_to(zero), 1);
        assert_eq!(PieceRotation::new(2).clockwise_steps_to(PieceRotation::new(2)), 0);
    }

    #[test]
    fn test_piece_kind_char_conversion() {
        for kind in PieceKind::ALL {
            assert_eq!(PieceKind::from_char(kind.as_char()), Some(kind));
        }
        assert_eq!(PieceKind::from_char('X'), None);
        assert_eq!(PieceKind::from_char('t'), None);
    }
}
