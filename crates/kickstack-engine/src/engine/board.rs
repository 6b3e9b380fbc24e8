use std::{
    fmt::{self, Write as _},
    str::FromStr,
};

use crate::{
    BoardSizeError, GridShapeError, MIN_BOARD_SIZE, PieceCollisionError,
    core::{
        grid::{Cell, Grid, to_i32},
        piece::{Piece, PieceKind, PiecePosition},
    },
};

use super::moves::{self, Action, FallingPiece, Outcome, Transition};

/// Rows between the top of the board and the spawn row.
pub const SPAWN_ROW_OFFSET: usize = 4;

/// The grid plus the piece currently in play.
///
/// All rule enforcement happens in [`Board::apply`], which resolves an [`Action`]
/// against the current state and reports an [`Outcome`]. Probing a move without
/// touching the board is done on a clone via [`Board::test_move`] or
/// [`Board::test_placement`].
///
/// # Example
///
/// ```
/// use kickstack_engine::{Action, Board, Outcome, Piece, PieceKind};
///
/// let mut board = Board::new(10, 24)?;
/// let piece = Piece::new(PieceKind::O);
/// board.next_piece(piece, board.spawn_position(piece))?;
///
/// assert_eq!(board.apply(Action::Left), Outcome::Success);
/// assert_eq!(board.apply(Action::Drop), Outcome::Place);
/// assert_eq!(board.column_height(3), 2);
/// assert!(board.piece().is_none());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Board {
    grid: Grid,
    falling: Option<FallingPiece>,
    held: Option<PieceKind>,
    hold_used: bool,
    score: usize,
    rows_cleared: usize,
    total_rows_cleared: usize,
    last_action: Option<Action>,
    last_outcome: Option<Outcome>,
}

impl Board {
    pub fn new(width: usize, height: usize) -> Result<Self, BoardSizeError> {
        if width < MIN_BOARD_SIZE || height < MIN_BOARD_SIZE {
            return Err(BoardSizeError { width, height });
        }
        Ok(Self {
            grid: Grid::new(width, height),
            falling: None,
            held: None,
            hold_used: false,
            score: 0,
            rows_cleared: 0,
            total_rows_cleared: 0,
            last_action: None,
            last_outcome: None,
        })
    }

    /// Number of columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.grid.width()
    }

    /// Number of rows, including the spawn area at the top.
    #[must_use]
    pub fn height(&self) -> usize {
        self.grid.height()
    }

    /// Locked cells, without the piece in play.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Kind of the locked block at `(x, y)`, or `None` for an empty or out-of-range cell.
    #[must_use]
    pub fn cell(&self, x: i32, y: i32) -> Option<PieceKind> {
        self.grid.cell(x, y)
    }

    /// One past the highest filled row of column `x`; `0` when empty.
    #[must_use]
    pub fn column_height(&self, x: usize) -> usize {
        self.grid.column_height(x)
    }

    /// Number of filled cells in row `y`.
    #[must_use]
    pub fn row_width(&self, y: usize) -> usize {
        self.grid.row_width(y)
    }

    /// Largest column height.
    #[must_use]
    pub fn max_height(&self) -> usize {
        self.grid.max_height()
    }

    /// Rows cleared by the most recent lock.
    #[must_use]
    pub fn rows_cleared(&self) -> usize {
        self.rows_cleared
    }

    /// Rows cleared since the board was created.
    #[must_use]
    pub fn total_rows_cleared(&self) -> usize {
        self.total_rows_cleared
    }

    /// Number of pieces locked so far.
    #[must_use]
    pub fn score(&self) -> usize {
        self.score
    }

    /// Action passed to the latest [`Board::apply`], if any.
    #[must_use]
    pub fn last_action(&self) -> Option<Action> {
        self.last_action
    }

    /// Result of the latest [`Board::apply`], if any.
    #[must_use]
    pub fn last_outcome(&self) -> Option<Outcome> {
        self.last_outcome
    }

    /// The piece in play together with its position.
    #[must_use]
    pub fn falling_piece(&self) -> Option<FallingPiece> {
        self.falling
    }

    /// The piece in play, if any.
    #[must_use]
    pub fn piece(&self) -> Option<Piece> {
        self.falling.map(|falling| falling.piece)
    }

    /// Anchor of the piece in play, if any.
    #[must_use]
    pub fn position(&self) -> Option<PiecePosition> {
        self.falling.map(|falling| falling.position)
    }

    /// Kind stored by hold, if any.
    #[must_use]
    pub fn held_piece(&self) -> Option<PieceKind> {
        self.held
    }

    /// Whether hold has already been used by the piece in play.
    #[must_use]
    pub fn hold_used(&self) -> bool {
        self.hold_used
    }

    /// Spawn anchor for `piece`: horizontally centered, four rows below the top.
    #[must_use]
    pub fn spawn_position(&self, piece: Piece) -> PiecePosition {
        let x = to_i32(self.width() / 2) - piece.width() / 2;
        let y = to_i32(self.height().saturating_sub(SPAWN_ROW_OFFSET));
        PiecePosition::new(x, y)
    }

    /// Returns `true` if `piece` offset by `(dx, dy)` from the falling piece's position
    /// would collide. With nothing in play the offset is taken from the origin.
    #[must_use]
    pub fn intersects(&self, piece: Piece, dx: i32, dy: i32) -> bool {
        let origin = self.position().unwrap_or(PiecePosition::new(0, 0));
        self.intersects_at(piece, origin.offset(dx, dy))
    }

    /// Returns `true` if `piece` anchored at `position` would collide.
    #[must_use]
    pub fn intersects_at(&self, piece: Piece, position: PiecePosition) -> bool {
        self.grid.is_colliding(piece, position)
    }

    /// Puts `piece` in play at `position`.
    ///
    /// If the piece collides there, nothing is left in play and an error is returned;
    /// this is how a top-out is reported.
    pub fn next_piece(
        &mut self,
        piece: Piece,
        position: PiecePosition,
    ) -> Result<(), PieceCollisionError> {
        if self.intersects_at(piece, position) {
            self.falling = None;
            return Err(PieceCollisionError);
        }
        self.falling = Some(FallingPiece::new(piece, position));
        Ok(())
    }

    /// Applies `action` to the falling piece and records it as the last action and outcome.
    pub fn apply(&mut self, action: Action) -> Outcome {
        self.last_action = Some(action);
        let outcome = match (action, self.falling) {
            (Action::Nothing, _) => Outcome::Success,
            (_, None) => Outcome::NoPiece,
            (_, Some(falling)) => {
                let transition = moves::resolve(self, falling, action);
                self.commit(transition)
            }
        };
        self.last_outcome = Some(outcome);
        outcome
    }

    fn commit(&mut self, transition: Transition) -> Outcome {
        match transition {
            Transition::Stay(outcome) => outcome,
            Transition::Reposition(falling) => {
                self.falling = Some(falling);
                Outcome::Success
            }
            Transition::Lock(falling) => {
                self.lock(falling);
                Outcome::Place
            }
            Transition::StoreHold(kind) => {
                self.held = Some(kind);
                self.hold_used = true;
                Outcome::NoPiece
            }
            Transition::SwapHold { incoming, outgoing } => {
                self.held = Some(outgoing);
                self.hold_used = true;
                self.falling = Some(incoming);
                Outcome::Success
            }
        }
    }

    fn lock(&mut self, falling: FallingPiece) {
        self.rows_cleared = 0;
        self.grid.fill_piece(falling.piece, falling.position);
        let lowest_row = usize::try_from(falling.position.y()).unwrap_or(0);
        self.rows_cleared = self.grid.clear_lines(lowest_row);
        self.total_rows_cleared += self.rows_cleared;
        self.hold_used = false;
        self.score += 1;
        self.falling = None;
    }

    /// Applies `action` to a copy of the board, leaving `self` untouched.
    #[must_use]
    pub fn test_move(&self, action: Action) -> Self {
        let mut board = self.clone();
        board.apply(action);
        board
    }

    /// Drops `piece` at `column` on a copy of the board, starting from the falling
    /// piece's current row.
    ///
    /// Returns `None` if nothing is in play or `piece` does not fit there.
    #[must_use]
    pub fn test_placement(&self, piece: Piece, column: i32) -> Option<Self> {
        let position = PiecePosition::new(column, self.position()?.y());
        if self.intersects_at(piece, position) {
            return None;
        }
        let mut board = self.clone();
        board.falling = Some(FallingPiece::new(piece, position));
        board.apply(Action::Drop);
        Some(board)
    }

    /// Row `piece` lands on when dropped from above at column `x`.
    ///
    /// `None` if none of the piece's columns fall inside the board.
    #[must_use]
    pub fn drop_height(&self, piece: Piece, x: i32) -> Option<i32> {
        self.grid.landing_row(piece, x)
    }

    /// Replaces the locked cells with `rows` (indexed `rows[y][x]`), rebuilding column
    /// heights, row widths and the max height.
    pub fn set_grid(&mut self, rows: &[Vec<Cell>]) -> Result<(), GridShapeError> {
        self.grid = Grid::from_rows(self.width(), self.height(), rows)?;
        Ok(())
    }
}

impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.width() == other.width()
            && self.height() == other.height()
            && self.rows_cleared == other.rows_cleared
            && self.falling == other.falling
            && self.grid == other.grid
    }
}

impl Eq for Board {}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..self.height()).rev() {
            for cell in self.grid.row(y) {
                f.write_char(cell.map_or('.', PieceKind::as_char))?;
            }
            f.write_char('\n')?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseBoardError {
    #[display("{_0}")]
    Size(BoardSizeError),
    #[display("{_0}")]
    Shape(GridShapeError),
    #[display("unknown cell {cell:?} in row {row}")]
    UnknownCell { row: usize, cell: char },
}

/// Parses the [`Display`](fmt::Display) form: one line per row, top row first.
impl FromStr for Board {
    type Err = ParseBoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>();
        let height = lines.len();
        let width = lines.first().map_or(0, |line| line.chars().count());
        let mut board = Board::new(width, height).map_err(ParseBoardError::Size)?;

        let mut rows = Vec::with_capacity(height);
        for (row, line) in lines.iter().rev().enumerate() {
            let cells = line
                .chars()
                .map(|cell| match cell {
                    '.' => Ok(None),
                    _ => PieceKind::from_char(cell)
                        .map(Some)
                        .ok_or(ParseBoardError::UnknownCell { row, cell }),
                })
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(cells);
        }
        board.set_grid(&rows).map_err(ParseBoardError::Shape)?;
        Ok(board)
    }
}
