use crate::GridShapeError;

use super::piece::{Piece, PiecePosition};

/// A single cell: `None` when empty, otherwise the kind of the piece that filled it.
pub type Cell = Option<super::piece::PieceKind>;

/// Locked cells of a board, with per-column heights and per-row widths kept in sync.
///
/// Row `0` is the floor and `y` grows upward. Column heights are counts: `0` means the
/// column is empty, otherwise the topmost occupied row plus one.
///
/// Heights and widths are maintained incrementally as pieces are filled in; column
/// heights are only rescanned after lines are cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    rows: Vec<Vec<Cell>>,
    column_heights: Vec<usize>,
    row_widths: Vec<usize>,
    max_height: usize,
}

impl Grid {
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            rows: vec![vec![None; width]; height],
            column_heights: vec![0; width],
            row_widths: vec![0; height],
            max_height: 0,
        }
    }

    /// Builds a grid from rows indexed `rows[y][x]`, deriving heights and widths.
    pub fn from_rows(
        width: usize,
        height: usize,
        rows: &[Vec<Cell>],
    ) -> Result<Self, GridShapeError> {
        if rows.len() != height || rows.iter().any(|row| row.len() != width) {
            return Err(GridShapeError { width, height });
        }
        let mut grid = Self::new(width, height);
        grid.rows = rows.to_vec();
        for (y, row) in grid.rows.iter().enumerate() {
            grid.row_widths[y] = row.iter().filter(|cell| cell.is_some()).count();
            for (x, cell) in row.iter().enumerate() {
                if cell.is_some() {
                    grid.column_heights[x] = y + 1;
                }
            }
        }
        grid.max_height = grid.column_heights.iter().copied().max().unwrap_or(0);
        Ok(grid)
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Cell at `(x, y)`, or `None` when empty or outside the grid.
    #[must_use]
    pub fn cell(&self, x: i32, y: i32) -> Cell {
        self.index(x, y).and_then(|(x, y)| self.rows[y][x])
    }

    #[must_use]
    pub fn is_filled(&self, x: usize, y: usize) -> bool {
        self.rows[y][x].is_some()
    }

    #[must_use]
    pub fn row(&self, y: usize) -> &[Cell] {
        &self.rows[y]
    }

    #[must_use]
    pub fn column_height(&self, x: usize) -> usize {
        self.column_heights[x]
    }

    #[must_use]
    pub fn column_heights(&self) -> &[usize] {
        &self.column_heights
    }

    #[must_use]
    pub fn row_width(&self, y: usize) -> usize {
        self.row_widths[y]
    }

    #[must_use]
    pub fn row_widths(&self) -> &[usize] {
        &self.row_widths
    }

    #[must_use]
    pub fn max_height(&self) -> usize {
        self.max_height
    }

    fn index(&self, x: i32, y: i32) -> Option<(usize, usize)> {
        let x = usize::try_from(x).ok().filter(|&x| x < self.width)?;
        let y = usize::try_from(y).ok().filter(|&y| y < self.height)?;
        Some((x, y))
    }

    /// Returns `true` if any cell of `piece` anchored at `position` lies outside the
    /// grid or on an occupied cell.
    #[must_use]
    pub fn is_colliding(&self, piece: Piece, position: PiecePosition) -> bool {
        piece.body().iter().any(|&(dx, dy)| {
            self.index(position.x() + dx, position.y() + dy)
                .is_none_or(|(x, y)| self.rows[y][x].is_some())
        })
    }

    /// Writes the cells of `piece` anchored at `position` into the grid.
    ///
    /// The caller must ensure the piece does not collide.
    pub fn fill_piece(&mut self, piece: Piece, position: PiecePosition) {
        for &(dx, dy) in piece.body() {
            let Some((x, y)) = self.index(position.x() + dx, position.y() + dy) else {
                continue;
            };
            self.rows[y][x] = Some(piece.kind());
            self.row_widths[y] += 1;
            self.column_heights[x] = self.column_heights[x].max(y + 1);
            self.max_height = self.max_height.max(y + 1);
        }
    }

    /// Removes full rows at or above `from_row`, shifting the remaining rows down.
    ///
    /// Returns the number of rows removed.
    pub fn clear_lines(&mut self, from_row: usize) -> usize {
        let mut write = from_row;
        let mut cleared = 0;
        for read in from_row..self.height {
            if self.row_widths[read] == self.width {
                cleared += 1;
                continue;
            }
            if write != read {
                self.rows.swap(write, read);
                self.row_widths.swap(write, read);
            }
            write += 1;
        }
        if cleared == 0 {
            return 0;
        }

        for y in write..self.height {
            self.rows[y].fill(None);
            self.row_widths[y] = 0;
        }
        for x in 0..self.width {
            let mut height = self.column_heights[x];
            while height > 0 && self.rows[height - 1][x].is_none() {
                height -= 1;
            }
            self.column_heights[x] = height;
        }
        self.max_height = self.column_heights.iter().copied().max().unwrap_or(0);
        cleared
    }

    /// Distance `piece` anchored at `position` can fall before resting on a filled
    /// cell or the floor.
    #[must_use]
    pub fn drop_distance(&self, piece: Piece, position: PiecePosition) -> i32 {
        piece
            .skirt()
            .iter()
            .zip(position.x()..)
            .filter_map(|(skirt, x)| {
                let bottom = position.y() + (*skirt)?;
                let x = usize::try_from(x).ok().filter(|&x| x < self.width)?;
                let top = (0..bottom)
                    .rev()
                    .find(|&y| usize::try_from(y).is_ok_and(|y| self.rows[y][x].is_some()))
                    .map_or(0, |y| y + 1);
                Some(bottom - top)
            })
            .min()
            .unwrap_or(0)
    }

    /// Row at which `piece` comes to rest when dropped from above at column `x`.
    ///
    /// Only skirted columns inside the grid take part; `None` if there are none.
    #[must_use]
    pub fn landing_row(&self, piece: Piece, x: i32) -> Option<i32> {
        piece
            .skirt()
            .iter()
            .zip(x..)
            .filter_map(|(skirt, column)| {
                let skirt = (*skirt)?;
                let column = usize::try_from(column).ok().filter(|&c| c < self.width)?;
                Some(to_i32(self.column_heights[column]) - skirt)
            })
            .max()
    }
}

#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub(crate) fn to_i32(n: usize) -> i32 {
    n as i32
}
