//! Board features measured after a placement.
//!
//! Every feature is a non-negative count or measurement over the columns of the board and
//! the rows below its max height. Most of them grow as the board gets worse, so trained
//! weights for them are negative.
//!
//! | id                   | measures                                                   |
//! |----------------------|------------------------------------------------------------|
//! | `max_height_diff`    | gap between the tallest and the lowest column              |
//! | `pillars`            | depth of columns at least 3 lower than their neighbors     |
//! | `holes`              | empty cells below their column's height                    |
//! | `covered_holes`      | filled cells above the first gap in each column            |
//! | `bumpiness`          | sum of height differences between adjacent columns         |
//! | `rows_cleared`       | rows cleared by the placement                              |
//! | `row_transitions`    | filled/empty boundaries within rows                        |
//! | `max_height`         | height of the tallest column                               |
//! | `column_transitions` | filled/empty boundaries within columns                     |

use kickstack_engine::Board;
use serde::{Deserialize, Serialize};

/// Number of features, and so the length of a weight vector.
pub const FEATURE_COUNT: usize = 9;

/// One weight per [`BoardFeature`], in [`BoardFeature::ALL`] order.
pub type Weights = [f64; FEATURE_COUNT];

/// Columns at least this much lower than their neighbors count as pillars.
const PILLAR_DEPTH: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardFeature {
    MaxHeightDiff,
    Pillars,
    Holes,
    CoveredHoles,
    Bumpiness,
    RowsCleared,
    RowTransitions,
    MaxHeight,
    ColumnTransitions,
}

impl BoardFeature {
    pub const ALL: [Self; FEATURE_COUNT] = [
        BoardFeature::MaxHeightDiff,
        BoardFeature::Pillars,
        BoardFeature::Holes,
        BoardFeature::CoveredHoles,
        BoardFeature::Bumpiness,
        BoardFeature::RowsCleared,
        BoardFeature::RowTransitions,
        BoardFeature::MaxHeight,
        BoardFeature::ColumnTransitions,
    ];

    /// Position of this feature in a feature or weight vector.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            BoardFeature::MaxHeightDiff => "max_height_diff",
            BoardFeature::Pillars => "pillars",
            BoardFeature::Holes => "holes",
            BoardFeature::CoveredHoles => "covered_holes",
            BoardFeature::Bumpiness => "bumpiness",
            BoardFeature::RowsCleared => "rows_cleared",
            BoardFeature::RowTransitions => "row_transitions",
            BoardFeature::MaxHeight => "max_height",
            BoardFeature::ColumnTransitions => "column_transitions",
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            BoardFeature::MaxHeightDiff => "Max Height Difference",
            BoardFeature::Pillars => "Pillars",
            BoardFeature::Holes => "Holes",
            BoardFeature::CoveredHoles => "Covered Holes",
            BoardFeature::Bumpiness => "Bumpiness",
            BoardFeature::RowsCleared => "Rows Cleared",
            BoardFeature::RowTransitions => "Row Transitions",
            BoardFeature::MaxHeight => "Max Height",
            BoardFeature::ColumnTransitions => "Column Transitions",
        }
    }

    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|feature| feature.id() == id)
    }
}

/// Feature vector of a board, indexed by [`BoardFeature::index`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardFeatures([f64; FEATURE_COUNT]);

impl BoardFeatures {
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn from_board(board: &Board) -> Self {
        Self(raw_features(board).map(|raw| raw as f64))
    }

    #[must_use]
    pub fn get(&self, feature: BoardFeature) -> f64 {
        self.0[feature.index()]
    }

    #[must_use]
    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    /// Weighted sum of the features.
    #[must_use]
    pub fn dot(&self, weights: &Weights) -> f64 {
        self.0.iter().zip(weights).map(|(value, weight)| value * weight).sum()
    }
}

fn raw_features(board: &Board) -> [usize; FEATURE_COUNT] {
    let grid = board.grid();
    let width = board.width();
    let heights = grid.column_heights();
    let max_height = grid.max_height();
    let scan_height = max_height.min(board.height());

    let mut raw = [0; FEATURE_COUNT];
    raw[BoardFeature::MaxHeightDiff.index()] =
        heights.iter().map(|&h| max_height - h).max().unwrap_or(0);
    raw[BoardFeature::Pillars.index()] = pillar_depth(heights);
    raw[BoardFeature::Bumpiness.index()] = heights.windows(2).map(|w| w[0].abs_diff(w[1])).sum();
    raw[BoardFeature::RowsCleared.index()] = board.rows_cleared();
    raw[BoardFeature::MaxHeight.index()] = max_height;

    for x in 0..width {
        let mut seen_gap = false;
        for y in 0..scan_height {
            let filled = grid.is_filled(x, y);
            if filled {
                if seen_gap {
                    raw[BoardFeature::CoveredHoles.index()] += 1;
                }
            } else {
                seen_gap = true;
                if y < heights[x] {
                    raw[BoardFeature::Holes.index()] += 1;
                }
            }
            if x + 1 < width && filled != grid.is_filled(x + 1, y) {
                raw[BoardFeature::RowTransitions.index()] += 1;
            }
            if y + 1 < heights[x] && filled != grid.is_filled(x, y + 1) {
                raw[BoardFeature::ColumnTransitions.index()] += 1;
            }
        }
    }
    raw
}

/// Sum of pillar depths.
///
/// An interior column is a pillar when both neighbors are at least [`PILLAR_DEPTH`] higher,
/// and counts the depth below the lower neighbor. The edge columns compare against their
/// single neighbor.
fn pillar_depth(heights: &[usize]) -> usize {
    let edge = |neighbor: usize, column: usize| {
        if neighbor >= column + PILLAR_DEPTH {
            neighbor - column
        } else {
            0
        }
    };
    let interior = heights
        .windows(3)
        .filter(|w| w[0] >= w[1] + PILLAR_DEPTH && w[2] >= w[1] + PILLAR_DEPTH)
        .map(|w| w[0].min(w[2]) - w[1])
        .sum::<usize>();
    let edges = match heights {
        [first, second, .., second_last, last] => {
            edge(*second, *first) + edge(*second_last, *last)
        }
        _ => 0,
    };
    interior + edges
}
