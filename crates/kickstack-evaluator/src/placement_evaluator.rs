//! Placement evaluation: scoring the board left behind by a single placement.
//!
//! The [`WeightedPlacementEvaluator`] computes a linear combination of the raw
//! [`BoardFeatures`](crate::board_feature::BoardFeatures):
//!
//! ```text
//! score = w₁·f₁ + w₂·f₂ + ... + w₉·f₉
//! ```
//!
//! Boards stacked into the spawn area are rejected outright with [`REJECTED_PLACEMENT`],
//! whatever the weights say.
//!
//! # Usage
//!
//! ```rust
//! use kickstack_engine::Board;
//! use kickstack_evaluator::placement_evaluator::{
//!     PlacementEvaluator, WeightedPlacementEvaluator,
//! };
//!
//! let board = Board::new(10, 24).unwrap();
//! let evaluator = WeightedPlacementEvaluator::default();
//! assert_eq!(evaluator.evaluate_placement(&board), 0.0);
//! ```

use std::fmt;

use kickstack_engine::{Board, SPAWN_ROW_OFFSET};

use crate::board_feature::{BoardFeatures, Weights};

/// Score of a placement that reaches into the spawn area.
pub const REJECTED_PLACEMENT: f64 = -100_000.0;

/// Weights found by a long training run on a 10x24 board.
pub const TRAINED_WEIGHTS: Weights = [
    -3.079_854_632_964_414,
    -7.449_884_706_642_696,
    -16.621_658_868_519_31,
    -2.167_463_342_883_742_4,
    -0.547_445_515_319_613_6,
    -1.140_206_950_357_030_5,
    -4.785_714_211_938_663_5,
    -0.363_426_770_922_586_85,
    -7.136_217_177_275_804,
];

/// Evaluates piece placements by assigning scores.
pub trait PlacementEvaluator: fmt::Debug + Send + Sync {
    /// Scores `board` as it stands after a placement (higher is better).
    fn evaluate_placement(&self, board: &Board) -> f64;
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeightedPlacementEvaluator {
    weights: Weights,
}

impl Default for WeightedPlacementEvaluator {
    fn default() -> Self {
        Self::new(TRAINED_WEIGHTS)
    }
}

impl WeightedPlacementEvaluator {
    #[must_use]
    pub const fn new(weights: Weights) -> Self {
        Self { weights }
    }

    #[must_use]
    pub fn weights(&self) -> &Weights {
        &self.weights
    }
}

impl PlacementEvaluator for WeightedPlacementEvaluator {
    fn evaluate_placement(&self, board: &Board) -> f64 {
        if board.max_height() + SPAWN_ROW_OFFSET > board.height() {
            return REJECTED_PLACEMENT;
        }
        BoardFeatures::from_board(board).dot(&self.weights)
    }
}
