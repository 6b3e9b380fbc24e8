//! Move selection for the falling-block engine.
//!
//! The evaluator works in three layers:
//!
//! 1. **Placement evaluation** ([`placement_evaluator`]) scores the board left behind by a
//!    single placement as a weighted sum of nine [`board_feature`]s.
//! 2. **Turn evaluation** ([`turn_evaluator`]) sweeps every rotation and column of the piece
//!    in play, and of the held piece when hold is available, and picks the best placement.
//!    The [`Bot`](turn_evaluator::Bot) turns that choice into a queue of primitive actions.
//! 3. **Session evaluation** ([`session_evaluator`]) lets a bot play whole games and reports
//!    how many pieces it placed and rows it cleared, which training uses as fitness.
//!
//! ```text
//! Session evaluation (fitness for training)
//!     ↓ uses
//! Turn evaluation (select best placement)
//!     ↓ uses
//! Placement evaluation (score single placement)
//! ```

pub mod board_feature;
pub mod placement_evaluator;
pub mod session_evaluator;
pub mod turn_evaluator;
