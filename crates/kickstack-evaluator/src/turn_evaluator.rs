//! Turn evaluation: choosing where the current piece goes and how to get it there.
//!
//! [`TurnEvaluator`] sweeps every rotation and column of the falling piece, and of the
//! held piece when a swap is allowed, scoring the board each drop leaves behind. The best
//! pose becomes a [`TurnPlan`], which [`Bot`] expands into primitive [`Action`]s and serves
//! one at a time.
//!
//! Ties are broken by sweep order: falling piece before held piece, rotations `0..4`,
//! then columns ascending. The first maximum wins.

use std::collections::VecDeque;

use arrayvec::ArrayVec;
use kickstack_engine::{
    Action, Board, Piece, PieceKind, PiecePosition, PieceRotation, SPAWN_ROW_OFFSET,
};

use crate::placement_evaluator::PlacementEvaluator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum DecisionError {
    #[display("no piece in play")]
    NoPiece,
    #[display("no valid placement for the piece in play")]
    NoPlacement,
}

/// Extent of the placement sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Columns tried outside the board on each side, so pieces whose bounding box has
    /// empty leading or trailing columns can still reach the walls.
    pub column_margin: i32,
    /// Rows between the top of the board and the row at which candidates must fit.
    pub spawn_row_offset: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            column_margin: 2,
            spawn_row_offset: SPAWN_ROW_OFFSET,
        }
    }
}

/// The chosen pose for the current turn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnPlan {
    use_hold: bool,
    piece: Piece,
    column: i32,
    score: f64,
}

impl TurnPlan {
    /// Returns whether this turn swaps in the held piece first.
    #[must_use]
    pub fn use_hold(&self) -> bool {
        self.use_hold
    }

    /// The piece to place, in its target rotation.
    #[must_use]
    pub fn piece(&self) -> Piece {
        self.piece
    }

    #[must_use]
    pub fn column(&self) -> i32 {
        self.column
    }

    #[must_use]
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Expands the plan into the actions that carry it out from the current state of
    /// `board`.
    ///
    /// Each step closes the rotation gap by one turn (counterclockwise when the target is
    /// three clockwise turns away) and the column gap by one shift, until both match. The
    /// sequence always ends with [`Action::Drop`].
    pub fn actions(&self, board: &Board) -> Result<Vec<Action>, DecisionError> {
        let falling = board.falling_piece().ok_or(DecisionError::NoPiece)?;
        let mut actions = vec![];
        let (mut rotation, mut column) = if self.use_hold {
            actions.push(Action::Hold);
            let spawn = board.spawn_position(Piece::new(self.piece.kind()));
            (PieceRotation::default(), spawn.x())
        } else {
            (falling.piece.rotation(), falling.position.x())
        };

        let target = self.piece.rotation();
        while rotation != target || column != self.column {
            if rotation != target {
                if rotation.clockwise_steps_to(target) == 3 {
                    actions.push(Action::Counterclockwise);
                    rotation = rotation.rotated_left();
                } else {
                    actions.push(Action::Clockwise);
                    rotation = rotation.rotated_right();
                }
            }
            if column < self.column {
                actions.push(Action::Right);
                column += 1;
            } else if column > self.column {
                actions.push(Action::Left);
                column -= 1;
            }
        }
        actions.push(Action::Drop);
        Ok(actions)
    }
}

/// Evaluates and selects the best placement for the current turn.
#[derive(Debug)]
pub struct TurnEvaluator<'a> {
    placement_evaluator: Box<dyn PlacementEvaluator + 'a>,
    config: SearchConfig,
}

impl<'a> TurnEvaluator<'a> {
    #[must_use]
    pub fn new(placement_evaluator: Box<dyn PlacementEvaluator + 'a>) -> Self {
        Self::with_config(placement_evaluator, SearchConfig::default())
    }

    #[must_use]
    pub fn with_config(
        placement_evaluator: Box<dyn PlacementEvaluator + 'a>,
        config: SearchConfig,
    ) -> Self {
        Self {
            placement_evaluator,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> SearchConfig {
        self.config
    }

    /// Selects the best turn for the current board.
    ///
    /// # Errors
    ///
    /// [`DecisionError::NoPiece`] if nothing is in play, [`DecisionError::NoPlacement`] if
    /// no pose fits anywhere.
    pub fn select_best_turn(&self, board: &Board) -> Result<TurnPlan, DecisionError> {
        let falling = board.piece().ok_or(DecisionError::NoPiece)?;
        let mut best: Option<TurnPlan> = None;

        for (use_hold, kind) in available_kinds(board, falling.kind()) {
            for piece in Piece::new(kind).rotations() {
                for column in self.columns(board) {
                    let Some(score) = self.evaluate(board, piece, column) else {
                        continue;
                    };
                    if best.is_none_or(|best| score > best.score) {
                        best = Some(TurnPlan {
                            use_hold,
                            piece,
                            column,
                            score,
                        });
                    }
                }
            }
        }

        best.ok_or(DecisionError::NoPlacement)
    }

    fn columns(&self, board: &Board) -> std::ops::Range<i32> {
        let width = i32::try_from(board.width()).unwrap_or(i32::MAX);
        -self.config.column_margin..width.saturating_add(self.config.column_margin)
    }

    fn evaluate(&self, board: &Board, piece: Piece, column: i32) -> Option<f64> {
        let sweep_row = board.height().checked_sub(self.config.spawn_row_offset)?;
        let sweep_row = i32::try_from(sweep_row).ok()?;
        if board.intersects_at(piece, PiecePosition::new(column, sweep_row)) {
            return None;
        }
        let placed = board.test_placement(piece, column)?;
        Some(self.placement_evaluator.evaluate_placement(&placed))
    }
}

fn available_kinds(board: &Board, falling: PieceKind) -> ArrayVec<(bool, PieceKind), 2> {
    let mut kinds = ArrayVec::new();
    kinds.push((false, falling));
    if !board.hold_used()
        && let Some(held) = board.held_piece()
    {
        let piece = Piece::new(held);
        if !board.intersects_at(piece, board.spawn_position(piece)) {
            kinds.push((true, held));
        }
    }
    kinds
}

/// Plays a board one action at a time.
///
/// A full plan is computed when the queue runs dry, so the search runs once per piece.
///
/// # Example
///
/// ```
/// use kickstack_engine::{GameSession, PieceSeed};
/// use kickstack_evaluator::{
///     placement_evaluator::WeightedPlacementEvaluator,
///     turn_evaluator::{Bot, TurnEvaluator},
/// };
///
/// let mut session = GameSession::new(10, 24, PieceSeed::from_u128(7))?;
/// let mut bot = Bot::new(TurnEvaluator::new(Box::new(WeightedPlacementEvaluator::default())));
/// for _ in 0..200 {
///     let Ok(action) = bot.next_action(session.board()) else {
///         break;
///     };
///     session.apply(action);
/// }
/// assert!(session.stats().completed_pieces() > 0);
/// # Ok::<(), kickstack_engine::BoardSizeError>(())
/// ```
#[derive(Debug)]
pub struct Bot<'a> {
    evaluator: TurnEvaluator<'a>,
    queue: VecDeque<Action>,
}

impl<'a> Bot<'a> {
    #[must_use]
    pub fn new(evaluator: TurnEvaluator<'a>) -> Self {
        Self {
            evaluator,
            queue: VecDeque::new(),
        }
    }

    #[must_use]
    pub fn evaluator(&self) -> &TurnEvaluator<'a> {
        &self.evaluator
    }

    /// Returns the next action for `board`, planning a new turn if none is pending.
    pub fn next_action(&mut self, board: &Board) -> Result<Action, DecisionError> {
        if let Some(action) = self.queue.pop_front() {
            return Ok(action);
        }
        let plan = self.evaluator.select_best_turn(board)?;
        self.queue.extend(plan.actions(board)?);
        self.queue.pop_front().ok_or(DecisionError::NoPlacement)
    }

    /// Actions already planned but not yet served.
    pub fn pending_actions(&self) -> impl Iterator<Item = Action> + '_ {
        self.queue.iter().copied()
    }

    /// Drops any pending actions, e.g. before starting a new game.
    pub fn reset(&mut self) {
        self.queue.clear();
    }
}
