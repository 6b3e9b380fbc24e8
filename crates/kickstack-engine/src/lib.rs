pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Smallest board width and height accepted by [`Board::new`].
pub const MIN_BOARD_SIZE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("board must be at least 4x4, got {width}x{height}")]
pub struct BoardSizeError {
    pub width: usize,
    pub height: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("piece colliding when setting falling piece")]
pub struct PieceCollisionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("grid shape does not match the {width}x{height} board")]
pub struct GridShapeError {
    pub width: usize,
    pub height: usize,
}
