pub use self::{grid::*, kick::RotationDirection, piece::*};

pub(crate) mod grid;
pub(crate) mod kick;
pub(crate) mod piece;
