//! Game rules and state.
//!
//! - [`Board`] - the grid and the piece in play; resolves every [`Action`]
//! - [`PieceBuffer`] - 7-bag piece supply, seeded by [`PieceSeed`]
//! - [`GameSession`] - a board fed by a piece buffer, with [`GameStats`]
//!
//! A game proceeds by spawning a piece, applying actions until one reports
//! [`Outcome::Place`], and spawning the next piece. A spawn that collides ends the game.

pub use self::{board::*, game_stats::*, moves::*, piece_buffer::*, session::*};

mod board;
mod game_stats;
mod moves;
mod piece_buffer;
mod session;
