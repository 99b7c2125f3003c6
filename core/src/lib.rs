//! Game-state engine for a grid mine-clearing game.
//!
//! The crate owns the minefield grid, the per-cell and per-mine state
//! machines, click resolution (reveal cascades, the mark budget, the
//! special-mine disarm sweep), the match lifecycle with its countdown, and
//! the validated scenario configuration format. Rendering and input handling
//! are external: they read the projections exposed here and feed actions
//! back through [`Match`] or [`Minefield`].

pub use cell::*;
pub use clock::*;
pub use error::*;
pub use game::*;
pub use history::*;
pub use mine::*;
pub use minefield::*;
pub use scenario::*;
pub use solution::*;
pub use types::*;

mod cell;
mod clock;
mod error;
mod game;
mod history;
mod mine;
mod minefield;
mod scenario;
mod solution;
mod types;
