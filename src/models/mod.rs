//! Core data models for the league engine.

mod match_record;
mod matrix;
mod player;
mod raw_row;
mod snapshot;
mod standings;

pub use match_record::*;
pub use matrix::*;
pub use player::*;
pub use raw_row::*;
pub use snapshot::*;
pub use standings::*;
