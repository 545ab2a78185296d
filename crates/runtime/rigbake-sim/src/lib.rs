//! rigbake-sim: a small interpreter for the command IR emitted by `rigbake-core`.
//!
//! It models just enough of the target runtime to run generated playback logic: entities with
//! tags, passengers and structured data; scoreboard objectives; function calls; and `execute`
//! with score, entity, `as`, `on passengers` and `store` clauses. Positions are not simulated.

pub mod entity;
pub mod error;
pub mod world;

pub use entity::{Entity, EntityId};
pub use error::{Result, SimError};
pub use world::{RawOutput, World, DEFAULT_MAX_DEPTH};
