//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (population order, pipes by spawn)
//! - No rendering or platform dependencies

pub mod collision;
pub mod mask;
pub mod sprite;
pub mod state;
pub mod tick;

pub use collision::{collides, out_of_bounds};
pub use mask::Mask;
pub use sprite::SpriteSet;
pub use state::{
    Agent, Episode, EpisodePhase, Frame, Ground, Pipe, RunContext, TickEvent, displacement,
};
pub use tick::{lookahead_index, observe, tick};
