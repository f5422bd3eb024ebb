//! Collision detection between birds, pipes and the playfield edges
//!
//! Pipe hits are pixel-exact: the bird's rotated sprite mask is compared
//! against both pipe masks, so clipping the transparent corner of a sprite
//! box is not a death.

use glam::IVec2;

use super::mask::Mask;
use super::sprite::SpriteSet;
use super::state::{Agent, Pipe};
use crate::consts::*;

/// True if the bird's sprite shares a pixel with either half of the pipe
pub fn collides(agent: &Agent, pipe: &Pipe, sprites: &SpriteSet) -> bool {
    let (bird, origin) = sprites.bird_footprint(agent);
    collides_with_footprint(&bird, origin, pipe, sprites)
}

/// Same as [`collides`] with a footprint computed once per tick
pub fn collides_with_footprint(
    bird: &Mask,
    bird_origin: IVec2,
    pipe: &Pipe,
    sprites: &SpriteSet,
) -> bool {
    let (top_origin, bottom_origin) = sprites.pipe_origins(pipe);

    let top_point = bird.overlap(&sprites.pipe_top, top_origin - bird_origin);
    let bottom_point = bird.overlap(&sprites.pipe_bottom, bottom_origin - bird_origin);

    top_point.is_some() || bottom_point.is_some()
}

/// True if the bird has reached the ground or flown above the playfield
pub fn out_of_bounds(agent: &Agent) -> bool {
    agent.y + BIRD_HEIGHT as f32 >= FLOOR_Y || agent.y < 0.0
}
