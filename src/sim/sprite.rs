//! Sprite footprints used for collision
//!
//! No images are loaded: the bird is an ellipse filling its sprite box and a
//! pipe is a body with a wider lip at its open end, matching the silhouettes
//! of the 2x-scaled game art.

use std::sync::OnceLock;

use glam::IVec2;

use super::mask::Mask;
use super::state::{Agent, Pipe};
use crate::consts::*;

/// Collision masks for every sprite in the game
#[derive(Debug, Clone)]
pub struct SpriteSet {
    pub bird: Mask,
    /// Pipe hanging from the ceiling (lip at the bottom)
    pub pipe_top: Mask,
    /// Pipe standing on the ground (lip at the top)
    pub pipe_bottom: Mask,
}

impl SpriteSet {
    pub fn new() -> Self {
        let pipe_bottom = pipe_mask();
        Self {
            bird: bird_mask(),
            pipe_top: pipe_bottom.flipped_vertical(),
            pipe_bottom,
        }
    }

    /// Process-wide masks, built on first use
    pub fn shared() -> &'static SpriteSet {
        static SPRITES: OnceLock<SpriteSet> = OnceLock::new();
        SPRITES.get_or_init(SpriteSet::new)
    }

    /// Rotated bird mask and its top-left position on screen.
    ///
    /// The rotated sprite keeps the centre of the upright sprite anchored at
    /// `(round(x), round(y))`.
    pub fn bird_footprint(&self, agent: &Agent) -> (Mask, IVec2) {
        let anchor = agent.pixel_origin();
        let mask = self.bird.rotated(agent.tilt);
        let center = anchor + self.bird.size() / 2;
        let origin = center - mask.size() / 2;
        (mask, origin)
    }

    /// Top-left screen positions of the top and bottom pipe sprites
    pub fn pipe_origins(&self, pipe: &Pipe) -> (IVec2, IVec2) {
        let x = pipe.x.round() as i32;
        (
            IVec2::new(x, pipe.top.round() as i32),
            IVec2::new(x, pipe.bottom.round() as i32),
        )
    }
}

impl Default for SpriteSet {
    fn default() -> Self {
        Self::new()
    }
}

fn bird_mask() -> Mask {
    let (rx, ry) = (BIRD_WIDTH as f32 / 2.0, BIRD_HEIGHT as f32 / 2.0);
    Mask::from_fn(BIRD_WIDTH, BIRD_HEIGHT, |x, y| {
        let dx = (x as f32 + 0.5 - rx) / rx;
        let dy = (y as f32 + 0.5 - ry) / ry;
        dx * dx + dy * dy <= 1.0
    })
}

fn pipe_mask() -> Mask {
    let width = PIPE_WIDTH as u32;
    Mask::from_fn(width, PIPE_HEIGHT as u32, |x, y| {
        y < PIPE_CAP_HEIGHT || (x >= PIPE_BODY_INSET && x < width - PIPE_BODY_INSET)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bird_mask_corners_empty() {
        let sprites = SpriteSet::new();
        let bird = &sprites.bird;
        assert_eq!(bird.width(), BIRD_WIDTH);
        assert_eq!(bird.height(), BIRD_HEIGHT);
        assert!(!bird.get(0, 0));
        assert!(!bird.get(BIRD_WIDTH as i32 - 1, BIRD_HEIGHT as i32 - 1));
        // Middle of the bottom row is solid
        assert!(bird.get(BIRD_WIDTH as i32 / 2, BIRD_HEIGHT as i32 - 1));
    }

    #[test]
    fn test_pipe_lips_face_the_gap() {
        let sprites = SpriteSet::new();
        let last_row = PIPE_HEIGHT as i32 - 1;
        // Bottom pipe: lip is the first rows
        assert!(sprites.pipe_bottom.get(0, 0));
        assert!(!sprites.pipe_bottom.get(0, last_row));
        // Top pipe: lip is the last rows
        assert!(sprites.pipe_top.get(0, last_row));
        assert!(!sprites.pipe_top.get(0, 0));
    }

    #[test]
    fn test_level_footprint_matches_sprite_box() {
        let sprites = SpriteSet::new();
        let agent = Agent::new(1, 230.0, 350.4);
        let (mask, origin) = sprites.bird_footprint(&agent);
        assert_eq!(mask, sprites.bird);
        assert_eq!(origin, IVec2::new(230, 350));
    }

    #[test]
    fn test_tilted_footprint_stays_centred() {
        let sprites = SpriteSet::new();
        let mut agent = Agent::new(1, 230.0, 350.0);
        agent.tilt = MAX_TILT;
        let (mask, origin) = sprites.bird_footprint(&agent);
        let center = origin + mask.size() / 2;
        let upright_center = IVec2::new(230, 350) + sprites.bird.size() / 2;
        assert!((center - upright_center).abs().max_element() <= 1);
    }
}
