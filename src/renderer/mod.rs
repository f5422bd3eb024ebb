//! Frame consumers
//!
//! Renderers only ever see a [`Frame`] snapshot; they never touch episode state.

pub mod ascii;

use std::io;

use crate::sim::Frame;

pub use ascii::AsciiRenderer;

/// Something that presents episode frames
pub trait Renderer {
    fn render(&mut self, frame: &Frame) -> io::Result<()>;
}

/// Score/generation/population line shown above the playfield
pub fn hud_line(frame: &Frame) -> String {
    format!(
        "Score: {}  Gen: {}  Alive: {}",
        frame.score, frame.generation, frame.alive
    )
}

/// Logs the HUD line whenever it changes
#[derive(Debug, Default)]
pub struct HudLogger {
    last: Option<(u32, u64, usize)>,
    /// HUD lines written so far
    pub emitted: usize,
}

impl HudLogger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for HudLogger {
    fn render(&mut self, frame: &Frame) -> io::Result<()> {
        let key = (frame.generation, frame.score, frame.alive);
        if self.last != Some(key) {
            self.last = Some(key);
            self.emitted += 1;
            log::info!("{}", hud_line(frame));
        }
        Ok(())
    }
}

/// Renders nothing
#[derive(Debug, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _frame: &Frame) -> io::Result<()> {
        Ok(())
    }
}
