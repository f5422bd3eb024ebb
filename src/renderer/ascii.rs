//! Character-grid renderer
//!
//! Each cell covers a 10x20 pixel block of the 500x800 playfield and is
//! sampled at its centre.

use std::io::{self, Write};

use super::{Renderer, hud_line};
use crate::consts::*;
use crate::sim::Frame;

pub const CELL_WIDTH: f32 = 10.0;
pub const CELL_HEIGHT: f32 = 20.0;
pub const COLUMNS: usize = (WIN_WIDTH / CELL_WIDTH) as usize;
pub const ROWS: usize = (WIN_HEIGHT / CELL_HEIGHT) as usize;

const BIRD: char = '@';
const PIPE: char = '#';
const GROUND: [char; 2] = ['=', '-'];
const SKY: char = ' ';

/// Writes one grid per frame to `out`, HUD line first
pub struct AsciiRenderer<W: Write> {
    out: W,
}

impl<W: Write> AsciiRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Rasterise a frame into `ROWS` strings of `COLUMNS` characters
pub fn rasterize(frame: &Frame) -> Vec<String> {
    let mut grid = vec![[SKY; COLUMNS]; ROWS];

    for (row, cells) in grid.iter_mut().enumerate() {
        let y = (row as f32 + 0.5) * CELL_HEIGHT;
        for (col, cell) in cells.iter_mut().enumerate() {
            let left = col as f32 * CELL_WIDTH;
            let right = left + CELL_WIDTH;

            if y >= frame.ground.y {
                // Stripes move with the ground's scroll offset
                let stripe = ((left - frame.ground.x1) / (2.0 * CELL_WIDTH)).floor() as i64;
                *cell = GROUND[stripe.rem_euclid(2) as usize];
                continue;
            }

            let in_pipe = frame.pipes.iter().any(|pipe| {
                left < pipe.x + PIPE_WIDTH
                    && right > pipe.x
                    && (y < pipe.height || y >= pipe.bottom)
            });
            if in_pipe {
                *cell = PIPE;
            }
        }
    }

    for (position, _tilt) in &frame.birds {
        let cx = position.x + BIRD_WIDTH as f32 / 2.0;
        let cy = position.y + BIRD_HEIGHT as f32 / 2.0;
        if cx < 0.0 || cy < 0.0 {
            continue;
        }
        let col = (cx / CELL_WIDTH) as usize;
        let row = (cy / CELL_HEIGHT) as usize;
        if row < ROWS && col < COLUMNS {
            grid[row][col] = BIRD;
        }
    }

    grid.iter().map(|cells| cells.iter().collect()).collect()
}

impl<W: Write> Renderer for AsciiRenderer<W> {
    fn render(&mut self, frame: &Frame) -> io::Result<()> {
        writeln!(self.out, "{}", hud_line(frame))?;
        for line in rasterize(frame) {
            writeln!(self.out, "{}", line)?;
        }
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{Controller, Observation};
    use crate::sim::{Episode, Ground, Pipe};

    struct Idle;

    impl Controller for Idle {
        fn decide(&mut self, _observation: &Observation) -> f32 {
            0.0
        }

        fn report_fitness_delta(&mut self, _delta: f32) {}
    }

    fn empty_frame() -> Frame {
        Frame {
            generation: 1,
            score: 0,
            ticks: 0,
            alive: 0,
            birds: Vec::new(),
            pipes: Vec::new(),
            ground: Ground::default(),
        }
    }

    #[test]
    fn test_grid_dimensions() {
        let grid = rasterize(&empty_frame());
        assert_eq!(grid.len(), ROWS);
        assert!(grid.iter().all(|line| line.chars().count() == COLUMNS));
        // Row 36 is centred on the floor at y=730
        assert!(grid[35].chars().all(|c| c == SKY));
        assert!(grid[36].chars().all(|c| GROUND.contains(&c)));
    }

    #[test]
    fn test_pipe_cells() {
        let mut frame = empty_frame();
        frame.pipes.push(Pipe::with_height(1, 100.0, 200.0));
        let grid = rasterize(&frame);
        let cell = |row: usize, col: usize| grid[row].chars().nth(col).unwrap();

        // Columns 10..=20 overlap x in [100, 204)
        assert_eq!(cell(0, 10), PIPE);
        assert_eq!(cell(0, 20), PIPE);
        assert_eq!(cell(0, 9), SKY);
        assert_eq!(cell(0, 21), SKY);
        // Gap spans y in [200, 400)
        assert_eq!(cell(10, 15), SKY);
        assert_eq!(cell(19, 15), SKY);
        assert_eq!(cell(20, 15), PIPE);
        assert_eq!(cell(35, 15), PIPE);
    }

    #[test]
    fn test_episode_frame_to_writer() {
        let mut a = Idle;
        let mut b = Idle;
        let episode = Episode::seeded(
            1,
            [&mut a as &mut dyn Controller, &mut b as &mut dyn Controller],
            5,
        );
        let mut renderer = AsciiRenderer::new(Vec::new());
        renderer.render(&episode.frame()).unwrap();

        let text = String::from_utf8(renderer.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), ROWS + 1);
        assert_eq!(lines[0], "Score: 0  Gen: 1  Alive: 2");
        // Both birds share the cell around (264, 374); the first pipe is still off-grid
        assert_eq!(lines[1 + 18].chars().nth(26), Some(BIRD));
        assert_eq!(text.matches(BIRD).count(), 1);
        assert!(!text.contains(PIPE));
    }
}
