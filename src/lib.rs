//! Flappy Evo - a side-scrolling pipe gauntlet used as a fitness environment
//!
//! Core modules:
//! - `sim`: Deterministic simulation (bird physics, pipes, pixel collision, tick engine)
//! - `controller`: The pilot capability the engine polls every tick
//! - `pilot`: Concrete pilots (hand-coded heuristic, feed-forward network)
//! - `evolve`: Population of network pilots and their selection/mutation
//! - `renderer`: Frame consumers (HUD log, ASCII grid)
//! - `runner`: Tick pacing, stop signal and the generation loop
//! - `settings`: Run configuration loaded from JSON
//! - `stats`: Leaderboard of generation results

pub mod controller;
pub mod evolve;
pub mod pilot;
pub mod renderer;
pub mod runner;
pub mod settings;
pub mod sim;
pub mod stats;

pub use controller::{Controller, Observation};
pub use settings::{RenderMode, RunSettings, SettingsError};
pub use stats::Leaderboard;

/// Game configuration constants
pub mod consts {
    /// Reference tick rate (ticks per second)
    pub const TICK_RATE: u32 = 30;

    /// Playfield dimensions (pixels)
    pub const WIN_WIDTH: f32 = 500.0;
    pub const WIN_HEIGHT: f32 = 800.0;

    /// Bird sprite (scaled 2x) and spawn lane
    pub const BIRD_WIDTH: u32 = 68;
    pub const BIRD_HEIGHT: u32 = 48;
    pub const BIRD_START_X: f32 = 230.0;
    pub const BIRD_START_Y: f32 = 350.0;

    /// Velocity set by a jump (negative is up)
    pub const JUMP_VELOCITY: f32 = -10.5;
    /// Constant downward acceleration per tick²
    pub const GRAVITY: f32 = 3.0;
    /// Maximum downward displacement per tick
    pub const TERMINAL_DISPLACEMENT: f32 = 16.0;
    /// Extra lift applied while rising
    pub const RISE_BOOST: f32 = 2.0;

    /// Tilt limits and decay (degrees)
    pub const MAX_TILT: f32 = 25.0;
    pub const MIN_TILT: f32 = -90.0;
    pub const TILT_RATE: f32 = 20.0;
    /// Bird keeps its nose up until it sinks this far below its last jump
    pub const TILT_MARGIN: f32 = 50.0;

    /// Pipe sprite (scaled 2x)
    pub const PIPE_WIDTH: f32 = 104.0;
    pub const PIPE_HEIGHT: f32 = 640.0;
    /// Rows of the lip at the open end of a pipe
    pub const PIPE_CAP_HEIGHT: u32 = 40;
    /// Columns the pipe body is inset from the lip on each side
    pub const PIPE_BODY_INSET: u32 = 4;
    /// Vertical opening between the top and bottom pipe
    pub const PIPE_GAP: f32 = 200.0;
    /// Horizontal scroll per tick (pipes and ground)
    pub const SCROLL_VELOCITY: f32 = 5.0;
    /// X coordinate new pipes spawn at
    pub const PIPE_SPAWN_X: f32 = 700.0;
    /// Half-open range the gap anchor is drawn from
    pub const PIPE_GAP_Y_MIN: i32 = 50;
    pub const PIPE_GAP_Y_MAX: i32 = 450;

    /// Ground band
    pub const FLOOR_Y: f32 = 730.0;
    pub const GROUND_WIDTH: f32 = 672.0;

    /// Controller output above this means "jump"
    pub const JUMP_THRESHOLD: f32 = 0.5;

    /// Fitness deltas reported to controllers
    pub const SURVIVAL_REWARD: f32 = 0.1;
    pub const COLLISION_PENALTY: f32 = -1.0;
    pub const PASS_REWARD: f32 = 5.0;

    const _: () = assert!(PIPE_GAP_Y_MIN < PIPE_GAP_Y_MAX, "pipe gap range must not be empty");
}
