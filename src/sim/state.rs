//! Episode state and core simulation types
//!
//! An episode owns every bird and pipe for one evaluation of a population.
//! Controllers are borrowed for the episode's lifetime and travel with their
//! bird, so a bird can never be dropped without its controller or vice versa.

use glam::{IVec2, Vec2};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::controller::Controller;

/// Lifecycle of an episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodePhase {
    /// At least one bird is still flying
    Running,
    /// Every bird is gone; further ticks do nothing
    Terminal,
}

/// Something that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TickEvent {
    /// Bird touched a pipe (fitness penalty applied)
    Collided { agent: u32, pipe: u32 },
    /// Bird left the playfield through the ground or the ceiling
    OutOfBounds { agent: u32 },
    /// A pipe was passed; `score` is the new score
    Passed { pipe: u32, score: u64 },
    PipeSpawned { pipe: u32 },
    PipeRetired { pipe: u32 },
    /// No birds left
    EpisodeOver,
}

/// Displacement for the `ticks`-th tick after a jump at velocity `vel`.
///
/// `vel*t + 0.5*g*t²`, clamped to the terminal displacement, with an extra
/// lift while rising.
pub fn displacement(vel: f32, ticks: u32) -> f32 {
    let t = ticks as f32;
    let mut d = vel * t + 0.5 * GRAVITY * t * t;
    if d >= TERMINAL_DISPLACEMENT {
        d = TERMINAL_DISPLACEMENT;
    }
    if d < 0.0 {
        d -= RISE_BOOST;
    }
    d
}

/// A bird
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: u32,
    /// Horizontal lane (never changes)
    pub x: f32,
    pub y: f32,
    /// Velocity set by the last jump
    pub vel: f32,
    /// Nose angle in degrees (positive is up)
    pub tilt: f32,
    /// Ticks since the last jump
    pub tick_count: u32,
    /// Height at the last jump, used for tilt
    pub height: f32,
    pub alive: bool,
    /// Sum of every fitness delta reported to this bird's controller
    pub fitness: f32,
}

impl Agent {
    pub fn new(id: u32, x: f32, y: f32) -> Self {
        Self {
            id,
            x,
            y,
            vel: 0.0,
            tilt: 0.0,
            tick_count: 0,
            height: y,
            alive: true,
            fitness: 0.0,
        }
    }

    /// Flap: kick upward and restart the displacement clock
    pub fn jump(&mut self) {
        self.vel = JUMP_VELOCITY;
        self.tick_count = 0;
        self.height = self.y;
    }

    /// Advance one tick; returns the displacement applied
    pub fn advance(&mut self) -> f32 {
        self.tick_count += 1;
        let d = displacement(self.vel, self.tick_count);
        self.y += d;

        if d < 0.0 || self.y < self.height + TILT_MARGIN {
            if self.tilt < MAX_TILT {
                self.tilt = MAX_TILT;
            }
        } else if self.tilt > MIN_TILT {
            self.tilt = (self.tilt - TILT_RATE).max(MIN_TILT);
        }
        d
    }

    /// Screen pixel of the upright sprite's top-left corner
    pub fn pixel_origin(&self) -> IVec2 {
        IVec2::new(self.x.round() as i32, self.y.round() as i32)
    }
}

/// A pipe pair with a gap between its top and bottom halves
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipe {
    pub id: u32,
    /// Left edge
    pub x: f32,
    /// Lower edge of the top pipe (upper edge of the gap)
    pub height: f32,
    /// Top-left y of the top pipe sprite (`height - PIPE_HEIGHT`, off screen)
    pub top: f32,
    /// Upper edge of the bottom pipe (`height + PIPE_GAP`)
    pub bottom: f32,
    pub passed: bool,
}

impl Pipe {
    /// Pipe with a gap drawn uniformly from the configured range
    pub fn new<R: Rng + ?Sized>(id: u32, x: f32, rng: &mut R) -> Self {
        let height = rng.random_range(PIPE_GAP_Y_MIN..PIPE_GAP_Y_MAX) as f32;
        Self::with_height(id, x, height)
    }

    pub fn with_height(id: u32, x: f32, height: f32) -> Self {
        Self {
            id,
            x,
            height,
            top: height - PIPE_HEIGHT,
            bottom: height + PIPE_GAP,
            passed: false,
        }
    }

    pub fn scroll(&mut self) {
        self.x -= SCROLL_VELOCITY;
    }

    /// Right edge of the pipe
    #[inline]
    pub fn trailing_edge(&self) -> f32 {
        self.x + PIPE_WIDTH
    }

    /// True once the whole pipe has scrolled past the left edge
    #[inline]
    pub fn is_off_screen(&self) -> bool {
        self.trailing_edge() < 0.0
    }
}

/// Two ground segments scrolling as one seamless band
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ground {
    pub y: f32,
    pub x1: f32,
    pub x2: f32,
}

impl Ground {
    pub fn new(y: f32) -> Self {
        Self {
            y,
            x1: 0.0,
            x2: GROUND_WIDTH,
        }
    }

    pub fn scroll(&mut self) {
        self.x1 -= SCROLL_VELOCITY;
        self.x2 -= SCROLL_VELOCITY;

        if self.x1 + GROUND_WIDTH < 0.0 {
            self.x1 = self.x2 + GROUND_WIDTH;
        }
        if self.x2 + GROUND_WIDTH < 0.0 {
            self.x2 = self.x1 + GROUND_WIDTH;
        }
    }
}

impl Default for Ground {
    fn default() -> Self {
        Self::new(FLOOR_Y)
    }
}

/// Generation counter for a whole run
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RunContext {
    pub generation: u32,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the next episode; returns its generation number (1-based)
    pub fn begin_episode(&mut self) -> u32 {
        self.generation += 1;
        self.generation
    }
}

/// A bird paired with the controller flying it
pub(crate) struct Contender<'c> {
    pub(crate) agent: Agent,
    pub(crate) controller: &'c mut dyn Controller,
    /// Survival credit earned this tick, committed once the bird clears the
    /// collision scan
    pub(crate) pending: f32,
    /// Marked for removal by a pipe collision this tick
    pub(crate) crashed: bool,
    /// Marked for removal by leaving the playfield this tick
    pub(crate) escaped: bool,
}

impl Contender<'_> {
    /// Report a fitness delta and mirror it on the bird
    pub(crate) fn reward(&mut self, delta: f32) {
        self.agent.fitness += delta;
        self.controller.report_fitness_delta(delta);
    }

    pub(crate) fn is_marked(&self) -> bool {
        self.crashed || self.escaped
    }
}

/// Read-only snapshot handed to renderers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    pub generation: u32,
    pub score: u64,
    pub ticks: u64,
    pub alive: usize,
    /// `(position, tilt)` of every live bird
    pub birds: Vec<(Vec2, f32)>,
    pub pipes: Vec<Pipe>,
    pub ground: Ground,
}

/// Complete state of one episode
pub struct Episode<'c, R = Pcg32> {
    /// Generation this episode evaluates
    pub generation: u32,
    pub score: u64,
    /// Ticks processed so far
    pub ticks: u64,
    pub phase: EpisodePhase,
    /// Active pipes (ascending by x)
    pub pipes: Vec<Pipe>,
    pub ground: Ground,
    pub(crate) contenders: Vec<Contender<'c>>,
    pub(crate) rng: R,
    next_id: u32,
}

impl<'c> Episode<'c, Pcg32> {
    /// Episode with a seeded PCG generator
    pub fn seeded<I>(generation: u32, controllers: I, seed: u64) -> Self
    where
        I: IntoIterator<Item = &'c mut dyn Controller>,
    {
        Self::new(generation, controllers, Pcg32::seed_from_u64(seed))
    }
}

impl<'c, R: Rng> Episode<'c, R> {
    /// One bird per controller at the start position, one pipe at the spawn point
    pub fn new<I>(generation: u32, controllers: I, rng: R) -> Self
    where
        I: IntoIterator<Item = &'c mut dyn Controller>,
    {
        let mut episode = Self {
            generation,
            score: 0,
            ticks: 0,
            phase: EpisodePhase::Running,
            pipes: Vec::new(),
            ground: Ground::default(),
            contenders: Vec::new(),
            rng,
            next_id: 1,
        };

        for controller in controllers {
            let id = episode.next_entity_id();
            episode.contenders.push(Contender {
                agent: Agent::new(id, BIRD_START_X, BIRD_START_Y),
                controller,
                pending: 0.0,
                crashed: false,
                escaped: false,
            });
        }
        if episode.contenders.is_empty() {
            episode.phase = EpisodePhase::Terminal;
        }

        episode.spawn_pipe(PIPE_SPAWN_X);
        episode
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Append a freshly drawn pipe; returns its ID
    pub fn spawn_pipe(&mut self, x: f32) -> u32 {
        let id = self.next_entity_id();
        let pipe = Pipe::new(id, x, &mut self.rng);
        self.pipes.push(pipe);
        id
    }
}

impl<'c, R> Episode<'c, R> {
    pub fn is_terminal(&self) -> bool {
        self.phase == EpisodePhase::Terminal
    }

    /// Live birds in list order
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.contenders.iter().map(|c| &c.agent)
    }

    /// Mutable access for setting up scenarios
    pub fn agents_mut(&mut self) -> impl Iterator<Item = &mut Agent> {
        self.contenders.iter_mut().map(|c| &mut c.agent)
    }

    pub fn agent_count(&self) -> usize {
        self.contenders.len()
    }

    /// Controllers still referenced by the episode
    pub fn controller_count(&self) -> usize {
        self.contenders.len()
    }

    /// Fitness accumulated by the best live bird
    pub fn best_fitness(&self) -> Option<f32> {
        self.agents().map(|a| a.fitness).reduce(f32::max)
    }

    /// Snapshot for renderers
    pub fn frame(&self) -> Frame {
        Frame {
            generation: self.generation,
            score: self.score,
            ticks: self.ticks,
            alive: self.agent_count(),
            birds: self
                .agents()
                .map(|a| (Vec2::new(a.x, a.y), a.tilt))
                .collect(),
            pipes: self.pipes.clone(),
            ground: self.ground.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    struct Idle;

    impl Controller for Idle {
        fn decide(&mut self, _observation: &crate::Observation) -> f32 {
            0.0
        }

        fn report_fitness_delta(&mut self, _delta: f32) {}
    }

    #[test]
    fn test_jump_resets_clock() {
        let mut agent = Agent::new(1, BIRD_START_X, 300.0);
        agent.advance();
        agent.advance();
        agent.jump();
        assert_eq!(agent.tick_count, 0);
        assert_eq!(agent.vel, JUMP_VELOCITY);
        assert_eq!(agent.height, agent.y);

        // First tick after a jump: -10.5 + 1.5 = -9, plus the rising lift
        let before = agent.y;
        let d = agent.advance();
        assert!((d - (-11.0)).abs() < 1e-5);
        assert!((agent.y - (before - 11.0)).abs() < 1e-4);
        assert_eq!(agent.tilt, MAX_TILT);
    }

    #[test]
    fn test_free_fall_hits_terminal_displacement() {
        let mut agent = Agent::new(1, BIRD_START_X, 0.0);
        let steps: Vec<f32> = (0..6).map(|_| agent.advance()).collect();
        assert_eq!(steps, vec![1.5, 6.0, 13.5, 16.0, 16.0, 16.0]);
    }

    #[test]
    fn test_tilt_nose_dives_to_floor() {
        let mut agent = Agent::new(1, BIRD_START_X, 100.0);
        for _ in 0..30 {
            agent.advance();
            assert!(agent.tilt >= MIN_TILT);
            assert!(agent.tilt <= MAX_TILT);
        }
        assert_eq!(agent.tilt, MIN_TILT);
    }

    #[test]
    fn test_tilt_holds_near_jump_height() {
        let mut agent = Agent::new(1, BIRD_START_X, 350.0);
        // 351.5, 357.5, 371, 387 are all within 50px of the start height
        for _ in 0..4 {
            agent.advance();
            assert_eq!(agent.tilt, MAX_TILT);
        }
        // 403 is past the margin: start tipping over
        agent.advance();
        assert_eq!(agent.tilt, MAX_TILT - TILT_RATE);
    }

    #[test]
    fn test_pipe_edges() {
        let pipe = Pipe::with_height(3, 700.0, 120.0);
        assert_eq!(pipe.top, 120.0 - PIPE_HEIGHT);
        assert_eq!(pipe.bottom, 320.0);
        assert!(!pipe.passed);
        assert_eq!(pipe.trailing_edge(), 804.0);
    }

    #[test]
    fn test_pipe_off_screen_only_when_fully_past() {
        let mut pipe = Pipe::with_height(1, 0.0, 200.0);
        pipe.x = -PIPE_WIDTH;
        assert!(!pipe.is_off_screen());
        pipe.scroll();
        assert!(pipe.is_off_screen());
    }

    #[test]
    fn test_ground_wraps_seamlessly() {
        let mut ground = Ground::default();
        for _ in 0..1000 {
            ground.scroll();
            assert_eq!((ground.x1 - ground.x2).abs(), GROUND_WIDTH);
            assert!(ground.x1.min(ground.x2) >= -GROUND_WIDTH - SCROLL_VELOCITY);
        }
    }

    #[test]
    fn test_run_context_counts_generations() {
        let mut ctx = RunContext::new();
        assert_eq!(ctx.begin_episode(), 1);
        assert_eq!(ctx.begin_episode(), 2);
        assert_eq!(ctx.generation, 2);
    }

    #[test]
    fn test_new_episode_layout() {
        let mut a = Idle;
        let mut b = Idle;
        let controllers: Vec<&mut dyn Controller> = vec![&mut a, &mut b];
        let episode = Episode::seeded(4, controllers, 7);

        assert_eq!(episode.generation, 4);
        assert_eq!(episode.phase, EpisodePhase::Running);
        assert_eq!(episode.agent_count(), 2);
        assert_eq!(episode.controller_count(), 2);
        assert_eq!(episode.pipes.len(), 1);
        assert_eq!(episode.pipes[0].x, PIPE_SPAWN_X);
        for agent in episode.agents() {
            assert_eq!((agent.x, agent.y), (BIRD_START_X, BIRD_START_Y));
            assert_eq!(agent.vel, 0.0);
        }

        let ids: Vec<u32> = episode.agents().map(|a| a.id).collect();
        assert_ne!(ids[0], ids[1]);
        assert!(!ids.contains(&episode.pipes[0].id));
    }

    #[test]
    fn test_empty_population_is_terminal() {
        let episode = Episode::seeded(1, Vec::<&mut dyn Controller>::new(), 1);
        assert!(episode.is_terminal());
    }

    #[test]
    fn test_same_seed_same_pipes() {
        let mut rng1 = Pcg32::seed_from_u64(42);
        let mut rng2 = Pcg32::seed_from_u64(42);
        for id in 0..20 {
            let a = Pipe::new(id, PIPE_SPAWN_X, &mut rng1);
            let b = Pipe::new(id, PIPE_SPAWN_X, &mut rng2);
            assert_eq!(a.height, b.height);
        }
    }

    proptest! {
        #[test]
        fn prop_displacement_law(vel in -20.0f32..5.0, ticks in 1u32..200) {
            let t = ticks as f64;
            let raw = vel as f64 * t + 0.5 * GRAVITY as f64 * t * t;
            let clamped = raw.min(TERMINAL_DISPLACEMENT as f64);
            // f32 rounding can flip the sign of a near-zero displacement
            prop_assume!(raw.abs() > 0.01);
            let expected = if clamped < 0.0 { clamped - RISE_BOOST as f64 } else { clamped };

            let d = displacement(vel, ticks);
            prop_assert!(d <= TERMINAL_DISPLACEMENT);
            prop_assert!((d as f64 - expected).abs() <= 1e-2);
        }

        #[test]
        fn prop_pipe_edges_follow_gap(seed in any::<u64>()) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let pipe = Pipe::new(1, PIPE_SPAWN_X, &mut rng);
            prop_assert!(pipe.height >= PIPE_GAP_Y_MIN as f32);
            prop_assert!(pipe.height < PIPE_GAP_Y_MAX as f32);
            prop_assert_eq!(pipe.top, pipe.height - PIPE_HEIGHT);
            prop_assert_eq!(pipe.bottom, pipe.height + PIPE_GAP);
        }
    }
}
