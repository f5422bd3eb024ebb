//! Pilot capability polled by the tick engine
//!
//! Anything that can turn an observation into a jump decision and absorb
//! fitness feedback can fly a bird: a trained network, a heuristic, a test
//! script. The engine only borrows controllers; their owner reads back the
//! accumulated fitness once the episode ends.

/// Per-tick observation: `[bird y, |y - gap top|, |y - gap bottom|]`
pub type Observation = [f32; 3];

/// Decision maker paired one-to-one with a bird
pub trait Controller {
    /// Produce an activation; values above [`crate::consts::JUMP_THRESHOLD`] jump
    fn decide(&mut self, observation: &Observation) -> f32;

    /// Receive a fitness delta (+0.1 survival, -1.0 collision, +5.0 pass)
    fn report_fitness_delta(&mut self, delta: f32);
}

impl<C: Controller + ?Sized> Controller for Box<C> {
    fn decide(&mut self, observation: &Observation) -> f32 {
        (**self).decide(observation)
    }

    fn report_fitness_delta(&mut self, delta: f32) {
        (**self).report_fitness_delta(delta)
    }
}
