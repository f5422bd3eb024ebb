//! Concrete pilots
//!
//! - [`HeuristicPilot`]: hand-coded, hovers just above the lower gap edge
//! - [`NetworkPilot`]: fixed-topology feed-forward network evolved by
//!   [`crate::evolve::Population`]

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::controller::{Controller, Observation};

/// Flaps whenever the bird sinks into the bottom of the gap (or below it)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeuristicPilot {
    /// Flap once the sprite's top is this close to the lower gap edge
    pub margin: f32,
    pub fitness: f32,
}

impl HeuristicPilot {
    pub fn new() -> Self {
        Self {
            margin: BIRD_HEIGHT as f32 + 40.0,
            fitness: 0.0,
        }
    }
}

impl Default for HeuristicPilot {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for HeuristicPilot {
    fn decide(&mut self, observation: &Observation) -> f32 {
        let [_, to_top, to_bottom] = *observation;
        // Closer to the bottom edge than the top one, and either below the
        // gap entirely or within the margin of its floor
        let sinking = to_top > to_bottom && (to_bottom <= self.margin || to_top > PIPE_GAP);
        if sinking { 1.0 } else { 0.0 }
    }

    fn report_fitness_delta(&mut self, delta: f32) {
        self.fitness += delta;
    }
}

/// Weights of one hidden neuron
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Neuron {
    weights: [f32; 3],
    bias: f32,
}

impl Neuron {
    fn random(rng: &mut dyn RngCore) -> Self {
        Self {
            weights: [
                rng.random_range(-1.0..1.0),
                rng.random_range(-1.0..1.0),
                rng.random_range(-1.0..1.0),
            ],
            bias: rng.random_range(-1.0..1.0),
        }
    }
}

/// Three inputs, one tanh hidden layer, one sigmoid output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkPilot {
    hidden: Vec<Neuron>,
    output: Vec<f32>,
    output_bias: f32,
    /// Fitness accumulated over the current episode
    pub fitness: f32,
}

impl NetworkPilot {
    pub fn random(hidden: usize, rng: &mut dyn RngCore) -> Self {
        let hidden_layer = (0..hidden).map(|_| Neuron::random(rng)).collect();
        let output = (0..hidden).map(|_| rng.random_range(-1.0..1.0)).collect();
        Self {
            hidden: hidden_layer,
            output,
            output_bias: rng.random_range(-1.0..1.0),
            fitness: 0.0,
        }
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden.len()
    }

    /// Network output in `(0, 1)`
    pub fn activate(&self, observation: &Observation) -> f32 {
        // Pixel distances scaled to roughly unit range
        let inputs = observation.map(|v| v / WIN_HEIGHT);

        let mut sum = self.output_bias;
        for (neuron, weight) in self.hidden.iter().zip(&self.output) {
            let z = neuron
                .weights
                .iter()
                .zip(&inputs)
                .fold(neuron.bias, |acc, (w, x)| acc + w * x);
            sum += weight * z.tanh();
        }
        1.0 / (1.0 + (-sum).exp())
    }

    /// Copy with every weight nudged by up to `scale`; fitness starts at zero
    pub fn mutated(&self, scale: f32, rng: &mut dyn RngCore) -> Self {
        let mut child = self.clone();
        child.fitness = 0.0;
        if scale <= 0.0 {
            return child;
        }
        for neuron in &mut child.hidden {
            for w in &mut neuron.weights {
                *w += rng.random_range(-scale..scale);
            }
            neuron.bias += rng.random_range(-scale..scale);
        }
        for w in &mut child.output {
            *w += rng.random_range(-scale..scale);
        }
        child.output_bias += rng.random_range(-scale..scale);
        child
    }
}

impl Controller for NetworkPilot {
    fn decide(&mut self, observation: &Observation) -> f32 {
        self.activate(observation)
    }

    fn report_fitness_delta(&mut self, delta: f32) {
        self.fitness += delta;
    }
}
