//! Population of network pilots
//!
//! Owns one controller per population member. The engine only borrows them
//! for an episode; afterwards the population ranks them by accumulated
//! fitness, keeps the elite and refills the rest with mutated copies of the
//! better half.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::controller::Controller;
use crate::pilot::NetworkPilot;

/// Outcome of one generation as seen by the population
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub generation: u32,
    pub best_fitness: f32,
    pub mean_fitness: f32,
}

/// Selection parameters
#[derive(Debug, Clone, Copy)]
pub struct Breeding {
    /// Pilots copied unchanged into the next generation
    pub elite: usize,
    /// Maximum per-weight nudge applied to offspring
    pub mutation_scale: f32,
}

pub struct Population {
    pilots: Vec<NetworkPilot>,
    breeding: Breeding,
    rng: Pcg32,
}

impl Population {
    pub fn new(size: usize, hidden: usize, breeding: Breeding, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let pilots = (0..size)
            .map(|_| NetworkPilot::random(hidden, &mut rng))
            .collect();
        Self {
            pilots,
            breeding,
            rng,
        }
    }

    pub fn len(&self) -> usize {
        self.pilots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pilots.is_empty()
    }

    pub fn pilots(&self) -> &[NetworkPilot] {
        &self.pilots
    }

    /// Zero every pilot's fitness and lend them out for an episode
    pub fn controllers(&mut self) -> impl Iterator<Item = &mut dyn Controller> {
        self.pilots.iter_mut().map(|pilot| {
            pilot.fitness = 0.0;
            pilot as &mut dyn Controller
        })
    }

    /// Fittest pilot of the last episode
    pub fn champion(&self) -> Option<&NetworkPilot> {
        self.pilots
            .iter()
            .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
    }

    /// Summarise the finished episode and breed the next generation
    pub fn evolve(&mut self, generation: u32) -> GenerationSummary {
        let summary = self.summarize(generation);

        self.pilots
            .sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
        let size = self.pilots.len();
        let elite = self.breeding.elite.min(size);
        let parents = (size / 2).max(1).min(size);

        let mut next: Vec<NetworkPilot> = self.pilots[..elite].to_vec();
        while next.len() < size {
            let parent = &self.pilots[self.rng.random_range(0..parents)];
            next.push(parent.mutated(self.breeding.mutation_scale, &mut self.rng));
        }
        for pilot in &mut next {
            pilot.fitness = 0.0;
        }
        self.pilots = next;

        log::debug!(
            "generation {} bred: {} elite, {} offspring",
            generation,
            elite,
            size - elite
        );
        summary
    }

    fn summarize(&self, generation: u32) -> GenerationSummary {
        let best_fitness = self
            .pilots
            .iter()
            .map(|p| p.fitness)
            .reduce(f32::max)
            .unwrap_or(0.0);
        let mean_fitness = if self.pilots.is_empty() {
            0.0
        } else {
            self.pilots.iter().map(|p| p.fitness).sum::<f32>() / self.pilots.len() as f32
        };
        GenerationSummary {
            generation,
            best_fitness,
            mean_fitness,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breeding() -> Breeding {
        Breeding {
            elite: 2,
            mutation_scale: 0.3,
        }
    }

    #[test]
    fn test_controllers_reset_fitness() {
        let mut population = Population::new(5, 4, breeding(), 1);
        for controller in population.controllers() {
            controller.report_fitness_delta(3.0);
        }
        assert!(population.pilots().iter().all(|p| p.fitness == 3.0));
        assert_eq!(population.controllers().count(), 5);
        assert!(population.pilots().iter().all(|p| p.fitness == 0.0));
    }

    #[test]
    fn test_evolve_keeps_size_and_elite() {
        let mut population = Population::new(6, 4, breeding(), 2);
        for (i, controller) in population.controllers().enumerate() {
            controller.report_fitness_delta(i as f32);
        }
        let obs = [300.0, 60.0, 140.0];
        let best = population.champion().unwrap().activate(&obs);

        let summary = population.evolve(1);
        assert_eq!(summary.generation, 1);
        assert_eq!(summary.best_fitness, 5.0);
        assert!((summary.mean_fitness - 2.5).abs() < 1e-6);

        assert_eq!(population.len(), 6);
        assert!(population.pilots().iter().all(|p| p.fitness == 0.0));
        // Best pilot survives unchanged at the front
        assert_eq!(population.pilots()[0].activate(&obs), best);
    }

    #[test]
    fn test_evolve_empty_population() {
        let mut population = Population::new(0, 4, breeding(), 3);
        assert!(population.is_empty());
        let summary = population.evolve(1);
        assert_eq!(summary.best_fitness, 0.0);
        assert!(population.is_empty());
    }
}
