//! Episode driver and generation loop
//!
//! Pacing, cooperative cancellation and the outer training loop live here so
//! the simulation itself stays free of clocks and threads.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rand::Rng;

use crate::evolve::{Breeding, Population};
use crate::renderer::Renderer;
use crate::settings::RunSettings;
use crate::sim::{Episode, RunContext, tick};
use crate::stats::{GenerationRecord, Leaderboard};

/// Shared quit flag, checked once per tick
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Blocking frame limiter
#[derive(Debug)]
pub struct Pacer {
    period: Option<Duration>,
    next: Option<Instant>,
}

impl Pacer {
    /// Pace to `tick_rate` ticks per second; 0 disables pacing
    pub fn new(tick_rate: u32) -> Self {
        let period = (tick_rate > 0).then(|| Duration::from_secs_f64(1.0 / tick_rate as f64));
        Self { period, next: None }
    }

    pub fn unpaced() -> Self {
        Self::new(0)
    }

    pub fn period(&self) -> Option<Duration> {
        self.period
    }

    /// Sleep until the next tick is due
    pub fn wait(&mut self) {
        let Some(period) = self.period else {
            return;
        };
        let now = Instant::now();
        let deadline = match self.next {
            Some(deadline) if deadline > now => {
                std::thread::sleep(deadline - now);
                deadline
            }
            // Running late: don't try to catch up
            _ => now,
        };
        self.next = Some(deadline + period);
    }
}

/// How a call to [`run_episode`] ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeOutcome {
    /// Every bird is gone
    Completed,
    /// The stop signal was raised
    Stopped,
    /// The tick cap was reached with birds still flying
    Capped,
}

/// Tick an episode until it ends, is stopped or hits `max_ticks` (0 = no cap)
pub fn run_episode<R: Rng>(
    episode: &mut Episode<'_, R>,
    renderer: &mut dyn Renderer,
    pacer: &mut Pacer,
    stop: &StopSignal,
    max_ticks: u64,
) -> io::Result<EpisodeOutcome> {
    loop {
        if episode.is_terminal() {
            return Ok(EpisodeOutcome::Completed);
        }
        if stop.is_requested() {
            log::info!("Stop requested at tick {}", episode.ticks);
            return Ok(EpisodeOutcome::Stopped);
        }
        if max_ticks > 0 && episode.ticks >= max_ticks {
            log::info!("Episode capped at {} ticks", max_ticks);
            return Ok(EpisodeOutcome::Capped);
        }

        tick(episode);
        if !episode.is_terminal() {
            renderer.render(&episode.frame())?;
        }
        pacer.wait();
    }
}

/// Summary of a training run
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub generations: u32,
    pub stopped: bool,
    pub threshold_reached: bool,
    pub best: Option<GenerationRecord>,
}

/// Runs generations of a population until done
pub struct Trainer {
    settings: RunSettings,
    seed: u64,
    context: RunContext,
    population: Population,
    leaderboard: Leaderboard,
    stop: StopSignal,
}

impl Trainer {
    pub fn new(settings: RunSettings, stop: StopSignal) -> Self {
        let seed = settings.seed.unwrap_or_else(|| rand::rng().random());
        let breeding = Breeding {
            elite: settings.elite,
            mutation_scale: settings.mutation_scale,
        };
        let population = Population::new(
            settings.population,
            settings.hidden_neurons,
            breeding,
            seed,
        );
        log::info!(
            "Trainer ready: {} pilots, {} generations, seed {}",
            population.len(),
            settings.generations,
            seed
        );
        Self {
            settings,
            seed,
            context: RunContext::new(),
            population,
            leaderboard: Leaderboard::new(),
            stop,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn generation(&self) -> u32 {
        self.context.generation
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn run(
        &mut self,
        renderer: &mut dyn Renderer,
        pacer: &mut Pacer,
    ) -> io::Result<TrainingReport> {
        let mut report = TrainingReport {
            generations: 0,
            stopped: false,
            threshold_reached: false,
            best: None,
        };

        while self.context.generation < self.settings.generations {
            if self.stop.is_requested() {
                report.stopped = true;
                break;
            }
            let generation = self.context.begin_episode();
            // Fresh but reproducible pipes for every generation
            let episode_seed = self.seed.wrapping_add(generation as u64);

            let (outcome, score, ticks) = {
                let mut episode =
                    Episode::seeded(generation, self.population.controllers(), episode_seed);
                let outcome = run_episode(
                    &mut episode,
                    renderer,
                    pacer,
                    &self.stop,
                    self.settings.max_ticks,
                )?;
                (outcome, episode.score, episode.ticks)
            };

            let summary = self.population.evolve(generation);
            let record = GenerationRecord {
                generation,
                best_fitness: summary.best_fitness,
                mean_fitness: summary.mean_fitness,
                score,
                ticks,
            };
            log::info!(
                "Gen {}: best fitness {:.1}, mean {:.2}, score {}, {} ticks",
                generation,
                record.best_fitness,
                record.mean_fitness,
                score,
                ticks
            );
            if let Some(rank) = self.leaderboard.add(record) {
                log::debug!("Gen {} ranked #{}", generation, rank);
            }
            report.generations += 1;

            if outcome == EpisodeOutcome::Stopped {
                report.stopped = true;
                break;
            }
            if summary.best_fitness >= self.settings.fitness_threshold {
                log::info!(
                    "Fitness threshold {} reached in generation {}",
                    self.settings.fitness_threshold,
                    generation
                );
                report.threshold_reached = true;
                break;
            }
        }

        report.best = self.leaderboard.best().cloned();
        Ok(report)
    }
}
