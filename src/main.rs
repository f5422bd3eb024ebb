//! Flappy Evo entry point
//!
//! Loads run settings, wires up a renderer and runs the generation loop.
//! Type `q` and Enter to stop after the current tick.

use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;

use flappy_evo::renderer::{AsciiRenderer, HudLogger, NullRenderer, Renderer};
use flappy_evo::runner::{Pacer, StopSignal, Trainer};
use flappy_evo::{RenderMode, RunSettings};

#[derive(Parser, Debug)]
#[command(name = "flappy-evo", about = "Evolve flappy bird pilots")]
struct Args {
    /// JSON run settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for pipes and breeding
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    generations: Option<u32>,

    /// Birds per generation
    #[arg(long)]
    population: Option<usize>,

    /// none, hud or ascii
    #[arg(long)]
    render: Option<String>,

    /// Run as fast as possible instead of at the tick rate
    #[arg(long)]
    unpaced: bool,

    /// Write the leaderboard here when the run ends
    #[arg(long)]
    summary: Option<PathBuf>,
}

impl Args {
    fn settings(&self) -> Result<RunSettings> {
        let mut settings = match &self.config {
            Some(path) => RunSettings::load(path)
                .with_context(|| format!("loading settings from {}", path.display()))?,
            None => RunSettings::default(),
        };

        if let Some(seed) = self.seed {
            settings.seed = Some(seed);
        }
        if let Some(generations) = self.generations {
            settings.generations = generations;
        }
        if let Some(population) = self.population {
            settings.population = population;
        }
        if let Some(render) = &self.render {
            match RenderMode::from_str(render) {
                Some(mode) => settings.render = mode,
                None => bail!("unknown render mode '{}' (expected none, hud or ascii)", render),
            }
        }
        if self.unpaced {
            settings.tick_rate = 0;
        }

        settings.validate().context("checking run settings")?;
        Ok(settings)
    }
}

/// Raise `stop` when a line reading `q` arrives on stdin
fn watch_stdin(stop: StopSignal) {
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().eq_ignore_ascii_case("q") {
                log::info!("Quit requested");
                stop.request();
                break;
            }
        }
    });
}

fn main() -> Result<()> {
    env_logger::init();
    log::info!("Flappy Evo starting...");

    let args = Args::parse();
    let settings = args.settings()?;

    let mut renderer: Box<dyn Renderer> = match settings.render {
        RenderMode::None => Box::new(NullRenderer),
        RenderMode::Hud => Box::new(HudLogger::new()),
        RenderMode::Ascii => Box::new(AsciiRenderer::new(io::stdout())),
    };
    let mut pacer = Pacer::new(settings.tick_rate);

    let stop = StopSignal::new();
    watch_stdin(stop.clone());

    let mut trainer = Trainer::new(settings, stop);
    let report = trainer
        .run(renderer.as_mut(), &mut pacer)
        .context("running generations")?;

    match &report.best {
        Some(best) => log::info!(
            "Finished after {} generations; best was gen {} with fitness {:.1} (score {})",
            report.generations,
            best.generation,
            best.best_fitness,
            best.score
        ),
        None => log::info!("Finished without completing a generation"),
    }

    if let Some(path) = &args.summary {
        trainer
            .leaderboard()
            .save(path)
            .with_context(|| format!("writing summary to {}", path.display()))?;
    }

    Ok(())
}
