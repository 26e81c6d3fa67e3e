#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that trains and replays dino-evolve policies.

mod session;
mod settings;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use dino_evolve_rendering::{Color, Presentation, RenderingBackend, Scene, SceneUpdate};
use dino_evolve_rendering_macroquad::MacroquadBackend;
use dino_evolve_system_evolution::{load_checkpoint, Genome, Population};
use dino_evolve_system_generation::{Cohort, GenerationController};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::{
    session::{CohortSource, Session},
    settings::Settings,
};

const DEFAULT_LOG_DIRECTIVE: &str = "dino_evolve=info";

/// Command-line arguments for the dino-evolve trainer.
#[derive(Debug, Parser)]
#[command(name = "dino-evolve", about = "Evolves neural jump policies for an endless runner")]
struct CliArgs {
    /// TOML settings file; every section is optional.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Number of generations to run.
    #[arg(long, default_value_t = 1000)]
    generations: u64,
    /// Trains without opening a window.
    #[arg(long)]
    headless: bool,
    /// Overrides both the optimizer and the course seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Writes the best network found so far to this JSON file.
    #[arg(long, value_name = "PATH", conflicts_with = "replay")]
    save_best: Option<PathBuf>,
    /// Replays a saved checkpoint instead of training.
    #[arg(long, value_name = "PATH")]
    replay: Option<PathBuf>,
    /// Synchronises rendering with the display refresh rate.
    #[arg(long)]
    vsync: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let args = CliArgs::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        settings.reseed(seed);
    }
    let controller = GenerationController::new(settings.generation_config())
        .context("invalid generation settings")?;

    match (&args.replay, args.headless) {
        (Some(path), true) => replay_headless(controller, path, args.generations),
        (Some(path), false) => {
            let source = CohortSource::Replay {
                cohort: Some(replay_cohort(path)?),
            };
            render(controller, source, &settings, &args)
        }
        (None, true) => train_headless(controller, &settings, &args),
        (None, false) => {
            let source = CohortSource::Evolve {
                population: Population::new(settings.evolution.clone())
                    .context("invalid evolution settings")?,
                save_best: args.save_best.clone(),
            };
            render(controller, source, &settings, &args)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn replay_cohort(path: &Path) -> Result<Cohort<Genome>> {
    let checkpoint = load_checkpoint(path)
        .with_context(|| format!("failed to load checkpoint {}", path.display()))?;
    info!(
        generation = checkpoint.generation,
        fitness = checkpoint.fitness,
        "loaded checkpoint"
    );
    Ok(Cohort::new(vec![Genome::new(checkpoint.network)]))
}

fn train_headless(
    mut controller: GenerationController,
    settings: &Settings,
    args: &CliArgs,
) -> Result<()> {
    let mut population =
        Population::new(settings.evolution.clone()).context("invalid evolution settings")?;
    let summary = population.run(&mut controller, args.generations)?;
    info!(
        generations = summary.generations,
        best_fitness = summary.best_fitness,
        reached_threshold = summary.reached_threshold,
        "training finished"
    );

    if let Some(path) = &args.save_best {
        population
            .save_checkpoint(path)
            .with_context(|| format!("failed to save checkpoint {}", path.display()))?;
        info!(path = %path.display(), "saved best network");
    }
    Ok(())
}

fn replay_headless(
    mut controller: GenerationController,
    path: &Path,
    generations: u64,
) -> Result<()> {
    let mut cohort = replay_cohort(path)?;
    for _ in 0..generations {
        let (returned, report) = controller.run_generation(cohort)?;
        info!(
            generation = report.generation,
            ticks = report.ticks,
            score = report.score,
            obstacles_passed = report.obstacles_passed,
            fitness = report.best_fitness,
            "replay finished"
        );
        cohort = returned;
    }
    Ok(())
}

fn render(
    controller: GenerationController,
    source: CohortSource,
    settings: &Settings,
    args: &CliArgs,
) -> Result<()> {
    let world = &settings.world;
    let scene = Scene::new(
        world.screen_width,
        world.screen_height,
        world.ground_baseline(),
    );
    let presentation = Presentation::new(
        "Dino Evolve",
        Color::from_rgb_u8(0xf7, 0xf7, 0xf7),
        scene,
    )
    .with_vsync(args.vsync);

    let mut session = Session::new(controller, source, args.generations);
    MacroquadBackend::new().run(presentation, move |_dt, input, scene| {
        match session.advance(input, scene) {
            Ok(update) => update,
            Err(error) => {
                error!("training stopped: {error:#}");
                SceneUpdate::Exit
            }
        }
    })
}
