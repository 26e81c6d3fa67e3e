//! Frame-driven training loop shared by the rendered modes.

use std::path::PathBuf;

use anyhow::Result;
use dino_evolve_rendering::{FrameInput, Hud, Scene, SceneUpdate};
use dino_evolve_system_evolution::{Genome, Population};
use dino_evolve_system_generation::{
    Cohort, Generation, GenerationController, GenerationReport, TickOutcome,
};
use dino_evolve_world::query;
use tracing::info;

const MAX_TICKS_PER_FRAME: u32 = 64;

/// Where a session's cohorts come from and where they go after each generation.
#[derive(Debug)]
pub(crate) enum CohortSource {
    /// Trains a population, breeding a new cohort after every generation.
    Evolve {
        population: Population,
        save_best: Option<PathBuf>,
    },
    /// Replays a fixed cohort on a fresh course every generation.
    Replay { cohort: Option<Cohort<Genome>> },
}

impl CohortSource {
    fn take(&mut self) -> Cohort<Genome> {
        match self {
            Self::Evolve { population, .. } => population.take_cohort(),
            Self::Replay { cohort } => cohort.take().unwrap_or_else(|| Cohort::new(Vec::new())),
        }
    }

    /// Hands a finished cohort back and reports whether the session should stop.
    fn complete(&mut self, cohort: Cohort<Genome>, report: &GenerationReport) -> Result<bool> {
        match self {
            Self::Evolve {
                population,
                save_best,
            } => {
                population.restore(cohort);
                population.record_best();
                let best_fitness = population.best().map(|best| best.fitness);
                info!(
                    generation = report.generation,
                    ticks = report.ticks,
                    score = report.score,
                    generation_best = report.best_fitness,
                    best_fitness,
                    "generation evaluated"
                );
                if let Some(path) = save_best {
                    population.save_checkpoint(path)?;
                }
                let reached = population
                    .config()
                    .fitness_threshold
                    .zip(best_fitness)
                    .is_some_and(|(threshold, best)| best >= threshold);
                if reached {
                    info!("fitness threshold reached");
                    return Ok(true);
                }
                population.evolve()?;
                Ok(false)
            }
            Self::Replay { cohort: slot } => {
                info!(
                    generation = report.generation,
                    ticks = report.ticks,
                    score = report.score,
                    fitness = report.best_fitness,
                    "replay finished"
                );
                *slot = Some(cohort);
                Ok(false)
            }
        }
    }
}

/// Runs generations a few ticks per rendered frame.
pub(crate) struct Session {
    controller: GenerationController,
    source: CohortSource,
    current: Option<Generation<Genome>>,
    remaining: u64,
    ticks_per_frame: u32,
}

impl Session {
    pub(crate) fn new(
        controller: GenerationController,
        source: CohortSource,
        generations: u64,
    ) -> Self {
        Self {
            controller,
            source,
            current: None,
            remaining: generations,
            ticks_per_frame: 1,
        }
    }

    /// Advances the running generation and mirrors it into `scene`.
    pub(crate) fn advance(&mut self, input: FrameInput, scene: &mut Scene) -> Result<SceneUpdate> {
        self.adjust_speed(input);

        if self.current.is_none() {
            if self.remaining == 0 {
                return Ok(SceneUpdate::Exit);
            }
            let cohort = self.source.take();
            self.current = Some(self.controller.begin(cohort)?);
        }
        let Some(generation) = self.current.as_mut() else {
            return Ok(SceneUpdate::Exit);
        };

        for _ in 0..self.ticks_per_frame {
            if generation.tick()? != TickOutcome::Running {
                break;
            }
        }

        let world = generation.world();
        scene.refresh(
            &query::agent_view(world),
            &query::obstacle_view(world),
            Hud {
                generation: generation.number(),
                score: query::score(world),
                game_speed: query::game_speed(world),
                ticks_per_frame: self.ticks_per_frame,
                alive: generation.live_count(),
                population: generation.population(),
            },
        );

        if generation.is_finished() {
            if let Some(generation) = self.current.take() {
                let (cohort, report) = generation.finish();
                self.remaining = self.remaining.saturating_sub(1);
                if self.source.complete(cohort, &report)? {
                    self.remaining = 0;
                }
            }
        }
        Ok(SceneUpdate::Continue)
    }

    fn adjust_speed(&mut self, input: FrameInput) {
        if input.faster {
            self.ticks_per_frame = (self.ticks_per_frame * 2).min(MAX_TICKS_PER_FRAME);
        }
        if input.slower {
            self.ticks_per_frame = (self.ticks_per_frame / 2).max(1);
        }
    }
}
