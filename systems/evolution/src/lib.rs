#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Neuroevolution optimizer that trains jump policies generation by generation.

mod checkpoint;
mod network;

use dino_evolve_core::{
    ensure_at_least, ensure_finite, ensure_positive, ensure_unit_interval, ConfigError, Policy,
};
use dino_evolve_system_generation::{
    Candidate, Cohort, CohortMember, GenerationController, GenerationError, GenerationReport,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

pub use self::{
    checkpoint::{load_checkpoint, Checkpoint},
    network::FeedForwardNetwork,
};

/// Failures raised by the optimizer.
#[derive(Debug, Error)]
pub enum EvolutionError {
    /// A configuration value was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// More elites were requested than the population holds.
    #[error("elitism of {elitism} exceeds the population size of {population}")]
    ElitismExceedsPopulation {
        /// Number of elites requested.
        elitism: usize,
        /// Configured population size.
        population: usize,
    },
    /// A sampling distribution could not be built.
    #[error("{field} cannot parameterise a normal distribution (received {value})")]
    Distribution {
        /// Dotted name of the offending setting.
        field: &'static str,
        /// Value that failed validation.
        value: f32,
    },
    /// The population is empty, usually because the cohort was not restored.
    #[error("population has no genomes")]
    EmptyPopulation,
    /// No genome has been evaluated yet.
    #[error("no evaluated genome is available")]
    NoBestGenome,
    /// A deserialised network does not chain from the sensors to one output.
    #[error("network layer {layer} has an inconsistent shape")]
    MalformedNetwork {
        /// Index of the first inconsistent layer.
        layer: usize,
    },
    /// Running a generation failed.
    #[error(transparent)]
    Generation(#[from] GenerationError),
    /// Reading or writing a checkpoint failed.
    #[error("checkpoint i/o failed for {path}")]
    Io {
        /// Checkpoint location.
        path: std::path::PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
    /// A checkpoint could not be encoded or decoded.
    #[error("checkpoint encoding failed")]
    Encoding(#[from] serde_json::Error),
}

/// Parameters of the genetic algorithm.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Genomes per generation.
    pub population_size: usize,
    /// Neurons in the single hidden layer; zero disables it.
    pub hidden_neurons: usize,
    /// Best genomes copied unchanged into the next generation.
    pub elitism: usize,
    /// Fraction of the ranked population eligible as parents.
    pub survival_fraction: f64,
    /// Probability that an individual parameter is perturbed.
    pub mutation_rate: f64,
    /// Standard deviation of the perturbation.
    pub mutation_power: f32,
    /// Standard deviation of freshly initialised parameters.
    pub weight_init_stdev: f32,
    /// Training stops once the best fitness reaches this value.
    pub fitness_threshold: Option<f32>,
    /// Seed of the optimizer's random number generator.
    pub rng_seed: u64,
}

impl EvolutionConfig {
    /// Rejects settings the genetic algorithm cannot work with.
    pub fn validate(&self) -> Result<(), EvolutionError> {
        ensure_at_least(
            "evolution.population_size",
            self.population_size as u64,
            1,
        )?;
        if self.elitism > self.population_size {
            return Err(EvolutionError::ElitismExceedsPopulation {
                elitism: self.elitism,
                population: self.population_size,
            });
        }
        ensure_unit_interval("evolution.survival_fraction", self.survival_fraction)?;
        if self.survival_fraction <= 0.0 {
            return Err(ConfigError::NonPositive {
                field: "evolution.survival_fraction",
                value: self.survival_fraction,
            }
            .into());
        }
        ensure_unit_interval("evolution.mutation_rate", self.mutation_rate)?;
        ensure_positive("evolution.mutation_power", self.mutation_power)?;
        ensure_positive("evolution.weight_init_stdev", self.weight_init_stdev)?;
        if let Some(threshold) = self.fitness_threshold {
            ensure_finite("evolution.fitness_threshold", threshold)?;
        }
        Ok(())
    }
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            hidden_neurons: 6,
            elitism: 2,
            survival_fraction: 0.2,
            mutation_rate: 0.3,
            mutation_power: 0.5,
            weight_init_stdev: 1.0,
            fitness_threshold: None,
            rng_seed: 0,
        }
    }
}

/// Network paired with the fitness it earned in the last generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    /// Policy network.
    pub network: FeedForwardNetwork,
    /// Fitness accumulated during the last evaluation.
    pub fitness: f32,
}

impl Genome {
    /// Wraps a network with zero fitness.
    #[must_use]
    pub fn new(network: FeedForwardNetwork) -> Self {
        Self {
            network,
            fitness: 0.0,
        }
    }
}

impl Candidate for Genome {
    fn policy(&mut self) -> &mut dyn Policy {
        &mut self.network
    }

    fn fitness_mut(&mut self) -> &mut f32 {
        &mut self.fitness
    }
}

/// Outcome of [`Population::run`].
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    /// Generations actually evaluated.
    pub generations: u64,
    /// Best fitness observed across the run.
    pub best_fitness: Option<f32>,
    /// Whether training stopped because the fitness threshold was reached.
    pub reached_threshold: bool,
    /// Per-generation reports in evaluation order.
    pub reports: Vec<GenerationReport>,
}

/// Population of genomes evolved by truncation selection.
#[derive(Debug)]
pub struct Population {
    config: EvolutionConfig,
    genomes: Vec<Genome>,
    best: Option<Genome>,
    generation: u64,
    noise: Normal<f32>,
    rng: ChaCha8Rng,
}

impl Population {
    /// Creates a population of randomly initialised genomes.
    pub fn new(config: EvolutionConfig) -> Result<Self, EvolutionError> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        let noise =
            Normal::new(0.0, config.mutation_power).map_err(|_| EvolutionError::Distribution {
                field: "evolution.mutation_power",
                value: config.mutation_power,
            })?;
        let genomes = (0..config.population_size)
            .map(|_| {
                FeedForwardNetwork::random(
                    config.hidden_neurons,
                    config.weight_init_stdev,
                    &mut rng,
                )
                .map(Genome::new)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            config,
            genomes,
            best: None,
            generation: 0,
            noise,
            rng,
        })
    }

    /// Parameters the population was created with.
    #[must_use]
    pub const fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    /// Number of completed evolution steps.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Current genomes in binding order.
    #[must_use]
    pub fn genomes(&self) -> &[Genome] {
        &self.genomes
    }

    /// Best genome evaluated so far, with the fitness it earned.
    #[must_use]
    pub fn best(&self) -> Option<&Genome> {
        self.best.as_ref()
    }

    /// Lends every genome to a generation by reference.
    pub fn cohort(&mut self) -> Cohort<CohortMember<'_>> {
        self.genomes
            .iter_mut()
            .map(|genome| CohortMember::new(&mut genome.network, &mut genome.fitness))
            .collect()
    }

    /// Moves the genomes out for a generation that must own its cohort.
    ///
    /// The population is empty until [`Population::restore`] hands them back.
    pub fn take_cohort(&mut self) -> Cohort<Genome> {
        std::mem::take(&mut self.genomes).into_iter().collect()
    }

    /// Returns genomes previously taken with [`Population::take_cohort`].
    pub fn restore(&mut self, cohort: Cohort<Genome>) {
        self.genomes = cohort.into_members();
    }

    /// Remembers the fittest current genome if it beats the best seen so far.
    pub fn record_best(&mut self) {
        let Some(champion) = self
            .genomes
            .iter()
            .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
        else {
            return;
        };
        let improved = self
            .best
            .as_ref()
            .map_or(true, |best| champion.fitness > best.fitness);
        if improved {
            self.best = Some(champion.clone());
        }
    }

    /// Breeds the next generation from the evaluated genomes.
    ///
    /// Genomes are ranked by fitness, the elites are copied unchanged and the
    /// rest is refilled from the surviving fraction by crossover and mutation.
    pub fn evolve(&mut self) -> Result<(), EvolutionError> {
        if self.genomes.is_empty() {
            return Err(EvolutionError::EmptyPopulation);
        }
        self.record_best();

        let mut ranked = std::mem::take(&mut self.genomes);
        ranked.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));

        let survivors = ((ranked.len() as f64 * self.config.survival_fraction).ceil() as usize)
            .clamp(1, ranked.len());
        let parents = &ranked[..survivors];

        let mut next: Vec<Genome> = ranked
            .iter()
            .take(self.config.elitism)
            .map(|genome| Genome::new(genome.network.clone()))
            .collect();

        while next.len() < self.config.population_size {
            let first = &parents[self.rng.gen_range(0..parents.len())];
            let second = &parents[self.rng.gen_range(0..parents.len())];
            let mut child = first.network.crossover(&second.network, &mut self.rng);
            child.mutate(self.config.mutation_rate, &self.noise, &mut self.rng);
            next.push(Genome::new(child));
        }

        self.genomes = next;
        self.generation += 1;
        Ok(())
    }

    /// Trains for up to `generations` generations using `controller`.
    pub fn run(
        &mut self,
        controller: &mut GenerationController,
        generations: u64,
    ) -> Result<RunSummary, EvolutionError> {
        let mut reports = Vec::new();
        let mut reached_threshold = false;

        for _ in 0..generations {
            let (_, report) = controller.run_generation(self.cohort())?;
            self.record_best();
            info!(
                generation = report.generation,
                ticks = report.ticks,
                score = report.score,
                generation_best = report.best_fitness,
                best_fitness = self.best.as_ref().map(|best| best.fitness),
                "generation evaluated"
            );
            reports.push(report);

            if let (Some(threshold), Some(best)) = (self.config.fitness_threshold, &self.best) {
                if best.fitness >= threshold {
                    info!(threshold, "fitness threshold reached");
                    reached_threshold = true;
                    break;
                }
            }
            self.evolve()?;
        }

        Ok(RunSummary {
            generations: reports.len() as u64,
            best_fitness: self.best.as_ref().map(|best| best.fitness),
            reached_threshold,
            reports,
        })
    }

    /// Writes the best genome evaluated so far to `path`.
    pub fn save_checkpoint(&self, path: &std::path::Path) -> Result<(), EvolutionError> {
        let best = self.best.as_ref().ok_or(EvolutionError::NoBestGenome)?;
        Checkpoint {
            generation: self.generation,
            fitness: best.fitness,
            network: best.network.clone(),
        }
        .save(path)
    }
}
