#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for keeping the obstacle queue stocked.

use dino_evolve_core::{
    ensure_at_least, ensure_finite, ensure_unit_interval, Command, ConfigError, GroundVariant,
    ObstacleKind, ObstacleView,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const DEFAULT_SPACING: (f32, f32) = (0.8, 3.0);
const DEFAULT_LOOKAHEAD: usize = 3;
const DEFAULT_FLYING_PROBABILITY: f64 = 0.5;
const DEFAULT_INITIAL_OFFSETS: [f32; 3] = [300.0, 200.0, 400.0];

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    spacing: (f32, f32),
    lookahead: usize,
    flying_probability: f64,
    initial_offsets: Vec<f32>,
    rng_seed: u64,
}

impl Config {
    /// Creates a configuration with the default spacing policy and the provided seed.
    #[must_use]
    pub fn new(rng_seed: u64) -> Self {
        Self {
            spacing: DEFAULT_SPACING,
            lookahead: DEFAULT_LOOKAHEAD,
            flying_probability: DEFAULT_FLYING_PROBABILITY,
            initial_offsets: DEFAULT_INITIAL_OFFSETS.to_vec(),
            rng_seed,
        }
    }

    /// Sets the divisor range sampled when spacing consecutive obstacles.
    ///
    /// The gap between two obstacles is `world_width / uniform(min, max)`.
    #[must_use]
    pub fn with_spacing(mut self, min_divisor: f32, max_divisor: f32) -> Self {
        self.spacing = (min_divisor, max_divisor);
        self
    }

    /// Sets the minimum number of queued obstacles.
    #[must_use]
    pub fn with_lookahead(mut self, lookahead: usize) -> Self {
        self.lookahead = lookahead;
        self
    }

    /// Sets the probability that a topped-up obstacle is a flying one.
    #[must_use]
    pub fn with_flying_probability(mut self, probability: f64) -> Self {
        self.flying_probability = probability;
        self
    }

    /// Sets the offsets used when seeding the initial ground obstacles.
    #[must_use]
    pub fn with_initial_offsets(mut self, offsets: Vec<f32>) -> Self {
        self.initial_offsets = offsets;
        self
    }

    /// Replaces the seed of the random number generator.
    #[must_use]
    pub fn with_seed(mut self, rng_seed: u64) -> Self {
        self.rng_seed = rng_seed;
        self
    }

    /// Seed used by the random number generator.
    #[must_use]
    pub const fn rng_seed(&self) -> u64 {
        self.rng_seed
    }

    /// Minimum number of queued obstacles.
    #[must_use]
    pub const fn lookahead(&self) -> usize {
        self.lookahead
    }

    /// Rejects degenerate sampling ranges and probabilities.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (min, max) = self.spacing;
        if !(min.is_finite() && max.is_finite() && min > 0.0 && min < max) {
            return Err(ConfigError::InvalidRange {
                field: "spawning.spacing",
                min: f64::from(min),
                max: f64::from(max),
            });
        }
        ensure_at_least("spawning.lookahead", self.lookahead as u64, 1)?;
        ensure_unit_interval("spawning.flying_probability", self.flying_probability)?;
        for offset in &self.initial_offsets {
            ensure_finite("spawning.initial_offsets", *offset)?;
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Pure system that emits obstacle spawn commands.
#[derive(Debug)]
pub struct Spawning {
    spacing: (f32, f32),
    lookahead: usize,
    flying_probability: f64,
    initial_offsets: Vec<f32>,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            spacing: config.spacing,
            lookahead: config.lookahead,
            flying_probability: config.flying_probability,
            initial_offsets: config.initial_offsets,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        })
    }

    /// Emits the ground obstacles that open every generation.
    ///
    /// Obstacle `i` is placed at `world_width * (i + 1) + offset_i / uniform(min, max)`,
    /// which staggers them beyond the right edge of the screen.
    pub fn seed_initial(&mut self, world_width: f32, out: &mut Vec<Command>) {
        for index in 0..self.initial_offsets.len() {
            let offset = self.initial_offsets[index];
            let x = world_width * (index + 1) as f32 + offset / self.sample_divisor();
            let kind = ObstacleKind::Ground(self.sample_variant());
            out.push(Command::SpawnObstacle { kind, x });
        }
    }

    /// Tops the obstacle queue up to the configured lookahead.
    pub fn handle(&mut self, obstacles: &ObstacleView, world_width: f32, out: &mut Vec<Command>) {
        let mut queued = obstacles.len();
        let mut anchor = obstacles
            .last()
            .map_or(world_width, |obstacle| obstacle.hitbox.x());

        while queued < self.lookahead {
            let x = anchor + world_width / self.sample_divisor();
            let kind = if self.rng.gen_bool(self.flying_probability) {
                ObstacleKind::Flying
            } else {
                ObstacleKind::Ground(self.sample_variant())
            };
            out.push(Command::SpawnObstacle { kind, x });
            anchor = x;
            queued += 1;
        }
    }

    fn sample_divisor(&mut self) -> f32 {
        let (min, max) = self.spacing;
        self.rng.gen_range(min..max)
    }

    fn sample_variant(&mut self) -> GroundVariant {
        let index = self.rng.gen_range(0..GroundVariant::ALL.len());
        GroundVariant::ALL[index]
    }
}
