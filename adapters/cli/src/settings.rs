//! TOML settings file mapped onto the library configurations.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use dino_evolve_core::WorldConfig;
use dino_evolve_system_decision as decision;
use dino_evolve_system_evolution::EvolutionConfig;
use dino_evolve_system_fitness::Rewards;
use dino_evolve_system_generation::GenerationConfig;
use dino_evolve_system_spawning as spawning;
use serde::Deserialize;

/// Every section is optional; missing sections and fields keep their defaults.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    pub(crate) world: WorldConfig,
    pub(crate) spawning: SpawningSettings,
    pub(crate) decision: decision::Config,
    pub(crate) rewards: Rewards,
    pub(crate) evolution: EvolutionConfig,
    pub(crate) generation: GenerationSettings,
}

/// Obstacle spawning knobs, applied on top of the spawner defaults.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SpawningSettings {
    pub(crate) min_spacing_divisor: f32,
    pub(crate) max_spacing_divisor: f32,
    pub(crate) lookahead: usize,
    pub(crate) flying_probability: f64,
    pub(crate) initial_offsets: Vec<f32>,
}

impl Default for SpawningSettings {
    fn default() -> Self {
        Self {
            min_spacing_divisor: 0.8,
            max_spacing_divisor: 3.0,
            lookahead: 3,
            flying_probability: 0.5,
            initial_offsets: vec![300.0, 200.0, 400.0],
        }
    }
}

impl SpawningSettings {
    fn to_config(&self) -> spawning::Config {
        spawning::Config::default()
            .with_spacing(self.min_spacing_divisor, self.max_spacing_divisor)
            .with_lookahead(self.lookahead)
            .with_flying_probability(self.flying_probability)
            .with_initial_offsets(self.initial_offsets.clone())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GenerationSettings {
    /// Seed of the course generator shared by every generation.
    pub(crate) rng_seed: u64,
    /// Optional cap on the ticks of a single generation.
    pub(crate) max_ticks: Option<u64>,
}

impl Settings {
    /// Reads settings from `path`, or returns the defaults when none is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid settings in {}", path.display()))
    }

    fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Overrides both random seeds.
    pub(crate) fn reseed(&mut self, seed: u64) {
        self.evolution.rng_seed = seed;
        self.generation.rng_seed = seed;
    }

    pub(crate) fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            world: self.world.clone(),
            spawning: self.spawning.to_config(),
            decision: self.decision,
            rewards: self.rewards,
            rng_seed: self.generation.rng_seed,
            max_ticks: self.generation.max_ticks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let settings = Settings::parse("").expect("empty settings parse");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.evolution.population_size, 50);
        assert_eq!(settings.world.screen_width, 1280.0);
    }

    #[test]
    fn sections_override_individual_fields() {
        let settings = Settings::parse(
            r#"
            [world]
            jump_power = 12.0

            [spawning]
            flying_probability = 0.0
            lookahead = 5

            [decision]
            jump_threshold = 0.75

            [rewards]
            survival_bonus = 2.0

            [evolution]
            population_size = 8
            fitness_threshold = 500.0

            [generation]
            rng_seed = 99
            max_ticks = 4000
            "#,
        )
        .expect("settings parse");

        assert_eq!(settings.world.jump_power, 12.0);
        assert_eq!(settings.world.agent_x, 250.0);
        assert_eq!(settings.spawning.lookahead, 5);
        assert_eq!(settings.spawning.max_spacing_divisor, 3.0);
        assert_eq!(settings.decision.jump_threshold, 0.75);
        assert_eq!(settings.rewards.survival_bonus, 2.0);
        assert_eq!(settings.rewards.elimination_penalty, 10.0);
        assert_eq!(settings.evolution.population_size, 8);
        assert_eq!(settings.evolution.fitness_threshold, Some(500.0));

        let config = settings.generation_config();
        assert_eq!(config.rng_seed, 99);
        assert_eq!(config.max_ticks, Some(4000));
        assert_eq!(config.spawning.lookahead(), 5);
    }

    #[test]
    fn unknown_sections_are_rejected() {
        assert!(Settings::parse("[physics]\ngravity = 3.0\n").is_err());
    }

    #[test]
    fn reseed_replaces_both_seeds() {
        let mut settings = Settings::default();
        settings.reseed(7);
        assert_eq!(settings.evolution.rng_seed, 7);
        assert_eq!(settings.generation_config().rng_seed, 7);
    }

    #[test]
    fn missing_files_report_their_path() {
        let error = Settings::load(Some(Path::new("/nonexistent/dino.toml")))
            .expect_err("missing file");
        assert!(format!("{error:#}").contains("/nonexistent/dino.toml"));
    }
}
