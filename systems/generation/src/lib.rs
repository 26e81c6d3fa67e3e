#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick engine and generation controller.
//!
//! A [`GenerationController`] binds a [`Cohort`] of candidates to freshly
//! spawned agents, then drives the world one tick at a time until every agent
//! has been eliminated. Fitness is written straight into the candidates'
//! handles while the generation runs.

mod cohort;

use std::collections::BTreeMap;

use dino_evolve_core::{AgentId, Command, ConfigError, Event, WorldConfig};
use dino_evolve_system_decision::{self as decision, Decision};
use dino_evolve_system_fitness::{Fitness, FitnessAward, Rewards};
use dino_evolve_system_spawning::{self as spawning, Spawning};
use dino_evolve_world::{self as world, query, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, info};

pub use self::cohort::{Candidate, Cohort, CohortMember};

/// Failures raised while binding or running a generation.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum GenerationError {
    /// The policy and fitness handle lists differ in length.
    #[error("cohort mismatch: {policies} policies but {handles} fitness handles")]
    CohortMismatch {
        /// Number of policies supplied.
        policies: usize,
        /// Number of fitness handles supplied.
        handles: usize,
    },
    /// The cohort has more members than agent identifiers can address.
    #[error("cohort of {members} members exceeds the agent identifier space")]
    CohortTooLarge {
        /// Number of members supplied.
        members: usize,
    },
    /// A fitness award or decision addressed an agent without a binding.
    #[error("agent {} has no policy binding", .0.get())]
    UnboundAgent(AgentId),
    /// One of the session configurations was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Parameters shared by every generation a controller runs.
#[derive(Clone, Debug, Default)]
pub struct GenerationConfig {
    /// Layout and physics parameters.
    pub world: WorldConfig,
    /// Obstacle spawning policy; its seed is replaced for every generation.
    pub spawning: spawning::Config,
    /// Jump threshold applied to policy outputs.
    pub decision: decision::Config,
    /// Reward shaping.
    pub rewards: Rewards,
    /// Seed of the controller's random number generator.
    pub rng_seed: u64,
    /// Optional cap on the ticks of a generation; `None` runs until exhaustion.
    pub max_ticks: Option<u64>,
}

/// Outcome of a single tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// At least one agent is still alive.
    Running,
    /// Every agent has been eliminated.
    Exhausted,
    /// The configured tick cap ended the generation with agents still alive.
    TickLimitReached,
}

/// Summary of a finished generation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenerationReport {
    /// One-based generation number.
    pub generation: u64,
    /// Number of ticks that advanced the world.
    pub ticks: u64,
    /// Final score.
    pub score: f32,
    /// Game speed reached.
    pub game_speed: f32,
    /// Obstacles that left the screen.
    pub obstacles_passed: u64,
    /// Highest fitness in the cohort, if any member took part.
    pub best_fitness: Option<f32>,
}

/// Drives successive generations with a shared configuration.
#[derive(Debug)]
pub struct GenerationController {
    config: GenerationConfig,
    decision: Decision,
    fitness: Fitness,
    rng: ChaCha8Rng,
    generation: u64,
}

impl GenerationController {
    /// Validates every configuration and creates the controller.
    pub fn new(config: GenerationConfig) -> Result<Self, GenerationError> {
        config.world.validate()?;
        config.spawning.validate()?;
        let decision = Decision::new(config.decision)?;
        let fitness = Fitness::new(config.rewards)?;
        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            config,
            decision,
            fitness,
            generation: 0,
        })
    }

    /// Number of generations started so far.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Configuration shared by every generation.
    #[must_use]
    pub const fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Starts a new generation with one agent per cohort member.
    ///
    /// Every fitness handle is zeroed before the first tick.
    pub fn begin<C: Candidate>(
        &mut self,
        mut cohort: Cohort<C>,
    ) -> Result<Generation<C>, GenerationError> {
        let population = u32::try_from(cohort.len()).map_err(|_| {
            GenerationError::CohortTooLarge {
                members: cohort.len(),
            }
        })?;
        self.generation += 1;

        for member in cohort.iter_mut() {
            *member.fitness_mut() = 0.0;
        }

        let mut spawning = Spawning::new(self.config.spawning.clone().with_seed(self.rng.gen()))?;
        let mut world = World::new(self.config.world.clone());
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::BeginGeneration { population },
            &mut events,
        );

        let mut commands = Vec::new();
        spawning.seed_initial(self.config.world.screen_width, &mut commands);
        for command in commands.drain(..) {
            world::apply(&mut world, command, &mut events);
        }

        let bindings = query::live_agents(&world)
            .into_iter()
            .enumerate()
            .map(|(index, agent)| (agent, index))
            .collect();

        info!(generation = self.generation, population, "generation started");

        Ok(Generation {
            number: self.generation,
            world,
            spawning,
            decision: self.decision,
            fitness: self.fitness,
            max_ticks: self.config.max_ticks,
            cohort,
            bindings,
            outcome: None,
            ticks: 0,
            obstacles_passed: 0,
            events: Vec::new(),
            commands,
            awards: Vec::new(),
        })
    }

    /// Runs a full generation and hands the cohort back once it has ended.
    pub fn run_generation<C: Candidate>(
        &mut self,
        cohort: Cohort<C>,
    ) -> Result<(Cohort<C>, GenerationReport), GenerationError> {
        let mut generation = self.begin(cohort)?;
        while generation.tick()? == TickOutcome::Running {}
        Ok(generation.finish())
    }
}

/// Generation in progress, owning the world and the bound cohort.
pub struct Generation<C> {
    number: u64,
    world: World,
    spawning: Spawning,
    decision: Decision,
    fitness: Fitness,
    max_ticks: Option<u64>,
    cohort: Cohort<C>,
    bindings: BTreeMap<AgentId, usize>,
    outcome: Option<TickOutcome>,
    ticks: u64,
    obstacles_passed: u64,
    events: Vec<Event>,
    commands: Vec<Command>,
    awards: Vec<FitnessAward>,
}

impl<C: Candidate> Generation<C> {
    /// Advances the generation by one tick.
    ///
    /// Ticking a finished generation reports its final outcome again without
    /// touching the world.
    pub fn tick(&mut self) -> Result<TickOutcome, GenerationError> {
        if let Some(outcome) = self.outcome {
            return Ok(outcome);
        }
        if self.max_ticks.is_some_and(|limit| self.ticks >= limit) {
            info!(
                generation = self.number,
                ticks = self.ticks,
                alive = self.live_count(),
                "generation reached its tick limit"
            );
            self.outcome = Some(TickOutcome::TickLimitReached);
            return Ok(TickOutcome::TickLimitReached);
        }

        self.events.clear();
        world::apply(&mut self.world, Command::Tick, &mut self.events);
        if self
            .events
            .iter()
            .any(|event| matches!(event, Event::CohortExhausted))
        {
            self.outcome = Some(TickOutcome::Exhausted);
            info!(
                generation = self.number,
                ticks = self.ticks,
                score = query::score(&self.world),
                obstacles_passed = self.obstacles_passed,
                "generation exhausted"
            );
            return Ok(TickOutcome::Exhausted);
        }
        self.ticks += 1;

        self.commands.clear();
        self.spawning.handle(
            &query::obstacle_view(&self.world),
            query::config(&self.world).screen_width,
            &mut self.commands,
        );
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }

        self.events.clear();
        world::apply(&mut self.world, Command::AdvanceObstacles, &mut self.events);
        self.fitness.handle(&self.events, &mut self.awards);
        self.apply_awards()?;
        self.release_eliminated();

        self.decide()?;
        self.events.clear();
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
        self.fitness.handle(&self.events, &mut self.awards);
        self.apply_awards()?;

        self.events.clear();
        world::apply(&mut self.world, Command::AdvanceScore, &mut self.events);
        for event in &self.events {
            if let Event::GameSpeedIncreased { game_speed } = event {
                info!(generation = self.number, game_speed, "game speed increased");
            }
        }

        Ok(TickOutcome::Running)
    }

    fn apply_awards(&mut self) -> Result<(), GenerationError> {
        for award in self.awards.drain(..) {
            let member = self
                .bindings
                .get(&award.agent)
                .and_then(|index| self.cohort.member_mut(*index))
                .ok_or(GenerationError::UnboundAgent(award.agent))?;
            *member.fitness_mut() += award.amount;
        }
        Ok(())
    }

    fn release_eliminated(&mut self) {
        for event in &self.events {
            match event {
                Event::AgentEliminated { agent, obstacle } => {
                    debug!(
                        generation = self.number,
                        agent = agent.get(),
                        obstacle = obstacle.get(),
                        tick = self.ticks,
                        "agent eliminated"
                    );
                    let _ = self.bindings.remove(agent);
                }
                Event::ObstaclePassed { .. } => self.obstacles_passed += 1,
                _ => {}
            }
        }
    }

    fn decide(&mut self) -> Result<(), GenerationError> {
        let agents = query::agent_view(&self.world);
        let obstacles = query::obstacle_view(&self.world);
        let game_speed = query::game_speed(&self.world);

        self.commands.clear();
        for agent in agents.iter() {
            let Some(sensors) = decision::sense(agent, &obstacles, game_speed) else {
                continue;
            };
            let member = self
                .bindings
                .get(&agent.id)
                .and_then(|index| self.cohort.member_mut(*index))
                .ok_or(GenerationError::UnboundAgent(agent.id))?;
            self.decision
                .decide(agent, &sensors, member.policy(), &mut self.commands);
        }
        Ok(())
    }

    /// Reports whether the generation has ended.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// One-based number of this generation.
    #[must_use]
    pub const fn number(&self) -> u64 {
        self.number
    }

    /// Read-only access to the world for renderers and diagnostics.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Number of agents still alive.
    #[must_use]
    pub fn live_count(&self) -> usize {
        query::live_agent_count(&self.world)
    }

    /// Number of members taking part in the generation.
    #[must_use]
    pub fn population(&self) -> usize {
        self.cohort.len()
    }

    /// Number of ticks that advanced the world so far.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Obstacles that left the screen so far.
    #[must_use]
    pub const fn obstacles_passed(&self) -> u64 {
        self.obstacles_passed
    }

    /// Ends the generation, returning the cohort in its original order.
    #[must_use]
    pub fn finish(mut self) -> (Cohort<C>, GenerationReport) {
        let best_fitness = self
            .cohort
            .iter_mut()
            .map(|member| *member.fitness_mut())
            .reduce(f32::max);
        let report = GenerationReport {
            generation: self.number,
            ticks: self.ticks,
            score: query::score(&self.world),
            game_speed: query::game_speed(&self.world),
            obstacles_passed: self.obstacles_passed,
            best_fitness,
        };
        (self.cohort, report)
    }
}
