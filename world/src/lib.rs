#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for dino-evolve.
//!
//! The world owns every piece of mutable session state: the live agents, the
//! obstacle queue, game speed and score. It is only ever mutated through
//! [`apply`], which translates a [`Command`] into state changes and reports
//! them as [`Event`] values.

mod agents;
mod obstacles;

use dino_evolve_core::{
    AgentId, AgentIdentity, Command, Event, ObstacleId, ObstacleKind, WorldConfig,
};

use self::{agents::Agent, obstacles::Obstacle};

const SCORE_GAIN: f32 = 0.5;
const SCORE_SPEED_DIVISOR: f32 = 4.0;
const SPEEDUP_STEP: f32 = 100.0;
const SPEEDUP_SPEED_DIVISOR: f32 = 2.0;
const SPEED_INCREMENT: f32 = 1.0;

/// Represents the authoritative dino-evolve world state.
#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    agents: Vec<Agent>,
    obstacles: Vec<Obstacle>,
    next_obstacle_id: u32,
    game_speed: f32,
    score: f32,
    speedup_threshold: f32,
    tick_index: u64,
}

impl World {
    /// Creates an empty world using the provided layout and physics parameters.
    #[must_use]
    pub fn new(config: WorldConfig) -> Self {
        Self {
            game_speed: config.initial_game_speed,
            speedup_threshold: config.initial_speedup_threshold,
            config,
            agents: Vec::new(),
            obstacles: Vec::new(),
            next_obstacle_id: 0,
            score: 0.0,
            tick_index: 0,
        }
    }

    fn reset(&mut self, population: u32) {
        self.game_speed = self.config.initial_game_speed;
        self.score = 0.0;
        self.speedup_threshold = self.config.initial_speedup_threshold;
        self.tick_index = 0;
        self.next_obstacle_id = 0;
        self.obstacles.clear();
        self.agents = (0..population)
            .map(|index| {
                let identity = AgentIdentity::for_index(index as usize);
                Agent::spawn(AgentId::new(index), identity, &self.config)
            })
            .collect();
    }

    fn agent_mut(&mut self, agent: AgentId) -> Option<&mut Agent> {
        self.agents
            .binary_search_by_key(&agent, |candidate| candidate.id)
            .ok()
            .map(|index| &mut self.agents[index])
    }

    fn advance_agents(&mut self, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced {
            tick: self.tick_index,
        });

        let game_speed = self.game_speed;
        for agent in self.agents.iter_mut() {
            if agent.update(game_speed, &self.config) {
                out_events.push(Event::AgentLanded { agent: agent.id });
            }
        }

        if self.agents.is_empty() {
            out_events.push(Event::CohortExhausted);
        }
    }

    fn spawn_obstacle(&mut self, kind: ObstacleKind, x: f32, out_events: &mut Vec<Event>) {
        let id = ObstacleId::new(self.next_obstacle_id);
        self.next_obstacle_id = self.next_obstacle_id.saturating_add(1);

        let obstacle = Obstacle::spawn(id, kind, x, &self.config);
        let hitbox = obstacle.hitbox();
        let position = self
            .obstacles
            .partition_point(|queued| queued.hitbox().x() <= x);
        self.obstacles.insert(position, obstacle);
        out_events.push(Event::ObstacleSpawned {
            obstacle: id,
            kind,
            hitbox,
        });
    }

    fn advance_obstacles(&mut self, out_events: &mut Vec<Event>) {
        let game_speed = self.game_speed;
        let Self {
            agents, obstacles, ..
        } = self;

        for obstacle in obstacles.iter_mut() {
            obstacle.advance(game_speed);
            if !obstacle.is_active() {
                continue;
            }

            let hitbox = obstacle.hitbox();
            let obstacle_id = obstacle.id();
            agents.retain(|agent| {
                if agent.hitbox.intersects(&hitbox) {
                    out_events.push(Event::AgentEliminated {
                        agent: agent.id,
                        obstacle: obstacle_id,
                    });
                    false
                } else {
                    true
                }
            });
        }

        obstacles.retain(|obstacle| {
            if obstacle.is_active() {
                return true;
            }
            out_events.push(Event::ObstaclePassed {
                obstacle: obstacle.id(),
                survivors: agents.iter().map(|agent| agent.id).collect(),
            });
            false
        });

        for obstacle in obstacles.iter_mut() {
            obstacle.animate();
        }
    }

    fn advance_score(&mut self, out_events: &mut Vec<Event>) {
        self.score += SCORE_GAIN * (self.game_speed / SCORE_SPEED_DIVISOR);
        if self.score > self.speedup_threshold {
            self.speedup_threshold += SPEEDUP_STEP * (self.game_speed / SPEEDUP_SPEED_DIVISOR);
            self.game_speed += SPEED_INCREMENT;
            out_events.push(Event::GameSpeedIncreased {
                game_speed: self.game_speed,
            });
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::BeginGeneration { population } => {
            world.reset(population);
            out_events.push(Event::GenerationStarted { population });
        }
        Command::Tick => world.advance_agents(out_events),
        Command::SpawnObstacle { kind, x } => world.spawn_obstacle(kind, x, out_events),
        Command::AdvanceObstacles => world.advance_obstacles(out_events),
        Command::Jump { agent } => {
            if let Some(target) = world.agent_mut(agent) {
                if target.start_jump() {
                    out_events.push(Event::AgentJumped { agent });
                }
            }
        }
        Command::AdvanceScore => world.advance_score(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use dino_evolve_core::{AgentId, AgentView, ObstacleView, WorldConfig};

    use super::World;

    /// Layout and physics parameters the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &WorldConfig {
        &world.config
    }

    /// Captures a read-only view of the live agents.
    #[must_use]
    pub fn agent_view(world: &World) -> AgentView {
        AgentView::from_snapshots(world.agents.iter().map(|agent| agent.snapshot()).collect())
    }

    /// Captures a read-only view of the obstacle queue, nearest first.
    #[must_use]
    pub fn obstacle_view(world: &World) -> ObstacleView {
        ObstacleView::from_snapshots(
            world
                .obstacles
                .iter()
                .map(|obstacle| obstacle.snapshot())
                .collect(),
        )
    }

    /// Identifiers of the live agents in ascending order.
    #[must_use]
    pub fn live_agents(world: &World) -> Vec<AgentId> {
        world.agents.iter().map(|agent| agent.id).collect()
    }

    /// Number of agents still alive.
    #[must_use]
    pub fn live_agent_count(world: &World) -> usize {
        world.agents.len()
    }

    /// Number of obstacles in the queue.
    #[must_use]
    pub fn obstacle_count(world: &World) -> usize {
        world.obstacles.len()
    }

    /// Current horizontal scroll speed.
    #[must_use]
    pub fn game_speed(world: &World) -> f32 {
        world.game_speed
    }

    /// Score accrued during the current generation.
    #[must_use]
    pub fn score(world: &World) -> f32 {
        world.score
    }

    /// Score that triggers the next speed increase.
    #[must_use]
    pub fn speedup_threshold(world: &World) -> f32 {
        world.speedup_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dino_evolve_core::GroundVariant;

    fn started(population: u32) -> World {
        let mut world = World::default();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::BeginGeneration { population },
            &mut events,
        );
        assert_eq!(events, vec![Event::GenerationStarted { population }]);
        world
    }

    #[test]
    fn begin_generation_resets_session_state() {
        let mut world = started(2);
        let mut events = Vec::new();
        for _ in 0..400 {
            apply(&mut world, Command::AdvanceScore, &mut events);
        }
        assert!(query::game_speed(&world) > 8.0);

        apply(
            &mut world,
            Command::BeginGeneration { population: 5 },
            &mut events,
        );
        assert_eq!(query::game_speed(&world), 8.0);
        assert_eq!(query::score(&world), 0.0);
        assert_eq!(query::speedup_threshold(&world), 100.0);
        assert_eq!(query::live_agent_count(&world), 5);
        assert_eq!(query::obstacle_count(&world), 0);
    }

    #[test]
    fn spawned_obstacles_stay_sorted_by_position() {
        let mut world = started(1);
        let mut events = Vec::new();
        for x in [900.0, 1500.0, 1200.0] {
            apply(
                &mut world,
                Command::SpawnObstacle {
                    kind: ObstacleKind::Ground(GroundVariant::SmallSingle),
                    x,
                },
                &mut events,
            );
        }
        let positions: Vec<f32> = query::obstacle_view(&world)
            .iter()
            .map(|obstacle| obstacle.hitbox.x())
            .collect();
        assert_eq!(positions, vec![900.0, 1200.0, 1500.0]);
    }

    #[test]
    fn tick_reports_exhaustion_once_agents_are_gone() {
        let mut world = started(0);
        let mut events = Vec::new();
        apply(&mut world, Command::Tick, &mut events);
        assert_eq!(
            events,
            vec![Event::TimeAdvanced { tick: 1 }, Event::CohortExhausted]
        );
    }

    #[test]
    fn jump_for_unknown_agent_is_ignored() {
        let mut world = started(1);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Jump {
                agent: AgentId::new(9),
            },
            &mut events,
        );
        assert!(events.is_empty());
    }
}
