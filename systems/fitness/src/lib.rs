#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that converts world events into fitness awards.

use dino_evolve_core::{ensure_finite, AgentId, ConfigError, Event};
use serde::{Deserialize, Serialize};

/// Reward shaping applied to agents during a generation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rewards {
    /// Subtracted once when an agent is eliminated.
    pub elimination_penalty: f32,
    /// Subtracted every time an agent starts a jump.
    pub jump_penalty: f32,
    /// Added to every live agent whenever an obstacle leaves the screen.
    pub survival_bonus: f32,
}

impl Rewards {
    /// Checks that every reward is a finite number.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_finite("rewards.elimination_penalty", self.elimination_penalty)?;
        ensure_finite("rewards.jump_penalty", self.jump_penalty)?;
        ensure_finite("rewards.survival_bonus", self.survival_bonus)
    }
}

impl Default for Rewards {
    fn default() -> Self {
        Self {
            elimination_penalty: 10.0,
            jump_penalty: 1.0,
            survival_bonus: 5.0,
        }
    }
}

/// Cause of a fitness adjustment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AwardReason {
    /// The agent collided with an obstacle.
    Eliminated,
    /// The agent started a jump.
    Jumped,
    /// The agent was alive when an obstacle was pruned.
    Survived,
}

/// Signed fitness adjustment addressed to a single agent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitnessAward {
    /// Agent whose fitness changes.
    pub agent: AgentId,
    /// Amount added to the agent's fitness.
    pub amount: f32,
    /// Cause of the adjustment.
    pub reason: AwardReason,
}

/// Fitness bookkeeping system.
#[derive(Clone, Copy, Debug)]
pub struct Fitness {
    rewards: Rewards,
}

impl Fitness {
    /// Creates the fitness system from validated rewards.
    pub fn new(rewards: Rewards) -> Result<Self, ConfigError> {
        rewards.validate()?;
        Ok(Self { rewards })
    }

    /// Translates `events` into awards, appending them to `out` in event order.
    pub fn handle(&self, events: &[Event], out: &mut Vec<FitnessAward>) {
        for event in events {
            match event {
                Event::AgentEliminated { agent, .. } => out.push(FitnessAward {
                    agent: *agent,
                    amount: -self.rewards.elimination_penalty,
                    reason: AwardReason::Eliminated,
                }),
                Event::AgentJumped { agent } => out.push(FitnessAward {
                    agent: *agent,
                    amount: -self.rewards.jump_penalty,
                    reason: AwardReason::Jumped,
                }),
                Event::ObstaclePassed { survivors, .. } => {
                    out.extend(survivors.iter().map(|agent| FitnessAward {
                        agent: *agent,
                        amount: self.rewards.survival_bonus,
                        reason: AwardReason::Survived,
                    }));
                }
                _ => {}
            }
        }
    }
}
