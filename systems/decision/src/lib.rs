#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns policy outputs into jump commands.

use dino_evolve_core::{
    distance, ensure_finite, AgentSnapshot, AgentState, Command, ConfigError, ObstacleView,
    Policy, Sensors,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

const DEFAULT_JUMP_THRESHOLD: f32 = 0.5;

/// Assembles the sensor vector of an agent against the front of the obstacle queue.
///
/// Returns `None` when no obstacle is queued.
#[must_use]
pub fn sense(agent: &AgentSnapshot, obstacles: &ObstacleView, game_speed: f32) -> Option<Sensors> {
    let nearest = obstacles.nearest()?;
    Some(Sensors {
        y: agent.hitbox.y(),
        distance: distance(agent.hitbox.origin(), nearest.hitbox.mid_top()),
        obstacle_width: nearest.hitbox.width(),
        game_speed,
    })
}

/// Tuning parameters of the decision system.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Policy outputs strictly above this value trigger a jump.
    pub jump_threshold: f32,
}

impl Config {
    /// Checks that the threshold is a finite number.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_finite("decision.jump_threshold", self.jump_threshold)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            jump_threshold: DEFAULT_JUMP_THRESHOLD,
        }
    }
}

/// Decision system that consults one policy per live agent.
#[derive(Clone, Copy, Debug)]
pub struct Decision {
    jump_threshold: f32,
}

impl Decision {
    /// Creates the decision system from a validated configuration.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            jump_threshold: config.jump_threshold,
        })
    }

    /// Threshold the policy output must exceed.
    #[must_use]
    pub const fn jump_threshold(&self) -> f32 {
        self.jump_threshold
    }

    /// Consults `policy` and emits a jump command when the agent should leave the ground.
    ///
    /// The policy is queried every tick, including while the agent is airborne.
    /// Non-finite outputs are reported and treated as "keep running".
    pub fn decide(
        &self,
        agent: &AgentSnapshot,
        sensors: &Sensors,
        policy: &mut dyn Policy,
        out: &mut Vec<Command>,
    ) {
        let output = policy.decide(sensors);
        if !output.is_finite() {
            warn!(agent = agent.id.get(), output, "policy produced a non-finite output");
            return;
        }

        if output > self.jump_threshold && agent.state == AgentState::Running {
            out.push(Command::Jump { agent: agent.id });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_finite_threshold_is_rejected() {
        let error = Decision::new(Config {
            jump_threshold: f32::NAN,
        })
        .expect_err("nan threshold must be rejected");
        assert!(matches!(error, ConfigError::NonFinite { .. }));
    }

    #[test]
    fn default_threshold_is_one_half() {
        let decision = Decision::new(Config::default()).expect("valid config");
        assert_eq!(decision.jump_threshold(), 0.5);
    }
}
