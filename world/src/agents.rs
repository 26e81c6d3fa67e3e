//! Runner/jumper state machine for individual agents.

use dino_evolve_core::{
    AgentId, AgentIdentity, AgentSnapshot, AgentState, Rect, WorldConfig, JUMP_DECAY_PER_TICK,
    JUMP_RISE_FACTOR, REFERENCE_GAME_SPEED,
};

/// Ticks spent on each of the two run-cycle frames.
const RUN_CYCLE_TICKS: u8 = 5;

/// Authoritative state of a live agent.
#[derive(Clone, Debug)]
pub(crate) struct Agent {
    pub(crate) id: AgentId,
    pub(crate) hitbox: Rect,
    state: AgentState,
    jump_power: f32,
    run_cycle: u8,
    identity: AgentIdentity,
}

impl Agent {
    /// Places a running agent on the ground line.
    pub(crate) fn spawn(id: AgentId, identity: AgentIdentity, config: &WorldConfig) -> Self {
        let size = config.agent_size();
        Self {
            id,
            hitbox: Rect::new(config.agent_x, config.ground_line(), size.width, size.height),
            state: AgentState::Running,
            jump_power: config.jump_power,
            run_cycle: 0,
            identity,
        }
    }

    /// Advances the agent by one tick, returning `true` when it landed.
    pub(crate) fn update(&mut self, game_speed: f32, config: &WorldConfig) -> bool {
        match self.state {
            AgentState::Running => {
                self.run_cycle = (self.run_cycle + 1) % (RUN_CYCLE_TICKS * 2);
                false
            }
            AgentState::Jumping => self.fall(game_speed, config),
        }
    }

    fn fall(&mut self, game_speed: f32, config: &WorldConfig) -> bool {
        let scale = game_speed / REFERENCE_GAME_SPEED;
        let ground_line = config.ground_line();
        let y = self.hitbox.y() - self.jump_power * JUMP_RISE_FACTOR * scale;
        self.jump_power -= JUMP_DECAY_PER_TICK * scale;

        if y >= ground_line {
            self.hitbox = self.hitbox.with_y(ground_line);
            self.state = AgentState::Running;
            self.jump_power = config.jump_power;
            return true;
        }

        self.hitbox = self.hitbox.with_y(y);
        false
    }

    /// Starts a jump, returning `false` when the agent is already airborne.
    pub(crate) fn start_jump(&mut self) -> bool {
        if self.state == AgentState::Jumping {
            return false;
        }
        self.state = AgentState::Jumping;
        true
    }

    pub(crate) fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id,
            hitbox: self.hitbox,
            state: self.state,
            jump_power: self.jump_power,
            run_frame: self.run_cycle / RUN_CYCLE_TICKS,
            identity: self.identity,
        }
    }
}
