#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the dino-evolve simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. The tick engine submits [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots such as [`AgentView`] and [`ObstacleView`], and respond
//! exclusively with new command batches.
//!
//! Agents are steered by a [`Policy`], an opaque decision function mapping the
//! four-element [`Sensors`] vector onto a scalar jump signal.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Game speed at which jump arcs use their nominal shape.
///
/// Jump displacement and decay both scale with `game_speed / REFERENCE_GAME_SPEED`.
pub const REFERENCE_GAME_SPEED: f32 = 8.0;

/// Factor applied to the current jump power when lifting an airborne agent.
pub const JUMP_RISE_FACTOR: f32 = 2.0;

/// Jump power lost per tick at the reference game speed.
pub const JUMP_DECAY_PER_TICK: f32 = 0.5;

/// Upper bound on the ticks a jump may take to reach its apex.
pub const MAX_RISE_TICKS: u32 = 1_000;

/// Name given to agents once [`AGENT_NAMES`] is exhausted.
pub const DEFAULT_AGENT_NAME: &str = "Dino";

/// Skin given to agents once [`AGENT_SKINS`] is exhausted.
pub const DEFAULT_AGENT_SKIN: &str = "default";

/// Cosmetic names handed out to agents in cohort order.
pub const AGENT_NAMES: [&str; 18] = [
    "Rex", "Spike", "Dash", "Pebble", "Comet", "Bolt", "Nibbles", "Sprout", "Fang", "Ember",
    "Ziggy", "Pip", "Rusty", "Ghostling", "Captain", "Sigma", "Biscuit", "Chief",
];

/// Cosmetic skins handed out to agents in cohort order.
pub const AGENT_SKINS: [&str; 20] = [
    "default", "aqua", "black", "bloody", "cobalt", "gold", "insta", "lime", "magenta", "magma",
    "navy", "neon", "orange", "pinky", "purple", "rgb", "silver", "subaru", "sunny", "toxic",
];

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Resets the session state and spawns one running agent per cohort member.
    BeginGeneration {
        /// Number of agents to instantiate; identifiers are `0..population`.
        population: u32,
    },
    /// Advances every live agent by a single tick of jump physics.
    Tick,
    /// Requests that a new obstacle be appended to the obstacle queue.
    SpawnObstacle {
        /// Shape of the obstacle to create.
        kind: ObstacleKind,
        /// Horizontal position of the obstacle's left edge in world units.
        x: f32,
    },
    /// Scrolls every obstacle left, resolving collisions and pruning off-screen obstacles.
    AdvanceObstacles,
    /// Requests that an agent start a jump.
    Jump {
        /// Identifier of the agent that should leave the ground.
        agent: AgentId,
    },
    /// Accrues score for the elapsed tick and ramps the game speed when due.
    AdvanceScore,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a fresh generation was set up.
    GenerationStarted {
        /// Number of agents placed on the ground line.
        population: u32,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Index of the tick that just completed, starting at one.
        tick: u64,
    },
    /// Reports that the live set is empty, ending the generation.
    CohortExhausted,
    /// Reports that an airborne agent touched the ground again.
    AgentLanded {
        /// Identifier of the agent that landed.
        agent: AgentId,
    },
    /// Confirms that an obstacle joined the queue.
    ObstacleSpawned {
        /// Identifier assigned to the obstacle by the world.
        obstacle: ObstacleId,
        /// Shape of the spawned obstacle.
        kind: ObstacleKind,
        /// Hitbox occupied by the obstacle at spawn time.
        hitbox: Rect,
    },
    /// Reports that an agent collided with an obstacle and left the live set.
    AgentEliminated {
        /// Identifier of the eliminated agent.
        agent: AgentId,
        /// Identifier of the obstacle it hit.
        obstacle: ObstacleId,
    },
    /// Reports that an obstacle scrolled fully off-screen and was pruned.
    ObstaclePassed {
        /// Identifier of the pruned obstacle.
        obstacle: ObstacleId,
        /// Every agent alive at the moment the obstacle was pruned.
        survivors: Vec<AgentId>,
    },
    /// Confirms that a running agent started a jump.
    AgentJumped {
        /// Identifier of the agent that jumped.
        agent: AgentId,
    },
    /// Announces that the score crossed the speed-up threshold.
    GameSpeedIncreased {
        /// Game speed in effect from the next tick onwards.
        game_speed: f32,
    },
}

/// Location expressed in world units, with `y` growing downwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl Point {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Computes the Euclidean distance between two points.
#[must_use]
pub fn distance(a: Point, b: Point) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// Dimensions of a rectangle measured in world units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Size {
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
}

impl Size {
    /// Creates a new size descriptor.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle anchored at its upper-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl Rect {
    /// Creates a rectangle from its upper-left corner and dimensions.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle whose bottom edge rests on `baseline`.
    #[must_use]
    pub fn standing_on(x: f32, baseline: f32, size: Size) -> Self {
        Self::new(x, baseline - size.height, size.width, size.height)
    }

    /// X coordinate of the left edge.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Y coordinate of the top edge.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Horizontal extent.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Vertical extent.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// X coordinate of the left edge.
    #[must_use]
    pub const fn left(&self) -> f32 {
        self.x
    }

    /// X coordinate of the right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Y coordinate of the top edge.
    #[must_use]
    pub const fn top(&self) -> f32 {
        self.y
    }

    /// Y coordinate of the bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Upper-left corner.
    #[must_use]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Midpoint of the top edge.
    #[must_use]
    pub fn mid_top(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y)
    }

    /// Returns a copy moved by the provided offsets.
    #[must_use]
    pub fn translated(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Returns a copy with its top edge moved to `y`.
    #[must_use]
    pub fn with_y(self, y: f32) -> Self {
        Self::new(self.x, y, self.width, self.height)
    }

    /// Reports whether the two rectangles overlap.
    ///
    /// Edges that merely touch do not count as an overlap.
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }
}

/// Unique identifier assigned to an agent, matching its cohort position.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new agent identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an obstacle within a generation.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ObstacleId(u32);

impl ObstacleId {
    /// Creates a new obstacle identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Cosmetic identity of an agent. Never influences behaviour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AgentIdentity {
    /// Display name.
    pub name: &'static str,
    /// Skin used by renderers to pick a colour.
    pub skin: &'static str,
}

impl AgentIdentity {
    /// Returns the identity handed to the agent at the provided cohort index.
    #[must_use]
    pub fn for_index(index: usize) -> Self {
        Self {
            name: AGENT_NAMES.get(index).copied().unwrap_or(DEFAULT_AGENT_NAME),
            skin: AGENT_SKINS.get(index).copied().unwrap_or(DEFAULT_AGENT_SKIN),
        }
    }
}

/// Locomotion state of an agent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AgentState {
    /// Agent is on the ground line.
    #[default]
    Running,
    /// Agent is airborne and follows the jump arc.
    Jumping,
}

/// Cactus shapes available to ground obstacles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GroundVariant {
    /// One short cactus.
    SmallSingle,
    /// Two short cacti.
    SmallDouble,
    /// Three short cacti.
    SmallTriple,
    /// One tall cactus.
    LargeSingle,
    /// Two tall cacti.
    LargeDouble,
    /// Three tall cacti.
    LargeTriple,
}

impl GroundVariant {
    /// Every variant in a stable order, used for uniform sampling.
    pub const ALL: [GroundVariant; 6] = [
        GroundVariant::SmallSingle,
        GroundVariant::SmallDouble,
        GroundVariant::SmallTriple,
        GroundVariant::LargeSingle,
        GroundVariant::LargeDouble,
        GroundVariant::LargeTriple,
    ];

    /// Hitbox dimensions of the variant.
    #[must_use]
    pub const fn size(self) -> Size {
        match self {
            Self::SmallSingle => Size::new(30.0, 60.0),
            Self::SmallDouble => Size::new(60.0, 60.0),
            Self::SmallTriple => Size::new(90.0, 60.0),
            Self::LargeSingle => Size::new(45.0, 80.0),
            Self::LargeDouble => Size::new(90.0, 80.0),
            Self::LargeTriple => Size::new(135.0, 80.0),
        }
    }
}

/// Discriminates the two obstacle families.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObstacleKind {
    /// Cactus resting on the ground baseline.
    Ground(GroundVariant),
    /// Bird gliding at the flying baseline.
    Flying,
}

impl ObstacleKind {
    /// Side length of the square flying obstacle hitbox.
    pub const FLYING_EXTENT: f32 = 50.0;

    /// Hitbox dimensions of obstacles of this kind.
    #[must_use]
    pub const fn size(self) -> Size {
        match self {
            Self::Ground(variant) => variant.size(),
            Self::Flying => Size::new(Self::FLYING_EXTENT, Self::FLYING_EXTENT),
        }
    }

    /// Reports whether the kind is a flying obstacle.
    #[must_use]
    pub const fn is_flying(self) -> bool {
        matches!(self, Self::Flying)
    }
}

/// Sensor vector assembled for an agent each tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sensors {
    /// Top edge of the agent hitbox.
    pub y: f32,
    /// Distance from the agent's upper-left corner to the nearest obstacle's top middle.
    pub distance: f32,
    /// Width of the nearest obstacle.
    pub obstacle_width: f32,
    /// Game speed in effect for the tick.
    pub game_speed: f32,
}

impl Sensors {
    /// Number of scalar inputs exposed to policies.
    pub const LEN: usize = 4;

    /// Flattens the sensors as `[y, distance, obstacle_width, game_speed]`.
    #[must_use]
    pub const fn to_array(&self) -> [f32; Self::LEN] {
        [self.y, self.distance, self.obstacle_width, self.game_speed]
    }
}

/// Black-box decision function controlling a single agent.
///
/// Only outputs strictly above the jump threshold are meaningful; callers treat
/// everything else, including non-finite values, as "keep running".
pub trait Policy {
    /// Maps the sensor vector onto a scalar jump signal.
    fn decide(&mut self, sensors: &Sensors) -> f32;
}

impl<F> Policy for F
where
    F: FnMut(&Sensors) -> f32,
{
    fn decide(&mut self, sensors: &Sensors) -> f32 {
        self(sensors)
    }
}

/// Immutable representation of a single agent's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentSnapshot {
    /// Unique identifier assigned to the agent.
    pub id: AgentId,
    /// Hitbox occupied by the agent.
    pub hitbox: Rect,
    /// Locomotion state.
    pub state: AgentState,
    /// Remaining upward jump power.
    pub jump_power: f32,
    /// Cosmetic run-cycle frame, either 0 or 1.
    pub run_frame: u8,
    /// Cosmetic identity.
    pub identity: AgentIdentity,
}

/// Read-only snapshot describing every live agent.
#[derive(Clone, Debug, Default)]
pub struct AgentView {
    snapshots: Vec<AgentSnapshot>,
}

impl AgentView {
    /// Creates a new agent view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<AgentSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured agent snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &AgentSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of the provided agent.
    #[must_use]
    pub fn get(&self, agent: AgentId) -> Option<&AgentSnapshot> {
        self.snapshots
            .binary_search_by_key(&agent, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of live agents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no agent is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Immutable representation of a single obstacle used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObstacleSnapshot {
    /// Identifier assigned to the obstacle.
    pub id: ObstacleId,
    /// Shape of the obstacle.
    pub kind: ObstacleKind,
    /// Hitbox occupied by the obstacle.
    pub hitbox: Rect,
    /// Cosmetic animation frame; always 0 for ground obstacles.
    pub frame: u8,
}

/// Read-only snapshot of the obstacle queue, nearest obstacle first.
#[derive(Clone, Debug, Default)]
pub struct ObstacleView {
    snapshots: Vec<ObstacleSnapshot>,
}

impl ObstacleView {
    /// Creates a view from snapshots already ordered front to back.
    #[must_use]
    pub fn from_snapshots(snapshots: Vec<ObstacleSnapshot>) -> Self {
        Self { snapshots }
    }

    /// Iterator over the queued obstacles, front first.
    pub fn iter(&self) -> impl Iterator<Item = &ObstacleSnapshot> {
        self.snapshots.iter()
    }

    /// Obstacle at the front of the queue.
    #[must_use]
    pub fn nearest(&self) -> Option<&ObstacleSnapshot> {
        self.snapshots.first()
    }

    /// Obstacle at the back of the queue.
    #[must_use]
    pub fn last(&self) -> Option<&ObstacleSnapshot> {
        self.snapshots.last()
    }

    /// Number of queued obstacles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Layout and physics parameters shared by every generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Width of the visible play field.
    pub screen_width: f32,
    /// Height of the visible play field.
    pub screen_height: f32,
    /// Distance between the bottom of the screen and the running agents' top edge.
    pub ground_offset: f32,
    /// Fixed horizontal position of every agent.
    pub agent_x: f32,
    /// Agent hitbox width.
    pub agent_width: f32,
    /// Agent hitbox height.
    pub agent_height: f32,
    /// Jump power restored on landing.
    pub jump_power: f32,
    /// Game speed at the start of each generation.
    pub initial_game_speed: f32,
    /// Score that triggers the first speed increase.
    pub initial_speedup_threshold: f32,
    /// Distance between the bottom of the screen and the ground obstacle baseline.
    pub ground_baseline_offset: f32,
    /// Distance between the bottom of the screen and the flying obstacle baseline.
    pub flying_baseline_offset: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            screen_width: 1280.0,
            screen_height: 720.0,
            ground_offset: 170.0,
            agent_x: 250.0,
            agent_width: 80.0,
            agent_height: 86.0,
            jump_power: 10.0,
            initial_game_speed: REFERENCE_GAME_SPEED,
            initial_speedup_threshold: 100.0,
            ground_baseline_offset: 85.0,
            flying_baseline_offset: 200.0,
        }
    }
}

impl WorldConfig {
    /// Y coordinate of a running agent's top edge.
    #[must_use]
    pub fn ground_line(&self) -> f32 {
        self.screen_height - self.ground_offset
    }

    /// Y coordinate on which ground obstacles rest.
    #[must_use]
    pub fn ground_baseline(&self) -> f32 {
        self.screen_height - self.ground_baseline_offset
    }

    /// Y coordinate on which flying obstacles rest.
    #[must_use]
    pub fn flying_baseline(&self) -> f32 {
        self.screen_height - self.flying_baseline_offset
    }

    /// Hitbox dimensions shared by all agents.
    #[must_use]
    pub const fn agent_size(&self) -> Size {
        Size::new(self.agent_width, self.agent_height)
    }

    /// Baseline for obstacles of the provided kind.
    #[must_use]
    pub fn baseline_for(&self, kind: ObstacleKind) -> f32 {
        if kind.is_flying() {
            self.flying_baseline()
        } else {
            self.ground_baseline()
        }
    }

    /// Checks that every parameter describes a playable world.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("world.screen_width", self.screen_width)?;
        ensure_positive("world.screen_height", self.screen_height)?;
        ensure_finite("world.ground_offset", self.ground_offset)?;
        ensure_finite("world.agent_x", self.agent_x)?;
        ensure_positive("world.agent_width", self.agent_width)?;
        ensure_positive("world.agent_height", self.agent_height)?;
        ensure_positive("world.jump_power", self.jump_power)?;
        ensure_positive("world.initial_game_speed", self.initial_game_speed)?;
        let ticks = rise_ticks(self.jump_power, self.initial_game_speed);
        if ticks > MAX_RISE_TICKS as f32 {
            return Err(ConfigError::JumpTooLong {
                jump_power: f64::from(self.jump_power),
                game_speed: f64::from(self.initial_game_speed),
                ticks: f64::from(ticks),
                maximum: MAX_RISE_TICKS,
            });
        }
        ensure_positive(
            "world.initial_speedup_threshold",
            self.initial_speedup_threshold,
        )?;
        ensure_finite("world.ground_baseline_offset", self.ground_baseline_offset)?;
        ensure_finite("world.flying_baseline_offset", self.flying_baseline_offset)?;
        Ok(())
    }
}

/// Ticks an airborne agent needs to exhaust `jump_power` at a constant game speed.
#[must_use]
pub fn rise_ticks(jump_power: f32, game_speed: f32) -> f32 {
    jump_power / (JUMP_DECAY_PER_TICK * game_speed / REFERENCE_GAME_SPEED)
}

/// Computes the apex of a jump performed at a constant game speed.
///
/// The value is measured upwards from the ground line and mirrors the
/// per-tick integration the world performs for airborne agents, so it
/// bounds every airborne hitbox. Integration stops after [`MAX_RISE_TICKS`]
/// steps.
#[must_use]
pub fn peak_jump_height(jump_power: f32, game_speed: f32) -> f32 {
    let scale = game_speed / REFERENCE_GAME_SPEED;
    if !(scale > 0.0 && jump_power > 0.0 && scale.is_finite() && jump_power.is_finite()) {
        return 0.0;
    }

    let mut power = jump_power;
    let mut height = 0.0;
    for _ in 0..=MAX_RISE_TICKS {
        if power <= 0.0 {
            break;
        }
        height += power * JUMP_RISE_FACTOR * scale;
        power -= JUMP_DECAY_PER_TICK * scale;
    }
    height
}

/// Reasons a configuration value may be rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The value must be finite and strictly positive.
    #[error("{field} must be a finite positive number (received {value})")]
    NonPositive {
        /// Dotted name of the offending setting.
        field: &'static str,
        /// Value that failed validation.
        value: f64,
    },
    /// The value must be finite.
    #[error("{field} must be finite (received {value})")]
    NonFinite {
        /// Dotted name of the offending setting.
        field: &'static str,
        /// Value that failed validation.
        value: f64,
    },
    /// The bounds of a sampling range are degenerate.
    #[error("{field} must satisfy 0 < min < max (received {min}..{max})")]
    InvalidRange {
        /// Dotted name of the offending setting.
        field: &'static str,
        /// Lower bound provided.
        min: f64,
        /// Upper bound provided.
        max: f64,
    },
    /// A probability or fraction lies outside the unit interval.
    #[error("{field} must lie within 0.0..=1.0 (received {value})")]
    OutOfUnitInterval {
        /// Dotted name of the offending setting.
        field: &'static str,
        /// Value that failed validation.
        value: f64,
    },
    /// The jump power is so large relative to the game speed that agents stay airborne.
    #[error(
        "world.jump_power {jump_power} at world.initial_game_speed {game_speed} rises for \
         {ticks} ticks (at most {maximum})"
    )]
    JumpTooLong {
        /// Configured jump power.
        jump_power: f64,
        /// Configured initial game speed.
        game_speed: f64,
        /// Ticks the jump would take to reach its apex.
        ticks: f64,
        /// Largest accepted rise duration.
        maximum: u32,
    },
    /// A count is below its minimum.
    #[error("{field} must be at least {minimum} (received {value})")]
    TooSmall {
        /// Dotted name of the offending setting.
        field: &'static str,
        /// Smallest accepted value.
        minimum: u64,
        /// Value that failed validation.
        value: u64,
    },
}

/// Rejects values that are not finite and strictly positive.
pub fn ensure_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive {
            field,
            value: f64::from(value),
        })
    }
}

/// Rejects non-finite values.
pub fn ensure_finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite {
            field,
            value: f64::from(value),
        })
    }
}

/// Rejects values outside `0.0..=1.0`.
pub fn ensure_unit_interval(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfUnitInterval { field, value })
    }
}

/// Rejects counts below `minimum`.
pub fn ensure_at_least(field: &'static str, value: u64, minimum: u64) -> Result<(), ConfigError> {
    if value >= minimum {
        Ok(())
    } else {
        Err(ConfigError::TooSmall {
            field,
            minimum,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_matches_pythagoras() {
        let origin = Point::new(1.0, 1.0);
        let destination = Point::new(4.0, 5.0);
        assert!((distance(origin, destination) - 5.0).abs() < f32::EPSILON);
        assert!((distance(destination, origin) - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn touching_rectangles_do_not_intersect() {
        let left = Rect::new(0.0, 0.0, 10.0, 10.0);
        let right = Rect::new(10.0, 0.0, 10.0, 10.0);
        let below = Rect::new(0.0, 10.0, 10.0, 10.0);
        assert!(!left.intersects(&right));
        assert!(!left.intersects(&below));
    }

    #[test]
    fn overlapping_rectangles_intersect_symmetrically() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(9.5, 9.5, 3.0, 3.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn standing_on_places_bottom_on_baseline() {
        let rect = Rect::standing_on(100.0, 635.0, Size::new(30.0, 60.0));
        assert_eq!(rect.bottom(), 635.0);
        assert_eq!(rect.mid_top(), Point::new(115.0, 575.0));
    }

    #[test]
    fn identities_fall_back_once_lists_are_exhausted() {
        let first = AgentIdentity::for_index(0);
        assert_eq!(first.name, AGENT_NAMES[0]);
        assert_eq!(first.skin, AGENT_SKINS[0]);

        let late = AgentIdentity::for_index(40);
        assert_eq!(late.name, DEFAULT_AGENT_NAME);
        assert_eq!(late.skin, DEFAULT_AGENT_SKIN);
    }

    #[test]
    fn agent_view_lookup_uses_identifier_order() {
        let snapshot = |id| AgentSnapshot {
            id: AgentId::new(id),
            hitbox: Rect::new(0.0, 0.0, 1.0, 1.0),
            state: AgentState::Running,
            jump_power: 10.0,
            run_frame: 0,
            identity: AgentIdentity::for_index(0),
        };
        let view = AgentView::from_snapshots(vec![snapshot(4), snapshot(1), snapshot(2)]);
        let ids: Vec<u32> = view.iter().map(|snapshot| snapshot.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 4]);
        assert!(view.get(AgentId::new(2)).is_some());
        assert!(view.get(AgentId::new(3)).is_none());
    }

    #[test]
    fn peak_jump_height_at_reference_speed_is_exact() {
        // 2 * (10 + 9.5 + ... + 0.5)
        assert!((peak_jump_height(10.0, REFERENCE_GAME_SPEED) - 210.0).abs() < 1e-3);
    }

    #[test]
    fn peak_jump_height_rejects_degenerate_inputs() {
        assert_eq!(peak_jump_height(0.0, 8.0), 0.0);
        assert_eq!(peak_jump_height(10.0, 0.0), 0.0);
        assert_eq!(peak_jump_height(10.0, f32::NAN), 0.0);
    }

    #[test]
    fn closures_satisfy_policy() {
        let mut calls = 0;
        let mut policy = |sensors: &Sensors| {
            calls += 1;
            sensors.distance
        };
        let sensors = Sensors {
            y: 1.0,
            distance: 0.75,
            obstacle_width: 3.0,
            game_speed: 8.0,
        };
        assert_eq!(policy.decide(&sensors), 0.75);
        assert_eq!(sensors.to_array(), [1.0, 0.75, 3.0, 8.0]);
        drop(policy);
        assert_eq!(calls, 1);
    }

    #[test]
    fn default_world_config_is_valid() {
        let config = WorldConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.ground_line(), 550.0);
        assert_eq!(config.ground_baseline(), 635.0);
    }

    #[test]
    fn world_config_rejects_non_positive_jump_power() {
        let config = WorldConfig {
            jump_power: 0.0,
            ..WorldConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive {
                field: "world.jump_power",
                ..
            })
        ));
    }

    #[test]
    fn world_config_rejects_jumps_that_never_land() {
        let config = WorldConfig {
            jump_power: 1.0e8,
            ..WorldConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::JumpTooLong { maximum: MAX_RISE_TICKS, .. })
        ));

        let crawling = WorldConfig {
            initial_game_speed: 1.0e-6,
            ..WorldConfig::default()
        };
        assert!(matches!(
            crawling.validate(),
            Err(ConfigError::JumpTooLong { .. })
        ));
    }

    #[test]
    fn peak_jump_height_terminates_for_huge_powers() {
        let height = peak_jump_height(1.0e8, REFERENCE_GAME_SPEED);
        assert!(height.is_finite());
        assert!(height > 0.0);
    }

    #[test]
    fn world_config_deserializes_partial_tables() {
        let config: WorldConfig =
            toml::from_str("jump_power = 12.0\nscreen_width = 800.0").expect("parse");
        assert_eq!(config.jump_power, 12.0);
        assert_eq!(config.screen_width, 800.0);
        assert_eq!(config.screen_height, 720.0);
    }
}
