#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for dino-evolve adapters.

use anyhow::Result as AnyResult;
use dino_evolve_core::{
    AgentSnapshot, AgentState, AgentView, GroundVariant, ObstacleKind, ObstacleSnapshot,
    ObstacleView, REFERENCE_GAME_SPEED,
};
use glam::Vec2;
use std::time::Duration;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color darkened towards black by the provided amount.
    #[must_use]
    pub fn darken(self, amount: f32) -> Self {
        let keep = 1.0 - amount.clamp(0.0, 1.0);
        Self {
            red: self.red * keep,
            green: self.green * keep,
            blue: self.blue * keep,
            alpha: self.alpha,
        }
    }
}

/// Fill color associated with an agent skin; unknown skins fall back to the default grey.
#[must_use]
pub fn skin_color(skin: &str) -> Color {
    match skin {
        "aqua" => Color::from_rgb_u8(0x3f, 0xd0, 0xd4),
        "black" => Color::from_rgb_u8(0x22, 0x22, 0x22),
        "bloody" => Color::from_rgb_u8(0x9b, 0x11, 0x1e),
        "cobalt" => Color::from_rgb_u8(0x00, 0x47, 0xab),
        "gold" => Color::from_rgb_u8(0xd4, 0xaf, 0x37),
        "insta" => Color::from_rgb_u8(0xc1, 0x35, 0x84),
        "lime" => Color::from_rgb_u8(0x7c, 0xd6, 0x1e),
        "magenta" => Color::from_rgb_u8(0xd0, 0x1f, 0xd0),
        "magma" => Color::from_rgb_u8(0xe2, 0x58, 0x22),
        "navy" => Color::from_rgb_u8(0x1b, 0x26, 0x5c),
        "neon" => Color::from_rgb_u8(0x39, 0xff, 0x14),
        "orange" => Color::from_rgb_u8(0xff, 0x8c, 0x00),
        "pinky" => Color::from_rgb_u8(0xff, 0x8f, 0xc8),
        "purple" => Color::from_rgb_u8(0x6a, 0x2c, 0x9e),
        "rgb" => Color::from_rgb_u8(0x4f, 0x7c, 0xff),
        "silver" => Color::from_rgb_u8(0xb8, 0xbc, 0xc2),
        "subaru" => Color::from_rgb_u8(0x12, 0x3f, 0x8c),
        "sunny" => Color::from_rgb_u8(0xff, 0xd7, 0x3a),
        "toxic" => Color::from_rgb_u8(0xa4, 0xe0, 0x00),
        _ => Color::from_rgb_u8(0x53, 0x53, 0x53),
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Whether the viewer asked for more ticks per frame on this frame.
    pub faster: bool,
    /// Whether the viewer asked for fewer ticks per frame on this frame.
    pub slower: bool,
}

/// Decision returned by the scene update closure after each frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneUpdate {
    /// Keep presenting frames.
    Continue,
    /// Close the window and return from the backend.
    Exit,
}

/// Agent drawn at its hitbox, in world units.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentPresentation {
    /// Upper-left corner of the agent.
    pub position: Vec2,
    /// Width and height of the agent.
    pub size: Vec2,
    /// Display name rendered above the agent.
    pub name: String,
    /// Fill color derived from the agent's skin.
    pub color: Color,
    /// Whether the agent is airborne.
    pub airborne: bool,
    /// Run-cycle frame, either 0 or 1.
    pub frame: u8,
}

impl AgentPresentation {
    /// Builds the presentation of a live agent.
    #[must_use]
    pub fn from_snapshot(snapshot: &AgentSnapshot) -> Self {
        Self {
            position: Vec2::new(snapshot.hitbox.x(), snapshot.hitbox.y()),
            size: Vec2::new(snapshot.hitbox.width(), snapshot.hitbox.height()),
            name: snapshot.identity.name.to_owned(),
            color: skin_color(snapshot.identity.skin),
            airborne: snapshot.state == AgentState::Jumping,
            frame: snapshot.run_frame,
        }
    }
}

/// Visual family of an obstacle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObstacleStyle {
    /// Cactus group with the given number of stems.
    Cactus {
        /// Stems drawn side by side.
        stems: u8,
    },
    /// Bird with its wings in the given frame.
    Bird {
        /// Wing frame, either 0 or 1.
        frame: u8,
    },
}

/// Obstacle drawn at its hitbox, in world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObstaclePresentation {
    /// Upper-left corner of the obstacle.
    pub position: Vec2,
    /// Width and height of the obstacle.
    pub size: Vec2,
    /// Visual family.
    pub style: ObstacleStyle,
}

impl ObstaclePresentation {
    /// Builds the presentation of a queued obstacle.
    #[must_use]
    pub fn from_snapshot(snapshot: &ObstacleSnapshot) -> Self {
        let style = match snapshot.kind {
            ObstacleKind::Flying => ObstacleStyle::Bird {
                frame: snapshot.frame,
            },
            ObstacleKind::Ground(variant) => ObstacleStyle::Cactus {
                stems: match variant {
                    GroundVariant::SmallSingle | GroundVariant::LargeSingle => 1,
                    GroundVariant::SmallDouble | GroundVariant::LargeDouble => 2,
                    GroundVariant::SmallTriple | GroundVariant::LargeTriple => 3,
                },
            },
        };
        Self {
            position: Vec2::new(snapshot.hitbox.x(), snapshot.hitbox.y()),
            size: Vec2::new(snapshot.hitbox.width(), snapshot.hitbox.height()),
            style,
        }
    }
}

/// Heads-up display lines drawn over the scene.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Hud {
    /// Generation currently on screen.
    pub generation: u64,
    /// Score of the current generation.
    pub score: f32,
    /// Current game speed.
    pub game_speed: f32,
    /// Ticks simulated per rendered frame.
    pub ticks_per_frame: u32,
    /// Agents still alive.
    pub alive: usize,
    /// Agents that started the generation.
    pub population: usize,
}

impl Hud {
    /// Game speed relative to the starting speed of a generation.
    #[must_use]
    pub fn speed_multiplier(&self) -> f32 {
        self.game_speed / REFERENCE_GAME_SPEED
    }
}

/// Scene description combining the ground line, agents, obstacles and HUD.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Width of the visible world.
    pub width: f32,
    /// Height of the visible world.
    pub height: f32,
    /// Vertical position of the floor that agents and cacti stand on.
    pub ground_line: f32,
    /// Live agents.
    pub agents: Vec<AgentPresentation>,
    /// Queued obstacles, including those still off-screen.
    pub obstacles: Vec<ObstaclePresentation>,
    /// Heads-up display.
    pub hud: Hud,
}

impl Scene {
    /// Creates an empty scene of the provided dimensions.
    #[must_use]
    pub fn new(width: f32, height: f32, ground_line: f32) -> Self {
        Self {
            width,
            height,
            ground_line,
            agents: Vec::new(),
            obstacles: Vec::new(),
            hud: Hud::default(),
        }
    }

    /// Replaces the scene content with fresh world snapshots.
    pub fn refresh(&mut self, agents: &AgentView, obstacles: &ObstacleView, hud: Hud) {
        self.agents.clear();
        self.agents
            .extend(agents.iter().map(AgentPresentation::from_snapshot));
        self.obstacles.clear();
        self.obstacles
            .extend(obstacles.iter().map(ObstaclePresentation::from_snapshot));
        self.hud = hud;
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Whether the backend should synchronise presentation with the display.
    pub vsync: bool,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            vsync: false,
            scene,
        }
    }

    /// Enables or disables vertical synchronisation.
    #[must_use]
    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }
}

/// Rendering backend capable of presenting dino-evolve scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// per-frame input captured by the adapter, may mutate the scene before it
    /// is rendered, and decides whether the backend keeps running.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> SceneUpdate + 'static;
}
