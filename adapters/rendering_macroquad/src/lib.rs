#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for dino-evolve.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, so the adapter depends on macroquad without its default `audio`
//! feature.

use anyhow::Result;
use dino_evolve_rendering::{
    AgentPresentation, Color, FrameInput, Hud, ObstaclePresentation, ObstacleStyle, Presentation,
    RenderingBackend, Scene, SceneUpdate,
};
use glam::Vec2;
use macroquad::input::{is_key_pressed, KeyCode};
use std::time::Duration;

const HUD_FONT_SIZE: f32 = 24.0;
const NAME_FONT_SIZE: f32 = 16.0;
const GROUND_THICKNESS: f32 = 2.0;

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Q` or `Escape` to quit the whole process.
    quit_requested: bool,
    /// `+` simulates more ticks per frame.
    faster: bool,
    /// `-` simulates fewer ticks per frame.
    slower: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        Self {
            quit_requested: is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q),
            faster: is_key_pressed(KeyCode::Equal) || is_key_pressed(KeyCode::KpAdd),
            slower: is_key_pressed(KeyCode::Minus) || is_key_pressed(KeyCode::KpSubtract),
        }
    }
}

/// Rendering backend implemented on top of macroquad.
///
/// Vertical synchronisation follows [`Presentation::vsync`].
#[derive(Clone, Copy, Debug, Default)]
pub struct MacroquadBackend;

impl MacroquadBackend {
    /// Returns the macroquad backend.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// Swap interval requested from the platform: one frame when synchronised, none otherwise.
const fn swap_interval(vsync: bool) -> i32 {
    if vsync {
        1
    } else {
        0
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> SceneUpdate + 'static,
    {
        let Presentation {
            window_title,
            clear_color,
            vsync,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: scene.width.round() as i32,
            window_height: scene.height.round() as i32,
            ..macroquad::window::Conf::default()
        };
        config.platform.swap_interval = Some(swap_interval(vsync));

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break;
                }

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let frame_input = FrameInput {
                    faster: keyboard.faster,
                    slower: keyboard.slower,
                };
                if update_scene(frame_dt, frame_input, &mut scene) == SceneUpdate::Exit {
                    break;
                }

                macroquad::window::clear_background(background);
                let metrics = SceneMetrics::fit(
                    &scene,
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                draw_ground(&scene, &metrics);
                for obstacle in &scene.obstacles {
                    draw_obstacle(obstacle, &metrics);
                }
                for agent in &scene.agents {
                    draw_agent(agent, &metrics);
                }
                draw_hud(&scene.hud, &metrics);

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

/// Uniform scale and letterbox offset mapping world units onto the window.
#[derive(Clone, Copy, Debug, PartialEq)]
struct SceneMetrics {
    scale: f32,
    offset: Vec2,
    visible_width: f32,
}

impl SceneMetrics {
    fn fit(scene: &Scene, screen_width: f32, screen_height: f32) -> Self {
        let scale = if scene.width <= 0.0 || scene.height <= 0.0 {
            1.0
        } else {
            (screen_width / scene.width).min(screen_height / scene.height)
        };
        let offset = Vec2::new(
            (screen_width - scene.width * scale) / 2.0,
            (screen_height - scene.height * scale) / 2.0,
        );
        Self {
            scale,
            offset,
            visible_width: scene.width,
        }
    }

    fn to_screen(&self, world: Vec2) -> Vec2 {
        self.offset + world * self.scale
    }

    fn is_visible(&self, position: Vec2, size: Vec2) -> bool {
        position.x + size.x >= 0.0 && position.x <= self.visible_width
    }

    fn rect(&self, position: Vec2, size: Vec2, color: Color) {
        let origin = self.to_screen(position);
        macroquad::shapes::draw_rectangle(
            origin.x,
            origin.y,
            size.x * self.scale,
            size.y * self.scale,
            to_macroquad_color(color),
        );
    }
}

fn draw_ground(scene: &Scene, metrics: &SceneMetrics) {
    let color = Color::from_rgb_u8(0x53, 0x53, 0x53);
    metrics.rect(
        Vec2::new(0.0, scene.ground_line),
        Vec2::new(scene.width, GROUND_THICKNESS),
        color,
    );
}

fn draw_agent(agent: &AgentPresentation, metrics: &SceneMetrics) {
    let leg_height = agent.size.y * 0.2;
    let body = Vec2::new(agent.size.x * 0.75, agent.size.y - leg_height);
    metrics.rect(agent.position, body, agent.color);

    let head = Vec2::new(agent.size.x * 0.5, agent.size.y * 0.3);
    metrics.rect(
        agent.position + Vec2::new(agent.size.x - head.x, 0.0),
        head,
        agent.color,
    );
    let eye = Vec2::splat(agent.size.x * 0.08);
    metrics.rect(
        agent.position + Vec2::new(agent.size.x - head.x * 0.5, head.y * 0.25),
        eye,
        agent.color.darken(0.7),
    );

    let leg = Vec2::new(agent.size.x * 0.12, leg_height);
    let legs_top = agent.position.y + body.y;
    let (front_lift, back_lift) = match (agent.airborne, agent.frame) {
        (true, _) => (0.0, 0.0),
        (false, 0) => (leg_height * 0.4, 0.0),
        (false, _) => (0.0, leg_height * 0.4),
    };
    metrics.rect(
        Vec2::new(agent.position.x + agent.size.x * 0.15, legs_top),
        leg - Vec2::new(0.0, back_lift),
        agent.color,
    );
    metrics.rect(
        Vec2::new(agent.position.x + agent.size.x * 0.5, legs_top),
        leg - Vec2::new(0.0, front_lift),
        agent.color,
    );

    let label = metrics.to_screen(agent.position - Vec2::new(0.0, 6.0));
    let _ = macroquad::text::draw_text(
        &agent.name,
        label.x,
        label.y,
        NAME_FONT_SIZE * metrics.scale,
        to_macroquad_color(agent.color.darken(0.3)),
    );
}

fn draw_obstacle(obstacle: &ObstaclePresentation, metrics: &SceneMetrics) {
    if !metrics.is_visible(obstacle.position, obstacle.size) {
        return;
    }

    match obstacle.style {
        ObstacleStyle::Cactus { stems } => {
            let color = Color::from_rgb_u8(0x2e, 0x7d, 0x32);
            let slot = obstacle.size.x / f32::from(stems.max(1));
            for stem in 0..stems.max(1) {
                let left = obstacle.position.x + slot * f32::from(stem);
                metrics.rect(
                    Vec2::new(left + slot * 0.3, obstacle.position.y),
                    Vec2::new(slot * 0.4, obstacle.size.y),
                    color,
                );
                metrics.rect(
                    Vec2::new(left + slot * 0.1, obstacle.position.y + obstacle.size.y * 0.3),
                    Vec2::new(slot * 0.8, obstacle.size.y * 0.15),
                    color,
                );
            }
        }
        ObstacleStyle::Bird { frame } => {
            let color = Color::from_rgb_u8(0x4a, 0x4a, 0x4a);
            let body_top = obstacle.position.y + obstacle.size.y * 0.4;
            metrics.rect(
                Vec2::new(obstacle.position.x, body_top),
                Vec2::new(obstacle.size.x, obstacle.size.y * 0.2),
                color,
            );
            let wing_top = if frame == 0 {
                obstacle.position.y
            } else {
                body_top + obstacle.size.y * 0.2
            };
            metrics.rect(
                Vec2::new(obstacle.position.x + obstacle.size.x * 0.3, wing_top),
                Vec2::new(obstacle.size.x * 0.3, obstacle.size.y * 0.4),
                color,
            );
        }
    }
}

fn hud_lines(hud: &Hud) -> [String; 5] {
    [
        format!("Generation: {}", hud.generation),
        format!("Score: {:.0}", hud.score),
        format!("Alive: {} / {}", hud.alive, hud.population),
        format!("Speed: {:.3}x", hud.speed_multiplier()),
        format!("Ticks per frame: {}", hud.ticks_per_frame),
    ]
}

fn draw_hud(hud: &Hud, metrics: &SceneMetrics) {
    let color = to_macroquad_color(Color::from_rgb_u8(0x20, 0x20, 0x20));
    for (index, line) in hud_lines(hud).iter().enumerate() {
        let position = metrics.to_screen(Vec2::new(20.0, 30.0 + index as f32 * 28.0));
        let _ = macroquad::text::draw_text(
            line,
            position.x,
            position.y,
            HUD_FONT_SIZE * metrics.scale,
            color,
        );
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
