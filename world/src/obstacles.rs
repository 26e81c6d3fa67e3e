//! Ground and flying obstacles scrolling towards the agents.

use dino_evolve_core::{
    GroundVariant, ObstacleId, ObstacleKind, ObstacleSnapshot, Rect, WorldConfig,
};

/// Ticks between two wing frames of a flying obstacle.
pub(crate) const FLAP_INTERVAL_TICKS: u32 = 10;

/// Number of wing frames cycled by flying obstacles.
const FLAP_FRAMES: u8 = 2;

/// Obstacle queued in the world, discriminated by family.
#[derive(Clone, Debug)]
pub(crate) enum Obstacle {
    Ground(GroundObstacle),
    Flying(FlyingObstacle),
}

#[derive(Clone, Debug)]
pub(crate) struct GroundObstacle {
    id: ObstacleId,
    variant: GroundVariant,
    hitbox: Rect,
    active: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct FlyingObstacle {
    id: ObstacleId,
    hitbox: Rect,
    active: bool,
    frame: u8,
    timer: u32,
}

impl Obstacle {
    /// Creates an obstacle whose left edge sits at `x` on the kind's baseline.
    pub(crate) fn spawn(id: ObstacleId, kind: ObstacleKind, x: f32, config: &WorldConfig) -> Self {
        let hitbox = Rect::standing_on(x, config.baseline_for(kind), kind.size());
        match kind {
            ObstacleKind::Ground(variant) => Self::Ground(GroundObstacle {
                id,
                variant,
                hitbox,
                active: true,
            }),
            ObstacleKind::Flying => Self::Flying(FlyingObstacle {
                id,
                hitbox,
                active: true,
                frame: 0,
                timer: 0,
            }),
        }
    }

    pub(crate) fn id(&self) -> ObstacleId {
        match self {
            Self::Ground(ground) => ground.id,
            Self::Flying(flying) => flying.id,
        }
    }

    pub(crate) fn kind(&self) -> ObstacleKind {
        match self {
            Self::Ground(ground) => ObstacleKind::Ground(ground.variant),
            Self::Flying(_) => ObstacleKind::Flying,
        }
    }

    pub(crate) fn hitbox(&self) -> Rect {
        match self {
            Self::Ground(ground) => ground.hitbox,
            Self::Flying(flying) => flying.hitbox,
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        match self {
            Self::Ground(ground) => ground.active,
            Self::Flying(flying) => flying.active,
        }
    }

    /// Scrolls the obstacle left, deactivating it once it is fully off-screen.
    pub(crate) fn advance(&mut self, game_speed: f32) {
        let (hitbox, active) = match self {
            Self::Ground(ground) => (&mut ground.hitbox, &mut ground.active),
            Self::Flying(flying) => (&mut flying.hitbox, &mut flying.active),
        };
        *hitbox = hitbox.translated(-game_speed, 0.0);
        if hitbox.x() < -hitbox.width() {
            *active = false;
        }
    }

    /// Steps the wing animation of flying obstacles.
    pub(crate) fn animate(&mut self) {
        if let Self::Flying(flying) = self {
            flying.timer += 1;
            if flying.timer >= FLAP_INTERVAL_TICKS {
                flying.timer = 0;
                flying.frame = (flying.frame + 1) % FLAP_FRAMES;
            }
        }
    }

    pub(crate) fn snapshot(&self) -> ObstacleSnapshot {
        let frame = match self {
            Self::Ground(_) => 0,
            Self::Flying(flying) => flying.frame,
        };
        ObstacleSnapshot {
            id: self.id(),
            kind: self.kind(),
            hitbox: self.hitbox(),
            frame,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ground_obstacles_rest_on_the_ground_baseline() {
        let config = WorldConfig::default();
        let obstacle = Obstacle::spawn(
            ObstacleId::new(0),
            ObstacleKind::Ground(GroundVariant::LargeDouble),
            900.0,
            &config,
        );
        let hitbox = obstacle.hitbox();
        assert_eq!(hitbox.bottom(), config.ground_baseline());
        assert_eq!(hitbox.width(), 90.0);
        assert_eq!(hitbox.x(), 900.0);
    }

    #[test]
    fn obstacles_deactivate_only_when_fully_off_screen() {
        let config = WorldConfig::default();
        let mut obstacle = Obstacle::spawn(
            ObstacleId::new(0),
            ObstacleKind::Ground(GroundVariant::SmallSingle),
            8.0,
            &config,
        );

        obstacle.advance(8.0);
        assert_eq!(obstacle.hitbox().x(), 0.0);
        assert!(obstacle.is_active());

        obstacle.advance(30.0);
        assert_eq!(obstacle.hitbox().x(), -30.0);
        assert!(obstacle.is_active(), "right edge still touches x = 0");

        obstacle.advance(0.5);
        assert!(!obstacle.is_active());
    }

    #[test]
    fn flying_obstacles_flap_between_two_frames() {
        let config = WorldConfig::default();
        let mut obstacle =
            Obstacle::spawn(ObstacleId::new(3), ObstacleKind::Flying, 500.0, &config);
        let mut frames = Vec::new();
        for _ in 0..(FLAP_INTERVAL_TICKS * 3) {
            obstacle.animate();
            frames.push(obstacle.snapshot().frame);
        }
        assert_eq!(frames[FLAP_INTERVAL_TICKS as usize - 2], 0);
        assert_eq!(frames[FLAP_INTERVAL_TICKS as usize - 1], 1);
        assert_eq!(frames[2 * FLAP_INTERVAL_TICKS as usize - 1], 0);
        assert!(frames.iter().all(|frame| *frame < 2));
    }

    #[test]
    fn ground_obstacles_ignore_animation() {
        let config = WorldConfig::default();
        let mut obstacle = Obstacle::spawn(
            ObstacleId::new(1),
            ObstacleKind::Ground(GroundVariant::SmallTriple),
            500.0,
            &config,
        );
        for _ in 0..50 {
            obstacle.animate();
        }
        assert_eq!(obstacle.snapshot().frame, 0);
    }
}
