use dino_evolve_core::{
    AgentId, AgentSnapshot, Command, GroundVariant, ObstacleKind, ObstacleView, Sensors,
    WorldConfig,
};
use dino_evolve_system_decision::{sense, Config, Decision};
use dino_evolve_world::{self as world, query, World};

fn started() -> World {
    let mut world = World::default();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::BeginGeneration { population: 1 },
        &mut events,
    );
    world
}

fn agent(world: &World) -> AgentSnapshot {
    *query::agent_view(world)
        .get(AgentId::new(0))
        .expect("agent alive")
}

fn decide_with(output: f32, agent: &AgentSnapshot) -> Vec<Command> {
    let decision = Decision::new(Config::default()).expect("valid config");
    let sensors = Sensors {
        y: agent.hitbox.y(),
        distance: 100.0,
        obstacle_width: 30.0,
        game_speed: 8.0,
    };
    let mut policy = move |_: &Sensors| output;
    let mut commands = Vec::new();
    decision.decide(agent, &sensors, &mut policy, &mut commands);
    commands
}

#[test]
fn sensing_without_obstacles_yields_nothing() {
    let world = started();
    assert!(sense(&agent(&world), &ObstacleView::default(), 8.0).is_none());
}

#[test]
fn sensors_measure_corner_to_obstacle_top_middle() {
    let mut world = started();
    let config = WorldConfig::default();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnObstacle {
            kind: ObstacleKind::Ground(GroundVariant::SmallSingle),
            x: 685.0,
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::SpawnObstacle {
            kind: ObstacleKind::Flying,
            x: 1200.0,
        },
        &mut events,
    );

    let sensors = sense(
        &agent(&world),
        &query::obstacle_view(&world),
        query::game_speed(&world),
    )
    .expect("obstacle queued");

    // Top middle of the cactus is (700, 575); the agent corner is (250, 550).
    let expected = (450.0f32 * 450.0 + 25.0 * 25.0).sqrt();
    assert!((sensors.distance - expected).abs() < 1e-3);
    assert_eq!(sensors.y, config.ground_line());
    assert_eq!(sensors.obstacle_width, 30.0);
    assert_eq!(sensors.game_speed, 8.0);
    assert_eq!(
        sensors.to_array(),
        [
            sensors.y,
            sensors.distance,
            sensors.obstacle_width,
            sensors.game_speed
        ]
    );
}

#[test]
fn output_must_strictly_exceed_threshold() {
    let world = started();
    let agent = agent(&world);
    assert!(decide_with(0.5, &agent).is_empty());
    assert_eq!(
        decide_with(0.51, &agent),
        vec![Command::Jump {
            agent: AgentId::new(0)
        }]
    );
}

#[test]
fn non_finite_outputs_keep_the_agent_running() {
    let world = started();
    let agent = agent(&world);
    assert!(decide_with(f32::NAN, &agent).is_empty());
    assert!(decide_with(f32::INFINITY, &agent).is_empty());
}

#[test]
fn airborne_agents_do_not_request_another_jump() {
    let mut world = started();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::Jump {
            agent: AgentId::new(0),
        },
        &mut events,
    );
    world::apply(&mut world, Command::Tick, &mut events);

    assert!(decide_with(1.0, &agent(&world)).is_empty());
}
