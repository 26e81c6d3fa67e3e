use dino_evolve_core::{
    AgentId, Command, Event, GroundVariant, ObstacleId, ObstacleKind, Rect, WorldConfig,
};
use dino_evolve_world::{self as world, query, World};
use proptest::prelude::*;

fn started(population: u32) -> World {
    let mut world = World::default();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::BeginGeneration { population },
        &mut events,
    );
    world
}

fn apply_all(world: &mut World, commands: Vec<Command>) -> Vec<Event> {
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

fn spawn(kind: ObstacleKind, x: f32) -> Command {
    Command::SpawnObstacle { kind, x }
}

fn kind_strategy() -> impl Strategy<Value = ObstacleKind> {
    prop_oneof![
        (0usize..GroundVariant::ALL.len()).prop_map(|index| ObstacleKind::Ground(GroundVariant::ALL[index])),
        Just(ObstacleKind::Flying),
    ]
}

#[test]
fn running_agent_is_eliminated_by_overlapping_cactus() {
    let mut world = started(1);
    let config = WorldConfig::default();
    let events = apply_all(
        &mut world,
        vec![
            spawn(
                ObstacleKind::Ground(GroundVariant::SmallSingle),
                config.agent_x + config.agent_width,
            ),
            Command::AdvanceObstacles,
        ],
    );

    assert!(events.contains(&Event::AgentEliminated {
        agent: AgentId::new(0),
        obstacle: ObstacleId::new(0),
    }));
    assert_eq!(query::live_agent_count(&world), 0);
    assert_eq!(query::obstacle_count(&world), 1, "obstacle stays queued");
}

#[test]
fn birds_pass_over_running_agents() {
    let mut world = started(1);
    let config = WorldConfig::default();
    let events = apply_all(
        &mut world,
        vec![
            spawn(ObstacleKind::Flying, config.agent_x),
            Command::AdvanceObstacles,
        ],
    );

    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::AgentEliminated { .. })));
    assert_eq!(query::live_agent_count(&world), 1);
}

#[test]
fn pruned_obstacles_credit_every_survivor_but_not_the_eliminated() {
    let mut world = started(2);
    let config = WorldConfig::default();

    let mut events = apply_all(&mut world, vec![Command::Jump { agent: AgentId::new(0) }]);
    for _ in 0..10 {
        events.extend(apply_all(&mut world, vec![Command::Tick]));
    }

    let events = apply_all(
        &mut world,
        vec![
            spawn(ObstacleKind::Ground(GroundVariant::SmallSingle), -29.0),
            spawn(
                ObstacleKind::Ground(GroundVariant::SmallSingle),
                config.agent_x + 10.0,
            ),
            Command::AdvanceObstacles,
        ],
    );

    let eliminated: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            Event::AgentEliminated { agent, .. } => Some(*agent),
            _ => None,
        })
        .collect();
    assert_eq!(eliminated, vec![AgentId::new(1)]);

    let passed: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            Event::ObstaclePassed {
                obstacle,
                survivors,
            } => Some((*obstacle, survivors.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(passed, vec![(ObstacleId::new(0), vec![AgentId::new(0)])]);
    assert_eq!(query::obstacle_count(&world), 1);
}

#[test]
fn survival_bonus_event_fires_once_per_obstacle() {
    let mut world = started(3);
    let mut passed = 0;
    let _ = apply_all(
        &mut world,
        vec![spawn(ObstacleKind::Ground(GroundVariant::SmallSingle), 2.0)],
    );
    for _ in 0..20 {
        let events = apply_all(&mut world, vec![Command::AdvanceObstacles]);
        passed += events
            .iter()
            .filter(|event| matches!(event, Event::ObstaclePassed { .. }))
            .count();
    }
    assert_eq!(passed, 1);
    assert_eq!(query::obstacle_count(&world), 0);
}

proptest! {
    #[test]
    fn elimination_matches_rectangle_overlap(
        x in -200.0f32..800.0,
        kind in kind_strategy(),
        airborne_ticks in 0u32..41,
    ) {
        let config = WorldConfig::default();
        let mut world = started(1);
        if airborne_ticks > 0 {
            let _ = apply_all(&mut world, vec![Command::Jump { agent: AgentId::new(0) }]);
            for _ in 0..airborne_ticks {
                let _ = apply_all(&mut world, vec![Command::Tick]);
            }
        }

        let agent = *query::agent_view(&world).get(AgentId::new(0)).expect("agent alive");
        let speed = query::game_speed(&world);
        let scrolled = Rect::standing_on(x - speed, config.baseline_for(kind), kind.size());
        let still_active = scrolled.x() >= -scrolled.width();
        let expected = still_active && scrolled.intersects(&agent.hitbox);

        let events = apply_all(&mut world, vec![spawn(kind, x), Command::AdvanceObstacles]);
        let eliminated = events
            .iter()
            .any(|event| matches!(event, Event::AgentEliminated { .. }));

        prop_assert_eq!(eliminated, expected);
        prop_assert_eq!(query::live_agent_count(&world), usize::from(!expected));
    }
}
