use dino_evolve_core::{
    peak_jump_height, AgentId, AgentState, Command, Event, WorldConfig,
};
use dino_evolve_world::{self as world, query, World};
use proptest::prelude::*;

fn started(config: WorldConfig, population: u32) -> World {
    let mut world = World::new(config);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::BeginGeneration { population },
        &mut events,
    );
    world
}

fn jump(world: &mut World, agent: u32) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Jump {
            agent: AgentId::new(agent),
        },
        &mut events,
    );
    events
}

#[test]
fn reference_jump_lands_after_forty_one_ticks() {
    let config = WorldConfig::default();
    let ground_line = config.ground_line();
    let mut world = started(config, 1);
    assert_eq!(
        jump(&mut world, 0),
        vec![Event::AgentJumped {
            agent: AgentId::new(0)
        }]
    );

    let mut landed_at = None;
    for tick in 1..=60 {
        let mut events = Vec::new();
        world::apply(&mut world, Command::Tick, &mut events);
        if events.contains(&Event::AgentLanded {
            agent: AgentId::new(0),
        }) {
            landed_at = Some(tick);
            break;
        }
    }

    assert_eq!(landed_at, Some(41));
    let agent = *query::agent_view(&world)
        .get(AgentId::new(0))
        .expect("agent alive");
    assert_eq!(agent.state, AgentState::Running);
    assert_eq!(agent.hitbox.y(), ground_line);
}

#[test]
fn jumping_agents_ignore_repeated_jump_commands() {
    let mut world = started(WorldConfig::default(), 1);
    assert_eq!(jump(&mut world, 0).len(), 1);
    let mut events = Vec::new();
    world::apply(&mut world, Command::Tick, &mut events);
    assert!(jump(&mut world, 0).is_empty());
}

#[test]
fn speed_ramps_when_score_crosses_threshold() {
    let mut world = started(WorldConfig::default(), 1);
    let mut increases = Vec::new();
    for _ in 0..101 {
        let mut events = Vec::new();
        world::apply(&mut world, Command::AdvanceScore, &mut events);
        increases.extend(events);
    }

    assert_eq!(increases, vec![Event::GameSpeedIncreased { game_speed: 9.0 }]);
    assert_eq!(query::score(&world), 101.0);
    assert_eq!(query::speedup_threshold(&world), 500.0);
}

#[test]
fn game_speed_never_decreases_within_a_generation() {
    let mut world = started(WorldConfig::default(), 1);
    let mut previous = query::game_speed(&world);
    for _ in 0..5_000 {
        let mut events = Vec::new();
        world::apply(&mut world, Command::AdvanceScore, &mut events);
        let current = query::game_speed(&world);
        assert!(current >= previous);
        previous = current;
    }
    assert!(previous > 10.0);
}

proptest! {
    #[test]
    fn airborne_agents_stay_between_apex_and_ground(
        jump_power in 1.0f32..20.0,
        game_speed in 4.0f32..30.0,
    ) {
        let config = WorldConfig {
            jump_power,
            initial_game_speed: game_speed,
            ..WorldConfig::default()
        };
        let ground_line = config.ground_line();
        let apex = ground_line - peak_jump_height(jump_power, game_speed);
        let mut world = started(config, 1);
        prop_assert_eq!(jump(&mut world, 0).len(), 1);

        let mut landed = false;
        for _ in 0..10_000 {
            let mut events = Vec::new();
            world::apply(&mut world, Command::Tick, &mut events);
            let agent = *query::agent_view(&world).get(AgentId::new(0)).expect("agent alive");
            prop_assert!(agent.hitbox.y() <= ground_line);
            prop_assert!(agent.hitbox.y() >= apex - 0.1);
            if agent.state == AgentState::Running {
                prop_assert_eq!(agent.jump_power, jump_power);
                prop_assert_eq!(agent.hitbox.y(), ground_line);
                landed = true;
                break;
            }
        }
        prop_assert!(landed, "agent never landed");
    }
}
