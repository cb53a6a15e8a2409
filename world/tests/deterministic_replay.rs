use std::collections::HashSet;

use quantum_loop_core::{Agent, CellCoord, Command, Event, Grid, SessionStatus};
use quantum_loop_world::{self as world, catalogue, query, Session, SessionConfig};

#[derive(Debug, PartialEq)]
struct ReplayOutcome {
    events: Vec<Event>,
    agents: Vec<Agent>,
    grid: Grid,
    tick: u64,
    moves: u32,
    status: SessionStatus,
}

fn scripted_commands() -> Vec<Command> {
    let mut commands = Vec::new();
    for round in 0..20u32 {
        commands.push(Command::RotateTile {
            cell: CellCoord::new(round % 6, (round * 5) % 6),
        });
        commands.push(Command::Tick);
        commands.push(Command::Tick);
        if round % 7 == 3 {
            commands.push(Command::LaunchProjectile {
                angle_degrees: -20.0 + round as f32,
                power_percent: 60.0,
            });
        }
    }
    commands
}

fn replay(seed: u64, commands: &[Command]) -> ReplayOutcome {
    let level = catalogue::level(13)
        .expect("level exists")
        .expect("glyphs are known");
    let mut session = Session::start(&level, SessionConfig::new(seed)).expect("valid level");
    let mut events = Vec::new();

    for command in commands {
        world::apply(&mut session, command.clone(), &mut events);
        assert_no_shared_cells(query::agents(&session));
    }

    ReplayOutcome {
        events,
        agents: query::agents(&session).to_vec(),
        grid: (*query::grid(&session)).clone(),
        tick: query::tick(&session),
        moves: query::moves(&session),
        status: query::status(&session),
    }
}

fn assert_no_shared_cells(agents: &[Agent]) {
    let cells: HashSet<CellCoord> = agents.iter().map(|agent| agent.cell).collect();
    assert_eq!(cells.len(), agents.len(), "agents share a cell: {agents:?}");
}

#[test]
fn identical_seeds_replay_identically() {
    let commands = scripted_commands();

    let first = replay(0x1234_5678, &commands);
    let second = replay(0x1234_5678, &commands);

    assert_eq!(first, second);
    assert!(!first.events.is_empty());
}
