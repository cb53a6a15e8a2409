use std::collections::HashSet;

use quantum_loop_core::{
    Agent, AgentId, Archetype, CellCoord, DisturbanceEffect, Event, Grid, Tile, TileKind,
};
use quantum_loop_system_adversaries::{
    AdversaryTuning, Adversaries, ArchetypeTuning, Config, TickOutcome,
};

fn open_grid(size: usize, kind: TileKind) -> Grid {
    Grid::from_rows(vec![vec![Tile::new(kind); size]; size]).expect("square grid")
}

fn agent(id: u32, row: u32, column: u32, archetype: Archetype) -> Agent {
    Agent::new(AgentId::new(id), CellCoord::new(row, column), archetype)
}

fn uniform_tuning(pursuit: f64, near: f64, far: f64) -> AdversaryTuning {
    let entry = ArchetypeTuning::new(pursuit, near, far);
    AdversaryTuning {
        stalker: entry,
        sprinter: entry,
        glitcher: entry,
        flitter: entry,
        ..AdversaryTuning::default()
    }
}

fn simulation(seed: u64, tuning: AdversaryTuning) -> Adversaries {
    Adversaries::new(Config::new(seed).with_tuning(tuning))
}

#[test]
fn agents_never_share_a_cell() {
    let mut grid = open_grid(6, TileKind::Straight);
    for seed in 0..16 {
        let mut adversaries = Adversaries::new(Config::new(seed));
        let mut agents: Vec<Agent> = (0..12)
            .map(|index| {
                agent(
                    index,
                    index / 6,
                    index % 6,
                    Archetype::ALL[(index % 4) as usize],
                )
            })
            .collect();
        let disturbance = Some(CellCoord::new(5, 5));
        let mut events = Vec::new();

        for tick in 0..60 {
            let outcome = adversaries.tick(&grid, &agents, disturbance, tick, &mut events);
            let distinct: HashSet<CellCoord> =
                outcome.agents.iter().map(|agent| agent.cell).collect();
            assert_eq!(distinct.len(), outcome.agents.len(), "seed {seed} tick {tick}");
            assert!(outcome.agents.iter().all(|agent| grid.contains(agent.cell)));
            agents = outcome.agents;
            if let Some(next) = outcome.grid {
                grid = next;
            }
        }
    }
}

#[test]
fn crowded_grid_keeps_everyone_in_place() {
    let grid = open_grid(2, TileKind::Empty);
    let agents = vec![
        agent(0, 0, 0, Archetype::Sprinter),
        agent(1, 0, 1, Archetype::Sprinter),
        agent(2, 1, 0, Archetype::Sprinter),
        agent(3, 1, 1, Archetype::Sprinter),
    ];
    let mut adversaries = Adversaries::new(Config::new(7));
    let mut events = Vec::new();

    let outcome = adversaries.tick(&grid, &agents, None, 1, &mut events);

    assert_eq!(outcome.agents, agents);
    assert!(events.is_empty());
}

#[test]
fn only_sprinters_move_on_odd_ticks() {
    let grid = open_grid(5, TileKind::Empty);
    let agents = vec![
        agent(0, 0, 0, Archetype::Stalker),
        agent(1, 4, 4, Archetype::Sprinter),
        agent(2, 0, 4, Archetype::Glitcher),
        agent(3, 4, 0, Archetype::Flitter),
    ];
    let mut adversaries = Adversaries::new(Config::new(3));
    let mut events = Vec::new();

    let odd = adversaries.tick(&grid, &agents, None, 1, &mut events);
    assert_eq!(odd.tick, 2);
    let moved: Vec<bool> = odd
        .agents
        .iter()
        .zip(&agents)
        .map(|(after, before)| after.cell != before.cell)
        .collect();
    assert_eq!(moved, vec![false, true, false, false]);

    let even = adversaries.tick(&grid, &agents, None, 2, &mut events);
    assert!(even
        .agents
        .iter()
        .zip(&agents)
        .all(|(after, before)| after.cell.manhattan_distance(before.cell) == 1));
}

#[test]
fn certain_pursuit_steps_toward_the_disturbance() {
    let grid = open_grid(5, TileKind::Empty);
    let agents = vec![agent(0, 0, 0, Archetype::Stalker)];
    let mut adversaries = simulation(11, uniform_tuning(1.0, 0.0, 0.0));
    let mut events = Vec::new();

    let outcome = adversaries.tick(&grid, &agents, Some(CellCoord::new(4, 0)), 0, &mut events);

    assert_eq!(outcome.agents[0].cell, CellCoord::new(1, 0));
    assert_eq!(
        events,
        vec![Event::AgentMoved {
            agent: AgentId::new(0),
            from: CellCoord::new(0, 0),
            to: CellCoord::new(1, 0),
        }]
    );
}

#[test]
fn glitcher_locks_the_tile_it_lands_on() {
    let grid = open_grid(3, TileKind::Corner);
    let agents = vec![agent(0, 1, 1, Archetype::Glitcher)];
    let mut adversaries = simulation(5, uniform_tuning(0.0, 1.0, 1.0));
    let mut events = Vec::new();

    let outcome = adversaries.tick(&grid, &agents, None, 4, &mut events);

    let cell = outcome.agents[0].cell;
    let edited = outcome.grid.expect("locking edits the grid");
    assert_eq!(edited.tile(cell).and_then(Tile::temp_fixed_until), Some(14));
    assert_eq!(edited.tile(cell).map(|tile| tile.rotation().quarter_turns()), Some(0));
    assert!(events.contains(&Event::TileDisturbed {
        agent: AgentId::new(0),
        cell,
        effect: DisturbanceEffect::Locked { until: 14 },
    }));
}

#[test]
fn near_chance_applies_only_on_the_disturbance_cell() {
    let grid = open_grid(5, TileKind::Straight);
    let agents = vec![
        agent(0, 0, 0, Archetype::Flitter),
        agent(1, 4, 4, Archetype::Flitter),
    ];
    let mut adversaries = simulation(13, uniform_tuning(1.0, 1.0, 0.0));
    let mut events = Vec::new();
    let disturbance = CellCoord::new(1, 0);

    let outcome = adversaries.tick(&grid, &agents, Some(disturbance), 0, &mut events);

    assert_eq!(outcome.agents[0].cell, disturbance);
    assert_eq!(outcome.agents[1].cell, CellCoord::new(3, 4));
    let edited = outcome.grid.expect("tampering edits the grid");
    let turns = |cell: CellCoord| edited.tile(cell).map(|tile| tile.rotation().quarter_turns());
    assert_eq!(turns(disturbance), Some(1));
    assert_eq!(turns(CellCoord::new(3, 4)), Some(0));
    let disturbed: Vec<&Event> = events
        .iter()
        .filter(|event| matches!(event, Event::TileDisturbed { .. }))
        .collect();
    assert_eq!(
        disturbed,
        vec![&Event::TileDisturbed {
            agent: AgentId::new(0),
            cell: disturbance,
            effect: DisturbanceEffect::Rotated,
        }]
    );
}

#[test]
fn rotating_archetypes_advance_the_tile() {
    let grid = open_grid(3, TileKind::Straight);
    let agents = vec![agent(0, 1, 1, Archetype::Flitter)];
    let mut adversaries = simulation(9, uniform_tuning(0.0, 1.0, 1.0));
    let mut events = Vec::new();

    let outcome = adversaries.tick(&grid, &agents, None, 1, &mut events);

    let edited = outcome.grid.expect("rotation edits the grid");
    let tile = edited.tile(CellCoord::new(1, 1)).expect("tile");
    assert_eq!(tile.rotation().quarter_turns(), 1);
    assert_eq!(
        grid.tile(CellCoord::new(1, 1)).map(|tile| tile.rotation().quarter_turns()),
        Some(0)
    );
}

#[test]
fn immune_tiles_are_left_alone() {
    let mut rows = vec![vec![Tile::new(TileKind::Corner).fixed(); 2]; 2];
    rows[0][1] = Tile::new(TileKind::Switch);
    rows[1][0] = Tile::new(TileKind::Sink);
    rows[1][1] = Tile::new(TileKind::Block);
    let grid = Grid::from_rows(rows).expect("square grid");
    let agents = vec![
        agent(0, 0, 0, Archetype::Stalker),
        agent(1, 0, 1, Archetype::Glitcher),
        agent(2, 1, 0, Archetype::Flitter),
        agent(3, 1, 1, Archetype::Sprinter),
    ];
    let mut adversaries = simulation(1, uniform_tuning(0.0, 1.0, 1.0));
    let mut events = Vec::new();

    let outcome = adversaries.tick(&grid, &agents, None, 0, &mut events);

    assert_eq!(outcome.grid, None);
    assert!(events.is_empty());
}

#[test]
fn expired_locks_are_cleared() {
    let mut rows = vec![vec![Tile::new(TileKind::Straight); 2]; 2];
    rows[0][0].lock_until(5);
    rows[1][1].lock_until(9);
    let grid = Grid::from_rows(rows).expect("square grid");
    let mut adversaries = simulation(2, uniform_tuning(0.0, 0.0, 0.0));
    let mut events = Vec::new();

    let outcome = adversaries.tick(&grid, &[], None, 5, &mut events);

    let edited = outcome.grid.expect("expiry edits the grid");
    assert_eq!(edited.tile(CellCoord::new(0, 0)).and_then(Tile::temp_fixed_until), None);
    assert_eq!(edited.tile(CellCoord::new(1, 1)).and_then(Tile::temp_fixed_until), Some(9));
    assert_eq!(
        events,
        vec![Event::TileLockExpired {
            cell: CellCoord::new(0, 0)
        }]
    );
}

#[test]
fn quiet_tick_leaves_the_grid_unchanged() {
    let grid = open_grid(3, TileKind::Corner);
    let mut adversaries = simulation(2, uniform_tuning(0.5, 0.0, 0.0));
    let mut events = Vec::new();

    let outcome = adversaries.tick(&grid, &[agent(0, 0, 0, Archetype::Stalker)], None, 0, &mut events);

    assert_eq!(outcome.grid, None);
    assert_eq!(outcome.tick, 1);
}

#[test]
fn same_seed_replays_identically() {
    fn run(seed: u64) -> Vec<TickOutcome> {
        let mut grid = open_grid(5, TileKind::Corner);
        let mut agents = vec![
            agent(0, 0, 0, Archetype::Stalker),
            agent(1, 4, 4, Archetype::Glitcher),
            agent(2, 2, 2, Archetype::Sprinter),
        ];
        let mut adversaries = Adversaries::new(Config::new(seed));
        let mut events = Vec::new();
        let mut outcomes = Vec::new();
        for tick in 0..30 {
            let outcome =
                adversaries.tick(&grid, &agents, Some(CellCoord::new(2, 3)), tick, &mut events);
            agents = outcome.agents.clone();
            if let Some(next) = &outcome.grid {
                grid = next.clone();
            }
            outcomes.push(outcome);
        }
        outcomes
    }

    assert_eq!(run(42), run(42));
}
