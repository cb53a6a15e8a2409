//! Plain-text rendering of a session for terminal output.
//!
//! Each cell prints as two characters: the tile glyph followed by an overlay
//! marker. Agents take precedence over the beam, which takes precedence over
//! lock markers.

use std::fmt::Write as _;

use quantum_loop_core::{Archetype, CellCoord, Direction, Tile, TileKind};
use quantum_loop_world::{query, Session};

/// Renders the grid, beam and agents of the session.
pub(crate) fn render(session: &Session) -> String {
    let grid = query::grid(session);
    let beam = query::beam(session);
    let agents = query::agents(session);
    let tick = query::tick(session);
    let size = grid.size();

    let mut frame = String::new();
    for row in 0..size {
        for column in 0..size {
            let cell = CellCoord::new(row, column);
            let Some(tile) = grid.tile(cell) else {
                continue;
            };
            let marker = agents
                .iter()
                .find(|agent| agent.cell == cell)
                .map(|agent| archetype_marker(agent.archetype))
                .or_else(|| {
                    beam.path
                        .iter()
                        .any(|segment| segment.cell == cell && segment.active)
                        .then_some('~')
                })
                .or_else(|| (tile.is_locked_at(tick) && !tile.is_fixed()).then_some('!'))
                .unwrap_or(' ');
            frame.push(tile_glyph(tile));
            frame.push(marker);
        }
        frame.push('\n');
    }
    frame
}

/// Renders a one-line status summary.
pub(crate) fn summary(session: &Session) -> String {
    let mut line = String::new();
    let _ = write!(
        line,
        "level {} {:?}: {} moves (par {}), tick {}, {} agents, {} projectiles",
        query::level_number(session),
        query::status(session),
        query::moves(session),
        query::par(session),
        query::tick(session),
        query::agents(session).len(),
        query::projectiles(session),
    );
    line
}

fn tile_glyph(tile: &Tile) -> char {
    let turns = tile.rotation().quarter_turns();
    match tile.kind() {
        TileKind::Empty => '.',
        TileKind::Block => '#',
        TileKind::Source => match Direction::from_quarter_turns(turns) {
            Direction::North => '^',
            Direction::East => '>',
            Direction::South => 'v',
            Direction::West => '<',
        },
        TileKind::Sink => 'E',
        TileKind::Straight if tile.rotation().is_even() => '|',
        TileKind::Straight => '-',
        TileKind::Gate if tile.rotation().is_even() => 'H',
        TileKind::Gate => '=',
        TileKind::Corner => match turns {
            0 => 'L',
            1 => 'F',
            2 => '7',
            _ => 'J',
        },
        TileKind::Cross => '+',
        TileKind::Portal => '@',
        TileKind::Switch => '*',
        TileKind::Superposition => 'Q',
    }
}

fn archetype_marker(archetype: Archetype) -> char {
    match archetype {
        Archetype::Stalker => 's',
        Archetype::Sprinter => 'p',
        Archetype::Glitcher => 'g',
        Archetype::Flitter => 'f',
    }
}
