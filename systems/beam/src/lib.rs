#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure beam tracer that walks the light path from the source toward a sink.
//!
//! The tracer is a function of the grid alone. Gate passability depends on
//! whether the beam touches any switch, which is only known after a complete
//! walk, so [`trace_beam`] walks once with every gate closed and, if that walk
//! touched a switch, walks again with every gate open.

use quantum_loop_core::{BeamSegment, BeamTrace, Direction, Grid, Rotation, Tile, TileKind};

/// Upper bound on cell-to-cell moves performed by a single walk.
pub const MAX_STEPS: usize = 100;

/// Passability applied to every gate during a single walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GateState {
    /// Gates behave as dead ends.
    Closed,
    /// Gates conduct like straight connectors.
    Open,
}

/// Traces the beam with switch-aware gate resolution.
///
/// A level is solved exactly when the returned trace reports `reached_sink`.
#[must_use]
pub fn trace_beam(grid: &Grid) -> BeamTrace {
    let closed = trace_with_gates(grid, GateState::Closed);
    if closed.switch_touched {
        trace_with_gates(grid, GateState::Open)
    } else {
        closed
    }
}

/// Performs a single walk with every gate forced into the provided state.
#[must_use]
pub fn trace_with_gates(grid: &Grid, gates: GateState) -> BeamTrace {
    let mut trace = BeamTrace {
        gates_open: gates == GateState::Open,
        ..BeamTrace::default()
    };

    let Some((source_cell, source)) = grid.source() else {
        return trace;
    };

    let mut direction = Direction::from_quarter_turns(source.rotation().quarter_turns());
    let mut current = source_cell;
    trace.path.push(BeamSegment {
        cell: current,
        entry: direction,
        exit: Some(direction),
        active: true,
        teleport_to: None,
    });

    let mut steps = 0;
    while steps < MAX_STEPS {
        let Some(next) = grid.neighbor(current, direction) else {
            break;
        };
        let Some(tile) = grid.tile(next) else {
            break;
        };

        match tile.kind() {
            TileKind::Sink => {
                trace.path.push(BeamSegment {
                    cell: next,
                    entry: direction,
                    exit: None,
                    active: true,
                    teleport_to: None,
                });
                trace.reached_sink = true;
                break;
            }
            TileKind::Switch => trace.switch_touched = true,
            TileKind::Portal => {
                if let Some(destination) = grid.portal_partner(next) {
                    trace.path.push(BeamSegment {
                        cell: next,
                        entry: direction,
                        exit: None,
                        active: true,
                        teleport_to: Some(destination),
                    });
                    trace.path.push(BeamSegment {
                        cell: destination,
                        entry: direction,
                        exit: Some(direction),
                        active: true,
                        teleport_to: None,
                    });
                    current = destination;
                    steps += 1;
                    continue;
                }
            }
            _ => {}
        }

        let Some(exit) = exit_direction(tile, direction, gates) else {
            trace.path.push(BeamSegment {
                cell: next,
                entry: direction,
                exit: None,
                active: false,
                teleport_to: None,
            });
            break;
        };

        trace.path.push(BeamSegment {
            cell: next,
            entry: direction,
            exit: Some(exit),
            active: true,
            teleport_to: None,
        });
        current = next;
        direction = exit;
        steps += 1;
    }

    trace
}

/// Direction the beam leaves a tile it entered while travelling `entry`.
///
/// Portals only reach this point when they have no partner, which makes
/// them dead ends.
fn exit_direction(tile: &Tile, entry: Direction, gates: GateState) -> Option<Direction> {
    match tile.effective_kind() {
        TileKind::Empty
        | TileKind::Block
        | TileKind::Source
        | TileKind::Sink
        | TileKind::Portal
        | TileKind::Superposition => None,
        TileKind::Cross | TileKind::Switch => Some(entry),
        TileKind::Straight => straight_exit(tile.rotation(), entry),
        TileKind::Gate => match gates {
            GateState::Open => straight_exit(tile.rotation(), entry),
            GateState::Closed => None,
        },
        TileKind::Corner => corner_exit(tile.rotation(), entry),
    }
}

fn straight_exit(rotation: Rotation, entry: Direction) -> Option<Direction> {
    (rotation.is_even() == entry.is_vertical()).then_some(entry)
}

fn corner_exit(rotation: Rotation, entry: Direction) -> Option<Direction> {
    use Direction::{East, North, South, West};

    match (rotation.quarter_turns(), entry) {
        (0, South) => Some(East),
        (0, West) => Some(North),
        (1, West) => Some(South),
        (1, North) => Some(East),
        (2, North) => Some(West),
        (2, East) => Some(South),
        (3, East) => Some(North),
        (3, South) => Some(West),
        _ => None,
    }
}
