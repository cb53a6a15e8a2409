#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Rotation and entanglement engine applied when the player clicks a tile.

use quantum_loop_core::{CellCoord, Grid, RotationRejection, Tick};

/// Result of a single player rotation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RotationOutcome {
    /// The rotation was accepted and produced a new grid.
    Rotated {
        /// Copy of the grid with every eligible tile advanced.
        grid: Grid,
        /// Cells that advanced, starting with the clicked cell followed by
        /// entangled partners in row-major order.
        rotated: Vec<CellCoord>,
    },
    /// The rotation was refused; the caller keeps its current grid.
    Rejected(RotationRejection),
}

/// Advances the clicked tile and every unlocked tile entangled with it.
///
/// Locks are evaluated against `tick`: a fixed tile, or one whose temporary
/// lock runs past `tick`, rejects the whole action when clicked and is
/// skipped when it is merely an entangled partner.
#[must_use]
pub fn apply_rotation(grid: &Grid, cell: CellCoord, tick: Tick) -> RotationOutcome {
    let Some(target) = grid.tile(cell) else {
        return RotationOutcome::Rejected(RotationRejection::OutOfBounds);
    };
    if target.is_fixed() {
        return RotationOutcome::Rejected(RotationRejection::Fixed);
    }
    if target.is_locked_at(tick) {
        return RotationOutcome::Rejected(RotationRejection::TemporarilyLocked);
    }

    let mut rotated = vec![cell];
    rotated.extend(grid.group_members(target.group()).filter(|member| {
        *member != cell
            && grid
                .tile(*member)
                .is_some_and(|partner| !partner.is_locked_at(tick))
    }));

    let mut next = grid.clone();
    for member in &rotated {
        if let Some(tile) = next.tile_mut(*member) {
            tile.advance_rotation();
        }
    }

    RotationOutcome::Rotated {
        grid: next,
        rotated,
    }
}
