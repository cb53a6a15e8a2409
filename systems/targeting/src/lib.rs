#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure projectile targeting: maps an aim onto a grid cell and removes the
//! agent standing there.
//!
//! Projectiles launch from the bottom-centre edge of the grid. An angle of
//! zero points straight up the rows; positive angles lean toward higher
//! columns. Power scales the flight distance relative to the grid height.

use quantum_loop_core::{Agent, AgentId, CellCoord};

/// Smallest accepted aim angle in degrees.
pub const MIN_ANGLE_DEGREES: f32 = -45.0;
/// Largest accepted aim angle in degrees.
pub const MAX_ANGLE_DEGREES: f32 = 45.0;
/// Smallest accepted aim power in percent.
pub const MIN_POWER_PERCENT: f32 = 10.0;
/// Largest accepted aim power in percent.
pub const MAX_POWER_PERCENT: f32 = 100.0;
/// Fraction of the grid height covered by a full-power shot.
pub const RANGE_FACTOR: f64 = 0.95;

/// Computes the cell struck by a projectile fired with the provided aim.
///
/// Angle and power are clamped into their accepted ranges before the
/// projection and the resulting cell is clamped into the grid, so every aim
/// lands somewhere on the board.
#[must_use]
pub fn resolve_target(angle_degrees: f32, power_percent: f32, rows: u32, columns: u32) -> CellCoord {
    let angle = clamp_or(angle_degrees, MIN_ANGLE_DEGREES, MAX_ANGLE_DEGREES, 0.0);
    let power = clamp_or(
        power_percent,
        MIN_POWER_PERCENT,
        MAX_POWER_PERCENT,
        MIN_POWER_PERCENT,
    );

    let distance = f64::from(power) / 100.0 * RANGE_FACTOR * f64::from(rows);
    let radians = f64::from(angle).to_radians();
    let y = f64::from(rows) - distance * radians.cos();
    let x = f64::from(columns) / 2.0 + distance * radians.sin();

    CellCoord::new(clamp_axis(y, rows), clamp_axis(x, columns))
}

/// Result of a projectile landing on a cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Impact {
    /// Agents that survived the impact, in their original order.
    pub agents: Vec<Agent>,
    /// Agent removed by the impact, if any stood on the target.
    pub destroyed: Option<AgentId>,
}

/// Removes the first agent, in list order, occupying `target`.
///
/// The input slice is left untouched; survivors are returned in a new list.
#[must_use]
pub fn apply_projectile(agents: &[Agent], target: CellCoord) -> Impact {
    let struck = agents.iter().position(|agent| agent.cell == target);
    let destroyed = struck.and_then(|index| agents.get(index)).map(|agent| agent.id);
    let agents = agents
        .iter()
        .enumerate()
        .filter(|(index, _)| Some(*index) != struck)
        .map(|(_, agent)| *agent)
        .collect();

    Impact { agents, destroyed }
}

fn clamp_or(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}

fn clamp_axis(position: f64, dimension: u32) -> u32 {
    let last = i64::from(dimension.saturating_sub(1));
    let cell = (position.floor() as i64).clamp(0, last);
    u32::try_from(cell).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{clamp_axis, clamp_or};

    #[test]
    fn axis_clamps_into_bounds() {
        assert_eq!(clamp_axis(-0.2, 5), 0);
        assert_eq!(clamp_axis(2.9, 5), 2);
        assert_eq!(clamp_axis(7.5, 5), 4);
        assert_eq!(clamp_axis(3.0, 0), 0);
    }

    #[test]
    fn nan_falls_back() {
        assert_eq!(clamp_or(f32::NAN, 10.0, 100.0, 10.0), 10.0);
        assert_eq!(clamp_or(250.0, 10.0, 100.0, 10.0), 100.0);
    }
}
