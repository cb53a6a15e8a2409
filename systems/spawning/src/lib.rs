#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system that places a level's adversary roster.

use std::collections::HashSet;

use quantum_loop_core::{Agent, AgentId, Archetype, CellCoord};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Random draws spent looking for a free cell before accepting an overlap.
pub const DEFAULT_PLACEMENT_ATTEMPTS: u32 = 10;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
    placement_attempts: u32,
}

impl Config {
    /// Creates a new configuration using the provided seed and the default
    /// attempt budget.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self {
            rng_seed,
            placement_attempts: DEFAULT_PLACEMENT_ATTEMPTS,
        }
    }

    /// Overrides how many draws each agent may spend looking for a free cell.
    #[must_use]
    pub const fn with_placement_attempts(mut self, placement_attempts: u32) -> Self {
        self.placement_attempts = placement_attempts;
        self
    }
}

/// Pure system that scatters agents across a square grid.
#[derive(Debug)]
pub struct Spawning {
    rng: ChaCha8Rng,
    placement_attempts: u32,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            placement_attempts: config.placement_attempts.max(1),
        }
    }

    /// Places one agent per roster entry, assigning identifiers in roster order.
    ///
    /// Each agent draws random cells until it finds one no earlier agent took,
    /// giving up after the configured attempt budget and keeping its last
    /// draw. Overlap is therefore unlikely but possible on crowded grids.
    pub fn place(&mut self, grid_size: u32, roster: &[Archetype]) -> Vec<Agent> {
        if grid_size == 0 {
            return Vec::new();
        }

        let mut taken = HashSet::with_capacity(roster.len());
        let mut agents = Vec::with_capacity(roster.len());
        for (index, archetype) in roster.iter().enumerate() {
            let cell = self.draw_cell(grid_size, &taken);
            let _ = taken.insert(cell);
            let id = AgentId::new(u32::try_from(index).unwrap_or(u32::MAX));
            agents.push(Agent::new(id, cell, *archetype));
        }
        agents
    }

    fn draw_cell(&mut self, grid_size: u32, taken: &HashSet<CellCoord>) -> CellCoord {
        let mut cell = self.random_cell(grid_size);
        for _ in 1..self.placement_attempts {
            if !taken.contains(&cell) {
                break;
            }
            cell = self.random_cell(grid_size);
        }
        cell
    }

    fn random_cell(&mut self, grid_size: u32) -> CellCoord {
        let row = self.rng.gen_range(0..grid_size);
        let column = self.rng.gen_range(0..grid_size);
        CellCoord::new(row, column)
    }
}

/// Reports whether any two agents share a cell.
#[must_use]
pub fn has_overlap(agents: &[Agent]) -> bool {
    let mut seen = HashSet::with_capacity(agents.len());
    agents.iter().any(|agent| !seen.insert(agent.cell))
}
