#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick-based adversary simulation that moves agents and lets them tamper
//! with the tiles they land on.
//!
//! A tick runs in two phases. Movement resolves agents one at a time in list
//! order against a dense occupancy grid, so no two agents ever share a cell
//! once the tick completes. Interaction then rolls, for every agent at its
//! resolved cell, whether it rotates or locks the tile beneath it. The input
//! grid is never touched; a copy is produced only when some tile changed.

use quantum_loop_core::{
    Agent, Archetype, CellCoord, Direction, DisturbanceEffect, Event, Grid, Tick, Tile, TileKind,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Ticks a glitcher lock keeps a tile from rotating.
pub const DEFAULT_LOCK_DURATION: Tick = 10;

/// Probabilities governing one archetype's behaviour.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArchetypeTuning {
    /// Chance of taking the step closest to the disturbance instead of a random one.
    pub pursuit_chance: f64,
    /// Chance of tampering with the tile when standing on the disturbance cell.
    pub near_interaction_chance: f64,
    /// Chance of tampering with the tile anywhere else.
    pub far_interaction_chance: f64,
}

impl ArchetypeTuning {
    /// Creates a tuning entry from explicit probabilities.
    #[must_use]
    pub const fn new(
        pursuit_chance: f64,
        near_interaction_chance: f64,
        far_interaction_chance: f64,
    ) -> Self {
        Self {
            pursuit_chance,
            near_interaction_chance,
            far_interaction_chance,
        }
    }
}

/// Aggregated tuning knobs for every archetype.
#[derive(Clone, Debug, PartialEq)]
pub struct AdversaryTuning {
    /// Number of ticks a glitcher lock lasts.
    pub lock_duration: Tick,
    /// Tuning applied to stalkers.
    pub stalker: ArchetypeTuning,
    /// Tuning applied to sprinters.
    pub sprinter: ArchetypeTuning,
    /// Tuning applied to glitchers.
    pub glitcher: ArchetypeTuning,
    /// Tuning applied to flitters.
    pub flitter: ArchetypeTuning,
}

impl AdversaryTuning {
    /// Returns the tuning entry for the provided archetype.
    #[must_use]
    pub const fn archetype(&self, archetype: Archetype) -> &ArchetypeTuning {
        match archetype {
            Archetype::Stalker => &self.stalker,
            Archetype::Sprinter => &self.sprinter,
            Archetype::Glitcher => &self.glitcher,
            Archetype::Flitter => &self.flitter,
        }
    }
}

impl Default for AdversaryTuning {
    fn default() -> Self {
        Self {
            lock_duration: DEFAULT_LOCK_DURATION,
            stalker: ArchetypeTuning::new(0.95, 0.8, 0.1),
            sprinter: ArchetypeTuning::new(0.8, 0.6, 0.05),
            glitcher: ArchetypeTuning::new(0.8, 0.9, 0.2),
            flitter: ArchetypeTuning::new(0.8, 0.7, 0.15),
        }
    }
}

/// Configuration parameters required to construct the simulation.
#[derive(Clone, Debug)]
pub struct Config {
    rng_seed: u64,
    tuning: AdversaryTuning,
}

impl Config {
    /// Creates a configuration with default tuning and the provided seed.
    #[must_use]
    pub fn new(rng_seed: u64) -> Self {
        Self {
            rng_seed,
            tuning: AdversaryTuning::default(),
        }
    }

    /// Replaces the tuning surface.
    #[must_use]
    pub fn with_tuning(mut self, tuning: AdversaryTuning) -> Self {
        self.tuning = tuning;
        self
    }
}

/// State committed by a single tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickOutcome {
    /// Tick counter after the step.
    pub tick: Tick,
    /// Agents at their resolved cells, in input order.
    pub agents: Vec<Agent>,
    /// Edited copy of the grid, or `None` when no tile changed.
    pub grid: Option<Grid>,
}

/// Adversary simulation that reuses its occupancy buffer across ticks.
#[derive(Debug)]
pub struct Adversaries {
    rng: ChaCha8Rng,
    tuning: AdversaryTuning,
    occupancy: Occupancy,
    candidates: Vec<CellCoord>,
}

impl Adversaries {
    /// Creates a new simulation using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            tuning: config.tuning,
            occupancy: Occupancy::default(),
            candidates: Vec::with_capacity(Direction::ALL.len()),
        }
    }

    /// Advances every agent by one tick.
    ///
    /// `disturbance` is the last cell the player rotated. Movement and tile
    /// events are appended to `out` in the order they were resolved.
    pub fn tick(
        &mut self,
        grid: &Grid,
        agents: &[Agent],
        disturbance: Option<CellCoord>,
        tick: Tick,
        out: &mut Vec<Event>,
    ) -> TickOutcome {
        let agents = self.resolve_movement(grid, agents, disturbance, tick, out);
        let grid = self.resolve_interactions(grid, &agents, disturbance, tick, out);

        TickOutcome {
            tick: tick.saturating_add(1),
            agents,
            grid,
        }
    }

    fn resolve_movement(
        &mut self,
        grid: &Grid,
        agents: &[Agent],
        disturbance: Option<CellCoord>,
        tick: Tick,
        out: &mut Vec<Event>,
    ) -> Vec<Agent> {
        self.occupancy.fill_with(grid.size(), agents);

        let mut resolved = Vec::with_capacity(agents.len());
        for agent in agents {
            let mut next = *agent;
            if agent.archetype.moves_on(tick) {
                if let Some(destination) = self.choose_destination(grid, agent, disturbance) {
                    if self.occupancy.can_enter(destination) {
                        self.occupancy.vacate(agent.cell);
                        self.occupancy.occupy(destination);
                        next.cell = destination;
                        out.push(Event::AgentMoved {
                            agent: agent.id,
                            from: agent.cell,
                            to: destination,
                        });
                    }
                }
            }
            resolved.push(next);
        }
        resolved
    }

    fn choose_destination(
        &mut self,
        grid: &Grid,
        agent: &Agent,
        disturbance: Option<CellCoord>,
    ) -> Option<CellCoord> {
        self.candidates.clear();
        self.candidates.extend(
            Direction::ALL
                .into_iter()
                .filter_map(|direction| grid.neighbor(agent.cell, direction)),
        );
        if self.candidates.is_empty() {
            return None;
        }

        if let Some(target) = disturbance {
            let chance = self.tuning.archetype(agent.archetype).pursuit_chance;
            if roll(&mut self.rng, chance) {
                return self
                    .candidates
                    .iter()
                    .copied()
                    .min_by_key(|candidate| candidate.manhattan_distance(target));
            }
        }

        let index = self.rng.gen_range(0..self.candidates.len());
        self.candidates.get(index).copied()
    }

    fn resolve_interactions(
        &mut self,
        grid: &Grid,
        agents: &[Agent],
        disturbance: Option<CellCoord>,
        tick: Tick,
        out: &mut Vec<Event>,
    ) -> Option<Grid> {
        let mut next: Option<Grid> = None;

        let expired: Vec<CellCoord> = grid
            .iter()
            .filter(|(_, tile)| tile.temp_fixed_until().is_some_and(|until| tick >= until))
            .map(|(cell, _)| cell)
            .collect();
        for cell in expired {
            let edited = next.get_or_insert_with(|| grid.clone());
            if let Some(tile) = edited.tile_mut(cell) {
                if tile.clear_expired_lock(tick) {
                    out.push(Event::TileLockExpired { cell });
                }
            }
        }

        for agent in agents {
            let current = next.as_ref().unwrap_or(grid);
            let Some(tile) = current.tile(agent.cell) else {
                continue;
            };
            if !is_susceptible(tile, tick) {
                continue;
            }

            let tuning = self.tuning.archetype(agent.archetype);
            let chance = if disturbance == Some(agent.cell) {
                tuning.near_interaction_chance
            } else {
                tuning.far_interaction_chance
            };
            if !roll(&mut self.rng, chance) {
                continue;
            }

            let lock_duration = self.tuning.lock_duration;
            let edited = next.get_or_insert_with(|| grid.clone());
            let Some(tile) = edited.tile_mut(agent.cell) else {
                continue;
            };
            let effect = if agent.archetype.locks_tiles() {
                let until = tick.saturating_add(lock_duration);
                tile.lock_until(until);
                DisturbanceEffect::Locked { until }
            } else {
                tile.advance_rotation();
                DisturbanceEffect::Rotated
            };
            out.push(Event::TileDisturbed {
                agent: agent.id,
                cell: agent.cell,
                effect,
            });
        }

        next
    }
}

/// Reports whether agents may tamper with the tile at the provided tick.
///
/// Fixed and currently locked tiles are untouchable, as are tiles whose
/// rotation carries no meaning for the puzzle or must never move.
#[must_use]
pub fn is_susceptible(tile: &Tile, tick: Tick) -> bool {
    let immune_kind = matches!(
        tile.kind(),
        TileKind::Empty | TileKind::Block | TileKind::Switch | TileKind::Sink | TileKind::Source
    );
    !immune_kind && !tile.is_locked_at(tick)
}

fn roll(rng: &mut ChaCha8Rng, chance: f64) -> bool {
    rng.gen_bool(chance.clamp(0.0, 1.0))
}

/// Dense per-cell agent counts used to resolve movement conflicts.
#[derive(Clone, Debug, Default)]
struct Occupancy {
    size: u32,
    cells: Vec<u16>,
}

impl Occupancy {
    fn fill_with(&mut self, size: u32, agents: &[Agent]) {
        let capacity_u64 = u64::from(size) * u64::from(size);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        self.size = size;
        self.cells.clear();
        self.cells.resize(capacity, 0);
        for agent in agents {
            self.occupy(agent.cell);
        }
    }

    fn can_enter(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.cells.get(index))
            .is_some_and(|count| *count == 0)
    }

    fn occupy(&mut self, cell: CellCoord) {
        if let Some(slot) = self.index(cell).and_then(|index| self.cells.get_mut(index)) {
            *slot = slot.saturating_add(1);
        }
    }

    fn vacate(&mut self, cell: CellCoord) {
        if let Some(slot) = self.index(cell).and_then(|index| self.cells.get_mut(index)) {
            *slot = slot.saturating_sub(1);
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.row() < self.size && cell.column() < self.size {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.size).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}
