#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative level session state for Quantum Loop.
//!
//! A [`Session`] owns the grid, the agents and every counter of one level
//! attempt. It is mutated exclusively through [`apply`] and observed through
//! the [`query`] functions plus the events `apply` emits.

pub mod catalogue;
mod history;
mod level;

use std::{sync::Arc, time::Duration};

use log::{debug, info, warn};
use quantum_loop_core::{
    Agent, BeamTrace, CellCoord, Command, EntanglementGroup, Event, Grid, ProjectileRejection,
    RotationRejection, SessionStatus, Tick, TileKind,
};
use quantum_loop_system_adversaries::{self as adversaries, Adversaries, AdversaryTuning};
use quantum_loop_system_beam::trace_beam;
use quantum_loop_system_rotation::{apply_rotation, RotationOutcome};
use quantum_loop_system_spawning::{self as spawning, has_overlap, Spawning};
use quantum_loop_system_targeting::{apply_projectile, resolve_target};

pub use history::DEFAULT_HISTORY_CAPACITY;
pub use level::{
    AdversaryQuota, LevelDefinition, LevelError, TileSpec, MAX_GRID_SIZE, MIN_GRID_SIZE,
};

/// Seed used when the caller does not supply one.
pub const DEFAULT_SEED: u64 = 0x51_7a_a1_c0_ff_ee_00_01;
/// Projectiles available at level start unless configured otherwise.
pub const DEFAULT_PROJECTILE_STOCK: u32 = 3;

const SPAWN_STREAM: u64 = 0x9e37_79b9_7f4a_7c15;

/// Parameters applied when a session starts.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    seed: u64,
    projectile_stock: u32,
    history_capacity: usize,
    tuning: AdversaryTuning,
}

impl SessionConfig {
    /// Creates a configuration with default limits and the provided seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            projectile_stock: DEFAULT_PROJECTILE_STOCK,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            tuning: AdversaryTuning::default(),
        }
    }

    /// Overrides the number of projectiles available at level start.
    #[must_use]
    pub fn with_projectile_stock(mut self, projectile_stock: u32) -> Self {
        self.projectile_stock = projectile_stock;
        self
    }

    /// Overrides how many replaced grids the session keeps.
    #[must_use]
    pub fn with_history_capacity(mut self, history_capacity: usize) -> Self {
        self.history_capacity = history_capacity;
        self
    }

    /// Overrides the adversary tuning surface.
    #[must_use]
    pub fn with_tuning(mut self, tuning: AdversaryTuning) -> Self {
        self.tuning = tuning;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

/// One attempt at one level.
#[derive(Debug)]
pub struct Session {
    number: u32,
    description: String,
    par: u32,
    time_limit: Duration,
    roster: Option<Vec<AdversaryQuota>>,
    grid: Arc<Grid>,
    agents: Vec<Agent>,
    beam: BeamTrace,
    moves: u32,
    tick: Tick,
    disturbance: Option<CellCoord>,
    status: SessionStatus,
    projectiles: u32,
    history: history::History,
    adversaries: Adversaries,
}

impl Session {
    /// Validates the level, places its adversaries and traces the initial beam.
    ///
    /// A level authored in a solved state starts out completed.
    pub fn start(level: &LevelDefinition, config: SessionConfig) -> Result<Self, LevelError> {
        let grid = level.build_grid()?;
        warn_unpaired_portals(level.number, &grid);

        let roster = level.roster();
        let mut spawner = Spawning::new(spawning::Config::new(config.seed ^ SPAWN_STREAM));
        let agents = spawner.place(grid.size(), &roster);
        if has_overlap(&agents) {
            warn!(
                "level {}: {} agents could not all find distinct cells",
                level.number,
                agents.len()
            );
        }

        let beam = trace_beam(&grid);
        let status = if beam.reached_sink {
            info!("level {} starts solved", level.number);
            SessionStatus::Completed
        } else {
            SessionStatus::Active
        };

        debug!(
            "started level {} ({}x{}, {} agents, seed {:#x})",
            level.number,
            grid.size(),
            grid.size(),
            agents.len(),
            config.seed
        );

        Ok(Self {
            number: level.number,
            description: level.description.clone(),
            par: level.par,
            time_limit: level.time_limit(),
            roster: level.adversaries.clone(),
            grid: Arc::new(grid),
            agents,
            beam,
            moves: 0,
            tick: 0,
            disturbance: None,
            status,
            projectiles: config.projectile_stock,
            history: history::History::new(config.history_capacity),
            adversaries: Adversaries::new(
                adversaries::Config::new(config.seed).with_tuning(config.tuning),
            ),
        })
    }

    fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    fn replace_grid(&mut self, grid: Grid, out_events: &mut Vec<Event>) {
        self.grid = Arc::new(grid);
        self.beam = trace_beam(&self.grid);
        out_events.push(Event::BeamRetraced {
            reached_sink: self.beam.reached_sink,
            segments: self.beam.path.len(),
            gates_open: self.beam.gates_open,
        });

        if self.beam.reached_sink && self.is_active() {
            self.status = SessionStatus::Completed;
            info!(
                "level {} completed in {} moves (par {})",
                self.number, self.moves, self.par
            );
            out_events.push(Event::LevelCompleted {
                moves: self.moves,
                par: self.par,
            });
        }
    }
}

/// Applies the provided command to the session, emitting resulting events.
pub fn apply(session: &mut Session, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::RotateTile { cell } => {
            if !session.is_active() {
                out_events.push(Event::RotationRejected {
                    cell,
                    reason: RotationRejection::SessionInactive,
                });
                return;
            }

            match apply_rotation(&session.grid, cell, session.tick) {
                RotationOutcome::Rejected(reason) => {
                    debug!("rotation at {cell:?} rejected: {reason:?}");
                    out_events.push(Event::RotationRejected { cell, reason });
                }
                RotationOutcome::Rotated { grid, rotated } => {
                    debug!("rotated {} tiles from {cell:?}", rotated.len());
                    session.history.push(Arc::clone(&session.grid));
                    session.moves = session.moves.saturating_add(1);
                    session.disturbance = Some(cell);
                    out_events.push(Event::TileRotated { cell, rotated });
                    session.replace_grid(grid, out_events);
                }
            }
        }
        Command::Tick => {
            if !session.is_active() {
                return;
            }

            let outcome = session.adversaries.tick(
                &session.grid,
                &session.agents,
                session.disturbance,
                session.tick,
                out_events,
            );
            session.agents = outcome.agents;
            session.tick = outcome.tick;
            out_events.push(Event::TickAdvanced { tick: session.tick });
            if let Some(grid) = outcome.grid {
                session.replace_grid(grid, out_events);
            }
        }
        Command::LaunchProjectile {
            angle_degrees,
            power_percent,
        } => {
            let rejection = if !session.is_active() {
                Some(ProjectileRejection::SessionInactive)
            } else if session.projectiles == 0 {
                Some(ProjectileRejection::OutOfProjectiles)
            } else {
                None
            };
            if let Some(reason) = rejection {
                out_events.push(Event::ProjectileRejected { reason });
                return;
            }

            session.projectiles -= 1;
            let size = session.grid.size();
            let target = resolve_target(angle_degrees, power_percent, size, size);
            let impact = apply_projectile(&session.agents, target);
            session.agents = impact.agents;
            debug!(
                "projectile landed on {target:?}, {} left in stock",
                session.projectiles
            );
            out_events.push(Event::ProjectileResolved {
                target,
                destroyed: impact.destroyed,
            });
        }
        Command::GrantProjectiles { count } => {
            session.projectiles = session.projectiles.saturating_add(count);
            out_events.push(Event::ProjectilesGranted {
                remaining: session.projectiles,
            });
        }
        Command::ExpireCountdown => {
            if !session.is_active() {
                return;
            }
            session.status = SessionStatus::Failed;
            info!(
                "level {} failed after {} moves",
                session.number, session.moves
            );
            out_events.push(Event::LevelFailed {
                moves: session.moves,
            });
        }
    }
}

fn warn_unpaired_portals(number: u32, grid: &Grid) {
    let ungrouped = grid
        .iter()
        .filter(|(_, tile)| tile.kind() == TileKind::Portal && !tile.group().is_entangled())
        .count();
    if ungrouped > 0 {
        warn!("level {number}: {ungrouped} portals carry no group and act as dead ends");
    }

    for group in [
        EntanglementGroup::Alpha,
        EntanglementGroup::Beta,
        EntanglementGroup::Gamma,
    ] {
        let portals = grid
            .iter()
            .filter(|(_, tile)| tile.kind() == TileKind::Portal && tile.group() == group)
            .count();
        if portals != 0 && portals != 2 {
            warn!("level {number}: {portals} {group:?} portals cannot pair and act as dead ends");
        }
    }
}

/// Query functions that provide read-only access to the session state.
pub mod query {
    use std::{sync::Arc, time::Duration};

    use super::{LevelDefinition, Session, TileSpec};
    use quantum_loop_core::{Agent, BeamTrace, CellCoord, Grid, SessionStatus, Tick};

    /// Snapshot of the current grid; later mutations never alter it.
    #[must_use]
    pub fn grid(session: &Session) -> Arc<Grid> {
        Arc::clone(&session.grid)
    }

    /// Agents in spawn order.
    #[must_use]
    pub fn agents(session: &Session) -> &[Agent] {
        &session.agents
    }

    /// Beam traced after the most recent grid change.
    #[must_use]
    pub fn beam(session: &Session) -> &BeamTrace {
        &session.beam
    }

    /// Accepted player rotations.
    #[must_use]
    pub fn moves(session: &Session) -> u32 {
        session.moves
    }

    /// Adversary clock.
    #[must_use]
    pub fn tick(session: &Session) -> Tick {
        session.tick
    }

    /// Cell of the most recent accepted player rotation.
    #[must_use]
    pub fn disturbance(session: &Session) -> Option<CellCoord> {
        session.disturbance
    }

    /// Lifecycle state of the session.
    #[must_use]
    pub fn status(session: &Session) -> SessionStatus {
        session.status
    }

    /// Projectiles left in stock.
    #[must_use]
    pub fn projectiles(session: &Session) -> u32 {
        session.projectiles
    }

    /// Number of replaced grids currently retained.
    #[must_use]
    pub fn history_len(session: &Session) -> usize {
        session.history.len()
    }

    /// Grid as it stood before the most recent accepted rotation.
    #[must_use]
    pub fn previous_grid(session: &Session) -> Option<Arc<Grid>> {
        session.history.latest().cloned()
    }

    /// Level number being played.
    #[must_use]
    pub fn level_number(session: &Session) -> u32 {
        session.number
    }

    /// Flavour text of the level being played.
    #[must_use]
    pub fn description(session: &Session) -> &str {
        &session.description
    }

    /// Target number of rotations.
    #[must_use]
    pub fn par(session: &Session) -> u32 {
        session.par
    }

    /// Countdown granted for the level.
    #[must_use]
    pub fn time_limit(session: &Session) -> Duration {
        session.time_limit
    }

    /// Captures the current board as a level definition that starts from it.
    ///
    /// Temporary locks and agent positions are not part of the snapshot; an
    /// authored adversary roster is carried over as written.
    #[must_use]
    pub fn level_snapshot(session: &Session) -> LevelDefinition {
        let size = usize::try_from(session.grid.size()).unwrap_or(0);
        let mut tiles = vec![Vec::with_capacity(size); size];
        for (cell, tile) in session.grid.iter() {
            if let Some(row) = usize::try_from(cell.row())
                .ok()
                .and_then(|row| tiles.get_mut(row))
            {
                row.push(TileSpec::from(tile));
            }
        }

        LevelDefinition {
            number: session.number,
            description: session.description.clone(),
            par: session.par,
            time_limit_secs: u32::try_from(session.time_limit.as_secs()).ok(),
            tiles,
            adversaries: session.roster.clone(),
        }
    }
}
