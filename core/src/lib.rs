#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Quantum Loop engine.
//!
//! This crate defines the passive tile grid, the roaming agents, the beam
//! description produced by the tracer, and the message surface that connects
//! adapters with the session. Adapters submit [`Command`] values describing
//! desired mutations, the session executes those commands via its `apply`
//! entry point, and then broadcasts [`Event`] values describing what changed.
//! Systems never mutate a [`Grid`] they were handed; they clone it and return
//! the edited copy so that any reader holding the previous snapshot observes
//! a consistent, unchanged view.

use serde::{Deserialize, Serialize};

/// Discrete simulation step counter advanced by the adversary cadence.
pub type Tick = u64;

/// Describes the lifecycle state of a level session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionStatus {
    /// The level is being played and accepts rotations and ticks.
    Active,
    /// The beam reached a sink; grid and agents are frozen.
    Completed,
    /// The external countdown ran out before the level was solved.
    Failed,
}

/// Commands that express all permissible session mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Requests a quarter turn of the tile at the provided cell.
    RotateTile {
        /// Cell the player clicked.
        cell: CellCoord,
    },
    /// Advances the adversary simulation by one discrete step.
    Tick,
    /// Fires a projectile from the bottom-centre launch point.
    LaunchProjectile {
        /// Aim angle in degrees, `0` pointing straight up-range.
        angle_degrees: f32,
        /// Aim power expressed as a percentage.
        power_percent: f32,
    },
    /// Adds projectiles to the session stock.
    GrantProjectiles {
        /// Number of projectiles awarded.
        count: u32,
    },
    /// Signals that the external countdown reached zero.
    ExpireCountdown,
}

/// Events broadcast by the session after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a rotation was accepted.
    TileRotated {
        /// Cell the player clicked.
        cell: CellCoord,
        /// Every cell whose rotation advanced, including entangled partners.
        rotated: Vec<CellCoord>,
    },
    /// Reports that a rotation request left the grid untouched.
    RotationRejected {
        /// Cell the player clicked.
        cell: CellCoord,
        /// Specific reason the rotation was refused.
        reason: RotationRejection,
    },
    /// Indicates that the adversary clock advanced.
    TickAdvanced {
        /// Tick counter after the step completed.
        tick: Tick,
    },
    /// Confirms that an agent moved between two cells.
    AgentMoved {
        /// Identifier of the agent that moved.
        agent: AgentId,
        /// Cell the agent occupied before moving.
        from: CellCoord,
        /// Cell the agent occupies after moving.
        to: CellCoord,
    },
    /// Reports that an agent tampered with the tile beneath it.
    TileDisturbed {
        /// Identifier of the agent responsible.
        agent: AgentId,
        /// Cell whose tile changed.
        cell: CellCoord,
        /// Change applied to the tile.
        effect: DisturbanceEffect,
    },
    /// Reports that a temporary tile lock ran out.
    TileLockExpired {
        /// Cell whose lock was cleared.
        cell: CellCoord,
    },
    /// Announces the outcome of re-tracing the beam after a grid change.
    BeamRetraced {
        /// Whether the beam reached a sink.
        reached_sink: bool,
        /// Number of segments in the traced path.
        segments: usize,
        /// Whether gates were resolved as open.
        gates_open: bool,
    },
    /// Announces that the beam reached a sink.
    LevelCompleted {
        /// Accepted rotations spent on the level.
        moves: u32,
        /// Target move count authored for the level.
        par: u32,
    },
    /// Reports where a projectile landed and what it destroyed.
    ProjectileResolved {
        /// Cell the projectile struck.
        target: CellCoord,
        /// Agent removed by the impact, if any occupied the cell.
        destroyed: Option<AgentId>,
    },
    /// Reports that a projectile could not be launched.
    ProjectileRejected {
        /// Specific reason the launch was refused.
        reason: ProjectileRejection,
    },
    /// Confirms that projectiles were added to the stock.
    ProjectilesGranted {
        /// Stock after the grant was applied.
        remaining: u32,
    },
    /// Announces that the countdown expired before completion.
    LevelFailed {
        /// Accepted rotations spent on the level.
        moves: u32,
    },
}

/// Reasons a rotation request may leave the grid unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RotationRejection {
    /// The requested cell lies outside the grid.
    OutOfBounds,
    /// The tile is permanently fixed.
    Fixed,
    /// The tile is locked until a future tick.
    TemporarilyLocked,
    /// The session no longer accepts player input.
    SessionInactive,
}

/// Reasons a projectile launch may be refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileRejection {
    /// No projectiles remain in the stock.
    OutOfProjectiles,
    /// The session no longer accepts player input.
    SessionInactive,
}

/// Change an agent applies to the tile it lands on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisturbanceEffect {
    /// The tile advanced by one quarter turn.
    Rotated,
    /// The tile refuses rotation until the provided tick.
    Locked {
        /// First tick at which the tile becomes rotatable again.
        until: Tick,
    },
}

/// Cardinal directions travelled by the beam and by agents.
///
/// The quarter-turn encoding matches the launch direction stored in a
/// source tile's rotation: `0` north, `1` east, `2` south, `3` west.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Travel toward decreasing row indices.
    North,
    /// Travel toward increasing column indices.
    East,
    /// Travel toward increasing row indices.
    South,
    /// Travel toward decreasing column indices.
    West,
}

impl Direction {
    /// All directions in quarter-turn order.
    pub const ALL: [Direction; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// Decodes a quarter-turn count, wrapping values above three.
    #[must_use]
    pub const fn from_quarter_turns(turns: u8) -> Self {
        match turns % 4 {
            0 => Self::North,
            1 => Self::East,
            2 => Self::South,
            _ => Self::West,
        }
    }

    /// Quarter-turn count encoding the direction.
    #[must_use]
    pub const fn quarter_turns(self) -> u8 {
        match self {
            Self::North => 0,
            Self::East => 1,
            Self::South => 2,
            Self::West => 3,
        }
    }

    /// Reports whether the direction runs along the vertical axis.
    #[must_use]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::North | Self::South)
    }
}

/// Location of a single grid cell expressed as row and column coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    row: u32,
    column: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.row.abs_diff(other.row) + self.column.abs_diff(other.column)
    }

    /// Cell one step away in the provided direction.
    ///
    /// Returns `None` when the step would leave the non-negative quadrant;
    /// the upper bound is checked by [`Grid::neighbor`].
    #[must_use]
    pub fn offset(self, direction: Direction) -> Option<CellCoord> {
        match direction {
            Direction::North => self.row.checked_sub(1).map(|row| Self::new(row, self.column)),
            Direction::East => self
                .column
                .checked_add(1)
                .map(|column| Self::new(self.row, column)),
            Direction::South => self.row.checked_add(1).map(|row| Self::new(row, self.column)),
            Direction::West => self
                .column
                .checked_sub(1)
                .map(|column| Self::new(self.row, column)),
        }
    }
}

/// Quarter-turn orientation of a tile, always within `0..=3`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rotation(u8);

impl Rotation {
    /// Creates a rotation, wrapping the provided count into `0..=3`.
    #[must_use]
    pub const fn new(quarter_turns: u8) -> Self {
        Self(quarter_turns % 4)
    }

    /// Number of quarter turns applied.
    #[must_use]
    pub const fn quarter_turns(&self) -> u8 {
        self.0 % 4
    }

    /// Rotation after one more clockwise quarter turn.
    #[must_use]
    pub const fn advanced(self) -> Self {
        Self::new(self.quarter_turns() + 1)
    }

    /// Reports whether the rotation is even, i.e. aligned with the vertical axis.
    #[must_use]
    pub const fn is_even(&self) -> bool {
        self.quarter_turns() % 2 == 0
    }
}

/// Kinds of tiles that can populate the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    /// Blank cell that stops the beam.
    #[default]
    Empty,
    /// Two opposite openings; even rotations run vertically.
    Straight,
    /// Two adjacent openings selected by the rotation.
    Corner,
    /// Four openings; the beam passes straight through.
    Cross,
    /// Beam origin; its rotation is the launch direction.
    Source,
    /// Beam destination that completes the level.
    Sink,
    /// Solid obstacle that stops the beam.
    Block,
    /// Teleporter paired with the other portal of its group.
    Portal,
    /// Transparent trigger that opens every gate once touched.
    Switch,
    /// Straight connector that only conducts while gates are open.
    Gate,
    /// Collapses into a straight or corner connector by rotation parity.
    Superposition,
}

/// Entanglement tag linking tiles that rotate in lockstep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntanglementGroup {
    /// The tile is not entangled.
    #[default]
    None,
    /// First entanglement group.
    Alpha,
    /// Second entanglement group.
    Beta,
    /// Third entanglement group.
    Gamma,
}

impl EntanglementGroup {
    /// Reports whether the tag links the tile to others.
    #[must_use]
    pub const fn is_entangled(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Stable identifier assigned to a tile for rendering keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(u32);

impl TileId {
    /// Creates a new tile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// One cell of the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    kind: TileKind,
    rotation: Rotation,
    fixed: bool,
    temp_fixed_until: Option<Tick>,
    group: EntanglementGroup,
    id: TileId,
}

impl Tile {
    /// Creates an unfixed, unrotated, unentangled tile of the provided kind.
    #[must_use]
    pub const fn new(kind: TileKind) -> Self {
        Self {
            kind,
            rotation: Rotation::new(0),
            fixed: false,
            temp_fixed_until: None,
            group: EntanglementGroup::None,
            id: TileId::new(0),
        }
    }

    /// Returns the tile with the provided rotation.
    #[must_use]
    pub fn with_rotation(mut self, quarter_turns: u8) -> Self {
        self.rotation = Rotation::new(quarter_turns);
        self
    }

    /// Returns the tile marked as permanently fixed.
    #[must_use]
    pub fn fixed(mut self) -> Self {
        self.fixed = true;
        self
    }

    /// Returns the tile tagged with the provided entanglement group.
    #[must_use]
    pub fn in_group(mut self, group: EntanglementGroup) -> Self {
        self.group = group;
        self
    }

    /// Kind of tile.
    #[must_use]
    pub const fn kind(&self) -> TileKind {
        self.kind
    }

    /// Connector shape the beam observes.
    ///
    /// Superposition tiles collapse to a straight connector on even
    /// rotations and a corner on odd ones; every other kind is returned as is.
    #[must_use]
    pub const fn effective_kind(&self) -> TileKind {
        match self.kind {
            TileKind::Superposition if self.rotation.is_even() => TileKind::Straight,
            TileKind::Superposition => TileKind::Corner,
            kind => kind,
        }
    }

    /// Current quarter-turn orientation.
    #[must_use]
    pub const fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Whether the tile is permanently fixed.
    #[must_use]
    pub const fn is_fixed(&self) -> bool {
        self.fixed
    }

    /// Tick until which the tile is temporarily locked, if any.
    #[must_use]
    pub const fn temp_fixed_until(&self) -> Option<Tick> {
        self.temp_fixed_until
    }

    /// Entanglement tag of the tile.
    #[must_use]
    pub const fn group(&self) -> EntanglementGroup {
        self.group
    }

    /// Stable identifier used as a rendering key.
    #[must_use]
    pub const fn id(&self) -> TileId {
        self.id
    }

    /// Reports whether the tile refuses rotation at the provided tick.
    #[must_use]
    pub fn is_locked_at(&self, tick: Tick) -> bool {
        self.fixed || self.temp_fixed_until.is_some_and(|until| tick < until)
    }

    /// Advances the rotation by one quarter turn.
    pub fn advance_rotation(&mut self) {
        self.rotation = self.rotation.advanced();
    }

    /// Locks the tile against rotation until the provided tick.
    pub fn lock_until(&mut self, until: Tick) {
        self.temp_fixed_until = Some(until);
    }

    /// Clears a temporary lock that has run out by the provided tick.
    ///
    /// Returns `true` when a lock was removed.
    pub fn clear_expired_lock(&mut self, tick: Tick) -> bool {
        match self.temp_fixed_until {
            Some(until) if tick >= until => {
                self.temp_fixed_until = None;
                true
            }
            _ => false,
        }
    }
}

/// Errors reported when assembling a grid from rows of tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// No rows were supplied.
    #[error("grid contains no tiles")]
    Empty,
    /// A row length differs from the number of rows.
    #[error("row {row} has {found} tiles but the grid is {expected} wide")]
    NotSquare {
        /// Index of the offending row.
        row: usize,
        /// Side length implied by the number of rows.
        expected: usize,
        /// Number of tiles found in the row.
        found: usize,
    },
    /// The grid is too large to address with cell coordinates.
    #[error("grid side length {0} exceeds the addressable range")]
    TooLarge(usize),
}

/// Square two-dimensional array of tiles.
///
/// A grid is a value: systems clone it, edit the copy and hand the copy back
/// so previously shared snapshots never change underneath their readers.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Grid {
    size: u32,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Assembles a grid from rows of tiles, assigning row-major tile identifiers.
    pub fn from_rows(rows: Vec<Vec<Tile>>) -> Result<Self, GridError> {
        let expected = rows.len();
        if expected == 0 {
            return Err(GridError::Empty);
        }
        let size = u32::try_from(expected).map_err(|_| GridError::TooLarge(expected))?;

        let mut tiles = Vec::with_capacity(expected * expected);
        for (row, tiles_in_row) in rows.into_iter().enumerate() {
            if tiles_in_row.len() != expected {
                return Err(GridError::NotSquare {
                    row,
                    expected,
                    found: tiles_in_row.len(),
                });
            }
            tiles.extend(tiles_in_row);
        }

        for (index, tile) in tiles.iter_mut().enumerate() {
            tile.id = TileId::new(u32::try_from(index).map_err(|_| GridError::TooLarge(expected))?);
        }

        Ok(Self { size, tiles })
    }

    /// Number of rows, equal to the number of columns.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.row() < self.size && cell.column() < self.size
    }

    /// Tile stored at the provided cell.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<&Tile> {
        self.index(cell).and_then(|index| self.tiles.get(index))
    }

    /// Mutable access to the tile stored at the provided cell.
    ///
    /// Only ever called on a grid the caller owns outright.
    pub fn tile_mut(&mut self, cell: CellCoord) -> Option<&mut Tile> {
        self.index(cell).and_then(|index| self.tiles.get_mut(index))
    }

    /// Cell one step away in the provided direction, if it lies inside the grid.
    #[must_use]
    pub fn neighbor(&self, cell: CellCoord, direction: Direction) -> Option<CellCoord> {
        cell.offset(direction)
            .filter(|candidate| self.contains(*candidate))
    }

    /// Iterates over every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        let size = self.size;
        (0..size).flat_map(move |row| (0..size).map(move |column| CellCoord::new(row, column)))
    }

    /// Iterates over every tile alongside its cell in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, &Tile)> + '_ {
        self.cells().zip(self.tiles.iter())
    }

    /// Locates the first source tile in row-major order.
    #[must_use]
    pub fn source(&self) -> Option<(CellCoord, &Tile)> {
        self.iter().find(|(_, tile)| tile.kind() == TileKind::Source)
    }

    /// Cells of every tile tagged with the provided entanglement group.
    pub fn group_members(&self, group: EntanglementGroup) -> impl Iterator<Item = CellCoord> + '_ {
        self.iter()
            .filter(move |(_, tile)| group.is_entangled() && tile.group() == group)
            .map(|(cell, _)| cell)
    }

    /// Destination of the portal at the provided cell.
    ///
    /// Portals pair only when exactly two portals share a non-`None` tag;
    /// an unmatched or over-subscribed portal has no partner.
    #[must_use]
    pub fn portal_partner(&self, cell: CellCoord) -> Option<CellCoord> {
        let tile = self.tile(cell)?;
        if tile.kind() != TileKind::Portal || !tile.group().is_entangled() {
            return None;
        }

        let mut partners = self
            .iter()
            .filter(|(other, candidate)| {
                *other != cell
                    && candidate.kind() == TileKind::Portal
                    && candidate.group() == tile.group()
            })
            .map(|(other, _)| other);
        let partner = partners.next()?;
        if partners.next().is_some() {
            return None;
        }
        Some(partner)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if self.contains(cell) {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.size).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Unique identifier assigned to an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new agent identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Behavioural families of roaming adversaries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    /// Relentlessly homes in on the latest disturbance.
    Stalker,
    /// Moves on every tick.
    Sprinter,
    /// Locks tiles instead of rotating them.
    Glitcher,
    /// Wanders erratically.
    Flitter,
}

impl Archetype {
    /// All archetypes in roster order.
    pub const ALL: [Archetype; 4] = [Self::Stalker, Self::Sprinter, Self::Glitcher, Self::Flitter];

    /// Reports whether agents of this archetype move on the provided tick.
    ///
    /// Sprinters move every tick; every other archetype moves on even ticks.
    #[must_use]
    pub const fn moves_on(self, tick: Tick) -> bool {
        match self {
            Self::Sprinter => true,
            Self::Stalker | Self::Glitcher | Self::Flitter => tick % 2 == 0,
        }
    }

    /// Reports whether a successful interaction locks the tile rather than rotating it.
    #[must_use]
    pub const fn locks_tiles(self) -> bool {
        matches!(self, Self::Glitcher)
    }
}

/// One roaming hazard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Agent {
    /// Unique identifier assigned at level start.
    pub id: AgentId,
    /// Grid cell currently occupied by the agent.
    pub cell: CellCoord,
    /// Behavioural family of the agent.
    pub archetype: Archetype,
}

impl Agent {
    /// Creates a new agent.
    #[must_use]
    pub const fn new(id: AgentId, cell: CellCoord, archetype: Archetype) -> Self {
        Self {
            id,
            cell,
            archetype,
        }
    }
}

/// One step of a traced beam path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BeamSegment {
    /// Cell the segment covers.
    pub cell: CellCoord,
    /// Direction the beam was travelling when it entered the cell.
    pub entry: Direction,
    /// Direction the beam leaves the cell, or `None` when it stops here.
    pub exit: Option<Direction>,
    /// Whether the beam is live in this cell; dead ends are inactive.
    pub active: bool,
    /// Destination cell when the segment is a portal jump.
    pub teleport_to: Option<CellCoord>,
}

impl BeamSegment {
    /// Reports whether the segment represents a portal jump.
    #[must_use]
    pub const fn is_teleport(&self) -> bool {
        self.teleport_to.is_some()
    }
}

/// Result of tracing the beam through a grid.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BeamTrace {
    /// Ordered segments from the source to the final cell reached.
    pub path: Vec<BeamSegment>,
    /// Whether the beam reached a sink.
    pub reached_sink: bool,
    /// Whether any switch was touched along the path.
    pub switch_touched: bool,
    /// Whether the trace was evaluated with every gate open.
    pub gates_open: bool,
}
