//! Authored level data and its validation.

use std::time::Duration;

use quantum_loop_core::{Archetype, EntanglementGroup, Grid, GridError, Tile, TileKind};
use serde::{Deserialize, Serialize};

/// Smallest accepted grid side length.
pub const MIN_GRID_SIZE: usize = 2;
/// Largest accepted grid side length.
pub const MAX_GRID_SIZE: usize = 16;

const MIN_TIME_LIMIT_SECS: u32 = 15;
const BASE_TIME_LIMIT_SECS: u32 = 90;
const TIME_LIMIT_DECAY_SECS: u32 = 2;
const FIRST_ADVERSARY_LEVEL: u32 = 5;
const MAX_DEFAULT_ADVERSARIES: u32 = 4;

/// Serializable description of one puzzle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDefinition {
    /// Level number, starting at one.
    pub number: u32,
    /// Short flavour text shown alongside the level.
    #[serde(default)]
    pub description: String,
    /// Target number of rotations.
    pub par: u32,
    /// Countdown override; derived from the level number when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit_secs: Option<u32>,
    /// Rows of tiles forming a square grid.
    pub tiles: Vec<Vec<TileSpec>>,
    /// Adversary roster; derived from the level number when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adversaries: Option<Vec<AdversaryQuota>>,
}

/// Authored state of a single tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSpec {
    /// Kind of tile.
    pub kind: TileKind,
    /// Quarter turns, expected within `0..=3`.
    #[serde(default)]
    pub rotation: u8,
    /// Whether the tile may never be rotated.
    #[serde(default)]
    pub fixed: bool,
    /// Entanglement tag.
    #[serde(default)]
    pub group: EntanglementGroup,
}

impl TileSpec {
    /// Creates an unfixed, unrotated, unentangled tile specification.
    #[must_use]
    pub const fn new(kind: TileKind) -> Self {
        Self {
            kind,
            rotation: 0,
            fixed: false,
            group: EntanglementGroup::None,
        }
    }

    /// Interprets a single layout glyph.
    ///
    /// | glyph | tile |
    /// |-------|------|
    /// | `.` | empty |
    /// | `S` `V` | fixed source launching east or south |
    /// | `E` | fixed sink |
    /// | `-` `\|` | straight, vertical or horizontal |
    /// | `L` `J` `7` `F` | corner with rotation 0 to 3 |
    /// | `+` `X` | fixed or rotatable cross |
    /// | `#` | fixed block |
    /// | `A` `B` | alpha or beta corner |
    /// | `C` `D` | alpha or beta straight |
    /// | `@` `&` | fixed alpha or beta portal |
    /// | `*` | fixed switch |
    /// | `G` | gate |
    /// | `Q` | superposition |
    #[must_use]
    pub fn from_glyph(glyph: char) -> Option<Self> {
        use EntanglementGroup::{Alpha, Beta};
        use TileKind::{
            Block, Corner, Cross, Empty, Gate, Portal, Sink, Source, Straight, Superposition,
            Switch,
        };

        let spec = match glyph {
            '.' => Self::new(Empty),
            'S' => Self::new(Source).rotated(1).pinned(),
            'V' => Self::new(Source).rotated(2).pinned(),
            'E' => Self::new(Sink).pinned(),
            '-' => Self::new(Straight),
            '|' => Self::new(Straight).rotated(1),
            'L' => Self::new(Corner),
            'J' => Self::new(Corner).rotated(1),
            '7' => Self::new(Corner).rotated(2),
            'F' => Self::new(Corner).rotated(3),
            '+' => Self::new(Cross).pinned(),
            'X' => Self::new(Cross),
            '#' => Self::new(Block).pinned(),
            'A' => Self::new(Corner).grouped(Alpha),
            'B' => Self::new(Corner).grouped(Beta),
            'C' => Self::new(Straight).grouped(Alpha),
            'D' => Self::new(Straight).grouped(Beta),
            '@' => Self::new(Portal).pinned().grouped(Alpha),
            '&' => Self::new(Portal).pinned().grouped(Beta),
            '*' => Self::new(Switch).pinned(),
            'G' => Self::new(Gate),
            'Q' => Self::new(Superposition),
            _ => return None,
        };
        Some(spec)
    }

    const fn rotated(mut self, rotation: u8) -> Self {
        self.rotation = rotation;
        self
    }

    const fn pinned(mut self) -> Self {
        self.fixed = true;
        self
    }

    const fn grouped(mut self, group: EntanglementGroup) -> Self {
        self.group = group;
        self
    }

    fn to_tile(self) -> Tile {
        let tile = Tile::new(self.kind)
            .with_rotation(self.rotation)
            .in_group(self.group);
        if self.fixed {
            tile.fixed()
        } else {
            tile
        }
    }
}

impl From<&Tile> for TileSpec {
    fn from(tile: &Tile) -> Self {
        Self {
            kind: tile.kind(),
            rotation: tile.rotation().quarter_turns(),
            fixed: tile.is_fixed(),
            group: tile.group(),
        }
    }
}

/// Number of agents of one archetype spawned at level start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdversaryQuota {
    /// Behavioural family of the agents.
    pub archetype: Archetype,
    /// Number of agents to spawn.
    pub count: u32,
}

/// Errors reported while validating a level definition.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LevelError {
    /// The tile rows do not form a square grid.
    #[error(transparent)]
    Shape(#[from] GridError),
    /// The grid side length lies outside the accepted range.
    #[error("grid side length {0} is outside 2..=16")]
    SizeOutOfRange(usize),
    /// No source tile was authored.
    #[error("level has no source tile")]
    MissingSource,
    /// More than one source tile was authored.
    #[error("level has {0} source tiles but exactly one is required")]
    MultipleSources(usize),
    /// No sink tile was authored.
    #[error("level has no sink tile")]
    MissingSink,
    /// A tile rotation lies outside `0..=3`.
    #[error("tile at row {row}, column {column} has rotation {rotation}")]
    InvalidRotation {
        /// Row of the offending tile.
        row: usize,
        /// Column of the offending tile.
        column: usize,
        /// Authored rotation.
        rotation: u8,
    },
    /// A layout string contains an unknown glyph.
    #[error("unknown glyph {glyph:?} at row {row}, column {column}")]
    UnknownGlyph {
        /// Row of the offending glyph.
        row: usize,
        /// Column of the offending glyph.
        column: usize,
        /// The glyph itself.
        glyph: char,
    },
}

impl LevelDefinition {
    /// Builds a level from compact glyph rows, see [`TileSpec::from_glyph`].
    ///
    /// Short or missing rows are padded with empty tiles up to `size`.
    pub fn from_layout(
        number: u32,
        size: usize,
        layout: &[&str],
        par: u32,
        description: &str,
    ) -> Result<Self, LevelError> {
        let mut tiles = Vec::with_capacity(size);
        for row in 0..size {
            let glyphs: Vec<char> = layout.get(row).map_or_else(Vec::new, |line| line.chars().collect());
            let mut specs = Vec::with_capacity(size);
            for column in 0..size {
                let glyph = glyphs.get(column).copied().unwrap_or('.');
                let spec = TileSpec::from_glyph(glyph).ok_or(LevelError::UnknownGlyph {
                    row,
                    column,
                    glyph,
                })?;
                specs.push(spec);
            }
            tiles.push(specs);
        }

        Ok(Self {
            number,
            description: description.to_owned(),
            par,
            time_limit_secs: None,
            tiles,
            adversaries: None,
        })
    }

    /// Validates the authored tiles and assembles the grid.
    pub fn build_grid(&self) -> Result<Grid, LevelError> {
        let mut rows = Vec::with_capacity(self.tiles.len());
        let mut sources = 0;
        let mut sinks = 0;
        for (row, specs) in self.tiles.iter().enumerate() {
            let mut tiles = Vec::with_capacity(specs.len());
            for (column, spec) in specs.iter().enumerate() {
                if spec.rotation > 3 {
                    return Err(LevelError::InvalidRotation {
                        row,
                        column,
                        rotation: spec.rotation,
                    });
                }
                match spec.kind {
                    TileKind::Source => sources += 1,
                    TileKind::Sink => sinks += 1,
                    _ => {}
                }
                tiles.push(spec.to_tile());
            }
            rows.push(tiles);
        }

        let grid = Grid::from_rows(rows)?;
        let size = self.tiles.len();
        if !(MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&size) {
            return Err(LevelError::SizeOutOfRange(size));
        }
        match sources {
            0 => return Err(LevelError::MissingSource),
            1 => {}
            count => return Err(LevelError::MultipleSources(count)),
        }
        if sinks == 0 {
            return Err(LevelError::MissingSink);
        }

        Ok(grid)
    }

    /// Countdown granted to the player.
    #[must_use]
    pub fn time_limit(&self) -> Duration {
        let secs = self.time_limit_secs.unwrap_or_else(|| {
            BASE_TIME_LIMIT_SECS
                .saturating_sub(self.number.saturating_mul(TIME_LIMIT_DECAY_SECS))
                .max(MIN_TIME_LIMIT_SECS)
        });
        Duration::from_secs(u64::from(secs))
    }

    /// Archetypes to spawn, one entry per agent, in spawn order.
    #[must_use]
    pub fn roster(&self) -> Vec<Archetype> {
        match &self.adversaries {
            Some(quotas) => quotas
                .iter()
                .flat_map(|quota| {
                    std::iter::repeat(quota.archetype)
                        .take(usize::try_from(quota.count).unwrap_or(usize::MAX))
                })
                .collect(),
            None => Self::default_roster(self.number),
        }
    }

    /// Roster used by levels that do not author their own.
    ///
    /// Early levels are adversary free; later ones field up to four agents
    /// cycling through the archetypes.
    #[must_use]
    pub fn default_roster(number: u32) -> Vec<Archetype> {
        if number < FIRST_ADVERSARY_LEVEL {
            return Vec::new();
        }
        let count = (number / 4).min(MAX_DEFAULT_ADVERSARIES);
        Archetype::ALL
            .into_iter()
            .cycle()
            .take(usize::try_from(count).unwrap_or(0))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{AdversaryQuota, LevelDefinition, LevelError, TileSpec};
    use quantum_loop_core::{Archetype, EntanglementGroup, GridError, TileKind};
    use std::time::Duration;

    fn level(layout: &[&str]) -> LevelDefinition {
        LevelDefinition::from_layout(1, layout.len(), layout, 4, "test").expect("valid glyphs")
    }

    #[test]
    fn json_fields_fall_back_to_defaults() {
        let json = r#"{
            "number": 3,
            "par": 5,
            "tiles": [
                [{"kind": "source", "rotation": 1, "fixed": true}, {"kind": "sink"}],
                [{"kind": "corner", "group": "alpha"}, {"kind": "empty"}]
            ]
        }"#;

        let level: LevelDefinition = serde_json::from_str(json).expect("level parses");

        assert_eq!(level.description, "");
        assert_eq!(level.time_limit_secs, None);
        assert_eq!(level.adversaries, None);
        assert_eq!(
            level.tiles[1][0],
            TileSpec {
                kind: TileKind::Corner,
                rotation: 0,
                fixed: false,
                group: EntanglementGroup::Alpha,
            }
        );
        assert!(level.build_grid().is_ok());
    }

    #[test]
    fn validation_rejects_malformed_levels() {
        assert_eq!(level(&["..", ".E"]).build_grid(), Err(LevelError::MissingSource));
        assert_eq!(level(&["SS", ".E"]).build_grid(), Err(LevelError::MultipleSources(2)));
        assert_eq!(level(&["S.", ".."]).build_grid(), Err(LevelError::MissingSink));
        assert_eq!(level(&["S"]).build_grid(), Err(LevelError::SizeOutOfRange(1)));

        let mut rotated = level(&["S.", ".E"]);
        rotated.tiles[0][1].rotation = 4;
        assert_eq!(
            rotated.build_grid(),
            Err(LevelError::InvalidRotation {
                row: 0,
                column: 1,
                rotation: 4
            })
        );

        let mut ragged = level(&["S.", ".E"]);
        let _ = ragged.tiles[1].pop();
        assert!(matches!(
            ragged.build_grid(),
            Err(LevelError::Shape(GridError::NotSquare { row: 1, .. }))
        ));
    }

    #[test]
    fn unknown_glyph_is_reported() {
        assert_eq!(
            LevelDefinition::from_layout(1, 2, &["S?", ".E"], 1, ""),
            Err(LevelError::UnknownGlyph {
                row: 0,
                column: 1,
                glyph: '?'
            })
        );
    }

    #[test]
    fn short_rows_are_padded() {
        let level = LevelDefinition::from_layout(1, 3, &["S", "..E"], 1, "").expect("valid glyphs");

        assert_eq!(level.tiles.len(), 3);
        assert!(level.tiles.iter().all(|row| row.len() == 3));
        assert_eq!(level.tiles[2][2], TileSpec::new(TileKind::Empty));
    }

    #[test]
    fn time_limit_shrinks_with_level_number() {
        let mut level = level(&["S.", ".E"]);
        assert_eq!(level.time_limit(), Duration::from_secs(88));

        level.number = 40;
        assert_eq!(level.time_limit(), Duration::from_secs(15));

        level.time_limit_secs = Some(30);
        assert_eq!(level.time_limit(), Duration::from_secs(30));
    }

    #[test]
    fn default_roster_grows_with_level_number() {
        assert!(LevelDefinition::default_roster(4).is_empty());
        assert_eq!(LevelDefinition::default_roster(5), vec![Archetype::Stalker]);
        assert_eq!(
            LevelDefinition::default_roster(9),
            vec![Archetype::Stalker, Archetype::Sprinter]
        );
        assert_eq!(LevelDefinition::default_roster(30), Archetype::ALL.to_vec());
    }

    #[test]
    fn authored_roster_expands_quotas() {
        let mut level = level(&["S.", ".E"]);
        level.adversaries = Some(vec![
            AdversaryQuota {
                archetype: Archetype::Glitcher,
                count: 2,
            },
            AdversaryQuota {
                archetype: Archetype::Flitter,
                count: 1,
            },
        ]);

        assert_eq!(
            level.roster(),
            vec![Archetype::Glitcher, Archetype::Glitcher, Archetype::Flitter]
        );
    }
}
