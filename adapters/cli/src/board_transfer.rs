//! Single-line board snapshots that can be shared and loaded back as levels.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use quantum_loop_world::LevelDefinition;

const SNAPSHOT_DOMAIN: &str = "qloop";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded snapshot payload.
pub(crate) const SNAPSHOT_HEADER: &str = "qloop:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Board captured as a level definition together with its side length.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct BoardSnapshot {
    size: usize,
    level: LevelDefinition,
}

impl BoardSnapshot {
    /// Wraps a level definition, recording its side length.
    pub(crate) fn new(level: LevelDefinition) -> Self {
        Self {
            size: level.tiles.len(),
            level,
        }
    }

    /// Level definition that restarts play from the captured board.
    pub(crate) fn into_level(self) -> LevelDefinition {
        self.level
    }

    /// Encodes the snapshot into a single-line string.
    pub(crate) fn encode(&self) -> Result<String, BoardTransferError> {
        let json = serde_json::to_vec(&self.level).map_err(BoardTransferError::InvalidPayload)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!(
            "{SNAPSHOT_HEADER}{FIELD_DELIMITER}{size}x{size}{FIELD_DELIMITER}{encoded}",
            size = self.size
        ))
    }

    /// Decodes a snapshot from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, BoardTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(BoardTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(BoardTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(BoardTransferError::MissingVersion)?;
        let dimensions = parts.next().ok_or(BoardTransferError::MissingDimensions)?;
        let payload = parts.next().ok_or(BoardTransferError::MissingPayload)?;

        if domain != SNAPSHOT_DOMAIN {
            return Err(BoardTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != SNAPSHOT_VERSION {
            return Err(BoardTransferError::UnsupportedVersion(version.to_owned()));
        }

        let size = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(BoardTransferError::InvalidEncoding)?;
        let level: LevelDefinition =
            serde_json::from_slice(&bytes).map_err(BoardTransferError::InvalidPayload)?;
        if level.tiles.len() != size {
            return Err(BoardTransferError::DimensionMismatch {
                declared: size,
                found: level.tiles.len(),
            });
        }

        Ok(Self { size, level })
    }
}

/// Errors that can occur while encoding or decoding board snapshots.
#[derive(Debug, thiserror::Error)]
pub(crate) enum BoardTransferError {
    #[error("board snapshot was empty")]
    EmptyPayload,
    #[error("board snapshot is missing the prefix")]
    MissingPrefix,
    #[error("board snapshot is missing the version")]
    MissingVersion,
    #[error("board snapshot is missing the grid dimensions")]
    MissingDimensions,
    #[error("board snapshot is missing the payload")]
    MissingPayload,
    #[error("board snapshot prefix '{0}' is not supported")]
    InvalidPrefix(String),
    #[error("board snapshot version '{0}' is not supported")]
    UnsupportedVersion(String),
    #[error("could not parse grid dimensions '{0}'")]
    InvalidDimensions(String),
    #[error("snapshot declares a {declared}-wide grid but carries {found} rows")]
    DimensionMismatch { declared: usize, found: usize },
    #[error("could not decode board payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    #[error("could not process board payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
}

fn parse_dimensions(dimensions: &str) -> Result<usize, BoardTransferError> {
    let invalid = || BoardTransferError::InvalidDimensions(dimensions.to_owned());
    let (columns, rows) = dimensions.split_once(['x', 'X']).ok_or_else(invalid)?;

    let columns = columns.trim().parse::<usize>().map_err(|_| invalid())?;
    let rows = rows.trim().parse::<usize>().map_err(|_| invalid())?;

    if columns == 0 || columns != rows {
        return Err(invalid());
    }

    Ok(columns)
}
