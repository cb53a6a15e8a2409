//! Scripted player actions accepted on the command line.

use std::str::FromStr;

use quantum_loop_core::{CellCoord, Command};

/// One scripted step, expanded into session commands before it is applied.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Action {
    /// `rotate:ROW,COLUMN`
    Rotate(CellCoord),
    /// `tick` or `tick:COUNT`
    Tick(u32),
    /// `fire:ANGLE:POWER`
    Fire {
        angle_degrees: f32,
        power_percent: f32,
    },
    /// `grant:COUNT`
    Grant(u32),
    /// `expire`
    Expire,
}

impl Action {
    /// Session commands the action stands for, in application order.
    pub(crate) fn commands(&self) -> Vec<Command> {
        match self {
            Self::Rotate(cell) => vec![Command::RotateTile { cell: *cell }],
            Self::Tick(count) => (0..*count).map(|_| Command::Tick).collect(),
            Self::Fire {
                angle_degrees,
                power_percent,
            } => vec![Command::LaunchProjectile {
                angle_degrees: *angle_degrees,
                power_percent: *power_percent,
            }],
            Self::Grant(count) => vec![Command::GrantProjectiles { count: *count }],
            Self::Expire => vec![Command::ExpireCountdown],
        }
    }
}

/// Errors reported for malformed action strings.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub(crate) enum ActionParseError {
    #[error("unknown action '{0}', expected rotate, tick, fire, grant or expire")]
    UnknownVerb(String),
    #[error("action '{0}' is missing its arguments")]
    MissingArguments(String),
    #[error("could not parse '{0}' as a number")]
    InvalidNumber(String),
    #[error("could not parse cell '{0}', expected ROW,COLUMN")]
    InvalidCell(String),
}

impl FromStr for Action {
    type Err = ActionParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let (verb, arguments) = match trimmed.split_once(':') {
            Some((verb, arguments)) => (verb, Some(arguments)),
            None => (trimmed, None),
        };
        let require =
            || arguments.ok_or_else(|| ActionParseError::MissingArguments(trimmed.to_owned()));

        match verb.to_ascii_lowercase().as_str() {
            "rotate" => parse_cell(require()?).map(Self::Rotate),
            "tick" => arguments.map_or(Ok(Self::Tick(1)), |count| {
                parse_number(count).map(Self::Tick)
            }),
            "fire" => {
                let (angle, power) = require()?
                    .split_once(':')
                    .ok_or_else(|| ActionParseError::MissingArguments(trimmed.to_owned()))?;
                Ok(Self::Fire {
                    angle_degrees: parse_number(angle)?,
                    power_percent: parse_number(power)?,
                })
            }
            "grant" => parse_number(require()?).map(Self::Grant),
            "expire" => Ok(Self::Expire),
            _ => Err(ActionParseError::UnknownVerb(verb.to_owned())),
        }
    }
}

fn parse_cell(value: &str) -> Result<CellCoord, ActionParseError> {
    let invalid = || ActionParseError::InvalidCell(value.to_owned());
    let (row, column) = value.split_once(',').ok_or_else(invalid)?;
    let row = row.trim().parse::<u32>().map_err(|_| invalid())?;
    let column = column.trim().parse::<u32>().map_err(|_| invalid())?;
    Ok(CellCoord::new(row, column))
}

fn parse_number<T: FromStr>(value: &str) -> Result<T, ActionParseError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ActionParseError::InvalidNumber(value.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::{Action, ActionParseError};
    use quantum_loop_core::{CellCoord, Command};

    #[test]
    fn parses_every_verb() {
        assert_eq!("rotate:2,3".parse(), Ok(Action::Rotate(CellCoord::new(2, 3))));
        assert_eq!("tick".parse(), Ok(Action::Tick(1)));
        assert_eq!("tick:4".parse(), Ok(Action::Tick(4)));
        assert_eq!(
            "fire:-12.5:80".parse(),
            Ok(Action::Fire {
                angle_degrees: -12.5,
                power_percent: 80.0,
            })
        );
        assert_eq!("grant:2".parse(), Ok(Action::Grant(2)));
        assert_eq!("EXPIRE".parse(), Ok(Action::Expire));
    }

    #[test]
    fn reports_malformed_actions() {
        assert_eq!(
            "jump".parse::<Action>(),
            Err(ActionParseError::UnknownVerb("jump".to_owned()))
        );
        assert_eq!(
            "rotate".parse::<Action>(),
            Err(ActionParseError::MissingArguments("rotate".to_owned()))
        );
        assert_eq!(
            "rotate:1;2".parse::<Action>(),
            Err(ActionParseError::InvalidCell("1;2".to_owned()))
        );
        assert_eq!(
            "tick:many".parse::<Action>(),
            Err(ActionParseError::InvalidNumber("many".to_owned()))
        );
    }

    #[test]
    fn repeated_ticks_expand_into_commands() {
        assert_eq!(Action::Tick(3).commands(), vec![Command::Tick; 3]);
        assert!(Action::Tick(0).commands().is_empty());
    }
}
