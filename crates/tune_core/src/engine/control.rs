//! Knob commands
//!
//! The dispatcher hands the engine one of eight discrete commands, two step
//! sizes per direction per axis. Integer button codes and textual names are
//! only accepted at the boundary (`from_code`, `FromStr`); anything outside
//! the closed set is rejected rather than guessed at.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::config::ControlConfig;
use crate::error::{Result, TuningError};

/// Control axis driven by a knob
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlAxis {
    Tuning,
    Matching,
}

/// Size of a single knob turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepSize {
    Small,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ControlCommand {
    TuneDown,
    TuneDownLarge,
    TuneUp,
    TuneUpLarge,
    MatchDown,
    MatchDownLarge,
    MatchUp,
    MatchUpLarge,
}

impl ControlCommand {
    /// All commands in button-code order (1..=8)
    pub const ALL: [ControlCommand; 8] = [
        ControlCommand::TuneDown,
        ControlCommand::TuneDownLarge,
        ControlCommand::TuneUp,
        ControlCommand::TuneUpLarge,
        ControlCommand::MatchDown,
        ControlCommand::MatchDownLarge,
        ControlCommand::MatchUp,
        ControlCommand::MatchUpLarge,
    ];

    pub fn axis(&self) -> ControlAxis {
        match self {
            ControlCommand::TuneDown
            | ControlCommand::TuneDownLarge
            | ControlCommand::TuneUp
            | ControlCommand::TuneUpLarge => ControlAxis::Tuning,
            ControlCommand::MatchDown
            | ControlCommand::MatchDownLarge
            | ControlCommand::MatchUp
            | ControlCommand::MatchUpLarge => ControlAxis::Matching,
        }
    }

    pub fn step_size(&self) -> StepSize {
        match self {
            ControlCommand::TuneDownLarge
            | ControlCommand::TuneUpLarge
            | ControlCommand::MatchDownLarge
            | ControlCommand::MatchUpLarge => StepSize::Large,
            _ => StepSize::Small,
        }
    }

    /// +1.0 for "up" commands, -1.0 for "down"
    pub fn sign(&self) -> f64 {
        match self {
            ControlCommand::TuneUp
            | ControlCommand::TuneUpLarge
            | ControlCommand::MatchUp
            | ControlCommand::MatchUpLarge => 1.0,
            _ => -1.0,
        }
    }

    /// Signed offset this command adds to its axis
    pub fn displacement(&self, config: &ControlConfig) -> f64 {
        let magnitude = match self.step_size() {
            StepSize::Small => config.small_step,
            StepSize::Large => config.large_step,
        };
        self.sign() * magnitude
    }

    /// Button code used by the widget layer
    pub fn code(&self) -> u8 {
        match self {
            ControlCommand::TuneDown => 1,
            ControlCommand::TuneDownLarge => 2,
            ControlCommand::TuneUp => 3,
            ControlCommand::TuneUpLarge => 4,
            ControlCommand::MatchDown => 5,
            ControlCommand::MatchDownLarge => 6,
            ControlCommand::MatchUp => 7,
            ControlCommand::MatchUpLarge => 8,
        }
    }

    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            1..=8 => Ok(Self::ALL[(code - 1) as usize]),
            _ => Err(TuningError::UnknownControlCode(code)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ControlCommand::TuneDown => "tune-down",
            ControlCommand::TuneDownLarge => "tune-down-large",
            ControlCommand::TuneUp => "tune-up",
            ControlCommand::TuneUpLarge => "tune-up-large",
            ControlCommand::MatchDown => "match-down",
            ControlCommand::MatchDownLarge => "match-down-large",
            ControlCommand::MatchUp => "match-up",
            ControlCommand::MatchUpLarge => "match-up-large",
        }
    }

    /// Button glyph, e.g. `T>>`
    pub fn glyph(&self) -> &'static str {
        match self {
            ControlCommand::TuneDown => "T<",
            ControlCommand::TuneDownLarge => "T<<",
            ControlCommand::TuneUp => "T>",
            ControlCommand::TuneUpLarge => "T>>",
            ControlCommand::MatchDown => "M<",
            ControlCommand::MatchDownLarge => "M<<",
            ControlCommand::MatchUp => "M>",
            ControlCommand::MatchUpLarge => "M>>",
        }
    }
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ControlCommand {
    type Err = TuningError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|cmd| {
                cmd.name().eq_ignore_ascii_case(trimmed) || cmd.glyph().eq_ignore_ascii_case(trimmed)
            })
            .ok_or_else(|| TuningError::UnknownCommand(trimmed.to_string()))
    }
}
