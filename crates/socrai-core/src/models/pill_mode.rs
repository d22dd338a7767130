// ABOUTME: Pill mode difficulty tiers controlling mentoring style
// ABOUTME: Closed enum green/blue/red with strict parsing and a permissive fallback
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 SocrAI Contributors

use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Guidance tier selected by the learner
///
/// Wire values are `green`, `blue` and `red`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PillMode {
    /// Beginner: most structure, one guiding question at a time
    #[default]
    Green,
    /// Intermediate: methodology hints, no specifics
    Blue,
    /// Advanced: minimal nudges, peer-level challenge
    Red,
}

impl PillMode {
    /// Every mode, in ascending difficulty
    pub const ALL: [Self; 3] = [Self::Green, Self::Blue, Self::Red];

    /// Wire and storage value
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Red => "red",
        }
    }

    /// Parse with silent fallback to [`PillMode::Green`]
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl fmt::Display for PillMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PillMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "green" => Ok(Self::Green),
            "blue" => Ok(Self::Blue),
            "red" => Ok(Self::Red),
            other => Err(AppError::invalid_field(
                "pill_mode",
                format!("\"{other}\" is not a valid choice."),
            )),
        }
    }
}
