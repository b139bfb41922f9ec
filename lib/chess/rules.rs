use crate::chess::Promotion;
use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use test_strategy::Arbitrary;

/// Configurable rules of the game.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize, Serialize, Arbitrary)]
#[serde(deny_unknown_fields, rename = "rules", default)]
pub struct Rules {
    /// Whether the king is forbidden to castle out of or through check.
    ///
    /// When disabled, only the square where the king lands is required to be safe.
    pub strict_castling: bool,

    /// The piece a pawn is promoted to unless another is chosen.
    pub promotion: Promotion,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            strict_castling: true,
            promotion: Promotion::Queen,
        }
    }
}

impl fmt::Display for Rules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&ron::ser::to_string(self).map_err(|_| fmt::Error)?)
    }
}

/// The reason why parsing [`Rules`] failed.
#[derive(Debug, Display, Eq, PartialEq, Error, From)]
#[display(fmt = "failed to parse rules")]
pub struct ParseRulesError(ron::de::SpannedError);

impl FromStr for Rules {
    type Err = ParseRulesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ron::de::from_str(s)?)
    }
}
