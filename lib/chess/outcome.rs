use crate::chess::Color;
use derive_more::Display;
use test_strategy::Arbitrary;

/// One of the possible outcomes of a chess game.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash, Arbitrary)]
pub enum Outcome {
    #[display(fmt = "checkmate by the {_0} player")]
    Checkmate(Color),

    #[display(fmt = "stalemate")]
    Stalemate,

    #[display(fmt = "draw by insufficient material")]
    DrawByInsufficientMaterial,
}

impl Outcome {
    /// Whether the outcome is a [draw] and neither side has won.
    ///
    /// [draw]: https://www.chessprogramming.org/Draw
    pub fn is_draw(&self) -> bool {
        !self.is_decisive()
    }

    /// Whether the outcome is a decisive and one of the sides has won.
    pub fn is_decisive(&self) -> bool {
        matches!(self, Outcome::Checkmate(_))
    }

    /// The winning side, if the outcome is [decisive](`Self::is_decisive`).
    pub fn winner(&self) -> Option<Color> {
        match *self {
            Outcome::Checkmate(c) => Some(c),
            _ => None,
        }
    }
}
