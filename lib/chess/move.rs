use crate::chess::{OutOfBounds, Outcome, Piece, Role, Square};
use derive_more::{DebugCustom, Deref, Display, Error, From};
use std::str::FromStr;
use test_strategy::Arbitrary;

/// A chess move in [pure coordinate notation].
///
/// [pure coordinate notation]: https://www.chessprogramming.org/Algebraic_Chess_Notation#Pure_coordinate_notation
#[derive(DebugCustom, Display, Copy, Clone, Eq, PartialEq, Hash, Arbitrary)]
#[filter(#self.0 != #self.1)]
#[debug(fmt = "Move({self})")]
#[display(fmt = "{_0}{_1}")]
pub struct Move(pub Square, pub Square);

impl Move {
    /// The source [`Square`].
    #[inline(always)]
    pub fn whence(&self) -> Square {
        self.0
    }

    /// The destination [`Square`].
    #[inline(always)]
    pub fn whither(&self) -> Square {
        self.1
    }
}

impl TryFrom<((i8, i8), (i8, i8))> for Move {
    type Error = OutOfBounds;

    fn try_from((whence, whither): ((i8, i8), (i8, i8))) -> Result<Self, Self::Error> {
        Ok(Move(whence.try_into()?, whither.try_into()?))
    }
}

/// The reason why the string is not valid move.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display(fmt = "failed to parse move")]
pub struct ParseMoveError;

impl FromStr for Move {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match (s.get(..2), s.get(2..)) {
            (Some(whence), Some(whither)) => Ok(Move(
                whence.parse().map_err(|_| ParseMoveError)?,
                whither.parse().map_err(|_| ParseMoveError)?,
            )),

            _ => Err(ParseMoveError),
        }
    }
}

/// The context of a chess move, i.e. everything it does to the board.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deref)]
pub struct MoveContext {
    #[deref]
    pub(crate) m: Move,
    pub(crate) piece: Piece,
    pub(crate) capture: Option<(Piece, Square)>,
    pub(crate) castling: Option<Move>,
    pub(crate) promotion: bool,
}

impl MoveContext {
    /// The [`Piece`] moved.
    #[inline(always)]
    pub fn piece(&self) -> Piece {
        self.piece
    }

    /// The [`Role`] of the piece moved.
    #[inline(always)]
    pub fn role(&self) -> Role {
        self.piece.role()
    }

    /// The [`Piece`] captured and the [`Square`] it was removed from.
    #[inline(always)]
    pub fn capture(&self) -> Option<(Piece, Square)> {
        self.capture
    }

    /// How the rook is relocated, if this is a castling move.
    #[inline(always)]
    pub fn castling(&self) -> Option<Move> {
        self.castling
    }

    /// The [`Square`] of the pawn that must now be promoted, if any.
    #[inline(always)]
    pub fn promotion(&self) -> Option<Square> {
        self.promotion.then_some(self.whither())
    }

    /// Whether this is a castling move.
    pub fn is_castling(&self) -> bool {
        self.castling.is_some()
    }

    /// Whether this is a capture move.
    pub fn is_capture(&self) -> bool {
        self.capture.is_some()
    }

    /// Whether this is an en passant capture move.
    pub fn is_en_passant(&self) -> bool {
        self.capture.is_some_and(|(_, s)| self.whither() != s)
    }

    /// Whether this move requires a promotion choice.
    pub fn is_promotion(&self) -> bool {
        self.promotion
    }

    /// Whether this move is neither a capture nor a promotion.
    pub fn is_quiet(&self) -> bool {
        !(self.is_capture() || self.is_promotion())
    }
}

/// The reason why a [`Move`] was rejected.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash, Error, From, Arbitrary)]
#[error(ignore)]
pub enum IllegalMove {
    #[display(fmt = "{_0}")]
    OutOfBounds(OutOfBounds),

    #[display(fmt = "move `{_0}` is illegal in this position")]
    #[from(ignore)]
    Illegal(Move),

    #[display(fmt = "move `{_0}` would leave the king in check")]
    #[from(ignore)]
    ExposesKing(Move),

    #[display(fmt = "the pawn on `{_0}` must be promoted first")]
    AwaitingPromotion(Square),

    #[display(fmt = "the game has already ended in a {_0}")]
    GameHasEnded(Outcome),
}

impl IllegalMove {
    /// Whether the move was rejected only because it would leave the king in check.
    pub fn is_exposing_king(&self) -> bool {
        matches!(self, IllegalMove::ExposesKing(_))
    }
}

/// The result of proposing a [`Move`].
pub type MoveResult = Result<MoveContext, IllegalMove>;
