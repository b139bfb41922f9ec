use crate::chess::{Board, Color, Figure, Piece, Position, Role, Rules, Square};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use test_strategy::Arbitrary;

/// A pair of raw row and column coordinates, as persisted.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize, Serialize, Arbitrary)]
#[serde(rename_all = "PascalCase")]
pub struct Coordinates {
    pub row: i32,
    pub column: i32,
}

impl From<Square> for Coordinates {
    fn from(sq: Square) -> Self {
        Coordinates {
            row: sq.row().into(),
            column: sq.col().into(),
        }
    }
}

impl TryFrom<Coordinates> for Square {
    type Error = InvalidSnapshot;

    fn try_from(c: Coordinates) -> Result<Self, Self::Error> {
        let off = InvalidSnapshot::OutOfBounds(c.row, c.column);
        let row = i8::try_from(c.row).map_err(|_| off)?;
        let col = i8::try_from(c.column).map_err(|_| off)?;
        Square::try_from((row, col)).map_err(|_| off)
    }
}

/// A piece and where it stands, as persisted.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Placement {
    #[serde(flatten)]
    pub square: Coordinates,
    #[serde(rename = "Type")]
    pub role: Role,
    pub color: Color,
    #[serde(default)]
    pub has_moved: bool,
}

/// The persisted shape of a [`Position`].
///
/// Only the side to move and the pieces are required, so that older
/// saves without castling, en passant or promotion state still load.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Snapshot {
    pub turn: Color,
    pub pieces: Vec<Placement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub en_passant: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<Coordinates>,
}

/// The reason why a [`Snapshot`] does not describe a valid [`Position`].
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash, Error)]
#[error(ignore)]
pub enum InvalidSnapshot {
    #[display(fmt = "({_0}, {_1}) is off the board")]
    OutOfBounds(i32, i32),

    #[display(fmt = "more than one piece on `{_0}`")]
    Occupied(Square),

    #[display(fmt = "`{_0}` is not a valid en passant square")]
    EnPassant(Square),

    #[display(fmt = "there is no pawn to promote on `{_0}`")]
    Promotion(Square),
}

impl From<&Position> for Snapshot {
    fn from(pos: &Position) -> Self {
        Snapshot {
            turn: pos.turn(),
            pieces: pos
                .board()
                .iter()
                .map(|(f, sq)| Placement {
                    square: sq.into(),
                    role: f.role(),
                    color: f.color(),
                    has_moved: f.has_moved(),
                })
                .collect(),
            en_passant: pos.en_passant().map(Coordinates::from),
            promotion: pos.promotion().map(Coordinates::from),
        }
    }
}

impl Snapshot {
    /// Rebuilds the [`Position`] under the given [`Rules`].
    pub fn restore(&self, rules: Rules) -> Result<Position, InvalidSnapshot> {
        let mut board = Board::empty();

        for p in &self.pieces {
            let sq = Square::try_from(p.square)?;
            if board[sq].is_some() {
                return Err(InvalidSnapshot::Occupied(sq));
            }

            board[sq] = Some(Figure::with_moved(Piece(p.color, p.role), p.has_moved));
        }

        let en_passant = match self.en_passant {
            None => None,
            Some(c) => {
                let sq = Square::try_from(c)?;
                let mover = !self.turn;
                let pushed = sq.offset(mover.forward(), 0);
                let valid = sq.row() as i8 == mover.pawn_row() as i8 + mover.forward()
                    && board[sq].is_none()
                    && pushed.and_then(|s| board[s]).map(|f| f.piece())
                        == Some(Piece(mover, Role::Pawn));

                if !valid {
                    return Err(InvalidSnapshot::EnPassant(sq));
                }

                Some(sq)
            }
        };

        let promotion = match self.promotion {
            None => None,
            Some(c) => {
                let sq = Square::try_from(c)?;
                let pawn = Some(Piece(self.turn, Role::Pawn));
                if sq.row() != self.turn.promotion_row() || board[sq].map(|f| f.piece()) != pawn {
                    return Err(InvalidSnapshot::Promotion(sq));
                }

                Some(sq)
            }
        };

        Ok(Position::new(board, self.turn, rules)
            .with_en_passant(en_passant)
            .with_promotion(promotion))
    }
}

impl TryFrom<Snapshot> for Position {
    type Error = InvalidSnapshot;

    fn try_from(s: Snapshot) -> Result<Self, Self::Error> {
        s.restore(Rules::default())
    }
}
