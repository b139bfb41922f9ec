use crate::chess::{Board, Color, Square};

impl Board {
    /// Whether the king of the given [`Color`] is attacked by any enemy piece.
    ///
    /// A board without that king is treated as a king already captured, i.e. in check.
    pub fn is_king_in_check(&self, side: Color) -> bool {
        let Some(king) = self.king(side) else {
            return true;
        };

        self.iter()
            .filter(|(f, _)| f.color() != side)
            .any(|(f, sq)| f.is_valid_move(sq, king, self))
    }

    /// Whether any piece of the given [`Color`] threatens the [`Square`].
    pub fn is_attacked(&self, target: Square, by: Color) -> bool {
        self.iter()
            .filter(|(f, _)| f.color() == by)
            .any(|(f, sq)| f.attacks(sq, target, self))
    }
}

/// Whether the king of the given [`Color`] would be in check on a hypothetical board.
///
/// Used to validate a move before committing it, on a copy of the board where
/// the move has already been played.
#[inline(always)]
pub fn would_king_be_in_check(hypothetical: &Board, side: Color) -> bool {
    hypothetical.is_king_in_check(side)
}
