use crate::chess::{Color, Role};
use std::fmt::{self, Write};
use test_strategy::Arbitrary;

/// A chess [piece][`Role`] of a certain [`Color`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Arbitrary)]
pub struct Piece(pub Color, pub Role);

impl Piece {
    /// This piece's [`Color`].
    #[inline(always)]
    pub fn color(&self) -> Color {
        self.0
    }

    /// This piece's [`Role`].
    #[inline(always)]
    pub fn role(&self) -> Role {
        self.1
    }
}

/// Prints the piece as a single letter, uppercase for white and lowercase for black.
impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self.role() {
            Role::Pawn => 'p',
            Role::Knight => 'n',
            Role::Bishop => 'b',
            Role::Rook => 'r',
            Role::Queen => 'q',
            Role::King => 'k',
        };

        match self.color() {
            Color::White => f.write_char(symbol.to_ascii_uppercase()),
            Color::Black => f.write_char(symbol),
        }
    }
}
