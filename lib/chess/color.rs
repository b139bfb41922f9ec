use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::ops::Not;
use test_strategy::Arbitrary;

/// The color of a chess [`Piece`][`crate::chess::Piece`].
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash, Deserialize, Serialize, Arbitrary)]
#[repr(u8)]
pub enum Color {
    #[display(fmt = "white")]
    White,
    #[display(fmt = "black")]
    Black,
}

impl Color {
    /// Both colors, white first.
    pub const ALL: [Color; 2] = [Color::White, Color::Black];

    /// The row increment of a pawn of this color moving forward.
    #[inline(always)]
    pub const fn forward(&self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// The row where this color's pieces start.
    #[inline(always)]
    pub const fn home_row(&self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    /// The row where this color's pawns start.
    #[inline(always)]
    pub const fn pawn_row(&self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }

    /// The row where this color's pawns promote.
    #[inline(always)]
    pub const fn promotion_row(&self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }
}

impl Not for Color {
    type Output = Self;

    #[inline(always)]
    fn not(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}
