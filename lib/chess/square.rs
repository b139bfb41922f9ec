use derive_more::{Display, Error};
use std::{fmt, str::FromStr};
use test_strategy::Arbitrary;

/// A square on the chess board, addressed by row and column.
///
/// Row 0 is white's home row and column 0 is the `a` file, so `(1, 3)` is `d2`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Arbitrary)]
pub struct Square {
    #[strategy(0u8..8)]
    row: u8,
    #[strategy(0u8..8)]
    col: u8,
}

impl Square {
    /// Constructs [`Square`] from a pair of row and column.
    ///
    /// # Panics
    ///
    /// Panics if either coordinate is not smaller than 8.
    #[inline(always)]
    pub const fn new(row: u8, col: u8) -> Self {
        assert!(row < 8 && col < 8, "square out of bounds");
        Square { row, col }
    }

    /// This square's row.
    #[inline(always)]
    pub const fn row(&self) -> u8 {
        self.row
    }

    /// This square's column.
    #[inline(always)]
    pub const fn col(&self) -> u8 {
        self.col
    }

    /// An iterator over all squares, row by row starting from `a1`.
    pub fn iter() -> impl DoubleEndedIterator<Item = Square> + ExactSizeIterator {
        (0..64u8).map(|i| Square::new(i / 8, i % 8))
    }

    /// The square displaced from this one by the given number of rows and columns, if any.
    #[inline(always)]
    pub fn offset(&self, rows: i8, cols: i8) -> Option<Square> {
        let row = (self.row as i8).saturating_add(rows);
        let col = (self.col as i8).saturating_add(cols);
        Square::try_from((row, col)).ok()
    }

    /// The displacement in rows and columns from this square to another.
    #[inline(always)]
    pub fn distance(&self, other: Square) -> (i8, i8) {
        (
            other.row as i8 - self.row as i8,
            other.col as i8 - self.col as i8,
        )
    }

    /// An iterator over the squares strictly between this one and another.
    ///
    /// The iterator is empty unless both squares share a row, a column, or a diagonal.
    pub fn between(&self, other: Square) -> impl Iterator<Item = Square> {
        let (rows, cols) = self.distance(other);
        let aligned = rows == 0 || cols == 0 || rows.abs() == cols.abs();
        let steps = if aligned {
            rows.abs().max(cols.abs())
        } else {
            0
        };
        let (dr, dc) = (rows.signum(), cols.signum());
        let whence = *self;

        (1..steps).map(move |i| Square {
            row: (whence.row as i8 + i * dr) as u8,
            col: (whence.col as i8 + i * dc) as u8,
        })
    }
}

/// The reason why converting coordinates into [`Square`] failed.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash, Error, Arbitrary)]
#[display(fmt = "({_0}, {_1}) is off the board")]
pub struct OutOfBounds(pub i8, pub i8);

impl TryFrom<(i8, i8)> for Square {
    type Error = OutOfBounds;

    #[inline(always)]
    fn try_from((row, col): (i8, i8)) -> Result<Self, Self::Error> {
        if (0..8).contains(&row) && (0..8).contains(&col) {
            Ok(Square::new(row as u8, col as u8))
        } else {
            Err(OutOfBounds(row, col))
        }
    }
}

impl From<Square> for (i8, i8) {
    #[inline(always)]
    fn from(sq: Square) -> Self {
        (sq.row as i8, sq.col as i8)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.col) as char, self.row + 1)
    }
}

/// The reason why parsing [`Square`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display(fmt = "failed to parse square")]
pub struct ParseSquareError;

impl FromStr for Square {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.as_bytes() {
            &[f @ b'a'..=b'h', r @ b'1'..=b'8'] => Ok(Square::new(r - b'1', f - b'a')),
            _ => Err(ParseSquareError),
        }
    }
}
