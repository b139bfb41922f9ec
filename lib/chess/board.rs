use crate::chess::{Color, Figure, Piece, Role, Square};
use arrayvec::ArrayVec;
use std::fmt;
use std::ops::{Index, IndexMut};

/// The chess board.
///
/// An 8x8 grid of optional [`Figure`]s. The board is a plain value, so
/// copies are independent and speculative moves never touch the original.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Board {
    cells: [[Option<Figure>; 8]; 8],
}

// We provide a custom implementation of Arbitrary rather than deriving,
// so that generated boards are sparse like real positions.
impl proptest::arbitrary::Arbitrary for Board {
    type Parameters = ();
    type Strategy = proptest::strategy::BoxedStrategy<Board>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        use proptest::{collection::vec, option::weighted, prelude::*};

        vec(weighted(0.25, any::<Figure>()), 64)
            .prop_map(|v| {
                let mut board = Board::empty();

                board
                    .cells
                    .iter_mut()
                    .flatten()
                    .zip(v)
                    .for_each(|(cell, f)| *cell = f);

                board
            })
            .boxed()
    }
}

/// The standard starting arrangement.
impl Default for Board {
    fn default() -> Self {
        let mut board = Board::empty();
        board.setup_default_position();
        board
    }
}

impl Board {
    /// The number of rows and columns.
    pub const SIZE: i8 = 8;

    /// The order of the pieces on the home rows, from column 0 to column 7.
    const HOME: [Role; 8] = [
        Role::Rook,
        Role::Knight,
        Role::Bishop,
        Role::King,
        Role::Queen,
        Role::Bishop,
        Role::Knight,
        Role::Rook,
    ];

    /// A board with no pieces.
    pub const fn empty() -> Self {
        Board {
            cells: [[None; 8]; 8],
        }
    }

    /// Resets this board to the standard starting arrangement.
    pub fn setup_default_position(&mut self) {
        *self = Board::empty();

        for c in Color::ALL {
            for (col, role) in Self::HOME.into_iter().enumerate() {
                let home = Square::new(c.home_row(), col as u8);
                let pawn = Square::new(c.pawn_row(), col as u8);
                self[home] = Some(Figure::new(Piece(c, role)));
                self[pawn] = Some(Figure::new(Piece(c, Role::Pawn)));
            }
        }
    }

    /// Whether the coordinates are inside the board.
    #[inline(always)]
    pub fn is_inside(row: i8, col: i8) -> bool {
        (0..Self::SIZE).contains(&row) && (0..Self::SIZE).contains(&col)
    }

    /// The [`Figure`] at the given coordinates, if any.
    ///
    /// Coordinates outside of the board are always empty.
    #[inline(always)]
    pub fn get(&self, row: i8, col: i8) -> Option<Figure> {
        Square::try_from((row, col)).ok().and_then(|sq| self[sq])
    }

    /// An iterator over all figures on the board and the squares they occupy.
    pub fn iter(&self) -> impl Iterator<Item = (Figure, Square)> + '_ {
        Square::iter().filter_map(|sq| self[sq].map(|f| (f, sq)))
    }

    /// The number of figures on the board.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Whether the board has no figures.
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// [`Square`] occupied by the king of a [`Color`], if any.
    pub fn king(&self, side: Color) -> Option<Square> {
        self.iter()
            .find(|(f, _)| f.piece() == Piece(side, Role::King))
            .map(|(_, sq)| sq)
    }

    /// Whether every square strictly between two squares is empty.
    #[inline(always)]
    pub fn is_path_clear(&self, whence: Square, whither: Square) -> bool {
        whence.between(whither).all(|sq| self[sq].is_none())
    }

    /// Moves whatever stands on `whence` to `whither`, replacing anything there.
    ///
    /// Returns the figure that was replaced, if any.
    #[inline(always)]
    pub fn relocate(&mut self, whence: Square, whither: Square) -> Option<Figure> {
        let figure = self[whence].take();
        std::mem::replace(&mut self[whither], figure)
    }

    /// Whether no side could possibly deliver checkmate.
    ///
    /// Only the following configurations are recognized:
    /// * two pieces, i.e. the kings alone;
    /// * three pieces, one of them a bishop or knight;
    /// * four pieces, two of them bishops of opposite sides.
    pub fn is_material_insufficient(&self) -> bool {
        let pieces: ArrayVec<Piece, 64> = self.iter().map(|(f, _)| f.piece()).collect();

        match pieces.len() {
            2 => true,
            3 => pieces.iter().any(|p| p.role().is_minor()),
            4 => {
                let bishops: ArrayVec<_, 4> =
                    pieces.iter().filter(|p| p.role() == Role::Bishop).collect();
                matches!(&bishops[..], [a, b] if a.color() != b.color())
            }
            _ => false,
        }
    }
}

/// Retrieves the [`Figure`] at a given [`Square`], if any.
impl Index<Square> for Board {
    type Output = Option<Figure>;

    #[inline(always)]
    fn index(&self, sq: Square) -> &Self::Output {
        &self.cells[sq.row() as usize][sq.col() as usize]
    }
}

impl IndexMut<Square> for Board {
    #[inline(always)]
    fn index_mut(&mut self, sq: Square) -> &mut Self::Output {
        &mut self.cells[sq.row() as usize][sq.col() as usize]
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const FILES: &str = "    a   b   c   d   e   f   g   h";
        const RULE: &str = "  +---+---+---+---+---+---+---+---+";

        writeln!(f, "{FILES}")?;
        writeln!(f, "{RULE}")?;

        for row in (0..8).rev() {
            write!(f, "{} |", row + 1)?;

            for col in 0..8 {
                match self[Square::new(row, col)] {
                    Some(figure) => write!(f, " {figure} |")?,
                    None => write!(f, "   |")?,
                }
            }

            writeln!(f, " {}", row + 1)?;
            writeln!(f, "{RULE}")?;
        }

        write!(f, "{FILES}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    #[test]
    fn default_board_has_thirty_two_pieces() {
        assert_eq!(Board::default().len(), 32);
    }

    #[test]
    fn default_board_places_king_before_queen() {
        let b = Board::default();

        for c in Color::ALL {
            let row = c.home_row();
            assert_eq!(
                b[Square::new(row, 3)].map(|f| f.piece()),
                Some(Piece(c, Role::King))
            );
            assert_eq!(
                b[Square::new(row, 4)].map(|f| f.piece()),
                Some(Piece(c, Role::Queen))
            );
        }
    }

    #[test]
    fn default_board_is_symmetric_between_colors() {
        let b = Board::default();

        for (f, sq) in b.iter() {
            let mirror = Square::new(7 - sq.row(), sq.col());
            assert_eq!(b[mirror].map(|f| f.role()), Some(f.role()));
            assert_eq!(b[mirror].map(|f| f.color()), Some(!f.color()));
        }
    }

    #[proptest]
    fn setting_up_the_default_position_resets_the_board(mut b: Board) {
        b.setup_default_position();
        assert_eq!(b, Board::default());
    }

    #[proptest]
    fn setting_up_the_default_position_is_idempotent(mut b: Board) {
        b.setup_default_position();
        let once = b;
        b.setup_default_position();
        assert_eq!(b, once);
    }

    #[proptest]
    fn copies_are_independent(b: Board, sq: Square, #[filter(#f != #b[#sq])] f: Option<Figure>) {
        let mut copy = b;
        copy[sq] = f;
        assert_eq!(copy[sq], f);
        assert_ne!(b[sq], f);
    }

    #[proptest]
    fn copies_preserve_moved_flags(mut b: Board, c: Color, sq: Square) {
        b[sq] = Some(Figure::with_moved(Piece(c, Role::Rook), true));
        let copy = b.clone();
        assert_eq!(copy[sq].map(|f| f.has_moved()), Some(true));
    }

    #[proptest]
    fn is_inside_accepts_coordinates_between_zero_and_seven(r: i8, c: i8) {
        assert_eq!(
            Board::is_inside(r, c),
            (0..8).contains(&r) && (0..8).contains(&c)
        );
    }

    #[proptest]
    fn get_returns_nothing_outside_the_board(
        b: Board,
        r: i8,
        #[filter(!Board::is_inside(#r, #c))] c: i8,
    ) {
        assert_eq!(b.get(r, c), None);
    }

    #[proptest]
    fn get_agrees_with_indexing(b: Board, sq: Square) {
        assert_eq!(b.get(sq.row() as i8, sq.col() as i8), b[sq]);
    }

    #[proptest]
    fn iter_returns_figures_and_squares(b: Board) {
        for (f, sq) in b.iter() {
            assert_eq!(b[sq], Some(f));
        }
    }

    #[proptest]
    fn king_returns_square_occupied_by_a_king(b: Board, c: Color) {
        if let Some(sq) = b.king(c) {
            assert_eq!(b[sq].map(|f| f.piece()), Some(Piece(c, Role::King)));
        } else {
            assert!(b.iter().all(|(f, _)| f.piece() != Piece(c, Role::King)));
        }
    }

    #[proptest]
    fn relocate_moves_figure_and_returns_replaced(
        mut b: Board,
        whence: Square,
        #[filter(#whence != #whither)] whither: Square,
    ) {
        let (moving, replaced) = (b[whence], b[whither]);
        assert_eq!(b.relocate(whence, whither), replaced);
        assert_eq!(b[whence], None);
        assert_eq!(b[whither], moving);
    }

    #[test]
    fn bare_kings_are_insufficient_material() {
        let mut b = Board::empty();
        b[Square::new(0, 0)] = Some(Piece(Color::White, Role::King).into());
        b[Square::new(7, 7)] = Some(Piece(Color::Black, Role::King).into());
        assert!(b.is_material_insufficient());

        b[Square::new(3, 3)] = Some(Piece(Color::White, Role::Queen).into());
        assert!(!b.is_material_insufficient());
    }

    #[proptest]
    fn king_and_minor_piece_against_king_is_insufficient_material(
        c: Color,
        #[strategy(proptest::sample::select(vec![Role::Bishop, Role::Knight]))] r: Role,
    ) {
        let mut b = Board::empty();
        b[Square::new(0, 0)] = Some(Piece(Color::White, Role::King).into());
        b[Square::new(7, 7)] = Some(Piece(Color::Black, Role::King).into());
        b[Square::new(4, 4)] = Some(Piece(c, r).into());
        assert!(b.is_material_insufficient());
    }

    #[proptest]
    fn king_and_major_piece_or_pawn_against_king_is_sufficient_material(
        c: Color,
        #[strategy(proptest::sample::select(vec![Role::Pawn, Role::Rook, Role::Queen]))] r: Role,
    ) {
        let mut b = Board::empty();
        b[Square::new(0, 0)] = Some(Piece(Color::White, Role::King).into());
        b[Square::new(7, 7)] = Some(Piece(Color::Black, Role::King).into());
        b[Square::new(4, 4)] = Some(Piece(c, r).into());
        assert!(!b.is_material_insufficient());
    }

    #[test]
    fn bishops_of_opposite_sides_are_insufficient_material() {
        let mut b = Board::empty();
        b[Square::new(0, 0)] = Some(Piece(Color::White, Role::King).into());
        b[Square::new(7, 7)] = Some(Piece(Color::Black, Role::King).into());
        b[Square::new(2, 2)] = Some(Piece(Color::White, Role::Bishop).into());
        b[Square::new(5, 2)] = Some(Piece(Color::Black, Role::Bishop).into());
        assert!(b.is_material_insufficient());

        b[Square::new(5, 2)] = Some(Piece(Color::White, Role::Bishop).into());
        assert!(!b.is_material_insufficient());
    }

    #[test]
    fn default_board_is_sufficient_material() {
        assert!(!Board::default().is_material_insufficient());
    }

    #[test]
    fn board_is_printed_with_white_at_the_bottom() {
        let printed = Board::default().to_string();
        let lines: Vec<_> = printed.lines().collect();
        assert_eq!(lines[2], "8 | r | n | b | k | q | b | n | r | 8");
        assert_eq!(lines[16], "1 | R | N | B | K | Q | B | N | R | 1");
    }
}
