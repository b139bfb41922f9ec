use crate::chess::{Board, Color, Piece, Role, Square};
use std::fmt;
use test_strategy::Arbitrary;

/// A [`Piece`] as it stands on the [`Board`].
///
/// Rooks and kings remember whether they have ever moved, which decides
/// whether they may still castle. The flag is never set for other roles.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Arbitrary)]
pub struct Figure {
    piece: Piece,
    #[strategy(proptest::sample::select(
        if matches!(#piece.role(), Role::Rook | Role::King) {
            vec![false, true]
        } else {
            vec![false]
        }
    ))]
    moved: bool,
}

impl From<Piece> for Figure {
    #[inline(always)]
    fn from(piece: Piece) -> Self {
        Figure::new(piece)
    }
}

impl Figure {
    /// A [`Piece`] that has not moved yet.
    #[inline(always)]
    pub const fn new(piece: Piece) -> Self {
        Figure {
            piece,
            moved: false,
        }
    }

    /// A [`Piece`] that may have moved before.
    ///
    /// The flag is discarded for roles that do not track it.
    #[inline(always)]
    pub fn with_moved(piece: Piece, moved: bool) -> Self {
        let mut figure = Figure::new(piece);
        if moved {
            figure.mark_moved();
        }

        figure
    }

    /// This figure's [`Piece`].
    #[inline(always)]
    pub fn piece(&self) -> Piece {
        self.piece
    }

    /// This figure's [`Color`].
    #[inline(always)]
    pub fn color(&self) -> Color {
        self.piece.color()
    }

    /// This figure's [`Role`].
    #[inline(always)]
    pub fn role(&self) -> Role {
        self.piece.role()
    }

    /// Whether this rook or king has moved.
    #[inline(always)]
    pub fn has_moved(&self) -> bool {
        self.moved
    }

    /// Records that this figure has moved.
    #[inline(always)]
    pub fn mark_moved(&mut self) {
        self.moved = matches!(self.role(), Role::Rook | Role::King);
    }

    /// Whether this figure standing on `whence` may move to `whither`.
    ///
    /// This is pseudo-legality: geometry, blocking and the ban on capturing
    /// own pieces are checked, but whether the move exposes the king is not.
    /// En passant is not considered, since it depends on the previous move.
    pub fn is_valid_move(&self, whence: Square, whither: Square, board: &Board) -> bool {
        if whence == whither || board[whither].is_some_and(|f| f.color() == self.color()) {
            return false;
        }

        let (rows, cols) = whence.distance(whither);

        match self.role() {
            Role::Pawn => self.is_valid_pawn_move(whence, whither, board),
            Role::Knight => is_knight_jump(rows, cols),
            Role::Bishop => rows.abs() == cols.abs() && board.is_path_clear(whence, whither),
            Role::Rook => (rows == 0 || cols == 0) && board.is_path_clear(whence, whither),
            Role::Queen => {
                (rows == 0 || cols == 0 || rows.abs() == cols.abs())
                    && board.is_path_clear(whence, whither)
            }
            Role::King => {
                (rows.abs() <= 1 && cols.abs() <= 1) || self.is_castling(whence, whither, board)
            }
        }
    }

    /// Whether this figure standing on `whence` threatens `target`, regardless of what occupies it.
    ///
    /// Differs from [`Self::is_valid_move`] for pawns, which only threaten diagonally,
    /// and for kings, which never threaten by castling.
    pub fn attacks(&self, whence: Square, target: Square, board: &Board) -> bool {
        if whence == target {
            return false;
        }

        let (rows, cols) = whence.distance(target);

        match self.role() {
            Role::Pawn => rows == self.color().forward() && cols.abs() == 1,
            Role::Knight => is_knight_jump(rows, cols),
            Role::Bishop => rows.abs() == cols.abs() && board.is_path_clear(whence, target),
            Role::Rook => (rows == 0 || cols == 0) && board.is_path_clear(whence, target),
            Role::Queen => {
                (rows == 0 || cols == 0 || rows.abs() == cols.abs())
                    && board.is_path_clear(whence, target)
            }
            Role::King => rows.abs() <= 1 && cols.abs() <= 1,
        }
    }

    fn is_valid_pawn_move(&self, whence: Square, whither: Square, board: &Board) -> bool {
        let forward = self.color().forward();
        let (rows, cols) = whence.distance(whither);

        match (rows, cols.abs()) {
            (r, 0) if r == forward => board[whither].is_none(),
            (r, 0) if r == 2 * forward => {
                whence.row() == self.color().pawn_row()
                    && board[whither].is_none()
                    && board.is_path_clear(whence, whither)
            }
            (r, 1) if r == forward => board[whither].is_some(),
            _ => false,
        }
    }

    fn is_castling(&self, whence: Square, whither: Square, board: &Board) -> bool {
        let (rows, cols) = whence.distance(whither);
        if self.moved || rows != 0 || cols.abs() != 2 {
            return false;
        }

        let corner = Square::new(whence.row(), if cols > 0 { 7 } else { 0 });
        let rook = Figure::new(Piece(self.color(), Role::Rook));
        board[corner] == Some(rook) && board.is_path_clear(whence, corner)
    }
}

#[inline(always)]
fn is_knight_jump(rows: i8, cols: i8) -> bool {
    matches!((rows.abs(), cols.abs()), (1, 2) | (2, 1))
}

impl fmt::Display for Figure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.piece, f)
    }
}
