use crate::chess::{would_king_be_in_check, Board, Color, Figure, Outcome, Piece, Role, Rules};
use crate::chess::{IllegalMove, Move, MoveContext, MoveResult, Promotion, Square};
use derive_more::{Display, Error};
use std::fmt;

/// The reason why promoting a pawn failed.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash, Error)]
#[display(fmt = "there is no pawn awaiting promotion")]
pub struct NoPendingPromotion;

/// The current position on the chess board.
///
/// Besides the [`Board`], a position tracks the side to move, the square
/// that may be captured en passant and the pawn awaiting promotion, if any.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Position {
    board: Board,
    turn: Color,
    en_passant: Option<Square>,
    promotion: Option<Square>,
    rules: Rules,
}

impl proptest::arbitrary::Arbitrary for Position {
    type Parameters = ();
    type Strategy = proptest::strategy::BoxedStrategy<Position>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        use proptest::{prelude::*, sample::Selector};

        (0..128usize, any::<Rules>(), any::<Selector>())
            .prop_map(|(plies, rules, selector)| {
                let mut pos = Position::new(Board::default(), Color::White, rules);

                for _ in 0..plies {
                    let m = selector.try_select(pos.moves());
                    if !matches!(m.map(|m| pos.play(*m)), Some(Ok(_))) {
                        break;
                    }

                    if pos.promotion().is_some() {
                        use Promotion::*;
                        let p = selector.select([Knight, Bishop, Rook, Queen]);
                        if pos.promote(p).is_err() {
                            break;
                        }
                    }
                }

                pos
            })
            .boxed()
    }
}

/// The standard starting position, white to move.
impl Default for Position {
    fn default() -> Self {
        Position::new(Board::default(), Color::White, Rules::default())
    }
}

impl Position {
    /// Constructs a [`Position`] from a [`Board`] and the side to move.
    pub fn new(board: Board, turn: Color, rules: Rules) -> Self {
        Position {
            board,
            turn,
            en_passant: None,
            promotion: None,
            rules,
        }
    }

    pub(crate) fn with_en_passant(mut self, en_passant: Option<Square>) -> Self {
        self.en_passant = en_passant;
        self
    }

    pub(crate) fn with_promotion(mut self, promotion: Option<Square>) -> Self {
        self.promotion = promotion;
        self
    }

    /// The [`Board`].
    #[inline(always)]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The side to move.
    #[inline(always)]
    pub fn turn(&self) -> Color {
        self.turn
    }

    /// The square passed over by a pawn that just advanced two squares.
    #[inline(always)]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    /// The square of the pawn awaiting promotion.
    #[inline(always)]
    pub fn promotion(&self) -> Option<Square> {
        self.promotion
    }

    /// The [`Rules`] in effect.
    #[inline(always)]
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Whether the side to move is in [check].
    ///
    /// [check]: https://www.chessprogramming.org/Check
    pub fn is_check(&self) -> bool {
        self.board.is_king_in_check(self.turn)
    }

    /// Whether the given side is [checkmated].
    ///
    /// [checkmated]: https://www.chessprogramming.org/Checkmate
    pub fn is_checkmate(&self, side: Color) -> bool {
        self.board.is_king_in_check(side) && !self.has_any_legal_move(side)
    }

    /// Whether the given side is [stalemated].
    ///
    /// [stalemated]: https://www.chessprogramming.org/Stalemate
    pub fn is_stalemate(&self, side: Color) -> bool {
        !self.board.is_king_in_check(side) && !self.has_any_legal_move(side)
    }

    /// Whether the given side has at least one legal move.
    ///
    /// En passant is only ever available to the side to move.
    pub fn has_any_legal_move(&self, side: Color) -> bool {
        self.board
            .iter()
            .filter(|(f, _)| f.color() == side)
            .flat_map(|(_, whence)| Square::iter().map(move |whither| Move(whence, whither)))
            .any(|m| self.evaluate(m, side).is_ok())
    }

    /// The [`Outcome`] of the game in case this position is final.
    ///
    /// The game is never over while a pawn awaits promotion.
    pub fn outcome(&self) -> Option<Outcome> {
        if self.promotion.is_some() {
            None
        } else if !self.has_any_legal_move(self.turn) {
            if self.board.is_king_in_check(self.turn) {
                Some(Outcome::Checkmate(!self.turn))
            } else {
                Some(Outcome::Stalemate)
            }
        } else if self.board.is_material_insufficient() {
            Some(Outcome::DrawByInsufficientMaterial)
        } else {
            None
        }
    }

    /// An iterator over the legal moves of the piece on a [`Square`].
    pub fn moves_from(&self, whence: Square) -> impl Iterator<Item = MoveContext> + '_ {
        Square::iter()
            .filter_map(move |whither| self.context(Move(whence, whither)).ok())
    }

    /// An iterator over the legal moves in this position.
    pub fn moves(&self) -> impl Iterator<Item = MoveContext> + '_ {
        self.board
            .iter()
            .filter(|(f, _)| f.color() == self.turn)
            .flat_map(|(_, whence)| self.moves_from(whence))
    }

    /// Everything a [`Move`] would do if played in this position.
    pub fn context(&self, m: Move) -> MoveResult {
        match self.promotion {
            Some(sq) => Err(IllegalMove::AwaitingPromotion(sq)),
            None => self.evaluate(m, self.turn),
        }
    }

    /// Play a [`Move`] if legal in this position.
    ///
    /// The position is left untouched if the move is illegal.
    pub fn play(&mut self, m: Move) -> MoveResult {
        let mc = self.context(m)?;
        apply(&mut self.board, &mc);

        let (rows, _) = m.whence().distance(m.whither());
        self.en_passant = match mc.role() {
            Role::Pawn if rows.abs() == 2 => m.whence().offset(rows / 2, 0),
            _ => None,
        };

        if mc.is_promotion() {
            self.promotion = Some(m.whither());
        } else {
            self.turn = !self.turn;
        }

        Ok(mc)
    }

    /// Replaces the pawn awaiting promotion and passes the turn.
    ///
    /// Returns the [`Piece`] the pawn was promoted to.
    pub fn promote(&mut self, promotion: Promotion) -> Result<Piece, NoPendingPromotion> {
        let whither = self.promotion.ok_or(NoPendingPromotion)?;
        let role = Role::from(promotion);
        let piece = Piece(self.turn, role);

        // A promoted rook can never castle.
        self.board[whither] = Some(Figure::with_moved(piece, role == Role::Rook));
        self.promotion = None;
        self.turn = !self.turn;

        Ok(piece)
    }

    fn evaluate(&self, m: Move, side: Color) -> MoveResult {
        let (whence, whither) = (m.whence(), m.whither());

        let figure = match self.board[whence] {
            Some(f) if f.color() == side => f,
            _ => return Err(IllegalMove::Illegal(m)),
        };

        let mut mc = MoveContext {
            m,
            piece: figure.piece(),
            capture: None,
            castling: None,
            promotion: false,
        };

        let (rows, cols) = whence.distance(whither);

        if figure.is_valid_move(whence, whither, &self.board) {
            mc.capture = self.board[whither].map(|f| (f.piece(), whither));

            if figure.role() == Role::King && cols.abs() == 2 {
                let corner = Square::new(whence.row(), if cols > 0 { 7 } else { 0 });
                let rook = whither.offset(0, -cols.signum()).ok_or(IllegalMove::Illegal(m))?;
                mc.castling = Some(Move(corner, rook));

                if self.rules.strict_castling
                    && (self.board.is_king_in_check(side)
                        || self.board.is_attacked(rook, !side))
                {
                    return Err(IllegalMove::ExposesKing(m));
                }
            }
        } else if figure.role() == Role::Pawn
            && side == self.turn
            && self.en_passant == Some(whither)
            && rows == side.forward()
            && cols.abs() == 1
        {
            let victim = Square::new(whence.row(), whither.col());
            match self.board[victim] {
                Some(f) if f.piece() == Piece(!side, Role::Pawn) => {
                    mc.capture = Some((f.piece(), victim));
                }

                _ => return Err(IllegalMove::Illegal(m)),
            }
        } else {
            return Err(IllegalMove::Illegal(m));
        }

        let mut hypothetical = self.board;
        if mc.is_castling() {
            // The landing square must be safe regardless of where the rook ends up.
            hypothetical.relocate(whence, whither);
        } else {
            apply(&mut hypothetical, &mc);
        }

        if would_king_be_in_check(&hypothetical, side) {
            return Err(IllegalMove::ExposesKing(m));
        }

        mc.promotion = figure.role() == Role::Pawn && whither.row() == side.promotion_row();

        Ok(mc)
    }
}

/// Carries out every side effect of a move on the board.
fn apply(board: &mut Board, mc: &MoveContext) {
    if let Some((_, victim)) = mc.capture() {
        board[victim] = None;
    }

    for m in [Some(**mc), mc.castling()].into_iter().flatten() {
        board.relocate(m.whence(), m.whither());
        if let Some(f) = &mut board[m.whither()] {
            f.mark_moved();
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.board)?;

        match self.promotion {
            Some(sq) => write!(f, "{} to promote the pawn on {sq}", self.turn),
            None => write!(f, "{} to move", self.turn),
        }
    }
}
