use crate::chess::{Board, Color, IllegalMove, Move, MoveContext, MoveResult, NoPendingPromotion};
use crate::chess::{Outcome, Piece, Position, Promotion, Rules, Square};
use tracing::{debug, info, instrument, warn};

mod snapshot;
mod store;

pub use snapshot::*;
pub use store::*;

/// A game of chess from the first move to its [`Outcome`].
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct Game {
    position: Position,
    outcome: Option<Outcome>,
}

impl proptest::arbitrary::Arbitrary for Game {
    type Parameters = ();
    type Strategy = proptest::strategy::BoxedStrategy<Game>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        use proptest::prelude::*;
        any::<Position>().prop_map(Game::from).boxed()
    }
}

impl From<Position> for Game {
    fn from(position: Position) -> Self {
        Game {
            outcome: position.outcome(),
            position,
        }
    }
}

impl Game {
    /// Starts a new game under the given [`Rules`].
    pub fn new(rules: Rules) -> Self {
        Position::new(Board::default(), Color::White, rules).into()
    }

    /// The current [`Position`].
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// The current [`Board`].
    pub fn board(&self) -> &Board {
        self.position.board()
    }

    /// The side to move.
    pub fn turn(&self) -> Color {
        self.position.turn()
    }

    /// The [`Rules`] in effect.
    pub fn rules(&self) -> &Rules {
        self.position.rules()
    }

    /// The [`Outcome`] of the game, if it has ended.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Whether the king of the given [`Color`] is in check.
    pub fn is_check(&self, side: Color) -> bool {
        self.board().is_king_in_check(side)
    }

    /// The square of the pawn awaiting [`Self::choose_promotion`], if any.
    pub fn pending_promotion(&self) -> Option<Square> {
        self.position.promotion()
    }

    /// The legal moves of the piece on a [`Square`].
    pub fn legal_moves_from(&self, whence: Square) -> impl Iterator<Item = MoveContext> + '_ {
        self.outcome
            .is_none()
            .then(|| self.position.moves_from(whence))
            .into_iter()
            .flatten()
    }

    /// Proposes to move the piece at `whence` to `whither`, given as raw `(row, column)` pairs.
    #[instrument(level = "trace", skip(self))]
    pub fn propose_move(&mut self, whence: (i8, i8), whither: (i8, i8)) -> MoveResult {
        self.play(Move::try_from((whence, whither))?)
    }

    /// Plays a [`Move`] if legal, otherwise the game is left untouched.
    #[instrument(level = "trace", skip(self))]
    pub fn play(&mut self, m: Move) -> MoveResult {
        if let Some(o) = self.outcome {
            return Err(IllegalMove::GameHasEnded(o));
        }

        match self.position.play(m) {
            Err(e) => {
                debug!(%m, reason = %e, "rejected move");
                Err(e)
            }

            Ok(mc) => {
                debug!(%m, capture = ?mc.capture(), "played move");
                self.conclude();
                Ok(mc)
            }
        }
    }

    /// Promotes the pawn that reached the last row.
    ///
    /// Without a choice, the pawn is promoted as configured by [`Rules::promotion`].
    #[instrument(level = "trace", skip(self), err)]
    pub fn choose_promotion(
        &mut self,
        choice: Option<Promotion>,
    ) -> Result<Piece, NoPendingPromotion> {
        let promotion = choice.unwrap_or(self.rules().promotion);
        let piece = self.position.promote(promotion)?;
        debug!(%piece, "promoted pawn");
        self.conclude();
        Ok(piece)
    }

    /// Resets the game to the starting position, keeping the [`Rules`].
    #[instrument(level = "trace", skip(self))]
    pub fn restart(&mut self) {
        *self = Game::new(*self.rules());
    }

    /// The persisted shape of the current position.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from(&self.position)
    }

    /// Saves the game to a [`Store`].
    #[instrument(level = "debug", skip(self, store), err)]
    pub fn save<S: Store>(&self, store: &mut S) -> Result<(), SaveError> {
        let data = serde_json::to_string_pretty(&self.snapshot())?;
        store.save(&data)?;
        Ok(())
    }

    /// Replaces the game with the one saved in a [`Store`].
    ///
    /// Returns whether there was a saved game. The game is left untouched on failure.
    #[instrument(level = "debug", skip(self, store), err)]
    pub fn load<S: Store>(&mut self, store: &S) -> Result<bool, LoadError> {
        let Some(data) = store.load()? else {
            return Ok(false);
        };

        let snapshot: Snapshot = serde_json::from_str(&data)?;
        *self = snapshot.restore(*self.rules())?.into();
        info!(turn = %self.turn(), "restored saved game");
        Ok(true)
    }

    /// Like [`Self::load`], but a saved game that cannot be restored is ignored.
    pub fn restore<S: Store>(&mut self, store: &S) -> bool {
        match self.load(store) {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(error = %e, "ignoring saved game");
                false
            }
        }
    }

    fn conclude(&mut self) {
        self.outcome = self.position.outcome();
        if let Some(o) = self.outcome {
            info!(outcome = %o, "the game has ended");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::{OutOfBounds, Role};
    use mockall::predicate::always;
    use proptest::sample::Selector;
    use std::io;
    use test_strategy::proptest;

    fn play_all(game: &mut Game, moves: &[&str]) {
        for m in moves {
            assert!(game.play(m.parse().unwrap()).is_ok(), "{m}");
        }
    }

    #[test]
    fn new_game_starts_with_white_to_move() {
        let game = Game::default();
        assert_eq!(game.turn(), Color::White);
        assert_eq!(game.board(), &Board::default());
        assert_eq!(game.outcome(), None);
        assert_eq!(game.pending_promotion(), None);
    }

    #[proptest]
    fn moves_off_the_board_are_rejected(
        #[strategy(0i8..8)] r: i8,
        #[strategy(0i8..8)] c: i8,
        #[strategy(8i8..)] far: i8,
    ) {
        let mut game = Game::default();
        let before = game.clone();
        assert_eq!(
            game.propose_move((r, c), (far, c)),
            Err(IllegalMove::OutOfBounds(OutOfBounds(far, c)))
        );
        assert_eq!(game, before);
    }

    #[proptest]
    fn propose_move_agrees_with_play(
        #[filter(#g.outcome().is_none())] g: Game,
        selector: Selector,
    ) {
        let m = *selector.select(g.position().moves());
        let (mut a, mut b) = (g.clone(), g);
        assert_eq!(
            a.propose_move(m.whence().into(), m.whither().into()),
            b.play(m)
        );
        assert_eq!(a, b);
    }

    #[proptest]
    fn rejected_moves_leave_the_game_untouched(
        g: Game,
        #[filter(#g.position().context(#m).is_err())] m: Move,
    ) {
        let mut game = g.clone();
        assert!(game.play(m).is_err());
        assert_eq!(game, g);
    }

    #[proptest]
    fn no_move_is_accepted_after_the_game_has_ended(m: Move) {
        let mut game = Game::default();
        play_all(&mut game, &["c2c3", "d7d5", "b2b4", "e8a4"]);

        let before = game.clone();
        let o = Outcome::Checkmate(Color::Black);
        assert_eq!(game.play(m), Err(IllegalMove::GameHasEnded(o)));
        assert_eq!(game.legal_moves_from(m.whence()).count(), 0);
        assert_eq!(game, before);
    }

    #[test]
    fn fools_mate_ends_the_game() {
        let mut game = Game::default();
        play_all(&mut game, &["c2c3", "d7d5", "b2b4"]);
        assert_eq!(game.outcome(), None);
        assert!(!game.position().is_checkmate(Color::White));

        play_all(&mut game, &["e8a4"]);
        assert!(game.is_check(Color::White));
        assert!(game.position().is_checkmate(Color::White));
        assert!(!game.position().is_checkmate(Color::Black));
        assert_eq!(game.outcome(), Some(Outcome::Checkmate(Color::Black)));
    }

    #[proptest]
    fn restart_is_idempotent(mut g: Game) {
        g.restart();
        let once = g.clone();
        g.restart();
        assert_eq!(g, once);
        assert_eq!(
            g.position(),
            &Position::new(Board::default(), Color::White, *g.rules())
        );
    }

    #[test]
    fn promotion_defaults_to_the_configured_piece() {
        let rules = Rules {
            promotion: Promotion::Knight,
            ..Rules::default()
        };

        let mut board = Board::empty();
        board[Square::new(6, 0)] = Some(Piece(Color::White, Role::Pawn).into());
        board[Square::new(0, 3)] = Some(Piece(Color::White, Role::King).into());
        board[Square::new(4, 7)] = Some(Piece(Color::Black, Role::King).into());
        let mut game = Game::from(Position::new(board, Color::White, rules));

        play_all(&mut game, &["a7a8"]);
        assert_eq!(game.pending_promotion(), Some(Square::new(7, 0)));
        assert_eq!(
            game.choose_promotion(None),
            Ok(Piece(Color::White, Role::Knight))
        );
        assert_eq!(game.turn(), Color::Black);
        assert_eq!(game.choose_promotion(None), Err(NoPendingPromotion));
    }

    #[proptest]
    fn saving_writes_the_snapshot_as_json(g: Game) {
        let expected = serde_json::to_value(g.snapshot())?;

        let mut store = MockStore::new();
        store
            .expect_save()
            .withf(move |data| serde_json::from_str(data).ok() == Some(expected.clone()))
            .times(1)
            .returning(|_| Ok(()));

        g.save(&mut store)?;
    }

    #[proptest]
    fn loading_what_was_saved_is_an_identity(g: Game) {
        let data = serde_json::to_string(&g.snapshot())?;

        let mut store = MockStore::new();
        store
            .expect_load()
            .times(1)
            .returning(move || Ok(Some(data.clone())));

        let mut game = Game::new(*g.rules());
        assert!(game.load(&store)?);
        assert_eq!(game, g);
    }

    #[test]
    fn loading_without_a_saved_game_does_nothing() {
        let mut store = MockStore::new();
        store.expect_load().times(1).returning(|| Ok(None));

        let mut game = Game::default();
        assert!(!game.load(&store).unwrap());
        assert_eq!(game, Game::default());
    }

    #[proptest]
    fn failing_to_restore_leaves_the_game_untouched(
        g: Game,
        #[strategy(proptest::sample::select(vec!["", "{", "[]", r#"{"Turn":"Red","Pieces":[]}"#]))]
        data: &'static str,
    ) {
        let mut store = MockStore::new();
        store
            .expect_load()
            .returning(move || Ok(Some(data.to_string())));

        let mut game = g.clone();
        assert!(matches!(game.load(&store), Err(LoadError::Syntax(_))));
        assert!(!game.restore(&store));
        assert_eq!(game, g);
    }

    #[test]
    fn io_errors_are_reported_by_load_and_swallowed_by_restore() {
        let mut store = MockStore::new();
        store
            .expect_load()
            .times(2)
            .returning(|| Err(io::Error::from(io::ErrorKind::PermissionDenied)));

        let mut game = Game::default();
        assert!(matches!(game.load(&store), Err(LoadError::Io(_))));
        assert!(!game.restore(&store));
        assert_eq!(game, Game::default());
    }

    #[test]
    fn invalid_snapshots_are_rejected() {
        let data = r#"{"Turn":"White","Pieces":[
            {"Row":0,"Column":0,"Type":"King","Color":"White"},
            {"Row":0,"Column":0,"Type":"King","Color":"Black"}
        ]}"#;

        let mut store = MockStore::new();
        store
            .expect_load()
            .times(1)
            .returning(move || Ok(Some(data.to_string())));

        let mut game = Game::default();
        assert!(matches!(
            game.load(&store),
            Err(LoadError::Invalid(InvalidSnapshot::Occupied(_)))
        ));
    }

    #[proptest]
    fn restore_ignores_invalid_snapshots(mut g: Game) {
        let data = r#"{"Turn":"White","Pieces":[
            {"Row":0,"Column":0,"Type":"King","Color":"White"},
            {"Row":0,"Column":0,"Type":"King","Color":"Black"}
        ]}"#;

        let mut store = MockStore::new();
        store
            .expect_load()
            .times(1)
            .returning(move || Ok(Some(data.to_string())));

        let before = g.clone();
        assert!(!g.restore(&store));
        assert_eq!(g, before);
    }

    #[test]
    fn io_errors_are_reported_by_save() {
        let mut store = MockStore::new();
        store
            .expect_save()
            .with(always())
            .times(1)
            .returning(|_| Err(io::Error::from(io::ErrorKind::PermissionDenied)));

        let result = Game::default().save(&mut store);
        assert!(matches!(result, Err(SaveError::Io(_))));
    }
}
