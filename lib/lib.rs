/// Chess domain types and rules.
pub mod chess;
/// A game session and its persistence.
pub mod game;
