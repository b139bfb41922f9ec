mod board;
mod check;
mod color;
mod figure;
mod r#move;
mod outcome;
mod piece;
mod position;
mod promotion;
mod role;
mod rules;
mod square;

pub use board::*;
pub use check::*;
pub use color::*;
pub use figure::*;
pub use outcome::*;
pub use piece::*;
pub use position::*;
pub use promotion::*;
pub use r#move::*;
pub use role::*;
pub use rules::*;
pub use square::*;
