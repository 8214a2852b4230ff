use std::fmt::{self, Display, Formatter};

use crate::color::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndState {
    Win(Color),
    Draw(DrawReason),
}
impl Display for EndState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            EndState::Win(color) => write!(f, "{color} wins")?,
            EndState::Draw(reason) => write!(f, "draw by {reason}")?,
        }
        Ok(())
    }
}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawReason {
    Stalemate,
    Repetition,
    FiftyMoves,
    DeadPosition,
}
impl Display for DrawReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DrawReason::Stalemate => write!(f, "stalemate")?,
            DrawReason::Repetition => write!(f, "threefold repetition")?,
            DrawReason::FiftyMoves => write!(f, "the fifty-move rule")?,
            DrawReason::DeadPosition => write!(f, "dead position")?,
        }
        Ok(())
    }
}
