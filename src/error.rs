use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

use crate::piece::PieceKind;

/// Contract violations around pawn promotion. Unlike illegal moves,
/// which are reported by returning `false`, these indicate a caller bug
/// and are surfaced loudly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromotionError {
    InvalidKind(PieceKind),
    NothingPending,
}
impl Display for PromotionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PromotionError::InvalidKind(kind) => {
                write!(f, "a pawn cannot promote to a {kind}")?;
            }
            PromotionError::NothingPending => {
                write!(f, "no pawn is awaiting a promotion choice")?;
            }
        }
        Ok(())
    }
}
impl Error for PromotionError {}
