use std::fmt::{self, Display, Formatter};

use crate::{color::Color, coord::Coord, piece::Piece};

const LIGHT: &str = "\x1b[48;5;216m";
const DARK: &str = "\x1b[48;5;173m";
const HIGHLIGHT: &str = "\x1b[48;5;114m";
const RESET: &str = "\x1b[0m";

/// Anything that can say which piece stands on a square, which is all
/// the renderer needs.
pub trait IndexableBoard {
    fn piece_on(&self, position: Coord) -> Option<Piece>;
}

/// Renders a board as a colored grid for ANSI terminals, with rank and
/// file labels and optional square highlighting.
pub struct BoardDisplay<'a, T> {
    board: &'a T,
    highlighted: Vec<Coord>,
}
impl<'a, T: IndexableBoard> BoardDisplay<'a, T> {
    pub fn new(board: &'a T) -> Self {
        BoardDisplay {
            board,
            highlighted: Vec::new(),
        }
    }
    pub fn highlight(mut self, squares: impl IntoIterator<Item = Coord>) -> Self {
        self.highlighted.extend(squares);
        self
    }
}
impl<T: IndexableBoard> Display for BoardDisplay<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for y in 0..8 {
            write!(f, "{} ", 8 - y)?;
            for x in 0..8 {
                let coord = Coord::new(x, y);
                let background = if self.highlighted.contains(&coord) {
                    HIGHLIGHT
                } else {
                    match coord.tint() {
                        Color::White => LIGHT,
                        Color::Black => DARK,
                    }
                };
                let glyph = self.board.piece_on(coord).map_or(' ', Piece::figurine);
                write!(f, "{background}{glyph} ")?;
            }
            writeln!(f, "{RESET}")?;
        }
        write!(f, "  a b c d e f g h")?;
        Ok(())
    }
}
