use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    num::ParseIntError,
    str::FromStr,
};

use crate::{
    board::{Board, InvalidBoard, PlayedMove},
    color::Color,
    coord::{home_rank, pawn_home_rank, Coord, ParseCoordError, Vector},
    game::Game,
    grid::Grid,
    piece::{InvalidFenPiece, Piece, PieceKind},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseFenError {
    NotEnoughFields,
    TrailingField,
    InvalidPiece(InvalidFenPiece),
    BadRowCount(usize),
    BadRowWidth { row: u8, width: u8 },
    InvalidPlayer(String),
    InvalidCastling(char),
    MisplacedCastling(char),
    InvalidEnPassant(ParseCoordError),
    MisplacedEnPassant(Coord),
    InvalidCount(ParseIntError),
    InvalidBoard(InvalidBoard),
}
impl Display for ParseFenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ParseFenError::NotEnoughFields => write!(f, "6 space-separated fields were expected")?,
            ParseFenError::TrailingField => write!(f, "unexpected field after the move counters")?,
            ParseFenError::InvalidPiece(error) => write!(f, "{error}")?,
            ParseFenError::BadRowCount(count) => {
                write!(f, "the placement has {count} rows, 8 were expected")?;
            }
            ParseFenError::BadRowWidth { row, width } => {
                write!(f, "row {row} covers {width} squares, 8 were expected")?;
            }
            ParseFenError::InvalidPlayer(field) => {
                write!(f, "found `{field}`, `w` or `b` was expected")?;
            }
            ParseFenError::InvalidCastling(c) => {
                write!(f, "found `{c}`, one of `K`, `Q`, `k`, `q` was expected")?;
            }
            ParseFenError::MisplacedCastling(c) => {
                write!(f, "the `{c}` castling right does not match the placement")?;
            }
            ParseFenError::InvalidEnPassant(error) => write!(f, "{error}")?,
            ParseFenError::MisplacedEnPassant(target) => {
                write!(f, "no pawn could have just opened the en passant window at {target}")?;
            }
            ParseFenError::InvalidCount(error) => write!(f, "{error}")?,
            ParseFenError::InvalidBoard(error) => write!(f, "{error}")?,
        }
        Ok(())
    }
}
impl Error for ParseFenError {}
impl From<InvalidFenPiece> for ParseFenError {
    fn from(error: InvalidFenPiece) -> Self {
        ParseFenError::InvalidPiece(error)
    }
}
impl From<ParseCoordError> for ParseFenError {
    fn from(error: ParseCoordError) -> Self {
        ParseFenError::InvalidEnPassant(error)
    }
}
impl From<ParseIntError> for ParseFenError {
    fn from(error: ParseIntError) -> Self {
        ParseFenError::InvalidCount(error)
    }
}
impl From<InvalidBoard> for ParseFenError {
    fn from(error: InvalidBoard) -> Self {
        ParseFenError::InvalidBoard(error)
    }
}

/// Bridges a [`Game`] to Forsyth-Edwards Notation. Castling rights map
/// onto the `moved` flags of kings and rooks, and an en passant square
/// is reconstructed as a synthesized last history entry. The fullmove
/// counter is derived from the history on output, so it does not
/// round-trip for externally supplied positions.
#[derive(Debug, Clone)]
pub struct Fen(pub Game);

fn parse_placement(placement: &str) -> Result<Grid<Option<Piece>>, ParseFenError> {
    let mut grid = Grid::default();
    let rows: Vec<&str> = placement.split('/').collect();
    if rows.len() != 8 {
        return Err(ParseFenError::BadRowCount(rows.len()));
    }
    for (y, row) in (0..).zip(rows) {
        let mut x: u8 = 0;
        for c in row.chars() {
            if let Some(skip) = c.to_digit(10) {
                x = x.saturating_add(u8::try_from(skip).unwrap_or(u8::MAX));
                continue;
            }
            if x >= 8 {
                return Err(ParseFenError::BadRowWidth { row: y, width: x });
            }
            let kind = PieceKind::from_fen(c)?;
            let color = if c.is_ascii_uppercase() {
                Color::White
            } else {
                Color::Black
            };
            // Kings and rooks start out barred from castling; the rights
            // field reopens them. A pawn off its home rank has moved, which
            // rules the double move out.
            let moved = match kind {
                PieceKind::Pawn => y != pawn_home_rank(color),
                PieceKind::King | PieceKind::Rook => true,
                _ => false,
            };
            grid[Coord::new(x, y)] = Some(Piece { color, kind, moved });
            x += 1;
        }
        if x != 8 {
            return Err(ParseFenError::BadRowWidth { row: y, width: x });
        }
    }
    Ok(grid)
}
fn apply_castling_rights(
    grid: &mut Grid<Option<Piece>>,
    rights: &str,
) -> Result<(), ParseFenError> {
    if rights == "-" {
        return Ok(());
    }
    for c in rights.chars() {
        let (color, corner_x) = match c {
            'K' => (Color::White, 7),
            'Q' => (Color::White, 0),
            'k' => (Color::Black, 7),
            'q' => (Color::Black, 0),
            c => return Err(ParseFenError::InvalidCastling(c)),
        };
        let home = home_rank(color);
        for (position, kind) in [
            (Coord::new(4, home), PieceKind::King),
            (Coord::new(corner_x, home), PieceKind::Rook),
        ] {
            match grid[position] {
                Some(piece) if piece.kind == kind && piece.color == color => {}
                _ => return Err(ParseFenError::MisplacedCastling(c)),
            }
            if let Some(piece) = grid[position].as_mut() {
                piece.moved = false;
            }
        }
    }
    Ok(())
}
fn reconstruct_double_move(
    grid: &Grid<Option<Piece>>,
    field: &str,
    player: Color,
) -> Result<Option<PlayedMove>, ParseFenError> {
    if field == "-" {
        return Ok(None);
    }
    let target: Coord = field.parse()?;
    let mover = !player;
    let origin = Coord::new(target.x(), pawn_home_rank(mover));
    if origin.move_by(Vector::pawn_single_move(mover)) != Some(target) {
        return Err(ParseFenError::MisplacedEnPassant(target));
    }
    let Some(destination) = origin.move_by(Vector::pawn_double_move(mover)) else {
        return Err(ParseFenError::MisplacedEnPassant(target));
    };
    match grid[destination] {
        Some(pawn) if pawn.kind == PieceKind::Pawn && pawn.color == mover => {}
        _ => return Err(ParseFenError::MisplacedEnPassant(target)),
    }
    Ok(Some(PlayedMove {
        piece: Piece::new(mover, PieceKind::Pawn),
        origin,
        destination,
    }))
}
impl FromStr for Fen {
    type Err = ParseFenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut fields = s.split_whitespace();
        let mut next = || fields.next().ok_or(ParseFenError::NotEnoughFields);
        let placement = next()?;
        let player = next()?;
        let castling = next()?;
        let en_passant = next()?;
        let halfmove = next()?;
        let fullmove = next()?;
        if fields.next().is_some() {
            return Err(ParseFenError::TrailingField);
        }

        let mut grid = parse_placement(placement)?;
        let player = match player {
            "w" => Color::White,
            "b" => Color::Black,
            field => return Err(ParseFenError::InvalidPlayer(field.to_string())),
        };
        apply_castling_rights(&mut grid, castling)?;
        let history = reconstruct_double_move(&grid, en_passant, player)?
            .into_iter()
            .collect();
        let halfmove: u16 = halfmove.parse()?;
        let _: u16 = fullmove.parse()?;

        let board = Board::from_parts(grid, history);
        board.validate(player)?;
        Ok(Fen(Game::from_parts(board, player, halfmove)))
    }
}
impl Display for Fen {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let game = &self.0;
        let board = game.board();
        for y in 0..8 {
            if y > 0 {
                write!(f, "/")?;
            }
            let mut empty = 0;
            for x in 0..8 {
                match board.piece_at(Coord::new(x, y)) {
                    None => empty += 1,
                    Some(piece) => {
                        if empty > 0 {
                            write!(f, "{empty}")?;
                            empty = 0;
                        }
                        write!(f, "{}", piece.fen())?;
                    }
                }
            }
            if empty > 0 {
                write!(f, "{empty}")?;
            }
        }
        write!(f, " {} ", game.current_player().lowercase())?;
        let mut any_right = false;
        for (c, color, corner_x) in [
            ('K', Color::White, 7),
            ('Q', Color::White, 0),
            ('k', Color::Black, 7),
            ('q', Color::Black, 0),
        ] {
            if castling_right(board, color, corner_x) {
                write!(f, "{c}")?;
                any_right = true;
            }
        }
        if !any_right {
            write!(f, "-")?;
        }
        match board.en_passant_target() {
            Some(target) => write!(f, " {target}")?,
            None => write!(f, " -")?,
        }
        write!(
            f,
            " {} {}",
            game.halfmove_clock(),
            board.history().len() / 2 + 1
        )?;
        Ok(())
    }
}
fn castling_right(board: &Board, color: Color, corner_x: u8) -> bool {
    let home = home_rank(color);
    let king_ready = board.piece_at(Coord::new(4, home)).is_some_and(|king| {
        king.kind == PieceKind::King && king.color == color && !king.moved
    });
    let rook_ready = board.piece_at(Coord::new(corner_x, home)).is_some_and(|rook| {
        rook.kind == PieceKind::Rook && rook.color == color && !rook.moved
    });
    king_ready && rook_ready
}

#[cfg(test)]
mod test {
    use crate::{
        color::Color,
        coord,
        end_state::{DrawReason, EndState},
        game::{Game, GameStatus},
    };

    use super::{Fen, ParseFenError};

    const STARTING: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn a_new_game_formats_to_the_starting_fen() {
        assert_eq!(Fen(Game::new()).to_string(), STARTING);
    }
    #[test]
    fn the_starting_fen_round_trips() {
        let Fen(game) = STARTING.parse().unwrap();
        assert_eq!(game.current_player(), Color::White);
        assert_eq!(Fen(game).to_string(), STARTING);
    }
    #[test]
    fn a_double_move_opens_the_en_passant_field() {
        let mut game = Game::new();
        assert!(game.attempt_move(coord!("e2"), coord!("e4")));
        assert_eq!(
            Fen(game).to_string(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );
    }
    #[test]
    fn a_loaded_en_passant_window_is_capturable() {
        let Fen(mut game) = "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 3".parse().unwrap();
        assert!(game.attempt_move(coord!("e5"), coord!("d6")));
        assert!(game.board()[coord!("d5")].is_empty());
    }
    #[test]
    fn castling_rights_control_castling() {
        let Fen(mut with_right) = "4k3/8/8/8/8/8/8/4K2R w K - 0 1".parse().unwrap();
        assert!(with_right.attempt_move(coord!("e1"), coord!("g1")));

        let Fen(mut without) = "4k3/8/8/8/8/8/8/4K2R w - - 0 1".parse().unwrap();
        assert!(!without.attempt_move(coord!("e1"), coord!("g1")));
    }
    #[test]
    fn a_loaded_stalemate_is_recognized() {
        let Fen(game) = "k7/2Q5/1K6/8/8/8/8/8 b - - 0 1".parse().unwrap();
        assert_eq!(
            game.status(),
            GameStatus::Over(EndState::Draw(DrawReason::Stalemate))
        );
    }
    #[test]
    fn malformed_strings_are_rejected() {
        assert!(matches!(
            "8/8/8/8/8/8/8/8 w - - 0 1".parse::<Fen>(),
            Err(ParseFenError::InvalidBoard(_))
        ));
        assert!(matches!(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0".parse::<Fen>(),
            Err(ParseFenError::NotEnoughFields)
        ));
        assert!(matches!(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNX w KQkq - 0 1".parse::<Fen>(),
            Err(ParseFenError::InvalidPiece(_))
        ));
        assert!(matches!(
            "4k3/8/8/8/8/8/8/4K3 w K - 0 1".parse::<Fen>(),
            Err(ParseFenError::MisplacedCastling('K'))
        ));
        assert!(matches!(
            "4k3/8/8/8/8/8/8/4K3 w - e6 0 1".parse::<Fen>(),
            Err(ParseFenError::MisplacedEnPassant(_))
        ));
    }
    #[test]
    fn castling_rights_expire_in_the_output() {
        let mut game = Game::new();
        for (origin, target) in [("e2", "e4"), ("e7", "e5"), ("e1", "e2")] {
            assert!(game.attempt_move(
                crate::coord::Coord::from_name(origin),
                crate::coord::Coord::from_name(target),
            ));
        }
        let fen = Fen(game).to_string();
        assert!(fen.contains(" kq "));
    }
}
