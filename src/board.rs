use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    ops::Index,
};

use crate::{
    board_display::IndexableBoard,
    color::Color,
    coord::{all_coords, home_rank, pawn_home_rank, promotion_rank, Coord, Vector},
    error::PromotionError,
    grid::Grid,
    piece::{Piece, PieceKind},
    square::Square,
};

/// A record of one executed move, as stored in [`Board::history`]. The
/// piece is recorded as it stood on the origin square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayedMove {
    pub piece: Piece,
    pub origin: Coord,
    pub destination: Coord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvalidBoard {
    NoKing(Color),
    TooManyKings(Color),
    NonPlayerInCheck(Color),
    PawnOnBackRank(Coord),
}
impl Display for InvalidBoard {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            InvalidBoard::NoKing(color) => write!(f, "{color} has no king")?,
            InvalidBoard::TooManyKings(color) => write!(f, "{color} has more than one king")?,
            InvalidBoard::NonPlayerInCheck(color) => {
                write!(f, "{color} is in check but it is not their turn")?;
            }
            InvalidBoard::PawnOnBackRank(position) => {
                write!(f, "there is a pawn on the back rank at {position}")?;
            }
        }
        Ok(())
    }
}
impl Error for InvalidBoard {}

/// What [`Board::apply_effects`] did, for the caller's bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MoveOutcome {
    pub captured: Option<Piece>,
    pub pawn_move: bool,
}

/// The playing field and its memory: squares, the move history, and the
/// pieces captured from each side. Turn order and game status live in
/// [`Game`](crate::game::Game); the board only answers questions about
/// positions and executes moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    squares: Grid<Square>,
    history: Vec<PlayedMove>,
    captured_white: Vec<Piece>,
    captured_black: Vec<Piece>,
}
impl Board {
    pub fn with_pieces(mut place: impl FnMut(Coord) -> Option<Piece>) -> Self {
        Board {
            squares: Grid::from_fn(|coord| Square::new(coord, place(coord))),
            history: Vec::new(),
            captured_white: Vec::new(),
            captured_black: Vec::new(),
        }
    }
    pub fn starting_position() -> Self {
        Board::with_pieces(|coord| {
            let color = if coord.y() < 4 {
                Color::Black
            } else {
                Color::White
            };
            let kind = match coord.y() {
                1 | 6 => PieceKind::Pawn,
                0 | 7 => match coord.x() {
                    0 | 7 => PieceKind::Rook,
                    1 | 6 => PieceKind::Knight,
                    2 | 5 => PieceKind::Bishop,
                    3 => PieceKind::Queen,
                    4 => PieceKind::King,
                    _ => unreachable!(),
                },
                _ => return None,
            };
            Some(Piece::new(color, kind))
        })
    }
    pub(crate) fn from_parts(pieces: Grid<Option<Piece>>, history: Vec<PlayedMove>) -> Self {
        Board {
            squares: Grid::from_fn(|coord| Square::new(coord, pieces[coord])),
            history,
            captured_white: Vec::new(),
            captured_black: Vec::new(),
        }
    }
    pub fn history(&self) -> &[PlayedMove] {
        &self.history
    }
    pub fn captured(&self, color: Color) -> &[Piece] {
        match color {
            Color::White => &self.captured_white,
            Color::Black => &self.captured_black,
        }
    }
    /// The occupants alone, without tints or bookkeeping. Two boards that
    /// compare equal here have the same position for repetition purposes,
    /// since `moved` flags only ever change on kings and rooks.
    pub fn position(&self) -> Grid<Option<Piece>> {
        Grid::from_fn(|coord| self[coord].piece())
    }
    /// A stable copy for the view layer to render from.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            pieces: self.position(),
            captured_white: self.captured_white.clone(),
            captured_black: self.captured_black.clone(),
        }
    }
    pub fn piece_at(&self, position: Coord) -> Option<Piece> {
        self[position].piece()
    }
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Coord, Piece)> + '_ {
        self.squares.positioned().filter_map(move |(coord, square)| {
            let piece = square.piece()?;
            (piece.color == color).then_some((coord, piece))
        })
    }
    pub fn king(&self, color: Color) -> Option<Coord> {
        self.pieces(color)
            .find(|(_, piece)| piece.kind == PieceKind::King)
            .map(|(coord, _)| coord)
    }
    /// The square a pawn may capture onto en passant, derived from the
    /// last entry of the history. The window is a single move wide.
    pub fn en_passant_target(&self) -> Option<Coord> {
        let last = self.history.last()?;
        let movement = last.destination - last.origin;
        (last.piece.kind == PieceKind::Pawn && movement.y.unsigned_abs() == 2).then(|| {
            Coord::new(
                last.origin.x(),
                (last.origin.y() + last.destination.y()) / 2,
            )
        })
    }

    fn clear_line(&self, origin: Coord, target: Coord) -> bool {
        origin
            .between(target)
            .is_some_and(|mut path| path.all(|coord| self[coord].is_empty()))
    }
    /// Whether `piece` standing on `origin` bears on `target`, counting
    /// attacks only. Pawn pushes and castling never threaten a square, so
    /// they are absent here and handled in [`Board::can_move`].
    fn reaches(&self, origin: Coord, piece: Piece, target: Coord) -> bool {
        let movement = target - origin;
        match piece.kind {
            PieceKind::Pawn => movement.is_pawn_attack(piece.color),
            PieceKind::Knight => movement.is_knight_move(),
            PieceKind::King => movement.is_king_move(),
            PieceKind::Rook => {
                (movement.x == 0 || movement.y == 0) && self.clear_line(origin, target)
            }
            PieceKind::Bishop => {
                movement.x.unsigned_abs() == movement.y.unsigned_abs()
                    && self.clear_line(origin, target)
            }
            PieceKind::Queen => self.clear_line(origin, target),
        }
    }
    pub fn attackers(&self, position: Coord, by: Color) -> impl Iterator<Item = Coord> + '_ {
        self.pieces(by)
            .filter(move |(origin, piece)| self.reaches(*origin, *piece, position))
            .map(|(origin, _)| origin)
    }
    pub fn is_attacked_by(&self, position: Coord, by: Color) -> bool {
        self.attackers(position, by).next().is_some()
    }
    pub fn in_check(&self, color: Color) -> bool {
        self.king(color)
            .is_some_and(|king| self.is_attacked_by(king, !color))
    }
    /// `None` when `color` is not in check. Against a single attacker,
    /// the squares where interposing or capturing lifts the check; against
    /// two or more, an empty list, since only the king can move then.
    pub fn defensible_squares(&self, color: Color) -> Option<Vec<Coord>> {
        let king = self.king(color)?;
        let mut attackers = self.attackers(king, !color);
        let first = attackers.next()?;
        if attackers.next().is_some() {
            return Some(Vec::new());
        }
        let mut squares: Vec<_> = king.between(first).into_iter().flatten().collect();
        squares.push(first);
        Some(squares)
    }

    fn castling_reach(&self, origin: Coord, target: Coord, piece: Piece) -> bool {
        let movement = target - origin;
        if piece.moved || movement.y != 0 || movement.x.unsigned_abs() != 2 {
            return false;
        }
        let home = home_rank(piece.color);
        if origin.y() != home {
            return false;
        }
        let corner = Coord::new(if movement.x < 0 { 0 } else { 7 }, home);
        let has_rook = self[corner].piece().is_some_and(|rook| {
            rook.kind == PieceKind::Rook && rook.color == piece.color && !rook.moved
        });
        // Every square between king and rook must be empty, which also
        // covers the knight square on the long side.
        if !has_rook || !self.clear_line(origin, corner) {
            return false;
        }
        let Some(crossed) = origin.move_by(movement.as_unit()) else {
            return false;
        };
        let enemy = !piece.color;
        !self.is_attacked_by(origin, enemy)
            && !self.is_attacked_by(crossed, enemy)
            && !self.is_attacked_by(target, enemy)
    }
    /// Raw movement legality: shape, path, and capture rules, without
    /// asking whether the mover's king ends up safe.
    pub fn can_move(&self, origin: Coord, target: Coord) -> bool {
        let Some(piece) = self[origin].piece() else {
            return false;
        };
        if origin == target || self[target].holds_friend_of(piece.color) {
            return false;
        }
        let movement = target - origin;
        match piece.kind {
            PieceKind::Pawn => {
                if movement == Vector::pawn_single_move(piece.color) {
                    self[target].is_empty()
                } else if movement == Vector::pawn_double_move(piece.color) {
                    origin.y() == pawn_home_rank(piece.color)
                        && self[target].is_empty()
                        && origin
                            .move_by(Vector::pawn_single_move(piece.color))
                            .is_some_and(|step| self[step].is_empty())
                } else if movement.is_pawn_attack(piece.color) {
                    self[target].holds_enemy_of(piece.color)
                        || (self.en_passant_target() == Some(target)
                            && self[Coord::new(target.x(), origin.y())]
                                .holds_enemy_of(piece.color))
                } else {
                    false
                }
            }
            PieceKind::King => {
                movement.is_king_move() || self.castling_reach(origin, target, piece)
            }
            _ => self.reaches(origin, piece, target),
        }
    }
    /// Full legality: the move is possible and leaves the mover's own
    /// king out of check, established by playing it out on a copy.
    pub fn is_legal(&self, origin: Coord, target: Coord) -> bool {
        let Some(piece) = self[origin].piece() else {
            return false;
        };
        if !self.can_move(origin, target) {
            return false;
        }
        let mut preview = self.clone();
        preview.apply_effects(origin, target);
        !preview.in_check(piece.color)
    }
    pub fn has_any_legal_move(&self, color: Color) -> bool {
        self.pieces(color)
            .any(|(origin, _)| all_coords().any(|target| self.is_legal(origin, target)))
    }
    pub fn legal_targets(&self, origin: Coord) -> Vec<Coord> {
        all_coords()
            .filter(|target| self.is_legal(origin, *target))
            .collect()
    }

    /// Executes the move's effects without any legality check, in a fixed
    /// order: rook relocation when castling, en passant victim removal,
    /// `moved` latch, capture bookkeeping, then the rebind and the history
    /// entry. Captured kings are never listed as lost.
    pub(crate) fn apply_effects(&mut self, origin: Coord, target: Coord) -> Option<MoveOutcome> {
        let mut piece = self.squares[origin].piece()?;
        let played = PlayedMove {
            piece,
            origin,
            destination: target,
        };
        let movement = target - origin;
        if piece.kind == PieceKind::King && movement.y == 0 && movement.x.unsigned_abs() == 2 {
            let corner = Coord::new(if movement.x < 0 { 0 } else { 7 }, origin.y());
            let beside = Coord::new(
                target.x().wrapping_add_signed(-movement.x.signum()),
                origin.y(),
            );
            if let Some(mut rook) = self.squares[corner].take() {
                rook.moved = true;
                self.squares[beside].place(rook);
            }
        }
        let mut victim = None;
        if piece.kind == PieceKind::Pawn && movement.x != 0 && self[target].is_empty() {
            victim = self.squares[Coord::new(target.x(), origin.y())].take();
        }
        if matches!(piece.kind, PieceKind::King | PieceKind::Rook) {
            piece.moved = true;
        }
        let captured = victim.or_else(|| self.squares[target].take());
        if let Some(captured) = captured.filter(|captured| captured.kind != PieceKind::King) {
            match captured.color {
                Color::White => self.captured_white.push(captured),
                Color::Black => self.captured_black.push(captured),
            }
        }
        self.squares[origin].take();
        self.squares[target].place(piece);
        self.history.push(played);
        Some(MoveOutcome {
            captured,
            pawn_move: piece.kind == PieceKind::Pawn,
        })
    }
    /// Plays the move when it is legal and reports whether it was. An
    /// illegal request leaves the board untouched.
    pub fn apply_move(&mut self, origin: Coord, target: Coord) -> bool {
        if self.is_legal(origin, target) {
            self.apply_effects(origin, target);
            true
        } else {
            false
        }
    }
    /// Replaces a pawn that reached its last rank. Only queens and
    /// knights are accepted as replacements.
    pub fn promote(&mut self, position: Coord, kind: PieceKind) -> Result<(), PromotionError> {
        if !PieceKind::PROMOTION_CHOICES.contains(&kind) {
            return Err(PromotionError::InvalidKind(kind));
        }
        let pawn = self.squares[position]
            .piece_mut()
            .filter(|pawn| pawn.kind == PieceKind::Pawn && position.y() == promotion_rank(pawn.color));
        let Some(pawn) = pawn else {
            return Err(PromotionError::NothingPending);
        };
        pawn.kind = kind;
        Ok(())
    }

    /// Neither side can possibly deliver mate: bare kings, a lone minor
    /// piece, or opposite bishops on the same tint.
    pub fn is_dead(&self) -> bool {
        let mut remaining = self.squares.positioned().filter_map(|(coord, square)| {
            let piece = square.piece()?;
            (piece.kind != PieceKind::King).then_some((coord, piece))
        });
        match (remaining.next(), remaining.next(), remaining.next()) {
            (None, ..) => true,
            (Some((_, piece)), None, _) => {
                matches!(piece.kind, PieceKind::Bishop | PieceKind::Knight)
            }
            (Some((first, a)), Some((second, b)), None) => {
                a.kind == PieceKind::Bishop
                    && b.kind == PieceKind::Bishop
                    && a.color != b.color
                    && first.tint() == second.tint()
            }
            _ => false,
        }
    }
    /// Sanity checks for externally supplied positions. `player` is the
    /// side to move; the side that just moved must not have been left in
    /// check.
    pub fn validate(&self, player: Color) -> Result<(), InvalidBoard> {
        for color in [Color::White, Color::Black] {
            let mut kings = self
                .pieces(color)
                .filter(|(_, piece)| piece.kind == PieceKind::King);
            if kings.next().is_none() {
                return Err(InvalidBoard::NoKing(color));
            }
            if kings.next().is_some() {
                return Err(InvalidBoard::TooManyKings(color));
            }
        }
        if self.in_check(!player) {
            return Err(InvalidBoard::NonPlayerInCheck(!player));
        }
        for (coord, square) in self.squares.positioned() {
            if square.piece().is_some_and(|piece| piece.kind == PieceKind::Pawn)
                && (coord.y() == 0 || coord.y() == 7)
            {
                return Err(InvalidBoard::PawnOnBackRank(coord));
            }
        }
        Ok(())
    }
}
impl Index<Coord> for Board {
    type Output = Square;

    fn index(&self, index: Coord) -> &Self::Output {
        &self.squares[index]
    }
}
impl IndexableBoard for Board {
    fn piece_on(&self, position: Coord) -> Option<Piece> {
        self[position].piece()
    }
}

/// An immutable copy of the visible game state, detached from the live
/// board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub pieces: Grid<Option<Piece>>,
    pub captured_white: Vec<Piece>,
    pub captured_black: Vec<Piece>,
}
impl IndexableBoard for Snapshot {
    fn piece_on(&self, position: Coord) -> Option<Piece> {
        self.pieces[position]
    }
}
