use crate::{color::Color, coord::Coord, piece::Piece};

/// One board square. The coordinates and checkerboard tint never change
/// after construction; only the occupant does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Square {
    coord: Coord,
    tint: Color,
    occupant: Option<Piece>,
}
impl Square {
    pub fn new(coord: Coord, occupant: Option<Piece>) -> Self {
        Square {
            coord,
            tint: coord.tint(),
            occupant,
        }
    }
    pub fn coord(self) -> Coord {
        self.coord
    }
    pub fn tint(self) -> Color {
        self.tint
    }
    pub fn piece(self) -> Option<Piece> {
        self.occupant
    }
    pub fn is_empty(self) -> bool {
        self.occupant.is_none()
    }
    pub fn holds_enemy_of(self, color: Color) -> bool {
        self.occupant.is_some_and(|piece| piece.color != color)
    }
    pub fn holds_friend_of(self, color: Color) -> bool {
        self.occupant.is_some_and(|piece| piece.color == color)
    }
    pub(crate) fn place(&mut self, piece: Piece) {
        self.occupant = Some(piece);
    }
    pub(crate) fn take(&mut self) -> Option<Piece> {
        self.occupant.take()
    }
    pub(crate) fn piece_mut(&mut self) -> Option<&mut Piece> {
        self.occupant.as_mut()
    }
}
