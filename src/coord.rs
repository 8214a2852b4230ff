use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    ops::{Mul, Sub},
    str::FromStr,
};

use crate::color::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseCoordError {
    InvalidFile(char),
    InvalidRank(char),
    NotEnoughCharacters(u8),
    Unexpected(char),
}
impl Display for ParseCoordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ParseCoordError::InvalidFile(c) => write!(
                f,
                "found `{c}`, characters from `a` to `h` were expected instead"
            )?,
            ParseCoordError::InvalidRank(c) => write!(
                f,
                "found `{c}`, characters from `1` to `8` were expected instead"
            )?,
            ParseCoordError::NotEnoughCharacters(len) => write!(
                f,
                "provided string have length of {len} characters, 2 were expected"
            )?,
            ParseCoordError::Unexpected(c) => write!(f, "unexpected `{c}`")?,
        }
        Ok(())
    }
}
impl Error for ParseCoordError {}

/// A board position. `x` is the file (0 for the a-file), `y` is the row
/// counted from the top of the board, so `y == 0` is rank 8 where black
/// starts and `y == 7` is rank 1 where white starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coord {
    x: u8,
    y: u8,
}
impl Coord {
    pub const fn new(x: u8, y: u8) -> Self {
        assert!(x < 8);
        assert!(y < 8);
        Coord { x, y }
    }
    pub fn new_checked(x: u8, y: u8) -> Option<Self> {
        if x < 8 && y < 8 {
            Some(Coord { x, y })
        } else {
            None
        }
    }
    /// Const parser behind the `coord!` macro, e.g. `Coord::from_name("e4")`.
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        assert!(bytes.len() == 2, "square names have 2 characters");
        assert!(bytes[0] >= b'a' && bytes[0] <= b'h');
        assert!(bytes[1] >= b'1' && bytes[1] <= b'8');
        Coord::new(bytes[0] - b'a', 7 - (bytes[1] - b'1'))
    }
    pub fn from_chars(x: char, y: char) -> Result<Self, ParseCoordError> {
        let x = match x {
            'a'..='h' => x as u8 - b'a',
            _ => return Err(ParseCoordError::InvalidFile(x)),
        };
        let y = match y {
            '1'..='8' => 7 - (y as u8 - b'1'),
            _ => return Err(ParseCoordError::InvalidRank(y)),
        };
        Ok(Coord::new(x, y))
    }
    pub fn x(self) -> u8 {
        self.x
    }
    pub fn y(self) -> u8 {
        self.y
    }
    pub fn move_by(self, movement: Vector) -> Option<Self> {
        Self::new_checked(
            self.x.checked_add_signed(movement.x)?,
            self.y.checked_add_signed(movement.y)?,
        )
    }
    /// Squares reached by repeating `direction`, excluding `self`, until
    /// the edge of the board.
    pub fn steps(self, direction: Vector) -> impl Iterator<Item = Self> {
        debug_assert_ne!(direction, Vector::ZERO);
        (1..).map_while(move |distance| self.move_by(direction * distance))
    }
    /// The squares strictly between `self` and `other`, or `None` when the
    /// two are not on a common rank, file, or diagonal. Adjacent squares
    /// yield an empty iterator.
    pub fn between(self, other: Self) -> Option<impl Iterator<Item = Self>> {
        let difference = other - self;
        let direction = difference.as_unit();
        if difference != Vector::ZERO && difference.is_aligned(direction) {
            Some(self.steps(direction).take_while(move |step| *step != other))
        } else {
            None
        }
    }
    /// Checkerboard tint of this square; a8 is a light square.
    pub fn tint(self) -> Color {
        match (self.x + self.y) % 2 {
            0 => Color::White,
            1 => Color::Black,
            _ => unreachable!(),
        }
    }
}
/// Every square of the board, top row first.
pub fn all_coords() -> impl Iterator<Item = Coord> {
    (0..8).flat_map(|y| (0..8).map(move |x| Coord::new(x, y)))
}
pub fn home_rank(color: Color) -> u8 {
    match color {
        Color::White => 7,
        Color::Black => 0,
    }
}
pub fn pawn_home_rank(color: Color) -> u8 {
    match color {
        Color::White => 6,
        Color::Black => 1,
    }
}
pub fn promotion_rank(color: Color) -> u8 {
    match color {
        Color::White => 0,
        Color::Black => 7,
    }
}
pub fn pawn_direction(color: Color) -> i8 {
    match color {
        Color::White => -1,
        Color::Black => 1,
    }
}
impl Display for Coord {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let x = (self.x + b'a') as char;
        let y = 8 - self.y;
        write!(f, "{x}{y}")?;
        Ok(())
    }
}
impl FromStr for Coord {
    type Err = ParseCoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let Some(x) = chars.next() else {
            return Err(ParseCoordError::NotEnoughCharacters(0));
        };
        let Some(y) = chars.next() else {
            return Err(ParseCoordError::NotEnoughCharacters(1));
        };
        if let Some(c) = chars.next() {
            return Err(ParseCoordError::Unexpected(c));
        }
        Coord::from_chars(x, y)
    }
}
impl Sub<Self> for Coord {
    type Output = Vector;

    fn sub(self, rhs: Self) -> Self::Output {
        Vector {
            x: <i8>::try_from(self.x).unwrap() - <i8>::try_from(rhs.x).unwrap(),
            y: <i8>::try_from(self.y).unwrap() - <i8>::try_from(rhs.y).unwrap(),
        }
    }
}
#[macro_export]
macro_rules! coord {
    ($name:literal) => {
        $crate::coord::Coord::from_name($name)
    };
}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Vector {
    pub x: i8,
    pub y: i8,
}
impl Vector {
    pub const ZERO: Self = Vector { x: 0, y: 0 };

    pub fn pawn_single_move(color: Color) -> Self {
        Vector {
            x: 0,
            y: pawn_direction(color),
        }
    }
    pub fn pawn_double_move(color: Color) -> Self {
        Vector::pawn_single_move(color) * 2
    }
    pub fn is_aligned(self, other: Self) -> bool {
        self.as_unit() == other.as_unit() && self.x * other.y == other.x * self.y
    }
    pub fn is_king_move(self) -> bool {
        (-1..=1).contains(&self.x) && (-1..=1).contains(&self.y) && self != Vector::ZERO
    }
    pub fn is_knight_move(self) -> bool {
        let x = self.x.unsigned_abs();
        let y = self.y.unsigned_abs();
        (x == 1 && y == 2) || (x == 2 && y == 1)
    }
    pub fn is_pawn_attack(self, color: Color) -> bool {
        self.x.unsigned_abs() == 1 && self.y == pawn_direction(color)
    }
    pub fn as_unit(self) -> Self {
        Vector {
            x: self.x.signum(),
            y: self.y.signum(),
        }
    }
}
impl Mul<i8> for Vector {
    type Output = Vector;

    fn mul(self, rhs: i8) -> Self::Output {
        Vector {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}
#[cfg(test)]
mod test {
    use crate::{
        color::Color,
        coord,
        coord::{Coord, Vector},
    };

    #[test]
    fn between_adjacent_squares_is_empty() {
        let mut between = coord!("e4").between(coord!("e5")).unwrap();
        assert_eq!(between.next(), None);
    }
    #[test]
    fn between_spans_the_diagonal() {
        let between: Vec<_> = coord!("c1").between(coord!("f4")).unwrap().collect();
        assert_eq!(between, [coord!("d2"), coord!("e3")]);
    }
    #[test]
    fn knight_offsets_are_not_aligned() {
        assert!(coord!("b1").between(coord!("c3")).is_none());
    }
    #[test]
    fn name_round_trip() {
        let position: Coord = "g5".parse().unwrap();
        assert_eq!(position, coord!("g5"));
        assert_eq!(position.to_string(), "g5");
    }
    #[test]
    fn tint_alternates() {
        assert_eq!(coord!("a8").tint(), Color::White);
        assert_eq!(coord!("b8").tint(), Color::Black);
        assert_eq!(coord!("a1").tint(), Color::Black);
        assert_eq!(coord!("h1").tint(), Color::White);
    }
    #[test]
    fn off_board_steps_stop() {
        assert_eq!(coord!("h4").steps(Vector { x: 1, y: 0 }).next(), None);
    }
}
