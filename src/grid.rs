use std::{
    array,
    ops::{Index, IndexMut},
};

use crate::coord::Coord;

/// An 8×8 board of arbitrary per-square values, indexed by [`Coord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Grid<T>([[T; 8]; 8]);

impl<T> Grid<T> {
    pub fn from_fn(mut fill: impl FnMut(Coord) -> T) -> Self {
        Grid(array::from_fn(|y| {
            array::from_fn(|x| {
                fill(Coord::new(
                    x.try_into().unwrap(),
                    y.try_into().unwrap(),
                ))
            })
        }))
    }
    pub fn positioned(&self) -> impl Iterator<Item = (Coord, &T)> {
        (0..).zip(self.0.iter()).flat_map(|(y, row)| {
            (0..)
                .zip(row.iter())
                .map(move |(x, item)| (Coord::new(x, y), item))
        })
    }
}
impl<T: Default> Default for Grid<T> {
    fn default() -> Self {
        Grid::from_fn(|_| T::default())
    }
}
impl<T> Index<Coord> for Grid<T> {
    type Output = T;

    fn index(&self, index: Coord) -> &Self::Output {
        &self.0[index.y() as usize][index.x() as usize]
    }
}
impl<T> IndexMut<Coord> for Grid<T> {
    fn index_mut(&mut self, index: Coord) -> &mut Self::Output {
        &mut self.0[index.y() as usize][index.x() as usize]
    }
}
