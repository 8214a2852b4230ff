#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]

//! A chess rules engine. [`game::Game`] enforces turn order and tracks
//! the outcome, [`board::Board`] answers movement and attack questions,
//! and [`fen::Fen`] bridges positions to Forsyth-Edwards Notation.
//! Illegal move requests are answered with `false` rather than errors;
//! only contract violations, like promoting to a king, are loud.

pub mod board;
pub mod board_display;
pub mod color;
pub mod coord;
pub mod end_state;
pub mod error;
pub mod fen;
pub mod game;
pub mod grid;
pub mod piece;
pub mod square;
