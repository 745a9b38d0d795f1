//! Error types shared by the simulation core.
//!
//! None of these ever reach the player as a crash: a bad answer is just a
//! wrong answer, and config/map problems are reported before the game starts.

use thiserror::Error;

/// Problems found while loading or validating a [`crate::GameConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("`{field}` must be positive (got {value})")]
    NotPositive { field: &'static str, value: f64 },
    #[error("`{field}` must not be negative (got {value})")]
    Negative { field: &'static str, value: f64 },
    #[error("map must be at least 1x1 tiles (got {width}x{height})")]
    EmptyMap { width: usize, height: usize },
    #[error("map of {width}x{height} tiles is too large")]
    MapTooLarge { width: usize, height: usize },
    #[error("NPC roster is empty")]
    NoNpcs,
    #[error("NPC `{name}` is outside the map at ({x}, {y})")]
    NpcOutOfBounds { name: String, x: f64, y: f64 },
}

/// A map could not be built: bad fixed layout, or too many tiles.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    #[error("layout has no rows")]
    Empty,
    #[error("layout row {row} has {found} tiles, expected {expected}")]
    Ragged { row: usize, expected: usize, found: usize },
    #[error("unknown terrain glyph {glyph:?} at row {row}, column {col}")]
    UnknownGlyph { glyph: char, row: usize, col: usize },
    #[error("map of {width}x{height} tiles is too large")]
    TooLarge { width: usize, height: usize },
}

/// The operands of a question do not yield an exact integer answer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuestionError {
    #[error("{a} {op} {b} does not divide evenly")]
    Inexact { a: i64, op: char, b: i64 },
    #[error("{a} {op} {b} divides by zero")]
    DivisionByZero { a: i64, op: char, b: i64 },
    #[error("{a} {op} {b} overflows")]
    Overflow { a: i64, op: char, b: i64 },
}

/// Why a typed answer could not be read as a number.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnswerError {
    #[error("no answer given")]
    Empty,
    #[error("character {0:?} is not allowed")]
    Disallowed(char),
    #[error("unexpected {found} at position {pos}")]
    Unexpected { pos: usize, found: String },
    #[error("division by zero")]
    DivisionByZero,
    #[error("number too large")]
    Overflow,
}

/// Anything that stops a [`crate::Game`] from being built.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid map: {0}")]
    Map(#[from] MapError),
}
