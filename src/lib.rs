//! Terminal snake: a fixed-tick simulation of a snake on a bounded grid,
//! drawn through crossterm.

pub mod config;
pub mod error;
pub mod geometry;
pub mod scene;
pub mod snake;
pub mod term;
