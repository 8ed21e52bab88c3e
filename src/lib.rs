//! Vimaze library crate: re-exports all modules for integration testing.
//!
//! The binary crate (`main.rs`) is the windowed entry point. Everything a
//! headless test needs (maze generation, the cursor and status state
//! machines, scoring) lives here and runs without a window or GPU.

pub mod shared;
pub mod config;
pub mod maze;
pub mod cursor;
pub mod status;
pub mod score;
pub mod input;
pub mod render;
pub mod ui;
