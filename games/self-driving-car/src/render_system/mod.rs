//! Everything that puts pixels on the screen.

pub mod gui;
pub mod painter;
pub mod visualizer;
