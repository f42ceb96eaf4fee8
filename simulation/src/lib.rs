//! Core of the self-driving car sandbox.
//!
//! Everything in here is free of rendering and input handling, so the same world can be
//! driven by the macroquad front end or stepped headless in tests.
//!
//! # Frame Flow
//!
//! ```text
//!  key state ──► World::step ──► traffic.update(borders, [])
//!                     │
//!                     ├────────► cars.update(borders, traffic)
//!                     │              │
//!                     │              ├── move + polygon + damage
//!                     │              └── sensor ──► brain ──► controls
//!                     ▼
//!               best car (furthest ahead) ──► camera offset
//! ```
//!
//! The world uses the screen convention of the browser canvas: `y` grows downwards, so
//! driving forward means decreasing `y`.

pub mod brain_store;
pub mod car;
pub mod config;
pub mod controls;
pub mod error;
pub mod geometry;
pub mod network;
pub mod road;
pub mod sensor;
pub mod traffic;
pub mod world;
