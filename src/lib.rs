//! Threadless: a tick-based terminal chase game.
//!
//! `domain` holds the rules (entities, the movement authority, enemy AI),
//! `sim` the world and the fixed-rate loop, `ui` the surfaces the loop draws
//! on and reads input from.

pub mod config;
pub mod domain;
pub mod error;
pub mod sim;
pub mod ui;
