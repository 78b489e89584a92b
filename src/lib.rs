//! Gravwell — a 2D gravity-slingshot navigation game.
//!
//! Launch a ship from the bottom of the arena and thread it through the
//! overlapping gravity wells of fixed planets to reach the goal strip along
//! the top edge, on a finite fuel budget.

pub mod arena;
pub mod audio;
pub mod config;
pub mod constants;
pub mod error;
pub mod graphics;
pub mod hud;
pub mod level;
pub mod menu;
pub mod planet;
pub mod ship;
pub mod simulation;
