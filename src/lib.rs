//! Letter Rain core crate.
//!
//! Colored letter tiles fall down a canvas; pressing a letter clears the tiles carrying
//! it. Clearing two or more at once scores a point, clearing a lone tile or missing
//! costs two. Fall speed grows with the score. The run is won at the win score and lost
//! as soon as any tile reaches the floor.
//!
//! The simulation (`controller`, `registry`, `tile`) is plain Rust and runs natively;
//! `web` wires it to a canvas, DOM overlays and `requestAnimationFrame`.

use wasm_bindgen::prelude::*;

pub mod config;
pub mod controller;
mod logging;
pub mod registry;
pub mod render;
pub mod tile;
mod web;

pub use config::GameConfig;
pub use controller::{GameController, Outcome, RunState, Step};
pub use registry::{KeyVerdict, Registry};
pub use render::{CanvasRenderer, Renderer, Sprite, SpriteTable, TileHandle};
pub use tile::{Color, Tile, LETTERS, PALETTE};
pub use web::{current_score, start_game, toggle_game};
#[cfg(feature = "serde_json")]
pub use web::start_game_with_config;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logging::init(log::LevelFilter::Info);
}
