//! Commit Quest browser client.
//!
//! Polls `/api/{owner}/{name}/state` for a gamified view of repository
//! activity (contributor heroes, a boss standing in for outstanding work, a
//! level background) and animates it on a `<canvas>` by cycling sprite-sheet
//! frames. The page calls `start_game()` once the module is initialised.

use wasm_bindgen::prelude::*;

pub mod anim;
pub mod config;
pub mod error;
pub mod fetch;
pub mod game;
pub mod reconcile;
pub mod render;
pub mod snapshot;
pub mod sprite;

pub use config::{GameConfig, Layout, RetentionPolicy};
pub use error::GameError;
pub use game::GameLoop;
pub use reconcile::{ReconcileReport, SceneState};
pub use snapshot::{Snapshot, SnapshotCell};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    run(GameConfig::default())
}

/// Same as `start_game` with a JSON object overriding any subset of
/// [`GameConfig`] (e.g. `{"fetch_interval_ms": 5000, "retention": "prune"}`).
#[wasm_bindgen]
pub fn start_game_with_config(json: &str) -> Result<(), JsValue> {
    run(GameConfig::from_json(json)?)
}

fn run(config: GameConfig) -> Result<(), JsValue> {
    // A second start on the same page keeps the first logger.
    let _ = console_log::init_with_level(config.log_level());
    game::start(config)?;
    Ok(())
}
