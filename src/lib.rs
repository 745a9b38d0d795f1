//! Math Trails core crate.
//!
//! One reusable template for the "game of the day" arithmetic adventure: a
//! tile world, a camera that follows the player, and NPCs that quiz the
//! player when talked to. The simulation (everything except [`stage`]) is
//! plain Rust and runs natively under `cargo test`; the stage mounts it into
//! a browser page through `start_game()`.

use wasm_bindgen::prelude::*;

pub mod answer;
pub mod camera;
pub mod clock;
pub mod config;
pub mod error;
pub mod game;
pub mod geom;
pub mod input;
pub mod npc;
pub mod player;
pub mod question;
pub mod quiz;
pub mod stage;
pub mod ui;
pub mod world;

pub use config::{GameConfig, TriggerMode, WrongAnswerPolicy};
pub use error::{AnswerError, ConfigError, GameError, MapError, QuestionError};
pub use game::Game;
pub use geom::Vec2;
pub use question::{Operator, Question};
pub use quiz::{Outcome, QuizEvent, QuizState, ScoreBoard};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    stage::logger::init(log::LevelFilter::Info);
}

// -----------------------------------------------------------------------------
// Unified entrypoint
// -----------------------------------------------------------------------------

/// Start (or restart) the game in the host page. `config_json` may override
/// any [`GameConfig`] field; pass nothing for the default exploration world.
#[wasm_bindgen]
pub fn start_game(config_json: Option<String>) -> Result<(), JsValue> {
    let config = match config_json.as_deref() {
        Some(json) => GameConfig::from_json(json).map_err(|e| {
            log::warn!("rejecting game config: {e}");
            JsValue::from_str(&e.to_string())
        })?,
        None => GameConfig::default(),
    };
    stage::mount(config)
}
