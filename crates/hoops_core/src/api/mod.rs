//! JSON entry points for hosts that don't link the Rust types directly.

pub mod json_api;

pub use json_api::{
    error_codes, evolve_week_json, simulate_game_json, EvolveWeekRequest, EvolveWeekResponse,
    GameRequest, GameResponse, SkippedPlayer, SCHEMA_VERSION,
};
