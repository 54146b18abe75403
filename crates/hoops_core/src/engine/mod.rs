pub mod config;
pub mod deterministic;
pub mod game_sim;
pub mod possession;
pub mod probability;
pub mod stats;
pub mod test_fixtures;

pub use config::{
    BadgeConfig, BatchConfig, ClockConfig, EvolutionConfig, FatigueConfig, InjuryConfig,
    PossessionConfig, SimConfig,
};
pub use deterministic::{derive_game_seed, derive_player_seed, rng_from_seed};
pub use game_sim::{simulate_game, GameSimulator};
pub use possession::{ClockState, CourtSide, PossessionEngine};
pub use stats::{SeasonLedger, StatAggregator};
