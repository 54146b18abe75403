use serde::{Deserialize, Serialize};

use crate::badges::BadgeCatalog;
use crate::engine::config::{EvolutionConfig, SimConfig};
use crate::engine::game_sim::simulate_game;
use crate::evolution::{EvolutionEntry, PlayerEvolutionEngine};
use crate::models::{CampaignContext, GameResult, Player, PlayerId, Team, TeamId};

pub const SCHEMA_VERSION: u8 = 1;

pub mod error_codes {
    pub const INVALID_JSON: &str = "E_INVALID_JSON";
    pub const UNSUPPORTED_SCHEMA: &str = "E_UNSUPPORTED_SCHEMA";
    pub const INVALID_CONFIG: &str = "E_INVALID_CONFIG";
    pub const GAME_FAILED: &str = "E_GAME_FAILED";
    pub const SERIALIZE: &str = "E_SERIALIZE";
}

fn err_code(code: &str, message: impl std::fmt::Display) -> String {
    format!("{code}: {message}")
}

fn check_schema(version: u8) -> Result<(), String> {
    if version == SCHEMA_VERSION {
        Ok(())
    } else {
        Err(err_code(
            error_codes::UNSUPPORTED_SCHEMA,
            format!("unsupported schema version: {version}"),
        ))
    }
}

fn default_game_id() -> u64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct GameRequest {
    pub schema_version: u8,
    #[serde(default = "default_game_id")]
    pub game_id: u64,
    pub seed: u64,
    pub home_team: Team,
    pub away_team: Team,
    /// Overrides the default league rules.
    #[serde(default)]
    pub config: Option<SimConfig>,
    /// Keep the per-possession log in the response (large).
    #[serde(default)]
    pub include_play_by_play: bool,
}

#[derive(Debug, Serialize)]
pub struct GameResponse {
    pub schema_version: u8,
    pub game_id: u64,
    pub home_score: u16,
    pub away_score: u16,
    pub winner: Option<TeamId>,
    pub overtime_periods: u8,
    /// SHA-256 of the full result, play-by-play included.
    pub digest: String,
    pub result: GameResult,
}

/// Simulates one game from a JSON request. Errors come back as
/// `"<code>: <message>"`.
pub fn simulate_game_json(request_json: &str) -> Result<String, String> {
    let request: GameRequest = serde_json::from_str(request_json)
        .map_err(|e| err_code(error_codes::INVALID_JSON, e))?;
    check_schema(request.schema_version)?;

    let config = request.config.unwrap_or_default();
    config.validate().map_err(|e| err_code(error_codes::INVALID_CONFIG, e))?;

    let mut result = simulate_game(
        request.game_id,
        &request.home_team,
        &request.away_team,
        request.seed,
        &config,
        BadgeCatalog::builtin(),
    )
    .map_err(|e| err_code(error_codes::GAME_FAILED, e))?;

    let digest = result.digest().map_err(|e| err_code(error_codes::SERIALIZE, e))?;
    if !request.include_play_by_play {
        result.play_by_play.clear();
    }

    let response = GameResponse {
        schema_version: SCHEMA_VERSION,
        game_id: result.game_id,
        home_score: result.home_score,
        away_score: result.away_score,
        winner: result.winner_team(),
        overtime_periods: result.overtime_periods,
        digest,
        result,
    };
    serde_json::to_string(&response).map_err(|e| err_code(error_codes::SERIALIZE, e))
}

#[derive(Debug, Deserialize)]
pub struct EvolveWeekRequest {
    pub schema_version: u8,
    pub context: CampaignContext,
    pub players: Vec<Player>,
    #[serde(default)]
    pub config: Option<EvolutionConfig>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SkippedPlayer {
    pub player: PlayerId,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct EvolveWeekResponse {
    pub schema_version: u8,
    pub players: Vec<Player>,
    pub changes: Vec<EvolutionEntry>,
    pub skipped: Vec<SkippedPlayer>,
}

/// One weekly development step for the players in the request.
pub fn evolve_week_json(request_json: &str) -> Result<String, String> {
    let request: EvolveWeekRequest = serde_json::from_str(request_json)
        .map_err(|e| err_code(error_codes::INVALID_JSON, e))?;
    check_schema(request.schema_version)?;

    let config = request.config.unwrap_or_default();
    let mut players = request.players;
    let report = PlayerEvolutionEngine::new(&config).evolve_week(&mut players, &request.context);

    let skipped = report
        .skipped
        .iter()
        .map(|err| SkippedPlayer { player: err.player(), reason: err.to_string() })
        .collect();
    let response = EvolveWeekResponse {
        schema_version: SCHEMA_VERSION,
        players,
        changes: report.entries,
        skipped,
    };
    serde_json::to_string(&response).map_err(|e| err_code(error_codes::SERIALIZE, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_fixtures::{short_handed_team, uniform_player, uniform_team};
    use crate::models::Position;
    use serde_json::{json, Value};

    fn game_request(seed: u64) -> Value {
        json!({
            "schema_version": 1,
            "game_id": 12,
            "seed": seed,
            "home_team": uniform_team(1, "Home", 74),
            "away_team": uniform_team(2, "Away", 72),
        })
    }

    #[test]
    fn test_simulate_game_json_roundtrip() {
        let out = simulate_game_json(&game_request(9).to_string()).unwrap();
        let v: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["schema_version"], 1);
        assert_eq!(v["game_id"], 12);
        assert_ne!(v["home_score"], v["away_score"]);
        assert_eq!(v["digest"].as_str().unwrap().len(), 64);
        assert!(v["result"]["play_by_play"].as_array().unwrap().is_empty());
        assert!(!v["result"]["box_score"]["home"]["lines"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_simulate_game_json_is_deterministic() {
        let a = simulate_game_json(&game_request(3).to_string()).unwrap();
        let b = simulate_game_json(&game_request(3).to_string()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_play_by_play_opt_in() {
        let mut req = game_request(3);
        req["include_play_by_play"] = json!(true);
        let v: Value = serde_json::from_str(&simulate_game_json(&req.to_string()).unwrap()).unwrap();
        assert!(v["result"]["play_by_play"].as_array().unwrap().len() > 150);
    }

    #[test]
    fn test_error_codes() {
        let err = simulate_game_json("{not json").unwrap_err();
        assert!(err.starts_with(error_codes::INVALID_JSON));

        let mut req = game_request(1);
        req["schema_version"] = json!(7);
        let err = simulate_game_json(&req.to_string()).unwrap_err();
        assert!(err.starts_with(error_codes::UNSUPPORTED_SCHEMA));

        let mut req = game_request(1);
        req["home_team"] = json!(short_handed_team(1, "Thin"));
        let err = simulate_game_json(&req.to_string()).unwrap_err();
        assert!(err.starts_with(error_codes::GAME_FAILED), "{err}");
    }

    #[test]
    fn test_unrated_roster_is_an_error_not_a_hang() {
        let mut away = uniform_team(2, "Away", 72);
        for player in away.roster.iter_mut() {
            player.attributes = Default::default();
        }
        let mut req = game_request(1);
        req["away_team"] = json!(away);
        let err = simulate_game_json(&req.to_string()).unwrap_err();
        assert!(err.starts_with(error_codes::GAME_FAILED), "{err}");
        assert!(err.contains("player 201"), "{err}");
    }

    #[test]
    fn test_evolve_week_json_reports_skips() {
        let mut bad = uniform_player(1, "Bad", Position::PG, 60).with_potential(3);
        bad.age = 20;
        let mut good = uniform_player(2, "Good", Position::C, 60).with_potential(90);
        good.age = 19;
        let req = json!({
            "schema_version": 1,
            "context": { "season": 2025, "week": 4, "date": "2025-11-24", "seed": 5 },
            "players": [bad, good],
        });

        let v: Value = serde_json::from_str(&evolve_week_json(&req.to_string()).unwrap()).unwrap();
        let skipped: Vec<SkippedPlayer> = serde_json::from_value(v["skipped"].clone()).unwrap();
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].player, 1);
        assert!(skipped[0].reason.contains("potential"));
        assert_eq!(v["players"].as_array().unwrap().len(), 2);
    }
}
