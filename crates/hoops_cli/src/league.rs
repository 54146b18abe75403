//! League file loading and schedule generation.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

use hoops_core::{GameSpec, Team};

#[derive(Debug, Deserialize)]
pub struct LeagueFile {
    pub season: u16,
    /// Opening night.
    pub start_date: NaiveDate,
    pub teams: Vec<Team>,
    /// Times each pair meets at each venue.
    #[serde(default = "default_rounds")]
    pub rounds: u32,
}

fn default_rounds() -> u32 {
    1
}

impl LeagueFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading league file {}", path.display()))?;
        let league: LeagueFile = serde_json::from_str(&text)
            .with_context(|| format!("parsing league file {}", path.display()))?;
        if league.teams.len() < 2 {
            bail!("league needs at least two teams, found {}", league.teams.len());
        }
        Ok(league)
    }
}

/// Home-and-away round robin, `rounds` times over. Game ids count from 1 in
/// schedule order.
pub fn schedule(teams: &[Arc<Team>], rounds: u32) -> Vec<GameSpec> {
    let mut games = Vec::new();
    let mut game_id = 1;
    for _ in 0..rounds {
        for home in teams {
            for away in teams {
                if home.id == away.id {
                    continue;
                }
                games.push(GameSpec::new(game_id, Arc::clone(home), Arc::clone(away)));
                game_id += 1;
            }
        }
    }
    games
}
