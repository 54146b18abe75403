use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Campaign state handed to the engine explicitly for each run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignContext {
    pub season: u16,
    pub week: u16,
    pub date: NaiveDate,
    /// 0 (none) to 5 (elite). Scales weekly development.
    #[serde(default = "default_facility_level")]
    pub training_facility_level: u8,
    /// Batch seed; per-game seeds are derived from it.
    #[serde(default)]
    pub seed: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standings_digest: Option<String>,
}

fn default_facility_level() -> u8 {
    1
}

pub const MAX_FACILITY_LEVEL: u8 = 5;

impl CampaignContext {
    pub fn new(season: u16, date: NaiveDate, seed: u64) -> Self {
        Self {
            season,
            week: 1,
            date,
            training_facility_level: default_facility_level(),
            seed,
            standings_digest: None,
        }
    }

    pub fn with_week(mut self, week: u16) -> Self {
        self.week = week;
        self
    }

    pub fn with_facility_level(mut self, level: u8) -> Self {
        self.training_facility_level = level.min(MAX_FACILITY_LEVEL);
        self
    }

    /// Weekly development scale from facility level: 0.8 at level 0 up to 1.3 at level 5.
    pub fn facility_multiplier(&self) -> f32 {
        0.8 + 0.1 * self.training_facility_level.min(MAX_FACILITY_LEVEL) as f32
    }
}
