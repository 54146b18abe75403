use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use crate::error::PossessionError;

pub type PlayerId = u32;

/// Rating used when an attribute lookup misses outside the possession engine.
pub const NEUTRAL_RATING: u8 = 50;
pub const MAX_RATING: u8 = 99;
pub const MAX_FATIGUE: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    PG,
    SG,
    SF,
    PF,
    C,
}

impl Position {
    /// Lineup slot order.
    pub const ALL: [Position; 5] =
        [Position::PG, Position::SG, Position::SF, Position::PF, Position::C];

    pub fn slot(&self) -> usize {
        match self {
            Position::PG => 0,
            Position::SG => 1,
            Position::SF => 2,
            Position::PF => 3,
            Position::C => 4,
        }
    }

    pub fn is_guard(&self) -> bool {
        matches!(self, Position::PG | Position::SG)
    }

    pub fn is_forward(&self) -> bool {
        matches!(self, Position::SF | Position::PF)
    }

    pub fn is_big(&self) -> bool {
        matches!(self, Position::PF | Position::C)
    }

    /// Neighbouring positions a player can cover in a pinch.
    pub fn is_adjacent(&self, other: Position) -> bool {
        (self.slot() as i32 - other.slot() as i32).abs() <= 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeCategory {
    Offense,
    Defense,
    Physical,
    Mental,
}

impl AttributeCategory {
    pub const ALL: [AttributeCategory; 4] = [
        AttributeCategory::Offense,
        AttributeCategory::Defense,
        AttributeCategory::Physical,
        AttributeCategory::Mental,
    ];
}

/// Canonical attribute names, grouped by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attr {
    // Offense
    InsideScoring,
    MidRange,
    ThreePoint,
    FreeThrow,
    Passing,
    BallHandling,
    PostMoves,
    OffensiveRebound,
    // Defense
    PerimeterDefense,
    InteriorDefense,
    Steal,
    Block,
    DefensiveRebound,
    // Physical
    Speed,
    Strength,
    Vertical,
    Stamina,
    // Mental
    BasketballIq,
    Composure,
    Aggression,
    Clutch,
}

impl Attr {
    pub const ALL: [Attr; 21] = [
        Attr::InsideScoring,
        Attr::MidRange,
        Attr::ThreePoint,
        Attr::FreeThrow,
        Attr::Passing,
        Attr::BallHandling,
        Attr::PostMoves,
        Attr::OffensiveRebound,
        Attr::PerimeterDefense,
        Attr::InteriorDefense,
        Attr::Steal,
        Attr::Block,
        Attr::DefensiveRebound,
        Attr::Speed,
        Attr::Strength,
        Attr::Vertical,
        Attr::Stamina,
        Attr::BasketballIq,
        Attr::Composure,
        Attr::Aggression,
        Attr::Clutch,
    ];

    pub fn category(&self) -> AttributeCategory {
        use Attr::*;
        match self {
            InsideScoring | MidRange | ThreePoint | FreeThrow | Passing | BallHandling
            | PostMoves | OffensiveRebound => AttributeCategory::Offense,
            PerimeterDefense | InteriorDefense | Steal | Block | DefensiveRebound => {
                AttributeCategory::Defense
            }
            Speed | Strength | Vertical | Stamina => AttributeCategory::Physical,
            BasketballIq | Composure | Aggression | Clutch => AttributeCategory::Mental,
        }
    }

    pub fn of_category(category: AttributeCategory) -> impl Iterator<Item = Attr> {
        Attr::ALL.into_iter().filter(move |a| a.category() == category)
    }
}

/// Attribute ratings (0-99), one map per category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    #[serde(default)]
    pub offense: BTreeMap<Attr, u8>,
    #[serde(default)]
    pub defense: BTreeMap<Attr, u8>,
    #[serde(default)]
    pub physical: BTreeMap<Attr, u8>,
    #[serde(default)]
    pub mental: BTreeMap<Attr, u8>,
}

impl Attributes {
    /// Every attribute set to the same rating.
    pub fn uniform(rating: u8) -> Self {
        let mut attrs = Self::default();
        for attr in Attr::ALL {
            attrs.set(attr, rating);
        }
        attrs
    }

    fn map(&self, category: AttributeCategory) -> &BTreeMap<Attr, u8> {
        match category {
            AttributeCategory::Offense => &self.offense,
            AttributeCategory::Defense => &self.defense,
            AttributeCategory::Physical => &self.physical,
            AttributeCategory::Mental => &self.mental,
        }
    }

    fn map_mut(&mut self, category: AttributeCategory) -> &mut BTreeMap<Attr, u8> {
        match category {
            AttributeCategory::Offense => &mut self.offense,
            AttributeCategory::Defense => &mut self.defense,
            AttributeCategory::Physical => &mut self.physical,
            AttributeCategory::Mental => &mut self.mental,
        }
    }

    pub fn get(&self, attr: Attr) -> Option<u8> {
        self.map(attr.category()).get(&attr).copied()
    }

    /// Lookup with a neutral fallback, for non-critical consumers (ratings, UI).
    pub fn rating(&self, attr: Attr) -> u8 {
        self.get(attr).unwrap_or(NEUTRAL_RATING)
    }

    pub fn set(&mut self, attr: Attr, value: u8) {
        self.map_mut(attr.category()).insert(attr, value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Attr, u8)> + '_ {
        self.offense
            .iter()
            .chain(self.defense.iter())
            .chain(self.physical.iter())
            .chain(self.mental.iter())
            .map(|(a, v)| (*a, *v))
    }

    /// Mean of all present attributes.
    pub fn overall(&self) -> f32 {
        let (sum, count) = self.iter().fold((0u32, 0u32), |(s, c), (_, v)| (s + v as u32, c + 1));
        if count == 0 {
            return 0.0;
        }
        sum as f32 / count as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BadgeLevel {
    #[serde(rename = "bronze")]
    Bronze,
    #[serde(rename = "silver")]
    Silver,
    #[serde(rename = "gold")]
    Gold,
    #[serde(rename = "hof")]
    HallOfFame,
}

impl BadgeLevel {
    /// Scale applied to a badge definition's base effect.
    pub fn multiplier(&self) -> f32 {
        match self {
            BadgeLevel::Bronze => 1.0,
            BadgeLevel::Silver => 2.0,
            BadgeLevel::Gold => 3.0,
            BadgeLevel::HallOfFame => 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub id: String,
    pub level: BadgeLevel,
}

impl Badge {
    pub fn new(id: impl Into<String>, level: BadgeLevel) -> Self {
        Self { id: id.into(), level }
    }
}

/// Play-style weights (0-99). Higher means the player chooses the action more often.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tendencies {
    pub usage: u8,
    pub drive: u8,
    pub spot_up: u8,
    pub post_up: u8,
    pub pass: u8,
    /// Share of spot-up attempts taken from behind the arc.
    pub three_point_rate: u8,
}

impl Default for Tendencies {
    fn default() -> Self {
        Self { usage: 50, drive: 50, spot_up: 50, post_up: 30, pass: 50, three_point_rate: 40 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InjuryRisk {
    #[serde(rename = "L", alias = "low")]
    Low,
    #[serde(rename = "M", alias = "medium")]
    Medium,
    #[serde(rename = "H", alias = "high")]
    High,
}

impl Default for InjuryRisk {
    fn default() -> Self {
        InjuryRisk::Medium
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InjurySeverity {
    Minor,
    Moderate,
    Severe,
    SeasonEnding,
}

impl InjurySeverity {
    pub const ALL: [InjurySeverity; 4] = [
        InjurySeverity::Minor,
        InjurySeverity::Moderate,
        InjurySeverity::Severe,
        InjurySeverity::SeasonEnding,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InjuryType {
    AnkleSprain,
    KneeStrain,
    Hamstring,
    BackSpasm,
    WristSprain,
    Concussion,
}

impl InjuryType {
    pub const ALL: [InjuryType; 6] = [
        InjuryType::AnkleSprain,
        InjuryType::KneeStrain,
        InjuryType::Hamstring,
        InjuryType::BackSpasm,
        InjuryType::WristSprain,
        InjuryType::Concussion,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Injury {
    pub kind: InjuryType,
    pub severity: InjurySeverity,
    pub games_remaining: u16,
}

/// Running counters folded from box scores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatCounters {
    pub games: u32,
    pub minutes: f32,
    pub points: u32,
    pub offensive_rebounds: u32,
    pub defensive_rebounds: u32,
    pub assists: u32,
    pub steals: u32,
    pub blocks: u32,
    pub turnovers: u32,
    pub fouls: u32,
    pub fgm: u32,
    pub fga: u32,
    pub tpm: u32,
    pub tpa: u32,
    pub ftm: u32,
    pub fta: u32,
}

impl StatCounters {
    pub fn rebounds(&self) -> u32 {
        self.offensive_rebounds + self.defensive_rebounds
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub position: Position,
    #[serde(default)]
    pub secondary_positions: Vec<Position>,
    #[serde(default = "default_age")]
    pub age: u8,
    /// Height in inches.
    #[serde(default = "default_height")]
    pub height_in: u8,
    pub attributes: Attributes,
    #[serde(default)]
    pub badges: Vec<Badge>,
    #[serde(default)]
    pub tendencies: Tendencies,
    #[serde(default)]
    pub fatigue: f32,
    #[serde(default)]
    pub injury: Option<Injury>,
    #[serde(default)]
    pub injury_risk: InjuryRisk,
    /// Upper bound for attribute growth.
    pub potential: u8,
    #[serde(default)]
    pub season: StatCounters,
    #[serde(default)]
    pub career: StatCounters,
    /// Per-minute game scores of the most recent games, oldest first.
    #[serde(default)]
    pub recent_form: VecDeque<f32>,
    /// Fractional attribute drift not yet converted into whole points.
    #[serde(default)]
    pub evolution_progress: BTreeMap<Attr, f32>,
}

fn default_age() -> u8 {
    25
}

fn default_height() -> u8 {
    78
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, position: Position) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            secondary_positions: Vec::new(),
            age: default_age(),
            height_in: default_position_height(position),
            attributes: Attributes::uniform(NEUTRAL_RATING),
            badges: Vec::new(),
            tendencies: Tendencies::default(),
            fatigue: 0.0,
            injury: None,
            injury_risk: InjuryRisk::default(),
            potential: 75,
            season: StatCounters::default(),
            career: StatCounters::default(),
            recent_form: VecDeque::new(),
            evolution_progress: BTreeMap::new(),
        }
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_badge(mut self, id: impl Into<String>, level: BadgeLevel) -> Self {
        self.badges.push(Badge::new(id, level));
        self
    }

    pub fn with_potential(mut self, potential: u8) -> Self {
        self.potential = potential;
        self
    }

    pub fn is_injured(&self) -> bool {
        self.injury.map(|i| i.games_remaining > 0).unwrap_or(false)
    }

    /// Eligible for a lineup (not injured).
    pub fn is_available(&self) -> bool {
        !self.is_injured()
    }

    pub fn can_play(&self, position: Position) -> bool {
        self.position == position || self.secondary_positions.contains(&position)
    }

    pub fn rating(&self, attr: Attr) -> u8 {
        self.attributes.rating(attr)
    }

    /// Strict lookup used by the possession engine. Missing or out-of-range
    /// values are reported instead of silently defaulted.
    pub fn require(&self, attr: Attr) -> Result<u8, PossessionError> {
        match self.attributes.get(attr) {
            None => Err(PossessionError::MissingAttribute { player: self.id, attr }),
            Some(value) if value > MAX_RATING => {
                Err(PossessionError::InvalidAttribute { player: self.id, attr, value })
            }
            Some(value) => Ok(value),
        }
    }

    pub fn overall(&self) -> f32 {
        self.attributes.overall()
    }

    pub fn badge_level(&self, badge_id: &str) -> Option<BadgeLevel> {
        self.badges.iter().filter(|b| b.id == badge_id).map(|b| b.level).max()
    }

    pub fn set_fatigue(&mut self, value: f32) {
        self.fatigue = if value.is_finite() { value.clamp(0.0, MAX_FATIGUE) } else { MAX_FATIGUE };
    }

    pub fn add_fatigue(&mut self, delta: f32) {
        self.set_fatigue(self.fatigue + delta);
    }
}

fn default_position_height(position: Position) -> u8 {
    match position {
        Position::PG => 75,
        Position::SG => 77,
        Position::SF => 79,
        Position::PF => 81,
        Position::C => 83,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_categories_partition_all() {
        let total: usize =
            AttributeCategory::ALL.iter().map(|c| Attr::of_category(*c).count()).sum();
        assert_eq!(total, Attr::ALL.len());
        assert_eq!(Attr::ThreePoint.category(), AttributeCategory::Offense);
        assert_eq!(Attr::Block.category(), AttributeCategory::Defense);
        assert_eq!(Attr::Stamina.category(), AttributeCategory::Physical);
        assert_eq!(Attr::Clutch.category(), AttributeCategory::Mental);
    }

    #[test]
    fn test_require_reports_missing_and_out_of_range() {
        let mut player = Player::new(7, "Test", Position::SG);
        player.attributes.offense.remove(&Attr::ThreePoint);
        assert_eq!(
            player.require(Attr::ThreePoint),
            Err(PossessionError::MissingAttribute { player: 7, attr: Attr::ThreePoint })
        );
        // Non-strict lookup falls back to neutral
        assert_eq!(player.rating(Attr::ThreePoint), NEUTRAL_RATING);

        player.attributes.set(Attr::Steal, 140);
        assert!(matches!(
            player.require(Attr::Steal),
            Err(PossessionError::InvalidAttribute { value: 140, .. })
        ));
        assert_eq!(player.require(Attr::Speed), Ok(NEUTRAL_RATING));
    }

    #[test]
    fn test_badge_levels_are_ordered() {
        assert!(BadgeLevel::HallOfFame > BadgeLevel::Gold);
        assert!(BadgeLevel::Gold > BadgeLevel::Silver);
        assert!(BadgeLevel::Silver > BadgeLevel::Bronze);

        let player = Player::new(1, "Shooter", Position::SG)
            .with_badge("deadeye", BadgeLevel::Silver)
            .with_badge("deadeye", BadgeLevel::Gold);
        assert_eq!(player.badge_level("deadeye"), Some(BadgeLevel::Gold));
        assert_eq!(player.badge_level("clamps"), None);
    }

    #[test]
    fn test_fatigue_is_clamped() {
        let mut player = Player::new(1, "Runner", Position::PG);
        player.add_fatigue(150.0);
        assert_eq!(player.fatigue, MAX_FATIGUE);
        player.add_fatigue(-500.0);
        assert_eq!(player.fatigue, 0.0);
        player.set_fatigue(f32::NAN);
        assert_eq!(player.fatigue, MAX_FATIGUE);
    }

    #[test]
    fn test_injured_player_is_unavailable() {
        let mut player = Player::new(1, "Hurt", Position::C);
        assert!(player.is_available());
        player.injury = Some(Injury {
            kind: InjuryType::AnkleSprain,
            severity: InjurySeverity::Minor,
            games_remaining: 2,
        });
        assert!(!player.is_available());
    }

    #[test]
    fn test_attributes_deserialize_from_named_maps() {
        let json = r#"{
            "offense": {"three_point": 88, "mid_range": 70},
            "defense": {"steal": 60},
            "physical": {"stamina": 80},
            "mental": {"clutch": 90}
        }"#;
        let attrs: Attributes = serde_json::from_str(json).unwrap();
        assert_eq!(attrs.get(Attr::ThreePoint), Some(88));
        assert_eq!(attrs.get(Attr::Clutch), Some(90));
        assert_eq!(attrs.get(Attr::Passing), None);
    }
}
