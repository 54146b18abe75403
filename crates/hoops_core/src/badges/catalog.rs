//! Static badge and synergy tables.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::ConfigError;
use crate::models::{Attr, BadgeLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeCategory {
    Shooting,
    Finishing,
    Playmaking,
    Defense,
    Rebounding,
    Physical,
    Mental,
}

/// Percent bonus on one attribute per badge level (bronze 1x .. hof 4x).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BadgeEffect {
    pub target: Attr,
    pub percent_per_level: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BadgeDefinition {
    pub id: String,
    pub name: String,
    pub category: BadgeCategory,
    #[serde(default)]
    pub effects: Vec<BadgeEffect>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynergyScope {
    /// Bonus goes to the two participants.
    Player,
    /// Bonus goes to every on-court teammate.
    Team,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BadgeRequirement {
    pub badge: String,
    pub min_level: BadgeLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SynergyEffect {
    pub target: Attr,
    pub percent: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BadgeSynergy {
    pub id: String,
    pub name: String,
    pub badge_a: BadgeRequirement,
    pub badge_b: BadgeRequirement,
    pub effects: Vec<SynergyEffect>,
    pub scope: SynergyScope,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    badges: Vec<BadgeDefinition>,
    #[serde(default)]
    synergies: Vec<BadgeSynergy>,
}

/// Immutable catalog, built once and shared.
#[derive(Debug, Clone, Default)]
pub struct BadgeCatalog {
    badges: HashMap<String, BadgeDefinition>,
    synergies: Vec<BadgeSynergy>,
}

static BUILTIN: Lazy<Arc<BadgeCatalog>> = Lazy::new(|| Arc::new(builtin_catalog()));

impl BadgeCatalog {
    /// Shared built-in catalog.
    pub fn builtin() -> Arc<BadgeCatalog> {
        Arc::clone(&BUILTIN)
    }

    pub fn new(
        badges: Vec<BadgeDefinition>,
        synergies: Vec<BadgeSynergy>,
    ) -> Result<Self, ConfigError> {
        let mut map = HashMap::with_capacity(badges.len());
        for def in badges {
            if map.contains_key(&def.id) {
                return Err(ConfigError::DuplicateBadge(def.id));
            }
            map.insert(def.id.clone(), def);
        }

        let mut synergy_ids = HashSet::with_capacity(synergies.len());
        for syn in &synergies {
            if !synergy_ids.insert(syn.id.as_str()) {
                return Err(ConfigError::DuplicateBadge(syn.id.clone()));
            }
            for req in [&syn.badge_a, &syn.badge_b] {
                if !map.contains_key(&req.badge) {
                    return Err(ConfigError::UnknownBadge {
                        synergy: syn.id.clone(),
                        badge: req.badge.clone(),
                    });
                }
            }
        }

        Ok(Self { badges: map, synergies })
    }

    /// Parses `{"badges": [...], "synergies": [...]}`.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::new(file.badges, file.synergies)
    }

    pub fn badge(&self, id: &str) -> Option<&BadgeDefinition> {
        self.badges.get(id)
    }

    pub fn synergies(&self) -> &[BadgeSynergy] {
        &self.synergies
    }

    pub fn synergy(&self, id: &str) -> Option<&BadgeSynergy> {
        self.synergies.iter().find(|s| s.id == id)
    }

    pub fn badge_count(&self) -> usize {
        self.badges.len()
    }
}

fn badge(id: &str, name: &str, category: BadgeCategory, effects: &[(Attr, f32)]) -> BadgeDefinition {
    BadgeDefinition {
        id: id.to_string(),
        name: name.to_string(),
        category,
        effects: effects
            .iter()
            .map(|(target, pct)| BadgeEffect { target: *target, percent_per_level: *pct })
            .collect(),
    }
}

fn synergy(
    id: &str,
    name: &str,
    a: (&str, BadgeLevel),
    b: (&str, BadgeLevel),
    effects: &[(Attr, f32)],
    scope: SynergyScope,
) -> BadgeSynergy {
    BadgeSynergy {
        id: id.to_string(),
        name: name.to_string(),
        badge_a: BadgeRequirement { badge: a.0.to_string(), min_level: a.1 },
        badge_b: BadgeRequirement { badge: b.0.to_string(), min_level: b.1 },
        effects: effects
            .iter()
            .map(|(target, percent)| SynergyEffect { target: *target, percent: *percent })
            .collect(),
        scope,
    }
}

fn builtin_catalog() -> BadgeCatalog {
    use Attr::*;
    use BadgeCategory as C;
    use BadgeLevel::*;

    let badges = vec![
        badge("deadeye", "Deadeye", C::Shooting, &[(ThreePoint, 2.0), (MidRange, 1.0)]),
        badge("catch_and_shoot", "Catch & Shoot", C::Shooting, &[(ThreePoint, 1.5)]),
        badge("posterizer", "Posterizer", C::Finishing, &[(InsideScoring, 2.5)]),
        badge("rim_runner", "Rim Runner", C::Finishing, &[(InsideScoring, 1.5), (Speed, 1.0)]),
        badge("post_scorer", "Post Scorer", C::Finishing, &[(PostMoves, 2.5)]),
        badge("floor_general", "Floor General", C::Playmaking, &[(Passing, 2.0), (BasketballIq, 1.5)]),
        badge(
            "pick_and_roll_maestro",
            "Pick & Roll Maestro",
            C::Playmaking,
            &[(Passing, 1.5), (BallHandling, 1.5)],
        ),
        badge("clamps", "Clamps", C::Defense, &[(PerimeterDefense, 2.5)]),
        badge("rim_protector", "Rim Protector", C::Defense, &[(Block, 2.5), (InteriorDefense, 1.5)]),
        badge("interceptor", "Interceptor", C::Defense, &[(Steal, 2.5)]),
        badge(
            "glass_cleaner",
            "Glass Cleaner",
            C::Rebounding,
            &[(DefensiveRebound, 2.0), (OffensiveRebound, 2.0)],
        ),
        badge("tireless", "Tireless", C::Physical, &[(Stamina, 3.0)]),
        badge("clutch_performer", "Clutch Performer", C::Mental, &[(Clutch, 3.0), (Composure, 1.5)]),
    ];

    let synergies = vec![
        synergy(
            "splash_connection",
            "Splash Connection",
            ("floor_general", Gold),
            ("deadeye", Gold),
            &[(ThreePoint, 8.0)],
            SynergyScope::Player,
        ),
        synergy(
            "pick_and_roll",
            "Pick & Roll",
            ("pick_and_roll_maestro", Silver),
            ("rim_runner", Silver),
            &[(InsideScoring, 6.0), (Passing, 4.0)],
            SynergyScope::Player,
        ),
        synergy(
            "inside_out",
            "Inside Out",
            ("post_scorer", Silver),
            ("catch_and_shoot", Silver),
            &[(PostMoves, 4.0), (ThreePoint, 4.0)],
            SynergyScope::Player,
        ),
        synergy(
            "twin_towers",
            "Twin Towers",
            ("rim_protector", Gold),
            ("glass_cleaner", Silver),
            &[(Block, 5.0), (DefensiveRebound, 6.0), (InteriorDefense, 4.0)],
            SynergyScope::Team,
        ),
        synergy(
            "lockdown_duo",
            "Lockdown Duo",
            ("clamps", Gold),
            ("interceptor", Silver),
            &[(PerimeterDefense, 5.0), (Steal, 5.0)],
            SynergyScope::Team,
        ),
    ];

    // The tables above always validate
    match BadgeCatalog::new(badges, synergies) {
        Ok(catalog) => catalog,
        Err(err) => {
            tracing::error!("built-in badge catalog is invalid: {}", err);
            BadgeCatalog::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_complete() {
        let catalog = BadgeCatalog::builtin();
        assert_eq!(catalog.badge_count(), 13);
        assert_eq!(catalog.synergies().len(), 5);

        let splash = catalog.synergy("splash_connection").unwrap();
        assert_eq!(splash.badge_a.min_level, BadgeLevel::Gold);
        assert_eq!(splash.badge_b.min_level, BadgeLevel::Gold);
        assert_eq!(splash.scope, SynergyScope::Player);
    }

    #[test]
    fn test_builtin_is_shared() {
        let a = BadgeCatalog::builtin();
        let b = BadgeCatalog::builtin();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_from_json_rejects_unknown_badge() {
        let json = r#"{
            "badges": [{"id": "deadeye", "name": "Deadeye", "category": "shooting"}],
            "synergies": [{
                "id": "ghost_pair",
                "name": "Ghost Pair",
                "badge_a": {"badge": "deadeye", "min_level": "gold"},
                "badge_b": {"badge": "phantom", "min_level": "bronze"},
                "effects": [{"target": "three_point", "percent": 5.0}],
                "scope": "player"
            }]
        }"#;
        assert_eq!(
            BadgeCatalog::from_json(json).unwrap_err(),
            ConfigError::UnknownBadge { synergy: "ghost_pair".into(), badge: "phantom".into() }
        );
    }

    #[test]
    fn test_from_json_rejects_duplicate_badge() {
        let json = r#"{"badges": [
            {"id": "clamps", "name": "Clamps", "category": "defense"},
            {"id": "clamps", "name": "Clamps II", "category": "defense"}
        ]}"#;
        assert_eq!(
            BadgeCatalog::from_json(json).unwrap_err(),
            ConfigError::DuplicateBadge("clamps".into())
        );
    }

    #[test]
    fn test_from_json_accepts_custom_catalog() {
        let json = r#"{
            "badges": [
                {"id": "a", "name": "A", "category": "mental",
                 "effects": [{"target": "clutch", "percent_per_level": 1.0}]},
                {"id": "b", "name": "B", "category": "physical"}
            ],
            "synergies": [{
                "id": "ab",
                "name": "AB",
                "badge_a": {"badge": "a", "min_level": "bronze"},
                "badge_b": {"badge": "b", "min_level": "hof"},
                "effects": [{"target": "speed", "percent": 3.0}],
                "scope": "team"
            }]
        }"#;
        let catalog = BadgeCatalog::from_json(json).unwrap();
        assert_eq!(catalog.badge_count(), 2);
        assert_eq!(catalog.synergy("ab").unwrap().badge_b.min_level, BadgeLevel::HallOfFame);
    }
}
