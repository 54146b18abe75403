//! Badge modifier resolution for the five players on court.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::catalog::{BadgeCatalog, BadgeRequirement, SynergyScope};
use crate::engine::config::BadgeConfig;
use crate::models::{Attr, Player, PlayerId, ON_COURT};

/// Percentage modifiers keyed by attribute.
pub type ModifierSet = BTreeMap<Attr, f32>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivatedSynergy {
    pub id: String,
    pub players: (PlayerId, PlayerId),
    pub scope: SynergyScope,
}

/// Modifiers in force for one lineup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffects {
    pub per_player: BTreeMap<PlayerId, ModifierSet>,
    pub per_team: ModifierSet,
    pub activated: Vec<ActivatedSynergy>,
    pub ceiling_pct: f32,
}

impl ActiveEffects {
    pub fn empty(ceiling_pct: f32) -> Self {
        Self { ceiling_pct, ..Default::default() }
    }

    /// Summed percent for `player` on `attr`, capped at the ceiling in both directions.
    pub fn modifier_for(&self, player: PlayerId, attr: Attr) -> f32 {
        let individual = self
            .per_player
            .get(&player)
            .and_then(|m| m.get(&attr))
            .copied()
            .unwrap_or(0.0);
        let team = self.per_team.get(&attr).copied().unwrap_or(0.0);
        (individual + team).clamp(-self.ceiling_pct, self.ceiling_pct)
    }

    pub fn is_active(&self, synergy_id: &str) -> bool {
        self.activated.iter().any(|s| s.id == synergy_id)
    }
}

fn add(set: &mut ModifierSet, attr: Attr, pct: f32) {
    *set.entry(attr).or_insert(0.0) += pct;
}

fn qualifies(player: &Player, req: &BadgeRequirement) -> bool {
    player.badge_level(&req.badge).map(|lvl| lvl >= req.min_level).unwrap_or(false)
}

/// Pure resolver from lineup to modifiers.
pub struct BadgeSynergyEngine<'a> {
    catalog: &'a BadgeCatalog,
    ceiling_pct: f32,
    synergies_enabled: bool,
}

impl<'a> BadgeSynergyEngine<'a> {
    pub fn new(catalog: &'a BadgeCatalog, config: &BadgeConfig) -> Self {
        Self {
            catalog,
            ceiling_pct: config.ceiling_pct,
            synergies_enabled: config.synergies_enabled,
        }
    }

    pub fn with_synergies(mut self, enabled: bool) -> Self {
        self.synergies_enabled = enabled;
        self
    }

    pub fn active_effects(&self, lineup: &[&Player]) -> ActiveEffects {
        let mut effects = ActiveEffects::empty(self.ceiling_pct);

        // Individual badges
        for player in lineup {
            for badge in &player.badges {
                let Some(def) = self.catalog.badge(&badge.id) else {
                    tracing::debug!(player = player.id, badge = %badge.id, "unknown badge ignored");
                    continue;
                };
                let scale = badge.level.multiplier();
                let set = effects.per_player.entry(player.id).or_default();
                for effect in &def.effects {
                    add(set, effect.target, effect.percent_per_level * scale);
                }
            }
        }

        if !self.synergies_enabled {
            return effects;
        }

        for synergy in self.catalog.synergies() {
            let Some((a, b)) = find_pair(lineup, &synergy.badge_a, &synergy.badge_b) else {
                continue;
            };
            match synergy.scope {
                SynergyScope::Player => {
                    for id in [a, b] {
                        let set = effects.per_player.entry(id).or_default();
                        for effect in &synergy.effects {
                            add(set, effect.target, effect.percent);
                        }
                    }
                }
                SynergyScope::Team => {
                    for effect in &synergy.effects {
                        add(&mut effects.per_team, effect.target, effect.percent);
                    }
                }
            }
            effects.activated.push(ActivatedSynergy {
                id: synergy.id.clone(),
                players: (a, b),
                scope: synergy.scope,
            });
        }

        effects
    }
}

/// First pair of distinct players meeting both requirements, in lineup order.
fn find_pair(
    lineup: &[&Player],
    a: &BadgeRequirement,
    b: &BadgeRequirement,
) -> Option<(PlayerId, PlayerId)> {
    for (i, pa) in lineup.iter().enumerate() {
        if !qualifies(pa, a) {
            continue;
        }
        for (j, pb) in lineup.iter().enumerate() {
            if i != j && pa.id != pb.id && qualifies(pb, b) {
                return Some((pa.id, pb.id));
            }
        }
    }
    None
}

/// Sorted on-court ids, so the same five share a cache entry regardless of slot.
pub fn lineup_key(ids: &[PlayerId; ON_COURT]) -> [PlayerId; ON_COURT] {
    let mut key = *ids;
    key.sort_unstable();
    key
}

/// Per-game memo of resolved effects keyed by the on-court five.
#[derive(Debug, Default)]
pub struct SynergyCache {
    entries: HashMap<[PlayerId; ON_COURT], Arc<ActiveEffects>>,
    hits: u64,
    misses: u64,
}

impl SynergyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compute(
        &mut self,
        engine: &BadgeSynergyEngine<'_>,
        lineup: &[&Player; ON_COURT],
    ) -> Arc<ActiveEffects> {
        let key = lineup_key(&lineup.map(|p| p.id));
        if let Some(hit) = self.entries.get(&key) {
            self.hits += 1;
            return Arc::clone(hit);
        }
        self.misses += 1;
        let effects = Arc::new(engine.active_effects(lineup));
        self.entries.insert(key, Arc::clone(&effects));
        effects
    }

    /// Drop the entry for a lineup that just changed.
    pub fn invalidate(&mut self, ids: &[PlayerId; ON_COURT]) {
        self.entries.remove(&lineup_key(ids));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BadgeLevel, Position};

    fn lineup_players() -> Vec<Player> {
        vec![
            Player::new(1, "Guard", Position::PG).with_badge("floor_general", BadgeLevel::Gold),
            Player::new(2, "Wing", Position::SG).with_badge("deadeye", BadgeLevel::HallOfFame),
            Player::new(3, "Forward", Position::SF),
            Player::new(4, "Big", Position::PF).with_badge("glass_cleaner", BadgeLevel::Silver),
            Player::new(5, "Center", Position::C).with_badge("rim_protector", BadgeLevel::Gold),
        ]
    }

    fn engine(catalog: &BadgeCatalog) -> BadgeSynergyEngine<'_> {
        BadgeSynergyEngine::new(catalog, &BadgeConfig::default())
    }

    #[test]
    fn test_player_synergy_applies_to_both_participants() {
        let catalog = BadgeCatalog::builtin();
        let players = lineup_players();
        let refs: Vec<&Player> = players.iter().collect();
        let effects = engine(&catalog).active_effects(&refs);

        assert!(effects.is_active("splash_connection"));
        // deadeye at hof: 2.0 * 4 individual + 8 synergy
        assert!((effects.modifier_for(2, Attr::ThreePoint) - 16.0).abs() < 1e-4);
        // floor_general holder gets the synergy only
        assert!((effects.modifier_for(1, Attr::ThreePoint) - 8.0).abs() < 1e-4);
        assert_eq!(effects.modifier_for(3, Attr::ThreePoint), 0.0);
    }

    #[test]
    fn test_team_synergy_applies_to_everyone() {
        let catalog = BadgeCatalog::builtin();
        let players = lineup_players();
        let refs: Vec<&Player> = players.iter().collect();
        let effects = engine(&catalog).active_effects(&refs);

        assert!(effects.is_active("twin_towers"));
        assert!((effects.modifier_for(3, Attr::DefensiveRebound) - 6.0).abs() < 1e-4);
    }

    #[test]
    fn test_synergy_requires_both_players_on_court() {
        let catalog = BadgeCatalog::builtin();
        let players = lineup_players();
        let without_shooter: Vec<&Player> = players.iter().filter(|p| p.id != 2).collect();
        let effects = engine(&catalog).active_effects(&without_shooter);
        assert!(!effects.is_active("splash_connection"));
    }

    #[test]
    fn test_synergy_requires_distinct_players() {
        let catalog = BadgeCatalog::builtin();
        let both = Player::new(9, "Solo", Position::PG)
            .with_badge("floor_general", BadgeLevel::HallOfFame)
            .with_badge("deadeye", BadgeLevel::HallOfFame);
        let effects = engine(&catalog).active_effects(&[&both]);
        assert!(!effects.is_active("splash_connection"));
    }

    #[test]
    fn test_minimum_level_is_enforced() {
        let catalog = BadgeCatalog::builtin();
        let mut players = lineup_players();
        players[0].badges[0].level = BadgeLevel::Silver;
        let refs: Vec<&Player> = players.iter().collect();
        assert!(!engine(&catalog).active_effects(&refs).is_active("splash_connection"));
    }

    #[test]
    fn test_disabled_synergies_keep_individual_effects() {
        let catalog = BadgeCatalog::builtin();
        let players = lineup_players();
        let refs: Vec<&Player> = players.iter().collect();
        let effects = engine(&catalog).with_synergies(false).active_effects(&refs);
        assert!(effects.activated.is_empty());
        assert!((effects.modifier_for(2, Attr::ThreePoint) - 8.0).abs() < 1e-4);
    }

    #[test]
    fn test_modifiers_capped_at_ceiling() {
        let catalog = BadgeCatalog::builtin();
        let stacked = Player::new(1, "Stack", Position::SG)
            .with_badge("deadeye", BadgeLevel::HallOfFame)
            .with_badge("catch_and_shoot", BadgeLevel::HallOfFame);
        let config = BadgeConfig { ceiling_pct: 10.0, synergies_enabled: true };
        let effects = BadgeSynergyEngine::new(&catalog, &config).active_effects(&[&stacked]);
        assert_eq!(effects.modifier_for(1, Attr::ThreePoint), 10.0);
    }

    #[test]
    fn test_cache_is_keyed_by_sorted_lineup() {
        let catalog = BadgeCatalog::builtin();
        let engine = engine(&catalog);
        let players = lineup_players();
        let forward: [&Player; 5] = [&players[0], &players[1], &players[2], &players[3], &players[4]];
        let shuffled: [&Player; 5] = [&players[4], &players[2], &players[0], &players[3], &players[1]];

        let mut cache = SynergyCache::new();
        let first = cache.get_or_compute(&engine, &forward);
        let second = cache.get_or_compute(&engine, &shuffled);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.stats(), (1, 1));

        cache.invalidate(&[5, 4, 3, 2, 1]);
        let third = cache.get_or_compute(&engine, &forward);
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(*first, *third);
    }
}
