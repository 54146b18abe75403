//! Fatigue gain on court and recovery on the bench.

use super::GameSimulator;
use crate::models::{Attr, TeamSide};

impl GameSimulator {
    /// On-court players tire in proportion to possession length, their
    /// stamina and their team's pace; everyone else recovers.
    pub(super) fn apply_fatigue(&mut self, elapsed: f32) {
        let effects = [self.effects(TeamSide::Home), self.effects(TeamSide::Away)];
        let cfg = &self.config.fatigue;
        let scale = elapsed / cfg.reference_possession_secs;

        for (idx, effects) in effects.iter().enumerate() {
            let team = &mut self.teams[idx];
            let pace_intensity = 1.0 / team.scheme.offense.pace_factor();
            let resistance = 1.0 - team.modifiers.fatigue_resistance.clamp(0.0, 1.0);

            for i in 0..team.players.len() {
                if team.is_on_court(i) {
                    let player = &team.players[i];
                    let stamina = player.rating(Attr::Stamina) as f32
                        * (1.0 + effects.modifier_for(player.id, Attr::Stamina) / 100.0);
                    let stamina_factor =
                        (1.0 + cfg.stamina_impact * (0.5 - stamina / 100.0)).max(0.1);
                    let gain =
                        cfg.gain_per_possession * scale * stamina_factor * pace_intensity * resistance;
                    team.players[i].add_fatigue(gain);
                } else {
                    team.players[i].add_fatigue(-cfg.bench_recovery * scale);
                }
            }
        }
    }

    /// Flat recovery for every player, used at breaks and timeouts.
    pub(super) fn recover_all(&mut self, amount: f32) {
        for team in self.teams.iter_mut() {
            for player in team.players.iter_mut() {
                player.add_fatigue(-amount);
            }
        }
    }

    pub(super) fn recover_on_court(&mut self, amount: f32) {
        for team in self.teams.iter_mut() {
            let on_court = team.on_court;
            for idx in on_court {
                team.players[idx].add_fatigue(-amount);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_fixtures::uniform_team;

    fn sim() -> GameSimulator {
        let home = uniform_team(1, "Home", 75);
        let away = uniform_team(2, "Away", 75);
        GameSimulator::with_defaults(1, &home, &away, 0).unwrap()
    }

    #[test]
    fn test_on_court_tires_bench_recovers() {
        let mut sim = sim();
        sim.teams[0].players[7].set_fatigue(50.0);
        sim.apply_fatigue(16.0);

        let starter = sim.teams[0].players[0].fatigue;
        // stamina 75: 2.4 * (1 + (0.5 - 0.75))
        assert!((starter - 1.8).abs() < 1e-4, "{starter}");
        assert!((sim.teams[0].players[7].fatigue - 47.8).abs() < 1e-4);
    }

    #[test]
    fn test_low_stamina_tires_faster() {
        let mut sim = sim();
        sim.teams[0].players[0].attributes.set(Attr::Stamina, 40);
        sim.apply_fatigue(16.0);
        assert!(sim.teams[0].players[0].fatigue > sim.teams[0].players[1].fatigue);
    }

    #[test]
    fn test_recovery_never_goes_negative() {
        let mut sim = sim();
        sim.recover_all(30.0);
        assert!(sim.teams.iter().all(|t| t.players.iter().all(|p| p.fatigue == 0.0)));
    }
}
