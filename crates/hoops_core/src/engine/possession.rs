//! Possession resolution.
//!
//! One call resolves one offensive sequence: ball handler, action, shot,
//! fouls and free throws, rebounds. Offensive rebounds restart the sequence
//! up to `max_offensive_rebounds` times. Nothing here mutates players; the
//! caller folds the returned [`PossessionOutcome`] into the game state.

use rand::Rng;

use super::config::SimConfig;
use super::probability::{
    block_probability, clamp_band, effective_rating, fatigue_penalty, foul_probability,
    free_throw_probability, offensive_rebound_probability, roll, shot_make_probability,
    steal_probability, turnover_probability, weighted_index,
};
use crate::badges::ActiveEffects;
use crate::error::PossessionError;
use crate::models::{
    ActionType, Attr, CoachingScheme, Play, Player, PlayerId, PossessionOutcome, PossessionResult,
    ShotKind, StatDelta, TeamSide, ON_COURT,
};

/// Clutch window at the end of regulation and overtime, in seconds.
const CLUTCH_SECS: f32 = 120.0;

/// One team's view of the floor for a single possession.
#[derive(Debug, Clone, Copy)]
pub struct CourtSide<'a> {
    pub side: TeamSide,
    /// On-court players in PG/SG/SF/PF/C slot order.
    pub players: [&'a Player; ON_COURT],
    pub effects: &'a ActiveEffects,
    pub scheme: CoachingScheme,
    /// Personal fouls per slot before this possession.
    pub personal_fouls: [u8; ON_COURT],
    /// Team fouls in the current period.
    pub team_fouls: u8,
    pub chemistry: f32,
}

impl<'a> CourtSide<'a> {
    pub fn ids(&self) -> [PlayerId; ON_COURT] {
        self.players.map(|p| p.id)
    }

    fn name_of(&self, id: PlayerId) -> Option<&'a str> {
        self.players.iter().find(|p| p.id == id).map(|p| p.name.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockState {
    pub period: u8,
    /// Seconds left in the period when the possession starts.
    pub period_remaining: f32,
    /// Sampled possession length before any shot-clock or period clamp.
    pub planned_secs: f32,
}

/// Per-possession stat rows in first-touch order.
#[derive(Debug, Default)]
struct Tally {
    rows: Vec<StatDelta>,
}

impl Tally {
    fn row(&mut self, player: PlayerId, side: TeamSide) -> &mut StatDelta {
        let idx = match self.rows.iter().position(|r| r.player == player) {
            Some(idx) => idx,
            None => {
                self.rows.push(StatDelta::new(player, side));
                self.rows.len() - 1
            }
        };
        &mut self.rows[idx]
    }

    fn fouls(&self, player: PlayerId) -> u8 {
        self.rows
            .iter()
            .find(|r| r.player == player)
            .map(|r| r.pf.min(u8::MAX as u16) as u8)
            .unwrap_or(0)
    }

    fn points(&self, side: TeamSide) -> u16 {
        self.rows.iter().filter(|r| r.side == Some(side)).map(|r| r.points).sum()
    }
}

pub struct PossessionEngine<'a> {
    config: &'a SimConfig,
}

impl<'a> PossessionEngine<'a> {
    pub fn new(config: &'a SimConfig) -> Self {
        Self { config }
    }

    /// Effective rating of the player in `slot`: badge modifiers and fatigue applied.
    fn rating(&self, side: &CourtSide<'_>, slot: usize, attr: Attr) -> Result<f32, PossessionError> {
        let player = side.players[slot];
        let base = player.require(attr)?;
        let value = effective_rating(
            base,
            side.effects.modifier_for(player.id, attr),
            player.fatigue,
            &self.config.fatigue,
        );
        if !value.is_finite() {
            return Err(PossessionError::NonFiniteProbability { context: "effective rating" });
        }
        Ok(value)
    }

    fn freshness(&self, player: &Player) -> f64 {
        (1.0 - fatigue_penalty(player.fatigue, &self.config.fatigue)) as f64
    }

    fn choose_handler<R: Rng + ?Sized>(&self, offense: &CourtSide<'_>, rng: &mut R) -> usize {
        let weights: Vec<f64> = offense
            .players
            .iter()
            .map(|p| p.tendencies.usage as f64 * self.freshness(p))
            .collect();
        weighted_index(&weights, rng)
    }

    fn choose_receiver<R: Rng + ?Sized>(
        &self,
        offense: &CourtSide<'_>,
        passer: usize,
        rng: &mut R,
    ) -> usize {
        let weights: Vec<f64> = offense
            .players
            .iter()
            .enumerate()
            .map(|(i, p)| {
                if i == passer {
                    0.0
                } else {
                    p.tendencies.usage as f64 * self.freshness(p)
                }
            })
            .collect();
        weighted_index(&weights, rng)
    }

    /// Weighted draw over drive / spot-up / post-up / pass.
    fn choose_action<R: Rng + ?Sized>(
        &self,
        offense: &CourtSide<'_>,
        defense: &CourtSide<'_>,
        handler: usize,
        quick: bool,
        rng: &mut R,
    ) -> Result<ActionType, PossessionError> {
        let t = offense.players[handler].tendencies;
        let off_bias = offense.scheme.offense.action_bias();
        let def_bias = defense.scheme.defense.action_bias();

        // Matched defender makes the action he guards best less attractive
        let perimeter = self.rating(defense, handler, Attr::PerimeterDefense)?;
        let interior = self.rating(defense, handler, Attr::InteriorDefense)?;
        let steal = self.rating(defense, handler, Attr::Steal)?;
        let deterrence = |rating: f32| (1.0 + (50.0 - rating as f64) / 100.0).max(0.1);

        let mut weights = [
            t.drive as f64 * deterrence(perimeter),
            t.spot_up as f64 * deterrence((perimeter + 50.0) / 2.0),
            t.post_up as f64 * deterrence(interior),
            t.pass as f64 * deterrence(steal) * (0.8 + 0.4 * offense.chemistry as f64),
        ];
        for i in 0..4 {
            weights[i] *= off_bias[i] as f64 * def_bias[i] as f64;
        }
        if quick {
            weights[2] *= 0.25;
            weights[3] *= 0.25;
        }
        Ok(ActionType::CHOICES[weighted_index(&weights, rng)])
    }

    fn shot_kind<R: Rng + ?Sized>(&self, action: ActionType, shooter: &Player, rng: &mut R) -> ShotKind {
        match action {
            ActionType::PostUp => ShotKind::Post,
            ActionType::SpotUp => {
                let rate = shooter.tendencies.three_point_rate.min(100) as f64 / 100.0;
                if roll(rate, rng) {
                    ShotKind::Three
                } else {
                    ShotKind::MidRange
                }
            }
            // Drives finish at the rim three times out of four
            _ => {
                if roll(0.75, rng) {
                    ShotKind::Rim
                } else {
                    ShotKind::MidRange
                }
            }
        }
    }

    fn shooting_attr(shot: ShotKind) -> Attr {
        match shot {
            ShotKind::Rim => Attr::InsideScoring,
            ShotKind::MidRange => Attr::MidRange,
            ShotKind::Three => Attr::ThreePoint,
            ShotKind::Post => Attr::PostMoves,
        }
    }

    fn contest_attr(shot: ShotKind) -> Attr {
        match shot {
            ShotKind::Rim | ShotKind::Post => Attr::InteriorDefense,
            ShotKind::MidRange | ShotKind::Three => Attr::PerimeterDefense,
        }
    }

    /// Slot of the defender contesting the shot. Rim attempts draw the best
    /// interior defender; everything else is the matched man.
    fn contest_slot(
        &self,
        defense: &CourtSide<'_>,
        shooter: usize,
        shot: ShotKind,
    ) -> Result<usize, PossessionError> {
        if shot != ShotKind::Rim {
            return Ok(shooter);
        }
        let mut best = shooter;
        let mut best_rating = f32::MIN;
        for slot in 0..ON_COURT {
            let r = self.rating(defense, slot, Attr::InteriorDefense)?;
            if r > best_rating {
                best = slot;
                best_rating = r;
            }
        }
        Ok(best)
    }

    /// Make probability for `shooter` against `defender`, badges and fatigue included.
    pub fn make_probability(
        &self,
        offense: &CourtSide<'_>,
        shooter: usize,
        defense: &CourtSide<'_>,
        defender: usize,
        shot: ShotKind,
        quality: f64,
    ) -> Result<f64, PossessionError> {
        let skill = self.rating(offense, shooter, Self::shooting_attr(shot))?;
        let contest = self.rating(defense, defender, Self::contest_attr(shot))?;
        let p = shot_make_probability(shot, skill, contest, quality, &self.config.possession);
        if !p.is_finite() {
            return Err(PossessionError::NonFiniteProbability { context: "shot make" });
        }
        Ok(p)
    }

    fn clutch_quality(
        &self,
        offense: &CourtSide<'_>,
        shooter: usize,
        clock: &ClockState,
    ) -> Result<f64, PossessionError> {
        if clock.period < self.config.clock.periods || clock.period_remaining > CLUTCH_SECS {
            return Ok(0.0);
        }
        let clutch = self.rating(offense, shooter, Attr::Clutch)?;
        let composure = self.rating(offense, shooter, Attr::Composure)?;
        Ok((clutch - 50.0) as f64 * 0.001 + (composure - 50.0) as f64 * 0.0005)
    }

    fn free_throws<R: Rng + ?Sized>(
        &self,
        offense: &CourtSide<'_>,
        shooter: usize,
        attempts: u8,
        tally: &mut Tally,
        plays: &mut Vec<Play>,
        rng: &mut R,
    ) -> Result<u8, PossessionError> {
        let p = free_throw_probability(
            self.rating(offense, shooter, Attr::FreeThrow)?,
            &self.config.possession,
        );
        let id = offense.players[shooter].id;
        let mut made = 0;
        for _ in 0..attempts {
            let hit = roll(p, rng);
            let row = tally.row(id, offense.side);
            row.fta += 1;
            if hit {
                row.ftm += 1;
                row.points += 1;
                made += 1;
            }
            plays.push(Play::FreeThrow { shooter: id, made: hit });
        }
        Ok(made)
    }

    /// Defender credited with the steal on a turnover, if any.
    fn steal_credit<R: Rng + ?Sized>(
        &self,
        defense: &CourtSide<'_>,
        rng: &mut R,
    ) -> Result<Option<usize>, PossessionError> {
        let mut ratings = [0.0f32; ON_COURT];
        for (slot, r) in ratings.iter_mut().enumerate() {
            *r = self.rating(defense, slot, Attr::Steal)?;
        }
        let weights: Vec<f64> = ratings.iter().map(|r| *r as f64).collect();
        let slot = weighted_index(&weights, rng);
        let p = steal_probability(ratings[slot], &self.config.possession);
        Ok(if roll(p, rng) { Some(slot) } else { None })
    }

    fn choose_rebounder<R: Rng + ?Sized>(
        &self,
        side: &CourtSide<'_>,
        attr: Attr,
        rng: &mut R,
    ) -> Result<usize, PossessionError> {
        let mut weights = Vec::with_capacity(ON_COURT);
        for slot in 0..ON_COURT {
            let height = side.players[slot].height_in as f64 / 78.0;
            weights.push(self.rating(side, slot, attr)? as f64 * height * height);
        }
        Ok(weighted_index(&weights, rng))
    }

    fn team_mean(&self, side: &CourtSide<'_>, attr: Attr) -> Result<f32, PossessionError> {
        let mut sum = 0.0;
        for slot in 0..ON_COURT {
            sum += self.rating(side, slot, attr)?;
        }
        Ok(sum / ON_COURT as f32)
    }

    fn mean_height(side: &CourtSide<'_>) -> f32 {
        side.players.iter().map(|p| p.height_in as f32).sum::<f32>() / ON_COURT as f32
    }

    pub fn resolve_possession<R: Rng + ?Sized>(
        &self,
        offense: &CourtSide<'_>,
        defense: &CourtSide<'_>,
        clock: &ClockState,
        rng: &mut R,
    ) -> Result<PossessionOutcome, PossessionError> {
        let pc = &self.config.possession;
        let cc = &self.config.clock;
        let pressure = defense.scheme.defense.pressure();
        let remaining = clock.period_remaining.max(0.0);
        let quick = remaining <= cc.quick_shot_window_secs;

        let mut tally = Tally::default();
        let mut plays = Vec::new();
        let mut team_fouls = defense.team_fouls;
        let mut elapsed = clock.planned_secs.min(cc.shot_clock_secs);
        let mut quality = 0.0;

        let mut handler = self.choose_handler(offense, rng);
        let first_handler = offense.players[handler].id;
        let mut action_taken: Option<ActionType> = None;

        // Shot clock about to expire: violation or a forced heave
        if clock.planned_secs > cc.shot_clock_secs && !quick {
            if roll(pc.violation_rate, rng) {
                tally.row(first_handler, offense.side).tov += 1;
                plays.push(Play::ShotClockViolation { player: first_handler });
                return Ok(self.finish(
                    offense,
                    defense,
                    first_handler,
                    ActionType::Turnover,
                    PossessionResult::ShotClockViolation { player: first_handler },
                    elapsed.min(remaining),
                    tally,
                    plays,
                ));
            }
            quality -= pc.forced_shot_penalty;
        }

        let mut offensive_rebounds = 0u8;
        let mut putback = false;

        let result = loop {
            let handler_id = offense.players[handler].id;

            if !putback {
                // Non-shooting foul by the matched defender
                let fouler = defense.players[handler].id;
                let p_foul = foul_probability(
                    pc.non_shooting_foul_base,
                    self.rating(defense, handler, Attr::Aggression)?,
                    defense.personal_fouls[handler].saturating_add(tally.fouls(fouler)),
                    pressure,
                    pc,
                );
                if roll(p_foul, rng) {
                    tally.row(fouler, defense.side).pf += 1;
                    team_fouls = team_fouls.saturating_add(1);
                    plays.push(Play::Foul { by: fouler, on: handler_id, shooting: false });
                    if team_fouls >= pc.bonus_team_fouls {
                        let made = self.free_throws(offense, handler, 2, &mut tally, &mut plays, rng)?;
                        break PossessionResult::FreeThrows { shooter: handler_id, made, attempted: 2 };
                    }
                    // Side-out; every non-bonus foul moves the team closer to the bonus
                    continue;
                }

                let p_to = turnover_probability(
                    self.rating(offense, handler, Attr::BallHandling)?,
                    pressure,
                    pc,
                );
                if roll(p_to, rng) {
                    let stolen_by = self.steal_credit(defense, rng)?.map(|slot| defense.players[slot].id);
                    tally.row(handler_id, offense.side).tov += 1;
                    if let Some(thief) = stolen_by {
                        tally.row(thief, defense.side).stl += 1;
                    }
                    plays.push(Play::Turnover { player: handler_id, stolen_by });
                    break PossessionResult::Turnover { player: handler_id, stolen_by };
                }
            }

            let action = if putback {
                ActionType::Drive
            } else {
                self.choose_action(offense, defense, handler, quick, rng)?
            };
            action_taken.get_or_insert(action);

            let (shooter, assisted_by, shot) = if action == ActionType::Pass {
                let receiver = self.choose_receiver(offense, handler, rng);
                // Passing lane: a poor pass can be picked off
                let p_pick = clamp_band(
                    turnover_probability(self.rating(offense, handler, Attr::Passing)?, pressure, pc)
                        * 0.5,
                    pc,
                );
                if roll(p_pick, rng) {
                    let thief = defense.players[receiver].id;
                    tally.row(handler_id, offense.side).tov += 1;
                    tally.row(thief, defense.side).stl += 1;
                    plays.push(Play::Turnover { player: handler_id, stolen_by: Some(thief) });
                    break PossessionResult::Turnover { player: handler_id, stolen_by: Some(thief) };
                }
                let t = offense.players[receiver].tendencies;
                let follow = if weighted_index(&[t.spot_up as f64, t.drive as f64], rng) == 0 {
                    ActionType::SpotUp
                } else {
                    ActionType::Drive
                };
                let shot = self.shot_kind(follow, offense.players[receiver], rng);
                (receiver, Some(handler_id), shot)
            } else {
                let shot = self.shot_kind(action, offense.players[handler], rng);
                (handler, None, shot)
            };

            let shooter_id = offense.players[shooter].id;
            let contest = self.contest_slot(defense, shooter, shot)?;
            let defender_id = defense.players[contest].id;

            let mut q = quality + self.clutch_quality(offense, shooter, clock)?;
            if assisted_by.is_some() {
                q += pc.assisted_bonus + 0.02 * offense.chemistry as f64;
            }
            let p_make = self.make_probability(offense, shooter, defense, contest, shot, q)?;
            let made = roll(p_make, rng);

            let p_shooting_foul = foul_probability(
                pc.shooting_foul_base,
                self.rating(defense, contest, Attr::Aggression)?,
                defense.personal_fouls[contest].saturating_add(tally.fouls(defender_id)),
                pressure,
                pc,
            );
            let fouled = roll(p_shooting_foul, rng);
            if fouled {
                tally.row(defender_id, defense.side).pf += 1;
                team_fouls = team_fouls.saturating_add(1);
                plays.push(Play::Foul { by: defender_id, on: shooter_id, shooting: true });
            }

            if made {
                let row = tally.row(shooter_id, offense.side);
                row.fga += 1;
                row.fgm += 1;
                row.points += shot.value() as u16;
                if shot.is_three() {
                    row.tpa += 1;
                    row.tpm += 1;
                }
                if let Some(passer) = assisted_by {
                    tally.row(passer, offense.side).ast += 1;
                }
                plays.push(Play::Shot {
                    shooter: shooter_id,
                    shot,
                    made: true,
                    assisted_by,
                    blocked_by: None,
                });
                if fouled {
                    self.free_throws(offense, shooter, 1, &mut tally, &mut plays, rng)?;
                }
                break PossessionResult::FieldGoal {
                    shooter: shooter_id,
                    shot,
                    assisted_by,
                    and_one: fouled,
                };
            }

            plays.push(Play::Shot {
                shooter: shooter_id,
                shot,
                made: false,
                assisted_by: None,
                blocked_by: None,
            });

            if fouled {
                // Missed while fouled: no field goal attempt, free throws for the shot's value
                let attempts = shot.value();
                let made = self.free_throws(offense, shooter, attempts, &mut tally, &mut plays, rng)?;
                break PossessionResult::FreeThrows { shooter: shooter_id, made, attempted: attempts };
            }

            {
                let row = tally.row(shooter_id, offense.side);
                row.fga += 1;
                if shot.is_three() {
                    row.tpa += 1;
                }
            }

            let block_scale = if shot.is_three() { 0.3 } else { 1.0 };
            let p_block = block_probability(self.rating(defense, contest, Attr::Block)?, pc) * block_scale;
            if roll(p_block, rng) {
                tally.row(defender_id, defense.side).blk += 1;
                if let Some(Play::Shot { blocked_by, .. }) = plays.last_mut() {
                    *blocked_by = Some(defender_id);
                }
            }

            let p_orb = offensive_rebound_probability(
                self.team_mean(offense, Attr::OffensiveRebound)?,
                self.team_mean(defense, Attr::DefensiveRebound)?,
                Self::mean_height(offense) - Self::mean_height(defense),
                pc,
            );
            if offensive_rebounds < pc.max_offensive_rebounds && roll(p_orb, rng) {
                let slot = self.choose_rebounder(offense, Attr::OffensiveRebound, rng)?;
                let id = offense.players[slot].id;
                tally.row(id, offense.side).oreb += 1;
                plays.push(Play::Rebound { player: id, offensive: true });
                offensive_rebounds += 1;
                let lo = cc.quick_shot_min_secs;
                let hi = cc.putback_max_secs.max(lo);
                elapsed += rng.gen_range(lo..=hi);
                handler = slot;
                putback = true;
                quality = 0.0;
                continue;
            }

            let slot = self.choose_rebounder(defense, Attr::DefensiveRebound, rng)?;
            let id = defense.players[slot].id;
            tally.row(id, defense.side).dreb += 1;
            plays.push(Play::Rebound { player: id, offensive: false });
            break PossessionResult::DefensiveRebound { rebounder: id };
        };

        let action = action_taken.unwrap_or(ActionType::Turnover);
        Ok(self.finish(offense, defense, first_handler, action, result, elapsed.min(remaining), tally, plays))
    }

    #[allow(clippy::too_many_arguments)]
    fn finish(
        &self,
        offense: &CourtSide<'_>,
        defense: &CourtSide<'_>,
        ball_handler: PlayerId,
        action: ActionType,
        result: PossessionResult,
        elapsed_secs: f32,
        tally: Tally,
        plays: Vec<Play>,
    ) -> PossessionOutcome {
        let points = tally.points(offense.side);
        let name = |id: PlayerId| {
            offense.name_of(id).or_else(|| defense.name_of(id)).unwrap_or("?").to_string()
        };
        let description = describe(&result, &name);
        let (on_court_home, on_court_away) = match offense.side {
            TeamSide::Home => (offense.ids(), defense.ids()),
            TeamSide::Away => (defense.ids(), offense.ids()),
        };
        PossessionOutcome {
            offense: offense.side,
            ball_handler,
            action,
            result,
            elapsed_secs: elapsed_secs.max(0.0),
            points,
            deltas: tally.rows,
            plays,
            on_court_home,
            on_court_away,
            description,
        }
    }
}

fn describe(result: &PossessionResult, name: &dyn Fn(PlayerId) -> String) -> String {
    match result {
        PossessionResult::FieldGoal { shooter, shot, assisted_by, and_one } => {
            let what = match shot {
                ShotKind::Rim => "layup",
                ShotKind::MidRange => "jumper",
                ShotKind::Three => "three",
                ShotKind::Post => "post shot",
            };
            let mut s = format!("{} makes the {}", name(*shooter), what);
            if let Some(passer) = assisted_by {
                s.push_str(&format!(" (assist {})", name(*passer)));
            }
            if *and_one {
                s.push_str(", and one");
            }
            s
        }
        PossessionResult::FreeThrows { shooter, made, attempted } => {
            format!("{} makes {} of {} free throws", name(*shooter), made, attempted)
        }
        PossessionResult::DefensiveRebound { rebounder } => {
            format!("miss, defensive rebound {}", name(*rebounder))
        }
        PossessionResult::Turnover { player, stolen_by: Some(thief) } => {
            format!("{} stolen by {}", name(*player), name(*thief))
        }
        PossessionResult::Turnover { player, stolen_by: None } => {
            format!("{} turns it over", name(*player))
        }
        PossessionResult::ShotClockViolation { player } => {
            format!("shot clock violation on {}", name(*player))
        }
        PossessionResult::NoOp => "possession skipped".to_string(),
    }
}
