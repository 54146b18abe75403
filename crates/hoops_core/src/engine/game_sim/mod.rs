//! # Game Simulator
//!
//! Drives one game possession by possession:
//! `Scheduled -> InProgress(period) -> Complete`.
//!
//! After every possession the outcome is folded into the box score, then
//! fouls, scoring runs (timeouts), fatigue, injury rolls and substitutions
//! are processed in that order. Ties at the end of regulation go to
//! overtime until the score differs.
//!
//! The simulator owns working copies of both rosters and its own RNG, so a
//! given `(teams, seed, config)` always produces the same [`GameResult`].

mod clock;
mod fatigue;
mod injuries;
mod substitutions;
mod team_state;
mod timeouts;

use rand_chacha::ChaCha8Rng;
use std::any::Any;
use std::collections::{BTreeMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::config::SimConfig;
use super::deterministic::rng_from_seed;
use super::possession::{ClockState, PossessionEngine};
use super::stats::StatAggregator;
use crate::badges::{ActiveEffects, BadgeCatalog, BadgeSynergyEngine, SynergyCache};
use crate::error::{GameError, Result};
use crate::models::{
    BoxScore, GameEvent, GameEventKind, GameResult, GameStatus, InjuryReport, PeriodScore,
    PossessionOutcome, PossessionSummary, Team, TeamSide,
};

use team_state::TeamState;

pub struct GameSimulator {
    game_id: u64,
    seed: u64,
    config: SimConfig,
    catalog: Arc<BadgeCatalog>,
    rng: ChaCha8Rng,
    status: GameStatus,
    /// Indexed by `TeamSide::index()`.
    teams: [TeamState; 2],
    caches: [SynergyCache; 2],
    box_score: BoxScore,
    score: [u16; 2],
    period: u8,
    period_remaining: f32,
    offense: TeamSide,
    play_by_play: Vec<PossessionSummary>,
    events: Vec<GameEvent>,
    injuries: Vec<InjuryReport>,
    period_scores: Vec<PeriodScore>,
    /// Score at the start of the current period.
    period_start: [u16; 2],
    skipped_possessions: u32,
    /// Side on the current unanswered run and its points.
    run: Option<(TeamSide, u16)>,
}

impl GameSimulator {
    pub fn new(
        game_id: u64,
        home: &Team,
        away: &Team,
        seed: u64,
        config: SimConfig,
        catalog: Arc<BadgeCatalog>,
    ) -> Result<Self> {
        config.validate()?;
        if home.id == away.id {
            return Err(GameError::SameTeam { team: home.id });
        }
        home.validate()?;
        away.validate()?;

        let home_ids: HashSet<_> = home.roster.iter().map(|p| p.id).collect();
        if let Some(p) = away.roster.iter().find(|p| home_ids.contains(&p.id)) {
            return Err(GameError::DuplicatePlayer { team: away.id, player: p.id });
        }

        let timeouts = config.clock.timeouts_per_team;
        let teams = [
            TeamState::new(home, TeamSide::Home, timeouts)?,
            TeamState::new(away, TeamSide::Away, timeouts)?,
        ];
        let box_score = StatAggregator::empty_box(home, away);

        Ok(Self {
            game_id,
            seed,
            period_remaining: config.clock.period_length(1),
            config,
            catalog,
            rng: rng_from_seed(seed),
            status: GameStatus::Scheduled,
            teams,
            caches: [SynergyCache::new(), SynergyCache::new()],
            box_score,
            score: [0, 0],
            period: 1,
            offense: TeamSide::Home,
            play_by_play: Vec::new(),
            events: Vec::new(),
            injuries: Vec::new(),
            period_scores: Vec::new(),
            period_start: [0, 0],
            skipped_possessions: 0,
            run: None,
        })
    }

    /// Default config and the built-in badge catalog.
    pub fn with_defaults(game_id: u64, home: &Team, away: &Team, seed: u64) -> Result<Self> {
        Self::new(game_id, home, away, seed, SimConfig::default(), BadgeCatalog::builtin())
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Plays the whole game and seals the result.
    pub fn run(mut self) -> Result<GameResult> {
        info!(
            game_id = self.game_id,
            home = self.teams[0].team_id,
            away = self.teams[1].team_id,
            seed = self.seed,
            "tip-off"
        );

        self.refresh_synergies(TeamSide::Home);
        self.refresh_synergies(TeamSide::Away);

        loop {
            self.status = GameStatus::InProgress { period: self.period };
            self.play_period()?;
            self.end_period();

            let regulation_over = self.period >= self.config.clock.periods;
            if regulation_over && self.score[0] != self.score[1] {
                break;
            }
            let overtime_periods = self.period.saturating_sub(self.config.clock.periods);
            if overtime_periods >= self.config.clock.max_overtime_periods {
                warn!(
                    game_id = self.game_id,
                    overtime_periods,
                    score = self.score[0],
                    "no winner within the overtime limit"
                );
                return Err(GameError::OvertimeLimit { overtime_periods });
            }
            let next = self
                .period
                .checked_add(1)
                .ok_or(GameError::OvertimeLimit { overtime_periods })?;
            self.start_period(next);
        }

        self.status = GameStatus::Complete;
        let overtime_periods = self.period.saturating_sub(self.config.clock.periods);
        self.emit(GameEventKind::GameEnd {
            home_score: self.score[0],
            away_score: self.score[1],
            overtime_periods,
        });
        info!(
            game_id = self.game_id,
            home_score = self.score[0],
            away_score = self.score[1],
            overtime_periods,
            possessions = self.play_by_play.len(),
            skipped = self.skipped_possessions,
            "final"
        );

        Ok(self.seal(overtime_periods))
    }

    fn play_period(&mut self) -> Result<()> {
        while self.period_remaining > 0.0 {
            let offense = self.offense;
            let pace = self.team(offense).scheme.offense.pace_factor();
            let planned = clock::sample_possession_secs(
                &self.config.clock,
                pace,
                self.period_remaining,
                &mut self.rng,
            );
            let clock = ClockState {
                period: self.period,
                period_remaining: self.period_remaining,
                planned_secs: planned,
            };

            let outcome = self.resolve(offense, &clock);
            let elapsed = outcome.elapsed_secs.min(self.period_remaining);
            self.period_remaining = (self.period_remaining - elapsed).max(0.0);

            self.fold(outcome)?;
            self.offense = offense.opponent();
        }
        Ok(())
    }

    /// Runs the possession engine; anomalies become a no-op that only burns clock.
    fn resolve(&mut self, offense: TeamSide, clock: &ClockState) -> PossessionOutcome {
        let off_effects = self.effects(offense);
        let def_effects = self.effects(offense.opponent());
        let off = self.teams[offense.index()].court_side(&off_effects);
        let def = self.teams[offense.opponent().index()].court_side(&def_effects);
        let engine = PossessionEngine::new(&self.config);

        match engine.resolve_possession(&off, &def, clock, &mut self.rng) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(
                    game_id = self.game_id,
                    period = clock.period,
                    error = %err,
                    "possession skipped"
                );
                self.skipped_possessions += 1;
                let (home, away) = match offense {
                    TeamSide::Home => (off.ids(), def.ids()),
                    TeamSide::Away => (def.ids(), off.ids()),
                };
                PossessionOutcome::no_op(
                    offense,
                    off.players[0].id,
                    clock.planned_secs.min(self.config.clock.shot_clock_secs).min(clock.period_remaining),
                    home,
                    away,
                    &err.to_string(),
                )
            }
        }
    }

    /// Applies one outcome to every piece of game state.
    fn fold(&mut self, outcome: PossessionOutcome) -> Result<()> {
        let elapsed = outcome.elapsed_secs;
        StatAggregator::apply_in_place(&mut self.box_score, &outcome);

        let offense = outcome.offense;
        let points = outcome.points_for(offense);
        self.score[offense.index()] += points;
        for delta in outcome.deltas.iter().filter(|d| d.points > 0) {
            if let Some(side) = delta.side {
                self.emit(GameEventKind::Score {
                    side,
                    player: delta.player,
                    points: delta.points,
                    home_score: self.score[0],
                    away_score: self.score[1],
                });
            }
        }

        self.play_by_play.push(PossessionSummary {
            seq: self.play_by_play.len() as u32 + 1,
            period: self.period,
            clock_remaining: self.period_remaining,
            outcome: outcome.clone(),
            home_score: self.score[0],
            away_score: self.score[1],
        });

        self.process_fouls(&outcome);
        self.track_run(offense, points);
        self.apply_fatigue(elapsed);
        self.roll_injuries()?;
        self.process_substitutions();
        Ok(())
    }

    fn end_period(&mut self) {
        let home = self.score[0] - self.period_start[0];
        let away = self.score[1] - self.period_start[1];
        self.period_scores.push(PeriodScore { period: self.period, home, away });
        self.emit(GameEventKind::PeriodEnd {
            period: self.period,
            home_score: self.score[0],
            away_score: self.score[1],
        });
        debug!(game_id = self.game_id, period = self.period, home, away, "period over");
    }

    fn start_period(&mut self, next: u8) {
        let halftime = next == self.config.clock.periods / 2 + 1;
        let recovery = if halftime {
            self.config.fatigue.halftime_recovery
        } else {
            self.config.fatigue.period_break_recovery
        };
        self.recover_all(recovery);

        self.period = next;
        self.period_start = self.score;
        self.period_remaining = self.config.clock.period_length(next);
        for team in self.teams.iter_mut() {
            team.team_fouls = 0;
        }
        self.run = None;
        // Alternate the opening possession
        self.offense = if next % 2 == 1 { TeamSide::Home } else { TeamSide::Away };

        // Rested players may now be fresher than the ones on court
        self.process_substitutions();
    }

    fn team(&self, side: TeamSide) -> &TeamState {
        &self.teams[side.index()]
    }

    fn team_mut(&mut self, side: TeamSide) -> &mut TeamState {
        &mut self.teams[side.index()]
    }

    /// Cached badge effects for `side`'s current five.
    fn effects(&mut self, side: TeamSide) -> Arc<ActiveEffects> {
        let engine = BadgeSynergyEngine::new(&self.catalog, &self.config.badges);
        let idx = side.index();
        let lineup = self.teams[idx].court_players();
        self.caches[idx].get_or_compute(&engine, &lineup)
    }

    /// Emits `SynergyActivated` for synergies the new five switched on.
    fn refresh_synergies(&mut self, side: TeamSide) {
        let effects = self.effects(side);
        let now: std::collections::BTreeSet<String> =
            effects.activated.iter().map(|s| s.id.clone()).collect();
        for activated in &effects.activated {
            if !self.team(side).active_synergies.contains(&activated.id) {
                debug!(game_id = self.game_id, side = ?side, synergy = %activated.id, "synergy on");
                self.emit(GameEventKind::SynergyActivated {
                    side,
                    synergy: activated.id.clone(),
                    players: activated.players,
                });
            }
        }
        self.team_mut(side).active_synergies = now;
    }

    fn emit(&mut self, kind: GameEventKind) {
        self.events.push(GameEvent {
            seq: self.events.len() as u32 + 1,
            period: self.period,
            clock_remaining: self.period_remaining,
            kind,
        });
    }

    fn seal(self, overtime_periods: u8) -> GameResult {
        let final_fatigue: BTreeMap<_, _> = self
            .teams
            .iter()
            .flat_map(|t| t.players.iter().map(|p| (p.id, p.fatigue)))
            .collect();
        GameResult {
            game_id: self.game_id,
            seed: self.seed,
            home_team: self.teams[0].team_id,
            away_team: self.teams[1].team_id,
            home_score: self.score[0],
            away_score: self.score[1],
            period_scores: self.period_scores,
            overtime_periods,
            box_score: StatAggregator::finalize(self.box_score),
            play_by_play: self.play_by_play,
            events: self.events,
            injuries: self.injuries,
            final_fatigue,
            skipped_possessions: self.skipped_possessions,
            completed: true,
        }
    }
}

/// One game with an explicit config and catalog.
///
/// A panic inside the simulator comes back as [`GameError::Panicked`], so
/// interactive callers and batch workers see the same retryable error.
pub fn simulate_game(
    game_id: u64,
    home: &Team,
    away: &Team,
    seed: u64,
    config: &SimConfig,
    catalog: Arc<BadgeCatalog>,
) -> Result<GameResult> {
    catch_game_panic(game_id, seed, || {
        GameSimulator::new(game_id, home, away, seed, config.clone(), catalog)?.run()
    })
}

/// Runs `simulate` and converts an unwinding panic into `GameError::Panicked`.
pub(crate) fn catch_game_panic<T>(
    game_id: u64,
    seed: u64,
    simulate: impl FnOnce() -> Result<T>,
) -> Result<T> {
    panic::catch_unwind(AssertUnwindSafe(simulate)).unwrap_or_else(|payload| {
        let message = panic_message(payload.as_ref());
        error!(game_id, seed, %message, "game simulation panicked");
        Err(GameError::Panicked { message })
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
