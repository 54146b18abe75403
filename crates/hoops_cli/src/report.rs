//! Plain-text rendering of box scores and standings.

use std::collections::BTreeMap;
use std::fmt::Write;

use hoops_core::models::{TeamBox, TeamId};
use hoops_core::{BatchReport, GameResult, Team};

fn pct(value: Option<f32>) -> String {
    value.map(|v| format!("{:.1}", v * 100.0)).unwrap_or_else(|| "-".to_string())
}

fn team_table(out: &mut String, name: &str, team: &TeamBox) {
    let _ = writeln!(out, "{name}");
    let _ = writeln!(
        out,
        "{:<20} {:>5} {:>4} {:>7} {:>7} {:>7} {:>4} {:>4} {:>4} {:>4} {:>4} {:>4} {:>4}",
        "PLAYER", "MIN", "PTS", "FG", "3P", "FT", "REB", "AST", "STL", "BLK", "TO", "PF", "+/-"
    );
    for line in &team.lines {
        if line.seconds <= 0.0 {
            continue;
        }
        let marker = if line.starter { "*" } else { "" };
        let _ = writeln!(
            out,
            "{:<20} {:>5.1} {:>4} {:>7} {:>7} {:>7} {:>4} {:>4} {:>4} {:>4} {:>4} {:>4} {:>+4}",
            format!("{}{marker}", line.name),
            line.minutes(),
            line.points,
            format!("{}-{}", line.fgm, line.fga),
            format!("{}-{}", line.tpm, line.tpa),
            format!("{}-{}", line.ftm, line.fta),
            line.oreb + line.dreb,
            line.ast,
            line.stl,
            line.blk,
            line.tov,
            line.pf,
            line.plus_minus,
        );
    }
    let t = &team.totals;
    let fg = (t.fga > 0).then(|| t.fgm as f32 / t.fga as f32);
    let _ = writeln!(out, "TOTAL {} pts, FG {}%, {} reb", t.points, pct(fg), t.oreb + t.dreb);
}

pub fn box_score(result: &GameResult, home: &Team, away: &Team) -> String {
    let mut out = String::new();
    let ot = match result.overtime_periods {
        0 => String::new(),
        1 => " (OT)".to_string(),
        n => format!(" ({n}OT)"),
    };
    let _ = writeln!(out, "{} {} - {} {}{ot}", home.name, result.home_score, result.away_score, away.name);
    let periods: Vec<String> =
        result.period_scores.iter().map(|p| format!("{}-{}", p.home, p.away)).collect();
    let _ = writeln!(out, "by period: {}", periods.join(", "));
    let _ = writeln!(out);
    team_table(&mut out, &home.name, &result.box_score.home);
    let _ = writeln!(out);
    team_table(&mut out, &away.name, &result.box_score.away);
    for injury in &result.injuries {
        let _ = writeln!(
            out,
            "injury: player {} ({:?}) out {} games",
            injury.player, injury.injury.kind, injury.injury.games_remaining
        );
    }
    out
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    pub wins: u32,
    pub losses: u32,
}

pub fn standings(report: &BatchReport) -> BTreeMap<TeamId, Record> {
    let mut table: BTreeMap<TeamId, Record> = BTreeMap::new();
    for result in report.results() {
        let Some(winner) = result.winner_team() else { continue };
        let loser = if winner == result.home_team { result.away_team } else { result.home_team };
        table.entry(winner).or_default().wins += 1;
        table.entry(loser).or_default().losses += 1;
    }
    table
}

pub fn season_summary(report: &BatchReport, teams: &[std::sync::Arc<Team>]) -> String {
    let mut out = String::new();
    let table = standings(report);
    let mut rows: Vec<(&str, Record)> = teams
        .iter()
        .map(|t| (t.name.as_str(), table.get(&t.id).copied().unwrap_or_default()))
        .collect();
    rows.sort_by(|a, b| b.1.wins.cmp(&a.1.wins).then(a.1.losses.cmp(&b.1.losses)).then(a.0.cmp(b.0)));

    let _ = writeln!(out, "{:<24} {:>4} {:>4}", "TEAM", "W", "L");
    for (name, record) in rows {
        let _ = writeln!(out, "{:<24} {:>4} {:>4}", name, record.wins, record.losses);
    }
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{} games completed, {} failed, {} cancelled in {:.2}s",
        report.completed_count(),
        report.failed_count(),
        report.cancelled_count(),
        report.elapsed.as_secs_f64(),
    );
    for (game_id, err) in report.failures() {
        let _ = writeln!(out, "  game {game_id}: {err}");
    }
    out
}
