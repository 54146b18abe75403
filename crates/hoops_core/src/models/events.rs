use serde::{Deserialize, Serialize};

use super::player::{Injury, PlayerId};
use super::team::TeamSide;

/// Structured event for the rendering collaborator. Emitted in game order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    pub seq: u32,
    pub period: u8,
    /// Seconds left in the period when the event happened.
    pub clock_remaining: f32,
    #[serde(flatten)]
    pub kind: GameEventKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEventKind {
    Score {
        side: TeamSide,
        player: PlayerId,
        points: u16,
        home_score: u16,
        away_score: u16,
    },
    SynergyActivated {
        side: TeamSide,
        synergy: String,
        players: (PlayerId, PlayerId),
    },
    Injury {
        side: TeamSide,
        player: PlayerId,
        injury: Injury,
    },
    Substitution {
        side: TeamSide,
        player_out: PlayerId,
        player_in: PlayerId,
        reason: SubstitutionReason,
    },
    Timeout {
        side: TeamSide,
        remaining: u8,
    },
    FoulOut {
        side: TeamSide,
        player: PlayerId,
    },
    PeriodEnd {
        period: u8,
        home_score: u16,
        away_score: u16,
    },
    GameEnd {
        home_score: u16,
        away_score: u16,
        overtime_periods: u8,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubstitutionReason {
    Fatigue,
    /// Benched starter back on court after recovering.
    Recovered,
    Injury,
    FoulOut,
    FoulTrouble,
}

impl GameEventKind {
    pub fn name(&self) -> &'static str {
        match self {
            GameEventKind::Score { .. } => "score",
            GameEventKind::SynergyActivated { .. } => "synergy_activated",
            GameEventKind::Injury { .. } => "injury",
            GameEventKind::Substitution { .. } => "substitution",
            GameEventKind::Timeout { .. } => "timeout",
            GameEventKind::FoulOut { .. } => "foul_out",
            GameEventKind::PeriodEnd { .. } => "period_end",
            GameEventKind::GameEnd { .. } => "game_end",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = GameEvent {
            seq: 3,
            period: 2,
            clock_remaining: 301.5,
            kind: GameEventKind::Timeout { side: TeamSide::Away, remaining: 6 },
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "timeout");
        assert_eq!(json["side"], "away");
        assert_eq!(json["remaining"], 6);

        let back: GameEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
