use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::clock::derived_minute;

/// Match lifecycle. Transitions only run forward: Scheduled -> Live -> Finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Scheduled,
    Live,
    Finished,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::Live => "live",
            MatchStatus::Finished => "finished",
        }
    }

    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "scheduled" => Ok(MatchStatus::Scheduled),
            "live" => Ok(MatchStatus::Live),
            "finished" => Ok(MatchStatus::Finished),
            other => anyhow::bail!("unknown match status: {other}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamSide {
    Home,
    Away,
}

impl TeamSide {
    pub fn opponent(self) -> TeamSide {
        match self {
            TeamSide::Home => TeamSide::Away,
            TeamSide::Away => TeamSide::Home,
        }
    }
}

/// In-game event kinds. Only a substitution carries extra data: the
/// incoming player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    Goal,
    OwnGoal,
    YellowCard,
    RedCard,
    Substitution { sub_in: String },
    Corner,
    Offside,
    Foul,
    Handball,
    Injury,
    VarCheck,
    VarOverturned,
    PenaltySaved,
    GoalKick,
    ThrowIn,
    FreeKick,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Goal => "goal",
            EventKind::OwnGoal => "own_goal",
            EventKind::YellowCard => "yellow_card",
            EventKind::RedCard => "red_card",
            EventKind::Substitution { .. } => "substitution",
            EventKind::Corner => "corner",
            EventKind::Offside => "offside",
            EventKind::Foul => "foul",
            EventKind::Handball => "handball",
            EventKind::Injury => "injury",
            EventKind::VarCheck => "var_check",
            EventKind::VarOverturned => "var_overturned",
            EventKind::PenaltySaved => "penalty_saved",
            EventKind::GoalKick => "goal_kick",
            EventKind::ThrowIn => "throw_in",
            EventKind::FreeKick => "free_kick",
        }
    }

    pub fn sub_in(&self) -> Option<&str> {
        match self {
            EventKind::Substitution { sub_in } => Some(sub_in.as_str()),
            _ => None,
        }
    }

    /// Rebuild a kind from its stored parts (`type` string + optional
    /// `sub_in` column).
    pub fn from_parts(kind: &str, sub_in: Option<String>) -> anyhow::Result<Self> {
        let kind = match kind {
            "goal" => EventKind::Goal,
            "own_goal" => EventKind::OwnGoal,
            "yellow_card" => EventKind::YellowCard,
            "red_card" => EventKind::RedCard,
            "substitution" => EventKind::Substitution {
                sub_in: sub_in
                    .ok_or_else(|| anyhow::anyhow!("substitution event without sub_in"))?,
            },
            "corner" => EventKind::Corner,
            "offside" => EventKind::Offside,
            "foul" => EventKind::Foul,
            "handball" => EventKind::Handball,
            "injury" => EventKind::Injury,
            "var_check" => EventKind::VarCheck,
            "var_overturned" => EventKind::VarOverturned,
            "penalty_saved" => EventKind::PenaltySaved,
            "goal_kick" => EventKind::GoalKick,
            "throw_in" => EventKind::ThrowIn,
            "free_kick" => EventKind::FreeKick,
            other => anyhow::bail!("unknown event kind: {other}"),
        };
        Ok(kind)
    }
}

/// A single in-game event. `team` names the acting team; for an own goal
/// that is the team whose player scored it, not the one credited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEvent {
    pub minute: u8,
    pub team: String,
    pub player: String,
    #[serde(flatten)]
    pub kind: EventKind,
}

/// Authoritative match record. Mutated only through the store's commit
/// path while live; `events` is append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: i64,
    pub league: String,
    pub home_team: String,
    pub away_team: String,
    pub home_roster: Vec<String>,
    pub away_roster: Vec<String>,
    pub home_score: u32,
    pub away_score: u32,
    pub kickoff_time: DateTime<Utc>,
    pub status: MatchStatus,
    pub events: Vec<MatchEvent>,
}

impl Match {
    pub fn team_name(&self, side: TeamSide) -> &str {
        match side {
            TeamSide::Home => &self.home_team,
            TeamSide::Away => &self.away_team,
        }
    }

    pub fn roster(&self, side: TeamSide) -> &[String] {
        match side {
            TeamSide::Home => &self.home_roster,
            TeamSide::Away => &self.away_roster,
        }
    }

    pub fn add_goal(&mut self, side: TeamSide) {
        match side {
            TeamSide::Home => self.home_score += 1,
            TeamSide::Away => self.away_score += 1,
        }
    }

    /// Project this record into its external representation at `now`.
    /// Deterministic: identical record + identical `now` always yield the
    /// same snapshot. `current_minute` is present only while live.
    pub fn snapshot(&self, now: DateTime<Utc>) -> MatchSnapshot {
        let current_minute = match self.status {
            MatchStatus::Live => Some(derived_minute(self.kickoff_time, now)),
            _ => None,
        };
        MatchSnapshot {
            id: self.id,
            league: self.league.clone(),
            home_team: self.home_team.clone(),
            away_team: self.away_team.clone(),
            home_score: self.home_score,
            away_score: self.away_score,
            kickoff_time: self.kickoff_time,
            status: self.status,
            current_minute,
            events: self.events.iter().map(EventSnapshot::from).collect(),
        }
    }
}

/// Wire representation of a match, as consumed by the frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub id: i64,
    pub league: String,
    pub home_team: String,
    pub away_team: String,
    pub home_score: u32,
    pub away_score: u32,
    pub kickoff_time: DateTime<Utc>,
    pub status: MatchStatus,
    pub current_minute: Option<u8>,
    pub events: Vec<EventSnapshot>,
}

/// Wire representation of an event: flat, with `sub_in` null for every
/// kind except substitutions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSnapshot {
    pub minute: u8,
    pub team: String,
    pub player: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub sub_in: Option<String>,
}

impl From<&MatchEvent> for EventSnapshot {
    fn from(event: &MatchEvent) -> Self {
        Self {
            minute: event.minute,
            team: event.team.clone(),
            player: event.player.clone(),
            kind: event.kind.as_str().to_string(),
            sub_in: event.kind.sub_in().map(str::to_string),
        }
    }
}

/// Storage backend, chosen once at construction. Never a runtime toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageMode {
    Memory,
    Sqlite(String),
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub tick_interval: Duration,
    pub push_interval: Duration,
    pub storage: StorageMode,
    pub sim_seed: Option<u64>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse()
            .unwrap_or(8000);

        let tick_interval = std::env::var("TICK_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&v| v > 0)
            .unwrap_or(5);

        let push_interval = std::env::var("PUSH_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&v| v > 0)
            .unwrap_or(2);

        let storage = match std::env::var("STORAGE_MODE").as_deref() {
            Ok("sqlite") => {
                let path = std::env::var("DB_PATH")
                    .unwrap_or_else(|_| "./livescore.db".to_string());
                StorageMode::Sqlite(path)
            }
            Ok("memory") | Err(_) => StorageMode::Memory,
            Ok(other) => anyhow::bail!("unknown STORAGE_MODE: {other}"),
        };

        let sim_seed = std::env::var("SIM_SEED")
            .ok()
            .and_then(|v| v.parse::<u64>().ok());

        Ok(Self {
            port,
            tick_interval: Duration::from_secs(tick_interval),
            push_interval: Duration::from_secs(push_interval),
            storage,
            sim_seed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_match(status: MatchStatus) -> Match {
        Match {
            id: 1,
            league: "Premier League".to_string(),
            home_team: "Arsenal".to_string(),
            away_team: "Chelsea".to_string(),
            home_roster: vec!["Bukayo Saka".to_string()],
            away_roster: vec!["Cole Palmer".to_string()],
            home_score: 1,
            away_score: 0,
            kickoff_time: Utc.with_ymd_and_hms(2024, 10, 26, 15, 0, 0).unwrap(),
            status,
            events: vec![
                MatchEvent {
                    minute: 23,
                    team: "Arsenal".to_string(),
                    player: "Bukayo Saka".to_string(),
                    kind: EventKind::Goal,
                },
                MatchEvent {
                    minute: 61,
                    team: "Chelsea".to_string(),
                    player: "Raheem Sterling".to_string(),
                    kind: EventKind::Substitution {
                        sub_in: "Cole Palmer".to_string(),
                    },
                },
            ],
        }
    }

    #[test]
    fn snapshot_minute_present_only_while_live() {
        let now = Utc.with_ymd_and_hms(2024, 10, 26, 15, 30, 0).unwrap();

        let live = sample_match(MatchStatus::Live).snapshot(now);
        assert_eq!(live.current_minute, Some(30));

        let scheduled = sample_match(MatchStatus::Scheduled).snapshot(now);
        assert_eq!(scheduled.current_minute, None);

        let finished = sample_match(MatchStatus::Finished).snapshot(now);
        assert_eq!(finished.current_minute, None);
    }

    #[test]
    fn snapshot_is_deterministic() {
        let now = Utc.with_ymd_and_hms(2024, 10, 26, 16, 0, 0).unwrap();
        let m = sample_match(MatchStatus::Live);
        assert_eq!(m.snapshot(now), m.snapshot(now));
    }

    #[test]
    fn event_snapshot_wire_shape() {
        let now = Utc.with_ymd_and_hms(2024, 10, 26, 16, 0, 0).unwrap();
        let snapshot = sample_match(MatchStatus::Live).snapshot(now);
        let json = serde_json::to_value(&snapshot).unwrap();

        let goal = &json["events"][0];
        assert_eq!(goal["type"], "goal");
        assert!(goal["sub_in"].is_null());

        let sub = &json["events"][1];
        assert_eq!(sub["type"], "substitution");
        assert_eq!(sub["sub_in"], "Cole Palmer");
    }

    #[test]
    fn event_kind_parts_roundtrip() {
        let kinds = [
            EventKind::Goal,
            EventKind::OwnGoal,
            EventKind::VarOverturned,
            EventKind::Substitution {
                sub_in: "Kai Havertz".to_string(),
            },
        ];
        for kind in kinds {
            let rebuilt = EventKind::from_parts(
                kind.as_str(),
                kind.sub_in().map(str::to_string),
            )
            .unwrap();
            assert_eq!(rebuilt, kind);
        }

        assert!(EventKind::from_parts("substitution", None).is_err());
        assert!(EventKind::from_parts("rocket", None).is_err());
    }

    #[test]
    fn status_string_roundtrip() {
        for status in [
            MatchStatus::Scheduled,
            MatchStatus::Live,
            MatchStatus::Finished,
        ] {
            assert_eq!(MatchStatus::from_str(status.as_str()).unwrap(), status);
        }
        assert!(MatchStatus::from_str("postponed").is_err());
    }
}
