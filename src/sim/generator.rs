//! Per-match event generation.
//!
//! One cycle per match per generation window, triggered by the tick
//! scheduler or by a pull request, whichever comes first. All mutation
//! flows through the store's commit path, so both triggers share one
//! serialization point.

use crate::clock::{derived_minute, Clock, FULL_TIME_MINUTE};
use crate::models::{EventKind, Match, MatchEvent, MatchStatus, TeamSide};
use crate::store::{CycleResult, MatchStore, StoreError};
use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Chance that a generation cycle produces an event. Source revisions
/// disagreed (anywhere from 2% to 50%); this is the one authoritative
/// value. Tests pin it to 1.0 or 0.0 through [`SimConfig`].
pub const EVENT_PROBABILITY: f64 = 0.15;

/// Stand-in player name when a roster is empty. Event synthesis never
/// fails on degenerate input.
pub const UNKNOWN_PLAYER: &str = "Unknown Player";

#[derive(Debug, Clone, Copy)]
enum KindTag {
    Goal,
    OwnGoal,
    YellowCard,
    RedCard,
    Substitution,
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

const EVENT_CATALOG: [KindTag; 16] = [
    KindTag::Goal,
    KindTag::OwnGoal,
    KindTag::YellowCard,
    KindTag::RedCard,
    KindTag::Substitution,
    KindTag::Corner,
    KindTag::Offside,
    KindTag::Foul,
    KindTag::Handball,
    KindTag::Injury,
    KindTag::VarCheck,
    KindTag::VarOverturned,
    KindTag::PenaltySaved,
    KindTag::GoalKick,
    KindTag::ThrowIn,
    KindTag::FreeKick,
];

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub event_probability: f64,
    /// Full generation window. A new cycle becomes due once half of it
    /// has elapsed, which keeps scheduler ticks due under timer jitter
    /// while still collapsing concurrent triggers into one pass.
    pub tick_interval: Duration,
    pub seed: Option<u64>,
}

impl SimConfig {
    pub fn new(tick_interval: Duration) -> Self {
        Self {
            event_probability: EVENT_PROBABILITY,
            tick_interval,
            seed: None,
        }
    }

    fn cycle_gap(&self) -> Duration {
        self.tick_interval / 2
    }
}

/// Owns the injected clock and RNG and drives generation cycles against
/// the store.
pub struct Simulation {
    store: Arc<MatchStore>,
    clock: Arc<dyn Clock>,
    rng: Mutex<ChaCha8Rng>,
    config: SimConfig,
}

impl Simulation {
    pub fn new(store: Arc<MatchStore>, clock: Arc<dyn Clock>, config: SimConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            store,
            clock,
            rng: Mutex::new(rng),
            config,
        }
    }

    /// Run one generation cycle for a match, if one is due.
    pub async fn advance(&self, id: i64) -> Result<CycleResult, StoreError> {
        let now = self.clock.now();
        let result = self
            .store
            .run_cycle(id, now, self.config.cycle_gap(), |m| {
                let mut rng = self.rng.lock();
                generate_event(m, now, &mut rng, self.config.event_probability)
            })
            .await?;

        if let CycleResult::Ran {
            generated: Some(event),
        } = &result
        {
            info!(
                match_id = id,
                minute = event.minute,
                kind = event.kind.as_str(),
                team = %event.team,
                "event generated"
            );
        }
        Ok(result)
    }

    /// Run one due cycle for every match. Store failures are logged per
    /// match and do not stop the sweep.
    pub async fn advance_all(&self) -> usize {
        let mut generated = 0;
        for id in self.store.ids() {
            match self.advance(id).await {
                Ok(CycleResult::Ran {
                    generated: Some(_),
                }) => generated += 1,
                Ok(_) => {}
                Err(e) => error!(match_id = id, "generation cycle failed: {e:?}"),
            }
        }
        generated
    }
}

/// One generation pass over a single match record. Pure with respect to
/// its inputs: state, wall time, RNG draw.
fn generate_event(
    m: &mut Match,
    now: chrono::DateTime<chrono::Utc>,
    rng: &mut ChaCha8Rng,
    event_probability: f64,
) -> Option<MatchEvent> {
    if m.status == MatchStatus::Scheduled && now >= m.kickoff_time {
        m.status = MatchStatus::Live;
        info!(match_id = m.id, "⚽ kickoff, match is live");
    }
    if m.status != MatchStatus::Live {
        return None;
    }

    let minute = derived_minute(m.kickoff_time, now);
    if minute >= FULL_TIME_MINUTE {
        m.status = MatchStatus::Finished;
        info!(match_id = m.id, "full time");
        return None;
    }

    if !rng.gen_bool(event_probability) {
        return None;
    }

    let tag = EVENT_CATALOG[rng.gen_range(0..EVENT_CATALOG.len())];
    let side = if rng.gen_bool(0.5) {
        TeamSide::Home
    } else {
        TeamSide::Away
    };
    let roster = m.roster(side);
    let (player, player_idx) = pick_player(roster, rng);

    let kind = match tag {
        KindTag::Goal => EventKind::Goal,
        KindTag::OwnGoal => EventKind::OwnGoal,
        KindTag::YellowCard => EventKind::YellowCard,
        KindTag::RedCard => EventKind::RedCard,
        KindTag::Substitution => EventKind::Substitution {
            sub_in: pick_sub_in(roster, player_idx, rng),
        },
        KindTag::Corner => EventKind::Corner,
        KindTag::Offside => EventKind::Offside,
        KindTag::Foul => EventKind::Foul,
        KindTag::Handball => EventKind::Handball,
        KindTag::Injury => EventKind::Injury,
        KindTag::VarCheck => EventKind::VarCheck,
        KindTag::VarOverturned => EventKind::VarOverturned,
        KindTag::PenaltySaved => EventKind::PenaltySaved,
        KindTag::GoalKick => EventKind::GoalKick,
        KindTag::ThrowIn => EventKind::ThrowIn,
        KindTag::FreeKick => EventKind::FreeKick,
    };

    apply_scoring(m, side, &kind);

    let event = MatchEvent {
        minute,
        team: m.team_name(side).to_string(),
        player,
        kind,
    };
    m.events.push(event.clone());
    Some(event)
}

/// A goal credits the scoring side; an own goal credits the side that
/// benefits, never the actor's own.
fn apply_scoring(m: &mut Match, acting_side: TeamSide, kind: &EventKind) {
    match kind {
        EventKind::Goal => m.add_goal(acting_side),
        EventKind::OwnGoal => m.add_goal(acting_side.opponent()),
        _ => {}
    }
}

fn pick_player(roster: &[String], rng: &mut ChaCha8Rng) -> (String, Option<usize>) {
    if roster.is_empty() {
        return (UNKNOWN_PLAYER.to_string(), None);
    }
    let idx = rng.gen_range(0..roster.len());
    (roster[idx].clone(), Some(idx))
}

/// Incoming player for a substitution: distinct from the outgoing one
/// whenever the roster allows, a repeat otherwise.
fn pick_sub_in(roster: &[String], out_idx: Option<usize>, rng: &mut ChaCha8Rng) -> String {
    match (roster.len(), out_idx) {
        (0, _) | (_, None) => UNKNOWN_PLAYER.to_string(),
        (1, Some(_)) => roster[0].clone(),
        (len, Some(out)) => {
            let idx = rng.gen_range(0..len - 1);
            let idx = if idx >= out { idx + 1 } else { idx };
            roster[idx].clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};

    fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    fn live_match() -> Match {
        Match {
            id: 1,
            league: "Premier League".to_string(),
            home_team: "Arsenal".to_string(),
            away_team: "Chelsea".to_string(),
            home_roster: vec![
                "Bukayo Saka".to_string(),
                "Declan Rice".to_string(),
                "Gabriel Martinelli".to_string(),
            ],
            away_roster: vec![
                "Cole Palmer".to_string(),
                "Nicolas Jackson".to_string(),
            ],
            home_score: 0,
            away_score: 0,
            kickoff_time: Utc.with_ymd_and_hms(2024, 10, 26, 15, 0, 0).unwrap(),
            status: MatchStatus::Live,
            events: Vec::new(),
        }
    }

    fn recompute_scores(m: &Match) -> (u32, u32) {
        let mut home = 0;
        let mut away = 0;
        for event in &m.events {
            match event.kind {
                EventKind::Goal => {
                    if event.team == m.home_team {
                        home += 1;
                    } else {
                        away += 1;
                    }
                }
                EventKind::OwnGoal => {
                    if event.team == m.home_team {
                        away += 1;
                    } else {
                        home += 1;
                    }
                }
                _ => {}
            }
        }
        (home, away)
    }

    #[test]
    fn certain_trigger_appends_one_event_at_derived_minute() {
        let mut m = live_match();
        let now = m.kickoff_time + ChronoDuration::minutes(15);
        let mut rng = rng(42);

        let event = generate_event(&mut m, now, &mut rng, 1.0).unwrap();
        assert_eq!(event.minute, 15);
        assert_eq!(m.events.len(), 1);
        assert_eq!(m.events[0], event);
    }

    #[test]
    fn zero_probability_never_generates() {
        let mut m = live_match();
        let now = m.kickoff_time + ChronoDuration::minutes(20);
        let mut rng = rng(42);

        for _ in 0..50 {
            assert!(generate_event(&mut m, now, &mut rng, 0.0).is_none());
        }
        assert!(m.events.is_empty());
    }

    #[test]
    fn non_live_match_is_untouched() {
        let mut m = live_match();
        m.status = MatchStatus::Finished;
        let before = m.clone();
        let now = m.kickoff_time + ChronoDuration::minutes(30);

        assert!(generate_event(&mut m, now, &mut rng(1), 1.0).is_none());
        assert_eq!(m, before);
    }

    #[test]
    fn scheduled_match_activates_after_kickoff() {
        let mut m = live_match();
        m.status = MatchStatus::Scheduled;

        let before_kickoff = m.kickoff_time - ChronoDuration::minutes(5);
        assert!(generate_event(&mut m, before_kickoff, &mut rng(1), 0.0).is_none());
        assert_eq!(m.status, MatchStatus::Scheduled);

        let after_kickoff = m.kickoff_time + ChronoDuration::minutes(1);
        assert!(generate_event(&mut m, after_kickoff, &mut rng(1), 0.0).is_none());
        assert_eq!(m.status, MatchStatus::Live);
    }

    #[test]
    fn finishes_at_full_time_without_new_events() {
        let mut m = live_match();
        m.events.push(MatchEvent {
            minute: 12,
            team: "Arsenal".to_string(),
            player: "Bukayo Saka".to_string(),
            kind: EventKind::Goal,
        });
        m.home_score = 1;
        let events_before = m.events.len();

        let now = m.kickoff_time + ChronoDuration::minutes(120);
        assert!(generate_event(&mut m, now, &mut rng(7), 1.0).is_none());
        assert_eq!(m.status, MatchStatus::Finished);
        assert_eq!(m.events.len(), events_before);

        // Finished is terminal: a later cycle changes nothing.
        let later = now + ChronoDuration::minutes(30);
        assert!(generate_event(&mut m, later, &mut rng(7), 1.0).is_none());
        assert_eq!(m.status, MatchStatus::Finished);
        assert_eq!(m.events.len(), events_before);
    }

    #[test]
    fn own_goal_credits_the_opposing_team() {
        let mut m = live_match();
        apply_scoring(&mut m, TeamSide::Home, &EventKind::OwnGoal);
        assert_eq!((m.home_score, m.away_score), (0, 1));

        apply_scoring(&mut m, TeamSide::Away, &EventKind::OwnGoal);
        assert_eq!((m.home_score, m.away_score), (1, 1));
    }

    #[test]
    fn goal_credits_the_scoring_team() {
        let mut m = live_match();
        apply_scoring(&mut m, TeamSide::Home, &EventKind::Goal);
        apply_scoring(&mut m, TeamSide::Home, &EventKind::Goal);
        apply_scoring(&mut m, TeamSide::Away, &EventKind::Goal);
        assert_eq!((m.home_score, m.away_score), (2, 1));
    }

    #[test]
    fn non_scoring_kinds_leave_the_score_alone() {
        let mut m = live_match();
        for kind in [
            EventKind::YellowCard,
            EventKind::Corner,
            EventKind::VarCheck,
            EventKind::Substitution {
                sub_in: "Declan Rice".to_string(),
            },
        ] {
            apply_scoring(&mut m, TeamSide::Home, &kind);
        }
        assert_eq!((m.home_score, m.away_score), (0, 0));
    }

    #[test]
    fn score_matches_event_log_after_many_cycles() {
        let mut m = live_match();
        let mut rng = rng(1337);

        for step in 0..200 {
            let now = m.kickoff_time + ChronoDuration::seconds(20 * step);
            let before = m.events.len();
            generate_event(&mut m, now, &mut rng, 1.0);
            assert!(m.events.len() >= before);
            assert_eq!((m.home_score, m.away_score), recompute_scores(&m));
            if let Some(event) = m.events.last() {
                assert!(event.minute <= derived_minute(m.kickoff_time, now));
            }
        }
        assert!(!m.events.is_empty());
    }

    #[test]
    fn deterministic_for_identical_seed() {
        let run = |seed: u64| {
            let mut m = live_match();
            let mut rng = rng(seed);
            for step in 0..50 {
                let now = m.kickoff_time + ChronoDuration::seconds(30 * step);
                generate_event(&mut m, now, &mut rng, 0.5);
            }
            m
        };
        assert_eq!(run(99), run(99));
    }

    #[test]
    fn empty_roster_falls_back_to_sentinel() {
        let mut m = live_match();
        m.home_roster.clear();
        m.away_roster.clear();
        let now = m.kickoff_time + ChronoDuration::minutes(10);

        let event = generate_event(&mut m, now, &mut rng(5), 1.0).unwrap();
        assert_eq!(event.player, UNKNOWN_PLAYER);
    }

    #[test]
    fn substitution_picks_a_distinct_incoming_player() {
        let roster: Vec<String> = ["A", "B", "C", "D"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut rng = rng(11);
        for out in 0..roster.len() {
            for _ in 0..20 {
                let incoming = pick_sub_in(&roster, Some(out), &mut rng);
                assert_ne!(incoming, roster[out]);
            }
        }
    }

    #[test]
    fn single_player_roster_permits_a_repeat() {
        let roster = vec!["A".to_string()];
        let incoming = pick_sub_in(&roster, Some(0), &mut rng(3));
        assert_eq!(incoming, "A");
    }
}
