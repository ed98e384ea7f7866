//! Authoritative per-match state store.
//!
//! One locked cell per match id, built once at startup. All mutation goes
//! through [`MatchStore::run_cycle`], which commits score, events and
//! status as a single unit: readers observe either the pre-cycle or the
//! fully-committed post-cycle record, never a torn update.

pub mod db;

use crate::models::{Match, MatchEvent, MatchSnapshot};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use tokio::sync::RwLock;

use db::MatchDb;

#[derive(Debug)]
pub enum StoreError {
    NotFound(i64),
    Unavailable(anyhow::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound(id) => write!(f, "match {id} not found"),
            StoreError::Unavailable(e) => write!(f, "store unavailable: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Outcome of one generation cycle against the store.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleResult {
    /// A cycle already ran inside the current generation window.
    NotDue,
    Ran { generated: Option<MatchEvent> },
}

struct MatchCell {
    record: Match,
    last_cycle_at: Option<DateTime<Utc>>,
}

pub struct MatchStore {
    cells: BTreeMap<i64, RwLock<MatchCell>>,
    db: Option<MatchDb>,
}

impl MatchStore {
    /// Fixture-backed store: records live only in memory.
    pub fn in_memory(matches: Vec<Match>) -> Self {
        Self {
            cells: Self::build_cells(matches),
            db: None,
        }
    }

    /// Durable store: records are loaded from sqlite at startup and every
    /// committed cycle is persisted before it becomes visible.
    pub fn with_sqlite(db: MatchDb) -> anyhow::Result<Self> {
        let matches = db.load_all()?;
        Ok(Self {
            cells: Self::build_cells(matches),
            db: Some(db),
        })
    }

    fn build_cells(matches: Vec<Match>) -> BTreeMap<i64, RwLock<MatchCell>> {
        matches
            .into_iter()
            .map(|record| {
                (
                    record.id,
                    RwLock::new(MatchCell {
                        record,
                        last_cycle_at: None,
                    }),
                )
            })
            .collect()
    }

    /// All known match ids in ascending order.
    pub fn ids(&self) -> Vec<i64> {
        self.cells.keys().copied().collect()
    }

    pub async fn get(&self, id: i64) -> Result<Match, StoreError> {
        let cell = self.cells.get(&id).ok_or(StoreError::NotFound(id))?;
        Ok(cell.read().await.record.clone())
    }

    pub async fn get_snapshot(
        &self,
        id: i64,
        now: DateTime<Utc>,
    ) -> Result<MatchSnapshot, StoreError> {
        let cell = self.cells.get(&id).ok_or(StoreError::NotFound(id))?;
        Ok(cell.read().await.record.snapshot(now))
    }

    /// Snapshots of every match in ascending id order.
    pub async fn snapshot_all(&self, now: DateTime<Utc>) -> Vec<MatchSnapshot> {
        let mut snapshots = Vec::with_capacity(self.cells.len());
        for cell in self.cells.values() {
            snapshots.push(cell.read().await.record.snapshot(now));
        }
        snapshots
    }

    /// The single mutate-and-commit path, used exclusively by the event
    /// generator. Holds the match's write lock for the whole cycle so
    /// tick- and pull-triggered passes can never interleave.
    ///
    /// A cycle is due only when at least `min_gap` has elapsed since the
    /// previous one; concurrent triggers inside the same window collapse
    /// into a single pass ([`CycleResult::NotDue`] for the losers).
    ///
    /// In sqlite mode the post-state is persisted before the in-memory
    /// swap. A persistence failure leaves the record untouched and does
    /// not consume the window, so the next trigger retries.
    pub async fn run_cycle<F>(
        &self,
        id: i64,
        now: DateTime<Utc>,
        min_gap: Duration,
        generate: F,
    ) -> Result<CycleResult, StoreError>
    where
        F: FnOnce(&mut Match) -> Option<MatchEvent>,
    {
        let cell = self.cells.get(&id).ok_or(StoreError::NotFound(id))?;
        let mut cell = cell.write().await;

        if let Some(last) = cell.last_cycle_at {
            let elapsed = now.signed_duration_since(last).num_milliseconds();
            if elapsed < min_gap.as_millis() as i64 {
                return Ok(CycleResult::NotDue);
            }
        }

        let mut working = cell.record.clone();
        let generated = generate(&mut working);

        if working != cell.record {
            if let Some(db) = &self.db {
                db.commit_cycle(&working, generated.as_ref())
                    .map_err(StoreError::Unavailable)?;
            }
            cell.record = working;
        }
        cell.last_cycle_at = Some(now);

        Ok(CycleResult::Ran { generated })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventKind, MatchStatus};
    use chrono::TimeZone;

    fn sample_match(id: i64) -> Match {
        Match {
            id,
            league: "Premier League".to_string(),
            home_team: "Arsenal".to_string(),
            away_team: "Chelsea".to_string(),
            home_roster: vec!["Bukayo Saka".to_string()],
            away_roster: vec!["Cole Palmer".to_string()],
            home_score: 0,
            away_score: 0,
            kickoff_time: Utc.with_ymd_and_hms(2024, 10, 26, 15, 0, 0).unwrap(),
            status: MatchStatus::Live,
            events: Vec::new(),
        }
    }

    fn goal_event() -> MatchEvent {
        MatchEvent {
            minute: 10,
            team: "Arsenal".to_string(),
            player: "Bukayo Saka".to_string(),
            kind: EventKind::Goal,
        }
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let store = MatchStore::in_memory(vec![sample_match(1)]);
        assert!(matches!(store.get(9999).await, Err(StoreError::NotFound(9999))));
    }

    #[tokio::test]
    async fn ids_are_ascending() {
        let store =
            MatchStore::in_memory(vec![sample_match(3), sample_match(1), sample_match(2)]);
        assert_eq!(store.ids(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn commit_is_all_or_nothing() {
        let store = MatchStore::in_memory(vec![sample_match(1)]);
        let now = Utc.with_ymd_and_hms(2024, 10, 26, 15, 10, 0).unwrap();

        let result = store
            .run_cycle(1, now, Duration::from_secs(5), |m| {
                m.home_score += 1;
                let event = goal_event();
                m.events.push(event.clone());
                Some(event)
            })
            .await
            .unwrap();

        assert!(matches!(result, CycleResult::Ran { generated: Some(_) }));
        let record = store.get(1).await.unwrap();
        assert_eq!(record.home_score, 1);
        assert_eq!(record.events.len(), 1);
    }

    #[tokio::test]
    async fn second_cycle_in_window_is_not_due() {
        let store = MatchStore::in_memory(vec![sample_match(1)]);
        let now = Utc.with_ymd_and_hms(2024, 10, 26, 15, 10, 0).unwrap();
        let gap = Duration::from_secs(5);

        let first = store
            .run_cycle(1, now, gap, |m| {
                let event = goal_event();
                m.home_score += 1;
                m.events.push(event.clone());
                Some(event)
            })
            .await
            .unwrap();
        assert!(matches!(first, CycleResult::Ran { .. }));

        let second = store
            .run_cycle(1, now + chrono::Duration::seconds(2), gap, |m| {
                let event = goal_event();
                m.home_score += 1;
                m.events.push(event.clone());
                Some(event)
            })
            .await
            .unwrap();
        assert_eq!(second, CycleResult::NotDue);
        assert_eq!(store.get(1).await.unwrap().events.len(), 1);

        let third = store
            .run_cycle(1, now + chrono::Duration::seconds(6), gap, |_| None)
            .await
            .unwrap();
        assert!(matches!(third, CycleResult::Ran { generated: None }));
    }
}
