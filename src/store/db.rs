//! Sqlite-backed match persistence.
//!
//! The in-memory store stays authoritative at runtime; this layer makes
//! committed cycles durable. WAL mode keeps reads cheap while the
//! generator writes.

use crate::models::{EventKind, Match, MatchEvent, MatchStatus};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OpenFlags};
use tracing::info;

const SCHEMA_SQL: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS matches (
    id INTEGER PRIMARY KEY,
    league TEXT NOT NULL,
    home_team TEXT NOT NULL,
    away_team TEXT NOT NULL,
    home_roster_json TEXT NOT NULL,
    away_roster_json TEXT NOT NULL,
    home_score INTEGER NOT NULL,
    away_score INTEGER NOT NULL,
    kickoff_time TEXT NOT NULL,
    status TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS match_events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    match_id INTEGER NOT NULL REFERENCES matches(id),
    minute INTEGER NOT NULL,
    team TEXT NOT NULL,
    player TEXT NOT NULL,
    type TEXT NOT NULL,
    sub_in TEXT
);

CREATE INDEX IF NOT EXISTS idx_match_events_match
    ON match_events(match_id, id);
"#;

pub struct MatchDb {
    conn: Mutex<Connection>,
}

impl MatchDb {
    pub fn open(db_path: &str) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX; // We handle our own locking

        let conn = Connection::open_with_flags(db_path, flags)
            .with_context(|| format!("Failed to open database at {}", db_path))?;

        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to initialize database schema")?;

        info!("📊 Match database ready at: {}", db_path);
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn is_empty(&self) -> Result<bool> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM matches", [], |row| row.get(0))?;
        Ok(count == 0)
    }

    /// Insert a full match record with its event history. Seed-time only.
    pub fn insert_match(&self, m: &Match) -> Result<()> {
        let home_roster = serde_json::to_string(&m.home_roster)?;
        let away_roster = serde_json::to_string(&m.away_roster)?;

        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO matches
             (id, league, home_team, away_team, home_roster_json, away_roster_json,
              home_score, away_score, kickoff_time, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                m.id,
                &m.league,
                &m.home_team,
                &m.away_team,
                &home_roster,
                &away_roster,
                m.home_score,
                m.away_score,
                m.kickoff_time.to_rfc3339(),
                m.status.as_str(),
            ],
        )?;
        for event in &m.events {
            insert_event(&tx, m.id, event)?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Persist one committed cycle: score/status update plus the appended
    /// event, in a single transaction.
    pub fn commit_cycle(&self, m: &Match, appended: Option<&MatchEvent>) -> Result<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let changed = tx.execute(
            "UPDATE matches SET home_score = ?1, away_score = ?2, status = ?3 WHERE id = ?4",
            params![m.home_score, m.away_score, m.status.as_str(), m.id],
        )?;
        if changed != 1 {
            anyhow::bail!("match {} missing from database", m.id);
        }
        if let Some(event) = appended {
            insert_event(&tx, m.id, event)?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Load every stored match with its ordered event history.
    pub fn load_all(&self) -> Result<Vec<Match>> {
        let conn = self.conn.lock();

        let mut stmt = conn.prepare(
            "SELECT id, league, home_team, away_team, home_roster_json, away_roster_json,
                    home_score, away_score, kickoff_time, status
             FROM matches ORDER BY id",
        )?;
        let mut matches: Vec<Match> = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, u32>(6)?,
                    row.get::<_, u32>(7)?,
                    row.get::<_, String>(8)?,
                    row.get::<_, String>(9)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?
            .into_iter()
            .map(|row| {
                let (
                    id,
                    league,
                    home_team,
                    away_team,
                    home_roster,
                    away_roster,
                    home_score,
                    away_score,
                    kickoff,
                    status,
                ) = row;
                Ok(Match {
                    id,
                    league,
                    home_team,
                    away_team,
                    home_roster: serde_json::from_str(&home_roster)?,
                    away_roster: serde_json::from_str(&away_roster)?,
                    home_score,
                    away_score,
                    kickoff_time: parse_kickoff(&kickoff)?,
                    status: MatchStatus::from_str(&status)?,
                    events: Vec::new(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(
            "SELECT match_id, minute, team, player, type, sub_in
             FROM match_events ORDER BY match_id, id",
        )?;
        let events = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, u8>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, Option<String>>(5)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for (match_id, minute, team, player, kind, sub_in) in events {
            let event = MatchEvent {
                minute,
                team,
                player,
                kind: EventKind::from_parts(&kind, sub_in)?,
            };
            if let Some(m) = matches.iter_mut().find(|m| m.id == match_id) {
                m.events.push(event);
            }
        }

        Ok(matches)
    }
}

/// Kickoffs are stored as RFC 3339. Legacy rows carry naive timestamps
/// (the original schema had no zone); those are normalized to UTC here,
/// at the load boundary, before any comparison can happen.
fn parse_kickoff(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .with_context(|| format!("unparseable kickoff time: {s}"))?;
    Ok(Utc.from_utc_datetime(&naive))
}

fn insert_event(tx: &rusqlite::Transaction<'_>, match_id: i64, event: &MatchEvent) -> Result<()> {
    tx.execute(
        "INSERT INTO match_events (match_id, minute, team, player, type, sub_in)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            match_id,
            event.minute,
            &event.team,
            &event.player,
            event.kind.as_str(),
            event.kind.sub_in(),
        ],
    )?;
    Ok(())
}
