//! SQLite persistence for analysis history and price snapshots.
//!
//! Thin append-and-list layer. The knowledge tables are compiled in and
//! never touch the database; only things a farmer produced (an analysis)
//! or fetched (a price quote) are recorded.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Invalid stored value for {field}: {value}")]
    InvalidValue { field: String, value: String },
}

// ═══════════════════════════════════════════════════════════
// Connection setup
// ═══════════════════════════════════════════════════════════

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS crop_analyses (
        id               TEXT PRIMARY KEY,
        crop_type        TEXT NOT NULL,
        disease_detected TEXT NOT NULL,
        confidence       REAL NOT NULL,
        severity         TEXT NOT NULL,
        user_location    TEXT NOT NULL,
        timestamp        TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS price_snapshots (
        id          TEXT PRIMARY KEY,
        crop_name   TEXT NOT NULL,
        market_name TEXT NOT NULL,
        price       REAL NOT NULL,
        unit        TEXT NOT NULL,
        date        TEXT NOT NULL,
        timestamp   TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_analyses_timestamp
        ON crop_analyses (timestamp DESC);
";

/// Open a SQLite connection to the given path and ensure the schema exists.
pub fn open_store(path: &Path) -> Result<Connection, StoreError> {
    let conn = Connection::open(path)?;
    initialize(&conn)?;
    info!("Store opened at {}", path.display());
    Ok(conn)
}

/// Open an in-memory store (for testing).
pub fn open_memory_store() -> Result<Connection, StoreError> {
    let conn = Connection::open_in_memory()?;
    initialize(&conn)?;
    Ok(conn)
}

fn initialize(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch("PRAGMA journal_mode=DELETE; PRAGMA foreign_keys=ON;")?;
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

// ═══════════════════════════════════════════════════════════
// Analysis log
// ═══════════════════════════════════════════════════════════

/// One persisted disease-detection run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub crop_type: String,
    pub disease_detected: String,
    pub confidence: f64,
    pub severity: String,
    pub user_location: String,
    pub timestamp: DateTime<Utc>,
}

impl AnalysisRecord {
    pub fn new(
        crop_type: &str,
        disease_detected: &str,
        confidence: f64,
        severity: &str,
        user_location: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            crop_type: crop_type.to_string(),
            disease_detected: disease_detected.to_string(),
            confidence,
            severity: severity.to_string(),
            user_location: user_location.to_string(),
            timestamp: Utc::now(),
        }
    }
}

pub fn insert_analysis(conn: &Connection, record: &AnalysisRecord) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO crop_analyses (id, crop_type, disease_detected, confidence, severity, user_location, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            record.id.to_string(),
            record.crop_type,
            record.disease_detected,
            record.confidence,
            record.severity,
            record.user_location,
            record.timestamp.to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// Most recent analyses, newest first.
pub fn recent_analyses(conn: &Connection, limit: usize) -> Result<Vec<AnalysisRecord>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, crop_type, disease_detected, confidence, severity, user_location, timestamp
         FROM crop_analyses ORDER BY timestamp DESC LIMIT ?1",
    )?;

    let rows = stmt.query_map(params![limit as i64], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, f64>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
            row.get::<_, String>(6)?,
        ))
    })?;

    let mut records = Vec::new();
    for row in rows {
        let (id, crop_type, disease_detected, confidence, severity, user_location, timestamp) =
            row?;
        records.push(AnalysisRecord {
            id: parse_uuid(&id)?,
            crop_type,
            disease_detected,
            confidence,
            severity,
            user_location,
            timestamp: parse_timestamp(&timestamp)?,
        });
    }
    Ok(records)
}

pub fn count_analyses(conn: &Connection) -> Result<i64, StoreError> {
    let count = conn.query_row("SELECT COUNT(*) FROM crop_analyses", [], |row| row.get(0))?;
    Ok(count)
}

// ═══════════════════════════════════════════════════════════
// Price snapshots
// ═══════════════════════════════════════════════════════════

/// One market quote captured at fetch time.
#[derive(Debug, Clone, Serialize)]
pub struct PriceSnapshot {
    pub id: Uuid,
    pub crop_name: String,
    pub market_name: String,
    pub price: f64,
    pub unit: String,
    pub date: String,
    pub timestamp: DateTime<Utc>,
}

impl PriceSnapshot {
    pub fn new(crop_name: &str, market_name: &str, price: f64, unit: &str, date: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            crop_name: crop_name.to_string(),
            market_name: market_name.to_string(),
            price,
            unit: unit.to_string(),
            date: date.to_string(),
            timestamp: Utc::now(),
        }
    }
}

pub fn insert_price_snapshot(conn: &Connection, snap: &PriceSnapshot) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO price_snapshots (id, crop_name, market_name, price, unit, date, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            snap.id.to_string(),
            snap.crop_name,
            snap.market_name,
            snap.price,
            snap.unit,
            snap.date,
            snap.timestamp.to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// Snapshots for one crop, newest capture first.
pub fn snapshots_for_crop(
    conn: &Connection,
    crop_name: &str,
    limit: usize,
) -> Result<Vec<PriceSnapshot>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, crop_name, market_name, price, unit, date, timestamp
         FROM price_snapshots WHERE crop_name = ?1 ORDER BY timestamp DESC LIMIT ?2",
    )?;

    let rows = stmt.query_map(params![crop_name, limit as i64], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, f64>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
            row.get::<_, String>(6)?,
        ))
    })?;

    let mut snaps = Vec::new();
    for row in rows {
        let (id, crop_name, market_name, price, unit, date, timestamp) = row?;
        snaps.push(PriceSnapshot {
            id: parse_uuid(&id)?,
            crop_name,
            market_name,
            price,
            unit,
            date,
            timestamp: parse_timestamp(&timestamp)?,
        });
    }
    Ok(snaps)
}

fn parse_uuid(value: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(value).map_err(|_| StoreError::InvalidValue {
        field: "id".to_string(),
        value: value.to_string(),
    })
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| StoreError::InvalidValue {
            field: "timestamp".to_string(),
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_creates_both_tables() {
        let conn = open_memory_store().unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn initialize_is_idempotent() {
        let conn = open_memory_store().unwrap();
        assert!(initialize(&conn).is_ok());
    }

    #[test]
    fn analysis_round_trip() {
        let conn = open_memory_store().unwrap();
        let record = AnalysisRecord::new("tomato", "Early Blight", 0.87, "medium", "Mumbai");
        insert_analysis(&conn, &record).unwrap();

        let listed = recent_analyses(&conn, 10).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, record.id);
        assert_eq!(listed[0].crop_type, "tomato");
        assert_eq!(listed[0].disease_detected, "Early Blight");
        assert!((listed[0].confidence - 0.87).abs() < 1e-9);
        assert_eq!(listed[0].severity, "medium");
    }

    #[test]
    fn recent_analyses_newest_first_and_limited() {
        let conn = open_memory_store().unwrap();
        for i in 0..5 {
            let mut record =
                AnalysisRecord::new("potato", "Late Blight", 0.8, "medium", "Delhi");
            record.timestamp = Utc::now() + chrono::Duration::seconds(i);
            insert_analysis(&conn, &record).unwrap();
        }

        let listed = recent_analyses(&conn, 3).unwrap();
        assert_eq!(listed.len(), 3);
        assert!(listed[0].timestamp >= listed[1].timestamp);
        assert!(listed[1].timestamp >= listed[2].timestamp);
        assert_eq!(count_analyses(&conn).unwrap(), 5);
    }

    #[test]
    fn price_snapshots_filtered_by_crop() {
        let conn = open_memory_store().unwrap();
        insert_price_snapshot(
            &conn,
            &PriceSnapshot::new("tomato", "Mumbai APMC", 24.5, "kg", "2024-01-15"),
        )
        .unwrap();
        insert_price_snapshot(
            &conn,
            &PriceSnapshot::new("onion", "Delhi Azadpur", 16.5, "kg", "2024-01-15"),
        )
        .unwrap();

        let tomato = snapshots_for_crop(&conn, "tomato", 10).unwrap();
        assert_eq!(tomato.len(), 1);
        assert_eq!(tomato[0].market_name, "Mumbai APMC");
        assert!(snapshots_for_crop(&conn, "wheat", 10).unwrap().is_empty());
    }

    #[test]
    fn store_persists_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        {
            let conn = open_store(&path).unwrap();
            let record = AnalysisRecord::new("tomato", "Healthy", 0.93, "low", "Bangalore");
            insert_analysis(&conn, &record).unwrap();
        }
        let conn = open_store(&path).unwrap();
        assert_eq!(count_analyses(&conn).unwrap(), 1);
    }
}
