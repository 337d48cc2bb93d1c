use super::{Cell, ScopedConnection};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::path::PathBuf;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub id: i64,
    pub name: String,
    /// `indoor` or `outdoor`
    pub event_type: String,
    pub description: String,
    pub location: String,
    pub date: String,
}

/// Lookup of events by exact date.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn events_on(&self, date: NaiveDate, event_type: Option<&str>) -> Result<Vec<Event>>;
}

#[derive(Debug, Clone)]
pub struct EventStore {
    path: PathBuf,
}

/// (name, type, description, location) rows seeded for "today"
const TODAY_EVENTS: [(&str, &str, &str, &str); 4] = [
    ("AI Tech Summit", "indoor", "A deep dive into generative AI.", "Suntec Convention Centre"),
    ("Singapore Airshow", "outdoor", "International aerospace and defence exhibitions", "Changi Exhibition Centre"),
    ("Marina Bay Night Run", "outdoor", "A 5km fun run around the bay.", "Marina Bay Sands"),
    ("Jazz in the Park", "outdoor", "Relaxing evening with live jazz music.", "Botanic Gardens"),
];

const TOMORROW_EVENTS: [(&str, &str, &str, &str); 4] = [
    ("Gourmet Food Festival", "indoor", "Taste dishes from around the world.", "Food Republic @ VivoCity"),
    ("Theater Show", "indoor", "Classical drama", "Grand Theater"),
    ("Cybersecurity Asia 2025", "indoor", "Tech conference", "Marina Bay Sands"),
    ("Movies at The Fort", "outdoor", "Lifestyle", "Fort Canning Park"),
];

impl EventStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Recreate the events table with the sample catalogue for `today` and
    /// the day after.
    pub async fn seed(&self, today: NaiveDate) -> Result<()> {
        let conn = ScopedConnection::open(&self.path).await?;
        let seed_err = |e: libsql::Error| AppError::Database(format!("Failed to seed events: {}", e));

        conn.execute("DROP TABLE IF EXISTS events", ())
            .await
            .map_err(seed_err)?;
        conn.execute(
            "CREATE TABLE events (
                id INTEGER PRIMARY KEY,
                name TEXT,
                type TEXT,
                description TEXT,
                location TEXT,
                date TEXT
            )",
            (),
        )
        .await
        .map_err(seed_err)?;

        let tomorrow = today
            .checked_add_days(Days::new(1))
            .ok_or_else(|| AppError::InvalidInput(format!("No day after {}", today)))?;
        let batches = [(today, &TODAY_EVENTS), (tomorrow, &TOMORROW_EVENTS)];

        for (date, events) in batches {
            let date = date.format(DATE_FORMAT).to_string();
            for (name, event_type, description, location) in events.iter() {
                conn.execute(
                    "INSERT INTO events (name, type, description, location, date) VALUES (?, ?, ?, ?, ?)",
                    (*name, *event_type, *description, *location, date.as_str()),
                )
                .await
                .map_err(seed_err)?;
            }
        }

        tracing::info!(path = %self.path.display(), %today, "Event store seeded");
        Ok(())
    }
}

fn text(cell: &Cell) -> String {
    match cell {
        Cell::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl EventSource for EventStore {
    async fn events_on(&self, date: NaiveDate, event_type: Option<&str>) -> Result<Vec<Event>> {
        let conn = ScopedConnection::open(&self.path).await?;
        let date = date.format(DATE_FORMAT).to_string();

        let sql = "SELECT id, name, type, description, location, date FROM events WHERE date = ?";
        let result = match event_type {
            Some(event_type) => {
                super::fetch_all(
                    &conn,
                    &format!("{} AND type = ?", sql),
                    (date.as_str(), event_type),
                )
                .await
            }
            None => super::fetch_all(&conn, sql, [date.as_str()]).await,
        }
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result
            .rows
            .iter()
            .map(|row| Event {
                id: match row.first() {
                    Some(Cell::Integer(id)) => *id,
                    _ => 0,
                },
                name: row.get(1).map(text).unwrap_or_default(),
                event_type: row.get(2).map(text).unwrap_or_default(),
                description: row.get(3).map(text).unwrap_or_default(),
                location: row.get(4).map(text).unwrap_or_default(),
                date: row.get(5).map(text).unwrap_or_default(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, d).unwrap()
    }

    #[tokio::test]
    async fn test_exact_date_match() {
        let dir = tempfile::tempdir().unwrap();
        let store = EventStore::new(dir.path().join("events.db"));
        store.seed(day(26)).await.unwrap();

        let today = store.events_on(day(26), None).await.unwrap();
        assert_eq!(today.len(), 4);
        assert!(today.iter().all(|e| e.date == "2025-10-26"));
        assert_eq!(today[0].name, "AI Tech Summit");

        let tomorrow = store.events_on(day(27), None).await.unwrap();
        assert_eq!(tomorrow.len(), 4);

        assert!(store.events_on(day(28), None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_type_filter() {
        let dir = tempfile::tempdir().unwrap();
        let store = EventStore::new(dir.path().join("events.db"));
        store.seed(day(26)).await.unwrap();

        let indoor = store.events_on(day(26), Some("indoor")).await.unwrap();
        assert_eq!(indoor.len(), 1);
        assert_eq!(indoor[0].location, "Suntec Convention Centre");
    }

    #[tokio::test]
    async fn test_reseed_replaces_catalogue() {
        let dir = tempfile::tempdir().unwrap();
        let store = EventStore::new(dir.path().join("events.db"));
        store.seed(day(26)).await.unwrap();
        store.seed(day(26)).await.unwrap();

        assert_eq!(store.events_on(day(26), None).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_missing_table_is_database_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = EventStore::new(dir.path().join("empty.db"));

        let result = store.events_on(day(26), None).await;
        assert!(matches!(result, Err(AppError::Database(_))));
    }
}
