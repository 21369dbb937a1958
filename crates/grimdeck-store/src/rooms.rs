//! The rooms table: insert, activity touch, snapshot save/load, sweep.

use chrono::{DateTime, Duration, Utc};
use grimdeck_protocol::RoomCode;
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use crate::{NewRoom, RoomRow, SaveReceipt, StoreError};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS rooms (
    id            TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    max_players   INTEGER NOT NULL,
    turn_duration INTEGER NOT NULL,
    selected_deck TEXT NOT NULL,
    player_count  INTEGER NOT NULL DEFAULT 0,
    created_at    TEXT NOT NULL,
    last_activity TEXT NOT NULL,
    state         BLOB
);
CREATE INDEX IF NOT EXISTS idx_rooms_last_activity
    ON rooms (last_activity);
";

/// Store for room rows, backed by an embedded SQLite database.
///
/// Safe for concurrent use: every operation touches a single row keyed
/// by room code, and SQLite serializes writers.
#[derive(Clone)]
pub struct RoomStore {
    pool: SqlitePool,
}

impl RoomStore {
    /// Connects to the database at `url` and creates the schema.
    ///
    /// In-memory databases get a single-connection pool — each SQLite
    /// `:memory:` connection is otherwise its own private database.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let max_connections = if url.contains("memory") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        sqlx::raw_sql(SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }

    /// Convenience for tests: a fresh in-memory store.
    pub async fn in_memory() -> Result<Self, StoreError> {
        Self::connect("sqlite::memory:").await
    }

    /// Returns the underlying pool (tests backdate rows through it).
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Inserts a fresh room row with no snapshot.
    pub async fn create(&self, room: &NewRoom) -> Result<(), StoreError> {
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO rooms
                (id, name, max_players, turn_duration, selected_deck,
                 player_count, created_at, last_activity)
             VALUES (?, ?, ?, ?, ?, 0, ?, ?)",
        )
        .bind(room.code.as_str())
        .bind(&room.name)
        .bind(room.max_players as i64)
        .bind(room.turn_duration as i64)
        .bind(&room.selected_deck)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Fetches a room's lifecycle row, if it exists.
    pub async fn fetch(
        &self,
        code: &RoomCode,
    ) -> Result<Option<RoomRow>, StoreError> {
        let row = sqlx::query(
            "SELECT id, name, max_players, turn_duration, selected_deck,
                    player_count, created_at, last_activity
             FROM rooms WHERE id = ?",
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(room_from_row).transpose()
    }

    /// Bumps `last_activity` (and optionally the player count).
    ///
    /// Lenient on missing rows: the row may already have been swept while
    /// the document was still in memory.
    pub async fn touch(
        &self,
        code: &RoomCode,
        player_count: Option<usize>,
    ) -> Result<(), StoreError> {
        let result = match player_count {
            Some(count) => {
                sqlx::query(
                    "UPDATE rooms SET last_activity = ?, player_count = ?
                     WHERE id = ?",
                )
                .bind(Utc::now())
                .bind(count as i64)
                .bind(code.as_str())
                .execute(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    "UPDATE rooms SET last_activity = ? WHERE id = ?",
                )
                .bind(Utc::now())
                .bind(code.as_str())
                .execute(&self.pool)
                .await?
            }
        };

        if result.rows_affected() == 0 {
            tracing::warn!(room = %code, "touch on a room with no row");
        }
        Ok(())
    }

    /// Writes the opaque snapshot blob into the room's row.
    ///
    /// Zero rows affected is an error, not a no-op — it indicates an
    /// orphaned save.
    pub async fn save_state(
        &self,
        code: &RoomCode,
        snapshot: &[u8],
        player_count: usize,
    ) -> Result<SaveReceipt, StoreError> {
        let result = sqlx::query(
            "UPDATE rooms
             SET state = ?, player_count = ?, last_activity = ?
             WHERE id = ?",
        )
        .bind(snapshot)
        .bind(player_count as i64)
        .bind(Utc::now())
        .bind(code.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::MissingRow(code.clone()));
        }

        tracing::debug!(
            room = %code,
            bytes = snapshot.len(),
            "snapshot saved"
        );
        Ok(SaveReceipt { state_size: snapshot.len() })
    }

    /// Reads the stored snapshot blob, if any.
    pub async fn load_state(
        &self,
        code: &RoomCode,
    ) -> Result<Option<Vec<u8>>, StoreError> {
        let row = sqlx::query("SELECT state FROM rooms WHERE id = ?")
            .bind(code.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.and_then(|r| r.get::<Option<Vec<u8>>, _>("state")))
    }

    /// Lists rooms with activity inside `window`, newest first, capped.
    pub async fn list_active(
        &self,
        window: Duration,
        cap: usize,
    ) -> Result<Vec<RoomRow>, StoreError> {
        let cutoff = Utc::now() - window;
        let rows = sqlx::query(
            "SELECT id, name, max_players, turn_duration, selected_deck,
                    player_count, created_at, last_activity
             FROM rooms
             WHERE last_activity > ?
             ORDER BY last_activity DESC
             LIMIT ?",
        )
        .bind(cutoff)
        .bind(cap as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(room_from_row).collect()
    }

    /// Deletes rooms idle for longer than `max_idle`. Returns the number
    /// of rows purged. Independent of whether a document is currently in
    /// memory for any of them.
    pub async fn cleanup(
        &self,
        max_idle: Duration,
    ) -> Result<u64, StoreError> {
        let cutoff = Utc::now() - max_idle;
        let result =
            sqlx::query("DELETE FROM rooms WHERE last_activity <= ?")
                .bind(cutoff)
                .execute(&self.pool)
                .await?;

        let purged = result.rows_affected();
        if purged > 0 {
            tracing::info!(purged, "swept idle rooms");
        }
        Ok(purged)
    }
}

fn room_from_row(row: SqliteRow) -> Result<RoomRow, StoreError> {
    let code: String = row.get("id");
    Ok(RoomRow {
        code: code.parse()?,
        name: row.get("name"),
        max_players: row.get::<i64, _>("max_players") as usize,
        turn_duration: row.get::<i64, _>("turn_duration") as u32,
        selected_deck: row.get("selected_deck"),
        player_count: row.get::<i64, _>("player_count") as usize,
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
        last_activity: row.get::<DateTime<Utc>, _>("last_activity"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> RoomCode {
        s.parse().unwrap()
    }

    fn new_room(c: &str) -> NewRoom {
        NewRoom {
            code: code(c),
            name: "test room".into(),
            max_players: 4,
            turn_duration: 60,
            selected_deck: "base".into(),
        }
    }

    #[tokio::test]
    async fn test_create_and_fetch_room() {
        let store = RoomStore::in_memory().await.unwrap();
        store.create(&new_room("AAAA22")).await.unwrap();

        let row = store.fetch(&code("AAAA22")).await.unwrap().unwrap();
        assert_eq!(row.name, "test room");
        assert_eq!(row.max_players, 4);
        assert_eq!(row.player_count, 0);

        assert!(store.fetch(&code("ZZZZ99")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_state_without_row_fails_loudly() {
        let store = RoomStore::in_memory().await.unwrap();
        let err = store
            .save_state(&code("AAAA22"), b"snapshot", 0)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingRow(_)));
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let store = RoomStore::in_memory().await.unwrap();
        store.create(&new_room("AAAA22")).await.unwrap();

        assert!(store.load_state(&code("AAAA22")).await.unwrap().is_none());

        let receipt = store
            .save_state(&code("AAAA22"), b"opaque bytes", 2)
            .await
            .unwrap();
        assert_eq!(receipt.state_size, 12);

        let bytes = store.load_state(&code("AAAA22")).await.unwrap().unwrap();
        assert_eq!(bytes, b"opaque bytes");

        let row = store.fetch(&code("AAAA22")).await.unwrap().unwrap();
        assert_eq!(row.player_count, 2);
    }

    #[tokio::test]
    async fn test_cleanup_purges_only_stale_rooms() {
        let store = RoomStore::in_memory().await.unwrap();
        store.create(&new_room("AAAA22")).await.unwrap();
        store.create(&new_room("BBBB33")).await.unwrap();

        // Backdate one room past the idle cutoff.
        let stale = Utc::now() - Duration::hours(2);
        sqlx::query("UPDATE rooms SET last_activity = ? WHERE id = ?")
            .bind(stale)
            .bind("BBBB33")
            .execute(store.pool())
            .await
            .unwrap();

        let purged = store.cleanup(Duration::hours(1)).await.unwrap();
        assert_eq!(purged, 1);
        assert!(store.fetch(&code("BBBB33")).await.unwrap().is_none());
        assert!(store.fetch(&code("AAAA22")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_list_active_orders_newest_first_and_caps() {
        let store = RoomStore::in_memory().await.unwrap();
        for (c, minutes_ago) in
            [("AAAA22", 50i64), ("BBBB33", 5), ("CCCC44", 20)]
        {
            store.create(&new_room(c)).await.unwrap();
            let at = Utc::now() - Duration::minutes(minutes_ago);
            sqlx::query("UPDATE rooms SET last_activity = ? WHERE id = ?")
                .bind(at)
                .bind(c)
                .execute(store.pool())
                .await
                .unwrap();
        }
        // One room well outside the window.
        store.create(&new_room("DDDD55")).await.unwrap();
        let old = Utc::now() - Duration::hours(3);
        sqlx::query("UPDATE rooms SET last_activity = ? WHERE id = ?")
            .bind(old)
            .bind("DDDD55")
            .execute(store.pool())
            .await
            .unwrap();

        let active = store.list_active(Duration::hours(1), 50).await.unwrap();
        let codes: Vec<&str> =
            active.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["BBBB33", "CCCC44", "AAAA22"]);

        let capped = store.list_active(Duration::hours(1), 2).await.unwrap();
        assert_eq!(capped.len(), 2);
    }

    #[tokio::test]
    async fn test_touch_updates_activity_and_count() {
        let store = RoomStore::in_memory().await.unwrap();
        store.create(&new_room("AAAA22")).await.unwrap();

        let before = store.fetch(&code("AAAA22")).await.unwrap().unwrap();
        store.touch(&code("AAAA22"), Some(3)).await.unwrap();
        let after = store.fetch(&code("AAAA22")).await.unwrap().unwrap();

        assert_eq!(after.player_count, 3);
        assert!(after.last_activity >= before.last_activity);

        // Touching a missing room is tolerated.
        store.touch(&code("ZZZZ99"), None).await.unwrap();
    }
}
