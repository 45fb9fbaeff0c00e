use rusqlite::{Connection, OptionalExtension, Result};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Embedded key-value backing store. One JSON record per guild key,
/// persisted to local disk. Opened once at startup and handed to the
/// components that need it; there is no global handle.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn execute_init(&self) -> anyhow::Result<()> {
        info!("Database: Initializing schema...");
        let sql = "
            CREATE TABLE IF NOT EXISTS guild_config (
                guild_id TEXT PRIMARY KEY,
                record TEXT NOT NULL
            );
        ";
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(sql)?;
        debug!("Database: Schema initialized successfully");
        Ok(())
    }

    /// Raw record for a key, or `None` if the key has never been written.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT record FROM guild_config WHERE guild_id = ?1",
            [key],
            |row| row.get(0),
        )
        .optional()
    }

    pub fn set(&self, key: &str, record: &str) -> Result<()> {
        debug!("Database: Writing record for key {}", key);
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO guild_config (guild_id, record) VALUES (?1, ?2)
             ON CONFLICT(guild_id) DO UPDATE SET record = ?2",
            (key, record),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_get_set() {
        let db = Database::open(":memory:").unwrap();
        db.execute_init().unwrap();

        assert_eq!(db.get("123").unwrap(), None);

        db.set("123", r#"{"welcome":"456"}"#).unwrap();
        assert_eq!(db.get("123").unwrap().as_deref(), Some(r#"{"welcome":"456"}"#));

        // Second write replaces the record
        db.set("123", "{}").unwrap();
        assert_eq!(db.get("123").unwrap().as_deref(), Some("{}"));
    }
}
