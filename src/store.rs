use crate::db::Database;
use serenity::model::id::GuildId;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Property names the bot reads and writes. The store itself enforces
/// no schema; these just keep the callers honest.
pub mod prop {
    /// Forum channel host threads are created in.
    pub const HOSTING: &str = "hosting";
    /// Text channel welcome messages are sent to.
    pub const WELCOME: &str = "welcome";
    /// Role assigned to new members.
    pub const AUTOROLE: &str = "autorole";
    /// Text channel moderation events are logged to.
    pub const EVENT_LOGGING: &str = "eventLogging";
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("backing store error: {0}")]
    Backing(#[from] rusqlite::Error),
    #[error("malformed guild record: {0}")]
    Record(#[from] serde_json::Error),
}

/// Per-guild configuration, stored as one JSON record per guild in the
/// backing store. Each operation is a read-modify-write pair with no
/// isolation from concurrent operations on the same guild; writes are
/// rare administrative actions and last writer wins.
#[derive(Clone)]
pub struct GuildStore {
    db: Database,
}

impl GuildStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// The guild's record, or `None` if the guild has never been
    /// configured. A guild whose last property was deleted keeps an
    /// empty record; callers that only care about one property should
    /// use [`GuildStore::property`], which collapses the two cases.
    pub fn get(&self, guild_id: GuildId) -> Result<Option<BTreeMap<String, String>>, StoreError> {
        match self.db.get(&guild_id.to_string())? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// A single property value, with absent guild and absent key
    /// treated identically.
    pub fn property(&self, guild_id: GuildId, name: &str) -> Result<Option<String>, StoreError> {
        Ok(self.get(guild_id)?.and_then(|mut record| record.remove(name)))
    }

    /// Shallow-merges `properties` over the guild's record, creating
    /// the record on first write. Properties not named are untouched.
    pub fn set_properties(
        &self,
        guild_id: GuildId,
        properties: BTreeMap<String, String>,
    ) -> Result<(), StoreError> {
        let mut record = self.get(guild_id)?.unwrap_or_default();
        for (key, value) in properties {
            record.insert(key, value);
        }
        self.write(guild_id, &record)
    }

    /// Single-property convenience over [`GuildStore::set_properties`].
    pub fn set_property(
        &self,
        guild_id: GuildId,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), StoreError> {
        self.set_properties(guild_id, BTreeMap::from([(name.to_string(), value.into())]))
    }

    /// Removes `name` from the guild's record. A no-op when the guild
    /// or the property does not exist; the record itself is never
    /// pruned, so deleting the last property leaves an empty record.
    pub fn delete_property(&self, guild_id: GuildId, name: &str) -> Result<(), StoreError> {
        let mut record = self.get(guild_id)?.unwrap_or_default();
        if record.remove(name).is_some() {
            debug!("GuildStore: Removed property {} for guild {}", name, guild_id);
        }
        self.write(guild_id, &record)
    }

    fn write(
        &self,
        guild_id: GuildId,
        record: &BTreeMap<String, String>,
    ) -> Result<(), StoreError> {
        let raw = serde_json::to_string(record)?;
        self.db.set(&guild_id.to_string(), &raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> GuildStore {
        let db = Database::open(":memory:").unwrap();
        db.execute_init().unwrap();
        GuildStore::new(db)
    }

    fn props(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_set_properties_merges() {
        let store = test_store();
        let guild = GuildId::new(1);

        store
            .set_properties(guild, props(&[("welcome", "100"), ("autorole", "200")]))
            .unwrap();
        store
            .set_properties(guild, props(&[("autorole", "300"), ("hosting", "400")]))
            .unwrap();

        // Key-wise union, later write wins on overlap
        let record = store.get(guild).unwrap().unwrap();
        assert_eq!(
            record,
            props(&[("welcome", "100"), ("autorole", "300"), ("hosting", "400")])
        );
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let store = test_store();
        let guild = GuildId::new(2);

        // Never-configured guild
        store.delete_property(guild, "welcome").unwrap();

        // Configured guild, missing key
        store.set_property(guild, "autorole", "200").unwrap();
        store.delete_property(guild, "welcome").unwrap();
        assert_eq!(
            store.get(guild).unwrap().unwrap(),
            props(&[("autorole", "200")])
        );
    }

    #[test]
    fn test_delete_last_property_leaves_empty_record() {
        let store = test_store();
        let guild = GuildId::new(3);

        store.set_property(guild, "welcome", "100").unwrap();
        store.delete_property(guild, "welcome").unwrap();

        // Empty record, not absent
        assert_eq!(store.get(guild).unwrap(), Some(BTreeMap::new()));
        // ...but the property accessor reports both the same way
        assert_eq!(store.property(guild, "welcome").unwrap(), None);
        assert_eq!(store.property(GuildId::new(999), "welcome").unwrap(), None);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let store = test_store();
        let guild = GuildId::new(4);

        store
            .set_properties(guild, props(&[("welcome", "100"), ("hosting", "400")]))
            .unwrap();
        store.delete_property(guild, "welcome").unwrap();
        let after_one = store.get(guild).unwrap();
        store.delete_property(guild, "welcome").unwrap();
        assert_eq!(store.get(guild).unwrap(), after_one);
    }

    #[test]
    fn test_property_reads_through() {
        let store = test_store();
        let guild = GuildId::new(5);

        store.set_property(guild, prop::EVENT_LOGGING, "700").unwrap();
        assert_eq!(
            store.property(guild, prop::EVENT_LOGGING).unwrap().as_deref(),
            Some("700")
        );
        assert_eq!(store.property(guild, prop::WELCOME).unwrap(), None);
    }
}
