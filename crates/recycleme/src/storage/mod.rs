//! Storage layer for recycleme.
//!
//! This module provides `SQLite`-based persistent storage for the recycling
//! catalog (locations, materials, items) and for the miss logs that feed
//! catalog curation.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use tracing::{debug, info};

use crate::catalog::{Catalog, CatalogEntry};
use crate::error::{Error, Result};
use crate::lookup::MissLog;
use crate::models::{NonRecyclableItem, UnavailableLocation};

/// Storage engine for the catalog and miss logs.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch(
            "PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA foreign_keys=ON;",
        )?;

        migrations::initialize_schema(&conn)?;

        debug!("Database opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn load_catalog(&self) -> Result<Catalog> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT l.name, m.name, i.name
            FROM items i
            JOIN materials m ON i.material_id = m.id
            JOIN locations l ON i.location_id = l.id
            ORDER BY i.id
            ",
        )?;

        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let catalog = Catalog::from_rows(rows);
        debug!("Loaded catalog with {} items", catalog.len());
        Ok(catalog)
    }

    /// Import catalog entries in a single transaction.
    ///
    /// Locations and materials that already exist are reused; items that
    /// already exist for the same location and material are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails. Nothing is written
    /// in that case.
    pub fn import(&self, entries: &[CatalogEntry]) -> Result<ImportStats> {
        let tx = self.conn.unchecked_transaction()?;
        let mut stats = ImportStats::default();

        for entry in entries {
            // A location with nothing under it would never reach the catalog
            if entry.items.is_empty() {
                debug!(
                    location = %entry.location,
                    material = %entry.material,
                    "Skipping entry without items"
                );
                continue;
            }

            let location_id = upsert_name(&tx, "locations", &entry.location)?;
            let material_id = upsert_name(&tx, "materials", &entry.material)?;

            for item in &entry.items {
                let added = tx.execute(
                    r"
                    INSERT INTO items (name, material_id, location_id)
                    VALUES (?1, ?2, ?3)
                    ON CONFLICT DO NOTHING
                    ",
                    params![item, material_id, location_id],
                )?;
                if added > 0 {
                    stats.items_added += 1;
                } else {
                    stats.items_skipped += 1;
                }
            }
            stats.entries += 1;
        }

        tx.commit()?;
        info!(
            entries = stats.entries,
            added = stats.items_added,
            skipped = stats.items_skipped,
            "Imported catalog entries"
        );
        Ok(stats)
    }

    /// Append a non-recyclable item to the miss log.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert_non_recyclable(&self, record: &NonRecyclableItem) -> Result<i64> {
        self.conn.execute(
            r"
            INSERT INTO non_recyclable_items (location, material, item_name, timestamp)
            VALUES (?1, ?2, ?3, ?4)
            ",
            params![
                record.location,
                record.material,
                record.item_name,
                format_timestamp(record.timestamp),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!("Logged non-recyclable item with id {}", id);
        Ok(id)
    }

    /// Log a miss for an unknown location.
    ///
    /// A location is stored once; repeat misses bump its hit count and
    /// move its timestamp forward.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn upsert_unavailable_location(&self, location: &str, at: DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            r"
            INSERT INTO unavailable_locations (location, timestamp, hits)
            VALUES (?1, ?2, 1)
            ON CONFLICT (location) DO UPDATE SET
                timestamp = excluded.timestamp,
                hits = hits + 1
            ",
            params![location, format_timestamp(at)],
        )?;
        Ok(())
    }

    /// Most recent non-recyclable item misses, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn non_recyclable_items(&self, limit: usize) -> Result<Vec<NonRecyclableItem>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, location, material, item_name, timestamp
            FROM non_recyclable_items
            ORDER BY timestamp DESC, id DESC LIMIT ?1
            ",
        )?;

        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        let records = stmt
            .query_map([limit_i64], |row| {
                Ok(NonRecyclableItem {
                    id: Some(row.get(0)?),
                    location: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    material: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    item_name: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                    timestamp: parse_timestamp(&row.get::<_, String>(4)?),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Unknown locations, most requested first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn unavailable_locations(&self, limit: usize) -> Result<Vec<UnavailableLocation>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, location, timestamp, hits
            FROM unavailable_locations
            ORDER BY hits DESC, timestamp DESC LIMIT ?1
            ",
        )?;

        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        let records = stmt
            .query_map([limit_i64], |row| {
                Ok(UnavailableLocation {
                    id: Some(row.get(0)?),
                    location: row.get(1)?,
                    timestamp: parse_timestamp(&row.get::<_, String>(2)?),
                    hits: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Delete both miss logs.
    ///
    /// Returns the number of rows deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn clear_misses(&self) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let items = tx.execute("DELETE FROM non_recyclable_items", [])?;
        let locations = tx.execute("DELETE FROM unavailable_locations", [])?;
        tx.commit()?;

        let total = items + locations;
        if total > 0 {
            info!("Cleared {} logged misses", total);
        }
        Ok(total)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            locations: self.count_rows("locations")?,
            materials: self.count_rows("materials")?,
            items: self.count_rows("items")?,
            non_recyclable_items: self.count_rows("non_recyclable_items")?,
            unavailable_locations: self.count_rows("unavailable_locations")?,
            db_size_bytes,
        })
    }

    fn count_rows(&self, table: &'static str) -> Result<i64> {
        let count: i64 =
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                    row.get(0)
                })?;
        Ok(count)
    }
}

impl MissLog for Storage {
    fn record_non_recyclable(&self, record: &NonRecyclableItem) -> Result<()> {
        self.insert_non_recyclable(record).map(|_| ())
    }

    fn record_unavailable_location(&self, location: &str, at: DateTime<Utc>) -> Result<()> {
        self.upsert_unavailable_location(location, at)
    }
}

/// Insert a name into a `locations`/`materials` style table and return its id.
fn upsert_name(conn: &Connection, table: &'static str, name: &str) -> Result<i64> {
    conn.execute(
        &format!("INSERT INTO {table} (name) VALUES (?1) ON CONFLICT (name) DO NOTHING"),
        [name],
    )?;
    let id = conn.query_row(
        &format!("SELECT id FROM {table} WHERE name = ?1"),
        [name],
        |row| row.get(0),
    )?;
    Ok(id)
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}

/// Outcome of a catalog import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    /// Number of `location: material: items` entries with at least one item.
    pub entries: usize,
    /// Items newly written.
    pub items_added: usize,
    /// Items that were already present.
    pub items_skipped: usize,
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StorageStats {
    /// Number of catalogued locations.
    pub locations: i64,
    /// Number of catalogued materials.
    pub materials: i64,
    /// Number of catalogued items.
    pub items: i64,
    /// Rows in the non-recyclable item log.
    pub non_recyclable_items: i64,
    /// Distinct unknown locations logged.
    pub unavailable_locations: i64,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::catalog::parse_str;

    const SAMPLE: &str = "\
portland: plastic: bottle, jug
portland: glass: jar
boston: plastic: bottle
";

    fn create_test_storage() -> Storage {
        Storage::open_in_memory().expect("failed to create test storage")
    }

    fn seeded_storage() -> Storage {
        let storage = create_test_storage();
        storage.import(&parse_str(SAMPLE)).unwrap();
        storage
    }

    #[test]
    fn test_open_in_memory() {
        let storage = Storage::open_in_memory();
        assert!(storage.is_ok());
        assert_eq!(storage.unwrap().path().to_string_lossy(), ":memory:");
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("recycling.db");

        let storage = Storage::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(storage.path(), path.as_path());
    }

    #[test]
    fn test_reopen_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recycling.db");

        Storage::open(&path)
            .unwrap()
            .import(&parse_str(SAMPLE))
            .unwrap();
        let catalog = Storage::open(&path).unwrap().load_catalog().unwrap();
        assert_eq!(catalog.len(), 4);
    }

    #[test]
    fn test_empty_catalog() {
        let storage = create_test_storage();
        assert!(storage.load_catalog().unwrap().is_empty());
    }

    #[test]
    fn test_import_and_load_catalog() {
        let storage = create_test_storage();
        let stats = storage.import(&parse_str(SAMPLE)).unwrap();

        assert_eq!(stats.entries, 3);
        assert_eq!(stats.items_added, 4);
        assert_eq!(stats.items_skipped, 0);

        let catalog = storage.load_catalog().unwrap();
        assert_eq!(
            catalog.items("portland", "plastic").unwrap(),
            ["bottle".to_string(), "jug".to_string()]
        );
        assert_eq!(catalog.items("boston", "plastic").unwrap().len(), 1);
    }

    #[test]
    fn test_import_is_idempotent() {
        let storage = seeded_storage();
        let stats = storage.import(&parse_str(SAMPLE)).unwrap();

        assert_eq!(stats.items_added, 0);
        assert_eq!(stats.items_skipped, 4);

        let counts = storage.stats().unwrap();
        assert_eq!(counts.locations, 2);
        assert_eq!(counts.materials, 2);
        assert_eq!(counts.items, 4);
    }

    #[test]
    fn test_import_skips_entries_without_items() {
        let storage = create_test_storage();
        let stats = storage
            .import(&parse_str("denver: glass:\nboston: paper: newspaper\n"))
            .unwrap();

        assert_eq!(stats.entries, 1);
        assert_eq!(stats.items_added, 1);

        let counts = storage.stats().unwrap();
        assert_eq!(counts.locations, 1);
        assert_eq!(counts.materials, 1);
        assert!(storage.load_catalog().unwrap().materials("denver").is_none());
    }

    #[test]
    fn test_load_catalog_keeps_import_order() {
        let storage = create_test_storage();
        storage
            .import(&parse_str("zurich: glass: jar\naachen: glass: jar\n"))
            .unwrap();

        let catalog = storage.load_catalog().unwrap();
        let locations: Vec<&str> = catalog.locations().collect();
        assert_eq!(locations, ["zurich", "aachen"]);
    }

    #[test]
    fn test_record_non_recyclable() {
        let storage = create_test_storage();
        let record = NonRecyclableItem::new("portland", "plastic", "straw");

        storage.record_non_recyclable(&record).unwrap();

        let logged = storage.non_recyclable_items(10).unwrap();
        assert_eq!(logged.len(), 1);
        assert!(logged[0].id.is_some());
        assert_eq!(logged[0].item_name, "straw");
        assert_eq!(
            logged[0].timestamp.timestamp_micros(),
            record.timestamp.timestamp_micros()
        );
    }

    #[test]
    fn test_non_recyclable_items_newest_first() {
        let storage = create_test_storage();
        let mut older = NonRecyclableItem::new("portland", "plastic", "straw");
        older.timestamp -= Duration::hours(1);
        storage.insert_non_recyclable(&older).unwrap();
        storage
            .insert_non_recyclable(&NonRecyclableItem::new("portland", "glass", "mirror"))
            .unwrap();

        let logged = storage.non_recyclable_items(10).unwrap();
        assert_eq!(logged[0].item_name, "mirror");
        assert_eq!(logged[1].item_name, "straw");

        assert_eq!(storage.non_recyclable_items(1).unwrap().len(), 1);
    }

    #[test]
    fn test_unavailable_location_counts_hits() {
        let storage = create_test_storage();
        let first = Utc::now() - Duration::minutes(5);
        let second = Utc::now();

        storage.record_unavailable_location("atlantis", first).unwrap();
        storage.record_unavailable_location("atlantis", second).unwrap();
        storage.record_unavailable_location("el dorado", second).unwrap();

        let logged = storage.unavailable_locations(10).unwrap();
        assert_eq!(logged.len(), 2);
        assert_eq!(logged[0].location, "atlantis");
        assert_eq!(logged[0].hits, 2);
        assert_eq!(
            logged[0].timestamp.timestamp_micros(),
            second.timestamp_micros()
        );
        assert_eq!(logged[1].hits, 1);
    }

    #[test]
    fn test_clear_misses() {
        let storage = seeded_storage();
        storage
            .record_non_recyclable(&NonRecyclableItem::new("boston", "glass", "jar"))
            .unwrap();
        storage
            .record_unavailable_location("atlantis", Utc::now())
            .unwrap();

        assert_eq!(storage.clear_misses().unwrap(), 2);
        let stats = storage.stats().unwrap();
        assert_eq!(stats.non_recyclable_items, 0);
        assert_eq!(stats.unavailable_locations, 0);
        assert_eq!(stats.items, 4);
    }

    #[test]
    fn test_stats_empty() {
        let stats = create_test_storage().stats().unwrap();

        assert_eq!(stats.locations, 0);
        assert_eq!(stats.items, 0);
        assert_eq!(stats.db_size_bytes, 0);
    }

    #[test]
    fn test_parse_timestamp_falls_back_to_now() {
        let before = Utc::now();
        assert!(parse_timestamp("not a time") >= before);
    }
}
