//! `SQLite` schema definitions for recycleme.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema.

/// SQL statement to create the locations table.
pub const CREATE_LOCATIONS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS locations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
)
";

/// SQL statement to create the materials table.
pub const CREATE_MATERIALS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS materials (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
)
";

/// SQL statement to create the items table.
pub const CREATE_ITEMS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    material_id INTEGER NOT NULL REFERENCES materials(id),
    location_id INTEGER NOT NULL REFERENCES locations(id),
    UNIQUE (name, material_id, location_id)
)
";

/// SQL statement to create an index on `location_id` for catalog loads.
pub const CREATE_ITEMS_LOCATION_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_items_location ON items(location_id)
";

/// SQL statement to create the non-recyclable item log.
pub const CREATE_NON_RECYCLABLE_ITEMS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS non_recyclable_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    location TEXT,
    material TEXT,
    item_name TEXT,
    timestamp TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
)
";

/// SQL statement to create the unavailable location log.
pub const CREATE_UNAVAILABLE_LOCATIONS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS unavailable_locations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    location TEXT NOT NULL UNIQUE,
    timestamp TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_LOCATIONS_TABLE,
    CREATE_MATERIALS_TABLE,
    CREATE_ITEMS_TABLE,
    CREATE_ITEMS_LOCATION_INDEX,
    CREATE_NON_RECYCLABLE_ITEMS_TABLE,
    CREATE_UNAVAILABLE_LOCATIONS_TABLE,
    CREATE_METADATA_TABLE,
];
