//! The in-memory recycling catalog.
//!
//! A catalog maps each location to the materials it accepts, and each
//! material to the item names recyclable under it. It is rebuilt from the
//! database rows for every lookup and also parsed from the plain-text import
//! format:
//!
//! ```text
//! portland: plastic: bottle, jug, tub
//! portland: glass: jar
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};

/// `location -> material -> items`.
///
/// Locations iterate in the order they were first inserted, so fuzzy-match
/// ties go to the location loaded first. Materials are sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Catalog {
    entries: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    #[serde(skip)]
    order: Vec<String>,
}

impl Catalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from `(location, material, item)` rows.
    ///
    /// Items keep the order in which their rows arrive.
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (String, String, String)>,
    {
        let mut catalog = Self::new();
        for (location, material, item) in rows {
            catalog.insert(location, material, item);
        }
        catalog
    }

    /// Add a single item.
    pub fn insert(&mut self, location: String, material: String, item: String) {
        if !self.entries.contains_key(&location) {
            self.order.push(location.clone());
        }
        self.entries
            .entry(location)
            .or_default()
            .entry(material)
            .or_default()
            .push(item);
    }

    /// All location names, in insertion order.
    pub fn locations(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Materials known for a location, if the location exists.
    #[must_use]
    pub fn materials(&self, location: &str) -> Option<&BTreeMap<String, Vec<String>>> {
        self.entries.get(location)
    }

    /// Items recyclable for a location and material.
    #[must_use]
    pub fn items(&self, location: &str, material: &str) -> Option<&[String]> {
        self.materials(location)?
            .get(material)
            .map(Vec::as_slice)
    }

    /// Whether the catalog has no locations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of items across all locations and materials.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }
}

/// One line of the catalog import format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Location name.
    pub location: String,
    /// Material name.
    pub material: String,
    /// Item names for this location and material.
    pub items: Vec<String>,
}

/// Parse a `location: material: item, item, ...` line.
///
/// Returns `None` for blank lines and for lines that do not split into
/// exactly three `:`-separated parts.
#[must_use]
pub fn parse_line(line: &str) -> Option<CatalogEntry> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let parts: Vec<&str> = line.split(':').collect();
    let [location, material, items] = parts.as_slice() else {
        return None;
    };

    let items = items
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect();

    Some(CatalogEntry {
        location: location.trim().to_string(),
        material: material.trim().to_string(),
        items,
    })
}

/// Parse every well-formed line of a catalog file.
#[must_use]
pub fn parse_str(text: &str) -> Vec<CatalogEntry> {
    text.lines().filter_map(parse_line).collect()
}

/// Read and parse a catalog file.
///
/// # Errors
///
/// Returns [`Error::ImportRead`] if the file cannot be read.
pub fn read_file(path: impl AsRef<Path>) -> Result<Vec<CatalogEntry>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| Error::ImportRead {
        path: path.to_path_buf(),
        source,
    })?;

    let entries = parse_str(&text);
    let skipped = text.lines().filter(|l| !l.trim().is_empty()).count() - entries.len();
    if skipped > 0 {
        debug!(path = %path.display(), skipped, "Ignored malformed catalog lines");
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(l: &str, m: &str, i: &str) -> (String, String, String) {
        (l.to_string(), m.to_string(), i.to_string())
    }

    fn sample() -> Catalog {
        Catalog::from_rows([
            row("portland", "plastic", "bottle"),
            row("portland", "plastic", "jug"),
            row("portland", "glass", "jar"),
            row("boston", "paper", "newspaper"),
        ])
    }

    #[test]
    fn test_from_rows_nests() {
        let catalog = sample();
        assert_eq!(catalog.len(), 4);
        assert_eq!(
            catalog.items("portland", "plastic").unwrap(),
            ["bottle".to_string(), "jug".to_string()]
        );
        assert_eq!(catalog.materials("portland").unwrap().len(), 2);
    }

    #[test]
    fn test_locations_keep_insertion_order() {
        let catalog = sample();
        let locations: Vec<&str> = catalog.locations().collect();
        assert_eq!(locations, ["portland", "boston"]);
    }

    #[test]
    fn test_lookups_are_exact() {
        let catalog = sample();
        assert!(catalog.materials("Portland").is_none());
        assert!(catalog.items("portland", "Plastic").is_none());
        assert!(catalog.items("boston", "plastic").is_none());
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = Catalog::new();
        assert!(catalog.is_empty());
        assert_eq!(catalog.len(), 0);
        assert_eq!(catalog.locations().count(), 0);
    }

    #[test]
    fn test_parse_line() {
        let entry = parse_line(" portland : plastic : bottle, jug ,tub ").unwrap();
        assert_eq!(entry.location, "portland");
        assert_eq!(entry.material, "plastic");
        assert_eq!(entry.items, ["bottle", "jug", "tub"]);
    }

    #[test]
    fn test_parse_line_drops_empty_items() {
        let entry = parse_line("boston: paper: newspaper,, ,box").unwrap();
        assert_eq!(entry.items, ["newspaper", "box"]);
    }

    #[test]
    fn test_parse_line_rejects_wrong_arity() {
        assert!(parse_line("").is_none());
        assert!(parse_line("   ").is_none());
        assert!(parse_line("portland: plastic").is_none());
        assert!(parse_line("portland: plastic: bottle: extra").is_none());
    }

    #[test]
    fn test_parse_str_skips_bad_lines() {
        let text = "portland: plastic: bottle\n\nnot a line\nboston: glass: jar, bottle\n";
        let entries = parse_str(text);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].location, "boston");
        assert_eq!(entries[1].items, ["jar", "bottle"]);
    }

    #[test]
    fn test_catalog_serializes_as_nested_map() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["entries"]["boston"]["paper"][0], "newspaper");
    }

    #[test]
    fn test_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.txt");
        std::fs::write(&path, "portland: plastic: bottle, jug\ngarbage\n").unwrap();

        let entries = read_file(&path).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].items, ["bottle", "jug"]);
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_file(dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, Error::ImportRead { .. }));
    }
}
