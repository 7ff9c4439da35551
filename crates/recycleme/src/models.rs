//! Records written when a lookup misses.
//!
//! These are kept so that someone can later curate the catalog: add the
//! locations people keep asking for, or the items they expected to be
//! recyclable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An item that was looked up at a known location but not found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonRecyclableItem {
    /// Row identifier (assigned by storage layer).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Canonical location name that matched.
    pub location: String,
    /// Material as entered.
    pub material: String,
    /// Item as entered.
    pub item_name: String,
    /// When the miss happened.
    pub timestamp: DateTime<Utc>,
}

impl NonRecyclableItem {
    /// Create a record stamped with the current time.
    #[must_use]
    pub fn new(
        location: impl Into<String>,
        material: impl Into<String>,
        item_name: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            location: location.into(),
            material: material.into(),
            item_name: item_name.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A location nobody has catalogued yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnavailableLocation {
    /// Row identifier (assigned by storage layer).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Location as entered.
    pub location: String,
    /// Most recent miss.
    pub timestamp: DateTime<Utc>,
    /// How many lookups asked for this location.
    pub hits: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_recyclable_item_new() {
        let before = Utc::now();
        let record = NonRecyclableItem::new("portland", "plastic", "straw");

        assert!(record.id.is_none());
        assert_eq!(record.location, "portland");
        assert_eq!(record.material, "plastic");
        assert_eq!(record.item_name, "straw");
        assert!(record.timestamp >= before);
    }

    #[test]
    fn test_non_recyclable_item_serialization_skips_missing_id() {
        let record = NonRecyclableItem::new("portland", "plastic", "straw");
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("id").is_none());
        assert_eq!(json["item_name"], "straw");
    }

    #[test]
    fn test_unavailable_location_serialization() {
        let record = UnavailableLocation {
            id: Some(3),
            location: "atlantis".to_string(),
            timestamp: Utc::now(),
            hits: 2,
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: UnavailableLocation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
