//! Recyclability lookup.
//!
//! A lookup resolves the requested location against the catalog with a
//! fuzzy match, then checks the material and item exactly. Every answer
//! other than "recyclable" is a miss, and misses are logged so the catalog
//! can be curated later.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::fuzzy::Matcher;
use crate::models::NonRecyclableItem;
use crate::storage::Storage;

/// What the user asked about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Location, lowercased.
    pub location: String,
    /// Material, matched exactly.
    pub material: String,
    /// Item, matched exactly.
    pub item: String,
}

impl Query {
    /// Build a query from raw form input.
    ///
    /// All fields are trimmed and the location is lowercased.
    #[must_use]
    pub fn new(location: &str, material: &str, item: &str) -> Self {
        Self {
            location: location.trim().to_lowercase(),
            material: material.trim().to_string(),
            item: item.trim().to_string(),
        }
    }
}

/// The answer to a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// The item is recyclable at the matched location.
    Recyclable {
        /// Canonical location name.
        location: String,
        /// Material.
        material: String,
        /// Item.
        item: String,
    },
    /// The location and material are known but the item is not listed.
    ItemNotRecyclable {
        /// Canonical location name.
        location: String,
        /// Material.
        material: String,
        /// Item.
        item: String,
    },
    /// The location is known but has no entry for the material.
    MaterialUnavailable {
        /// Canonical location name.
        location: String,
        /// Material.
        material: String,
        /// Item.
        item: String,
    },
    /// No catalogued location is close enough to the one asked for.
    LocationUnavailable {
        /// Location as asked.
        location: String,
    },
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Recyclable { .. } => write!(
                f,
                "Yes, recycle this! But please always remember to clean and remove any food waste attached."
            ),
            Self::ItemNotRecyclable {
                location, material, ..
            } => write!(
                f,
                "Sorry, this item is not recyclable in {location} for {material} material."
            ),
            Self::MaterialUnavailable {
                location, material, ..
            } => write!(
                f,
                "Sorry, recycling information for {material} material is not available for {location}."
            ),
            Self::LocationUnavailable { location } => write!(
                f,
                "Sorry, recycling information for {location} is not available."
            ),
        }
    }
}

impl Verdict {
    /// Whether the item can be recycled.
    #[must_use]
    pub fn is_recyclable(&self) -> bool {
        matches!(self, Self::Recyclable { .. })
    }

    /// The log record this verdict calls for, if any.
    #[must_use]
    pub fn miss(&self) -> Option<Miss> {
        match self {
            Self::Recyclable { .. } => None,
            Self::ItemNotRecyclable {
                location,
                material,
                item,
            }
            | Self::MaterialUnavailable {
                location,
                material,
                item,
            } => Some(Miss::NonRecyclable(NonRecyclableItem::new(
                location.as_str(),
                material.as_str(),
                item.as_str(),
            ))),
            Self::LocationUnavailable { location } => Some(Miss::UnavailableLocation {
                location: location.clone(),
                timestamp: Utc::now(),
            }),
        }
    }
}

/// A lookup that needs to be written to a miss log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Miss {
    /// Known location, unknown material or item.
    NonRecyclable(NonRecyclableItem),
    /// Unknown location.
    UnavailableLocation {
        /// Location as asked.
        location: String,
        /// When the miss happened.
        timestamp: DateTime<Utc>,
    },
}

/// Somewhere misses can be recorded.
pub trait MissLog {
    /// Record a non-recyclable item.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    fn record_non_recyclable(&self, record: &NonRecyclableItem) -> Result<()>;

    /// Record an unknown location.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    fn record_unavailable_location(&self, location: &str, at: DateTime<Utc>) -> Result<()>;
}

/// Decide whether `item` made of `material` is recyclable at `location`.
///
/// `location` is fuzzy-matched against the catalog; `material` and `item`
/// must match exactly under the resolved location.
#[must_use]
pub fn recycle_me(
    location: &str,
    material: &str,
    item: &str,
    catalog: &Catalog,
    matcher: &Matcher,
) -> Verdict {
    let Some(found) = matcher.resolve(location, catalog.locations()) else {
        return Verdict::LocationUnavailable {
            location: location.to_string(),
        };
    };
    debug!(query = location, matched = %found.name, score = found.score, "matched location");

    let location = found.name;
    let (material, item) = (material.to_string(), item.to_string());
    match catalog.items(&location, &material) {
        Some(items) if items.contains(&item) => Verdict::Recyclable {
            location,
            material,
            item,
        },
        Some(_) => Verdict::ItemNotRecyclable {
            location,
            material,
            item,
        },
        None => Verdict::MaterialUnavailable {
            location,
            material,
            item,
        },
    }
}

/// Write a miss to the log.
///
/// A failed write is logged and otherwise ignored: the user still gets
/// their answer.
pub fn record_miss(log: &impl MissLog, miss: &Miss) {
    let result = match miss {
        Miss::NonRecyclable(record) => {
            info!(
                location = %record.location,
                material = %record.material,
                item = %record.item_name,
                "Logging non-recyclable item"
            );
            log.record_non_recyclable(record)
        }
        Miss::UnavailableLocation {
            location,
            timestamp,
        } => {
            info!(location = %location, "Logging unavailable location");
            log.record_unavailable_location(location, *timestamp)
        }
    };

    if let Err(e) = result {
        warn!("Failed to record lookup miss: {}", e);
    }
}

/// Runs lookups against a storage backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct Recycler {
    matcher: Matcher,
}

impl Recycler {
    /// Create a recycler using the given location matcher.
    #[must_use]
    pub const fn new(matcher: Matcher) -> Self {
        Self { matcher }
    }

    /// Answer a query from the stored catalog and log any miss.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CatalogEmpty`] when there is nothing to look up, or a
    /// storage error if the catalog cannot be read.
    pub fn check(&self, storage: &Storage, query: &Query) -> Result<Verdict> {
        let catalog = storage.load_catalog()?;
        if catalog.is_empty() {
            return Err(Error::CatalogEmpty);
        }

        let verdict = recycle_me(
            &query.location,
            &query.material,
            &query.item,
            &catalog,
            &self.matcher,
        );
        if let Some(miss) = verdict.miss() {
            record_miss(storage, &miss);
        }
        Ok(verdict)
    }
}
