//! `recycleme` - Can I recycle this here?
//!
//! This library provides the recycling catalog, fuzzy location matching, the
//! lookup that answers "is this item recyclable at this location", and the
//! SQLite storage and web server built around it.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod fuzzy;
pub mod logging;
pub mod lookup;
pub mod models;
pub mod server;
pub mod storage;

pub use catalog::{Catalog, CatalogEntry};
pub use config::Config;
pub use error::{Error, Result};
pub use fuzzy::{Matcher, Scorer};
pub use logging::init_logging;
pub use lookup::{recycle_me, Query, Recycler, Verdict};
pub use models::{NonRecyclableItem, UnavailableLocation};
pub use storage::{ImportStats, Storage, StorageStats};
