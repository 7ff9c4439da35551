//! Web server for recycling lookups.
//!
//! Serves the lookup form, answers submitted lookups, and a couple of
//! static pages.

mod handlers;
mod routes;
mod templates;

pub use handlers::NO_ITEMS_MESSAGE;
pub use routes::create_router;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::lookup::{Query, Recycler, Verdict};
use crate::storage::Storage;

/// Shared state for the web server.
///
/// Every lookup opens its own connection to the database and closes it when
/// done, so a database that cannot be opened only fails the lookups.
#[derive(Debug, Clone)]
pub struct AppState {
    database_path: Arc<PathBuf>,
    recycler: Recycler,
}

impl AppState {
    /// Create state for a database at `database_path`.
    #[must_use]
    pub fn new(database_path: impl Into<PathBuf>, recycler: Recycler) -> Self {
        Self {
            database_path: Arc::new(database_path.into()),
            recycler,
        }
    }

    /// Path of the database each lookup opens.
    #[must_use]
    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    /// Open the database and run a lookup against it.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the lookup fails.
    pub fn check(&self, query: &Query) -> Result<Verdict> {
        let storage = Storage::open(self.database_path.as_path())?;
        self.recycler.check(&storage, query)
    }
}

/// Start the web server and run until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound. A database that cannot
/// be opened is logged and the server starts anyway.
pub async fn serve(config: &Config) -> Result<()> {
    let database_path = config.database_path();

    // Creates the schema and runs migrations before the first request
    if let Err(e) = Storage::open(&database_path) {
        warn!("Database unavailable, lookups will fail until it opens: {}", e);
    }

    let state = AppState::new(database_path, Recycler::new(config.matcher()));
    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| Error::ServerBind {
            addr: addr.clone(),
            source,
        })?;

    // Port 0 binds whatever the OS hands out
    let local_addr = listener.local_addr()?;
    info!("Starting server at http://{}", local_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
