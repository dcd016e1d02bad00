//! Core domain logic for the lab dashboard.
//! This crate is the single source of truth for storage and access invariants.

pub mod config;
pub mod db;
pub mod envelope;
pub mod files;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, DashboardConfig};
pub use db::{DbError, DbResult, SeedOutcome, SeedReport, Store};
pub use envelope::ApiEnvelope;
pub use files::{DirectoryListing, FileBrowser, FileContent, FilesError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use model::validation::ValidationError;
pub use repo::{DeleteOutcome, RepoError, RepoResult, UpdateOutcome};
pub use service::dashboard_service::DashboardService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
