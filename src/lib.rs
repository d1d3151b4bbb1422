//! # unisearch
//!
//! Command-line host for [`unisearch_engine`]: loads the TOML config and
//! environment credentials, builds an [`Aggregator`] and renders what it
//! finds.

pub mod config;
pub mod credentials;
pub mod error;
pub mod render;

pub use config::AppConfig;
pub use credentials::Credentials;
pub use error::{AppError, Result};

use unisearch_engine::Aggregator;

/// Build an aggregator from host configuration and credentials.
///
/// # Errors
///
/// Returns an error if the search configuration is invalid.
pub fn build_aggregator(config: &AppConfig, credentials: &Credentials) -> Result<Aggregator> {
    config.validate()?;
    tracing::debug!(
        authenticated = ?credentials.sources(),
        sources = ?config.search.sources,
        "building aggregator"
    );
    let builder = Aggregator::builder(config.search.clone());
    Ok(credentials.apply(builder).build()?)
}
