//! Catalog client abstraction and implementations
//!
//! The catalog is the remote service that knows every bank and branch. The
//! lookup engine only ever talks to it through [`CatalogClient`], so the HTTP
//! implementation and the in-memory mock are interchangeable.
//!
//! # Examples
//!
//! ```no_run
//! use libbankcode::catalog::{CatalogClient, http::HttpCatalogClient};
//! use libbankcode::config::CatalogConfig;
//!
//! # async fn example() -> libbankcode::Result<()> {
//! let config = CatalogConfig {
//!     base_url: "http://localhost:8080".to_string(),
//!     timeout_secs: None,
//! };
//! let client = HttpCatalogClient::new(&config)?;
//!
//! let branches = client.list_branches("004").await?;
//! println!("{} branches", branches.len());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

use crate::error::CatalogError;
use crate::types::{Bank, Branch};

pub mod http;

// Mock catalog is available for all builds to support integration tests and demos
pub mod mock;

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// Request/response access to the bank catalog
///
/// Implementations hold no per-request state and must tolerate several
/// outstanding calls at once. No retries and no caching.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Every bank record known to the catalog
    ///
    /// # Errors
    ///
    /// `CatalogError::Unavailable` on any transport failure.
    async fn list_banks(&self) -> CatalogResult<Vec<Bank>>;

    /// All branches of one bank. An unknown bank yields an empty list.
    ///
    /// # Errors
    ///
    /// `CatalogError::Unavailable` on any transport failure.
    async fn list_branches(&self, bank_code: &str) -> CatalogResult<Vec<Branch>>;

    /// A single branch
    ///
    /// # Errors
    ///
    /// - `CatalogError::NotFound` if the catalog has no such branch
    /// - `CatalogError::Unavailable` on any transport failure
    async fn get_branch(&self, bank_code: &str, branch_code: &str) -> CatalogResult<Branch>;
}
