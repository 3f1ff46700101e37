//! Database layer
//!
//! SQLite storage for askly: the connection pool, embedded migrations, and
//! one repository per entity.
//!
//! # Usage
//!
//! ```ignore
//! use askly::config::DatabaseConfig;
//! use askly::db::{self, create_pool, migrations};
//!
//! let pool = create_pool(&DatabaseConfig::default()).await?;
//! migrations::run_migrations(&pool).await?;
//!
//! let mut tx = db::begin_write(&pool).await?;
//! // repository calls take `&mut *tx`
//! tx.commit().await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{begin_write, create_pool, create_test_pool};

#[cfg(test)]
pub use pool::create_file_test_pool;
