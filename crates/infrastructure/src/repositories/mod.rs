//! Profile store implementations.
//!
//! - `profile_repository` - PostgreSQL-backed store used in production
//! - `memory` - in-process store for development and tests
//!
//! Both implement the application's `ProfileStore` and `ProfileUnitOfWork`
//! ports.

mod memory;
mod profile_repository;

pub use memory::*;
pub use profile_repository::*;
