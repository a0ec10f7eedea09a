//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for the form store.
//! - Isolate SQLite query details from session/business orchestration.
//!
//! # Invariants
//! - Repository writes validate records before persistence.
//! - Soft delete is a flag flip; physical removal is a separate purge
//!   operation issued by the trash/recovery path.

pub mod store_repo;
