//! Repository layer over the `PROGL` table.
//!
//! # Responsibility
//! - Define the record data access contract.
//! - Isolate SQLite statement details from benchmark and orchestration code.
//!
//! # Invariants
//! - Repository APIs classify failures as constraint, write or query errors.

pub mod record_repo;
