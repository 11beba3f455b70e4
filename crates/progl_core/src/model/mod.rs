//! Domain model for the PROGL table.
//!
//! # Responsibility
//! - Define the single record shape stored by the harness.
//! - Provide the fixed seed catalog used by the demo run.
//!
//! # Invariants
//! - Every record is identified by an explicit caller-chosen `RecordId`.
//! - No two live records share an id.

pub mod record;
pub mod seed;
