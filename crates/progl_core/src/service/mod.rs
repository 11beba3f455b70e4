//! Use-case services on top of the record repository.
//!
//! # Responsibility
//! - Drive timed benchmark cycles.
//! - Orchestrate the full harness run and its connection lifecycle.

pub mod bench_service;
pub mod harness_service;
