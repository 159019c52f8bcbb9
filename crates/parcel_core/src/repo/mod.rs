//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the parcel data-access contract.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Lifecycle checks happen in the same statement as the write they guard.
//! - Repository APIs return semantic errors (`NotFound`, `State`,
//!   `Validation`) in addition to DB transport errors.

pub mod parcel_repo;
