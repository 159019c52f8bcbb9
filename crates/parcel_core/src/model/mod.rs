//! Domain model for tracked shipments.
//!
//! # Responsibility
//! - Define canonical data structures used by the parcel store.
//!
//! # Invariants
//! - Every stored parcel is identified by a store-assigned `ParcelNumber`.
//! - Deletion is a hard delete and only allowed while a parcel is registered.

pub mod parcel;
