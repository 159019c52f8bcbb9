//! Parcel use-case service.
//!
//! # Responsibility
//! - Name the lifecycle steps (register, send, deliver, cancel).
//! - Delegate persistence and rule enforcement to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository lifecycle checks.
//! - Service layer remains storage-agnostic.

use crate::model::parcel::{ClientId, Parcel, ParcelNumber, ParcelStatus};
use crate::repo::parcel_repo::{ParcelRepository, RepoResult};

/// Use-case service wrapper for parcel tracking.
pub struct ParcelService<R: ParcelRepository> {
    repo: R,
}

impl<R: ParcelRepository> ParcelService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new parcel for `client`, stamped with the current time.
    ///
    /// # Contract
    /// - Status starts as `ParcelStatus::Registered`.
    /// - Returns the store-assigned parcel number.
    pub fn register(
        &self,
        client: ClientId,
        address: impl Into<String>,
    ) -> RepoResult<ParcelNumber> {
        let parcel = Parcel::new(client, address);
        self.repo.add(&parcel)
    }

    /// Persists a caller-built parcel as-is.
    pub fn add(&self, parcel: &Parcel) -> RepoResult<ParcelNumber> {
        self.repo.add(parcel)
    }

    /// Loads one parcel by number.
    pub fn get(&self, number: ParcelNumber) -> RepoResult<Parcel> {
        self.repo.get(number)
    }

    /// Lists all parcels of one client.
    pub fn list_by_client(&self, client: ClientId) -> RepoResult<Vec<Parcel>> {
        self.repo.get_by_client(client)
    }

    /// Marks a registered parcel as handed over to the carrier.
    pub fn send(&self, number: ParcelNumber) -> RepoResult<()> {
        self.repo.set_status(number, ParcelStatus::Sent)
    }

    /// Marks a registered parcel as delivered.
    pub fn deliver(&self, number: ParcelNumber) -> RepoResult<()> {
        self.repo.set_status(number, ParcelStatus::Delivered)
    }

    /// Changes the delivery address while the parcel is still registered.
    pub fn change_address(&self, number: ParcelNumber, address: &str) -> RepoResult<()> {
        self.repo.set_address(number, address)
    }

    /// Withdraws a registered parcel.
    pub fn cancel(&self, number: ParcelNumber) -> RepoResult<()> {
        self.repo.delete(number)
    }
}
