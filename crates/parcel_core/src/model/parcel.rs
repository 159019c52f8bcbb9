//! Parcel domain model.
//!
//! # Responsibility
//! - Define the shipment record and its lifecycle status.
//! - Own the status transition rule shared by every store implementation.
//!
//! # Invariants
//! - `number` is assigned once by the store and never reused.
//! - `created_at` is fixed at construction and never rewritten.
//! - Only `Registered` parcels accept address/status changes or deletion.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Store-assigned parcel identifier (auto-increment primary key).
pub type ParcelNumber = i64;

/// Identifier of the client owning a parcel. Not unique across parcels.
pub type ClientId = i64;

/// Lifecycle state of a parcel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParcelStatus {
    /// Accepted for shipment; still editable.
    Registered,
    /// Handed over to the carrier.
    Sent,
    /// Received by the client.
    Delivered,
}

impl ParcelStatus {
    /// Returns the persisted string form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::Sent => "sent",
            Self::Delivered => "delivered",
        }
    }

    /// Returns whether a parcel in this status may still be modified or deleted.
    pub fn is_mutable(self) -> bool {
        matches!(self, Self::Registered)
    }

    /// Checks that `self` is an allowed target of a status change.
    ///
    /// # Errors
    /// - `InvalidTargetStatus` for `Registered`; parcels never move back.
    pub fn validate_target(self) -> Result<(), ParcelValidationError> {
        match self {
            Self::Sent | Self::Delivered => Ok(()),
            Self::Registered => Err(ParcelValidationError::InvalidTargetStatus(self)),
        }
    }
}

impl Display for ParcelStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParcelStatus {
    type Err = ParcelValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "registered" => Ok(Self::Registered),
            "sent" => Ok(Self::Sent),
            "delivered" => Ok(Self::Delivered),
            other => Err(ParcelValidationError::UnknownStatus(other.to_string())),
        }
    }
}

/// Validation failures for parcel input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParcelValidationError {
    /// Status text is not one of `registered|sent|delivered`.
    UnknownStatus(String),
    /// Status is valid but cannot be the target of a status change.
    InvalidTargetStatus(ParcelStatus),
}

impl Display for ParcelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownStatus(value) => write!(
                f,
                "unknown parcel status `{value}`; expected registered|sent|delivered"
            ),
            Self::InvalidTargetStatus(status) => write!(
                f,
                "cannot change parcel status to `{status}`; expected sent|delivered"
            ),
        }
    }
}

impl Error for ParcelValidationError {}

/// One shipment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parcel {
    /// `None` until the store assigns a number on insert.
    pub number: Option<ParcelNumber>,
    pub client: ClientId,
    pub status: ParcelStatus,
    /// Free-text delivery address.
    pub address: String,
    /// RFC 3339 UTC timestamp, second precision.
    pub created_at: String,
}

impl Parcel {
    /// Creates a registered parcel stamped with the current time.
    pub fn new(client: ClientId, address: impl Into<String>) -> Self {
        Self::with_created_at(client, address, now_rfc3339())
    }

    /// Creates a registered parcel with a caller-provided creation timestamp.
    ///
    /// Used by import paths and tests that need deterministic records.
    pub fn with_created_at(
        client: ClientId,
        address: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            number: None,
            client,
            status: ParcelStatus::Registered,
            address: address.into(),
            created_at: created_at.into(),
        }
    }

    /// Returns whether this parcel still accepts changes.
    pub fn is_mutable(&self) -> bool {
        self.status.is_mutable()
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
