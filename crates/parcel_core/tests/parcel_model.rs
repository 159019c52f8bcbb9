use parcel_core::{Parcel, ParcelStatus, ParcelValidationError};
use serde_json::json;

#[test]
fn parcel_new_starts_registered_without_number() {
    let parcel = Parcel::new(1000, "test");

    assert_eq!(parcel.number, None);
    assert_eq!(parcel.client, 1000);
    assert_eq!(parcel.status, ParcelStatus::Registered);
    assert_eq!(parcel.address, "test");
    assert!(!parcel.created_at.is_empty());
    assert!(parcel.is_mutable());
}

#[test]
fn only_registered_status_is_mutable() {
    assert!(ParcelStatus::Registered.is_mutable());
    assert!(!ParcelStatus::Sent.is_mutable());
    assert!(!ParcelStatus::Delivered.is_mutable());
}

#[test]
fn parcel_serialization_uses_lowercase_status() {
    let mut parcel = Parcel::with_created_at(7, "Main st. 1", "2026-10-17T09:30:00Z");
    parcel.number = Some(3);
    parcel.status = ParcelStatus::Delivered;

    let value = serde_json::to_value(&parcel).unwrap();
    assert_eq!(
        value,
        json!({
            "number": 3,
            "client": 7,
            "status": "delivered",
            "address": "Main st. 1",
            "created_at": "2026-10-17T09:30:00Z",
        })
    );

    let decoded: Parcel = serde_json::from_value(value).unwrap();
    assert_eq!(decoded, parcel);
}

#[test]
fn status_text_parsing_surfaces_validation_error() {
    let err = "returned".parse::<ParcelStatus>().unwrap_err();
    assert_eq!(err, ParcelValidationError::UnknownStatus("returned".to_string()));
    assert!(err.to_string().contains("registered|sent|delivered"));
    assert_eq!("sent".parse::<ParcelStatus>(), Ok(ParcelStatus::Sent));
}
