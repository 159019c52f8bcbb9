use parcel_core::db::{open_db, open_db_in_memory};
use parcel_core::{
    ClientId, Parcel, ParcelRepository, ParcelService, ParcelStatus, RepoError,
    SqliteParcelRepository,
};
use std::collections::HashSet;
use uuid::Uuid;

/// Client id unlikely to collide with rows left by other test runs.
fn unique_client() -> ClientId {
    let (high, _) = Uuid::new_v4().as_u64_pair();
    (high >> 1) as ClientId
}

#[test]
fn register_then_deliver() {
    let conn = open_db_in_memory().unwrap();
    let service = ParcelService::new(SqliteParcelRepository::try_new(&conn).unwrap());

    let number = service.register(1000, "test").unwrap();
    let parcel = service.get(number).unwrap();
    assert_eq!(parcel.number, Some(number));
    assert_eq!(parcel.status, ParcelStatus::Registered);

    service.deliver(number).unwrap();
    assert_eq!(service.get(number).unwrap().status, ParcelStatus::Delivered);

    let err = service.send(number).unwrap_err();
    assert!(matches!(err, RepoError::State { .. }));
}

#[test]
fn change_address_and_cancel_while_registered() {
    let conn = open_db_in_memory().unwrap();
    let service = ParcelService::new(SqliteParcelRepository::try_new(&conn).unwrap());

    let number = service.register(1000, "old").unwrap();
    service.change_address(number, "new").unwrap();
    assert_eq!(service.get(number).unwrap().address, "new");

    service.cancel(number).unwrap();
    assert!(matches!(service.get(number), Err(RepoError::NotFound(_))));
}

#[test]
fn shared_file_database_lists_parcels_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tracker.db");
    let client = unique_client();

    let writer = open_db(&path).unwrap();
    let service = ParcelService::new(SqliteParcelRepository::try_new(&writer).unwrap());
    let added: HashSet<_> = (0..3)
        .map(|_| service.register(client, "test").unwrap())
        .collect();
    service.register(unique_client(), "someone else").unwrap();

    let reader = open_db(&path).unwrap();
    let repo = SqliteParcelRepository::try_new(&reader).unwrap();
    let listed: HashSet<_> = repo
        .get_by_client(client)
        .unwrap()
        .into_iter()
        .filter_map(|parcel| parcel.number)
        .collect();

    assert_eq!(listed, added);
    assert_eq!(service.list_by_client(client).unwrap().len(), 3);
}

#[test]
fn add_keeps_caller_built_parcel_fields() {
    let conn = open_db_in_memory().unwrap();
    let service = ParcelService::new(SqliteParcelRepository::try_new(&conn).unwrap());

    let mut parcel = Parcel::with_created_at(77, "depot", "2026-10-17T09:30:00Z");
    parcel.status = ParcelStatus::Sent;
    let number = service.add(&parcel).unwrap();

    let expected = Parcel {
        number: Some(number),
        ..parcel
    };
    assert_eq!(service.get(number).unwrap(), expected);
    assert!(matches!(
        service.change_address(number, "home"),
        Err(RepoError::State { .. })
    ));
}
