//! Parcel repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide Add/Get/GetByClient/SetStatus/SetAddress/Delete over the
//!   `parcel` table.
//! - Enforce the "only while registered" mutation policy.
//!
//! # Invariants
//! - Every statement is parameterized.
//! - Mutations touch at most one row, guarded by `status = 'registered'`.
//! - Status targets are validated before any storage access.
//! - Read paths reject rows with unknown status text instead of masking them.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::parcel::{ClientId, Parcel, ParcelNumber, ParcelStatus, ParcelValidationError};
use log::{debug, warn};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const PARCEL_TABLE: &str = "parcel";
const PARCEL_COLUMNS: &[&str] = &["number", "client", "status", "address", "created_at"];

const PARCEL_SELECT_SQL: &str = "SELECT
    number,
    client,
    status,
    address,
    created_at
FROM parcel";

pub type RepoResult<T> = Result<T, RepoError>;

/// Mutating operation rejected by the lifecycle policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParcelOperation {
    SetStatus,
    SetAddress,
    Delete,
}

impl ParcelOperation {
    fn as_str(self) -> &'static str {
        match self {
            Self::SetStatus => "set_status",
            Self::SetAddress => "set_address",
            Self::Delete => "delete",
        }
    }
}

impl Display for ParcelOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Repository error for parcel persistence and lifecycle checks.
#[derive(Debug)]
pub enum RepoError {
    Validation(ParcelValidationError),
    /// Operation not allowed for the parcel's current status.
    State {
        number: ParcelNumber,
        status: ParcelStatus,
        operation: ParcelOperation,
    },
    NotFound(ParcelNumber),
    Db(DbError),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl RepoError {
    /// Returns whether repeating the same call may succeed.
    ///
    /// Only lock contention qualifies; validation and state failures are
    /// permanent for the current record.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Db(err) => err.is_busy(),
            _ => false,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::State {
                number,
                status,
                operation,
            } => write!(
                f,
                "cannot {operation} parcel {number} with status `{status}`; parcel must be registered"
            ),
            Self::NotFound(number) => write!(f, "parcel not found: {number}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted parcel data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ParcelValidationError> for RepoError {
    fn from(value: ParcelValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Data-access contract for parcel records.
pub trait ParcelRepository {
    /// Persists a parcel and returns the store-assigned number.
    ///
    /// `parcel.number` is ignored.
    fn add(&self, parcel: &Parcel) -> RepoResult<ParcelNumber>;
    /// Loads one parcel or fails with `NotFound`.
    fn get(&self, number: ParcelNumber) -> RepoResult<Parcel>;
    /// Loads every parcel owned by `client`; empty when there are none.
    fn get_by_client(&self, client: ClientId) -> RepoResult<Vec<Parcel>>;
    /// Moves a registered parcel to `sent` or `delivered`.
    fn set_status(&self, number: ParcelNumber, status: ParcelStatus) -> RepoResult<()>;
    /// Rewrites the address of a registered parcel.
    fn set_address(&self, number: ParcelNumber, address: &str) -> RepoResult<()>;
    /// Removes a registered parcel.
    fn delete(&self, number: ParcelNumber) -> RepoResult<()>;
}

/// SQLite-backed parcel repository.
pub struct SqliteParcelRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteParcelRepository<'conn> {
    /// Wraps a connection prepared by `db::open_db` / `db::open_db_in_memory`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema
    ///   does not carry the `parcel` table shape.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema(conn)?;
        Ok(Self { conn })
    }

    fn current_status(&self, number: ParcelNumber) -> RepoResult<Option<ParcelStatus>> {
        let status_text: Option<String> = self
            .conn
            .query_row(
                "SELECT status FROM parcel WHERE number = ?1;",
                [number],
                |row| row.get(0),
            )
            .optional()?;

        status_text.map(|text| parse_status(&text)).transpose()
    }

    /// Classifies a guarded write that matched no row.
    fn rejection(&self, number: ParcelNumber, operation: ParcelOperation) -> RepoError {
        match self.current_status(number) {
            Ok(None) => {
                warn!(
                    "event=parcel_{operation} module=repo status=error error_code=not_found number={number}"
                );
                RepoError::NotFound(number)
            }
            Ok(Some(status)) => {
                warn!(
                    "event=parcel_{operation} module=repo status=error error_code=invalid_state number={number} current_status={status}"
                );
                RepoError::State {
                    number,
                    status,
                    operation,
                }
            }
            Err(err) => err,
        }
    }
}

impl ParcelRepository for SqliteParcelRepository<'_> {
    fn add(&self, parcel: &Parcel) -> RepoResult<ParcelNumber> {
        self.conn.execute(
            "INSERT INTO parcel (client, status, address, created_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                parcel.client,
                parcel.status.as_str(),
                parcel.address.as_str(),
                parcel.created_at.as_str(),
            ],
        )?;

        let number = self.conn.last_insert_rowid();
        debug!(
            "event=parcel_add module=repo status=ok number={number} client={} parcel_status={}",
            parcel.client, parcel.status
        );
        Ok(number)
    }

    fn get(&self, number: ParcelNumber) -> RepoResult<Parcel> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PARCEL_SELECT_SQL} WHERE number = ?1;"))?;

        let mut rows = stmt.query([number])?;
        if let Some(row) = rows.next()? {
            return parse_parcel_row(row);
        }

        Err(RepoError::NotFound(number))
    }

    fn get_by_client(&self, client: ClientId) -> RepoResult<Vec<Parcel>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PARCEL_SELECT_SQL} WHERE client = ?1 ORDER BY number ASC;"
        ))?;

        let mut rows = stmt.query([client])?;
        let mut parcels = Vec::new();
        while let Some(row) = rows.next()? {
            parcels.push(parse_parcel_row(row)?);
        }

        Ok(parcels)
    }

    fn set_status(&self, number: ParcelNumber, status: ParcelStatus) -> RepoResult<()> {
        status.validate_target()?;

        let changed = self.conn.execute(
            "UPDATE parcel SET status = ?1 WHERE number = ?2 AND status = ?3;",
            params![status.as_str(), number, ParcelStatus::Registered.as_str()],
        )?;

        if changed == 0 {
            return Err(self.rejection(number, ParcelOperation::SetStatus));
        }

        debug!(
            "event=parcel_set_status module=repo status=ok number={number} parcel_status={status}"
        );
        Ok(())
    }

    fn set_address(&self, number: ParcelNumber, address: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE parcel SET address = ?1 WHERE number = ?2 AND status = ?3;",
            params![address, number, ParcelStatus::Registered.as_str()],
        )?;

        if changed == 0 {
            return Err(self.rejection(number, ParcelOperation::SetAddress));
        }

        debug!("event=parcel_set_address module=repo status=ok number={number}");
        Ok(())
    }

    fn delete(&self, number: ParcelNumber) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM parcel WHERE number = ?1 AND status = ?2;",
            params![number, ParcelStatus::Registered.as_str()],
        )?;

        if changed == 0 {
            return Err(self.rejection(number, ParcelOperation::Delete));
        }

        debug!("event=parcel_delete module=repo status=ok number={number}");
        Ok(())
    }
}

fn ensure_schema(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists: bool = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
        );",
        [PARCEL_TABLE],
        |row| row.get(0),
    )?;
    if !table_exists {
        return Err(RepoError::MissingRequiredTable(PARCEL_TABLE));
    }

    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let present = stmt
        .query_map([PARCEL_TABLE], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    for &column in PARCEL_COLUMNS {
        if !present.iter().any(|name| name == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: PARCEL_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn parse_parcel_row(row: &Row<'_>) -> RepoResult<Parcel> {
    let status_text: String = row.get("status")?;

    Ok(Parcel {
        number: Some(row.get("number")?),
        client: row.get("client")?,
        status: parse_status(&status_text)?,
        address: row.get("address")?,
        created_at: row.get("created_at")?,
    })
}

fn parse_status(value: &str) -> RepoResult<ParcelStatus> {
    value
        .parse()
        .map_err(|_| RepoError::InvalidData(format!("invalid status `{value}` in parcel.status")))
}
