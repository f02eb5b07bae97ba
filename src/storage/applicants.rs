// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Applicant registry backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `applicants`: external_user_id → serialized ApplicantMapping
//!
//! The table key is the uniqueness constraint on `external_user_id`. Every
//! write reads the current row and replaces it inside one redb write
//! transaction; redb serializes write transactions, so insert-or-update is
//! atomic at the store level and needs no in-process lock.

use std::path::Path;

use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: external_user_id → serialized ApplicantMapping (JSON bytes).
const APPLICANTS: TableDefinition<&str, &[u8]> = TableDefinition::new("applicants");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Model
// =============================================================================

/// Persisted link between a caller identity and a provider applicant.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantMapping {
    /// Caller-chosen stable identity (unique key)
    pub external_user_id: String,
    /// Tenant / brand partition label
    pub tenant_brand: String,
    /// Caller-side routing reference, opaque to the gateway
    pub inbox_id: i64,
    /// Provider-assigned applicant identifier
    pub applicant_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ApplicantMapping {
    /// Whether this row already points at a provider applicant.
    pub fn has_applicant(&self) -> bool {
        !self.applicant_id.trim().is_empty()
    }
}

/// Values written by `upsert` and `claim`. Timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicantRecord {
    pub external_user_id: String,
    pub tenant_brand: String,
    pub inbox_id: i64,
    pub applicant_id: String,
}

/// Result of a conflict-resolving write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// The record was written; this caller owns the mapping.
    Inserted(ApplicantMapping),
    /// A row with an applicant id was already committed and was left as is.
    Existing(ApplicantMapping),
}

// =============================================================================
// Store Trait
// =============================================================================

/// Keyed store of applicant mappings.
pub trait ApplicantStore: Send + Sync {
    /// Point lookup by external identity.
    fn find(&self, external_user_id: &str) -> StoreResult<Option<ApplicantMapping>>;

    /// Insert, or overwrite tenant, inbox, applicant id and `updated_at` of
    /// the existing row. `created_at` is never changed.
    fn upsert(&self, record: &ApplicantRecord) -> StoreResult<ApplicantMapping>;

    /// Insert unless a row with a non-empty applicant id already exists, in
    /// which case the stored row wins and is returned untouched.
    fn claim(&self, record: &ApplicantRecord) -> StoreResult<ClaimOutcome>;
}

// =============================================================================
// ApplicantDatabase
// =============================================================================

/// Embedded ACID applicant database.
pub struct ApplicantDatabase {
    db: Database,
}

impl ApplicantDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = Database::create(path)?;

        // Pre-create the table so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(APPLICANTS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    fn write(&self, record: &ApplicantRecord, overwrite: bool) -> StoreResult<ClaimOutcome> {
        let now = Utc::now();
        let write_txn = self.db.begin_write()?;
        let outcome = {
            let mut table = write_txn.open_table(APPLICANTS)?;

            // Read existing value and deserialize before mutating
            let existing: Option<ApplicantMapping> = {
                match table.get(record.external_user_id.as_str())? {
                    Some(value) => Some(serde_json::from_slice(value.value())?),
                    None => None,
                }
            };

            match existing {
                Some(current) if !overwrite && current.has_applicant() => {
                    ClaimOutcome::Existing(current)
                }
                existing => {
                    let mapping = ApplicantMapping {
                        external_user_id: record.external_user_id.clone(),
                        tenant_brand: record.tenant_brand.clone(),
                        inbox_id: record.inbox_id,
                        applicant_id: record.applicant_id.clone(),
                        created_at: existing.map(|m| m.created_at).unwrap_or(now),
                        updated_at: now,
                    };
                    let json = serde_json::to_vec(&mapping)?;
                    table.insert(record.external_user_id.as_str(), json.as_slice())?;
                    ClaimOutcome::Inserted(mapping)
                }
            }
        };

        match outcome {
            ClaimOutcome::Inserted(_) => write_txn.commit()?,
            ClaimOutcome::Existing(_) => write_txn.abort()?,
        }
        Ok(outcome)
    }
}

impl ApplicantStore for ApplicantDatabase {
    fn find(&self, external_user_id: &str) -> StoreResult<Option<ApplicantMapping>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(APPLICANTS)?;
        match table.get(external_user_id)? {
            Some(value) => {
                let mapping: ApplicantMapping = serde_json::from_slice(value.value())?;
                Ok(Some(mapping))
            }
            None => Ok(None),
        }
    }

    fn upsert(&self, record: &ApplicantRecord) -> StoreResult<ApplicantMapping> {
        match self.write(record, true)? {
            ClaimOutcome::Inserted(mapping) | ClaimOutcome::Existing(mapping) => Ok(mapping),
        }
    }

    fn claim(&self, record: &ApplicantRecord) -> StoreResult<ClaimOutcome> {
        self.write(record, false)
    }
}

// =============================================================================
// Tests
// =============================================================================
