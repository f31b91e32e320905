//! Storage quota ledger.
//!
//! `users.storage_used` is a cached aggregate; the canonical value is the
//! sum of sizes of the user's file rows. Every mutation of file ownership
//! recomputes the cache inside the same transaction, so drift cannot
//! accumulate.

use crate::api::error::AppError;
use crate::entities::{files, prelude::*, users};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, sea_query::Expr};

pub struct QuotaLedger;

impl QuotaLedger {
    /// Pre-flight admission check for an incoming batch. Rejects before any
    /// object is written to storage. An overflowing sum is over quota.
    pub fn check(storage_used: i64, storage_limit: i64, incoming: i64) -> Result<(), AppError> {
        match storage_used.checked_add(incoming) {
            Some(total) if total <= storage_limit => Ok(()),
            _ => Err(AppError::QuotaExceeded(
                "Storage limit exceeded. Please upgrade your plan or delete some files."
                    .to_string(),
            )),
        }
    }

    /// Recompute `storage_used` from the file rows and persist it. Run this
    /// on the same connection (transaction) that mutated the rows.
    pub async fn recompute<C: ConnectionTrait>(conn: &C, user_id: &str) -> Result<i64, AppError> {
        let sizes: Vec<i64> = Files::find()
            .filter(files::Column::OwnerId.eq(user_id))
            .all(conn)
            .await?
            .into_iter()
            .map(|f| f.size)
            .collect();
        let total: i64 = sizes.iter().sum();

        Users::update_many()
            .col_expr(users::Column::StorageUsed, Expr::value(total))
            .filter(users::Column::Id.eq(user_id))
            .exec(conn)
            .await?;

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_up_to_the_limit_inclusive() {
        assert!(QuotaLedger::check(0, 100, 100).is_ok());
        assert!(QuotaLedger::check(40, 100, 60).is_ok());
        assert!(QuotaLedger::check(40, 100, 61).is_err());
    }

    #[test]
    fn rejection_is_a_client_error() {
        let err = QuotaLedger::check(90, 100, 20).unwrap_err();
        assert!(matches!(err, AppError::QuotaExceeded(_)));
    }

    #[test]
    fn no_overflow_on_huge_incoming() {
        // A sum that overflows i64 must read as over quota, even against an
        // unbounded-looking limit
        assert!(QuotaLedger::check(i64::MAX, i64::MAX, i64::MAX).is_err());
        assert!(QuotaLedger::check(i64::MAX, i64::MAX, 1).is_err());
        assert!(QuotaLedger::check(1, i64::MAX, i64::MAX).is_err());
        assert!(QuotaLedger::check(i64::MAX - 1, i64::MAX, 1).is_ok());
    }
}
