//! Ticket balances and the ledger that backs them.
//!
//! Every balance change writes a ledger row in the same transaction. The
//! ledger's unique `(job_id, reason)` index means a job can be charged once
//! and refunded once, whatever the callers do concurrently.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::TicketLedgerEntry;

/// Current balance, or `None` if the user has no ticket account yet.
pub async fn get_remaining(pool: &SqlitePool, user_id: &str) -> Result<Option<i64>> {
    let remaining = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT remaining
        FROM user_tickets
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(remaining)
}

/// Create the ticket account with `initial` tickets if it does not exist.
///
/// Returns the balance after the call.
pub async fn ensure_account(pool: &SqlitePool, user_id: &str, initial: i64) -> Result<i64> {
    let mut tx = pool.begin().await?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO user_tickets (user_id, remaining)
        VALUES (?, ?)
        ON CONFLICT(user_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(initial)
    .execute(&mut *tx)
    .await?;

    if inserted.rows_affected() > 0 && initial > 0 {
        sqlx::query(
            r#"
            INSERT INTO ticket_ledger (user_id, job_id, delta, reason)
            VALUES (?, NULL, ?, 'grant')
            "#,
        )
        .bind(user_id)
        .bind(initial)
        .execute(&mut *tx)
        .await?;
        tracing::info!(user_id, initial, "Opened ticket account");
    }

    let remaining = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT remaining FROM user_tickets WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(remaining)
}

/// Spend one ticket on `job_id`.
///
/// Returns the remaining balance. Fails with `InsufficientTickets` when the
/// balance is zero (or the account does not exist) and with `AlreadyExists`
/// when the job was already charged; in both cases nothing changes.
pub async fn use_ticket(pool: &SqlitePool, user_id: &str, job_id: &str) -> Result<i64> {
    let mut tx = pool.begin().await?;

    let updated = sqlx::query(
        r#"
        UPDATE user_tickets
        SET remaining = remaining - 1, updated_at = datetime('now')
        WHERE user_id = ? AND remaining > 0
        "#,
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(DatabaseError::InsufficientTickets {
            user_id: user_id.to_string(),
        });
    }

    sqlx::query(
        r#"
        INSERT INTO ticket_ledger (user_id, job_id, delta, reason)
        VALUES (?, ?, -1, 'use')
        "#,
    )
    .bind(user_id)
    .bind(job_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| DatabaseError::from_insert(e, "TicketUse", job_id))?;

    let remaining = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT remaining FROM user_tickets WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::debug!(user_id, job_id, remaining, "Ticket used");
    Ok(remaining)
}

/// Give back the ticket spent on `job_id`.
///
/// Returns `true` if the balance was credited, `false` if the job was never
/// charged to this user or has already been refunded.
pub async fn refund_ticket(pool: &SqlitePool, user_id: &str, job_id: &str) -> Result<bool> {
    let mut tx = pool.begin().await?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO ticket_ledger (user_id, job_id, delta, reason)
        SELECT user_id, job_id, 1, 'refund'
        FROM ticket_ledger
        WHERE job_id = ? AND user_id = ? AND reason = 'use'
        "#,
    )
    .bind(job_id)
    .bind(user_id)
    .execute(&mut *tx)
    .await;

    let inserted = match inserted {
        Ok(result) => result.rows_affected(),
        Err(sqlx::Error::Database(ref db_err)) if db_err.is_unique_violation() => {
            tracing::debug!(user_id, job_id, "Ticket already refunded");
            return Ok(false);
        }
        Err(e) => return Err(DatabaseError::Sqlx(e)),
    };

    if inserted == 0 {
        return Ok(false);
    }

    sqlx::query(
        r#"
        UPDATE user_tickets
        SET remaining = remaining + 1, updated_at = datetime('now')
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(user_id, job_id, "Ticket refunded");
    Ok(true)
}

/// Grant `amount` tickets, opening the account if needed.
///
/// Returns the new balance.
pub async fn add_tickets(pool: &SqlitePool, user_id: &str, amount: i64) -> Result<i64> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO user_tickets (user_id, remaining)
        VALUES (?, ?)
        ON CONFLICT(user_id) DO UPDATE SET
            remaining = remaining + excluded.remaining,
            updated_at = datetime('now')
        "#,
    )
    .bind(user_id)
    .bind(amount)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO ticket_ledger (user_id, job_id, delta, reason)
        VALUES (?, NULL, ?, 'grant')
        "#,
    )
    .bind(user_id)
    .bind(amount)
    .execute(&mut *tx)
    .await?;

    let remaining = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT remaining FROM user_tickets WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(user_id, amount, remaining, "Tickets granted");
    Ok(remaining)
}

/// Ledger entries for a user, oldest first.
pub async fn ledger(pool: &SqlitePool, user_id: &str) -> Result<Vec<TicketLedgerEntry>> {
    let entries = sqlx::query_as::<_, TicketLedgerEntry>(
        r#"
        SELECT id, user_id, job_id, delta, reason, created_at
        FROM ticket_ledger
        WHERE user_id = ?
        ORDER BY id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_missing_account_has_no_balance() {
        let db = test_db().await;
        assert_eq!(get_remaining(db.pool(), "nobody").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_ensure_account_is_idempotent() {
        let db = test_db().await;

        assert_eq!(ensure_account(db.pool(), "u1", 3).await.unwrap(), 3);
        assert_eq!(ensure_account(db.pool(), "u1", 3).await.unwrap(), 3);

        let entries = ledger(db.pool(), "u1").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].reason, "grant");
    }

    #[tokio::test]
    async fn test_use_ticket_without_balance() {
        let db = test_db().await;

        let result = use_ticket(db.pool(), "u1", "job-1").await;
        assert!(matches!(result, Err(DatabaseError::InsufficientTickets { .. })));

        ensure_account(db.pool(), "u1", 0).await.unwrap();
        let result = use_ticket(db.pool(), "u1", "job-1").await;
        assert!(matches!(result, Err(DatabaseError::InsufficientTickets { .. })));
        assert_eq!(get_remaining(db.pool(), "u1").await.unwrap(), Some(0));
        assert!(ledger(db.pool(), "u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_use_and_refund() {
        let db = test_db().await;
        ensure_account(db.pool(), "u1", 2).await.unwrap();

        assert_eq!(use_ticket(db.pool(), "u1", "job-1").await.unwrap(), 1);
        assert!(refund_ticket(db.pool(), "u1", "job-1").await.unwrap());
        assert_eq!(get_remaining(db.pool(), "u1").await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_refund_is_idempotent() {
        let db = test_db().await;
        ensure_account(db.pool(), "u1", 1).await.unwrap();
        use_ticket(db.pool(), "u1", "job-1").await.unwrap();

        assert!(refund_ticket(db.pool(), "u1", "job-1").await.unwrap());
        assert!(!refund_ticket(db.pool(), "u1", "job-1").await.unwrap());
        assert_eq!(get_remaining(db.pool(), "u1").await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_refund_of_uncharged_job() {
        let db = test_db().await;
        ensure_account(db.pool(), "u1", 1).await.unwrap();
        ensure_account(db.pool(), "u2", 1).await.unwrap();
        use_ticket(db.pool(), "u1", "job-1").await.unwrap();

        assert!(!refund_ticket(db.pool(), "u1", "job-unknown").await.unwrap());
        // Someone else's job is not refundable to u2.
        assert!(!refund_ticket(db.pool(), "u2", "job-1").await.unwrap());
        assert_eq!(get_remaining(db.pool(), "u2").await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_same_job_is_charged_once() {
        let db = test_db().await;
        ensure_account(db.pool(), "u1", 5).await.unwrap();

        use_ticket(db.pool(), "u1", "job-1").await.unwrap();
        let again = use_ticket(db.pool(), "u1", "job-1").await;
        assert!(matches!(again, Err(DatabaseError::AlreadyExists { .. })));
        assert_eq!(get_remaining(db.pool(), "u1").await.unwrap(), Some(4));
    }

    #[tokio::test]
    async fn test_add_tickets() {
        let db = test_db().await;

        assert_eq!(add_tickets(db.pool(), "u1", 5).await.unwrap(), 5);
        assert_eq!(add_tickets(db.pool(), "u1", 2).await.unwrap(), 7);

        let total: i64 = ledger(db.pool(), "u1")
            .await
            .unwrap()
            .iter()
            .map(|e| e.delta)
            .sum();
        assert_eq!(total, 7);
    }
}
