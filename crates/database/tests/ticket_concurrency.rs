use database::{ticket, Database, DatabaseError};
use futures::future::join_all;

async fn file_db(dir: &tempfile::TempDir) -> Database {
    let url = format!("sqlite:{}?mode=rwc", dir.path().join("tickets.db").display());
    let db = Database::connect_with_pool_size(&url, 5).await.unwrap();
    db.migrate().await.unwrap();
    db
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_use_never_overdraws() {
    let dir = tempfile::tempdir().unwrap();
    let db = file_db(&dir).await;
    ticket::ensure_account(db.pool(), "u1", 3).await.unwrap();

    let attempts = (0..10).map(|i| {
        let pool = db.pool().clone();
        async move { ticket::use_ticket(&pool, "u1", &format!("job-{i}")).await }
    });
    let results = join_all(attempts).await;

    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    let refused = results
        .iter()
        .filter(|r| matches!(r, Err(DatabaseError::InsufficientTickets { .. })))
        .count();

    assert_eq!(succeeded, 3);
    assert_eq!(refused, 7);
    assert_eq!(ticket::get_remaining(db.pool(), "u1").await.unwrap(), Some(0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_refunds_credit_once() {
    let dir = tempfile::tempdir().unwrap();
    let db = file_db(&dir).await;
    ticket::ensure_account(db.pool(), "u1", 1).await.unwrap();
    ticket::use_ticket(db.pool(), "u1", "job-1").await.unwrap();

    let refunds = (0..5).map(|_| {
        let pool = db.pool().clone();
        async move { ticket::refund_ticket(&pool, "u1", "job-1").await }
    });
    let results = join_all(refunds).await;

    let credited = results
        .into_iter()
        .filter(|r| matches!(r, Ok(true)))
        .count();
    assert_eq!(credited, 1);
    assert_eq!(ticket::get_remaining(db.pool(), "u1").await.unwrap(), Some(1));
}
