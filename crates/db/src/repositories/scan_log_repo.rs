//! Repository for the append-only `card_scan_logs` table.

use attendft_core::types::Timestamp;
use sqlx::{PgConnection, PgPool};

use crate::models::scan_log::CardScanLog;

const COLUMNS: &str = "id, card_id, scan_time, created_at";

pub struct ScanLogRepo;

impl ScanLogRepo {
    /// Append a raw scan. Runs on the caller's connection so the row shares
    /// the fate of the surrounding scan transaction.
    pub async fn insert(
        conn: &mut PgConnection,
        card_id: &str,
        scan_time: Timestamp,
    ) -> Result<CardScanLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO card_scan_logs (card_id, scan_time)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CardScanLog>(&query)
            .bind(card_id)
            .bind(scan_time)
            .fetch_one(conn)
            .await
    }

    /// Most recent scans first, optionally for a single card.
    pub async fn list_recent(
        pool: &PgPool,
        card_id: Option<&str>,
        limit: i64,
    ) -> Result<Vec<CardScanLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM card_scan_logs
             WHERE ($1::text IS NULL OR card_id = $1)
             ORDER BY scan_time DESC, id DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, CardScanLog>(&query)
            .bind(card_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM card_scan_logs")
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }
}
