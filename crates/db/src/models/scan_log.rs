//! Raw card scan log model.

use attendft_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// One raw badge read from the `card_scan_logs` table. Append-only.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CardScanLog {
    pub id: DbId,
    pub card_id: String,
    pub scan_time: Timestamp,
    pub created_at: Timestamp,
}
