use chrono::{Duration, Utc};
use log::*;
use sqlx::SqliteConnection;

use crate::{
    db_types::{ConversationId, TransferRequest},
    traits::{correlation_key, CorrelationStoreError},
};

/// Stores (or replaces) the transfer request and sets its expiry to `ttl` from now. Requests that have already expired
/// are purged on the way.
pub async fn put_transfer_request(
    request: &TransferRequest,
    ttl: Duration,
    conn: &mut SqliteConnection,
) -> Result<(), CorrelationStoreError> {
    let key = correlation_key(&request.conversation_id);
    let payload = serde_json::to_string(request).map_err(|e| CorrelationStoreError::Serialization(e.to_string()))?;
    let now = Utc::now();
    let expires_at = (now + ttl).timestamp();
    purge_expired_requests(now.timestamp(), &mut *conn).await?;
    sqlx::query(
        r#"
            INSERT INTO transfer_requests (cache_key, payload, expires_at) VALUES ($1, $2, $3)
            ON CONFLICT(cache_key) DO UPDATE SET payload = excluded.payload, expires_at = excluded.expires_at;
        "#,
    )
    .bind(&key)
    .bind(payload)
    .bind(expires_at)
    .execute(conn)
    .await?;
    trace!("🗃️ Transfer request {key} cached until {expires_at}");
    Ok(())
}

pub async fn purge_expired_requests(now: i64, conn: &mut SqliteConnection) -> Result<u64, CorrelationStoreError> {
    let purged = sqlx::query("DELETE FROM transfer_requests WHERE expires_at <= $1")
        .bind(now)
        .execute(conn)
        .await?
        .rows_affected();
    if purged > 0 {
        debug!("🗃️ Purged {purged} expired transfer requests");
    }
    Ok(purged)
}

/// Fetches an unexpired transfer request. Expired rows that have not been purged yet are ignored.
pub async fn fetch_transfer_request(
    conversation_id: &ConversationId,
    conn: &mut SqliteConnection,
) -> Result<Option<TransferRequest>, CorrelationStoreError> {
    let key = correlation_key(conversation_id);
    let payload: Option<(String,)> =
        sqlx::query_as("SELECT payload FROM transfer_requests WHERE cache_key = $1 AND expires_at > $2")
            .bind(&key)
            .bind(Utc::now().timestamp())
            .fetch_optional(conn)
            .await?;
    payload
        .map(|(json,)| {
            serde_json::from_str::<TransferRequest>(&json)
                .map_err(|e| CorrelationStoreError::Deserialization(format!("{key}: {e}")))
        })
        .transpose()
}
