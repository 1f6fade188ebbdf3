use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, Set};
use serde_json::Value;
use uuid::Uuid;

use crate::{db::OrmConn, entity::audit_logs::ActiveModel as AuditLogActive, error::AppResult};

/// Record a payment-flow event. Callers treat failures as non-fatal and log
/// a warning instead of aborting the request.
pub async fn log_audit(
    orm: &OrmConn,
    order_id: Option<Uuid>,
    action: &str,
    metadata: Option<Value>,
) -> AppResult<()> {
    AuditLogActive {
        id: Set(Uuid::new_v4()),
        order_id: Set(order_id),
        action: Set(action.to_string()),
        metadata: Set(metadata),
        created_at: NotSet,
    }
    .insert(orm)
    .await?;

    Ok(())
}
