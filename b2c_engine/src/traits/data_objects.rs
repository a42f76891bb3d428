use serde::{Deserialize, Serialize};

use crate::db_types::{ConversationId, Payment};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InsertPaymentResult {
    Inserted(Payment),
    /// A record already holds one of the unique keys of the new payment.
    AlreadyExists(ConversationId),
}
