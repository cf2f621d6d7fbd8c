// Event entity
// `quota` is the remaining sellable ticket count. It is mutated only by the
// allocation and compensation commands and must never go negative.

use serde::{Deserialize, Serialize};

use crate::value_objects::{EventId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub price: i64,
    pub quota: i64,
    pub owner_id: UserId,
}

/// Insert payload; the store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEvent {
    pub name: String,
    pub price: i64,
    pub quota: i64,
    pub owner_id: UserId,
}
