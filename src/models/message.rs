use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub text: String,
    #[serde(with = "time::serde::rfc3339", default = "super::unix_epoch")]
    pub timestamp: OffsetDateTime,
}

impl Message {
    pub fn new(conversation_id: String, sender_id: String, receiver_id: String, text: String) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            conversation_id,
            sender_id,
            receiver_id,
            text,
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    pub fn involves(&self, user_id: &str) -> bool {
        self.sender_id == user_id || self.receiver_id == user_id
    }
}
