use crate::models::Message;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;

/// Create/replace body. Any `id` field sent by the client is ignored.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct MessagePayload {
    #[serde(default)]
    pub text: String,
}

impl MessagePayload {
    /// Decodes a request body. Content-Type is not inspected.
    pub fn from_body(body: &[u8]) -> Result<Self, AppError> {
        serde_json::from_slice(body).map_err(|e| AppError::BadRequest(anyhow::anyhow!(e)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub id: String,
    pub text: String,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id.map(|id| id.to_hex()).unwrap_or_default(),
            text: message.text,
        }
    }
}

/// Insert acknowledgment returned by `POST /messages/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InsertMessageResponse {
    #[serde(rename = "InsertedID")]
    pub inserted_id: String,
}

impl From<ObjectId> for InsertMessageResponse {
    fn from(id: ObjectId) -> Self {
        Self {
            inserted_id: id.to_hex(),
        }
    }
}

pub fn parse_message_id(raw: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(raw)
        .map_err(|_| AppError::BadRequest(anyhow::anyhow!("Invalid ID format")))
}
