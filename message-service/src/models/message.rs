use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A stored message. `_id` is assigned by the store on insert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default)]
    pub text: String,
}

impl Message {
    /// A message not yet persisted; the store fills in `id`.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: None,
            text: text.into(),
        }
    }
}
