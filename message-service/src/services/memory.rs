use crate::models::Message;
use crate::services::MessageStore;
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use service_core::error::AppError;
use tokio::sync::RwLock;

/// Process-local `MessageStore` with the same id and ordering semantics as
/// the MongoDB store. Contents are lost on restart.
#[derive(Default)]
pub struct InMemoryMessageStore {
    messages: RwLock<Vec<Message>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn list(&self) -> Result<Vec<Message>, AppError> {
        Ok(self.messages.read().await.clone())
    }

    async fn find(&self, id: ObjectId) -> Result<Option<Message>, AppError> {
        Ok(self
            .messages
            .read()
            .await
            .iter()
            .find(|m| m.id == Some(id))
            .cloned())
    }

    async fn insert(&self, text: String) -> Result<ObjectId, AppError> {
        let id = ObjectId::new();
        self.messages.write().await.push(Message { id: Some(id), text });
        Ok(id)
    }

    async fn replace(&self, id: ObjectId, text: String) -> Result<bool, AppError> {
        let mut messages = self.messages.write().await;
        match messages.iter_mut().find(|m| m.id == Some(id)) {
            Some(message) => {
                message.text = text;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: ObjectId) -> Result<bool, AppError> {
        let mut messages = self.messages.write().await;
        let before = messages.len();
        messages.retain(|m| m.id != Some(id));
        Ok(messages.len() != before)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}
