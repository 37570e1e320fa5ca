use crate::models::Message;
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use service_core::error::AppError;

/// Persistence for the message collection.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Full collection scan in insertion order.
    async fn list(&self) -> Result<Vec<Message>, AppError>;
    async fn find(&self, id: ObjectId) -> Result<Option<Message>, AppError>;
    /// Inserts a new message and returns the id the store assigned.
    async fn insert(&self, text: String) -> Result<ObjectId, AppError>;
    /// Full-document replace. Returns `false` when no message matched `id`.
    async fn replace(&self, id: ObjectId, text: String) -> Result<bool, AppError>;
    /// Returns `false` when no message matched `id`.
    async fn delete(&self, id: ObjectId) -> Result<bool, AppError>;
    async fn health_check(&self) -> Result<(), AppError>;
}
