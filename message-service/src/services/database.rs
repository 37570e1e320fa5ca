use crate::models::Message;
use crate::services::MessageStore;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId},
    Client as MongoClient, Collection, Database,
};
use service_core::error::AppError;
use std::time::Duration;

const PING_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
}

impl MongoDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(database = %database, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(database);

        // The driver connects lazily; ping so an unreachable server fails startup.
        match tokio::time::timeout(PING_TIMEOUT, Self::ping(&client)).await {
            Ok(result) => result?,
            Err(_) => {
                tracing::error!("MongoDB ping timed out after {:?}", PING_TIMEOUT);
                return Err(AppError::DatabaseError(anyhow::anyhow!(
                    "MongoDB ping timed out after {:?}",
                    PING_TIMEOUT
                )));
            }
        }

        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    async fn ping(client: &MongoClient) -> Result<(), AppError> {
        client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        Self::ping(&self.client).await
    }

    pub fn messages(&self, collection: &str) -> Collection<Message> {
        self.db.collection(collection)
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }
}

/// `MessageStore` over a MongoDB collection.
#[derive(Clone)]
pub struct MongoMessageStore {
    db: MongoDb,
    messages: Collection<Message>,
}

impl MongoMessageStore {
    pub fn new(db: MongoDb, collection: &str) -> Self {
        let messages = db.messages(collection);
        Self { db, messages }
    }
}

#[async_trait]
impl MessageStore for MongoMessageStore {
    async fn list(&self) -> Result<Vec<Message>, AppError> {
        let cursor = self.messages.find(doc! {}, None).await?;
        let messages: Vec<Message> = cursor.try_collect().await?;
        Ok(messages)
    }

    async fn find(&self, id: ObjectId) -> Result<Option<Message>, AppError> {
        Ok(self.messages.find_one(doc! { "_id": id }, None).await?)
    }

    async fn insert(&self, text: String) -> Result<ObjectId, AppError> {
        let result = self.messages.insert_one(Message::new(text), None).await?;
        result.inserted_id.as_object_id().ok_or_else(|| {
            AppError::DatabaseError(anyhow::anyhow!(
                "Insert returned a non-ObjectId id: {}",
                result.inserted_id
            ))
        })
    }

    async fn replace(&self, id: ObjectId, text: String) -> Result<bool, AppError> {
        let result = self
            .messages
            .replace_one(doc! { "_id": id }, Message::new(text), None)
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete(&self, id: ObjectId) -> Result<bool, AppError> {
        let result = self.messages.delete_one(doc! { "_id": id }, None).await?;
        Ok(result.deleted_count > 0)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.db.health_check().await
    }
}
