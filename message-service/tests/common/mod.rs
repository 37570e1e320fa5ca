use async_trait::async_trait;
use message_service::config::{MessageConfig, MongoConfig, StoreBackend};
use message_service::models::Message;
use message_service::services::{InMemoryMessageStore, MessageStore, MongoDb};
use message_service::startup::Application;
use mongodb::bson::oid::ObjectId;
use service_core::error::AppError;
use std::sync::Arc;
use uuid::Uuid;

/// Store whose every call fails like an unreachable database.
pub struct UnavailableMessageStore;

fn unavailable() -> AppError {
    AppError::DatabaseError(anyhow::anyhow!("connection refused"))
}

#[async_trait]
impl MessageStore for UnavailableMessageStore {
    async fn list(&self) -> Result<Vec<Message>, AppError> {
        Err(unavailable())
    }

    async fn find(&self, _id: ObjectId) -> Result<Option<Message>, AppError> {
        Err(unavailable())
    }

    async fn insert(&self, _text: String) -> Result<ObjectId, AppError> {
        Err(unavailable())
    }

    async fn replace(&self, _id: ObjectId, _text: String) -> Result<bool, AppError> {
        Err(unavailable())
    }

    async fn delete(&self, _id: ObjectId) -> Result<bool, AppError> {
        Err(unavailable())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Err(unavailable())
    }
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub client: reqwest::Client,
    mongo: Option<(MongoDb, String)>,
}

impl TestApp {
    /// Spawns the service on a random port with an in-memory store.
    pub async fn spawn() -> Self {
        Self::spawn_with_store(Arc::new(InMemoryMessageStore::new())).await
    }

    /// Spawns the service on a random port around `store`.
    pub async fn spawn_with_store(store: Arc<dyn MessageStore>) -> Self {
        let config = MessageConfig::in_memory(0);
        let app = Application::build_with_store(config, store)
            .await
            .expect("Failed to build test application");

        Self::launch(app, None).await
    }

    /// Spawns the service against a throwaway database on a local MongoDB.
    pub async fn spawn_with_mongo() -> Self {
        let uri = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let db_name = format!("message_test_{}", Uuid::new_v4().simple());

        let mut config = MessageConfig::in_memory(0);
        config.store.backend = StoreBackend::MongoDb;
        config.store.mongodb = Some(MongoConfig {
            uri: uri.clone(),
            database: db_name.clone(),
            collection: "messages".to_string(),
        });

        let db = MongoDb::connect(&uri, &db_name)
            .await
            .expect("Failed to connect to MongoDB");

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        Self::launch(app, Some((db, db_name))).await
    }

    async fn launch(app: Application, mongo: Option<(MongoDb, String)>) -> Self {
        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server by polling the health endpoint.
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            client,
            mongo,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// POSTs `{"text": text}` and returns the assigned id.
    pub async fn create_message(&self, text: &str) -> String {
        let response = self
            .client
            .post(self.url("/messages/"))
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        body["InsertedID"]
            .as_str()
            .expect("Missing InsertedID")
            .to_string()
    }

    /// Drops the throwaway database, if any.
    pub async fn cleanup(&self) {
        if let Some((db, db_name)) = &self.mongo {
            let _ = db.client().database(db_name).drop(None).await;
        }
    }
}
