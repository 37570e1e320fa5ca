pub mod database;
pub mod memory;
pub mod metrics;
pub mod store;

pub use database::{MongoDb, MongoMessageStore};
pub use memory::InMemoryMessageStore;
pub use metrics::{get_metrics, init_metrics, record_message_operation};
pub use store::MessageStore;
