pub mod health;
pub mod messages;

pub use health::{health_check, metrics_endpoint, readiness_check};
pub use messages::{
    create_message, delete_message, delete_without_id, get_message, list_messages,
    method_not_allowed, update_message, update_without_id,
};
