pub mod messages;

pub use messages::{parse_message_id, InsertMessageResponse, MessagePayload, MessageResponse};
