use crate::dtos::{parse_message_id, InsertMessageResponse, MessagePayload, MessageResponse};
use crate::models::Message;
use crate::services::record_message_operation;
use crate::startup::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use mongodb::bson::oid::ObjectId;
use service_core::error::AppError;

fn observe<T>(operation: &'static str, result: Result<T, AppError>) -> Result<T, AppError> {
    let outcome = match &result {
        Ok(_) => "ok",
        Err(AppError::BadRequest(_)) => "bad_request",
        Err(AppError::NotFound(_)) => "not_found",
        Err(_) => "error",
    };
    record_message_operation(operation, outcome);
    result
}

fn message_not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("Message not found"))
}

async fn find_message(state: &AppState, raw_id: &str) -> Result<Message, AppError> {
    let id = parse_message_id(raw_id)?;
    state.store.find(id).await?.ok_or_else(message_not_found)
}

async fn insert_message(state: &AppState, body: &[u8]) -> Result<ObjectId, AppError> {
    let payload = MessagePayload::from_body(body)?;
    state.store.insert(payload.text).await
}

async fn replace_message(
    state: &AppState,
    raw_id: &str,
    body: &[u8],
) -> Result<ObjectId, AppError> {
    let id = parse_message_id(raw_id)?;
    let payload = MessagePayload::from_body(body)?;
    if state.store.replace(id, payload.text).await? {
        Ok(id)
    } else {
        Err(message_not_found())
    }
}

async fn remove_message(state: &AppState, raw_id: &str) -> Result<ObjectId, AppError> {
    let id = parse_message_id(raw_id)?;
    if state.store.delete(id).await? {
        Ok(id)
    } else {
        Err(message_not_found())
    }
}

#[tracing::instrument(skip(state))]
pub async fn list_messages(
    State(state): State<AppState>,
) -> Result<Json<Vec<MessageResponse>>, AppError> {
    let messages = observe("list", state.store.list().await)?;
    tracing::debug!(count = messages.len(), "Listed messages");

    Ok(Json(messages.into_iter().map(MessageResponse::from).collect()))
}

#[tracing::instrument(skip(state))]
pub async fn get_message(
    State(state): State<AppState>,
    Path(message_id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let message = observe("get", find_message(&state, &message_id).await)?;

    Ok(Json(MessageResponse::from(message)))
}

#[tracing::instrument(skip(state, body))]
pub async fn create_message(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let id = observe("create", insert_message(&state, &body).await)?;

    tracing::info!(message_id = %id, "Message created");

    Ok((StatusCode::CREATED, Json(InsertMessageResponse::from(id))))
}

#[tracing::instrument(skip(state, body))]
pub async fn update_message(
    State(state): State<AppState>,
    Path(message_id): Path<String>,
    body: Bytes,
) -> Result<&'static str, AppError> {
    let id = observe("update", replace_message(&state, &message_id, &body).await)?;

    tracing::info!(message_id = %id, "Message updated");

    Ok("Message updated successfully")
}

#[tracing::instrument(skip(state))]
pub async fn delete_message(
    State(state): State<AppState>,
    Path(message_id): Path<String>,
) -> Result<&'static str, AppError> {
    let id = observe("delete", remove_message(&state, &message_id).await)?;

    tracing::info!(message_id = %id, "Message deleted");

    Ok("Message deleted successfully")
}

pub async fn update_without_id() -> AppError {
    AppError::BadRequest(anyhow::anyhow!("ID is required for update"))
}

pub async fn delete_without_id() -> AppError {
    AppError::BadRequest(anyhow::anyhow!("ID is required for delete"))
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
