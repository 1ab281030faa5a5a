//! Contact form endpoint.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use super::{success, ApiResult};
use crate::models::{ContactMessage, ContactRequest};
use crate::store::{self, keys};
use crate::validation;
use crate::AppState;

/// POST /api/contact - Validate and store a contact message.
pub async fn submit_contact(
    State(state): State<AppState>,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> ApiResult<ContactMessage> {
    let Json(request) = payload?;
    validation::validate_contact(&request)?;

    let message = ContactMessage {
        id: Uuid::new_v4().to_string(),
        name: request.name.trim().to_string(),
        email: request.email.trim().to_string(),
        subject: request.subject.trim().to_string(),
        message: request.message.trim().to_string(),
        received_at: Utc::now(),
    };

    store::update(
        state.store.as_ref(),
        keys::CONTACT_MESSAGES,
        |inbox: &mut Vec<ContactMessage>| {
            inbox.push(message.clone());
            Ok(())
        },
    )
    .await?;

    tracing::info!(message_id = %message.id, "Contact message received");
    success(message)
}
