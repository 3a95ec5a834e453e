//! Contact form endpoints

use axum::{extract::State, http::StatusCode};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::contact::{Contact, CreateContact},
    AppState,
};

use super::{AdminSession, ApiJson, ApiPath, Envelope};

#[derive(Serialize, ToSchema)]
pub struct DeletedContact {
    pub id: Uuid,
}

/// Submit the contact form
#[utoipa::path(
    post,
    path = "/contact",
    tag = "contact",
    request_body = CreateContact,
    responses(
        (status = 201, description = "Message stored", body = Contact),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn submit_contact(
    State(state): State<AppState>,
    ApiJson(data): ApiJson<CreateContact>,
) -> AppResult<(StatusCode, Envelope<Contact>)> {
    let contact = state.services.contacts.submit(data).await?;
    Ok((StatusCode::CREATED, Envelope::success(contact)))
}

/// List contact messages, newest first
#[utoipa::path(
    get,
    path = "/contact",
    tag = "contact",
    security(("cookie_auth" = [])),
    responses(
        (status = 200, description = "Contact messages", body = Vec<Contact>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_contacts(
    State(state): State<AppState>,
    AdminSession(_admin): AdminSession,
) -> AppResult<Envelope<Vec<Contact>>> {
    let contacts = state.services.contacts.list().await?;
    Ok(Envelope::success(contacts))
}

/// Delete a contact message
#[utoipa::path(
    delete,
    path = "/contact/{id}",
    tag = "contact",
    security(("cookie_auth" = [])),
    params(("id" = Uuid, Path, description = "Contact id")),
    responses(
        (status = 200, description = "Deleted", body = DeletedContact),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Contact not found")
    )
)]
pub async fn delete_contact(
    State(state): State<AppState>,
    AdminSession(_admin): AdminSession,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Envelope<DeletedContact>> {
    state.services.contacts.delete(id).await?;
    Ok(Envelope::success(DeletedContact { id }))
}
