//! Customized-package request endpoints

use axum::{extract::State, http::StatusCode};

use crate::{
    error::AppResult,
    models::customization::{CreateCustomizedPackage, CustomizedPackage},
    AppState,
};

use super::{AdminSession, ApiJson, Envelope};

/// Ask for a customized version of a package
#[utoipa::path(
    post,
    path = "/customized-packages",
    tag = "customized-packages",
    request_body = CreateCustomizedPackage,
    responses(
        (status = 201, description = "Request stored as pending", body = CustomizedPackage),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn submit_customization(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateCustomizedPackage>,
) -> AppResult<(StatusCode, Envelope<CustomizedPackage>)> {
    let created = state.services.customizations.submit(request).await?;
    Ok((StatusCode::CREATED, Envelope::success(created)))
}

/// List customization requests, newest first
#[utoipa::path(
    get,
    path = "/customized-packages",
    tag = "customized-packages",
    security(("cookie_auth" = [])),
    responses(
        (status = 200, description = "Customization requests", body = Vec<CustomizedPackage>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_customizations(
    State(state): State<AppState>,
    AdminSession(_admin): AdminSession,
) -> AppResult<Envelope<Vec<CustomizedPackage>>> {
    let requests = state.services.customizations.list().await?;
    Ok(Envelope::success(requests))
}
