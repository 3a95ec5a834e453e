//! Newsletter endpoints

use axum::{extract::State, http::StatusCode};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::subscriber::{
        SubscribeOutcome, SubscribeRequest, Subscriber, SubscriberPage, SubscriberQuery,
        UnsubscribeQuery,
    },
    AppState,
};

use super::{AdminSession, ApiJson, ApiQuery, Envelope};

#[derive(Serialize, ToSchema)]
pub struct UnsubscribeResponse {
    pub message: String,
}

/// Subscribe, or reactivate a previous subscription
#[utoipa::path(
    post,
    path = "/newsletter",
    tag = "newsletter",
    request_body = SubscribeRequest,
    responses(
        (status = 201, description = "Subscribed", body = Subscriber),
        (status = 200, description = "Subscription reactivated", body = Subscriber),
        (status = 400, description = "Invalid email"),
        (status = 409, description = "Email is already subscribed")
    )
)]
pub async fn subscribe(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SubscribeRequest>,
) -> AppResult<(StatusCode, Envelope<Subscriber>)> {
    let response = match state.services.newsletter.subscribe(request).await? {
        SubscribeOutcome::Created(subscriber) => (StatusCode::CREATED, Envelope::success(subscriber)),
        SubscribeOutcome::Reactivated(subscriber) => (StatusCode::OK, Envelope::success(subscriber)),
    };
    Ok(response)
}

/// Unsubscribe an email
#[utoipa::path(
    delete,
    path = "/newsletter",
    tag = "newsletter",
    params(UnsubscribeQuery),
    responses(
        (status = 200, description = "Unsubscribed", body = UnsubscribeResponse),
        (status = 404, description = "No active subscription for this email")
    )
)]
pub async fn unsubscribe(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<UnsubscribeQuery>,
) -> AppResult<Envelope<UnsubscribeResponse>> {
    state.services.newsletter.unsubscribe(&query.email).await?;
    Ok(Envelope::success(UnsubscribeResponse {
        message: "Unsubscribed".to_string(),
    }))
}

/// Page through active subscribers
#[utoipa::path(
    get,
    path = "/newsletter",
    tag = "newsletter",
    security(("cookie_auth" = [])),
    params(SubscriberQuery),
    responses(
        (status = 200, description = "Active subscribers, newest first", body = SubscriberPage),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_subscribers(
    State(state): State<AppState>,
    AdminSession(_admin): AdminSession,
    ApiQuery(query): ApiQuery<SubscriberQuery>,
) -> AppResult<Envelope<SubscriberPage>> {
    let page = state.services.newsletter.list(&query).await?;
    Ok(Envelope::success(page))
}
