//! Admin authentication endpoints

use axum::extract::State;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{error::AppResult, services::auth::AdminClaims, AppState};

use super::{AdminSession, ApiJson, Envelope, AUTH_COOKIE};

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Current admin session
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub email: String,
    pub role: String,
    pub expires_at: DateTime<Utc>,
}

impl From<AdminClaims> for SessionInfo {
    fn from(claims: AdminClaims) -> Self {
        Self {
            expires_at: DateTime::from_timestamp(claims.exp, 0).unwrap_or_default(),
            email: claims.email,
            role: claims.role,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct LogoutResponse {
    pub message: String,
}

/// Log in as admin; the session token is returned as an HttpOnly cookie
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in, `auth-token` cookie set", body = SessionInfo),
        (status = 400, description = "Missing email or password"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(request): ApiJson<LoginRequest>,
) -> AppResult<(CookieJar, Envelope<SessionInfo>)> {
    let issued = state.services.auth.login(&request.email, &request.password)?;

    let cookie = Cookie::build((AUTH_COOKIE, issued.token))
        .http_only(true)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(time::Duration::seconds(issued.max_age.num_seconds()))
        .secure(state.services.auth.secure_cookie());

    Ok((jar.add(cookie), Envelope::success(issued.claims.into())))
}

/// Clear the session cookie
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Session cookie cleared", body = LogoutResponse)
    )
)]
pub async fn logout(jar: CookieJar) -> (CookieJar, Envelope<LogoutResponse>) {
    let jar = jar.remove(Cookie::build(AUTH_COOKIE).path("/"));
    (
        jar,
        Envelope::success(LogoutResponse {
            message: "Logged out".to_string(),
        }),
    )
}

/// Who is logged in
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("cookie_auth" = [])),
    responses(
        (status = 200, description = "Current session", body = SessionInfo),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(AdminSession(claims): AdminSession) -> Envelope<SessionInfo> {
    Envelope::success(claims.into())
}
