//! Public site configuration

use axum::extract::State;
use serde::Serialize;
use utoipa::ToSchema;

use crate::AppState;

use super::Envelope;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SiteInfo {
    pub recaptcha_site_key: Option<String>,
}

/// Values the public site needs at runtime
#[utoipa::path(
    get,
    path = "/site-config",
    tag = "health",
    responses(
        (status = 200, description = "Site configuration", body = SiteInfo)
    )
)]
pub async fn site_config(State(state): State<AppState>) -> Envelope<SiteInfo> {
    Envelope::success(SiteInfo {
        recaptcha_site_key: state.config.site.recaptcha_site_key.clone(),
    })
}
