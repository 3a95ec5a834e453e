//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{
    auth, chat, contacts, customizations, health, newsletter, packages, site, upload, AUTH_COOKIE,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tripdesk API",
        version = "0.3.0",
        description = "Travel agency catalog and admin REST API. Every response is wrapped in `{success, data?, error?}`.",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html"),
        contact(name = "Tripdesk Team", email = "dev@tripdesk.travel")
    ),
    servers(
        (url = "/api", description = "API")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        site::site_config,
        // Auth
        auth::login,
        auth::logout,
        auth::me,
        // Packages
        packages::list_packages,
        packages::search_packages,
        packages::get_package,
        packages::create_package,
        packages::update_package,
        packages::delete_package,
        packages::register,
        packages::list_registrations,
        // Newsletter
        newsletter::subscribe,
        newsletter::unsubscribe,
        newsletter::list_subscribers,
        // Contact
        contacts::submit_contact,
        contacts::list_contacts,
        contacts::delete_contact,
        // Customized packages
        customizations::submit_customization,
        customizations::list_customizations,
        // Upload
        upload::upload_images,
        upload::delete_image,
        // Chat
        chat::chat,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::SessionInfo,
            auth::LogoutResponse,
            // Packages
            crate::models::package::Package,
            crate::models::package::PackageInput,
            crate::models::package::Itinerary,
            crate::models::package::InclusionsExclusions,
            crate::models::package::Registration,
            crate::models::package::RegisterRequest,
            crate::models::enums::PackageCategory,
            crate::services::packages::DeletedPackage,
            // Newsletter
            crate::models::subscriber::Subscriber,
            crate::models::subscriber::SubscribeRequest,
            crate::models::subscriber::SubscriberPage,
            crate::models::enums::SubscriberSource,
            newsletter::UnsubscribeResponse,
            // Contact
            crate::models::contact::Contact,
            crate::models::contact::CreateContact,
            contacts::DeletedContact,
            // Customized packages
            crate::models::customization::CustomizedPackage,
            crate::models::customization::CreateCustomizedPackage,
            crate::models::enums::CustomizationStatus,
            // Upload
            crate::models::media::StoredImage,
            crate::models::media::DeleteImageRequest,
            upload::DeletedImage,
            upload::UploadForm,
            // Chat
            crate::models::chat::ChatRequest,
            crate::models::chat::ChatMessage,
            crate::models::chat::ChatRole,
            crate::models::chat::BookingData,
            crate::models::chat::ChatReply,
            // Health
            health::HealthResponse,
            site::SiteInfo,
        )
    ),
    modifiers(&CookieAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Admin authentication"),
        (name = "packages", description = "Package catalog and registrations"),
        (name = "newsletter", description = "Newsletter subscriptions"),
        (name = "contact", description = "Contact form"),
        (name = "customized-packages", description = "Customized-package requests"),
        (name = "upload", description = "Image storage"),
        (name = "chat", description = "Travel assistant")
    )
)]
pub struct ApiDoc;

struct CookieAuth;

impl Modify for CookieAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(AUTH_COOKIE))),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_admin_cookie_scheme() {
        let doc = ApiDoc::openapi();
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            json["components"]["securitySchemes"]["cookie_auth"]["in"],
            "cookie"
        );
        assert!(json["paths"]["/packages/{id}/register"].is_object());
    }
}
