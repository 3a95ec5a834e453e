//! Package catalog endpoints

use axum::{extract::State, http::StatusCode};

use crate::{
    error::AppResult,
    models::package::{Package, PackageInput, PackageSearchQuery, RegisterRequest, Registration},
    services::packages::DeletedPackage,
    AppState,
};

use super::{AdminSession, ApiJson, ApiPath, ApiQuery, Envelope};

/// List every package, newest first
#[utoipa::path(
    get,
    path = "/packages",
    tag = "packages",
    responses(
        (status = 200, description = "All packages with their registrations", body = Vec<Package>)
    )
)]
pub async fn list_packages(State(state): State<AppState>) -> AppResult<Envelope<Vec<Package>>> {
    let packages = state.services.packages.list().await?;
    Ok(Envelope::success(packages))
}

/// Free-text package search
#[utoipa::path(
    get,
    path = "/packages/search",
    tag = "packages",
    params(PackageSearchQuery),
    responses(
        (status = 200, description = "Matching packages, newest first", body = Vec<Package>),
        (status = 400, description = "Missing search text")
    )
)]
pub async fn search_packages(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PackageSearchQuery>,
) -> AppResult<Envelope<Vec<Package>>> {
    let packages = state.services.packages.search(query.q.as_deref()).await?;
    Ok(Envelope::success(packages))
}

/// Get one package
#[utoipa::path(
    get,
    path = "/packages/{id}",
    tag = "packages",
    params(("id" = String, Path, description = "Package id")),
    responses(
        (status = 200, description = "Package details", body = Package),
        (status = 404, description = "Package not found")
    )
)]
pub async fn get_package(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> AppResult<Envelope<Package>> {
    let package = state.services.packages.get(&id).await?;
    Ok(Envelope::success(package))
}

/// Create a package
#[utoipa::path(
    post,
    path = "/packages",
    tag = "packages",
    security(("cookie_auth" = [])),
    request_body = PackageInput,
    responses(
        (status = 201, description = "Package created", body = Package),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_package(
    State(state): State<AppState>,
    AdminSession(_admin): AdminSession,
    ApiJson(input): ApiJson<PackageInput>,
) -> AppResult<(StatusCode, Envelope<Package>)> {
    let package = state.services.packages.create(input).await?;
    Ok((StatusCode::CREATED, Envelope::success(package)))
}

/// Replace a package's editable fields
#[utoipa::path(
    put,
    path = "/packages/{id}",
    tag = "packages",
    security(("cookie_auth" = [])),
    params(("id" = String, Path, description = "Package id")),
    request_body = PackageInput,
    responses(
        (status = 200, description = "Package updated", body = Package),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Package not found")
    )
)]
pub async fn update_package(
    State(state): State<AppState>,
    AdminSession(_admin): AdminSession,
    ApiPath(id): ApiPath<String>,
    ApiJson(input): ApiJson<PackageInput>,
) -> AppResult<Envelope<Package>> {
    let package = state.services.packages.update(&id, input).await?;
    Ok(Envelope::success(package))
}

/// Delete a package and, best effort, its images
#[utoipa::path(
    delete,
    path = "/packages/{id}",
    tag = "packages",
    security(("cookie_auth" = [])),
    params(("id" = String, Path, description = "Package id")),
    responses(
        (status = 200, description = "Package deleted", body = DeletedPackage),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Package not found")
    )
)]
pub async fn delete_package(
    State(state): State<AppState>,
    AdminSession(_admin): AdminSession,
    ApiPath(id): ApiPath<String>,
) -> AppResult<Envelope<DeletedPackage>> {
    let deleted = state.services.packages.delete(&id).await?;
    Ok(Envelope::success(deleted))
}

/// Register interest in a package
#[utoipa::path(
    post,
    path = "/packages/{id}/register",
    tag = "packages",
    params(("id" = String, Path, description = "Package id")),
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registration recorded", body = Registration),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Package not found"),
        (status = 409, description = "Email already registered for this package")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> AppResult<(StatusCode, Envelope<Registration>)> {
    let registration = state.services.packages.register(&id, request).await?;
    Ok((StatusCode::CREATED, Envelope::success(registration)))
}

/// Registrations of one package, oldest first
#[utoipa::path(
    get,
    path = "/packages/{id}/registrations",
    tag = "packages",
    security(("cookie_auth" = [])),
    params(("id" = String, Path, description = "Package id")),
    responses(
        (status = 200, description = "Registrations", body = Vec<Registration>),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Package not found")
    )
)]
pub async fn list_registrations(
    State(state): State<AppState>,
    AdminSession(_admin): AdminSession,
    ApiPath(id): ApiPath<String>,
) -> AppResult<Envelope<Vec<Registration>>> {
    let registrations = state.services.packages.registrations(&id).await?;
    Ok(Envelope::success(registrations))
}
