//! OpenAPI document

use crate::error::ApiError;
use crate::handlers::{admin, auth, chirps, health, users};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Chirpy API",
        description = "Users, chirps, password login, JWT access tokens and refresh tokens"
    ),
    paths(
        health::healthz,
        users::create_user_handler,
        users::update_user_handler,
        auth::login_handler,
        auth::refresh_handler,
        auth::revoke_handler,
        chirps::list_chirps,
        chirps::get_chirp,
        chirps::create_chirp,
        admin::metrics_handler,
        admin::reset_handler,
    ),
    components(schemas(
        users::CredentialsRequest,
        users::UserResponse,
        auth::LoginResponse,
        auth::TokenResponse,
        chirps::CreateChirpRequest,
        chirps::ChirpResponse,
        ApiError,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Liveness"),
        (name = "users", description = "Account management"),
        (name = "auth", description = "Login and session tokens"),
        (name = "chirps", description = "Chirps"),
        (name = "admin", description = "Metrics and development reset"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected paths
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
