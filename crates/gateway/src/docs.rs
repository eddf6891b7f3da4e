//! OpenAPI document for the user API

use axum::Json;
use utoipa::OpenApi;

use crate::envelope::{Envelope, EnvelopeStatus, ErrorBody};
use crate::rest::{health, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Roster",
        description = "Create, read, update and delete users"
    ),
    paths(
        health::health_check,
        users::create_user,
        users::get_users,
        users::get_user,
        users::update_user,
        users::update_user_by_id,
        users::delete_user,
        users::delete_user_by_id,
    ),
    components(
        schemas(
            health::HealthResponse,
            users::UserResponse,
            users::CreateUserRequest,
            users::UpdateUserRequest,
            Envelope,
            EnvelopeStatus,
            ErrorBody,
        )
    ),
    tags(
        (name = "Users", description = "User management"),
        (name = "Health", description = "Liveness and store reachability"),
    )
)]
pub struct ApiDoc;

pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
