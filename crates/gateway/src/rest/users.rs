//! User REST endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::get,
    Json, Router,
};
use roster_database::{NewUser, User, UserPatch};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::envelope::Envelope;
use crate::error::{ApiError, ApiResult, Operation};
use crate::state::AppState;
use crate::target::{resolve, resolve_single, UserTarget};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fullname: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            fullname: user.fullname,
        }
    }
}

/// Missing `username` or `email` is caught by the required-field check, not the parser.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub fullname: Option<String>,
}

impl From<CreateUserRequest> for NewUser {
    fn from(request: CreateUserRequest) -> Self {
        Self {
            username: request.username,
            email: request.email,
            fullname: request.fullname,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub fullname: Option<String>,
}

impl From<UpdateUserRequest> for UserPatch {
    fn from(request: UpdateUserRequest) -> Self {
        Self {
            username: request.username,
            email: request.email,
            fullname: request.fullname,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserQuery {
    /// Address a single user by username instead of by id
    pub username: Option<String>,
}

type PathIdExtract = Result<Path<String>, PathRejection>;
type UserQueryExtract = Result<Query<UserQuery>, QueryRejection>;

/// Create user routes
pub fn create_user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(get_users)
                .post(create_user)
                .put(update_user)
                .delete(delete_user),
        )
        .route(
            "/users/:user_id",
            get(get_user).put(update_user_by_id).delete(delete_user_by_id),
        )
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User created", body = Envelope),
        (status = 400, description = "Invalid body, missing fields or duplicate username/email", body = Envelope),
        (status = 500, description = "Store failure", body = Envelope)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<Json<Envelope>> {
    let Json(payload) = payload.map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))?;

    let new_user = NewUser::from(payload);
    if !new_user.has_required_fields() {
        return Err(ApiError::MissingRequiredFields);
    }

    let user = state
        .store()
        .create(&new_user)
        .await
        .map_err(|e| ApiError::from_store(Operation::Create, e))?;

    info!(user_id = user.id, username = %user.username, "user created");
    Ok(Json(Envelope::success("User created successfully.")))
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    params(UserQuery),
    responses(
        (status = 200, description = "All users under `data.users`, or one under `data.user` when `username` is given", body = Envelope),
        (status = 400, description = "User does not exist", body = Envelope),
        (status = 500, description = "Store failure", body = Envelope)
    )
)]
pub async fn get_users(
    State(state): State<AppState>,
    query: UserQueryExtract,
) -> ApiResult<Json<Envelope>> {
    let username = query_username(query)?;
    read_users(&state, None, username.as_deref()).await
}

#[utoipa::path(
    get,
    path = "/users/{user_id}",
    tag = "Users",
    params(
        ("user_id" = i64, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "User under `data.user`", body = Envelope),
        (status = 400, description = "Malformed id, both id and username given, or user does not exist", body = Envelope),
        (status = 500, description = "Store failure", body = Envelope)
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    path: PathIdExtract,
    query: UserQueryExtract,
) -> ApiResult<Json<Envelope>> {
    let user_id = path_id(path)?;
    let username = query_username(query)?;
    read_users(&state, Some(&user_id), username.as_deref()).await
}

#[utoipa::path(
    put,
    path = "/users",
    tag = "Users",
    params(UserQuery),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = Envelope),
        (status = 400, description = "Invalid body, no target, duplicate value or user does not exist", body = Envelope),
        (status = 500, description = "Store failure", body = Envelope)
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    query: UserQueryExtract,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<Json<Envelope>> {
    apply_update(&state, None, query, payload).await
}

#[utoipa::path(
    put,
    path = "/users/{user_id}",
    tag = "Users",
    params(
        ("user_id" = i64, Path, description = "User id")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = Envelope),
        (status = 400, description = "Invalid body or id, duplicate value or user does not exist", body = Envelope),
        (status = 500, description = "Store failure", body = Envelope)
    )
)]
pub async fn update_user_by_id(
    State(state): State<AppState>,
    path: PathIdExtract,
    query: UserQueryExtract,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<Json<Envelope>> {
    apply_update(&state, Some(path), query, payload).await
}

#[utoipa::path(
    delete,
    path = "/users",
    tag = "Users",
    params(UserQuery),
    responses(
        (status = 200, description = "User deleted", body = Envelope),
        (status = 400, description = "No target or user does not exist", body = Envelope),
        (status = 500, description = "Store failure", body = Envelope)
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    query: UserQueryExtract,
) -> ApiResult<Json<Envelope>> {
    let username = query_username(query)?;
    remove_user(&state, None, username.as_deref()).await
}

#[utoipa::path(
    delete,
    path = "/users/{user_id}",
    tag = "Users",
    params(
        ("user_id" = i64, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "User deleted", body = Envelope),
        (status = 400, description = "Malformed id or user does not exist", body = Envelope),
        (status = 500, description = "Store failure", body = Envelope)
    )
)]
pub async fn delete_user_by_id(
    State(state): State<AppState>,
    path: PathIdExtract,
    query: UserQueryExtract,
) -> ApiResult<Json<Envelope>> {
    let user_id = path_id(path)?;
    let username = query_username(query)?;
    remove_user(&state, Some(&user_id), username.as_deref()).await
}

/// A path segment axum cannot decode is as malformed as one that is not a number.
fn path_id(path: PathIdExtract) -> ApiResult<String> {
    path.map(|Path(user_id)| user_id)
        .map_err(|_| ApiError::InvalidIdentifier)
}

fn query_username(query: UserQueryExtract) -> ApiResult<Option<String>> {
    query
        .map(|Query(query)| query.username)
        .map_err(|rejection| ApiError::InvalidQuery(rejection.body_text()))
}

async fn read_users(
    state: &AppState,
    path_id: Option<&str>,
    username: Option<&str>,
) -> ApiResult<Json<Envelope>> {
    let target = resolve(path_id, username).map_err(|e| ApiError::from_target(Operation::Read, e))?;
    let store = state.store();

    let user = match target {
        UserTarget::Collection => {
            let users: Vec<UserResponse> = store
                .find_all()
                .await
                .map_err(|e| ApiError::from_store(Operation::ReadAll, e))?
                .into_iter()
                .map(UserResponse::from)
                .collect();

            let envelope = Envelope::success("Retrieved all users.")
                .with_data("users", users)
                .map_err(|e| ApiError::encoding(Operation::ReadAll, e))?;
            return Ok(Json(envelope));
        }
        UserTarget::ById(id) => store.find_by_id(id).await,
        UserTarget::ByUsername(username) => store.find_by_username(&username).await,
    }
    .map_err(|e| ApiError::from_store(Operation::Read, e))?;

    let envelope = Envelope::success("User retrieved successfully.")
        .with_data("user", UserResponse::from(user))
        .map_err(|e| ApiError::encoding(Operation::Read, e))?;
    Ok(Json(envelope))
}

/// The body is checked before the target, so a malformed body wins over a bad id.
async fn apply_update(
    state: &AppState,
    path: Option<PathIdExtract>,
    query: UserQueryExtract,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<Json<Envelope>> {
    let Json(payload) = payload.map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))?;
    let patch = UserPatch::from(payload);

    let user_id = path.map(path_id).transpose()?;
    let username = query_username(query)?;
    let target = resolve_single(user_id.as_deref(), username.as_deref())
        .map_err(|e| ApiError::from_target(Operation::Update, e))?;

    let user = match target {
        UserTarget::ById(id) => state.store().update_by_id(id, &patch).await,
        UserTarget::ByUsername(username) => state.store().update_by_username(&username, &patch).await,
        UserTarget::Collection => return Err(ApiError::AmbiguousTarget(Operation::Update)),
    }
    .map_err(|e| ApiError::from_store(Operation::Update, e))?;

    info!(user_id = user.id, "user updated");
    Ok(Json(Envelope::success("User updated successfully.")))
}

async fn remove_user(
    state: &AppState,
    path_id: Option<&str>,
    username: Option<&str>,
) -> ApiResult<Json<Envelope>> {
    let target =
        resolve_single(path_id, username).map_err(|e| ApiError::from_target(Operation::Delete, e))?;

    let deleted = match &target {
        UserTarget::ById(id) => state.store().delete_by_id(*id).await,
        UserTarget::ByUsername(username) => state.store().delete_by_username(username).await,
        UserTarget::Collection => return Err(ApiError::AmbiguousTarget(Operation::Delete)),
    };
    deleted.map_err(|e| ApiError::from_store(Operation::Delete, e))?;

    info!(user = ?target, "user deleted");
    Ok(Json(Envelope::success("User deleted successfully.")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_tolerates_missing_fields() {
        let request: CreateUserRequest = serde_json::from_str(r#"{"email":"a@x.com"}"#).unwrap();
        let new_user = NewUser::from(request);

        assert_eq!(new_user.username, "");
        assert!(!new_user.has_required_fields());
    }

    #[test]
    fn update_request_becomes_a_patch() {
        let request: UpdateUserRequest =
            serde_json::from_str(r#"{"fullname":"Alice Liddell","email":""}"#).unwrap();
        let patch = UserPatch::from(request);

        assert_eq!(patch.assignments(), vec![("fullname", "Alice Liddell")]);
    }

    #[test]
    fn response_omits_absent_fullname() {
        let response = UserResponse::from(User {
            id: 3,
            username: "carol".into(),
            email: "c@x.com".into(),
            fullname: None,
        });

        let value = serde_json::to_value(response).unwrap();
        assert!(value.get("fullname").is_none());
        assert_eq!(value["id"], 3);
    }
}
