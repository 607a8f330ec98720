use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, put},
};
use uuid::Uuid;

use crate::{
    dto::address::{AddressList, CreateAddressRequest, UpdateAddressRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Address,
    response::ApiResponse,
    services::address_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_addresses).post(create_address))
        .route("/{id}", put(update_address))
        .route("/{id}", delete(delete_address))
}

#[utoipa::path(
    post,
    path = "/api/address",
    request_body = CreateAddressRequest,
    responses(
        (status = 200, description = "Create address", body = ApiResponse<Address>),
        (status = 400, description = "Missing fields or bad pincode"),
    ),
    security(("cookie_auth" = [])),
    tag = "Address"
)]
pub async fn create_address(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateAddressRequest>,
) -> AppResult<Json<ApiResponse<Address>>> {
    let resp = address_service::create_address(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/address",
    responses(
        (status = 200, description = "List the current user's addresses", body = ApiResponse<AddressList>),
        (status = 401, description = "Not logged in"),
    ),
    security(("cookie_auth" = [])),
    tag = "Address"
)]
pub async fn list_addresses(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<AddressList>>> {
    let resp = address_service::list_addresses(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/address/{id}",
    params(
        ("id" = Uuid, Path, description = "Address ID")
    ),
    request_body = UpdateAddressRequest,
    responses(
        (status = 200, description = "Updated address", body = ApiResponse<Address>),
        (status = 403, description = "Owned by another user"),
        (status = 404, description = "Address not found"),
    ),
    security(("cookie_auth" = [])),
    tag = "Address"
)]
pub async fn update_address(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAddressRequest>,
) -> AppResult<Json<ApiResponse<Address>>> {
    let resp = address_service::update_address(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/address/{id}",
    params(
        ("id" = Uuid, Path, description = "Address ID")
    ),
    responses(
        (status = 200, description = "Deleted address", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "Address is referenced by orders"),
        (status = 403, description = "Owned by another user"),
        (status = 404, description = "Address not found"),
    ),
    security(("cookie_auth" = [])),
    tag = "Address"
)]
pub async fn delete_address(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = address_service::delete_address(&state, &user, id).await?;
    Ok(Json(resp))
}
