use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use tower_sessions::{
    Expiry, Session,
    cookie::time::{Duration, OffsetDateTime},
};

use crate::{
    audit,
    dto::auth::{LoginRequest, MeResponse, RegisterRequest},
    error::{AppError, AppResult},
    middleware::{
        auth::{AuthUser, MaybeAuthUser, SESSION_USER_KEY},
        session::SESSION_LIFETIME_HOURS,
    },
    models::User,
    response::{ApiResponse, Meta},
    services::{auth_service, cart_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Register user", body = ApiResponse<User>),
        (status = 400, description = "Invalid fields"),
        (status = 409, description = "Email already registered"),
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = auth_service::register_user(&state.pool, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login user", body = ApiResponse<User>),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let user = auth_service::verify_credentials(&state.pool, &payload.email, &payload.password)
        .await?;

    let identity = AuthUser {
        user_id: user.id,
        role: user.role.clone(),
    };
    session
        .insert(SESSION_USER_KEY, &identity)
        .await
        .map_err(|err| AppError::Internal(anyhow::anyhow!(err)))?;

    // Fixed lifetime: the deadline is pinned here and never slides.
    let deadline = OffsetDateTime::now_utc() + Duration::hours(SESSION_LIFETIME_HOURS);
    session.set_expiry(Some(Expiry::AtDateTime(deadline)));

    audit::record(
        &state.pool,
        Some(user.id),
        "user_login",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id })),
    ).await;

    Ok(Json(ApiResponse::success(
        "Logged in",
        user,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user and live cart; user is null when anonymous", body = ApiResponse<MeResponse>),
    ),
    security(("cookie_auth" = [])),
    tag = "Auth"
)]
pub async fn me(
    State(state): State<AppState>,
    MaybeAuthUser(identity): MaybeAuthUser,
) -> AppResult<Json<ApiResponse<MeResponse>>> {
    let data = match identity {
        Some(identity) => {
            let user = auth_service::fetch_profile(&state.pool, identity.user_id).await?;
            let cart =
                cart_service::cart_items_with_products(&state.pool, identity.user_id, 100, 0)
                    .await?;
            MeResponse { user, cart }
        }
        None => MeResponse {
            user: None,
            cart: Vec::new(),
        },
    };

    Ok(Json(ApiResponse::success("OK", data, None)))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Session destroyed", body = ApiResponse<serde_json::Value>),
    ),
    security(("cookie_auth" = [])),
    tag = "Auth"
)]
pub async fn logout(session: Session) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    session
        .flush()
        .await
        .map_err(|err| AppError::Internal(anyhow::anyhow!(err)))?;

    Ok(Json(ApiResponse::success(
        "Logged out",
        serde_json::json!({}),
        Some(Meta::empty()),
    )))
}
