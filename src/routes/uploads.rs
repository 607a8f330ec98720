use axum::{
    Json, Router,
    extract::{Multipart, State},
    routing::post,
};
use chrono::Utc;
use rand::Rng;

use crate::{
    audit,
    dto::uploads::UploadResponse,
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(upload_image))
}

#[utoipa::path(
    post,
    path = "/api/uploads",
    request_body(content = Vec<u8>, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Store an image and return its public path (admin only)", body = ApiResponse<UploadResponse>),
        (status = 400, description = "Missing or empty image field"),
        (status = 403, description = "Forbidden"),
    ),
    security(("cookie_auth" = [])),
    tag = "Uploads"
)]
pub async fn upload_image(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<UploadResponse>>> {
    ensure_admin(&user)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::Validation(format!("invalid multipart payload: {err}")))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let original_name = field.file_name().unwrap_or("upload").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|err| AppError::Validation(format!("failed to read upload: {err}")))?;
        if data.is_empty() {
            return Err(AppError::Validation("uploaded file is empty".to_string()));
        }

        let file_name = build_file_name(&original_name);
        let dir = std::path::Path::new(&state.config.upload_dir);
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|err| AppError::Internal(anyhow::anyhow!(err)))?;
        tokio::fs::write(dir.join(&file_name), &data)
            .await
            .map_err(|err| AppError::Internal(anyhow::anyhow!(err)))?;

        audit::record(
            &state.pool,
            Some(user.user_id),
            "image_upload",
            Some("uploads"),
            Some(serde_json::json!({ "file": file_name })),
        ).await;

        let url = format!("/uploads/{file_name}");
        return Ok(Json(ApiResponse::success(
            "Uploaded",
            UploadResponse { url },
            Some(Meta::empty()),
        )));
    }

    Err(AppError::Validation("missing image field".to_string()))
}

// Millisecond timestamp plus a random suffix keeps concurrent uploads from
// colliding; only a plain alphanumeric extension is carried over.
fn build_file_name(original: &str) -> String {
    let extension = std::path::Path::new(original)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default();

    let suffix: u32 = rand::rng().random_range(0..1_000_000_000);
    format!("{}-{}{}", Utc::now().timestamp_millis(), suffix, extension)
}
