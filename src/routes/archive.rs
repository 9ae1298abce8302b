use axum::{
    extract::{Extension, Path, Query, State},
    response::{IntoResponse, Json},
};
use uuid::Uuid;

use crate::{
    dto::archive_dto::{ArchiveListQuery, ArchivePayload, EligibleUsersResponse},
    error::Result,
    routes::session_user,
    utils::{time::now, token::Claims, validation::validate},
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/admin/archive/users",
    params(
        ("archived" = Option<bool>, Query, description = "Only archived (true) or only active (false) candidates")
    ),
    responses(
        (status = 200, description = "Candidates")
    )
)]
#[axum::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ArchiveListQuery>,
) -> Result<impl IntoResponse> {
    let users = state.user_service.list_candidates(query.archived).await?;
    Ok(Json(users))
}

#[utoipa::path(
    get,
    path = "/api/admin/archive/eligible",
    responses(
        (status = 200, description = "Active candidates old enough to archive", body = Json<EligibleUsersResponse>)
    )
)]
#[axum::debug_handler]
pub async fn list_eligible(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let users = state.archive_service.list_eligible(now()).await?;
    Ok(Json(EligibleUsersResponse {
        archive_after_days: state.archive_service.policy().after.num_days(),
        users,
    }))
}

#[utoipa::path(
    post,
    path = "/api/admin/archive/auto",
    responses(
        (status = 200, description = "Batch result", body = Json<AutoArchiveReport>)
    )
)]
#[axum::debug_handler]
pub async fn run_auto_archive(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let report = state
        .archive_service
        .run_auto_archive(Some(session_user(&claims)?), now())
        .await?;
    Ok(Json(report))
}

#[utoipa::path(
    post,
    path = "/api/admin/archive/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "Candidate ID")
    ),
    request_body = ArchivePayload,
    responses(
        (status = 200, description = "Archived, or already archived", body = Json<ArchiveOutcome>),
        (status = 400, description = "Reason missing"),
        (status = 404, description = "Candidate not found")
    )
)]
#[axum::debug_handler]
pub async fn archive_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<ArchivePayload>,
) -> Result<impl IntoResponse> {
    validate(&payload)?;
    let outcome = state
        .archive_service
        .archive(Some(session_user(&claims)?), user_id, &payload.reason)
        .await?;
    Ok(Json(outcome))
}

#[utoipa::path(
    post,
    path = "/api/admin/archive/{user_id}/restore",
    params(
        ("user_id" = Uuid, Path, description = "Candidate ID")
    ),
    responses(
        (status = 200, description = "Restored, or already active", body = Json<ArchiveOutcome>),
        (status = 404, description = "Candidate not found")
    )
)]
#[axum::debug_handler]
pub async fn restore_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let outcome = state
        .archive_service
        .restore(Some(session_user(&claims)?), user_id)
        .await?;
    Ok(Json(outcome))
}
