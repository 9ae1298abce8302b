use axum::{
    extract::{Extension, Multipart, Path, State},
    response::{IntoResponse, Json},
};
use uuid::Uuid;

use crate::{
    dto::work_permit_dto::{UpdateWorkPermitPayload, WorkPermitUpdateResponse, WorkPermitView},
    error::Result,
    routes::{session_user, UploadForm},
    services::{storage_service::UploadCategory, work_permit_service::ensure_final_docket_allowed},
    utils::{token::Claims, validation::validate},
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/workpermit",
    responses(
        (status = 200, description = "Own work permit", body = Json<WorkPermitView>),
        (status = 404, description = "No work permit record")
    )
)]
#[axum::debug_handler]
pub async fn get_my_work_permit(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user = state
        .user_service
        .require_active_candidate(session_user(&claims)?)
        .await?;
    let permit = state.work_permit_service.require(user.id).await?;
    Ok(Json(WorkPermitView::from(permit)))
}

#[utoipa::path(
    get,
    path = "/api/admin/workpermit/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "Candidate ID")
    ),
    responses(
        (status = 200, description = "Candidate work permit", body = Json<WorkPermitView>),
        (status = 404, description = "Work permit not found")
    )
)]
#[axum::debug_handler]
pub async fn get_work_permit(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let permit = state.work_permit_service.require(user_id).await?;
    Ok(Json(WorkPermitView::from(permit)))
}

#[utoipa::path(
    patch,
    path = "/api/admin/workpermit/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "Candidate ID")
    ),
    request_body = UpdateWorkPermitPayload,
    responses(
        (status = 200, description = "Work permit updated, with any warnings", body = Json<WorkPermitUpdateResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Work permit not found")
    )
)]
#[axum::debug_handler]
pub async fn update_work_permit(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateWorkPermitPayload>,
) -> Result<impl IntoResponse> {
    validate(&payload)?;
    let update = state
        .work_permit_service
        .update(session_user(&claims)?, user_id, payload.into())
        .await?;
    Ok(Json(WorkPermitUpdateResponse::from(update)))
}

#[utoipa::path(
    post,
    path = "/api/admin/workpermit/{user_id}/final-docket",
    params(
        ("user_id" = Uuid, Path, description = "Candidate ID")
    ),
    responses(
        (status = 200, description = "Final docket stored", body = Json<WorkPermitView>),
        (status = 400, description = "Not allowed in the current status, or invalid PDF"),
        (status = 404, description = "Work permit not found")
    )
)]
#[axum::debug_handler]
pub async fn upload_final_docket(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let actor_id = session_user(&claims)?;
    let current = state.work_permit_service.require(user_id).await?;
    ensure_final_docket_allowed(current.status)?;

    let mut form = UploadForm::read(multipart).await?;
    let file = form.require_file("file")?;
    let url = state
        .storage_service
        .save(UploadCategory::FinalDocket, &file.filename, &file.data)
        .await?;
    let permit = state
        .work_permit_service
        .attach_final_docket(actor_id, user_id, &url)
        .await?;
    Ok(Json(WorkPermitView::from(permit)))
}
