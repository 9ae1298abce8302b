use axum::{
    extract::{Extension, Multipart, Path, Query, State},
    response::{IntoResponse, Json},
};
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    dto::docket_dto::{AdminDocketQuery, AdminDocketSummary, DocketResponse, UpdateReferencesPayload},
    error::{Error, Result},
    models::docket::{Docket, DocketField},
    routes::{session_user, UploadForm},
    services::{progress_service::Checklist, storage_service::UploadCategory},
    utils::{token::Claims, validation::validate},
    AppState,
};

/// Stores the `file` part and records it under `fieldName`. The file is
/// validated before anything touches the database.
async fn store_docket_upload(state: &AppState, user_id: Uuid, multipart: Multipart) -> Result<DocketResponse> {
    let mut form = UploadForm::read(multipart).await?;
    let field = form
        .text("fieldName")
        .ok_or_else(|| Error::BadRequest("Missing fieldName".into()))?
        .parse::<DocketField>()
        .map_err(Error::BadRequest)?;
    let file = form.require_file("file")?;

    let url = state
        .storage_service
        .save(UploadCategory::Docket, &file.filename, &file.data)
        .await?;
    let docket = state.docket_service.attach_file(user_id, field, &url).await?;

    tracing::info!(user_id = %user_id, field = field.wire_name(), "docket document uploaded");
    Ok(DocketResponse::build(Some(docket), Checklist::Standard))
}

#[utoipa::path(
    get,
    path = "/api/docket",
    responses(
        (status = 200, description = "Own docket with progress", body = Json<DocketResponse>),
        (status = 401, description = "No valid session")
    )
)]
#[axum::debug_handler]
pub async fn get_my_docket(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user = state
        .user_service
        .require_active_candidate(session_user(&claims)?)
        .await?;
    let docket = state.docket_service.get(user.id).await?;
    Ok(Json(DocketResponse::build(docket, Checklist::Standard)))
}

#[utoipa::path(
    post,
    path = "/api/docket/upload",
    responses(
        (status = 200, description = "Document stored", body = Json<DocketResponse>),
        (status = 400, description = "Unknown field, bad file type or size")
    )
)]
#[axum::debug_handler]
pub async fn upload_my_document(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let user = state
        .user_service
        .require_active_candidate(session_user(&claims)?)
        .await?;
    let response = store_docket_upload(&state, user.id, multipart).await?;
    Ok(Json(response))
}

#[utoipa::path(
    put,
    path = "/api/docket/references",
    request_body = UpdateReferencesPayload,
    responses(
        (status = 200, description = "References replaced", body = Json<DocketResponse>),
        (status = 400, description = "Invalid reference")
    )
)]
#[axum::debug_handler]
pub async fn update_my_references(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateReferencesPayload>,
) -> Result<impl IntoResponse> {
    validate(&payload)?;
    let user = state
        .user_service
        .require_active_candidate(session_user(&claims)?)
        .await?;
    let docket = state
        .docket_service
        .replace_references(user.id, payload.references)
        .await?;
    Ok(Json(DocketResponse::build(Some(docket), Checklist::Standard)))
}

#[utoipa::path(
    get,
    path = "/api/admin/dockets",
    params(
        ("checklist" = Option<String>, Query, description = "standard (default) or admin")
    ),
    responses(
        (status = 200, description = "Dockets of active candidates", body = [AdminDocketSummary])
    )
)]
#[axum::debug_handler]
pub async fn list_dockets(
    State(state): State<AppState>,
    Query(query): Query<AdminDocketQuery>,
) -> Result<impl IntoResponse> {
    let checklist = query.checklist.unwrap_or_default();
    let users = state.user_service.list_candidates(Some(false)).await?;
    let mut dockets: HashMap<Uuid, Docket> = state
        .docket_service
        .list_active()
        .await?
        .into_iter()
        .map(|d| (d.user_id, d))
        .collect();

    let summaries: Vec<AdminDocketSummary> = users
        .into_iter()
        .map(|user| {
            let docket = dockets.remove(&user.id);
            AdminDocketSummary {
                user,
                docket: DocketResponse::build(docket, checklist),
            }
        })
        .collect();
    Ok(Json(summaries))
}

#[utoipa::path(
    get,
    path = "/api/admin/dockets/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "Candidate ID"),
        ("checklist" = Option<String>, Query, description = "standard (default) or admin")
    ),
    responses(
        (status = 200, description = "Candidate docket", body = Json<AdminDocketSummary>),
        (status = 404, description = "Candidate not found")
    )
)]
#[axum::debug_handler]
pub async fn get_docket(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<AdminDocketQuery>,
) -> Result<impl IntoResponse> {
    let user = state.user_service.require_candidate(user_id).await?;
    let docket = state.docket_service.get(user_id).await?;
    Ok(Json(AdminDocketSummary {
        user,
        docket: DocketResponse::build(docket, query.checklist.unwrap_or_default()),
    }))
}

#[utoipa::path(
    post,
    path = "/api/admin/dockets/{user_id}/upload",
    params(
        ("user_id" = Uuid, Path, description = "Candidate ID")
    ),
    responses(
        (status = 200, description = "Document stored", body = Json<DocketResponse>),
        (status = 400, description = "Unknown field, bad file type or size"),
        (status = 404, description = "Candidate not found")
    )
)]
#[axum::debug_handler]
pub async fn upload_document(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let user = state.user_service.require_candidate(user_id).await?;
    let response = store_docket_upload(&state, user.id, multipart).await?;
    state
        .audit_service
        .log(
            claims.user_id(),
            "docket.uploaded_by_admin",
            "user",
            user.id,
            None,
        )
        .await?;
    Ok(Json(response))
}
