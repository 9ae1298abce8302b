use axum::{
    extract::{Extension, Multipart, Path, State},
    response::{IntoResponse, Json},
};
use uuid::Uuid;

use crate::{
    dto::contract_dto::{ContractResponse, ReviewContractPayload},
    error::{Error, Result},
    models::contract::ContractDocument,
    routes::{session_user, UploadForm},
    services::{contract_service::ensure_signable, storage_service::UploadCategory},
    utils::token::Claims,
    AppState,
};

const SIGNABLE: [ContractDocument; 2] = [ContractDocument::CompanyContract, ContractDocument::JobOffer];

async fn discard_all(state: &AppState, stored: &[(ContractDocument, String)]) {
    for (_, url) in stored {
        state.storage_service.discard(url).await;
    }
}

#[utoipa::path(
    get,
    path = "/api/contracts",
    responses(
        (status = 200, description = "Own contract documents", body = Json<ContractResponse>),
        (status = 401, description = "No valid session")
    )
)]
#[axum::debug_handler]
pub async fn get_my_contract(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user = state
        .user_service
        .require_active_candidate(session_user(&claims)?)
        .await?;
    let contract = state.contract_service.get(user.id).await?;
    Ok(Json(ContractResponse::from(contract)))
}

#[utoipa::path(
    post,
    path = "/api/contracts/sign",
    responses(
        (status = 200, description = "Signed copies stored", body = Json<ContractResponse>),
        (status = 400, description = "No signed file, not a PDF, or nothing to sign yet")
    )
)]
#[axum::debug_handler]
pub async fn sign_my_contract(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let user = state
        .user_service
        .require_active_candidate(session_user(&claims)?)
        .await?;
    let mut form = UploadForm::read(multipart).await?;

    let uploads: Vec<_> = SIGNABLE
        .into_iter()
        .filter_map(|doc| form.take_file(doc.signed_field()).map(|file| (doc, file)))
        .collect();
    if uploads.is_empty() {
        return Err(Error::BadRequest(
            "Attach signedContract and/or signedJobOffer".into(),
        ));
    }

    // Nothing is written unless every part can be accepted.
    let current = state
        .contract_service
        .get(user.id)
        .await?
        .ok_or_else(|| Error::NotFound("Contract not found".into()))?;
    ensure_signable(&current, uploads.iter().map(|(doc, _)| *doc))?;
    for (_, file) in &uploads {
        state
            .storage_service
            .validate(UploadCategory::Contract, &file.filename, &file.data)?;
    }

    let mut signed = Vec::with_capacity(uploads.len());
    for (doc, file) in &uploads {
        match state
            .storage_service
            .save(UploadCategory::Contract, &file.filename, &file.data)
            .await
        {
            Ok(url) => signed.push((*doc, url)),
            Err(e) => {
                discard_all(&state, &signed).await;
                return Err(e);
            }
        }
    }

    let contract = match state.contract_service.sign(user.id, &signed).await {
        Ok(contract) => contract,
        Err(e) => {
            discard_all(&state, &signed).await;
            return Err(e);
        }
    };
    Ok(Json(ContractResponse::from(Some(contract))))
}

#[utoipa::path(
    get,
    path = "/api/admin/contracts/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "Candidate ID")
    ),
    responses(
        (status = 200, description = "Candidate contract documents", body = Json<ContractResponse>),
        (status = 404, description = "Candidate not found")
    )
)]
#[axum::debug_handler]
pub async fn get_contract(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.user_service.require_candidate(user_id).await?;
    let contract = state.contract_service.get(user_id).await?;
    Ok(Json(ContractResponse::from(contract)))
}

#[utoipa::path(
    post,
    path = "/api/admin/contracts/{user_id}/{document}/original",
    params(
        ("user_id" = Uuid, Path, description = "Candidate ID"),
        ("document" = String, Path, description = "companyContract or jobOffer")
    ),
    responses(
        (status = 200, description = "Original stored, awaiting signature", body = Json<ContractResponse>),
        (status = 400, description = "Missing or invalid PDF"),
        (status = 404, description = "Candidate not found")
    )
)]
#[axum::debug_handler]
pub async fn upload_original(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((user_id, document)): Path<(Uuid, String)>,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let document = document
        .parse::<ContractDocument>()
        .map_err(Error::BadRequest)?;
    let actor_id = session_user(&claims)?;
    state.user_service.require_candidate(user_id).await?;

    let mut form = UploadForm::read(multipart).await?;
    let file = form.require_file("pdf")?;
    let url = state
        .storage_service
        .save(UploadCategory::Contract, &file.filename, &file.data)
        .await?;
    let contract = state
        .contract_service
        .set_original(actor_id, user_id, document, &url)
        .await?;

    tracing::info!(user_id = %user_id, document = document.column_prefix(), "contract original uploaded");
    Ok(Json(ContractResponse::from(Some(contract))))
}

#[utoipa::path(
    patch,
    path = "/api/admin/contracts/{user_id}/{document}/review",
    params(
        ("user_id" = Uuid, Path, description = "Candidate ID"),
        ("document" = String, Path, description = "companyContract or jobOffer")
    ),
    request_body = ReviewContractPayload,
    responses(
        (status = 200, description = "Review recorded", body = Json<ContractResponse>),
        (status = 400, description = "Nothing signed yet or invalid verdict"),
        (status = 404, description = "Contract not found")
    )
)]
#[axum::debug_handler]
pub async fn review_contract(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((user_id, document)): Path<(Uuid, String)>,
    Json(payload): Json<ReviewContractPayload>,
) -> Result<impl IntoResponse> {
    let document = document
        .parse::<ContractDocument>()
        .map_err(Error::BadRequest)?;
    let contract = state
        .contract_service
        .review(
            session_user(&claims)?,
            user_id,
            document,
            payload.status,
            payload.signature_valid,
        )
        .await?;
    Ok(Json(ContractResponse::from(Some(contract))))
}
