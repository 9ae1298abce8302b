pub mod archive;
pub mod auth;
pub mod contract;
pub mod docket;
pub mod health;
pub mod stats;
pub mod users;
pub mod work_permit;

use std::collections::HashMap;

use axum::{
    extract::{DefaultBodyLimit, Multipart},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post, put},
    Router,
};
use bytes::Bytes;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, services::ServeDir, trace::TraceLayer};
use uuid::Uuid;

use crate::{
    config::Config,
    error::{Error, Result},
    middleware::{
        auth::{require_admin, require_session},
        cors::cors_layer,
        rate_limit::{new_rps_state, rps_middleware},
    },
    utils::token::Claims,
    AppState,
};

/// Builds the full HTTP surface: public auth endpoints, the candidate portal
/// behind a session, and the admin dashboard behind an admin session.
pub fn router(state: AppState, config: &Config) -> Router {
    let base_routes = Router::new().route("/health", get(health::health));

    let public_api = Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .layer(from_fn_with_state(
            new_rps_state(config.public_rps),
            rps_middleware,
        ));

    let portal_api = Router::new()
        .route("/api/auth/me", get(auth::me))
        .route("/api/docket", get(docket::get_my_docket))
        .route("/api/docket/upload", post(docket::upload_my_document))
        .route("/api/docket/references", put(docket::update_my_references))
        .route("/api/contracts", get(contract::get_my_contract))
        .route("/api/contracts/sign", post(contract::sign_my_contract))
        .route("/api/workpermit", get(work_permit::get_my_work_permit))
        .layer(from_fn(require_session))
        .layer(from_fn_with_state(
            new_rps_state(config.public_rps),
            rps_middleware,
        ));

    let admin_api = Router::new()
        .route("/api/admin/me", get(auth::admin_me))
        .route(
            "/api/admin/users",
            get(users::list_users).post(users::create_user),
        )
        .route("/api/admin/users/:user_id/history", get(users::user_history))
        .route("/api/admin/dockets", get(docket::list_dockets))
        .route("/api/admin/dockets/:user_id", get(docket::get_docket))
        .route(
            "/api/admin/dockets/:user_id/upload",
            post(docket::upload_document),
        )
        .route("/api/admin/contracts/:user_id", get(contract::get_contract))
        .route(
            "/api/admin/contracts/:user_id/:document/original",
            post(contract::upload_original),
        )
        .route(
            "/api/admin/contracts/:user_id/:document/review",
            patch(contract::review_contract),
        )
        .route(
            "/api/admin/workpermit/:user_id",
            get(work_permit::get_work_permit).patch(work_permit::update_work_permit),
        )
        .route(
            "/api/admin/workpermit/:user_id/final-docket",
            post(work_permit::upload_final_docket),
        )
        .route("/api/admin/archive/users", get(archive::list_users))
        .route("/api/admin/archive/eligible", get(archive::list_eligible))
        .route("/api/admin/archive/auto", post(archive::run_auto_archive))
        .route("/api/admin/archive/:user_id", post(archive::archive_user))
        .route(
            "/api/admin/archive/:user_id/restore",
            post(archive::restore_user),
        )
        .route("/api/admin/stats", get(stats::get_stats))
        .layer(from_fn(require_admin))
        .layer(from_fn_with_state(
            new_rps_state(config.admin_rps),
            rps_middleware,
        ));

    tracing::info!("Serving uploads from: {}", config.uploads_dir);

    base_routes
        .merge(public_api)
        .merge(portal_api)
        .merge(admin_api)
        .nest_service("/uploads", ServeDir::new(&config.uploads_dir))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&config.cors_origins))
                .layer(CompressionLayer::new())
                // Two documents may arrive in one signing request.
                .layer(DefaultBodyLimit::max(config.max_upload_bytes() * 2 + 64 * 1024)),
        )
}

/// The authenticated user behind the request.
pub(crate) fn session_user(claims: &Claims) -> Result<Uuid> {
    claims
        .user_id()
        .ok_or_else(|| Error::Unauthorized("Invalid session".into()))
}

pub(crate) struct UploadedFile {
    pub field: String,
    pub filename: String,
    pub data: Bytes,
}

/// A drained multipart body: file parts in arrival order plus plain text parts.
#[derive(Default)]
pub(crate) struct UploadForm {
    pub files: Vec<UploadedFile>,
    pub texts: HashMap<String, String>,
}

impl UploadForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await.map_err(|e| {
            tracing::error!("Failed to get next field: {}", e);
            Error::BadRequest(e.to_string())
        })? {
            let name = field.name().unwrap_or_default().to_string();
            let filename = field.file_name().map(str::to_string);
            match filename {
                Some(filename) => {
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| Error::BadRequest(e.to_string()))?;
                    form.files.push(UploadedFile {
                        field: name,
                        filename,
                        data,
                    });
                }
                None => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| Error::BadRequest(e.to_string()))?;
                    form.texts.insert(name, text);
                }
            }
        }
        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        let index = self.files.iter().position(|f| f.field == name)?;
        Some(self.files.remove(index))
    }

    pub fn require_file(&mut self, name: &str) -> Result<UploadedFile> {
        self.take_file(name)
            .ok_or_else(|| Error::BadRequest(format!("Missing file field '{}'", name)))
    }
}
