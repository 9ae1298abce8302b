use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::docket::{Docket, Reference};
use crate::models::user::User;
use crate::services::progress_service::{Checklist, DocketProgress, ProgressService};
use crate::services::status_service::{LabelledStatus, StatusService};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocketResponse {
    pub docket: Option<Docket>,
    pub progress: DocketProgress,
    pub status: LabelledStatus,
}

impl DocketResponse {
    pub fn build(docket: Option<Docket>, checklist: Checklist) -> Self {
        let progress = ProgressService::calculate(docket.as_ref(), checklist);
        let status = StatusService::classify(progress.percentage).into();
        Self {
            docket,
            progress,
            status,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateReferencesPayload {
    #[validate(length(max = 10), nested)]
    pub references: Vec<Reference>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AdminDocketQuery {
    pub checklist: Option<Checklist>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDocketSummary {
    pub user: User,
    #[serde(flatten)]
    pub docket: DocketResponse,
}
