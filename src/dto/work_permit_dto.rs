use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::work_permit::{TransitionWarning, WorkPermit, WorkPermitStatus};
use crate::services::work_permit_service::{WorkPermitChanges, WorkPermitUpdate};
use crate::utils::validation::non_blank;

/// A work permit plus the flags the portal needs to enable its controls.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkPermitView {
    #[serde(flatten)]
    pub work_permit: WorkPermit,
    pub final_docket_upload_enabled: bool,
    pub tracking_code_required: bool,
    pub terminal: bool,
}

impl From<WorkPermit> for WorkPermitView {
    fn from(work_permit: WorkPermit) -> Self {
        let status = work_permit.status;
        Self {
            final_docket_upload_enabled: status.allows_final_docket_upload(),
            tracking_code_required: status.requires_tracking_code() && !work_permit.has_tracking_code(),
            terminal: status.is_terminal(),
            work_permit,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorkPermitPayload {
    pub status: Option<WorkPermitStatus>,
    #[validate(length(max = 64))]
    pub tracking_code: Option<String>,
    pub application_date: Option<NaiveDate>,
    #[validate(length(max = 4000))]
    pub notes: Option<String>,
}

impl From<UpdateWorkPermitPayload> for WorkPermitChanges {
    fn from(payload: UpdateWorkPermitPayload) -> Self {
        Self {
            status: payload.status,
            tracking_code: non_blank(payload.tracking_code),
            application_date: payload.application_date,
            notes: payload.notes,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkPermitUpdateResponse {
    pub work_permit: WorkPermitView,
    pub warnings: Vec<TransitionWarning>,
}

impl From<WorkPermitUpdate> for WorkPermitUpdateResponse {
    fn from(update: WorkPermitUpdate) -> Self {
        Self {
            work_permit: update.work_permit.into(),
            warnings: update.warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_flags_follow_status() {
        let view = WorkPermitView::from(WorkPermit::default());
        assert!(!view.final_docket_upload_enabled);
        assert!(!view.tracking_code_required);
        assert!(!view.terminal);

        let view = WorkPermitView::from(WorkPermit {
            status: WorkPermitStatus::Applied,
            ..WorkPermit::default()
        });
        assert!(view.final_docket_upload_enabled);
        assert!(view.tracking_code_required);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["status"], "applied");
        assert_eq!(json["finalDocketUploadEnabled"], true);
    }

    #[test]
    fn blank_tracking_code_is_not_an_update() {
        let changes = WorkPermitChanges::from(UpdateWorkPermitPayload {
            tracking_code: Some("   ".into()),
            ..UpdateWorkPermitPayload::default()
        });
        assert!(changes.tracking_code.is_none());
    }
}
