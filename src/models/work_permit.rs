use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Work-permit / visa lifecycle.
///
/// ```text
/// preparation -> applied -> awaiting_decision -> approved
///                   \              |
///                    `-----------> rejected
/// ```
///
/// The graph documents the expected path only. Admins may set any status
/// from any other; [`WorkPermitStatus::is_standard_transition`] is used to
/// warn, never to refuse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "work_permit_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WorkPermitStatus {
    #[default]
    Preparation,
    Applied,
    AwaitingDecision,
    Approved,
    Rejected,
}

impl WorkPermitStatus {
    pub const ALL: [WorkPermitStatus; 5] = [
        WorkPermitStatus::Preparation,
        WorkPermitStatus::Applied,
        WorkPermitStatus::AwaitingDecision,
        WorkPermitStatus::Approved,
        WorkPermitStatus::Rejected,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WorkPermitStatus::Preparation => "preparation",
            WorkPermitStatus::Applied => "applied",
            WorkPermitStatus::AwaitingDecision => "awaiting_decision",
            WorkPermitStatus::Approved => "approved",
            WorkPermitStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, WorkPermitStatus::Approved | WorkPermitStatus::Rejected)
    }

    pub fn is_standard_transition(self, to: WorkPermitStatus) -> bool {
        use WorkPermitStatus::*;
        matches!(
            (self, to),
            (Preparation, Applied)
                | (Applied, AwaitingDecision)
                | (AwaitingDecision, Approved)
                | (Applied, Rejected)
                | (AwaitingDecision, Rejected)
        )
    }

    pub fn allows_final_docket_upload(self) -> bool {
        matches!(
            self,
            WorkPermitStatus::Applied | WorkPermitStatus::AwaitingDecision | WorkPermitStatus::Approved
        )
    }

    pub fn requires_tracking_code(self) -> bool {
        self != WorkPermitStatus::Preparation
    }

    /// Statuses from which a final docket upload may move the permit to
    /// `approved` when auto-approval is switched on.
    pub fn auto_approves_on_final_docket(self) -> bool {
        matches!(self, WorkPermitStatus::Applied | WorkPermitStatus::AwaitingDecision)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WorkPermit {
    pub user_id: Uuid,
    pub status: WorkPermitStatus,
    pub tracking_code: Option<String>,
    pub application_date: Option<NaiveDate>,
    pub final_docket_url: Option<String>,
    pub notes: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl WorkPermit {
    pub fn has_tracking_code(&self) -> bool {
        self.tracking_code.as_deref().is_some_and(|c| !c.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionWarning {
    TrackingCodeRequired,
    NonStandardTransition,
}

/// Non-blocking warnings for moving a permit from `from` to `to`.
/// `tracking_code` is the code stored once the update lands.
pub fn transition_warnings(
    from: WorkPermitStatus,
    to: WorkPermitStatus,
    tracking_code: Option<&str>,
) -> Vec<TransitionWarning> {
    let mut warnings = Vec::new();
    let has_code = tracking_code.is_some_and(|c| !c.trim().is_empty());
    if to.requires_tracking_code() && !has_code {
        warnings.push(TransitionWarning::TrackingCodeRequired);
    }
    if from != to && !from.is_standard_transition(to) {
        warnings.push(TransitionWarning::NonStandardTransition);
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use WorkPermitStatus::*;

    #[test]
    fn final_docket_upload_gated_from_applied_onward() {
        assert!(!Preparation.allows_final_docket_upload());
        assert!(Applied.allows_final_docket_upload());
        assert!(AwaitingDecision.allows_final_docket_upload());
        assert!(Approved.allows_final_docket_upload());
        assert!(!Rejected.allows_final_docket_upload());
    }

    #[test]
    fn only_approved_and_rejected_are_terminal() {
        let terminal: Vec<_> = WorkPermitStatus::ALL.into_iter().filter(|s| s.is_terminal()).collect();
        assert_eq!(terminal, vec![Approved, Rejected]);
    }

    #[test]
    fn rejected_reachable_only_after_applying() {
        assert!(Applied.is_standard_transition(Rejected));
        assert!(AwaitingDecision.is_standard_transition(Rejected));
        assert!(!Preparation.is_standard_transition(Rejected));
        assert!(!Approved.is_standard_transition(Rejected));
    }

    #[test]
    fn applied_without_tracking_code_is_flagged_not_blocked() {
        let warnings = transition_warnings(Preparation, Applied, None);
        assert_eq!(warnings, vec![TransitionWarning::TrackingCodeRequired]);

        let warnings = transition_warnings(Preparation, Applied, Some("WP-2026-0042"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn skipping_states_is_allowed_with_a_warning() {
        let warnings = transition_warnings(Preparation, Approved, Some("WP-1"));
        assert_eq!(warnings, vec![TransitionWarning::NonStandardTransition]);

        let warnings = transition_warnings(Approved, Preparation, None);
        assert_eq!(warnings, vec![TransitionWarning::NonStandardTransition]);
    }

    #[test]
    fn status_serializes_in_snake_case() {
        assert_eq!(
            serde_json::to_string(&AwaitingDecision).unwrap(),
            "\"awaiting_decision\""
        );
        let parsed: WorkPermitStatus = serde_json::from_str("\"applied\"").unwrap();
        assert_eq!(parsed, Applied);
    }
}
