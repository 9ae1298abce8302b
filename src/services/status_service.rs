use crate::models::contract::Contract;
use serde::{Serialize, Serializer};

/// Presentation tone attached to a status label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Success,
    Info,
    Warning,
    Neutral,
    Muted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusLabel {
    Complete,
    NearlyDone,
    InProgress,
    Started,
    NotStarted,
}

impl StatusLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusLabel::Complete => "Complete",
            StatusLabel::NearlyDone => "Nearly Done",
            StatusLabel::InProgress => "In Progress",
            StatusLabel::Started => "Started",
            StatusLabel::NotStarted => "Not Started",
        }
    }

    pub fn tone(self) -> Tone {
        match self {
            StatusLabel::Complete => Tone::Success,
            StatusLabel::NearlyDone => Tone::Info,
            StatusLabel::InProgress => Tone::Warning,
            StatusLabel::Started => Tone::Neutral,
            StatusLabel::NotStarted => Tone::Muted,
        }
    }
}

impl Serialize for StatusLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Lower bounds (exclusive) for the intermediate labels. 100 is always
/// "Complete" and anything at or below zero is "Not Started".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdTable {
    pub nearly_done: f64,
    pub in_progress: f64,
}

impl ThresholdTable {
    pub const CANONICAL: ThresholdTable = ThresholdTable {
        nearly_done: 70.0,
        in_progress: 30.0,
    };

    pub fn classify(&self, percentage: f64) -> StatusLabel {
        if percentage >= 100.0 {
            StatusLabel::Complete
        } else if percentage > self.nearly_done {
            StatusLabel::NearlyDone
        } else if percentage > self.in_progress {
            StatusLabel::InProgress
        } else if percentage > 0.0 {
            StatusLabel::Started
        } else {
            StatusLabel::NotStarted
        }
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self::CANONICAL
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LabelledStatus {
    pub label: StatusLabel,
    pub tone: Tone,
}

impl From<StatusLabel> for LabelledStatus {
    fn from(label: StatusLabel) -> Self {
        Self {
            label,
            tone: label.tone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractStatus {
    Completed,
    InProgress,
    Pending,
}

impl ContractStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ContractStatus::Completed => "Completed",
            ContractStatus::InProgress => "In Progress",
            ContractStatus::Pending => "Pending",
        }
    }

    pub fn tone(self) -> Tone {
        match self {
            ContractStatus::Completed => Tone::Success,
            ContractStatus::InProgress => Tone::Warning,
            ContractStatus::Pending => Tone::Muted,
        }
    }
}

impl Serialize for ContractStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

pub struct StatusService;

impl StatusService {
    pub fn classify(percentage: f64) -> StatusLabel {
        ThresholdTable::CANONICAL.classify(percentage)
    }

    /// "Completed" once both documents carry a signed copy, "In Progress" once
    /// either does, otherwise "Pending".
    pub fn contract_status(contract: Option<&Contract>) -> ContractStatus {
        let Some(contract) = contract else {
            return ContractStatus::Pending;
        };
        match (contract.company_contract.is_signed(), contract.job_offer.is_signed()) {
            (true, true) => ContractStatus::Completed,
            (true, false) | (false, true) => ContractStatus::InProgress,
            (false, false) => ContractStatus::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::contract::ContractPart;

    #[test]
    fn thresholds_first_match_wins() {
        assert_eq!(StatusService::classify(100.0), StatusLabel::Complete);
        assert_eq!(StatusService::classify(88.9), StatusLabel::NearlyDone);
        assert_eq!(StatusService::classify(70.0), StatusLabel::InProgress);
        assert_eq!(StatusService::classify(30.1), StatusLabel::InProgress);
        assert_eq!(StatusService::classify(30.0), StatusLabel::Started);
        assert_eq!(StatusService::classify(22.2), StatusLabel::Started);
        assert_eq!(StatusService::classify(0.0), StatusLabel::NotStarted);
    }

    #[test]
    fn labels_serialize_as_display_strings() {
        let json = serde_json::to_value(LabelledStatus::from(StatusLabel::NearlyDone)).unwrap();
        assert_eq!(json["label"], "Nearly Done");
        assert_eq!(json["tone"], "info");
    }

    #[test]
    fn contract_pending_until_something_is_signed() {
        let mut contract = Contract {
            company_contract: ContractPart {
                original_url: Some("/uploads/contracts/company.pdf".into()),
                ..ContractPart::default()
            },
            ..Contract::default()
        };
        assert_eq!(StatusService::contract_status(Some(&contract)), ContractStatus::Pending);

        contract.company_contract.signed_url = Some("/uploads/contracts/company-signed.pdf".into());
        assert_eq!(
            StatusService::contract_status(Some(&contract)),
            ContractStatus::InProgress
        );

        contract.job_offer.signed_url = Some("/uploads/contracts/offer-signed.pdf".into());
        assert_eq!(
            StatusService::contract_status(Some(&contract)),
            ContractStatus::Completed
        );
    }

    #[test]
    fn missing_contract_is_pending() {
        assert_eq!(StatusService::contract_status(None), ContractStatus::Pending);
    }
}
