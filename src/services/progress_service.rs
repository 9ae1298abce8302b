//! Docket completion checklist.
//!
//! Every checklist item is a predicate over a [`Docket`]; items are evaluated
//! independently, so field order never matters. The total is fixed at nine
//! for both checklists.

use crate::models::docket::Docket;
use serde::{Deserialize, Serialize};

pub const CHECKLIST_TOTAL: u32 = 9;
pub const MIN_REFERENCES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChecklistItem {
    PassportFront,
    PassportLast,
    PassportPhoto,
    Resume,
    Education,
    Experience,
    OfferLetter,
    PermanentAddress,
    OtherCertifications,
    References,
}

impl ChecklistItem {
    pub fn is_satisfied(self, docket: &Docket) -> bool {
        match self {
            ChecklistItem::PassportFront => present(&docket.passport_front_url),
            ChecklistItem::PassportLast => present(&docket.passport_last_url),
            ChecklistItem::PassportPhoto => present(&docket.passport_photo_url),
            ChecklistItem::Resume => present(&docket.resume_url),
            ChecklistItem::Education => !docket.education_files.is_empty(),
            ChecklistItem::Experience => !docket.experience_files.is_empty(),
            ChecklistItem::OfferLetter => present(&docket.offer_letter_url),
            ChecklistItem::PermanentAddress => present(&docket.permanent_address_url),
            ChecklistItem::OtherCertifications => !docket.other_certifications.is_empty(),
            ChecklistItem::References => docket.references.len() >= MIN_REFERENCES,
        }
    }
}

fn present(url: &Option<String>) -> bool {
    url.as_deref().is_some_and(|u| !u.trim().is_empty())
}

/// Which nine items make up "complete".
///
/// `AdminLegacy` is the admin docket list's historical variant, which counts
/// the passport last page instead of other certifications.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Checklist {
    #[default]
    Standard,
    #[serde(alias = "admin")]
    AdminLegacy,
}

const STANDARD_ITEMS: [ChecklistItem; CHECKLIST_TOTAL as usize] = [
    ChecklistItem::PassportFront,
    ChecklistItem::PassportPhoto,
    ChecklistItem::Resume,
    ChecklistItem::Education,
    ChecklistItem::Experience,
    ChecklistItem::OfferLetter,
    ChecklistItem::PermanentAddress,
    ChecklistItem::OtherCertifications,
    ChecklistItem::References,
];

const ADMIN_LEGACY_ITEMS: [ChecklistItem; CHECKLIST_TOTAL as usize] = [
    ChecklistItem::PassportFront,
    ChecklistItem::PassportLast,
    ChecklistItem::PassportPhoto,
    ChecklistItem::Resume,
    ChecklistItem::Education,
    ChecklistItem::Experience,
    ChecklistItem::OfferLetter,
    ChecklistItem::PermanentAddress,
    ChecklistItem::References,
];

impl Checklist {
    pub fn items(self) -> &'static [ChecklistItem] {
        match self {
            Checklist::Standard => &STANDARD_ITEMS,
            Checklist::AdminLegacy => &ADMIN_LEGACY_ITEMS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocketProgress {
    pub completed: u32,
    pub total: u32,
    pub percentage: f64,
    pub missing: Vec<ChecklistItem>,
}

pub struct ProgressService;

impl ProgressService {
    pub fn calculate(docket: Option<&Docket>, checklist: Checklist) -> DocketProgress {
        let items = checklist.items();
        let Some(docket) = docket else {
            return DocketProgress {
                completed: 0,
                total: CHECKLIST_TOTAL,
                percentage: 0.0,
                missing: items.to_vec(),
            };
        };

        let (done, missing): (Vec<ChecklistItem>, Vec<ChecklistItem>) =
            items.iter().copied().partition(|item| item.is_satisfied(docket));
        let completed = done.len() as u32;

        DocketProgress {
            completed,
            total: CHECKLIST_TOTAL,
            percentage: 100.0 * f64::from(completed) / f64::from(CHECKLIST_TOTAL),
            missing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::docket::Reference;

    fn reference(name: &str) -> Reference {
        Reference {
            full_name: name.to_string(),
            company: "Taj Hotels".to_string(),
            designation: "Sous Chef".to_string(),
            phone: "+91 98765 43210".to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
        }
    }

    fn full_docket() -> Docket {
        Docket {
            passport_front_url: Some("/uploads/docket/front.pdf".into()),
            passport_last_url: Some("/uploads/docket/last.pdf".into()),
            passport_photo_url: Some("/uploads/docket/photo.jpg".into()),
            resume_url: Some("/uploads/docket/cv.pdf".into()),
            offer_letter_url: Some("/uploads/docket/offer.pdf".into()),
            permanent_address_url: Some("/uploads/docket/address.pdf".into()),
            education_files: vec!["/uploads/docket/degree.pdf".into()],
            experience_files: vec!["/uploads/docket/exp.pdf".into()],
            other_certifications: vec!["/uploads/docket/haccp.pdf".into()],
            references: vec![reference("Asha"), reference("Ravi")],
            ..Docket::default()
        }
    }

    #[test]
    fn empty_docket_is_zero_percent() {
        let progress = ProgressService::calculate(Some(&Docket::default()), Checklist::Standard);
        assert_eq!(progress.completed, 0);
        assert_eq!(progress.total, 9);
        assert_eq!(progress.percentage, 0.0);
        assert_eq!(progress.missing.len(), 9);
    }

    #[test]
    fn missing_docket_is_zero_percent_not_an_error() {
        let progress = ProgressService::calculate(None, Checklist::Standard);
        assert_eq!((progress.completed, progress.total), (0, 9));
        assert_eq!(progress.percentage, 0.0);
    }

    #[test]
    fn full_docket_is_exactly_one_hundred() {
        for checklist in [Checklist::Standard, Checklist::AdminLegacy] {
            let progress = ProgressService::calculate(Some(&full_docket()), checklist);
            assert_eq!(progress.completed, 9);
            assert_eq!(progress.percentage, 100.0);
            assert!(progress.missing.is_empty());
        }
    }

    #[test]
    fn single_reference_does_not_count() {
        let mut docket = Docket {
            references: vec![reference("Asha")],
            ..Docket::default()
        };
        assert!(!ChecklistItem::References.is_satisfied(&docket));

        docket.references.push(reference("Ravi"));
        assert!(ChecklistItem::References.is_satisfied(&docket));
    }

    #[test]
    fn passport_front_and_resume_only() {
        let docket = Docket {
            passport_front_url: Some("/uploads/docket/front.pdf".into()),
            resume_url: Some("/uploads/docket/cv.pdf".into()),
            ..Docket::default()
        };
        let progress = ProgressService::calculate(Some(&docket), Checklist::Standard);
        assert_eq!(progress.completed, 2);
        assert!((progress.percentage - 22.2).abs() < 0.05);
    }

    #[test]
    fn blank_urls_are_not_present() {
        let docket = Docket {
            resume_url: Some("   ".into()),
            ..Docket::default()
        };
        assert!(!ChecklistItem::Resume.is_satisfied(&docket));
    }

    #[test]
    fn checklists_differ_only_in_last_page_versus_certifications() {
        let docket = Docket {
            passport_last_url: Some("/uploads/docket/last.pdf".into()),
            ..Docket::default()
        };
        assert_eq!(ProgressService::calculate(Some(&docket), Checklist::Standard).completed, 0);
        assert_eq!(ProgressService::calculate(Some(&docket), Checklist::AdminLegacy).completed, 1);

        let docket = Docket {
            other_certifications: vec!["/uploads/docket/haccp.pdf".into()],
            ..Docket::default()
        };
        assert_eq!(ProgressService::calculate(Some(&docket), Checklist::Standard).completed, 1);
        assert_eq!(ProgressService::calculate(Some(&docket), Checklist::AdminLegacy).completed, 0);
    }

    #[test]
    fn checklist_accepts_admin_alias() {
        let parsed: Checklist = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(parsed, Checklist::AdminLegacy);
    }
}
