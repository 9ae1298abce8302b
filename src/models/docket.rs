use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    #[validate(length(min = 1, max = 200))]
    pub company: String,
    #[validate(length(max = 200))]
    #[serde(default)]
    pub designation: String,
    #[validate(length(min = 5, max = 40))]
    pub phone: String,
    #[validate(email)]
    pub email: String,
}

/// One candidate's document collection. Every field is optional until the
/// matching upload arrives.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Docket {
    pub user_id: Uuid,
    pub passport_front_url: Option<String>,
    pub passport_last_url: Option<String>,
    pub passport_photo_url: Option<String>,
    pub resume_url: Option<String>,
    pub offer_letter_url: Option<String>,
    pub permanent_address_url: Option<String>,
    pub current_address_url: Option<String>,
    #[serde(default)]
    pub education_files: Vec<String>,
    #[serde(default)]
    pub experience_files: Vec<String>,
    #[serde(default)]
    pub other_certifications: Vec<String>,
    #[serde(default)]
    pub references: Vec<Reference>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DocketRow {
    pub user_id: Uuid,
    pub passport_front_url: Option<String>,
    pub passport_last_url: Option<String>,
    pub passport_photo_url: Option<String>,
    pub resume_url: Option<String>,
    pub offer_letter_url: Option<String>,
    pub permanent_address_url: Option<String>,
    pub current_address_url: Option<String>,
    pub education_files: Vec<String>,
    pub experience_files: Vec<String>,
    pub other_certifications: Vec<String>,
    pub references: Json<Vec<Reference>>,
    pub updated_at: DateTime<Utc>,
}

impl From<DocketRow> for Docket {
    fn from(row: DocketRow) -> Self {
        Self {
            user_id: row.user_id,
            passport_front_url: row.passport_front_url,
            passport_last_url: row.passport_last_url,
            passport_photo_url: row.passport_photo_url,
            resume_url: row.resume_url,
            offer_letter_url: row.offer_letter_url,
            permanent_address_url: row.permanent_address_url,
            current_address_url: row.current_address_url,
            education_files: row.education_files,
            experience_files: row.experience_files,
            other_certifications: row.other_certifications,
            references: row.references.0,
            updated_at: Some(row.updated_at),
        }
    }
}

/// Upload target within a docket. Single fields are replaced by a new upload,
/// list fields get the new file appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocketField {
    PassportFrontUrl,
    PassportLastUrl,
    PassportPhotoUrl,
    ResumeUrl,
    OfferLetterUrl,
    PermanentAddressUrl,
    CurrentAddressUrl,
    EducationFiles,
    ExperienceFiles,
    OtherCertifications,
}

impl DocketField {
    pub const ALL: [DocketField; 10] = [
        DocketField::PassportFrontUrl,
        DocketField::PassportLastUrl,
        DocketField::PassportPhotoUrl,
        DocketField::ResumeUrl,
        DocketField::OfferLetterUrl,
        DocketField::PermanentAddressUrl,
        DocketField::CurrentAddressUrl,
        DocketField::EducationFiles,
        DocketField::ExperienceFiles,
        DocketField::OtherCertifications,
    ];

    pub fn wire_name(self) -> &'static str {
        match self {
            DocketField::PassportFrontUrl => "passportFrontUrl",
            DocketField::PassportLastUrl => "passportLastUrl",
            DocketField::PassportPhotoUrl => "passportPhotoUrl",
            DocketField::ResumeUrl => "resumeUrl",
            DocketField::OfferLetterUrl => "offerLetterUrl",
            DocketField::PermanentAddressUrl => "permanentAddressUrl",
            DocketField::CurrentAddressUrl => "currentAddressUrl",
            DocketField::EducationFiles => "educationFiles",
            DocketField::ExperienceFiles => "experienceFiles",
            DocketField::OtherCertifications => "otherCertifications",
        }
    }

    /// Column in the `dockets` table. Only ever one of these literals, so it is
    /// safe to splice into SQL.
    pub fn column(self) -> &'static str {
        match self {
            DocketField::PassportFrontUrl => "passport_front_url",
            DocketField::PassportLastUrl => "passport_last_url",
            DocketField::PassportPhotoUrl => "passport_photo_url",
            DocketField::ResumeUrl => "resume_url",
            DocketField::OfferLetterUrl => "offer_letter_url",
            DocketField::PermanentAddressUrl => "permanent_address_url",
            DocketField::CurrentAddressUrl => "current_address_url",
            DocketField::EducationFiles => "education_files",
            DocketField::ExperienceFiles => "experience_files",
            DocketField::OtherCertifications => "other_certifications",
        }
    }

    pub fn is_list(self) -> bool {
        matches!(
            self,
            DocketField::EducationFiles
                | DocketField::ExperienceFiles
                | DocketField::OtherCertifications
        )
    }
}

impl std::str::FromStr for DocketField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        DocketField::ALL
            .into_iter()
            .find(|f| {
                f.wire_name() == wanted
                    || f.wire_name().trim_end_matches("Url") == wanted
                    || f.column() == wanted
            })
            .ok_or_else(|| format!("Unknown docket field: {}", wanted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_parse_in_all_accepted_forms() {
        assert_eq!(
            "passportFrontUrl".parse::<DocketField>(),
            Ok(DocketField::PassportFrontUrl)
        );
        assert_eq!("passportFront".parse::<DocketField>(), Ok(DocketField::PassportFrontUrl));
        assert_eq!("education_files".parse::<DocketField>(), Ok(DocketField::EducationFiles));
        assert!("salarySlip".parse::<DocketField>().is_err());
    }

    #[test]
    fn only_collection_fields_are_lists() {
        let lists: Vec<_> = DocketField::ALL.into_iter().filter(|f| f.is_list()).collect();
        assert_eq!(
            lists,
            vec![
                DocketField::EducationFiles,
                DocketField::ExperienceFiles,
                DocketField::OtherCertifications
            ]
        );
    }
}
