use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

const DOCUMENT_EXTS: &[&str] = &["pdf", "jpg", "jpeg", "png", "webp", "doc", "docx"];
const PDF_ONLY: &[&str] = &["pdf"];

/// Where an upload goes and which file types it accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadCategory {
    Docket,
    Contract,
    FinalDocket,
}

impl UploadCategory {
    pub fn dir_name(self) -> &'static str {
        match self {
            UploadCategory::Docket => "docket",
            UploadCategory::Contract => "contracts",
            UploadCategory::FinalDocket => "final-dockets",
        }
    }

    fn allowed_exts(self) -> &'static [&'static str] {
        match self {
            UploadCategory::Docket => DOCUMENT_EXTS,
            UploadCategory::Contract | UploadCategory::FinalDocket => PDF_ONLY,
        }
    }
}

#[derive(Clone)]
pub struct StorageService {
    root: PathBuf,
    max_bytes: usize,
}

impl StorageService {
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Checks size, extension and magic bytes without touching the disk.
    /// Returns the normalised extension.
    pub fn validate(&self, category: UploadCategory, filename: &str, data: &[u8]) -> Result<String> {
        if data.is_empty() {
            return Err(Error::BadRequest("Uploaded file is empty".into()));
        }
        if data.len() > self.max_bytes {
            return Err(Error::BadRequest(format!(
                "File exceeds the {} MB limit",
                self.max_bytes / (1024 * 1024)
            )));
        }

        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        if !category.allowed_exts().contains(&ext.as_str()) {
            return Err(Error::BadRequest(format!(
                "File type .{} is not allowed here; expected one of: {}",
                ext,
                category.allowed_exts().join(", ")
            )));
        }

        if ext == "pdf" && !data.starts_with(b"%PDF") {
            return Err(Error::BadRequest("Invalid PDF file content".into()));
        }
        if (ext == "jpg" || ext == "jpeg") && !data.starts_with(&[0xFF, 0xD8]) {
            return Err(Error::BadRequest("Invalid JPEG file content".into()));
        }
        if ext == "png" && !data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Err(Error::BadRequest("Invalid PNG file content".into()));
        }

        Ok(ext)
    }

    /// Stores the file under a fresh name and returns its public URL.
    pub async fn save(&self, category: UploadCategory, filename: &str, data: &[u8]) -> Result<String> {
        let ext = self.validate(category, filename, data)?;

        let dir = self.root.join(category.dir_name());
        fs::create_dir_all(&dir).await?;

        let stored_name = format!("{}.{}", uuid::Uuid::new_v4(), ext);
        let path = dir.join(&stored_name);
        fs::write(&path, data).await.map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "failed to write upload");
            Error::Internal(format!("Failed to save file: {}", e))
        })?;

        tracing::info!(category = category.dir_name(), file = %stored_name, bytes = data.len(), "upload stored");
        Ok(format!("/uploads/{}/{}", category.dir_name(), stored_name))
    }

    /// Deletes a file previously returned by [`StorageService::save`]. Used to
    /// drop files whose database write was refused; failures are only logged.
    pub async fn discard(&self, url: &str) {
        let Some(relative) = url.strip_prefix("/uploads/") else {
            return;
        };
        if relative.split('/').any(|part| part == ".." || part.is_empty()) {
            return;
        }
        let path = self.root.join(relative);
        if let Err(e) = fs::remove_file(&path).await {
            tracing::warn!(path = %path.display(), error = %e, "failed to discard upload");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> StorageService {
        StorageService::new(std::env::temp_dir().join("chef-overseas-test-uploads"), 1024)
    }

    #[test]
    fn contracts_accept_pdf_only() {
        let storage = storage();
        assert!(storage
            .validate(UploadCategory::Contract, "signed.pdf", b"%PDF-1.7 body")
            .is_ok());
        assert!(storage
            .validate(UploadCategory::Contract, "signed.png", &[0x89, 0x50, 0x4E, 0x47, 0x0D])
            .is_err());
    }

    #[test]
    fn mismatched_magic_bytes_are_rejected() {
        let storage = storage();
        let err = storage
            .validate(UploadCategory::Docket, "passport.pdf", b"not a pdf")
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
        assert!(storage
            .validate(UploadCategory::Docket, "photo.JPG", &[0xFF, 0xD8, 0xFF, 0xE0])
            .is_ok());
    }

    #[test]
    fn oversized_and_empty_files_are_rejected() {
        let storage = storage();
        let mut big = b"%PDF".to_vec();
        big.resize(2048, 0);
        assert!(storage.validate(UploadCategory::Docket, "big.pdf", &big).is_err());
        assert!(storage.validate(UploadCategory::Docket, "empty.pdf", &[]).is_err());
    }

    #[tokio::test]
    async fn saved_files_get_public_urls() {
        let storage = storage();
        let url = storage
            .save(UploadCategory::FinalDocket, "final.pdf", b"%PDF-1.4 final")
            .await
            .unwrap();
        assert!(url.starts_with("/uploads/final-dockets/"));
        assert!(url.ends_with(".pdf"));

        let file_name = url.rsplit('/').next().unwrap();
        let on_disk = storage.root().join("final-dockets").join(file_name);
        assert!(on_disk.exists());

        storage.discard(&url).await;
        assert!(!on_disk.exists());
    }
}
