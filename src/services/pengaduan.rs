//! Pengaduan (complaints)
//!
//! Form publik: validasi lokal dulu (nomor telepon → kategori → field wajib),
//! baru kirim multipart ke `/api/publik/pengaduan` tanpa token. Sisi admin:
//! daftar, ubah status, hapus.

use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use crate::core::loader::{LoadState, Loader};
use crate::core::notify::{Notification, Notifier};
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::{ComplaintCategory, Pengaduan, RecordId};
use crate::providers::client::{Access, DesaApiClient};
use crate::utils::constants::{
    record_path, EP_PENGADUAN, EP_PUBLIK_PENGADUAN, MAX_MEDIA_BYTES, MEDIA_FIELD,
    MSG_CATEGORY_REQUIRED, MSG_COMPLAINT_FAILED, MSG_COMPLAINT_FAILED_DETAIL,
    MSG_COMPLAINT_REQUIRED, MSG_COMPLAINT_SENT, MSG_COMPLAINT_SENT_DETAIL, MSG_MEDIA_TOO_LARGE,
    MSG_PHONE_INVALID, STATUS_DIAJUKAN,
};

/// One attachment held in memory until submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl MediaFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// `^[0-9]{10,15}$`
pub fn is_valid_phone(raw: &str) -> bool {
    (10..=15).contains(&raw.len()) && raw.bytes().all(|b| b.is_ascii_digit())
}

/// Public complaint form state
#[derive(Debug, Clone, Default)]
pub struct ComplaintForm {
    pub nama: String,
    pub nomor_telepon: String,
    pub kategori: Option<ComplaintCategory>,
    pub detail_pengaduan: String,
    media: Vec<MediaFile>,
}

impl ComplaintForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn media(&self) -> &[MediaFile] {
        &self.media
    }

    /// Append a batch of files. One oversized file rejects the whole batch.
    pub fn add_media(&mut self, files: Vec<MediaFile>) -> AppResult<()> {
        if let Some(big) = files.iter().find(|f| f.size() > MAX_MEDIA_BYTES) {
            warn!(file = %big.file_name, size = big.size(), "Attachment rejected");
            return Err(AppError::validation(MSG_MEDIA_TOO_LARGE));
        }
        self.media.extend(files);
        Ok(())
    }

    pub fn remove_media(&mut self, index: usize) -> Option<MediaFile> {
        (index < self.media.len()).then(|| self.media.remove(index))
    }

    /// Local checks, in the order the form reports them
    pub fn validate(&self) -> AppResult<ComplaintCategory> {
        if !is_valid_phone(&self.nomor_telepon) {
            return Err(AppError::validation(MSG_PHONE_INVALID));
        }
        let kategori = self
            .kategori
            .ok_or_else(|| AppError::validation(MSG_CATEGORY_REQUIRED))?;
        if self.nama.trim().is_empty() || self.detail_pengaduan.trim().is_empty() {
            return Err(AppError::validation(MSG_COMPLAINT_REQUIRED));
        }
        Ok(kategori)
    }

    /// Multipart body; validates first
    pub fn to_multipart(&self) -> AppResult<Form> {
        let kategori = self.validate()?;
        let mut form = Form::new()
            .text("nama", self.nama.clone())
            .text("nomor_telepon", self.nomor_telepon.clone())
            .text("kategori", kategori.as_str())
            .text("detail_pengaduan", self.detail_pengaduan.clone());

        for file in &self.media {
            let mut part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
            if let Some(ct) = &file.content_type {
                part = part.mime_str(ct)?;
            }
            form = form.part(MEDIA_FIELD, part);
        }
        Ok(form)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Admin counters shown above the complaint table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ComplaintCounts {
    pub total: usize,
    pub diajukan: usize,
}

impl ComplaintCounts {
    pub fn from_items(items: &[Pengaduan]) -> Self {
        Self {
            total: items.len(),
            diajukan: items.iter().filter(|p| p.status == STATUS_DIAJUKAN).count(),
        }
    }
}

/// Complaint operations against the village API
pub struct ComplaintService<'a> {
    client: &'a DesaApiClient,
}

impl<'a> ComplaintService<'a> {
    pub fn new(client: &'a DesaApiClient) -> Self {
        Self { client }
    }

    /// Validate and submit. Validation errors are returned without any
    /// request or notification; transport/server errors notify. The form
    /// is reset only on success.
    pub async fn submit(&self, form: &mut ComplaintForm, notifier: &dyn Notifier) -> AppResult<()> {
        let body = form.to_multipart()?;
        let attachments = form.media().len();

        match self
            .client
            .post_multipart(EP_PUBLIK_PENGADUAN, Access::Public, body)
            .await
        {
            Ok(_) => {
                info!(attachments, "📨 Complaint submitted");
                notifier.notify(
                    Notification::success(MSG_COMPLAINT_SENT).with_description(MSG_COMPLAINT_SENT_DETAIL),
                );
                form.reset();
                Ok(())
            }
            Err(err) => {
                warn!(code = err.code_str(), "Complaint submission failed: {}", err);
                let description = match err.code {
                    ErrorCode::Unknown => MSG_COMPLAINT_FAILED_DETAIL.to_string(),
                    _ => err.message.clone(),
                };
                notifier.notify(Notification::error(MSG_COMPLAINT_FAILED).with_description(description));
                Err(err)
            }
        }
    }

    /// Admin list (bare or wrapped)
    pub async fn list(&self) -> LoadState<Vec<Pengaduan>> {
        Loader::new(self.client, "pengaduan")
            .load_list(EP_PENGADUAN, Access::Bearer)
            .await
    }

    pub async fn update_status(&self, id: &RecordId, status: &str) -> AppResult<()> {
        let status = status.trim();
        if status.is_empty() {
            return Err(AppError::validation("Status pengaduan wajib diisi"));
        }
        self.client
            .put_json(&record_path(EP_PENGADUAN, id)?, Access::Bearer, &json!({ "status": status }))
            .await?;
        info!(id = %id, status, "Complaint status updated");
        Ok(())
    }

    pub async fn delete(&self, id: &RecordId) -> AppResult<()> {
        self.client.delete(&record_path(EP_PENGADUAN, id)?, Access::Bearer).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> ComplaintForm {
        ComplaintForm {
            nama: "Budi".to_string(),
            nomor_telepon: "081234567890".to_string(),
            kategori: Some(ComplaintCategory::Kebersihan),
            detail_pengaduan: "Sampah menumpuk".to_string(),
            ..ComplaintForm::default()
        }
    }

    #[test]
    fn test_phone_rule() {
        assert!(is_valid_phone("0812345678"));
        assert!(is_valid_phone("081234567890123"));
        assert!(!is_valid_phone("0812345"));
        assert!(!is_valid_phone("0812345678901234"));
        assert!(!is_valid_phone("08123-456789"));
        assert!(!is_valid_phone("+6281234567890"));
    }

    #[test]
    fn test_validation_order() {
        let mut form = filled();
        form.nomor_telepon = "0812345".to_string();
        form.kategori = None;
        assert_eq!(form.validate().unwrap_err().message, MSG_PHONE_INVALID);

        form.nomor_telepon = "081234567890".to_string();
        assert_eq!(form.validate().unwrap_err().message, MSG_CATEGORY_REQUIRED);

        form.kategori = Some(ComplaintCategory::Umum);
        form.nama.clear();
        assert_eq!(form.validate().unwrap_err().message, MSG_COMPLAINT_REQUIRED);

        assert_eq!(filled().validate().unwrap(), ComplaintCategory::Kebersihan);
    }

    #[test]
    fn test_oversized_batch_rejected_entirely() {
        let mut form = filled();
        form.add_media(vec![MediaFile::new("a.jpg", vec![0; 10])]).unwrap();

        let err = form
            .add_media(vec![
                MediaFile::new("b.jpg", vec![0; 10]),
                MediaFile::new("big.jpg", vec![0; MAX_MEDIA_BYTES + 1]),
            ])
            .unwrap_err();
        assert_eq!(err.message, MSG_MEDIA_TOO_LARGE);
        assert_eq!(form.media().len(), 1);

        form.add_media(vec![MediaFile::new("edge.jpg", vec![0; MAX_MEDIA_BYTES])])
            .unwrap();
        assert_eq!(form.media().len(), 2);
    }

    #[test]
    fn test_remove_media_and_reset() {
        let mut form = filled();
        form.add_media(vec![MediaFile::new("a.jpg", vec![1]), MediaFile::new("b.jpg", vec![2])])
            .unwrap();
        assert_eq!(form.remove_media(0).unwrap().file_name, "a.jpg");
        assert_eq!(form.remove_media(5), None);
        assert_eq!(form.media()[0].file_name, "b.jpg");

        form.reset();
        assert!(form.nama.is_empty());
        assert!(form.kategori.is_none());
        assert!(form.media().is_empty());
    }

    #[test]
    fn test_counts() {
        let items: Vec<Pengaduan> = serde_json::from_value(serde_json::json!([
            { "id": 1, "status": "Diajukan" },
            { "id": 2, "status": "Selesai" },
            { "id": 3, "status": "Diajukan" }
        ]))
        .unwrap();
        assert_eq!(
            ComplaintCounts::from_items(&items),
            ComplaintCounts { total: 3, diajukan: 2 }
        );
    }
}
