//! Confirm-then-delete flow
//!
//! Hapus data selalu dua langkah: minta konfirmasi (non-blocking), lalu
//! DELETE hanya setelah dikonfirmasi. Selama request berjalan hanya baris
//! yang bersangkutan ditandai "deleting". Sukses → item dibuang dari state
//! lokal tanpa reload; gagal → notifikasi, state lokal tidak berubah.

use serde::Serialize;
use std::future::Future;
use tracing::{info, warn};

use crate::core::notify::{Notification, Notifier};
use crate::models::errors::AppResult;
use crate::models::types::{FinanceRecord, RecordId};

/// Records addressable by id
pub trait Identified {
    fn record_id(&self) -> &RecordId;
}

impl Identified for FinanceRecord {
    fn record_id(&self) -> &RecordId {
        &self.id
    }
}

/// Texts shown along the flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteMessages {
    pub confirm: String,
    pub success: String,
    pub failure: String,
}

impl DeleteMessages {
    /// Standard texts for a resource label ("pendapatan")
    pub fn for_resource(label: &str) -> Self {
        Self {
            confirm: format!("Apakah Anda yakin ingin menghapus data {} ini?", label),
            success: format!("Data {} berhasil dihapus.", label),
            failure: format!("Gagal menghapus data {}.", label),
        }
    }

    /// Log and notify the outcome of a confirmed DELETE. Returns true on success.
    pub fn report(&self, id: &RecordId, result: &AppResult<()>, notifier: &dyn Notifier) -> bool {
        match result {
            Ok(()) => {
                info!(id = %id, "🗑️ Record deleted");
                notifier.notify(Notification::success(self.success.clone()));
                true
            }
            Err(err) => {
                warn!(id = %id, code = err.code_str(), "Delete failed: {}", err);
                notifier.notify(Notification::error(self.failure.clone()));
                false
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePhase {
    Idle,
    AwaitingConfirm,
    Deleting,
}

/// Local list plus the in-flight delete state
#[derive(Debug, Clone)]
pub struct DeleteFlow<T> {
    items: Vec<T>,
    pending: Option<RecordId>,
    deleting: Option<RecordId>,
    messages: DeleteMessages,
}

fn same_id(a: &RecordId, b: &RecordId) -> bool {
    a == b || a.to_string() == b.to_string()
}

impl<T: Identified> DeleteFlow<T> {
    pub fn new(items: Vec<T>, messages: DeleteMessages) -> Self {
        Self {
            items,
            pending: None,
            deleting: None,
            messages,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn phase(&self) -> DeletePhase {
        if self.deleting.is_some() {
            DeletePhase::Deleting
        } else if self.pending.is_some() {
            DeletePhase::AwaitingConfirm
        } else {
            DeletePhase::Idle
        }
    }

    pub fn pending(&self) -> Option<&RecordId> {
        self.pending.as_ref()
    }

    /// Only the acted-on row is busy
    pub fn is_deleting(&self, id: &RecordId) -> bool {
        self.deleting.as_ref().is_some_and(|d| same_id(d, id))
    }

    /// Raise the confirmation prompt. Ignored while another delete runs
    /// or when the id is not in the list.
    pub fn request(&mut self, id: RecordId, notifier: &dyn Notifier) -> bool {
        if self.deleting.is_some() || !self.items.iter().any(|i| same_id(i.record_id(), &id)) {
            return false;
        }
        notifier.notify(Notification::info(self.messages.confirm.clone()));
        self.pending = Some(id);
        true
    }

    /// Dismiss the confirmation prompt
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Confirmed: mark the row busy and hand back the id to delete
    pub fn begin(&mut self) -> Option<RecordId> {
        let id = self.pending.take()?;
        self.deleting = Some(id.clone());
        Some(id)
    }

    /// Apply the outcome of the DELETE request. Returns true on success.
    pub fn finish(&mut self, result: AppResult<()>, notifier: &dyn Notifier) -> bool {
        let Some(id) = self.deleting.take() else {
            return false;
        };
        let deleted = self.messages.report(&id, &result, notifier);
        if deleted {
            self.items.retain(|item| !same_id(item.record_id(), &id));
        }
        deleted
    }

    /// `begin` + request + `finish` in one step
    pub async fn confirm<F, Fut>(&mut self, notifier: &dyn Notifier, delete: F) -> bool
    where
        F: FnOnce(RecordId) -> Fut,
        Fut: Future<Output = AppResult<()>>,
    {
        let Some(id) = self.begin() else {
            return false;
        };
        let result = delete(id).await;
        self.finish(result, notifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::notify::{NotificationLevel, RecordingNotifier};
    use crate::models::errors::AppError;

    #[derive(Debug, Clone, PartialEq)]
    struct Item(RecordId);

    impl Identified for Item {
        fn record_id(&self) -> &RecordId {
            &self.0
        }
    }

    fn flow() -> DeleteFlow<Item> {
        DeleteFlow::new(
            vec![Item(1.into()), Item(2.into()), Item(3.into())],
            DeleteMessages::for_resource("pendapatan"),
        )
    }

    #[tokio::test]
    async fn test_delete_success_removes_exactly_one() {
        let mut flow = flow();
        let notifier = RecordingNotifier::new();

        assert!(flow.request(2.into(), &notifier));
        assert_eq!(flow.phase(), DeletePhase::AwaitingConfirm);

        let ok = flow.confirm(&notifier, |_| async { Ok(()) }).await;
        assert!(ok);
        assert_eq!(flow.items(), &[Item(1.into()), Item(3.into())]);
        assert_eq!(flow.phase(), DeletePhase::Idle);

        let notes = notifier.take();
        assert_eq!(notes.last().unwrap().title, "Data pendapatan berhasil dihapus.");
    }

    #[tokio::test]
    async fn test_delete_failure_keeps_list() {
        let mut flow = flow();
        let notifier = RecordingNotifier::new();
        flow.request(1.into(), &notifier);

        let ok = flow
            .confirm(&notifier, |_| async { Err(AppError::request_failed(500, "boom")) })
            .await;
        assert!(!ok);
        assert_eq!(flow.items().len(), 3);

        let last = notifier.take().pop().unwrap();
        assert_eq!(last.level, NotificationLevel::Error);
        assert_eq!(last.title, "Gagal menghapus data pendapatan.");
    }

    #[test]
    fn test_only_acted_row_is_busy() {
        let mut flow = flow();
        let notifier = RecordingNotifier::new();
        flow.request(3.into(), &notifier);
        let id = flow.begin().unwrap();
        assert_eq!(id, RecordId::Num(3));
        assert!(flow.is_deleting(&3.into()));
        assert!(!flow.is_deleting(&1.into()));
        // second request ignored while deleting
        assert!(!flow.request(1.into(), &notifier));
    }

    #[test]
    fn test_report_without_local_list() {
        let messages = DeleteMessages::for_resource("fasilitas");
        let notifier = RecordingNotifier::new();

        assert!(messages.report(&RecordId::Num(4), &Ok(()), &notifier));
        assert!(!messages.report(&RecordId::Num(4), &Err(AppError::not_found()), &notifier));

        let titles: Vec<String> = notifier.take().into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["Data fasilitas berhasil dihapus.", "Gagal menghapus data fasilitas."]);
    }

    #[test]
    fn test_cancel_and_unknown_id() {
        let mut flow = flow();
        let notifier = RecordingNotifier::new();
        assert!(!flow.request(99.into(), &notifier));
        flow.request(1.into(), &notifier);
        flow.cancel();
        assert_eq!(flow.begin(), None);
        assert_eq!(flow.items().len(), 3);
    }
}
