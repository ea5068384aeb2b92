//! Keuangan Desa - pendapatan & belanja
//!
//! Semua halaman remote dikumpulkan dulu, lalu filter tahun/kategori,
//! total, dan pagination dilakukan in-memory. Tahun terpilih default ke
//! tahun terbaru di data; ganti tahun → semua halaman kategori kembali ke 1.

use chrono::{Datelike, Local};
use serde::Serialize;
use tracing::{info, warn};

use crate::core::filter::{available_years, by_year_category, latest_year};
use crate::core::loader::{LoadState, Loader};
use crate::core::mutation::{DeleteFlow, DeleteMessages};
use crate::core::notify::{Notification, Notifier};
use crate::core::pagination::{CategoryPages, PagerView};
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{FinancePayload, FinanceRecord, RecordId};
use crate::providers::client::{Access, DesaApiClient};
use crate::utils::constants::{
    record_path, with_id, BELANJA_CATEGORIES, EP_APBDESA_PDF, EP_BELANJA, EP_PENDAPATAN,
    MSG_FINANCE_CREATED, MSG_FINANCE_CREATE_FAILED, MSG_FINANCE_REQUIRED, MSG_PDF_CURRENT_YEAR, MSG_PDF_DOWNLOADED,
    MSG_PDF_DOWNLOADED_DETAIL, MSG_PDF_DOWNLOADING, MSG_PDF_DOWNLOADING_DETAIL, MSG_PDF_FAILED,
    MSG_PDF_FAILED_DETAIL, PENDAPATAN_CATEGORIES,
};
use crate::utils::format::{format_rupiah, format_tanggal, parse_amount};

/// Income or expense side of the budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FinanceKind {
    Pendapatan,
    Belanja,
}

impl FinanceKind {
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Pendapatan => EP_PENDAPATAN,
            Self::Belanja => EP_BELANJA,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pendapatan => "pendapatan",
            Self::Belanja => "belanja",
        }
    }

    pub fn categories(&self) -> &'static [&'static str] {
        match self {
            Self::Pendapatan => &PENDAPATAN_CATEGORIES,
            Self::Belanja => &BELANJA_CATEGORIES,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "pendapatan" => Some(Self::Pendapatan),
            "belanja" => Some(Self::Belanja),
            _ => None,
        }
    }

    pub fn delete_messages(&self) -> DeleteMessages {
        DeleteMessages::for_resource(self.label())
    }
}

/// Amount of a record; unparseable amounts count as zero
pub fn amount_of(record: &FinanceRecord) -> f64 {
    parse_amount(&record.jumlah).unwrap_or_else(|| {
        warn!(id = %record.id, jumlah = %record.jumlah, "⚠️ Unparseable amount counted as 0");
        0.0
    })
}

/// Display row of a category table
#[derive(Debug, Clone, Serialize)]
pub struct FinanceRow {
    pub id: RecordId,
    pub tanggal: String,
    pub sub_kategori: String,
    pub deskripsi: String,
    pub sumber_dana: String,
    pub jumlah: f64,
    pub jumlah_label: String,
    pub keterangan: Option<String>,
}

impl From<&FinanceRecord> for FinanceRow {
    fn from(r: &FinanceRecord) -> Self {
        let jumlah = amount_of(r);
        Self {
            id: r.id.clone(),
            tanggal: format_tanggal(&r.tanggal_realisasi),
            sub_kategori: r.sub_kategori.clone(),
            deskripsi: r.deskripsi.clone(),
            sumber_dana: r.sumber_dana.clone(),
            jumlah,
            jumlah_label: format_rupiah(jumlah),
            keterangan: r.keterangan.clone(),
        }
    }
}

/// One category card + its current table page
#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
    pub kategori: String,
    pub count: usize,
    pub total: f64,
    pub total_label: String,
    pub rows: Vec<FinanceRow>,
    pub pager: PagerView,
}

/// Whole detail page
#[derive(Debug, Clone, Serialize)]
pub struct FinanceView {
    pub kind: FinanceKind,
    pub selected_year: Option<i32>,
    pub years: Vec<i32>,
    pub grand_total: f64,
    pub grand_total_label: String,
    pub pdf_available: bool,
    pub categories: Vec<CategorySummary>,
}

/// Fully loaded income/expense records with the page's selection state
#[derive(Debug, Clone)]
pub struct FinanceLedger {
    kind: FinanceKind,
    records: Vec<FinanceRecord>,
    selected_year: Option<i32>,
    pages: CategoryPages,
    page_size: usize,
}

impl FinanceLedger {
    pub fn new(kind: FinanceKind, records: Vec<FinanceRecord>, page_size: usize) -> Self {
        let selected_year = latest_year(&records);
        Self {
            kind,
            records,
            selected_year,
            pages: CategoryPages::new(kind.categories().iter().copied()),
            page_size,
        }
    }

    pub fn kind(&self) -> FinanceKind {
        self.kind
    }

    pub fn records(&self) -> &[FinanceRecord] {
        &self.records
    }

    pub fn selected_year(&self) -> Option<i32> {
        self.selected_year
    }

    /// Select a year and reset every category table to page 1
    pub fn select_year(&mut self, year: i32) {
        self.selected_year = Some(year);
        self.pages.reset_all();
    }

    pub fn set_page(&mut self, category: &str, page: usize) {
        self.pages.set(category, page);
    }

    pub fn years(&self) -> Vec<i32> {
        available_years(&self.records)
    }

    /// Records of the selected year in `category`
    pub fn filtered(&self, category: &str) -> Vec<&FinanceRecord> {
        match self.selected_year {
            Some(year) => by_year_category(&self.records, Some(category), year),
            None => Vec::new(),
        }
    }

    pub fn total_for(&self, category: &str) -> f64 {
        self.filtered(category).into_iter().map(amount_of).sum()
    }

    /// Sum over every record of the selected year, any category
    pub fn grand_total(&self) -> f64 {
        match self.selected_year {
            Some(year) => by_year_category(&self.records, None, year)
                .into_iter()
                .map(amount_of)
                .sum(),
            None => 0.0,
        }
    }

    pub fn summary(&self, category: &str) -> CategorySummary {
        let rows = self.filtered(category);
        let pager = self.pages.pager(category, self.page_size, rows.len());
        let total = self.total_for(category);
        CategorySummary {
            kategori: category.to_string(),
            count: rows.len(),
            total,
            total_label: format_rupiah(total),
            rows: pager.slice(&rows).iter().map(|r| FinanceRow::from(*r)).collect(),
            pager: pager.into(),
        }
    }

    pub fn view(&self, current_year: i32) -> FinanceView {
        let grand_total = self.grand_total();
        FinanceView {
            kind: self.kind,
            selected_year: self.selected_year,
            years: self.years(),
            grand_total,
            grand_total_label: format_rupiah(grand_total),
            pdf_available: self.selected_year.is_some_and(|y| pdf_available(y, current_year)),
            categories: self
                .kind
                .categories()
                .iter()
                .map(|c| self.summary(c))
                .collect(),
        }
    }

    /// Hand the records to a delete flow and take them back afterwards
    fn take_flow(&mut self) -> DeleteFlow<FinanceRecord> {
        DeleteFlow::new(std::mem::take(&mut self.records), self.kind.delete_messages())
    }
}

/// Local checks before create
pub fn validate_finance_payload(kind: FinanceKind, payload: &FinancePayload) -> AppResult<()> {
    let required = [
        payload.tanggal_realisasi.as_str(),
        payload.sub_kategori.as_str(),
        payload.deskripsi.as_str(),
        payload.sumber_dana.as_str(),
    ];
    let known_category = kind.categories().contains(&payload.kategori.as_str());
    let amount_ok = parse_amount(&payload.jumlah).is_some_and(|v| v >= 0.0);

    if payload.tahun_anggaran <= 0
        || required.iter().any(|v| v.trim().is_empty())
        || !known_category
        || !amount_ok
    {
        return Err(AppError::validation(MSG_FINANCE_REQUIRED));
    }
    Ok(())
}

pub fn current_year() -> i32 {
    Local::now().year()
}

/// The APBDesa PDF exists only for closed fiscal years
pub fn pdf_available(year: i32, current_year: i32) -> bool {
    year != current_year
}

/// Downloaded APBDesa report
#[derive(Debug, Clone)]
pub struct PdfDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Finance operations for one side of the budget
pub struct FinanceService<'a> {
    client: &'a DesaApiClient,
    kind: FinanceKind,
}

impl<'a> FinanceService<'a> {
    pub fn new(client: &'a DesaApiClient, kind: FinanceKind) -> Self {
        Self { client, kind }
    }

    /// Collect every remote page into a ledger
    pub async fn load(&self) -> LoadState<FinanceLedger> {
        let page_size = self.client.config().page_size;
        let kind = self.kind;
        Loader::new(self.client, kind.label())
            .load_all_pages::<FinanceRecord>(kind.endpoint(), Access::Bearer)
            .await
            .map(|records| {
                info!(kind = kind.label(), records = records.len(), "📒 Ledger loaded");
                FinanceLedger::new(kind, records, page_size)
            })
    }

    pub async fn create(&self, payload: &FinancePayload, notifier: &dyn Notifier) -> AppResult<()> {
        validate_finance_payload(self.kind, payload)?;
        match self
            .client
            .post_json(self.kind.endpoint(), Access::Bearer, payload)
            .await
        {
            Ok(_) => {
                info!(kind = self.kind.label(), kategori = %payload.kategori, "Record created");
                notifier.notify(Notification::success(MSG_FINANCE_CREATED));
                Ok(())
            }
            Err(err) => {
                notifier.notify(Notification::error(MSG_FINANCE_CREATE_FAILED).with_description(err.message.clone()));
                Err(err)
            }
        }
    }

    /// DELETE without local state (view server)
    pub async fn delete_remote(&self, id: &RecordId) -> AppResult<()> {
        self.client
            .delete(&record_path(self.kind.endpoint(), id)?, Access::Bearer)
            .await
    }

    /// Confirmed delete against a loaded ledger; removes only that record on success
    pub async fn delete(&self, ledger: &mut FinanceLedger, id: RecordId, notifier: &dyn Notifier) -> bool {
        let mut flow = ledger.take_flow();
        let deleted = if flow.request(id, notifier) {
            flow.confirm(notifier, |id| async move { self.delete_remote(&id).await })
                .await
        } else {
            false
        };
        ledger.records = flow.into_items();
        deleted
    }

    /// Download the APBDesa PDF of `year`. Refused for the current year
    /// without any request.
    pub async fn download_pdf(
        client: &DesaApiClient,
        year: i32,
        current_year: i32,
        notifier: &dyn Notifier,
    ) -> AppResult<PdfDocument> {
        if !pdf_available(year, current_year) {
            return Err(AppError::unavailable(MSG_PDF_CURRENT_YEAR));
        }

        notifier.notify(Notification::info(MSG_PDF_DOWNLOADING).with_description(MSG_PDF_DOWNLOADING_DETAIL));
        match client.get_bytes(&with_id(EP_APBDESA_PDF, year), Access::Public).await {
            Ok(bytes) => {
                info!(year, size = bytes.len(), "📄 APBDesa PDF downloaded");
                notifier.notify(Notification::success(MSG_PDF_DOWNLOADED).with_description(MSG_PDF_DOWNLOADED_DETAIL));
                Ok(PdfDocument {
                    file_name: format!("APBDesa-{}.pdf", year),
                    bytes,
                })
            }
            Err(err) => {
                warn!(year, code = err.code_str(), "PDF download failed: {}", err);
                notifier.notify(Notification::error(MSG_PDF_FAILED).with_description(MSG_PDF_FAILED_DETAIL));
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: i64, year: i32, kategori: &str, jumlah: &str) -> FinanceRecord {
        serde_json::from_value(json!({
            "id_pendapatan": id,
            "tahun_anggaran": year,
            "tanggal_realisasi": format!("{}-03-01", year),
            "kategori": kategori,
            "sub_kategori": "Dana Desa",
            "deskripsi": "Tahap",
            "jumlah": jumlah,
            "sumber_dana": "APBN"
        }))
        .unwrap()
    }

    fn ledger() -> FinanceLedger {
        let mut records = Vec::new();
        for i in 0..7 {
            records.push(record(i, 2024, "Pendapatan Transfer", "1000000.00"));
        }
        records.push(record(10, 2024, "Pendapatan Asli Desa", "250000.50"));
        records.push(record(11, 2023, "Pendapatan Transfer", "999"));
        records.push(record(12, 2024, "Pendapatan Lain-lain", "bukan angka"));
        FinanceLedger::new(FinanceKind::Pendapatan, records, 5)
    }

    #[test]
    fn test_defaults_to_latest_year() {
        let ledger = ledger();
        assert_eq!(ledger.selected_year(), Some(2024));
        assert_eq!(ledger.years(), vec![2024, 2023]);
        assert_eq!(FinanceLedger::new(FinanceKind::Belanja, vec![], 5).selected_year(), None);
    }

    #[test]
    fn test_totals_for_selected_year() {
        let ledger = ledger();
        assert_eq!(ledger.total_for("Pendapatan Transfer"), 7_000_000.0);
        assert_eq!(ledger.total_for("Pendapatan Lain-lain"), 0.0);
        assert_eq!(ledger.grand_total(), 7_250_000.5);
    }

    #[test]
    fn test_select_year_resets_pages() {
        let mut ledger = ledger();
        ledger.set_page("Pendapatan Transfer", 2);
        assert_eq!(ledger.summary("Pendapatan Transfer").rows.len(), 2);

        ledger.select_year(2023);
        let summary = ledger.summary("Pendapatan Transfer");
        assert_eq!(summary.pager.page, 1);
        assert_eq!(summary.count, 1);
        assert_eq!(summary.total_label, "Rp 999");
    }

    #[test]
    fn test_view_lists_all_categories() {
        let view = ledger().view(2025);
        assert_eq!(view.categories.len(), 3);
        assert!(view.pdf_available);
        assert_eq!(view.categories[1].kategori, "Pendapatan Transfer");
        assert_eq!(view.categories[1].pager.total_pages, 2);
        assert!(!ledger().view(2024).pdf_available);
    }

    #[test]
    fn test_validate_payload() {
        let mut payload = FinancePayload {
            tahun_anggaran: 2024,
            tanggal_realisasi: "2024-01-02".to_string(),
            kategori: "Belanja Modal".to_string(),
            sub_kategori: "Jalan".to_string(),
            deskripsi: "Pengaspalan".to_string(),
            jumlah: "1500000.00".to_string(),
            sumber_dana: "Dana Desa".to_string(),
            keterangan: None,
        };
        assert!(validate_finance_payload(FinanceKind::Belanja, &payload).is_ok());
        assert!(validate_finance_payload(FinanceKind::Pendapatan, &payload).is_err());

        payload.jumlah = "abc".to_string();
        assert_eq!(
            validate_finance_payload(FinanceKind::Belanja, &payload).unwrap_err().message,
            MSG_FINANCE_REQUIRED
        );
    }

    #[test]
    fn test_delete_messages() {
        let m = FinanceKind::Pendapatan.delete_messages();
        assert_eq!(m.success, "Data pendapatan berhasil dihapus.");
        assert_eq!(m.failure, "Gagal menghapus data pendapatan.");
        assert_eq!(FinanceKind::parse("belanja"), Some(FinanceKind::Belanja));
    }
}
