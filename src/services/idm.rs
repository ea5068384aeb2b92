//! IDM (Indeks Desa Membangun)
//!
//! Variabel dikelompokkan IKS/IKE/IKL. Tampilan per tahun: total skor per
//! kelompok dan tabel terpaginasi per kelompok. Ringkasan skor IDM belum
//! punya endpoint; hanya diisi data contoh bila demo fallback aktif.

use serde::Serialize;
use tracing::info;

use crate::core::filter::{available_years, by_year_category, latest_year};
use crate::core::loader::{LoadState, Loader};
use crate::core::mutation::DeleteMessages;
use crate::core::normalize::unwrap_data;
use crate::core::notify::{Notification, Notifier};
use crate::core::pagination::{CategoryPages, PagerView};
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{
    IdmCategory, IdmComponents, IdmGroups, IdmPayload, IdmSummary, IdmVariable, RecordId,
};
use crate::providers::client::{Access, DesaApiClient};
use crate::utils::constants::{record_path, EP_VARIABEL_IDM};

/// Sample headline score used with the demo fallback
pub fn demo_summary() -> IdmSummary {
    IdmSummary {
        tahun: 2024,
        skor_idm: 0.75,
        status_idm: "Maju".to_string(),
        target_status: "Mandiri".to_string(),
        skor_minimal: 0.815,
        penambahan: 0.05,
        komponen: IdmComponents {
            skor_ike: 0.78,
            skor_iks: 0.72,
            skor_ikl: 0.75,
        },
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IdmGroupView {
    pub kategori: IdmCategory,
    pub label: &'static str,
    pub total_skor: f64,
    pub rows: Vec<IdmVariable>,
    pub pager: PagerView,
}

#[derive(Debug, Clone, Serialize)]
pub struct IdmView {
    pub selected_year: Option<i32>,
    pub years: Vec<i32>,
    pub summary: Option<IdmSummary>,
    pub groups: Vec<IdmGroupView>,
}

/// Loaded IDM variables with year/page selection
#[derive(Debug, Clone)]
pub struct IdmBoard {
    variables: Vec<IdmVariable>,
    selected_year: Option<i32>,
    pages: CategoryPages,
    page_size: usize,
    summary: Option<IdmSummary>,
}

impl IdmBoard {
    /// Flatten the three groups; each variable keeps its group as `kategori`
    pub fn new(groups: IdmGroups, page_size: usize, summary: Option<IdmSummary>) -> Self {
        let mut variables = Vec::new();
        for category in IdmCategory::ALL {
            variables.extend(groups.group(category).iter().cloned().map(|mut v| {
                v.kategori = category.key().to_string();
                v
            }));
        }
        let selected_year = summary
            .as_ref()
            .map(|s| s.tahun)
            .or_else(|| latest_year(&variables));
        Self {
            variables,
            selected_year,
            pages: CategoryPages::new(IdmCategory::ALL.iter().map(IdmCategory::key)),
            page_size,
            summary,
        }
    }

    pub fn variables(&self) -> &[IdmVariable] {
        &self.variables
    }

    pub fn selected_year(&self) -> Option<i32> {
        self.selected_year
    }

    pub fn select_year(&mut self, year: i32) {
        self.selected_year = Some(year);
        self.pages.reset_all();
    }

    pub fn set_page(&mut self, category: IdmCategory, page: usize) {
        self.pages.set(category.key(), page);
    }

    pub fn filtered(&self, category: IdmCategory) -> Vec<&IdmVariable> {
        match self.selected_year {
            Some(year) => by_year_category(&self.variables, Some(category.key()), year),
            None => Vec::new(),
        }
    }

    pub fn total_score(&self, category: IdmCategory) -> f64 {
        self.filtered(category).iter().map(|v| v.skor).sum()
    }

    pub fn view(&self) -> IdmView {
        let groups = IdmCategory::ALL
            .into_iter()
            .map(|category| {
                let rows = self.filtered(category);
                let pager = self.pages.pager(category.key(), self.page_size, rows.len());
                IdmGroupView {
                    kategori: category,
                    label: category.label(),
                    total_skor: self.total_score(category),
                    rows: pager.slice(&rows).iter().map(|v| (*v).clone()).collect(),
                    pager: pager.into(),
                }
            })
            .collect();
        IdmView {
            selected_year: self.selected_year,
            years: available_years(&self.variables),
            summary: self.summary.clone(),
            groups,
        }
    }
}

pub fn validate_idm_payload(payload: &IdmPayload) -> AppResult<()> {
    if payload.indikator_idm.trim().is_empty()
        || payload.tahun <= 0
        || !payload.skor.is_finite()
        || payload.skor < 0.0
    {
        return Err(AppError::validation("Indikator, skor, dan tahun wajib diisi"));
    }
    Ok(())
}

pub struct IdmService<'a> {
    client: &'a DesaApiClient,
}

impl<'a> IdmService<'a> {
    pub fn new(client: &'a DesaApiClient) -> Self {
        Self { client }
    }

    pub async fn load(&self) -> LoadState<IdmBoard> {
        let page_size = self.client.config().page_size;
        let summary = self.client.config().demo_fallback.then(demo_summary);
        Loader::new(self.client, "IDM")
            .load(EP_VARIABEL_IDM, Access::Bearer, |body| {
                let groups: IdmGroups = serde_json::from_value(unwrap_data(body))?;
                Ok(groups)
            })
            .await
            .map(|groups| {
                let board = IdmBoard::new(groups, page_size, summary);
                info!(variables = board.variables().len(), "📊 IDM variables loaded");
                board
            })
    }

    pub async fn create(&self, payload: &IdmPayload, notifier: &dyn Notifier) -> AppResult<()> {
        validate_idm_payload(payload)?;
        match self.client.post_json(EP_VARIABEL_IDM, Access::Bearer, payload).await {
            Ok(_) => {
                notifier.notify(Notification::success("Variabel IDM berhasil ditambahkan"));
                Ok(())
            }
            Err(err) => {
                notifier.notify(
                    Notification::error("Gagal menambahkan variabel IDM").with_description(err.message.clone()),
                );
                Err(err)
            }
        }
    }

    pub async fn delete(&self, id: &RecordId) -> AppResult<()> {
        self.client
            .delete(&record_path(EP_VARIABEL_IDM, id)?, Access::Bearer)
            .await
    }

    pub fn delete_messages() -> DeleteMessages {
        DeleteMessages::for_resource("IDM")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn var(id: i64, skor: serde_json::Value, tahun: i32) -> serde_json::Value {
        json!({ "id": id, "indikator_idm": "Skor Akses Sarkes", "skor": skor,
                "keterangan": "", "kegiatan": "", "nilai_plus": 0,
                "pelaksana": ["Pusat"], "kategori": "", "tahun": tahun })
    }

    fn groups() -> IdmGroups {
        serde_json::from_value(json!({
            "IKS": [var(1, json!(4.0), 2024), var(2, json!(3), 2024), var(3, json!(5.0), 2023)],
            "IKE": [var(4, json!("2.5"), 2024)],
            "IKL": []
        }))
        .unwrap()
    }

    #[test]
    fn test_totals_per_group() {
        let board = IdmBoard::new(groups(), 5, None);
        assert_eq!(board.selected_year(), Some(2024));
        assert_eq!(board.total_score(IdmCategory::Iks), 7.0);
        assert_eq!(board.total_score(IdmCategory::Ike), 2.5);
        assert_eq!(board.total_score(IdmCategory::Ikl), 0.0);
        assert_eq!(board.variables()[3].kategori, "IKE");
    }

    #[test]
    fn test_year_change() {
        let mut board = IdmBoard::new(groups(), 1, None);
        board.set_page(IdmCategory::Iks, 2);
        assert_eq!(board.view().groups[0].pager.page, 2);

        board.select_year(2023);
        let view = board.view();
        assert_eq!(view.groups[0].pager.page, 1);
        assert_eq!(view.groups[0].total_skor, 5.0);
        assert_eq!(view.years, vec![2024, 2023]);
    }

    #[test]
    fn test_demo_summary_selects_its_year() {
        let board = IdmBoard::new(groups(), 5, Some(demo_summary()));
        assert_eq!(board.selected_year(), Some(2024));
        assert_eq!(board.view().summary.unwrap().status_idm, "Maju");
    }
}
