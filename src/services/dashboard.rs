//! Dashboard admin - ringkasan surat, artikel, pengaduan, keuangan
//!
//! Lima request dijalankan bersamaan. Kegagalan apa pun (termasuk data
//! keuangan kosong) menghasilkan statistik nol + pesan error.

use futures_util::future::try_join5;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::core::normalize::{describe, locate_list, normalize_list};
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::ApbDesaYear;
use crate::providers::client::{Access, DesaApiClient};
use crate::utils::constants::{
    EP_APBDESA_MULTI_TAHUN, EP_ARTIKEL, EP_ARTIKEL_STATS, EP_PENGADUAN, EP_SURAT,
    MSG_DASHBOARD_FAILED, STATUS_DIAJUKAN,
};
use crate::utils::format::format_rupiah;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub total: u64,
    pub diajukan: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FinanceStats {
    pub tahun: i32,
    pub pendapatan: f64,
    pub belanja: f64,
    pub saldo: f64,
    pub pendapatan_label: String,
    pub belanja_label: String,
    pub saldo_label: String,
}

impl From<&ApbDesaYear> for FinanceStats {
    fn from(y: &ApbDesaYear) -> Self {
        Self {
            tahun: y.tahun_anggaran,
            pendapatan: y.total_pendapatan,
            belanja: y.total_belanja,
            saldo: y.saldo_sisa,
            pendapatan_label: format_rupiah(y.total_pendapatan),
            belanja_label: format_rupiah(y.total_belanja),
            saldo_label: format_rupiah(y.saldo_sisa),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub surat: StatusCount,
    pub artikel: StatusCount,
    pub pengaduan: StatusCount,
    pub keuangan: FinanceStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub stats: DashboardStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Total and "Diajukan" count of a list in any envelope shape
pub fn count_by_status(body: &Value, status_field: &str) -> AppResult<StatusCount> {
    let (items, _) = locate_list(body)?;
    Ok(StatusCount {
        total: items.len() as u64,
        diajukan: items
            .iter()
            .filter(|i| i.get(status_field).and_then(Value::as_str) == Some(STATUS_DIAJUKAN))
            .count() as u64,
    })
}

/// Articles: total from the paginated list, submitted from the stats endpoint
pub fn article_count(list: &Value, stats: &Value) -> StatusCount {
    let read = |v: &Value, ptr: &str| v.pointer(ptr).and_then(Value::as_u64).unwrap_or(0);
    StatusCount {
        total: read(list, "/data/total"),
        diajukan: read(stats, "/data/diajukan"),
    }
}

/// Latest fiscal year of the multi-year summary
pub fn latest_finance(body: Value) -> AppResult<FinanceStats> {
    let found = describe(&body);
    let years = normalize_list::<ApbDesaYear>(body)?.items;
    years
        .iter()
        .max_by_key(|y| y.tahun_anggaran)
        .map(FinanceStats::from)
        .ok_or_else(|| {
            AppError::new(
                ErrorCode::ApiNotFound,
                format!("Data keuangan tidak ditemukan ({})", found),
            )
        })
}

pub struct DashboardService<'a> {
    client: &'a DesaApiClient,
}

impl<'a> DashboardService<'a> {
    pub fn new(client: &'a DesaApiClient) -> Self {
        Self { client }
    }

    pub async fn fetch_stats(&self) -> AppResult<DashboardStats> {
        let c = self.client;
        let (surat, artikel_list, artikel_stats, pengaduan, keuangan) = try_join5(
            c.get_json(EP_SURAT, Access::Bearer),
            c.get_json(EP_ARTIKEL, Access::Bearer),
            c.get_json(EP_ARTIKEL_STATS, Access::Bearer),
            c.get_json(EP_PENGADUAN, Access::Bearer),
            c.get_json(EP_APBDESA_MULTI_TAHUN, Access::Bearer),
        )
        .await?;

        Ok(DashboardStats {
            surat: count_by_status(&surat, "status_surat")?,
            artikel: article_count(&artikel_list, &artikel_stats),
            pengaduan: count_by_status(&pengaduan, "status")?,
            keuangan: latest_finance(keuangan)?,
        })
    }

    /// Never fails: errors become zeroed stats plus a message
    pub async fn load(&self) -> DashboardView {
        match self.fetch_stats().await {
            Ok(stats) => {
                info!(
                    surat = stats.surat.total,
                    pengaduan = stats.pengaduan.total,
                    tahun = stats.keuangan.tahun,
                    "📈 Dashboard loaded"
                );
                DashboardView { stats, error: None }
            }
            Err(err) => {
                warn!(code = err.code_str(), "Dashboard failed: {}", err);
                DashboardView {
                    stats: DashboardStats::default(),
                    error: Some(MSG_DASHBOARD_FAILED.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_count_by_status_either_shape() {
        let bare = json!([{ "status": "Diajukan" }, { "status": "Selesai" }]);
        assert_eq!(
            count_by_status(&bare, "status").unwrap(),
            StatusCount { total: 2, diajukan: 1 }
        );
        let wrapped = json!({ "data": [{ "status_surat": "Diajukan" }] });
        assert_eq!(count_by_status(&wrapped, "status_surat").unwrap().diajukan, 1);
        assert!(count_by_status(&json!({ "ok": true }), "status").is_err());
    }

    #[test]
    fn test_article_count() {
        let count = article_count(
            &json!({ "data": { "data": [], "total": 42 } }),
            &json!({ "data": { "diajukan": 3 } }),
        );
        assert_eq!(count, StatusCount { total: 42, diajukan: 3 });
        assert_eq!(article_count(&json!({}), &json!(null)), StatusCount::default());
    }

    #[test]
    fn test_latest_finance() {
        let stats = latest_finance(json!({ "data": [
            { "tahun_anggaran": 2023, "total_pendapatan": "100", "total_belanja": "50", "saldo_sisa": "50" },
            { "tahun_anggaran": 2024, "total_pendapatan": "1250000.00", "total_belanja": 250000, "saldo_sisa": "1000000" }
        ]}))
        .unwrap();
        assert_eq!(stats.tahun, 2024);
        assert_eq!(stats.pendapatan_label, "Rp 1.250.000");
        assert_eq!(stats.saldo, 1_000_000.0);

        assert!(latest_finance(json!({ "data": [] })).is_err());
    }
}
