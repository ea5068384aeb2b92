//! Constants Module - Single Source of Truth
//!
//! Semua endpoint, kategori, dan pesan yang tampil ke pengguna
//! didefinisikan di sini. Modul lain tidak boleh hardcode path API.

use crate::models::errors::{AppError, AppResult};

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "DesaPortal";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent for HTTP requests to the village API
pub const USER_AGENT: &str = concat!("DesaPortal/", env!("CARGO_PKG_VERSION"));

/// Default timeout for remote API requests (seconds)
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 15;

/// Default remote API base URL for local development
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Static header that keeps tunnelled dev backends from serving a warning page
pub const SKIP_BROWSER_WARNING_HEADER: &str = "ngrok-skip-browser-warning";

/// Default value for [`SKIP_BROWSER_WARNING_HEADER`]
pub const SKIP_BROWSER_WARNING_VALUE: &str = "69420";

// ============================================
// SESSION
// ============================================

/// Storage key (and cookie name) holding the bearer token
pub const AUTH_TOKEN_KEY: &str = "authToken";

/// Login view
pub const ROUTE_LOGIN: &str = "/login";

/// Admin facility list (target after facility edit)
pub const ROUTE_ADMIN_FASILITAS: &str = "/admin/fasilitas";

// ============================================
// PAGINATION
// ============================================

/// Rows per in-memory table page
pub const ITEMS_PER_PAGE: usize = 5;

/// Upper bound on remote pages followed while collecting a full list
pub const MAX_REMOTE_PAGES: u32 = 500;

// ============================================
// ENDPOINTS
// ============================================

pub const EP_LOGIN: &str = "/api/login";
pub const EP_CURRENT_USER: &str = "/user";
pub const EP_SURAT: &str = "/api/surat";
pub const EP_ARTIKEL: &str = "/api/artikel";
pub const EP_ARTIKEL_STATS: &str = "/api/artikel/stats";
pub const EP_PENGADUAN: &str = "/api/pengaduan";
pub const EP_PUBLIK_PENGADUAN: &str = "/api/publik/pengaduan";
pub const EP_PENDAPATAN: &str = "/api/pendapatan";
pub const EP_BELANJA: &str = "/api/belanja";
pub const EP_APBDESA_MULTI_TAHUN: &str = "/api/publik/apbdesa/multi-tahun";
pub const EP_APBDESA_PDF: &str = "/api/publik/apb-desa/pdf";
pub const EP_VARIABEL_IDM: &str = "/api/variabel-idm";
pub const EP_POI_ALL: &str = "/api/publik/map/poi/all";
pub const EP_POI: &str = "/api/map/poi";
pub const EP_PROFIL_DESA: &str = "/api/publik/profil-desa";

// ============================================
// STATUS VALUES
// ============================================

/// Status of a freshly submitted letter / article / complaint
pub const STATUS_DIAJUKAN: &str = "Diajukan";

/// Approved article status (compared case-insensitively)
pub const STATUS_DISETUJUI: &str = "disetujui";

/// Envelope status of a successful paginated response
pub const ENVELOPE_SUCCESS: &str = "success";

// ============================================
// CATEGORIES
// ============================================

pub const PENDAPATAN_CATEGORIES: [&str; 3] = [
    "Pendapatan Asli Desa",
    "Pendapatan Transfer",
    "Pendapatan Lain-lain",
];

pub const BELANJA_CATEGORIES: [&str; 3] = [
    "Belanja Barang/Jasa",
    "Belanja Modal",
    "Belanja Tak Terduga",
];

// ============================================
// ATTACHMENTS
// ============================================

/// Maximum size of one complaint attachment (2 MiB)
pub const MAX_MEDIA_BYTES: usize = 2 * 1024 * 1024;

/// Multipart field name for complaint attachments
pub const MEDIA_FIELD: &str = "media[]";

// ============================================
// USER-FACING MESSAGES
// ============================================

pub const MSG_TOKEN_MISSING: &str = "Token tidak ditemukan. Silakan login kembali.";
pub const MSG_SESSION_EXPIRED: &str = "Sesi Anda telah berakhir. Silakan login kembali.";
pub const MSG_NOT_FOUND: &str = "Endpoint API tidak ditemukan (404).";
pub const MSG_UNKNOWN_ERROR: &str = "Terjadi kesalahan yang tidak diketahui.";

pub const MSG_PHONE_INVALID: &str = "Nomor telepon harus berupa angka dan minimal 10 digit";
pub const MSG_CATEGORY_REQUIRED: &str = "Kategori pengaduan harus dipilih";
pub const MSG_COMPLAINT_REQUIRED: &str = "Nama dan detail pengaduan wajib diisi";
pub const MSG_MEDIA_TOO_LARGE: &str = "Ukuran file maksimal 2MB";
pub const MSG_COMPLAINT_SENT: &str = "Pengaduan berhasil dikirim!";
pub const MSG_COMPLAINT_SENT_DETAIL: &str =
    "Petugas desa akan segera menindaklanjuti laporan Anda.";
pub const MSG_COMPLAINT_FAILED: &str = "Gagal mengirim pengaduan";
pub const MSG_COMPLAINT_FAILED_DETAIL: &str =
    "Terjadi kesalahan saat mengirim pengaduan. Silakan coba lagi.";

pub const MSG_FACILITY_REQUIRED: &str = "Nama, kategori, alamat, dan koordinat wajib diisi";
pub const MSG_FACILITY_NOT_FOUND: &str = "Data fasilitas tidak ditemukan";
pub const MSG_FACILITY_LOAD_FAILED: &str = "Gagal mengambil data fasilitas";
pub const MSG_FACILITY_UPDATED: &str = "Fasilitas berhasil diperbarui";
pub const MSG_FACILITY_UPDATE_FAILED: &str = "Gagal memperbarui fasilitas";
pub const MSG_FACILITY_CREATED: &str = "Fasilitas berhasil ditambahkan";
pub const MSG_FACILITY_CREATE_FAILED: &str = "Gagal menambahkan fasilitas";
pub const MSG_ARTICLES_LOAD_FAILED: &str = "Gagal mengambil data artikel. Cek koneksi ke backend.";

pub const MSG_FINANCE_REQUIRED: &str = "Semua field wajib diisi dengan benar";
pub const MSG_FINANCE_CREATED: &str = "Data berhasil ditambahkan";
pub const MSG_FINANCE_CREATE_FAILED: &str = "Gagal menambahkan data";

pub const MSG_PDF_CURRENT_YEAR: &str = "PDF tidak tersedia untuk tahun berjalan";
pub const MSG_PDF_DOWNLOADING: &str = "Mengunduh PDF APB Desa...";
pub const MSG_PDF_DOWNLOADING_DETAIL: &str = "Dokumen akan segera diunduh";
pub const MSG_PDF_DOWNLOADED: &str = "PDF berhasil diunduh";
pub const MSG_PDF_DOWNLOADED_DETAIL: &str = "Dokumen APB Desa berhasil diunduh";
pub const MSG_PDF_FAILED: &str = "Gagal mengunduh PDF";
pub const MSG_PDF_FAILED_DETAIL: &str = "Silakan coba lagi beberapa saat";

pub const MSG_DASHBOARD_FAILED: &str = "Gagal mengambil data dashboard";

/// Build an endpoint path with a trailing id segment
pub fn with_id(endpoint: &str, id: impl std::fmt::Display) -> String {
    format!("{}/{}", endpoint, id)
}

/// Path of one remote record. The id must be a single plain segment
/// (`A-Z a-z 0-9 - _`), otherwise nothing is sent.
pub fn record_path(endpoint: &str, id: impl std::fmt::Display) -> AppResult<String> {
    let id = id.to_string();
    let id = id.trim();
    let plain = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_';
    if id.is_empty() || !id.chars().all(plain) {
        return Err(AppError::validation(format!("ID data tidak valid: {:?}", id)));
    }
    Ok(with_id(endpoint, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::errors::ErrorCode;

    #[test]
    fn test_with_id() {
        assert_eq!(with_id(EP_PENDAPATAN, 7), "/api/pendapatan/7");
        assert_eq!(with_id(EP_APBDESA_PDF, 2023), "/api/publik/apb-desa/pdf/2023");
    }

    #[test]
    fn test_record_path_plain_segment() {
        assert_eq!(record_path(EP_POI, " 12 ").unwrap(), "/api/map/poi/12");
        assert_eq!(record_path(EP_PENGADUAN, "a1-b_2").unwrap(), "/api/pengaduan/a1-b_2");
    }

    #[test]
    fn test_record_path_rejects_extra_segments() {
        for id in ["5?force=1", "../../users/1", "5#frag", "5/6", "%2e%2e", ""] {
            let err = record_path(EP_PENGADUAN, id).unwrap_err();
            assert_eq!(err.code, ErrorCode::ValidationFailed, "id {:?}", id);
        }
    }

    #[test]
    fn test_media_limit_is_two_mebibytes() {
        assert_eq!(MAX_MEDIA_BYTES, 2_097_152);
    }
}
