//! Desa Portal Library
//!
//! Portal administrasi desa di atas REST API desa:
//! - Halaman publik: peta fasilitas, potensi desa, unduh PDF APBDesa, pengaduan
//! - Halaman admin: dashboard, pendapatan/belanja, IDM, pengaduan, fasilitas
//!
//! Struktur modul:
//! - `models`: config, error, tipe data API
//! - `providers`: HTTP client ke REST API desa
//! - `core`: session, navigasi, notifikasi, loader, pagination, filter
//! - `services`: logika per halaman
//! - `api`: view server (axum)

pub mod api;
pub mod core;
pub mod models;
pub mod providers;
pub mod services;
pub mod utils;

pub use crate::core::loader::{LoadFailure, LoadState, Loader};
pub use crate::core::navigation::{Navigator, RecordingNavigator, SessionGuard};
pub use crate::core::notify::{Notification, Notifier, RecordingNotifier};
pub use crate::core::session::{FileSession, MemorySession, SessionStore};
pub use models::config::{ApiConfig, PortalConfig};
pub use models::errors::{AppError, AppResult, ErrorCode};
pub use providers::client::{Access, DesaApiClient};
