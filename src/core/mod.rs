//! Core Module - pola fetch/loading/error/pagination yang dipakai semua view
//!
//! Session, navigasi, notifikasi, normalisasi response, loader generik,
//! pagination, filter, dan alur hapus dengan konfirmasi.

pub mod filter;
pub mod loader;
pub mod mutation;
pub mod navigation;
pub mod normalize;
pub mod notify;
pub mod pagination;
pub mod session;

pub use filter::*;
pub use loader::*;
pub use mutation::*;
pub use navigation::*;
pub use normalize::*;
pub use notify::*;
pub use pagination::*;
pub use session::*;
