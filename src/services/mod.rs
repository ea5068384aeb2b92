//! Services Module - satu service per halaman/resource

pub mod dashboard;
pub mod fasilitas;
pub mod idm;
pub mod keuangan;
pub mod pengaduan;
pub mod potensi;
pub mod user;

pub use dashboard::*;
pub use fasilitas::*;
pub use idm::*;
pub use keuangan::*;
pub use pengaduan::*;
pub use potensi::*;
pub use user::*;
