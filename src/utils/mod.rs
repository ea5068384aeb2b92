//! Utils Module - Helper Functions & Shared Utilities
//!
//! Berisi konstanta dan fungsi format yang dipakai di seluruh aplikasi.

pub mod constants;
pub mod format;

pub use constants::*;
pub use format::*;
