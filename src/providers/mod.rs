//! Providers Module - External Data Sources
//!
//! Jalur data ke REST API desa.

pub mod client;

pub use client::*;
