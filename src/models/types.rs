//! Type definitions for the village portal
//!
//! Record mirror dari response API desa. Client tidak memegang state
//! otoritatif, jadi tipe di sini hanya untuk tampilan dan payload request.
//! API kadang mengirim angka sebagai string ("1500000.00", "-6.91"), maka
//! beberapa field memakai deserializer yang longgar.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// ============================================
// Identifiers & lenient number handling
// ============================================

/// Record id as sent by the API: numeric for most resources, string for some
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Num(i64),
    Text(String),
}

impl RecordId {
    /// Compare against a path segment ("12" matches `Num(12)`)
    pub fn matches(&self, raw: &str) -> bool {
        self.to_string() == raw.trim()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self::Num(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        match value.trim().parse::<i64>() {
            Ok(n) => Self::Num(n),
            Err(_) => Self::Text(value.to_string()),
        }
    }
}

/// Number that may arrive as a JSON number or a numeric string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FlexNumber {
    Int(i64),
    Float(f64),
    Text(String),
}

impl FlexNumber {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(f) => Some(*f).filter(|v| v.is_finite()),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }
}

pub(crate) fn de_f64_lenient<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<FlexNumber>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_f64()).unwrap_or(0.0))
}

pub(crate) fn de_i32_lenient<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = FlexNumber::deserialize(deserializer)?;
    value
        .as_f64()
        .map(|v| v as i32)
        .ok_or_else(|| serde::de::Error::custom("expected a year"))
}

/// Keep decimal amounts as the original string; numbers are rendered back to text
pub(crate) fn de_amount_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<FlexNumber>::deserialize(deserializer)?;
    Ok(match value {
        Some(FlexNumber::Int(n)) => n.to_string(),
        Some(FlexNumber::Float(f)) => f.to_string(),
        Some(FlexNumber::Text(s)) => s,
        None => "0".to_string(),
    })
}

fn de_string_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================
// Complaints (Pengaduan)
// ============================================

/// Complaint categories offered by the public form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComplaintCategory {
    Umum,
    Sosial,
    Keamanan,
    Kesehatan,
    Kebersihan,
    Permintaan,
}

impl ComplaintCategory {
    pub const ALL: [ComplaintCategory; 6] = [
        Self::Umum,
        Self::Sosial,
        Self::Keamanan,
        Self::Kesehatan,
        Self::Kebersihan,
        Self::Permintaan,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Umum => "Umum",
            Self::Sosial => "Sosial",
            Self::Keamanan => "Keamanan",
            Self::Kesehatan => "Kesehatan",
            Self::Kebersihan => "Kebersihan",
            Self::Permintaan => "Permintaan",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == raw.trim())
    }
}

/// Complaint as listed for admins
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pengaduan {
    pub id: RecordId,
    #[serde(default, deserialize_with = "de_string_or_default")]
    pub nama: String,
    #[serde(default, deserialize_with = "de_string_or_default")]
    pub nomor_telepon: String,
    #[serde(default, deserialize_with = "de_string_or_default")]
    pub kategori: String,
    #[serde(default, deserialize_with = "de_string_or_default")]
    pub detail_pengaduan: String,
    #[serde(default)]
    pub media: Vec<serde_json::Value>,
    #[serde(default, deserialize_with = "de_string_or_default")]
    pub status: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

// ============================================
// Finance (Pendapatan / Belanja)
// ============================================

/// Owner of a finance record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordOwner {
    pub id: RecordId,
    #[serde(default)]
    pub name: String,
}

/// Income or expense line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinanceRecord {
    #[serde(alias = "id_pendapatan", alias = "id_belanja")]
    pub id: RecordId,
    #[serde(deserialize_with = "de_i32_lenient")]
    pub tahun_anggaran: i32,
    #[serde(default, deserialize_with = "de_string_or_default")]
    pub tanggal_realisasi: String,
    pub kategori: String,
    #[serde(default, deserialize_with = "de_string_or_default")]
    pub sub_kategori: String,
    #[serde(default, deserialize_with = "de_string_or_default")]
    pub deskripsi: String,
    /// Decimal string, e.g. "1500000.00"
    #[serde(default, deserialize_with = "de_amount_string")]
    pub jumlah: String,
    #[serde(default, deserialize_with = "de_string_or_default")]
    pub sumber_dana: String,
    #[serde(default)]
    pub keterangan: Option<String>,
    #[serde(default)]
    pub user: Option<RecordOwner>,
}

/// Body for creating an income/expense line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancePayload {
    pub tahun_anggaran: i32,
    pub tanggal_realisasi: String,
    pub kategori: String,
    pub sub_kategori: String,
    pub deskripsi: String,
    pub jumlah: String,
    pub sumber_dana: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keterangan: Option<String>,
}

/// Per-year APBDesa summary from the multi-year endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApbDesaYear {
    #[serde(deserialize_with = "de_i32_lenient")]
    pub tahun_anggaran: i32,
    #[serde(default, deserialize_with = "de_f64_lenient")]
    pub total_pendapatan: f64,
    #[serde(default, deserialize_with = "de_f64_lenient")]
    pub total_belanja: f64,
    #[serde(default, deserialize_with = "de_f64_lenient")]
    pub saldo_sisa: f64,
}

// ============================================
// Map: facilities and potential sites
// ============================================

/// Facility categories of the public facility map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoiCategory {
    Sekolah,
    TempatIbadah,
    Kesehatan,
    FasilitasLainnya,
}

impl PoiCategory {
    pub const ALL: [PoiCategory; 4] = [
        Self::Sekolah,
        Self::TempatIbadah,
        Self::Kesehatan,
        Self::FasilitasLainnya,
    ];

    /// Key used by the API collection and request bodies
    pub fn key(&self) -> &'static str {
        match self {
            Self::Sekolah => "sekolah",
            Self::TempatIbadah => "tempat_ibadah",
            Self::Kesehatan => "kesehatan",
            Self::FasilitasLainnya => "fasilitas_lainnya",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Sekolah => "Sekolah",
            Self::TempatIbadah => "Tempat Ibadah",
            Self::Kesehatan => "Kesehatan",
            Self::FasilitasLainnya => "Fasilitas Lainnya",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == raw.trim())
    }
}

/// Raw GeoJSON-ish feature from `/api/publik/map/poi/all`
#[derive(Debug, Clone, Deserialize)]
pub struct PoiFeature {
    pub geometry: PoiGeometry,
    pub properties: PoiProperties,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoiGeometry {
    #[serde(rename = "type", default)]
    pub kind: String,
    /// `[lon, lat]`, each a number or numeric string
    #[serde(default)]
    pub coordinates: Vec<FlexNumber>,
}

impl PoiGeometry {
    /// `(lon, lat)` when this is a point with two numeric coordinates
    pub fn lon_lat(&self) -> Option<(f64, f64)> {
        if self.kind != "Point" || self.coordinates.len() < 2 {
            return None;
        }
        Some((self.coordinates[0].as_f64()?, self.coordinates[1].as_f64()?))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PoiProperties {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub kategori: Option<String>,
    #[serde(default)]
    pub alamat: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub artikel_id: Option<i64>,
}

/// Facility normalized for display and editing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub id: RecordId,
    pub name: String,
    pub category: PoiCategory,
    pub address: String,
    pub tags: Vec<String>,
    pub lat: f64,
    pub lon: f64,
    pub artikel_id: Option<i64>,
}

/// Body for creating/updating a facility
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityPayload {
    pub nama: String,
    pub kategori: String,
    pub lat: f64,
    pub lon: f64,
    pub alamat: String,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artikel_id: Option<i64>,
}

/// Village profile subset used by the maps
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DesaProfile {
    /// Boundary as `[lon, lat]` pairs
    #[serde(default)]
    pub polygon_desa: Option<Vec<[f64; 2]>>,
}

// ============================================
// Articles & letters
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artikel {
    pub id_artikel: i64,
    #[serde(default, deserialize_with = "de_string_or_default")]
    pub judul_artikel: String,
    #[serde(default)]
    pub status_artikel: Option<String>,
}

/// Approved article offered as a link target for map points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleOption {
    pub id: i64,
    pub judul: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Surat {
    pub id_surat: RecordId,
    #[serde(default, deserialize_with = "de_string_or_default")]
    pub status_surat: String,
}

// ============================================
// IDM (Indeks Desa Membangun)
// ============================================

/// The three IDM component groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IdmCategory {
    #[serde(rename = "IKS")]
    Iks,
    #[serde(rename = "IKE")]
    Ike,
    #[serde(rename = "IKL")]
    Ikl,
}

impl IdmCategory {
    pub const ALL: [IdmCategory; 3] = [Self::Iks, Self::Ike, Self::Ikl];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Iks => "IKS",
            Self::Ike => "IKE",
            Self::Ikl => "IKL",
        }
    }

    /// Social, economic and ecological resilience
    pub fn label(&self) -> &'static str {
        match self {
            Self::Iks => "Indeks Ketahanan Sosial",
            Self::Ike => "Indeks Ketahanan Ekonomi",
            Self::Ikl => "Indeks Ketahanan Lingkungan",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.key().eq_ignore_ascii_case(raw.trim()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdmVariable {
    pub id: RecordId,
    #[serde(default, deserialize_with = "de_string_or_default")]
    pub indikator_idm: String,
    #[serde(default, deserialize_with = "de_f64_lenient")]
    pub skor: f64,
    #[serde(default, deserialize_with = "de_string_or_default")]
    pub keterangan: String,
    #[serde(default, deserialize_with = "de_string_or_default")]
    pub kegiatan: String,
    #[serde(default, deserialize_with = "de_f64_lenient")]
    pub nilai_plus: f64,
    #[serde(default)]
    pub pelaksana: Vec<String>,
    #[serde(default, deserialize_with = "de_string_or_default")]
    pub kategori: String,
    #[serde(deserialize_with = "de_i32_lenient")]
    pub tahun: i32,
}

/// `data` of `/api/variabel-idm`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdmGroups {
    #[serde(rename = "IKS", default)]
    pub iks: Vec<IdmVariable>,
    #[serde(rename = "IKE", default)]
    pub ike: Vec<IdmVariable>,
    #[serde(rename = "IKL", default)]
    pub ikl: Vec<IdmVariable>,
}

impl IdmGroups {
    pub fn group(&self, category: IdmCategory) -> &[IdmVariable] {
        match category {
            IdmCategory::Iks => &self.iks,
            IdmCategory::Ike => &self.ike,
            IdmCategory::Ikl => &self.ikl,
        }
    }
}

/// Body for creating an IDM variable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdmPayload {
    pub indikator_idm: String,
    pub skor: f64,
    pub keterangan: String,
    pub kegiatan: String,
    #[serde(default)]
    pub nilai_plus: f64,
    pub pelaksana: Vec<String>,
    pub kategori: IdmCategory,
    pub tahun: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdmComponents {
    pub skor_ike: f64,
    pub skor_iks: f64,
    pub skor_ikl: f64,
}

/// Headline IDM score of a year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdmSummary {
    pub tahun: i32,
    pub skor_idm: f64,
    pub status_idm: String,
    pub target_status: String,
    pub skor_minimal: f64,
    pub penambahan: f64,
    pub komponen: IdmComponents,
}

// ============================================
// Account
// ============================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentUser {
    #[serde(default, deserialize_with = "de_string_or_default")]
    pub name: String,
    #[serde(default, deserialize_with = "de_string_or_default")]
    pub email: String,
}
