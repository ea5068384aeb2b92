//! Peta Potensi Desa
//!
//! Sumber data sama dengan peta fasilitas, tapi kategori ekonomi:
//! pertanian→farm, peternakan→farmyard, industri→industrial,
//! wisata→tourism. Nama jalan = tag pertama. Polygon batas desa dari
//! profil desa dibalik dari `[lon, lat]` ke `[lat, lon]`.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::{info, warn};

use crate::core::filter::matches_search;
use crate::core::loader::LoadState;
use crate::models::errors::AppResult;
use crate::models::types::{DesaProfile, PoiFeature};
use crate::providers::client::{Access, DesaApiClient};
use crate::services::fasilitas::category_features;
use crate::utils::constants::{with_id, EP_POI_ALL, EP_PROFIL_DESA};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PotensiCategory {
    Pertanian,
    Peternakan,
    Industri,
    Wisata,
}

impl PotensiCategory {
    pub const ALL: [PotensiCategory; 4] = [
        Self::Pertanian,
        Self::Peternakan,
        Self::Industri,
        Self::Wisata,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Pertanian => "pertanian",
            Self::Peternakan => "peternakan",
            Self::Industri => "industri",
            Self::Wisata => "wisata",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pertanian => "Pertanian",
            Self::Peternakan => "Peternakan",
            Self::Industri => "Industri",
            Self::Wisata => "Wisata",
        }
    }

    /// Map marker amenity
    pub fn amenity(&self) -> &'static str {
        match self {
            Self::Pertanian => "farm",
            Self::Peternakan => "farmyard",
            Self::Industri => "industrial",
            Self::Wisata => "tourism",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.key().eq_ignore_ascii_case(raw.trim()))
    }
}

/// Economic-potential site ready for the map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PotensiSite {
    pub name: String,
    pub category: PotensiCategory,
    pub amenity: &'static str,
    pub street: String,
    pub lat: f64,
    pub lon: f64,
    pub artikel_id: Option<i64>,
}

fn to_site(category: PotensiCategory, feature: PoiFeature) -> Option<PotensiSite> {
    let (lon, lat) = feature.geometry.lon_lat()?;
    let props = feature.properties;
    Some(PotensiSite {
        name: props.name?,
        category,
        amenity: category.amenity(),
        street: props
            .tags
            .and_then(|tags| tags.into_iter().next())
            .unwrap_or_default(),
        lat,
        lon,
        artikel_id: props.artikel_id,
    })
}

/// Sites of the four potential categories; anything invalid is skipped
pub fn parse_sites(collection: &Value) -> Vec<PotensiSite> {
    PotensiCategory::ALL
        .into_iter()
        .flat_map(|c| {
            category_features(collection, c.key())
                .into_iter()
                .filter_map(move |f| to_site(c, f))
        })
        .collect()
}

/// Built-in sample sites served when the demo fallback is enabled
pub fn demo_sites() -> Vec<PotensiSite> {
    let site = |name: &str, category: PotensiCategory, street: &str, lon: f64, lat: f64| PotensiSite {
        name: name.to_string(),
        category,
        amenity: category.amenity(),
        street: street.to_string(),
        lat,
        lon,
        artikel_id: None,
    };
    vec![
        site("Sawah Padi Desa", PotensiCategory::Pertanian, "Jalan Sawah", 107.5105222441776, -6.912986707035502),
        site("Peternakan Ayam", PotensiCategory::Peternakan, "Jalan Peternakan", 107.5115222441776, -6.913986707035502),
        site("Industri Kecil", PotensiCategory::Industri, "Jalan Industri", 107.5125222441776, -6.914986707035502),
        site("Wisata Alam", PotensiCategory::Wisata, "Jalan Wisata", 107.5135222441776, -6.915986707035502),
    ]
}

/// Active categories AND name/street search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PotensiFilter {
    active: BTreeSet<PotensiCategory>,
    query: String,
}

impl Default for PotensiFilter {
    fn default() -> Self {
        Self {
            active: PotensiCategory::ALL.into_iter().collect(),
            query: String::new(),
        }
    }
}

impl PotensiFilter {
    /// From query parameters: `kategori` is a comma list (absent = all)
    pub fn from_params(kategori: Option<&str>, query: Option<&str>) -> Self {
        let mut filter = Self::default();
        if let Some(raw) = kategori.filter(|k| !k.trim().is_empty()) {
            filter.active = raw.split(',').filter_map(PotensiCategory::parse).collect();
        }
        filter.query = query.unwrap_or_default().to_string();
        filter
    }

    pub fn toggle(&mut self, category: PotensiCategory) {
        if !self.active.remove(&category) {
            self.active.insert(category);
        }
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn is_active(&self, category: PotensiCategory) -> bool {
        self.active.contains(&category)
    }

    pub fn matches(&self, site: &PotensiSite) -> bool {
        self.is_active(site.category) && matches_search(&self.query, &[&site.name, &site.street])
    }

    pub fn apply<'a>(&self, sites: &'a [PotensiSite]) -> Vec<&'a PotensiSite> {
        sites.iter().filter(|s| self.matches(s)).collect()
    }
}

/// Village boundary as `[lat, lon]` pairs
pub fn boundary_lat_lon(profile: &DesaProfile) -> Vec<[f64; 2]> {
    profile
        .polygon_desa
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|[lon, lat]| [*lat, *lon])
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryCount {
    pub key: &'static str,
    pub label: &'static str,
    pub active: bool,
    pub count: usize,
}

/// Public potential-map page
#[derive(Debug, Clone, Serialize)]
pub struct PotensiView {
    pub sites: Vec<PotensiSite>,
    pub categories: Vec<CategoryCount>,
    pub boundary: Vec<[f64; 2]>,
    pub demo: bool,
}

impl PotensiView {
    pub fn build(sites: &[PotensiSite], filter: &PotensiFilter, boundary: Vec<[f64; 2]>, demo: bool) -> Self {
        let categories = PotensiCategory::ALL
            .into_iter()
            .map(|c| CategoryCount {
                key: c.key(),
                label: c.label(),
                active: filter.is_active(c),
                count: sites.iter().filter(|s| s.category == c).count(),
            })
            .collect();
        Self {
            sites: filter.apply(sites).into_iter().cloned().collect(),
            categories,
            boundary,
            demo,
        }
    }
}

pub struct PotensiService<'a> {
    client: &'a DesaApiClient,
}

impl<'a> PotensiService<'a> {
    pub fn new(client: &'a DesaApiClient) -> Self {
        Self { client }
    }

    pub async fn fetch_sites(&self) -> AppResult<Vec<PotensiSite>> {
        let body = self.client.get_json(EP_POI_ALL, Access::Public).await?;
        Ok(parse_sites(&body))
    }

    /// Sites plus whether they came from the demo fallback
    pub async fn load_sites(&self) -> LoadState<(Vec<PotensiSite>, bool)> {
        match self.fetch_sites().await {
            Ok(sites) => {
                info!(sites = sites.len(), "🌾 Potential sites loaded");
                LoadState::Ready { data: (sites, false) }
            }
            Err(err) if self.client.config().demo_fallback => {
                warn!(code = err.code_str(), "⚠️ Potential sites unavailable, serving demo data: {}", err);
                LoadState::Ready {
                    data: (demo_sites(), true),
                }
            }
            Err(err) => LoadState::from_result(Err(err), "potensi"),
        }
    }

    /// Boundary polygon; failures only leave the map without an outline
    pub async fn load_boundary(&self) -> Vec<[f64; 2]> {
        let path = with_id(EP_PROFIL_DESA, self.client.config().profile_id);
        let result = match self.client.get_json(&path, Access::Public).await {
            Ok(body) => serde_json::from_value::<DesaProfile>(body).map_err(Into::into),
            Err(err) => Err(err),
        };
        match result {
            Ok(profile) => boundary_lat_lon(&profile),
            Err(err) => {
                warn!(code = err.code_str(), "Village boundary unavailable: {}", err);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_sites() {
        let sites = parse_sites(&json!({
            "pertanian": { "features": [
                { "geometry": { "type": "Point", "coordinates": ["107.5", "-6.9"] },
                  "properties": { "name": "Sawah", "tags": ["Jalan Sawah", "padi"] } },
                { "geometry": { "type": "Point", "coordinates": [107.5, -6.9] },
                  "properties": { "tags": [] } }
            ]},
            "wisata": { "features": [
                { "geometry": { "type": "Point", "coordinates": [107.6, -6.8] },
                  "properties": { "name": "Curug" } }
            ]},
            "sekolah": { "features": [
                { "geometry": { "type": "Point", "coordinates": [1, 2] },
                  "properties": { "name": "SD" } }
            ]}
        }));
        assert_eq!(sites.len(), 2);
        assert_eq!(sites[0].street, "Jalan Sawah");
        assert_eq!(sites[0].amenity, "farm");
        assert_eq!((sites[0].lat, sites[0].lon), (-6.9, 107.5));
        assert_eq!(sites[1].category, PotensiCategory::Wisata);
        assert_eq!(sites[1].street, "");
    }

    #[test]
    fn test_filter_categories_and_search() {
        let sites = demo_sites();
        let mut filter = PotensiFilter::default();
        assert_eq!(filter.apply(&sites).len(), 4);

        filter.set_query("jalan wisata");
        assert_eq!(filter.apply(&sites)[0].name, "Wisata Alam");

        filter.toggle(PotensiCategory::Wisata);
        assert!(filter.apply(&sites).is_empty());

        let filter = PotensiFilter::from_params(Some("pertanian,peternakan"), Some("ayam"));
        let hits = filter.apply(&sites);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].category, PotensiCategory::Peternakan);
    }

    #[test]
    fn test_boundary_swaps_coordinates() {
        let profile: DesaProfile = serde_json::from_value(json!({
            "polygon_desa": [[107.1, -6.1], [107.2, -6.2]]
        }))
        .unwrap();
        assert_eq!(boundary_lat_lon(&profile), vec![[-6.1, 107.1], [-6.2, 107.2]]);
        assert!(boundary_lat_lon(&DesaProfile::default()).is_empty());
    }

    #[test]
    fn test_view_counts_all_sites() {
        let sites = demo_sites();
        let filter = PotensiFilter::from_params(Some("industri"), None);
        let view = PotensiView::build(&sites, &filter, Vec::new(), true);
        assert_eq!(view.sites.len(), 1);
        assert_eq!(view.categories.iter().map(|c| c.count).sum::<usize>(), 4);
        assert!(view.categories[2].active && !view.categories[0].active);
    }
}
