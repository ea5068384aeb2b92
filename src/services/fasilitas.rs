//! Peta Fasilitas - POI sekolah, tempat ibadah, kesehatan, lainnya
//!
//! Koleksi publik `/api/publik/map/poi/all` berbentuk
//! `{ "<kategori>": { "features": [...] } }`. Koordinat `[lon, lat]` bisa
//! angka atau string. Feature yang tidak valid dilewati, bukan menggagalkan
//! seluruh peta.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::core::loader::{LoadState, Loader};
use crate::core::normalize::{describe, normalize_list, ShapeMismatch};
use crate::core::notify::{Notification, Notifier};
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{
    ArticleOption, Artikel, Facility, FacilityPayload, PoiCategory, PoiFeature, RecordId,
};
use crate::providers::client::{Access, DesaApiClient};
use crate::utils::constants::{
    record_path, EP_ARTIKEL, EP_POI, EP_POI_ALL, MSG_ARTICLES_LOAD_FAILED, MSG_FACILITY_CREATED,
    MSG_FACILITY_CREATE_FAILED, MSG_FACILITY_LOAD_FAILED, MSG_FACILITY_NOT_FOUND,
    MSG_FACILITY_REQUIRED, MSG_FACILITY_UPDATED, MSG_FACILITY_UPDATE_FAILED,
    ROUTE_ADMIN_FASILITAS, STATUS_DISETUJUI,
};

/// Features of one category array, skipping anything unusable
pub(crate) fn category_features(collection: &Value, key: &str) -> Vec<PoiFeature> {
    let Some(features) = collection
        .get(key)
        .and_then(|c| c.get("features"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    features
        .iter()
        .filter_map(|raw| match serde_json::from_value::<PoiFeature>(raw.clone()) {
            Ok(feature) => Some(feature),
            Err(e) => {
                debug!(category = key, error = %e, "Skipping malformed feature");
                None
            }
        })
        .collect()
}

fn to_facility(group: PoiCategory, feature: PoiFeature) -> Option<Facility> {
    let (lon, lat) = feature.geometry.lon_lat()?;
    let props = feature.properties;
    let category = props
        .kategori
        .as_deref()
        .and_then(PoiCategory::parse)
        .unwrap_or(group);
    Some(Facility {
        id: props.id?,
        name: props.name.unwrap_or_default(),
        category,
        address: props.alamat.unwrap_or_default(),
        tags: props.tags.unwrap_or_default(),
        lat,
        lon,
        artikel_id: props.artikel_id,
    })
}

/// Public facility collection grouped by category
#[derive(Debug, Clone, Default)]
pub struct FacilityMap {
    groups: BTreeMap<PoiCategory, Vec<Facility>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FacilityGroupView {
    pub key: &'static str,
    pub label: &'static str,
    pub count: usize,
    pub items: Vec<Facility>,
}

impl FacilityMap {
    pub fn from_value(collection: &Value) -> AppResult<Self> {
        if !collection.is_object() {
            return Err(ShapeMismatch {
                expected: "object keyed by category",
                found: describe(collection),
            }
            .into());
        }

        let mut groups = BTreeMap::new();
        for category in PoiCategory::ALL {
            let items: Vec<Facility> = category_features(collection, category.key())
                .into_iter()
                .filter_map(|f| to_facility(category, f))
                .collect();
            groups.insert(category, items);
        }
        Ok(Self { groups })
    }

    pub fn category(&self, category: PoiCategory) -> &[Facility] {
        self.groups.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Locate by id across every category
    pub fn find(&self, id: &str) -> Option<&Facility> {
        self.groups.values().flatten().find(|f| f.id.matches(id))
    }

    pub fn total(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn view(&self) -> Vec<FacilityGroupView> {
        PoiCategory::ALL
            .into_iter()
            .map(|c| FacilityGroupView {
                key: c.key(),
                label: c.label(),
                count: self.category(c).len(),
                items: self.category(c).to_vec(),
            })
            .collect()
    }
}

/// Create/edit form state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacilityForm {
    pub nama: String,
    pub kategori: Option<PoiCategory>,
    pub alamat: String,
    pub tags: Vec<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub artikel_id: Option<i64>,
}

impl FacilityForm {
    pub fn from_facility(f: &Facility) -> Self {
        Self {
            nama: f.name.clone(),
            kategori: Some(f.category),
            alamat: f.address.clone(),
            tags: f.tags.clone(),
            lat: Some(f.lat),
            lon: Some(f.lon),
            artikel_id: f.artikel_id,
        }
    }

    /// Add a trimmed tag; blanks and duplicates are ignored
    pub fn add_tag(&mut self, raw: &str) -> bool {
        let tag = raw.trim();
        if tag.is_empty() || self.tags.iter().any(|t| t == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    pub fn remove_tag(&mut self, tag: &str) {
        self.tags.retain(|t| t != tag);
    }

    pub fn set_location(&mut self, lat: f64, lon: f64) {
        self.lat = Some(lat);
        self.lon = Some(lon);
    }

    /// Request body; a zero or missing coordinate counts as unset
    pub fn to_payload(&self) -> AppResult<FacilityPayload> {
        let coord = |v: Option<f64>| v.filter(|c| c.is_finite() && *c != 0.0);
        let (Some(kategori), Some(lat), Some(lon)) = (self.kategori, coord(self.lat), coord(self.lon))
        else {
            return Err(AppError::validation(MSG_FACILITY_REQUIRED));
        };
        if self.nama.trim().is_empty() || self.alamat.trim().is_empty() {
            return Err(AppError::validation(MSG_FACILITY_REQUIRED));
        }

        let mut tags: Vec<String> = Vec::with_capacity(self.tags.len());
        for tag in self.tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
            if !tags.iter().any(|t| t == tag) {
                tags.push(tag.to_string());
            }
        }

        Ok(FacilityPayload {
            nama: self.nama.clone(),
            kategori: kategori.key().to_string(),
            lat,
            lon,
            alamat: self.alamat.clone(),
            tags,
            artikel_id: self.artikel_id,
        })
    }
}

/// Approved articles only (case-insensitive status)
pub fn approved_articles(items: Vec<Artikel>) -> Vec<ArticleOption> {
    items
        .into_iter()
        .filter(|a| {
            a.status_artikel
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case(STATUS_DISETUJUI))
        })
        .map(|a| ArticleOption {
            id: a.id_artikel,
            judul: a.judul_artikel,
        })
        .collect()
}

pub struct FacilityService<'a> {
    client: &'a DesaApiClient,
}

impl<'a> FacilityService<'a> {
    pub fn new(client: &'a DesaApiClient) -> Self {
        Self { client }
    }

    pub async fn fetch_map(&self, access: Access) -> AppResult<FacilityMap> {
        let body = self.client.get_json(EP_POI_ALL, access).await?;
        FacilityMap::from_value(&body)
    }

    /// Public map
    pub async fn load_map(&self) -> LoadState<FacilityMap> {
        Loader::new(self.client, "fasilitas")
            .load(EP_POI_ALL, Access::Public, |body| FacilityMap::from_value(&body))
            .await
    }

    /// Prefill the edit form. Missing facility → `Ok(None)`; a failed fetch
    /// keeps its error. Both notify and point back to the facility list.
    pub async fn load_for_edit(&self, id: &str, notifier: &dyn Notifier) -> AppResult<Option<FacilityForm>> {
        let map = match self.fetch_map(Access::Optional).await {
            Ok(map) => map,
            Err(err) => {
                warn!(id, code = err.code_str(), "Facility fetch failed: {}", err);
                notifier.notify(Notification::error(MSG_FACILITY_LOAD_FAILED));
                self.client.guard().redirect(ROUTE_ADMIN_FASILITAS);
                return Err(err);
            }
        };

        match map.find(id) {
            Some(facility) => Ok(Some(FacilityForm::from_facility(facility))),
            None => {
                warn!(id, "Facility not found");
                notifier.notify(Notification::error(MSG_FACILITY_NOT_FOUND));
                self.client.guard().redirect(ROUTE_ADMIN_FASILITAS);
                Ok(None)
            }
        }
    }

    /// PUT the edited facility, then back to the list on success
    pub async fn update(&self, id: &str, form: &FacilityForm, notifier: &dyn Notifier) -> AppResult<()> {
        let path = record_path(EP_POI, id)?;
        let payload = validated(form, notifier)?;
        match self.client.put_json(&path, Access::Bearer, &payload).await {
            Ok(_) => {
                info!(id, "📍 Facility updated");
                notifier.notify(Notification::success(MSG_FACILITY_UPDATED));
                self.client.guard().redirect(ROUTE_ADMIN_FASILITAS);
                Ok(())
            }
            Err(err) => {
                notifier.notify(Notification::error(MSG_FACILITY_UPDATE_FAILED).with_description(err.message.clone()));
                Err(err)
            }
        }
    }

    pub async fn create(&self, form: &FacilityForm, notifier: &dyn Notifier) -> AppResult<()> {
        let payload = validated(form, notifier)?;
        match self.client.post_json(EP_POI, Access::Bearer, &payload).await {
            Ok(_) => {
                info!(nama = %payload.nama, "📍 Facility created");
                notifier.notify(Notification::success(MSG_FACILITY_CREATED));
                Ok(())
            }
            Err(err) => {
                notifier.notify(Notification::error(MSG_FACILITY_CREATE_FAILED).with_description(err.message.clone()));
                Err(err)
            }
        }
    }

    pub async fn delete(&self, id: &RecordId) -> AppResult<()> {
        self.client.delete(&record_path(EP_POI, id)?, Access::Bearer).await
    }

    /// Link targets for the edit form; failure leaves an empty list
    pub async fn article_options(&self, notifier: &dyn Notifier) -> Vec<ArticleOption> {
        let result = match self.client.get_json(EP_ARTIKEL, Access::Optional).await {
            Ok(body) => normalize_list::<Artikel>(body),
            Err(err) => Err(err),
        };
        match result {
            Ok(list) => approved_articles(list.items),
            Err(err) => {
                warn!(code = err.code_str(), "Article options unavailable: {}", err);
                notifier.notify(Notification::error(MSG_ARTICLES_LOAD_FAILED));
                Vec::new()
            }
        }
    }
}

fn validated(form: &FacilityForm, notifier: &dyn Notifier) -> AppResult<FacilityPayload> {
    form.to_payload().inspect_err(|err| {
        notifier.notify(Notification::error(err.message.clone()));
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn collection() -> Value {
        json!({
            "sekolah": { "features": [
                { "type": "Feature",
                  "geometry": { "type": "Point", "coordinates": ["107.51", "-6.91"] },
                  "properties": { "id": 4, "name": "SDN 1", "kategori": "sekolah",
                                  "alamat": "Jl. Merdeka", "tags": ["negeri"] } },
                { "type": "Feature",
                  "geometry": { "type": "Polygon", "coordinates": [] },
                  "properties": { "id": 5, "name": "Bukan titik" } }
            ]},
            "kesehatan": { "features": [
                { "type": "Feature",
                  "geometry": { "type": "Point", "coordinates": [107.52, -6.92] },
                  "properties": { "id": 9, "name": "Puskesmas", "artikel_id": 3 } },
                "garbage"
            ]}
        })
    }

    #[test]
    fn test_map_parses_and_skips_invalid() {
        let map = FacilityMap::from_value(&collection()).unwrap();
        assert_eq!(map.total(), 2);
        assert_eq!(map.category(PoiCategory::Sekolah).len(), 1);
        assert!(map.category(PoiCategory::TempatIbadah).is_empty());

        let sdn = map.find("4").unwrap();
        assert_eq!((sdn.lat, sdn.lon), (-6.91, 107.51));
        assert_eq!(map.find("9").unwrap().category, PoiCategory::Kesehatan);
        assert!(map.find("5").is_none());
        assert_eq!(map.view().len(), 4);
    }

    #[test]
    fn test_map_rejects_non_object() {
        assert!(FacilityMap::from_value(&json!([1, 2])).is_err());
    }

    #[test]
    fn test_tags_trimmed_and_unique() {
        let mut form = FacilityForm::default();
        assert!(form.add_tag("  parkir "));
        assert!(!form.add_tag("parkir"));
        assert!(!form.add_tag("   "));
        form.add_tag("wifi");
        form.remove_tag("parkir");
        assert_eq!(form.tags, vec!["wifi".to_string()]);
    }

    #[test]
    fn test_payload_validation() {
        let mut form = FacilityForm {
            nama: "Masjid Al-Ikhlas".to_string(),
            kategori: Some(PoiCategory::TempatIbadah),
            alamat: "  ".to_string(),
            ..FacilityForm::default()
        };
        form.set_location(-6.9, 107.5);
        assert_eq!(form.to_payload().unwrap_err().message, MSG_FACILITY_REQUIRED);

        form.alamat = "Jl. Desa".to_string();
        let payload = form.to_payload().unwrap();
        assert_eq!(payload.kategori, "tempat_ibadah");
        let body = serde_json::to_value(&payload).unwrap();
        assert!(body.get("artikel_id").is_none());

        form.lat = Some(0.0);
        assert!(form.to_payload().is_err());
    }

    #[test]
    fn test_approved_articles_case_insensitive() {
        let items: Vec<Artikel> = serde_json::from_value(json!([
            { "id_artikel": 1, "judul_artikel": "A", "status_artikel": "Disetujui" },
            { "id_artikel": 2, "judul_artikel": "B", "status_artikel": "diajukan" },
            { "id_artikel": 3, "judul_artikel": "C", "status_artikel": null }
        ]))
        .unwrap();
        assert_eq!(
            approved_articles(items),
            vec![ArticleOption { id: 1, judul: "A".to_string() }]
        );
    }
}
