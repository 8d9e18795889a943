//! Ratchet cache for zoom-dependent boundary payloads.
//!
//! Once a finer level has been served, any request for the same or a
//! coarser level receives that finer payload instead of its own. The
//! stored detail level only ever increases until [`BoundaryCache::reset`]
//! is called.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use geojson::{Feature, FeatureCollection, Geometry};
use migration_map_geography_models::{SimplificationLevel, StateBoundaries};

use crate::GeoError;
use crate::simplify::BoundaryLevels;

pub use geojson::JsonObject;

/// Supplies the extra properties attached to each serialized state
/// feature.
pub trait FeatureProperties: Send + Sync {
    /// Returns the properties to merge into the feature for `state`.
    fn properties(&self, state: &str) -> JsonObject;
}

/// Properties source that adds nothing.
pub struct NoProperties;

impl FeatureProperties for NoProperties {
    fn properties(&self, _state: &str) -> JsonObject {
        JsonObject::new()
    }
}

/// Result of a [`BoundaryCache::fetch`].
#[derive(Debug, Clone)]
pub struct ServedBoundaries {
    /// Level derived from the requested zoom.
    pub requested: SimplificationLevel,
    /// Level whose geometry is in `payload`. Never coarser than
    /// `requested`.
    pub served: SimplificationLevel,
    /// Serialized `GeoJSON` `FeatureCollection`. Clones share one buffer.
    pub payload: Bytes,
}

#[derive(Debug, Default)]
struct CacheState {
    highest_level_served: Option<SimplificationLevel>,
    highest_level_payload: Option<Bytes>,
}

/// Boundary cache shared by all request handlers.
///
/// All reads and writes of the ratchet state go through one mutex, so the
/// compare-and-update in [`fetch`](Self::fetch) is atomic with respect to
/// concurrent requests.
pub struct BoundaryCache {
    levels: BoundaryLevels,
    name_property: String,
    properties: Arc<dyn FeatureProperties>,
    state: Mutex<CacheState>,
}

impl BoundaryCache {
    /// Creates an empty cache over precomputed `levels`.
    ///
    /// `name_property` is the feature property that carries the state
    /// name in serialized payloads.
    #[must_use]
    pub fn new(
        levels: BoundaryLevels,
        name_property: impl Into<String>,
        properties: Arc<dyn FeatureProperties>,
    ) -> Self {
        Self {
            levels,
            name_property: name_property.into(),
            properties,
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Serves boundaries for a client zoom value.
    ///
    /// If a level at least as fine as the requested one has already been
    /// served, its payload is returned unchanged. Otherwise the requested
    /// level is serialized and, when it is finer than anything served so
    /// far, becomes the new cached payload.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Json`] if the payload cannot be serialized.
    pub fn fetch(&self, zoom: i64) -> Result<ServedBoundaries, GeoError> {
        let requested = SimplificationLevel::from_zoom(zoom);
        let mut state = self.lock();

        if let Some(highest) = state.highest_level_served
            && requested <= highest
            && let Some(payload) = &state.highest_level_payload
        {
            log::debug!("Boundary request for level {requested} upgraded to cached level {highest}");
            return Ok(ServedBoundaries {
                requested,
                served: highest,
                payload: payload.clone(),
            });
        }

        let payload = self.render(requested)?;

        if state.highest_level_served.is_none_or(|highest| requested > highest) {
            log::debug!("Boundary cache ratcheted to level {requested}");
            state.highest_level_served = Some(requested);
            state.highest_level_payload = Some(payload.clone());
        }

        Ok(ServedBoundaries {
            requested,
            served: requested,
            payload,
        })
    }

    /// Discards the ratchet so the next fetch serves its nominal level.
    pub fn reset(&self) {
        let mut state = self.lock();
        *state = CacheState::default();
        log::info!("Boundary cache reset");
    }

    /// Highest level served since startup or the last reset.
    #[must_use]
    pub fn highest_level_served(&self) -> Option<SimplificationLevel> {
        self.lock().highest_level_served
    }

    /// Serializes one precomputed level as a `GeoJSON` feature collection.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Json`] if serialization fails.
    pub fn render(&self, level: SimplificationLevel) -> Result<Bytes, GeoError> {
        let collection = to_feature_collection(
            self.levels.level(level),
            &self.name_property,
            self.properties.as_ref(),
        );
        Ok(Bytes::from(serde_json::to_vec(&collection)?))
    }

    /// The ratchet state is replaced whole under the lock, so a poisoned
    /// mutex still holds a consistent value.
    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Source properties come first; the name property and the extra
/// properties overwrite any source keys they share.
fn to_feature_collection(
    boundaries: &StateBoundaries,
    name_property: &str,
    properties: &dyn FeatureProperties,
) -> FeatureCollection {
    let features = boundaries
        .features()
        .iter()
        .map(|boundary| {
            let mut props = boundary.properties.clone();
            props.insert(
                name_property.to_string(),
                serde_json::Value::String(boundary.state.clone()),
            );
            props.extend(properties.properties(&boundary.state));

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(geojson::Value::from(&boundary.geometry))),
                id: None,
                properties: Some(props),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simplify::DEFAULT_TOLERANCES;
    use geo::{MultiPolygon, polygon};
    use migration_map_geography_models::StateBoundary;

    /// A unit square whose bottom edge dips by 0.1 degrees: the dip
    /// survives fine levels and is removed at coarse ones.
    fn wavy_state() -> StateBoundaries {
        let poly = polygon![
            (x: 0.0, y: 0.0),
            (x: 0.5, y: -0.1),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
            (x: 0.0, y: 0.0),
        ];
        StateBoundaries::new(vec![StateBoundary {
            state: "Kerala".to_string(),
            geometry: MultiPolygon::new(vec![poly]),
            properties: serde_json::json!({ "state": "Kerala", "code": 32 })
                .as_object()
                .cloned()
                .unwrap(),
        }])
    }

    fn cache() -> BoundaryCache {
        let levels = BoundaryLevels::build(&wavy_state(), &DEFAULT_TOLERANCES).unwrap();
        BoundaryCache::new(levels, "state", Arc::new(NoProperties))
    }

    #[test]
    fn coarser_request_after_finer_gets_finer_payload() {
        let cache = cache();

        let fine = cache.fetch(8).unwrap();
        let coarse = cache.fetch(3).unwrap();

        assert_eq!(coarse.served, fine.served);
        assert_eq!(coarse.payload, fine.payload);
        assert_ne!(
            coarse.payload,
            cache.render(SimplificationLevel::from_zoom(3)).unwrap(),
            "coarse payload should not be the nominal level 2 geometry"
        );
    }

    #[test]
    fn upgraded_requests_share_the_cached_buffer() {
        let cache = cache();

        let fine = cache.fetch(9).unwrap();
        let coarse = cache.fetch(4).unwrap();

        assert_eq!(coarse.payload.as_ptr(), fine.payload.as_ptr());
    }

    #[test]
    fn extra_properties_override_source_keys() {
        struct Renamed;
        impl FeatureProperties for Renamed {
            fn properties(&self, _state: &str) -> JsonObject {
                let mut props = JsonObject::new();
                props.insert("code".to_string(), serde_json::json!("KL"));
                props
            }
        }

        let levels = BoundaryLevels::build(&wavy_state(), &DEFAULT_TOLERANCES).unwrap();
        let cache = BoundaryCache::new(levels, "name", Arc::new(Renamed));
        let served = cache.fetch(5).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&served.payload).unwrap();
        let props = &value["features"][0]["properties"];
        assert_eq!(props["name"], "Kerala");
        assert_eq!(props["state"], "Kerala");
        assert_eq!(props["code"], "KL");
    }

    #[test]
    fn finer_request_advances_the_ratchet() {
        let cache = cache();

        cache.fetch(2).unwrap();
        let finer = cache.fetch(6).unwrap();

        assert_eq!(finer.served, SimplificationLevel::from_zoom(6));
        assert_eq!(
            cache.highest_level_served(),
            Some(SimplificationLevel::from_zoom(6))
        );
    }

    #[test]
    fn highest_level_never_decreases() {
        let cache = cache();
        let mut previous = None;

        for zoom in [5, 2, 9, 1, 7, 10, 3, -4, 42] {
            let served = cache.fetch(zoom).unwrap();
            assert!(served.served >= served.requested);
            let highest = cache.highest_level_served();
            assert!(highest >= previous, "ratchet moved down at zoom {zoom}");
            previous = highest;
        }

        assert_eq!(previous, Some(SimplificationLevel::FINEST));
    }

    #[test]
    fn reset_serves_nominal_level_again() {
        let cache = cache();
        cache.fetch(10).unwrap();

        cache.reset();
        assert_eq!(cache.highest_level_served(), None);

        let served = cache.fetch(1).unwrap();
        assert_eq!(served.served, SimplificationLevel::COARSEST);
        assert_eq!(
            served.payload,
            cache.render(SimplificationLevel::COARSEST).unwrap()
        );
    }

    #[test]
    fn payload_is_feature_collection_with_properties() {
        struct Fixed;
        impl FeatureProperties for Fixed {
            fn properties(&self, _state: &str) -> JsonObject {
                let mut props = JsonObject::new();
                props.insert("net_mig".to_string(), serde_json::json!(-11));
                props
            }
        }

        let levels = BoundaryLevels::build(&wavy_state(), &DEFAULT_TOLERANCES).unwrap();
        let cache = BoundaryCache::new(levels, "state", Arc::new(Fixed));
        let served = cache.fetch(5).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&served.payload).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"][0]["properties"]["state"], "Kerala");
        assert_eq!(value["features"][0]["properties"]["net_mig"], -11);
        assert_eq!(value["features"][0]["properties"]["code"], 32);
        assert_eq!(value["features"][0]["geometry"]["type"], "MultiPolygon");
    }

    #[test]
    fn shared_across_threads() {
        let cache = Arc::new(cache());
        let handles: Vec<_> = (1..=10)
            .map(|zoom| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || cache.fetch(zoom).map(|s| s.served))
            })
            .collect();

        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        assert_eq!(
            cache.highest_level_served(),
            Some(SimplificationLevel::FINEST)
        );
    }
}
