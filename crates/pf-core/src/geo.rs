//! Geographic coordinate types and spatial utilities.
//!
//! `GeoPoint` uses `f32` (single-precision) latitude/longitude.  At the
//! equator this gives ~1 m precision, which is plenty for city-scale road
//! graphs.  Edge weights derived from these positions are widened to `f64`
//! by the graph builder so that long searches accumulate no visible drift.

/// Mean Earth radius in metres.
const EARTH_RADIUS_M: f32 = 6_371_000.0;

/// Kilometres per degree of latitude (WGS-84 mean).
const KM_PER_DEG_LAT: f32 = 110.574;

/// Kilometres per degree of longitude at the equator.
const KM_PER_DEG_LON_EQUATOR: f32 = 111.320;

/// A WGS-84 geographic coordinate stored as single-precision floats.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f32,
    pub lon: f32,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f32, lon: f32) -> Self {
        Self { lat, lon }
    }

    /// Haversine great-circle distance in metres.
    ///
    /// Accuracy: ±0.5 % (f32 rounding); suitable for road-segment weights at
    /// city scale.
    pub fn distance_m(self, other: GeoPoint) -> f32 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

// ── BoundingBox ───────────────────────────────────────────────────────────────

/// Axis-aligned latitude/longitude rectangle used to scope a graph fetch.
///
/// Boxes never wrap the antimeridian; callers near ±180° must split the
/// request themselves.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    pub min_lat: f32,
    pub min_lon: f32,
    pub max_lat: f32,
    pub max_lon: f32,
}

impl BoundingBox {
    /// Smallest box containing both corners, in any order.
    pub fn new(a: GeoPoint, b: GeoPoint) -> Self {
        Self {
            min_lat: a.lat.min(b.lat),
            min_lon: a.lon.min(b.lon),
            max_lat: a.lat.max(b.lat),
            max_lon: a.lon.max(b.lon),
        }
    }

    /// Box enclosing the circle of `radius_km` around `center`.
    ///
    /// Uses the flat-earth degree conversion, which slightly over-covers the
    /// circle.  Over-covering is harmless for a fetch request.
    pub fn around(center: GeoPoint, radius_km: f32) -> Self {
        let d_lat = radius_km / KM_PER_DEG_LAT;
        let cos_lat = center.lat.to_radians().cos().abs().max(1e-6);
        let d_lon = radius_km / (KM_PER_DEG_LON_EQUATOR * cos_lat);
        Self {
            min_lat: center.lat - d_lat,
            min_lon: center.lon - d_lon,
            max_lat: center.lat + d_lat,
            max_lon: center.lon + d_lon,
        }
    }

    /// Inclusive containment test.
    #[inline]
    pub fn contains(&self, p: GeoPoint) -> bool {
        p.lat >= self.min_lat
            && p.lat <= self.max_lat
            && p.lon >= self.min_lon
            && p.lon <= self.max_lon
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min_lat + self.max_lat) * 0.5,
            (self.min_lon + self.max_lon) * 0.5,
        )
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{:.6}, {:.6}] – [{:.6}, {:.6}]",
            self.min_lat, self.min_lon, self.max_lat, self.max_lon
        )
    }
}
