//! Alpine tunnel corridor geofencing.
//!
//! Decides whether a route passes through the Fréjus or Mont-Blanc road
//! tunnel. A point inside a tunnel's bounding box is authoritative; a point
//! within a few kilometers of the tunnel center is accepted as a fallback
//! and reported as such.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::haversine::haversine_km;
use crate::polyline::{Point, PolylineBounds};

/// Default radius around a tunnel center for the proximity fallback.
pub const DEFAULT_PROXIMITY_THRESHOLD_KM: f64 = 3.0;

/// Axis-aligned latitude/longitude rectangle. Membership is inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    pub const fn new(min_lat: f64, max_lat: f64, min_lng: f64, max_lng: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.lat >= self.min_lat
            && point.lat <= self.max_lat
            && point.lng >= self.min_lng
            && point.lng <= self.max_lng
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlpineTunnelId {
    Frejus,
    MontBlanc,
}

/// A fixed tunnel corridor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlpineTunnel {
    pub id: AlpineTunnelId,
    pub name: &'static str,
    pub category: &'static str,
    pub country: &'static str,
    pub bbox: BoundingBox,
    pub center: Point,
}

// Boxes span both portals plus the approach roads.
pub const FREJUS: AlpineTunnel = AlpineTunnel {
    id: AlpineTunnelId::Frejus,
    name: "Fréjus Road Tunnel",
    category: "alpine",
    country: "FR-IT",
    bbox: BoundingBox::new(45.07, 45.21, 6.645, 6.715),
    center: Point::new(45.137, 6.683),
};

pub const MONT_BLANC: AlpineTunnel = AlpineTunnel {
    id: AlpineTunnelId::MontBlanc,
    name: "Mont Blanc Tunnel",
    category: "alpine",
    country: "FR-IT",
    bbox: BoundingBox::new(45.80, 45.92, 6.85, 6.97),
    center: Point::new(45.858, 6.911),
};

pub const ALPS_TUNNELS: [AlpineTunnel; 2] = [FREJUS, MONT_BLANC];

/// Per-tunnel verdict, either computed here or supplied by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlpsMatch {
    pub frejus: bool,
    pub mont_blanc: bool,
}

impl AlpsMatch {
    pub fn any(&self) -> bool {
        self.frejus || self.mont_blanc
    }

    pub fn contains(&self, id: AlpineTunnelId) -> bool {
        match id {
            AlpineTunnelId::Frejus => self.frejus,
            AlpineTunnelId::MontBlanc => self.mont_blanc,
        }
    }
}

/// Which point set the verdict was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GeometrySource {
    #[default]
    None,
    Polyline,
    Waypoints,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TunnelMatchDetail {
    pub matched: bool,
    pub points_inside: usize,
    pub first_match: Option<Point>,
    /// Set only when the box did not match and the center was close enough.
    pub matched_by_proximity: bool,
    pub closest_distance_km: Option<f64>,
}

/// Diagnostics for one route evaluation.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlpsTunnelCheck {
    pub frejus: TunnelMatchDetail,
    pub mont_blanc: TunnelMatchDetail,
    pub points_checked: usize,
    pub source: GeometrySource,
    pub coordinates_swapped: bool,
    pub polyline_bounds: Option<PolylineBounds>,
    pub polyline_rejected: bool,
}

impl AlpsTunnelCheck {
    pub fn verdict(&self) -> AlpsMatch {
        AlpsMatch {
            frejus: self.frejus.matched,
            mont_blanc: self.mont_blanc.matched,
        }
    }

    pub fn detail(&self, id: AlpineTunnelId) -> &TunnelMatchDetail {
        match id {
            AlpineTunnelId::Frejus => &self.frejus,
            AlpineTunnelId::MontBlanc => &self.mont_blanc,
        }
    }

    fn detail_mut(&mut self, id: AlpineTunnelId) -> &mut TunnelMatchDetail {
        match id {
            AlpineTunnelId::Frejus => &mut self.frejus,
            AlpineTunnelId::MontBlanc => &mut self.mont_blanc,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeofenceConfig {
    /// Maximum distance to a tunnel center for the proximity fallback.
    pub proximity_threshold_km: f64,
    /// Apply the lat/lng swap correction for European polylines.
    pub correct_swapped_coordinates: bool,
}

impl Default for GeofenceConfig {
    fn default() -> Self {
        Self {
            proximity_threshold_km: DEFAULT_PROXIMITY_THRESHOLD_KM,
            correct_swapped_coordinates: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchKind {
    BoundingBox,
    Proximity,
}

#[derive(Debug, Default)]
struct CorridorScan {
    points_inside: usize,
    first_match: Option<Point>,
    closest_distance_km: Option<f64>,
}

impl CorridorScan {
    fn run(tunnel: &AlpineTunnel, points: &[Point]) -> Self {
        let mut scan = Self::default();
        for &point in points {
            if tunnel.bbox.contains(point) {
                scan.points_inside += 1;
                scan.first_match.get_or_insert(point);
            }
            let distance = haversine_km(point, tunnel.center);
            if distance.is_finite()
                && scan.closest_distance_km.is_none_or(|closest| distance < closest)
            {
                scan.closest_distance_km = Some(distance);
            }
        }
        scan
    }
}

type CorridorRule = fn(&CorridorScan, &GeofenceConfig) -> Option<MatchKind>;

/// Evaluated in order; the first rule that fires decides the provenance.
const CORRIDOR_RULES: &[CorridorRule] = &[bounding_box_rule, proximity_rule];

fn bounding_box_rule(scan: &CorridorScan, _config: &GeofenceConfig) -> Option<MatchKind> {
    (scan.points_inside > 0).then_some(MatchKind::BoundingBox)
}

fn proximity_rule(scan: &CorridorScan, config: &GeofenceConfig) -> Option<MatchKind> {
    scan.closest_distance_km
        .filter(|distance| *distance <= config.proximity_threshold_km)
        .map(|_| MatchKind::Proximity)
}

fn match_tunnel(tunnel: &AlpineTunnel, points: &[Point], config: &GeofenceConfig) -> TunnelMatchDetail {
    let scan = CorridorScan::run(tunnel, points);
    let kind = CORRIDOR_RULES.iter().find_map(|rule| rule(&scan, config));
    TunnelMatchDetail {
        matched: kind.is_some(),
        points_inside: scan.points_inside,
        first_match: scan.first_match,
        matched_by_proximity: kind == Some(MatchKind::Proximity),
        closest_distance_km: scan.closest_distance_km,
    }
}

/// Checks route geometry against both tunnel corridors with default settings.
pub fn check_alps_tunnels(points: &[Point]) -> AlpsTunnelCheck {
    check_alps_tunnels_with(points, &GeofenceConfig::default())
}

/// Checks route geometry against both tunnel corridors.
///
/// Points are used as given; no plausibility gate or coordinate correction
/// is applied (see [`evaluate_route_geometry`]).
pub fn check_alps_tunnels_with(points: &[Point], config: &GeofenceConfig) -> AlpsTunnelCheck {
    let mut check = AlpsTunnelCheck {
        points_checked: points.len(),
        source: if points.is_empty() {
            GeometrySource::None
        } else {
            GeometrySource::Polyline
        },
        ..AlpsTunnelCheck::default()
    };
    for tunnel in &ALPS_TUNNELS {
        *check.detail_mut(tunnel.id) = match_tunnel(tunnel, points, config);
    }
    check
}

/// Undoes an observed upstream defect where European polylines arrive with
/// latitude and longitude exchanged.
///
/// Only fires when the first point reads as lat in [-10, 10] and lng in
/// [30, 70], and the swap is kept only if the whole swapped extent lies in
/// Europe. Returns `None` when the points are left as they are.
pub fn correct_coordinate_order(points: &[Point]) -> Option<Vec<Point>> {
    let first = points.first()?;
    let looks_swapped = (-10.0..=10.0).contains(&first.lat) && (30.0..=70.0).contains(&first.lng);
    if !looks_swapped {
        return None;
    }

    let swapped: Vec<Point> = points.iter().map(Point::swapped).collect();
    let bounds = PolylineBounds::from_points(&swapped)?;
    bounds.is_plausible_for_europe().then_some(swapped)
}

/// Full geofence evaluation for one route.
///
/// `polyline_points` is the decoded geometry of the whole route (possibly
/// empty); `fallback` holds origin, waypoints and destination. The polyline
/// is used when it is present and plausible, otherwise the fallback points
/// are checked individually.
pub fn evaluate_route_geometry(
    polyline_points: &[Point],
    fallback: &[Point],
    config: &GeofenceConfig,
) -> AlpsTunnelCheck {
    let bounds = PolylineBounds::from_points(polyline_points);

    if let Some(bounds) = bounds {
        if bounds.is_plausible() {
            let corrected = if config.correct_swapped_coordinates {
                correct_coordinate_order(polyline_points)
            } else {
                None
            };
            let coordinates_swapped = corrected.is_some();
            let points = corrected.as_deref().unwrap_or(polyline_points);
            if coordinates_swapped {
                debug!(points = points.len(), "swapped lat/lng order of route polyline");
            }

            let mut check = check_alps_tunnels_with(points, config);
            check.coordinates_swapped = coordinates_swapped;
            check.polyline_bounds = PolylineBounds::from_points(points);
            log_verdict(&check);
            return check;
        }
        warn!(
            min_lat = bounds.min_lat,
            max_lat = bounds.max_lat,
            min_lng = bounds.min_lng,
            max_lng = bounds.max_lng,
            "route polyline bounds are implausible, falling back to waypoints"
        );
    }

    let mut check = check_alps_tunnels_with(fallback, config);
    check.source = if fallback.is_empty() {
        GeometrySource::None
    } else {
        GeometrySource::Waypoints
    };
    check.polyline_bounds = bounds;
    check.polyline_rejected = bounds.is_some();
    log_verdict(&check);
    check
}

fn log_verdict(check: &AlpsTunnelCheck) {
    debug!(
        source = ?check.source,
        points = check.points_checked,
        frejus = check.frejus.matched,
        frejus_by_proximity = check.frejus.matched_by_proximity,
        mont_blanc = check.mont_blanc.matched,
        mont_blanc_by_proximity = check.mont_blanc.matched_by_proximity,
        "alpine tunnel geofence evaluated"
    );
}
