//! Seams between the extraction core and its collaborators.
//!
//! The HTTP client, cache and request construction live outside this crate;
//! they plug in through [`RouteProvider`].

use serde::{Deserialize, Serialize};

use crate::polyline::Point;
use crate::response::ProviderResponse;

/// The stops a truck route was requested for.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RouteRequest {
    pub origin: Point,
    pub destination: Point,
    #[serde(default)]
    pub waypoints: Vec<Point>,
}

impl RouteRequest {
    pub fn new(origin: Point, destination: Point) -> Self {
        Self {
            origin,
            destination,
            waypoints: Vec::new(),
        }
    }

    pub fn with_waypoint(mut self, waypoint: Point) -> Self {
        self.waypoints.push(waypoint);
        self
    }

    /// Origin, waypoints and destination in travel order; invalid
    /// coordinates are left out.
    pub fn stops(&self) -> Vec<Point> {
        std::iter::once(self.origin)
            .chain(self.waypoints.iter().copied())
            .chain(std::iter::once(self.destination))
            .filter(Point::is_valid)
            .collect()
    }
}

/// Supplies raw routing responses for a request.
pub trait RouteProvider {
    type Error: std::error::Error + Send + Sync + 'static;

    fn route(&self, request: &RouteRequest) -> Result<ProviderResponse, Self::Error>;
}
