//! route-facts core
//!
//! Turns a raw truck-routing response into normalized route facts:
//! totals, tolls, ferries, tunnels, restrictions and routing-risk flags.

pub mod countries;
pub mod error;
pub mod extractor;
pub mod facts;
pub mod geofence;
pub mod haversine;
pub mod polyline;
pub mod response;
pub mod traits;
pub mod tunnels;

pub use error::Error;
pub use extractor::{
    ExtractOptions, extract_alternatives, extract_route_facts, extract_route_facts_for,
    extract_route_facts_from_json, fetch_route_facts,
};
pub use facts::RouteFacts;
pub use geofence::{AlpsMatch, AlpsTunnelCheck, check_alps_tunnels};
pub use polyline::{Point, Polyline};
pub use response::ProviderResponse;
pub use traits::{RouteProvider, RouteRequest};
