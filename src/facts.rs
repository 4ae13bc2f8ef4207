//! Normalized route facts handed to the pricing calculator.
//!
//! Every flag defaults to `false` and every list to empty, so an extraction
//! over an empty response still yields a complete record.

use serde::Serialize;

use crate::geofence::AlpsTunnelCheck;

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteFacts {
    pub route: RouteTotals,
    pub geography: Geography,
    pub infrastructure: Infrastructure,
    pub regulatory: Regulatory,
    pub risk_flags: RiskFlags,
    pub raw: Provenance,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteTotals {
    pub distance_km: f64,
    /// `None` when the sections carry no duration at all.
    pub duration_hours: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Geography {
    pub origin_country: Option<String>,
    pub destination_country: Option<String>,
    /// Distinct countries in first-seen order.
    pub countries_crossed: Vec<String>,
    pub is_international: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Infrastructure {
    pub has_toll_roads: bool,
    /// Sorted, distinct.
    pub toll_countries: Vec<String>,
    /// `None` when no fare had a usable price.
    pub toll_cost_estimate: Option<f64>,
    pub toll_currencies: Vec<String>,
    pub has_ferry: bool,
    pub ferry_segments: usize,
    pub has_tunnel: bool,
    pub tunnels: Vec<Tunnel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tunnel {
    pub name: Option<String>,
    pub category: Option<String>,
    pub country: Option<String>,
}

impl Tunnel {
    pub fn named(name: &str, category: &str, country: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            category: Some(category.to_string()),
            country: Some(country.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Regulatory {
    pub has_restrictions: bool,
    pub restriction_reasons: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFlags {
    pub uk: bool,
    pub island: bool,
    /// Set only by a Fréjus or Mont-Blanc geofence match.
    pub crosses_alps: bool,
    pub scandinavia: bool,
    pub baltic: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    pub provider: String,
    pub route_id: Option<String>,
    pub warnings: Vec<Warning>,
    /// Geofence diagnostics; absent when the caller supplied the verdict.
    pub alps_check: Option<AlpsTunnelCheck>,
}

/// Sentinel code for notices that carry none.
pub const UNKNOWN_WARNING_CODE: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Warning {
    pub code: String,
    pub message: String,
    pub severity: Option<String>,
}

impl RouteFacts {
    /// The all-defaults record for a provider.
    pub fn empty(provider: &str) -> Self {
        Self {
            raw: Provenance {
                provider: provider.to_string(),
                ..Provenance::default()
            },
            ..Self::default()
        }
    }
}
