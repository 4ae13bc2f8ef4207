//! Route facts extraction.
//!
//! Walks the sections of an upstream route and assembles [`RouteFacts`].
//! Malformed upstream data never fails an extraction; it is skipped at the
//! lowest level it appears at.

use std::collections::BTreeSet;

use rayon::prelude::*;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::countries::{is_baltic, is_island, is_scandinavian, is_uk, normalize_country_code};
use crate::error::Error;
use crate::facts::{
    Geography, Infrastructure, Provenance, Regulatory, RiskFlags, RouteFacts, RouteTotals, Tunnel,
    UNKNOWN_WARNING_CODE, Warning,
};
use crate::geofence::{ALPS_TUNNELS, AlpsMatch, AlpsTunnelCheck, GeofenceConfig, evaluate_route_geometry};
use crate::polyline::{self, Point};
use crate::response::{Notice, ProviderResponse, Route, Section};
use crate::traits::{RouteProvider, RouteRequest};
use crate::tunnels::{TextTunnelMatch, match_tunnel_text, normalize_text};

/// Notice codes that mean the truck is not allowed on part of the route.
const RESTRICTION_CODES: &[&str] = &[
    "violatedVehicleRestriction",
    "violatedBlockedRoad",
    "violatedZoneRestriction",
    "violatedTurnRestriction",
    "violatedEnvironmentalZone",
    "violatedCriticalRoute",
    "seasonalClosure",
];

const RESTRICTION_PHRASES: &[&str] = &["restriction", "prohibited", "not allowed"];

const FERRY_PHRASES: &[&str] = &["ferry", "ferries", "traghetto"];

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractOptions {
    /// Provider id recorded in the provenance block.
    pub provider: String,
    pub geofence: GeofenceConfig,
    /// Pre-computed tunnel verdict; skips polyline geofencing when set.
    pub alps_override: Option<AlpsMatch>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            provider: "here".to_string(),
            geofence: GeofenceConfig::default(),
            alps_override: None,
        }
    }
}

/// Extracts facts for the first route of a response.
///
/// Geofencing falls back to the sections' departure and arrival places
/// when the polyline is unusable.
pub fn extract_route_facts(response: &ProviderResponse, options: &ExtractOptions) -> RouteFacts {
    match response.routes.first() {
        Some(route) => extract_route(route, None, options),
        None => RouteFacts::empty(&options.provider),
    }
}

/// Like [`extract_route_facts`], falling back to the requested stops.
pub fn extract_route_facts_for(
    response: &ProviderResponse,
    request: &RouteRequest,
    options: &ExtractOptions,
) -> RouteFacts {
    match response.routes.first() {
        Some(route) => extract_route(route, Some(request), options),
        None => RouteFacts::empty(&options.provider),
    }
}

/// Parses a raw response document and extracts its first route.
pub fn extract_route_facts_from_json(json: &str, options: &ExtractOptions) -> Result<RouteFacts, Error> {
    let response = ProviderResponse::from_json_str(json)?;
    Ok(extract_route_facts(&response, options))
}

/// Extracts every route of a response (the primary one and alternatives).
pub fn extract_alternatives(
    response: &ProviderResponse,
    request: Option<&RouteRequest>,
    options: &ExtractOptions,
) -> Vec<RouteFacts> {
    response
        .routes
        .par_iter()
        .map(|route| extract_route(route, request, options))
        .collect()
}

/// Asks a provider for a route and extracts its facts.
pub fn fetch_route_facts<P: RouteProvider>(
    provider: &P,
    request: &RouteRequest,
    options: &ExtractOptions,
) -> Result<RouteFacts, Error> {
    let response = provider
        .route(request)
        .map_err(|err| Error::Provider(Box::new(err)))?;
    Ok(extract_route_facts_for(&response, request, options))
}

fn extract_route(route: &Route, request: Option<&RouteRequest>, options: &ExtractOptions) -> RouteFacts {
    let sections = &route.sections;

    let totals = compute_totals(sections);
    let tolls = collect_tolls(sections);
    let ferry_segments = sections.iter().filter(|section| is_ferry_section(section)).count();
    let (alps, alps_check) = alps_verdict(route, request, options);
    let tunnels = collect_tunnels(sections, alps);
    let (regulatory, warnings) = collect_notices(sections);
    let geography = derive_geography(country_sequence(sections, &tolls.countries_first_seen));
    let risk_flags = derive_risk_flags(&geography, ferry_segments > 0, alps);

    debug!(
        route_id = route.id.as_deref().unwrap_or_default(),
        sections = sections.len(),
        distance_km = totals.distance_km,
        tolls = tolls.has_toll_roads,
        ferry_segments,
        tunnels = tunnels.len(),
        crosses_alps = risk_flags.crosses_alps,
        "extracted route facts"
    );

    RouteFacts {
        route: totals,
        geography,
        infrastructure: Infrastructure {
            has_toll_roads: tolls.has_toll_roads,
            toll_countries: tolls.sorted_countries(),
            toll_cost_estimate: tolls.cost_estimate(),
            toll_currencies: tolls.currencies.into_iter().collect(),
            has_ferry: ferry_segments > 0,
            ferry_segments,
            has_tunnel: !tunnels.is_empty() || mentions_unnamed_tunnel(sections),
            tunnels,
        },
        regulatory,
        risk_flags,
        raw: Provenance {
            provider: options.provider.clone(),
            route_id: route.id.clone(),
            warnings,
            alps_check,
        },
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn compute_totals(sections: &[Section]) -> RouteTotals {
    let meters: f64 = sections.iter().map(Section::length_m).sum();
    let seconds: f64 = sections.iter().map(Section::duration_s).sum();
    RouteTotals {
        distance_km: round2(meters / 1000.0),
        duration_hours: (seconds != 0.0).then(|| round2(seconds / 3600.0)),
    }
}

#[derive(Debug, Default)]
struct TollSummary {
    has_toll_roads: bool,
    countries_first_seen: Vec<String>,
    total: f64,
    valid_fares: usize,
    currencies: BTreeSet<String>,
}

impl TollSummary {
    fn sorted_countries(&self) -> Vec<String> {
        let mut countries = self.countries_first_seen.clone();
        countries.sort();
        countries
    }

    fn cost_estimate(&self) -> Option<f64> {
        (self.valid_fares > 0).then(|| round2(self.total))
    }
}

fn collect_tolls(sections: &[Section]) -> TollSummary {
    let mut summary = TollSummary::default();
    for toll in sections.iter().flat_map(|section| &section.tolls) {
        summary.has_toll_roads = true;

        if let Some(code) = toll.country_code.as_deref().and_then(normalize_country_code) {
            if !summary.countries_first_seen.contains(&code) {
                summary.countries_first_seen.push(code);
            }
        }

        for fare in &toll.fares {
            let Some(price) = fare.effective_price() else {
                continue;
            };
            match price.amount() {
                Some(amount) => {
                    summary.total += amount;
                    summary.valid_fares += 1;
                    if let Some(currency) = non_blank(price.currency.as_deref()) {
                        summary.currencies.insert(currency.to_ascii_uppercase());
                    }
                }
                None => debug!(fare = fare.id.as_deref().unwrap_or_default(), "ignoring unparsable fare price"),
            }
        }
    }
    summary
}

fn mentions_ferry(text: &str) -> bool {
    let normalized = normalize_text(text);
    FERRY_PHRASES.iter().any(|phrase| normalized.contains(phrase))
}

fn is_ferry_section(section: &Section) -> bool {
    section.is_ferry_mode()
        || section
            .all_actions()
            .filter_map(|action| action.instruction.as_deref())
            .any(mentions_ferry)
}

fn alps_verdict(
    route: &Route,
    request: Option<&RouteRequest>,
    options: &ExtractOptions,
) -> (AlpsMatch, Option<AlpsTunnelCheck>) {
    if let Some(verdict) = options.alps_override {
        debug!(frejus = verdict.frejus, mont_blanc = verdict.mont_blanc, "using supplied alpine tunnel verdict");
        return (verdict, None);
    }

    let points = decode_route_polyline(route);
    let fallback = match request {
        Some(request) => request.stops(),
        None => stop_points(route),
    };
    let check = evaluate_route_geometry(&points, &fallback, &options.geofence);
    (check.verdict(), Some(check))
}

/// Concatenated geometry of all sections; sections that fail to decode are
/// left out.
fn decode_route_polyline(route: &Route) -> Vec<Point> {
    let mut points = Vec::new();
    for section in &route.sections {
        let Some(encoded) = section.polyline.as_deref() else {
            continue;
        };
        match polyline::decode(encoded) {
            Ok(decoded) => points.extend(decoded.into_points()),
            Err(err) => warn!(
                section = section.id.as_deref().unwrap_or_default(),
                error = %err,
                "skipping undecodable section polyline"
            ),
        }
    }
    points
}

/// Departure and arrival places of the sections, in travel order.
fn stop_points(route: &Route) -> Vec<Point> {
    let mut points: Vec<Point> = Vec::new();
    for section in &route.sections {
        for point in [section.departure_point(), section.arrival_point()].into_iter().flatten() {
            if points.last() != Some(&point) {
                points.push(point);
            }
        }
    }
    points
}

/// Instruction and notice texts of every section.
fn route_texts(sections: &[Section]) -> impl Iterator<Item = &str> {
    sections.iter().flat_map(|section| {
        section
            .all_actions()
            .filter_map(|action| action.instruction.as_deref())
            .chain(section.notices.iter().filter_map(|notice| notice.title.as_deref()))
    })
}

fn collect_tunnels(sections: &[Section], alps: AlpsMatch) -> Vec<Tunnel> {
    let mut tunnels: Vec<Tunnel> = ALPS_TUNNELS
        .iter()
        .filter(|tunnel| alps.contains(tunnel.id))
        .map(|tunnel| Tunnel::named(tunnel.name, tunnel.category, tunnel.country))
        .collect();

    for text in route_texts(sections) {
        let candidate = match match_tunnel_text(text) {
            Some(TextTunnelMatch::Known(known)) => Tunnel::named(known.name, known.category, known.country),
            Some(TextTunnelMatch::Generic(Some(name))) => Tunnel {
                name: Some(name),
                ..Tunnel::default()
            },
            Some(TextTunnelMatch::Generic(None)) | None => continue,
        };
        if !contains_tunnel(&tunnels, &candidate) {
            tunnels.push(candidate);
        }
    }
    tunnels
}

fn contains_tunnel(tunnels: &[Tunnel], candidate: &Tunnel) -> bool {
    let Some(name) = candidate.name.as_deref().map(normalize_text) else {
        return false;
    };
    tunnels
        .iter()
        .filter_map(|tunnel| tunnel.name.as_deref())
        .any(|existing| normalize_text(existing) == name)
}

/// Tunnel wording that did not resolve to any name still counts as a tunnel.
fn mentions_unnamed_tunnel(sections: &[Section]) -> bool {
    route_texts(sections).any(|text| matches!(match_tunnel_text(text), Some(TextTunnelMatch::Generic(None))))
}

fn is_restriction(notice: &Notice) -> bool {
    let by_code = notice.code.as_deref().is_some_and(|code| {
        RESTRICTION_CODES
            .iter()
            .any(|known| known.eq_ignore_ascii_case(code.trim()))
    });
    let by_title = notice.title.as_deref().is_some_and(|title| {
        let normalized = normalize_text(title);
        RESTRICTION_PHRASES.iter().any(|phrase| normalized.contains(phrase))
    });
    by_code || by_title
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn collect_notices(sections: &[Section]) -> (Regulatory, Vec<Warning>) {
    let mut regulatory = Regulatory::default();
    let mut warnings = Vec::new();

    for notice in sections.iter().flat_map(|section| &section.notices) {
        let code = non_blank(notice.code.as_deref()).unwrap_or(UNKNOWN_WARNING_CODE);
        let title = non_blank(notice.title.as_deref());

        if is_restriction(notice) {
            let reason = title.unwrap_or(code).to_string();
            if !regulatory.restriction_reasons.contains(&reason) {
                regulatory.restriction_reasons.push(reason);
            }
        }

        warnings.push(Warning {
            code: code.to_string(),
            message: title.unwrap_or_default().to_string(),
            severity: non_blank(notice.severity.as_deref()).map(str::to_string),
        });
    }

    regulatory.has_restrictions = !regulatory.restriction_reasons.is_empty();
    (regulatory, warnings)
}

/// Countries in travel order: section spans when the provider sent them,
/// otherwise the order toll countries were first seen.
fn country_sequence(sections: &[Section], toll_countries: &[String]) -> Vec<String> {
    let mut from_spans: Vec<String> = Vec::new();
    let span_codes = sections
        .iter()
        .flat_map(|section| &section.spans)
        .filter_map(|span| span.country_code.as_deref().and_then(normalize_country_code));
    for code in span_codes {
        if !from_spans.contains(&code) {
            from_spans.push(code);
        }
    }

    if from_spans.is_empty() {
        toll_countries.to_vec()
    } else {
        from_spans
    }
}

fn derive_geography(countries: Vec<String>) -> Geography {
    let is_international = match countries.len() {
        0 => None,
        1 => Some(false),
        _ => Some(true),
    };
    Geography {
        origin_country: countries.first().cloned(),
        destination_country: countries.last().cloned(),
        countries_crossed: countries,
        is_international,
    }
}

fn derive_risk_flags(geography: &Geography, has_ferry: bool, alps: AlpsMatch) -> RiskFlags {
    let codes: Vec<&str> = geography
        .countries_crossed
        .iter()
        .chain(geography.destination_country.iter())
        .map(String::as_str)
        .collect();
    let destination_is_island = geography.destination_country.as_deref().is_some_and(is_island);

    RiskFlags {
        uk: codes.iter().any(|code| is_uk(code)),
        island: has_ferry && destination_is_island,
        crosses_alps: alps.any(),
        scandinavia: codes.iter().any(|code| is_scandinavian(code)),
        baltic: codes.iter().any(|code| is_baltic(code)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::{Action, Fare, Price, Span, Toll};
    use serde_json::json;

    fn section_with_actions(instructions: &[&str]) -> Section {
        Section {
            actions: instructions
                .iter()
                .map(|text| Action {
                    action: None,
                    instruction: Some(text.to_string()),
                })
                .collect(),
            ..Section::default()
        }
    }

    fn toll(country: Option<&str>, prices: &[serde_json::Value]) -> Toll {
        Toll {
            country_code: country.map(str::to_string),
            toll_system: None,
            fares: prices
                .iter()
                .map(|value| Fare {
                    price: Some(Price {
                        value: Some(value.clone()),
                        currency: Some("EUR".to_string()),
                    }),
                    ..Fare::default()
                })
                .collect(),
        }
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(574.0), 574.0);
        assert_eq!(round2(6.499), 6.5);
        assert_eq!(round2(1.234), 1.23);
    }

    #[test]
    fn test_totals_unknown_duration() {
        let totals = compute_totals(&[Section::default()]);
        assert_eq!(totals.distance_km, 0.0);
        assert_eq!(totals.duration_hours, None);
    }

    #[test]
    fn test_toll_cost_zero_is_preserved() {
        let section = Section {
            tolls: vec![toll(Some("FRA"), &[json!("0.00")])],
            ..Section::default()
        };
        let summary = collect_tolls(&[section]);
        assert_eq!(summary.cost_estimate(), Some(0.0));
    }

    #[test]
    fn test_toll_cost_unknown_without_valid_fares() {
        let section = Section {
            tolls: vec![toll(Some("FRA"), &[json!("n/a"), json!(null)])],
            ..Section::default()
        };
        let summary = collect_tolls(&[section]);
        assert!(summary.has_toll_roads);
        assert_eq!(summary.cost_estimate(), None);
    }

    #[test]
    fn test_toll_countries_sorted_and_first_seen() {
        let section = Section {
            tolls: vec![
                toll(Some("ita"), &[json!("10.5")]),
                toll(Some("FRA"), &[json!(4)]),
                toll(Some("ITA"), &[json!("1.25")]),
                toll(None, &[json!("2")]),
            ],
            ..Section::default()
        };
        let summary = collect_tolls(&[section]);
        assert_eq!(summary.countries_first_seen, vec!["ITA", "FRA"]);
        assert_eq!(summary.sorted_countries(), vec!["FRA", "ITA"]);
        assert_eq!(summary.cost_estimate(), Some(17.75));
        assert_eq!(summary.currencies.into_iter().collect::<Vec<_>>(), vec!["EUR"]);
    }

    #[test]
    fn test_ferry_from_action_text() {
        assert!(is_ferry_section(&section_with_actions(&["Take the FERRY to Dover"])));
        assert!(is_ferry_section(&section_with_actions(&["Imbarcarsi sul traghetto"])));
        assert!(!is_ferry_section(&section_with_actions(&["Turn right"])));
    }

    #[test]
    fn test_tunnels_not_duplicated_by_name() {
        let sections = vec![section_with_actions(&[
            "Enter the Fréjus Tunnel",
            "Traforo del Frejus",
            "Enter the Liefkenshoek Tunnel",
            "Enter the Liefkenshoek tunnel",
        ])];
        let tunnels = collect_tunnels(&sections, AlpsMatch { frejus: true, mont_blanc: false });
        let names: Vec<_> = tunnels.iter().filter_map(|t| t.name.as_deref()).collect();
        assert_eq!(names, vec!["Fréjus Road Tunnel", "Liefkenshoek Tunnel"]);
    }

    #[test]
    fn test_unnamed_tunnel_sets_flag_only() {
        let sections = vec![section_with_actions(&["Continue through the tunnel"])];
        assert!(collect_tunnels(&sections, AlpsMatch::default()).is_empty());
        assert!(mentions_unnamed_tunnel(&sections));
    }

    #[test]
    fn test_restrictions_and_warnings() {
        let section = Section {
            notices: vec![
                Notice {
                    title: Some("Violated vehicle restriction.".to_string()),
                    code: Some("violatedVehicleRestriction".to_string()),
                    severity: Some("critical".to_string()),
                },
                Notice {
                    title: Some("Trucks prohibited on this road".to_string()),
                    code: None,
                    severity: None,
                },
                Notice {
                    title: Some("Violated vehicle restriction.".to_string()),
                    code: Some("violatedVehicleRestriction".to_string()),
                    severity: None,
                },
                Notice::default(),
            ],
            ..Section::default()
        };
        let (regulatory, warnings) = collect_notices(&[section]);
        assert!(regulatory.has_restrictions);
        assert_eq!(
            regulatory.restriction_reasons,
            vec!["Violated vehicle restriction.", "Trucks prohibited on this road"]
        );
        assert_eq!(warnings.len(), 4);
        assert_eq!(warnings[1].code, UNKNOWN_WARNING_CODE);
        assert_eq!(warnings[3].code, UNKNOWN_WARNING_CODE);
        assert_eq!(warnings[3].message, "");
        assert_eq!(warnings[0].severity.as_deref(), Some("critical"));
    }

    #[test]
    fn test_country_sequence_prefers_spans() {
        let section = Section {
            spans: vec![
                Span { country_code: Some("FRA".to_string()) },
                Span { country_code: Some("FRA".to_string()) },
                Span { country_code: Some("ITA".to_string()) },
            ],
            ..Section::default()
        };
        let tolls = vec!["ITA".to_string()];
        assert_eq!(country_sequence(&[section], &tolls), vec!["FRA", "ITA"]);
        assert_eq!(country_sequence(&[Section::default()], &tolls), vec!["ITA"]);
    }

    #[test]
    fn test_geography_internationality() {
        assert_eq!(derive_geography(vec![]).is_international, None);
        assert_eq!(derive_geography(vec!["FRA".into()]).is_international, Some(false));
        let geography = derive_geography(vec!["FRA".into(), "GBR".into()]);
        assert_eq!(geography.is_international, Some(true));
        assert_eq!(geography.origin_country.as_deref(), Some("FRA"));
        assert_eq!(geography.destination_country.as_deref(), Some("GBR"));
    }

    #[test]
    fn test_risk_flags() {
        let geography = derive_geography(vec!["DEU".into(), "DNK".into(), "SWE".into()]);
        let flags = derive_risk_flags(&geography, false, AlpsMatch::default());
        assert!(flags.scandinavia);
        assert!(!flags.uk && !flags.baltic && !flags.island && !flags.crosses_alps);

        let geography = derive_geography(vec!["FRA".into(), "GBR".into()]);
        let flags = derive_risk_flags(&geography, true, AlpsMatch::default());
        assert!(flags.uk && flags.island);
        let flags = derive_risk_flags(&geography, false, AlpsMatch::default());
        assert!(!flags.island);
    }

    #[test]
    fn test_alpine_country_alone_does_not_cross_alps() {
        let geography = derive_geography(vec!["CHE".into(), "AUT".into(), "ITA".into()]);
        let flags = derive_risk_flags(&geography, false, AlpsMatch::default());
        assert!(!flags.crosses_alps);
        let flags = derive_risk_flags(&geography, false, AlpsMatch { frejus: false, mont_blanc: true });
        assert!(flags.crosses_alps);
    }
}
