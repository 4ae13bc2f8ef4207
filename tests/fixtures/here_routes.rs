//! Upstream truck-routing responses shaped like the provider's v8 output.
//!
//! Polylines were encoded at precision 5 from the listed points.

use route_facts::{Point, ProviderResponse};
use serde_json::{Value, json};

pub const PARIS: Point = Point::new(48.8566, 2.3522);
pub const LYON: Point = Point::new(45.764, 4.8357);
pub const TURIN: Point = Point::new(45.07, 7.68);
pub const CALAIS: Point = Point::new(50.9513, 1.8587);
pub const DOVER: Point = Point::new(51.1279, 1.3134);

/// Paris -> (47.0, 4.0) -> Lyon.
pub const PARIS_LYON_POLYLINE: &str = "BF4pmqJotrO3zqL46hK_sxHknjF";

/// Paris -> Fréjus tunnel center -> Turin.
pub const PARIS_TURIN_FREJUS_POLYLINE: &str = "BF4pmqJotrOvv2Ww7ta3iNo3iG";

/// Fréjus approach with latitude and longitude exchanged.
pub const SWAPPED_FREJUS_POLYLINE: &str = "BF4o5oBo6vzIoqDnnH";

/// Precision 0 with coordinates in the hundreds of thousands of degrees.
pub const CORRUPT_POLYLINE: &str = "BAgkxHi_9nB_h7Z9-9nB";

pub fn place(point: Point) -> Value {
    json!({ "type": "place", "location": { "lat": point.lat, "lng": point.lng } })
}

pub fn vehicle_section(id: &str, from: Point, to: Point, length_m: u64, duration_s: u64) -> Value {
    json!({
        "id": id,
        "type": "vehicle",
        "transport": { "mode": "truck" },
        "departure": { "place": place(from) },
        "arrival": { "place": place(to) },
        "summary": { "length": length_m, "duration": duration_s, "baseDuration": duration_s }
    })
}

pub fn ferry_section(id: &str, from: Point, to: Point) -> Value {
    json!({
        "id": id,
        "type": "ferry",
        "transport": { "mode": "ferry" },
        "departure": { "place": place(from) },
        "arrival": { "place": place(to) },
        "summary": { "length": 42000, "duration": 5400 }
    })
}

pub fn with(mut section: Value, key: &str, value: Value) -> Value {
    section[key] = value;
    section
}

pub fn instructions(texts: &[&str]) -> Value {
    Value::Array(
        texts
            .iter()
            .map(|text| json!({ "action": "continue", "instruction": text, "offset": 0 }))
            .collect(),
    )
}

pub fn toll(country: &str, prices: &[&str]) -> Value {
    let fares: Vec<Value> = prices
        .iter()
        .enumerate()
        .map(|(index, price)| {
            json!({
                "id": format!("fare-{index}"),
                "name": "Truck fare",
                "price": { "type": "value", "currency": "EUR", "value": price },
                "paymentMethods": ["cash", "creditCard"]
            })
        })
        .collect();
    json!({ "countryCode": country, "tollSystem": "APRR", "fares": fares })
}

pub fn notice(code: &str, title: &str) -> Value {
    json!({ "title": title, "code": code, "severity": "critical" })
}

pub fn response_value(sections: Vec<Value>) -> Value {
    json!({ "routes": [{ "id": "route-1", "sections": sections }] })
}

pub fn response(sections: Vec<Value>) -> ProviderResponse {
    ProviderResponse::from_value(response_value(sections)).expect("fixture response parses")
}

/// A single 574 km / 6.5 h truck section with nothing noteworthy on it.
pub fn plain_paris_lyon() -> ProviderResponse {
    let section = with(
        vehicle_section("s1", PARIS, LYON, 574_000, 23_400),
        "polyline",
        json!(PARIS_LYON_POLYLINE),
    );
    response(vec![section])
}

/// Paris to Turin through the Fréjus tunnel, with French and Italian tolls.
pub fn paris_turin_via_frejus() -> ProviderResponse {
    let mut section = vehicle_section("s1", PARIS, TURIN, 782_000, 30_600);
    section["polyline"] = json!(PARIS_TURIN_FREJUS_POLYLINE);
    section["tolls"] = json!([
        toll("FRA", &["61.20", "12.80"]),
        toll("ITA", &["18.40"]),
    ]);
    section["actions"] = instructions(&[
        "Head south on A6",
        "Enter the Fréjus Tunnel",
        "Continue on A32 toward Torino",
    ]);
    section["spans"] = json!([
        { "offset": 0, "countryCode": "FRA" },
        { "offset": 2, "countryCode": "ITA" }
    ]);
    response(vec![section])
}

/// Calais to Dover on a ferry, then a short truck leg.
pub fn calais_dover_ferry() -> ProviderResponse {
    let mut crossing = ferry_section("s1", CALAIS, DOVER);
    crossing["spans"] = json!([{ "offset": 0, "countryCode": "FRA" }]);
    let mut leg = vehicle_section("s2", DOVER, Point::new(51.2, 1.0), 25_000, 1_800);
    leg["spans"] = json!([{ "offset": 0, "countryCode": "GBR" }]);
    response(vec![crossing, leg])
}
