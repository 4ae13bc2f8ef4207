//! Upstream truck-routing response model.
//!
//! Every field is optional and tolerant: a value of the wrong shape is
//! treated as absent, and malformed elements of a list are dropped one by
//! one instead of failing the surrounding structure.

use serde::Deserialize;
use serde::de::{DeserializeOwned, Deserializer};
use serde_json::Value;

use crate::polyline::Point;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderResponse {
    #[serde(deserialize_with = "lenient_seq")]
    pub routes: Vec<Route>,
}

impl ProviderResponse {
    /// Parses a response document. Only non-JSON input or a non-object
    /// top level is an error.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Route {
    #[serde(deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_seq")]
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Section {
    #[serde(deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(rename = "type", deserialize_with = "lenient")]
    pub section_type: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub transport: Option<Transport>,
    #[serde(deserialize_with = "lenient")]
    pub summary: Option<Summary>,
    #[serde(deserialize_with = "lenient")]
    pub travel_summary: Option<Summary>,
    #[serde(deserialize_with = "lenient")]
    pub polyline: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub departure: Option<Stop>,
    #[serde(deserialize_with = "lenient")]
    pub arrival: Option<Stop>,
    #[serde(deserialize_with = "lenient_seq")]
    pub tolls: Vec<Toll>,
    #[serde(deserialize_with = "lenient_seq")]
    pub actions: Vec<Action>,
    #[serde(deserialize_with = "lenient_seq")]
    pub turn_by_turn_actions: Vec<Action>,
    #[serde(deserialize_with = "lenient_seq")]
    pub notices: Vec<Notice>,
    #[serde(deserialize_with = "lenient_seq")]
    pub spans: Vec<Span>,
}

impl Section {
    fn effective_summary(&self) -> Option<&Summary> {
        self.summary.as_ref().or(self.travel_summary.as_ref())
    }

    /// Length in meters, 0 when unknown.
    pub fn length_m(&self) -> f64 {
        self.effective_summary()
            .and_then(|summary| summary.length)
            .unwrap_or(0.0)
    }

    /// Duration in seconds, 0 when unknown.
    pub fn duration_s(&self) -> f64 {
        self.effective_summary()
            .and_then(|summary| summary.duration)
            .unwrap_or(0.0)
    }

    /// True when the section type or transport mode says "ferry".
    pub fn is_ferry_mode(&self) -> bool {
        let mode = self.transport.as_ref().and_then(|t| t.mode.as_deref());
        [self.section_type.as_deref(), mode]
            .into_iter()
            .flatten()
            .any(|value| value.trim().eq_ignore_ascii_case("ferry"))
    }

    /// Both action lists, summary actions first.
    pub fn all_actions(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter().chain(self.turn_by_turn_actions.iter())
    }

    pub fn departure_point(&self) -> Option<Point> {
        self.departure.as_ref().and_then(Stop::point)
    }

    pub fn arrival_point(&self) -> Option<Point> {
        self.arrival.as_ref().and_then(Stop::point)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Transport {
    #[serde(deserialize_with = "lenient")]
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Summary {
    #[serde(deserialize_with = "lenient")]
    pub length: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Stop {
    #[serde(deserialize_with = "lenient")]
    pub place: Option<Place>,
}

impl Stop {
    pub fn point(&self) -> Option<Point> {
        self.place
            .as_ref()
            .and_then(|place| place.location)
            .map(|location| Point::new(location.lat, location.lng))
            .filter(Point::is_valid)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Place {
    #[serde(deserialize_with = "lenient")]
    pub location: Option<Location>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Toll {
    #[serde(deserialize_with = "lenient")]
    pub country_code: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub toll_system: Option<String>,
    #[serde(deserialize_with = "lenient_seq")]
    pub fares: Vec<Fare>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Fare {
    #[serde(deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub price: Option<Price>,
    #[serde(deserialize_with = "lenient")]
    pub converted_price: Option<Price>,
}

impl Fare {
    /// The fare's own price, or the converted one when that is all there is.
    pub fn effective_price(&self) -> Option<&Price> {
        self.price.as_ref().or(self.converted_price.as_ref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Price {
    pub value: Option<Value>,
    #[serde(deserialize_with = "lenient")]
    pub currency: Option<String>,
}

impl Price {
    /// Decimal amount from a numeric string or a JSON number.
    pub fn amount(&self) -> Option<f64> {
        let amount = match self.value.as_ref()? {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        };
        amount.filter(|value| value.is_finite())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Action {
    #[serde(deserialize_with = "lenient")]
    pub action: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub instruction: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Notice {
    #[serde(deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub code: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub severity: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Span {
    #[serde(deserialize_with = "lenient")]
    pub country_code: Option<String>,
}

/// Any value that does not fit `T` becomes `T::default()`.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Keeps the well-formed elements of an array; anything else is empty.
fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}
