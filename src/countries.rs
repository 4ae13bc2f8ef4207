//! Country code sets used for routing-risk flags.
//!
//! The provider reports ISO 3166-1 alpha-3 codes. European alpha-2 codes
//! (and "UK") are mapped to their alpha-3 form so that one country never
//! appears under two codes; other codes are kept as sent.

const ALPHA2_TO_ALPHA3: &[(&str, &str)] = &[
    ("AD", "AND"),
    ("AL", "ALB"),
    ("AT", "AUT"),
    ("BA", "BIH"),
    ("BE", "BEL"),
    ("BG", "BGR"),
    ("BY", "BLR"),
    ("CH", "CHE"),
    ("CY", "CYP"),
    ("CZ", "CZE"),
    ("DE", "DEU"),
    ("DK", "DNK"),
    ("EE", "EST"),
    ("ES", "ESP"),
    ("FI", "FIN"),
    ("FO", "FRO"),
    ("FR", "FRA"),
    ("GB", "GBR"),
    ("GI", "GIB"),
    ("GR", "GRC"),
    ("HR", "HRV"),
    ("HU", "HUN"),
    ("IE", "IRL"),
    ("IS", "ISL"),
    ("IT", "ITA"),
    ("LI", "LIE"),
    ("LT", "LTU"),
    ("LU", "LUX"),
    ("LV", "LVA"),
    ("MC", "MCO"),
    ("MD", "MDA"),
    ("ME", "MNE"),
    ("MK", "MKD"),
    ("MT", "MLT"),
    ("NL", "NLD"),
    ("NO", "NOR"),
    ("PL", "POL"),
    ("PT", "PRT"),
    ("RO", "ROU"),
    ("RS", "SRB"),
    ("RU", "RUS"),
    ("SE", "SWE"),
    ("SI", "SVN"),
    ("SK", "SVK"),
    ("SM", "SMR"),
    ("TR", "TUR"),
    ("UA", "UKR"),
    ("UK", "GBR"),
    ("VA", "VAT"),
    ("XK", "XKX"),
];

const UK: &[&str] = &["GBR"];

const SCANDINAVIA: &[&str] = &["NOR", "SWE", "DNK", "FIN"];

const BALTIC: &[&str] = &["EST", "LVA", "LTU"];

const ISLAND: &[&str] = &["GBR", "IRL", "ISL", "MLT", "CYP"];

/// Trims, uppercases and maps a country code to alpha-3 where known.
/// Blank codes yield `None`.
pub fn normalize_country_code(code: &str) -> Option<String> {
    let code = code.trim().to_ascii_uppercase();
    if code.is_empty() {
        return None;
    }
    let canonical = ALPHA2_TO_ALPHA3
        .iter()
        .find(|(alpha2, _)| *alpha2 == code)
        .map_or(code, |(_, alpha3)| (*alpha3).to_string());
    Some(canonical)
}

fn in_set(set: &[&str], code: &str) -> bool {
    normalize_country_code(code).is_some_and(|code| set.contains(&code.as_str()))
}

pub fn is_uk(code: &str) -> bool {
    in_set(UK, code)
}

pub fn is_scandinavian(code: &str) -> bool {
    in_set(SCANDINAVIA, code)
}

pub fn is_baltic(code: &str) -> bool {
    in_set(BALTIC, code)
}

pub fn is_island(code: &str) -> bool {
    in_set(ISLAND, code)
}
