//! Tunnel recognition in free-text driving instructions and notices.
//!
//! Text is compared after Unicode decomposition with combining marks
//! removed, so "Fréjus", "FREJUS" and "Frejus" are the same word.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::geofence::{FREJUS, MONT_BLANC};

/// A named tunnel recognizable by any of its spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownTunnel {
    pub name: &'static str,
    pub category: &'static str,
    pub country: &'static str,
    /// Place or pass names in any language. These are also towns and
    /// resorts, so they only count next to tunnel wording.
    pub names: &'static [&'static str],
    /// Phrases that identify the tunnel on their own.
    pub phrases: &'static [&'static str],
}

/// Checked in order, first hit wins.
pub static KNOWN_TUNNELS: &[KnownTunnel] = &[
    KnownTunnel {
        name: FREJUS.name,
        category: FREJUS.category,
        country: FREJUS.country,
        names: &["fréjus"],
        phrases: &[],
    },
    KnownTunnel {
        name: MONT_BLANC.name,
        category: MONT_BLANC.category,
        country: MONT_BLANC.country,
        names: &["mont blanc", "monte bianco"],
        phrases: &[],
    },
    KnownTunnel {
        name: "Great St Bernard Tunnel",
        category: "alpine",
        country: "CH-IT",
        names: &[
            "grand saint bernard",
            "grand st bernard",
            "gran san bernardo",
            "great st bernard",
            "great saint bernard",
        ],
        phrases: &[],
    },
    KnownTunnel {
        name: "Gotthard Road Tunnel",
        category: "alpine",
        country: "CH",
        names: &["gotthard", "gottardo", "gothard"],
        phrases: &[],
    },
    KnownTunnel {
        name: "San Bernardino Tunnel",
        category: "alpine",
        country: "CH",
        names: &["san bernardino"],
        phrases: &[],
    },
    KnownTunnel {
        name: "Arlberg Road Tunnel",
        category: "alpine",
        country: "AT",
        names: &["arlberg"],
        phrases: &[],
    },
    KnownTunnel {
        name: "Tauern Road Tunnel",
        category: "alpine",
        country: "AT",
        names: &["tauern"],
        phrases: &[],
    },
    KnownTunnel {
        name: "Karawanks Tunnel",
        category: "alpine",
        country: "AT-SI",
        names: &["karawanken", "karavanke", "karawanks"],
        phrases: &[],
    },
    KnownTunnel {
        name: "Channel Tunnel",
        category: "subsea",
        country: "FR-GB",
        names: &[],
        phrases: &["channel tunnel", "eurotunnel", "tunnel sous la manche", "le shuttle"],
    },
    KnownTunnel {
        name: "Lærdal Tunnel",
        category: "mountain",
        country: "NO",
        names: &["lærdal", "laerdal"],
        phrases: &[],
    },
    KnownTunnel {
        name: "Gran Sasso Tunnel",
        category: "mountain",
        country: "IT",
        names: &["gran sasso"],
        phrases: &[],
    },
];

/// Words that mark a text as talking about a tunnel.
const TUNNEL_KEYWORDS: &[&str] = &["tunnel", "traforo", "galleria"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextTunnelMatch {
    Known(&'static KnownTunnel),
    /// Tunnel wording without a known name; the name is a best-effort guess.
    Generic(Option<String>),
}

type TextMatcher = fn(&str, &str) -> Option<TextTunnelMatch>;

/// Named tunnels first, the generic keyword fallback last.
const TEXT_MATCHERS: &[TextMatcher] = &[match_known_tunnel, match_generic_tunnel];

/// Lowercases, strips diacritics and turns separators into single spaces.
pub fn normalize_text(text: &str) -> String {
    let folded: String = text
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            '-' | '_' | '\'' | '’' | '.' | ',' | ';' | ':' | '(' | ')' | '"' => ' ',
            other => other,
        })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Recognizes a tunnel mention in one instruction or notice title.
pub fn match_tunnel_text(text: &str) -> Option<TextTunnelMatch> {
    let normalized = normalize_text(text);
    if normalized.is_empty() {
        return None;
    }
    TEXT_MATCHERS
        .iter()
        .find_map(|matcher| matcher(&normalized, text))
}

fn mentions_tunnel(normalized: &str) -> bool {
    TUNNEL_KEYWORDS
        .iter()
        .any(|keyword| normalized.contains(keyword))
}

fn match_known_tunnel(normalized: &str, _original: &str) -> Option<TextTunnelMatch> {
    let contains = |spelling: &&str| normalized.contains(&normalize_text(spelling));
    let has_keyword = mentions_tunnel(normalized);
    KNOWN_TUNNELS
        .iter()
        .find(|tunnel| {
            tunnel.phrases.iter().any(contains) || (has_keyword && tunnel.names.iter().any(contains))
        })
        .map(TextTunnelMatch::Known)
}

fn match_generic_tunnel(normalized: &str, original: &str) -> Option<TextTunnelMatch> {
    mentions_tunnel(normalized)
        .then(|| TextTunnelMatch::Generic(extract_generic_tunnel_name(original)))
}

/// Pulls a tunnel name out of phrases like "enter the Xyz tunnel" or
/// "traforo del Xyz". Only capitalized words are taken as the name.
pub fn extract_generic_tunnel_name(text: &str) -> Option<String> {
    let words: Vec<&str> = text
        .split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric() && c != '-' && c != '\''))
        .filter(|word| !word.is_empty())
        .collect();

    english_tunnel_name(&words).or_else(|| italian_tunnel_name(&words))
}

fn english_tunnel_name(words: &[&str]) -> Option<String> {
    const LEAD_INS: &[&str] = &["enter", "through", "via", "take"];

    for (index, word) in words.iter().enumerate() {
        if !LEAD_INS.contains(&word.to_lowercase().as_str()) {
            continue;
        }
        let mut rest = &words[index + 1..];
        if rest.first().is_some_and(|w| w.eq_ignore_ascii_case("the")) {
            rest = &rest[1..];
        }
        let Some(end) = rest.iter().position(|w| w.eq_ignore_ascii_case("tunnel")) else {
            continue;
        };
        let name = &rest[..end];
        if !name.is_empty() && name.iter().all(|w| is_capitalized(w)) {
            return Some(format!("{} Tunnel", name.join(" ")));
        }
    }
    None
}

fn italian_tunnel_name(words: &[&str]) -> Option<String> {
    const ARTICLES: &[&str] = &["del", "della", "dello", "di"];
    const PARTICLES: &[&str] = &["di", "de", "del", "della", "dello", "dei", "delle", "degli"];

    let index = words
        .iter()
        .position(|w| w.to_lowercase() == "traforo")?;
    let mut rest = &words[index + 1..];
    let mut article = None;
    if let Some(first) = rest.first() {
        if ARTICLES.contains(&first.to_lowercase().as_str()) {
            article = Some(first.to_lowercase());
            rest = &rest[1..];
        }
    }
    // Lowercase particles are kept only between capitalized words.
    let mut end = 0;
    let mut cursor = 0;
    while let Some(word) = rest.get(cursor) {
        if is_capitalized(word) {
            cursor += 1;
            end = cursor;
        } else if end > 0
            && PARTICLES.contains(&word.to_lowercase().as_str())
            && rest.get(cursor + 1).is_some_and(|next| is_capitalized(next))
        {
            cursor += 1;
        } else {
            break;
        }
    }
    let name = &rest[..end];
    if name.is_empty() {
        return None;
    }
    Some(match article {
        Some(article) => format!("Traforo {} {}", article, name.join(" ")),
        None => format!("Traforo {}", name.join(" ")),
    })
}

fn is_capitalized(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase)
}
