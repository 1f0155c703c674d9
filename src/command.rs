//! Route command phrases
//!
//! Turns a recognized utterance such as "best route to Interlaken please"
//! into the place names the planner needs.

/// Words that mark an utterance as a route request
const TRIGGER_KEYWORDS: [&str; 5] = ["best route", "drive to", "directions", "navigate", "route"];

/// Stripped from an utterance to leave the destination; longest phrases first
const FILLER_KEYWORDS: [&str; 7] = [
    "best route",
    "drive to",
    "directions",
    "navigate",
    "route",
    "please",
    "to",
];

const CURRENT_LOCATION_PHRASES: [&str; 4] = ["current location", "here", "home", "my location"];

/// Origin and destination named in a single utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRequest {
    /// `None` means current location
    pub origin: Option<String>,
    pub destination: Option<String>,
}

fn words(text: &str) -> Vec<&str> {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| matches!(c, ',' | '.' | '!' | '?')))
        .filter(|w| !w.is_empty())
        .collect()
}

/// Length in words of the keyword starting at `words[0]`, if any
fn keyword_at(words: &[&str], keywords: &[&str]) -> Option<usize> {
    keywords.iter().find_map(|keyword| {
        let parts: Vec<&str> = keyword.split(' ').collect();
        let matches = words.len() >= parts.len()
            && parts
                .iter()
                .zip(words)
                .all(|(part, word)| word.eq_ignore_ascii_case(part));
        matches.then_some(parts.len())
    })
}

fn strip_keywords(words: &[&str]) -> Option<String> {
    let mut kept = Vec::with_capacity(words.len());
    let mut i = 0;
    while i < words.len() {
        match keyword_at(&words[i..], &FILLER_KEYWORDS) {
            Some(len) => i += len,
            None => {
                kept.push(words[i]);
                i += 1;
            }
        }
    }
    let text = kept.join(" ");
    (!text.is_empty()).then_some(text)
}

/// Whether the utterance asks for a route at all
#[must_use]
pub fn is_route_command(utterance: &str) -> bool {
    let words = words(utterance);
    (0..words.len()).any(|i| keyword_at(&words[i..], &TRIGGER_KEYWORDS).is_some())
}

/// Destination left after removing route keywords, `None` if nothing remains
#[must_use]
pub fn extract_destination(utterance: &str) -> Option<String> {
    strip_keywords(&words(utterance))
}

/// Phrases that stand for "where I am now"
#[must_use]
pub fn is_current_location(phrase: &str) -> bool {
    let normalized = words(phrase).join(" ").to_lowercase();
    CURRENT_LOCATION_PHRASES.contains(&normalized.as_str())
}

/// Split "route from A to B" into both endpoints
///
/// Without a "from" part the whole utterance is the destination and the
/// origin is the current location.
#[must_use]
pub fn parse_route_request(utterance: &str) -> RouteRequest {
    let words = words(utterance);
    let from = words.iter().position(|w| w.eq_ignore_ascii_case("from"));
    let Some(from) = from else {
        return RouteRequest {
            origin: None,
            destination: strip_keywords(&words),
        };
    };

    let after_from = &words[from + 1..];
    let to = after_from.iter().position(|w| w.eq_ignore_ascii_case("to"));
    let (origin_words, destination_words): (&[&str], Vec<&str>) = match to {
        Some(to) => {
            let mut destination = words[..from].to_vec();
            destination.extend_from_slice(&after_from[to + 1..]);
            (&after_from[..to], destination)
        }
        // "directions to B from A"
        None => (after_from, words[..from].to_vec()),
    };

    let origin = Some(origin_words.join(" "))
        .filter(|o| !o.is_empty() && !is_current_location(o));
    RouteRequest {
        origin,
        destination: strip_keywords(&destination_words),
    }
}
