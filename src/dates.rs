//! Biographical date-string parsing.
//!
//! Roster date fields arrive as free text ("470 BC-399 BC", "c. 1225",
//! "1879-1955 [disputed]"). The parser reduces such a string to a single
//! signed activity year, or `None` when nothing year-like is present. It
//! never fails: an unparseable date only excludes the entity from temporal
//! adjustment downstream.

use std::sync::OnceLock;

use regex::Regex;

fn bracket_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[[^\]]*\]").expect("bracket pattern compiles"))
}

fn era_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(?:BCE|BC)\b").expect("era pattern compiles"))
}

fn circa_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bc(?:irca)?\.?\s*").expect("circa pattern compiles"))
}

fn year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\d{1,4}\b").expect("year pattern compiles"))
}

/// Extracts a single reference year from an unstructured date string.
///
/// Bracketed annotations and circa markers are stripped first. The first
/// two standalone digit runs are taken as years; two years average to
/// their integer midpoint. A word-boundary `BC`/`BCE` anywhere in the
/// string negates the result. Returns `None` when no standalone year
/// parses.
///
/// ```
/// use eminence::dates::parse_year;
///
/// assert_eq!(parse_year("470 BC-399 BC"), Some(-434));
/// assert_eq!(parse_year("c. 1225 - 1274"), Some(1249));
/// assert_eq!(parse_year("date unknown"), None);
/// ```
#[must_use]
pub fn parse_year(date: &str) -> Option<i32> {
    let stripped = bracket_re().replace_all(date, " ");
    let stripped = stripped.replace('*', " ");
    let bce = era_re().is_match(&stripped);
    let stripped = circa_re().replace_all(&stripped, "");

    let mut years = year_re()
        .find_iter(&stripped)
        .take(2)
        .filter_map(|m| m.as_str().parse::<i32>().ok());
    let first = years.next()?;
    let year = match years.next() {
        Some(second) => (first + second) / 2,
        None => first,
    };
    Some(if bce { -year } else { year })
}
