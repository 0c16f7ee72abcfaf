//! Alias resolution.
//!
//! Names arrive in many spellings: native-script forms, initials,
//! surname-only shorthand, and "native (latin)" parenthetical glosses.
//! [`AliasTable`] maps all of them onto one canonical id so that counts,
//! edges, and ranks never split across spellings of the same figure.
//!
//! The table is configuration data, not code: it loads from a JSON object
//! of `alias → canonical` pairs, and a bundled default ships with the
//! crate (`data/aliases.json`).

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::entity::FigureId;
use crate::error::AliasError;

const BUNDLED_TABLE: &str = include_str!("../data/aliases.json");

fn paren_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(([^)]*)\)").expect("parenthetical pattern compiles"))
}

/// Static many-to-one table mapping alias spellings to canonical ids.
///
/// Resolution is idempotent: a canonical id resolves to itself. Table
/// construction enforces this by rejecting chained mappings (an alias
/// whose canonical form is itself an alias for something else).
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    map: HashMap<String, String>,
}

impl AliasTable {
    /// Creates a table with no mappings. Every name resolves to itself.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a table from `(alias, canonical)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`AliasError::Chained`] if some alias maps to a name that
    /// is itself an alias for a different name.
    pub fn from_pairs<A, C>(
        pairs: impl IntoIterator<Item = (A, C)>,
    ) -> std::result::Result<Self, AliasError>
    where
        A: Into<String>,
        C: Into<String>,
    {
        let map = pairs
            .into_iter()
            .map(|(a, c)| (a.into(), c.into()))
            .collect();
        Self::validated(map)
    }

    /// Parses a table from a JSON object of string pairs.
    ///
    /// # Errors
    ///
    /// Returns [`AliasError::Parse`] for malformed JSON and
    /// [`AliasError::Chained`] for chained mappings.
    pub fn from_json_str(json: &str) -> std::result::Result<Self, AliasError> {
        let map: HashMap<String, String> = serde_json::from_str(json)?;
        Self::validated(map)
    }

    /// Loads a table from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`AliasError::Io`] if the file cannot be read, otherwise
    /// as [`AliasTable::from_json_str`].
    pub fn load(path: impl AsRef<Path>) -> std::result::Result<Self, AliasError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Loads the alias table bundled with the crate.
    ///
    /// # Errors
    ///
    /// Returns an error only if the bundled data file was edited into an
    /// invalid state.
    pub fn bundled() -> std::result::Result<Self, AliasError> {
        Self::from_json_str(BUNDLED_TABLE)
    }

    fn validated(map: HashMap<String, String>) -> std::result::Result<Self, AliasError> {
        for (alias, canonical) in &map {
            if let Some(onward) = map.get(canonical) {
                if onward != canonical {
                    return Err(AliasError::Chained {
                        alias: alias.clone(),
                        canonical: canonical.clone(),
                        onward: onward.clone(),
                    });
                }
            }
        }
        Ok(Self { map })
    }

    /// Resolves a raw name to its canonical id.
    ///
    /// A non-empty parenthetical segment, if present, replaces the raw
    /// name as the lookup candidate ("소크라테스 (Socrates)" resolves via
    /// "Socrates"). Unmapped candidates are assumed canonical and
    /// returned as-is, trimmed.
    #[must_use]
    pub fn resolve(&self, raw: &str) -> FigureId {
        let candidate = paren_re()
            .captures(raw)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .filter(|inner| !inner.is_empty())
            .unwrap_or_else(|| raw.trim());
        match self.map.get(candidate) {
            Some(canonical) => FigureId::new(canonical.clone()),
            None => FigureId::new(candidate),
        }
    }

    /// All alias spellings that map to the given canonical id, sorted.
    #[must_use]
    pub fn aliases_of(&self, canonical: &str) -> Vec<String> {
        let mut aliases: Vec<String> = self
            .map
            .iter()
            .filter(|(alias, target)| *target == canonical && *alias != canonical)
            .map(|(alias, _)| alias.clone())
            .collect();
        aliases.sort();
        aliases
    }

    /// Number of alias mappings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if the table has no mappings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
