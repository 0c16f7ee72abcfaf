//! Entity model: figures and the roster that drives one scan pass.
//!
//! Stable canonical ids are the prerequisite for everything downstream.
//! Without them, mention counts and edges would split across spellings of
//! the same figure and every ranking would be wrong.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::alias::AliasTable;
use crate::dates::parse_year;
use crate::error::Result;
use crate::table::{columns, RawTable};

/// Canonical identifier of a figure.
///
/// The id is the alias-resolved canonical name. Every spelling of one
/// figure produces the same `FigureId`, so counts, edges, and ranks can
/// never split across spellings.
///
/// # Examples
///
/// ```
/// use eminence::FigureId;
///
/// let id = FigureId::new("Socrates");
/// assert_eq!(id.as_str(), "Socrates");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FigureId(String);

impl FigureId {
    /// Creates an id from an already-canonical name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The canonical name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FigureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FigureId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for FigureId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl Borrow<str> for FigureId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// One roster entry: a historical figure known to the analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    /// Canonical id (alias-resolved name).
    pub id: FigureId,

    /// Known alternate spellings, taken from the alias table's inverse
    /// view at roster construction.
    #[serde(default)]
    pub aliases: Vec<String>,

    /// Raw biographical date string as it appeared in the source table.
    pub date: String,

    /// Group label, a century bucket in the source data.
    pub century: String,

    /// Locator the page-text accessor uses to find this figure's text.
    pub source_locator: String,

    /// Activity year resolved from `date` once at construction; negative
    /// means BCE, `None` means the date string carried no usable year.
    pub activity_year: Option<i32>,
}

/// The ordered, deduplicated entity table for one scan pass.
///
/// Order is scan order. Duplicate canonical ids in the source table
/// collapse to their first occurrence, so an alias-resolved duplicate can
/// never be scanned twice.
///
/// # Examples
///
/// ```
/// use eminence::{AliasTable, Roster, RawTable};
/// use eminence::table::columns;
///
/// let mut table = RawTable::with_columns(
///     "roster",
///     &[columns::NAME, columns::DATE, columns::CENTURY, columns::SOURCE_LOCATOR],
/// );
/// table.push_row(vec![
///     "Socrates".into(),
///     "470 BC-399 BC".into(),
///     "5th BC".into(),
///     "wiki/Socrates".into(),
/// ])?;
///
/// let roster = Roster::from_raw(&table, &AliasTable::empty())?;
/// assert_eq!(roster.get(0).unwrap().activity_year, Some(-434));
/// # Ok::<(), eminence::EminenceError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Roster {
    figures: Vec<Figure>,
    index: HashMap<FigureId, usize>,
}

impl Roster {
    /// Builds a roster from a raw entity table.
    ///
    /// Requires the `Name`, `Date`, `Century`, and `SourceLocator`
    /// columns and at least one row. Names are alias-resolved before
    /// deduplication; activity years are parsed once here and are
    /// immutable afterwards.
    ///
    /// # Errors
    ///
    /// Returns a schema error if a required column is absent or the
    /// table has no rows.
    pub fn from_raw(table: &RawTable, aliases: &AliasTable) -> Result<Self> {
        let name_col = table.require_column(columns::NAME)?;
        let date_col = table.require_column(columns::DATE)?;
        let century_col = table.require_column(columns::CENTURY)?;
        let locator_col = table.require_column(columns::SOURCE_LOCATOR)?;
        table.require_rows()?;

        let mut roster = Self {
            figures: Vec::with_capacity(table.row_count()),
            index: HashMap::with_capacity(table.row_count()),
        };
        for row in table.rows() {
            let id = aliases.resolve(&row[name_col]);
            if roster.index.contains_key(&id) {
                continue;
            }
            let date = row[date_col].clone();
            roster.push(Figure {
                aliases: aliases.aliases_of(id.as_str()),
                activity_year: parse_year(&date),
                id,
                date,
                century: row[century_col].clone(),
                source_locator: row[locator_col].clone(),
            });
        }
        Ok(roster)
    }

    /// Builds a roster directly from figures, deduplicating by id.
    #[must_use]
    pub fn from_figures(figures: Vec<Figure>) -> Self {
        let mut roster = Self {
            figures: Vec::with_capacity(figures.len()),
            index: HashMap::with_capacity(figures.len()),
        };
        for figure in figures {
            if !roster.index.contains_key(&figure.id) {
                roster.push(figure);
            }
        }
        roster
    }

    fn push(&mut self, figure: Figure) {
        self.index.insert(figure.id.clone(), self.figures.len());
        self.figures.push(figure);
    }

    /// Number of figures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.figures.len()
    }

    /// Returns true if the roster has no figures.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.figures.is_empty()
    }

    /// Figure at a scan position.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&Figure> {
        self.figures.get(position)
    }

    /// Scan position of a figure.
    #[must_use]
    pub fn position(&self, id: &FigureId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Figure by canonical id.
    #[must_use]
    pub fn by_id(&self, id: &str) -> Option<&Figure> {
        self.index.get(id).map(|pos| &self.figures[*pos])
    }

    /// All figures in scan order.
    #[must_use]
    pub fn figures(&self) -> &[Figure] {
        &self.figures
    }

    /// Canonical ids in scan order.
    pub fn ids(&self) -> impl Iterator<Item = &FigureId> {
        self.figures.iter().map(|f| &f.id)
    }

    /// Stable digest of the ordered id sequence.
    ///
    /// Checkpoints carry this digest so a scan can never resume against
    /// a roster other than the one that produced them.
    #[must_use]
    pub fn digest(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for figure in &self.figures {
            hasher.update(figure.id.as_str().as_bytes());
            hasher.update(b"\n");
        }
        hasher.finalize().to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::RawTable;

    fn roster_table() -> RawTable {
        let mut table = RawTable::with_columns(
            "roster",
            &[columns::NAME, columns::DATE, columns::CENTURY, columns::SOURCE_LOCATOR],
        );
        for row in [
            ["Socrates", "470 BC-399 BC", "5th BC", "wiki/Socrates"],
            ["플라톤 (Plato)", "428 BC-348 BC", "5th BC", "wiki/Plato"],
            ["Kant", "1724-1804", "18th", "wiki/Immanuel_Kant"],
        ] {
            table
                .push_row(row.iter().map(|c| (*c).to_string()).collect())
                .unwrap();
        }
        table
    }

    fn aliases() -> AliasTable {
        AliasTable::from_pairs([("Kant", "Immanuel Kant")]).unwrap()
    }

    #[test]
    fn test_figure_id_display_and_borrow() {
        let id = FigureId::new("Socrates");
        assert_eq!(format!("{id}"), "Socrates");

        let mut map = HashMap::new();
        map.insert(id, 1u64);
        // Borrow<str> allows lookup without building a FigureId.
        assert_eq!(map.get("Socrates"), Some(&1));
    }

    #[test]
    fn test_from_raw_resolves_and_parses() {
        let roster = Roster::from_raw(&roster_table(), &aliases()).unwrap();
        assert_eq!(roster.len(), 3);

        let plato = roster.get(1).unwrap();
        assert_eq!(plato.id.as_str(), "Plato");
        assert_eq!(plato.activity_year, Some(-388));

        let kant = roster.by_id("Immanuel Kant").unwrap();
        assert_eq!(kant.activity_year, Some(1764));
        assert_eq!(kant.aliases, vec!["Kant".to_string()]);
    }

    #[test]
    fn test_from_raw_missing_column() {
        let table = RawTable::with_columns("roster", &[columns::NAME, columns::DATE]);
        let err = Roster::from_raw(&table, &AliasTable::empty()).unwrap_err();
        assert!(err.is_schema());
        assert!(format!("{err}").contains("Century"));
    }

    #[test]
    fn test_from_raw_empty_table() {
        let table = RawTable::with_columns(
            "roster",
            &[columns::NAME, columns::DATE, columns::CENTURY, columns::SOURCE_LOCATOR],
        );
        let err = Roster::from_raw(&table, &AliasTable::empty()).unwrap_err();
        assert!(err.is_schema());
    }

    #[test]
    fn test_duplicate_ids_collapse_to_first() {
        let mut table = roster_table();
        table
            .push_row(vec![
                "Immanuel Kant".to_string(),
                "1724".to_string(),
                "18th".to_string(),
                "wiki/Immanuel_Kant".to_string(),
            ])
            .unwrap();
        let roster = Roster::from_raw(&table, &aliases()).unwrap();
        // "Kant" (row 3) and "Immanuel Kant" (row 4) are one figure.
        assert_eq!(roster.len(), 3);
        assert_eq!(roster.by_id("Immanuel Kant").unwrap().date, "1724-1804");
    }

    #[test]
    fn test_position_follows_scan_order() {
        let roster = Roster::from_raw(&roster_table(), &aliases()).unwrap();
        assert_eq!(roster.position(&FigureId::new("Socrates")), Some(0));
        assert_eq!(roster.position(&FigureId::new("Immanuel Kant")), Some(2));
        assert_eq!(roster.position(&FigureId::new("Nobody")), None);
    }

    #[test]
    fn test_digest_tracks_order_and_content() {
        let roster = Roster::from_raw(&roster_table(), &aliases()).unwrap();
        let digest = roster.digest();
        assert_eq!(digest, roster.digest());

        let mut figures = roster.figures().to_vec();
        figures.swap(0, 1);
        let reordered = Roster::from_figures(figures);
        assert_ne!(digest, reordered.digest());
    }

    #[test]
    fn test_figure_serialization_round_trip() {
        let roster = Roster::from_raw(&roster_table(), &aliases()).unwrap();
        let figure = roster.get(0).unwrap();
        let json = serde_json::to_string(figure).unwrap();
        let back: Figure = serde_json::from_str(&json).unwrap();
        assert_eq!(*figure, back);
    }
}
