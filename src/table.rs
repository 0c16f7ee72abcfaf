//! In-memory tabular interchange.
//!
//! Every pipeline stage consumes and produces tables as plain
//! column-addressed string grids. Reading and writing actual files is the
//! host application's job; this module only guarantees that a table's shape
//! is coherent and that required columns exist before a stage touches them.

use crate::error::SchemaError;

/// Column names used by the persisted tabular schemas.
///
/// Centralized so that producers and consumers cannot drift apart.
pub mod columns {
    /// Canonical entity name column, shared by every table.
    pub const NAME: &str = "Name";
    /// Raw biographical date string.
    pub const DATE: &str = "Date";
    /// Group label (century bucket).
    pub const CENTURY: &str = "Century";
    /// Canonical source locator for the entity's page text.
    pub const SOURCE_LOCATOR: &str = "SourceLocator";
    /// Cumulative raw mention count.
    pub const RAW_MENTION_COUNT: &str = "RawMentionCount";
    /// Edge source entity.
    pub const SOURCE: &str = "Source";
    /// Edge target entity.
    pub const TARGET: &str = "Target";
    /// Normalized in-degree centrality.
    pub const IN_DEGREE_CENTRALITY: &str = "InDegreeCentrality";
    /// Normalized out-degree centrality.
    pub const OUT_DEGREE_CENTRALITY: &str = "OutDegreeCentrality";
    /// Directed closeness centrality.
    pub const CLOSENESS_CENTRALITY: &str = "ClosenessCentrality";
    /// Normalized betweenness centrality.
    pub const BETWEENNESS_CENTRALITY: &str = "BetweennessCentrality";
    /// Eigenvector centrality.
    pub const EIGENVECTOR_CENTRALITY: &str = "EigenvectorCentrality";
    /// Unnormalized in-degree on the collapsed graph.
    pub const RAW_IN_DEGREE_COUNT: &str = "RawInDegreeCount";
    /// Resolved activity year.
    pub const ACTIVITY_YEAR: &str = "ActivityYear";
    /// Age-adjusted in-degree centrality.
    pub const ADJUSTED_IN_DEGREE_CENTRALITY: &str = "AdjustedInDegreeCentrality";
    /// Membership flag for the first compared list.
    pub const IN_LIST1_TOP_N: &str = "InList1TopN";
    /// Rank in the first compared list.
    pub const LIST1_RANK: &str = "List1Rank";
    /// Membership flag for the second compared list.
    pub const IN_LIST2_TOP_N: &str = "InList2TopN";
    /// Rank in the second compared list.
    pub const LIST2_RANK: &str = "List2Rank";
    /// Group member count.
    pub const MEMBERS: &str = "Members";
    /// Group mean in-degree centrality.
    pub const MEAN_IN_DEGREE: &str = "MeanInDegree";
    /// Group mean adjusted centrality.
    pub const MEAN_ADJUSTED: &str = "MeanAdjusted";
    /// Top-ranked member of a group.
    pub const TOP_FIGURE: &str = "TopFigure";
}

/// Column-addressed table of string cells.
///
/// Rows always match the column count; [`RawTable::push_row`] rejects
/// anything else, so a constructed table is shape-coherent by
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Creates an empty table with the given name and column headers.
    ///
    /// The name only appears in error messages and logs.
    #[must_use]
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Convenience constructor from static column names.
    #[must_use]
    pub fn with_columns(name: impl Into<String>, columns: &[&str]) -> Self {
        Self::new(name, columns.iter().map(|c| (*c).to_string()).collect())
    }

    /// Table name used in diagnostics.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column headers in declaration order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of data rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Appends a row.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::RowWidth`] if the row's field count does not
    /// match the column count.
    pub fn push_row(&mut self, row: Vec<String>) -> std::result::Result<(), SchemaError> {
        if row.len() != self.columns.len() {
            return Err(SchemaError::RowWidth {
                table: self.name.clone(),
                row: self.rows.len(),
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Iterates over data rows.
    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Position of a column by exact name.
    #[must_use]
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Position of a required column.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::MissingColumn`] if the column is absent.
    pub fn require_column(&self, column: &str) -> std::result::Result<usize, SchemaError> {
        self.column_index(column).ok_or_else(|| SchemaError::MissingColumn {
            table: self.name.clone(),
            column: column.to_string(),
        })
    }

    /// Rejects tables with no data rows.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Empty`] if there are no rows.
    pub fn require_rows(&self) -> std::result::Result<(), SchemaError> {
        if self.rows.is_empty() {
            return Err(SchemaError::Empty {
                table: self.name.clone(),
            });
        }
        Ok(())
    }

    /// Cell at (row, column index), if both exist.
    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RawTable {
        let mut table = RawTable::with_columns("roster", &[columns::NAME, columns::DATE]);
        table
            .push_row(vec!["Socrates".to_string(), "470 BC-399 BC".to_string()])
            .unwrap();
        table
            .push_row(vec!["Plato".to_string(), "428 BC-348 BC".to_string()])
            .unwrap();
        table
    }

    #[test]
    fn test_push_row_and_iterate() {
        let table = sample();
        assert_eq!(table.row_count(), 2);
        let names: Vec<&str> = table.rows().map(|r| r[0].as_str()).collect();
        assert_eq!(names, vec!["Socrates", "Plato"]);
    }

    #[test]
    fn test_push_row_rejects_wrong_width() {
        let mut table = sample();
        let err = table.push_row(vec!["Aristotle".to_string()]).unwrap_err();
        match err {
            SchemaError::RowWidth { table, row, expected, actual } => {
                assert_eq!(table, "roster");
                assert_eq!(row, 2);
                assert_eq!(expected, 2);
                assert_eq!(actual, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_require_column_found() {
        let table = sample();
        assert_eq!(table.require_column(columns::DATE).unwrap(), 1);
    }

    #[test]
    fn test_require_column_missing() {
        let table = sample();
        let err = table.require_column(columns::CENTURY).unwrap_err();
        assert!(matches!(err, SchemaError::MissingColumn { .. }));
        assert!(format!("{err}").contains("Century"));
    }

    #[test]
    fn test_require_rows_on_empty() {
        let table = RawTable::with_columns("edges", &[columns::SOURCE, columns::TARGET]);
        assert!(table.require_rows().is_err());
        assert!(sample().require_rows().is_ok());
    }

    #[test]
    fn test_cell_lookup() {
        let table = sample();
        assert_eq!(table.cell(1, 0), Some("Plato"));
        assert_eq!(table.cell(2, 0), None);
        assert_eq!(table.cell(0, 9), None);
    }
}
