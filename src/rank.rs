//! Ranked lists and cross-list comparison.
//!
//! A [`RankList`] is an ordered top-N of canonical ids; position is
//! 1-based rank. Comparison never re-sorts or truncates its inputs, it
//! only reports membership and rank over the union of both lists.

use std::collections::HashSet;

use crate::alias::AliasTable;
use crate::entity::FigureId;
use crate::error::SchemaError;
use crate::table::{columns, RawTable};

/// An ordered list of canonical ids with a display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankList {
    label: String,
    entries: Vec<FigureId>,
}

impl RankList {
    /// Builds a list from an explicit id sequence.
    ///
    /// Duplicate ids collapse to their first occurrence, so two aliases
    /// resolved to one figure cannot occupy two ranks.
    pub fn new(label: impl Into<String>, ids: impl IntoIterator<Item = FigureId>) -> Self {
        let mut seen = HashSet::new();
        let entries = ids
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect();
        Self {
            label: label.into(),
            entries,
        }
    }

    /// Builds a top-`n` list from scored ids.
    ///
    /// Undefined scores are excluded, the rest sort descending with input
    /// order preserved on ties, and the result is truncated to `n`.
    pub fn from_scores(
        label: impl Into<String>,
        scores: impl IntoIterator<Item = (FigureId, Option<f64>)>,
        n: usize,
    ) -> Self {
        let mut defined: Vec<(FigureId, f64)> = scores
            .into_iter()
            .filter_map(|(id, score)| score.map(|s| (id, s)))
            .collect();
        defined.sort_by(|a, b| b.1.total_cmp(&a.1));

        let mut list = Self::new(label, defined.into_iter().map(|(id, _)| id));
        list.entries.truncate(n);
        list
    }

    /// Builds a list from a table's name column, resolving each entry
    /// through the alias table.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::MissingColumn`] if the table has no name
    /// column.
    pub fn from_table(
        label: impl Into<String>,
        table: &RawTable,
        aliases: &AliasTable,
    ) -> Result<Self, SchemaError> {
        let name_column = table.require_column(columns::NAME)?;
        let ids = table
            .rows()
            .map(|row| aliases.resolve(&row[name_column]))
            .collect::<Vec<_>>();
        Ok(Self::new(label, ids))
    }

    /// Display label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of ranked ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 1-based rank of an id.
    #[must_use]
    pub fn rank_of(&self, id: &FigureId) -> Option<usize> {
        self.entries.iter().position(|e| e == id).map(|p| p + 1)
    }

    /// Whether the id is ranked.
    #[must_use]
    pub fn contains(&self, id: &FigureId) -> bool {
        self.entries.iter().any(|e| e == id)
    }

    /// Ids in rank order.
    pub fn iter(&self) -> impl Iterator<Item = &FigureId> {
        self.entries.iter()
    }
}

/// Membership and rank of one figure across two compared lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonRecord {
    /// Canonical figure id.
    pub id: FigureId,
    /// Present in the first list.
    pub in_first: bool,
    /// 1-based rank in the first list, if present.
    pub first_rank: Option<usize>,
    /// Present in the second list.
    pub in_second: bool,
    /// 1-based rank in the second list, if present.
    pub second_rank: Option<usize>,
}

/// Result of comparing two rank lists.
#[derive(Debug, Clone)]
pub struct RankComparison {
    first_label: String,
    second_label: String,
    records: Vec<ComparisonRecord>,
}

impl RankComparison {
    /// Records over the union, first list's order first, then ids found
    /// only in the second list in their order.
    #[must_use]
    pub fn records(&self) -> &[ComparisonRecord] {
        &self.records
    }

    /// Labels of the compared lists.
    #[must_use]
    pub fn labels(&self) -> (&str, &str) {
        (&self.first_label, &self.second_label)
    }

    /// Number of figures present in both lists.
    #[must_use]
    pub fn overlap(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.in_first && r.in_second)
            .count()
    }

    /// Exports the comparison table. Absent ranks render as empty cells.
    #[must_use]
    pub fn to_table(&self) -> RawTable {
        let mut table = RawTable::with_columns(
            "rank_comparison",
            &[
                columns::NAME,
                columns::IN_LIST1_TOP_N,
                columns::LIST1_RANK,
                columns::IN_LIST2_TOP_N,
                columns::LIST2_RANK,
            ],
        );
        for record in &self.records {
            let rank_cell =
                |rank: Option<usize>| rank.map(|r| r.to_string()).unwrap_or_default();
            table
                .push_row(vec![
                    record.id.to_string(),
                    record.in_first.to_string(),
                    rank_cell(record.first_rank),
                    record.in_second.to_string(),
                    rank_cell(record.second_rank),
                ])
                .expect("row matches declared columns");
        }
        table
    }
}

/// Compares two rank lists over their union.
#[must_use]
pub fn compare(first: &RankList, second: &RankList) -> RankComparison {
    let mut ids: Vec<FigureId> = first.iter().cloned().collect();
    for id in second.iter() {
        if !first.contains(id) {
            ids.push(id.clone());
        }
    }

    let records = ids
        .into_iter()
        .map(|id| {
            let first_rank = first.rank_of(&id);
            let second_rank = second.rank_of(&id);
            ComparisonRecord {
                in_first: first_rank.is_some(),
                first_rank,
                in_second: second_rank.is_some(),
                second_rank,
                id,
            }
        })
        .collect();

    RankComparison {
        first_label: first.label().to_string(),
        second_label: second.label().to_string(),
        records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<FigureId> {
        names.iter().map(|n| FigureId::new(*n)).collect()
    }

    #[test]
    fn test_new_deduplicates_keeping_first() {
        let list = RankList::new("dup", ids(&["Kant", "Hegel", "Kant"]));
        assert_eq!(list.len(), 2);
        assert_eq!(list.rank_of(&FigureId::new("Kant")), Some(1));
        assert_eq!(list.rank_of(&FigureId::new("Hegel")), Some(2));
    }

    #[test]
    fn test_from_scores_sorts_excludes_and_truncates() {
        let scores = vec![
            (FigureId::new("Kant"), Some(0.2)),
            (FigureId::new("Hegel"), Some(0.9)),
            (FigureId::new("Marx"), None),
            (FigureId::new("Mill"), Some(0.5)),
        ];
        let list = RankList::from_scores("top", scores, 2);

        assert_eq!(list.len(), 2);
        assert_eq!(list.rank_of(&FigureId::new("Hegel")), Some(1));
        assert_eq!(list.rank_of(&FigureId::new("Mill")), Some(2));
        assert_eq!(list.rank_of(&FigureId::new("Kant")), None);
        assert_eq!(list.rank_of(&FigureId::new("Marx")), None);
    }

    #[test]
    fn test_from_scores_keeps_input_order_on_ties() {
        let scores = vec![
            (FigureId::new("Kant"), Some(1.0)),
            (FigureId::new("Hegel"), Some(1.0)),
        ];
        let list = RankList::from_scores("ties", scores, 10);
        assert_eq!(list.rank_of(&FigureId::new("Kant")), Some(1));
        assert_eq!(list.rank_of(&FigureId::new("Hegel")), Some(2));
    }

    #[test]
    fn test_from_table_resolves_aliases_and_collapses() {
        let aliases =
            AliasTable::from_pairs(vec![("Kant".to_string(), "Immanuel Kant".to_string())])
                .unwrap();
        let mut table = RawTable::with_columns("external", &[columns::NAME]);
        table.push_row(vec!["Kant".to_string()]).unwrap();
        table.push_row(vec!["Immanuel Kant".to_string()]).unwrap();
        table.push_row(vec!["Hegel".to_string()]).unwrap();

        let list = RankList::from_table("external", &table, &aliases).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.rank_of(&FigureId::new("Immanuel Kant")), Some(1));
        assert_eq!(list.rank_of(&FigureId::new("Hegel")), Some(2));
    }

    #[test]
    fn test_from_table_requires_name_column() {
        let table = RawTable::with_columns("bad", &[columns::DATE]);
        let err = RankList::from_table("bad", &table, &AliasTable::empty()).unwrap_err();
        assert!(matches!(err, SchemaError::MissingColumn { .. }));
    }

    #[test]
    fn test_compare_union_order_and_ranks() {
        let first = RankList::new("first", ids(&["Kant", "Hegel", "Marx"]));
        let second = RankList::new("second", ids(&["Hegel", "Mill"]));
        let comparison = compare(&first, &second);

        let order: Vec<&str> = comparison
            .records()
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(order, vec!["Kant", "Hegel", "Marx", "Mill"]);

        let hegel = &comparison.records()[1];
        assert!(hegel.in_first && hegel.in_second);
        assert_eq!(hegel.first_rank, Some(2));
        assert_eq!(hegel.second_rank, Some(1));

        let mill = &comparison.records()[3];
        assert!(!mill.in_first);
        assert_eq!(mill.first_rank, None);
        assert_eq!(mill.second_rank, Some(2));

        assert_eq!(comparison.overlap(), 1);
        assert_eq!(comparison.labels(), ("first", "second"));
    }

    #[test]
    fn test_comparison_table_cells() {
        let first = RankList::new("first", ids(&["Kant"]));
        let second = RankList::new("second", ids(&["Hegel"]));
        let table = compare(&first, &second).to_table();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(0, 0), Some("Kant"));
        assert_eq!(table.cell(0, 1), Some("true"));
        assert_eq!(table.cell(0, 2), Some("1"));
        assert_eq!(table.cell(0, 3), Some("false"));
        assert_eq!(table.cell(0, 4), Some(""));
    }
}
