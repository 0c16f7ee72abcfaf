//! Temporal adjustment of in-degree centrality.
//!
//! Mention counts accumulate with time: a figure active three thousand
//! years ago has had far longer to be written about than one active
//! thirty years ago. Dividing in-degree centrality by the logarithm of
//! the time elapsed since the activity year makes scores comparable
//! across eras.

use crate::centrality::{CentralityRecord, CentralityReport};
use crate::entity::{FigureId, Roster};
use crate::rank::RankList;
use crate::table::{columns, RawTable};

/// Reference "now" used when none is supplied.
pub const DEFAULT_REFERENCE_YEAR: i32 = 2024;

/// Age-adjusted score for one in-degree centrality value.
///
/// Returns `in_degree / log2(1 + elapsed)` where `elapsed` is
/// `reference_year - activity_year`. Undefined (`None`) when the activity
/// year is unknown or does not precede the reference year.
#[must_use]
pub fn adjusted_score(in_degree: f64, activity_year: Option<i32>, reference_year: i32) -> Option<f64> {
    let year = activity_year?;
    let elapsed = i64::from(reference_year) - i64::from(year);
    if elapsed <= 0 {
        return None;
    }
    Some(in_degree / ((1 + elapsed) as f64).log2())
}

/// A centrality record joined with its temporal context.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjustedRecord {
    /// The underlying centrality scores.
    pub centrality: CentralityRecord,
    /// Activity year from the roster, if resolved.
    pub activity_year: Option<i32>,
    /// Age-adjusted in-degree centrality, if defined.
    pub adjusted: Option<f64>,
}

/// Centrality records with adjusted scores, in id order.
#[derive(Debug, Clone)]
pub struct AdjustedReport {
    records: Vec<AdjustedRecord>,
    reference_year: i32,
}

/// Joins centrality records with roster activity years and computes
/// adjusted scores.
///
/// Figures absent from the roster, or whose activity year is unknown or
/// not in the past of `reference_year`, get an undefined adjusted score
/// and drop out of adjusted rankings.
#[must_use]
pub fn adjust(report: &CentralityReport, roster: &Roster, reference_year: i32) -> AdjustedReport {
    let records = report
        .records()
        .iter()
        .map(|record| {
            let activity_year = roster
                .by_id(record.id.as_str())
                .and_then(|figure| figure.activity_year);
            AdjustedRecord {
                adjusted: adjusted_score(record.in_degree, activity_year, reference_year),
                activity_year,
                centrality: record.clone(),
            }
        })
        .collect();
    AdjustedReport {
        records,
        reference_year,
    }
}

impl AdjustedReport {
    /// Records in id order.
    #[must_use]
    pub fn records(&self) -> &[AdjustedRecord] {
        &self.records
    }

    /// Record for one figure.
    #[must_use]
    pub fn get(&self, id: &FigureId) -> Option<&AdjustedRecord> {
        self.records
            .binary_search_by(|record| record.centrality.id.cmp(id))
            .ok()
            .map(|position| &self.records[position])
    }

    /// Reference year the adjustment was computed against.
    #[must_use]
    pub fn reference_year(&self) -> i32 {
        self.reference_year
    }

    /// Top `n` figures by adjusted score, undefined scores excluded.
    #[must_use]
    pub fn top_n(&self, n: usize) -> RankList {
        RankList::from_scores(
            format!("top {n} by adjusted in-degree centrality"),
            self.records
                .iter()
                .map(|record| (record.centrality.id.clone(), record.adjusted)),
            n,
        )
    }

    /// Exports the adjusted centrality table. Undefined years and scores
    /// render as empty cells.
    #[must_use]
    pub fn to_table(&self) -> RawTable {
        let mut table = RawTable::with_columns(
            "adjusted_centrality",
            &[
                columns::NAME,
                columns::IN_DEGREE_CENTRALITY,
                columns::OUT_DEGREE_CENTRALITY,
                columns::CLOSENESS_CENTRALITY,
                columns::BETWEENNESS_CENTRALITY,
                columns::EIGENVECTOR_CENTRALITY,
                columns::RAW_IN_DEGREE_COUNT,
                columns::RAW_MENTION_COUNT,
                columns::ACTIVITY_YEAR,
                columns::ADJUSTED_IN_DEGREE_CENTRALITY,
            ],
        );
        for record in &self.records {
            let c = &record.centrality;
            table
                .push_row(vec![
                    c.id.to_string(),
                    c.in_degree.to_string(),
                    c.out_degree.to_string(),
                    c.closeness.to_string(),
                    c.betweenness.to_string(),
                    c.eigenvector.to_string(),
                    c.raw_in_degree.to_string(),
                    c.raw_mentions.to_string(),
                    record
                        .activity_year
                        .map(|y| y.to_string())
                        .unwrap_or_default(),
                    record
                        .adjusted
                        .map(|a| a.to_string())
                        .unwrap_or_default(),
                ])
                .expect("row matches declared columns");
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::centrality::{compute, CentralityConfig};
    use crate::entity::Figure;
    use crate::graph::MentionGraph;
    use crate::scan::ScanState;

    #[test]
    fn test_ancient_figure_divisor() {
        // 1600 BCE against 2024: elapsed 3624, divisor log2(3625).
        let divisor = (3625f64).log2();
        assert!((divisor - 11.8237).abs() < 1e-3);

        let score = adjusted_score(1.0, Some(-1600), 2024).unwrap();
        assert!((score - 1.0 / divisor).abs() < 1e-12);
        assert!((score - 0.084576).abs() < 1e-4);
    }

    #[test]
    fn test_elapsed_one_year_divides_by_one() {
        let score = adjusted_score(0.75, Some(2023), 2024).unwrap();
        assert!((score - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_future_or_current_year_is_undefined() {
        assert_eq!(adjusted_score(1.0, Some(2025), 2024), None);
        assert_eq!(adjusted_score(1.0, Some(2024), 2024), None);
    }

    #[test]
    fn test_unknown_year_is_undefined() {
        assert_eq!(adjusted_score(1.0, None, 2024), None);
    }

    fn figure(id: &str, activity_year: Option<i32>) -> Figure {
        Figure {
            id: FigureId::new(id),
            aliases: Vec::new(),
            date: String::new(),
            century: String::new(),
            source_locator: id.to_lowercase(),
            activity_year,
        }
    }

    fn report_for(figures: Vec<Figure>, edges: &[(&str, &str)]) -> CentralityReport {
        let roster = Roster::from_figures(figures);
        let mut state = ScanState::new(&roster);
        for (source, target) in edges {
            state.record_mention(FigureId::new(*source), FigureId::new(*target));
        }
        let graph = MentionGraph::build(&state);
        compute(&graph, &CentralityConfig::default()).unwrap()
    }

    #[test]
    fn test_adjust_joins_roster_years() {
        let figures = vec![
            figure("Ancient", Some(-1600)),
            figure("Modern", Some(2023)),
            figure("Undated", None),
        ];
        let roster = Roster::from_figures(figures.clone());
        let report = report_for(
            figures,
            &[
                ("Ancient", "Modern"),
                ("Undated", "Modern"),
                ("Modern", "Ancient"),
            ],
        );
        let adjusted = adjust(&report, &roster, DEFAULT_REFERENCE_YEAR);

        // Modern: in-degree 2/2 = 1.0, elapsed 1, divisor log2(2) = 1.
        let modern = adjusted.get(&FigureId::new("Modern")).unwrap();
        assert_eq!(modern.activity_year, Some(2023));
        assert!((modern.adjusted.unwrap() - 1.0).abs() < 1e-12);

        // Ancient: in-degree 0.5 divided by log2(3625).
        let ancient = adjusted.get(&FigureId::new("Ancient")).unwrap();
        assert!((ancient.adjusted.unwrap() - 0.5 / (3625f64).log2()).abs() < 1e-12);

        let undated = adjusted.get(&FigureId::new("Undated")).unwrap();
        assert_eq!(undated.adjusted, None);
    }

    #[test]
    fn test_top_n_excludes_undefined() {
        let figures = vec![
            figure("Ancient", Some(-1600)),
            figure("Modern", Some(2023)),
            figure("Undated", None),
        ];
        let roster = Roster::from_figures(figures.clone());
        let report = report_for(
            figures,
            &[
                ("Ancient", "Modern"),
                ("Undated", "Modern"),
                ("Modern", "Ancient"),
            ],
        );
        let top = adjust(&report, &roster, DEFAULT_REFERENCE_YEAR).top_n(10);

        assert_eq!(top.len(), 2);
        assert_eq!(top.rank_of(&FigureId::new("Modern")), Some(1));
        assert_eq!(top.rank_of(&FigureId::new("Ancient")), Some(2));
        assert!(!top.contains(&FigureId::new("Undated")));
    }

    #[test]
    fn test_table_renders_undefined_as_empty() {
        let figures = vec![figure("Undated", None)];
        let roster = Roster::from_figures(figures.clone());
        let report = report_for(figures, &[]);
        let table = adjust(&report, &roster, DEFAULT_REFERENCE_YEAR).to_table();

        assert_eq!(table.columns().len(), 10);
        let year_col = table.column_index(columns::ACTIVITY_YEAR).unwrap();
        let adj_col = table
            .column_index(columns::ADJUSTED_IN_DEGREE_CENTRALITY)
            .unwrap();
        assert_eq!(table.cell(0, year_col), Some(""));
        assert_eq!(table.cell(0, adj_col), Some(""));
    }

    #[test]
    fn test_figure_missing_from_roster_is_undefined() {
        let figures = vec![figure("Known", Some(1800)), figure("Dropped", Some(1900))];
        let report = report_for(figures, &[("Known", "Dropped")]);
        // Roster handed to adjust lacks one of the scored figures.
        let partial = Roster::from_figures(vec![figure("Known", Some(1800))]);
        let adjusted = adjust(&report, &partial, DEFAULT_REFERENCE_YEAR);

        let dropped = adjusted.get(&FigureId::new("Dropped")).unwrap();
        assert_eq!(dropped.activity_year, None);
        assert_eq!(dropped.adjusted, None);
    }
}
