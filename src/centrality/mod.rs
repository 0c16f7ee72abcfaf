//! Centrality metrics over the mention graph.
//!
//! Five scores per node: in-degree, out-degree, closeness, betweenness,
//! and eigenvector centrality. All are pure functions of the immutable
//! graph, so the four computations (degree covers both directions) run on
//! scoped worker threads and are merged by id afterward.
//!
//! A metric that cannot produce meaningful values does not fail the run;
//! it degrades to an all-zero [`MetricOutcome::Fallback`] carrying the
//! reason, which the merged report surfaces per metric.

mod degree;
mod eigenvector;
mod paths;

use std::collections::BTreeMap;
use std::fmt;
use std::thread;

use crossbeam_channel::bounded;
use serde::{Deserialize, Serialize};

use crate::entity::FigureId;
use crate::error::{EminenceError, Result};
use crate::graph::MentionGraph;
use crate::rank::RankList;
use crate::table::{columns, RawTable};

/// Iteration bounds for the eigenvector power method.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CentralityConfig {
    /// Maximum power-iteration rounds before giving up.
    pub max_iterations: usize,
    /// Convergence tolerance; also the floor below which converged
    /// eigenvector scores snap to zero.
    pub tolerance: f64,
}

impl Default for CentralityConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-6,
        }
    }
}

impl CentralityConfig {
    /// Checks the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`EminenceError::InvalidConfig`] describing the first
    /// violated constraint.
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(EminenceError::invalid_config(
                "max_iterations must be at least 1",
            ));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(EminenceError::invalid_config(
                "tolerance must be a positive finite number",
            ));
        }
        Ok(())
    }
}

/// Metric selector for ranking and lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    /// Normalized incoming-edge count.
    InDegree,
    /// Normalized outgoing-edge count.
    OutDegree,
    /// Directed closeness over incoming shortest paths.
    Closeness,
    /// Normalized Brandes betweenness.
    Betweenness,
    /// Power-iteration eigenvector score.
    Eigenvector,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metric::InDegree => "in-degree centrality",
            Metric::OutDegree => "out-degree centrality",
            Metric::Closeness => "closeness centrality",
            Metric::Betweenness => "betweenness centrality",
            Metric::Eigenvector => "eigenvector centrality",
        };
        f.write_str(name)
    }
}

/// Why a metric degraded to its fallback scores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// Power iteration did not converge within the iteration budget.
    NotConverged {
        /// Rounds that were attempted.
        iterations: usize,
    },
    /// The graph has no edges, so no finite distance exists.
    NoFinitePaths,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::NotConverged { iterations } => {
                write!(f, "power iteration did not converge within {iterations} rounds")
            }
            FallbackReason::NoFinitePaths => f.write_str("graph has no edges"),
        }
    }
}

/// Result of one metric computation.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricOutcome {
    /// The metric computed normally.
    Computed(BTreeMap<FigureId, f64>),
    /// The metric degraded; `scores` are the documented fallback values.
    Fallback {
        /// Fallback scores, all zero.
        scores: BTreeMap<FigureId, f64>,
        /// What went wrong.
        reason: FallbackReason,
    },
}

impl MetricOutcome {
    /// Scores regardless of outcome.
    #[must_use]
    pub fn scores(&self) -> &BTreeMap<FigureId, f64> {
        match self {
            MetricOutcome::Computed(scores) | MetricOutcome::Fallback { scores, .. } => scores,
        }
    }

    /// Fallback reason, if the metric degraded.
    #[must_use]
    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        match self {
            MetricOutcome::Computed(_) => None,
            MetricOutcome::Fallback { reason, .. } => Some(reason),
        }
    }

    /// Whether the metric degraded.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self, MetricOutcome::Fallback { .. })
    }
}

/// All centrality scores for one figure, with the raw counts they were
/// derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentralityRecord {
    /// Canonical figure id.
    pub id: FigureId,
    /// Incoming edges over (n minus 1).
    pub in_degree: f64,
    /// Outgoing edges over (n minus 1).
    pub out_degree: f64,
    /// Directed closeness centrality.
    pub closeness: f64,
    /// Normalized betweenness centrality.
    pub betweenness: f64,
    /// Eigenvector centrality.
    pub eigenvector: f64,
    /// Unnormalized in-degree on the collapsed graph.
    pub raw_in_degree: u64,
    /// Scan-level occurrence total, duplicates included.
    pub raw_mentions: u64,
}

impl CentralityRecord {
    /// Score for a metric selector.
    #[must_use]
    pub fn score(&self, metric: Metric) -> f64 {
        match metric {
            Metric::InDegree => self.in_degree,
            Metric::OutDegree => self.out_degree,
            Metric::Closeness => self.closeness,
            Metric::Betweenness => self.betweenness,
            Metric::Eigenvector => self.eigenvector,
        }
    }
}

/// Merged per-figure centrality results.
#[derive(Debug, Clone)]
pub struct CentralityReport {
    records: Vec<CentralityRecord>,
    closeness_fallback: Option<FallbackReason>,
    eigenvector_fallback: Option<FallbackReason>,
}

impl CentralityReport {
    /// Records in id order.
    #[must_use]
    pub fn records(&self) -> &[CentralityRecord] {
        &self.records
    }

    /// Record for one figure.
    #[must_use]
    pub fn get(&self, id: &FigureId) -> Option<&CentralityRecord> {
        self.records
            .binary_search_by(|record| record.id.cmp(id))
            .ok()
            .map(|position| &self.records[position])
    }

    /// Reason closeness degraded, if it did.
    #[must_use]
    pub fn closeness_fallback(&self) -> Option<&FallbackReason> {
        self.closeness_fallback.as_ref()
    }

    /// Reason eigenvector degraded, if it did.
    #[must_use]
    pub fn eigenvector_fallback(&self) -> Option<&FallbackReason> {
        self.eigenvector_fallback.as_ref()
    }

    /// Exports the centrality table.
    #[must_use]
    pub fn to_table(&self) -> RawTable {
        let mut table = RawTable::with_columns(
            "centrality",
            &[
                columns::NAME,
                columns::IN_DEGREE_CENTRALITY,
                columns::OUT_DEGREE_CENTRALITY,
                columns::CLOSENESS_CENTRALITY,
                columns::BETWEENNESS_CENTRALITY,
                columns::EIGENVECTOR_CENTRALITY,
                columns::RAW_IN_DEGREE_COUNT,
                columns::RAW_MENTION_COUNT,
            ],
        );
        for record in &self.records {
            table
                .push_row(vec![
                    record.id.to_string(),
                    record.in_degree.to_string(),
                    record.out_degree.to_string(),
                    record.closeness.to_string(),
                    record.betweenness.to_string(),
                    record.eigenvector.to_string(),
                    record.raw_in_degree.to_string(),
                    record.raw_mentions.to_string(),
                ])
                .expect("row matches declared columns");
        }
        table
    }

    /// Top `n` figures by one metric, descending, ties kept in id order.
    #[must_use]
    pub fn rank_by(&self, metric: Metric, n: usize) -> RankList {
        RankList::from_scores(
            format!("top {n} by {metric}"),
            self.records
                .iter()
                .map(|record| (record.id.clone(), Some(record.score(metric)))),
            n,
        )
    }
}

enum WorkerResult {
    Degree {
        in_scores: BTreeMap<FigureId, f64>,
        out_scores: BTreeMap<FigureId, f64>,
    },
    Closeness(MetricOutcome),
    Betweenness(BTreeMap<FigureId, f64>),
    Eigenvector(MetricOutcome),
}

/// Computes all centrality metrics for a graph.
///
/// The metrics run concurrently on named scoped threads; results are
/// collected over a bounded channel and merged by id. Metric fallbacks are
/// logged and surfaced on the report rather than failing the run.
///
/// # Errors
///
/// Returns [`EminenceError::InvalidConfig`] if the configuration is
/// inconsistent.
pub fn compute(graph: &MentionGraph, config: &CentralityConfig) -> Result<CentralityReport> {
    config.validate()?;

    let (tx, rx) = bounded::<WorkerResult>(4);
    let config = *config;

    thread::scope(|scope| {
        let sender = tx.clone();
        thread::Builder::new()
            .name("centrality-degree".to_string())
            .spawn_scoped(scope, move || {
                let (in_scores, out_scores) = degree::degree_centrality(graph);
                let _ = sender.send(WorkerResult::Degree {
                    in_scores,
                    out_scores,
                });
            })
            .expect("failed to spawn centrality worker");

        let sender = tx.clone();
        thread::Builder::new()
            .name("centrality-closeness".to_string())
            .spawn_scoped(scope, move || {
                let _ = sender.send(WorkerResult::Closeness(paths::closeness_centrality(graph)));
            })
            .expect("failed to spawn centrality worker");

        let sender = tx.clone();
        thread::Builder::new()
            .name("centrality-betweenness".to_string())
            .spawn_scoped(scope, move || {
                let _ = sender.send(WorkerResult::Betweenness(paths::betweenness_centrality(
                    graph,
                )));
            })
            .expect("failed to spawn centrality worker");

        let sender = tx;
        thread::Builder::new()
            .name("centrality-eigenvector".to_string())
            .spawn_scoped(scope, move || {
                let _ = sender.send(WorkerResult::Eigenvector(
                    eigenvector::eigenvector_centrality(graph, &config),
                ));
            })
            .expect("failed to spawn centrality worker");
    });

    let mut in_scores = BTreeMap::new();
    let mut out_scores = BTreeMap::new();
    let mut closeness = None;
    let mut betweenness = BTreeMap::new();
    let mut eigenvector = None;

    while let Ok(result) = rx.try_recv() {
        match result {
            WorkerResult::Degree {
                in_scores: ins,
                out_scores: outs,
            } => {
                in_scores = ins;
                out_scores = outs;
            }
            WorkerResult::Closeness(outcome) => closeness = Some(outcome),
            WorkerResult::Betweenness(scores) => betweenness = scores,
            WorkerResult::Eigenvector(outcome) => eigenvector = Some(outcome),
        }
    }

    let closeness = closeness.unwrap_or(MetricOutcome::Computed(BTreeMap::new()));
    let eigenvector = eigenvector.unwrap_or(MetricOutcome::Computed(BTreeMap::new()));

    if let Some(reason) = closeness.fallback_reason() {
        tracing::warn!(metric = "closeness", %reason, "centrality metric degraded to fallback");
    }
    if let Some(reason) = eigenvector.fallback_reason() {
        tracing::warn!(metric = "eigenvector", %reason, "centrality metric degraded to fallback");
    }

    let records = graph
        .ids()
        .map(|id| CentralityRecord {
            id: id.clone(),
            in_degree: in_scores.get(id).copied().unwrap_or(0.0),
            out_degree: out_scores.get(id).copied().unwrap_or(0.0),
            closeness: closeness.scores().get(id).copied().unwrap_or(0.0),
            betweenness: betweenness.get(id).copied().unwrap_or(0.0),
            eigenvector: eigenvector.scores().get(id).copied().unwrap_or(0.0),
            raw_in_degree: graph.in_degree(id).unwrap_or(0) as u64,
            raw_mentions: graph.raw_mentions(id).unwrap_or(0),
        })
        .collect();

    Ok(CentralityReport {
        records,
        closeness_fallback: closeness.fallback_reason().cloned(),
        eigenvector_fallback: eigenvector.fallback_reason().cloned(),
    })
}
