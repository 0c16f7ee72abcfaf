//! Checkpointed mention scanning.
//!
//! The scanner walks the roster in order, fetches each figure's page text,
//! and counts case-insensitive substring occurrences of every other
//! figure's canonical name. Each occurrence increments the mentioned
//! figure's raw count and appends one directed edge (page owner to
//! mentioned figure). Progress is checkpointed so an interrupted run
//! resumes from the last durable snapshot with byte-for-byte identical
//! results.

mod codec;
mod lock;

pub mod checkpoint;
pub mod source;

pub use checkpoint::{Checkpoint, CheckpointStore};
pub use source::{PageTextSource, StaticPageSource};

use std::collections::BTreeMap;
use std::thread;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::entity::{FigureId, Roster};
use crate::error::{EminenceError, FetchError, Result};
use crate::table::{columns, RawTable};

/// Scanner tuning knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Checkpoint after this many processed roster entries.
    pub checkpoint_every: usize,
    /// Names shorter than this many characters are never searched for.
    pub min_name_chars: usize,
    /// Lower bound of the pause before each page fetch, in milliseconds.
    pub min_delay_ms: u64,
    /// Upper bound of the pause before each page fetch, in milliseconds.
    /// Zero disables the pause entirely.
    pub max_delay_ms: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            checkpoint_every: 100,
            min_name_chars: 3,
            min_delay_ms: 500,
            max_delay_ms: 1500,
        }
    }
}

impl ScanConfig {
    /// Checks the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`EminenceError::InvalidConfig`] describing the first
    /// violated constraint.
    pub fn validate(&self) -> Result<()> {
        if self.checkpoint_every == 0 {
            return Err(EminenceError::invalid_config(
                "checkpoint_every must be at least 1",
            ));
        }
        if self.min_name_chars == 0 {
            return Err(EminenceError::invalid_config(
                "min_name_chars must be at least 1",
            ));
        }
        if self.min_delay_ms > self.max_delay_ms {
            return Err(EminenceError::invalid_config(
                "min_delay_ms must not exceed max_delay_ms",
            ));
        }
        Ok(())
    }

    /// Returns a copy with the politeness pause disabled.
    #[must_use]
    pub fn without_delays(mut self) -> Self {
        self.min_delay_ms = 0;
        self.max_delay_ms = 0;
        self
    }
}

/// One detected mention: the owner of the scanned page points at the
/// figure whose name appeared in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionEdge {
    /// Figure whose page contained the mention.
    pub source: FigureId,
    /// Figure that was mentioned.
    pub target: FigureId,
}

/// A count map entry that disagrees with the edge list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountMismatch {
    /// Figure whose bookkeeping is inconsistent.
    pub id: FigureId,
    /// Value in the count map.
    pub count: u64,
    /// Number of edges targeting the figure.
    pub edge_total: u64,
}

/// Cumulative scan results, serialized inside every checkpoint.
///
/// Invariant: for every id, `counts[id]` equals the number of edges whose
/// target is that id. [`ScanState::consistency_issues`] audits this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanState {
    counts: BTreeMap<FigureId, u64>,
    edges: Vec<MentionEdge>,
    processed: usize,
}

impl ScanState {
    /// Creates a fresh state with every roster id present at count zero.
    #[must_use]
    pub fn new(roster: &Roster) -> Self {
        let counts = roster.ids().map(|id| (id.clone(), 0)).collect();
        Self {
            counts,
            edges: Vec::new(),
            processed: 0,
        }
    }

    /// Records one mention of `target` on `source`'s page.
    pub fn record_mention(&mut self, source: FigureId, target: FigureId) {
        *self.counts.entry(target.clone()).or_insert(0) += 1;
        self.edges.push(MentionEdge { source, target });
    }

    /// Cumulative mention count for an id, zero if unknown.
    #[must_use]
    pub fn count_of(&self, id: &FigureId) -> u64 {
        self.counts.get(id).copied().unwrap_or(0)
    }

    /// Per-id cumulative counts.
    #[must_use]
    pub fn counts(&self) -> &BTreeMap<FigureId, u64> {
        &self.counts
    }

    /// Edge list in detection order.
    #[must_use]
    pub fn edges(&self) -> &[MentionEdge] {
        &self.edges
    }

    /// Number of roster entries fully processed.
    #[must_use]
    pub fn processed(&self) -> usize {
        self.processed
    }

    /// Count table ordered by count descending, then name ascending.
    /// Zero-count figures are included.
    #[must_use]
    pub fn count_table(&self) -> RawTable {
        let mut entries: Vec<(&FigureId, u64)> =
            self.counts.iter().map(|(id, &count)| (id, count)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let mut table = RawTable::with_columns(
            "mention_counts",
            &[columns::NAME, columns::RAW_MENTION_COUNT],
        );
        for (id, count) in entries {
            table
                .push_row(vec![id.to_string(), count.to_string()])
                .expect("row matches declared columns");
        }
        table
    }

    /// Edge table in detection order.
    #[must_use]
    pub fn edge_table(&self) -> RawTable {
        let mut table =
            RawTable::with_columns("mention_edges", &[columns::SOURCE, columns::TARGET]);
        for edge in &self.edges {
            table
                .push_row(vec![edge.source.to_string(), edge.target.to_string()])
                .expect("row matches declared columns");
        }
        table
    }

    /// Audits the count map against the edge list.
    ///
    /// Returns every id whose count differs from the number of edges
    /// targeting it. An empty result means the state is self-consistent.
    /// A state built solely through [`ScanState::record_mention`] always
    /// passes; the audit exists for state loaded from external storage.
    #[must_use]
    pub fn consistency_issues(&self) -> Vec<CountMismatch> {
        let mut edge_totals: BTreeMap<&FigureId, u64> = BTreeMap::new();
        for edge in &self.edges {
            *edge_totals.entry(&edge.target).or_insert(0) += 1;
        }

        let mut issues = Vec::new();
        for (id, &count) in &self.counts {
            let edge_total = edge_totals.get(id).copied().unwrap_or(0);
            if count != edge_total {
                issues.push(CountMismatch {
                    id: id.clone(),
                    count,
                    edge_total,
                });
            }
        }
        for (id, &edge_total) in &edge_totals {
            if !self.counts.contains_key(*id) {
                issues.push(CountMismatch {
                    id: (*id).clone(),
                    count: 0,
                    edge_total,
                });
            }
        }
        issues
    }
}

/// Outcome of a scan run.
#[derive(Debug)]
pub struct ScanReport {
    /// Final cumulative state.
    pub state: ScanState,
    /// Figures skipped after a fetch failure, with the cause.
    pub skipped: Vec<(FigureId, FetchError)>,
    /// Checkpoint index the run resumed from, if any.
    pub resumed_from: Option<usize>,
    /// Number of checkpoints written by this run.
    pub checkpoints_written: usize,
}

/// A lowercase search needle for one roster figure.
struct Needle {
    id: FigureId,
    lowered: String,
}

fn build_needles(roster: &Roster, min_name_chars: usize) -> Vec<Needle> {
    roster
        .figures()
        .iter()
        .filter(|figure| figure.id.as_str().chars().count() >= min_name_chars)
        .map(|figure| Needle {
            id: figure.id.clone(),
            lowered: figure.id.as_str().to_lowercase(),
        })
        .collect()
}

/// Non-overlapping occurrence count of `needle` in `haystack`.
fn count_occurrences(haystack: &str, needle: &str) -> u64 {
    if needle.is_empty() {
        return 0;
    }
    let mut count = 0;
    let mut start = 0;
    while let Some(pos) = haystack[start..].find(needle) {
        count += 1;
        start += pos + needle.len();
    }
    count
}

/// Scans one page and records every cross-figure mention.
///
/// Needles are visited in roster order and occurrences of one needle are
/// recorded consecutively, so the edge order is a pure function of the
/// roster and the page texts. That determinism is what makes a resumed
/// run reproduce an uninterrupted one exactly.
fn scan_page(state: &mut ScanState, needles: &[Needle], owner: &FigureId, text: &str) -> u64 {
    let haystack = text.to_lowercase();
    let mut found = 0;
    for needle in needles {
        if needle.id == *owner {
            continue;
        }
        let occurrences = count_occurrences(&haystack, &needle.lowered);
        for _ in 0..occurrences {
            state.record_mention(owner.clone(), needle.id.clone());
        }
        found += occurrences;
    }
    found
}

/// Drives a full or resumed scan over a roster.
pub struct MentionScanner<S> {
    source: S,
    config: ScanConfig,
}

impl<S: PageTextSource> MentionScanner<S> {
    /// Creates a scanner over a page source.
    ///
    /// # Errors
    ///
    /// Returns [`EminenceError::InvalidConfig`] if the configuration is
    /// inconsistent.
    pub fn new(source: S, config: ScanConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { source, config })
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Runs the scan to completion, resuming from the newest valid
    /// checkpoint in `store` when one exists.
    ///
    /// Fetch failures skip the figure and continue; the skipped ids are
    /// listed in the report. Checkpoints are written every
    /// `checkpoint_every` entries and once more after the final entry.
    ///
    /// # Errors
    ///
    /// Returns an error if checkpoint storage fails or if the store
    /// belongs to a different roster.
    pub fn run(&self, roster: &Roster, store: &CheckpointStore) -> Result<ScanReport> {
        let digest = roster.digest();
        let (mut state, resumed_from) = match store.latest(&digest)? {
            Some(checkpoint) => {
                tracing::info!(index = checkpoint.index, "resuming scan from checkpoint");
                (checkpoint.state, Some(checkpoint.index))
            }
            None => (ScanState::new(roster), None),
        };

        let needles = build_needles(roster, self.config.min_name_chars);
        let total = roster.len();
        let mut skipped = Vec::new();
        let mut checkpoints_written = 0usize;

        for position in state.processed..total {
            let figure = &roster.figures()[position];
            self.politeness_pause();

            match self.source.page_text(figure) {
                Ok(text) => {
                    let found = scan_page(&mut state, &needles, &figure.id, &text);
                    tracing::debug!(figure = %figure.id, mentions = found, "scanned page");
                }
                Err(error) => {
                    tracing::warn!(figure = %figure.id, %error, "skipping figure after fetch failure");
                    skipped.push((figure.id.clone(), error));
                }
            }
            state.processed = position + 1;

            if state.processed % self.config.checkpoint_every == 0 || state.processed == total {
                store.save(&Checkpoint::new(state.processed, digest.clone(), state.clone()))?;
                checkpoints_written += 1;
            }
        }

        Ok(ScanReport {
            state,
            skipped,
            resumed_from,
            checkpoints_written,
        })
    }

    fn politeness_pause(&self) {
        if self.config.max_delay_ms == 0 {
            return;
        }
        let ms = if self.config.min_delay_ms == self.config.max_delay_ms {
            self.config.min_delay_ms
        } else {
            rand::thread_rng().gen_range(self.config.min_delay_ms..=self.config.max_delay_ms)
        };
        thread::sleep(Duration::from_millis(ms));
    }
}
