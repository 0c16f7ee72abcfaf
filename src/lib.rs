//! # Eminence - Mention-Network Analysis of Historical Figures
//!
//! Eminence measures the relative prominence of a curated roster of
//! historical figures from the web of cross-references between their
//! reference pages. Each page is scanned for mentions of every other
//! figure; the mentions become a directed graph; centrality metrics over
//! that graph, adjusted for how long each figure has been discussable,
//! yield comparable prominence scores across eras.
//!
//! ## Core Concepts
//!
//! - **Figure / Roster**: canonical identities with aliases, biographical
//!   dates, and a resolved activity year
//! - **Mention scan**: checkpointed, resumable traversal counting
//!   cross-page name occurrences
//! - **Mention graph**: directed graph with duplicate mentions collapsed
//!   to single edges
//! - **Centrality**: degree, closeness, betweenness, and eigenvector
//!   scores with explicit fallback semantics
//! - **Temporal adjustment**: in-degree divided by the log of elapsed
//!   time, making ancients and moderns comparable
//!
//! ## Usage
//!
//! ```rust,ignore
//! use eminence::{AliasTable, CentralityConfig, MentionGraph, Roster, ScanConfig};
//! use eminence::scan::{CheckpointStore, MentionScanner, StaticPageSource};
//!
//! let aliases = AliasTable::bundled()?;
//! let roster = Roster::from_raw(&entity_table, &aliases)?;
//!
//! let store = CheckpointStore::open("scan-state")?;
//! let scanner = MentionScanner::new(page_source, ScanConfig::default())?;
//! let report = scanner.run(&roster, &store)?;
//!
//! let graph = MentionGraph::build(&report.state);
//! let centrality = eminence::centrality::compute(&graph, &CentralityConfig::default())?;
//! let adjusted = eminence::adjust::adjust(&centrality, &roster, 2024);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Data model
pub mod alias;
pub mod dates;
pub mod entity;
pub mod error;
pub mod table;

// Pipeline stages
pub mod adjust;
pub mod centrality;
pub mod graph;
pub mod group;
pub mod rank;
pub mod scan;

// Re-export primary types at crate root for convenience
pub use alias::AliasTable;
pub use adjust::{AdjustedRecord, AdjustedReport, DEFAULT_REFERENCE_YEAR};
pub use centrality::{
    CentralityConfig, CentralityRecord, CentralityReport, FallbackReason, Metric, MetricOutcome,
};
pub use entity::{Figure, FigureId, Roster};
pub use error::{
    AliasError, CheckpointError, EminenceError, FetchError, Result, SchemaError,
};
pub use graph::{MentionGraph, NodeInfo};
pub use group::{GroupReport, GroupSummary};
pub use rank::{ComparisonRecord, RankComparison, RankList};
pub use scan::{
    Checkpoint, CheckpointStore, MentionScanner, PageTextSource, ScanConfig, ScanReport,
    ScanState, StaticPageSource,
};
pub use table::RawTable;
