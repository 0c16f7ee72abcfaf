//! Per-group aggregation of centrality results.
//!
//! Groups are the roster's century labels. Each group reports its size,
//! mean in-degree centrality, mean adjusted centrality over the members
//! where it is defined, and the top member. Figures absent from the
//! roster have no group and are excluded.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::adjust::AdjustedReport;
use crate::entity::{FigureId, Roster};
use crate::rank::RankList;
use crate::table::{columns, RawTable};

/// Aggregated figures for one group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    /// Group label (century bucket).
    pub label: String,
    /// Number of member figures.
    pub members: usize,
    /// Mean in-degree centrality over all members.
    pub mean_in_degree: f64,
    /// Mean adjusted centrality over members with a defined score, absent
    /// if no member has one.
    pub mean_adjusted: Option<f64>,
    /// Best member by adjusted score, or by in-degree when no adjusted
    /// score in the group is defined.
    pub top_figure: Option<FigureId>,
}

struct MemberScore {
    id: FigureId,
    in_degree: f64,
    adjusted: Option<f64>,
}

/// Group summaries ordered by mean adjusted score.
#[derive(Debug, Clone)]
pub struct GroupReport {
    groups: Vec<GroupSummary>,
    members: BTreeMap<String, Vec<(FigureId, f64, Option<f64>)>>,
}

/// Buckets adjusted records by the roster's group labels.
///
/// Groups order by mean adjusted descending with undefined means last,
/// ties broken by label.
#[must_use]
pub fn summarize(adjusted: &AdjustedReport, roster: &Roster) -> GroupReport {
    let mut buckets: BTreeMap<String, Vec<MemberScore>> = BTreeMap::new();
    for record in adjusted.records() {
        let Some(figure) = roster.by_id(record.centrality.id.as_str()) else {
            continue;
        };
        buckets
            .entry(figure.century.clone())
            .or_default()
            .push(MemberScore {
                id: record.centrality.id.clone(),
                in_degree: record.centrality.in_degree,
                adjusted: record.adjusted,
            });
    }

    let mut groups = Vec::with_capacity(buckets.len());
    for (label, members) in &buckets {
        let count = members.len();
        let mean_in_degree = members.iter().map(|m| m.in_degree).sum::<f64>() / count as f64;

        let defined: Vec<f64> = members.iter().filter_map(|m| m.adjusted).collect();
        let mean_adjusted = if defined.is_empty() {
            None
        } else {
            Some(defined.iter().sum::<f64>() / defined.len() as f64)
        };

        let top_figure = if defined.is_empty() {
            pick_top(members, |m| Some(m.in_degree))
        } else {
            pick_top(members, |m| m.adjusted)
        };

        groups.push(GroupSummary {
            label: label.clone(),
            members: count,
            mean_in_degree,
            mean_adjusted,
            top_figure,
        });
    }

    groups.sort_by(|a, b| match (a.mean_adjusted, b.mean_adjusted) {
        (Some(x), Some(y)) => y.total_cmp(&x).then_with(|| a.label.cmp(&b.label)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.label.cmp(&b.label),
    });

    let members = buckets
        .into_iter()
        .map(|(label, scored)| {
            let entries = scored
                .into_iter()
                .map(|m| (m.id, m.in_degree, m.adjusted))
                .collect();
            (label, entries)
        })
        .collect();

    GroupReport { groups, members }
}

/// First member holding the strictly greatest defined score.
fn pick_top(members: &[MemberScore], score: impl Fn(&MemberScore) -> Option<f64>) -> Option<FigureId> {
    let mut best: Option<(&FigureId, f64)> = None;
    for member in members {
        let Some(value) = score(member) else { continue };
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((&member.id, value)),
        }
    }
    best.map(|(id, _)| id.clone())
}

impl GroupReport {
    /// Summaries in report order.
    #[must_use]
    pub fn summaries(&self) -> &[GroupSummary] {
        &self.groups
    }

    /// Summary for one group label.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&GroupSummary> {
        self.groups.iter().find(|g| g.label == label)
    }

    /// Top `n` members of a group, by adjusted score, or by in-degree
    /// when no member has a defined adjusted score.
    #[must_use]
    pub fn top_members(&self, label: &str, n: usize) -> Option<RankList> {
        let members = self.members.get(label)?;
        let any_adjusted = members.iter().any(|(_, _, adjusted)| adjusted.is_some());
        let list = if any_adjusted {
            RankList::from_scores(
                format!("{label}: top {n} by adjusted in-degree centrality"),
                members.iter().map(|(id, _, adjusted)| (id.clone(), *adjusted)),
                n,
            )
        } else {
            RankList::from_scores(
                format!("{label}: top {n} by in-degree centrality"),
                members
                    .iter()
                    .map(|(id, in_degree, _)| (id.clone(), Some(*in_degree))),
                n,
            )
        };
        Some(list)
    }

    /// Exports the group summary table.
    #[must_use]
    pub fn to_table(&self) -> RawTable {
        let mut table = RawTable::with_columns(
            "group_summary",
            &[
                columns::CENTURY,
                columns::MEMBERS,
                columns::MEAN_IN_DEGREE,
                columns::MEAN_ADJUSTED,
                columns::TOP_FIGURE,
            ],
        );
        for group in &self.groups {
            table
                .push_row(vec![
                    group.label.clone(),
                    group.members.to_string(),
                    group.mean_in_degree.to_string(),
                    group
                        .mean_adjusted
                        .map(|m| m.to_string())
                        .unwrap_or_default(),
                    group
                        .top_figure
                        .as_ref()
                        .map(ToString::to_string)
                        .unwrap_or_default(),
                ])
                .expect("row matches declared columns");
        }
        table
    }
}
