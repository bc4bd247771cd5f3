use std::cmp::Ordering;

use indexmap::{IndexMap, IndexSet};

use super::cluster::ClusterAssignment;
use crate::config::ChoiceTuning;
use crate::inference::str::{is_identifier_like, looks_like_id_field, looks_like_tag_field};
use crate::value::{Fields, Value};

/// The winning tag field and how well it explains the clusters.
#[derive(Debug, Clone, PartialEq)]
pub struct Discriminator {
    pub field: String,
    /// Share of instances whose value's majority cluster is their own.
    pub purity: f64,
    pub distinct: usize,
}

/// Pick the field whose values best predict cluster membership.
///
/// Candidates are string fields present in every instance with a name that
/// does not read as an identifier. A candidate survives when every value is
/// identifier-like, it yields between two and `max_variants` distinct values,
/// it does not look like a per-record identifier, and its purity reaches
/// `min_purity`. Ties go to the fewest distinct values, then to a
/// conventional tag name (`type`, `kind`, `*_type`, ...), then to the
/// lexicographically smallest name, so key order never decides.
pub fn find_discriminator(
    records: &[&Fields],
    clusters: &ClusterAssignment,
    tuning: &ChoiceTuning,
) -> Option<Discriminator> {
    let first = records.first()?;
    let mut best: Option<Discriminator> = None;
    for name in first.keys() {
        let Some(candidate) = score(name, records, clusters, tuning) else {
            continue;
        };
        let better = match &best {
            None => true,
            Some(b) => rank(&candidate, b) == Ordering::Greater,
        };
        if better {
            best = Some(candidate);
        }
    }
    best
}

/// Total order over surviving candidates; `Greater` is the better tag.
fn rank(a: &Discriminator, b: &Discriminator) -> Ordering {
    a.purity
        .total_cmp(&b.purity)
        .then_with(|| b.distinct.cmp(&a.distinct))
        .then_with(|| looks_like_tag_field(&a.field).cmp(&looks_like_tag_field(&b.field)))
        .then_with(|| b.field.cmp(&a.field))
}

fn score(
    name: &str,
    records: &[&Fields],
    clusters: &ClusterAssignment,
    tuning: &ChoiceTuning,
) -> Option<Discriminator> {
    if looks_like_id_field(name) {
        tracing::trace!(field = name, "rejected: identifier name");
        return None;
    }
    let mut tags = Vec::with_capacity(records.len());
    for record in records {
        match record.get(name) {
            Some(Value::Str(s)) => tags.push(s.as_str()),
            _ => return None,
        }
    }
    let distinct: IndexSet<&str> = tags.iter().copied().collect();
    let d = distinct.len();
    let n = tags.len();
    if d < 2 || d > tuning.max_variants {
        tracing::trace!(field = name, distinct = d, "rejected: variant count");
        return None;
    }
    if let Some(bad) = distinct.iter().find(|s| !is_identifier_like(s)) {
        tracing::trace!(field = name, value = *bad, "rejected: value is not a tag");
        return None;
    }
    // unique ids correlate 1:1 with any clustering, so they prove nothing
    if d > clusters.cluster_count() && d as f64 / n as f64 >= tuning.unique_id_ratio {
        tracing::trace!(field = name, distinct = d, instances = n, "rejected: unique id penalty");
        return None;
    }

    let mut votes: IndexMap<&str, IndexMap<usize, usize>> = IndexMap::new();
    for (i, tag) in tags.iter().copied().enumerate() {
        *votes.entry(tag).or_default().entry(clusters.cluster_of(i)).or_insert(0) += 1;
    }
    let agreeing: usize = votes
        .values()
        .map(|per_cluster| per_cluster.values().copied().max().unwrap_or(0))
        .sum();
    let purity = agreeing as f64 / n as f64;
    if purity < tuning.min_purity {
        tracing::trace!(field = name, purity, "rejected: low purity");
        return None;
    }
    Some(Discriminator { field: name.to_string(), purity, distinct: d })
}
