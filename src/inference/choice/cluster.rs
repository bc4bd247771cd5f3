//! Field-signature clustering and refinement.
//!
//! Both passes are pure: they take a population and return a fresh
//! [`ClusterAssignment`] without touching their inputs.

use std::collections::{BTreeSet, HashMap};

use crate::config::ChoiceTuning;
use crate::value::{Fields, Value};

/// The set of field names present in one record instance.
pub type Signature<'a> = BTreeSet<&'a str>;

pub fn signature_of(record: &Fields) -> Signature<'_> {
    record.keys().map(String::as_str).collect()
}

/// |a ∩ b| / |a ∪ b|; two empty sets are identical.
pub fn jaccard(a: &BTreeSet<&str>, b: &BTreeSet<&str>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 1.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Instance index → cluster id. Ids are dense and follow the canonical
/// cluster order (frequency, then field names), never corpus order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterAssignment {
    labels: Vec<usize>,
    count: usize,
}

impl ClusterAssignment {
    fn new(labels: Vec<usize>, count: usize) -> Self {
        Self { labels, count }
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn cluster_of(&self, instance: usize) -> usize {
        self.labels[instance]
    }

    pub fn cluster_count(&self) -> usize {
        self.count
    }

    pub fn sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.count];
        for &label in &self.labels {
            sizes[label] += 1;
        }
        sizes
    }

    pub fn members(&self, cluster: usize) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, label)| **label == cluster)
            .map(|(i, _)| i)
            .collect()
    }
}

// ------------------------------ Pass 1 ----------------------------------- //

/// Greedy leader clustering over distinct signatures.
///
/// Signatures are visited from most to least frequent, equal counts ordered
/// by their sorted field names; each joins the most similar existing leader
/// at or above `threshold`, or becomes a leader itself. Cluster ids are
/// leader ranks, so permuting the corpus never changes the assignment.
pub fn cluster_signatures(signatures: &[Signature<'_>], threshold: f64) -> ClusterAssignment {
    let mut counts: HashMap<&Signature<'_>, usize> = HashMap::new();
    for sig in signatures {
        *counts.entry(sig).or_insert(0) += 1;
    }
    let mut distinct: Vec<(&Signature<'_>, usize)> = counts.into_iter().collect();
    distinct.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let mut leaders: Vec<&Signature<'_>> = Vec::new();
    let mut cluster_of: HashMap<&Signature<'_>, usize> = HashMap::new();
    for (sig, _) in distinct {
        let mut best: Option<(usize, f64)> = None;
        for (id, leader) in leaders.iter().enumerate() {
            let sim = jaccard(sig, leader);
            if sim >= threshold && best.is_none_or(|(_, b)| sim > b) {
                best = Some((id, sim));
            }
        }
        let id = match best {
            Some((id, _)) => id,
            None => {
                leaders.push(sig);
                leaders.len() - 1
            }
        };
        cluster_of.insert(sig, id);
    }

    let labels: Vec<usize> = signatures.iter().map(|sig| cluster_of[sig]).collect();
    ClusterAssignment::new(labels, leaders.len())
}

// ------------------------------ Pass 2 ----------------------------------- //

/// Coarse value kinds as bits; numbers are one kind.
fn kind_bit(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Int(_) | Value::Real(_) => 1 << 1,
        Value::Str(_) => 1 << 2,
        Value::List(_) => 1 << 3,
        Value::Record(_) => 1 << 4,
    }
}

/// Field names of one cluster with the kinds each field took.
struct ClusterProfile<'a> {
    fields: BTreeSet<&'a str>,
    kinds: HashMap<&'a str, u8>,
}

impl<'a> ClusterProfile<'a> {
    fn of(records: &[&'a Fields], members: &[usize]) -> Self {
        let mut fields = BTreeSet::new();
        let mut kinds: HashMap<&str, u8> = HashMap::new();
        for &i in members {
            for (name, value) in records[i] {
                fields.insert(name.as_str());
                *kinds.entry(name.as_str()).or_insert(0) |= kind_bit(value);
            }
        }
        Self { fields, kinds }
    }

    /// A shared field whose non-null values never agree on a kind.
    fn conflicts_with(&self, other: &Self) -> Option<&'a str> {
        self.fields.intersection(&other.fields).copied().find(|name| {
            let a = self.kinds.get(name).copied().unwrap_or(0);
            let b = other.kinds.get(name).copied().unwrap_or(0);
            a != 0 && b != 0 && a & b == 0
        })
    }
}

impl ClusterProfile<'_> {
    /// Folding `self` into `base` would only add optional fields.
    fn absorbable_into(&self, base: &Self, tuning: &ChoiceTuning) -> bool {
        if self.conflicts_with(base).is_some() {
            return false;
        }
        let nested = self.fields.is_subset(&base.fields) || self.fields.is_superset(&base.fields);
        nested || jaccard(&self.fields, &base.fields) >= tuning.absorb_overlap
    }
}

/// Re-absorb clusters whose extra fields read as sparse optional fields of
/// a larger cluster.
///
/// Clusters are visited from largest to smallest, equal sizes ordered by
/// their field names, so the dominant cluster always survives. Each later
/// cluster folds into the surviving cluster it is absorbable into with the
/// highest field overlap (the earlier survivor on ties). Absorbable means no
/// shared field conflicts in kind, and either field set contains the other
/// or their overlap reaches `tuning.absorb_overlap`. Surviving clusters are
/// renumbered in visiting order.
pub fn refine_clusters(
    assignment: &ClusterAssignment,
    records: &[&Fields],
    tuning: &ChoiceTuning,
) -> ClusterAssignment {
    if assignment.cluster_count() < 2 {
        return assignment.clone();
    }
    let sizes = assignment.sizes();
    let profiles: Vec<ClusterProfile<'_>> = (0..assignment.cluster_count())
        .map(|c| ClusterProfile::of(records, &assignment.members(c)))
        .collect();
    let mut order: Vec<usize> = (0..profiles.len()).collect();
    order.sort_by(|&a, &b| {
        sizes[b]
            .cmp(&sizes[a])
            .then_with(|| profiles[a].fields.cmp(&profiles[b].fields))
            .then(a.cmp(&b))
    });

    let mut target: Vec<usize> = (0..profiles.len()).collect();
    let mut survivors: Vec<usize> = Vec::new();
    for c in order {
        let mut host: Option<(usize, f64)> = None;
        for &s in &survivors {
            if !profiles[c].absorbable_into(&profiles[s], tuning) {
                continue;
            }
            let sim = jaccard(&profiles[c].fields, &profiles[s].fields);
            if host.is_none_or(|(_, best)| sim > best) {
                host = Some((s, sim));
            }
        }
        match host {
            Some((s, _)) => {
                tracing::trace!(cluster = c, into = s, size = sizes[c], "absorbed as sparse fields");
                target[c] = s;
            }
            None => survivors.push(c),
        }
    }

    let mut rank = vec![0; profiles.len()];
    for (i, &s) in survivors.iter().enumerate() {
        rank[s] = i;
    }
    let labels: Vec<usize> = assignment.labels().iter().map(|&c| rank[target[c]]).collect();
    ClusterAssignment::new(labels, survivors.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn docs(v: serde_json::Value) -> Vec<Value> {
        match Value::from(v) {
            Value::List(xs) => xs,
            other => vec![other],
        }
    }

    fn assign(values: &[Value], tuning: &ChoiceTuning) -> (ClusterAssignment, ClusterAssignment) {
        let records: Vec<&Fields> = values.iter().filter_map(Value::as_record).collect();
        let sigs: Vec<Signature<'_>> = records.iter().map(|r| signature_of(r)).collect();
        let first = cluster_signatures(&sigs, tuning.signature_similarity);
        let second = refine_clusters(&first, &records, tuning);
        (first, second)
    }

    fn set<'a>(xs: &[&'a str]) -> BTreeSet<&'a str> {
        xs.iter().copied().collect()
    }

    #[test]
    fn jaccard_similarity() {
        assert_eq!(jaccard(&set(&["a", "b"]), &set(&["a", "b"])), 1.0);
        assert_eq!(jaccard(&set(&["a", "b"]), &set(&["b", "c"])), 1.0 / 3.0);
        assert_eq!(jaccard(&set(&[]), &set(&[])), 1.0);
        assert_eq!(jaccard(&set(&["a"]), &set(&[])), 0.0);
    }

    #[test]
    fn cluster_ids_follow_frequency_then_field_names() {
        let values = docs(json!([
            {"z": 1},
            {"b": 1},
            {"a": 1},
            {"b": 2},
        ]));
        let (first, _) = assign(&values, &ChoiceTuning::default());
        assert_eq!(first.labels(), [2, 0, 1, 0]);
        assert_eq!(first.cluster_count(), 3);
        assert_eq!(first.sizes(), [2, 1, 1]);
        assert_eq!(first.members(0), [1, 3]);
    }

    #[test]
    fn near_identical_signatures_share_a_cluster() {
        let values = docs(json!([
            {"a": 1, "b": 1, "c": 1, "d": 1, "e": 1},
            {"a": 1, "b": 1, "c": 1, "d": 1, "e": 1, "f": 1},
            {"x": 1, "y": 1},
        ]));
        let (first, _) = assign(&values, &ChoiceTuning::default());
        assert_eq!(first.labels(), [0, 0, 1]);
    }

    #[test]
    fn frequent_signatures_lead() {
        // the rare {a,b,c,d,e} would otherwise lead and pull in both others
        let values = docs(json!([
            {"a": 1, "b": 1, "c": 1, "d": 1, "e": 1},
            {"a": 1, "b": 1, "c": 1, "d": 1},
            {"a": 1, "b": 1, "c": 1, "d": 1},
            {"b": 1, "c": 1, "d": 1, "e": 1},
        ]));
        let (first, _) = assign(&values, &ChoiceTuning::default());
        // {a,b,c,d,e} joins the {a,b,c,d} leader (0.8); {b,c,d,e} is 0.6 away
        assert_eq!(first.labels(), [0, 0, 0, 1]);
    }

    #[test]
    fn sparse_clusters_are_absorbed() {
        let values = docs(json!([
            {"ts": 1, "x": 1.5, "y": 2.5},
            {"ts": 2, "x": 1.5, "y": 2.5},
            {"ts": 3, "x": 1.5, "y": 2.5},
            {"ts": 4, "x": 1.5, "y": 2.5, "ball": {"z": 1}, "speed": 3, "spin": 1},
        ]));
        let (first, second) = assign(&values, &ChoiceTuning::default());
        assert_eq!(first.cluster_count(), 2);
        assert_eq!(second.cluster_count(), 1);
    }

    #[test]
    fn conflicting_shared_fields_stay_apart() {
        let values = docs(json!([
            {"kind": "a", "value": 1},
            {"kind": "a", "value": 2},
            {"kind": "b", "value": "high", "note": "x"},
        ]));
        let (first, second) = assign(&values, &ChoiceTuning::default());
        assert_eq!(first.cluster_count(), 2);
        assert_eq!(second.cluster_count(), 2);
    }

    #[test]
    fn disjoint_clusters_stay_apart() {
        let values = docs(json!([
            {"type": "goal_event", "player": "A"},
            {"type": "card_event", "card": "red"},
        ]));
        let (_, second) = assign(&values, &ChoiceTuning::default());
        // {card, type} sorts before {player, type}
        assert_eq!(second.labels(), [1, 0]);
    }

    #[test]
    fn minor_clusters_absorb_their_own_sparse_fields() {
        let values = docs(json!([
            {"kind": "Point", "x": 1, "y": 2},
            {"kind": "Label", "text": "a"},
            {"kind": "Point", "x": 1, "y": 2, "z": 0},
            {"kind": "Label", "text": "b", "size": 3},
        ]));
        let (first, second) = assign(&values, &ChoiceTuning::default());
        assert_eq!(first.cluster_count(), 4);
        assert_eq!(second.labels(), [1, 0, 1, 0]);
    }

    #[test]
    fn null_values_never_conflict() {
        let values = docs(json!([
            {"a": 1, "b": null},
            {"a": 1, "b": null},
            {"a": 1, "b": "s", "c": 1, "d": 1},
        ]));
        let (first, second) = assign(&values, &ChoiceTuning::default());
        assert_eq!(first.cluster_count(), 2);
        assert_eq!(second.cluster_count(), 1);
    }

    #[test]
    fn overlapping_cluster_joins_the_same_host_in_any_order() {
        let a = json!({"type": "a", "ts": 1, "p": 1});
        let b = json!({"type": "b", "ts": 2, "q": 2});
        let c = json!({"type": "a", "ts": 3, "p": 3, "q": 3});
        let orders = [
            [&a, &a, &b, &b, &c, &c],
            [&b, &b, &a, &a, &c, &c],
            [&c, &c, &b, &b, &a, &a],
            [&c, &a, &b, &c, &b, &a],
        ];
        let tuning = ChoiceTuning::default();
        let mut partitions = Vec::new();
        for order in orders {
            let values: Vec<Value> = order.iter().map(|v| Value::from((*v).clone())).collect();
            let (_, second) = assign(&values, &tuning);
            // which instances share a cluster, keyed by their "ts"
            let mut groups: Vec<Vec<i64>> = (0..second.cluster_count())
                .map(|k| {
                    let mut ts: Vec<i64> = second
                        .members(k)
                        .into_iter()
                        .filter_map(|i| match values[i].as_record().and_then(|r| r.get("ts")) {
                            Some(Value::Int(t)) => Some(*t),
                            _ => None,
                        })
                        .collect();
                    ts.sort();
                    ts
                })
                .collect();
            groups.sort();
            partitions.push(groups);
        }
        assert!(partitions.windows(2).all(|w| w[0] == w[1]), "{partitions:?}");
    }
}
