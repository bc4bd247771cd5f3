//! Choice inference: split a population of sibling records into variants
//! selected by a tag field.
//!
//! 1. cluster instances by field signature ([`cluster::cluster_signatures`]),
//! 2. fold clusters that only add sparse optional fields into the larger
//!    cluster they overlap most ([`cluster::refine_clusters`]),
//! 3. look for a string field whose values predict the surviving clusters
//!    ([`discriminator::find_discriminator`]),
//! 4. group instances by that field's value and merge each group into a
//!    variant record.
//!
//! Anything short of a convincing discriminator yields `None` and the caller
//! merges a plain record.

pub mod cluster;
pub mod discriminator;

use indexmap::IndexMap;
use tracing::debug;

use self::cluster::{Signature, cluster_signatures, refine_clusters, signature_of};
use self::discriminator::find_discriminator;
use super::merge::Merger;
use super::obj;
use super::path::Path;
use crate::ir::{ChoiceType, InferredType};
use crate::value::{Fields, Value};

/// Try to describe `records` as a discriminated choice.
///
/// `budget` is the remaining choice depth; nothing is attempted at zero, for
/// fewer than two instances, or when choices are disabled.
pub fn infer_choice(merger: &Merger<'_>, path: &Path, records: &[&Fields], budget: usize) -> Option<ChoiceType> {
    let config = merger.config();
    if !config.infer_choices || budget == 0 || records.len() < 2 {
        return None;
    }
    let tuning = &config.choices;

    let signatures: Vec<Signature<'_>> = records.iter().map(|r| signature_of(r)).collect();
    let clusters = cluster_signatures(&signatures, tuning.signature_similarity);
    let refined = refine_clusters(&clusters, records, tuning);
    debug!(
        %path,
        instances = records.len(),
        clusters = clusters.cluster_count(),
        refined = refined.cluster_count(),
        "clustered field signatures"
    );
    if refined.cluster_count() < 2 {
        return None;
    }

    let Some(discriminator) = find_discriminator(records, &refined, tuning) else {
        debug!(%path, "no discriminator, merging as one record");
        return None;
    };
    debug!(
        %path,
        field = %discriminator.field,
        purity = discriminator.purity,
        variants = discriminator.distinct,
        "discriminator selected"
    );
    build_choice(merger, path, records, &discriminator.field, budget)
}

fn build_choice(
    merger: &Merger<'_>,
    path: &Path,
    records: &[&Fields],
    discriminator: &str,
    budget: usize,
) -> Option<ChoiceType> {
    let mut groups: IndexMap<&str, Vec<&Fields>> = IndexMap::new();
    for record in records {
        let tag = record.get(discriminator).and_then(Value::as_str)?;
        groups.entry(tag).or_default().push(*record);
    }

    let overrides = if budget > 1 {
        shared_record_fields(merger, path, records, &groups, discriminator, budget - 1)
    } else {
        IndexMap::new()
    };

    let variants = groups
        .iter()
        .map(|(tag, group)| {
            let record = merger.build_record(&path.variant(tag), group, budget - 1, Some(discriminator), &overrides);
            (tag.to_string(), record)
        })
        .collect();
    Some(ChoiceType { discriminator: discriminator.to_string(), variants })
}

/// Record-valued fields carried by every variant are merged once over the
/// whole population, so a nested envelope is analysed with all of its
/// instances rather than one variant's share.
fn shared_record_fields(
    merger: &Merger<'_>,
    path: &Path,
    records: &[&Fields],
    groups: &IndexMap<&str, Vec<&Fields>>,
    discriminator: &str,
    field_budget: usize,
) -> IndexMap<String, InferredType> {
    let is_record = |v: Option<&Value>| matches!(v, Some(Value::Record(_)));
    let mut out = IndexMap::new();
    for name in obj::field_names(records) {
        if name == discriminator {
            continue;
        }
        let values: Vec<&Value> = records
            .iter()
            .filter_map(|r| r.get(name))
            .filter(|v| !v.is_null())
            .collect();
        if values.is_empty() || !values.iter().all(|v| is_record(Some(v))) {
            continue;
        }
        if !groups.values().all(|group| group.iter().any(|r| is_record(r.get(name)))) {
            continue;
        }
        out.insert(name.to_string(), merger.merge_present(&path.field(name), &values, field_budget));
    }
    out
}
