//! Cross-provider place deduplication.
//!
//! Two phases, applied in order:
//!
//! 1. Identity: within one source, a repeated `provider_id` is dropped.
//!    Records without an id fall back to their exact name.
//! 2. Fuzzy: sources are visited in priority order. Each record is tested
//!    against the records already kept from higher-priority sources; the
//!    first one it matches (similar name *and* within 150 m) causes it to
//!    be dropped. The kept record is never merged with the dropped one.
//!
//! Surviving records keep their input order.

use std::collections::HashSet;

use crate::geo::haversine_km;
use crate::similarity::similarity;
use crate::types::PlaceRecord;

/// Names scoring above this are considered the same.
pub const NAME_SIMILARITY_THRESHOLD: f64 = 0.85;
/// A substring match only counts when the shorter name is longer than this.
pub const SUBSTRING_MIN_CHARS: usize = 5;
/// Records closer than this (km) may be the same place.
pub const MAX_MATCH_DISTANCE_KM: f64 = 0.15;

/// Deduplicate using first-appearance order as source priority.
pub fn reconcile(records: Vec<PlaceRecord>) -> Vec<PlaceRecord> {
    reconcile_with_priority(records, &[])
}

/// Deduplicate with an explicit source priority.
///
/// Sources listed earlier in `priority` form the base that later ones are
/// matched against. Sources missing from `priority` rank after all listed
/// ones, in order of first appearance.
pub fn reconcile_with_priority(records: Vec<PlaceRecord>, priority: &[&str]) -> Vec<PlaceRecord> {
    let input = records.len();
    let unique = dedup_by_identity(records);
    let order = source_order(&unique, priority);

    let mut keep = vec![false; unique.len()];
    let mut base: Vec<usize> = Vec::new();
    for source in &order {
        let mut kept_here = Vec::new();
        for (idx, candidate) in unique
            .iter()
            .enumerate()
            .filter(|(_, r)| r.source_name == *source)
        {
            match base.iter().find(|&&b| same_place(&unique[b], candidate)) {
                Some(&b) => tracing::trace!(
                    dropped = %candidate.name,
                    source = %candidate.source_name,
                    kept = %unique[b].name,
                    kept_source = %unique[b].source_name,
                    "duplicate place dropped"
                ),
                None => {
                    keep[idx] = true;
                    kept_here.push(idx);
                }
            }
        }
        base.extend(kept_here);
    }

    let reconciled: Vec<PlaceRecord> = unique
        .into_iter()
        .zip(keep)
        .filter_map(|(record, kept)| kept.then_some(record))
        .collect();
    tracing::debug!(input, output = reconciled.len(), "records reconciled");
    reconciled
}

/// Whether two records describe the same real-world place.
pub fn same_place(base: &PlaceRecord, candidate: &PlaceRecord) -> bool {
    names_match(&base.name, &candidate.name)
        && haversine_km(
            base.latitude,
            base.longitude,
            candidate.latitude,
            candidate.longitude,
        ) < MAX_MATCH_DISTANCE_KM
}

/// Fuzzy name equality: high bigram similarity, or one name containing
/// the other when the shorter is long enough to be distinctive.
pub fn names_match(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if similarity(&a, &b) > NAME_SIMILARITY_THRESHOLD {
        return true;
    }
    let (shorter, longer) = if a.chars().count() <= b.chars().count() {
        (&a, &b)
    } else {
        (&b, &a)
    };
    shorter.chars().count() > SUBSTRING_MIN_CHARS && longer.contains(shorter.as_str())
}

fn dedup_by_identity(records: Vec<PlaceRecord>) -> Vec<PlaceRecord> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    records
        .into_iter()
        .filter(|record| {
            let identity = match record.provider_id.as_deref() {
                Some(id) if !id.trim().is_empty() => format!("id:{id}"),
                _ => format!("name:{}", record.name),
            };
            seen.insert((record.source_name.clone(), identity))
        })
        .collect()
}

fn source_order(records: &[PlaceRecord], priority: &[&str]) -> Vec<String> {
    let mut order: Vec<String> = Vec::new();
    let listed = priority.iter().map(|s| (*s).to_owned());
    let appearing = records.iter().map(|r| r.source_name.clone());
    for source in listed.chain(appearing) {
        if !order.contains(&source) {
            order.push(source);
        }
    }
    order
}
