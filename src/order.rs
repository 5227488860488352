//! Priority and weight ordering of SRV record sets.
//!
//! Implements the load-balancing order defined in RFC 2782: records are
//! tried in ascending priority, and records sharing a priority are
//! arranged by repeated weighted-random selection, so that higher weights
//! tend towards the front and zero weights fall to the back.

use crate::record::SrvRecord;
use rand::Rng;
use std::collections::BTreeMap;

/// Partitions records into per-priority groups, in ascending priority
/// order (0 first). Arrival order is preserved within each group.
pub fn group_by_priority(records: Vec<SrvRecord>) -> BTreeMap<u16, Vec<SrvRecord>> {
    let mut groups: BTreeMap<u16, Vec<SrvRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.priority()).or_default().push(record);
    }
    groups
}

/// Arranges one equal-priority group by weighted random selection,
/// returning a permutation of the input.
///
/// Repeatedly draws one record from the remaining set, with probability
/// proportional to its weight, and appends it to the output. Each draw
/// runs against the weights of the records still remaining, so a
/// zero-weight record is never selected while a positive-weight record
/// remains.
pub fn select_by_weight<R: Rng + ?Sized>(mut group: Vec<SrvRecord>, rng: &mut R) -> Vec<SrvRecord> {
    let mut ordered = Vec::with_capacity(group.len());
    while !group.is_empty() {
        let idx = next_pick(&group, rng);
        ordered.push(group.remove(idx));
    }
    ordered
}

/// Draws the index of the next record to select from a non-empty group.
fn next_pick<R: Rng + ?Sized>(group: &[SrvRecord], rng: &mut R) -> usize {
    // Weights are u16 but there may be up to 65535 records, so the sum
    // needs 32 bits; u64 leaves no doubt.
    let total: u64 = group.iter().map(|record| u64::from(record.weight())).sum();
    if total == 0 {
        // Only zero-weight records remain; all are equally likely.
        return rng.random_range(0..group.len());
    }
    let draw = rng.random_range(0..total);
    let mut acc = 0u64;
    for (idx, record) in group.iter().enumerate() {
        acc += u64::from(record.weight());
        if acc > draw {
            return idx;
        }
    }
    // acc reaches total and total > draw, so the loop always returns.
    group.len() - 1
}

/// Produces the final ordering of a record set: ascending priority, each
/// priority group arranged by [`select_by_weight`].
pub fn order_records<R: Rng + ?Sized>(records: Vec<SrvRecord>, rng: &mut R) -> Vec<SrvRecord> {
    let total = records.len();
    let groups = group_by_priority(records);
    let mut ordered = Vec::with_capacity(total);
    for (_, group) in groups {
        ordered.extend(select_by_weight(group, rng));
    }
    ordered
}
