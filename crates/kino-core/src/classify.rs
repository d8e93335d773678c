//! Partition canonical records by cinema chain.

use std::collections::BTreeMap;

use kino_model::{CanonicalScreening, ChainPartition};

/// Records of one chain partition, ready to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainGroup {
    pub chain: ChainPartition,
    pub records: Vec<CanonicalScreening>,
}

impl ChainGroup {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Worksheet cells for every record, in partition order.
    pub fn worksheet_rows(&self) -> Vec<Vec<String>> {
        self.records
            .iter()
            .map(CanonicalScreening::worksheet_row)
            .collect()
    }
}

/// Split records into chain partitions.
///
/// Every record lands in exactly one group. Groups come back in sync order,
/// one per partition (possibly empty), and records inside a group are
/// stably sorted by city, cinema, movie and time.
pub fn partition_by_chain(records: &[CanonicalScreening]) -> Vec<ChainGroup> {
    let mut buckets: BTreeMap<ChainPartition, Vec<CanonicalScreening>> = ChainPartition::ALL
        .into_iter()
        .map(|chain| (chain, Vec::new()))
        .collect();
    for record in records {
        buckets
            .entry(ChainPartition::classify(&record.cinema_name))
            .or_default()
            .push(record.clone());
    }
    buckets
        .into_iter()
        .map(|(chain, mut records)| {
            records.sort_by(|a, b| a.presentation_key().cmp(&b.presentation_key()));
            ChainGroup { chain, records }
        })
        .collect()
}
