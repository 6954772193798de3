use crate::{
    dataset::{Dataset, TaggedRecord},
    record::SourceSlices,
};
use itertools::chain;

/// Merge the per-kind result slices of one fetch cycle into one combined
/// [`Dataset`].
///
/// Every row is tagged with its [`SourceKind`](crate::record::SourceKind),
/// slices keep their internal order, and slices are concatenated in the fixed
/// order of [`SourceKind::ALL`](crate::record::SourceKind::ALL). Re-running
/// assembly over the same slices therefore yields a byte-identical dataset.
pub fn assemble(slices: &SourceSlices) -> Dataset {
    let records: Vec<TaggedRecord> = chain!(
        slices.klines.iter().copied().map(TaggedRecord::from),
        slices.bids.iter().copied().map(TaggedRecord::bid),
        slices.asks.iter().copied().map(TaggedRecord::ask),
        slices.funding_rates.iter().copied().map(TaggedRecord::from),
        slices.trades.iter().copied().map(TaggedRecord::from),
        slices.liquidations.iter().copied().map(TaggedRecord::from),
    )
    .collect();

    Dataset::new(records)
}
