pub mod keys;
pub mod pair;
pub mod pairer;
pub mod prune;

use anyhow::Result;

use crate::encoder::VcfEncoder;
use crate::types::VariantRecord;
pub use keys::{catalog, CoreField, FieldKey};
pub use pair::{DiffPair, DiffValue};
pub use pairer::PositionMatchingPairs;
pub use prune::{column_tree, prune_columns, ColumnNode, VisibilityMap};

/// Which pairs a view exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairFilter {
    All,
    MismatchingOnly,
}

/// A materialized diff: the full pair collection plus the all/mismatching
/// filter toggle. Nothing here recomputes implicitly; after changing the
/// filter, call `prune` again to get a visibility map for the new selection.
pub struct DiffView {
    pairs: Vec<DiffPair>,
    encoder: VcfEncoder,
    filter: PairFilter,
}

impl DiffView {
    /// Drain a record stream into a materialized view. Pruning needs random
    /// access over all pairs, so the stream ends here.
    pub fn materialize<I>(records: I, encoder: VcfEncoder) -> Result<Self>
    where
        I: Iterator<Item = Result<VariantRecord>>,
    {
        let pairs = PositionMatchingPairs::new(records).collect::<Result<Vec<_>>>()?;
        Ok(Self {
            pairs,
            encoder,
            filter: PairFilter::All,
        })
    }

    pub fn filter(&self) -> PairFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: PairFilter) {
        self.filter = filter;
    }

    /// All pairs, regardless of the filter.
    pub fn all_pairs(&self) -> &[DiffPair] {
        &self.pairs
    }

    /// The pairs the current filter selects. Mismatch detection re-encodes
    /// records and can fail on malformed ones; that failure propagates.
    pub fn selected_pairs(&self) -> Result<Vec<&DiffPair>> {
        match self.filter {
            PairFilter::All => Ok(self.pairs.iter().collect()),
            PairFilter::MismatchingOnly => self
                .pairs
                .iter()
                .filter_map(|pair| match pair.mismatching(&self.encoder) {
                    Ok(true) => Some(Ok(pair)),
                    Ok(false) => None,
                    Err(e) => Some(Err(e)),
                })
                .collect(),
        }
    }

    /// Run the pruning pass over the currently selected pairs.
    pub fn prune(
        &self,
        tree: &[ColumnNode],
        previous: Option<&VisibilityMap>,
    ) -> Result<VisibilityMap> {
        let selected: Vec<DiffPair> = self
            .selected_pairs()?
            .into_iter()
            .cloned()
            .collect();
        Ok(prune_columns(tree, &selected, previous))
    }
}
