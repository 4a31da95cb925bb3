use anyhow::Result;

use crate::diff::pair::DiffPair;
use crate::types::VariantRecord;

/// Groups adjacent records of a position-sorted stream into `DiffPair`s.
///
/// One record of lookahead: the next record becomes the tentative left side;
/// if the record after it sits at the same (contig, position) it is consumed
/// as the right side, otherwise the pair stays one-sided and the lookahead
/// carries over. Only two records are ever grouped per position: a third
/// record at the same site starts a fresh pair against whatever follows.
///
/// Upstream errors pass through unmodified, each as its own `Err` item;
/// exhaustion is ordinary iterator exhaustion.
pub struct PositionMatchingPairs<I>
where
    I: Iterator<Item = Result<VariantRecord>>,
{
    inner: I,
    lookahead: Option<Result<VariantRecord>>,
}

impl<I> PositionMatchingPairs<I>
where
    I: Iterator<Item = Result<VariantRecord>>,
{
    pub fn new(inner: I) -> Self {
        Self {
            inner,
            lookahead: None,
        }
    }

    fn pull(&mut self) -> Option<Result<VariantRecord>> {
        self.lookahead.take().or_else(|| self.inner.next())
    }
}

impl<I> Iterator for PositionMatchingPairs<I>
where
    I: Iterator<Item = Result<VariantRecord>>,
{
    type Item = Result<DiffPair>;

    fn next(&mut self) -> Option<Self::Item> {
        let left = match self.pull()? {
            Ok(record) => record,
            Err(e) => return Some(Err(e)),
        };
        debug_assert!(self.lookahead.is_none());
        self.lookahead = self.inner.next();
        let right = match &self.lookahead {
            Some(Ok(peek)) if left.same_position(peek) => {
                // errors stay parked in the lookahead until their own turn
                match self.lookahead.take() {
                    Some(Ok(record)) => Some(record),
                    _ => unreachable!(),
                }
            }
            _ => None,
        };
        Some(Ok(DiffPair::new(Some(left), right)))
    }
}
