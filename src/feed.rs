use std::collections::VecDeque;
use std::io::Read;
use std::path::Path;
use std::rc::Rc;

use anyhow::{Error, Result};
use log::info;

use crate::reader::VcfRecords;
use crate::types::{Header, VariantRecord};

/// Default per-source read-ahead window, in records.
pub const DEFAULT_READ_AHEAD: usize = 1000;

/// Merges the record streams of N named sources into a single stream globally
/// sorted by (contig, position), under a merged header.
///
/// Each source contributes a bounded read-ahead buffer of at most
/// `read_ahead` records, so interleaving never loads a whole file. Sources
/// must individually be position-sorted; contigs order by their declaration
/// index in the merged header, undeclared contigs after all declared ones in
/// name order.
pub struct MultiSourceFeed {
    header: Rc<Header>,
    sources: Vec<SourceState>,
    read_ahead: usize,
}

struct SourceState {
    records: VcfRecords<Box<dyn Read>>,
    buffer: VecDeque<VariantRecord>,
    pending_error: Option<Error>,
    done: bool,
}

impl SourceState {
    fn refill(&mut self, read_ahead: usize) {
        while !self.done && self.pending_error.is_none() && self.buffer.len() < read_ahead {
            match self.records.next() {
                Some(Ok(record)) => self.buffer.push_back(record),
                Some(Err(e)) => self.pending_error = Some(e),
                None => self.done = true,
            }
        }
    }

    fn sort_key<'a>(&'a self, header: &Header) -> Option<(usize, &'a str, u32)> {
        self.buffer
            .front()
            .map(|r| (header.contig_rank(r.chrom()), r.chrom().as_str(), *r.pos()))
    }
}

impl MultiSourceFeed {
    pub fn from_paths<P: AsRef<Path>>(inputs: &[(String, P)]) -> Result<Self> {
        let readers = inputs
            .iter()
            .map(|(name, path)| VcfRecords::from_path(name, path))
            .collect::<Result<Vec<_>>>()?;
        Self::from_readers(readers)
    }

    pub fn from_readers(readers: Vec<VcfRecords<Box<dyn Read>>>) -> Result<Self> {
        let mut header = Header::default();
        for records in &readers {
            info!("merging header of source {}", records.source());
            header.merge(records.header());
        }
        Ok(Self {
            header: Rc::new(header),
            sources: readers
                .into_iter()
                .map(|records| SourceState {
                    records,
                    buffer: VecDeque::new(),
                    pending_error: None,
                    done: false,
                })
                .collect(),
            read_ahead: DEFAULT_READ_AHEAD,
        })
    }

    pub fn with_read_ahead(mut self, read_ahead: usize) -> Self {
        assert!(read_ahead > 0);
        self.read_ahead = read_ahead;
        self
    }

    pub fn header(&self) -> &Header {
        self.header.as_ref()
    }

    pub fn header_rc(&self) -> Rc<Header> {
        self.header.clone()
    }
}

impl Iterator for MultiSourceFeed {
    type Item = Result<VariantRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        for source in &mut self.sources {
            source.refill(self.read_ahead);
        }
        // a source whose buffer ran dry on an error can no longer take part
        // in the merge, so its failure surfaces now, unmodified
        for source in &mut self.sources {
            if source.buffer.is_empty() {
                if let Some(e) = source.pending_error.take() {
                    return Some(Err(e));
                }
            }
        }
        let header = &self.header;
        let min = self
            .sources
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.sort_key(header).map(|key| (key, i)))
            .min()?
            .1;
        self.sources[min].buffer.pop_front().map(Ok)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use itertools::Itertools;
    use std::io::Cursor;

    fn reader(name: &str, content: &str) -> VcfRecords<Box<dyn Read>> {
        let boxed: Box<dyn Read> = Box::new(Cursor::new(content.to_owned()));
        VcfRecords::new(name, boxed).unwrap()
    }

    const LEFT: &str = "\
##fileformat=VCFv4.2\n\
##contig=<ID=1>\n\
##contig=<ID=2>\n\
##INFO=<ID=DP,Number=1,Type=Integer,Description=\"Total Depth\">\n\
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tS1\n\
1\t100\t.\tA\tG\t50\tPASS\tDP=10\tGT\t0/1\n\
2\t50\t.\tC\tT\t.\t.\t.\tGT\t1/1\n";

    const RIGHT: &str = "\
##fileformat=VCFv4.2\n\
##contig=<ID=1>\n\
##contig=<ID=2>\n\
##INFO=<ID=AF,Number=A,Type=Float,Description=\"Allele Frequency\">\n\
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tS2\n\
1\t100\t.\tA\tC\t60\tPASS\tAF=0.5\tGT\t0/1\n\
1\t300\t.\tG\tA\t.\t.\t.\tGT\t0/0\n";

    #[test]
    fn test_merged_header() {
        let feed = MultiSourceFeed::from_readers(vec![
            reader("left", LEFT),
            reader("right", RIGHT),
        ])
        .unwrap();
        let header = feed.header();
        assert!(header.info().contains_key("DP"));
        assert!(header.info().contains_key("AF"));
        assert_eq!(header.samples(), &vec!["S1".to_owned(), "S2".to_owned()]);
    }

    #[test]
    fn test_interleaves_by_position() {
        let feed = MultiSourceFeed::from_readers(vec![
            reader("left", LEFT),
            reader("right", RIGHT),
        ])
        .unwrap()
        .with_read_ahead(2);
        let order = feed
            .map(|r| {
                let r = r.unwrap();
                (r.source().clone(), r.chrom().clone(), *r.pos())
            })
            .collect_vec();
        assert_eq!(
            order,
            vec![
                ("left".to_owned(), "1".to_owned(), 100),
                ("right".to_owned(), "1".to_owned(), 100),
                ("right".to_owned(), "1".to_owned(), 300),
                ("left".to_owned(), "2".to_owned(), 50),
            ]
        );
    }
}
