use std::collections::HashMap;
use std::str::FromStr;

use getset::Getters;
use indexmap::IndexMap;
use multimap::MultiMap;
use strum::EnumString;

use crate::parser;

pub type Sample = String;

/// Parsed `##`/`#CHROM` metadata of a VCF file (or of several merged files).
///
/// Structured entries (INFO, FORMAT, FILTER, contig) are kept in declaration
/// order, keyed by their ID; everything else lands in `meta` uninterpreted.
#[derive(Debug, Clone, Default, Getters)]
#[getset(get = "pub")]
pub struct Header {
    pub(crate) meta: MultiMap<String, HeaderValue>,
    pub(crate) info: IndexMap<String, HeaderInfo>,
    pub(crate) format: IndexMap<String, HeaderFormat>,
    pub(crate) filters: IndexMap<String, HeaderFilter>,
    pub(crate) contigs: IndexMap<String, HeaderContig>,
    pub(crate) samples: Vec<Sample>,
}

impl Header {
    /// Rank of a contig for sort-order purposes: declared contigs compare by
    /// declaration index, undeclared ones sort after all declared ones.
    pub fn contig_rank(&self, contig: &str) -> usize {
        self.contigs.get_index_of(contig).unwrap_or(usize::MAX)
    }

    /// Merge `other` into `self`: first declaration wins for INFO, FORMAT,
    /// FILTER and contig entries; samples are appended in first-seen order.
    pub fn merge(&mut self, other: &Header) {
        for (key, values) in other.meta.iter_all() {
            for value in values {
                self.meta.insert(key.clone(), value.clone());
            }
        }
        for (id, line) in &other.info {
            self.info.entry(id.clone()).or_insert_with(|| line.clone());
        }
        for (id, line) in &other.format {
            self.format
                .entry(id.clone())
                .or_insert_with(|| line.clone());
        }
        for (id, line) in &other.filters {
            self.filters
                .entry(id.clone())
                .or_insert_with(|| line.clone());
        }
        for (id, line) in &other.contigs {
            self.contigs
                .entry(id.clone())
                .or_insert_with(|| line.clone());
        }
        for sample in &other.samples {
            if !self.samples.contains(sample) {
                self.samples.push(sample.clone());
            }
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, EnumString)]
pub enum InfoType {
    Integer,
    Float,
    Flag,
    Character,
    String,
}

#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum InfoNumber {
    Count(usize),
    Alleles,
    AlternateAlleles,
    Genotypes,
    Unknown,
}

#[derive(Debug, Clone)]
pub enum HeaderValue {
    String(String),
    Info(HeaderInfo),
    Filter(HeaderFilter),
    Format(HeaderFormat),
    Contig(HeaderContig),
}

#[derive(Debug, Getters, Clone)]
#[getset(get = "pub")]
pub struct HeaderInfo {
    pub(crate) id: String,
    number: InfoNumber,
    kind: InfoType,
    description: String,
    // may be empty
    source: String,
    // may be empty
    version: String,
    additional: HashMap<String, String>,
}

impl<'a> From<Vec<(&'a str, &'a str)>> for HeaderInfo {
    fn from(data: Vec<(&'a str, &'a str)>) -> Self {
        let mut h: HashMap<_, _> = data.into_iter().collect();
        let mut header_info = HeaderInfo {
            id: h.remove("ID").expect("ID is mandatory").into(),
            number: parser::info_number(h.remove("Number").expect("Number is mandatory"))
                .unwrap()
                .1,
            kind: InfoType::from_str(h.remove("Type").expect("Type is mandatory")).unwrap(),
            description: h
                .remove("Description")
                .expect("Description is mandatory")
                .into(),
            source: h.remove("Source").unwrap_or(&"").into(),
            version: h.remove("Version").unwrap_or(&"").into(),
            additional: Default::default(),
        };
        header_info.additional = h.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        header_info
    }
}

#[derive(Debug, Getters, Clone)]
#[getset(get = "pub")]
pub struct HeaderFormat {
    pub(crate) id: String,
    number: InfoNumber,
    kind: InfoType,
    description: String,
}

impl<'a> From<Vec<(&'a str, &'a str)>> for HeaderFormat {
    fn from(data: Vec<(&'a str, &'a str)>) -> Self {
        let mut h: HashMap<_, _> = data.into_iter().collect();
        HeaderFormat {
            id: h.remove("ID").expect("ID is mandatory").into(),
            number: parser::info_number(h.remove("Number").expect("Number is mandatory"))
                .unwrap()
                .1,
            kind: InfoType::from_str(h.remove("Type").expect("Type is mandatory")).unwrap(),
            description: h
                .remove("Description")
                .expect("Description is mandatory")
                .into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HeaderContig {
    pub(crate) id: String,
    pub(crate) length: Option<usize>,
    additional: HashMap<String, String>,
}

impl<'a> From<Vec<(&'a str, &'a str)>> for HeaderContig {
    fn from(data: Vec<(&'a str, &'a str)>) -> Self {
        let mut h: HashMap<_, _> = data.into_iter().collect();
        let mut header_contig = HeaderContig {
            id: h.remove("ID").expect("ID is mandatory").into(),
            length: h.remove("length").and_then(|s| s.parse().ok()),
            additional: Default::default(),
        };
        header_contig.additional = h.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        header_contig
    }
}

#[derive(Debug, Clone)]
pub struct HeaderFilter {
    pub(crate) id: String,
    pub(crate) description: String,
}

impl<'a> From<Vec<(&'a str, &'a str)>> for HeaderFilter {
    fn from(data: Vec<(&'a str, &'a str)>) -> Self {
        let mut h: HashMap<_, _> = data.into_iter().collect();
        HeaderFilter {
            id: h.remove("ID").expect("ID is mandatory").into(),
            description: h
                .remove("Description")
                .expect("Description is mandatory")
                .into(),
        }
    }
}

/// One data line of a VCF file, fully parsed.
///
/// Values are kept verbatim as strings: the diff engine compares and displays
/// text, it never interprets numeric INFO or FORMAT payloads.
#[derive(Debug, Clone, Getters)]
#[getset(get = "pub")]
pub struct VariantRecord {
    /// Name of the input source this record came from.
    pub(crate) source: String,
    pub(crate) chrom: String,
    /// 1-based start position.
    pub(crate) pos: u32,
    pub(crate) id: String,
    pub(crate) ref_allele: String,
    pub(crate) alt_alleles: Vec<String>,
    pub(crate) qual: Option<f32>,
    /// `None` when the FILTER column is `.` (filters not applied).
    pub(crate) filters: Option<Vec<String>>,
    /// INFO entries in column order; a `None` value is a flag.
    pub(crate) info: IndexMap<String, Option<String>>,
    /// Per-sample genotype blocks, keyed by sample name in column order.
    pub(crate) genotypes: IndexMap<Sample, Genotype>,
}

impl VariantRecord {
    pub fn genotype(&self, sample: &str) -> Option<&Genotype> {
        self.genotypes.get(sample)
    }

    /// Two records are positionally matched iff contig and position agree.
    pub fn same_position(&self, other: &VariantRecord) -> bool {
        self.chrom == other.chrom && self.pos == other.pos
    }
}

/// The FORMAT values of one sample at one site, keyed by FORMAT field ID in
/// the order the record declared them. Trailing fields a record omits are
/// simply absent from the map.
#[derive(Debug, Clone, Default)]
pub struct Genotype {
    pub(crate) fields: IndexMap<String, String>,
}

impl Genotype {
    pub fn field(&self, id: &str) -> Option<&str> {
        self.fields.get(id).map(String::as_str)
    }

    pub fn fields(&self) -> &IndexMap<String, String> {
        &self.fields
    }
}
