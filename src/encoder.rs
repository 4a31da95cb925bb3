use std::rc::Rc;

use anyhow::{bail, Result};
use itertools::Itertools;

use crate::types::{Header, VariantRecord};

/// Canonical single-line VCF rendering of a record under a header.
///
/// This is the authoritative mismatch signal for the diff engine: two records
/// match iff their canonical lines are byte-identical. Encoding is total for
/// well-formed records and fails with an error for records that cannot be
/// expressed under the header (for example a genotype for an undeclared
/// sample), never silently.
pub struct VcfEncoder {
    header: Rc<Header>,
}

impl VcfEncoder {
    pub fn new(header: Rc<Header>) -> Self {
        Self { header }
    }

    pub fn encode(&self, record: &VariantRecord) -> Result<String> {
        for sample in record.genotypes().keys() {
            if !self.header.samples().contains(sample) {
                bail!(
                    "record at {}:{} has a genotype for undeclared sample {}",
                    record.chrom(),
                    record.pos(),
                    sample
                );
            }
        }

        let alt = if record.alt_alleles().is_empty() {
            ".".to_owned()
        } else {
            record.alt_alleles().iter().join(",")
        };
        let filter = match record.filters() {
            None => ".".to_owned(),
            Some(filters) => filters.iter().join(";"),
        };
        let info = if record.info().is_empty() {
            ".".to_owned()
        } else {
            record
                .info()
                .iter()
                .map(|(key, value)| match value {
                    Some(value) => format!("{}={}", key, value),
                    None => key.clone(),
                })
                .join(";")
        };

        let mut line = format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            record.chrom(),
            record.pos(),
            record.id(),
            record.ref_allele(),
            alt,
            format_qual(*record.qual()),
            filter,
            info,
        );

        if !record.genotypes().is_empty() {
            // FORMAT keys: union over all genotype blocks, first-seen order
            let mut format_keys: Vec<&str> = Vec::new();
            for genotype in record.genotypes().values() {
                for key in genotype.fields().keys() {
                    if !format_keys.contains(&key.as_str()) {
                        format_keys.push(key);
                    }
                }
            }
            line.push('\t');
            line.push_str(&format_keys.iter().join(":"));
            // sample columns come out in header order, not record order
            for sample in self.header.samples() {
                line.push('\t');
                match record.genotype(sample) {
                    Some(genotype) => {
                        let column = format_keys
                            .iter()
                            .map(|key| genotype.field(key.as_ref()).unwrap_or("."))
                            .join(":");
                        line.push_str(&column);
                    }
                    None => line.push('.'),
                }
            }
        }
        Ok(line)
    }
}

/// Quality formatting: two decimal places, trailing zeros (and a trailing
/// dot) trimmed, so `50.0` renders as `50` and `50.5` as `50.5`.
pub fn format_qual(qual: Option<f32>) -> String {
    match qual {
        None => ".".to_owned(),
        Some(q) => {
            let s = format!("{:.2}", q);
            s.trim_end_matches('0').trim_end_matches('.').to_owned()
        }
    }
}
