use indexmap::IndexSet;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::types::{Header, Sample};

/// The seven fixed per-site columns every VCF record has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, EnumIter)]
pub enum CoreField {
    Chrom,
    Start,
    Id,
    Ref,
    Alt,
    Qual,
    Filter,
}

/// FORMAT fields every genotype may carry even without a header declaration.
pub const FIXED_FORMAT_FIELDS: [&str; 6] = ["GT", "AD", "DP", "GQ", "PL", "FT"];

/// Address of one comparable field of a record: a fixed core column, a
/// declared INFO field, or a declared FORMAT field of one sample. Equality
/// and hashing are structural, so the same (sample, field) pair is the same
/// key no matter where it was constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKey {
    Core(CoreField),
    Info(String),
    Format { sample: Sample, field: String },
}

impl FieldKey {
    pub fn info<S: Into<String>>(name: S) -> Self {
        FieldKey::Info(name.into())
    }

    pub fn format<S: Into<String>, F: Into<String>>(sample: S, field: F) -> Self {
        FieldKey::Format {
            sample: sample.into(),
            field: field.into(),
        }
    }

    /// Column label for display purposes.
    pub fn label(&self) -> String {
        match self {
            FieldKey::Core(core) => core.to_string(),
            FieldKey::Info(name) => name.clone(),
            FieldKey::Format { sample, field } => format!("{}:{}", sample, field),
        }
    }
}

/// The closed, ordered set of comparable fields a header declares: the seven
/// core keys, one key per INFO line in declaration order, then per sample (in
/// declared order) the six fixed FORMAT keys followed by the declared FORMAT
/// lines. Exact duplicates collapse because the catalog is a set.
pub fn catalog(header: &Header) -> IndexSet<FieldKey> {
    let mut keys = IndexSet::new();
    for core in CoreField::iter() {
        keys.insert(FieldKey::Core(core));
    }
    for id in header.info().keys() {
        keys.insert(FieldKey::info(id.as_str()));
    }
    for sample in header.samples() {
        for field in &FIXED_FORMAT_FIELDS {
            keys.insert(FieldKey::format(sample.as_str(), *field));
        }
        for id in header.format().keys() {
            keys.insert(FieldKey::format(sample.as_str(), id.as_str()));
        }
    }
    keys
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser;

    fn header() -> Header {
        parser::header(&[
            "##INFO=<ID=DP,Number=1,Type=Integer,Description=\"Total Depth\">".to_owned(),
            "##INFO=<ID=AF,Number=A,Type=Float,Description=\"Allele Frequency\">".to_owned(),
            "##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">".to_owned(),
            "##FORMAT=<ID=GL,Number=G,Type=Float,Description=\"Likelihoods\">".to_owned(),
            "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tS1\tS2".to_owned(),
        ])
        .unwrap()
    }

    #[test]
    fn test_catalog_order() {
        let keys: Vec<_> = catalog(&header()).into_iter().collect();
        assert_eq!(keys[0], FieldKey::Core(CoreField::Chrom));
        assert_eq!(keys[6], FieldKey::Core(CoreField::Filter));
        assert_eq!(keys[7], FieldKey::info("DP"));
        assert_eq!(keys[8], FieldKey::info("AF"));
        // per sample: the fixed six first, then declared FORMAT lines;
        // GT is already among the fixed six and collapses
        assert_eq!(keys[9], FieldKey::format("S1", "GT"));
        assert_eq!(keys[14], FieldKey::format("S1", "FT"));
        assert_eq!(keys[15], FieldKey::format("S1", "GL"));
        assert_eq!(keys[16], FieldKey::format("S2", "GT"));
        assert_eq!(keys.len(), 9 + 2 * 7);
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(FieldKey::format("S1", "GT"), FieldKey::format("S1", "GT"));
        assert_ne!(FieldKey::format("S1", "GT"), FieldKey::format("S2", "GT"));
        assert_ne!(FieldKey::info("DP"), FieldKey::format("S1", "DP"));
    }

    #[test]
    fn test_labels() {
        assert_eq!(FieldKey::Core(CoreField::Chrom).label(), "Chrom");
        assert_eq!(FieldKey::info("DP").label(), "DP");
        assert_eq!(FieldKey::format("S1", "GT").label(), "S1:GT");
    }

    #[test]
    fn test_catalog_is_deterministic() {
        assert_eq!(catalog(&header()), catalog(&header()));
    }
}
