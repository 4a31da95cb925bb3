use anyhow::Result;
use getset::Getters;
use itertools::Itertools;

use crate::diff::keys::{CoreField, FieldKey};
use crate::encoder::{format_qual, VcfEncoder};
use crate::types::VariantRecord;

/// The extracted left/right values of one field on one pair.
///
/// `None` means the whole record was absent on that side; an empty string
/// means the record was there but carried no value for the field. Pruning
/// treats the two alike, display does not, so both are kept.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
#[getset(get = "pub")]
pub struct DiffValue {
    left: Option<String>,
    right: Option<String>,
}

impl DiffValue {
    pub fn new(left: Option<String>, right: Option<String>) -> Self {
        Self { left, right }
    }

    /// Neither side carries a value (null and empty string count alike).
    pub fn is_empty(&self) -> bool {
        fn blank(side: &Option<String>) -> bool {
            side.as_ref().map_or(true, |s| s.is_empty())
        }
        blank(&self.left) && blank(&self.right)
    }

    pub fn differs(&self) -> bool {
        self.left != self.right
    }
}

/// Two positionally matched records, or one record with no counterpart.
/// At least one side is always present.
#[derive(Debug, Clone, Getters)]
#[getset(get = "pub")]
pub struct DiffPair {
    left: Option<VariantRecord>,
    right: Option<VariantRecord>,
}

impl DiffPair {
    pub fn new(left: Option<VariantRecord>, right: Option<VariantRecord>) -> Self {
        debug_assert!(left.is_some() || right.is_some());
        Self { left, right }
    }

    /// Extract the value of `key` on both sides. Never fails: an absent side
    /// yields null, a present side with nothing behind the key yields the
    /// empty string.
    pub fn value(&self, key: &FieldKey) -> DiffValue {
        DiffValue::new(
            self.left.as_ref().map(|r| extract(r, key)),
            self.right.as_ref().map(|r| extract(r, key)),
        )
    }

    /// The authoritative mismatch signal: true when one side is absent, or
    /// when the two canonical encodings differ anywhere, including in fields
    /// no catalog key addresses. Encoding failure propagates.
    pub fn mismatching(&self, encoder: &VcfEncoder) -> Result<bool> {
        match (&self.left, &self.right) {
            (Some(left), Some(right)) => Ok(encoder.encode(left)? != encoder.encode(right)?),
            _ => Ok(true),
        }
    }
}

fn extract(record: &VariantRecord, key: &FieldKey) -> String {
    match key {
        FieldKey::Core(core) => match core {
            CoreField::Chrom => record.chrom().clone(),
            CoreField::Start => record.pos().to_string(),
            CoreField::Id => record.id().clone(),
            CoreField::Ref => record.ref_allele().clone(),
            CoreField::Alt => record.alt_alleles().iter().join(","),
            CoreField::Qual => format_qual(*record.qual()),
            CoreField::Filter => match record.filters() {
                None => String::new(),
                Some(filters) => filters.iter().join(","),
            },
        },
        FieldKey::Info(name) => match record.info().get(name) {
            Some(Some(value)) => value.clone(),
            // a flag carries no payload, presence is the value
            Some(None) => "true".to_owned(),
            None => String::new(),
        },
        FieldKey::Format { sample, field } => match record.genotype(sample) {
            Some(genotype) => genotype.field(field).unwrap_or("").to_owned(),
            None => String::new(),
        },
    }
}
