use anyhow::{anyhow, bail, Context, Result};
use itertools::Itertools;
use nom::branch::alt;
use nom::bytes::complete::{escaped, is_not, tag};
use nom::character::complete::none_of;
use nom::combinator::{map, opt};
use nom::multi::separated_list0;
use nom::sequence::{delimited, preceded, separated_pair};
use nom::IResult;

use crate::types::{
    Genotype, Header, HeaderContig, HeaderFilter, HeaderFormat, HeaderInfo, HeaderValue,
    InfoNumber, VariantRecord,
};

fn parse_usize(input: &str) -> usize {
    input.parse().unwrap()
}

pub(crate) fn info_number(input: &str) -> IResult<&str, InfoNumber> {
    let r: IResult<&str, usize> = map(nom::character::complete::digit1, parse_usize)(input);
    if let Ok((input, number)) = r {
        Ok((input, InfoNumber::Count(number)))
    } else {
        let (input, char) = alt((nom::character::complete::alpha1, tag(".")))(input)?;
        let number = match char {
            "A" => InfoNumber::AlternateAlleles,
            "R" => InfoNumber::Alleles,
            "G" => InfoNumber::Genotypes,
            "." => InfoNumber::Unknown,
            x => panic!("Unknown Number type {}", x),
        };
        Ok((input, number))
    }
}

fn string(input: &str) -> IResult<&str, &str> {
    delimited(
        tag("\""),
        escaped(none_of("\\\""), '\\', alt((tag("\\"), tag("\"")))),
        tag("\""),
    )(input)
}

fn keys_and_values(input: &str) -> IResult<&str, Vec<(&str, &str)>> {
    fn key_value(input: &str) -> IResult<&str, (&str, &str)> {
        separated_pair(is_not("<,=\n"), tag("="), alt((string, is_not(">,=\n"))))(input)
    }
    separated_list0(tag(","), key_value)(input)
}

fn structured_value<'a>(input: &'a str) -> IResult<&'a str, Vec<(&'a str, &'a str)>> {
    delimited(tag("<"), keys_and_values, tag(">"))(input)
}

/// Parse one `##key=value` meta line into a (key, value) entry. Structured
/// INFO/FORMAT/FILTER/contig values become their typed variants, everything
/// else stays a plain string.
pub fn meta_line(line: &str) -> Result<(String, HeaderValue)> {
    fn entry(input: &str) -> IResult<&str, (&str, &str)> {
        preceded(tag("##"), separated_pair(is_not("="), tag("="), is_not("\n")))(input)
    }
    let (_, (key, value)) = entry(line).map_err(|e| anyhow!("malformed meta line: {}", e))?;
    let value = match key {
        "INFO" => {
            let data = structured_value(value)
                .map_err(|e| anyhow!("malformed INFO line: {}", e))?
                .1;
            HeaderValue::Info(HeaderInfo::from(data))
        }
        "FORMAT" => {
            let data = structured_value(value)
                .map_err(|e| anyhow!("malformed FORMAT line: {}", e))?
                .1;
            HeaderValue::Format(HeaderFormat::from(data))
        }
        "FILTER" => {
            let data = structured_value(value)
                .map_err(|e| anyhow!("malformed FILTER line: {}", e))?
                .1;
            HeaderValue::Filter(HeaderFilter::from(data))
        }
        "contig" => {
            let data = structured_value(value)
                .map_err(|e| anyhow!("malformed contig line: {}", e))?
                .1;
            HeaderValue::Contig(HeaderContig::from(data))
        }
        _ => HeaderValue::String(value.into()),
    };
    Ok((key.into(), value))
}

const COLUMN_HEADER: &str = "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO";

/// Parse the `#CHROM` column line, yielding the declared sample names.
pub fn sample_line(line: &str) -> Result<Vec<String>> {
    let rest = line
        .strip_prefix(COLUMN_HEADER)
        .with_context(|| format!("malformed column header line: {:?}", line))?;
    match rest.strip_prefix("\tFORMAT") {
        None if rest.is_empty() => Ok(vec![]),
        None => bail!("malformed column header line: {:?}", line),
        Some(samples) => Ok(samples
            .split('\t')
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect_vec()),
    }
}

/// Accumulate meta and sample lines into a `Header`.
pub fn header(lines: &[String]) -> Result<Header> {
    let mut header = Header::default();
    for line in lines {
        if line.starts_with("##") {
            let (key, value) = meta_line(line)?;
            match &value {
                HeaderValue::Info(info) => {
                    header.info.insert(info.id.clone(), info.clone());
                }
                HeaderValue::Format(format) => {
                    header.format.insert(format.id.clone(), format.clone());
                }
                HeaderValue::Filter(filter) => {
                    header.filters.insert(filter.id.clone(), filter.clone());
                }
                HeaderValue::Contig(contig) => {
                    header.contigs.insert(contig.id.clone(), contig.clone());
                }
                HeaderValue::String(_) => {}
            }
            header.meta.insert(key, value);
        } else if line.starts_with('#') {
            header.samples = sample_line(line)?;
        } else {
            bail!("unexpected non-header line: {:?}", line);
        }
    }
    Ok(header)
}

fn info_entries(input: &str) -> IResult<&str, Vec<(&str, Option<&str>)>> {
    fn entry(input: &str) -> IResult<&str, (&str, Option<&str>)> {
        let (input, key) = is_not(";=\t")(input)?;
        let (input, value) = opt(preceded(tag("="), is_not(";\t")))(input)?;
        Ok((input, (key, value)))
    }
    separated_list0(tag(";"), entry)(input)
}

/// Parse one tab-separated data line into a `VariantRecord` tagged with the
/// name of the source it came from. `samples` is the header's declared sample
/// order, which binds the per-sample columns to their names.
pub fn record_line(line: &str, source: &str, samples: &[String]) -> Result<VariantRecord> {
    let mut columns = line.split('\t');
    let mut next_column = |what: &str| {
        columns
            .next()
            .with_context(|| format!("record line is missing the {} column: {:?}", what, line))
    };
    let chrom = next_column("CHROM")?;
    let pos_column = next_column("POS")?;
    let pos = pos_column
        .parse::<u32>()
        .with_context(|| format!("invalid POS {:?}", pos_column))?;
    let id = next_column("ID")?;
    let ref_allele = next_column("REF")?;
    let alt_column = next_column("ALT")?;
    let alt_alleles = if alt_column == "." {
        vec![]
    } else {
        alt_column.split(',').map(String::from).collect_vec()
    };
    let qual_column = next_column("QUAL")?;
    let qual = if qual_column == "." {
        None
    } else {
        Some(
            qual_column
                .parse::<f32>()
                .with_context(|| format!("invalid QUAL {:?}", qual_column))?,
        )
    };
    let filter_column = next_column("FILTER")?;
    let filters = if filter_column == "." {
        None
    } else {
        Some(filter_column.split(';').map(String::from).collect_vec())
    };
    let info_column = next_column("INFO")?;
    let info = if info_column == "." {
        Default::default()
    } else {
        let (rest, entries) =
            info_entries(info_column).map_err(|e| anyhow!("malformed INFO column: {}", e))?;
        if !rest.is_empty() {
            bail!("trailing garbage in INFO column: {:?}", rest);
        }
        entries
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v.map(String::from)))
            .collect()
    };

    let mut genotypes = indexmap::IndexMap::new();
    if let Some(format_column) = columns.next() {
        let format_keys = format_column.split(':').collect_vec();
        for (i, sample_column) in columns.enumerate() {
            let sample = samples
                .get(i)
                .with_context(|| format!("more sample columns than declared samples: {:?}", line))?;
            // trailing fields may be dropped per sample, hence zip
            let fields = format_keys
                .iter()
                .zip(sample_column.split(':'))
                .map(|(k, v)| ((*k).to_owned(), v.to_owned()))
                .collect();
            genotypes.insert(sample.clone(), Genotype { fields });
        }
    }

    Ok(VariantRecord {
        source: source.into(),
        chrom: chrom.into(),
        pos,
        id: id.into(),
        ref_allele: ref_allele.into(),
        alt_alleles,
        qual,
        filters,
        info,
        genotypes,
    })
}
