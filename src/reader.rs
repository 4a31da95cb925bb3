use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result};

use crate::parser;
use crate::types::{Header, VariantRecord};

/// Iterator over the records of one VCF input, tagged with a source name.
///
/// The header is parsed eagerly on construction; records are parsed lazily,
/// one line per `next()` call. I/O and parse failures surface as `Err` items.
pub struct VcfRecords<R: Read> {
    source: String,
    header: Rc<Header>,
    line_buf: String,
    inner: BufReader<R>,
}

impl<R: Read> VcfRecords<R> {
    pub fn header(&self) -> &Header {
        self.header.as_ref()
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl VcfRecords<Box<dyn Read>> {
    pub fn from_path<P: AsRef<Path>>(source: &str, path: P) -> Result<Self> {
        let (reader, _format) = niffler::from_path(&path)
            .with_context(|| format!("failed to open {:?}", path.as_ref()))?;
        Self::new(source, reader)
    }
}

impl<R: Read> VcfRecords<R> {
    pub fn new(source: &str, reader: R) -> Result<Self> {
        let mut inner = BufReader::new(reader);
        let mut header_lines = Vec::new();
        let mut line = String::new();
        loop {
            line.clear();
            let n = inner.read_line(&mut line)?;
            if n == 0 {
                break;
            }
            if !line.starts_with('#') {
                anyhow::bail!("data line before column header line: {:?}", line.trim_end());
            }
            let is_column_header = !line.starts_with("##");
            header_lines.push(line.trim_end().to_owned());
            if is_column_header {
                break;
            }
        }
        let header = parser::header(&header_lines)?;
        Ok(Self {
            source: source.into(),
            header: Rc::new(header),
            line_buf: String::new(),
            inner,
        })
    }
}

impl<R: Read> Iterator for VcfRecords<R> {
    type Item = Result<VariantRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line_buf.clear();
            match self.inner.read_line(&mut self.line_buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
            let line = self.line_buf.trim_end();
            if line.is_empty() {
                continue;
            }
            return Some(parser::record_line(
                line,
                &self.source,
                &self.header.samples,
            ));
        }
    }
}
