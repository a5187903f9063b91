//! CSV row source.
//!
//! The first record of the file names the parameters; every later record is
//! one row of values. Rows are yielded lazily and are not arity-checked here.
//! Any read error after the header ends the sequence, so a malformed trailing
//! record looks exactly like end of input to the caller.

use crate::error::{LittlejohnError, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

/// One data record, positionally aligned with the header.
pub type Row = Vec<String>;

/// Header of the CSV file: one flag name per column, trimmed.
pub type ParameterNames = Arc<[String]>;

/// Lazy, non-restartable sequence of rows read from a CSV source.
pub struct RowSource<R = File> {
    header: ParameterNames,
    records: csv::ByteRecordsIntoIter<R>,
    exhausted: bool,
}

impl RowSource<File> {
    /// Open a CSV file and read its header row.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            LittlejohnError::InputError(format!("'{}': {}", path.display(), e))
        })?;

        Self::from_reader(file).map_err(|e| match e {
            LittlejohnError::FormatError(msg) => {
                LittlejohnError::FormatError(format!("'{}': {}", path.display(), msg))
            }
            other => other,
        })
    }
}

impl<R: Read> RowSource<R> {
    /// Build a row source over any reader, consuming the header record.
    pub fn from_reader(reader: R) -> Result<Self> {
        let mut records = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader)
            .into_byte_records();

        let header = match records.next() {
            Some(Ok(record)) => record
                .iter()
                .map(|field| lossy_field(field).trim().to_string())
                .collect::<Vec<_>>(),
            Some(Err(e)) => return Err(LittlejohnError::FormatError(e.to_string())),
            None => {
                return Err(LittlejohnError::FormatError(
                    "file has no header row".to_string(),
                ));
            }
        };

        Ok(Self {
            header: header.into(),
            records,
            exhausted: false,
        })
    }

    /// Parameter names from the header row.
    pub fn header(&self) -> &ParameterNames {
        &self.header
    }
}

impl<R: Read> Iterator for RowSource<R> {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        if self.exhausted {
            return None;
        }

        match self.records.next() {
            Some(Ok(record)) => Some(record.iter().map(lossy_field).collect()),
            Some(Err(e)) => {
                tracing::debug!(error = %e, "row read failed, treating as end of input");
                self.exhausted = true;
                None
            }
            None => {
                self.exhausted = true;
                None
            }
        }
    }
}

/// Fields are decoded lossily; an encoding mismatch never ends the input.
fn lossy_field(field: &[u8]) -> String {
    String::from_utf8_lossy(field).into_owned()
}
