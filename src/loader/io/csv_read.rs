use std::fs::File;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter};

use crate::loader::error::{LoaderError, Result};

/// A typed view over a CSV record whose fields are addressed by position.
pub trait FromRecord: Sized {
    /// Minimum number of columns a record must carry.
    const COLUMNS: usize;

    /// Builds the row from a record that has at least [`Self::COLUMNS`] fields.
    fn from_record(record: &StringRecord) -> Self;
}

/// A row of the product file: `shipment_id, product_name, ...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRow {
    pub shipment_id: String,
    pub product_name: String,
}

impl FromRecord for ProductRow {
    const COLUMNS: usize = 2;

    fn from_record(record: &StringRecord) -> Self {
        Self {
            shipment_id: record[0].to_string(),
            product_name: record[1].to_string(),
        }
    }
}

/// A row of the shipment file: `shipment_id, origin, destination, ...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipmentRow {
    pub shipment_id: String,
    pub origin: String,
    pub destination: String,
}

impl FromRecord for ShipmentRow {
    const COLUMNS: usize = 3;

    fn from_record(record: &StringRecord) -> Self {
        Self {
            shipment_id: record[0].to_string(),
            origin: record[1].to_string(),
            destination: record[2].to_string(),
        }
    }
}

/// Iterator over the data rows of a CSV file. The header row is consumed by
/// the reader and never yielded.
pub struct RowReader<T> {
    path: PathBuf,
    records: StringRecordsIntoIter<File>,
    _row: PhantomData<T>,
}

/// Opens `path` for row-by-row reading.
pub fn open_rows<T: FromRecord>(path: &Path, delimiter: u8) -> Result<RowReader<T>> {
    if !path.exists() {
        return Err(LoaderError::MissingInput(path.to_path_buf()));
    }

    let reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    Ok(RowReader {
        path: path.to_path_buf(),
        records: reader.into_records(),
        _row: PhantomData,
    })
}

impl<T: FromRecord> Iterator for RowReader<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(err) => return Some(Err(err.into())),
        };

        if record.len() < T::COLUMNS {
            return Some(Err(LoaderError::MissingColumn {
                path: self.path.clone(),
                line: record.position().map(|pos| pos.line()).unwrap_or_default(),
                expected: T::COLUMNS,
                found: record.len(),
            }));
        }

        Some(Ok(T::from_record(&record)))
    }
}
