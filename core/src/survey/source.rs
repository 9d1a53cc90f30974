use csv::{ReaderBuilder, StringRecord};
use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Column names as they appear (after trimming and lower-casing) in the export.
pub mod columns {
    pub const LATITUDE: &str = "lat";
    pub const LONGITUDE: &str = "long";
    pub const SIGNAL: &str = "rssi";
    pub const TECHNOLOGY: &str = "tech";
    pub const CELL_ID: &str = "psc_pci";
    pub const OPERATOR: &str = "net_op_name";

    pub const REQUIRED: [&str; 2] = [LATITUDE, LONGITUDE];
}

/// Failures that prevent a source table from being loaded at all.
#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("data file '{}' was not found", .0.display())]
    MissingSource(PathBuf),
    #[error("data file is empty")]
    EmptySource,
    #[error("columns {0:?} are missing from the data file")]
    MissingColumns(Vec<String>),
    #[error("could not read data file: {0}")]
    Read(#[from] csv::Error),
}

impl SourceError {
    /// Whether the condition still allows an (empty) result to be shown.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, SourceError::EmptySource)
    }
}

/// The measurement export held in memory as untyped text cells.
///
/// The table is immutable once loaded and can be shared read-only between
/// requests.
#[derive(Debug, Clone)]
pub struct SourceTable {
    headers: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<StringRecord>,
}

impl SourceTable {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => SourceError::MissingSource(path.to_path_buf()),
            _ => SourceError::Read(err.into()),
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SourceError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()?
            .iter()
            .map(|name| name.trim_start_matches('\u{feff}').trim().to_lowercase())
            .collect();
        if headers.iter().all(|name| name.is_empty()) {
            return Err(SourceError::EmptySource);
        }

        let mut index = HashMap::with_capacity(headers.len());
        for (position, name) in headers.iter().enumerate() {
            index.entry(name.clone()).or_insert(position);
        }

        let missing: Vec<String> = columns::REQUIRED
            .iter()
            .filter(|name| !index.contains_key(**name))
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(SourceError::MissingColumns(missing));
        }

        let rows = rdr.records().collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            headers,
            index,
            rows,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in file order.
    pub fn rows(&self) -> impl Iterator<Item = RawRecord<'_>> + '_ {
        self.rows.iter().map(move |row| RawRecord { table: self, row })
    }

    /// Sorted distinct operator names across the whole table.
    pub fn operators(&self) -> Vec<String> {
        self.rows()
            .filter_map(|row| row.get(columns::OPERATOR))
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Borrowed view over one row, addressed by column name.
#[derive(Debug, Clone, Copy)]
pub struct RawRecord<'a> {
    table: &'a SourceTable,
    row: &'a StringRecord,
}

impl<'a> RawRecord<'a> {
    /// The raw cell, or `None` when the column or the cell itself is absent.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let position = *self.table.index.get(column)?;
        self.row.get(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn headers_are_trimmed_and_lowercased() {
        let table = SourceTable::from_reader(" LAT , Long ,RSSI\n457555,212255,-80\n".as_bytes())
            .unwrap();
        assert_eq!(table.headers(), ["lat", "long", "rssi"]);
        let row = table.rows().next().unwrap();
        assert_eq!(row.get("lat"), Some("457555"));
        assert_eq!(row.get("rssi"), Some("-80"));
        assert_eq!(row.get("tech"), None);
    }

    #[test]
    fn short_rows_leave_cells_absent() {
        let table =
            SourceTable::from_reader("lat,long,tech\n457555,212255\n".as_bytes()).unwrap();
        let row = table.rows().next().unwrap();
        assert_eq!(row.get("long"), Some("212255"));
        assert_eq!(row.get("tech"), None);
    }

    #[test]
    fn missing_required_columns_are_listed() {
        let err = SourceTable::from_reader("latitude,rssi\n1,2\n".as_bytes()).unwrap_err();
        match err {
            SourceError::MissingColumns(missing) => assert_eq!(missing, ["lat", "long"]),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn empty_input_is_reported() {
        let err = SourceTable::from_reader("".as_bytes()).unwrap_err();
        assert!(matches!(err, SourceError::EmptySource));
        assert!(!err.is_fatal());
    }

    #[test]
    fn header_only_table_has_no_rows() {
        let table = SourceTable::from_reader("lat,long\n".as_bytes()).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn operators_are_sorted_and_distinct() {
        let table = SourceTable::from_reader(
            "lat,long,net_op_name\n1,1, Vodafone \n1,1,Orange\n1,1,\n1,1,Vodafone\n".as_bytes(),
        )
        .unwrap();
        assert_eq!(table.operators(), ["Orange", "Vodafone"]);
    }

    #[test]
    fn missing_file_is_reported() {
        let err = SourceTable::from_path("/nonexistent/survey.csv").unwrap_err();
        assert!(matches!(err, SourceError::MissingSource(_)));
        assert!(err.is_fatal());
        assert!(err.to_string().contains("survey.csv"));
    }

    #[test]
    fn loads_from_disk() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"lat,long,rssi\n457555,212255,-80\n457556,212256,-90\n")
            .unwrap();
        let path = temp.into_temp_path();
        let table = SourceTable::from_path(&path).unwrap();
        assert_eq!(table.len(), 2);
    }
}
