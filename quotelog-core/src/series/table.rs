use std::io;
use std::path::{Path, PathBuf};

use quotelog_types::{NA, QuotelogError};

/// One value of a daily file column as seen by the stitcher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    /// A parseable, finite number.
    Present(f64),
    /// `NA`, empty, absent (short row) or non-numeric text.
    Missing,
}

impl Cell {
    /// Classify a raw CSV cell.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw == NA {
            return Self::Missing;
        }
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Self::Present(v),
            _ => Self::Missing,
        }
    }
}

/// A daily file loaded for reading: its header and every data row.
///
/// Rows may be shorter than the header (a torn final line); absent trailing cells
/// read as [`Cell::Missing`].
#[derive(Debug, Clone)]
pub struct DailyTable {
    path: PathBuf,
    header: Vec<String>,
    rows: Vec<csv::StringRecord>,
}

impl DailyTable {
    /// Load a daily file. Returns `Ok(None)` when the file does not exist.
    ///
    /// # Errors
    /// Returns `Io` when the file exists but cannot be opened and `Csv` when its
    /// content cannot be decoded.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "quotelog::series::load", skip_all, fields(path = %path.as_ref().display()))
    )]
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>, QuotelogError> {
        let path = path.as_ref();
        let file = match std::fs::File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(QuotelogError::io(path, e)),
        };
        Self::from_reader(path, file).map(Some)
    }

    /// Parse CSV content from any reader; `path` is only used to label errors.
    ///
    /// # Errors
    /// Returns `Csv` when the content cannot be decoded.
    pub fn from_reader<R: io::Read>(
        path: impl Into<PathBuf>,
        reader: R,
    ) -> Result<Self, QuotelogError> {
        let path = path.into();
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);
        let header = rdr
            .headers()
            .map_err(|e| QuotelogError::csv(&path, e))?
            .iter()
            .map(str::to_string)
            .collect();
        let rows = rdr
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| QuotelogError::csv(&path, e))?;
        Ok(Self { path, header, rows })
    }

    /// Where the table was read from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Column names in file order.
    #[must_use]
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the file has a header but no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether `field` is a column of this table.
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.column_index(field).is_some()
    }

    fn column_index(&self, field: &str) -> Option<usize> {
        self.header.iter().position(|h| h == field)
    }

    /// Cells of `field` in row order, or `None` if the column does not exist.
    pub fn column(&self, field: &str) -> Option<impl Iterator<Item = Cell> + '_> {
        let idx = self.column_index(field)?;
        Some(
            self.rows
                .iter()
                .map(move |r| r.get(idx).map_or(Cell::Missing, Cell::parse)),
        )
    }

    /// Raw text at `(row, field)`.
    #[must_use]
    pub fn raw(&self, row: usize, field: &str) -> Option<&str> {
        let idx = self.column_index(field)?;
        self.rows.get(row)?.get(idx)
    }
}
