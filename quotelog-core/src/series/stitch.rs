use std::path::{Path, PathBuf};

use quotelog_types::{NA, QuotelogError, TIMESTAMP_FIELD};

use super::table::{Cell, DailyTable};

/// How one input file contributed to a stitched series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanOutcome {
    /// The requested field was in the header.
    Present {
        /// Values contributed.
        rows: usize,
    },
    /// Only the alternative field was in the header.
    UsedFallback {
        /// The alternative field name.
        field: String,
        /// Values contributed.
        rows: usize,
    },
    /// Neither field was in the header; nothing was contributed.
    Missing,
    /// The file does not exist; skipped.
    FileNotFound {
        /// Path that was looked up.
        path: PathBuf,
    },
}

impl SpanOutcome {
    /// Whether the file contributed a column, via either field name.
    #[must_use]
    pub const fn contributed(&self) -> bool {
        matches!(self, Self::Present { .. } | Self::UsedFallback { .. })
    }
}

/// A stitched column together with the per-file outcomes that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Stitched {
    /// Concatenated, forward-filled values; `[0]` when no file had the field.
    pub values: Vec<f64>,
    /// One entry per input file, in input order.
    pub spans: Vec<SpanOutcome>,
}

impl Stitched {
    /// True when no input file carried the field or its alternative.
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        !self.spans.iter().any(SpanOutcome::contributed)
    }
}

/// Last-observation-carried-forward over a stream of cells, seeded with `0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForwardFill {
    last: f64,
}

impl ForwardFill {
    /// Start a fill with no previous value.
    #[must_use]
    pub const fn new() -> Self {
        Self { last: 0.0 }
    }

    /// Resolve `cell` against the previous output.
    pub const fn fill(&mut self, cell: Cell) -> f64 {
        if let Cell::Present(v) = cell {
            self.last = v;
        }
        self.last
    }
}

/// One column to extract: a field name and an optional fallback name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRequest {
    /// Preferred column name.
    pub field: String,
    /// Column used for files whose header lacks `field`.
    pub alt: Option<String>,
}

impl FieldRequest {
    /// Request `field` with no fallback.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            alt: None,
        }
    }

    /// Request `field`, falling back to `alt`.
    pub fn with_alt(field: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            alt: Some(alt.into()),
        }
    }

    /// Parse `field` or `field:alt`.
    ///
    /// # Errors
    /// Returns `InvalidArg` when either name is empty.
    pub fn parse(spec: &str) -> Result<Self, QuotelogError> {
        let (field, alt) = match spec.split_once(':') {
            Some((f, a)) => (f.trim(), Some(a.trim())),
            None => (spec.trim(), None),
        };
        if field.is_empty() || alt.is_some_and(str::is_empty) {
            return Err(QuotelogError::InvalidArg(format!(
                "bad field request {spec:?}, expected field or field:alt"
            )));
        }
        Ok(Self {
            field: field.to_string(),
            alt: alt.map(str::to_string),
        })
    }
}

#[derive(Debug, Clone)]
enum Input {
    Table(DailyTable),
    NotFound(PathBuf),
}

/// Builds continuous numeric series from a date-ordered list of daily files.
///
/// Files are loaded once on [`open`](Self::open); any number of fields can then be
/// stitched from them. Schema drift between days is absorbed per file: a file that
/// lacks the field can supply an alternative column instead.
#[derive(Debug, Clone, Default)]
pub struct SeriesStitcher {
    inputs: Vec<Input>,
}

impl SeriesStitcher {
    /// Load `files` in the given order. Files that do not exist are kept as
    /// [`SpanOutcome::FileNotFound`] placeholders.
    ///
    /// # Errors
    /// Returns `Io` or `Csv` when an existing file cannot be read.
    pub fn open<I, P>(files: I) -> Result<Self, QuotelogError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut inputs = Vec::new();
        for path in files {
            let path = path.as_ref();
            match DailyTable::load(path)? {
                Some(t) => inputs.push(Input::Table(t)),
                None => inputs.push(Input::NotFound(path.to_path_buf())),
            }
        }
        Ok(Self { inputs })
    }

    /// Stitch over tables that are already in memory.
    pub fn from_tables(tables: impl IntoIterator<Item = DailyTable>) -> Self {
        Self {
            inputs: tables.into_iter().map(Input::Table).collect(),
        }
    }

    /// Loaded tables in input order; missing files are skipped.
    pub fn tables(&self) -> impl Iterator<Item = &DailyTable> {
        self.inputs.iter().filter_map(|i| match i {
            Input::Table(t) => Some(t),
            Input::NotFound(_) => None,
        })
    }

    /// Stitched values of `field`, falling back to `alt` per file.
    #[must_use]
    pub fn stitch(&self, field: &str, alt: Option<&str>) -> Vec<f64> {
        self.stitch_detailed(field, alt).values
    }

    /// Like [`stitch`](Self::stitch), also reporting what each file contributed.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "quotelog::series::stitch",
            skip(self),
            fields(files = self.inputs.len()),
        )
    )]
    #[must_use]
    pub fn stitch_detailed(&self, field: &str, alt: Option<&str>) -> Stitched {
        let mut fill = ForwardFill::new();
        let mut values = Vec::new();
        let mut spans = Vec::with_capacity(self.inputs.len());

        for input in &self.inputs {
            let table = match input {
                Input::Table(t) => t,
                Input::NotFound(path) => {
                    spans.push(SpanOutcome::FileNotFound { path: path.clone() });
                    continue;
                }
            };
            let before = values.len();
            if let Some(col) = table.column(field) {
                values.extend(col.map(|c| fill.fill(c)));
                spans.push(SpanOutcome::Present {
                    rows: values.len() - before,
                });
            } else if let Some((alt, col)) = alt.and_then(|a| table.column(a).map(|c| (a, c))) {
                values.extend(col.map(|c| fill.fill(c)));
                spans.push(SpanOutcome::UsedFallback {
                    field: alt.to_string(),
                    rows: values.len() - before,
                });
            } else {
                spans.push(SpanOutcome::Missing);
            }
        }

        let stitched = Stitched { values, spans };
        if stitched.is_sentinel() {
            #[cfg(feature = "tracing")]
            tracing::debug!(field, ?alt, "field absent from every file; returning [0]");
            return Stitched {
                values: vec![0.0],
                spans: stitched.spans,
            };
        }
        stitched
    }

    /// Stitch `timestamp` plus every requested field for one instrument.
    ///
    /// Columns are aligned row for row with the input files: rows of a file that
    /// carries neither a field nor its alternative hold `None` for that field, and a
    /// field absent from every file is `None` throughout.
    #[must_use]
    pub fn series(&self, instrument: &str, requests: &[FieldRequest]) -> StitchedSeries {
        let timestamps = self.aligned(&self.stitch_detailed(TIMESTAMP_FIELD, None));
        let columns = requests
            .iter()
            .filter(|r| r.field != TIMESTAMP_FIELD)
            .map(|r| {
                let stitched = self.stitch_detailed(&r.field, r.alt.as_deref());
                (r.field.clone(), self.aligned(&stitched))
            })
            .collect();
        StitchedSeries {
            instrument: instrument.to_string(),
            timestamps,
            columns,
        }
    }

    /// Spread stitched values over every loaded row, `None` where a file gave nothing.
    fn aligned(&self, stitched: &Stitched) -> Vec<Option<f64>> {
        let total: usize = self.tables().map(DailyTable::len).sum();
        if stitched.is_sentinel() {
            return vec![None; total];
        }
        let mut values = stitched.values.iter().copied();
        let mut out = Vec::with_capacity(total);
        for (input, span) in self.inputs.iter().zip(&stitched.spans) {
            let Input::Table(table) = input else { continue };
            match span {
                SpanOutcome::Present { rows } | SpanOutcome::UsedFallback { rows, .. } => {
                    out.extend(values.by_ref().take(*rows).map(Some));
                }
                SpanOutcome::Missing | SpanOutcome::FileNotFound { .. } => {
                    out.extend(std::iter::repeat_n(None, table.len()));
                }
            }
        }
        out
    }
}

/// Stitch one field across `files` in the given order.
///
/// # Errors
/// Returns `Io` or `Csv` when an existing file cannot be read.
pub fn stitch<I, P>(files: I, field: &str, alt: Option<&str>) -> Result<Vec<f64>, QuotelogError>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    Ok(SeriesStitcher::open(files)?.stitch(field, alt))
}

/// Timestamps and requested columns for one instrument, aligned row for row.
///
/// `None` marks rows whose file did not carry the field.
#[derive(Debug, Clone, PartialEq)]
pub struct StitchedSeries {
    instrument: String,
    timestamps: Vec<Option<f64>>,
    columns: Vec<(String, Vec<Option<f64>>)>,
}

impl StitchedSeries {
    /// Instrument the series belongs to.
    #[must_use]
    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    /// Number of rows across all loaded files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Whether no rows were loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Stitched `timestamp` column.
    #[must_use]
    pub fn timestamps(&self) -> &[Option<f64>] {
        &self.timestamps
    }

    /// Stitched values for a requested field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// Requested field names in request order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    /// Write `timestamp` and every field as CSV columns, `NA` where a row has no value.
    ///
    /// # Errors
    /// Returns `Io` or `Csv` when the file cannot be written.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<(), QuotelogError> {
        let path = path.as_ref();
        let mut writer = csv::Writer::from_path(path).map_err(|e| QuotelogError::csv(path, e))?;

        let mut header = vec![TIMESTAMP_FIELD];
        header.extend(self.field_names());
        writer
            .write_record(&header)
            .map_err(|e| QuotelogError::csv(path, e))?;

        let columns: Vec<&[Option<f64>]> = std::iter::once(self.timestamps.as_slice())
            .chain(self.columns.iter().map(|(_, v)| v.as_slice()))
            .collect();
        for i in 0..self.len() {
            let record = columns.iter().map(|c| {
                c.get(i)
                    .copied()
                    .flatten()
                    .map_or_else(|| NA.to_string(), |v| v.to_string())
            });
            writer
                .write_record(record)
                .map_err(|e| QuotelogError::csv(path, e))?;
        }
        writer.flush().map_err(|e| QuotelogError::io(path, e))
    }
}
