//! Append-only daily CSV files, one per instrument and UTC day.
//!
//! A file's header is the field set of the first snapshot written to it and never
//! changes afterwards. Later snapshots are written against that header: missing
//! values become [`NA`], and fields the header does not know are dropped.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use quotelog_types::{FieldValue, NA, QuotelogError, Snapshot};

const DAY_FORMAT: &str = "%Y%m%d";
const EXTENSION: &str = ".csv";

/// A daily file found on disk.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DailyFile {
    /// UTC calendar day covered by the file.
    pub day: NaiveDate,
    /// Instrument identifier.
    pub instrument: String,
    /// Location of the file.
    pub path: PathBuf,
}

/// Writer for the per-instrument, per-day snapshot files under one directory.
///
/// The store assumes it is the only writer. Each instrument's header is cached for
/// the day last written, so the cache holds at most one entry per instrument; data
/// rows are never read back or rewritten.
#[derive(Debug)]
pub struct SnapshotStore {
    dir: PathBuf,
    headers: HashMap<String, (NaiveDate, Vec<String>)>,
}

impl SnapshotStore {
    /// Store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            headers: HashMap::new(),
        }
    }

    /// Root directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file for `(instrument, day)`: `<dir>/<instrument><YYYYMMDD>.csv`.
    #[must_use]
    pub fn daily_path(&self, instrument: &str, day: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("{instrument}{}{EXTENSION}", day.format(DAY_FORMAT)))
    }

    /// Stamp `snapshot` with `now` and append it to the file for `now`'s UTC day.
    ///
    /// # Errors
    /// See [`append`](Self::append).
    pub fn record(
        &mut self,
        instrument: &str,
        now: DateTime<Utc>,
        mut snapshot: Snapshot,
    ) -> Result<PathBuf, QuotelogError> {
        #[allow(clippy::cast_precision_loss)]
        let epoch_seconds = now.timestamp_millis() as f64 / 1000.0;
        snapshot.stamp(epoch_seconds);
        self.append(instrument, now.date_naive(), &snapshot)
    }

    /// Append one snapshot to the daily file for `(instrument, day)`.
    ///
    /// Creates the file with a header equal to the snapshot's field names if it does
    /// not exist yet; otherwise writes against the existing header.
    ///
    /// # Errors
    /// Returns `InvalidArg` for an empty instrument or an empty snapshot, and `Io` or
    /// `Csv` if the file cannot be read or written.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "quotelog::store::append",
            skip(self, snapshot),
            fields(instrument = instrument, day = %day, fields = snapshot.len()),
        )
    )]
    pub fn append(
        &mut self,
        instrument: &str,
        day: NaiveDate,
        snapshot: &Snapshot,
    ) -> Result<PathBuf, QuotelogError> {
        if instrument.trim().is_empty() {
            return Err(QuotelogError::InvalidArg("empty instrument id".into()));
        }
        if snapshot.is_empty() {
            return Err(QuotelogError::InvalidArg(format!(
                "empty snapshot for {instrument}"
            )));
        }
        let path = self.daily_path(instrument, day);
        fs::create_dir_all(&self.dir).map_err(|e| QuotelogError::io(&self.dir, e))?;

        let (header, fresh) = match self.existing_header(instrument, day, &path)? {
            Some(h) => (h, false),
            None => (
                snapshot.field_names().map(str::to_string).collect::<Vec<_>>(),
                true,
            ),
        };

        #[cfg(feature = "tracing")]
        {
            let dropped: Vec<&str> = snapshot
                .field_names()
                .filter(|f| !header.iter().any(|h| h == f))
                .collect();
            if !dropped.is_empty() {
                tracing::debug!(path = %path.display(), ?dropped, "fields not in header dropped");
            }
        }

        let row: Vec<String> = header
            .iter()
            .map(|h| {
                snapshot
                    .get(h)
                    .and_then(FieldValue::to_cell)
                    .unwrap_or_else(|| NA.to_string())
            })
            .collect();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| QuotelogError::io(&path, e))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if fresh {
            writer
                .write_record(&header)
                .map_err(|e| QuotelogError::csv(&path, e))?;
        }
        writer
            .write_record(&row)
            .map_err(|e| QuotelogError::csv(&path, e))?;
        writer.flush().map_err(|e| QuotelogError::io(&path, e))?;

        self.headers.insert(instrument.to_string(), (day, header));
        Ok(path)
    }

    /// Header of an existing, non-empty file; `None` when the file must be created.
    fn existing_header(
        &mut self,
        instrument: &str,
        day: NaiveDate,
        path: &Path,
    ) -> Result<Option<Vec<String>>, QuotelogError> {
        let len = match fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => 0,
            Err(e) => return Err(QuotelogError::io(path, e)),
        };
        if len == 0 {
            self.headers.remove(instrument);
            return Ok(None);
        }
        if let Some((cached_day, h)) = self.headers.get(instrument) {
            if *cached_day == day {
                return Ok(Some(h.clone()));
            }
        }
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .map_err(|e| QuotelogError::csv(path, e))?;
        let mut first = csv::StringRecord::new();
        let found = reader
            .read_record(&mut first)
            .map_err(|e| QuotelogError::csv(path, e))?;
        if !found {
            return Ok(None);
        }
        Ok(Some(first.iter().map(str::to_string).collect()))
    }

    /// All daily files for `instrument`, oldest first.
    ///
    /// Names that do not parse as `<instrument><YYYYMMDD>.csv` are ignored; a missing
    /// directory yields an empty list.
    ///
    /// # Errors
    /// Returns `Io` if the directory exists but cannot be listed.
    pub fn daily_files(&self, instrument: &str) -> Result<Vec<DailyFile>, QuotelogError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(QuotelogError::io(&self.dir, e)),
        };
        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| QuotelogError::io(&self.dir, e))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(day) = parse_daily_name(name, instrument) {
                files.push(DailyFile {
                    day,
                    instrument: instrument.to_string(),
                    path: entry.path(),
                });
            }
        }
        files.sort();
        Ok(files)
    }

    /// Daily files for `instrument` with `from <= day <= to`, oldest first.
    ///
    /// # Errors
    /// Returns `Io` if the directory exists but cannot be listed.
    pub fn daily_files_between(
        &self,
        instrument: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyFile>, QuotelogError> {
        Ok(self
            .daily_files(instrument)?
            .into_iter()
            .filter(|f| from <= f.day && f.day <= to)
            .collect())
    }
}

fn parse_daily_name(name: &str, instrument: &str) -> Option<NaiveDate> {
    let digits = name.strip_prefix(instrument)?.strip_suffix(EXTENSION)?;
    if digits.len() != 8 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(digits, DAY_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 10, d).unwrap()
    }

    #[test]
    fn path_is_instrument_then_compact_date() {
        let store = SnapshotStore::new("/data");
        assert_eq!(
            store.daily_path("AAPL", day(8)),
            PathBuf::from("/data/AAPL20241008.csv")
        );
    }

    #[test]
    fn daily_name_parsing_is_strict() {
        assert_eq!(parse_daily_name("KO20241008.csv", "KO"), Some(day(8)));
        assert_eq!(parse_daily_name("KOF20241008.csv", "KO"), None);
        assert_eq!(parse_daily_name("KO120241008.csv", "KO"), None);
        assert_eq!(parse_daily_name("KO20241399.csv", "KO"), None);
        assert_eq!(parse_daily_name("KO20241008.png", "KO"), None);
    }

    #[test]
    fn header_cache_keeps_one_day_per_instrument() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SnapshotStore::new(dir.path());
        let start = day(1);
        for offset in 0..40 {
            let d = start + chrono::Days::new(offset);
            for id in ["KO", "AAPL"] {
                let snap = Snapshot::new().with("symbol", id).with("bid", 1.0);
                store.append(id, d, &snap).unwrap();
            }
        }
        assert_eq!(store.headers.len(), 2);
        let last = start + chrono::Days::new(39);
        assert_eq!(store.headers.get("KO").map(|(d, _)| *d), Some(last));
    }

    #[test]
    fn header_survives_switching_back_to_an_earlier_day() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SnapshotStore::new(dir.path());
        let first = Snapshot::new().with("symbol", "KO").with("bid", 1.0);
        store.append("KO", day(8), &first).unwrap();
        let other = Snapshot::new().with("symbol", "KO").with("ask", 2.0);
        store.append("KO", day(9), &other).unwrap();
        let path = store
            .append("KO", day(8), &Snapshot::new().with("symbol", "KO").with("ask", 3.0))
            .unwrap();
        assert_eq!(
            fs::read_to_string(path).unwrap(),
            "symbol,bid\nKO,1\nKO,NA\n"
        );
    }

    #[test]
    fn rejects_empty_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SnapshotStore::new(dir.path());
        let snap = Snapshot::new().with("symbol", "KO");
        assert!(store.append("", day(8), &snap).is_err());
        assert!(store.append("KO", day(8), &Snapshot::new()).is_err());
    }
}
