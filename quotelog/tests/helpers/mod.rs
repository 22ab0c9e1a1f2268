// Shared fixtures for the poller tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use quotelog::{QuoteSource, QuotelogError, Snapshot};
use tokio::time::Instant;

/// Construct a UTC `DateTime` from components for readability in tests.
pub fn dt(y: i32, m: u32, d: u32, hh: u32, mm: u32, ss: u32) -> chrono::DateTime<chrono::Utc> {
    let date = chrono::NaiveDate::from_ymd_opt(y, m, d).expect("invalid date");
    let naive = date
        .and_hms_opt(hh, mm, ss)
        .expect("invalid time components");
    chrono::DateTime::<chrono::Utc>::from_naive_utc_and_offset(naive, chrono::Utc)
}

/// A weekday afternoon inside the default window.
pub fn open_time() -> chrono::DateTime<chrono::Utc> {
    dt(2024, 10, 8, 14, 30, 0)
}

/// Early morning UTC, outside the default window.
pub fn closed_time() -> chrono::DateTime<chrono::Utc> {
    dt(2024, 10, 8, 3, 0, 0)
}

/// Source that answers immediately and records when each call started.
#[derive(Clone, Default)]
pub struct TimedSource {
    pub calls: Arc<Mutex<Vec<(String, Instant)>>>,
}

impl TimedSource {
    pub fn starts(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }

    pub fn instruments(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(s, _)| s.clone()).collect()
    }
}

#[async_trait]
impl QuoteSource for TimedSource {
    fn name(&self) -> &'static str {
        "timed"
    }

    async fn snapshot(&self, instrument: &str) -> Result<Snapshot, QuotelogError> {
        self.calls
            .lock()
            .unwrap()
            .push((instrument.to_string(), Instant::now()));
        Ok(Snapshot::new()
            .with("symbol", instrument)
            .with("currentPrice", 100.0))
    }
}
