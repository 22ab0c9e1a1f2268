//! Reading daily files back as continuous numeric series.
//!
//! Each daily file is read against its own header, so a field can be present on
//! some days and absent on others. Missing values are forward-filled across the
//! whole stitched output, seeded with `0`.

mod stitch;
mod table;

pub use stitch::{
    FieldRequest, ForwardFill, SeriesStitcher, SpanOutcome, Stitched, StitchedSeries, stitch,
};
pub use table::{Cell, DailyTable};
