use crate::data::RunRecord;
use crate::stats::SeriesPoint;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report output: {0}")]
    Io(#[from] io::Error),
}

/// Where completed runs land.
///
/// `record` is called once per run in sweep iteration order, as soon as the
/// run completes; every row is self-contained. `summarize` is called once
/// at the end with the per-parameter series, ascending by parameter, which
/// is where a chart-producing sink would draw its bars and error whiskers.
pub trait ReportSink {
    fn record(&mut self, record: &RunRecord) -> Result<(), ReportError>;

    fn summarize(&mut self, _series: &[SeriesPoint]) -> Result<(), ReportError> {
        Ok(())
    }
}

/// Tabular text output: a `PARAM,AVG_TIME,RUN,FAILED` header, then one row
/// per run with the mean in milliseconds to three decimals and the failure
/// flag as 0/1. A degenerate run's mean is written as `nan`. Rows are
/// flushed as they are written, so an interrupted sweep keeps every
/// observation it completed.
pub struct CsvSink<W: Write> {
    out: W,
}

impl<W: Write> CsvSink<W> {
    pub fn new(mut out: W) -> Result<Self, ReportError> {
        writeln!(out, "PARAM,AVG_TIME,RUN,FAILED")?;
        out.flush()?;
        Ok(Self { out })
    }
}

impl CsvSink<BufWriter<File>> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, ReportError> {
        Self::new(BufWriter::new(File::create(path)?))
    }
}

impl<W: Write> ReportSink for CsvSink<W> {
    fn record(&mut self, record: &RunRecord) -> Result<(), ReportError> {
        let mean = if record.summary.mean_ms.is_nan() {
            // {:.3} renders NaN; rows spell it lowercase.
            "nan".to_string()
        } else {
            format!("{:.3}", record.summary.mean_ms)
        };
        writeln!(
            self.out,
            "{},{},{},{}",
            record.param,
            mean,
            record.run,
            record.summary.failed as u8
        )?;
        self.out.flush()?;
        Ok(())
    }
}

/// Captures everything in memory; the sink tests assert against.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub records: Vec<RunRecord>,
    pub series: Vec<SeriesPoint>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReportSink for MemorySink {
    fn record(&mut self, record: &RunRecord) -> Result<(), ReportError> {
        self.records.push(*record);
        Ok(())
    }

    fn summarize(&mut self, series: &[SeriesPoint]) -> Result<(), ReportError> {
        self.series = series.to_vec();
        Ok(())
    }
}
