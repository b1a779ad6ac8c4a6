use crate::data::RunRecord;
use std::collections::BTreeMap;
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

/// Cross-run statistics for one parameter value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub param: u32,
    /// Mean of the contributing run means, in milliseconds.
    pub mean_ms: f64,
    /// Population standard deviation of the contributing run means. Zero
    /// when a single run contributed.
    pub std_dev_ms: f64,
    /// Runs that contributed; degenerate runs are left out.
    pub runs: usize,
}

/// Groups run records by parameter value and reduces each group to a mean
/// and a population standard deviation, ascending by parameter.
///
/// Degenerate runs (NaN mean) are excluded from a parameter's statistics so
/// one empty run cannot poison the whole series. A parameter with nothing
/// but degenerate runs keeps its place in the output with a NaN mean.
pub fn aggregate_series(records: &[RunRecord]) -> Vec<SeriesPoint> {
    let mut by_param: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for record in records {
        by_param
            .entry(record.param)
            .or_default()
            .push(record.summary.mean_ms);
    }

    by_param
        .into_iter()
        .map(|(param, means)| {
            let finite: Vec<f64> = means.iter().copied().filter(|m| !m.is_nan()).collect();
            let dropped = means.len() - finite.len();
            if dropped > 0 {
                warn!(param, dropped, "excluding degenerate runs from series statistics");
            }

            if finite.is_empty() {
                return SeriesPoint {
                    param,
                    mean_ms: f64::NAN,
                    std_dev_ms: 0.,
                    runs: 0,
                };
            }

            let mean_ms = statistical::mean(&finite);
            let std_dev_ms = if finite.len() > 1 {
                statistical::population_standard_deviation(&finite, Some(mean_ms))
            } else {
                0.
            };

            SeriesPoint {
                param,
                mean_ms,
                std_dev_ms,
                runs: finite.len(),
            }
        })
        .collect()
}
