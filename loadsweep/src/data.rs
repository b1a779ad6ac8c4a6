use std::time::Duration;

/// One request's outcome: wall-clock latency and whether it failed.
///
/// Failed requests keep their latency. A timed-out request is recorded at
/// roughly the timeout itself rather than being discarded, so degraded
/// endpoints still produce meaningful numbers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub elapsed: Duration,
    pub failed: bool,
}

impl Sample {
    pub fn ok(elapsed: Duration) -> Self {
        Self { elapsed, failed: false }
    }

    pub fn failed(elapsed: Duration) -> Self {
        Self { elapsed, failed: true }
    }

    /// Latency in fractional milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1_000.
    }
}

/// One run reduced to a scalar summary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// Mean latency in milliseconds over every sample of the run, failures
    /// included. NaN when the run produced no samples at all.
    pub mean_ms: f64,
    /// True if any sample failed. Forced true for an empty run so a
    /// degenerate configuration is never mistaken for a clean one.
    pub failed: bool,
    /// Number of samples behind the mean.
    pub samples: usize,
}

impl RunSummary {
    pub fn from_samples(samples: &[Sample]) -> Self {
        if samples.is_empty() {
            return Self {
                mean_ms: f64::NAN,
                failed: true,
                samples: 0,
            };
        }

        let sum: f64 = samples.iter().map(Sample::elapsed_ms).sum();
        Self {
            mean_ms: sum / samples.len() as f64,
            failed: samples.iter().any(|s| s.failed),
            samples: samples.len(),
        }
    }

    /// The summary of a run that never issued a request, e.g. a zero budget
    /// or a parameter value with no eligible identities.
    pub fn degenerate() -> Self {
        Self::from_samples(&[])
    }

    pub fn is_degenerate(&self) -> bool {
        self.samples == 0
    }
}

/// One completed run in sweep order; the unit a report row is made of.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunRecord {
    /// Swept parameter value this run was measured at.
    pub param: u32,
    /// 1-based repetition index within the parameter value.
    pub run: u32,
    pub summary: RunSummary,
}
