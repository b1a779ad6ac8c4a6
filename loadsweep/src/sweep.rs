use crate::budget::{BudgetPlan, PlanError};
use crate::constants;
use crate::data::{RunRecord, RunSummary};
use crate::identity::Identity;
use crate::report::{ReportError, ReportSink};
use crate::runner::Runner;
use crate::seed::{SeedError, SeedSpec, Seeder};
use crate::stats::{aggregate_series, SeriesPoint};
use crate::target::RequestTarget;
use std::num::{NonZeroU32, NonZeroUsize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
#[allow(unused)]
use tracing::{debug, error, info, instrument, trace, warn};

/// Which quantity the swept parameter value controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Axis {
    /// The parameter is the number of simulated clients; every run draws
    /// its identities from one shared dataset, `{prefix}1..{prefix}P`.
    Concurrency { prefix: String },
    /// The client count stays fixed; the parameter selects the dataset
    /// seeded with that fan-out, `{prefix}{P}1..{prefix}{P}C`.
    FanOut {
        prefix: String,
        concurrency: NonZeroU32,
    },
}

impl Axis {
    /// The clients participating in a run at this parameter value, in
    /// deterministic order.
    pub fn identities(&self, param: u32) -> Vec<Identity> {
        match self {
            Axis::Concurrency { prefix } => Identity::sequence(prefix, param),
            Axis::FanOut { prefix, concurrency } => {
                Identity::sequence(&format!("{prefix}{param}"), concurrency.get())
            }
        }
    }
}

/// Everything a sweep needs, fixed before it starts.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Name used in logs and spans.
    pub name: String,
    /// Parameter values, iterated (and reported) in this order.
    pub params: Vec<u32>,
    /// Repeated runs per parameter value.
    pub runs: u32,
    /// Request budget of every single run.
    pub total_requests: u32,
    pub axis: Axis,
    /// Datasets to prepare before the first run.
    pub seeds: Vec<SeedSpec>,
    /// Cap on simultaneous workers; `None` means one worker per identity.
    pub max_workers: Option<NonZeroUsize>,
    /// Per-run deadline; `None` lets every run complete its whole budget.
    pub run_deadline: Option<Duration>,
}

impl SweepConfig {
    /// The reference concurrency experiment: client count swept over
    /// [`constants::CONCURRENCY_LEVELS`], one dataset seeded up front.
    pub fn concurrency(prefix: &str) -> Self {
        Self {
            name: "concurrency".to_string(),
            params: constants::CONCURRENCY_LEVELS.to_vec(),
            runs: constants::DEFAULT_RUNS,
            total_requests: constants::DEFAULT_TOTAL_REQUESTS,
            axis: Axis::Concurrency {
                prefix: prefix.to_string(),
            },
            seeds: vec![SeedSpec::uniform_follows(
                constants::SEED_USERS,
                constants::CONCURRENCY_SEED_POSTS,
                constants::CONCURRENCY_SEED_FOLLOWS,
                prefix,
            )],
            max_workers: None,
            run_deadline: None,
        }
    }

    /// The reference fan-out experiment: follow count swept over
    /// [`constants::FANOUT_LEVELS`] at a fixed client count, one dataset
    /// seeded per level.
    pub fn fan_out(prefix: &str) -> Self {
        let params = constants::FANOUT_LEVELS.to_vec();
        Self {
            name: "fan-out".to_string(),
            seeds: Self::fan_out_seeds(prefix, &params),
            params,
            runs: constants::DEFAULT_RUNS,
            total_requests: constants::DEFAULT_TOTAL_REQUESTS,
            axis: Axis::FanOut {
                prefix: prefix.to_string(),
                concurrency: constants::DEFAULT_FANOUT_CONCURRENCY,
            },
            max_workers: None,
            run_deadline: None,
        }
    }

    /// One dataset per fan-out level, each named `{prefix}{level}`.
    pub fn fan_out_seeds(prefix: &str, params: &[u32]) -> Vec<SeedSpec> {
        params
            .iter()
            .map(|p| {
                SeedSpec::uniform_follows(
                    constants::SEED_USERS,
                    constants::FANOUT_SEED_POSTS,
                    *p,
                    &format!("{prefix}{p}"),
                )
            })
            .collect()
    }

    /// Replaces the swept values, keeping fan-out seed datasets in step.
    pub fn with_params(mut self, params: Vec<u32>) -> Self {
        if let Axis::FanOut { prefix, .. } = &self.axis {
            self.seeds = Self::fan_out_seeds(prefix, &params);
        }
        self.params = params;
        self
    }
}

/// Errors that abort a sweep outright. Everything else in the measurement
/// path degrades into failed samples or degenerate summaries and the sweep
/// carries on.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("dataset preparation failed: {0}")]
    Seed(#[from] SeedError),
    #[error("report sink failed: {0}")]
    Report(#[from] ReportError),
}

/// Everything a finished sweep measured, in iteration order, plus the
/// per-parameter series a chart is drawn from.
#[derive(Debug, Clone)]
pub struct SweepReport {
    pub records: Vec<RunRecord>,
    pub series: Vec<SeriesPoint>,
}

/// Drives a whole experiment: seed once, then for each parameter value run
/// the workload `runs` times back to back, summarizing and recording each
/// run before the next starts. Runs never overlap; overlapping runs on a
/// shared endpoint would contaminate each other's latencies.
pub struct Sweep {
    config: SweepConfig,
    runner: Runner,
}

impl Sweep {
    pub fn new(config: SweepConfig) -> Self {
        let mut runner = Runner::new();
        if let Some(max_workers) = config.max_workers {
            runner = runner.max_workers(max_workers);
        }
        if let Some(deadline) = config.run_deadline {
            runner = runner.deadline(deadline);
        }
        Self { config, runner }
    }

    /// Runs the full experiment. Only seeding and sink I/O abort it;
    /// request failures and degenerate parameter values are recorded and
    /// swept past.
    #[instrument(name = "sweep", skip_all, fields(name = %self.config.name))]
    pub async fn execute<T, S, R>(
        &self,
        target: Arc<T>,
        seeder: &S,
        sink: &mut R,
    ) -> Result<SweepReport, SweepError>
    where
        T: RequestTarget + 'static,
        S: Seeder,
        R: ReportSink,
    {
        info!(
            params = ?self.config.params,
            runs = self.config.runs,
            total_requests = self.config.total_requests,
            "starting sweep"
        );
        if let Some(deadline) = self.config.run_deadline {
            info!("per-run deadline: {}", humantime::format_duration(deadline));
        }

        for spec in &self.config.seeds {
            seeder.seed(spec).await?;
        }

        let mut records =
            Vec::with_capacity(self.config.params.len() * self.config.runs as usize);
        for &param in &self.config.params {
            let identities = self.config.axis.identities(param);
            for run in 1..=self.config.runs {
                let summary = self.single_run(&target, param, run, &identities).await;
                let record = RunRecord { param, run, summary };
                sink.record(&record)?;
                records.push(record);
            }
        }

        let series = aggregate_series(&records);
        sink.summarize(&series)?;

        info!(rows = records.len(), "sweep complete");
        Ok(SweepReport { records, series })
    }

    #[instrument(skip(self, target, identities))]
    async fn single_run<T>(
        &self,
        target: &Arc<T>,
        param: u32,
        run: u32,
        identities: &[Identity],
    ) -> RunSummary
    where
        T: RequestTarget + 'static,
    {
        let plan = match BudgetPlan::distribute(self.config.total_requests, identities) {
            Ok(plan) => plan,
            Err(PlanError::NoIdentities) => {
                warn!("no identities at this parameter value; recording a degenerate run");
                return RunSummary::degenerate();
            }
        };

        let samples = self.runner.run(Arc::clone(target), &plan).await;
        let summary = RunSummary::from_samples(&samples);
        info!(
            mean_ms = summary.mean_ms,
            failed = summary.failed,
            samples = summary.samples,
            "run complete"
        );
        summary
    }
}
