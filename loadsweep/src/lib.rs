#![doc = include_str!("../README.md")]

pub mod budget;
pub mod constants;
pub mod data;
pub mod identity;
pub mod report;
pub mod runner;
pub mod seed;
pub mod stats;
pub mod sweep;
pub mod target;

pub use budget::BudgetPlan;
pub use identity::Identity;
pub use runner::Runner;
pub use sweep::{Axis, Sweep, SweepConfig, SweepReport};

pub mod prelude {
    //! One-stop import for driving a sweep.
    pub use crate::budget::{Assignment, BudgetPlan, PlanError};
    pub use crate::data::{RunRecord, RunSummary, Sample};
    pub use crate::identity::Identity;
    pub use crate::report::{CsvSink, MemorySink, ReportError, ReportSink};
    pub use crate::runner::Runner;
    pub use crate::seed::{CommandSeeder, NoopSeeder, SeedError, SeedSpec, Seeder};
    pub use crate::stats::{aggregate_series, SeriesPoint};
    pub use crate::sweep::{Axis, Sweep, SweepConfig, SweepError, SweepReport};
    pub use crate::target::{RequestTarget, TargetConfig, TargetError, TimelineTarget, Url};
}
