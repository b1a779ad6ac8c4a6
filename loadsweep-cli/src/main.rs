use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use loadsweep::constants;
use loadsweep::prelude::*;
use std::num::{NonZeroU32, NonZeroUsize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "loadsweep", version, about = "Benchmark sweeps against a timeline endpoint")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sweep the number of concurrent simulated clients.
    Concurrency(SweepArgs),
    /// Sweep dataset fan-out at a fixed client count.
    FanOut(FanOutArgs),
}

#[derive(Args, Debug)]
struct SweepArgs {
    /// Timeline endpoint to benchmark, e.g. http://localhost:3000/api/timeline.
    #[arg(long)]
    base_url: Url,

    /// Dataset prefix identities are derived from.
    #[arg(long)]
    prefix: Option<String>,

    /// Parameter values to sweep, comma separated.
    #[arg(long, value_delimiter = ',')]
    params: Option<Vec<u32>>,

    /// Repeated runs per parameter value.
    #[arg(long)]
    runs: Option<u32>,

    /// Request budget of every single run.
    #[arg(long)]
    total_requests: Option<u32>,

    /// Value of the limit query parameter.
    #[arg(long)]
    limit: Option<u32>,

    /// Per-request timeout, e.g. 10s or 500ms.
    #[arg(long)]
    timeout: Option<humantime::Duration>,

    /// Where the per-run CSV lands.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Program to seed the datasets with; skipped when absent.
    #[arg(long)]
    seed_cmd: Option<String>,

    /// Extra argument for the seed program, repeatable (e.g. a script path).
    #[arg(long = "seed-arg")]
    seed_args: Vec<String>,

    /// Cap on simultaneously running workers.
    #[arg(long)]
    max_workers: Option<NonZeroUsize>,

    /// Per-run deadline, e.g. 2m; unbounded when absent.
    #[arg(long)]
    run_deadline: Option<humantime::Duration>,
}

#[derive(Args, Debug)]
struct FanOutArgs {
    #[command(flatten)]
    common: SweepArgs,

    /// Simulated clients participating in every run.
    #[arg(long)]
    concurrency: Option<NonZeroU32>,
}

enum CliSeeder {
    Command(CommandSeeder),
    Noop(NoopSeeder),
}

impl Seeder for CliSeeder {
    async fn seed(&self, spec: &SeedSpec) -> Result<(), SeedError> {
        match self {
            CliSeeder::Command(seeder) => seeder.seed(spec).await,
            CliSeeder::Noop(seeder) => seeder.seed(spec).await,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("loadsweep=info,loadsweep_cli=info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Concurrency(args) => {
            let prefix = args
                .prefix
                .clone()
                .unwrap_or_else(|| constants::CONCURRENCY_PREFIX.to_string());
            let config = apply_common(SweepConfig::concurrency(&prefix), &args);
            let output = args.output.clone().unwrap_or_else(|| "conc.csv".into());
            run_sweep(config, args, output).await
        }
        Command::FanOut(args) => {
            let prefix = args
                .common
                .prefix
                .clone()
                .unwrap_or_else(|| constants::FANOUT_PREFIX.to_string());
            let mut config = apply_common(SweepConfig::fan_out(&prefix), &args.common);
            if let Some(concurrency) = args.concurrency {
                if let Axis::FanOut { concurrency: c, .. } = &mut config.axis {
                    *c = concurrency;
                }
            }
            let output = args
                .common
                .output
                .clone()
                .unwrap_or_else(|| "fanout.csv".into());
            run_sweep(config, args.common, output).await
        }
    }
}

fn apply_common(mut config: SweepConfig, args: &SweepArgs) -> SweepConfig {
    if let Some(params) = &args.params {
        config = config.with_params(params.clone());
    }
    if let Some(runs) = args.runs {
        config.runs = runs;
    }
    if let Some(total) = args.total_requests {
        config.total_requests = total;
    }
    config.max_workers = args.max_workers;
    config.run_deadline = args.run_deadline.map(|d| *d);
    config
}

async fn run_sweep(config: SweepConfig, args: SweepArgs, output: PathBuf) -> anyhow::Result<()> {
    let mut target_config = TargetConfig::new(args.base_url);
    if let Some(limit) = args.limit {
        target_config.result_limit = limit;
    }
    if let Some(timeout) = args.timeout {
        target_config.request_timeout = *timeout;
    }
    let target = Arc::new(TimelineTarget::new(target_config)?);

    let seeder = match args.seed_cmd {
        Some(program) => {
            let mut seeder = CommandSeeder::new(program);
            for arg in args.seed_args {
                seeder = seeder.arg(arg);
            }
            CliSeeder::Command(seeder)
        }
        None => {
            info!("no seed command supplied; assuming datasets already exist");
            CliSeeder::Noop(NoopSeeder)
        }
    };

    let mut sink = CsvSink::create(&output)
        .with_context(|| format!("creating report file {}", output.display()))?;

    let report = Sweep::new(config).execute(target, &seeder, &mut sink).await?;

    println!("{:<8} {:>12} {:>12} {:>6}", "PARAM", "MEAN_MS", "STD_MS", "RUNS");
    for point in &report.series {
        println!(
            "{:<8} {:>12.3} {:>12.3} {:>6}",
            point.param, point.mean_ms, point.std_dev_ms, point.runs
        );
    }
    info!("per-run rows written to {}", output.display());

    Ok(())
}
