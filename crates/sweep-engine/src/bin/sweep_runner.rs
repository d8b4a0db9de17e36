use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use sweep_engine::{
    render_table, runtime_chart, score_charts, EdgeCountParams, EdgeCountSweep, ExperimentSet,
    GapPolicy, SampleCountParams, SampleCountSweep, SweepKind, SyntheticRunner, TrialRunner,
};
use sweep_store::{RecordFormat, RecordStore, StoreConfig};
use sweep_types::SweepValue;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sweep-runner", about = "Trust model parameter sweep runner")]
struct Cli {
    /// Save folder; overrides TRUSTSWEEP_SAVE_DIR.
    #[arg(long, global = true)]
    save_dir: Option<PathBuf>,
    /// Record format (yaml or json); overrides TRUSTSWEEP_FORMAT.
    #[arg(long, global = true)]
    format: Option<RecordFormat>,
    /// Seed for the synthetic trial runner.
    #[arg(long, env = "TRUSTSWEEP_SEED", default_value_t = 0, global = true)]
    seed: u64,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a sweep and run it to completion.
    Run(RunArgs),
    /// Reload a saved sweep with its trials and run whatever is missing.
    Resume(SweepArgs),
    /// Print the saved results of a sweep.
    Report(ReportArgs),
    /// Print the parameters of a saved sweep.
    Describe(SweepArgs),
}

#[derive(ClapArgs, Debug)]
struct SweepArgs {
    /// Sweep type: edge_count or sample_count.
    kind: SweepKind,
    /// Run identifier the sweep is saved under.
    prefix: String,
}

#[derive(ClapArgs, Debug)]
struct RunArgs {
    #[command(flatten)]
    sweep: SweepArgs,
    /// Trials to run per value.
    #[arg(long)]
    num_experiments: usize,
    /// Values of the swept parameter; the sweep's defaults when omitted.
    #[arg(long, value_delimiter = ',')]
    values: Vec<SweepValue>,
    #[command(flatten)]
    model: ModelArgs,
}

#[derive(ClapArgs, Debug)]
struct ModelArgs {
    #[arg(long, env = "TRUSTSWEEP_NUM_NODES", default_value_t = 50)]
    num_nodes: u32,
    #[arg(long, env = "TRUSTSWEEP_AGENT_TYPE_PRIOR", default_value = "uniform")]
    agent_type_prior: String,
    #[arg(long, env = "TRUSTSWEEP_EDGE_STRATEGY", default_value = "random")]
    edge_strategy: String,
    #[arg(long, env = "TRUSTSWEEP_EDGE_WEIGHT_STRATEGY", default_value = "noisy")]
    edge_weight_strategy: String,
    /// Fixed edges per node of a sample_count sweep.
    #[arg(long, env = "TRUSTSWEEP_EDGES_PER_NODE", default_value_t = 5)]
    edges_per_node: u32,
    /// Fixed weight samples per edge of an edge_count sweep.
    #[arg(long, env = "TRUSTSWEEP_NUM_WEIGHT_SAMPLES", default_value_t = 3)]
    num_weight_samples: u32,
}

#[derive(ClapArgs, Debug)]
struct ReportArgs {
    #[command(flatten)]
    sweep: SweepArgs,
    /// Print the charts as JSON instead of tables.
    #[arg(long)]
    json: bool,
    /// Reload the trials and add the runtime chart.
    #[arg(long)]
    runtimes: bool,
}

fn create_set(store: RecordStore, args: RunArgs) -> anyhow::Result<ExperimentSet> {
    let RunArgs {
        sweep,
        num_experiments,
        values,
        model,
    } = args;
    let values = (!values.is_empty()).then_some(values);

    let set = match sweep.kind {
        SweepKind::EdgeCount => EdgeCountSweep::create(
            store,
            EdgeCountParams {
                num_nodes: model.num_nodes,
                agent_type_prior: model.agent_type_prior,
                edge_strategy: model.edge_strategy,
                edge_weight_strategy: model.edge_weight_strategy,
                num_weight_samples: model.num_weight_samples,
            },
            &sweep.prefix,
            num_experiments,
            values,
        )?,
        SweepKind::SampleCount => SampleCountSweep::create(
            store,
            SampleCountParams {
                num_nodes: model.num_nodes,
                agent_type_prior: model.agent_type_prior,
                edge_strategy: model.edge_strategy,
                edges_per_node: model.edges_per_node,
                edge_weight_strategy: model.edge_weight_strategy,
            },
            &sweep.prefix,
            num_experiments,
            values,
        )?,
    };
    Ok(set)
}

fn print_charts(set: &ExperimentSet, json: bool) -> anyhow::Result<()> {
    let mut charts = score_charts(set)?;
    if set.runtimes().is_some() {
        charts.push(runtime_chart(set)?);
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&charts)?);
    } else {
        for chart in &charts {
            println!("{}", render_table(chart));
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = StoreConfig::from_env()?;
    if let Some(root) = cli.save_dir {
        config.root = root;
    }
    if let Some(format) = cli.format {
        config = config.with_format(format);
    }
    let store = RecordStore::open(config)?;
    info!(
        "Using {} records in {}",
        store.format().extension(),
        store.root().display()
    );
    let mut runner = SyntheticRunner::new(cli.seed);

    match cli.command {
        Command::Run(args) => {
            let mut set = create_set(store, args)?;
            println!("{}\n", set.description());
            set.run_experiments(&mut runner, false)?;
            print_charts(&set, false)?;
        }
        Command::Resume(args) => {
            let mut set = ExperimentSet::load_from_file_with_trials(
                store,
                &args.prefix,
                args.kind.name(),
                GapPolicy::Strict,
            )?;
            println!("{}\n", set.description());
            set.run_experiments(&mut runner, false)?;
            print_charts(&set, false)?;
        }
        Command::Report(args) => {
            let mut set = args.sweep.kind.load(store, &args.sweep.prefix)?;
            if args.runtimes {
                set.load_experiments(GapPolicy::StopAtFirstGap)?;
                let vocabulary = runner.vocabulary().clone();
                set.aggregate_runtimes(&vocabulary)?;
            }
            print_charts(&set, args.json)?;
        }
        Command::Describe(args) => {
            let set = args.kind.load(store, &args.prefix)?;
            println!("{}", set.description());
        }
    }
    Ok(())
}
