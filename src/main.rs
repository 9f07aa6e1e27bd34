use clap::{Parser, ValueEnum};
use mpc_inventory::io::demand::{self, DemandSource};
use mpc_inventory::io::reporting::{self, ReportFormat};
use mpc_inventory::logging;
use mpc_inventory::solver::GoodLpSolver;
use mpc_inventory::strategy::builder_for;
use mpc_inventory::{PlanningConfig, PlanningMode, Result, RollingHorizonController};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Deterministic,
    IntervalRobust,
    ScenarioRobust,
    All,
}

impl ModeArg {
    fn modes(self) -> Vec<PlanningMode> {
        match self {
            ModeArg::Deterministic => vec![PlanningMode::Deterministic],
            ModeArg::IntervalRobust => vec![PlanningMode::IntervalRobust],
            ModeArg::ScenarioRobust => vec![PlanningMode::ScenarioRobust],
            ModeArg::All => PlanningMode::ALL.to_vec(),
        }
    }
}

/// Rolling-horizon replenishment planner.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// TOML file with planning parameters.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Demand history (`Date,Sales` CSV). Synthetic demand is used when absent.
    #[arg(short, long)]
    demand: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = ModeArg::All)]
    mode: ModeArg,

    /// Directory for the daily reports.
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Overrides the configured seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Write decimals with a point instead of a comma.
    #[arg(long)]
    decimal_point: bool,
}

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "planning aborted");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    println!("=== Rolling-Horizon Replenishment Planner ===");

    // 1. SETUP CONFIGURATION
    let mut config = match &cli.config {
        Some(path) => PlanningConfig::load(path)?,
        None => PlanningConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    config.validate()?;

    // 2. LOAD DEMAND
    let demand = match &cli.demand {
        Some(path) => DemandSource::from_csv_path(path)?,
        None => {
            // Long enough for the last day's look-ahead.
            let days = config.final_day() + config.horizon;
            let mut rng = StdRng::seed_from_u64(config.seed);
            DemandSource::from_demands(demand::generate_normal_demand(days, 40.0, 8.0, &mut rng)?)
        }
    };
    println!("Demand history: {} days", demand.len());

    let format = ReportFormat {
        decimal_comma: !cli.decimal_point,
        ..Default::default()
    };

    // 3. RUN EVERY REQUESTED MODEL
    for mode in cli.mode.modes() {
        let mut controller = RollingHorizonController::new(
            config.clone(),
            &demand,
            builder_for(mode, &config),
            Box::new(GoodLpSolver::new()),
        )?;
        let outcome = controller.run();

        // Days committed before a failure are still reported.
        let output_file = cli
            .output_dir
            .join(format!("inventory_{}.csv", mode.label()));
        reporting::write_planning_log(&output_file, &controller.history, format)?;
        outcome?;

        println!("\n=== {} ===", mode.label());
        println!("Total ordered:    {:.2}", controller.total_ordered());
        println!("Total shortfall:  {:.2}", controller.total_shortfall());
        println!("Realized profit:  {:.2}", controller.total_profit());
        println!("Report written to {}", output_file.display());
    }

    println!("\nPlanning complete.");
    Ok(())
}
