use crate::algos::Balancer;
use crate::checks::{Severity, Validator};
use crate::config::{Config, Strictness};
use crate::display::{display_report, display_summary, display_teams};
use crate::loaders::{load_allocation_file, load_roster_file, save_allocation_file};
use crate::model::Roster;
use clap::{ArgAction, Parser, Subcommand};
use eyre::{Result, bail};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};
use tracing::{Level, info, warn};

mod algos;
mod checks;
mod config;
mod display;
mod loaders;
mod model;
mod stats;

#[derive(Parser)]
#[command(version, author, about = "Form balanced student teams within tutorial groups")]
struct Cli {
    /// Use FILE instead of teamsolver.toml
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Set verbosity level
    #[arg(short, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Allocate students of a roster to teams
    Allocate {
        /// Roster CSV file
        input: PathBuf,
        /// Output CSV file (default: <input>_teams.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Target team size
        #[arg(short = 's', long)]
        team_size: Option<usize>,
        #[arg(long, value_enum)]
        strictness: Option<Strictness>,
        /// Seed for reproducible allocations
        #[arg(long)]
        seed: Option<u64>,
        /// Do not write the output file
        #[arg(short = 'n', long)]
        dry_run: bool,
    },
    /// Check an allocation file and grade its balance
    Validate {
        /// Allocation CSV file
        input: PathBuf,
        /// Expected team size
        #[arg(short = 's', long)]
        team_size: Option<usize>,
        #[arg(long, value_enum)]
        strictness: Option<Strictness>,
        /// Show every team
        #[arg(short, long)]
        details: bool,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    let mut config = Config::load_or_default(cli.config.as_deref(), Path::new("teamsolver.toml"))?;
    match cli.command {
        Command::Allocate {
            input,
            output,
            team_size,
            strictness,
            seed,
            dry_run,
        } => {
            config.team_size = team_size.unwrap_or(config.team_size);
            config.strictness = strictness.unwrap_or(config.strictness);
            config.seed = seed.or(config.seed);
            let output = output
                .or_else(|| config.output.clone())
                .unwrap_or_else(|| default_output(&input));
            allocate(&config, &input, &output, dry_run)
        }
        Command::Validate {
            input,
            team_size,
            strictness,
            details,
        } => {
            config.team_size = team_size.unwrap_or(config.team_size);
            config.strictness = strictness.unwrap_or(config.strictness);
            validate(&config, &input, details)
        }
    }
}

fn allocate(config: &Config, input: &Path, output: &Path, dry_run: bool) -> Result<()> {
    let balancer = Balancer::from_config(config)?;
    let stem = config.stem_schools();
    if stem.is_empty() {
        warn!("no STEM school configured, every student with a school counts as non-STEM");
    } else {
        info!(schools = stem.len(), "STEM schools configured");
    }
    let students = load_roster_file(input, &stem)?;
    let mut roster = Roster::new(students);
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let outcomes = balancer.assign(&mut roster, &mut rng);
    display_teams(&roster, &outcomes);
    display_summary(&roster, &outcomes);
    if dry_run {
        info!("dry run, not writing {}", output.display());
    } else {
        save_allocation_file(&roster, output)?;
        println!("Allocation written to {}", output.display());
    }
    Ok(())
}

fn validate(config: &Config, input: &Path, details: bool) -> Result<()> {
    config.check()?;
    let rows = load_allocation_file(input)?;
    let report = Validator::new(config.team_size, config.strictness).validate(&rows);
    display_report(&report, details);
    let criticals = report.count(Severity::Critical);
    if criticals > 0 {
        bail!("{criticals} critical issue(s) found in {}", input.display());
    }
    Ok(())
}

fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "roster".into(), |s| s.to_string_lossy());
    input.with_file_name(format!("{stem}_teams.csv"))
}
