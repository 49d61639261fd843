//! gridsub - schedd locator and fake file-set builder

use std::{process, sync::Arc, time::Duration};

use clap::{Parser, Subcommand};
use log::{error, info};

use gridsub_config::{config::Config, validator::validate as validate_config};
use gridsub_discovery::SnapshotCollector;
use gridsub_fileset::{MakeFakeFileSet, StaticSiteDirectory, Task};
use gridsub_locator::{ChoicePolicy, CollectorCache, Locator};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    // Sets a custom config file
    #[arg(short, long)]
    config: Option<String>,

    // Overrides collector.snapshot from the config file
    #[arg(long)]
    snapshot: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Pick a schedd for a new task
    Select {
        /// memory | capacity (defaults to the configured policy)
        #[arg(short, long)]
        policy: Option<String>,
    },
    /// Print the address of a schedd
    Resolve { name: String },
    /// Print the fake fileset for a task without input data
    FakeFileset {
        #[arg(long, default_value = "task")]
        task_name: String,
        #[arg(long)]
        total_units: u64,
        #[arg(long)]
        events_per_lumi: Option<u32>,
    },
}

fn main() {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .unwrap_or_else(|| "./config/config.yaml".to_string());

    // Read configuration file
    let mut config = match gridsub_config::loader::read_config(&config_path) {
        Ok(cfg) => cfg,
        Err(err_msg) => {
            eprintln!("Error loading config: {}", err_msg);
            process::exit(1);
        }
    };

    if let Some(snapshot) = cli.snapshot {
        config.collector.snapshot = Some(snapshot);
    }

    // Initialize the Logger
    if let Err(err_msg) =
        gridsub_utils::logger::init_logger(&config.log.level, config.log.enabled, &config.log.file)
    {
        eprintln!("Error initialising logger: {}", err_msg);
        process::exit(1);
    }

    // Validate Configurations
    if !validate_config(&config) {
        error!("Configuration validation failed. Exiting...");
        process::exit(1);
    }

    if let Err(err_msg) = ChoicePolicy::from_config(&config.policy) {
        error!("{}", err_msg);
        error!("Configuration validation failed. Exiting...");
        process::exit(1);
    }

    if let Err(err_msg) = run(config, cli.command) {
        error!("{}", err_msg);
        eprintln!("Error: {}", err_msg);
        process::exit(1);
    }
}

fn run(config: Config, command: Command) -> Result<(), String> {
    match command {
        Command::Select { policy } => {
            let locator = locator(config)?;
            let policy = match policy {
                Some(value) => ChoicePolicy::from_config(&value)?,
                None => locator.configured_policy().map_err(|err| err.to_string())?,
            };
            let schedd = locator.select_schedd(policy).map_err(|err| err.to_string())?;
            println!("{}", schedd);
        }
        Command::Resolve { name } => {
            let locator = locator(config)?;
            info!("Will talk to {}.", locator.collector_host());
            let (handle, address) = locator.schedd_address(&name).map_err(|err| err.to_string())?;
            println!("{} {}", handle.name, address);
        }
        Command::FakeFileset {
            task_name,
            total_units,
            events_per_lumi,
        } => {
            let builder = MakeFakeFileSet::new(StaticSiteDirectory::new(config.sites));
            let result = builder
                .execute(Task {
                    name: task_name,
                    total_units,
                    events_per_lumi,
                })
                .map_err(|err| err.to_string())?;
            let yaml = serde_yaml::to_string(&result).map_err(|err| err.to_string())?;
            print!("{}", yaml);
        }
    }
    Ok(())
}

fn locator(config: Config) -> Result<Locator<SnapshotCollector>, String> {
    let snapshot = config
        .collector
        .snapshot
        .clone()
        .ok_or_else(|| "no collector snapshot configured (collector.snapshot)".to_string())?;

    let collector = SnapshotCollector::new(&config.collector_host(), snapshot);
    let cache = Arc::new(CollectorCache::new(Duration::from_secs(config.cache_ttl_secs)));
    Ok(Locator::new(config, collector, cache))
}
