/// Reflex command-line launcher
///
/// Runs the TTC braking loop, the VFF avoidance loop, or both in one
/// process. Without `--simulate` the loops only act on data published into
/// the same process.
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use reflex::launch::{self, AvoidTopics, BrakeTopics, LaunchConfig, SimulationConfig};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "reflex")]
#[command(version, about = "Reactive braking and obstacle avoidance loops", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Parameter file (YAML or TOML) applied before overrides
    #[arg(long, global = true)]
    params: Option<PathBuf>,

    /// Stop after this many seconds instead of waiting for Ctrl+C
    #[arg(long, global = true)]
    duration: Option<f64>,

    /// Drive the loops with a simulated wall scenario
    #[arg(long, global = true)]
    simulate: bool,

    /// Initial wall distance of the simulation in meters
    #[arg(long, global = true, default_value_t = 4.0)]
    sim_wall: f64,

    /// Forward speed of the simulation in m/s
    #[arg(long, global = true, default_value_t = 0.5)]
    sim_speed: f64,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Time-to-collision emergency braking
    Brake(BrakeArgs),
    /// Virtual force field obstacle avoidance
    Avoid(AvoidArgs),
    /// Both loops in one process
    All {
        #[command(flatten)]
        brake: BrakeArgs,
        #[command(flatten)]
        avoid: AvoidArgs,
    },
}

#[derive(Args, Debug)]
struct BrakeArgs {
    #[arg(long, default_value = "scan")]
    scan_topic: String,

    #[arg(long, default_value = "diff_cont/odom")]
    odom_topic: String,

    #[arg(long, default_value = "brake")]
    brake_topic: String,

    /// Braking threshold in seconds
    #[arg(long)]
    ttc_final: Option<f64>,
}

#[derive(Args, Debug)]
struct AvoidArgs {
    #[arg(long, default_value = "input_scan")]
    input_scan_topic: String,

    #[arg(long, default_value = "output_vel")]
    output_vel_topic: String,

    #[arg(long, default_value = "vff_debug")]
    debug_topic: String,
}

impl From<BrakeArgs> for BrakeTopics {
    fn from(args: BrakeArgs) -> Self {
        Self {
            scan: args.scan_topic,
            odom: args.odom_topic,
            brake: args.brake_topic,
        }
    }
}

impl From<AvoidArgs> for AvoidTopics {
    fn from(args: AvoidArgs) -> Self {
        Self {
            input_scan: args.input_scan_topic,
            output_vel: args.output_vel_topic,
            debug: args.debug_topic,
        }
    }
}

impl Cli {
    fn into_config(self) -> LaunchConfig {
        let (brake, avoid) = match self.command {
            Command::Brake(args) => (Some(args), None),
            Command::Avoid(args) => (None, Some(args)),
            Command::All { brake, avoid } => (Some(brake), Some(avoid)),
        };

        LaunchConfig {
            ttc_final: brake.as_ref().and_then(|args| args.ttc_final),
            brake: brake.map(BrakeTopics::from),
            avoid: avoid.map(AvoidTopics::from),
            params_file: self.params,
            simulation: self.simulate.then(|| SimulationConfig {
                wall_distance: self.sim_wall,
                speed: self.sim_speed,
            }),
            verbose: self.verbose,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "reflex=debug,warn"
    } else {
        "reflex=info,warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let duration = match cli.duration {
        Some(secs) if secs.is_finite() && secs > 0.0 => Some(Duration::from_secs_f64(secs)),
        Some(secs) => anyhow::bail!("--duration must be a positive number of seconds, got {}", secs),
        None => None,
    };

    let config = cli.into_config();
    if config.simulation.is_none() {
        warn!("No --simulate given: the loops only see data published inside this process");
    }

    let mut scheduler = launch::build_scheduler(&config)?;
    info!("Starting reflex {} with {:?}", reflex::VERSION, scheduler.get_node_list());

    match duration {
        Some(duration) => scheduler.run_for(duration)?,
        None => scheduler.run()?,
    }

    info!("reflex stopped");
    Ok(())
}
