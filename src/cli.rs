//! Command-line front end.
//!
//! Reads a partition list, runs the rebalancer for up to `--max-reassign`
//! changes and writes the result as JSON. Diagnostics go to the error
//! stream through `tracing`.

use std::ffi::OsString;
use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{anyhow, Context};
use clap::error::ErrorKind;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::codec::{self, InputFormat};
use crate::constraints::RebalanceConfig;
use crate::models::BrokerId;
use crate::Rebalancer;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "kafka-balancer",
    version,
    about = "Propose replica reassignments that even out load across Kafka brokers"
)]
pub struct Args {
    /// Parse the input as JSON instead of topic describe output
    #[arg(long)]
    pub input_json: bool,

    /// File to read (stdin when not given)
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Maximum number of reassignments to generate
    #[arg(long, default_value_t = 1)]
    pub max_reassign: usize,

    /// Output the full partition list instead of only the changes
    #[arg(long)]
    pub full_output: bool,

    /// Consider partition leaders eligible for rebalancing
    #[arg(long)]
    pub allow_leader: bool,

    /// Minimum number of replicas for a partition to be eligible for rebalancing
    #[arg(long, default_value_t = 2)]
    pub min_replicas: usize,

    /// Minimum unbalance improvement required to move a replica
    #[arg(long, default_value_t = 0.00001)]
    pub min_unbalance: f64,

    /// Comma-separated list of broker IDs, or "auto" to use the brokers in the input
    #[arg(long, default_value = "auto")]
    pub broker_ids: String,
}

impl Args {
    fn input_format(&self) -> InputFormat {
        if self.input_json {
            InputFormat::Json
        } else {
            InputFormat::Text
        }
    }

    fn broker_pool(&self) -> anyhow::Result<Option<Vec<BrokerId>>> {
        if self.broker_ids == "auto" {
            return Ok(None);
        }

        self.broker_ids
            .split(',')
            .map(|id| id.trim().parse::<BrokerId>())
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
            .with_context(|| format!("failed parsing broker list {:?}", self.broker_ids))
    }

    fn rebalance_config(&self) -> anyhow::Result<RebalanceConfig> {
        if !self.min_unbalance.is_finite() || self.min_unbalance < 0.0 {
            return Err(anyhow!("invalid minimum unbalance {}", self.min_unbalance));
        }

        Ok(RebalanceConfig {
            allow_leader_moves: self.allow_leader,
            min_replicas_for_rebalancing: self.min_replicas,
            min_unbalance_improvement: self.min_unbalance,
            candidate_brokers: self.broker_pool()?,
        })
    }
}

/// Process exit status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Success = 0,
    /// The input file could not be opened
    InputUnavailable = 1,
    /// The partition list could not be parsed
    InvalidInput = 2,
    /// Bad arguments, or the rebalancer rejected the partition list
    Failed = 3,
    /// The result could not be written
    OutputFailed = 4,
}

impl Exit {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit.code())
    }
}

/// Run the tool against the given streams and arguments (program name
/// first). Log output is written to `stderr`.
pub fn run<I, T, R, W, E>(args: I, stdin: R, stdout: W, mut stderr: E) -> Exit
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    R: Read,
    W: Write,
    E: Write + Send + 'static,
{
    let args = match Args::try_parse_from(args) {
        Ok(args) => args,
        Err(err) => {
            // help and usage text are the whole output here
            if write!(stderr, "{}", err.render()).is_err() {
                return Exit::OutputFailed;
            }
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => Exit::Success,
                _ => Exit::Failed,
            };
        }
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(stderr))
        .with_ansi(false)
        .with_target(false)
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        match execute(&args, stdin, stdout) {
            Ok(()) => Exit::Success,
            Err((exit, err)) => {
                error!("{:#}", err);
                exit
            }
        }
    })
}

fn execute<R: Read, W: Write>(args: &Args, stdin: R, stdout: W) -> Result<(), (Exit, anyhow::Error)> {
    let config = args.rebalance_config().map_err(fail(Exit::Failed))?;
    let format = args.input_format();

    let parsed = match &args.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed opening file {}", path.display()))
                .map_err(fail(Exit::InputUnavailable))?;
            codec::parse_partition_list(file, format)
        }
        None => codec::parse_partition_list(stdin, format),
    };
    let mut working = parsed
        .context("failed parsing partition list")
        .map_err(fail(Exit::InvalidInput))?;

    info!(
        partitions = working.len(),
        brokers = ?working.broker_list(),
        "loaded partition list"
    );

    let plan = Rebalancer::default()
        .generate_plan(&mut working, &config, args.max_reassign)
        .context("failed optimizing distribution")
        .map_err(fail(Exit::Failed))?;

    let output = if args.full_output {
        working
    } else {
        plan.reassignments()
    };

    codec::write_partition_list(stdout, &output)
        .context("failed writing partition list")
        .map_err(fail(Exit::OutputFailed))
}

fn fail(exit: Exit) -> impl FnOnce(anyhow::Error) -> (Exit, anyhow::Error) {
    move |err| (exit, err)
}
