//! rie-tool - command-line access to the constellation PoW consensus rules.
//!
//! Checks proofs of work, decodes difficulty bits and computes the bits the next
//! block must carry from a chain file.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use num_bigint::BigUint;
use rie_consensus::{
    difficulty_from_bits, next_prime, verify_proof_of_work, BlockIndex, DifficultyRetarget,
    PowVersion, Uint256,
};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod config;

use config::{load_params, parse_u32, ChainFile};

/// Prime-constellation consensus tool.
#[derive(Parser, Debug)]
#[command(name = "rie-tool")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Network whose parameters apply
    #[arg(short, long, default_value = "main", global = true)]
    network: String,

    /// TOML file with parameter overrides
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a proof of work
    CheckPow {
        /// PoW digest (display-order hex)
        #[arg(long)]
        hash: String,
        /// Difficulty bits (decimal or 0x-hex)
        #[arg(long)]
        bits: String,
        /// Constellation offset (display-order hex)
        #[arg(long)]
        offset: String,
    },
    /// Print the difficulty encoded by bits
    DecodeBits {
        /// Difficulty bits (decimal or 0x-hex)
        bits: String,
        /// Interpret as linear bits instead of legacy compact
        #[arg(long)]
        linear: bool,
    },
    /// Print the smallest prime above n
    NextPrime {
        /// Decimal integer
        n: String,
    },
    /// Compute the bits required for the block after the last one in a chain file
    NextBits {
        /// TOML chain file
        #[arg(long)]
        chain: PathBuf,
        /// Timestamp of the candidate block (defaults to tip time + spacing)
        #[arg(long)]
        time: Option<i64>,
    },
    /// Print the effective consensus parameters
    Params,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let params = load_params(&args.network, args.config.as_deref())?;
    info!(network = %params.network, "Loaded consensus parameters");

    match args.command {
        Command::CheckPow { hash, bits, offset } => {
            let hash = Uint256::from_hex(&hash).context("Invalid hash")?;
            let offset = Uint256::from_hex(&offset).context("Invalid offset")?;
            let bits = parse_u32(&bits)?;
            match verify_proof_of_work(&hash, bits, &offset, &params) {
                Ok(()) => println!("valid"),
                Err(e) => bail!("invalid: {}", e),
            }
        }
        Command::DecodeBits { bits, linear } => {
            let bits = parse_u32(&bits)?;
            let version = if linear {
                PowVersion::Linear
            } else {
                PowVersion::Legacy
            };
            println!("{}", difficulty_from_bits(bits, version));
        }
        Command::NextPrime { n } => {
            let n = BigUint::parse_bytes(n.trim().as_bytes(), 10)
                .with_context(|| format!("Invalid decimal integer '{}'", n))?;
            println!("{}", next_prime(&n));
        }
        Command::NextBits { chain, time } => {
            let chain = ChainFile::load(&chain)?.into_index();
            let tip = chain.tip().context("Chain file contains no blocks")?;
            let candidate_time = time.unwrap_or(tip.time() + params.target_spacing);
            let bits = DifficultyRetarget::new(&params)
                .next_work_required(&tip, candidate_time)
                .context("Failed to compute next bits")?;
            println!("{:#010x}", bits);
        }
        Command::Params => {
            println!("{:#?}", params);
        }
    }

    Ok(())
}
