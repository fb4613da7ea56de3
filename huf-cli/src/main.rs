mod replay;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use huf_bridge::BridgeConfig;
use replay::Replay;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "huf")]
#[command(version, about = "Drive the widget bridge from the command line", long_about = None)]
struct Cli {
    /// Bridge configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute newline-delimited JSON commands against an in-memory document
    Replay {
        /// Command file, or `-` for stdin
        input: PathBuf,
        /// Print the resulting tree outline after the last command
        #[arg(short, long)]
        dump: bool,
    },
    /// Validate a bridge configuration file
    CheckConfig {
        /// Path to the configuration file
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Commands::Replay { input, dump } => {
            let config = match &cli.config {
                Some(path) => load_config(path)?,
                None => BridgeConfig::default(),
            };
            let reader: Box<dyn BufRead> = if input == Path::new("-") {
                Box::new(io::stdin().lock())
            } else {
                let file = File::open(&input)
                    .with_context(|| format!("failed to open {}", input.display()))?;
                Box::new(BufReader::new(file))
            };

            let mut replay = Replay::new(config);
            let stdout = io::stdout();
            let mut out = stdout.lock();
            replay.run(reader, &mut out)?;
            if dump {
                write!(out, "{}", replay.outline())?;
            }
            out.flush()?;
        }
        Commands::CheckConfig { file } => {
            let config = load_config(&file)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn load_config(path: &Path) -> Result<BridgeConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    BridgeConfig::from_json(&text).with_context(|| format!("invalid config in {}", path.display()))
}

fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(io::stderr)
        .init();
}
