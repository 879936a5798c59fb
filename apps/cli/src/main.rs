//! Slideship command line client.
//!
//! Uploads a presentation to a conversion server in fixed-size chunks, asks
//! the server to convert it, and optionally downloads the result.

mod commands;
mod config;
mod progress;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use config::ClientConfig;

/// Chunked presentation upload and conversion.
#[derive(Parser)]
#[command(name = "slideship")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Server base URL, overriding the config file
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a file in chunks and convert it
    Upload {
        /// File to upload
        file: PathBuf,

        /// Chunk size in bytes
        #[arg(long)]
        chunk_size: Option<u64>,

        /// Chunks in flight at once (1 = sequential)
        #[arg(long)]
        parallel: Option<usize>,

        /// Remember progress so an interrupted upload can continue
        #[arg(long)]
        resume: bool,

        #[command(flatten)]
        conversion: ConversionArgs,
    },

    /// Convert a file that is already on the server
    Convert {
        /// Name the file was uploaded under
        filename: String,

        #[command(flatten)]
        conversion: ConversionArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ConversionArgs {
    /// Name of the converted file
    #[arg(long)]
    pub output_name: String,

    /// Slides to convert, e.g. "1,2,5"; empty means all
    #[arg(long, default_value = "")]
    pub slides: String,

    /// Conversion direction
    #[arg(long, default_value = slideship_protocol::constants::direction::EN_TO_AR)]
    pub direction: String,

    /// Translate slide text as well
    #[arg(long)]
    pub translate: bool,

    /// Download the converted file to this path
    #[arg(long)]
    pub download: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = ClientConfig::load(cli.config.as_deref())?;
    if let Some(server) = cli.server {
        config.server_url = server;
    }

    match cli.command {
        Commands::Upload {
            file,
            chunk_size,
            parallel,
            resume,
            conversion,
        } => {
            if let Some(chunk_size) = chunk_size {
                config.chunk_size = chunk_size;
            }
            if let Some(parallel) = parallel {
                config.parallel_chunks = parallel;
            }
            config.validate()?;
            commands::upload(&config, &file, resume, &conversion).await?;
        }
        Commands::Convert {
            filename,
            conversion,
        } => {
            config.validate()?;
            commands::convert(&config, &filename, &conversion).await?;
        }
    }

    Ok(())
}
