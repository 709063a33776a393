//! wea - inspect and manage exchange array segments

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use wea::{
    attach_shared_array, create_shared_array, open_exchange_file, unlink_shared_array,
    ElementType, ExchangeHeader,
};

#[derive(Parser)]
#[command(author, version, long_about = None)]
#[command(about = "Inspect and manage wrapped exchange array segments")]
struct Cli {
    /// Log library activity at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a segment header as JSON
    Inspect {
        /// Segment file to inspect
        #[arg(required_unless_present = "shm", conflicts_with = "shm")]
        file: Option<PathBuf>,

        /// Shared memory segment name
        #[arg(long)]
        shm: Option<String>,
    },
    /// Create a zeroed shared memory segment
    Create {
        /// Shared memory segment name
        #[arg(long)]
        shm: String,

        /// Element type (int8 .. float64, complex128)
        #[arg(long)]
        dtype: ElementType,

        /// Comma separated dimension sizes, e.g. 5,2
        #[arg(long, value_delimiter = ',')]
        shape: Vec<usize>,
    },
    /// Write a shared memory segment to a file
    Export {
        /// Shared memory segment name
        #[arg(long)]
        shm: String,

        /// Destination file
        #[arg(long)]
        out: PathBuf,
    },
    /// Remove a shared memory segment
    Unlink {
        /// Shared memory segment name
        #[arg(long)]
        shm: String,
    },
}

#[derive(serde::Serialize)]
struct HeaderReport<'a> {
    source: String,
    #[serde(flatten)]
    header: &'a ExchangeHeader,
    element_count: usize,
    segment_size: usize,
}

fn print_header(source: String, header: &ExchangeHeader, segment_size: usize) -> wea::Result<()> {
    let report = HeaderReport {
        source,
        header,
        element_count: header.element_count()?,
        segment_size,
    };
    let json = serde_json::to_string_pretty(&report)?;
    println!("{json}");
    Ok(())
}

fn run(cli: Cli) -> wea::Result<()> {
    match cli.command {
        Commands::Inspect { file, shm } => {
            if let Some(name) = shm {
                let handle = attach_shared_array(&name)?;
                print_header(handle.name().to_string(), handle.header(), handle.segment_size())?;
                handle.close();
            } else if let Some(path) = file {
                let handle = open_exchange_file(&path)?;
                print_header(path.display().to_string(), handle.header(), handle.segment_size())?;
            }
        }
        Commands::Create { shm, dtype, shape } => {
            let handle = create_shared_array(&shm, dtype, &shape)?;
            println!(
                "Created {} ({} {:?}, {} bytes)",
                handle.name(),
                dtype,
                shape,
                handle.segment_size()
            );
            handle.close();
        }
        Commands::Export { shm, out } => {
            let handle = attach_shared_array(&shm)?;
            std::fs::write(&out, handle.segment_bytes())
                .map_err(|e| wea::Error::Io {
                    context: "Failed to write export file",
                    source: e,
                })?;
            println!(
                "Exported {} ({} bytes) to {}",
                handle.name(),
                handle.segment_size(),
                out.display()
            );
            handle.close();
        }
        Commands::Unlink { shm } => {
            unlink_shared_array(&shm)?;
            println!("Unlinked {shm}");
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("wea=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
