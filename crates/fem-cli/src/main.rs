use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use env_logger::{Builder, Env};
use log::LevelFilter;

mod commands;

/// Inspect, convert and repair finite-element models (`.sol` text or `.mdl` snapshots)
#[derive(Parser)]
#[command(name = "fem-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
struct Cli {
    /// More log output (-v info, -vv debug); RUST_LOG applies otherwise
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print node, element and solution counts per mesh
    Summary {
        input: PathBuf,
        /// Emit the statistics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rewrite a model in another format, chosen by extension
    Convert {
        input: PathBuf,
        output: PathBuf,
        /// Mesh to write when the output is `.sol`
        #[arg(long)]
        mesh: Option<String>,
    },
    /// Merge coincident nodes of a mesh
    Fuse {
        input: PathBuf,
        output: PathBuf,
        #[arg(long, default_value_t = 1e-6)]
        tolerance: f64,
        #[arg(long)]
        mesh: Option<String>,
    },
    /// Convert every linear element of a mesh to its quadratic sibling
    Elevate {
        input: PathBuf,
        output: PathBuf,
        #[arg(long)]
        mesh: Option<String>,
    },
}

fn init_logging(verbose: u8) {
    let mut builder = match verbose {
        0 => Builder::from_env(Env::default().default_filter_or("warn")),
        1 => {
            let mut b = Builder::new();
            b.filter_level(LevelFilter::Info);
            b
        }
        _ => {
            let mut b = Builder::new();
            b.filter_level(LevelFilter::Debug);
            b
        }
    };
    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {:5} {}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let outcome = match cli.command {
        Command::Summary { input, json } => commands::summary(&input, json),
        Command::Convert {
            input,
            output,
            mesh,
        } => commands::convert(&input, &output, mesh.as_deref()),
        Command::Fuse {
            input,
            output,
            tolerance,
            mesh,
        } => commands::fuse(&input, &output, tolerance, mesh.as_deref()),
        Command::Elevate {
            input,
            output,
            mesh,
        } => commands::elevate(&input, &output, mesh.as_deref()),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(1)
        }
    }
}
