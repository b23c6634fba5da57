mod show;

use anyhow::{Context, Result};
use clap::Parser as _;
use mfc::{InputFormat, Options, OutputFormat};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{trace, trace_span};

/// MiFare classic Converter.
#[derive(clap::Parser, Debug)]
struct Args {
    /// Increase log level.
    #[arg(short, long, action=clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease log level.
    #[arg(short, long, action=clap::ArgAction::Count)]
    quiet: u8,

    /// Command.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Convert a dump between formats.
    Convert {
        input_format: InputFormat,
        output_format: OutputFormat,
        input_path: PathBuf,
        output_path: PathBuf,

        /// Fail on missing data (otherwise filled with zeros).
        #[arg(short, long)]
        strict: bool,

        /// Accept file sizes >= 1024 for mfd format.
        #[arg(short, long)]
        fuzzy: bool,
    },

    /// Pretty-print a dump.
    Show {
        format: InputFormat,
        path: PathBuf,

        /// Accept file sizes >= 1024 for mfd format.
        #[arg(short, long)]
        fuzzy: bool,
    },
}

impl Command {
    pub fn run(&self) -> Result<()> {
        match self {
            Self::Convert {
                input_format,
                output_format,
                input_path,
                output_path,
                strict,
                fuzzy,
            } => {
                let span = trace_span!("convert");
                let _enter = span.enter();

                mfc::convert(
                    *input_format,
                    *output_format,
                    input_path,
                    output_path,
                    Options {
                        strict: *strict,
                        fuzzy: *fuzzy,
                    },
                )
                .with_context(|| {
                    format!(
                        "couldn't convert {} ({}) to {} ({})",
                        input_path.display(),
                        input_format,
                        output_path.display(),
                        output_format
                    )
                })
            }
            Self::Show {
                format,
                path,
                fuzzy,
            } => {
                let span = trace_span!("show");
                let _enter = span.enter();

                let raw = std::fs::read(path)
                    .with_context(|| format!("couldn't read {}", path.display()))?;
                let dump = mfc::convert::read(*format, &raw, *fuzzy)
                    .with_context(|| format!("couldn't parse {} as {}", path.display(), format))?;
                show::show(&dump);
                Ok(())
            }
        }
    }
}

fn init_logging(args: &Args) {
    tracing_subscriber::fmt()
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_max_level(match 2u8.saturating_add(args.verbose).saturating_sub(args.quiet) {
            0 => tracing::Level::ERROR,
            1 => tracing::Level::WARN,
            2 => tracing::Level::INFO,
            3 => tracing::Level::DEBUG,
            4.. => tracing::Level::TRACE,
        })
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args);
    trace!(?args, "Starting up");

    // One line, whatever the log level is.
    if let Err(err) = args.command.run() {
        eprintln!("error: {:#}", err);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
