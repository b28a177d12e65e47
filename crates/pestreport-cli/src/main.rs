mod commands;
mod output;

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "pestreport",
    version,
    about = "Extract pest sightings from inspection report PDFs into an Excel report"
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Extract pest records from a PDF report (no workbook is written)
    Extract {
        /// Path to the inspection report PDF
        pdf_file: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write extracted records to a JSON file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        /// Text backend: auto, pdftotext or embedded
        #[arg(long, value_name = "NAME")]
        backend: Option<String>,

        /// Run pdftotext in -layout mode
        #[arg(long)]
        layout: bool,
    },
    /// Extract records and write the Excel report with its analysis sheet
    Report {
        /// Path to the inspection report PDF
        pdf_file: PathBuf,

        /// Directory for the generated workbook
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Report file name stem (a timestamp suffix is appended)
        #[arg(long, value_name = "NAME")]
        name: Option<String>,

        /// Text backend: auto, pdftotext or embedded
        #[arg(long, value_name = "NAME")]
        backend: Option<String>,

        /// Run pdftotext in -layout mode
        #[arg(long)]
        layout: bool,

        /// JSON config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
    /// Regenerate the analysis sheet of an existing report workbook
    Analyze {
        /// Path to a workbook produced by `report`
        xlsx_file: PathBuf,

        /// Number of entries in the high-risk ranking
        #[arg(long, value_name = "N")]
        top: Option<usize>,
    },
    /// Show which PDF text backends are usable on this machine
    Backends,
}

fn setup_logging(level: &str) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pestreport={level},pestreport_core={level}")));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.log_level());

    let result = match cli.command {
        Commands::Extract {
            pdf_file,
            output,
            out,
            backend,
            layout,
        } => commands::extract::run(pdf_file, &output, out, backend.as_deref(), layout),
        Commands::Report {
            pdf_file,
            output_dir,
            name,
            backend,
            layout,
            config,
        } => commands::report::run(commands::report::ReportArgs {
            pdf_file,
            output_dir,
            name,
            backend,
            layout,
            config,
        }),
        Commands::Analyze { xlsx_file, top } => commands::analyze::run(&xlsx_file, top),
        Commands::Backends => commands::backends::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
