//! quizsheet CLI: render and inspect printable question sheets.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "quizsheet",
    version,
    about = "Printable question sheets with adaptive option layout"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a question sheet as a page
    Render {
        /// Path to .toml sheet file
        #[arg(long)]
        sheet: PathBuf,

        /// Output format: text, html
        #[arg(long, default_value = "text")]
        format: String,

        /// Write the page here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Page width in text columns
        #[arg(long)]
        width: Option<usize>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show measured widths and the mode chosen at each container width
    Layout {
        /// Path to .toml sheet file
        #[arg(long)]
        sheet: PathBuf,

        /// Container widths to resize through (comma-separated)
        #[arg(long, default_value = "80,60,40")]
        widths: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate sheet TOML files
    Validate {
        /// Path to sheet file or directory
        #[arg(long)]
        sheet: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and example sheet
    Init,
}

#[tokio::main]
async fn main() {
    let filter = match "quizsheet=info".parse::<tracing_subscriber::filter::Directive>() {
        Ok(directive) => tracing_subscriber::EnvFilter::from_default_env().add_directive(directive),
        Err(_) => tracing_subscriber::EnvFilter::from_default_env(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Render {
            sheet,
            format,
            output,
            width,
            config,
        } => commands::render::execute(sheet, format, output, width, config).await,
        Commands::Layout {
            sheet,
            widths,
            config,
        } => commands::layout::execute(sheet, widths, config).await,
        Commands::Validate { sheet, config } => commands::validate::execute(sheet, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
