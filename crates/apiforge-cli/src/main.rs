//! apiforge CLI.
//!
//! Compiles OpenAPI documents into TypeScript clients, splits generated
//! clients into segments, fills in missing documentation with a model, and
//! lists the tool descriptors of an API.
//!
//! # Examples
//!
//! ```bash
//! # Print a single-file client
//! apiforge generate petstore.yaml
//!
//! # Write a split client plus its IR sidecar
//! apiforge generate petstore.yaml --output out/petstore.ts --split
//!
//! # Split a client generated earlier
//! apiforge split out/petstore.ts
//!
//! # Tool descriptors in MCP shape
//! apiforge --format json tools petstore.yaml --shape mcp
//! ```

use anyhow::Result;
use apiforge_cli::ToolShape;
use apiforge_cli::commands::{self, generate::GenerateOptions};
use apiforge_core::cli::{ExitCode, OutputFormat};
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// OpenAPI to TypeScript clients and LLM tool surfaces.
#[derive(Parser, Debug)]
#[command(name = "apiforge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (json, text, pretty)
    #[arg(long = "format", global = true, default_value = "pretty")]
    format: String,

    /// Configuration file; defaults to ./apiforge.toml, then the user config dir
    #[arg(long, global = true, env = "APIFORGE_CONFIG")]
    config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a TypeScript client from an OpenAPI document.
    ///
    /// Prints the client when no output path is given.
    Generate {
        /// OpenAPI document (JSON or YAML)
        schema: PathBuf,

        /// Client file to write, e.g. out/petstore.ts
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Client class name
        #[arg(long)]
        class_name: Option<String>,

        /// Base URL baked into the client
        #[arg(long)]
        base_url: Option<String>,

        /// Split the client into per-topic segments
        #[arg(long)]
        split: bool,

        /// Do not write the IR sidecar
        #[arg(long)]
        no_ir: bool,
    },

    /// Split a generated client into segments using its IR sidecar.
    Split {
        /// Generated client file
        source: PathBuf,

        /// Output directory; defaults to the client's directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Insert model-written documentation above undocumented functions.
    ///
    /// The file is rewritten in place. Reads the API key from the variable
    /// named by `docgen.api_key_env` (default `ANTHROPIC_API_KEY`).
    Docgen {
        /// TypeScript source file
        source: PathBuf,

        /// Model identifier
        #[arg(short, long)]
        model: Option<String>,

        /// Functions documented at once
        #[arg(long)]
        max_concurrency: Option<usize>,
    },

    /// List tool descriptors for every operation of an OpenAPI document.
    Tools {
        /// OpenAPI document (JSON or YAML)
        schema: PathBuf,

        /// Wire shape of each descriptor
        #[arg(long, value_enum, default_value_t = ToolShape::Descriptor)]
        shape: ToolShape,
    },

    /// Generate shell completions.
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let output_format = cli
        .format
        .parse::<OutputFormat>()
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    let exit_code = execute_command(cli.command, cli.config, output_format).await?;

    std::process::exit(exit_code.as_i32());
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn execute_command(
    command: Commands,
    config: Option<PathBuf>,
    output_format: OutputFormat,
) -> Result<ExitCode> {
    match command {
        Commands::Generate {
            schema,
            output,
            class_name,
            base_url,
            split,
            no_ir,
        } => {
            let options = GenerateOptions {
                schema,
                output,
                class_name,
                base_url,
                split,
                no_ir,
                config,
            };
            commands::generate::run(&options, output_format)
        }
        Commands::Split { source, output } => commands::split::run(&source, output, output_format),
        Commands::Docgen {
            source,
            model,
            max_concurrency,
        } => commands::docgen::run(&source, model, max_concurrency, config, output_format).await,
        Commands::Tools { schema, shape } => {
            commands::tools::run(&schema, shape, config, output_format)
        }
        Commands::Completions { shell } => {
            use clap::CommandFactory;
            let mut cmd = Cli::command();
            commands::completions::run(shell, &mut cmd)
        }
    }
}
