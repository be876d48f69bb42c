//! PropYouLike CLI
//!
//! Builds the static site from the content store and gates the output.
//! `build` exits non-zero on the first failing step or gate.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod commands;
mod output;
mod pipeline;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::Result;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "propyoulike")]
#[command(about = "PropYouLike - static site build pipeline for real-estate project pages", long_about = None)]
struct Cli {
    /// Content store root
    #[arg(long, global = true, env = "PROPYOULIKE_CONTENT", default_value = "content")]
    content: PathBuf,
    /// Output directory
    #[arg(long, global = true, env = "PROPYOULIKE_DIST", default_value = "dist")]
    dist: PathBuf,
    /// Staging directory for intermediate artifacts
    #[arg(long, global = true, env = "PROPYOULIKE_WORK", default_value = ".propyoulike-work")]
    work: PathBuf,
    /// Public origin, overrides the site config
    #[arg(long, global = true, env = "PROPYOULIKE_ORIGIN")]
    origin: Option<String>,
    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and every post-build gate
    Build {
        /// Regenerate after the build and compare page digests
        #[arg(long)]
        verify_idempotent: bool,
    },
    /// Print one resolved project as JSON
    Resolve {
        /// Public slug (`<builder>-<project>`)
        slug: String,
    },
    /// Validate every project and print a report; never fails
    Validate {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the post-build gates over an existing output directory
    Verify,
    /// Print an authoring template
    Template {
        /// Which schema
        #[arg(value_enum)]
        kind: TemplateKind,
    },
    /// Write the project index artifact only
    Index,
}

/// Authoring templates on offer
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TemplateKind {
    /// Project identity plus sections
    Project,
    /// `aboutbuilder.json`
    Builder,
}

fn init_tracing(verbose: bool) {
    // target prefix match: covers the binary and every propyoulike_* crate
    let fallback = if verbose {
        "propyoulike=debug"
    } else {
        "propyoulike=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = pipeline::BuildOptions {
        content: cli.content,
        dist: cli.dist,
        work: cli.work,
        origin: cli.origin,
        verify_idempotent: false,
    };

    match cli.command {
        Commands::Build { verify_idempotent } => {
            let options = pipeline::BuildOptions {
                verify_idempotent,
                ..options
            };
            if let Err(failure) = pipeline::build(options) {
                output::failure(&failure.label, &failure.source.to_string());
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Resolve { slug } => commands::resolve(&options, &slug),
        Commands::Validate { json } => commands::validate(&options, json),
        Commands::Verify => {
            if let Err(failure) = commands::verify(&options) {
                output::failure(&failure.label, &failure.source.to_string());
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Template { kind } => commands::template(kind),
        Commands::Index => commands::index(&options),
    }
}
