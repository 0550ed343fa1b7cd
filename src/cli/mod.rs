//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod config_cmd;
mod helpers;
mod llm;
mod pipeline;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::load_settings;
use crate::pipeline::ErrorPolicy;

#[derive(Parser)]
#[command(name = "catalog-forge")]
#[command(about = "Product design document generation and category classification")]
#[command(version)]
pub struct Cli {
    /// Config file path (default: ./catalog-forge.toml if present)
    #[arg(short, long, global = true, env = "CATALOG_FORGE_CONFIG")]
    config: Option<PathBuf>,

    /// What to do when a row's model call fails (overrides config)
    #[arg(long, global = true, value_enum)]
    error_policy: Option<ErrorPolicy>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Hide progress bars and per-row documents
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

/// Options for the generation stage.
#[derive(clap::Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Maximum concurrent model requests (0 = unbounded)
    #[arg(short = 'j', long)]
    concurrency: Option<usize>,

    /// Echo the model's streamed reasoning to stderr
    #[arg(long)]
    show_reasoning: bool,
}

/// Options for the classification stage.
#[derive(clap::Args, Debug, Clone)]
pub struct ClassifyArgs {
    /// Taxonomy CSV with index, explanation and name columns
    #[arg(long, default_value = "categories.csv")]
    categories: PathBuf,

    /// Treat category names outside the taxonomy as parse failures
    #[arg(long)]
    strict: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate product design documents from raw product rows
    Generate {
        /// Product CSV
        #[arg(short, long, default_value = "samples.csv")]
        input: PathBuf,
        /// Enriched output CSV
        #[arg(short, long, default_value = "product_documents.csv")]
        output: PathBuf,
        #[command(flatten)]
        args: GenerateArgs,
        /// Stop at the first failed model call and write nothing
        #[arg(long)]
        fail_fast: bool,
    },

    /// Assign a taxonomy category to every generated document
    Classify {
        /// Enriched product CSV
        #[arg(short, long, default_value = "product_documents.csv")]
        input: PathBuf,
        /// Classified output CSV
        #[arg(short, long, default_value = "classified_products.csv")]
        output: PathBuf,
        #[command(flatten)]
        args: ClassifyArgs,
        /// Stop at the first failed model call and write nothing
        #[arg(long)]
        fail_fast: bool,
    },

    /// Run generation then classification
    Run {
        /// Product CSV
        #[arg(short, long, default_value = "samples.csv")]
        input: PathBuf,
        /// Intermediate enriched CSV
        #[arg(long, default_value = "product_documents.csv")]
        documents: PathBuf,
        /// Classified output CSV
        #[arg(short, long, default_value = "classified_products.csv")]
        output: PathBuf,
        #[command(flatten)]
        generate: GenerateArgs,
        #[command(flatten)]
        classify: ClassifyArgs,
        /// Stop at the first failed model call and write nothing
        #[arg(long)]
        fail_fast: bool,
    },

    /// List models served by the configured endpoint
    Models,

    /// Show the effective configuration
    Config,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref()).context("Failed to load settings")?;
    if let Some(policy) = cli.error_policy {
        settings.pipeline.error_policy = policy;
    }

    match cli.command {
        Commands::Generate {
            input,
            output,
            args,
            fail_fast,
        } => {
            helpers::apply_fail_fast(&mut settings, fail_fast);
            pipeline::cmd_generate(&settings, &input, &output, &args, cli.quiet).await
        }
        Commands::Classify {
            input,
            output,
            args,
            fail_fast,
        } => {
            helpers::apply_fail_fast(&mut settings, fail_fast);
            pipeline::cmd_classify(&settings, &input, &output, &args, cli.quiet).await
        }
        Commands::Run {
            input,
            documents,
            output,
            generate,
            classify,
            fail_fast,
        } => {
            helpers::apply_fail_fast(&mut settings, fail_fast);
            pipeline::cmd_run(
                &settings, &input, &documents, &output, &generate, &classify, cli.quiet,
            )
            .await
        }
        Commands::Models => llm::cmd_models(&settings).await,
        Commands::Config => config_cmd::cmd_config_show(&settings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_defaults() {
        let cli = Cli::try_parse_from(["catalog-forge", "run"]).unwrap();
        match cli.command {
            Commands::Run {
                input,
                documents,
                output,
                generate,
                classify,
                fail_fast,
            } => {
                assert_eq!(input, PathBuf::from("samples.csv"));
                assert_eq!(documents, PathBuf::from("product_documents.csv"));
                assert_eq!(output, PathBuf::from("classified_products.csv"));
                assert_eq!(classify.categories, PathBuf::from("categories.csv"));
                assert_eq!(generate.concurrency, None);
                assert!(!fail_fast);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_error_policy_flag() {
        let cli = Cli::try_parse_from(["catalog-forge", "classify", "--error-policy", "abort"])
            .unwrap();
        assert_eq!(cli.error_policy, Some(ErrorPolicy::Abort));

        let cli = Cli::try_parse_from(["catalog-forge", "generate"]).unwrap();
        assert_eq!(cli.error_policy, None);

        assert!(Cli::try_parse_from(["catalog-forge", "run", "--error-policy", "retry"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "catalog-forge",
            "generate",
            "-j",
            "0",
            "--show-reasoning",
            "--quiet",
        ])
        .unwrap();
        assert!(cli.quiet);
        match cli.command {
            Commands::Generate { args, .. } => {
                assert_eq!(args.concurrency, Some(0));
                assert!(args.show_reasoning);
            }
            _ => panic!("expected generate"),
        }
    }
}
