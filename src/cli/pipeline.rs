//! Generation and classification commands.

use std::path::Path;

use anyhow::Context;
use console::style;

use super::helpers::{build_client, print_report};
use super::{ClassifyArgs, GenerateArgs};
use crate::classify::CategoryClassifier;
use crate::config::Settings;
use crate::generate::DocumentGenerator;
use crate::llm::ReasoningEcho;
use crate::models::load_taxonomy;
use crate::pipeline::StageReport;

pub async fn cmd_generate(
    settings: &Settings,
    input: &Path,
    output: &Path,
    args: &GenerateArgs,
    quiet: bool,
) -> anyhow::Result<()> {
    let report = generate(settings, input, output, args, quiet).await?;
    print_report(&report);
    Ok(())
}

pub async fn cmd_classify(
    settings: &Settings,
    input: &Path,
    output: &Path,
    args: &ClassifyArgs,
    quiet: bool,
) -> anyhow::Result<()> {
    let report = classify(settings, input, output, args, quiet).await?;
    print_report(&report);
    Ok(())
}

pub async fn cmd_run(
    settings: &Settings,
    input: &Path,
    documents: &Path,
    output: &Path,
    generate_args: &GenerateArgs,
    classify_args: &ClassifyArgs,
    quiet: bool,
) -> anyhow::Result<()> {
    let generated = generate(settings, input, documents, generate_args, quiet).await?;
    print_report(&generated);

    let classified = classify(settings, documents, output, classify_args, quiet).await?;
    print_report(&classified);

    eprintln!(
        "{} Wrote {}",
        style("✓").green(),
        style(output.display()).bold()
    );
    Ok(())
}

async fn generate(
    settings: &Settings,
    input: &Path,
    output: &Path,
    args: &GenerateArgs,
    quiet: bool,
) -> anyhow::Result<StageReport> {
    let client = build_client(settings)?;
    let concurrency = args.concurrency.unwrap_or(settings.pipeline.concurrency);
    let echo = if args.show_reasoning || settings.pipeline.show_reasoning {
        ReasoningEcho::Stderr
    } else {
        ReasoningEcho::Off
    };

    let generator = DocumentGenerator::new(client)
        .with_concurrency(concurrency)
        .with_error_policy(settings.pipeline.error_policy)
        .with_reasoning_echo(echo)
        .quiet(quiet);

    generator
        .run_file(input, output)
        .await
        .with_context(|| format!("Generation failed for {}", input.display()))
}

async fn classify(
    settings: &Settings,
    input: &Path,
    output: &Path,
    args: &ClassifyArgs,
    quiet: bool,
) -> anyhow::Result<StageReport> {
    let categories = load_taxonomy(&args.categories)
        .with_context(|| format!("Failed to load taxonomy {}", args.categories.display()))?;
    let client = build_client(settings)?;

    let classifier = CategoryClassifier::new(client, categories)
        .with_error_policy(settings.pipeline.error_policy)
        .with_strict_taxonomy(args.strict || settings.pipeline.strict_taxonomy)
        .quiet(quiet);

    classifier
        .run_file(input, output)
        .await
        .with_context(|| format!("Classification failed for {}", input.display()))
}
