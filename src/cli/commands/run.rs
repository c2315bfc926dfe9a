//! The `run` command: drive the convergence loop for one symbol.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use console::style;

use crate::application::{ConvergenceController, RunSummary};
use crate::cli::RunArgs;
use crate::domain::models::{Config, FunctionUnderTest};
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::{AnthropicClient, PytestRunner};
use crate::services::{locator, CorrectionService, SuiteGenerator, Transcript};

pub async fn execute(args: RunArgs, json_mode: bool) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    apply_overrides(&mut config, &args);
    ConfigLoader::validate(&config).context("Configuration rejected after CLI overrides")?;

    let target = resolve_target(&args.file, &config.source_root);
    let (source, origin) = locator::locate(&target, &args.symbol)?;
    let function = FunctionUnderTest::new(source, args.symbol.clone(), origin);

    let transcript = Transcript::new(config.generation.print_text);
    let client = Arc::new(AnthropicClient::new(config.api.clone(), config.generation.stream)?);

    let test_output_path = PathBuf::from(&config.runner.test_output_path);
    let test_module = test_output_path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("test_functions.py")
        .to_string();

    let generator = SuiteGenerator::new(
        client.clone(),
        config.models.clone(),
        config.generation.clone(),
        test_output_path,
        transcript,
    );
    let corrector =
        CorrectionService::new(client, config.models.execute.clone(), test_module, transcript);
    let runner = Arc::new(PytestRunner::new(&config.runner));

    let controller = ConvergenceController::new(
        generator,
        corrector,
        runner,
        config.convergence.clone(),
        config.generation.clone(),
    );

    let summary = controller.run(function).await?;
    report(&summary, json_mode)?;

    if !summary.converged {
        anyhow::bail!(
            "did not converge: {} correction attempt(s) and {} escalation(s) were not enough",
            summary.corrections,
            summary.escalations
        );
    }
    Ok(())
}

fn apply_overrides(config: &mut Config, args: &RunArgs) {
    if let Some(temperature) = args.temperature {
        config.convergence.base_temperature = temperature;
    }
    if let Some(model) = &args.model {
        config.models.explain.clone_from(model);
        config.models.plan.clone_from(model);
        config.models.execute.clone_from(model);
    }
    if let Some(max_attempts) = args.max_attempts {
        config.convergence.max_correction_attempts = max_attempts;
    }
    if args.stream {
        config.generation.stream = true;
    }
    if args.print_text {
        config.generation.print_text = true;
    }
}

/// Use the path as given when it exists; otherwise look under the
/// configured source root.
fn resolve_target(file: &Path, source_root: &str) -> PathBuf {
    if file.exists() {
        file.to_path_buf()
    } else {
        Path::new(source_root).join(file)
    }
}

fn report(summary: &RunSummary, json_mode: bool) -> Result<()> {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    if summary.converged {
        println!(
            "{} all tests passed after {} iteration(s), {} correction(s), {} escalation(s)",
            style("converged:").green().bold(),
            summary.iterations,
            summary.corrections,
            summary.escalations
        );
        println!("test suite: {}", summary.test_file.display());
    } else {
        println!(
            "{} {} iteration(s), {} correction(s), {} escalation(s)",
            style("did not converge:").red().bold(),
            summary.iterations,
            summary.corrections,
            summary.escalations
        );
        if let Some(failures) = &summary.failures {
            if failures.is_empty() {
                println!("last run failed without identifiable failing cases");
            } else {
                println!("last failing cases:\n{}", failures.render());
            }
        }
    }
    Ok(())
}
