use crate::cli::GenerateArgs;
use crate::config::build_config;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use molpolarity::{
    engine::{progress::ProgressReporter, tools::SystemToolRunner},
    workflows,
};
use tracing::{info, warn};

pub async fn run(args: GenerateArgs) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let config = build_config(&args)?;

    info!(
        "Input: {:?}, output: {:?}, scratch: {:?}",
        config.paths.input_dir, config.paths.output_dir, config.paths.scratch_dir
    );

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Generating polarity data for {} molecule(s)...",
        config.molecules.len()
    );
    info!("Invoking the core generate workflow...");

    let report = tokio::task::block_in_place(|| {
        workflows::generate::run_batch(&config, &SystemToolRunner, &reporter)
    })?;

    println!(
        "✓ Wrote {} record(s) and the aggregate dataset to: {}",
        report.records.len(),
        report.aggregate_path.display()
    );

    if !report.failures.is_empty() {
        warn!(
            "{} molecule(s) failed and were left out of the aggregate.",
            report.failures.len()
        );
        println!("Skipped {} molecule(s):", report.failures.len());
        for failure in &report.failures {
            println!("  ✗ {}: {}", failure.name, failure.error);
        }
    }

    Ok(())
}
