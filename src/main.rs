use indicatif::{ProgressBar, ProgressStyle};
use lexsum::{
    config::PipelineConfig, llm::OllamaGenerator, pipeline::CasePipeline, runner::QueryRunner,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::error;

/// The main entry point of the application.
///
/// This function initializes logging, loads the configuration, processes
/// command line arguments, and runs one search-and-summarize query against
/// the case-law source, rendering the per-case summaries as a report.
///
/// # Returns
///
/// A `Result` indicating the success or failure of the operation.
fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load configuration
    let mut config = PipelineConfig::load();

    // Get query from command line arguments
    let query = match std::env::args().nth(1) {
        Some(query) => query,
        None => {
            eprintln!("Usage: lexsum <legal query> [model]");
            std::process::exit(2);
        }
    };

    if let Some(model) = std::env::args().nth(2) {
        config.generation.model = model;
    }

    let start_time = Instant::now();

    // Wire the pipeline: one generator handle, one runner
    let generator = Arc::new(OllamaGenerator::new(&config.generation)?);
    let pipeline = CasePipeline::new(&config, generator)?;
    let runner = QueryRunner::new(pipeline)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner.set_message(format!("Fetching results for '{}'...", query));

    let outcome = runner.run_query(&query);
    spinner.finish_and_clear();

    match outcome? {
        None => {
            error!("No results found for '{}'", query);
        }
        Some(summaries) => {
            let elapsed = start_time.elapsed();

            println!("\n=== Overall Insights for Lawyers ===");
            println!("Query: {}", query);
            println!("Cases analyzed: {}", summaries.len());
            println!("Processing time: {:.2?}", elapsed);

            for case in &summaries {
                println!("\n### {}\n\n{}", case.title, case.summary);
            }
        }
    }

    Ok(())
}
