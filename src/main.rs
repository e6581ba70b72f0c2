//! scanfilter - remove specks and gray smudges from scanned pages
//!
//! CLI entry point

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use scanfilter::{
    exit_codes,
    // CLI
    CleanArgs, Cli, Commands, InfoArgs, SUPPORTED_EXTENSIONS,
    // Config
    Config, ConfigError,
    // Pipeline
    PipelineConfig, PipelineError, SheetOutcome, SheetPipeline, SheetReport, SheetTask,
};
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Clean(args) => {
            init_logging(args.verbose, args.quiet);
            run_clean(&args)
        }
        Commands::Info(args) => {
            init_logging(0, false);
            run_info(&args)
        }
    };

    std::process::exit(match result {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_code_for(&e)
        }
    });
}

/// `RUST_LOG` wins; otherwise the level follows `-v` / `-q`
fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn exit_code_for(error: &anyhow::Error) -> i32 {
    if let Some(e) = error.downcast_ref::<PipelineError>() {
        return match e {
            PipelineError::ImageNotFound(_) => exit_codes::INPUT_NOT_FOUND,
            PipelineError::Filter(_) => exit_codes::INVALID_ARGS,
            _ => exit_codes::GENERAL_ERROR,
        };
    }
    if error.downcast_ref::<ConfigError>().is_some() {
        return exit_codes::INVALID_ARGS;
    }
    exit_codes::GENERAL_ERROR
}

// ============ Clean Command ============

fn run_clean(args: &CleanArgs) -> anyhow::Result<()> {
    let start_time = Instant::now();

    if !args.input.exists() {
        return Err(PipelineError::ImageNotFound(args.input.clone()).into());
    }

    let file_config = load_config(args.config.as_deref())?;
    let pipeline_config = file_config.merge_with_cli(&args.overrides());
    let pipeline = SheetPipeline::new(pipeline_config)?;

    let tasks = collect_tasks(&args.input, &args.output)?;
    if tasks.is_empty() {
        return Err(PipelineError::ImageNotFound(args.input.clone()))
            .context("No supported images found in input directory");
    }

    if args.dry_run {
        print_execution_plan(args, &tasks, pipeline.config());
        return Ok(());
    }

    let outcomes = if args.input.is_dir() {
        std::fs::create_dir_all(&args.output)
            .with_context(|| format!("Failed to create {}", args.output.display()))?;
        run_batch(&pipeline, &tasks, args.quiet || args.json)?
    } else {
        let task = &tasks[0];
        vec![SheetOutcome {
            task: task.clone(),
            result: pipeline.process_file(&task.input, &task.output),
        }]
    };

    let mut reports: Vec<&SheetReport> = Vec::new();
    let mut failures: Vec<(&SheetTask, &PipelineError)> = Vec::new();
    for outcome in &outcomes {
        match &outcome.result {
            Ok(report) => reports.push(report),
            Err(e) => failures.push((&outcome.task, e)),
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else if !args.quiet {
        print_summary(&reports, failures.len(), start_time.elapsed().as_secs_f64());
    }

    // A single page keeps its own error so the exit code reflects it
    if args.input.is_file() {
        if let Some(outcome) = outcomes.into_iter().next() {
            outcome.result?;
        }
        return Ok(());
    }

    for (task, e) in &failures {
        eprintln!("Error processing {}: {}", task.input.display(), e);
    }
    if !failures.is_empty() {
        bail!("{} file(s) failed to process", failures.len());
    }

    Ok(())
}

fn run_batch(
    pipeline: &SheetPipeline,
    tasks: &[SheetTask],
    hide_progress: bool,
) -> anyhow::Result<Vec<SheetOutcome>> {
    let bar = if hide_progress {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(tasks.len() as u64)
    };
    if let Ok(style) = ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {wide_msg}") {
        bar.set_style(style);
    }

    let outcomes = pipeline.process_batch(tasks, |outcome| {
        if let Some(name) = outcome.task.input.file_name() {
            bar.set_message(name.to_string_lossy().into_owned());
        }
        bar.inc(1);
    })?;

    bar.finish_and_clear();
    Ok(outcomes)
}

// ============ Helper Functions ============

/// An explicit path must load; a broken default config falls back to defaults
fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Ok(Config::load_from_path(path)?),
        None => Ok(Config::load().unwrap_or_else(|e| {
            warn!(error = %e, "Ignoring config file");
            Config::default()
        })),
    }
}

fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Pair each input image with its output path.
///
/// A directory input maps every supported image to the same file name under
/// `output`, sorted by name.
fn collect_tasks(input: &Path, output: &Path) -> anyhow::Result<Vec<SheetTask>> {
    if input.is_file() {
        return Ok(vec![SheetTask::new(input, output)]);
    }

    let mut images: Vec<PathBuf> = Vec::new();
    for entry in std::fs::read_dir(input)
        .with_context(|| format!("Failed to read {}", input.display()))?
    {
        let path = entry?.path();
        if path.is_file() && is_supported_image(&path) {
            images.push(path);
        }
    }
    images.sort();

    Ok(images
        .into_iter()
        .filter_map(|path| {
            let name = path.file_name()?.to_owned();
            Some(SheetTask::new(path, output.join(name)))
        })
        .collect())
}

/// Print execution plan for dry-run mode
fn print_execution_plan(args: &CleanArgs, tasks: &[SheetTask], config: &PipelineConfig) {
    let params = &config.params;

    println!("=== Dry Run - Execution Plan ===");
    println!();
    println!("Input: {}", args.input.display());
    println!("Output: {}", args.output.display());
    println!("Files to process: {}", tasks.len());
    println!();
    println!("Thresholds:");
    println!("  Black: {}", params.black_threshold);
    println!("  White: {}", params.white_threshold);
    println!();
    println!("Filters:");
    if params.noisefilter {
        println!("  1. Noise Filter (intensity: {}): ENABLED", params.noisefilter_intensity);
    } else {
        println!("  1. Noise Filter: DISABLED");
    }
    if params.grayfilter {
        println!(
            "  2. Gray Filter (size: {}x{}, step: {}x{}, threshold: {}): ENABLED",
            params.grayfilter_size.horizontal,
            params.grayfilter_size.vertical,
            params.grayfilter_step.horizontal,
            params.grayfilter_step.vertical,
            params.grayfilter_threshold
        );
    } else {
        println!("  2. Gray Filter: DISABLED");
    }
    println!();
    println!("Processing Options:");
    println!("  Threads: {}", config.effective_threads());
    match config.pixel_format {
        Some(format) => println!("  Pixel format: {}", format.name()),
        None => println!("  Pixel format: same as input"),
    }
    println!("  Overwrite: {}", if config.overwrite { "YES" } else { "NO" });
    println!();
    println!("Files:");
    for (i, task) in tasks.iter().enumerate() {
        let note = if task.output.exists() && !config.overwrite {
            " (output exists)"
        } else {
            ""
        };
        println!(
            "  {}. {} -> {}{}",
            i + 1,
            task.input.display(),
            task.output.display(),
            note
        );
    }
}

fn print_summary(reports: &[&SheetReport], error_count: usize, elapsed: f64) {
    for report in reports {
        let mut parts = Vec::new();
        if let Some(n) = report.clean.noise_clusters {
            parts.push(format!("{} noise clusters", n));
        }
        if let Some(n) = report.clean.gray_pixels {
            parts.push(format!("{} gray pixels", n));
        }
        if parts.is_empty() {
            parts.push("no filters".to_string());
        }
        println!(
            "{}: {} ({:.2}s)",
            report.output.display(),
            parts.join(", "),
            report.elapsed_seconds
        );
    }

    println!();
    println!("{}", "=".repeat(60));
    println!("  Succeeded:    {}", reports.len());
    println!("  Errors:       {}", error_count);
    println!("  Total time:   {:.2}s", elapsed);
    println!("{}", "=".repeat(60));
}

// ============ Info Command ============

fn run_info(args: &InfoArgs) -> anyhow::Result<()> {
    println!("scanfilter v{}", env!("CARGO_PKG_VERSION"));
    println!();

    println!("System Information:");
    println!("  Platform: {}", std::env::consts::OS);
    println!("  Arch: {}", std::env::consts::ARCH);
    println!("  CPUs: {}", num_cpus::get());

    println!();
    println!("Config File Locations:");
    if let Some(path) = &args.config {
        println!("  Explicit: {}", path.display());
    }
    for path in Config::search_paths() {
        let status = if path.is_file() { "found" } else { "not found" };
        println!("  {} ({})", path.display(), status);
    }

    let config = load_config(args.config.as_deref())?;
    let effective = config.merge_with_cli(&Default::default());
    println!();
    println!("Effective Settings:");
    println!("{}", effective.to_json());

    Ok(())
}
