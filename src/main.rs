// src/main.rs
use anyhow::{Context, Result};
use clap::Parser;
use colorful::Colorful;
use log::debug;

use mosstat::cli::{self, Args};
use mosstat::pipeline;

fn main() {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.log_level())
        .parse_env("RUST_LOG")
        .format_timestamp(None)
        .init();

    if let Err(e) = run(&args) {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let config = args.build_config()?;
    debug!("configuration: {:?}", config);

    if args.dump_config {
        println!("{}", config.to_json()?);
        return Ok(());
    }

    let paths = args.paths();
    let summary = pipeline::run(&config, &paths, args.options())
        .with_context(|| format!("Failed to process {}", paths.input_dir.display()))?;

    if summary.input.files.is_empty() {
        println!(
            "{}",
            format!("No CSV files found in {}", paths.input_dir.display()).yellow()
        );
        return Ok(());
    }

    print!(
        "{}",
        cli::format_run(&summary, &config.confidence_label(), args.verbose > 0)
    );
    println!(
        "\nSaved result as {}",
        paths.summary_file.display().to_string().cyan()
    );
    if summary.written.len() > 1 {
        println!(
            "Analysis written to {} ({} file(s))",
            paths.analysis_dir.display().to_string().cyan(),
            summary.written.len()
        );
    }
    Ok(())
}
