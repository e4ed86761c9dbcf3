//! statboard CLI.

use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use statboard::config::PipelineConfig;
use statboard::rank::RankingRequest;
use statboard::regression::RegressionRequest;
use statboard::session::Session;
use statboard::stats::bar_series;
use statboard::storage::{write_result_parquet, Source};

mod cli;
mod logging;
mod render;

use crate::cli::{
    Cli, Command, LogFormatArg, OutputFormatArg, PreviewArgs, RankArgs, RegressArgs, SourceArgs,
    StatsArgs,
};
use crate::logging::{init_logging, LogConfig, LogFormat};

fn main() {
    let cli = Cli::parse();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    if let Err(error) = run(cli) {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}

fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig::from_flags(cli.verbose, cli.quiet);
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.with_ansi = io::stderr().is_terminal();
    config
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    match cli.command {
        Command::Rank(args) => run_rank(config, &args),
        Command::Stats(args) => run_stats(config, &args),
        Command::Regress(args) => run_regress(config, &args),
        Command::Preview(args) => run_preview(config, &args),
        Command::Metrics(args) => {
            let mut session = open_session(config, &args);
            let metrics = session.metrics()?;
            println!("{}", render::metrics_table(&metrics));
            Ok(())
        }
    }
}

fn open_session(mut config: PipelineConfig, args: &SourceArgs) -> Session {
    if let Some(sheet) = &args.sheet {
        config.sheet = Some(sheet.clone());
    }
    let mut session = Session::new(config);
    session.select_source(Source::path(&args.file));
    session
}

fn run_rank(config: PipelineConfig, args: &RankArgs) -> Result<()> {
    let mut session = open_session(config, &args.source);
    let bounds = session.config().limits;
    let request = match args.limit {
        Some(limit) => RankingRequest::new(args.metric, limit, &bounds)?,
        None => RankingRequest::with_default_limit(args.metric, &bounds),
    };

    let result = session.rank(&request)?;

    if let Some(path) = &args.export {
        write_result_parquet(&result, path)
            .with_context(|| format!("exporting ranking to {}", path.display()))?;
    }

    match args.format {
        OutputFormatArg::Json => print_json(&result)?,
        OutputFormatArg::Table => {
            if result.is_empty() {
                println!("No players have a value for {}.", request.metric.label());
                return Ok(());
            }
            println!(
                "Top {} players by {} ({} eligible)",
                result.len(),
                request.metric.label(),
                result.eligible()
            );
            println!("{}", render::ranking_table(&result));
            if args.chart {
                print!("{}", render::bar_chart(&bar_series(&result)));
            }
        }
    }
    Ok(())
}

fn run_stats(config: PipelineConfig, args: &StatsArgs) -> Result<()> {
    let mut session = open_session(config, &args.source);
    let summary = session.summarize(args.metric)?;
    match (args.format, summary) {
        (OutputFormatArg::Json, summary) => print_json(&summary)?,
        (OutputFormatArg::Table, Some(dist)) => println!("{}", render::distribution_table(&dist)),
        (OutputFormatArg::Table, None) => {
            println!("No players have a value for {}.", args.metric.label());
        }
    }
    Ok(())
}

fn run_regress(config: PipelineConfig, args: &RegressArgs) -> Result<()> {
    let request = RegressionRequest::new(args.target, args.features.clone())?;
    let mut session = open_session(config, &args.source);
    let report = session.regress(&request)?;
    match (args.format, report) {
        (OutputFormatArg::Json, report) => print_json(&report)?,
        (OutputFormatArg::Table, Some(report)) => {
            println!("{}", render::regression_table(&report));
        }
        (OutputFormatArg::Table, None) => {
            println!("Not enough complete rows to fit a model.");
        }
    }
    Ok(())
}

fn run_preview(config: PipelineConfig, args: &PreviewArgs) -> Result<()> {
    let mut session = open_session(config, &args.source);
    let metrics = session.metrics()?;
    let rows = session.preview(args.rows)?;
    match args.format {
        OutputFormatArg::Json => print_json(&rows)?,
        OutputFormatArg::Table => println!("{}", render::preview_table(&rows, &metrics)),
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serializing output")?;
    println!("{json}");
    Ok(())
}
