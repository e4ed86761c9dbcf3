//! CLI argument definitions for statboard.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use statboard::metric::Metric;

#[derive(Parser)]
#[command(
    name = "statboard",
    version,
    about = "Rank players from a statistics spreadsheet",
    long_about = "Rank players from a statistics spreadsheet.\n\n\
                  Reads .xlsx/.xls/.xlsb/.ods or .parquet files with a `name` and `rating`\n\
                  column. Tier ratings (Radiant, Immortal, Diamond, Platinum, Gold) are\n\
                  mapped to scores 5..1; rows missing the sort metric are left out."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// JSON configuration file (sheet, limit bounds, regression split).
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// More log output (-v for debug, -vv for trace).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short = 'q', long = "quiet", global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the top players by one metric.
    Rank(RankArgs),

    /// Box-plot summary of one metric.
    Stats(StatsArgs),

    /// Fit a least-squares model between metrics.
    Regress(RegressArgs),

    /// Show the first normalized rows.
    Preview(PreviewArgs),

    /// List the metrics a file can be ranked by.
    Metrics(SourceArgs),
}

#[derive(Args)]
pub struct SourceArgs {
    /// Statistics file (.xlsx, .xls, .xlsb, .ods or .parquet).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Worksheet to read (default: first sheet, or the configured one).
    #[arg(long = "sheet", value_name = "NAME")]
    pub sheet: Option<String>,
}

#[derive(Args)]
pub struct RankArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Sort metric (column name or label, e.g. kd_ratio or "KD Ratio").
    #[arg(long = "metric", short = 'm', default_value = "rating")]
    pub metric: Metric,

    /// Number of players to show (default from configuration).
    #[arg(long = "limit", short = 'n')]
    pub limit: Option<usize>,

    /// Output format.
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormatArg,

    /// Also write the ranking to a Parquet file.
    #[arg(long = "export", value_name = "PATH")]
    pub export: Option<PathBuf>,

    /// Draw a horizontal bar chart below the table.
    #[arg(long = "chart")]
    pub chart: bool,
}

#[derive(Args)]
pub struct StatsArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Metric to summarize.
    #[arg(long = "metric", short = 'm', default_value = "rating")]
    pub metric: Metric,

    /// Output format.
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormatArg,
}

#[derive(Args)]
pub struct RegressArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Metric to predict.
    #[arg(long = "target", short = 't', default_value = "rating")]
    pub target: Metric,

    /// Comma-separated explanatory metrics.
    #[arg(
        long = "features",
        short = 'f',
        value_delimiter = ',',
        required = true,
        num_args = 1..
    )]
    pub features: Vec<Metric>,

    /// Output format.
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormatArg,
}

#[derive(Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Rows to show.
    #[arg(long = "rows", default_value_t = 10)]
    pub rows: usize,

    /// Output format.
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormatArg,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    Table,
    Json,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_rank_with_label_metric() {
        let cli = Cli::parse_from([
            "statboard",
            "rank",
            "players.xlsx",
            "--metric",
            "KD Ratio",
            "-n",
            "5",
            "--chart",
        ]);
        let Command::Rank(args) = cli.command else {
            panic!("expected rank subcommand");
        };
        assert_eq!(args.metric, Metric::KdRatio);
        assert_eq!(args.limit, Some(5));
        assert!(args.chart);
        assert!(args.format == OutputFormatArg::Table);
    }

    #[test]
    fn test_parse_feature_list() {
        let cli = Cli::parse_from([
            "statboard",
            "-v",
            "regress",
            "players.xlsx",
            "--features",
            "kd_ratio,headshot_percent",
        ]);
        assert_eq!(cli.verbose, 1);
        let Command::Regress(args) = cli.command else {
            panic!("expected regress subcommand");
        };
        assert_eq!(args.target, Metric::Rating);
        assert_eq!(args.features, vec![Metric::KdRatio, Metric::HeadshotPercent]);
    }

    #[test]
    fn test_unknown_metric_rejected() {
        assert!(Cli::try_parse_from(["statboard", "stats", "p.xlsx", "--metric", "elo"]).is_err());
    }
}
