use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "apura")]
#[command(version, about = "Brazilian investment tax engine (apuração de IR)")]
#[command(
    long_about = "Compute capital gains and distribution taxes over a movement ledger: \
FIFO cost basis, day-trade detection, per-class regimes with monthly exemptions, \
and the DARF payment schedule."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Config file path (defaults to ./apura.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Movements CSV (holding, direction, quantity, price, date)
    #[arg(long, global = true)]
    pub movements: Option<PathBuf>,

    /// Distributions CSV (holding, date, gross)
    #[arg(long, global = true)]
    pub distributions: Option<PathBuf>,

    /// Holding metadata CSV (holding, type, indexer, average_cost)
    #[arg(long, global = true)]
    pub metadata: Option<PathBuf>,

    /// Reference date for due-date status (YYYY-MM-DD); defaults to the
    /// system date
    #[arg(long, global = true)]
    pub today: Option<NaiveDate>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Tax reports over the assessed ledger
    Report {
        #[command(subcommand)]
        action: ReportCommands,
    },

    /// Monthly DARF payment schedule
    Darf,

    /// Export assessed records to CSV files
    Export {
        /// Directory to write sales.csv and distributions.csv into
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Tax per sale
    Sales {
        /// Period filter: month, quarter, year, all
        #[arg(short, long, default_value = "year")]
        period: String,
    },

    /// Tax per income distribution
    Distributions {
        /// Period filter: month, quarter, year, all
        #[arg(short, long, default_value = "year")]
        period: String,
    },

    /// Sales totals grouped by asset class
    Classes {
        /// Period filter: month, quarter, year, all
        #[arg(short, long, default_value = "year")]
        period: String,
    },

    /// Consolidated annual summary
    Annual {
        /// Year to consolidate (defaults to the reference date's year)
        year: Option<i32>,
    },
}
