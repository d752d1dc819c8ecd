mod cli;

use anyhow::{anyhow, Result};
use chrono::{Datelike, NaiveDate};
use clap::Parser;
use std::collections::HashMap;

use apura::importers::{read_distributions, read_metadata, read_movements};
use apura::reports::{self, Period};
use apura::tax::{self, NoLookup, TaxAssessment};
use apura::utils::format_currency;
use apura::{config, error};

use cli::{Cli, Commands, ReportCommands};

fn main() -> error::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }

    let json = cli.json;
    let (assessment, today) = load_assessment(&cli)?;

    match cli.command {
        Commands::Report { action } => match action {
            ReportCommands::Sales { period } => {
                let period = parse_period(&period)?;
                let records: Vec<_> = assessment
                    .records
                    .iter()
                    .filter(|r| period.contains(r.disposal.date, today))
                    .cloned()
                    .collect();
                if json {
                    println!("{}", serde_json::to_string_pretty(&records)?);
                } else {
                    print_banner(&assessment);
                    println!("{}", reports::sales_table(&records));
                }
            }
            ReportCommands::Distributions { period } => {
                let period = parse_period(&period)?;
                let records: Vec<_> = assessment
                    .distribution_records
                    .iter()
                    .filter(|r| period.contains(r.date, today))
                    .cloned()
                    .collect();
                if json {
                    println!("{}", serde_json::to_string_pretty(&records)?);
                } else {
                    print_banner(&assessment);
                    println!("{}", reports::distributions_table(&records));
                }
            }
            ReportCommands::Classes { period } => {
                let period = parse_period(&period)?;
                let records: Vec<_> = assessment
                    .records
                    .iter()
                    .filter(|r| period.contains(r.disposal.date, today))
                    .cloned()
                    .collect();
                let summaries = reports::sales_by_class(&records);
                if json {
                    println!("{}", serde_json::to_string_pretty(&summaries)?);
                } else {
                    print_banner(&assessment);
                    println!("{}", reports::class_summary_table(&summaries));
                }
            }
            ReportCommands::Annual { year } => {
                let year = year.unwrap_or_else(|| today.year());
                let summary = tax::summarize(
                    year,
                    &assessment.records,
                    &assessment.distribution_records,
                );
                if json {
                    println!("{}", serde_json::to_string_pretty(&summary)?);
                } else {
                    print_banner(&assessment);
                    println!("{}", reports::annual_summary_text(&summary));
                }
            }
        },

        Commands::Darf => {
            if json {
                println!("{}", serde_json::to_string_pretty(&assessment.obligations)?);
            } else {
                print_banner(&assessment);
                println!("{}", reports::darf_table(&assessment.obligations, today));
                if let Some(next) = tax::next_obligation(&assessment.obligations, today) {
                    println!(
                        "Next DARF: {} due {} ({})",
                        format_currency(next.total),
                        next.due_date,
                        next.status(today).label()
                    );
                }
            }
        }

        Commands::Export { out_dir } => {
            std::fs::create_dir_all(&out_dir)?;
            let sales_path = out_dir.join("sales.csv");
            std::fs::write(&sales_path, reports::sales_csv(&assessment.records)?)?;
            let distributions_path = out_dir.join("distributions.csv");
            std::fs::write(
                &distributions_path,
                reports::distributions_csv(&assessment.distribution_records)?,
            )?;
            println!(
                "wrote {} and {}",
                sales_path.display(),
                distributions_path.display()
            );
        }
    }

    Ok(())
}

fn parse_period(s: &str) -> Result<Period> {
    Period::parse(s)
        .ok_or_else(|| anyhow!("invalid period '{s}' (expected month, quarter, year or all)"))
}

fn print_banner(assessment: &TaxAssessment) {
    if let Some(banner) = reports::skipped_banner(&assessment.skipped) {
        println!("{banner}");
    }
}

/// Read the input files named by flags/config and run the assessment.
/// Import-level skipped rows are merged into the assessment's skipped
/// list so the banner covers both layers.
fn load_assessment(cli: &Cli) -> Result<(TaxAssessment, NaiveDate)> {
    let config = config::load(cli.config.as_deref())?;

    let movements_path = cli
        .movements
        .clone()
        .or(config.movements)
        .ok_or_else(|| anyhow!("no movements file; pass --movements or set it in apura.toml"))?;
    let today = cli
        .today
        .or(config.today)
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let imported = read_movements(&movements_path)?;
    let movements = imported.items;
    let mut import_skipped = imported.skipped;

    let distributions = match cli.distributions.clone().or(config.distributions) {
        Some(path) => {
            let imported = read_distributions(path)?;
            import_skipped.extend(imported.skipped);
            imported.items
        }
        None => Vec::new(),
    };

    let metadata = match cli.metadata.clone().or(config.metadata) {
        Some(path) => {
            let imported = read_metadata(path)?;
            import_skipped.extend(imported.skipped);
            imported.items
        }
        None => HashMap::new(),
    };

    let mut assessment = tax::assess(&movements, &distributions, &metadata, &NoLookup);
    assessment.skipped.extend(import_skipped);

    Ok((assessment, today))
}
