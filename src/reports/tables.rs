//! Terminal table rendering
//!
//! Separates presentation from the computed records: every function takes
//! finished tax records and returns a printable string.

use colored::Colorize;
use rust_decimal::Decimal;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

use crate::tax::{
    AnnualSummary, DistributionTaxRecord, ObligationStatus, SkippedItem, TaxObligation, TaxRecord,
};
use crate::utils::{format_currency, format_rate};
use chrono::NaiveDate;

fn signed_currency(value: Decimal) -> String {
    if value >= Decimal::ZERO {
        format_currency(value).green().to_string()
    } else {
        format_currency(value).red().to_string()
    }
}

/// Per-disposal tax table
pub fn sales_table(records: &[TaxRecord]) -> String {
    #[derive(Tabled)]
    struct Row {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Holding")]
        holding: String,
        #[tabled(rename = "Class")]
        class: String,
        #[tabled(rename = "Qty")]
        quantity: String,
        #[tabled(rename = "Sale Price")]
        price: String,
        #[tabled(rename = "Cost Basis")]
        cost: String,
        #[tabled(rename = "Profit")]
        profit: String,
        #[tabled(rename = "DT")]
        day_trade: String,
        #[tabled(rename = "Rate")]
        rate: String,
        #[tabled(rename = "Tax")]
        tax: String,
        #[tabled(rename = "Note")]
        note: String,
    }

    let rows: Vec<Row> = records
        .iter()
        .map(|r| Row {
            date: r.disposal.date.to_string(),
            holding: r.disposal.holding.clone(),
            class: r.disposal.asset_class.as_str().to_string(),
            quantity: r.disposal.quantity.normalize().to_string(),
            price: format_currency(r.disposal.sale_price),
            cost: r
                .disposal
                .cost_basis
                .map(format_currency)
                .unwrap_or_else(|| "N/A".to_string()),
            profit: r
                .disposal
                .profit
                .map(signed_currency)
                .unwrap_or_else(|| "N/A".to_string()),
            day_trade: if r.disposal.day_trade { "yes" } else { "" }.to_string(),
            rate: if r.exempt {
                "exempt".to_string()
            } else {
                format_rate(r.rate)
            },
            tax: format_currency(r.tax),
            note: r.reason.map(|reason| reason.to_string()).unwrap_or_default(),
        })
        .collect();

    let total: Decimal = records.iter().map(|r| r.tax).sum();
    let exempt_profit: Decimal = records
        .iter()
        .filter(|r| r.exempt)
        .filter_map(|r| r.disposal.profit)
        .sum();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.modify(Columns::new(3..=9), Alignment::right());

    let mut output = table.to_string();
    output.push_str(&format!(
        "\n\n{:<22} {}",
        "Tax on sales:".bold(),
        format_currency(total)
    ));
    if exempt_profit > Decimal::ZERO {
        output.push_str(&format!(
            "\n{:<22} {}",
            "Exempt profit:".bold(),
            format_currency(exempt_profit)
        ));
    }
    output.push('\n');
    output
}

/// Per-distribution tax table
pub fn distributions_table(records: &[DistributionTaxRecord]) -> String {
    #[derive(Tabled)]
    struct Row {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Holding")]
        holding: String,
        #[tabled(rename = "Class")]
        class: String,
        #[tabled(rename = "Gross")]
        gross: String,
        #[tabled(rename = "Rate")]
        rate: String,
        #[tabled(rename = "Tax")]
        tax: String,
        #[tabled(rename = "Net")]
        net: String,
        #[tabled(rename = "Note")]
        note: String,
    }

    let rows: Vec<Row> = records
        .iter()
        .map(|r| Row {
            date: r.date.to_string(),
            holding: r.holding.clone(),
            class: r.asset_class.as_str().to_string(),
            gross: format_currency(r.gross),
            rate: if r.exempt {
                "exempt".to_string()
            } else {
                format_rate(r.rate)
            },
            tax: format_currency(r.tax),
            net: format_currency(r.net),
            note: r.reason.map(|reason| reason.to_string()).unwrap_or_default(),
        })
        .collect();

    let total: Decimal = records.iter().map(|r| r.tax).sum();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.modify(Columns::new(3..=6), Alignment::right());

    let mut output = table.to_string();
    output.push_str(&format!(
        "\n\n{:<22} {}\n",
        "Tax on distributions:".bold(),
        format_currency(total)
    ));
    output
}

fn status_cell(status: ObligationStatus) -> String {
    match status {
        ObligationStatus::Overdue { days } => {
            format!("{} ({days}d ago)", status.label()).red().bold().to_string()
        }
        ObligationStatus::DueToday => status.label().yellow().bold().to_string(),
        ObligationStatus::DueSoon { days } => {
            format!("{} (in {days}d)", status.label()).yellow().to_string()
        }
        ObligationStatus::Pending { days } => format!("{} (in {days}d)", status.label()),
    }
}

/// Monthly DARF obligations
pub fn darf_table(obligations: &[TaxObligation], today: NaiveDate) -> String {
    #[derive(Tabled)]
    struct Row {
        #[tabled(rename = "Due Month")]
        month: String,
        #[tabled(rename = "Due Date")]
        due_date: String,
        #[tabled(rename = "Records")]
        records: usize,
        #[tabled(rename = "Amount")]
        amount: String,
        #[tabled(rename = "Status")]
        status: String,
    }

    if obligations.is_empty() {
        return "No payment obligations for the period.\n".to_string();
    }

    let rows: Vec<Row> = obligations
        .iter()
        .map(|o| Row {
            month: o.due_month.to_string(),
            due_date: o.due_date.to_string(),
            records: o.records.len(),
            amount: format_currency(o.total),
            status: status_cell(o.status(today)),
        })
        .collect();

    let total: Decimal = obligations.iter().map(|o| o.total).sum();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.modify(Columns::new(2..=3), Alignment::right());

    let mut output = table.to_string();
    output.push_str(&format!(
        "\n\n{:<22} {}\n",
        "Total outstanding:".bold(),
        format_currency(total)
    ));
    output
}

/// Per-class sales summary table
pub fn class_summary_table(summaries: &[super::ClassSummary]) -> String {
    #[derive(Tabled)]
    struct Row {
        #[tabled(rename = "Class")]
        class: String,
        #[tabled(rename = "Sales")]
        count: usize,
        #[tabled(rename = "Proceeds")]
        proceeds: String,
        #[tabled(rename = "Profit")]
        profit: String,
        #[tabled(rename = "Tax")]
        tax: String,
        #[tabled(rename = "Exempt Profit")]
        exempt: String,
    }

    let rows: Vec<Row> = summaries
        .iter()
        .map(|s| Row {
            class: s.asset_class.as_str().to_string(),
            count: s.count,
            proceeds: format_currency(s.proceeds),
            profit: signed_currency(s.profit),
            tax: format_currency(s.tax),
            exempt: format_currency(s.exempt_profit),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.modify(Columns::new(1..), Alignment::right());
    table.to_string()
}

/// Consolidated annual summary
pub fn annual_summary_text(summary: &AnnualSummary) -> String {
    let mut output = format!("{} {}\n\n", "Annual summary".bold(), summary.year);

    output.push_str(&format!(
        "Sales: {} operations, proceeds {}, profit {}\n",
        summary.disposals.count,
        format_currency(summary.disposals.proceeds),
        format_currency(summary.disposals.profit),
    ));
    output.push_str(&format!(
        "  Tax on sales:        {}\n",
        format_currency(summary.disposals.tax)
    ));
    output.push_str(&format!(
        "  Exempt profit:       {}\n",
        format_currency(summary.disposals.exempt_profit)
    ));
    output.push_str(&format!(
        "Distributions: {} events, gross {}, net {}\n",
        summary.distributions.count,
        format_currency(summary.distributions.gross),
        format_currency(summary.distributions.net),
    ));
    output.push_str(&format!(
        "  Tax on distributions: {}\n",
        format_currency(summary.distributions.tax)
    ));
    output.push_str(&format!(
        "\n{:<22} {}\n",
        "Total tax due:".bold(),
        format_currency(summary.total_tax)
    ));
    output
}

/// Summary banner for excluded rows, so totals read as a lower bound
pub fn skipped_banner(skipped: &[SkippedItem]) -> Option<String> {
    if skipped.is_empty() {
        return None;
    }

    let mut banner = format!(
        "{} {} input row(s) excluded; totals are a lower bound:\n",
        "warning:".yellow().bold(),
        skipped.len()
    );
    for item in skipped {
        match item.row {
            Some(row) => banner.push_str(&format!(
                "  - {} row {}: {}\n",
                item.context, row, item.reason
            )),
            None => banner.push_str(&format!("  - {}: {}\n", item.context, item.reason)),
        }
    }
    Some(banner)
}
