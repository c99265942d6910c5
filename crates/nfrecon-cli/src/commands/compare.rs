//! Compare command - reconcile two invoices against a lab report.

use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use nfrecon_core::{FileSource, MatchStatus, Reconciler, Reconciliation};

use super::config::load_config;

/// Arguments for the compare command.
#[derive(Args)]
pub struct CompareArgs {
    /// First NF-e (XML)
    invoice_a: PathBuf,

    /// Second NF-e (XML)
    invoice_b: PathBuf,

    /// Lab report (delimited text)
    lab_report: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Fail when any field does not match
    #[arg(long)]
    strict: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text table
    Text,
}

pub async fn run(args: CompareArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    // Unreadable inputs still produce a report, with empty values
    for path in [&args.invoice_a, &args.invoice_b, &args.lab_report] {
        if !path.exists() {
            eprintln!(
                "{} Input file not found: {}",
                style("⚠").yellow(),
                path.display()
            );
        }
    }

    info!(
        "Comparing {} and {} against {}",
        args.invoice_a.display(),
        args.invoice_b.display(),
        args.lab_report.display()
    );

    let reconciler = Reconciler::from_config(&config);
    let result = reconciler
        .reconcile_sources(
            &FileSource::new(&args.invoice_a),
            &FileSource::new(&args.invoice_b),
            &FileSource::new(&args.lab_report),
        )
        .await;

    let colored = args.output.is_none() && console::colors_enabled();
    let output = format_reconciliation(&result, args.format, colored)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        print!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    if args.strict && result.mismatches() > 0 {
        anyhow::bail!("{} field(s) did not match", result.mismatches());
    }

    Ok(())
}

fn format_reconciliation(
    result: &Reconciliation,
    format: OutputFormat,
    colored: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)? + "\n"),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result, colored)),
    }
}

fn format_csv(result: &Reconciliation) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["field", "invoice_a", "invoice_b", "lab_report", "status", "remarks"])?;
    for row in &result.rows {
        wtr.write_record([
            row.label(),
            row.value_a(),
            row.value_b(),
            row.value_lab(),
            row.status().as_str(),
            row.remarks(),
        ])?;
    }

    // Product summary as a trailing block with its own header
    wtr.write_record(["product_code", "manufacture_date", "expiry_date", "status", "", ""])?;
    let product = &result.product;
    wtr.write_record([
        product.product_code.as_str(),
        product.manufacture_date.as_str(),
        product.expiry_date.as_str(),
        product.status.as_str(),
        "",
        "",
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn status_cell(status: MatchStatus, width: usize, colored: bool) -> String {
    let padded = format!("{:<width$}", status.as_str());
    if !colored {
        return padded;
    }
    match status {
        MatchStatus::Ok => style(padded).green().to_string(),
        MatchStatus::Erro => style(padded).red().bold().to_string(),
        MatchStatus::NotApplicable => style(padded).dim().to_string(),
    }
}

fn format_text(result: &Reconciliation, colored: bool) -> String {
    let headers = ["Field", "Invoice A", "Invoice B", "Lab Report", "Status"];

    let mut widths = headers.map(str::len);
    for row in &result.rows {
        let cells = [row.label(), row.value_a(), row.value_b(), row.value_lab(), row.status().as_str()];
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }
    let [w_field, w_a, w_b, w_lab, w_status] = widths;

    let mut output = String::new();
    let _ = writeln!(
        output,
        "{:<w_field$}  {:<w_a$}  {:<w_b$}  {:<w_lab$}  {:<w_status$}",
        headers[0], headers[1], headers[2], headers[3], headers[4]
    );
    let _ = writeln!(output, "{}", "-".repeat(widths.iter().sum::<usize>() + 8));

    for row in &result.rows {
        let _ = writeln!(
            output,
            "{:<w_field$}  {:<w_a$}  {:<w_b$}  {:<w_lab$}  {}",
            row.label(),
            row.value_a(),
            row.value_b(),
            row.value_lab(),
            status_cell(row.status(), w_status, colored).trim_end()
        );
    }

    let product = &result.product;
    output.push('\n');
    output.push_str("Product:\n");
    let _ = writeln!(output, "  Code:          {}", product.product_code);
    let _ = writeln!(output, "  Manufactured:  {}", product.manufacture_date);
    let _ = writeln!(output, "  Expires:       {}", product.expiry_date);
    let _ = writeln!(output, "  Status:        {}", status_cell(product.status, 0, colored));

    output.push('\n');
    if result.mismatches() == 0 {
        let _ = writeln!(output, "All fields match.");
    } else {
        let _ = writeln!(output, "{} field(s) did not match.", result.mismatches());
    }

    output
}
