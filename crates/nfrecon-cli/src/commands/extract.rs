//! Extract command - dump the fields read from a single document.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Subcommand};
use tracing::info;

use nfrecon_core::{
    DocumentExtractor, ExpiryCalculator, FileSource, InvoiceExtractor, LabReportExtractor,
    TextEncoding, TextSource,
};

use super::config::load_config;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    #[command(subcommand)]
    command: ExtractCommand,
}

#[derive(Subcommand)]
enum ExtractCommand {
    /// Extract an NF-e (XML)
    Invoice {
        /// Input file
        file: PathBuf,
    },

    /// Extract a lab report (delimited text)
    Lab {
        /// Input file
        file: PathBuf,
    },
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let json = match args.command {
        ExtractCommand::Invoice { file } => {
            let text = read(&file, TextEncoding::Default).await?;
            let extractor = InvoiceExtractor::new().with_tags(config.invoice);
            let record = extractor
                .try_extract(&text)
                .with_context(|| format!("Failed to extract invoice {}", file.display()))?;
            serde_json::to_string_pretty(&record)?
        }
        ExtractCommand::Lab { file } => {
            let text = read(&file, TextEncoding::Utf8).await?;
            let extractor = LabReportExtractor::new()
                .with_expiry_calculator(ExpiryCalculator::from_config(&config.shelf_life));
            let record = extractor
                .try_extract(&text)
                .with_context(|| format!("Failed to extract lab report {}", file.display()))?;
            serde_json::to_string_pretty(&record)?
        }
    };

    println!("{}", json);

    Ok(())
}

async fn read(path: &Path, encoding: TextEncoding) -> anyhow::Result<String> {
    info!("Reading {}", path.display());
    FileSource::new(path)
        .read_as_text(encoding)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}
