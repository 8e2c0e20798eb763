//! Exposure ledger report.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use percept_core::ExposureLedger;

use crate::config::ConfigLoader;

/// Ledger arguments.
#[derive(Args, Debug)]
pub struct LedgerArgs {
    /// Ledger file (overrides config)
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Only show one category
    #[arg(long)]
    pub category: Option<String>,
}

/// Print how often each item has been shown.
pub async fn run(args: LedgerArgs) -> Result<()> {
    let path = match args.file {
        Some(path) => path,
        None => ConfigLoader::load()?.quiz.tracking_file,
    };
    let ledger = ExposureLedger::load(&path).await?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Category").fg(Color::Cyan),
        Cell::new("Item").fg(Color::Cyan),
        Cell::new("Shown").fg(Color::Cyan),
        Cell::new("Participants").fg(Color::Cyan),
    ]);

    let mut rows = 0;
    for (category, item_id, record) in ledger.iter() {
        if args.category.as_deref().is_some_and(|c| c != category) {
            continue;
        }
        table.add_row(vec![
            Cell::new(category),
            Cell::new(item_id),
            Cell::new(record.shown_count()),
            Cell::new(record.shown_to().len()),
        ]);
        rows += 1;
    }

    if rows == 0 {
        println!("No exposures recorded in {}", path.display());
        return Ok(());
    }

    println!("{table}");
    println!("{} exposures in total", ledger.total_exposures());
    Ok(())
}
