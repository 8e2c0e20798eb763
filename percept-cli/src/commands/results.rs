//! Participation summary over the results file.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use percept_core::{Catalog, ResultSchema, ResultsStore};

use crate::config::ConfigLoader;

/// Results arguments.
#[derive(Args, Debug)]
pub struct ResultsArgs {
    /// Results CSV (overrides config)
    #[arg(long)]
    pub file: Option<PathBuf>,
}

/// Print participant count, mean age and gender breakdown.
pub async fn run(args: ResultsArgs) -> Result<()> {
    let path = match args.file {
        Some(path) => path,
        None => ConfigLoader::load()?.quiz.results_file,
    };
    // the summary only reads named participant columns
    let store = ResultsStore::new(path.clone(), ResultSchema::from_catalog(&Catalog::default()));
    let summary = store.summary().await?;

    if summary.participants == 0 {
        println!("No completed sessions in {}", path.display());
        return Ok(());
    }

    println!("Participants: {}", summary.participants);
    match summary.average_age {
        Some(age) => println!("Average age:  {:.1}", age),
        None => println!("Average age:  n/a"),
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Gender").fg(Color::Cyan),
        Cell::new("Participants").fg(Color::Cyan),
    ]);
    for (gender, count) in &summary.genders {
        table.add_row(vec![Cell::new(gender), Cell::new(count)]);
    }

    println!("{table}");
    Ok(())
}
