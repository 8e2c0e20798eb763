//! Dataset inspection and maintenance commands.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use percept_core::{Catalog, prune_category};

use crate::config::ConfigLoader;

/// Catalog arguments.
#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Dataset root directory (overrides config)
    #[arg(short, long, global = true)]
    pub dataset: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CatalogCommands,
}

/// Catalog subcommands.
#[derive(Subcommand, Debug)]
pub enum CatalogCommands {
    /// List categories with item counts and answer settings
    List,
    /// Trim a category to its first N metadata entries and delete unused images
    Prune {
        /// Category directory name under the dataset root
        category: String,

        /// Number of entries to keep
        #[arg(short, long)]
        keep: usize,

        /// Report what would change without touching files
        #[arg(long)]
        dry_run: bool,
    },
}

/// Run catalog command.
pub fn run(args: CatalogArgs) -> Result<()> {
    let mut config = ConfigLoader::load()?.quiz;
    if let Some(dataset) = args.dataset {
        config.dataset_root = dataset;
    }

    match args.command {
        CatalogCommands::List => {
            let catalog = Catalog::load(&config)?;
            if catalog.is_empty() {
                println!(
                    "No categories with items found under {}",
                    config.dataset_root.display()
                );
                return Ok(());
            }

            let mut table = Table::new();
            table.load_preset(UTF8_FULL_CONDENSED);
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec![
                Cell::new("Category").fg(Color::Cyan),
                Cell::new("Items").fg(Color::Cyan),
                Cell::new("Answer field").fg(Color::Cyan),
                Cell::new("Options").fg(Color::Cyan),
            ]);

            for category in catalog.categories() {
                table.add_row(vec![
                    Cell::new(category.name()),
                    Cell::new(category.len()),
                    Cell::new(config.answer_field(category.name())),
                    Cell::new(config.options_for(category.name()).join(" ")),
                ]);
            }

            println!("{table}");
            println!(
                "{} items across {} categories",
                catalog.len(),
                catalog.categories().len()
            );
            Ok(())
        }
        CatalogCommands::Prune {
            category,
            keep,
            dry_run,
        } => {
            let dir = config.dataset_root.join(&category);
            if !dir.is_dir() {
                bail!("Category directory {} not found", dir.display());
            }

            let report = prune_category(&dir, keep, dry_run)?;
            let verb = if dry_run { "Would remove" } else { "Removed" };
            println!("Kept {} entries in {}", report.kept.len(), category);
            println!("{} {} metadata entries", verb, report.dropped_entries.len());
            println!("{} {} image files", verb, report.removed_files.len());
            for path in &report.removed_files {
                println!("  {}", path.display());
            }
            Ok(())
        }
    }
}
