//! Command implementations for the RCM CLI.
//!
//! Provides subcommands for listing the filter catalog of a store and for
//! rendering the dashboard (table view and per-parameter charts) for a
//! filter selection.

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use rcm_data::Trendline;
use rcm_db::Database;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

pub mod config;
pub mod context;
pub mod dashboard;
pub mod filters;

use config::{prompt_for_path, resolve_location, StoreLocation};
use context::{RenderContext, ViewOptions};
use dashboard::display_catalog;
use filters::FilterArgs;

/// Where to find the store.
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// Path to the SQLite database (must end in .db)
    #[arg(long = "db", env = "RCM_DB_PATH")]
    pub db: Option<String>,
}

impl StoreArgs {
    /// Resolve the store path, asking on stdin if none is configured.
    ///
    /// Returns `None` when the user leaves the prompt empty.
    pub fn path(&self) -> anyhow::Result<Option<PathBuf>> {
        match resolve_location(self.db.as_deref()) {
            StoreLocation::Path(path) => Ok(Some(path)),
            StoreLocation::Prompt => {
                let stdin = io::stdin();
                let mut input = stdin.lock();
                let mut output = io::stdout();
                prompt_for_path(&mut input, &mut output)
            }
        }
    }
}

/// Date range and trendline for the charts.
#[derive(Args, Debug, Clone)]
pub struct ViewArgs {
    /// First date to show (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last date to show (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Trendline drawn over each chart: none, loess or rolling-mean
    #[arg(long, default_value = "none")]
    pub trendline: Trendline,
}

impl From<&ViewArgs> for ViewOptions {
    fn from(args: &ViewArgs) -> Self {
        ViewOptions {
            start: args.start,
            end: args.end,
            trendline: args.trendline,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// List the values available for every filter
    Catalog {
        #[command(flatten)]
        store: StoreArgs,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Query observations for a filter selection and build the charts
    Dashboard {
        #[command(flatten)]
        store: StoreArgs,

        #[command(flatten)]
        filters: FilterArgs,

        #[command(flatten)]
        view: ViewArgs,

        /// Print the full dashboard as JSON instead of a text summary
        #[arg(long)]
        json: bool,

        /// Also write the table view to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

pub fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Catalog { store, json } => run_catalog(&store, json),
        Command::Dashboard {
            store,
            filters,
            view,
            json,
            csv,
        } => run_dashboard(&store, &filters, &view, json, csv),
    }
}

fn run_catalog(store: &StoreArgs, json: bool) -> anyhow::Result<()> {
    let Some(path) = store.path()? else {
        log::info!("No database path entered");
        return Ok(());
    };
    let db = Database::open(&path)?;
    let catalog = db.query_catalog();
    db.close()?;
    let catalog = display_catalog(&catalog?);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &catalog)?;
        writeln!(out)?;
        return Ok(());
    }

    let join = |values: Vec<String>| values.join(", ");
    writeln!(out, "AOI:              {}", join(catalog.aois))?;
    writeln!(
        out,
        "Year:             {}",
        join(catalog.years.iter().map(|y| y.to_string()).collect())
    )?;
    writeln!(out, "Crop Type:        {}", join(catalog.crop_types))?;
    writeln!(out, "Statistic:        {}", join(catalog.statistics))?;
    writeln!(out, "Acquisition Mode: {}", join(catalog.acquisitions))?;
    writeln!(out, "Product:          {}", join(catalog.products))?;
    writeln!(out, "Parameter:        {}", join(catalog.parameters))?;
    writeln!(
        out,
        "FID:              {}",
        join(catalog.fids.iter().map(|f| f.to_string()).collect())
    )?;
    Ok(())
}

fn run_dashboard(
    store: &StoreArgs,
    filters: &FilterArgs,
    view: &ViewArgs,
    json: bool,
    csv: Option<PathBuf>,
) -> anyhow::Result<()> {
    let Some(path) = store.path()? else {
        log::info!("No database path entered");
        return Ok(());
    };
    let dashboard = RenderContext::open(&path, filters)?.render(&ViewOptions::from(view))?;

    if let Some(csv_path) = csv {
        let file = File::create(&csv_path)
            .with_context(|| format!("Failed to create {}", csv_path.display()))?;
        dashboard.write_csv(BufWriter::new(file))?;
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &dashboard)?;
        writeln!(out)?;
    } else {
        dashboard.render_text(&mut out)?;
    }
    Ok(())
}
