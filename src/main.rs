//! foodrec - Food inventory tracker
//!
//! Tracks best-by dates of perishable food in a local SQLite database.

use clap::{Parser, Subcommand};
use foodrec::{commands, ItemStore, OutputFormat, Result, TesseractOcr};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

/// Food inventory tracker - records best-by dates and flags items expiring soon
#[derive(Parser, Debug)]
#[command(name = "foodrec")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    #[arg(short, long, global = true, default_value_t = default_db_path())]
    database: String,

    /// OCR executable used by `scan`
    #[arg(long, global = true, default_value = foodrec::ocr::DEFAULT_PROGRAM)]
    ocr_program: String,

    /// Tesseract page segmentation mode used by `scan`
    #[arg(long, global = true, default_value_t = foodrec::ocr::DEFAULT_PAGE_SEGMENTATION_MODE)]
    psm: u8,

    /// Seconds before a running OCR process is killed (0 = no limit)
    #[arg(long, global = true, default_value_t = foodrec::ocr::DEFAULT_TIMEOUT.as_secs())]
    ocr_timeout: u64,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Add an item with a best-by date (YYYY-MM-DD, MM/DD/YYYY or DD/MM/YYYY)
    Add { name: String, date: String },
    /// Read the best-by date from a package photo and add the item
    Scan { image: PathBuf, name: String },
    /// List all items, soonest best-by first
    List {
        /// Print items as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show items expiring within the next few days
    Check {
        /// Print items as JSON
        #[arg(long)]
        json: bool,
    },
    /// Suggest recipes for items about to expire (not implemented)
    Suggest,
}

/// Returns the default database path: ~/.local/share/foodrec/foodrec.db
fn default_db_path() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("foodrec")
        .join("foodrec.db")
        .to_string_lossy()
        .to_string()
}

fn output_format(json: bool) -> OutputFormat {
    if json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    }
}

fn main() {
    // Set RUST_LOG to control log level, e.g. RUST_LOG=foodrec=debug
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            // Help and version requests are not failures
            std::process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };

    if let Err(e) = run(args) {
        log::debug!("Command failed: {:?}", e);
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let db_path = PathBuf::from(&args.database);
    let store = ItemStore::open(&db_path)?;
    log::info!("Database path: {}", db_path.display());

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match args.command {
        Cmd::Add { name, date } => {
            commands::add(&store, &name, &date, &mut out)?;
        }
        Cmd::Scan { image, name } => {
            let timeout = (args.ocr_timeout > 0).then(|| Duration::from_secs(args.ocr_timeout));
            let ocr = TesseractOcr::new(args.ocr_program)
                .with_page_segmentation_mode(args.psm)
                .with_timeout(timeout);
            commands::scan(&store, &ocr, &image, &name, &mut out)?;
        }
        Cmd::List { json } => commands::list(&store, output_format(json), &mut out)?,
        Cmd::Check { json } => {
            commands::check(&store, &chrono::Local::now(), output_format(json), &mut out)?;
        }
        Cmd::Suggest => commands::suggest(&mut out)?,
    }

    out.flush()?;
    Ok(())
}
