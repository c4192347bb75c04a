//! # Invoice Form CLI
//!
//! Fill the Sterling Enterprises invoice from the command line and export it
//! as a PDF over the scanned form.
//!
//! ## Usage
//!
//! ```bash
//! # Spell an amount
//! invoice-form words 1250 75
//!
//! # Fill the draft (pages and rows count from 1)
//! invoice-form set 1 billNo SE-117
//! invoice-form item 1 1 particulars "Brass fittings"
//! invoice-form item 1 1 qty 4
//! invoice-form item 1 1 rate 1250.75
//! invoice-form show
//!
//! # Nudge the printout
//! invoice-form layout move billNo 1.5 -0.5
//! invoice-form calibrate --top 2 --left -1
//!
//! # Export
//! invoice-form export --background form.jpg --out out/
//! ```

mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Invoice form filler
#[derive(Parser, Debug)]
#[command(name = "invoice-form")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding the saved draft, layout, calibration and font
    #[arg(long, global = true, env = "INVOICE_STATE_DIR", default_value = ".invoice-state")]
    pub state: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Spell an amount in Indian English words
    Words {
        rupees: String,

        #[arg(default_value = "")]
        paise: String,
    },

    /// Print the draft
    Show {
        /// Print the saved JSON instead
        #[arg(long)]
        json: bool,
    },

    /// Set a header field or total on a page
    Set {
        page: usize,

        /// billNo, date, challanNo, dispatchThrough, poNo, ms, address1,
        /// address2, totalRs, totalP or amountWords
        field: String,

        value: String,
    },

    /// Set a line-item cell
    Item {
        page: usize,

        row: usize,

        /// sno, particulars, qty, rate, amountRs or amountP
        column: String,

        value: String,
    },

    /// Append a row to a page
    AddRow { page: usize },

    /// Remove a row from a page
    RemoveRow { page: usize, row: usize },

    /// Append an empty page
    AddPage,

    /// Remove a page (the last page is kept)
    RemovePage { page: usize },

    /// Start over with one empty page
    Clear,

    /// Inspect or tune field positions
    Layout {
        #[command(subcommand)]
        action: LayoutAction,
    },

    /// Shift the whole printout
    Calibrate(CalibrateArgs),

    /// Set the global font
    Font(FontArgs),

    /// Override the font of one field on one page
    Style {
        page: usize,

        /// Field key, e.g. billNo or col_rate
        key: String,

        /// family, size, bold or italic
        property: Option<String>,

        value: Option<String>,

        /// Drop every override of the field
        #[arg(long, conflicts_with_all = ["property", "value"])]
        clear: bool,
    },

    /// Render the draft into a PDF
    Export {
        /// Scanned form image (JPEG or PNG)
        #[arg(long, value_name = "FILE")]
        background: PathBuf,

        /// Output directory
        #[arg(long, value_name = "DIR", default_value = ".")]
        out: PathBuf,

        /// Position text with the shipped layout, ignoring tuned positions
        #[arg(long)]
        default_layout: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum LayoutAction {
    /// Print every position
    Show {
        #[arg(long)]
        json: bool,
    },

    /// Move a field by millimetres
    Move {
        key: String,

        #[arg(allow_negative_numbers = true)]
        d_left: f64,

        #[arg(allow_negative_numbers = true)]
        d_top: f64,
    },

    /// Widen or narrow a field, or change the row height with `row_height`
    Resize {
        key: String,

        #[arg(allow_negative_numbers = true)]
        delta: f64,
    },

    /// Go back to the shipped positions
    Reset,
}

#[derive(Args, Debug)]
pub struct CalibrateArgs {
    /// Vertical offset in mm (-20 to 20)
    #[arg(long, allow_negative_numbers = true)]
    pub top: Option<f64>,

    /// Horizontal offset in mm (-10 to 10)
    #[arg(long, allow_negative_numbers = true)]
    pub left: Option<f64>,

    /// Remove the offset
    #[arg(long, conflicts_with_all = ["top", "left"])]
    pub reset: bool,
}

#[derive(Args, Debug)]
pub struct FontArgs {
    #[arg(long)]
    pub family: Option<String>,

    /// Size in points (6 to 24)
    #[arg(long, value_parser = clap::value_parser!(u8).range(6..=24))]
    pub size: Option<u8>,

    #[arg(long)]
    pub bold: Option<bool>,

    #[arg(long)]
    pub italic: Option<bool>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let output = commands::run(cli)?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
