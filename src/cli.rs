//! CLI argument definitions
//!
//! Parsed with clap derive; the command bodies live in the binary.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

use crate::classify::PageType;

/// Process exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    InvalidArgs = 2,
    InputNotFound = 3,
    ValidationFailed = 4,
}

impl ExitCode {
    /// Numeric process exit code
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Human-readable description
    pub fn description(self) -> &'static str {
        match self {
            ExitCode::Success => "Success",
            ExitCode::GeneralError => "General error",
            ExitCode::InvalidArgs => "Invalid arguments",
            ExitCode::InputNotFound => "Input not found",
            ExitCode::ValidationFailed => "Numbering validation failed",
        }
    }
}

/// Scanned book page classifier and pagination sequencer
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors and hide progress bars
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify scanned images and number the pages
    Classify(ClassifyArgs),
    /// Re-run automatic numbering on a saved catalog
    Number(CatalogArgs),
    /// Renumber from one image onwards
    Renumber(RenumberArgs),
    /// Tag one image with an exception suffix ("bis", "ter", ...)
    Exception(ExceptionArgs),
    /// Give one image a number not printed on the page
    Phantom(PhantomArgs),
    /// Manually edit record fields
    Set(SetArgs),
    /// Check the numbering sequence
    Validate(ValidateArgs),
    /// List exception suffixes found in filenames
    Exceptions(CatalogArgs),
    /// Print derived export and rename names
    ExportNames(ExportArgs),
    /// Show system information
    Info,
}

/// Arguments for the classify command
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Image file or directory of images
    pub input: PathBuf,

    /// Save the resulting catalog snapshot to this file
    #[arg(short, long)]
    pub catalog: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// Disable OCR text detection
    #[arg(long)]
    pub no_ocr: bool,

    /// Skip automatic numbering
    #[arg(long)]
    pub no_number: bool,

    /// OCR language (tesseract codes, e.g. "spa+eng")
    #[arg(long)]
    pub ocr_language: Option<String>,

    /// Worker threads (default: all CPUs)
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Config file (default: ./folio.toml or the user config)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// A saved catalog to operate on
#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Catalog snapshot (JSON)
    pub catalog: PathBuf,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the renumber command
#[derive(Args, Debug)]
pub struct RenumberArgs {
    /// Catalog snapshot (JSON)
    pub catalog: PathBuf,

    /// Id of the first image to renumber
    #[arg(long)]
    pub from: Uuid,

    /// Number given to the first image
    #[arg(long, default_value_t = 1)]
    pub start: u32,

    /// Use Roman numerals
    #[arg(long)]
    pub roman: bool,
}

/// Arguments for the exception command
#[derive(Args, Debug)]
pub struct ExceptionArgs {
    /// Catalog snapshot (JSON)
    pub catalog: PathBuf,

    /// Image id
    #[arg(long)]
    pub id: Uuid,

    /// Base page number shared with the preceding page
    #[arg(long)]
    pub base: u32,

    /// Exception suffix
    #[arg(long, default_value = "bis")]
    pub suffix: String,
}

/// Arguments for the phantom command
#[derive(Args, Debug)]
pub struct PhantomArgs {
    /// Catalog snapshot (JSON)
    pub catalog: PathBuf,

    /// Image id
    #[arg(long)]
    pub id: Uuid,

    /// Page number (digits or Roman numeral)
    #[arg(long)]
    pub number: String,
}

/// Arguments for the set command
#[derive(Args, Debug)]
pub struct SetArgs {
    /// Catalog snapshot (JSON)
    pub catalog: PathBuf,

    /// Image ids to edit
    #[arg(long = "id", required = true, num_args = 1..)]
    pub ids: Vec<Uuid>,

    /// Page type (portada, texto, ilustracion, ...)
    #[arg(long = "type", value_parser = parse_page_type)]
    pub page_type: Option<PageType>,

    /// Page number (digits or Roman numeral)
    #[arg(long, conflicts_with = "clear_number")]
    pub number: Option<String>,

    /// Remove the page number
    #[arg(long)]
    pub clear_number: bool,

    /// Exception suffix
    #[arg(long, conflicts_with = "clear_exception")]
    pub exception: Option<String>,

    /// Remove the exception suffix
    #[arg(long)]
    pub clear_exception: bool,

    /// Phantom flag
    #[arg(long)]
    pub phantom: Option<bool>,

    /// Validated flag
    #[arg(long)]
    pub validated: Option<bool>,
}

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Catalog snapshot (JSON)
    pub catalog: PathBuf,

    /// Print problems as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the export-names command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Catalog snapshot (JSON)
    pub catalog: PathBuf,

    /// Copy validated, numbered images here under their Page_NNN names
    #[arg(long)]
    pub copy_to: Option<PathBuf>,

    /// Print names as JSON
    #[arg(long)]
    pub json: bool,
}

fn parse_page_type(value: &str) -> Result<PageType, String> {
    value.parse::<PageType>().map_err(|e| {
        let names: Vec<&str> = PageType::ALL.iter().map(|t| t.as_str()).collect();
        format!("{} (expected one of: {})", e, names.join(", "))
    })
}
