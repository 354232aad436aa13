//! folio - Scanned book page classifier and pagination sequencer
//!
//! CLI entry point

use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn, Level};

use folio::{
    exit_codes,
    // Catalog
    copy_renamed, export_filename, rename_plan, rename_target, CatalogError, ImageCatalog,
    ImageRecord, IngestProgress, IngestReport, Ingestor, RecordUpdate, SharedCatalog,
    // CLI
    CatalogArgs, ClassifyArgs, Cli, Commands, ExceptionArgs, ExportArgs, PhantomArgs,
    RenumberArgs, SetArgs, ValidateArgs,
    // Config
    CliOverrides, Config,
    // Numbering
    NumberType, NumberingSequencer, PageNumber, SequenceValidator,
};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Classify(args) => run_classify(args, cli.quiet),
        Commands::Number(args) => run_number(args),
        Commands::Renumber(args) => run_renumber(args),
        Commands::Exception(args) => run_exception(args),
        Commands::Phantom(args) => run_phantom(args),
        Commands::Set(args) => run_set(args),
        Commands::Validate(args) => run_validate(args),
        Commands::Exceptions(args) => run_exceptions(args),
        Commands::ExportNames(args) => run_export_names(args),
        Commands::Info => run_info(),
    };

    std::process::exit(match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_code_for(&e)
        }
    });
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn exit_code_for(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<CatalogError>() {
        Some(CatalogError::InputNotFound(_)) => exit_codes::INPUT_NOT_FOUND,
        _ => exit_codes::GENERAL_ERROR,
    }
}

// ============ Progress ============

/// Progress bar over the classification batch
struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn new(visible: bool) -> Self {
        let bar = if visible {
            let bar = ProgressBar::new(0);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            {
                bar.set_style(style.progress_chars("#>-"));
            }
            bar
        } else {
            ProgressBar::hidden()
        };
        Self { bar }
    }
}

impl IngestProgress for BarProgress {
    fn on_start(&self, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn on_file_done(&self, path: &Path) {
        if let Some(name) = path.file_name() {
            self.bar.set_message(name.to_string_lossy().into_owned());
        }
        self.bar.inc(1);
    }

    fn on_finish(&self) {
        self.bar.finish_and_clear();
    }
}

// ============ Catalog Helpers ============

fn load_catalog(path: &Path) -> Result<ImageCatalog> {
    ImageCatalog::load_json(path)
        .with_context(|| format!("Failed to load catalog {}", path.display()))
}

fn save_catalog(catalog: &ImageCatalog, path: &Path) -> Result<()> {
    catalog
        .save_json(path)
        .with_context(|| format!("Failed to save catalog {}", path.display()))?;
    info!("Catalog saved to {}", path.display());
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_records(catalog: &ImageCatalog) {
    println!(
        "{:<36}  {:<32}  {:<18}  {:>5}  {}",
        "ID", "FILENAME", "TYPE", "CONF", "PAGE"
    );
    for record in catalog.sorted() {
        println!(
            "{:<36}  {:<32}  {:<18}  {:>5.2}  {}{}",
            record.id,
            record.original_filename,
            record.page_type,
            record.confidence,
            record.display_number().unwrap_or_else(|| "-".to_string()),
            if record.validated { " ✓" } else { "" }
        );
    }
}

// ============ Classify Command ============

#[derive(Serialize)]
struct ClassifyOutput<'a> {
    records: Vec<&'a ImageRecord>,
    report: &'a IngestReport,
}

fn run_classify(args: &ClassifyArgs, quiet: bool) -> Result<i32> {
    let start_time = Instant::now();

    if !args.input.exists() {
        eprintln!("Error: Input path does not exist: {}", args.input.display());
        return Ok(exit_codes::INPUT_NOT_FOUND);
    }

    // Load config file if specified, otherwise search the default locations
    let file_config = match &args.config {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => Config::load().unwrap_or_else(|e| {
            warn!("Ignoring unreadable config file: {}", e);
            Config::default()
        }),
    };
    let config = file_config.merge_with_cli(&create_cli_overrides(args));

    let ingestor = Ingestor::new(config.classifier(), config.ingest_options());
    let (accepted, skipped) = ingestor.collect_inputs(&args.input)?;
    if accepted.is_empty() {
        eprintln!("Error: No supported images found in {}", args.input.display());
        return Ok(exit_codes::INPUT_NOT_FOUND);
    }

    // Add to an existing catalog when one is given
    let existing = match &args.catalog {
        Some(path) if path.exists() => load_catalog(path)?,
        _ => ImageCatalog::new(),
    };
    let catalog = SharedCatalog::new(existing);

    let progress = BarProgress::new(!quiet && !args.json);
    let mut report = ingestor.ingest_paths(&catalog, &accepted, &progress)?;
    report.skipped = skipped;

    for failure in &report.failures {
        eprintln!("Warning: {}: {}", failure.path.display(), failure.reason);
    }

    let book = catalog.read()?;
    if args.json {
        print_json(&ClassifyOutput {
            records: book.sorted(),
            report: &report,
        })?;
    } else {
        print_records(&book);
        println!();
        println!(
            "{} images classified in {:.1}s ({} decode fallbacks, {} failed, {} skipped)",
            report.ingested.len(),
            start_time.elapsed().as_secs_f64(),
            report.decode_fallbacks,
            report.failures.len(),
            report.skipped.len()
        );
    }

    if let Some(path) = &args.catalog {
        save_catalog(&book, path)?;
    }

    Ok(exit_codes::SUCCESS)
}

fn create_cli_overrides(args: &ClassifyArgs) -> CliOverrides {
    let mut overrides = CliOverrides::new();

    // Only flags the user actually gave override the config file
    if args.no_ocr {
        overrides.ocr_enabled = Some(false);
    }
    overrides.ocr_language = args.ocr_language.clone();
    if args.no_number {
        overrides.auto_number = Some(false);
    }
    overrides.threads = args.threads;

    overrides
}

// ============ Numbering Commands ============

fn run_number(args: &CatalogArgs) -> Result<i32> {
    let mut catalog = load_catalog(&args.catalog)?;
    let summary = NumberingSequencer::auto_number(&mut catalog);
    save_catalog(&catalog, &args.catalog)?;

    if args.json {
        print_json(&summary)?;
    } else {
        println!(
            "Numbered {} pages ({} roman, {} arabic), {} without number",
            summary.roman_assigned + summary.arabic_assigned,
            summary.roman_assigned,
            summary.arabic_assigned,
            summary.unnumbered
        );
    }
    Ok(exit_codes::SUCCESS)
}

fn run_renumber(args: &RenumberArgs) -> Result<i32> {
    let mut catalog = load_catalog(&args.catalog)?;
    let number_type = if args.roman {
        NumberType::Roman
    } else {
        NumberType::Arabic
    };

    let count = NumberingSequencer::renumber_from(&mut catalog, args.from, args.start, number_type)?;
    save_catalog(&catalog, &args.catalog)?;

    println!("Renumbered {} pages starting at {}", count, args.start);
    Ok(exit_codes::SUCCESS)
}

fn run_exception(args: &ExceptionArgs) -> Result<i32> {
    let suffix = args.suffix.trim();
    if suffix.is_empty() {
        bail!("Exception suffix must not be empty");
    }

    let mut catalog = load_catalog(&args.catalog)?;
    NumberingSequencer::apply_exception(&mut catalog, args.id, args.base, suffix)?;
    save_catalog(&catalog, &args.catalog)?;

    println!("Page {} {} applied to {}", args.base, suffix, args.id);
    Ok(exit_codes::SUCCESS)
}

fn run_phantom(args: &PhantomArgs) -> Result<i32> {
    let number = PageNumber::parse(&args.number)?;

    let mut catalog = load_catalog(&args.catalog)?;
    NumberingSequencer::set_phantom_number(&mut catalog, args.id, number.clone())?;
    save_catalog(&catalog, &args.catalog)?;

    println!("Phantom number [{}] set on {}", number, args.id);
    Ok(exit_codes::SUCCESS)
}

// ============ Manual Edit Command ============

fn run_set(args: &SetArgs) -> Result<i32> {
    let update = create_record_update(args)?;
    if update.is_empty() {
        bail!("Nothing to update: give at least one field to change");
    }

    let mut catalog = load_catalog(&args.catalog)?;
    let report = catalog.bulk_update(&args.ids, &update);

    for id in &report.missing {
        eprintln!("Warning: image not found: {}", id);
    }
    if report.updated.is_empty() {
        bail!("No matching images to update");
    }

    save_catalog(&catalog, &args.catalog)?;
    println!("Updated {} images", report.updated.len());
    Ok(exit_codes::SUCCESS)
}

fn create_record_update(args: &SetArgs) -> Result<RecordUpdate> {
    let mut update = RecordUpdate::new();

    if let Some(page_type) = args.page_type {
        update = update.page_type(page_type);
    }
    if let Some(number) = &args.number {
        update = update.page_number(PageNumber::parse(number)?);
    }
    if args.clear_number {
        update = update.clear_page_number();
    }
    // A blank suffix clears the exception
    if let Some(exception) = &args.exception {
        update = update.number_exception(exception.as_str());
    }
    if args.clear_exception {
        update = update.clear_number_exception();
    }
    if let Some(phantom) = args.phantom {
        update = update.phantom_number(phantom);
    }
    if let Some(validated) = args.validated {
        update = update.validated(validated);
    }

    Ok(update)
}

// ============ Validate Command ============

fn run_validate(args: &ValidateArgs) -> Result<i32> {
    let catalog = load_catalog(&args.catalog)?;
    let problems = SequenceValidator::validate(&catalog);

    if args.json {
        print_json(&problems)?;
    } else if problems.is_empty() {
        println!("Numbering sequence OK");
    } else {
        for problem in &problems {
            let filename = catalog
                .get(&problem.image_id)
                .map(|r| r.original_filename.as_str())
                .unwrap_or("?");
            println!("{}: {} ({})", problem.kind, problem.message, filename);
        }
        println!();
        println!("{} problems found", problems.len());
    }

    Ok(if problems.is_empty() {
        exit_codes::SUCCESS
    } else {
        exit_codes::VALIDATION_FAILED
    })
}

// ============ Exceptions Command ============

fn run_exceptions(args: &CatalogArgs) -> Result<i32> {
    let catalog = load_catalog(&args.catalog)?;
    let candidates = NumberingSequencer::detect_exceptions(&catalog);

    if args.json {
        print_json(&candidates)?;
    } else if candidates.is_empty() {
        println!("No exception suffixes found in filenames");
    } else {
        for candidate in &candidates {
            println!(
                "{}  {:<32}  {} ({:.1})",
                candidate.image_id,
                candidate.filename,
                candidate.detected_exception,
                candidate.confidence
            );
        }
    }
    Ok(exit_codes::SUCCESS)
}

// ============ Export Names Command ============

#[derive(Serialize)]
struct ExportName {
    id: uuid::Uuid,
    original_filename: String,
    export_filename: String,
    rename_target: Option<String>,
}

fn run_export_names(args: &ExportArgs) -> Result<i32> {
    let catalog = load_catalog(&args.catalog)?;

    let names: Vec<ExportName> = catalog
        .sorted()
        .into_iter()
        .map(|record| ExportName {
            id: record.id,
            original_filename: record.original_filename.clone(),
            export_filename: export_filename(record),
            rename_target: rename_target(record),
        })
        .collect();

    if args.json {
        print_json(&names)?;
    } else {
        for name in &names {
            println!(
                "{} -> {}{}",
                name.original_filename,
                name.export_filename,
                name.rename_target
                    .as_ref()
                    .map(|t| format!(" => {}", t))
                    .unwrap_or_default()
            );
        }
    }

    if let Some(output_dir) = &args.copy_to {
        let written = copy_renamed(&rename_plan(&catalog), output_dir)
            .with_context(|| format!("Failed to copy pages to {}", output_dir.display()))?;
        if !args.json {
            println!();
            println!("Copied {} pages to {}", written.len(), output_dir.display());
        }
    }

    Ok(exit_codes::SUCCESS)
}

// ============ Info Command ============

fn run_info() -> Result<i32> {
    println!("folio v{}", env!("CARGO_PKG_VERSION"));
    println!();

    // System Information
    println!("System Information:");
    println!("  Platform: {}", std::env::consts::OS);
    println!("  Arch: {}", std::env::consts::ARCH);
    println!("  CPUs: {}", num_cpus::get());

    // External Tools
    let config = Config::load().unwrap_or_default();
    println!();
    println!("OCR Tools:");
    check_tool_with_version(&config.tesseract_cmd(), "Tesseract", &["--version"]);
    println!("  Language: {}", config.ocr.language);
    println!("  Enabled: {}", config.ocr.enabled);

    // Config File Locations
    println!();
    println!("Config File Locations:");
    for (label, path) in ["Local", "User "].iter().zip(Config::search_paths()) {
        println!("  {}: {}{}", label, path.display(), found_marker(&path));
    }

    Ok(exit_codes::SUCCESS)
}

fn found_marker(path: &Path) -> &'static str {
    if path.is_file() {
        " (found)"
    } else {
        ""
    }
}

fn check_tool_with_version(cmd: &str, name: &str, version_args: &[&str]) {
    match which::which(cmd) {
        Ok(path) => {
            // tesseract prints its version on stdout or stderr depending on release
            if let Ok(output) = std::process::Command::new(&path).args(version_args).output() {
                let stdout = String::from_utf8_lossy(&output.stdout);
                let stderr = String::from_utf8_lossy(&output.stderr);
                let first_line = stdout
                    .lines()
                    .chain(stderr.lines())
                    .next()
                    .unwrap_or("");
                if !first_line.is_empty() && first_line.len() < 80 {
                    println!("  {}: {} ({})", name, first_line.trim(), path.display());
                } else {
                    println!("  {}: {} (found)", name, path.display());
                }
            } else {
                println!("  {}: {} (found)", name, path.display());
            }
        }
        Err(_) => println!("  {}: Not found", name),
    }
}
