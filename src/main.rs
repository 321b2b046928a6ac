use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use timetable_scan::core::model::ScheduleDocument;
use timetable_scan::export::{Exporter, JsonExporter, MarkdownExporter, TextExporter};
use timetable_scan::ocr::{adapt_payload, CommandOcrEngine, OcrEngine, RecordedOcrEngine};
use timetable_scan::parser::parse_result;
use timetable_scan::pipeline::{export_document, PipelineConfig, ScanPipeline};
use timetable_scan::store::{JsonFileStore, ScheduleStore, ScheduleWriter, UserId};
use timetable_scan::{ScanError, TimetableConfig};

#[derive(Parser, Debug)]
#[command(name = "timetable-scan")]
#[command(version, about = "Weekly class schedule recovery from timetable OCR output", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a captured OCR response (JSON or text) and print the schedule
    Parse {
        /// Captured OCR response file
        input: PathBuf,

        /// Institution config (weekdays, bell schedule)
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Run OCR on a timetable photo and save the schedule
    Scan {
        /// Timetable image, or a captured response with --recorded
        input: PathBuf,

        #[arg(short, long)]
        user: String,

        /// Schedule store directory
        #[arg(short, long, default_value = "schedules")]
        store: PathBuf,

        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Treat INPUT as a captured OCR response instead of an image
        #[arg(long)]
        recorded: bool,

        /// OCR bridge script
        #[arg(long)]
        script: Option<PathBuf>,

        /// OCR language(s)
        #[arg(long, default_value = "eng")]
        lang: String,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Save corrected recognized text from a failed scan
    Resubmit {
        /// Edited text file
        text_file: PathBuf,

        #[arg(short, long)]
        user: String,

        #[arg(short, long, default_value = "schedules")]
        store: PathBuf,

        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print a user's saved schedule
    Show {
        #[arg(short, long)]
        user: String,

        #[arg(short, long, default_value = "schedules")]
        store: PathBuf,

        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Write a user's saved schedule in every format
    Export {
        #[arg(short, long)]
        user: String,

        #[arg(short, long, default_value = "schedules")]
        store: PathBuf,

        /// Output directory (default: ./<user>_schedule)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete a user's saved schedule
    Clear {
        #[arg(short, long)]
        user: String,

        #[arg(short, long, default_value = "schedules")]
        store: PathBuf,
    },

    /// Write the default institution config to a file for editing
    InitConfig {
        path: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum Format {
    Json,
    Text,
    Markdown,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Parse {
            input,
            config,
            format,
        } => parse_recorded(input, config, format),
        Commands::Scan {
            input,
            user,
            store,
            config,
            recorded,
            script,
            lang,
            quiet,
        } => {
            let timetable = load_config(config.as_deref())?;
            let config = PipelineConfig::new(store, timetable);
            let user = UserId::new(user);
            if recorded {
                scan(RecordedOcrEngine::new(), &config, &user, &input, quiet)
            } else {
                let mut engine = CommandOcrEngine::new().with_lang(lang);
                if let Some(script) = script {
                    engine = engine.with_script(script);
                }
                scan(engine, &config, &user, &input, quiet)
            }
        }
        Commands::Resubmit {
            text_file,
            user,
            store,
            config,
        } => resubmit(text_file, user, store, config),
        Commands::Show {
            user,
            store,
            format,
        } => show(user, store, format),
        Commands::Export {
            user,
            store,
            output,
        } => export(user, store, output),
        Commands::Clear { user, store } => clear(user, store),
        Commands::InitConfig { path } => {
            TimetableConfig::default().save(&path)?;
            println!("[✓] Wrote default config to {}", path.display());
            Ok(())
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "timetable_scan=info",
        1 => "timetable_scan=debug",
        _ => "timetable_scan=trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<TimetableConfig> {
    match path {
        Some(path) => TimetableConfig::load(path),
        None => Ok(TimetableConfig::default()),
    }
}

fn renderer(format: Format, out_dir: PathBuf) -> Box<dyn Exporter> {
    match format {
        Format::Json => Box::new(JsonExporter::new(out_dir)),
        Format::Text => Box::new(TextExporter::new(out_dir)),
        Format::Markdown => Box::new(MarkdownExporter::new(out_dir)),
    }
}

fn parse_recorded(input: PathBuf, config: Option<PathBuf>, format: Format) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }
    let timetable = load_config(config.as_deref())?;

    let outcome = RecordedOcrEngine::new()
        .recognize(&input)
        .and_then(|payload| adapt_payload(&payload))
        .and_then(|result| parse_result(&result, &timetable));
    let entries = match outcome {
        Ok(entries) => entries,
        Err(err) => return Err(report_scan_error(err, None)),
    };

    let document = ScheduleDocument {
        schedule: entries,
        ..Default::default()
    };
    print!("{}", renderer(format, PathBuf::new()).render(&document)?);
    Ok(())
}

fn scan<E: OcrEngine>(
    engine: E,
    config: &PipelineConfig,
    user: &UserId,
    input: &Path,
    quiet: bool,
) -> Result<()> {
    if !input.is_file() {
        anyhow::bail!("Input is not a file: {}", input.display());
    }

    let store = JsonFileStore::new(config.store_root.clone());
    if !quiet {
        println!("[*] Scanning: {}", input.display());
        println!("[*] Store: {}", store.root().display());
    }

    let pipeline = ScanPipeline::new(engine, &store, config.timetable.clone());

    match pipeline.scan(user, input) {
        Ok(document) => {
            if !quiet {
                println!(
                    "\n[✓] Saved {} class(es) for {}",
                    document.schedule.len(),
                    user
                );
            }
            Ok(())
        }
        Err(err) => Err(report_scan_error(err, Some(user))),
    }
}

/// Prints the user-facing message and keeps recognized text for editing.
fn report_scan_error(err: ScanError, user: Option<&UserId>) -> anyhow::Error {
    eprintln!("[✗] {}", err.user_message());

    if let Some((path, text)) = recognized_text_file(&err, user) {
        match fs::write(&path, text) {
            Ok(()) => {
                eprintln!("[!] Recognized text saved to {}", path.display());
                eprintln!("    Edit it, then run: timetable-scan resubmit {} --user {}", path.display(), user.map(UserId::as_str).unwrap_or_default());
            }
            Err(write_err) => eprintln!("[!] Could not save recognized text: {write_err}"),
        }
    }

    anyhow::Error::new(err)
}

/// Where a failed scan's recognized text goes. Only scans tied to a user
/// have somewhere to resubmit to.
fn recognized_text_file<'a>(err: &'a ScanError, user: Option<&UserId>) -> Option<(PathBuf, &'a str)> {
    let text = err.raw_text()?;
    let user = user?;
    Some((PathBuf::from(format!("{user}_recognized.txt")), text))
}

fn resubmit(
    text_file: PathBuf,
    user: String,
    store: PathBuf,
    config: Option<PathBuf>,
) -> Result<()> {
    let text = fs::read_to_string(&text_file)
        .with_context(|| format!("Failed to read {}", text_file.display()))?;
    let timetable = load_config(config.as_deref())?;
    let user = UserId::new(user);

    let store = JsonFileStore::new(store);
    let pipeline = ScanPipeline::new(RecordedOcrEngine::new(), &store, timetable);
    match pipeline.resubmit_text(&user, &text) {
        Ok(document) => {
            println!("[✓] Saved {} class(es) for {}", document.schedule.len(), user);
            Ok(())
        }
        Err(err) => Err(report_scan_error(err, Some(&user))),
    }
}

fn load_saved(user: &UserId, store: &JsonFileStore) -> Result<ScheduleDocument> {
    store
        .get(user)
        .with_context(|| format!("Failed to read schedule for {user}"))?
        .with_context(|| format!("No saved schedule for {user}"))
}

fn show(user: String, store: PathBuf, format: Format) -> Result<()> {
    let user = UserId::new(user);
    let store = JsonFileStore::new(store);
    let document = load_saved(&user, &store)?;
    print!("{}", renderer(format, PathBuf::new()).render(&document)?);
    Ok(())
}

fn export(user: String, store: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let user = UserId::new(user);
    let store = JsonFileStore::new(store);
    let document = load_saved(&user, &store)?;

    let output_dir = output.unwrap_or_else(|| PathBuf::from(format!("{user}_schedule")));
    let written = export_document(&document, &output_dir)
        .with_context(|| format!("Failed to export to: {}", output_dir.display()))?;
    for path in written {
        println!("[+] {}", path.display());
    }
    Ok(())
}

fn clear(user: String, store: PathBuf) -> Result<()> {
    let user = UserId::new(user);
    let store = JsonFileStore::new(store);
    ScheduleWriter::new(&store).clear(&user)?;
    println!("[✓] Cleared schedule for {user}");
    Ok(())
}
