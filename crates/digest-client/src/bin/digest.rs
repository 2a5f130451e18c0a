//! Diff Digest CLI
//!
//! Fetch merged-PR diffs from a running digest server and generate release
//! notes for each, printing entries as they resolve.
//!
//! Usage:
//!   cargo run --bin digest -- --pages 2
//!   cargo run --bin digest -- --server http://localhost:3000 --per-page 5
//!   cargo run --bin digest -- --sync --data-dir /tmp/digest --verbose

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing_subscriber::EnvFilter;

use digest_client::{
    defaults, ApiClient, BatchProcessor, DiffItem, NoteGenerator, NoteStatus, NoteStore, NotesCache,
};

#[derive(Debug)]
struct Args {
    server: Option<String>,
    pages: u32,
    per_page: u32,
    data_dir: Option<PathBuf>,
    sync: bool,
    verbose: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            server: None,
            pages: 1,
            per_page: defaults::DIFFS_PER_PAGE,
            data_dir: None,
            sync: false,
            verbose: false,
        }
    }
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut result = Args::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--server" | "-s" => {
                i += 1;
                if i < args.len() {
                    result.server = Some(args[i].clone());
                }
            }
            "--pages" | "-p" => {
                i += 1;
                if i < args.len() {
                    result.pages = args[i].parse().unwrap_or_else(|_| {
                        eprintln!("Invalid page count: {}. Using 1.", args[i]);
                        1
                    });
                }
            }
            "--per-page" => {
                i += 1;
                if i < args.len() {
                    result.per_page = args[i].parse().unwrap_or_else(|_| {
                        eprintln!(
                            "Invalid page size: {}. Using {}.",
                            args[i],
                            defaults::DIFFS_PER_PAGE
                        );
                        defaults::DIFFS_PER_PAGE
                    });
                }
            }
            "--data-dir" | "-d" => {
                i += 1;
                if i < args.len() {
                    result.data_dir = Some(PathBuf::from(&args[i]));
                }
            }
            "--sync" => {
                result.sync = true;
            }
            "--verbose" | "-v" => {
                result.verbose = true;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            _ => {}
        }
        i += 1;
    }

    result
}

fn print_help() {
    println!(
        r#"
Diff Digest

Usage: cargo run --bin digest -- [OPTIONS]

Options:
  -s, --server <URL>      Digest server base URL (default: http://localhost:3000)
  -p, --pages <N>         Number of diff pages to fetch (default: 1)
      --per-page <N>      Diffs per page (default: 10)
  -d, --data-dir <DIR>    Directory for the notes cache (default: data)
      --sync              Use the non-streaming endpoint
  -v, --verbose           Verbose logging
  -h, --help              Print help

Environment Variables:
  DIGEST_SERVER_URL   Digest server base URL (overridden by --server)
  DIGEST_DATA_DIR     Cache data directory (overridden by --data-dir)
  RUST_LOG            Tracing filter (overrides --verbose)

Examples:
  cargo run --bin digest -- --pages 2
  cargo run --bin digest -- --server http://localhost:3000 --per-page 5
  cargo run --bin digest -- --sync --verbose
"#
    );
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "digest_client=debug"
    } else {
        "digest_client=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let args = parse_args();
    init_tracing(args.verbose);

    let client = match &args.server {
        Some(server) => ApiClient::new(server.clone())?,
        None => ApiClient::from_env()?,
    };
    let cache = match &args.data_dir {
        Some(dir) => NotesCache::new(dir),
        None => NotesCache::from_env(),
    };
    let store = Arc::new(NoteStore::default());
    let generator =
        NoteGenerator::new(client.clone(), store.clone(), cache).with_sync_mode(args.sync);

    println!("═══════════════════════════════════════════════════════════════");
    println!("Diff Digest");
    println!("═══════════════════════════════════════════════════════════════");
    println!("Server: {}", client.base_url());
    println!("Pages: {} x {} diffs", args.pages, args.per_page);
    println!("Mode: {}", if args.sync { "sync" } else { "streaming" });
    println!();

    let seeded = generator.seed_from_cache().await;
    if seeded > 0 {
        println!("Restored {} cached notes", seeded);
    }

    // Collect diffs page by page until the requested count or exhaustion.
    let mut items: Vec<DiffItem> = Vec::new();
    let mut next = Some(defaults::FIRST_PAGE);
    let mut fetched = 0;
    while let Some(page) = next {
        if fetched >= args.pages {
            break;
        }
        let diff_page = client.fetch_diffs(page, args.per_page).await?;
        println!(
            "Page {}: {} merged diffs",
            diff_page.current_page,
            diff_page.diffs.len()
        );
        items.extend(diff_page.diffs);
        next = diff_page.next_page;
        fetched += 1;
    }
    println!();

    if items.is_empty() {
        println!("Nothing to generate.");
        return Ok(());
    }

    // Print entries as they resolve.
    let mut updates = store.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(update) = updates.recv().await {
            match update.entry.status {
                NoteStatus::Done => {
                    let notes = update.entry.data.unwrap_or_default();
                    println!("─── PR #{} ───", update.diff_id);
                    println!("  Developer: {}", notes.developer_note);
                    println!("  Marketing: {}", notes.marketing_note);
                }
                NoteStatus::Error => {
                    println!(
                        "─── PR #{} failed: {} ───",
                        update.diff_id,
                        update.entry.error_message.unwrap_or_default()
                    );
                }
                _ => {}
            }
        }
    });

    let started = Instant::now();
    let processor = BatchProcessor::new(store.clone());
    let outcome = processor.run(&items, &generator).await.unwrap_or_default();

    // Let the printer drain its buffered updates before summarizing.
    tokio::time::sleep(Duration::from_millis(50)).await;
    printer.abort();

    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("Batch complete in {:.1}s", started.elapsed().as_secs_f64());
    println!(
        "Generated: {}  Failed: {}  Skipped: {}",
        outcome.completed, outcome.failed, outcome.skipped
    );

    if outcome.failed == items.len() {
        eprintln!("Every item failed; check the server and try again.");
        std::process::exit(1);
    }

    Ok(())
}
