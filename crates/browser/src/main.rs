//! FileView
//!
//! Read-only browsing of a single root directory from the command line.

use std::io::Write;
use std::path::PathBuf;

use browser::config::{default_config_path, Config};
use browser::{
    ContentView, EntryView, FileService, ListingView, LocalRepository, RepositoryError,
    SortOrder, StatsView,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter};

/// FileView - read-only, root-confined file browser.
#[derive(Parser, Debug)]
#[command(name = "fileview")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Root directory (overrides configuration)
    #[arg(short, long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List a directory
    Ls {
        /// Directory relative to the root
        #[arg(default_value = ".")]
        path: String,

        /// Include hidden entries
        #[arg(long, short)]
        all: bool,

        /// Sort order
        #[arg(long, short, value_enum)]
        sort: Option<SortOrder>,

        /// Only show the entry with exactly this name
        #[arg(long, short)]
        pattern: Option<String>,
    },

    /// Print a file
    Cat {
        /// File relative to the root
        path: String,

        /// Print a preview of at most N characters instead of the whole file
        #[arg(long, value_name = "N")]
        preview: Option<usize>,
    },

    /// Show metadata for a path
    Info {
        /// Path relative to the root
        path: String,
    },

    /// Show aggregate statistics for a directory
    Stats {
        /// Directory relative to the root
        #[arg(default_value = ".")]
        path: String,
    },

    /// Print the effective configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing before configuration so override messages are kept
    let (filter, filter_handle) = reload::Layer::new(EnvFilter::new(initial_log_level(&cli)));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    let mut config = match &cli.config {
        Some(config_path) => Config::load(config_path)?,
        None => Config::load_default()?,
    };

    // Apply environment variable and flag overrides
    config.apply_env_overrides();
    if let Some(root) = &cli.root {
        config.storage.root = root.clone();
    }

    config.validate()?;
    filter_handle.reload(EnvFilter::new(log_level(&cli, &config)))?;

    tracing::debug!(
        "Using config file: {:?}",
        cli.config.clone().unwrap_or_else(default_config_path)
    );

    if let Commands::Config = cli.command {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let repository = LocalRepository::new(&config.storage.root, config.storage.max_file_size)?;
    let service = FileService::new(repository, config.browse.preview_chars);

    if let Err(err) = run(&cli, &config, &service) {
        eprintln!("Error [{}]: {}", err.code, err);
        std::process::exit(1);
    }

    Ok(())
}

/// Level used while configuration is still loading.
fn initial_log_level(cli: &Cli) -> &'static str {
    if cli.verbose {
        "debug"
    } else {
        "info"
    }
}

/// Level once configuration is known. `--verbose` wins over the file.
fn log_level(cli: &Cli, config: &Config) -> String {
    if cli.verbose {
        "debug".to_string()
    } else {
        config.logging.level.to_lowercase()
    }
}

fn run(
    cli: &Cli,
    config: &Config,
    service: &FileService<LocalRepository>,
) -> Result<(), RepositoryError> {
    match &cli.command {
        Commands::Ls {
            path,
            all,
            sort,
            pattern,
        } => {
            let mut options = config.list_options();
            options.show_hidden |= *all;
            if let Some(sort) = sort {
                options.sort = *sort;
            }
            options.pattern = pattern.clone();

            let listing = service.list(path, &options)?;
            emit(cli.json, &listing, print_listing);
        }
        Commands::Cat { path, preview } => {
            if preview.is_some() || cli.json {
                let view = service.read(path, *preview)?;
                emit(cli.json, &view, print_content);
            } else {
                let content = service.read_content(path)?;
                if content.is_text() {
                    let mut stdout = std::io::stdout().lock();
                    if let Err(e) = stdout.write_all(content.content()) {
                        tracing::debug!("stdout closed: {}", e);
                    }
                } else {
                    println!("{}", model::BINARY_PREVIEW);
                }
            }
        }
        Commands::Info { path } => {
            let entry = service.info(path)?;
            emit(cli.json, &entry, print_entry);
        }
        Commands::Stats { path } => {
            let stats = service.stats(path)?;
            emit(cli.json, &stats, print_stats);
        }
        Commands::Config => {}
    }

    Ok(())
}

/// Print a view as JSON or with the given text formatter.
fn emit<T: Serialize>(json: bool, value: &T, text: fn(&T)) {
    if !json {
        text(value);
        return;
    }
    match serde_json::to_string_pretty(value) {
        Ok(out) => println!("{}", out),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}

fn print_listing(listing: &ListingView) {
    for entry in &listing.entries {
        let marker = if entry.kind == model::EntryKind::Directory {
            "/"
        } else {
            ""
        };
        println!(
            "{}  {:>10}  {}{}",
            entry.permissions, entry.size_human, entry.name, marker
        );
    }
    println!(
        "{} files, {} directories, {} ({} of {} shown)",
        listing.file_count,
        listing.directory_count,
        listing.total_size_human,
        listing.entries.len(),
        listing.total_count
    );
}

fn print_content(view: &ContentView) {
    println!("{}", view.preview);
    println!();
    println!(
        "{} | {} | {} lines | fnv {}",
        view.content_type, view.size_human, view.line_count, view.hash
    );
}

fn print_entry(entry: &EntryView) {
    println!("Name:        {}", entry.name);
    println!("Path:        {}", entry.path);
    println!("Kind:        {:?}", entry.kind);
    println!("Size:        {} ({} bytes)", entry.size_human, entry.size);
    println!("Permissions: {}", entry.permissions);
    println!("Modified:    {}", entry.modified);
}

fn print_stats(stats: &StatsView) {
    println!("Directory:   {}", stats.path);
    println!("Files:       {}", stats.total_files);
    println!("Directories: {}", stats.total_directories);
    println!("Total size:  {}", stats.total_size_human);
    let describe = |entry: &Option<EntryView>| {
        entry
            .as_ref()
            .map(|e| format!("{} ({})", e.name, e.size_human))
            .unwrap_or_else(|| "-".to_string())
    };
    println!("Largest:     {}", describe(&stats.largest_file));
    println!("Newest:      {}", describe(&stats.newest_file));
    println!("Oldest:      {}", describe(&stats.oldest_file));
}
