// LogStudio - main.rs
//
// Command-line entry point. Handles:
// 1. CLI argument parsing
// 2. Config, settings and logging initialisation
// 3. Loading one file (incremental, optionally followed) or several (merged)
// 4. Applying filters and writing the result in the requested format

use logstudio::app::io::{FsLogIo, LogIo};
use logstudio::app::settings::{AppSettings, JsonSettingsStore, SettingsStore};
use logstudio::app::state::ViewerState;
use logstudio::app::watch::WatchManager;
use logstudio::core::{export, filter};
use logstudio::core::format::{detail_content, preview_message};
use logstudio::core::loader::ReloadOutcome;
use logstudio::core::model::LogEntry;
use logstudio::core::namespace::{node_selection_state, NodeSelection};
use logstudio::core::schema::{self, SchemaDefinition};
use logstudio::platform::config::{self, AppConfig, PlatformPaths};
use logstudio::util::{constants, error::LogStudioError, logging};

use clap::{Parser, ValueEnum};
use logstudio::util::error::ConfigError;
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::time::Duration;

/// Output format for the filtered entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One row per entry: line, timestamp, level, namespace, preview.
    Text,
    /// The original record text.
    Raw,
    Csv,
    Json,
}

/// LogStudio - structured log viewer.
///
/// Parses log files with a regex schema, filters them by level, hierarchical
/// namespace and text, and can follow a growing file.
#[derive(Parser, Debug)]
#[command(name = "logstudio", version, about)]
struct Cli {
    /// Log files to open. Several files are merged by timestamp.
    files: Vec<PathBuf>,

    /// List the log files in a directory (defaults to [viewer] log_directory).
    #[arg(long = "dir")]
    dir: Option<PathBuf>,

    /// Show only these levels (repeatable).
    #[arg(short = 'l', long = "level")]
    levels: Vec<String>,

    /// Show only these namespaces and everything beneath them (repeatable).
    #[arg(short = 'n', long = "namespace")]
    namespaces: Vec<String>,

    /// Case-insensitive text search over the whole record.
    #[arg(short = 's', long = "search")]
    search: Option<String>,

    /// Print the namespace tree instead of entries.
    #[arg(long = "tree")]
    tree: bool,

    /// Keep running and print new entries as the file grows (single file only).
    /// Without this flag, an interactive single-file view follows when
    /// [viewer] auto_refresh is on.
    #[arg(short = 'f', long = "follow", overrides_with = "no_follow")]
    follow: bool,

    /// Print once and exit, even when auto_refresh is on.
    #[arg(long = "no-follow", overrides_with = "follow")]
    no_follow: bool,

    /// Output format.
    #[arg(short = 'o', long = "output", value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Show expanded, reformatted detail for multi-line and long entries.
    #[arg(short = 'x', long = "expand")]
    expand: bool,

    /// Config file to use instead of the platform default.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Header regex overriding the configured schema (4 groups:
    /// timestamp, level, namespace, message).
    #[arg(short = 'p', long = "pattern")]
    pattern: Option<String>,

    /// Persist the effective schema and viewer settings for later runs.
    #[arg(long = "save-settings")]
    save_settings: bool,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!(error = %e, "Fatal error");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), LogStudioError> {
    let platform_paths = PlatformPaths::resolve();

    // Config is read before logging is up; its warnings are replayed below.
    // A file named with --config must exist and parse.
    let (base_config, mut warnings) = match &cli.config {
        Some(path) => config::load_config_strict(path)?,
        None => config::load_config_file(&platform_paths.config_file()),
    };

    logging::init(
        cli.debug,
        base_config.log_level.as_deref(),
        base_config.log_file.as_deref(),
    );

    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        "LogStudio starting"
    );

    let store = JsonSettingsStore::new(platform_paths.settings_file());
    let mut config = match store.load() {
        Some(saved) => {
            let (merged, settings_warnings) = saved.apply_to(&base_config);
            warnings.extend(settings_warnings);
            merged
        }
        None => base_config,
    };

    for warning in &warnings {
        tracing::warn!(warning = %warning, "Config value ignored");
        eprintln!("Warning: {warning}");
    }

    if let Some(pattern) = &cli.pattern {
        config.schema = schema::compile(SchemaDefinition {
            pattern: pattern.clone(),
            ..Default::default()
        })?;
    }

    if cli.save_settings {
        if let Err(e) = store.save(&AppSettings::from_config(&config)) {
            tracing::warn!(error = %e, "Could not save settings");
            eprintln!("Warning: could not save settings: {e}");
        }
    }

    let io = FsLogIo::new(config.include_patterns.clone());

    if cli.files.is_empty() {
        return list_directory(&cli, &config, &io);
    }

    let mut state = ViewerState::new(config.schema.clone());
    let failed = state.open_files(&cli.files, &io)?;
    for path in &failed {
        eprintln!("Warning: could not read '{}'", path.display());
    }

    for level in &cli.levels {
        state.toggle_level(&level.to_uppercase());
    }
    for namespace in &cli.namespaces {
        state.toggle_namespace(namespace);
    }
    if let Some(search) = &cli.search {
        state.set_search(search);
    }

    if cli.tree {
        return print_tree(&state);
    }

    let visible: Vec<LogEntry> = state.filtered_entries().into_iter().cloned().collect();
    write_entries(&visible, &cli)?;

    if follow_requested(&cli, &config, std::io::stdout().is_terminal()) {
        follow(&cli, &config, &mut state, &io)?;
    }

    Ok(())
}

/// `--dir` (or the configured log directory) without files: list candidates.
fn list_directory(cli: &Cli, config: &AppConfig, io: &dyn LogIo) -> Result<(), LogStudioError> {
    let dir = cli
        .dir
        .clone()
        .or_else(|| config.log_directory.clone())
        .ok_or(ConfigError::NoLogDirectory)?;

    let files = io.list_files(&dir).map_err(|e| LogStudioError::Io {
        path: dir.clone(),
        operation: "list",
        source: e,
    })?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for file in &files {
        writeln!(out, "{}", file.path.display()).map_err(stdout_error)?;
    }
    tracing::info!(dir = %dir.display(), count = files.len(), "Listed directory");
    Ok(())
}

/// Print the namespace tree with counts and selection markers.
fn print_tree(state: &ViewerState) -> Result<(), LogStudioError> {
    let tree = state.namespace_tree();
    let selection = &state.filter().namespaces;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for (depth, node) in tree.walk() {
        let marker = match node_selection_state(&node.full_path, selection) {
            NodeSelection::Selected => "[x]",
            NodeSelection::Included => "[~]",
            NodeSelection::None => "[ ]",
        };
        writeln!(
            out,
            "{}{marker} {} ({})",
            "  ".repeat(depth),
            node.name,
            node.count
        )
        .map_err(stdout_error)?;
    }
    Ok(())
}

fn write_entries(entries: &[LogEntry], cli: &Cli) -> Result<(), LogStudioError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.output {
        OutputFormat::Csv => {
            export::export_csv(entries, &mut out)?;
        }
        OutputFormat::Json => {
            export::export_json(entries, &mut out)?;
            writeln!(out).map_err(stdout_error)?;
        }
        OutputFormat::Raw => {
            export::export_text(entries, &mut out)?;
        }
        OutputFormat::Text => {
            for entry in entries {
                write_row(&mut out, entry, cli.expand).map_err(stdout_error)?;
            }
        }
    }
    Ok(())
}

fn write_row<W: Write>(out: &mut W, entry: &LogEntry, expand: bool) -> std::io::Result<()> {
    let source = entry
        .source_file
        .as_deref()
        .map(|s| format!("[{s}] "))
        .unwrap_or_default();

    writeln!(
        out,
        "{:>6} {}{} {:<5} {} | {}",
        entry.original_line_number,
        source,
        entry.timestamp,
        entry.level,
        entry.namespace,
        preview_message(entry)
    )?;

    if expand && logstudio::core::format::is_expandable(entry) {
        let detail = detail_content(entry);
        writeln!(out, "       --- {} ---", detail.kind.label())?;
        for line in detail.text.lines() {
            writeln!(out, "       {line}")?;
        }
    }
    Ok(())
}

/// Whether to keep following after the first listing.
///
/// `--follow` / `--no-follow` win. Otherwise `auto_refresh` decides, but only
/// for a single file written to a terminal, so piped output still ends.
fn follow_requested(cli: &Cli, config: &AppConfig, interactive: bool) -> bool {
    if cli.no_follow {
        return false;
    }
    if cli.follow {
        return true;
    }
    config.auto_refresh && interactive && cli.files.len() == 1
}

/// Watch the single open file and print entries as they arrive.
fn follow(
    cli: &Cli,
    config: &AppConfig,
    state: &mut ViewerState,
    io: &dyn LogIo,
) -> Result<(), LogStudioError> {
    let [path] = cli.files.as_slice() else {
        eprintln!("--follow needs exactly one file; merged views are snapshots.");
        return Ok(());
    };

    let mut watcher = WatchManager::new(config.refresh_interval_ms);
    watcher.watch(path);
    tracing::info!(file = %path.display(), "Following file");

    loop {
        std::thread::sleep(Duration::from_millis(config.refresh_interval_ms));

        for event in watcher.poll_events() {
            let before = state.entries().len();
            let Some(outcome) = state.handle_event(&event, io) else {
                continue;
            };

            let fresh: Vec<LogEntry> = match outcome {
                ReloadOutcome::Unchanged => continue,
                ReloadOutcome::Appended { .. } => {
                    filter::filter_entries(&state.entries()[before..], state.filter())
                }
                ReloadOutcome::Initial { .. } | ReloadOutcome::Reloaded { .. } => {
                    eprintln!("-- {} was truncated or replaced; reloaded --", path.display());
                    state.filtered_entries().into_iter().cloned().collect()
                }
            };
            write_entries(&fresh, cli)?;
        }

        for warning in state.take_warnings() {
            eprintln!("Warning: {warning}");
        }
    }
}

fn stdout_error(e: std::io::Error) -> LogStudioError {
    LogStudioError::Io {
        path: PathBuf::from("<stdout>"),
        operation: "write",
        source: e,
    }
}
