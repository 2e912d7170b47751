//! Media Shelf - browse captured photos and videos and keep favorites
//!
//! Thin CLI over the `media_shelf` library: loads configuration, sets up
//! logging and runs one subcommand against the library directory.

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use media_shelf::{Cli, Command, Config, FavoriteChange, Library, MediaItem, MediaKind};
use std::path::{Path, PathBuf};
use tracing::{Level, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, filter::LevelFilter, fmt, prelude::*};

// CLI Output Module
mod cli_output {
    //! Styled terminal output for command results.

    use crossterm::{
        ExecutableCommand,
        style::{Color, Print, Stylize, style},
    };
    use std::io::stdout;

    /// CLI theme colors
    pub struct CliTheme;

    impl CliTheme {
        pub const SUCCESS: Color = Color::Green;
        pub const WARNING: Color = Color::Yellow;
        pub const ERROR: Color = Color::Red;
        pub const HINT: Color = Color::DarkGrey;
        pub const ACCENT: Color = Color::Cyan;
        pub const FAVORITE: Color = Color::Magenta;
    }

    /// Print a separator line
    pub fn print_separator() {
        let _ = stdout().execute(Print(format!("{}\n", "─".repeat(60))));
    }

    /// Print a centered title
    pub fn print_title(title: &str) {
        let width: usize = 60;
        let padding = width.saturating_sub(title.len()) / 2;
        let left_pad = " ".repeat(padding.saturating_sub(1));

        let _ = stdout().execute(Print(format!(
            "{}{} {}{}\n",
            left_pad,
            "╔".bold(),
            title.bold(),
            "╗".bold(),
        )));
    }

    pub fn print_success(msg: &str) {
        let _ = stdout().execute(Print(style("✓ ").with(CliTheme::SUCCESS).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    pub fn print_warning(msg: &str) {
        let _ = stdout().execute(Print(style("⚠ ").with(CliTheme::WARNING).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    pub fn print_error(msg: &str) {
        let _ = stdout().execute(Print(style("✗ ").with(CliTheme::ERROR).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    pub fn print_hint(msg: &str) {
        let _ = stdout().execute(Print(style("→ ").with(CliTheme::HINT)));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    /// Print a key/value pair
    pub fn print_key_value(key: &str, value: &str, value_color: Option<Color>) {
        let key_styled = style(key).with(CliTheme::HINT);
        let value_styled = match value_color {
            Some(color) => style(value).with(color),
            None => style(value).bold(),
        };
        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(key_styled));
        let _ = stdout().execute(Print(": "));
        let _ = stdout().execute(Print(value_styled));
        let _ = stdout().execute(Print("\n"));
    }

    /// Print one listing row
    pub fn print_media_row(index: usize, kind: &str, name: &str, favorite: bool) {
        let marker = if favorite {
            style("♥").with(CliTheme::FAVORITE).bold()
        } else {
            style(" ").with(CliTheme::HINT)
        };
        let _ = stdout().execute(Print(format!("  {:>4} ", index)));
        let _ = stdout().execute(Print(marker));
        let _ = stdout().execute(Print(" "));
        let _ = stdout().execute(Print(style(format!("{:<6}", kind)).with(CliTheme::ACCENT)));
        let _ = stdout().execute(Print(format!("{}\n", name)));
    }

    /// Print the log file path
    pub fn print_log_path(path: &str) {
        let _ = stdout().execute(Print(style("  📁 ").with(CliTheme::ACCENT)));
        let _ = stdout().execute(Print(style("Log file: ").with(CliTheme::HINT)));
        let _ = stdout().execute(Print(format!("{}\n", path)));
    }

    pub fn print_blank() {
        let _ = stdout().execute(Print("\n"));
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // No library or logging needed to write a config
    if let Command::InitConfig { ref path } = cli.command {
        return write_sample_config(path);
    }

    // Get the executable directory for Config and Log directories
    let exe_dir = get_executable_dir()?;
    let log_path = get_log_path(&exe_dir, &cli);
    let guard = setup_logging(&cli, &log_path)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Media Shelf starting");

    let config = load_config(&cli, &exe_dir)?;
    if config.verbose {
        info!(?config, "Configuration loaded");
    }

    let mut library = Library::from_config(&config);

    if let Err(e) = run_command(&cli.command, &config, &mut library) {
        error!(error = %e, "Command failed");
        cli_output::print_error(&e.to_string());
        if config.verbose {
            cli_output::print_log_path(&log_path.display().to_string());
        }
        // Flush the log file before exiting
        drop(guard);
        std::process::exit(1);
    }

    if config.verbose {
        cli_output::print_log_path(&log_path.display().to_string());
    }
    drop(guard);
    Ok(())
}

type FsLibrary = Library<media_shelf::FsDirectoryStore, media_shelf::JsonFavoritesStore>;

/// Run one subcommand
fn run_command(command: &Command, config: &Config, library: &mut FsLibrary) -> Result<()> {
    use cli_output::*;

    match command {
        Command::List => {
            let items = library.gallery();
            print_listing("Gallery", &items, library);
            if items.is_empty() {
                print_hint("No photos yet. Import some with `media-shelf import <FILE>`.");
            }
        }
        Command::Favorites => {
            let items = library.favorites();
            print_listing("Favorites", &items, library);
            if items.is_empty() {
                print_hint("No favorites yet. Add one with `media-shelf toggle <NAME>`.");
            }
        }
        Command::Toggle { name } => match library.toggle_favorite(name)? {
            FavoriteChange::Added => print_success(&format!("Added {} to favorites", name)),
            FavoriteChange::Removed => print_success(&format!("Removed {} from favorites", name)),
        },
        Command::Unfavorite { name } => {
            if library.remove_favorite(name)? {
                print_success(&format!("Removed {} from favorites", name));
            } else {
                print_hint(&format!("{} is not a favorite, nothing to remove", name));
            }
        }
        Command::Show { name } => {
            let entry = library.show(name)?;
            print_separator();
            print_title(entry.item.name());
            print_separator();
            print_key_value("Kind", &entry.item.kind().to_string(), None);
            print_key_value("Path", &entry.path.display().to_string(), None);
            print_key_value("URI", &library.resolver().uri(entry.item.name()), None);
            print_key_value("Order key", &entry.item.order_key().to_string(), None);
            let favorite = if entry.favorite { "yes" } else { "no" };
            print_key_value("Favorite", favorite, Some(CliTheme::FAVORITE));
        }
        Command::Import { file } => {
            let item = library.import(file)?;
            print_success(&format!("Imported {} as {}", file.display(), item.name()));
        }
        Command::Delete { name } => {
            let was_favorite = library.is_favorite(name);
            library.delete(name)?;
            print_success(&format!("Deleted {}", name));
            if was_favorite {
                print_hint("It stays in favorites until `unfavorite` or `prune`.");
            }
        }
        Command::Export { name, .. } => {
            let Some(ref dest_dir) = config.export_dir else {
                anyhow::bail!("No export directory: pass --to or set export_dir in the config");
            };
            let written = library.export(name, dest_dir)?;
            print_success(&format!("Saved {} to {}", name, written.display()));
        }
        Command::Prune => {
            let removed = library.prune_dangling()?;
            if removed.is_empty() {
                print_hint("No dangling favorites");
            } else {
                for name in &removed {
                    print_key_value("Removed", name, Some(CliTheme::WARNING));
                }
                print_success(&format!("Pruned {} dangling favorites", removed.len()));
            }
        }
        Command::Watch => run_watch(config, library)?,
        Command::InitConfig { path } => write_sample_config(path)?,
    }

    Ok(())
}

fn write_sample_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, Config::sample_config())?;
    cli_output::print_success(&format!("Wrote sample config to {}", path.display()));
    Ok(())
}

/// Print a listing with favorite markers
fn print_listing(title: &str, items: &[MediaItem], library: &FsLibrary) {
    use cli_output::*;

    let favorites: Vec<String> = library.favorites().into_iter().map(|i| i.name().to_string()).collect();

    print_separator();
    print_title(title);
    print_separator();
    for (index, item) in items.iter().enumerate() {
        let kind = match item.kind() {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Unknown => "?",
        };
        print_media_row(index + 1, kind, item.name(), favorites.iter().any(|f| f == item.name()));
    }
    print_blank();
    print_key_value("Items", &items.len().to_string(), Some(CliTheme::SUCCESS));
}

/// Re-list the gallery whenever the library directory changes
fn run_watch(config: &Config, library: &FsLibrary) -> Result<()> {
    use cli_output::*;

    let Some(ref dir) = config.library_dir else {
        anyhow::bail!("No library directory configured");
    };

    let (tx, rx) = crossbeam_channel::unbounded();
    let _watcher = media_shelf::watch::start_watcher(dir, config.classifier(), tx)?;

    print_listing("Gallery", &library.gallery(), library);
    print_hint(&format!("Watching {} (Ctrl-C to stop)", dir.display()));

    while let Ok(event) = rx.recv() {
        // Coalesce bursts into a single refresh
        let mut events = vec![event];
        events.extend(rx.try_iter());
        for event in &events {
            info!(?event, "Library changed");
        }
        print_listing("Gallery", &library.gallery(), library);
    }

    Ok(())
}

/// Get the directory where the executable is located
fn get_executable_dir() -> Result<PathBuf> {
    let exe_path = std::env::current_exe()?;
    Ok(exe_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".")))
}

/// Determine the log file path based on config file or timestamp
fn get_log_path(exe_dir: &Path, cli: &Cli) -> PathBuf {
    let log_dir = exe_dir.join("Log");
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");

    if let Some(config_name) = cli.config_name() {
        let config_log_dir = log_dir.join(&config_name);
        let log_filename = format!("{}_{}.log", config_name, timestamp);
        config_log_dir.join(log_filename)
    } else {
        let log_filename = format!("CLIRun_{}.log", timestamp);
        log_dir.join(log_filename)
    }
}

/// Resolve config path - supports shorthand syntax
fn resolve_config_path(exe_dir: &Path, config_path: &Path) -> PathBuf {
    if config_path.exists() {
        return config_path.to_path_buf();
    }

    let with_extension = if config_path.extension().is_none() {
        config_path.with_extension("toml")
    } else {
        config_path.to_path_buf()
    };

    if with_extension.exists() {
        return with_extension;
    }

    let config_dir = exe_dir.join("Config");
    let filename = config_path.file_name().unwrap_or(config_path.as_os_str());

    let mut in_config_dir = config_dir.join(filename);
    if in_config_dir.extension().is_none() {
        in_config_dir = in_config_dir.with_extension("toml");
    }

    if in_config_dir.exists() {
        return in_config_dir;
    }

    config_path.to_path_buf()
}

/// Load configuration from file or CLI arguments
fn load_config(cli: &Cli, exe_dir: &Path) -> Result<Config> {
    let config = if let Some(ref config_path) = cli.config {
        let resolved_path = resolve_config_path(exe_dir, config_path);
        info!(config_file = %resolved_path.display(), "Loading configuration from file");
        let file_config = Config::load_from_file(&resolved_path)?;
        cli.merge_with_config(file_config)
    } else {
        cli.to_config()
    };

    if config.library_dir.is_none() {
        // Listings render empty; say why up front
        cli_output::print_warning("No library directory configured (use --library or a config file)");
    }

    Ok(config)
}

/// Setup logging (file + console)
fn setup_logging(cli: &Cli, log_path: &Path) -> Result<WorkerGuard> {
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let subscriber = tracing_subscriber::registry().with(env_filter);

    // Results go to stdout, so the console log only carries warnings unless verbose
    let console_level = if cli.verbose { Level::DEBUG } else { Level::WARN };

    if cli.json_log {
        subscriber
            .with(fmt::layer().json().with_ansi(false).with_writer(non_blocking))
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_filter(LevelFilter::from_level(console_level)),
            )
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_filter(LevelFilter::from_level(console_level)),
            )
            .init();
    }

    Ok(guard)
}
