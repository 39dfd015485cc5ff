use std::path::PathBuf;

use anyhow::{bail, Context};
use avogadro_plugin_manager::sdk::Category;
use avogadro_plugin_manager::{DiscoveryConfig, FileFilter, JsonSettings, PluginManager};
use avogadro_plugin_scanner::{plugin_rows, render_rows};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "avogadro-plugins")]
struct Args {
    /// Settings file holding the enabled state of each plugin
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,

    /// Base directory to search instead of the environment or install path
    #[arg(long = "path", value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Try every regular file, not only shared libraries
    #[arg(long)]
    all_files: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List enabled and disabled plugins
    List {
        #[arg(long, value_parser = parse_category)]
        category: Option<Category>,
        /// Print rows as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the directories searched for each category
    Paths,
    /// Enable a discovered plugin
    Enable {
        #[arg(value_parser = parse_category)]
        category: Category,
        name: String,
    },
    /// Disable a discovered plugin
    Disable {
        #[arg(value_parser = parse_category)]
        category: Category,
        name: String,
    },
    /// Show modules that could not be loaded
    Failures,
}

fn parse_category(value: &str) -> Result<Category, String> {
    Category::parse(value).ok_or_else(|| format!("unknown category: {value}"))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init()
        .ok();

    let args = Args::parse();
    let settings_path = match args.settings {
        Some(path) => path,
        None => JsonSettings::default_path()?,
    };
    let settings = JsonSettings::open(&settings_path)
        .with_context(|| format!("failed to open settings {}", settings_path.display()))?;

    let mut config = if args.paths.is_empty() {
        DiscoveryConfig::default()
    } else {
        DiscoveryConfig::with_search_paths(args.paths)
    };
    if args.all_files {
        config.file_filter = FileFilter::AllFiles;
    }
    let mut manager = PluginManager::new(config, settings);

    match args.command {
        Command::List { category, json } => {
            let categories = match category {
                Some(category) => vec![category],
                None => Category::ALL.to_vec(),
            };
            let rows = plugin_rows(&mut manager, &categories);
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                print!("{}", render_rows(&rows));
            }
        }
        Command::Paths => {
            for (category, dir) in manager.config().plugin_directories() {
                println!("{:<9} {}", category.label(), dir.display());
            }
        }
        Command::Enable { category, name } => set_enabled(&mut manager, category, &name, true)?,
        Command::Disable { category, name } => {
            set_enabled(&mut manager, category, &name, false)?
        }
        Command::Failures => {
            for failure in manager.load_failures() {
                println!("{}: {}", failure.path.display(), failure.message);
            }
        }
    }
    Ok(())
}

fn set_enabled(
    manager: &mut PluginManager,
    category: Category,
    name: &str,
    enabled: bool,
) -> anyhow::Result<()> {
    if !manager.set_plugin_enabled(category, name, enabled) {
        bail!("no discovered {} plugin named {name:?}", category.label().to_lowercase());
    }
    manager.write_settings()?;
    tracing::info!(%category, name, enabled, "updated plugin state");
    Ok(())
}
