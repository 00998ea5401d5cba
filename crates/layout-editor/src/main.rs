//! Headless entry point for the signage layout editor.
//!
//! ```text
//! layout-editor inspect lobby.json
//! layout-editor normalize lobby.json --output lobby.fixed.json
//! layout-editor push lobby.json --id 42
//! layout-editor push lobby.json --local
//! ```
//!
//! Every command loads the layout through the same repair path the editor
//! uses, so `inspect` shows exactly what an editing session would open.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use layout_core::{decode_document, encode_document, LayoutDocument};
use layout_editor::application::save_layout::{LayoutId, LayoutRepository, SaveLayoutUseCase};
use layout_editor::infrastructure::http::HttpLayoutClient;
use layout_editor::infrastructure::storage::config::{
    config_dir, load_config, load_config_from, EditorConfig,
};
use layout_editor::infrastructure::storage::file_repository::JsonFileRepository;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(
    name = "layout-editor",
    version,
    about = "Inspect, repair and publish signage layouts"
)]
struct Cli {
    /// Path to a config TOML file.  Defaults to the platform config location.
    #[arg(long, env = "LAYOUT_EDITOR_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the displays of a layout and the zones on each.
    Inspect { file: PathBuf },

    /// Repair a layout file and write it back out in canonical form.
    Normalize {
        file: PathBuf,
        /// Output file; prints to stdout when omitted.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Send a layout to the configured backend.
    Push {
        file: PathBuf,
        /// Replace this stored layout instead of creating a new one.
        #[arg(long)]
        id: Option<String>,
        /// Write to the local layouts directory instead of the API.
        #[arg(long)]
        local: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Config is read before logging starts, so its error is reported after.
    let (config, config_error) = match read_config(cli.config.as_deref()) {
        Ok(config) => (config, None),
        Err(e) => (EditorConfig::default(), Some(e)),
    };

    // Level comes from the config file; `RUST_LOG` overrides it.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.editor.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Some(e) = config_error {
        warn!("using default configuration: {e:#}");
    }

    match cli.command {
        Command::Inspect { file } => inspect(&file).await,
        Command::Normalize { file, output } => normalize(&file, output.as_deref()).await,
        Command::Push { file, id, local } => push(&config, &file, id, local).await,
    }
}

fn read_config(path: Option<&Path>) -> anyhow::Result<EditorConfig> {
    let config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

async fn read_layout(file: &Path) -> anyhow::Result<LayoutDocument> {
    let json = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("reading {}", file.display()))?;
    let doc = decode_document(&json).with_context(|| format!("decoding {}", file.display()))?;
    info!("loaded {} ({} zones)", file.display(), doc.zones().len());
    Ok(doc)
}

async fn inspect(file: &Path) -> anyhow::Result<()> {
    let doc = read_layout(file).await?;

    println!("{} [{}]", display_name(doc.name()), doc.layout_type().as_str());
    if !doc.description().is_empty() {
        println!("  {}", doc.description());
    }

    for display in doc.displays() {
        let primary = if display.primary { " (primary)" } else { "" };
        println!(
            "\n{} ({}){}: {} {} at {},{}",
            display.name,
            display.id,
            primary,
            display.resolution,
            display.orientation.as_str(),
            display.position.x,
            display.position.y,
        );
        for zone in doc.zones_for_display(display.id) {
            let scope = if zone.display_id.is_none() { " [all displays]" } else { "" };
            let hidden = if zone.is_visible { "" } else { " [hidden]" };
            println!(
                "  z{:<3} {:<24} {:<9} x={:.1} y={:.1} w={:.1} h={:.1}{}{}",
                zone.z_index,
                zone.name,
                zone.content_type().as_str(),
                zone.rect.x,
                zone.rect.y,
                zone.rect.width,
                zone.rect.height,
                scope,
                hidden,
            );
        }
    }

    let orphaned = doc
        .zones()
        .iter()
        .filter(|z| z.display_id.is_some_and(|d| doc.display(d).is_none()))
        .count();
    if orphaned > 0 {
        println!("\n{orphaned} zone(s) belong to removed displays");
    }
    Ok(())
}

async fn normalize(file: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let doc = read_layout(file).await?;
    let json = encode_document(&doc)?;
    match output {
        Some(path) => {
            tokio::fs::write(path, json)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            info!("wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

async fn push(
    config: &EditorConfig,
    file: &Path,
    id: Option<String>,
    local: bool,
) -> anyhow::Result<()> {
    let doc = read_layout(file).await?;

    let repository: Arc<dyn LayoutRepository> = if local {
        let dir = match &config.storage.layouts_dir {
            Some(dir) => dir.clone(),
            None => config_dir()?.join("layouts"),
        };
        Arc::new(JsonFileRepository::new(dir))
    } else {
        Arc::new(HttpLayoutClient::new(&config.api)?)
    };

    let target = id.map(LayoutId::new);
    let outcome = SaveLayoutUseCase::new(repository)
        .save(&doc, target.as_ref())
        .await?;
    println!("{}", outcome.id());
    Ok(())
}

fn display_name(name: &str) -> &str {
    if name.trim().is_empty() {
        "(untitled)"
    } else {
        name
    }
}
