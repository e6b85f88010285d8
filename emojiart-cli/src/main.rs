//! # EmojiArt CLI
//!
//! Create, inspect and edit `.emojiart` documents from the command line.
//!
//! ```bash
//! emojiart new beach
//! emojiart background beach https://images.example/sand.jpg
//! emojiart add beach 🦀 --x 40 --y -20
//! emojiart replay beach gestures.json
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use emojiart_core::Size;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "emojiart")]
#[command(about = "Compose emoji over background images")]
#[command(version)]
struct Cli {
    /// Directory holding documents and palettes.
    #[arg(long, env = "EMOJIART_DATA_DIR", default_value = ".emojiart")]
    data_dir: PathBuf,

    /// Viewport used to interpret gesture coordinates, as WIDTHxHEIGHT.
    #[arg(long, default_value = "1024x768", value_parser = commands::parse_viewport)]
    viewport: Size,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create an empty document.
    New {
        /// Document name.
        name: String,
        /// Replace an existing document of the same name.
        #[arg(long)]
        force: bool,
    },
    /// Print a document.
    Show {
        /// Document name.
        name: String,
        /// Print the stored JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },
    /// Place an emoji at a document position.
    Add {
        /// Document name.
        name: String,
        /// The emoji to place.
        emoji: String,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        x: i32,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        y: i32,
        /// Glyph size in document units.
        #[arg(long, default_value_t = 40)]
        size: i32,
    },
    /// Set the background from a URL or a local image file.
    Background {
        /// Document name.
        name: String,
        /// `http(s)` URL, or path to an image file to embed.
        source: String,
        /// Skip fetching and decoding the image.
        #[arg(long)]
        no_fetch: bool,
    },
    /// Apply a JSON list of input events to a document and save it.
    Replay {
        /// Document name.
        name: String,
        /// Script file containing a JSON array of input events.
        script: PathBuf,
        /// Start from an empty document if none exists.
        #[arg(long)]
        create: bool,
    },
    /// List saved documents.
    List,
    /// Delete a document.
    Delete {
        /// Document name.
        name: String,
    },
    /// Manage emoji palettes.
    #[command(subcommand)]
    Palettes(PaletteCommand),
}

#[derive(Debug, Subcommand)]
enum PaletteCommand {
    /// Show all palettes.
    List,
    /// Create a palette.
    Create {
        /// Palette name.
        name: String,
        /// Initial emoji.
        #[arg(default_value = "")]
        emojis: String,
        /// Position to insert at.
        #[arg(long, default_value_t = 0)]
        at: usize,
    },
    /// Add emoji to a palette.
    Add {
        /// Palette index.
        index: usize,
        /// Text to take emoji from.
        text: String,
    },
    /// Remove one emoji from a palette.
    RemoveEmoji {
        /// Palette index.
        index: usize,
        /// The emoji to remove.
        emoji: String,
    },
    /// Rename a palette.
    Rename {
        /// Palette index.
        index: usize,
        /// New name.
        name: String,
    },
    /// Move a palette to another position.
    Move {
        /// Current index.
        from: usize,
        /// Target index.
        to: usize,
    },
    /// Delete a palette.
    Remove {
        /// Palette index.
        index: usize,
    },
}

/// Initialize tracing with optional JSON output.
///
/// Set `RUST_LOG_FORMAT=json` for JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,emojiart_core=debug,emojiart_runtime=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let ctx = commands::Context::new(cli.data_dir, cli.viewport)?;

    match cli.cmd {
        Command::New { name, force } => ctx.new_document(&name, force),
        Command::Show { name, json } => ctx.show(&name, json),
        Command::Add {
            name,
            emoji,
            x,
            y,
            size,
        } => ctx.add(&name, &emoji, (x, y), size),
        Command::Background {
            name,
            source,
            no_fetch,
        } => ctx.background(&name, &source, !no_fetch).await,
        Command::Replay {
            name,
            script,
            create,
        } => ctx.replay(&name, &script, create).await,
        Command::List => ctx.list(),
        Command::Delete { name } => ctx.delete(&name),
        Command::Palettes(cmd) => run_palettes(&ctx, cmd),
    }
}

fn run_palettes(ctx: &commands::Context, cmd: PaletteCommand) -> anyhow::Result<()> {
    let mut store = ctx.palettes()?;
    match cmd {
        PaletteCommand::List => {}
        PaletteCommand::Create { name, emojis, at } => {
            let emojis = (!emojis.is_empty()).then_some(emojis.as_str());
            let id = store.insert(name, emojis, at);
            tracing::info!(id, "palette created");
        }
        PaletteCommand::Add { index, text } => {
            let added = store.add_emojis(index, &text)?;
            tracing::info!(added, "emoji added");
        }
        PaletteCommand::RemoveEmoji { index, emoji } => {
            if !store.remove_emoji(index, &emoji)? {
                anyhow::bail!("{emoji} is not in palette {index}");
            }
        }
        PaletteCommand::Rename { index, name } => store.rename(index, name)?,
        PaletteCommand::Move { from, to } => store.move_palette(from, to)?,
        PaletteCommand::Remove { index } => {
            if index >= store.len() {
                anyhow::bail!("no palette at index {index}");
            }
            if store.len() == 1 {
                anyhow::bail!("cannot remove the last palette");
            }
            store.remove(index);
        }
    }
    commands::print_palettes(&store);
    Ok(())
}
