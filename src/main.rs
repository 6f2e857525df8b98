//! Memory Inspect - Binary Entry Point
//!
//! Read-only inspection of a saved memory file.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use event_memory::utils::format_size;
use event_memory::validation::validate_category;
use event_memory::{Memory, Payload, StoredValue, VarValue};

#[derive(Parser)]
#[command(name = "memory-inspect")]
#[command(about = "Inspect a saved event memory", long_about = None)]
struct Cli {
    /// Memory file written by `Memory::save`
    file: PathBuf,

    /// The file is gzip-compressed
    #[arg(long, short)]
    compressed: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show event, variable and object counts
    Stats,
    /// List events in chronological order
    Timeline {
        /// Show only the most recent N events
        #[arg(long, short)]
        limit: Option<usize>,

        /// Restrict to one category (message, log, reflection, variable)
        #[arg(long)]
        category: Option<String>,
    },
    /// List current variables, or the history of one
    Vars {
        /// Show every recorded value of this variable
        #[arg(long)]
        history: Option<String>,
    },
    /// Re-export the memory as an uncompressed portable JSON document
    Export {
        out: PathBuf,
    },
}

const PREVIEW_CHARS: usize = 60;

fn preview(payload: &Payload) -> String {
    let text = match payload {
        Payload::Bytes(bytes) => format!("<{} bytes>", bytes.len()),
        Payload::Text(text) => format!("{:?}", text),
        Payload::Json(value) => value.to_string(),
    };
    if text.chars().count() > PREVIEW_CHARS {
        let head: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        text
    }
}

fn describe(memory: &Memory, stored: &StoredValue) -> anyhow::Result<String> {
    Ok(match stored {
        StoredValue::Inline(payload) => preview(payload),
        StoredValue::ObjectRef(stamp) => match memory.get_object_info(stamp.as_str()) {
            Some(info) => format!(
                "-> object {} ({}, {})",
                stamp,
                info.content_type,
                format_size(info.size_original as u64)
            ),
            None => format!("-> missing object {}", stamp),
        },
    })
}

fn timeline(memory: &Memory, limit: Option<usize>, category: Option<String>) -> anyhow::Result<()> {
    let categories = category
        .as_deref()
        .map(validate_category)
        .transpose()?
        .map(|category| vec![category]);

    for event in memory.get_events(limit, categories.as_deref(), None) {
        println!(
            "{}  {}  {:<10}  {}",
            event.created_at.format("%Y-%m-%d %H:%M:%S%.6f"),
            event.stamp,
            event.category().as_str(),
            event.summary()
        );
    }
    Ok(())
}

fn vars(memory: &Memory, history: Option<String>) -> anyhow::Result<()> {
    if let Some(key) = history {
        let entries = memory.get_variable_history(&key, false)?;
        if entries.is_empty() {
            anyhow::bail!("variable '{}' was never set", key);
        }
        println!("{}: {}", key, memory.get_variable_description(&key));
        for entry in entries {
            let value = match &entry.value {
                VarValue::Live(stored) => describe(memory, stored)?,
                VarValue::Deleted => "<deleted>".to_string(),
            };
            println!("  {}  {}", entry.stamp, value);
        }
        return Ok(());
    }

    for key in memory.variable_names() {
        match memory.get_variable_raw(key) {
            Some(stored) => println!("{} = {}", key, describe(memory, stored)?),
            None => println!("{} <deleted>", key),
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let memory = Memory::load(&cli.file, cli.compressed)
        .with_context(|| format!("failed to load {}", cli.file.display()))?;

    match cli.command {
        Commands::Stats => {
            println!("{}", memory.stats());
            Ok(())
        }
        Commands::Timeline { limit, category } => timeline(&memory, limit, category),
        Commands::Vars { history } => vars(&memory, history),
        Commands::Export { out } => {
            memory
                .export_json_to(&out)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("exported {} events to {}", memory.len(), out.display());
            Ok(())
        }
    }
}
