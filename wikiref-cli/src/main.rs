//! # wikiref CLI
//!
//! Command-line interface for resolving, matching and grouping wiki entity
//! references.

mod commands;
mod output;
mod settings;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use wikiref_model::EntityType;

#[derive(Parser)]
#[command(name = "wikiref")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "wikiref.yml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a reference string and print its chain
    Resolve {
        /// Entity type (wiki, space, document, attachment, page, ...)
        entity_type: EntityType,

        /// Reference string, e.g. "wiki:Space.Page"
        text: String,

        /// Reference filling the missing parents, as TYPE=TEXT
        #[arg(long)]
        base: Option<String>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Check a reference against include/exclude rules
    Match {
        entity_type: EntityType,

        text: String,

        /// Included location, as TYPE=TEXT (repeatable)
        #[arg(long)]
        include: Vec<String>,

        /// Excluded location, as TYPE=TEXT (repeatable)
        #[arg(long)]
        exclude: Vec<String>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the tree aggregating several references
    Tree {
        entity_type: EntityType,

        /// Reference strings (at least one)
        #[arg(required = true)]
        texts: Vec<String>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Group a JSON list of events into notifications
    Group {
        /// JSON file holding an array of events
        events: PathBuf,

        /// Recipient, as a document reference string
        #[arg(long)]
        user: Option<String>,

        /// Event types the user subscribed to (defaults to every type found)
        #[arg(long = "type")]
        types: Vec<String>,

        /// Maximum number of notifications
        #[arg(long, default_value_t = 20)]
        limit: usize,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::WARN.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Resolve {
            entity_type,
            text,
            base,
            json,
        } => commands::resolve(&cli.config, entity_type, &text, base.as_deref(), json),
        Commands::Match {
            entity_type,
            text,
            include,
            exclude,
            json,
        } => commands::match_reference(&cli.config, entity_type, &text, &include, &exclude, json),
        Commands::Tree {
            entity_type,
            texts,
            json,
        } => commands::print_tree(&cli.config, entity_type, &texts, json),
        Commands::Group {
            events,
            user,
            types,
            limit,
            json,
        } => {
            let opts = commands::GroupOptions {
                user,
                types,
                limit,
                json,
            };
            commands::group(&cli.config, &events, opts)
        }
    }
}
