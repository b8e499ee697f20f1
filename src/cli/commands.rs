use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "dt", about = concat!("dt v", env!("CARGO_PKG_VERSION"), " - comment threads for Deck cards"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Comment store directory (default: from config, else $XDG_DATA_HOME/deck-threads)
    #[arg(short = 's', long = "store", global = true)]
    pub store: Option<PathBuf>,

    /// Config file (default: $XDG_CONFIG_HOME/deck-threads/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show a card's comment thread
    Show(CardArgs),
    /// Show one comment and where it sits in the thread
    Find(CommentArgs),
    /// Add a top-level comment
    Add(AddArgs),
    /// Reply to a comment
    Reply(ReplyArgs),
    /// Change a comment's message
    Edit(EditArgs),
    /// Delete a comment (its replies move up one level)
    Delete(CommentArgs),
    /// Validate a card's thread
    Check(CardArgs),
    /// Import an OCS comments response (JSON) into a card
    Import(ImportArgs),
}

#[derive(Args)]
pub struct CardArgs {
    /// Card ID
    pub card: i64,
}

#[derive(Args)]
pub struct CommentArgs {
    /// Card ID
    pub card: i64,
    /// Comment ID
    pub id: i64,
}

#[derive(Args)]
pub struct AddArgs {
    /// Card ID
    pub card: i64,
    /// Comment text
    pub message: String,
}

#[derive(Args)]
pub struct ReplyArgs {
    /// Card ID
    pub card: i64,
    /// ID of the comment being answered
    pub parent: i64,
    /// Reply text
    pub message: String,
}

#[derive(Args)]
pub struct EditArgs {
    /// Card ID
    pub card: i64,
    /// Comment ID
    pub id: i64,
    /// New comment text
    pub message: String,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Card ID
    pub card: i64,
    /// File holding the server's response ("-" for stdin)
    pub file: PathBuf,
}
