use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use notedrive_types::{NoteId, NoteStatus, StatusFilter};

#[derive(Parser)]
#[command(
    name = "notedrive",
    about = "NoteDrive: notes with attached images, kept in sync with their stores",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (defaults to ./notedrive.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Act as this owner
    #[arg(long, global = true)]
    pub owner: Option<String>,

    /// Directory holding notes.json and the media tree
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Refresh and list notes with per-status counts
    List(ListArgs),
    /// Create a note, optionally with an image
    Create(CreateArgs),
    /// Delete a note and its image
    Delete(DeleteArgs),
    /// Mark a note active or inactive
    Status(StatusArgs),
}

#[derive(Args)]
pub struct ListArgs {
    #[arg(long, default_value = "all")]
    pub filter: StatusFilter,
}

#[derive(Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub description: String,
    #[arg(long, default_value = "active")]
    pub status: NoteStatus,
    /// Image file to upload with the note
    #[arg(long)]
    pub image: Option<PathBuf>,
}

#[derive(Args)]
pub struct DeleteArgs {
    pub id: NoteId,
}

#[derive(Args)]
pub struct StatusArgs {
    pub id: NoteId,
    pub status: NoteStatus,
}
