use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use bytes::Bytes;
use colored::Colorize;
use notedrive_blobs::FsBlobStore;
use notedrive_records::FsRecordStore;
use notedrive_sync::{EnrichedNote, ImageUpload, NoteDraft, SyncCoordinator, View};
use notedrive_types::{Note, NoteStatus, StatusFilter};

use crate::cli::*;
use crate::config::CliConfig;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let mut config = CliConfig::resolve(cli.config.as_deref())?;
    config.apply_overrides(cli.owner, cli.data_dir);
    let coordinator = open_coordinator(&config).await?;
    let format = cli.format;

    match cli.command {
        Command::List(args) => cmd_list(&coordinator, args, format).await,
        Command::Create(args) => cmd_create(&coordinator, args, format).await,
        Command::Delete(args) => cmd_delete(&coordinator, args, format).await,
        Command::Status(args) => cmd_status(&coordinator, args, format).await,
    }
}

/// Wire the filesystem stores under `data_dir` into a coordinator.
pub async fn open_coordinator(config: &CliConfig) -> anyhow::Result<SyncCoordinator> {
    let owner = config.owner()?;
    let records = FsRecordStore::open(&config.data_dir, owner.clone())
        .await?
        .with_sort_index(config.sort_index);
    let blobs = FsBlobStore::open(&config.data_dir, owner.clone())
        .await?
        .with_url_ttl(config.url_ttl());
    Ok(SyncCoordinator::new(
        owner,
        Arc::new(records),
        Arc::new(blobs),
        config.sync.clone(),
    ))
}

async fn cmd_list(
    coordinator: &SyncCoordinator,
    args: ListArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    coordinator.refresh(Some(args.filter)).await?;
    let view = coordinator.current_view();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&*view)?),
        OutputFormat::Text => print_view(&view),
    }
    Ok(())
}

async fn cmd_create(
    coordinator: &SyncCoordinator,
    args: CreateArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let image = match &args.image {
        Some(path) => Some(read_image(path).await?),
        None => None,
    };
    let draft = NoteDraft::new(args.name, args.description).with_status(args.status);
    let note = coordinator.create(draft, image).await?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&note)?),
        OutputFormat::Text => {
            println!("{} Created note {} ({})", "✓".green().bold(), note.name.bold(), note.id.short_id().yellow());
            if let Some(path) = &note.image_path {
                println!("  Image: {}", path.to_string().cyan());
            }
        }
    }
    Ok(())
}

async fn cmd_delete(
    coordinator: &SyncCoordinator,
    args: DeleteArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    coordinator.refresh(Some(StatusFilter::All)).await?;
    let image = coordinator
        .current_view()
        .get(&args.id)
        .and_then(|n| n.note.image_path.clone());

    let outcome = coordinator.delete(&args.id, image.as_ref()).await?;
    if let Some(e) = &outcome.blob_error {
        eprintln!("{} image left behind: {}", "warning:".yellow().bold(), e);
    }
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({
                "deleted": args.id,
                "blobError": outcome.blob_error.as_ref().map(|e| e.to_string()),
            })
        ),
        OutputFormat::Text => println!("{} Deleted note {}", "✓".green().bold(), args.id.short_id().yellow()),
    }
    Ok(())
}

async fn cmd_status(
    coordinator: &SyncCoordinator,
    args: StatusArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let note = coordinator.update_status(&args.id, args.status).await?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&note)?),
        OutputFormat::Text => println!("{} {} is now {}", "✓".green().bold(), note.name.bold(), status_label(note.status)),
    }
    Ok(())
}

async fn read_image(path: &Path) -> anyhow::Result<ImageUpload> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading image {}", path.display()))?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .context("image path has no file name")?;
    Ok(ImageUpload::new(filename, content_type_for(path), Bytes::from(data)))
}

/// Guess a content type from the file extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("heic") => "image/heic",
        _ => "application/octet-stream",
    }
}

fn print_view(view: &View) {
    let counts = view.counts();
    if view.filter() == StatusFilter::All {
        println!("{} notes", counts.all.to_string().bold());
    } else {
        println!(
            "{} {} notes ({} total)",
            view.len().to_string().bold(),
            view.filter(),
            counts.all
        );
    }
    println!(
        "  All {}  Active {}  Inactive {}",
        counts.all,
        counts.active.to_string().green(),
        counts.inactive.to_string().dimmed()
    );
    for note in view.notes() {
        print_note(note);
    }
}

fn print_note(entry: &EnrichedNote) {
    let note: &Note = &entry.note;
    println!(
        "\n{}  {}  [{}]  {}",
        note.id.short_id().yellow(),
        note.name.bold(),
        status_label(note.status),
        note.created_at.format("%Y-%m-%d %H:%M").to_string().dimmed()
    );
    println!("    {}", note.description);
    match (&note.image_path, &entry.image_url) {
        (Some(_), Some(url)) => println!("    image: {}", url.url.blue()),
        (Some(path), None) => println!("    image: {} ({})", path, "unavailable".red()),
        _ => {}
    }
}

fn status_label(status: NoteStatus) -> colored::ColoredString {
    match status {
        NoteStatus::Active => "active".green(),
        NoteStatus::Inactive => "inactive".dimmed(),
    }
}
