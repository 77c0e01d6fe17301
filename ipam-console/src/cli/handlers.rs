//! Headless command handlers

use std::path::Path;

use anyhow::{Context, Result};
use colored::*;
use is_terminal::IsTerminal;

use super::{Commands, ExportTarget};
use crate::api::models::label_of;
use crate::api::{Collection, InventoryApi, InventoryClient, Prefix};
use crate::config::Config;
use crate::export::{export_devices, export_prefixes};
use crate::import::{RESOLVED_KINDS, RowOutcome, import_all, read_rows};
use crate::reference::{ReferenceKind, SharedCaches};
use crate::refresh::{device_rows, refresh_kinds};
use crate::refresh::cycle::rebuild_kind;
use crate::resolve::{Resolution, lookup, resolve};

/// Prompt for a token when none is configured and a human is at the keyboard
pub fn ensure_token(config: &mut Config) -> Result<()> {
    if config.has_token() || !std::io::stdin().is_terminal() {
        return Ok(());
    }
    let token = rpassword::prompt_password(format!("API token for {}: ", config.base_url))
        .context("Failed to read token")?;
    if !token.trim().is_empty() {
        config.token = Some(token.trim().to_string());
    }
    Ok(())
}

pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    let client = InventoryClient::new(config.client_settings());

    match command {
        Commands::Tui => anyhow::bail!("The interactive console is not a headless command"),
        Commands::Status => handle_status(&client).await,
        Commands::Refs { kind } => handle_refs(&client, kind).await,
        Commands::Resolve { kind, text } => handle_resolve(&client, kind, &text).await,
        Commands::Import { file, dry_run } => handle_import(&client, config, &file, dry_run).await,
        Commands::Export { target } => handle_export(&client, config, target).await,
        Commands::Device { id } => handle_device(&client, id).await,
    }
}

async fn handle_status(client: &InventoryClient) -> Result<()> {
    let status = client
        .status()
        .await
        .with_context(|| format!("Failed to reach {}", client.base_url()))?;
    let version = status
        .get("netbox-version")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown");
    println!(
        "{} {} (version {})",
        "✓ Connected to".green(),
        client.base_url().cyan(),
        version.bold()
    );
    Ok(())
}

async fn handle_refs(client: &InventoryClient, kind: ReferenceKind) -> Result<()> {
    let cache = rebuild_kind(client, kind)
        .await
        .with_context(|| format!("Failed to fetch {}", kind.collection()))?;

    println!("{}", format!("{:>5}  {:>8}  {}", "index", "id", "name").bold());
    for entry in cache.all() {
        let id = entry
            .remote_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{:>5}  {:>8}  {}", entry.local_index, id, entry.display_name);
    }
    if cache.skipped() > 0 {
        println!(
            "{}",
            format!("{} malformed records skipped", cache.skipped()).yellow()
        );
    }
    Ok(())
}

async fn handle_resolve(client: &InventoryClient, kind: ReferenceKind, text: &str) -> Result<()> {
    let cache = rebuild_kind(client, kind)
        .await
        .with_context(|| format!("Failed to fetch {}", kind.collection()))?;

    let index = resolve(&cache, text);
    match (lookup(&cache, text), cache.get(index)) {
        (Resolution::Matched(_), Some(entry)) => {
            println!(
                "{} {} → index {} (id {})",
                "✓".green(),
                text.cyan(),
                index,
                entry.remote_id.unwrap_or_default()
            );
            println!("  {}", entry.display_name.bold());
        }
        (Resolution::Blank, _) => println!("{} empty text resolves to index {}", "✕".red(), index),
        _ => println!(
            "{} no {} contains {}, index {}",
            "✕".red(),
            kind.label().to_lowercase(),
            text.cyan(),
            index
        ),
    }
    Ok(())
}

async fn handle_import(
    client: &InventoryClient,
    config: &Config,
    file: &Path,
    dry_run: bool,
) -> Result<()> {
    let rows = read_rows(file, &config.import_sheet)?;
    println!("Read {} rows from {}", rows.len(), file.display().to_string().cyan());

    let shared = SharedCaches::default();
    let failures = refresh_kinds(client, &shared, &RESOLVED_KINDS).await;
    if let Some((collection, error)) = failures.first() {
        anyhow::bail!("Failed to fetch {}: {}", collection, error);
    }

    let summary = import_all(&rows, &shared.snapshot(), client, dry_run).await;

    for report in &summary.reports {
        let line = format!("row {:>4}", report.line).dimmed();
        match &report.outcome {
            RowOutcome::Blank => {}
            RowOutcome::Unresolved(columns) => {
                let columns: Vec<_> = columns
                    .iter()
                    .map(|(kind, resolution)| format!("{} {}", kind, resolution.label()))
                    .collect();
                println!("{} {} {} ({})", line, "skip".yellow(), report.name, columns.join(", "));
            }
            RowOutcome::Planned(_) => println!("{} {} {}", line, "plan".blue(), report.name),
            RowOutcome::Created { remote_id } => println!(
                "{} {} {} (id {})",
                line,
                "ok".green(),
                report.name,
                remote_id.map(|id| id.to_string()).unwrap_or_else(|| "?".into())
            ),
            RowOutcome::Failed(message) => {
                println!("{} {} {}: {}", line, "fail".red(), report.name, message)
            }
        }
    }

    println!();
    println!("{}", summary.headline().bold());
    Ok(())
}

async fn handle_export(client: &InventoryClient, config: &Config, target: ExportTarget) -> Result<()> {
    let (path, count) = match target {
        ExportTarget::Devices { path, filter } => {
            let path = config.export_path(&path);
            let cache = rebuild_kind(client, ReferenceKind::Device)
                .await
                .context("Failed to fetch devices")?;
            let count = export_devices(&path, &device_rows(&cache), &filter)?;
            (path, count)
        }
        ExportTarget::Prefixes { path } => {
            let path = config.export_path(&path);
            let prefixes: Vec<Prefix> = client
                .fetch_records(Collection::Prefixes)
                .await
                .context("Failed to fetch prefixes")?;
            let count = export_prefixes(&path, &prefixes)?;
            (path, count)
        }
    };

    println!(
        "{} {} rows to {}",
        "✓ Exported".green(),
        count,
        path.display().to_string().cyan()
    );
    Ok(())
}

async fn handle_device(client: &InventoryClient, id: u64) -> Result<()> {
    let device = client
        .get_device(id)
        .await
        .with_context(|| format!("Failed to fetch device {}", id))?;

    println!("{}", device.label().bold());
    let fields = [
        ("Type", device.device_type_label()),
        ("Manufacturer", device.manufacturer_label()),
        ("Role", label_of(&device.role)),
        ("Site", label_of(&device.site)),
        ("Tenant", label_of(&device.tenant)),
        ("Serial", device.serial.as_str()),
        ("Status", device.status_label()),
        ("Description", device.description.as_str()),
    ];
    for (name, value) in fields {
        println!("  {:<13} {}", format!("{}:", name).dimmed(), value);
    }
    Ok(())
}
