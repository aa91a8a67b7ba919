use std::io::Write;

use anyhow::{bail, Context};
use colored::Colorize;
use pagedrop_publish::{
    Category, CategoryFilter, Deployment, DeploymentId, PublishRequest, PublishService,
};
use pagedrop_server::{open_service, PagedropServer, ServerConfig, StorageBackend};
use tracing::debug;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    let format = cli.format;
    match cli.command {
        Command::Publish(args) => cmd_publish(&offline(config).await?, args, &format).await,
        Command::List(args) => cmd_list(&offline(config).await?, args, &format).await,
        Command::Show(args) => cmd_show(&offline(config).await?, args).await,
        Command::Info(args) => cmd_info(&offline(config).await?, args, &format).await,
        Command::Unpublish(args) => cmd_unpublish(&offline(config).await?, args, &format).await,
        Command::Categories => cmd_categories(&format),
        Command::Serve(args) => cmd_serve(config, args).await,
    }
}

/// One-shot commands always use the filesystem stores so their effects
/// outlive the process.
async fn offline(mut config: ServerConfig) -> anyhow::Result<PublishService> {
    config.storage = StorageBackend::Fs;
    Ok(open_service(&config).await?)
}

fn load_config(cli: &Cli) -> anyhow::Result<ServerConfig> {
    let mut config = match &cli.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    debug!(data_dir = %config.data_dir.display(), storage = config.storage.as_str(), "configuration loaded");
    Ok(config)
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn cmd_publish(
    service: &PublishService,
    args: PublishArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let body = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("reading {}", args.file.display()))?;
    let name = match args.name {
        Some(name) => name,
        None => match args.file.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => bail!("{} has no file name; pass --name", args.file.display()),
        },
    };
    let request = PublishRequest::from_raw(body, name, args.category.as_deref(), args.notes)?;
    let receipt = service.publish(request).await?;
    match format {
        OutputFormat::Json => print_json(&receipt)?,
        OutputFormat::Text => {
            println!("{} Published {}", "✓".green().bold(), receipt.slug.as_str().yellow().bold());
            println!("  URL: {}", receipt.public_url.blue());
            println!("  Id:  {}", receipt.id.to_string().dimmed());
        }
    }
    Ok(())
}

fn print_row(row: &Deployment) {
    println!(
        "{}  {:<9}  {}  {}",
        row.slug.as_str().yellow(),
        row.category.as_str().cyan(),
        row.created_at.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
        row.file_name,
    );
}

async fn cmd_list(
    service: &PublishService,
    args: ListArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let filter = CategoryFilter::parse(args.category.as_deref())?;
    let rows = service.list(filter).await?;
    match format {
        OutputFormat::Json => print_json(&rows)?,
        OutputFormat::Text if rows.is_empty() => println!("No deployments."),
        OutputFormat::Text => rows.iter().for_each(print_row),
    }
    Ok(())
}

async fn cmd_show(service: &PublishService, args: ShowArgs) -> anyhow::Result<()> {
    let bytes = service.fetch_for_view(&args.slug).await?;
    match args.output {
        Some(path) => {
            tokio::fs::write(&path, &bytes)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            eprintln!("{} Wrote {} bytes to {}", "✓".green(), bytes.len(), path.display());
        }
        None => {
            let mut out = std::io::stdout().lock();
            out.write_all(&bytes)?;
            out.flush()?;
        }
    }
    Ok(())
}

async fn cmd_info(
    service: &PublishService,
    args: InfoArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let row = service.get(&args.slug).await?;
    match format {
        OutputFormat::Json => print_json(&row)?,
        OutputFormat::Text => {
            let status = if row.is_active() {
                row.status.as_str().green()
            } else {
                row.status.as_str().red()
            };
            println!("Deployment {} ({})", row.slug.as_str().yellow().bold(), status);
            println!("  Id:       {}", row.id);
            println!("  File:     {}", row.file_name);
            println!("  Category: {}", row.category.label().cyan());
            println!("  URL:      {}", row.public_url.blue());
            println!("  Created:  {}", row.created_at.to_rfc3339());
            if let Some(notes) = &row.notes {
                println!("  Notes:    {notes}");
            }
        }
    }
    Ok(())
}

async fn cmd_unpublish(
    service: &PublishService,
    args: UnpublishArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let id: DeploymentId = args.id.parse()?;
    service.unpublish(&id).await?;
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({ "id": id, "status": "unpublished" }))?,
        OutputFormat::Text => println!("{} Unpublished {}", "✓".green().bold(), id.to_string().yellow()),
    }
    Ok(())
}

fn cmd_categories(format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let table: Vec<_> = Category::ALL
                .iter()
                .map(|c| serde_json::json!({ "value": c, "label": c.label() }))
                .collect();
            print_json(&table)?;
        }
        OutputFormat::Text => {
            for c in Category::ALL {
                println!("{:<10} {}", c.as_str().cyan(), c.label());
            }
        }
    }
    Ok(())
}

async fn cmd_serve(mut config: ServerConfig, args: ServeArgs) -> anyhow::Result<()> {
    if let Some(bind) = args.bind {
        config.bind_addr = bind.parse().with_context(|| format!("invalid bind address {bind}"))?;
    }
    println!(
        "pagedrop server on {} (storage: {}, data: {})",
        config.bind_addr.to_string().bold(),
        config.storage.as_str(),
        config.data_dir.display()
    );
    PagedropServer::open(config).await?.serve().await?;
    Ok(())
}
