use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "pagedrop",
    about = "pagedrop: publish HTML documents under short public slugs",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Directory holding blobs and the deployment table
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Publish an HTML file under a fresh slug
    Publish(PublishArgs),
    /// List active deployments, newest first
    List(ListArgs),
    /// Print the published document for a slug
    Show(ShowArgs),
    /// Show the deployment record for a slug
    Info(InfoArgs),
    /// Hide a deployment from viewers
    Unpublish(UnpublishArgs),
    /// List the known categories
    Categories,
    /// Start the HTTP server
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct PublishArgs {
    pub file: PathBuf,
    #[arg(short, long)]
    pub category: Option<String>,
    #[arg(short, long)]
    pub notes: Option<String>,
    /// File name to record instead of the path's own name
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Args)]
pub struct ListArgs {
    /// A category name, or `all`
    #[arg(short, long)]
    pub category: Option<String>,
}

#[derive(Args)]
pub struct ShowArgs {
    pub slug: String,
    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct InfoArgs {
    pub slug: String,
}

#[derive(Args)]
pub struct UnpublishArgs {
    pub id: String,
}

#[derive(Args)]
pub struct ServeArgs {
    #[arg(long)]
    pub bind: Option<String>,
}
