//! Media store client

mod catalog;
mod constants;
mod download;
mod reconcile;
mod upload;

use clap::{Parser, Subcommand, ValueEnum};
use common::{ErrorResponse, ReconcilePass};
use constants::DEFAULT_SERVER_URL;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "client")]
#[command(about = "Content-addressed media store client")]
struct Cli {
    /// Server URL
    #[arg(short, long, global = true, default_value = DEFAULT_SERVER_URL)]
    server: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a media file
    Upload {
        /// File to upload
        file: PathBuf,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        artist: Option<String>,
        #[arg(long)]
        album: Option<String>,
        /// Duration in seconds
        #[arg(long)]
        duration: Option<i32>,
    },
    /// Download a file by content hash and verify it
    Download {
        hash: String,
        /// Output path (default: downloaded/{hash})
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete a file by content hash
    Delete { hash: String },
    /// List the catalog
    List {
        /// List every active hash instead of playable files
        #[arg(long)]
        hashes: bool,
    },
    /// Check catalog and blob store agreement
    Reconcile {
        /// Remove orphans instead of only reporting them
        #[arg(long)]
        repair: bool,
        #[arg(long, value_enum, default_value_t = PassArg::All)]
        pass: PassArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PassArg {
    Catalog,
    Blobs,
    All,
}

impl From<PassArg> for ReconcilePass {
    fn from(pass: PassArg) -> Self {
        match pass {
            PassArg::Catalog => ReconcilePass::Catalog,
            PassArg::Blobs => ReconcilePass::Blobs,
            PassArg::All => ReconcilePass::All,
        }
    }
}

/// Turn a non-success response into an error carrying the server's message
pub(crate) fn response_error(action: &str, response: reqwest::blocking::Response) -> anyhow::Error {
    let status = response.status();
    let text = response
        .text()
        .unwrap_or_else(|_| "Unknown error".to_string());
    let message = serde_json::from_str::<ErrorResponse>(&text)
        .map(|e| e.error)
        .unwrap_or(text);
    anyhow::anyhow!("{}: {} - {}", action, status, message)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let server = cli.server;

    match cli.command {
        Commands::Upload {
            file,
            title,
            artist,
            album,
            duration,
        } => {
            let info = upload::TrackInfo {
                title,
                artist,
                album,
                duration,
            };
            upload::FileUploader::new(&server).upload(&file, &info)?;
        }
        Commands::Download { hash, output } => {
            download::FileDownloader::new(&server).download_and_verify(&hash, output.as_deref())?;
        }
        Commands::Delete { hash } => {
            catalog::CatalogClient::new(&server).delete(&hash)?;
        }
        Commands::List { hashes } => {
            catalog::CatalogClient::new(&server).list(hashes)?;
        }
        Commands::Reconcile { repair, pass } => {
            reconcile::run(&server, repair, pass.into())?;
        }
    }

    Ok(())
}
