//! sp_drive CLI - browse and transfer files in a SharePoint document library.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glob::glob;
use tracing_subscriber::EnvFilter;

use sp_drive::{connect, path, ConnectConfig};

/// CLI tool for browsing and transferring document-library files.
#[derive(Parser)]
#[command(name = "sp_drive")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Site URL, e.g. https://contoso.sharepoint.com/sites/analytics.
    #[arg(long, env = "SP_SITE_URL")]
    site_url: String,

    /// Azure AD tenant name or GUID.
    #[arg(long, env = "SP_TENANT")]
    tenant: String,

    /// Application (client) id of the app registration.
    #[arg(long, env = "SP_APP_ID")]
    app_id: String,

    /// Document library name.
    #[arg(long, env = "SP_DRIVE", default_value = "Documents")]
    drive: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the document libraries on the site.
    Drives,

    /// List items in a folder.
    Ls {
        /// Folder path (defaults to the drive root).
        #[arg(default_value = "")]
        folder: String,
    },

    /// Download a file to the local filesystem.
    Get {
        /// Remote file path.
        path: String,

        /// Local destination path (file or directory).
        #[arg(long, short = 't', default_value = ".")]
        to: PathBuf,
    },

    /// Upload local files into a folder.
    Put {
        /// Local files to upload (supports glob patterns like *.csv).
        #[arg(required = true)]
        patterns: Vec<String>,

        /// Destination folder path (defaults to the drive root).
        #[arg(long, short = 't', default_value = "")]
        to: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = ConnectConfig::new(&cli.site_url, &cli.tenant, &cli.app_id);
    let site = connect(&config)
        .await
        .with_context(|| format!("Failed to connect to {}", cli.site_url))?;

    match cli.command {
        Commands::Drives => {
            let drives = site.drives().await.context("Failed to list drives")?;

            if drives.is_empty() {
                println!("No document libraries found.");
            } else {
                for drive in drives {
                    println!(
                        "{}\t{}\t{}",
                        drive.id,
                        drive.drive_type.as_deref().unwrap_or("-"),
                        drive.name.as_deref().unwrap_or("-")
                    );
                }
            }
        }

        Commands::Ls { folder } => {
            let drive = site
                .drive(&cli.drive)
                .await
                .with_context(|| format!("Failed to resolve drive: {}", cli.drive))?;

            let items = drive
                .list(&folder)
                .await
                .with_context(|| format!("Failed to list folder: {}", folder))?;

            if items.is_empty() {
                println!("No items found.");
            } else {
                println!("{:<44} {:>10} {:<30} {}", "ID", "SIZE", "TYPE", "NAME");
                println!("{}", "-".repeat(100));
                for item in items {
                    println!("{}", item);
                }
            }
        }

        Commands::Get { path: remote, to } => {
            let drive = site
                .drive(&cli.drive)
                .await
                .with_context(|| format!("Failed to resolve drive: {}", cli.drive))?;

            // Ensure destination directory exists
            if to.is_dir() || to.to_string_lossy().ends_with('/') {
                std::fs::create_dir_all(&to)
                    .with_context(|| format!("Failed to create directory: {:?}", to))?;
            } else if let Some(parent) = to.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("Failed to create directory: {:?}", parent))?;
                }
            }

            let (_, leaf) = path::split(&remote);
            let final_path = if to.is_dir() { to.join(leaf) } else { to };

            print!("Downloading {}... ", remote);
            drive
                .download(&remote, &final_path)
                .await
                .with_context(|| format!("Failed to download: {}", remote))?;

            println!("OK");
            println!("Saved to: {:?}", final_path);
        }

        Commands::Put { patterns, to } => {
            let drive = site
                .drive(&cli.drive)
                .await
                .with_context(|| format!("Failed to resolve drive: {}", cli.drive))?;

            // Expand glob patterns
            let mut files_to_upload: Vec<PathBuf> = Vec::new();

            for pattern in &patterns {
                let matches: Vec<PathBuf> = glob(pattern)
                    .with_context(|| format!("Invalid glob pattern: {}", pattern))?
                    .filter_map(|r| r.ok())
                    .filter(|p| p.is_file())
                    .collect();

                if matches.is_empty() {
                    // If no glob matches, treat as literal path
                    let path = PathBuf::from(pattern);
                    if path.is_file() {
                        files_to_upload.push(path);
                    } else {
                        eprintln!("Warning: No files matched pattern: {}", pattern);
                    }
                } else {
                    files_to_upload.extend(matches);
                }
            }

            // Remove duplicates
            files_to_upload.sort();
            files_to_upload.dedup();

            if files_to_upload.is_empty() {
                anyhow::bail!("No files to upload");
            }

            let folder = to.trim_matches('/');
            println!("Uploading {} file(s)...", files_to_upload.len());

            for (idx, file_path) in files_to_upload.iter().enumerate() {
                let filename = file_path.file_name().unwrap_or_default().to_string_lossy();
                let dest = if folder.is_empty() {
                    filename.to_string()
                } else {
                    format!("{}/{}", folder, filename)
                };

                print!("[{}/{}] Uploading {}... ", idx + 1, files_to_upload.len(), filename);

                match drive.upload(file_path, &dest).await {
                    Ok(item) => {
                        println!("OK ({})", item.id);
                    }
                    Err(e) => {
                        println!("FAILED");
                        eprintln!("  Error: {}", e);
                    }
                }
            }

            println!("Done.");
        }
    }

    Ok(())
}
