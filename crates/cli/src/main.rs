//! Zipper CLI - Command-line interface for the Zipper daemon

mod client;

use anyhow::Result;
use clap::{Parser, Subcommand};
use client::{TaskStatus, ZipperClient};
use colored::Colorize;
use std::path::PathBuf;
use std::time::Duration;
use tabled::Table;

const DEFAULT_URL: &str = "http://127.0.0.1:8080";

#[derive(Parser)]
#[command(name = "zipper")]
#[command(about = "Zipper download-and-archive CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Daemon base URL
    #[arg(long, env = "ZIPPER_URL", default_value = DEFAULT_URL)]
    url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty task
    Create,

    /// Add a .pdf or .jpeg URL to a task
    Add {
        /// Task ID
        id: String,
        /// Item URL
        url: String,
    },

    /// Start a task
    Run {
        /// Task ID
        id: String,
    },

    /// Show task status
    Status {
        /// Task ID
        id: String,
    },

    /// Poll until the task is done or failed
    Wait {
        /// Task ID
        id: String,

        /// Poll interval in milliseconds
        #[arg(long, default_value = "500")]
        interval_ms: u64,
    },

    /// Save the task archive to a file
    Download {
        /// Task ID
        id: String,
        /// Destination path
        path: PathBuf,
    },

    /// Create a task, add every URL and run it
    Submit {
        /// Item URLs (at most 3)
        #[arg(required = true)]
        urls: Vec<String>,

        /// Wait for the task to finish
        #[arg(long)]
        wait: bool,

        /// Poll interval in milliseconds (with --wait)
        #[arg(long, default_value = "500")]
        interval_ms: u64,
    },
}

fn print_status(status: &TaskStatus) {
    let headline = match status.status.as_str() {
        "done" if status.error.is_empty() => "✓ Task done".green().bold(),
        "done" => "✓ Task done with item errors".yellow().bold(),
        "error" => "✗ Task failed".red().bold(),
        other => format!("• Task {}", other).cyan().bold(),
    };
    println!("{}", headline);
    println!();
    println!("{}", Table::new(vec![status.clone()]));
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = ZipperClient::new(&cli.url);

    match cli.command {
        Commands::Create => {
            let id = client.create().await?;
            println!("{}", "✓ Task created".green().bold());
            println!("{}", id);
        }

        Commands::Add { id, url } => {
            let added = client.add(&id, &url).await?;
            println!(
                "{}",
                format!("✓ Item added ({}/{})", added.added, added.limit)
                    .green()
                    .bold()
            );
        }

        Commands::Run { id } => {
            client.run(&id).await?;
            println!("{}", format!("✓ Task {} accepted", id).green().bold());
        }

        Commands::Status { id } => {
            let status = client.status(&id).await?;
            print_status(&status);
        }

        Commands::Wait { id, interval_ms } => {
            let status = client.wait(&id, Duration::from_millis(interval_ms)).await?;
            print_status(&status);
        }

        Commands::Download { id, path } => {
            let bytes = client.download(&id, &path).await?;
            println!(
                "{}",
                format!("✓ Saved {} bytes to {}", bytes, path.display())
                    .green()
                    .bold()
            );
        }

        Commands::Submit {
            urls,
            wait,
            interval_ms,
        } => {
            let id = client.create().await?;
            println!("  {} {}", "Task:".bold(), id);

            for url in &urls {
                match client.add(&id, url).await {
                    Ok(added) => println!("  {} {} ({}/{})", "✓".green(), url, added.added, added.limit),
                    Err(e) => println!("  {} {}: {}", "✗".red(), url, e),
                }
            }

            client.run(&id).await?;
            println!("{}", format!("✓ Task {} accepted", id).green().bold());

            if wait {
                println!();
                let status = client.wait(&id, Duration::from_millis(interval_ms)).await?;
                print_status(&status);
            }
        }
    }

    Ok(())
}
