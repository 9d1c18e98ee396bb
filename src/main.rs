mod cli;
mod commands;
mod error;
mod mcp;
mod pdf;
mod toc;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Mcp => {
            mcp::run_server().await?;
        }
        Commands::InsertToc {
            path,
            toc,
            shift,
            encoding,
            output,
        } => {
            let options = commands::insert_toc::InsertOptions {
                toc,
                page_shift: shift,
                encoding,
                output,
            };
            commands::insert_toc::run(&path, &options)?;
        }
        Commands::CheckToc {
            toc,
            shift,
            encoding,
            pages,
            json,
        } => {
            let options = commands::check_toc::CheckOptions {
                page_shift: shift,
                encoding,
                pages,
            };
            commands::check_toc::run(&toc, &options, json)?;
        }
        Commands::Toc { path, json } => {
            commands::toc::run(&path, json)?;
        }
        Commands::Encodings => {
            commands::encodings::run()?;
        }
    }

    Ok(())
}
