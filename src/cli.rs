use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdftoc")]
#[command(about = "Insert a table of contents written as plain text into a PDF as bookmarks")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run as MCP server
    Mcp,

    /// Insert a TOC text file into a PDF as its outline
    InsertToc {
        /// PDF file to add the outline to
        path: PathBuf,

        /// TOC text file, one `<level> <title> <page>` entry per line
        #[arg(long)]
        toc: PathBuf,

        /// Page shift (if page 1 is page n of the PDF file, the shift is n-1)
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        shift: i64,

        /// Encoding of the TOC text file
        #[arg(long, default_value = "UTF-8")]
        encoding: String,

        /// Output file (default: <path>.new.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse a TOC text file and print the outline it produces
    CheckToc {
        /// TOC text file
        toc: PathBuf,

        /// Page shift applied to every entry
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        shift: i64,

        /// Encoding of the TOC text file
        #[arg(long, default_value = "UTF-8")]
        encoding: String,

        /// Reject target pages past this page count
        #[arg(long)]
        pages: Option<u32>,

        /// Print the tree as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the outline / bookmarks of a PDF
    Toc {
        /// PDF file to inspect
        path: PathBuf,

        /// Print the outline as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the encodings accepted by --encoding
    Encodings,
}
