use anyhow::Result;
use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::commands::check_toc::{check, CheckOptions};
use crate::commands::insert_toc::{insert, InsertOptions};
use crate::pdf::outline::flatten_outline;
use crate::pdf::PdfDocument;
use crate::toc::{OutlineItem, DEFAULT_ENCODING};

// Request structs for tools

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PathRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct InsertTocRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
    #[schemars(description = "Path to the TOC text file (`<level> <title> <page>` per line)")]
    pub toc_path: String,
    #[schemars(description = "Page shift added to every page number (default: 0)")]
    #[serde(default)]
    pub shift: i64,
    #[schemars(description = "Encoding of the TOC text file (default: UTF-8)")]
    #[serde(default = "default_encoding")]
    pub encoding: String,
    #[schemars(description = "Output file path (default: <path>.new.pdf)")]
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CheckTocRequest {
    #[schemars(description = "Path to the TOC text file")]
    pub toc_path: String,
    #[schemars(description = "Page shift added to every page number (default: 0)")]
    #[serde(default)]
    pub shift: i64,
    #[schemars(description = "Encoding of the TOC text file (default: UTF-8)")]
    #[serde(default = "default_encoding")]
    pub encoding: String,
    #[schemars(description = "Page count to validate target pages against (optional)")]
    #[serde(default)]
    pub pages: Option<u32>,
}

fn default_encoding() -> String {
    DEFAULT_ENCODING.to_string()
}

#[derive(Debug, Clone)]
pub struct TocServer {
    #[allow(dead_code)]
    tool_router: ToolRouter<Self>,
}

impl TocServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }
}

impl Default for TocServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_router]
impl TocServer {
    #[tool(description = "Get the outline (bookmarks) of a PDF as a flat list with nesting levels")]
    fn pdf_toc(&self, Parameters(PathRequest { path }): Parameters<PathRequest>) -> String {
        let outline = PdfDocument::open(&path).and_then(|doc| doc.outline());
        match outline {
            Ok(entries) => {
                let result: Vec<OutlineEntryResult> = flatten_outline(&entries)
                    .into_iter()
                    .map(|e| OutlineEntryResult {
                        title: e.title,
                        page: e.page,
                        level: e.level,
                    })
                    .collect();
                to_json(&result)
            }
            Err(e) => format!("Error: {:#}", e),
        }
    }

    #[tool(description = "Insert a plain-text table of contents into a PDF as its outline and save the result")]
    fn pdf_insert_toc(&self, Parameters(req): Parameters<InsertTocRequest>) -> String {
        let options = InsertOptions {
            toc: PathBuf::from(req.toc_path),
            page_shift: req.shift,
            encoding: req.encoding,
            output: req.output.map(PathBuf::from),
        };

        match insert(&req.path, &options) {
            Ok(summary) => to_json(&InsertTocResult {
                output_path: summary.output_path,
                items: summary.items,
                page_count: summary.page_count,
            }),
            Err(e) => format!("Error: {:#}", e),
        }
    }

    #[tool(description = "Validate a plain-text table of contents and return the outline tree it produces, without touching any PDF")]
    fn toc_check(&self, Parameters(req): Parameters<CheckTocRequest>) -> String {
        let options = CheckOptions {
            page_shift: req.shift,
            encoding: req.encoding,
            pages: req.pages,
        };

        match check(&req.toc_path, &options) {
            Ok(tree) => to_json(&CheckTocResult {
                items: tree.len(),
                outline: tree.items(),
            }),
            Err(e) => format!("Error: {:#}", e),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("Error: {}", e))
}

// Result types for MCP tools

#[derive(Debug, Serialize, schemars::JsonSchema)]
pub struct OutlineEntryResult {
    pub title: String,
    pub page: Option<u32>,
    pub level: u32,
}

#[derive(Debug, Serialize, schemars::JsonSchema)]
pub struct InsertTocResult {
    pub output_path: String,
    pub items: usize,
    pub page_count: u32,
}

#[derive(Debug, Serialize)]
pub struct CheckTocResult {
    pub items: usize,
    pub outline: Vec<OutlineItem>,
}

impl ServerHandler for TocServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Table of contents tools. Use toc_check to validate a plain-text TOC \
                 (`<level> <title> <page>` per line, `#` comments), pdf_insert_toc to write it \
                 into a PDF as bookmarks, and pdf_toc to read the bookmarks back."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_server() -> Result<()> {
    let server = TocServer::new();

    // Serve using stdin/stdout as a tuple
    let service = server.serve((tokio::io::stdin(), tokio::io::stdout())).await?;

    service.waiting().await?;

    Ok(())
}
