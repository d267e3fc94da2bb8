use anyhow::Result;
use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::assembly::{Assembly, AssemblyEngine, OutputSummary};
use crate::commands::booklet::default_output;
use crate::commands::job::{Job, JobExtract, JobSource};
use crate::pdf::{LopdfPort, PdfDocument};

// Request structs for tools

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PathRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SourceRequest {
    #[schemars(description = "Path to a source PDF file")]
    pub path: String,
    #[schemars(description = "First page to take, 1-based (default: 1)")]
    pub start: Option<u32>,
    #[schemars(description = "Last page to take, inclusive (default: last page)")]
    pub end: Option<u32>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CombineRequest {
    #[schemars(description = "Source PDFs in output order, each with an optional page range")]
    pub sources: Vec<SourceRequest>,
    #[schemars(description = "Output file path")]
    pub output: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ExtractRequest {
    #[schemars(description = "Output file path for this extract")]
    pub output: String,
    #[schemars(description = "First page of the extract, 1-based (default: 1)")]
    pub start: Option<u32>,
    #[schemars(description = "Last page of the extract, inclusive (default: last page)")]
    pub end: Option<u32>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfSplitRequest {
    #[schemars(description = "Path to the PDF file to split")]
    pub path: String,
    #[schemars(description = "Extracts to write; ranges may overlap, output paths must differ")]
    pub extracts: Vec<ExtractRequest>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfBookletRequest {
    #[schemars(description = "Path to the PDF file to reorder")]
    pub path: String,
    #[schemars(description = "Output file path (default: <name>_2.pdf next to the input)")]
    pub output: Option<String>,
}

impl From<SourceRequest> for JobSource {
    fn from(req: SourceRequest) -> Self {
        JobSource {
            path: PathBuf::from(req.path),
            start: req.start,
            end: req.end,
        }
    }
}

impl From<ExtractRequest> for JobExtract {
    fn from(req: ExtractRequest) -> Self {
        JobExtract {
            output: PathBuf::from(req.output),
            start: req.start,
            end: req.end,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PdfServer {
    tool_router: ToolRouter<Self>,
}

impl PdfServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }

    fn run_job(&self, job: Job) -> String {
        match job.execute(&AssemblyEngine::new(LopdfPort)) {
            Ok(assembly) => {
                let result = AssembleResult::from(assembly);
                serde_json::to_string_pretty(&result).unwrap_or_else(|e| format!("Error: {}", e))
            }
            Err(e) => format!("Error: {:#}", e),
        }
    }
}

impl Default for PdfServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_router]
impl PdfServer {
    #[tool(description = "Get the page count and document metadata (title, author, subject, creator, producer) of a PDF")]
    fn pdf_info(&self, Parameters(PathRequest { path }): Parameters<PathRequest>) -> String {
        match PdfDocument::open(&path) {
            Ok(doc) => {
                let info = doc.info();
                let result = PdfInfoResult {
                    path,
                    page_count: info.page_count,
                    title: info.title,
                    author: info.author,
                    subject: info.subject,
                    creator: info.creator,
                    producer: info.producer,
                };
                serde_json::to_string_pretty(&result).unwrap_or_else(|e| format!("Error: {}", e))
            }
            Err(e) => format!("Error: {}", e),
        }
    }

    #[tool(description = "Concatenate page ranges of two or more PDFs into one file, in the order given")]
    fn pdf_merge(&self, Parameters(req): Parameters<CombineRequest>) -> String {
        self.run_job(Job::Merge {
            sources: req.sources.into_iter().map(JobSource::from).collect(),
            output: PathBuf::from(req.output),
        })
    }

    #[tool(description = "Interleave two or more PDFs: take one page from each source in turn; shorter sources drop out while longer ones continue")]
    fn pdf_interleave(&self, Parameters(req): Parameters<CombineRequest>) -> String {
        self.run_job(Job::Interleave {
            sources: req.sources.into_iter().map(JobSource::from).collect(),
            output: PathBuf::from(req.output),
        })
    }

    #[tool(description = "Write page ranges of one PDF to separate files. Stops at the first extract that fails.")]
    fn pdf_split(&self, Parameters(req): Parameters<PdfSplitRequest>) -> String {
        self.run_job(Job::Split {
            source: PathBuf::from(req.path),
            extracts: req.extracts.into_iter().map(JobExtract::from).collect(),
        })
    }

    #[tool(description = "Reorder a PDF as page 1, n, 2, n-1, ... for manual duplex booklet printing")]
    fn pdf_booklet(&self, Parameters(req): Parameters<PdfBookletRequest>) -> String {
        let source = PathBuf::from(req.path);
        let output = req
            .output
            .map(PathBuf::from)
            .unwrap_or_else(|| default_output(&source));
        self.run_job(Job::Booklet { source, output })
    }
}

// Result types for MCP tools

#[derive(Debug, Serialize)]
pub struct PdfInfoResult {
    pub path: String,
    pub page_count: u32,
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AssembleResult {
    pub outputs: Vec<OutputSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
}

impl From<Assembly> for AssembleResult {
    fn from(assembly: Assembly) -> Self {
        match assembly {
            Assembly::Written(outputs) => AssembleResult {
                outputs,
                skipped: None,
            },
            Assembly::Skipped(reason) => AssembleResult {
                outputs: Vec::new(),
                skipped: Some(reason.to_string()),
            },
        }
    }
}

#[tool_handler]
impl ServerHandler for PdfServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "PDF page assembly tools. Use pdf_info for page counts, pdf_merge to concatenate \
                 page ranges, pdf_split to write ranges of one PDF to separate files, \
                 pdf_interleave to alternate pages between PDFs, and pdf_booklet to reorder \
                 pages for booklet printing."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_server() -> Result<()> {
    let server = PdfServer::new();
    log::info!("Serving MCP over stdio");

    // Serve using stdin/stdout as a tuple
    let service = server.serve((tokio::io::stdin(), tokio::io::stdout())).await?;

    service.waiting().await?;

    Ok(())
}
