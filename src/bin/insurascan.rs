//! Service binary for insurascan.
//!
//! A thin shim over the library crate: parse flags, build the store and
//! vision collaborators, serve the HTTP trigger surface.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use insurascan::server::{serve, AppContext};
use insurascan::{OpenAiVision, RestStore, Scanner};
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Serve on the default address
  STORE_URL=https://project.supabase.co \
  STORE_SERVICE_KEY=service-role-key \
  OPENAI_API_KEY=sk-... \
  insurascan

  # Trigger a scan
  curl -X POST http://127.0.0.1:8787/scan-insurance-document \
    -H 'content-type: application/json' \
    -d '{"documentId":"doc-123","fileUrl":"uploads/doc-123.jpg"}'

ENVIRONMENT:
  Every flag can also come from the environment variable named in its help.
  RUST_LOG overrides the log filter (default: info)."#;

#[derive(Parser, Debug)]
#[command(
    name = "insurascan",
    version,
    about = "Scan uploaded insurance documents with a vision model and score the extraction",
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Base URL of the content store (Supabase-compatible REST + storage).
    #[arg(long, env = "STORE_URL")]
    store_url: String,

    /// Service key for the content store.
    #[arg(long, env = "STORE_SERVICE_KEY", hide_env_values = true)]
    store_service_key: String,

    /// API key for the vision provider.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: String,

    /// Chat-completions endpoint, for OpenAI-compatible gateways.
    #[arg(long, env = "INSURASCAN_VISION_ENDPOINT")]
    vision_endpoint: Option<String>,

    /// Vision model ID.
    #[arg(long, env = "INSURASCAN_MODEL", default_value = "gpt-4o")]
    model: String,

    /// Document table name in the store.
    #[arg(long, env = "INSURASCAN_TABLE", default_value = "customer_documents")]
    table: String,

    /// Storage bucket holding the uploaded files.
    #[arg(long, env = "INSURASCAN_BUCKET", default_value = "customer-documents")]
    bucket: String,

    /// Confidence score reported on successful extractions (0.0-1.0).
    #[arg(long, env = "INSURASCAN_CONFIDENCE", default_value_t = insurascan::DEFAULT_CONFIDENCE_SCORE)]
    confidence: f64,

    /// Socket address to serve on.
    #[arg(long, env = "INSURASCAN_BIND", default_value = "127.0.0.1:8787")]
    bind: SocketAddr,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "INSURASCAN_VERBOSE")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    // ── Build collaborators ──────────────────────────────────────────────
    let store = RestStore::new(cli.store_url, cli.store_service_key)
        .with_table(cli.table)
        .with_bucket(cli.bucket);

    let mut vision = OpenAiVision::new(cli.openai_api_key).with_model(cli.model);
    if let Some(endpoint) = cli.vision_endpoint {
        vision = vision.with_endpoint(endpoint);
    }

    let scanner =
        Scanner::new(Arc::new(store), Arc::new(vision)).with_confidence_score(cli.confidence);

    // ── Serve ────────────────────────────────────────────────────────────
    let ctx = AppContext {
        scanner: Arc::new(scanner),
    };
    serve(ctx, cli.bind).await.context("HTTP server terminated")?;

    Ok(())
}
