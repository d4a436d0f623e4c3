//! # valtab-api — Binary Entry Point
//!
//! Starts the Axum HTTP server. Binds to `PORT` (default 8080).
//!
//! | Variable          | Purpose                                        |
//! |-------------------|------------------------------------------------|
//! | `PORT`            | Listen port                                    |
//! | `CRON_SECRET`     | Bearer secret for every non-health route       |
//! | `DATABASE_URL`    | Postgres; unset means in-memory only           |
//! | `VALTAB_CONFIG`   | Optional YAML pipeline configuration file      |
//! | `VALTAB_*`        | Pipeline overrides (see `PipelineConfig`)      |
//! | `NOTIFY_*`        | Webhook notifications (see `NotifyConfig`)     |
//! | `PDFTOTEXT`       | Converter executable (default `pdftotext`)     |
//! | `LOG_FORMAT`      | `json` for JSON log lines                      |

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use valtab_api::db::{self, PgStore};
use valtab_api::state::{AppConfig, AppState, Collaborators};
use valtab_api::store::MemoryStore;
use valtab_client::{notifier_from_config, ClientConfig, NotifyConfig, NtaClient, PdfToText};
use valtab_update::PipelineConfig;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::from_env().context("reading server configuration")?;
    if config.cron_secret.is_none() {
        tracing::warn!("CRON_SECRET not set; every authenticated request will be rejected");
    }

    let config_path = std::env::var_os("VALTAB_CONFIG").map(PathBuf::from);
    let pipeline = PipelineConfig::load(config_path.as_deref())
        .context("loading pipeline configuration")?;
    tracing::info!(
        base_url = %pipeline.base_url,
        index_path = %pipeline.index_path,
        "pipeline configured"
    );
    let pipeline = Arc::new(pipeline);

    let client = NtaClient::new(&ClientConfig::from_pipeline(&pipeline))
        .context("building HTTP client")?;
    let notify = NotifyConfig::from_env().context("reading notification configuration")?;
    let notifier = notifier_from_config(&notify).context("building notifier")?;
    let text = match std::env::var("PDFTOTEXT") {
        Ok(program) => PdfToText::new(program),
        Err(_) => PdfToText::default(),
    };
    let collaborators = Collaborators {
        documents: Arc::new(client),
        text: Arc::new(text),
        notifier,
    };

    // Database pool is optional; absent means in-memory only.
    let db_pool = db::init_pool(config.database_url.as_deref())
        .await
        .context("database initialization failed")?;

    let state = match db_pool {
        Some(pool) => AppState::assemble(
            config.clone(),
            pipeline,
            collaborators,
            Arc::new(PgStore::new(pool.clone())),
            Some(pool),
        ),
        None => AppState::assemble(
            config.clone(),
            pipeline,
            collaborators,
            Arc::new(MemoryStore::new()),
            None,
        ),
    }
    .context("building category registry")?;

    let app = valtab_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("valtab API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
