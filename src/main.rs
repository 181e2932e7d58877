//! ContentHub: a project-versioned content repository
//!
//! Loads configuration, wires the brokers over an in-memory access module,
//! seeds the repository, and walks one offline project through a publish.

use std::sync::Arc;

use bytes::Bytes;
use tracing_subscriber::{EnvFilter, fmt};

use contenthub_access::MemoryAccessModule;
use contenthub_core::config::AppConfig;
use contenthub_core::error::AppError;
use contenthub_core::types::ProjectId;
use contenthub_entity::{ResourcePath, ResourceType};
use contenthub_service::ContentHub;

#[tokio::main]
async fn main() {
    let env = std::env::var("CONTENTHUB_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Repository error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting ContentHub v{}", env!("CARGO_PKG_VERSION"));

    let online = ProjectId(config.repository.online_project_id);
    let access = Arc::new(MemoryAccessModule::new(online));
    let hub = ContentHub::new(&config, access);
    let admin = hub.bootstrap("Admin").await?;

    // ── Open an offline project ──────────────────────────────────
    let admins = hub.principals().read_group(hub.principals().admin_group()).await?;
    let project = hub
        .projects()
        .create_project(&admin, "Offline", "Working copy", admins.id, admins.id)
        .await?;
    let ctx = admin.in_project(project.id);

    // ── Edit ─────────────────────────────────────────────────────
    let docs = ResourcePath::parse("/docs")?;
    let readme = docs.join("readme.txt")?;
    hub.resources().create_folder(&ctx, &docs).await?;
    hub.resources()
        .create_file(
            &ctx,
            &readme,
            ResourceType::Plain,
            Bytes::from_static(b"Welcome to ContentHub"),
        )
        .await?;

    // ── Publish ──────────────────────────────────────────────────
    let backup = hub.resources().publish_project(&ctx).await?;
    tracing::info!(
        version = backup.version(),
        resources = backup.resources().len(),
        "Published project '{}'",
        project.name
    );

    let published = hub
        .resources()
        .read_file_header(&admin, &readme)
        .await?;
    tracing::info!(
        path = %published.path,
        state = %published.state,
        length = published.length,
        "Online view"
    );

    for (name, stats) in hub.caches().stats() {
        tracing::debug!(
            cache = name,
            hits = stats.hits,
            misses = stats.misses,
            entries = stats.entries,
            "Cache statistics"
        );
    }

    tracing::info!("ContentHub shut down gracefully");
    Ok(())
}
