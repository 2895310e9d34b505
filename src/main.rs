//! Mockup Studio
//!
//! Design placement and mockup compositing service using Rust + Actix-Web.
//! Renders fast local previews of artwork on product templates and reconciles
//! them with authoritative mockups from an external rendering service.

use actix_web::{web, App, HttpServer, middleware};
use anyhow::Context;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;

mod api;
mod config;
mod domain;
mod engine;
mod pipeline;
mod providers;
mod session;
mod storage;

use crate::config::Settings;
use crate::engine::{ImageLoader, LocalCompositor};
use crate::pipeline::MockupPipeline;
use crate::providers::{
    AssetHost, CatalogLookup, HttpMockupService, MockupGenerator, PrintfulCatalog, ProviderCredentials,
    RateLimitedClient, Unconfigured,
};
use crate::session::SessionStore;
use crate::storage::R2AssetHost;

/// Application state shared across all handlers
pub struct AppState {
    pub sessions: SessionStore,
    pub catalog: Arc<dyn CatalogLookup>,
    pub pipeline: MockupPipeline,
    pub loader: ImageLoader,
    pub compositor: LocalCompositor,
    pub started_at: Instant,
}

fn build_catalog(settings: &Settings) -> anyhow::Result<Arc<dyn CatalogLookup>> {
    let catalog = &settings.catalog;
    let credentials = ProviderCredentials::resolve(catalog.access_token.as_deref(), "printful");
    if !credentials.is_configured() {
        warn!("No Printful access token configured, template lookups will fail");
    }

    let client = RateLimitedClient::new(catalog.rate_limit_per_minute, Duration::from_secs(catalog.timeout_secs))
        .context("Failed to build catalog HTTP client")?;

    info!(rate_limit_per_minute = client.rate_limit_per_minute(), "Catalog client ready");
    Ok(Arc::new(PrintfulCatalog::new(credentials, &catalog.base_url, client, catalog.max_retries)))
}

fn build_asset_host(settings: &Settings) -> Arc<dyn AssetHost> {
    if !settings.asset_hosting.is_configured() {
        info!("No R2 credentials configured, design hosting disabled");
        return Arc::new(Unconfigured("asset hosting"));
    }

    match R2AssetHost::new(&settings.asset_hosting) {
        Ok(host) => {
            info!(bucket = %settings.asset_hosting.bucket_name, "R2 design hosting initialized");
            Arc::new(host)
        }
        Err(e) => {
            warn!(error = %e, "Failed to initialize R2. Running without design hosting.");
            Arc::new(Unconfigured("asset hosting"))
        }
    }
}

fn build_generator(settings: &Settings) -> anyhow::Result<Arc<dyn MockupGenerator>> {
    let service = &settings.mockup_service;
    let base_url = match service.base_url.as_deref().filter(|u| !u.is_empty()) {
        Some(url) => url,
        None => {
            info!("No mockup service configured, authoritative generation disabled");
            return Ok(Arc::new(Unconfigured("mockup generation")));
        }
    };

    let client = RateLimitedClient::new(service.rate_limit_per_minute, Duration::from_secs(service.timeout_secs))
        .context("Failed to build mockup service HTTP client")?;
    let credentials = ProviderCredentials::resolve(service.api_key.as_deref(), "mockup_service");

    info!(
        base_url = %base_url,
        rate_limit_per_minute = client.rate_limit_per_minute(),
        "Mockup generation service configured"
    );
    Ok(Arc::new(HttpMockupService::new(base_url, credentials, client, service.max_retries)))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing subscriber for structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("mockup_studio=info,actix_web=info"))
        )
        .json()
        .init();

    // Load configuration
    let settings = Settings::load().context("Failed to load configuration")?;
    let bind_addr = format!("{}:{}", settings.server.host, settings.server.port);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_addr = %bind_addr,
        "Starting Mockup Studio"
    );

    let loader = ImageLoader::new(settings.preview.fetch_timeout(), settings.preview.template_cache_size)
        .context("Failed to build image loader")?;
    let compositor = LocalCompositor::new(settings.preview.max_dimension, settings.preview.shadow_opacity);
    let pipeline = MockupPipeline::new(
        build_asset_host(&settings),
        build_generator(&settings)?,
        settings.mockup_service.upload_cache_size,
    );

    let app_state = web::Data::new(AppState {
        catalog: build_catalog(&settings)?,
        sessions: SessionStore::new(),
        pipeline,
        loader,
        compositor,
        started_at: Instant::now(),
    });

    // Idle session eviction
    let eviction_state = app_state.clone();
    let ttl = settings.sessions.idle_ttl();
    let period = settings.sessions.eviction_interval();
    actix_rt::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            eviction_state.sessions.evict_idle(ttl);
        }
    });

    let max_upload = settings.server.max_upload_bytes;
    let workers = settings.server.workers.unwrap_or_else(|| num_cpus::get() * 2);

    // Configure and start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(web::PayloadConfig::new(max_upload))
            .wrap(TracingLogger::default())
            .wrap(middleware::Compress::default())
            .wrap(
                middleware::DefaultHeaders::new()
                    .add(("X-Service", "mockup-studio"))
                    .add(("X-Version", env!("CARGO_PKG_VERSION")))
            )
            .configure(api::configure_routes)
    })
    .workers(workers)
    .bind(&bind_addr)?
    .run()
    .await?;

    Ok(())
}
