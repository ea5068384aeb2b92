//! Desa Portal View Server
//!
//! Usage:
//!   cargo run
//!
//! Environment:
//!   DESA_API_BASE_URL          - Village REST API (default: http://localhost:8000)
//!   PORT / DESA_PORTAL_PORT    - Server port (default: 8080)
//!   DESA_PORTAL_HOST           - Server host (default: 0.0.0.0)
//!   DESA_DEMO_FALLBACK         - Serve demo map/IDM data when the API fails
//!   DESA_SESSION_FILE          - Kiosk mode: one persisted login for the process
//!   DESA_TRUST_PROXY           - Rate-limit on X-Forwarded-For (behind a reverse proxy)
//!   RUST_LOG                   - Log level (default: info)

use desa_portal::api::{create_router, start_cleanup_task, AppState};
use desa_portal::PortalConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    print_banner();

    let config = PortalConfig::from_env()?;
    let addr = config.socket_addr()?;

    info!("🌐 Village API: {}", config.api.base_url);
    if config.api.demo_fallback {
        warn!("⚠️ Demo fallback enabled: failed map/IDM requests serve sample data");
    }

    // Create app state
    let state = Arc::new(AppState::new(config)?);

    // Start background cleanup task for rate limiter
    start_cleanup_task(state.rate_limiter.clone());
    info!("🧹 Background cleanup task started");

    let app = create_router(state);

    info!("🚀 Desa Portal starting on http://{}", addr);
    info!("");
    info!("Endpoints:");
    info!("  GET  /publik/fasilitas          - Peta fasilitas desa");
    info!("  GET  /publik/potensi            - Potensi desa (?kategori=&q=)");
    info!("  GET  /publik/apbdesa/pdf/:year  - Unduh PDF APBDesa");
    info!("  POST /publik/pengaduan          - Kirim pengaduan (multipart)");
    info!("  POST /login | /logout           - Sesi admin");
    info!("  GET  /admin/*                   - Halaman admin (butuh login)");
    info!("  GET  /health                    - Health check");
    info!("");
    info!("Press Ctrl+C for graceful shutdown");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("⚠️ Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("👋 Desa Portal shutdown complete");

    Ok(())
}

fn print_banner() {
    println!(
        r#"
    ╔══════════════════════════════════════════════════════╗
    ║                                                      ║
    ║        D E S A   P O R T A L   v{:<8}             ║
    ║     Portal Administrasi & Informasi Publik Desa      ║
    ║                                                      ║
    ╚══════════════════════════════════════════════════════╝
    "#,
        env!("CARGO_PKG_VERSION")
    );
}
