use clap::Parser;
use dotenvy::dotenv;
use image_upload_service::config::AppConfig;
use image_upload_service::infrastructure::storage;
use image_upload_service::{AppState, create_app};
use std::future::IntoFuture;
use std::net::SocketAddr;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port for the HTTP server (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment & Logging
    dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "image_upload_service=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🚀 Starting Image Upload Service...");

    // 2. Configuration
    let mut config = AppConfig::from_env();
    if let Some(port) = args.port {
        config.port = port;
    }

    tokio::fs::create_dir_all(&config.upload_dir).await?;
    info!(
        "📂 Scratch directory: {:?}, static files: {:?}",
        config.upload_dir, config.static_dir
    );

    // 3. Storage & Services
    let storage_service = storage::setup_storage(&config).await;
    let port = config.port;
    let state = AppState::new(config, storage_service);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &axum::http::Request<_>| {
            let request_id = request
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id,
            )
        })
        .on_request(|request: &axum::http::Request<_>, _span: &tracing::Span| {
            info!("📥 {} {}", request.method(), request.uri());
        })
        .on_response(
            |response: &axum::http::Response<_>,
             latency: std::time::Duration,
             _span: &tracing::Span| {
                info!(
                    "📤 Finished in {:?} with status {}",
                    latency,
                    response.status()
                );
            },
        );

    let app = create_app(state).layer(trace_layer);

    // 4. Serve until interrupted
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("✅ Server running on port {}", port);
    info!("🌐 Access your application at: http://localhost:{}", port);
    info!("📖 Swagger UI documentation: http://localhost:{}/swagger-ui", port);

    // In-flight requests are not drained on shutdown.
    tokio::select! {
        res = axum::serve(listener, app).into_future() => {
            if let Err(e) = res {
                error!("❌ Server runtime error: {}", e);
                return Err(e.into());
            }
        }
        _ = shutdown_signal() => {
            info!("🛑 Shutting down server...");
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("⌨️  Ctrl+C received");
        },
        _ = terminate => {
            info!("💤 SIGTERM received");
        },
    }
}
