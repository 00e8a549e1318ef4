use lotwatch::detector::DetectorAdapter;
use lotwatch::detector::replay::ReplayModel;
use lotwatch::layout::SlotLayouts;
use lotwatch::state::AppState;
use lotwatch::{api, config};
use std::net::SocketAddr;
use std::sync::Arc;

fn init_tracing() {
    let subscriber = tracing_subscriber::fmt().with_target(false).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    tracing::info!(
        config_path = config::DEFAULT_CONFIG_PATH,
        "lotwatch starting"
    );
    let config = config::load_default()?;

    // Acquire the detection model once; load failure degrades to an adapter
    // that reports no detections instead of failing startup.
    let detector = match config.detections_path() {
        Some(path) => match ReplayModel::load(path) {
            Ok(model) => {
                tracing::info!(
                    path = %path.display(),
                    detections = model.len(),
                    "Detection model loaded"
                );
                DetectorAdapter::new(Box::new(model), config.confidence_floor())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load detection model, detections disabled");
                DetectorAdapter::disabled()
            }
        },
        None => {
            tracing::info!("No detection model configured, detections disabled");
            DetectorAdapter::disabled()
        }
    };

    let layouts = match config.layouts_path() {
        Some(path) => match SlotLayouts::load_from_path(path) {
            Ok(layouts) => {
                tracing::info!(
                    path = %path.display(),
                    lots = layouts.lot_count(),
                    "Slot layouts loaded"
                );
                layouts
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load slot layouts, using built-in default");
                SlotLayouts::builtin()
            }
        },
        None => {
            tracing::info!("No layout file configured, using built-in default");
            SlotLayouts::builtin()
        }
    };

    let state = Arc::new(AppState::new(detector, layouts));

    let app = api::router(Arc::clone(&state));
    let port = config.server_port();
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
