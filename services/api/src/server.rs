use crate::cli::ServeArgs;
use crate::infra::{AppState, SharedTracker};
use crate::routes::tracker_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Local;
use return_tracker::config::AppConfig;
use return_tracker::error::AppError;
use return_tracker::lookup::StatusLookup;
use return_tracker::snapshot::RelayClient;
use return_tracker::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let relay = RelayClient::new(&config.relay)?;
    info!(endpoint = relay.endpoint(), "using spreadsheet relay");

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        lookup: StatusLookup::new(Arc::new(relay), config.projection),
        tracker: SharedTracker::default(),
    };

    if let Some(interval) = config.refresh.interval {
        spawn_background_refresh(app_state.clone(), interval);
    }

    let app = tracker_routes()
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "return status tracker ready");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Keeps the held snapshot warm so queue listings rarely wait on the relay.
fn spawn_background_refresh(state: AppState, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let today = Local::now().date_naive();
            match state.tracker.refresh(&state.lookup, today).await {
                Ok(snapshot) => info!(
                    records = snapshot.records.len(),
                    demo = snapshot.is_demo(),
                    "background refresh complete"
                ),
                Err(err) => warn!(error = %err, "background refresh failed"),
            }
        }
    });
}
