use anyhow::Context;
use junction_watch::core_modules::camera_feed::CameraFeed;
use junction_watch::{Dashboard, DashboardConfig, Monitor};
use junction_watch_visualizer::{ControlHandle, FrameBus, ServerConfig, start_server};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = DashboardConfig::from_env().context("reading JW_* configuration")?;
    let server_cfg = ServerConfig::from_env();
    info!(?config, bind = %server_cfg.bind_addr, "starting junction watch");

    let monitor = Monitor::new(Dashboard::new(config));
    let bus = FrameBus::new(server_cfg.frame_capacity);
    let (control, play_rx) = ControlHandle::new(true);

    monitor.spawn_refresh_ticker();
    monitor.spawn_feed(CameraFeed::new(), Arc::new(bus.clone()), play_rx);

    let server = start_server(monitor.clone(), bus, server_cfg, control).await?;

    tokio::select! {
        _ = server => info!("server task ended"),
        res = tokio::signal::ctrl_c() => {
            res.context("waiting for ctrl-c")?;
            info!("shutting down");
        }
    }
    monitor.shutdown().await;
    Ok(())
}
