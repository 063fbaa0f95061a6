//! edgegate
//!
//! - Client endpoints: WebSocket `/v1/ws`, optional length-framed TCP
//! - Control link to the master (length-framed TCP)
//! - Local datagram channel to colocated workers (unless `--tcp-only`)
//! - Ops: /healthz, /readyz, /metrics

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use edgegate_core::error::{EdgeError, Result};
use edgegate_gateway::{
    announce::Announcer,
    app_state::AppState,
    config::{self, GatewayConfig},
    dispatch::{Dispatcher, GatewayCtx},
    handlers,
    obs::GatewayMetrics,
    realtime::ClientHub,
    registry::{LocalHost, WorkerRegistry},
    router,
    routing::MessageRouter,
    transport,
    uplink::{LocalLink, TcpControlLink, UnixLocalLink},
};

const DEFAULT_CONFIG: &str = "edgegate.yaml";

#[derive(Debug, Parser)]
#[command(
    name = "edgegate",
    version,
    about = "Client-facing gateway in front of a master/worker cluster"
)]
struct Args {
    /// YAML config file (defaults to ./edgegate.yaml when present).
    #[arg(long, short = 'c')]
    config: Option<String>,

    /// Master control address, overrides gateway.control_addr.
    #[arg(long)]
    control_addr: Option<String>,

    /// 0 debug, 1 info, 2 warn, 3 error. RUST_LOG takes precedence.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=3))]
    log_level: u8,

    /// Disable the local datagram channel.
    #[arg(long)]
    tcp_only: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.log_level);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "edgegate stopped");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(level: u8) {
    let fallback = match level {
        0 => "debug",
        1 => "info",
        2 => "warn",
        _ => "error",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_config(args: &Args) -> Result<GatewayConfig> {
    let mut cfg = match &args.config {
        Some(path) => config::load_from_file(path)?,
        None if Path::new(DEFAULT_CONFIG).exists() => config::load_from_file(DEFAULT_CONFIG)?,
        None => GatewayConfig::default(),
    };
    if let Some(addr) = &args.control_addr {
        cfg.gateway.control_addr = addr.clone();
    }
    cfg.gateway.tcp_only |= args.tcp_only;
    cfg.validate()?;
    Ok(cfg)
}

/// Files owned by this process, removed on every exit path.
#[derive(Default)]
struct Cleanup {
    paths: Vec<PathBuf>,
}

impl Drop for Cleanup {
    fn drop(&mut self) {
        for p in &self.paths {
            if let Err(e) = std::fs::remove_file(p) {
                tracing::debug!(path = %p.display(), error = %e, "cleanup skipped");
            }
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let cfg = load_config(&args)?;
    let pid = std::process::id();
    let limits = cfg.limits.clone();
    let mut cleanup = Cleanup::default();

    std::fs::write(&cfg.gateway.pid_file, pid.to_string()).map_err(|e| {
        EdgeError::Internal(format!(
            "write pid file {} failed: {e}",
            cfg.gateway.pid_file.display()
        ))
    })?;
    cleanup.paths.push(cfg.gateway.pid_file.clone());

    let metrics = Arc::new(GatewayMetrics::default());

    let local = if cfg.gateway.tcp_only {
        tracing::info!("local channel disabled (tcp only)");
        None
    } else {
        let path = cfg.gateway.local_socket_path(pid);
        let (link, reader) = UnixLocalLink::bind(
            &path,
            limits.outbound_queue,
            limits.max_frame_bytes,
            Arc::clone(&metrics),
        )?;
        cleanup.paths.push(path);
        Some((Arc::new(link), reader))
    };

    let (control, mut control_reader) = TcpControlLink::connect(
        &cfg.gateway.control_addr,
        limits.outbound_queue,
        limits.max_frame_bytes,
        Arc::clone(&metrics),
    )
    .await?;

    let ctx = GatewayCtx::new(
        Arc::new(WorkerRegistry::new()),
        Arc::new(ClientHub::new()),
        Arc::new(LocalHost::new(cfg.gateway.local_hostname.clone())),
        Arc::clone(&metrics),
    );
    let dispatcher = Dispatcher::new();
    handlers::register_builtin(&dispatcher);

    let (local_link, local_reader) = match local {
        Some((link, reader)) => (Some(link as Arc<dyn LocalLink>), Some(reader)),
        None => (None, None),
    };
    let router = Arc::new(MessageRouter::new(
        ctx,
        Arc::new(dispatcher),
        Arc::new(control),
        local_link,
    ));

    let announcer = Arc::new(Announcer::new(Arc::clone(&router), pid));
    if let Err(e) = announcer.say_hello() {
        tracing::warn!(error = %e, "hello not sent");
    }

    let mut tasks: Vec<JoinHandle<()>> = Vec::new();

    // Losing the master ends the process.
    let (lost_tx, lost_rx) = oneshot::channel::<()>();
    {
        let router = Arc::clone(&router);
        tasks.push(tokio::spawn(async move {
            while let Some(res) = control_reader.next_payload().await {
                match res {
                    Ok(payload) => router.on_server_payload(payload).await,
                    Err(e) => {
                        router.ctx().metrics().decode_errors.inc(&[("source", "control")]);
                        tracing::warn!(error = %e, "control frame rejected");
                    }
                }
            }
            tracing::error!("control link closed");
            let _ = lost_tx.send(());
        }));
    }

    if let Some(mut reader) = local_reader {
        let router = Arc::clone(&router);
        tasks.push(tokio::spawn(async move {
            while let Some(res) = reader.next_payload().await {
                match res {
                    Ok(payload) => router.on_server_payload(payload).await,
                    Err(e) => {
                        router.ctx().metrics().decode_errors.inc(&[("source", "local")]);
                        tracing::warn!(error = %e, "local datagram rejected");
                    }
                }
            }
        }));
    }

    tasks.push(announcer.spawn_reporter(Duration::from_millis(cfg.gateway.report_interval_ms)));

    let state = AppState::new(cfg.clone(), Arc::clone(&router));

    if let Some(addr) = &cfg.gateway.tcp_listen {
        let listener = bind(addr).await?;
        tracing::info!(listen = %addr, "tcp client listener started");
        tasks.push(tokio::spawn(transport::tcp::serve(listener, state.clone())));
    }

    let listener = bind(&cfg.gateway.listen).await?;
    tracing::info!(
        listen = %cfg.gateway.listen,
        control = %cfg.gateway.control_addr,
        pid,
        "edgegate starting"
    );

    let app = router::build_router(state);
    let drain = Arc::clone(&metrics);
    let served = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = shutdown_signal() => {},
                _ = lost_rx => {},
            }
            drain.set_draining();
        })
        .await;

    metrics.set_draining();
    for t in &tasks {
        t.abort();
    }
    tracing::info!("edgegate stopped");

    served.map_err(|e| EdgeError::Internal(format!("server failed: {e}")))
}

async fn bind(addr: &str) -> Result<tokio::net::TcpListener> {
    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| EdgeError::BadRequest(format!("invalid listen address {addr}: {e}")))?;
    tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| EdgeError::Internal(format!("bind {addr} failed: {e}")))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "ctrl-c handler not installed");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler not installed");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("signal received, starting graceful shutdown");
}
