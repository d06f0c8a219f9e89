//! Heads-up poker room server using an async actor model.
//!
//! Every room runs as its own actor task; this binary owns the shared room
//! registry and the HTTP/WebSocket gateway in front of it.

mod api;

use std::net::SocketAddr;

use anyhow::Error;
use heads_up_poker::RoomRegistry;
use log::info;
use pico_args::Arguments;

const HELP: &str = "\
Run a heads-up poker room server

USAGE:
  hup_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:6969]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  RUST_LOG                 Log filter (e.g., info, debug)
";

struct Args {
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        bind: pargs.value_from_str("--bind").unwrap_or_else(|_| {
            std::env::var("SERVER_BIND")
                .unwrap_or_else(|_| "127.0.0.1:6969".to_string())
                .parse()
                .expect("Invalid SERVER_BIND address")
        }),
    };

    env_logger::builder().format_target(false).init();
    info!("Starting heads-up poker server at {}", args.bind);

    let registry = RoomRegistry::new();
    let sweeper = registry.spawn_sweeper();

    let app = api::create_router(api::AppState {
        registry: registry.clone(),
    });

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", args.bind, e))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        args.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");
    sweeper.abort();

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
}
