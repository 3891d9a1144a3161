//! # menagerie
//!
//! Drives a fixed registry of animals once per tick, forever, while a
//! background runtime serves their probe counters over HTTP.
//!
//! ## Startup
//!
//! 1. **Tracing** - `RUST_LOG` or a sensible default, file and line on every event
//! 2. **Config** - defaults, optionally overridden by the TOML file in `MENAGERIE_CONFIG`
//! 3. **Runtime** - tokio with `parallelism` worker threads, for the endpoint only
//! 4. **Endpoint** - bound before anything runs; failing to bind is fatal
//! 5. **Driver** - runs on the main thread until a lifecycle fails
//!
//! ## Exit
//!
//! Exit code 1 on bind failure or a failed lifecycle. If the endpoint ever
//! stops on its own the process exits 0.

#![forbid(unsafe_code)]
#![forbid(clippy::unwrap_used)]
#![forbid(clippy::panic)]
#![deny(clippy::expect_used)]

use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use menagerie_core::{Driver, Habitat, Probes, Registry, RuntimeConfig};

fn main() {
    init_tracing();

    if let Err(e) = run() {
        error!("{e:#}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = RuntimeConfig::from_env().map_err(menagerie_core::Error::from)?;
    info!(
        bind = %config.bind_address(),
        tick = ?config.tick_interval(),
        parallelism = config.parallelism(),
        sampling = ?config.sampling(),
        "menagerie starting"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.parallelism())
        .thread_name("menagerie-introspect")
        .enable_all()
        .build()
        .context("Failed to build the introspection runtime")?;

    let registry = Registry::all_animals();
    let probes = Arc::new(Probes::for_registry(&registry, config.sampling()));

    let listener = runtime.block_on(menagerie_introspect::bind(config.bind_address()))?;
    let router = menagerie_introspect::create_router(Arc::clone(&probes));
    runtime.spawn(exit_when_stopped(menagerie_introspect::serve(listener, router)));

    let habitat = Habitat::new(probes, *config.behavior());
    let driver = Driver::new(registry, habitat, config.tick_interval());

    match driver.run()? {}
}

/// The endpoint lives as long as the process; if it stops, so do we.
async fn exit_when_stopped(server: impl Future<Output = menagerie_introspect::Result<()>>) {
    match server.await {
        Ok(()) => {
            info!("Introspection endpoint stopped");
            process::exit(0);
        }
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    }
}

/// Initialize tracing, honouring `RUST_LOG` when set.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,menagerie=debug,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}
