//! Development server with live reload.
//!
//! Three threads while serving: the HTTP request loop (caller's thread),
//! the WebSocket acceptor and the watch loop. Only the watch loop runs tasks.

mod lifecycle;
mod reload;
mod response;
mod watch;

use std::sync::Arc;
use std::thread;

use anyhow::Result;
use crossbeam::channel;
use tiny_http::Server;

use crate::config::PipelineConfig;
use crate::core::register_server;
use crate::{debug, log};
use reload::ReloadHub;
use watch::SourceWatcher;

/// Serve the staging root, watch the sources and push reloads until Ctrl+C.
pub fn serve(config: &PipelineConfig) -> Result<()> {
    let paths = config.paths.clone();
    let root = paths.staging_dir();

    // Watcher first: edits made while binding are still picked up
    let watcher = SourceWatcher::new(&paths)?;

    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);
    let hub = Arc::new(ReloadHub::start(config.serve.interface, config.serve.reload_port)?);

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    register_server(Arc::clone(&server), shutdown_tx);

    log!("serve"; "http://{} ({})", addr, paths.relative(&root).display());
    debug!("reload"; "ws://{}:{}", addr.ip(), hub.port());

    let watch_hub = Arc::clone(&hub);
    let watch_handle = thread::Builder::new()
        .name("watch".into())
        .spawn(move || watcher.run(&watch_hub, &shutdown_rx))?;

    run_request_loop(&server, &root, hub.port());

    lifecycle::wait_for_shutdown(watch_handle);
    hub.close_all();
    Ok(())
}

fn run_request_loop(server: &Server, root: &std::path::Path, ws_port: u16) {
    for request in server.incoming_requests() {
        let url = request.url().to_string();
        if let Err(e) = response::handle_request(request, root, ws_port) {
            log!("serve"; "request error for {}: {:#}", url, e);
        }
    }
}
