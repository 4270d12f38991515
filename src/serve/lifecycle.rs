//! Server lifecycle management.

use std::net::{IpAddr, SocketAddr, TcpListener};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Result, anyhow};
use tiny_http::Server;

use crate::log;

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Bind the HTTP server to the interface, trying the next ports when busy.
pub fn bind_with_retry(interface: IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    retry_ports("serve", base_port, |port| {
        let addr = SocketAddr::new(interface, port);
        Server::http(addr)
            .map(|server| (server, addr))
            .map_err(|e| anyhow!("{e}"))
    })
}

/// Bind the live-reload listener the same way.
pub fn bind_listener_with_retry(interface: IpAddr, base_port: u16) -> Result<(TcpListener, u16)> {
    retry_ports("reload", base_port, |port| {
        let listener = TcpListener::bind(SocketAddr::new(interface, port))?;
        let port = listener.local_addr()?.port();
        Ok((listener, port))
    })
}

fn retry_ports<T>(module: &str, base_port: u16, mut bind: impl FnMut(u16) -> Result<T>) -> Result<T> {
    let mut last_error = None;
    for offset in 0..MAX_PORT_RETRIES {
        let Some(port) = base_port.checked_add(offset) else {
            break;
        };
        match bind(port) {
            Ok(bound) => {
                if offset > 0 {
                    log!(module; "port {} in use, using {} instead", base_port, port);
                }
                return Ok(bound);
            }
            Err(e) => last_error = Some(e),
        }
    }
    Err(anyhow!(
        "failed to bind after {} attempts starting at port {}: {}",
        MAX_PORT_RETRIES,
        base_port,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

/// Wait for the watch thread to finish (max 2 seconds).
pub fn wait_for_shutdown(handle: JoinHandle<()>) {
    for _ in 0..40 {
        if handle.is_finished() {
            let _ = handle.join();
            return;
        }
        thread::sleep(Duration::from_millis(50));
    }
}
