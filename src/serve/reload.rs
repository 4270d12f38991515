//! Live reload over WebSocket.
//!
//! ```text
//! watch loop --broadcast--> ReloadHub --{"type":"reload"}--> browsers
//!                              ^
//!        acceptor thread ------+ (handshake, {"type":"connected"})
//! ```

use std::io;
use std::net::{IpAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use parking_lot::Mutex;
use serde::Serialize;
use tungstenite::{Message, WebSocket};

use super::lifecycle::bind_listener_with_retry;
use crate::core::is_shutdown;
use crate::{debug, log};

/// Messages sent to browser clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReloadMessage {
    Connected {
        version: &'static str,
    },
    Reload {
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
}

impl ReloadMessage {
    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    pub fn reload(reason: impl Into<String>) -> Self {
        Self::Reload {
            reason: Some(reason.into()),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"reload"}"#.to_string())
    }
}

type Clients = Arc<Mutex<Vec<WebSocket<TcpStream>>>>;

/// Connected browsers plus the listener that admits new ones.
pub struct ReloadHub {
    clients: Clients,
    port: u16,
}

impl ReloadHub {
    /// Bind the listener (with port retry) and start the acceptor thread.
    pub fn start(interface: IpAddr, base_port: u16) -> Result<Self> {
        let (listener, port) = bind_listener_with_retry(interface, base_port)?;
        listener.set_nonblocking(true)?;

        let clients = Clients::default();
        let acceptor_clients = Arc::clone(&clients);
        thread::Builder::new()
            .name("reload-accept".into())
            .spawn(move || accept_loop(&listener, &acceptor_clients))?;

        Ok(Self { clients, port })
    }

    /// Port actually bound (may differ from the configured one after retry).
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn client_count(&self) -> usize {
        self.clients.lock().len()
    }

    /// Send to every client, dropping the ones that have gone away.
    pub fn broadcast(&self, msg: &ReloadMessage) {
        let text = msg.to_json();
        let mut clients = self.clients.lock();
        if clients.is_empty() {
            debug!("reload"; "no clients connected");
            return;
        }

        let count = clients.len();
        clients.retain_mut(|ws| match ws.send(Message::Text(text.clone().into())) {
            Ok(()) => true,
            Err(e) => {
                debug!("reload"; "client disconnected: {}", e);
                false
            }
        });
        debug!("reload"; "broadcast to {} of {} clients", clients.len(), count);
    }

    pub fn close_all(&self) {
        for mut ws in self.clients.lock().drain(..) {
            let _ = ws.close(None);
            let _ = ws.flush();
        }
    }
}

fn accept_loop(listener: &TcpListener, clients: &Clients) {
    while !is_shutdown() {
        match listener.accept() {
            Ok((stream, addr)) => {
                debug!("reload"; "client connected: {}", addr);
                if let Some(ws) = handshake(stream) {
                    clients.lock().push(ws);
                }
            }
            Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(100));
            }
            Err(e) => {
                log!("reload"; "accept error: {}", e);
                thread::sleep(Duration::from_millis(100));
            }
        }
    }
}

/// Blocking handshake, then greet the client.
fn handshake(stream: TcpStream) -> Option<WebSocket<TcpStream>> {
    let _ = stream.set_nonblocking(false);
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));

    let mut ws = match tungstenite::accept(stream) {
        Ok(ws) => ws,
        Err(e) => {
            log!("reload"; "handshake failed: {}", e);
            return None;
        }
    };
    if let Err(e) = ws.send(Message::Text(ReloadMessage::connected().to_json().into())) {
        log!("reload"; "failed to send connected message: {}", e);
        return None;
    }
    Some(ws)
}
