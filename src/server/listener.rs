use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{Instrument, error, info, info_span, warn};

use crate::config::Config;
use crate::error::Error;
use crate::http::connection::Connection;
use crate::server::handler::Handler;

/// A running server. The accept loop lives on its own task; every accepted
/// connection gets another.
pub struct Server {
    local_addr: SocketAddr,
    terminated: AtomicBool,
    shutdown: watch::Sender<bool>,
    accept_loop: JoinHandle<()>,
}

impl Server {
    /// Binds `cfg.listen_addr` and starts accepting in the background.
    pub async fn serve(cfg: &Config, handler: Arc<dyn Handler>) -> anyhow::Result<Server> {
        let listener = TcpListener::bind(&cfg.listen_addr)
            .await
            .with_context(|| format!("failed to bind {}", cfg.listen_addr))?;
        let local_addr = listener.local_addr()?;
        info!("Listening on {}", local_addr);

        let (shutdown, shutdown_rx) = watch::channel(false);
        let config = Arc::new(cfg.clone());
        let accept_loop = tokio::spawn(run(listener, handler, config, shutdown_rx));

        Ok(Server {
            local_addr,
            terminated: AtomicBool::new(false),
            shutdown,
            accept_loop,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }

    /// Stops accepting new connections. Connections already accepted keep
    /// running. Fails if the server was already closed.
    pub fn close(&self) -> Result<(), Error> {
        if self.terminated.swap(true, Ordering::SeqCst) {
            return Err(Error::AlreadyTerminated);
        }

        // The accept loop may already have exited on its own.
        let _ = self.shutdown.send(true);
        info!("Listener closed on {}", self.local_addr);
        Ok(())
    }

    /// Waits for the accept loop to exit.
    pub async fn wait(self) {
        if let Err(e) = self.accept_loop.await {
            error!("Accept loop failed: {}", e);
        }
    }
}

/// Pause applied after an accept error before trying again.
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Decides how to continue after `accept` fails.
///
/// Errors tied to a single incoming connection are retried immediately.
/// Anything else (e.g. running out of file descriptors) waits a moment
/// first. The listener itself is never given up on.
fn accept_backoff(e: &io::Error) -> Option<Duration> {
    match e.kind() {
        io::ErrorKind::ConnectionAborted
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionRefused
        | io::ErrorKind::Interrupted
        | io::ErrorKind::WouldBlock => None,
        _ => Some(ACCEPT_RETRY_DELAY),
    }
}

async fn run(
    listener: TcpListener,
    handler: Arc<dyn Handler>,
    config: Arc<Config>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        let accepted = tokio::select! {
            res = listener.accept() => res,
            _ = shutdown.changed() => break,
        };

        let (socket, peer) = match accepted {
            Ok(conn) => conn,
            Err(e) => {
                let Some(delay) = accept_backoff(&e) else {
                    warn!("Accept failed for one connection: {}", e);
                    continue;
                };

                error!("Accept failed, retrying in {:?}: {}", delay, e);
                tokio::select! {
                    _ = tokio::time::sleep(delay) => continue,
                    _ = shutdown.changed() => break,
                }
            }
        };
        info!("Accepted connection from {}", peer);

        let handler = Arc::clone(&handler);
        let config = Arc::clone(&config);
        tokio::spawn(
            async move {
                let mut conn = Connection::new(socket, handler, config);
                if let Err(e) = conn.run().await {
                    error!("Connection error from {}: {}", peer, e);
                }
            }
            .instrument(info_span!("conn", %peer)),
        );
    }
}
