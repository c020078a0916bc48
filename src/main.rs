use std::io::Write;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use wireline::config::Config;
use wireline::http::request::Request;
use wireline::http::response::HandlerError;
use wireline::server::{Handler, Server};

/// File served as-is on `/video`, relative to the working directory.
const VIDEO_PATH: &str = "assets/vim.mp4";

/// Demo application served by the binary.
struct DemoHandler {
    chunked_prefix: String,
}

impl Handler for DemoHandler {
    fn handle(&self, out: &mut dyn Write, req: &Request) -> Result<(), HandlerError> {
        match req.target() {
            "/yourproblem" => Err(HandlerError::bad_request("Your problem is not my problem")),
            "/myproblem" => Err(HandlerError::internal_error("Woopsie, my bad")),
            "/video" => {
                out.write_all(&std::fs::read(VIDEO_PATH)?)?;
                Ok(())
            }
            target if self.streams_body(req) => {
                let rest = &target[self.chunked_prefix.len()..];
                for part in rest.split('/').filter(|p| !p.is_empty()) {
                    out.write_all(part.as_bytes())?;
                    out.write_all(b"\n")?;
                }
                Ok(())
            }
            _ => {
                out.write_all(b"All good, frfr")?;
                Ok(())
            }
        }
    }

    fn streams_body(&self, req: &Request) -> bool {
        req.target().starts_with(&self.chunked_prefix)
    }

    fn raw_content_type(&self, req: &Request) -> Option<&str> {
        (req.target() == "/video").then_some("video/mp4")
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                tracing::warn!("Cannot listen for SIGTERM: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_level)),
        )
        .with_target(false)
        .with_level(true)
        .init();

    let handler = Arc::new(DemoHandler {
        chunked_prefix: cfg.chunked_prefix.clone(),
    });
    let server = Server::serve(&cfg, handler).await?;

    shutdown_signal().await;
    tracing::info!("Shutdown signal received");

    server.close()?;
    server.wait().await;
    tracing::info!("Server gracefully stopped");

    Ok(())
}
