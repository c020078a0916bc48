//! Accepts connections one at a time and prints the request parsed from each.

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wireline::config::Config;
use wireline::http::parser::read_request;

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

    let listener = TcpListener::bind(&cfg.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.listen_addr))?;
    info!("Listening on {}", cfg.listen_addr);

    loop {
        let (mut socket, peer) = listener.accept().await?;
        info!("A connection has been accepted from {}", peer);

        let req = match read_request(
            &mut socket,
            cfg.read_chunk_size,
            cfg.initial_buffer_capacity,
        )
        .await
        {
            Ok(Some(req)) => req,
            Ok(None) => continue,
            Err(e) => {
                warn!("Could not parse request from {}: {}", peer, e);
                continue;
            }
        };

        println!("Request line:");
        println!("- Method: {}", req.method());
        println!("- Target: {}", req.target());
        println!("- Version: {}", req.version());

        println!("Headers:");
        for (name, value) in req.headers.iter() {
            println!("- {}: {}", name, value);
        }

        if !req.body.is_empty() {
            println!("Body:");
            println!("{}", String::from_utf8_lossy(&req.body));
        }
    }
}
