//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use svc_registry::RegistryConfig;

/// Start a mock service on an ephemeral port whose liveness can be toggled.
///
/// Returns the bound address and a flag: while the flag is `true` every
/// request gets 200, otherwise 503.
#[allow(dead_code)]
pub async fn start_toggle_backend() -> (SocketAddr, Arc<AtomicBool>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let healthy = Arc::new(AtomicBool::new(true));
    let flag = healthy.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let flag = flag.clone();
                    tokio::spawn(async move {
                        let mut buf = [0u8; 1024];
                        let _ = socket.read(&mut buf).await;

                        let (status_line, body) = if flag.load(Ordering::SeqCst) {
                            ("200 OK", "ok")
                        } else {
                            ("503 Service Unavailable", "down")
                        };
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_line,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, healthy)
}

/// Config for tests: probing disabled, snapshot in a unique temp file.
#[allow(dead_code)]
pub fn test_config(tag: &str) -> RegistryConfig {
    let mut config = RegistryConfig::default();
    config.health_check.enabled = false;
    config.snapshot.path = std::env::temp_dir()
        .join(format!(
            "svc-registry-test-{}-{}.json",
            tag,
            std::process::id()
        ))
        .to_string_lossy()
        .into_owned();
    config
}
