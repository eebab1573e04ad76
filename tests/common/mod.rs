//! Shared utilities for integration testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use visitor_profile::config::AppConfig;
use visitor_profile::geo::GeoResolver;
use visitor_profile::http::HttpServer;
use visitor_profile::lifecycle::Shutdown;

pub const TEST_API_KEY: &str = "test-key";

/// Ordered log of request targets seen by mock upstreams.
pub type RequestLog = Arc<Mutex<Vec<String>>>;

pub fn request_log() -> RequestLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Start a programmable mock upstream on an ephemeral port.
///
/// `f` receives the request target (path and query) and returns the status
/// and JSON body to answer with.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let target = read_request_target(&mut socket).await;
                        let (status, body) = f(target).await;
                        let status_text = match status {
                            200 => "200 OK",
                            400 => "400 Bad Request",
                            403 => "403 Forbidden",
                            404 => "404 Not Found",
                            429 => "429 Too Many Requests",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Mock upstream that always answers with the same status and body, logging
/// each request target into `log` with the given prefix.
#[allow(dead_code)]
pub async fn start_fixed_backend(
    log: RequestLog,
    prefix: &'static str,
    status: u16,
    body: &'static str,
) -> SocketAddr {
    start_programmable_backend(move |target| {
        let log = log.clone();
        async move {
            log.lock().unwrap().push(format!("{}{}", prefix, target));
            (status, body.to_string())
        }
    })
    .await
}

async fn read_request_target(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") && buf.len() < 16 * 1024 {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }

    String::from_utf8_lossy(&buf)
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or_default()
        .to_string()
}

/// Config pointing both providers at local mocks.
#[allow(dead_code)]
pub fn test_config(geolocation: SocketAddr, public_ip: SocketAddr) -> AppConfig {
    let mut config = AppConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.geolocation.api_url = format!("http://{}", geolocation);
    config.geolocation.api_key = TEST_API_KEY.to_string();
    config.geolocation.timeout_secs = 2;
    config.public_ip.url = format!("http://{}/?format=json", public_ip);
    config.public_ip.timeout_secs = 2;
    config
}

/// Start the service on an ephemeral port.
#[allow(dead_code)]
pub async fn start_server(config: AppConfig) -> (SocketAddr, Shutdown) {
    let shutdown = Shutdown::new();
    let resolver = test_resolver(&config);
    let server = HttpServer::with_resolver(config, resolver);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// Resolver that ignores any proxy settings in the environment.
#[allow(dead_code)]
pub fn test_resolver(config: &AppConfig) -> GeoResolver {
    GeoResolver::with_client(
        http_client(),
        config.geolocation.clone(),
        config.public_ip.clone(),
    )
}

#[allow(dead_code)]
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
