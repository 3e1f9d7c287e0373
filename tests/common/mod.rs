//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::mpsc;

use vanity_filter::config::FilterConfig;
use vanity_filter::content::Resource;
use vanity_filter::{HttpServer, Shutdown};

/// Content used across tests: one in-scope vanity, one escaping vanity, and their targets.
pub fn site_content() -> Vec<Resource> {
    vec![
        Resource::redirect("/MyVanity", "/content/site/target-page"),
        Resource::redirect("/MediaVanity", "/content/site-media/target-page"),
        Resource::redirect("/Escape", "/content/site-other/target-page"),
        Resource::new("/content/site/target-page", "page").with_attribute("title", "Target"),
        Resource::new("/content/site-media/target-page", "page"),
        Resource::new("/content/site-other/target-page", "page"),
    ]
}

/// A config with the given root path declarations (`None` = absent).
pub fn site_config(root_paths: Option<&[&str]>) -> FilterConfig {
    let mut config = FilterConfig::default();
    config.vanity.root_paths = root_paths.map(|paths| paths.iter().map(|p| p.to_string()).collect());
    config.content = site_content();
    config
}

/// A running server on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub config_tx: mpsc::UnboundedSender<FilterConfig>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start a server and wait until it accepts connections.
pub async fn start_server(config: FilterConfig) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let (config_tx, config_rx) = mpsc::unbounded_channel();
    let server = HttpServer::new(config);
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, config_rx, server_shutdown).await;
    });

    for _ in 0..50 {
        if tokio::net::TcpStream::connect(addr).await.is_ok() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    TestServer {
        addr,
        shutdown,
        config_tx,
    }
}

/// A client that never pools connections or uses system proxies.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
