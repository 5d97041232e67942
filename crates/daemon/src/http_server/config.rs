use std::net::SocketAddr;

#[derive(Debug, Clone)]
pub struct Config {
    // Listen address
    pub listen_addr: SocketAddr,
    // Largest request body accepted before answering 413
    pub max_body_bytes: usize,
    // log level for http tracing
    pub log_level: tracing::Level,
}

impl Config {
    pub fn new(listen_addr: SocketAddr, max_body_bytes: usize, log_level: tracing::Level) -> Self {
        tracing::info!(
            "Creating HTTP server Config: listen_addr={}, max_body_bytes={}",
            listen_addr,
            max_body_bytes
        );
        Self {
            listen_addr,
            max_body_bytes,
            log_level,
        }
    }
}
